//! Keyboard injection for keyplay.
//!
//! [`ScancodeInjector`] implements [`keyplay_core::KeyInjector`] on top of any
//! [`KeyboardBackend`]. [`LoggingBackend`] is a dry run that only logs.
//!
//! ```
//! use keyplay_core::{KeyCombo, KeyInjector};
//! use keyplay_input::{LoggingBackend, ScancodeInjector};
//!
//! let injector = ScancodeInjector::new(LoggingBackend);
//! assert!(injector.press_combo(&KeyCombo::parse("shift+a").unwrap()));
//! assert!(!injector.press_combo(&KeyCombo::key("nosuchkey")));
//! ```

pub mod error;
pub use error::{Error, Result};

mod injector;
pub use injector::{
    KeyAction, KeyboardBackend, LoggingBackend, RecordingBackend, ScancodeInjector, DEFAULT_HOLD,
};

pub mod scancode;
pub use scancode::Scancode;
