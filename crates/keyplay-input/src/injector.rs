//! Combo sequencing over a raw keyboard backend.

use crate::error::Result;
use crate::scancode::{self, Scancode};
use keyplay_core::{KeyCombo, KeyInjector};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// How long the main key stays down.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// Platform primitive that emits a single key transition.
pub trait KeyboardBackend: Send + Sync {
    fn send(&self, key: Scancode, action: KeyAction) -> Result<()>;
}

/// Dry-run backend: every transition goes to the `trace` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBackend;

impl KeyboardBackend for LoggingBackend {
    fn send(&self, key: Scancode, action: KeyAction) -> Result<()> {
        trace!("key {} {:?}", key, action);
        Ok(())
    }
}

/// Keeps every transition in memory.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    sent: Mutex<Vec<(Scancode, KeyAction)>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(Scancode, KeyAction)> {
        self.sent.lock().clone()
    }
}

impl KeyboardBackend for RecordingBackend {
    fn send(&self, key: Scancode, action: KeyAction) -> Result<()> {
        self.sent.lock().push((key, action));
        Ok(())
    }
}

/// [`KeyInjector`] that resolves combos to scancodes and drives a backend.
///
/// Modifiers go down in order, the main key is tapped with a short hold, then
/// modifiers come up in reverse order.
#[derive(Debug)]
pub struct ScancodeInjector<B> {
    backend: B,
    hold: Duration,
}

impl<B: KeyboardBackend> ScancodeInjector<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            hold: DEFAULT_HOLD,
        }
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn release_all(&self, held: &[Scancode]) {
        for key in held.iter().rev() {
            if let Err(e) = self.backend.send(*key, KeyAction::Up) {
                warn!("Failed to release {}: {}", key, e);
            }
        }
    }

    fn tap(&self, main: Scancode, held: &mut Vec<Scancode>, combo: &KeyCombo) -> Result<()> {
        for modifier in combo.modifiers() {
            let key = scancode::modifier(*modifier);
            self.backend.send(key, KeyAction::Down)?;
            held.push(key);
        }

        self.backend.send(main, KeyAction::Down)?;
        if !self.hold.is_zero() {
            std::thread::sleep(self.hold);
        }
        self.backend.send(main, KeyAction::Up)
    }
}

impl<B: KeyboardBackend> KeyInjector for ScancodeInjector<B> {
    fn press_combo(&self, combo: &KeyCombo) -> bool {
        let Some(main) = scancode::lookup(combo.main_key()) else {
            debug!("No scancode for key '{}'", combo.main_key());
            return false;
        };

        let mut held = Vec::with_capacity(combo.modifiers().len());
        let result = self.tap(main, &mut held, combo);
        self.release_all(&held);

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to press '{}': {}", combo, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn injector() -> ScancodeInjector<RecordingBackend> {
        ScancodeInjector::new(RecordingBackend::new()).with_hold(Duration::ZERO)
    }

    #[test]
    fn test_plain_key() {
        let injector = injector();
        assert!(injector.press_combo(&KeyCombo::key("a")));
        assert_eq!(
            injector.backend().sent(),
            vec![
                (Scancode::new(0x1E), KeyAction::Down),
                (Scancode::new(0x1E), KeyAction::Up)
            ]
        );
    }

    #[test]
    fn test_modifier_order() {
        let injector = injector();
        assert!(injector.press_combo(&KeyCombo::parse("ctrl+shift+up").unwrap()));
        let ctrl = Scancode::new(0x1D);
        let shift = Scancode::new(0x2A);
        let up = Scancode::extended(0x48);
        assert_eq!(
            injector.backend().sent(),
            vec![
                (ctrl, KeyAction::Down),
                (shift, KeyAction::Down),
                (up, KeyAction::Down),
                (up, KeyAction::Up),
                (shift, KeyAction::Up),
                (ctrl, KeyAction::Up),
            ]
        );
    }

    #[test]
    fn test_unknown_key_presses_nothing() {
        let injector = injector();
        assert!(!injector.press_combo(&KeyCombo::parse("shift+f13").unwrap()));
        assert!(injector.backend().sent().is_empty());
    }

    /// Fails on the n-th send.
    struct FlakyBackend {
        inner: RecordingBackend,
        fail_at: usize,
        count: AtomicUsize,
    }

    impl KeyboardBackend for FlakyBackend {
        fn send(&self, key: Scancode, action: KeyAction) -> Result<()> {
            if self.count.fetch_add(1, Ordering::SeqCst) == self.fail_at {
                return Err(Error::Backend("device gone".into()));
            }
            self.inner.send(key, action)
        }
    }

    #[test]
    fn test_backend_failure_releases_held_modifiers() {
        let injector = ScancodeInjector::new(FlakyBackend {
            inner: RecordingBackend::new(),
            fail_at: 2,
            count: AtomicUsize::new(0),
        })
        .with_hold(Duration::ZERO);

        assert!(!injector.press_combo(&KeyCombo::parse("alt+shift+q").unwrap()));
        let alt = Scancode::new(0x38);
        let shift = Scancode::new(0x2A);
        assert_eq!(
            injector.backend().inner.sent(),
            vec![
                (alt, KeyAction::Down),
                (shift, KeyAction::Down),
                (shift, KeyAction::Up),
                (alt, KeyAction::Up),
            ]
        );
    }
}
