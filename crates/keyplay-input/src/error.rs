//! Error types for keyboard backends.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Keyboard backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
