//! Centralized error type for the keyplay umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] keyplay_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] keyplay_midi::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
