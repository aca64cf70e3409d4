//! Integration test modules for keyplay

pub mod playback;
pub mod player;
pub mod settings;
