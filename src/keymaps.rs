//! Keymap file loading.

use crate::Result;
use keyplay_core::KeymapSet;
use std::path::Path;
use tracing::info;

pub const KEYMAP_FILE: &str = "keymap.json";

/// Read a `{"name": {"60": "a", ...}}` keymap file.
///
/// Unlike settings, a missing or malformed keymap file is an error: there is
/// nothing sensible to play without one.
pub fn load_keymaps(path: impl AsRef<Path>) -> Result<KeymapSet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let keymaps: KeymapSet = serde_json::from_str(&content)?;
    info!("Loaded {} keymaps from {}", keymaps.len(), path.display());
    Ok(keymaps)
}
