//! Keymaps: note number → key combo tables.
//!
//! A [`Keymap`] is immutable once built and remembers the order its entries were
//! defined in. That order is observable: [`Keymap::lookup_nearest`] breaks
//! distance ties in favour of the entry defined first, which is how keymaps
//! loaded from JSON have always behaved.
//!
//! Keymap files look like:
//!
//! ```json
//! {
//!     "Lyre": { "60": "a", "62": "s", "64": "d", "65": "shift+f" },
//!     "Drums": { "36": "z", "38": "x" }
//! }
//! ```

use crate::error::{Error, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Highest MIDI note number.
pub const MAX_NOTE: u8 = 127;

/// Modifier key held while the main key of a combo is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
}

impl Modifier {
    /// Recognize a lower-cased combo token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "shift" => Some(Modifier::Shift),
            "ctrl" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero or more modifiers plus exactly one main key, e.g. `shift+z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
    modifiers: Vec<Modifier>,
    key: String,
}

impl KeyCombo {
    /// Single key without modifiers.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            modifiers: Vec::new(),
            key: key.into().to_lowercase(),
        }
    }

    pub fn with_modifiers(modifiers: Vec<Modifier>, key: impl Into<String>) -> Self {
        Self {
            modifiers,
            key: key.into().to_lowercase(),
        }
    }

    /// Parse `"modifier+modifier+key"` syntax.
    ///
    /// Tokens are lower-cased and trimmed. `shift`, `ctrl` and `alt` are
    /// modifiers and keep their order; the last remaining token is the main key.
    pub fn parse(combo: &str) -> Result<Self> {
        let lowered = combo.to_lowercase();
        let mut modifiers = Vec::new();
        let mut key = None;

        for token in lowered.split('+').map(str::trim) {
            match Modifier::from_token(token) {
                Some(modifier) => modifiers.push(modifier),
                None => key = Some(token),
            }
        }

        match key {
            Some(key) if !key.is_empty() => Ok(Self {
                modifiers,
                key: key.to_string(),
            }),
            _ => Err(Error::InvalidCombo {
                combo: combo.to_string(),
                reason: "missing main key",
            }),
        }
    }

    /// Modifiers in press order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Main key identifier (lower-case).
    pub fn main_key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        f.write_str(&self.key)
    }
}

impl std::str::FromStr for KeyCombo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}

/// Immutable note → combo table with a derived `[min_key, max_key]` range.
#[derive(Debug, Clone, PartialEq)]
pub struct Keymap {
    name: Option<String>,
    /// Entries in definition order.
    entries: Vec<(u8, KeyCombo)>,
    /// Note number → index into `entries`.
    slots: [Option<usize>; MAX_NOTE as usize + 1],
    min_key: u8,
    max_key: u8,
}

impl Keymap {
    /// Build a keymap from entries in definition order.
    ///
    /// A note that appears twice keeps its first position and takes the last
    /// combo. Fails on an empty table or a note above 127.
    pub fn new(entries: impl IntoIterator<Item = (u8, KeyCombo)>) -> Result<Self> {
        let mut ordered: Vec<(u8, KeyCombo)> = Vec::new();
        let mut slots: [Option<usize>; MAX_NOTE as usize + 1] = [None; MAX_NOTE as usize + 1];

        for (note, combo) in entries {
            if note > MAX_NOTE {
                return Err(Error::InvalidKeymap(format!(
                    "note {} is outside 0-{}",
                    note, MAX_NOTE
                )));
            }
            match slots[note as usize] {
                Some(idx) => ordered[idx].1 = combo,
                None => {
                    slots[note as usize] = Some(ordered.len());
                    ordered.push((note, combo));
                }
            }
        }

        let min_key = ordered.iter().map(|(n, _)| *n).min();
        let max_key = ordered.iter().map(|(n, _)| *n).max();
        match (min_key, max_key) {
            (Some(min_key), Some(max_key)) => Ok(Self {
                name: None,
                entries: ordered,
                slots,
                min_key,
                max_key,
            }),
            _ => Err(Error::InvalidKeymap("keymap has no entries".to_string())),
        }
    }

    /// Build from `(note, "combo")` pairs.
    pub fn from_strings<'a>(entries: impl IntoIterator<Item = (u8, &'a str)>) -> Result<Self> {
        let parsed = entries
            .into_iter()
            .map(|(note, combo)| Ok((note, KeyCombo::parse(combo)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(parsed)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `(min_key, max_key)`.
    pub fn range(&self) -> (u8, u8) {
        (self.min_key, self.max_key)
    }

    pub fn min_key(&self) -> u8 {
        self.min_key
    }

    pub fn max_key(&self) -> u8 {
        self.max_key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed keymap.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &KeyCombo)> {
        self.entries.iter().map(|(note, combo)| (*note, combo))
    }

    /// Mapped notes in ascending numeric order.
    pub fn notes_ascending(&self) -> Vec<u8> {
        (0..=MAX_NOTE)
            .filter(|n| self.slots[*n as usize].is_some())
            .collect()
    }

    /// Exact entry for `note`, if mapped.
    pub fn lookup_exact(&self, note: i32) -> Option<&KeyCombo> {
        if !(0..=MAX_NOTE as i32).contains(&note) {
            return None;
        }
        self.slots[note as usize].map(|idx| &self.entries[idx].1)
    }

    /// Entry with minimal `|mapped - note|`.
    ///
    /// Ties go to the entry defined first, not to the lower note number.
    pub fn lookup_nearest(&self, note: i32) -> &KeyCombo {
        let mut best = &self.entries[0];
        let mut best_distance = (best.0 as i32 - note).abs();
        for entry in &self.entries[1..] {
            let distance = (entry.0 as i32 - note).abs();
            if distance < best_distance {
                best = entry;
                best_distance = distance;
            }
        }
        &best.1
    }

    /// Exact lookup falling back to nearest.
    pub fn resolve(&self, note: i32) -> &KeyCombo {
        self.lookup_exact(note)
            .unwrap_or_else(|| self.lookup_nearest(note))
    }
}

/// Raw `{"note": "combo"}` object in document order.
struct KeymapEntries(Vec<(u8, KeyCombo)>);

fn parse_note(raw: &str) -> Result<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|n| *n <= MAX_NOTE)
        .ok_or_else(|| Error::InvalidKeymap(format!("'{}' is not a note number 0-127", raw)))
}

impl<'de> Deserialize<'de> for KeymapEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = KeymapEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of MIDI note numbers to key combos")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((note, combo)) = access.next_entry::<String, KeyCombo>()? {
                    let note = parse_note(&note).map_err(de::Error::custom)?;
                    entries.push((note, combo));
                }
                Ok(KeymapEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl<'de> Deserialize<'de> for Keymap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let KeymapEntries(entries) = KeymapEntries::deserialize(deserializer)?;
        Keymap::new(entries).map_err(de::Error::custom)
    }
}

/// Named keymaps in document order.
#[derive(Debug, Clone, Default)]
pub struct KeymapSet {
    keymaps: Vec<(String, Arc<Keymap>)>,
}

impl KeymapSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. A replaced keymap keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, keymap: Keymap) {
        let name = name.into();
        let keymap = Arc::new(keymap.with_name(name.clone()));
        match self.keymaps.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = keymap,
            None => self.keymaps.push((name, keymap)),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<Keymap>> {
        self.keymaps
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, keymap)| Arc::clone(keymap))
            .ok_or_else(|| Error::KeymapNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keymaps.iter().any(|(n, _)| n == name)
    }

    /// Keymap names in document order.
    pub fn names(&self) -> Vec<&str> {
        self.keymaps.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.keymaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keymaps.is_empty()
    }
}

impl<'de> Deserialize<'de> for KeymapSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = KeymapSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of keymap names to keymaps")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut set = KeymapSet::new();
                while let Some((name, KeymapEntries(entries))) =
                    access.next_entry::<String, KeymapEntries>()?
                {
                    if entries.is_empty() {
                        warn!("Skipping empty keymap '{}'", name);
                        continue;
                    }
                    let keymap = Keymap::new(entries).map_err(de::Error::custom)?;
                    set.insert(name, keymap);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}
