//! Key-injection seam.

use crate::keymap::KeyCombo;
use parking_lot::Mutex;
use std::sync::Arc;

/// Presses one combo: modifiers in order, main key down/up, modifiers
/// released in reverse.
///
/// Returns `false` when the main key is not recognized. That is a per-note
/// skip, never a run failure.
pub trait KeyInjector: Send + Sync {
    fn press_combo(&self, combo: &KeyCombo) -> bool;
}

impl<T: KeyInjector + ?Sized> KeyInjector for Arc<T> {
    fn press_combo(&self, combo: &KeyCombo) -> bool {
        (**self).press_combo(combo)
    }
}

impl<T: KeyInjector + ?Sized> KeyInjector for Box<T> {
    fn press_combo(&self, combo: &KeyCombo) -> bool {
        (**self).press_combo(combo)
    }
}

/// Records every combo it is asked to press. Always succeeds.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    pressed: Mutex<Vec<KeyCombo>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed(&self) -> Vec<KeyCombo> {
        self.pressed.lock().clone()
    }

    /// Recorded combos rendered as strings, e.g. `["a", "shift+s"]`.
    pub fn pressed_strings(&self) -> Vec<String> {
        self.pressed.lock().iter().map(|c| c.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.pressed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.lock().is_empty()
    }

    pub fn clear(&self) {
        self.pressed.lock().clear();
    }
}

impl KeyInjector for RecordingInjector {
    fn press_combo(&self, combo: &KeyCombo) -> bool {
        self.pressed.lock().push(combo.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let injector = RecordingInjector::new();
        let shared: Arc<dyn KeyInjector> = Arc::new(RecordingInjector::new());
        assert!(shared.press_combo(&KeyCombo::key("q")));

        assert!(injector.press_combo(&KeyCombo::key("a")));
        assert!(injector.press_combo(&KeyCombo::parse("shift+s").unwrap()));
        assert_eq!(injector.pressed_strings(), vec!["a", "shift+s"]);

        injector.clear();
        assert!(injector.is_empty());
    }
}
