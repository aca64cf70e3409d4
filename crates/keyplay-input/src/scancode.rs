//! PC set-1 scancodes for the key names keymaps use.

use keyplay_core::Modifier;
use std::fmt;

/// One set-1 scancode. Extended keys are sent with the `0xE0` prefix flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scancode {
    pub code: u8,
    pub extended: bool,
}

impl Scancode {
    pub const fn new(code: u8) -> Self {
        Self {
            code,
            extended: false,
        }
    }

    pub const fn extended(code: u8) -> Self {
        Self {
            code,
            extended: true,
        }
    }
}

impl fmt::Display for Scancode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extended {
            write!(f, "E0{:02X}", self.code)
        } else {
            write!(f, "{:02X}", self.code)
        }
    }
}

/// Scancode of a main key name (lower-case), `None` if unknown.
pub fn lookup(key: &str) -> Option<Scancode> {
    let code = match key {
        "a" => 0x1E,
        "b" => 0x30,
        "c" => 0x2E,
        "d" => 0x20,
        "e" => 0x12,
        "f" => 0x21,
        "g" => 0x22,
        "h" => 0x23,
        "i" => 0x17,
        "j" => 0x24,
        "k" => 0x25,
        "l" => 0x26,
        "m" => 0x32,
        "n" => 0x31,
        "o" => 0x18,
        "p" => 0x19,
        "q" => 0x10,
        "r" => 0x13,
        "s" => 0x1F,
        "t" => 0x14,
        "u" => 0x16,
        "v" => 0x2F,
        "w" => 0x11,
        "x" => 0x2D,
        "y" => 0x15,
        "z" => 0x2C,
        "1" => 0x02,
        "2" => 0x03,
        "3" => 0x04,
        "4" => 0x05,
        "5" => 0x06,
        "6" => 0x07,
        "7" => 0x08,
        "8" => 0x09,
        "9" => 0x0A,
        "0" => 0x0B,
        "space" => 0x39,
        "enter" => 0x1C,
        "tab" => 0x0F,
        "backspace" => 0x0E,
        "escape" => 0x01,
        "f1" => 0x3B,
        "f2" => 0x3C,
        "f3" => 0x3D,
        "f4" => 0x3E,
        "f5" => 0x3F,
        "f6" => 0x40,
        "f7" => 0x41,
        "f8" => 0x42,
        "f9" => 0x43,
        "f10" => 0x44,
        "f11" => 0x57,
        "f12" => 0x58,
        _ => return lookup_extended(key),
    };
    Some(Scancode::new(code))
}

fn lookup_extended(key: &str) -> Option<Scancode> {
    let code = match key {
        "insert" => 0x52,
        "delete" => 0x53,
        "home" => 0x47,
        "end" => 0x4F,
        "pageup" => 0x49,
        "pagedown" => 0x51,
        "up" => 0x48,
        "down" => 0x50,
        "left" => 0x4B,
        "right" => 0x4D,
        _ => return None,
    };
    Some(Scancode::extended(code))
}

/// Left-hand modifier scancodes.
pub fn modifier(modifier: Modifier) -> Scancode {
    match modifier {
        Modifier::Shift => Scancode::new(0x2A),
        Modifier::Ctrl => Scancode::new(0x1D),
        Modifier::Alt => Scancode::new(0x38),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits() {
        assert_eq!(lookup("a"), Some(Scancode::new(0x1E)));
        assert_eq!(lookup("z"), Some(Scancode::new(0x2C)));
        assert_eq!(lookup("0"), Some(Scancode::new(0x0B)));
        assert_eq!(lookup("f12"), Some(Scancode::new(0x58)));
    }

    #[test]
    fn test_extended_keys() {
        let up = lookup("up").unwrap();
        assert!(up.extended);
        assert_eq!(up.to_string(), "E048");
        assert!(lookup("delete").unwrap().extended);
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(lookup("A"), None);
        assert_eq!(lookup("f13"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(modifier(Modifier::Shift).to_string(), "2A");
        assert_eq!(modifier(Modifier::Ctrl).code, 0x1D);
        assert_eq!(modifier(Modifier::Alt).code, 0x38);
    }
}
