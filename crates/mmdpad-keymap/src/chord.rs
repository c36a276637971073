//! Key presses and the chords bindings match against.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Symbols a US layout produces only with shift held.
///
/// Terminals usually report these without the shift flag, so the flag is
/// implied when converting from crossterm.
const SHIFTED_SYMBOLS: &str = "~!@#$%^&*()_+{}|:\"<>?";

/// A single keystroke as delivered by the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub(crate) key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    /// A bare key with no modifiers
    pub fn new(key: impl AsRef<str>) -> Self {
        Self {
            key: key.as_ref().to_lowercase(),
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Lowercased logical key name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when either ctrl or the platform meta key is held
    pub fn ctrl_or_meta(&self) -> bool {
        self.ctrl || self.meta
    }

    /// The printable character this press would insert, if any
    pub fn as_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl From<KeyEvent> for KeyPress {
    fn from(event: KeyEvent) -> Self {
        let modifiers = event.modifiers;
        let (key, implied_shift) = match event.code {
            KeyCode::Char(c) => (c.to_string(), c.is_uppercase() || SHIFTED_SYMBOLS.contains(c)),
            KeyCode::Esc => ("Escape".to_string(), false),
            KeyCode::Enter => ("Enter".to_string(), false),
            KeyCode::Tab => ("Tab".to_string(), false),
            KeyCode::BackTab => ("Tab".to_string(), true),
            KeyCode::Backspace => ("Backspace".to_string(), false),
            KeyCode::Delete => ("Delete".to_string(), false),
            KeyCode::Insert => ("Insert".to_string(), false),
            KeyCode::Home => ("Home".to_string(), false),
            KeyCode::End => ("End".to_string(), false),
            KeyCode::PageUp => ("PageUp".to_string(), false),
            KeyCode::PageDown => ("PageDown".to_string(), false),
            KeyCode::Up => ("ArrowUp".to_string(), false),
            KeyCode::Down => ("ArrowDown".to_string(), false),
            KeyCode::Left => ("ArrowLeft".to_string(), false),
            KeyCode::Right => ("ArrowRight".to_string(), false),
            KeyCode::F(n) => (format!("F{n}"), false),
            _ => ("Unidentified".to_string(), false),
        };

        Self {
            key: key.to_lowercase(),
            ctrl: modifiers.contains(KeyModifiers::CONTROL),
            meta: modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
            shift: modifiers.contains(KeyModifiers::SHIFT) || implied_shift,
            alt: modifiers.contains(KeyModifiers::ALT),
        }
    }
}

/// A key plus the exact set of modifiers that must be held.
///
/// `ctrl` is satisfied by either ctrl or meta on the press.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Chord {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self {
            key: key.as_ref().to_lowercase(),
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Lowercased logical key name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a press satisfies this chord
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.key == press.key
            && self.ctrl == press.ctrl_or_meta()
            && self.shift == press.shift
            && self.alt == press.alt
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => write!(f, "{}", c.to_uppercase()),
            _ => {
                let mut chars = self.key.chars();
                if let Some(first) = chars.next() {
                    write!(f, "{}{}", first.to_uppercase(), chars.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// Error returned when a chord string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChordError {
    input: String,
    reason: &'static str,
}

impl fmt::Display for ParseChordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid chord {:?}: {}", self.input, self.reason)
    }
}

impl Error for ParseChordError {}

impl FromStr for Chord {
    type Err = ParseChordError;

    /// Parse strings like `Ctrl+Shift+Z`, `Shift+?` or `Ctrl++`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseChordError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let (modifiers, key) = if trimmed == "+" {
            ("", "+")
        } else if let Some(rest) = trimmed.strip_suffix("++") {
            (rest, "+")
        } else {
            trimmed.rsplit_once('+').unwrap_or(("", trimmed))
        };

        if key.is_empty() {
            return Err(err("missing key"));
        }

        let mut chord = Chord::new(key);
        for modifier in modifiers.split('+').filter(|m| !m.is_empty()) {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "meta" | "super" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                _ => return Err(err("unknown modifier")),
            }
        }
        Ok(chord)
    }
}
