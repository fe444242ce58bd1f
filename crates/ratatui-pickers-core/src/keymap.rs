use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;

pub fn key_event_matches(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    pattern.code == event.code && modifiers_match(pattern.modifiers, event.modifiers)
}

fn modifiers_match(pattern: KeyModifiers, event: KeyModifiers) -> bool {
    pattern.shift == event.shift
        && pattern.ctrl == event.ctrl
        && pattern.alt == event.alt
        && pattern.meta == event.meta
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers::ctrl())
}

pub fn matches_any(patterns: &[KeyEvent], event: &KeyEvent) -> bool {
    patterns.iter().any(|p| key_event_matches(p, event))
}

/// The single modifier a [`Shortcut`] requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Modifier {
    #[default]
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    pub fn is_held(self, modifiers: KeyModifiers) -> bool {
        match self {
            Modifier::Ctrl => modifiers.ctrl,
            Modifier::Alt => modifiers.alt,
            Modifier::Shift => modifiers.shift,
            Modifier::Meta => modifiers.meta,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }
}

impl FromStr for Modifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "alt" | "option" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            "meta" | "cmd" | "super" => Ok(Modifier::Meta),
            _ => Err(ParseError::InvalidModifier(s.to_string())),
        }
    }
}

/// A trigger key held together with one modifier, e.g. `ctrl+k`.
///
/// Letter keys match case-insensitively so that `shift+k` fires whether the terminal reports
/// `k` or `K`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortcut {
    pub key: char,
    pub modifier: Modifier,
}

impl Shortcut {
    pub fn new(key: char, modifier: Modifier) -> Self {
        Self { key, modifier }
    }

    /// Builds a shortcut from a key attribute and an optional modifier attribute.
    pub fn from_parts(key: &str, modifier: Option<&str>) -> Result<Self, ParseError> {
        let mut chars = key.trim().chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(ParseError::InvalidShortcut(key.to_string()));
        };
        let modifier = match modifier {
            Some(m) if !m.trim().is_empty() => m.parse()?,
            _ => Modifier::default(),
        };
        Ok(Self::new(c, modifier))
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let KeyCode::Char(c) = event.code else {
            return false;
        };
        c.eq_ignore_ascii_case(&self.key) && self.modifier.is_held(event.modifiers)
    }
}

impl FromStr for Shortcut {
    type Err = ParseError;

    /// Parses `modifier+key`, or a bare key with the default modifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('+') {
            Some((m, k)) => Self::from_parts(k, Some(m)),
            None => Self::from_parts(s, None),
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.modifier.as_str(), self.key)
    }
}
