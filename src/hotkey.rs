/// Element that had focus when a key event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Page,
    Input,
    TextArea,
    Select,
    ContentEditable,
}

impl FocusTarget {
    /// Map an element tag name (any case) to a focus target.
    pub fn from_tag(tag: &str, is_content_editable: bool) -> Self {
        if is_content_editable {
            return Self::ContentEditable;
        }
        match tag.to_ascii_uppercase().as_str() {
            "INPUT" => Self::Input,
            "TEXTAREA" => Self::TextArea,
            "SELECT" => Self::Select,
            "CONTENTEDITABLE" => Self::ContentEditable,
            _ => Self::Page,
        }
    }

    /// Typing into form fields must never trigger playback commands.
    pub fn is_editable(self) -> bool {
        !matches!(self, Self::Page)
    }
}

/// A key press as reported by the page: the physical key code (`KeyA`,
/// `Digit5`, `Space`, ...) and where focus was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub code: String,
    pub target: FocusTarget,
}

impl KeyInput {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target: FocusTarget::Page,
        }
    }

    pub fn in_target(mut self, target: FocusTarget) -> Self {
        self.target = target;
        self
    }
}

/// Short label for a key code, e.g. `KeyA` -> `A`, `Digit5` -> `5`.
pub fn format_key_code(code: &str) -> &str {
    if let Some(rest) = code.strip_prefix("Key") {
        return rest;
    }
    if let Some(rest) = code.strip_prefix("Digit") {
        return rest;
    }
    code
}

/// Modifier-only presses (`ShiftLeft`, `MetaRight`, `Alt`, ...) never map to
/// an action.
pub fn is_modifier_key(code: &str) -> bool {
    let base = code
        .strip_suffix("Left")
        .or_else(|| code.strip_suffix("Right"))
        .unwrap_or(code);
    matches!(base, "Shift" | "Control" | "Alt" | "Meta" | "AltGraph")
}

/// Parse a user-written key name like `a`, `5`, `space` or `F2` into a key
/// code. Already canonical codes are returned unchanged.
pub fn parse_key_code(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_ascii_uppercase();
    let code = match upper.as_str() {
        "SPACE" => "Space".to_string(),
        "TAB" => "Tab".to_string(),
        "ENTER" | "RETURN" => "Enter".to_string(),
        "ESC" | "ESCAPE" => "Escape".to_string(),
        "BACKSPACE" => "Backspace".to_string(),
        "HOME" => "Home".to_string(),
        "END" => "End".to_string(),
        "PAGEUP" => "PageUp".to_string(),
        "PAGEDOWN" => "PageDown".to_string(),
        "LEFT" | "ARROWLEFT" => "ArrowLeft".to_string(),
        "RIGHT" | "ARROWRIGHT" => "ArrowRight".to_string(),
        "UP" | "ARROWUP" => "ArrowUp".to_string(),
        "DOWN" | "ARROWDOWN" => "ArrowDown".to_string(),
        "COMMA" | "," => "Comma".to_string(),
        "PERIOD" | "." => "Period".to_string(),
        "SLASH" | "/" => "Slash".to_string(),
        "SEMICOLON" | ";" => "Semicolon".to_string(),
        "MINUS" | "-" => "Minus".to_string(),
        "EQUAL" | "=" => "Equal".to_string(),
        _ if upper.len() > 1 && upper.starts_with('F') => {
            let n = upper[1..].parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            format!("F{n}")
        }
        _ if upper.len() == 4 && upper.starts_with("KEY") => {
            return parse_key_code(&upper[3..]);
        }
        _ if upper.len() == 6 && upper.starts_with("DIGIT") => {
            return parse_key_code(&upper[5..]);
        }
        _ if upper.len() == 1 => {
            let c = upper.chars().next()?;
            if c.is_ascii_digit() {
                format!("Digit{c}")
            } else if c.is_ascii_alphabetic() {
                format!("Key{c}")
            } else {
                return None;
            }
        }
        _ => return None,
    };
    Some(code)
}
