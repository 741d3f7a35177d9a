//! Input events delivered to a mentions input.
//!
//! Platform-agnostic definitions: hosts translate their native keyboard,
//! pointer, and focus events into `InputEvent`s. `Key` only names the keys
//! the widget reacts to; everything else is `Key::Other`.

/// Keys with meaning to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Tab,
    Return,
    Escape,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    /// Any other key, including printable characters.
    Other,
}

impl Key {
    /// Keys that move the caret without editing. On macOS, Cmd+Left/Right
    /// arrive as Home/End.
    pub fn repositions_caret(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft | Self::ArrowRight | Self::Home | Self::End
        )
    }

    /// Map a web `KeyboardEvent.key` value.
    pub fn from_web_key(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Tab" => Self::Tab,
            "Enter" => Self::Return,
            "Escape" | "Esc" => Self::Escape,
            " " | "Spacebar" => Self::Space,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            _ => Self::Other,
        }
    }
}

/// One discrete event from the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down, before the surface applied it.
    KeyDown(Key),
    /// A character was produced by a key press.
    KeyPress(char),
    /// The surface text changed.
    Input,
    /// The surface was clicked (caret may have moved).
    Click,
    /// The surface lost focus.
    Blur,
}

/// What the host should do with the native event after the widget saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOutcome {
    /// Let the surface apply its default behavior.
    #[default]
    Continue,
    /// The widget used the event (dropdown navigation or selection); the
    /// host should suppress the default action.
    Consumed,
}

impl EventOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_web_key() {
        assert_eq!(Key::from_web_key("Enter"), Key::Return);
        assert_eq!(Key::from_web_key(" "), Key::Space);
        assert_eq!(Key::from_web_key("Left"), Key::ArrowLeft);
        assert_eq!(Key::from_web_key("a"), Key::Other);
    }

    #[test]
    fn test_repositions_caret() {
        assert!(Key::Home.repositions_caret());
        assert!(Key::ArrowRight.repositions_caret());
        assert!(!Key::ArrowUp.repositions_caret());
        assert!(!Key::Backspace.repositions_caret());
    }
}
