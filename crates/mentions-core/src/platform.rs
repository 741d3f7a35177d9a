//! Text-surface adapter between the engine and the editable widget.
//!
//! The engine never touches a real text field. Everything it needs from one
//! (reading and writing the text, reading and placing the caret, taking
//! focus) goes through `TextSurface`, so platform-specific caret handling
//! lives entirely in the adapter implementation.

use crate::text::{EditorRope, TextBuffer};

/// Caret of a text surface, as a char offset.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    pub offset: usize,
    pub focused: bool,
}

impl CursorState {
    /// Unfocused caret at `offset`.
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            focused: false,
        }
    }

    pub fn clamped(self, len: usize) -> Self {
        Self {
            offset: self.offset.min(len),
            ..self
        }
    }
}

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Platform-specific text and caret operations.
///
/// Implementations wrap whatever editable surface the host renders (a DOM
/// textarea, a terminal line editor, a native text view). Offsets are char
/// offsets into `text()`.
pub trait TextSurface {
    /// Current contents of the editable surface.
    fn text(&self) -> String;

    /// Replace the contents of the editable surface.
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError>;

    /// Current caret offset.
    fn caret(&self) -> usize;

    /// Place a collapsed caret at `offset`.
    fn set_caret(&mut self, offset: usize) -> Result<(), PlatformError>;

    /// Return input focus to the surface.
    fn focus(&mut self) -> Result<(), PlatformError>;
}

/// In-memory text surface.
///
/// Used by hosts without a native text field and by tests. The typing
/// helpers only edit the surface; the caller is still responsible for
/// delivering the matching key and input events to the widget.
#[derive(Debug, Clone, Default)]
pub struct PlainSurface {
    buffer: EditorRope,
    cursor: CursorState,
}

impl PlainSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface holding `text` with the caret at the end.
    pub fn with_text(text: &str) -> Self {
        let buffer = EditorRope::from_str(text);
        let cursor = CursorState::new(buffer.len_chars());
        Self { buffer, cursor }
    }

    pub fn buffer(&self) -> &EditorRope {
        &self.buffer
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.cursor.focused
    }

    /// Insert `text` at the caret and advance past it.
    pub fn type_str(&mut self, text: &str) {
        let at = self.cursor.offset;
        self.buffer.insert(at, text);
        self.cursor.offset = at + text.chars().count();
    }

    /// Delete the char before the caret. Returns false at offset 0.
    pub fn backspace(&mut self) -> bool {
        let at = self.cursor.offset;
        if at == 0 {
            return false;
        }
        self.buffer.delete(at - 1..at);
        self.cursor.offset = at - 1;
        true
    }

    /// Move the caret by `delta` chars, clamped to the text.
    pub fn move_caret(&mut self, delta: isize) {
        let target = self.cursor.offset.saturating_add_signed(delta);
        self.cursor.offset = target.min(self.buffer.len_chars());
    }

    pub fn blur(&mut self) {
        self.cursor.focused = false;
    }
}

impl TextSurface for PlainSurface {
    fn text(&self) -> String {
        self.buffer.to_string()
    }

    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        self.buffer.set_text(text);
        self.cursor = self.cursor.clamped(self.buffer.len_chars());
        Ok(())
    }

    fn caret(&self) -> usize {
        self.cursor.offset
    }

    fn set_caret(&mut self, offset: usize) -> Result<(), PlatformError> {
        self.cursor.offset = offset.min(self.buffer.len_chars());
        Ok(())
    }

    fn focus(&mut self) -> Result<(), PlatformError> {
        self.cursor.focused = true;
        Ok(())
    }
}
