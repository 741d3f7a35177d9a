//! Raw text storage.
//!
//! The model and the in-memory surface both edit through `TextBuffer`, so a
//! host can back the model with its own storage. All offsets are char
//! offsets; out-of-range offsets clamp to the end of the text.

use std::ops::Range;

/// Editable text addressed by char offset.
pub trait TextBuffer {
    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    fn insert(&mut self, char_offset: usize, text: &str);

    fn delete(&mut self, char_range: Range<usize>);

    /// Splice `text` over `char_range`.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Replace the entire contents.
    fn set_text(&mut self, text: &str) {
        let len = self.len_chars();
        self.replace(0..len, text);
    }

    fn to_string(&self) -> String;

    /// Char offset of the last occurrence of `needle`.
    fn rfind(&self, needle: &str) -> Option<usize> {
        let text = self.to_string();
        let byte = text.rfind(needle)?;
        Some(text[..byte].chars().count())
    }
}

/// Ropey-backed buffer.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }

    fn clamp(&self, char_range: Range<usize>) -> Range<usize> {
        let len = self.rope.len_chars();
        let end = char_range.end.min(len);
        char_range.start.min(end)..end
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        let char_offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let char_range = self.clamp(char_range);
        self.rope.remove(char_range);
    }

    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let char_range = self.clamp(char_range);
        let start = char_range.start;
        self.rope.remove(char_range);
        self.rope.insert(start, text);
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn rfind(&self, needle: &str) -> Option<usize> {
        let text = self.rope.to_string();
        text.rfind(needle).map(|byte| self.rope.byte_to_char(byte))
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl std::fmt::Debug for EditorRope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EditorRope").field(&self.rope.to_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete() {
        let mut rope = EditorRope::from_str("hi  there");
        rope.insert(3, "Bob");
        assert_eq!(rope.to_string(), "hi Bob there");
        rope.delete(3..7);
        assert_eq!(rope.to_string(), "hi there");
        assert_eq!(rope.len_chars(), 8);
    }

    #[test]
    fn test_replace_query() {
        let mut rope = EditorRope::from_str("Hello @jo");
        rope.replace(6..9, "John Smith");
        assert_eq!(rope.to_string(), "Hello John Smith");
    }

    #[test]
    fn test_set_text() {
        let mut rope = EditorRope::from_str("old contents");
        rope.set_text("new");
        assert_eq!(rope.to_string(), "new");
        rope.set_text("");
        assert!(rope.is_empty());
    }

    #[test]
    fn test_rfind_returns_char_offset() {
        let rope = EditorRope::from_str("é @a é @a");
        assert_eq!(rope.rfind("@a"), Some(7));
        assert_eq!(rope.rfind("@b"), None);
    }

    #[test]
    fn test_default_rfind_matches_rope() {
        struct Plain(String);
        impl TextBuffer for Plain {
            fn len_chars(&self) -> usize {
                self.0.chars().count()
            }
            fn insert(&mut self, _: usize, _: &str) {}
            fn delete(&mut self, _: Range<usize>) {}
            fn to_string(&self) -> String {
                self.0.clone()
            }
        }

        let text = "ü @x and @x";
        assert_eq!(Plain(text.into()).rfind("@x"), EditorRope::from_str(text).rfind("@x"));
    }

    #[test]
    fn test_out_of_range_edits_clamp() {
        let mut rope = EditorRope::from_str("abc");
        rope.insert(10, "d");
        assert_eq!(rope.to_string(), "abcd");
        rope.delete(2..10);
        assert_eq!(rope.to_string(), "ab");
        rope.replace(5..9, "!");
        assert_eq!(rope.to_string(), "ab!");
    }
}
