//! Splice computation for placing a selected mention into the raw text.

use smol_str::SmolStr;

use crate::text::TextBuffer;

/// A resolved splice: replace `start..end` with `replacement`, then put the
/// caret at `caret_after`. All offsets are char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub start: usize,
    pub end: usize,
    pub caret_after: usize,
    pub replacement: SmolStr,
}

impl Insertion {
    /// Insertion at a bare caret position, replacing nothing.
    pub fn at_caret(offset: usize, value: &str, trailing_space: bool) -> Self {
        Self::build(offset, offset, value, trailing_space)
    }

    fn build(start: usize, end: usize, value: &str, trailing_space: bool) -> Self {
        let mut replacement = value.to_string();
        if trailing_space {
            replacement.push(' ');
        }
        let caret_after = start + replacement.chars().count();
        Self {
            start,
            end,
            caret_after,
            replacement: SmolStr::new(replacement),
        }
    }

    /// Apply the splice to a buffer.
    pub fn apply<B: TextBuffer + ?Sized>(&self, buffer: &mut B) {
        buffer.replace(self.start..self.end, &self.replacement);
    }

    /// Apply the splice to a plain string.
    pub fn apply_to_str(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let start = self.start.min(chars.len());
        let end = self.end.clamp(start, chars.len());
        let mut out: String = chars[..start].iter().collect();
        out.push_str(&self.replacement);
        out.extend(&chars[end..]);
        out
    }
}

/// Find where `trigger + query` was typed and compute the splice that
/// replaces it with `value`.
///
/// The most recent (last) occurrence wins. The caret position at selection
/// time is not consulted. Returns `None` when the query text is not present.
pub fn resolve_insertion<B: TextBuffer + ?Sized>(
    text: &B,
    query: &str,
    value: &str,
    trigger: char,
    trailing_space: bool,
) -> Option<Insertion> {
    let mut needle = String::with_capacity(query.len() + trigger.len_utf8());
    needle.push(trigger);
    needle.push_str(query);

    let start = text.rfind(&needle)?;
    let end = start + needle.chars().count();
    Some(Insertion::build(start, end, value, trailing_space))
}
