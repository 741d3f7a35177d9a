//! The text/mention model.
//!
//! Owns the raw text and the ordered set of active mentions, and keeps the
//! derived syntax text and highlight markup in step with both. Every
//! mutation ends in `render`, which is the only place derived state changes.

use crate::insert::{Insertion, resolve_insertion};
use crate::mention::{Mention, MentionSet};
use crate::render::{MentionHighlighter, RenderedMessage, render};
use crate::text::{EditorRope, TextBuffer};

/// Raw text plus active mentions.
///
/// Generic over the buffer so hosts can back it with their own storage;
/// `EditorRope` is the default.
#[derive(Debug, Clone)]
pub struct MentionModel<T: TextBuffer = EditorRope> {
    buffer: T,
    mentions: MentionSet,
    rendered: RenderedMessage,
    trigger: char,
    space_after_mention: bool,
}

impl Default for MentionModel<EditorRope> {
    fn default() -> Self {
        Self::new(EditorRope::new(), '@', false)
    }
}

impl<T: TextBuffer> MentionModel<T> {
    pub fn new(buffer: T, trigger: char, space_after_mention: bool) -> Self {
        let mut model = Self {
            buffer,
            mentions: MentionSet::new(),
            rendered: RenderedMessage::default(),
            trigger,
            space_after_mention,
        };
        model.render();
        model
    }

    pub fn buffer(&self) -> &T {
        &self.buffer
    }

    /// The raw text.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Active mentions in insertion order.
    pub fn mentions(&self) -> &MentionSet {
        &self.mentions
    }

    /// The last rendered syntax text and highlight markup.
    pub fn rendered(&self) -> &RenderedMessage {
        &self.rendered
    }

    /// Replace the raw text, then synchronize and re-render.
    pub fn set_text(&mut self, text: &str) {
        self.set_text_with(text, &());
    }

    pub fn set_text_with<H: MentionHighlighter + ?Sized>(&mut self, text: &str, highlighter: &H) {
        if self.buffer.to_string() != text {
            self.buffer.set_text(text);
        }
        self.synchronize();
        self.render_with(highlighter);
    }

    /// Drop mentions whose value is no longer present in the raw text.
    ///
    /// Returns the number of mentions removed.
    pub fn synchronize(&mut self) -> usize {
        let text = self.buffer.to_string();
        let removed = self.mentions.retain_present(&text);
        for mention in &removed {
            tracing::debug!(
                target: "mentions::model",
                id = %mention.id,
                kind = %mention.kind,
                value = %mention.value,
                "mention text edited away, dropping mention"
            );
        }
        removed.len()
    }

    /// Splice `mention` into the text and record it.
    ///
    /// With a query, the most recent `trigger + query` in the text is
    /// replaced; without one (or if that text cannot be found) the value is
    /// inserted at `caret`. A structurally equal mention is not added twice,
    /// but its text is still inserted.
    pub fn add_mention(&mut self, mention: Mention, query: Option<&str>, caret: usize) -> Insertion {
        self.add_mention_with(mention, query, caret, &())
    }

    pub fn add_mention_with<H: MentionHighlighter + ?Sized>(
        &mut self,
        mention: Mention,
        query: Option<&str>,
        caret: usize,
        highlighter: &H,
    ) -> Insertion {
        let insertion = query
            .and_then(|q| {
                resolve_insertion(
                    &self.buffer,
                    q,
                    &mention.value,
                    self.trigger,
                    self.space_after_mention,
                )
            })
            .unwrap_or_else(|| {
                let caret = caret.min(self.buffer.len_chars());
                Insertion::at_caret(caret, &mention.value, self.space_after_mention)
            });

        insertion.apply(&mut self.buffer);
        tracing::debug!(
            target: "mentions::model",
            start = insertion.start,
            end = insertion.end,
            caret = insertion.caret_after,
            value = %mention.value,
            "inserted mention"
        );

        self.mentions.insert(mention);
        self.render_with(highlighter);
        insertion
    }

    /// Recompute the syntax text and highlight markup.
    pub fn render(&mut self) -> &RenderedMessage {
        self.render_with(&())
    }

    pub fn render_with<H: MentionHighlighter + ?Sized>(&mut self, highlighter: &H) -> &RenderedMessage {
        let text = self.buffer.to_string();
        self.rendered = render(&text, &self.mentions, highlighter);
        tracing::trace!(
            target: "mentions::model",
            mentions = self.mentions.len(),
            syntax_len = self.rendered.syntax.len(),
            "rendered"
        );
        &self.rendered
    }

    /// The message for consumers.
    ///
    /// Syntax-encoded when at least one mention is active, otherwise the
    /// trimmed raw text.
    pub fn value(&self) -> String {
        if self.mentions.is_empty() {
            self.buffer.to_string().trim().to_string()
        } else {
            self.rendered.syntax.clone()
        }
    }

    /// Clear text and mentions, then re-render.
    pub fn reset(&mut self) {
        self.reset_with(&());
    }

    pub fn reset_with<H: MentionHighlighter + ?Sized>(&mut self, highlighter: &H) {
        self.buffer.set_text("");
        self.mentions.clear();
        self.render_with(highlighter);
    }
}
