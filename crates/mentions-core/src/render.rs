//! Syntax and highlight rendering.
//!
//! Both outputs are pure functions of (raw text, ordered mention set):
//! - the syntax text replaces each mention's literal value with its
//!   `@[value](type:id)` token, and is what consumers receive as the message
//! - the highlight markup is the escaped syntax text with every token swapped
//!   for a highlighted span, for display in the overlay behind the input
//!
//! Replacement is literal and goes mention by mention in set order. A value
//! that is a substring of another mention's value (or of a token produced
//! earlier in the pass) can therefore be replaced in the wrong place.

use std::sync::OnceLock;

use markdown_weaver_escape::escape_html;
use regex::Regex;
use serde::Serialize;

use crate::mention::{Mention, MentionSet};

/// Renders the highlighted span for one mention in the overlay.
pub trait MentionHighlighter {
    /// Produce markup for `mention`. `escaped_value` is already HTML-escaped.
    fn highlight(&self, mention: &Mention, escaped_value: &str) -> String;
}

/// Unit type implementation - the stock `<strong><span>` template.
impl MentionHighlighter for () {
    fn highlight(&self, _mention: &Mention, escaped_value: &str) -> String {
        format!("<strong><span>{escaped_value}</span></strong>")
    }
}

impl<T: MentionHighlighter + ?Sized> MentionHighlighter for &T {
    fn highlight(&self, mention: &Mention, escaped_value: &str) -> String {
        (*self).highlight(mention, escaped_value)
    }
}

impl<T: MentionHighlighter> MentionHighlighter for Option<T> {
    fn highlight(&self, mention: &Mention, escaped_value: &str) -> String {
        match self {
            Some(h) => h.highlight(mention, escaped_value),
            None => ().highlight(mention, escaped_value),
        }
    }
}

/// Both derived representations of the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    /// Raw text with mention values replaced by syntax tokens.
    pub syntax: String,
    /// Escaped overlay markup with highlighted mentions.
    pub highlight: String,
}

/// HTML-escape `text`, including single quotes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    if out.contains('\'') {
        out = out.replace('\'', "&#39;");
    }
    out
}

/// Replace the first remaining occurrence of each mention value with its token.
pub fn render_syntax(text: &str, mentions: &MentionSet) -> String {
    let mut syntax = text.to_string();
    for mention in mentions {
        if mention.value.is_empty() {
            continue;
        }
        syntax = syntax.replacen(mention.value.as_str(), &mention.syntax(), 1);
    }
    syntax
}

/// Turn syntax text into overlay markup.
pub fn render_highlight<H: MentionHighlighter + ?Sized>(
    syntax: &str,
    mentions: &MentionSet,
    highlighter: &H,
) -> String {
    let mut markup = escape(syntax);
    for mention in mentions {
        if mention.value.is_empty() {
            continue;
        }
        let escaped_token = escape(&mention.syntax());
        let escaped_value = escape(&mention.value);
        let span = highlighter.highlight(mention, &escaped_value);
        markup = markup.replacen(&escaped_token, &span, 1);
    }

    // Single pass: three or more spaces are only partly converted.
    markup.replace('\n', "<br />").replace("  ", "&nbsp; ")
}

/// Render both representations.
pub fn render<H: MentionHighlighter + ?Sized>(
    text: &str,
    mentions: &MentionSet,
    highlighter: &H,
) -> RenderedMessage {
    let syntax = render_syntax(text, mentions);
    let highlight = render_highlight(&syntax, mentions, highlighter);
    RenderedMessage { syntax, highlight }
}

/// A syntax-encoded message decoded back into plain text and mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedMessage {
    pub text: String,
    pub mentions: MentionSet,
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"@\[([^\]]*)\]\(([^:)]*):([^)]*)\)").expect("mention token regex is valid")
    })
}

/// Decode a syntax-encoded message.
///
/// Every `@[value](type:id)` token is replaced by its value, and the mentions
/// are collected in order of first appearance.
pub fn parse_syntax(message: &str) -> ParsedMessage {
    let mut mentions = MentionSet::new();
    let text = token_regex()
        .replace_all(message, |caps: &regex::Captures| {
            let value = &caps[1];
            mentions.insert(Mention::new(&caps[3], &caps[2], value));
            value.to_string()
        })
        .into_owned();
    ParsedMessage { text, mentions }
}

/// Escape a dropdown label and wrap case-insensitive matches of `term` in `<b>`.
pub fn highlight_term(label: &str, term: &str) -> String {
    if term.is_empty() {
        return escape(label);
    }
    let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(term))) else {
        return escape(label);
    };

    let mut out = String::with_capacity(label.len() + 8);
    let mut last = 0;
    for m in re.find_iter(label) {
        out.push_str(&escape(&label[last..m.start()]));
        out.push_str("<b>");
        out.push_str(&escape(m.as_str()));
        out.push_str("</b>");
        last = m.end();
    }
    out.push_str(&escape(&label[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(mentions: &[Mention]) -> MentionSet {
        mentions.iter().cloned().collect()
    }

    #[test]
    fn test_render_syntax() {
        let mentions = set(&[Mention::new("1", "user", "Bob")]);
        assert_eq!(
            render_syntax("Hi Bob there", &mentions),
            "Hi @[Bob](user:1) there"
        );
    }

    #[test]
    fn test_render_syntax_replaces_first_occurrence_only() {
        let mentions = set(&[Mention::new("1", "user", "Bob")]);
        assert_eq!(render_syntax("Bob and Bob", &mentions), "@[Bob](user:1) and Bob");
    }

    #[test]
    fn test_render_syntax_follows_set_order() {
        let mentions = set(&[
            Mention::new("2", "user", "Carol"),
            Mention::new("1", "user", "Bob"),
        ]);
        assert_eq!(
            render_syntax("Bob, Carol", &mentions),
            "@[Bob](user:1), @[Carol](user:2)"
        );
    }

    #[test]
    fn test_render_highlight() {
        let mentions = set(&[Mention::new("1", "user", "Bob")]);
        let rendered = render("Hi Bob\nbye", &mentions, &());
        insta::assert_snapshot!(rendered.highlight, @"Hi <strong><span>Bob</span></strong><br />bye");
    }

    #[test]
    fn test_escaping_only_in_markup() {
        let mentions = set(&[Mention::new("5", "team", "R&D <core>")]);
        let rendered = render("ping R&D <core> now", &mentions, &());
        assert_eq!(rendered.syntax, "ping @[R&D <core>](team:5) now");
        insta::assert_snapshot!(
            rendered.highlight,
            @"ping <strong><span>R&amp;D &lt;core&gt;</span></strong> now"
        );
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let rendered = render("a < b & c", &MentionSet::new(), &());
        assert_eq!(rendered.syntax, "a < b & c");
        assert_eq!(rendered.highlight, "a &lt; b &amp; c");
    }

    #[test]
    fn test_single_quotes_are_escaped() {
        let mentions = set(&[Mention::new("2", "user", "Dara O'Neil")]);
        let rendered = render("cc Dara O'Neil, it's done", &mentions, &());
        assert_eq!(rendered.syntax, "cc @[Dara O'Neil](user:2), it's done");
        insta::assert_snapshot!(
            rendered.highlight,
            @"cc <strong><span>Dara O&#39;Neil</span></strong>, it&#39;s done"
        );
    }

    #[test]
    fn test_double_space_normalization() {
        let rendered = render("a  b   c", &MentionSet::new(), &());
        assert_eq!(rendered.highlight, "a&nbsp; b&nbsp;  c");
    }

    #[test]
    fn test_custom_highlighter() {
        struct Linker;
        impl MentionHighlighter for Linker {
            fn highlight(&self, mention: &Mention, escaped_value: &str) -> String {
                format!("<a data-id=\"{}\">{escaped_value}</a>", mention.id)
            }
        }

        let mentions = set(&[Mention::new("9", "user", "Eve")]);
        let rendered = render("Eve", &mentions, &Linker);
        assert_eq!(rendered.highlight, "<a data-id=\"9\">Eve</a>");

        let none: Option<Linker> = None;
        assert_eq!(
            render("Eve", &mentions, &none).highlight,
            "<strong><span>Eve</span></strong>"
        );
    }

    #[test]
    fn test_overlapping_values_follow_set_order() {
        // "Ann" is replaced first and lands inside "Annabel".
        let mentions = set(&[
            Mention::new("1", "user", "Ann"),
            Mention::new("2", "user", "Annabel"),
        ]);
        let syntax = render_syntax("Annabel and Ann", &mentions);
        assert_eq!(syntax, "@[Ann](user:1)abel and Ann");
    }

    #[test]
    fn test_parse_syntax_round_trip() {
        let mention = Mention::new("1", "user", "Bob");
        let raw = "Hi Bob there";
        let syntax = render_syntax(raw, &set(&[mention.clone()]));

        let parsed = parse_syntax(&syntax);
        assert_eq!(parsed.text, raw);
        assert_eq!(parsed.mentions.as_slice(), &[mention]);
    }

    #[test]
    fn test_parse_syntax_multiple() {
        let parsed = parse_syntax("@[Ann](user:1) met @[rust](tag:t:9) and @[Ann](user:1)");
        assert_eq!(parsed.text, "Ann met rust and Ann");
        assert_eq!(
            parsed.mentions.as_slice(),
            &[Mention::new("1", "user", "Ann"), Mention::new("t:9", "tag", "rust")]
        );
    }

    #[test]
    fn test_highlight_term() {
        assert_eq!(highlight_term("John Johnson", "john"), "<b>John</b> <b>John</b>son");
        assert_eq!(highlight_term("A&B", "b"), "A&amp;<b>B</b>");
        assert_eq!(highlight_term("a.b", "."), "a<b>.</b>b");
        assert_eq!(highlight_term("x<y", ""), "x&lt;y");
    }
}
