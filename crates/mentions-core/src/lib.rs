//! mentions-core: mention-aware text input engine without framework dependencies.
//!
//! This crate provides:
//! - `MentionModel` - raw text plus active mentions, with derived syntax text
//!   and highlight markup kept in step
//! - `QueryDetector` - trigger character and query detection over typed input
//! - `MentionsInput` - the widget controller, generic over a `TextSurface`
//!   and an `AutoCompleter`
//! - `MentionsRegistry` - explicit ownership of live widget instances

pub mod actions;
pub mod autocomplete;
pub mod config;
pub mod error;
pub mod input;
pub mod insert;
pub mod mention;
pub mod model;
pub mod platform;
pub mod registry;
pub mod render;
pub mod search;
pub mod tasks;
pub mod text;
pub mod trigger;

pub use actions::{EventOutcome, InputEvent, Key};
pub use autocomplete::{AutoCompleter, ItemIcon, ListItem, SimpleAutoCompleter, SimpleOptions};
pub use config::MentionsConfig;
pub use error::{MentionsError, Result};
pub use input::{MentionsInput, MentionsInputBuilder};
pub use insert::{Insertion, resolve_insertion};
pub use mention::{Candidate, Mention, MentionSet};
pub use model::MentionModel;
pub use platform::{CursorState, PlainSurface, PlatformError, TextSurface};
pub use registry::{MentionsRegistry, SessionId};
pub use render::{
    MentionHighlighter, ParsedMessage, RenderedMessage, escape, highlight_term, parse_syntax,
    render, render_highlight, render_syntax,
};
pub use search::{DataSource, RequestMode, Responder, SearchChannel, SearchResponse};
pub use smol_str::SmolStr;
pub use tasks::{Deferred, TaskQueue};
pub use text::{EditorRope, TextBuffer};
pub use trigger::{InputBuffer, QueryDetector, QueryState};
