//! Error types for the mentions engine.
//!
//! The error surface is small on purpose: text drift and stale search
//! responses are handled inside the engine and never reach callers.

use miette::Diagnostic;

use crate::platform::PlatformError;
use crate::registry::SessionId;

/// Main error type for mentions operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MentionsError {
    /// The widget was built without a candidate data source.
    #[error("no data source configured for mentions input")]
    #[diagnostic(
        code(mentions::config::missing_data_source),
        help("pass a data source to `MentionsInput::builder().data_source(..)`")
    )]
    MissingDataSource,

    /// The trigger character cannot start a query.
    #[error("invalid trigger character {0:?}")]
    #[diagnostic(
        code(mentions::config::trigger_char),
        help("the trigger character must be a single non-whitespace character")
    )]
    InvalidTriggerChar(char),

    /// Configuration document could not be parsed.
    #[error("invalid mentions configuration: {0}")]
    #[diagnostic(code(mentions::config::parse))]
    Config(#[from] serde_json::Error),

    /// Text surface adapter failure.
    #[error(transparent)]
    #[diagnostic(code(mentions::platform))]
    Platform(#[from] PlatformError),

    /// No widget instance is registered under this id.
    #[error("unknown mentions session {0}")]
    #[diagnostic(code(mentions::registry::unknown_session))]
    UnknownSession(SessionId),
}

pub type Result<T, E = MentionsError> = std::result::Result<T, E>;
