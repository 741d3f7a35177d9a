//! Widget configuration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{MentionsError, Result};
use crate::mention::Mention;

/// Options recognized by a mentions input.
///
/// Deserializes from camelCase JSON; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentionsConfig {
    /// Character that starts a mention query.
    pub trigger_char: char,
    /// Minimum query length before the data source is asked for candidates.
    pub min_chars: usize,
    /// Insert a single space after a newly placed mention.
    pub insert_space_after_mention: bool,
    /// Clear the text and mentions when the widget is created.
    pub reset_on_initialize: bool,
    /// Mention inserted right after creation.
    pub prefill_mention: Option<Mention>,
    /// Type given to candidates that arrive without one.
    pub default_mention_type: SmolStr,
    /// Make the first dropdown item active when results arrive.
    pub select_first_item: bool,
    /// Render avatars/icons next to dropdown items.
    pub show_avatars: bool,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            trigger_char: '@',
            min_chars: 2,
            insert_space_after_mention: false,
            reset_on_initialize: false,
            prefill_mention: None,
            default_mention_type: SmolStr::new_static("contact"),
            select_first_item: true,
            show_avatars: true,
        }
    }
}

impl MentionsConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject options the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.trigger_char.is_whitespace() || self.trigger_char.is_control() {
            return Err(MentionsError::InvalidTriggerChar(self.trigger_char));
        }
        Ok(())
    }
}
