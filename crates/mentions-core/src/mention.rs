//! Mention records, the ordered mention set, and autocomplete candidates.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A structured reference to an external entity, embedded in free text.
///
/// `value` is the literal display text. The mention stays active only while
/// that text appears verbatim in the raw input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    pub id: SmolStr,
    #[serde(rename = "type")]
    pub kind: SmolStr,
    pub value: SmolStr,
}

impl Mention {
    pub fn new(id: impl Into<SmolStr>, kind: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// The syntax token for this mention: `@[value](type:id)`.
    pub fn syntax(&self) -> String {
        format!("@[{}]({}:{})", self.value, self.kind, self.id)
    }
}

/// Active mentions, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MentionSet {
    mentions: Vec<Mention>,
}

impl MentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mention unless a structurally equal one is already present.
    ///
    /// Returns true if the mention was added.
    pub fn insert(&mut self, mention: Mention) -> bool {
        if self.mentions.contains(&mention) {
            return false;
        }
        self.mentions.push(mention);
        true
    }

    /// Drop every mention whose value no longer occurs in `text`.
    ///
    /// Any edit inside a mention's literal value invalidates the whole
    /// mention. Returns the removed mentions in set order.
    pub fn retain_present(&mut self, text: &str) -> Vec<Mention> {
        let mut removed = Vec::new();
        self.mentions.retain(|mention| {
            let present = !mention.value.is_empty() && text.contains(mention.value.as_str());
            if !present {
                removed.push(mention.clone());
            }
            present
        });
        removed
    }

    /// Whether any active mention has the given display value.
    pub fn contains_value(&self, value: &str) -> bool {
        self.mentions.iter().any(|m| m.value == value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mention> {
        self.mentions.iter()
    }

    pub fn as_slice(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn clear(&mut self) {
        self.mentions.clear();
    }
}

impl<'a> IntoIterator for &'a MentionSet {
    type Item = &'a Mention;
    type IntoIter = std::slice::Iter<'a, Mention>;

    fn into_iter(self) -> Self::IntoIter {
        self.mentions.iter()
    }
}

impl FromIterator<Mention> for MentionSet {
    fn from_iter<I: IntoIterator<Item = Mention>>(iter: I) -> Self {
        let mut set = MentionSet::new();
        for mention in iter {
            set.insert(mention);
        }
        set
    }
}

/// An entity offered by the data source for the autocomplete dropdown.
///
/// Every field is optional on the wire; records without an `id` or `name`
/// are malformed and never become mentions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<SmolStr>,
    #[serde(default)]
    pub name: Option<SmolStr>,
    #[serde(default, rename = "type")]
    pub kind: Option<SmolStr>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<SmolStr>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_well_formed(&self) -> bool {
        let present = |f: &Option<SmolStr>| f.as_ref().is_some_and(|s| !s.is_empty());
        present(&self.id) && present(&self.name)
    }

    /// Convert to a mention, using `default_kind` when the record has no type.
    pub fn to_mention(&self, default_kind: &str) -> Option<Mention> {
        if !self.is_well_formed() {
            return None;
        }
        let kind = match &self.kind {
            Some(kind) if !kind.is_empty() => kind.clone(),
            _ => SmolStr::new(default_kind),
        };
        Some(Mention {
            id: self.id.clone()?,
            kind,
            value: self.name.clone()?,
        })
    }
}

// Data sources commonly hand out numeric ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<SmolStr>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(SmolStr),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => SmolStr::new(number.to_string()),
    }))
}
