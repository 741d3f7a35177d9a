//! Autocomplete dropdown capability and the bundled list implementation.
//!
//! The widget only talks to the dropdown through `AutoCompleter`; how the
//! list is drawn is up to the host. `SimpleAutoCompleter` keeps the list
//! state (items, active item, loading flag) and pre-renders item labels.

use crate::config::MentionsConfig;
use crate::mention::Candidate;
use crate::render::{escape, highlight_term};

/// Dropdown operations the widget relies on.
pub trait AutoCompleter {
    /// Called once when the widget is built.
    fn initialize(&mut self, _config: &MentionsConfig) {}

    /// Show `items` for `query`. An empty list hides the dropdown.
    fn populate(&mut self, items: Vec<Candidate>, query: &str);

    fn hide(&mut self);

    fn is_visible(&self) -> bool;

    /// The active item, if the dropdown is visible and has one.
    fn selected_item(&self) -> Option<&Candidate>;

    /// A search was dispatched and results are pending.
    fn loading(&mut self) {}

    /// Move the active item down. Returns true if it moved.
    fn select_next(&mut self) -> bool;

    /// Move the active item up. Returns true if it moved.
    fn select_previous(&mut self) -> bool;
}

/// Leading visual for a dropdown item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemIcon {
    /// Image URL.
    Image(String),
    /// CSS icon class.
    Class(String),
}

impl ItemIcon {
    /// Classify an avatar/icon string: anything with a `/` is an image URL.
    pub fn from_source(source: &str) -> Self {
        if source.contains('/') {
            ItemIcon::Image(source.to_string())
        } else {
            ItemIcon::Class(source.to_string())
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            ItemIcon::Image(url) => format!("<img src=\"{}\" />", escape(url)),
            ItemIcon::Class(class) => format!("<div class=\"{}\"></div>", escape(class)),
        }
    }
}

/// A dropdown row ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub candidate: Candidate,
    /// Escaped name with the query highlighted.
    pub label_html: String,
    pub icon: Option<ItemIcon>,
}

/// Options for `SimpleAutoCompleter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleOptions {
    /// Make the first item active when the list is populated.
    pub select_first_item: bool,
    /// Resolve avatar/icon visuals for each item.
    pub show_avatars: bool,
}

impl Default for SimpleOptions {
    fn default() -> Self {
        Self {
            select_first_item: true,
            show_avatars: true,
        }
    }
}

/// In-memory dropdown list.
#[derive(Debug, Clone, Default)]
pub struct SimpleAutoCompleter {
    options: SimpleOptions,
    items: Vec<ListItem>,
    active: Option<usize>,
    visible: bool,
    loading: bool,
}

impl SimpleAutoCompleter {
    pub fn new(options: SimpleOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Make the item at `index` active.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    fn render_item(&self, candidate: Candidate, query: &str) -> ListItem {
        let name = candidate.name.as_deref().unwrap_or_default();
        let label_html = highlight_term(name, query);
        let icon = if self.options.show_avatars {
            candidate
                .avatar
                .as_deref()
                .or(candidate.icon.as_deref())
                .map(ItemIcon::from_source)
        } else {
            None
        };
        ListItem {
            candidate,
            label_html,
            icon,
        }
    }
}

impl From<&MentionsConfig> for SimpleOptions {
    fn from(config: &MentionsConfig) -> Self {
        Self {
            select_first_item: config.select_first_item,
            show_avatars: config.show_avatars,
        }
    }
}

impl AutoCompleter for SimpleAutoCompleter {
    fn initialize(&mut self, config: &MentionsConfig) {
        self.options = SimpleOptions::from(config);
        self.hide();
    }

    fn populate(&mut self, items: Vec<Candidate>, query: &str) {
        self.loading = false;
        if items.is_empty() {
            self.hide();
            return;
        }
        let rendered: Vec<ListItem> = items
            .into_iter()
            .map(|candidate| self.render_item(candidate, query))
            .collect();
        self.items = rendered;
        self.active = self.options.select_first_item.then_some(0);
        self.visible = true;
    }

    fn hide(&mut self) {
        self.items.clear();
        self.active = None;
        self.visible = false;
        self.loading = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn selected_item(&self) -> Option<&Candidate> {
        if !self.visible {
            return None;
        }
        self.active
            .and_then(|i| self.items.get(i))
            .map(|item| &item.candidate)
    }

    fn loading(&mut self) {
        self.loading = true;
    }

    fn select_next(&mut self) -> bool {
        let next = match self.active {
            Some(i) => i + 1,
            None => 0,
        };
        self.select(next)
    }

    fn select_previous(&mut self) -> bool {
        match self.active {
            Some(i) if i > 0 => self.select(i - 1),
            _ => false,
        }
    }
}
