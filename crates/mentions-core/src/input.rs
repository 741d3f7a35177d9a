//! The mentions input widget.
//!
//! `MentionsInput` ties the pieces together: it receives host events, keeps
//! the query detector and the text/mention model in step with the surface,
//! dispatches searches to the data source, and feeds results to the
//! dropdown.
//!
//! A keystroke arrives as `KeyDown`, `KeyPress`, `Input`. Deferred tasks
//! queued while handling it run once it has settled: after `Input` (or
//! `Click`/`Blur`), or at the latest before the next `KeyDown`. Hosts that
//! receive keys without a following input event call `flush` when idle.

use smol_str::SmolStr;

use crate::actions::{EventOutcome, InputEvent, Key};
use crate::autocomplete::{AutoCompleter, SimpleAutoCompleter};
use crate::config::MentionsConfig;
use crate::error::{MentionsError, Result};
use crate::insert::Insertion;
use crate::mention::{Candidate, Mention, MentionSet};
use crate::model::MentionModel;
use crate::platform::TextSurface;
use crate::render::{MentionHighlighter, RenderedMessage};
use crate::search::{DataSource, RequestMode, SearchChannel};
use crate::tasks::{Deferred, TaskQueue};
use crate::text::EditorRope;
use crate::trigger::{QueryDetector, QueryState};

/// Hosts that forward every key press send this for backspace.
const BACKSPACE: char = '\u{8}';

/// Builder for `MentionsInput`.
pub struct MentionsInputBuilder<S, A = SimpleAutoCompleter> {
    surface: S,
    autocompleter: A,
    config: MentionsConfig,
    data_source: Option<Box<dyn DataSource>>,
    highlighter: Option<Box<dyn MentionHighlighter>>,
}

impl<S: TextSurface, A: AutoCompleter> MentionsInputBuilder<S, A> {
    pub fn config(mut self, config: MentionsConfig) -> Self {
        self.config = config;
        self
    }

    /// Candidate source. Required.
    pub fn data_source(mut self, source: impl DataSource + 'static) -> Self {
        self.data_source = Some(Box::new(source));
        self
    }

    /// Markup for highlighted mentions. Defaults to `<strong><span>`.
    pub fn highlighter(mut self, highlighter: impl MentionHighlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// Swap in a different dropdown.
    pub fn autocompleter<B: AutoCompleter>(self, autocompleter: B) -> MentionsInputBuilder<S, B> {
        MentionsInputBuilder {
            surface: self.surface,
            autocompleter,
            config: self.config,
            data_source: self.data_source,
            highlighter: self.highlighter,
        }
    }

    /// Validate the configuration and initialize the widget.
    ///
    /// Existing surface text is adopted unless `reset_on_initialize` is set,
    /// and `prefill_mention` is inserted last.
    pub fn build(self) -> Result<MentionsInput<S, A>> {
        self.config.validate()?;
        let data_source = self.data_source.ok_or(MentionsError::MissingDataSource)?;

        let mut autocompleter = self.autocompleter;
        autocompleter.initialize(&self.config);

        let model = MentionModel::new(
            EditorRope::new(),
            self.config.trigger_char,
            self.config.insert_space_after_mention,
        );

        let mut input = MentionsInput {
            surface: self.surface,
            autocompleter,
            model,
            detector: QueryDetector::new(self.config.trigger_char),
            tasks: TaskQueue::new(),
            search: SearchChannel::new(),
            data_source,
            highlighter: self.highlighter.unwrap_or_else(|| Box::new(())),
            config: self.config,
        };

        if input.config.reset_on_initialize {
            input.reset()?;
        } else {
            input.sync_from_surface();
        }

        if let Some(mention) = input.config.prefill_mention.clone() {
            input.add_mention(mention)?;
        }

        tracing::debug!(
            target: "mentions::input",
            trigger = %input.config.trigger_char,
            min_chars = input.config.min_chars,
            "mentions input initialized"
        );
        Ok(input)
    }
}

/// A text input with mention autocomplete.
pub struct MentionsInput<S, A = SimpleAutoCompleter> {
    surface: S,
    autocompleter: A,
    model: MentionModel,
    detector: QueryDetector,
    tasks: TaskQueue,
    search: SearchChannel,
    data_source: Box<dyn DataSource>,
    highlighter: Box<dyn MentionHighlighter>,
    config: MentionsConfig,
}

impl<S: TextSurface> MentionsInput<S> {
    pub fn builder(surface: S) -> MentionsInputBuilder<S> {
        MentionsInputBuilder {
            surface,
            autocompleter: SimpleAutoCompleter::default(),
            config: MentionsConfig::default(),
            data_source: None,
            highlighter: None,
        }
    }
}

impl<S: TextSurface, A: AutoCompleter> MentionsInput<S, A> {
    pub fn config(&self) -> &MentionsConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface. Edits made here must be followed by
    /// the matching events.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn autocompleter(&self) -> &A {
        &self.autocompleter
    }

    /// Mutable access to the dropdown, e.g. to activate an item the user
    /// pointed at before calling `select_active_item`.
    pub fn autocompleter_mut(&mut self) -> &mut A {
        &mut self.autocompleter
    }

    pub fn model(&self) -> &MentionModel {
        &self.model
    }

    pub fn query_state(&self) -> &QueryState {
        self.detector.state()
    }

    /// Active mentions, synchronized with the current text.
    pub fn mentions(&self) -> &MentionSet {
        self.model.mentions()
    }

    /// The message to hand to consumers.
    pub fn value(&self) -> String {
        self.model.value()
    }

    /// Current syntax text and overlay markup.
    pub fn rendered(&self) -> &RenderedMessage {
        self.model.rendered()
    }

    /// Process one host event.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<EventOutcome> {
        if let InputEvent::KeyDown(_) = event {
            self.run_deferred();
        }

        let outcome = match event {
            InputEvent::KeyDown(key) => self.on_key_down(key)?,
            InputEvent::KeyPress(c) => {
                if c != BACKSPACE {
                    self.detector.push(c);
                }
                EventOutcome::Continue
            }
            InputEvent::Input => {
                self.on_input();
                EventOutcome::Continue
            }
            InputEvent::Click => {
                self.tasks.defer(Deferred::ResetBuffer);
                EventOutcome::Continue
            }
            InputEvent::Blur => {
                self.autocompleter.hide();
                self.detector.suppress();
                self.tasks.defer(Deferred::ResetBuffer);
                EventOutcome::Continue
            }
        };

        if matches!(event, InputEvent::Input | InputEvent::Click | InputEvent::Blur) {
            self.run_deferred();
        }
        self.poll_responses();
        Ok(outcome)
    }

    /// Run pending deferred work and apply arrived responses.
    pub fn flush(&mut self) -> usize {
        self.run_deferred();
        self.poll_responses()
    }

    /// Number of deferred tasks waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn on_key_down(&mut self, key: Key) -> Result<EventOutcome> {
        if self.autocompleter.is_visible() {
            match key {
                Key::ArrowUp => {
                    self.autocompleter.select_previous();
                    return Ok(EventOutcome::Consumed);
                }
                Key::ArrowDown => {
                    self.autocompleter.select_next();
                    return Ok(EventOutcome::Consumed);
                }
                Key::Escape => {
                    self.autocompleter.hide();
                    self.detector.suppress();
                    return Ok(EventOutcome::Consumed);
                }
                Key::Return | Key::Tab => {
                    self.select_active_item()?;
                    return Ok(EventOutcome::Consumed);
                }
                _ => {}
            }
        }

        match key {
            k if k.repositions_caret() => self.tasks.defer(Deferred::ResetBuffer),
            // A space inside an open dropdown is part of the query ("john s").
            Key::Space if !self.autocompleter.is_visible() => {
                self.tasks.defer(Deferred::ResetBuffer)
            }
            Key::Return => self.tasks.defer(Deferred::ResetBuffer),
            Key::Backspace => self.detector.backspace(),
            _ => {}
        }
        Ok(EventOutcome::Continue)
    }

    fn on_input(&mut self) {
        self.sync_from_surface();

        match self.detector.detect() {
            QueryState::Composing(query) => {
                let query = query.clone();
                self.tasks.defer(Deferred::Search(query));
            }
            QueryState::Idle | QueryState::Suppressed => self.autocompleter.hide(),
        }
    }

    fn sync_from_surface(&mut self) {
        let text = self.surface.text();
        self.model.set_text_with(&text, &*self.highlighter);
    }

    fn run_deferred(&mut self) {
        while let Some(task) = self.tasks.pop() {
            match task {
                Deferred::ResetBuffer => {
                    self.detector.reset_buffer();
                    self.autocompleter.hide();
                }
                Deferred::Search(query) => self.dispatch_search(query),
            }
        }
    }

    fn dispatch_search(&mut self, query: SmolStr) {
        // A reset queued ahead of us may already have ended the query.
        if self.detector.query() != Some(query.as_str()) {
            tracing::trace!(target: "mentions::search", %query, "query ended before dispatch");
            return;
        }
        if query.is_empty() || query.chars().count() < self.config.min_chars {
            self.autocompleter.hide();
            return;
        }

        let responder = self.search.responder(&query);
        tracing::debug!(
            target: "mentions::search",
            seq = responder.seq(),
            %query,
            "requesting candidates"
        );
        self.autocompleter.loading();
        self.data_source
            .on_data_request(RequestMode::Search, &query, responder);
    }

    /// Apply search responses that have arrived since the last call.
    ///
    /// Responses for anything but the live query are dropped. Returns the
    /// number of responses applied.
    pub fn poll_responses(&mut self) -> usize {
        let mut applied = 0;
        while let Some(response) = self.search.try_next() {
            if self.detector.query() != Some(response.query.as_str()) {
                tracing::debug!(
                    target: "mentions::search",
                    seq = response.seq,
                    query = %response.query,
                    "discarding stale search response"
                );
                continue;
            }

            let candidates: Vec<Candidate> = response
                .candidates
                .into_iter()
                .filter(|candidate| {
                    if !candidate.is_well_formed() {
                        tracing::warn!(
                            target: "mentions::search",
                            ?candidate,
                            "skipping candidate without id or name"
                        );
                        return false;
                    }
                    candidate
                        .name
                        .as_deref()
                        .is_none_or(|name| !self.model.mentions().contains_value(name))
                })
                .collect();

            tracing::trace!(
                target: "mentions::search",
                seq = response.seq,
                count = candidates.len(),
                "populating dropdown"
            );
            self.autocompleter.populate(candidates, &response.query);
            applied += 1;
        }
        applied
    }

    /// Turn the active dropdown item into a mention.
    ///
    /// Returns false if there is no active item.
    pub fn select_active_item(&mut self) -> Result<bool> {
        let Some(candidate) = self.autocompleter.selected_item().cloned() else {
            return Ok(false);
        };
        match candidate.to_mention(&self.config.default_mention_type) {
            Some(mention) => {
                self.add_mention(mention)?;
                Ok(true)
            }
            None => {
                self.autocompleter.hide();
                Ok(false)
            }
        }
    }

    /// Insert a mention into the text.
    ///
    /// Replaces the live query (trigger included) when there is one,
    /// otherwise inserts at the caret. The query ends, the dropdown closes,
    /// and focus returns to the surface with the caret after the mention.
    pub fn add_mention(&mut self, mention: Mention) -> Result<Insertion> {
        let query = self.detector.query().map(SmolStr::new);
        self.detector.finish_query();
        self.autocompleter.hide();

        self.sync_from_surface();
        let caret = self.surface.caret();
        let insertion = self.model.add_mention_with(
            mention,
            query.as_deref(),
            caret,
            &*self.highlighter,
        );

        self.surface.set_text(&self.model.text())?;
        self.surface.focus()?;
        self.surface.set_caret(insertion.caret_after)?;
        Ok(insertion)
    }

    /// Clear text and mentions.
    pub fn reset(&mut self) -> Result<()> {
        self.surface.set_text("")?;
        self.model.reset_with(&*self.highlighter);
        self.detector.reset_buffer();
        self.tasks.clear();
        self.autocompleter.hide();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::platform::PlainSurface;
    use crate::search::Responder;

    fn echo_source(mode: RequestMode, query: &str, responder: Responder) {
        assert_eq!(mode, RequestMode::Search);
        responder.respond(vec![
            Candidate::new("1", format!("{query} one")),
            Candidate::new("2", format!("{query} two")),
        ]);
    }

    fn type_chars<S: TextSurface, A: AutoCompleter>(
        input: &mut MentionsInput<S, A>,
        text: &str,
        mut insert: impl FnMut(&mut S, char),
    ) {
        for c in text.chars() {
            let key = if c == ' ' { Key::Space } else { Key::Other };
            input.handle_event(InputEvent::KeyDown(key)).unwrap();
            input.handle_event(InputEvent::KeyPress(c)).unwrap();
            insert(input.surface_mut(), c);
            input.handle_event(InputEvent::Input).unwrap();
        }
    }

    fn type_plain(input: &mut MentionsInput<PlainSurface>, text: &str) {
        type_chars(input, text, |surface, c| surface.type_str(&c.to_string()));
    }

    #[test]
    fn test_requires_data_source() {
        let result = MentionsInput::builder(PlainSurface::new()).build();
        assert!(matches!(result, Err(MentionsError::MissingDataSource)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = MentionsInput::builder(PlainSurface::new())
            .config(MentionsConfig {
                trigger_char: '\n',
                ..Default::default()
            })
            .data_source(echo_source)
            .build();
        assert!(matches!(result, Err(MentionsError::InvalidTriggerChar('\n'))));
    }

    #[test]
    fn test_query_opens_dropdown() {
        let mut input = MentionsInput::builder(PlainSurface::new())
            .data_source(echo_source)
            .build()
            .unwrap();
        type_plain(&mut input, "@jo");
        assert_eq!(input.query_state(), &QueryState::Composing("jo".into()));
        assert!(input.autocompleter().is_visible());
        assert_eq!(input.autocompleter().items()[0].candidate.name.as_deref(), Some("jo one"));
    }

    #[test]
    fn test_min_chars_gate() {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let seen = requests.clone();
        let mut input = MentionsInput::builder(PlainSurface::new())
            .data_source(move |_: RequestMode, query: &str, responder: Responder| {
                seen.borrow_mut().push(query.to_string());
                responder.respond(vec![Candidate::new("1", "Ann")]);
            })
            .build()
            .unwrap();

        type_plain(&mut input, "@a");
        assert!(requests.borrow().is_empty());
        assert!(!input.autocompleter().is_visible());

        type_plain(&mut input, "n");
        assert_eq!(requests.borrow().as_slice(), ["an"]);
    }

    #[test]
    fn test_bare_trigger_never_searches() {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let seen = requests.clone();
        let mut input = MentionsInput::builder(PlainSurface::new())
            .config(MentionsConfig {
                min_chars: 0,
                ..Default::default()
            })
            .data_source(move |_: RequestMode, query: &str, responder: Responder| {
                seen.borrow_mut().push(query.to_string());
                responder.respond(vec![Candidate::new("1", "Ann")]);
            })
            .build()
            .unwrap();

        type_plain(&mut input, "@");
        assert_eq!(input.query_state(), &QueryState::Composing("".into()));
        assert!(requests.borrow().is_empty());
        assert!(!input.autocompleter().is_visible());

        type_plain(&mut input, "a");
        assert_eq!(requests.borrow().as_slice(), ["a"]);
    }

    #[test]
    fn test_backspace_key_press_not_buffered() {
        let mut input = MentionsInput::builder(PlainSurface::new())
            .data_source(echo_source)
            .build()
            .unwrap();
        type_plain(&mut input, "@joh");

        input.handle_event(InputEvent::KeyDown(Key::Backspace)).unwrap();
        input.handle_event(InputEvent::KeyPress('\u{8}')).unwrap();
        input.surface_mut().backspace();
        input.handle_event(InputEvent::Input).unwrap();

        assert_eq!(input.query_state(), &QueryState::Composing("jo".into()));
        assert_eq!(input.autocompleter().items()[0].candidate.name.as_deref(), Some("jo one"));
    }

    #[test]
    fn test_enter_without_active_item_is_consumed() {
        let mut input = MentionsInput::builder(PlainSurface::new())
            .config(MentionsConfig {
                select_first_item: false,
                ..Default::default()
            })
            .data_source(echo_source)
            .build()
            .unwrap();
        type_plain(&mut input, "@jo");
        assert!(input.autocompleter().is_visible());
        assert_eq!(input.autocompleter().active_index(), None);

        assert!(input.handle_event(InputEvent::KeyDown(Key::Return)).unwrap().is_consumed());
        assert!(input.handle_event(InputEvent::KeyDown(Key::Tab)).unwrap().is_consumed());
        assert_eq!(input.surface().text(), "@jo");
        assert!(input.mentions().is_empty());
    }

    #[test]
    fn test_enter_selects_active_item() {
        let mut input = MentionsInput::builder(PlainSurface::new())
            .data_source(echo_source)
            .build()
            .unwrap();
        type_plain(&mut input, "hi ");
        type_plain(&mut input, "@jo");

        let outcome = input.handle_event(InputEvent::KeyDown(Key::ArrowDown)).unwrap();
        assert!(outcome.is_consumed());
        let outcome = input.handle_event(InputEvent::KeyDown(Key::Return)).unwrap();
        assert!(outcome.is_consumed());

        assert_eq!(input.surface().text(), "hi jo two");
        assert_eq!(input.surface().cursor().offset, 9);
        assert!(input.surface().is_focused());
        assert_eq!(input.value(), "hi @[jo two](contact:2)");
        assert_eq!(input.query_state(), &QueryState::Suppressed);
        assert!(!input.autocompleter().is_visible());
    }

    #[test]
    fn test_escape_hides_dropdown() {
        let mut input = MentionsInput::builder(PlainSurface::new())
            .data_source(echo_source)
            .build()
            .unwrap();
        type_plain(&mut input, "@jo");
        let outcome = input.handle_event(InputEvent::KeyDown(Key::Escape)).unwrap();
        assert!(outcome.is_consumed());
        assert!(!input.autocompleter().is_visible());

        let outcome = input.handle_event(InputEvent::KeyDown(Key::Return)).unwrap();
        assert!(!outcome.is_consumed());
    }

    #[test]
    fn test_custom_highlighter_used() {
        struct Em;
        impl MentionHighlighter for Em {
            fn highlight(&self, _mention: &Mention, escaped_value: &str) -> String {
                format!("<em>{escaped_value}</em>")
            }
        }

        let mut input = MentionsInput::builder(PlainSurface::new())
            .data_source(echo_source)
            .highlighter(Em)
            .build()
            .unwrap();
        input.add_mention(Mention::new("1", "user", "Bob")).unwrap();
        assert_eq!(input.rendered().highlight, "<em>Bob</em>");
    }
}
