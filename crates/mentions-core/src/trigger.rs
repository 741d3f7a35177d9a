//! Trigger character and query detection.
//!
//! A short rolling buffer of the characters typed since the last reset
//! decides whether the user is composing a mention query. The trigger
//! character only counts when it is the first thing in the buffer: any
//! committed keystroke before it means the caret is not at the start of a
//! fresh token, and the query is dropped.

use smol_str::SmolStr;

/// Characters typed since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    chars: Vec<char>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        self.chars.push(c);
    }

    /// Drop the most recent character (backspace).
    pub fn truncate_one(&mut self) {
        self.chars.pop();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Index of the last occurrence of `c`.
    pub fn last_index_of(&self, c: char) -> Option<usize> {
        self.chars.iter().rposition(|&b| b == c)
    }

    /// Buffer contents from `index` on.
    pub fn tail(&self, index: usize) -> String {
        self.chars.get(index..).unwrap_or_default().iter().collect()
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Detector state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryState {
    /// No trigger at the start of the buffer.
    #[default]
    Idle,
    /// Trigger found at buffer index 0; holds the right-trimmed query.
    Composing(SmolStr),
    /// Autocomplete deliberately hidden until the buffer changes again.
    Suppressed,
}

impl QueryState {
    pub fn query(&self) -> Option<&str> {
        match self {
            QueryState::Composing(query) => Some(query.as_str()),
            _ => None,
        }
    }

    pub fn is_composing(&self) -> bool {
        matches!(self, QueryState::Composing(_))
    }
}

/// Tracks the input buffer and derives the current query from it.
#[derive(Debug, Clone)]
pub struct QueryDetector {
    trigger: char,
    buffer: InputBuffer,
    state: QueryState,
}

impl QueryDetector {
    pub fn new(trigger: char) -> Self {
        Self {
            trigger,
            buffer: InputBuffer::new(),
            state: QueryState::Idle,
        }
    }

    pub fn trigger(&self) -> char {
        self.trigger
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn query(&self) -> Option<&str> {
        self.state.query()
    }

    /// Record a typed character.
    pub fn push(&mut self, c: char) {
        self.buffer.push(c);
        self.leave_suppressed();
    }

    /// Record a backspace.
    pub fn backspace(&mut self) {
        self.buffer.truncate_one();
        self.leave_suppressed();
    }

    /// Forget everything typed so far. The query goes with it.
    pub fn reset_buffer(&mut self) {
        self.buffer.clear();
        self.state = QueryState::Idle;
    }

    /// Hide autocomplete until the next buffer change.
    pub fn suppress(&mut self) {
        self.state = QueryState::Suppressed;
    }

    /// Clear the buffer and suppress, as after a mention was placed.
    pub fn finish_query(&mut self) {
        self.buffer.clear();
        self.state = QueryState::Suppressed;
    }

    /// Re-evaluate the buffer after a text input event.
    pub fn detect(&mut self) -> &QueryState {
        if self.state == QueryState::Suppressed {
            return &self.state;
        }
        self.state = match self.buffer.last_index_of(self.trigger) {
            Some(0) => {
                let query = self.buffer.tail(1);
                QueryState::Composing(SmolStr::new(query.trim_end()))
            }
            _ => QueryState::Idle,
        };
        &self.state
    }

    fn leave_suppressed(&mut self) {
        if self.state == QueryState::Suppressed {
            self.state = QueryState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(detector: &mut QueryDetector, s: &str) {
        for c in s.chars() {
            detector.push(c);
            detector.detect();
        }
    }

    #[test]
    fn test_trigger_first_in_buffer_composes() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@jo");
        assert_eq!(detector.state(), &QueryState::Composing("jo".into()));
        assert_eq!(detector.query(), Some("jo"));
    }

    #[test]
    fn test_trigger_not_first_is_idle() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "foo @bar");
        assert_eq!(detector.state(), &QueryState::Idle);
        assert_eq!(detector.query(), None);
    }

    #[test]
    fn test_query_is_right_trimmed() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@john  ");
        assert_eq!(detector.query(), Some("john"));
        type_str(&mut detector, "s");
        assert_eq!(detector.query(), Some("john  s"));
    }

    #[test]
    fn test_bare_trigger_has_empty_query() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@");
        assert_eq!(detector.query(), Some(""));
    }

    #[test]
    fn test_later_trigger_invalidates() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@a@b");
        assert_eq!(detector.state(), &QueryState::Idle);
    }

    #[test]
    fn test_backspace_truncates() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@jon");
        detector.backspace();
        detector.detect();
        assert_eq!(detector.query(), Some("jo"));

        detector.backspace();
        detector.backspace();
        detector.backspace();
        detector.detect();
        assert!(detector.buffer().is_empty());
        assert_eq!(detector.state(), &QueryState::Idle);
    }

    #[test]
    fn test_reset_clears_query() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@bar");
        detector.reset_buffer();
        assert_eq!(detector.state(), &QueryState::Idle);
        type_str(&mut detector, "baz");
        assert_eq!(detector.query(), None);
    }

    #[test]
    fn test_suppressed_until_buffer_changes() {
        let mut detector = QueryDetector::new('@');
        type_str(&mut detector, "@jo");
        detector.finish_query();
        assert_eq!(detector.detect(), &QueryState::Suppressed);

        type_str(&mut detector, "@m");
        assert_eq!(detector.query(), Some("m"));
    }

    #[test]
    fn test_custom_trigger() {
        let mut detector = QueryDetector::new('#');
        type_str(&mut detector, "#ru");
        assert_eq!(detector.query(), Some("ru"));
    }

    #[test]
    fn test_buffer_helpers() {
        let mut buffer = InputBuffer::new();
        for c in "x@yz".chars() {
            buffer.push(c);
        }
        assert_eq!(buffer.last_index_of('@'), Some(1));
        assert_eq!(buffer.tail(2), "yz");
        assert_eq!(buffer.tail(10), "");
        assert_eq!(buffer.as_string(), "x@yz");
        assert_eq!(buffer.len(), 4);
    }
}
