//! Deferred work, run after the current event has been handled.
//!
//! Some reactions must observe post-event state: a buffer reset after an
//! arrow key should happen once the caret has actually moved, and a search
//! should only go out once the keystroke's input handling is complete. These
//! are queued here and drained, in FIFO order, before the next event is
//! processed.

use std::collections::VecDeque;

use smol_str::SmolStr;

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Clear the input buffer.
    ResetBuffer,
    /// Ask the data source for candidates matching the query.
    Search(SmolStr),
}

/// FIFO queue of deferred tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Deferred>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task.
    ///
    /// A search drops any search still waiting in the queue and joins the
    /// back, so it runs after everything queued before it.
    pub fn defer(&mut self, task: Deferred) {
        if let Deferred::Search(_) = task {
            self.tasks.retain(|t| !matches!(t, Deferred::Search(_)));
        }
        self.tasks.push_back(task);
    }

    pub fn pop(&mut self) -> Option<Deferred> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = TaskQueue::new();
        queue.defer(Deferred::Search("jo".into()));
        queue.defer(Deferred::ResetBuffer);

        assert_eq!(queue.pop(), Some(Deferred::Search("jo".into())));
        assert_eq!(queue.pop(), Some(Deferred::ResetBuffer));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_newer_search_runs_after_earlier_resets() {
        let mut queue = TaskQueue::new();
        queue.defer(Deferred::ResetBuffer);
        queue.defer(Deferred::Search("j".into()));
        queue.defer(Deferred::ResetBuffer);
        queue.defer(Deferred::Search("jo".into()));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(Deferred::ResetBuffer));
        assert_eq!(queue.pop(), Some(Deferred::ResetBuffer));
        assert_eq!(queue.pop(), Some(Deferred::Search("jo".into())));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_resets_do_not_coalesce() {
        let mut queue = TaskQueue::new();
        queue.defer(Deferred::ResetBuffer);
        queue.defer(Deferred::ResetBuffer);
        assert_eq!(queue.len(), 2);
        queue.clear();
        assert!(queue.is_empty());
    }
}
