//! Candidate data source plumbing.
//!
//! The data source is an external collaborator and may answer late, out of
//! order, or not at all. Each request carries a `Responder` tagged with the
//! query it was issued for; answers travel back over a channel that the
//! widget drains between events, and the widget drops any answer whose query
//! no longer matches what the user is typing.

use smol_str::SmolStr;
use tokio::sync::mpsc;

use crate::mention::Candidate;

/// Request mode passed to the data source. Only searching exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMode {
    Search,
}

impl RequestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Search => "search",
        }
    }
}

impl std::fmt::Display for RequestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidates returned for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// Sequence number of the request, increasing per widget.
    pub seq: u64,
    /// Query the request was issued for.
    pub query: SmolStr,
    pub candidates: Vec<Candidate>,
}

/// One-shot reply handle for a data request.
#[derive(Debug)]
pub struct Responder {
    seq: u64,
    query: SmolStr,
    tx: mpsc::UnboundedSender<SearchResponse>,
}

impl Responder {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Deliver candidates. Returns false if the widget has been dropped.
    pub fn respond(self, candidates: Vec<Candidate>) -> bool {
        self.tx
            .send(SearchResponse {
                seq: self.seq,
                query: self.query,
                candidates,
            })
            .is_ok()
    }
}

/// Source of autocomplete candidates.
///
/// Implementations may answer synchronously inside `on_data_request` or keep
/// the responder and answer later from anywhere.
pub trait DataSource {
    fn on_data_request(&self, mode: RequestMode, query: &str, responder: Responder);
}

impl<F> DataSource for F
where
    F: Fn(RequestMode, &str, Responder),
{
    fn on_data_request(&self, mode: RequestMode, query: &str, responder: Responder) {
        self(mode, query, responder)
    }
}

/// Issues tagged requests and collects their responses.
#[derive(Debug)]
pub struct SearchChannel {
    next_seq: u64,
    tx: mpsc::UnboundedSender<SearchResponse>,
    rx: mpsc::UnboundedReceiver<SearchResponse>,
}

impl Default for SearchChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { next_seq: 0, tx, rx }
    }

    /// Create a responder for a new request.
    pub fn responder(&mut self, query: &str) -> Responder {
        self.next_seq += 1;
        Responder {
            seq: self.next_seq,
            query: SmolStr::new(query),
            tx: self.tx.clone(),
        }
    }

    /// Sequence number of the most recently issued request.
    pub fn last_seq(&self) -> u64 {
        self.next_seq
    }

    /// Take the next response that has already arrived, if any.
    pub fn try_next(&mut self) -> Option<SearchResponse> {
        self.rx.try_recv().ok()
    }
}
