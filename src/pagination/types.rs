//! Pagination types

use crate::control::Cookie;

/// State of a paged search
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SequencerState {
    /// Nothing requested yet
    #[default]
    Start,
    /// A search is in flight
    AwaitingResponse,
    /// The server returned this cookie; more pages exist
    HasMore(Cookie),
    /// The server returned an empty cookie
    Done,
    /// The server stopped sending the paged results control
    Stopped,
}

impl SequencerState {
    /// Check if no further request will be issued
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Stopped)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AwaitingResponse => "awaiting_response",
            Self::HasMore(_) => "has_more",
            Self::Done => "done",
            Self::Stopped => "stopped",
        }
    }
}

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome<T> {
    /// Mapped entries in server order
    pub entries: Vec<T>,
    /// Cookie for the next request, if the server returned one
    pub next_cookie: Option<Cookie>,
    /// Whether another page will be requested
    pub has_more: bool,
}

impl<T> PageOutcome<T> {
    /// Create an outcome
    pub fn new(entries: Vec<T>, next_cookie: Option<Cookie>) -> Self {
        Self {
            has_more: next_cookie.is_some(),
            entries,
            next_cookie,
        }
    }
}

/// Statistics for paged searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search calls completed
    pub pages: u64,
    /// Entries mapped
    pub entries: u64,
    /// Entries skipped (referrals)
    pub skipped: u64,
}

impl SearchStats {
    /// Record a completed page
    pub fn add_page(&mut self, entries: usize, skipped: usize) {
        self.pages += 1;
        self.entries += entries as u64;
        self.skipped += skipped as u64;
    }
}
