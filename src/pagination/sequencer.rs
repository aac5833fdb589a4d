//! Paged results state machine
//!
//! Owns the cookie chain. One request is built per round trip and the
//! response control decides whether another one follows.

use super::types::SequencerState;
use crate::control::{PageRequestValue, PageResponseValue};
use crate::error::{Error, Result};
use crate::types::cookie_to_base64;
use tracing::{debug, warn};

/// Sequences the requests of one paged search
#[derive(Debug, Clone)]
pub struct PageSequencer {
    page_size: u32,
    state: SequencerState,
    pages_fetched: u32,
}

impl PageSequencer {
    /// Create a sequencer; the page size is fixed for its lifetime
    pub fn new(page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        Ok(Self {
            page_size,
            state: SequencerState::Start,
            pages_fetched: 0,
        })
    }

    /// Page size sent with every request
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current state
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Number of responses observed
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Check if no further request will be issued
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Build the next request, or `None` once the sequence has ended
    pub fn next_request(&mut self) -> Result<Option<PageRequestValue>> {
        let request = match &self.state {
            SequencerState::Start => PageRequestValue::initial(self.page_size)?,
            SequencerState::HasMore(cookie) => {
                PageRequestValue::new(self.page_size, cookie.clone())?
            }
            SequencerState::AwaitingResponse => {
                return Err(Error::sequence(
                    "next request built while a response is outstanding",
                ))
            }
            SequencerState::Done | SequencerState::Stopped => return Ok(None),
        };
        self.state = SequencerState::AwaitingResponse;
        Ok(Some(request))
    }

    /// Advance on the paged results control of a response
    pub fn observe(&mut self, control: Option<PageResponseValue>) -> Result<&SequencerState> {
        if self.state != SequencerState::AwaitingResponse {
            return Err(Error::sequence(format!(
                "response observed in state '{}'",
                self.state.name()
            )));
        }
        self.pages_fetched += 1;

        self.state = match control {
            // the server left the page protocol
            None => {
                warn!(
                    page = self.pages_fetched,
                    "Paged results control missing from response; searching is abruptly stopped"
                );
                SequencerState::Stopped
            }
            Some(response) if response.is_last_page() => {
                debug!(
                    page = self.pages_fetched,
                    estimate = response.size(),
                    "Server signalled end of result set"
                );
                SequencerState::Done
            }
            Some(response) => {
                debug!(
                    page = self.pages_fetched,
                    estimate = response.size(),
                    cookie = %cookie_to_base64(response.cookie()),
                    "More pages available"
                );
                SequencerState::HasMore(response.into_cookie())
            }
        };
        Ok(&self.state)
    }
}
