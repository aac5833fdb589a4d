//! Pagination module
//!
//! Drives repeated searches with the paged results control until the
//! server signals the end of the result set.
//!
//! # Overview
//!
//! - `PageSequencer` - state machine deciding the next request from the
//!   previous response (`Start → AwaitingResponse → HasMore | Done | Stopped`)
//! - `PagedSearch` - connects, binds, runs the sequencer against a
//!   `DirectoryClient` and maps every entry

mod search;
mod sequencer;
mod types;

pub use search::PagedSearch;
pub use sequencer::PageSequencer;
pub use types::{PageOutcome, SearchStats, SequencerState};
