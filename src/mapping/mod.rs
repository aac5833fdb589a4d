//! Entry mapping module
//!
//! Converts raw directory entries into caller records.
//!
//! # Overview
//!
//! Every entry yields one of three outcomes: mapped, skipped (referrals)
//! or failed. The paged search keeps mapped records, drops skipped ones
//! and aborts on failures.
//! - `EntryMapper` - the conversion seam, also implemented for closures
//! - `RecordMapper` - table-driven mapping into JSON objects

mod record;
mod types;

pub use record::RecordMapper;
pub use types::{EntryMapper, EntryOutcome};
