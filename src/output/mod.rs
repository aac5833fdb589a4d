//! Output module
//!
//! Serializes the records collected by a paged search.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing records as a single JSON array (optionally pretty printed)
//! - Writing records as JSON Lines
//! - Targeting a file or stdout

mod writer;

pub use writer::{write_json, write_records, JsonWriterConfig, RecordFormat};
