//! # ldap-pager
//!
//! Retrieve large LDAP result sets in bounded pages with the Simple Paged
//! Results control (RFC 2696, OID `1.2.840.113556.1.4.319`).
//!
//! ## Features
//!
//! - **Control Codec**: BER encoding of the request value, decoding of the response value
//! - **Control Registry**: Explicit OID to decoder table, built once at startup
//! - **Page Sequencing**: Cookie chaining until the server signals the end of results
//! - **Entry Mapping**: Config-driven attribute table, referrals skipped
//! - **JSON Output**: Array or JSON Lines, to a file or stdout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ldap_pager::{ControlRegistry, Ldap3Client, PagedSearch, RecordMapper, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> ldap_pager::Result<()> {
//!     let options = SearchOptions::new("dc01.its.local", "CN=Users,DC=its,DC=local")
//!         .with_credentials("reader@its.local", "secret")
//!         .with_page_size(500);
//!
//!     let mut search = PagedSearch::new(RecordMapper::new(), ControlRegistry::with_paged_results()?)?;
//!     let records = search.load_all_pages(&mut Ldap3Client::new(), &options).await?;
//!     println!("{} entries", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          PagedSearch                          │
//! │   connect → bind → [ search page → map entries ]* → close     │
//! └───────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┼───────────────┬────────────────┐
//! │  Directory   │  Sequencer    │   Control     │   Mapping      │
//! ├──────────────┼───────────────┼───────────────┼────────────────┤
//! │ ldap3        │ Start         │ BER codec     │ field table    │
//! │ scripted     │ HasMore       │ registry      │ referral skip  │
//! │              │ Done/Stopped  │               │                │
//! └──────────────┴───────────────┴───────────────┴────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Paged results control codec and registry
pub mod control;

/// Directory client seam and implementations
pub mod directory;

/// Entry to record mapping
pub mod mapping;

/// Page sequencing and the paged search driver
pub mod pagination;

/// Configuration loading and validation
pub mod config;

/// Environment variable interpolation
pub mod template;

/// JSON record output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{AppConfig, SearchOptions};
pub use control::{ControlRegistry, PageRequestValue, PageResponseValue, PAGED_RESULTS_OID};
pub use directory::{DirectoryClient, Ldap3Client, RawEntry, ScriptedDirectory};
pub use mapping::{EntryMapper, EntryOutcome, RecordMapper};
pub use pagination::{PageSequencer, PagedSearch, SequencerState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
