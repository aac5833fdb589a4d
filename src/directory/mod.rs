//! Directory client module
//!
//! Connection, bind and search against a directory server.
//!
//! # Overview
//!
//! The directory module provides:
//! - `DirectoryClient` - the seam the paged search drives
//! - `Ldap3Client` - implementation on top of the `ldap3` crate
//! - `ScriptedDirectory` - in-memory server for tests and dry runs

mod ldap;
mod memory;
mod types;

pub use ldap::{ldap_url, ConnectionSettings, Ldap3Client};
pub use memory::{ScriptedDirectory, ScriptedPage};
pub use types::{DirectoryClient, DirectoryEntry, RawEntry, Scope, SearchRequest, SearchResponse};

#[cfg(test)]
mod tests;
