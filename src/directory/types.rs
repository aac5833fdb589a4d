//! Directory types and traits
//!
//! Defines the client seam and the raw shapes exchanged over it.

use crate::config::SearchOptions;
use crate::control::RawControl;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only the base object
    Base,
    /// Immediate children of the base
    OneLevel,
    /// The base and everything below it
    #[default]
    Subtree,
}

impl From<Scope> for ldap3::Scope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Base => ldap3::Scope::Base,
            Scope::OneLevel => ldap3::Scope::OneLevel,
            Scope::Subtree => ldap3::Scope::Subtree,
        }
    }
}

/// A single search operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search base DN
    pub base: String,
    /// Search scope
    pub scope: Scope,
    /// LDAP filter string
    pub filter: String,
    /// Attributes to return, in order
    pub attributes: Vec<String>,
    /// Controls attached to the request
    pub controls: Vec<RawControl>,
}

impl SearchRequest {
    /// Build a subtree search from session options
    pub fn from_options(options: &SearchOptions) -> Self {
        Self {
            base: options.search_base.clone(),
            scope: Scope::Subtree,
            filter: options.filter.clone(),
            attributes: options.target_attributes.clone(),
            controls: Vec::new(),
        }
    }

    /// Attach a control
    #[must_use]
    pub fn with_control(mut self, control: RawControl) -> Self {
        self.controls.push(control);
        self
    }

    /// Find an attached control by OID
    pub fn control(&self, oid: &str) -> Option<&RawControl> {
        self.controls.iter().find(|c| c.is(oid))
    }
}

/// A regular search result entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Distinguished name
    pub dn: String,
    /// Attribute values by attribute name
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Create an entry without attributes
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add a single-valued attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Add a multi-valued attribute
    #[must_use]
    pub fn with_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// First value of an attribute (case-insensitive name)
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// One item of a search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    /// A regular entry
    Entry(DirectoryEntry),
    /// A continuation reference to another server
    Referral,
}

impl RawEntry {
    /// DN of the entry, if it is one
    pub fn dn(&self) -> Option<&str> {
        match self {
            Self::Entry(entry) => Some(&entry.dn),
            Self::Referral => None,
        }
    }

    /// Check if this is a referral
    pub fn is_referral(&self) -> bool {
        matches!(self, Self::Referral)
    }
}

impl From<DirectoryEntry> for RawEntry {
    fn from(entry: DirectoryEntry) -> Self {
        Self::Entry(entry)
    }
}

/// Result of one search operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    /// Entries in server order
    pub entries: Vec<RawEntry>,
    /// Controls attached to the search result
    pub controls: Vec<RawControl>,
}

impl SearchResponse {
    /// Create a response
    pub fn new(entries: Vec<RawEntry>, controls: Vec<RawControl>) -> Self {
        Self { entries, controls }
    }
}

/// Client for a directory server
///
/// One instance holds at most one connection. The paged search calls
/// `connect` and `bind` once, `search` once per page and always
/// finishes with `close`.
#[async_trait]
pub trait DirectoryClient: Send {
    /// Open a connection
    async fn connect(&mut self, host: &str, port: u16) -> Result<()>;

    /// Authenticate the connection
    async fn bind(&mut self, protocol_version: u32, login: &str, password: &str) -> Result<()>;

    /// Run one search operation
    async fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Release the connection
    async fn close(&mut self) -> Result<()>;
}
