//! Response control registry
//!
//! Maps control OIDs to decoders so response controls can be resolved
//! without a process-wide table. Built once during setup and handed to
//! the paged search.

use super::codec;
use super::types::{DecodeError, PageResponseValue, RawControl, ResponseControl, PAGED_RESULTS_OID};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Decoder for the value of a response control
pub type ControlDecoder = fn(&[u8]) -> std::result::Result<ResponseControl, DecodeError>;

fn decode_paged_results(value: &[u8]) -> std::result::Result<ResponseControl, DecodeError> {
    codec::decode(value).map(ResponseControl::PagedResults)
}

/// OID to decoder table
#[derive(Clone, Default)]
pub struct ControlRegistry {
    decoders: HashMap<String, ControlDecoder>,
}

impl fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut oids: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        oids.sort_unstable();
        f.debug_struct("ControlRegistry").field("oids", &oids).finish()
    }
}

impl ControlRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the paged results decoder bound
    pub fn with_paged_results() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(PAGED_RESULTS_OID, decode_paged_results)?;
        Ok(registry)
    }

    /// Bind a decoder to an OID
    ///
    /// Fails if the OID already has a decoder.
    pub fn register(&mut self, oid: impl Into<String>, decoder: ControlDecoder) -> Result<()> {
        let oid = oid.into();
        if self.decoders.contains_key(&oid) {
            return Err(Error::Registration { oid });
        }
        debug!(%oid, "Registered response control decoder");
        self.decoders.insert(oid, decoder);
        Ok(())
    }

    /// Check if an OID has a decoder
    pub fn is_registered(&self, oid: &str) -> bool {
        self.decoders.contains_key(oid)
    }

    /// Decode a response control
    ///
    /// Returns `None` for controls with no registered decoder. A missing
    /// value is decoded as an empty one.
    pub fn decode(
        &self,
        control: &RawControl,
    ) -> Option<std::result::Result<ResponseControl, DecodeError>> {
        let decoder = self.decoders.get(&control.oid)?;
        Some(decoder(control.value.as_deref().unwrap_or_default()))
    }

    /// Find and decode the first paged results control in a response
    pub fn find_paged_results(
        &self,
        controls: &[RawControl],
    ) -> Option<std::result::Result<PageResponseValue, DecodeError>> {
        let control = controls.iter().find(|c| c.is(PAGED_RESULTS_OID))?;
        self.decode(control).map(|decoded| {
            decoded.map(|ResponseControl::PagedResults(value)| value)
        })
    }
}
