//! Control types
//!
//! Request/response values of the paged results control and the raw
//! control framing exchanged with the directory client.

use super::codec;
use crate::error::{Error, Result};
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Object identifier of the Simple Paged Results control
pub const PAGED_RESULTS_OID: &str = "1.2.840.113556.1.4.319";

/// Server-opaque continuation token
///
/// Never interpreted or modified by the client, only echoed back.
pub type Cookie = Bytes;

// ============================================================================
// Decode Errors
// ============================================================================

/// Kind of element expected at a position of the control value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// BER INTEGER (tag 0x02)
    Integer,
    /// BER OCTET STRING (tag 0x04)
    OctetString,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "an integer"),
            Self::OctetString => write!(f, "an octet string"),
        }
    }
}

/// Failure to decode a paged results control value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The value is not a two-element sequence
    #[error("value is not a two-element sequence")]
    NotASequence,

    /// The sequence holds an element of the wrong kind
    #[error("element {index} is not {expected}")]
    WrongFieldType {
        /// Position of the offending element
        index: usize,
        /// What the element should have been
        expected: FieldKind,
    },
}

// ============================================================================
// Raw Control Framing
// ============================================================================

/// A control as carried by a search request or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawControl {
    /// Dotted numeric object identifier
    pub oid: String,
    /// Criticality flag
    pub critical: bool,
    /// Encoded control value, if any
    pub value: Option<Bytes>,
}

impl RawControl {
    /// Create a control with a value
    pub fn new(oid: impl Into<String>, critical: bool, value: impl Into<Bytes>) -> Self {
        Self {
            oid: oid.into(),
            critical,
            value: Some(value.into()),
        }
    }

    /// Check if this control carries the given OID
    pub fn is(&self, oid: &str) -> bool {
        self.oid == oid
    }
}

// ============================================================================
// Page Request / Response
// ============================================================================

/// Paged results control attached to an outgoing search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequestValue {
    page_size: u32,
    cookie: Cookie,
}

impl PageRequestValue {
    /// Create the request for the first page (empty cookie)
    pub fn initial(page_size: u32) -> Result<Self> {
        Self::new(page_size, Cookie::new())
    }

    /// Create a request carrying the cookie of the previous response
    pub fn new(page_size: u32, cookie: Cookie) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        Ok(Self { page_size, cookie })
    }

    /// Requested page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Cookie echoed to the server
    pub fn cookie(&self) -> &[u8] {
        &self.cookie
    }

    /// Encode the control value
    pub fn encode(&self) -> Bytes {
        codec::encode(self.page_size, &self.cookie)
    }

    /// Build the critical control attached to a search request
    pub fn to_control(&self) -> RawControl {
        RawControl::new(PAGED_RESULTS_OID, true, self.encode())
    }
}

/// Paged results control returned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponseValue {
    size: u32,
    cookie: Cookie,
}

impl PageResponseValue {
    /// Create a response value
    pub fn new(size: u32, cookie: impl Into<Cookie>) -> Self {
        Self {
            size,
            cookie: cookie.into(),
        }
    }

    /// Server estimate of the total result count (0 = unknown)
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Cookie to echo on the next request
    pub fn cookie(&self) -> &[u8] {
        &self.cookie
    }

    /// Check if the server signalled the end of the result set
    pub fn is_last_page(&self) -> bool {
        codec::is_empty_cookie(&self.cookie)
    }

    /// Take the cookie
    pub fn into_cookie(self) -> Cookie {
        self.cookie
    }
}

/// A response control resolved through the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseControl {
    /// Simple Paged Results
    PagedResults(PageResponseValue),
}
