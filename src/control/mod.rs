//! Paged results control module
//!
//! Wire codec and decoder registry for the Simple Paged Results control
//! (RFC 2696, OID `1.2.840.113556.1.4.319`).
//!
//! # Overview
//!
//! The control value is a definite-length BER `SEQUENCE` of exactly two
//! elements: an `INTEGER` page size followed by an `OCTET STRING` cookie.
//! - `encode` / `decode` - the codec for that value
//! - `ControlRegistry` - maps control OIDs to decoders for response controls

mod codec;
mod registry;
mod types;

pub use codec::{decode, encode, is_empty_cookie};
pub use registry::{ControlDecoder, ControlRegistry};
pub use types::{
    Cookie, DecodeError, FieldKind, PageRequestValue, PageResponseValue, RawControl,
    ResponseControl, PAGED_RESULTS_OID,
};
