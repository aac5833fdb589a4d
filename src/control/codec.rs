//! BER codec for the paged results control value
//!
//! ```text
//! realSearchControlValue ::= SEQUENCE {
//!         size            INTEGER (0..maxInt),
//!         cookie          OCTET STRING }
//! ```
//!
//! Only definite lengths are produced and accepted.

use super::types::{DecodeError, FieldKind, PageResponseValue};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_SEQUENCE: u8 = 0x30;

/// Lengths wider than this do not fit a control value
const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a page size and cookie into the control value
pub fn encode(page_size: u32, cookie: &[u8]) -> Bytes {
    let mut body = BytesMut::with_capacity(cookie.len() + 12);
    write_integer(&mut body, page_size);
    write_element(&mut body, TAG_OCTET_STRING, cookie);

    let mut out = BytesMut::with_capacity(body.len() + 6);
    write_element(&mut out, TAG_SEQUENCE, &body);
    out.freeze()
}

/// Decode a control value into the size and cookie it carries
pub fn decode(value: &[u8]) -> Result<PageResponseValue, DecodeError> {
    let mut input = value;
    let sequence = read_element(&mut input)
        .filter(|element| element.tag == TAG_SEQUENCE && input.is_empty())
        .ok_or(DecodeError::NotASequence)?;

    let mut body = sequence.content;
    let size = read_element(&mut body);
    let cookie = read_element(&mut body);
    let (size, cookie) = match (size, cookie) {
        (Some(size), Some(cookie)) if body.is_empty() => (size, cookie),
        _ => return Err(DecodeError::NotASequence),
    };

    let size = read_integer(&size).ok_or(DecodeError::WrongFieldType {
        index: 0,
        expected: FieldKind::Integer,
    })?;
    if cookie.tag != TAG_OCTET_STRING {
        return Err(DecodeError::WrongFieldType {
            index: 1,
            expected: FieldKind::OctetString,
        });
    }

    Ok(PageResponseValue::new(
        size,
        Bytes::copy_from_slice(cookie.content),
    ))
}

/// Check if a cookie signals "no more results"
pub fn is_empty_cookie(cookie: &[u8]) -> bool {
    cookie.is_empty()
}

// ============================================================================
// Writing
// ============================================================================

fn write_element(buf: &mut BytesMut, tag: u8, content: &[u8]) {
    buf.put_u8(tag);
    write_length(buf, content.len());
    buf.put_slice(content);
}

fn write_length(buf: &mut BytesMut, length: usize) {
    if length < 0x80 {
        buf.put_u8(length as u8);
        return;
    }
    let octets = length.to_be_bytes();
    let leading = octets.iter().take_while(|&&b| b == 0).count();
    let significant = &octets[leading..];
    buf.put_u8(0x80 | significant.len() as u8);
    buf.put_slice(significant);
}

/// Minimal two's-complement content octets for a non-negative value
fn write_integer(buf: &mut BytesMut, value: u32) {
    let octets = value.to_be_bytes();
    // keep at least one octet so zero encodes as 0x00
    let leading = octets.iter().take_while(|&&b| b == 0).count().min(3);
    let significant = &octets[leading..];
    let pad = significant[0] & 0x80 != 0;

    buf.put_u8(TAG_INTEGER);
    buf.put_u8(significant.len() as u8 + u8::from(pad));
    if pad {
        buf.put_u8(0x00);
    }
    buf.put_slice(significant);
}

// ============================================================================
// Reading
// ============================================================================

struct Element<'a> {
    tag: u8,
    content: &'a [u8],
}

fn read_element<'a>(input: &mut &'a [u8]) -> Option<Element<'a>> {
    if input.remaining() < 2 {
        return None;
    }
    let tag = input.get_u8();
    let length = read_length(input)?;
    if input.remaining() < length {
        return None;
    }
    let current: &'a [u8] = input;
    let (content, rest) = current.split_at(length);
    *input = rest;
    Some(Element { tag, content })
}

fn read_length(input: &mut &[u8]) -> Option<usize> {
    let first = input.get_u8();
    if first & 0x80 == 0 {
        return Some(first as usize);
    }
    // 0x80 alone is the indefinite form
    let count = (first & 0x7f) as usize;
    if count == 0 || count > MAX_LENGTH_OCTETS || input.remaining() < count {
        return None;
    }
    let mut length = 0usize;
    for _ in 0..count {
        length = (length << 8) | input.get_u8() as usize;
    }
    Some(length)
}

/// Read a non-negative INTEGER that fits in `u32`
fn read_integer(element: &Element<'_>) -> Option<u32> {
    if element.tag != TAG_INTEGER {
        return None;
    }
    let content = element.content;
    let first = *content.first()?;
    if first & 0x80 != 0 {
        return None;
    }
    let leading = content.iter().take_while(|&&b| b == 0).count();
    let significant = &content[leading..];
    if significant.len() > 4 {
        return None;
    }
    Some(
        significant
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
    )
}
