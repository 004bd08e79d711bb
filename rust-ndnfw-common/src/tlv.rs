//! TLV (Type‑Length‑Value) encoding and decoding utilities.
//!
//! NDN encodes both TLV-TYPE and TLV-LENGTH as VAR-NUMBER: one octet below 253,
//! otherwise a marker octet followed by a 2, 4 or 8 octet big-endian number.

use bytes::{BufMut, BytesMut};

/* ---------------------------------------------------------------- *
 * TLV type constants
 * ---------------------------------------------------------------- */

pub const TT_IMPLICIT_SHA256_DIGEST: u64 = 0x01;
pub const TT_PARAMETERS_SHA256_DIGEST: u64 = 0x02;
pub const TT_NAME: u64 = 0x07;
pub const TT_GENERIC_NAME_COMPONENT: u64 = 0x08;

/// Largest valid name component TLV-TYPE.
pub const MAX_COMPONENT_TYPE: u64 = 0x7FFF;

/// Octet length of a SHA-256 digest component.
pub const DIGEST_LENGTH: usize = 32;

/* ---------------------------------------------------------------- *
 * Encoding helpers
 * ---------------------------------------------------------------- */

/// Encode a VAR-NUMBER.
///
/// * `< 253`  → 1 byte
/// * `≤ 65 535`  → marker 253 + 2‑byte number
/// * `≤ u32::MAX` → marker 254 + 4‑byte number
/// * otherwise → marker 255 + 8‑byte number
pub fn encode_var_number(buf: &mut BytesMut, n: u64) {
    if n < 253 {
        buf.put_u8(n as u8);
    } else if n <= 0xFFFF {
        buf.put_u8(253);
        buf.put_u16(n as u16);
    } else if n <= 0xFFFF_FFFF {
        buf.put_u8(254);
        buf.put_u32(n as u32);
    } else {
        buf.put_u8(255);
        buf.put_u64(n);
    }
}

/// Encode one TLV element.
pub fn encode_tlv(buf: &mut BytesMut, tlv_type: u64, value: &[u8]) {
    encode_var_number(buf, tlv_type);
    encode_var_number(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

/// Number of bytes required to encode `n` as VAR-NUMBER.
pub fn var_number_size(n: u64) -> usize {
    if n < 253 {
        1
    } else if n <= 0xFFFF {
        3
    } else if n <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/* ---------------------------------------------------------------- *
 * Decoding helpers
 * ---------------------------------------------------------------- */

/// Decode a VAR-NUMBER at the start of `input`.
///
/// Returns the number and how many octets it occupied, or `None` if `input`
/// ends before the number does.
pub fn decode_var_number(input: &[u8]) -> Option<(u64, usize)> {
    let (&first, rest) = input.split_first()?;
    match first {
        0..=252 => Some((first as u64, 1)),
        253 => {
            let b: [u8; 2] = rest.get(..2)?.try_into().ok()?;
            Some((u16::from_be_bytes(b) as u64, 3))
        }
        254 => {
            let b: [u8; 4] = rest.get(..4)?.try_into().ok()?;
            Some((u32::from_be_bytes(b) as u64, 5))
        }
        255 => {
            let b: [u8; 8] = rest.get(..8)?.try_into().ok()?;
            Some((u64::from_be_bytes(b), 9))
        }
    }
}

/// TLV header located inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvHeader {
    pub tlv_type: u64,
    /// TLV-LENGTH.
    pub length: usize,
    /// Offset of TLV-VALUE relative to the start of the element.
    pub value_offset: usize,
}

impl TlvHeader {
    /// Total encoded size of the element.
    pub fn size(&self) -> usize {
        self.value_offset + self.length
    }
}

/// Decode the TLV-TYPE and TLV-LENGTH of the element at the start of `input`,
/// checking that TLV-VALUE fits in `input`.
pub fn decode_tlv_header(input: &[u8]) -> Option<TlvHeader> {
    let (tlv_type, t_len) = decode_var_number(input)?;
    let (length, l_len) = decode_var_number(&input[t_len..])?;
    let length = usize::try_from(length).ok()?;
    let value_offset = t_len + l_len;
    if input.len() - value_offset < length {
        return None;
    }
    Some(TlvHeader {
        tlv_type,
        length,
        value_offset,
    })
}
