//! NDN name parsing, comparison and hashing.
//!
//! A name is handled as its TLV-VALUE in a linear buffer ([`LName`]). Parsing
//! produces a [`PName`] that caches component boundaries and prefix hashes for
//! the first [`NAME_N_CACHED_COMPS`] components, so that table lookups by
//! prefix never rescan the buffer.

use crate::error::{Error, NameError};
use crate::tlv::{self, decode_tlv_header};
use bytes::{Buf, Bytes, BytesMut};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Maximum supported name length (TLV-LENGTH of Name element).
pub const NAME_MAX_LENGTH: usize = 2048;

/// Number of name components whose boundaries and prefix hashes are cached.
pub const NAME_N_CACHED_COMPS: usize = 18;

/// Hash a name TLV-VALUE, or a prefix of one.
///
/// The value is stable within one process only: `DefaultHasher` may change
/// between Rust releases, so hashes must not be stored or sent on the wire.
pub fn compute_hash(value: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(value);
    hasher.finish()
}

/// Hash of the zero-component name.
pub fn empty_hash() -> u64 {
    compute_hash(&[])
}

/// Result of name comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum NameCompareResult {
    /// `lhs` is less than, but not a prefix of `rhs`.
    LessThan = -2,
    /// `lhs` is a proper prefix of `rhs`.
    LhsIsPrefix = -1,
    Equal = 0,
    /// `rhs` is a proper prefix of `lhs`.
    RhsIsPrefix = 1,
    /// `rhs` is less than, but not a prefix of `lhs`.
    GreaterThan = 2,
}

impl NameCompareResult {
    /// Result of the same comparison with operands swapped.
    pub fn reverse(self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::LhsIsPrefix => Self::RhsIsPrefix,
            Self::Equal => Self::Equal,
            Self::RhsIsPrefix => Self::LhsIsPrefix,
            Self::GreaterThan => Self::LessThan,
        }
    }

    /// Canonical ordering, treating a prefix as less than its extensions.
    pub fn to_ordering(self) -> Ordering {
        (self as i8).cmp(&0)
    }
}

impl fmt::Display for NameCompareResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LessThan => "less-than",
            Self::LhsIsPrefix => "lhs-is-prefix",
            Self::Equal => "equal",
            Self::RhsIsPrefix => "rhs-is-prefix",
            Self::GreaterThan => "greater-than",
        };
        f.write_str(s)
    }
}

/// Name in a linear buffer, borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LName<'a> {
    value: &'a [u8],
}

impl<'a> LName<'a> {
    pub fn new(value: &'a [u8]) -> Self {
        Self { value }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.value
    }

    /// TLV-LENGTH of the Name element.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn compute_hash(&self) -> u64 {
        compute_hash(self.value)
    }

    /// Compare two names in canonical NDN order.
    ///
    /// Components are compared left to right by TLV-TYPE, then TLV-LENGTH,
    /// then TLV-VALUE octets.
    pub fn compare(self, rhs: LName<'_>) -> NameCompareResult {
        let (mut a, mut b) = (self.value, rhs.value);
        loop {
            match (a.is_empty(), b.is_empty()) {
                (true, true) => return NameCompareResult::Equal,
                (true, false) => return NameCompareResult::LhsIsPrefix,
                (false, true) => return NameCompareResult::RhsIsPrefix,
                (false, false) => {}
            }

            let (ha, hb) = match (decode_tlv_header(a), decode_tlv_header(b)) {
                (Some(ha), Some(hb)) => (ha, hb),
                _ => return compare_octets(a, b),
            };
            let ord = ha.tlv_type.cmp(&hb.tlv_type).then(ha.length.cmp(&hb.length)).then_with(
                || a[ha.value_offset..ha.size()].cmp(&b[hb.value_offset..hb.size()]),
            );
            match ord {
                Ordering::Less => return NameCompareResult::LessThan,
                Ordering::Greater => return NameCompareResult::GreaterThan,
                Ordering::Equal => {
                    a = &a[ha.size()..];
                    b = &b[hb.size()..];
                }
            }
        }
    }
}

/// Octet-wise fallback for buffers that do not decode as components.
fn compare_octets(a: &[u8], b: &[u8]) -> NameCompareResult {
    let min = a.len().min(b.len());
    match a[..min].cmp(&b[..min]) {
        Ordering::Less => NameCompareResult::LessThan,
        Ordering::Greater => NameCompareResult::GreaterThan,
        Ordering::Equal => match a.len().cmp(&b.len()) {
            Ordering::Less => NameCompareResult::LhsIsPrefix,
            Ordering::Equal => NameCompareResult::Equal,
            Ordering::Greater => NameCompareResult::RhsIsPrefix,
        },
    }
}

/// Parsed name.
///
/// A `PName` does not hold the buffer it was parsed from; every accessor that
/// may need the octets takes the same buffer again.
#[derive(Debug, Clone, Default)]
pub struct PName {
    n_octets: u16,
    n_comps: u16,
    has_digest_comp: bool,
    /// End offset of the i-th component.
    comp_end: [u16; NAME_N_CACHED_COMPS],
    /// Hash of the (i+1)-component prefix, computed on first use.
    hashes: OnceLock<[u64; NAME_N_CACHED_COMPS]>,
}

impl PName {
    /// Parse a name from its TLV-VALUE.
    pub fn parse(value: &[u8]) -> Result<Self, NameError> {
        if value.len() > NAME_MAX_LENGTH {
            return Err(NameError::TooLong(value.len()));
        }

        let mut n = PName {
            n_octets: value.len() as u16,
            ..Default::default()
        };
        let mut pos = 0;
        while pos < value.len() {
            if n.has_digest_comp {
                return Err(NameError::ComponentAfterDigest);
            }
            let h = decode_tlv_header(&value[pos..]).ok_or(NameError::Truncated)?;
            if h.tlv_type == 0 || h.tlv_type > tlv::MAX_COMPONENT_TYPE {
                return Err(NameError::BadComponentType(h.tlv_type));
            }
            if h.tlv_type == tlv::TT_IMPLICIT_SHA256_DIGEST {
                if h.length != tlv::DIGEST_LENGTH {
                    return Err(NameError::BadDigestLength(h.length));
                }
                n.has_digest_comp = true;
            }

            pos += h.size();
            if (n.n_comps as usize) < NAME_N_CACHED_COMPS {
                n.comp_end[n.n_comps as usize] = pos as u16;
            }
            n.n_comps += 1;
        }
        Ok(n)
    }

    /// Parse a name from a buffer that must be one contiguous chunk.
    pub fn from_buf(buf: &impl Buf) -> Result<Self, NameError> {
        if buf.chunk().len() != buf.remaining() {
            return Err(NameError::Fragmented);
        }
        Self::parse(buf.chunk())
    }

    /// TLV-LENGTH of the Name element.
    pub fn n_octets(&self) -> usize {
        self.n_octets as usize
    }

    /// Number of components.
    pub fn n_comps(&self) -> usize {
        self.n_comps as usize
    }

    /// Whether the name ends with an ImplicitSha256DigestComponent.
    pub fn has_digest_comp(&self) -> bool {
        self.has_digest_comp
    }

    /// Past-end offset of the i-th component; `i` must be less than `n_comps()`.
    pub fn comp_end(&self, input: &[u8], i: usize) -> usize {
        debug_assert!(i < self.n_comps());
        if i < NAME_N_CACHED_COMPS {
            return self.comp_end[i] as usize;
        }
        if i + 1 == self.n_comps() {
            return self.n_octets();
        }
        self.seek_comp_end(input, i)
    }

    /// Start offset of the i-th component; `i` must be less than `n_comps()`.
    pub fn comp_start(&self, input: &[u8], i: usize) -> usize {
        debug_assert!(i < self.n_comps());
        if i == 0 {
            return 0;
        }
        self.comp_end(input, i - 1)
    }

    fn seek_comp_end(&self, input: &[u8], i: usize) -> usize {
        let mut pos = self.comp_end[NAME_N_CACHED_COMPS - 1] as usize;
        for _ in NAME_N_CACHED_COMPS..=i {
            // input was validated by parse
            match decode_tlv_header(&input[pos..]) {
                Some(h) => pos += h.size(),
                None => return self.n_octets(),
            }
        }
        pos
    }

    /// Hash of the prefix with `i` components; `i` must not exceed `n_comps()`.
    pub fn prefix_hash(&self, input: &[u8], i: usize) -> u64 {
        if i == 0 {
            return empty_hash();
        }
        debug_assert!(i <= self.n_comps());
        if i > NAME_N_CACHED_COMPS {
            return compute_hash(&input[..self.comp_end(input, i - 1)]);
        }
        self.hashes.get_or_init(|| self.hash_to_cache(input))[i - 1]
    }

    /// Hash of the whole name.
    pub fn hash(&self, input: &[u8]) -> u64 {
        self.prefix_hash(input, self.n_comps())
    }

    fn hash_to_cache(&self, input: &[u8]) -> [u64; NAME_N_CACHED_COMPS] {
        let mut hashes = [0; NAME_N_CACHED_COMPS];
        let n = self.n_comps().min(NAME_N_CACHED_COMPS);
        for (i, h) in hashes.iter_mut().enumerate().take(n) {
            *h = compute_hash(&input[..self.comp_end[i] as usize]);
        }
        hashes
    }
}

/// Owned name: TLV-VALUE octets together with their parsed view.
#[derive(Debug, Clone, Default)]
pub struct Name {
    value: Bytes,
    parsed: PName,
}

impl Name {
    /// Creates a new empty name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a name from its TLV-VALUE.
    pub fn from_value(value: impl Into<Bytes>) -> Result<Self, NameError> {
        let value = value.into();
        let parsed = PName::parse(&value)?;
        Ok(Self { value, parsed })
    }

    /// Creates a name of GenericNameComponents.
    pub fn from_components<I, C>(components: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let mut buf = BytesMut::new();
        for comp in components {
            tlv::encode_tlv(&mut buf, tlv::TT_GENERIC_NAME_COMPONENT, comp.as_ref());
        }
        Self::from_value(buf.freeze())
    }

    /// Parses an NDN URI such as `/a/b/%2F` or `ndn:/a/32=x/sha256digest=...`.
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        let path = uri.strip_prefix("ndn:").unwrap_or(uri);
        let mut buf = BytesMut::new();
        for comp in path.split('/').filter(|c| !c.is_empty()) {
            let (tlv_type, value) = parse_uri_component(comp)?;
            tlv::encode_tlv(&mut buf, tlv_type, &value);
        }
        Ok(Self::from_value(buf.freeze())?)
    }

    /// Returns a name with one more component of the given type.
    pub fn append(&self, tlv_type: u64, value: &[u8]) -> Result<Self, NameError> {
        let mut buf = BytesMut::with_capacity(self.value.len() + value.len() + 8);
        buf.extend_from_slice(&self.value);
        tlv::encode_tlv(&mut buf, tlv_type, value);
        Self::from_value(buf.freeze())
    }

    /// Returns a name with one more GenericNameComponent.
    pub fn append_generic(&self, value: &[u8]) -> Result<Self, NameError> {
        self.append(tlv::TT_GENERIC_NAME_COMPONENT, value)
    }

    /// TLV-VALUE of the Name element.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn as_lname(&self) -> LName<'_> {
        LName::new(&self.value)
    }

    pub fn pname(&self) -> &PName {
        &self.parsed
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.parsed.n_comps()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.n_comps() == 0
    }

    pub fn comp_end(&self, i: usize) -> usize {
        self.parsed.comp_end(&self.value, i)
    }

    pub fn comp_start(&self, i: usize) -> usize {
        self.parsed.comp_start(&self.value, i)
    }

    /// Encoded i-th component, including TLV-TYPE and TLV-LENGTH.
    pub fn component(&self, i: usize) -> Option<&[u8]> {
        (i < self.len()).then(|| &self.value[self.comp_start(i)..self.comp_end(i)])
    }

    pub fn prefix_hash(&self, i: usize) -> u64 {
        self.parsed.prefix_hash(&self.value, i)
    }

    pub fn compute_hash(&self) -> u64 {
        self.parsed.hash(&self.value)
    }

    /// Prefix with the first `n` components.
    pub fn prefix(&self, n: usize) -> Self {
        let n = n.min(self.len());
        let end = if n == 0 { 0 } else { self.comp_end(n - 1) };
        let value = self.value.slice(..end);
        // a prefix of a valid name is valid
        let parsed = PName::parse(&value).unwrap_or_default();
        Self { value, parsed }
    }

    pub fn compare(&self, other: &Name) -> NameCompareResult {
        self.as_lname().compare(other.as_lname())
    }

    /// Whether this name equals or is a prefix of `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        matches!(
            self.compare(other),
            NameCompareResult::Equal | NameCompareResult::LhsIsPrefix
        )
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other).to_ordering()
    }
}

impl std::str::FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "/");
        }

        let mut rest = &self.value[..];
        while let Some(h) = decode_tlv_header(rest) {
            let value = &rest[h.value_offset..h.size()];
            f.write_str("/")?;
            match h.tlv_type {
                tlv::TT_GENERIC_NAME_COMPONENT => {}
                tlv::TT_IMPLICIT_SHA256_DIGEST => {
                    f.write_str("sha256digest=")?;
                    for b in value {
                        write!(f, "{:02x}", b)?;
                    }
                    rest = &rest[h.size()..];
                    continue;
                }
                t => write!(f, "{}=", t)?,
            }
            if value.iter().all(|&b| b == b'.') {
                f.write_str("...")?;
            }
            for &b in value {
                if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                    write!(f, "{}", b as char)?;
                } else {
                    write!(f, "%{:02X}", b)?;
                }
            }
            rest = &rest[h.size()..];
        }
        Ok(())
    }
}

fn parse_uri_component(comp: &str) -> Result<(u64, Vec<u8>), Error> {
    if let Some(hex) = comp.strip_prefix("sha256digest=") {
        return Ok((tlv::TT_IMPLICIT_SHA256_DIGEST, decode_hex(hex)?));
    }

    let (tlv_type, escaped) = match comp.split_once('=') {
        Some((t, v)) if !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()) => {
            let t = t
                .parse::<u64>()
                .map_err(|e| Error::NdnPacket(format!("bad component type {:?}: {}", t, e)))?;
            (t, v)
        }
        _ => (tlv::TT_GENERIC_NAME_COMPONENT, comp),
    };

    let mut value = percent_decode(escaped)?;
    if !value.is_empty() && value.iter().all(|&b| b == b'.') {
        if value.len() < 3 {
            return Err(Error::NdnPacket(format!("invalid component {:?}", comp)));
        }
        value.drain(..3);
    }
    Ok((tlv_type, value))
}

fn percent_decode(s: &str) -> Result<Vec<u8>, Error> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .ok_or_else(|| Error::NdnPacket(format!("truncated escape in {:?}", s)))?;
            out.push(
                u8::from_str_radix(hex, 16)
                    .map_err(|_| Error::NdnPacket(format!("bad escape %{} in {:?}", hex, s)))?,
            );
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    if s.len() % 2 != 0 {
        return Err(Error::NdnPacket(format!("odd-length hex {:?}", s)));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| Error::NdnPacket(format!("bad hex {:?}", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlv::encode_tlv;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    fn long_name(n: usize) -> Name {
        Name::from_components((0..n).map(|i| format!("c{}", i))).unwrap()
    }

    #[test]
    fn test_parse_components() {
        let n = name("/test/data/1");
        assert_eq!(n.len(), 3);
        assert_eq!(n.component(0), Some(&b"\x08\x04test"[..]));
        assert_eq!(n.component(2), Some(&b"\x08\x011"[..]));
        assert_eq!(n.component(3), None);
        assert_eq!(n.to_string(), "/test/data/1");
    }

    #[test]
    fn test_comp_end_strictly_increasing() {
        let n = name("/a/bb/ccc/dddd/eeeee");
        let ends: Vec<usize> = (0..n.len()).map(|i| n.comp_end(i)).collect();
        assert!(ends.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*ends.last().unwrap(), n.value().len());
        assert_eq!(n.comp_start(0), 0);
        assert_eq!(n.comp_start(3), ends[2]);
    }

    #[test]
    fn test_comp_end_beyond_cache_window() {
        let n = long_name(NAME_N_CACHED_COMPS + 7);
        let mut pos = 0;
        for i in 0..n.len() {
            let h = decode_tlv_header(&n.value()[pos..]).unwrap();
            pos += h.size();
            assert_eq!(n.comp_end(i), pos, "component {}", i);
        }
        assert_eq!(n.comp_end(n.len() - 1), n.value().len());
    }

    #[test]
    fn test_too_long() {
        let mut buf = BytesMut::new();
        encode_tlv(&mut buf, tlv::TT_GENERIC_NAME_COMPONENT, &[b'x'; NAME_MAX_LENGTH]);
        assert_eq!(PName::parse(&buf).unwrap_err(), NameError::TooLong(buf.len()));
    }

    #[test]
    fn test_bad_component_type() {
        let mut buf = BytesMut::new();
        encode_tlv(&mut buf, 0, b"a");
        assert_eq!(PName::parse(&buf).unwrap_err(), NameError::BadComponentType(0));

        buf.clear();
        encode_tlv(&mut buf, 0x8000, b"a");
        assert_eq!(PName::parse(&buf).unwrap_err(), NameError::BadComponentType(0x8000));
    }

    #[test]
    fn test_digest_rules() {
        let mut buf = BytesMut::new();
        encode_tlv(&mut buf, tlv::TT_GENERIC_NAME_COMPONENT, b"a");
        encode_tlv(&mut buf, tlv::TT_IMPLICIT_SHA256_DIGEST, &[0xAA; 31]);
        encode_tlv(&mut buf, tlv::TT_GENERIC_NAME_COMPONENT, b"b");
        assert_eq!(PName::parse(&buf).unwrap_err(), NameError::BadDigestLength(31));

        buf.clear();
        encode_tlv(&mut buf, tlv::TT_IMPLICIT_SHA256_DIGEST, &[0xAA; 32]);
        encode_tlv(&mut buf, tlv::TT_GENERIC_NAME_COMPONENT, b"b");
        assert_eq!(PName::parse(&buf).unwrap_err(), NameError::ComponentAfterDigest);

        buf.clear();
        encode_tlv(&mut buf, tlv::TT_GENERIC_NAME_COMPONENT, b"a");
        encode_tlv(&mut buf, tlv::TT_IMPLICIT_SHA256_DIGEST, &[0xAA; 32]);
        let p = PName::parse(&buf).unwrap();
        assert!(p.has_digest_comp());
        assert_eq!(p.n_comps(), 2);
    }

    #[test]
    fn test_truncated() {
        let n = name("/abc");
        assert_eq!(
            PName::parse(&n.value()[..n.value().len() - 1]).unwrap_err(),
            NameError::Truncated
        );
    }

    #[test]
    fn test_fragmented() {
        let n = name("/a/b");
        let (head, tail) = n.value().split_at(2);
        let chained = Buf::chain(head, tail);
        assert_eq!(PName::from_buf(&chained).unwrap_err(), NameError::Fragmented);

        let contiguous = &n.value()[..];
        assert_eq!(PName::from_buf(&contiguous).unwrap().n_comps(), 2);
    }

    #[test]
    fn test_prefix_hash_cached_equals_direct() {
        for n in [name("/"), name("/a/b/c"), long_name(NAME_N_CACHED_COMPS + 5)] {
            assert_eq!(n.prefix_hash(0), empty_hash());
            for i in 1..=n.len() {
                let direct = compute_hash(&n.value()[..n.comp_end(i - 1)]);
                assert_eq!(n.prefix_hash(i), direct, "prefix {} of {}", i, n);
                assert_eq!(n.prefix(i).compute_hash(), direct);
            }
            assert_eq!(n.compute_hash(), n.prefix_hash(n.len()));
        }
    }

    #[test]
    fn test_compare_basic() {
        let abc = name("/a/b/c");
        assert_eq!(abc.compare(&abc), NameCompareResult::Equal);
        assert_eq!(name("/a/b").compare(&abc), NameCompareResult::LhsIsPrefix);
        assert_eq!(abc.compare(&name("/a/b")), NameCompareResult::RhsIsPrefix);
        assert_eq!(abc.compare(&name("/a/b/d")), NameCompareResult::LessThan);
        assert_eq!(name("/a/b/d").compare(&abc), NameCompareResult::GreaterThan);
        assert_eq!(name("/").compare(&abc), NameCompareResult::LhsIsPrefix);
    }

    #[test]
    fn test_compare_canonical_order() {
        // shorter component sorts first even when its octets are larger
        assert_eq!(name("/z").compare(&name("/aa")), NameCompareResult::LessThan);
        // lower TLV-TYPE sorts first
        assert_eq!(name("/9=z").compare(&name("/a")), NameCompareResult::GreaterThan);
        assert_eq!(name("/b/c").compare(&name("/aa")), NameCompareResult::LessThan);
    }

    #[test]
    fn test_compare_antisymmetric() {
        let names = [
            name("/"),
            name("/a"),
            name("/a/b"),
            name("/a/c"),
            name("/aa"),
            name("/b"),
            name("/33=x/y"),
            long_name(20),
            long_name(21),
        ];
        for a in &names {
            assert_eq!(a.compare(a), NameCompareResult::Equal);
            let extended = a.append_generic(b"extra").unwrap();
            assert_eq!(a.compare(&extended), NameCompareResult::LhsIsPrefix);
            for b in &names {
                assert_eq!(a.compare(b), b.compare(a).reverse(), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_uri_round_trip() {
        for uri in ["/", "/a/b", "/%00%FF/x", "/.../....", "/32=meta/v", "/a/sha256digest=0000000000000000000000000000000000000000000000000000000000000000"] {
            let n = name(uri);
            assert_eq!(n.to_string(), uri);
            assert_eq!(Name::from_uri(&n.to_string()).unwrap(), n);
        }
        assert_eq!(name("ndn:/a"), name("/a"));
        assert!(Name::from_uri("/%4").is_err());
        assert!(Name::from_uri("/..").is_err());
    }
}
