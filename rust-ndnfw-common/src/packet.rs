//! NDN packet types as seen by the forwarding pipeline.
//!
//! Only the fields the pipeline reads or rewrites are modeled; everything
//! else about the wire encoding is the face's business.

use crate::mempool::{HeaderPool, Lease};
use crate::name::Name;
use crate::types::FaceId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default InterestLifetime.
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_millis(4000);

/// HopLimit of an Interest that carries none.
pub const DEFAULT_HOP_LIMIT: u8 = 255;

/// Nack reason, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NackReason {
    Congestion = 50,
    Duplicate = 100,
    NoRoute = 150,
    Unspecified = 255,
}

impl NackReason {
    /// Decode an NDNLPv2 NackReason; unknown codes are `Unspecified`.
    pub fn from_code(code: u64) -> Self {
        match code {
            50 => Self::Congestion,
            100 => Self::Duplicate,
            150 => Self::NoRoute,
            _ => Self::Unspecified,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// The less severe of two reasons.
    pub fn least_severe(self, other: Self) -> Self {
        self.min(other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Congestion => "Congestion",
            Self::Duplicate => "Duplicate",
            Self::NoRoute => "NoRoute",
            Self::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for NackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interest fields a forwarder rewrites on each hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestGuiders {
    pub nonce: u32,
    pub lifetime: Duration,
    pub hop_limit: u8,
}

impl fmt::Display for InterestGuiders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nonce={:08x} lifetime={} hopLimit={}",
            self.nonce,
            self.lifetime.as_millis(),
            self.hop_limit
        )
    }
}

/// Represents an NDN Interest packet.
#[derive(Debug, Clone)]
pub struct Interest {
    /// The name requested in the Interest.
    pub name: Name,

    /// Whether Data whose name extends `name` can satisfy this Interest.
    pub can_be_prefix: bool,

    /// Whether cached Data must still be fresh.
    pub must_be_fresh: bool,

    /// A nonce value to detect loops.
    pub nonce: u32,

    pub lifetime: Duration,

    /// Hop limit (similar to IP TTL).
    pub hop_limit: u8,
}

impl Interest {
    /// Creates a new Interest packet.
    pub fn new(name: Name) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0));

        Self {
            name,
            can_be_prefix: false,
            must_be_fresh: false,
            nonce: (now.as_nanos() % u32::MAX as u128) as u32,
            lifetime: DEFAULT_INTEREST_LIFETIME,
            hop_limit: DEFAULT_HOP_LIMIT,
        }
    }

    /// Sets the nonce value.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the Interest lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Sets the can_be_prefix flag.
    pub fn with_can_be_prefix(mut self, can_be_prefix: bool) -> Self {
        self.can_be_prefix = can_be_prefix;
        self
    }

    /// Sets the must_be_fresh flag.
    pub fn with_must_be_fresh(mut self, must_be_fresh: bool) -> Self {
        self.must_be_fresh = must_be_fresh;
        self
    }

    pub fn guiders(&self) -> InterestGuiders {
        InterestGuiders {
            nonce: self.nonce,
            lifetime: self.lifetime,
            hop_limit: self.hop_limit,
        }
    }

    /// Copy this Interest with new guiders into a header taken from `pool`.
    ///
    /// Returns `None` when the pool is exhausted.
    pub fn modify_guiders(&self, guiders: InterestGuiders, pool: &HeaderPool) -> Option<(Interest, Lease)> {
        let lease = pool.try_alloc()?;
        let mut out = self.clone();
        out.nonce = guiders.nonce;
        out.lifetime = guiders.lifetime;
        out.hop_limit = guiders.hop_limit;
        Some((out, lease))
    }
}

/// Represents an NDN Data packet.
#[derive(Debug, Clone)]
pub struct Data {
    /// The name of the Data packet.
    pub name: Name,

    /// The content of the Data packet.
    pub content: Bytes,

    pub freshness: Duration,
}

impl Data {
    /// Creates a new Data packet.
    pub fn new(name: Name, content: impl Into<Bytes>) -> Self {
        Self {
            name,
            content: content.into(),
            freshness: Duration::ZERO,
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Whether this Data satisfies an Interest with the given name and CanBePrefix.
    pub fn can_satisfy(&self, name: &Name, can_be_prefix: bool) -> bool {
        if can_be_prefix {
            name.is_prefix_of(&self.name)
        } else {
            *name == self.name
        }
    }
}

/// Represents an NDN Nack: an Interest returned with a reason.
#[derive(Debug, Clone)]
pub struct Nack {
    pub interest: Interest,
    pub reason: NackReason,
}

impl Nack {
    pub fn from_interest(interest: Interest, reason: NackReason) -> Self {
        Self { interest, reason }
    }
}

/// Network layer packet.
#[derive(Debug, Clone)]
pub enum L3Packet {
    Interest(Interest),
    Data(Data),
    Nack(Nack),
}

impl L3Packet {
    pub fn name(&self) -> &Name {
        match self {
            L3Packet::Interest(interest) => &interest.name,
            L3Packet::Data(data) => &data.name,
            L3Packet::Nack(nack) => &nack.interest.name,
        }
    }
}

/// A packet received from a face.
#[derive(Debug, Clone)]
pub struct RxPacket {
    pub face: FaceId,
    /// Token carried in the link-layer header.
    pub token: u64,
    pub l3: L3Packet,
}

impl RxPacket {
    pub fn new(face: FaceId, token: u64, l3: L3Packet) -> Self {
        Self { face, token, l3 }
    }
}

/// A packet handed to a face for transmission.
///
/// It owns one header from the forwarder's pool until dropped.
#[derive(Debug)]
pub struct OutPacket {
    pub l3: L3Packet,
    /// Token to place in the link-layer header.
    pub token: u64,
    _lease: Lease,
}

impl OutPacket {
    pub fn new(l3: L3Packet, token: u64, lease: Lease) -> Self {
        Self {
            l3,
            token,
            _lease: lease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_nack_reason_severity() {
        assert!(NackReason::Congestion < NackReason::Duplicate);
        assert!(NackReason::Duplicate < NackReason::NoRoute);
        assert!(NackReason::NoRoute < NackReason::Unspecified);
        assert_eq!(
            NackReason::NoRoute.least_severe(NackReason::Congestion),
            NackReason::Congestion
        );
        assert_eq!(NackReason::from_code(150), NackReason::NoRoute);
        assert_eq!(NackReason::from_code(7), NackReason::Unspecified);
        assert_eq!(NackReason::Duplicate.code(), 100);
    }

    #[test]
    fn test_modify_guiders() {
        let pool = HeaderPool::new(1);
        let interest = Interest::new(name("/a")).with_nonce(1).with_hop_limit(10);
        let guiders = InterestGuiders {
            nonce: 2,
            lifetime: Duration::from_millis(500),
            hop_limit: 9,
        };

        let (out, lease) = interest.modify_guiders(guiders, &pool).unwrap();
        assert_eq!(out.guiders(), guiders);
        assert_eq!(out.name, interest.name);
        assert_eq!(interest.nonce, 1);
        assert!(interest.modify_guiders(guiders, &pool).is_none());

        drop(lease);
        assert!(interest.modify_guiders(guiders, &pool).is_some());
    }

    #[test]
    fn test_data_can_satisfy() {
        let data = Data::new(name("/a/b/c"), &b"payload"[..]);
        assert!(data.can_satisfy(&name("/a/b/c"), false));
        assert!(!data.can_satisfy(&name("/a/b"), false));
        assert!(data.can_satisfy(&name("/a/b"), true));
        assert!(!data.can_satisfy(&name("/a/x"), true));
    }
}
