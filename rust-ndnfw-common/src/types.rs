//! Identifiers shared between the forwarding pipeline and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a face.
///
/// Zero is reserved: it marks an unused PIT slot and never names a real face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FaceId(pub u16);

impl FaceId {
    /// Empty-slot sentinel.
    pub const NONE: FaceId = FaceId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for FaceId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// Number of low bits of a forwarding token that carry the PIT entry token.
pub const PIT_TOKEN_BITS: u32 = 48;

/// Mask selecting the PIT entry token.
pub const PIT_TOKEN_MASK: u64 = (1 << PIT_TOKEN_BITS) - 1;

/// Correlation token attached to forwarded Interests and echoed in Data/Nack.
///
/// Bits 56..64 hold the forwarding worker id and bits 0..48 the PIT entry
/// token, so a reply can be steered to the owning worker and entry without a
/// name lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FwToken(pub u64);

impl FwToken {
    pub fn new(worker: u8, pit_token: u64) -> Self {
        Self(((worker as u64) << 56) | (pit_token & PIT_TOKEN_MASK))
    }

    pub fn worker(self) -> u8 {
        (self.0 >> 56) as u8
    }

    pub fn pit_token(self) -> u64 {
        self.0 & PIT_TOKEN_MASK
    }
}

impl fmt::Display for FwToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
