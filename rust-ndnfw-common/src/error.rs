//! Error types for the NDN forwarding core.

use thiserror::Error;

/// All possible errors that can occur outside the packet pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Error related to TLV encoding/decoding.
    #[error("TLV error: {0}")]
    Tlv(String),

    /// Malformed name.
    #[error("name error: {0}")]
    Name(#[from] NameError),

    /// Error related to NDN packet processing.
    #[error("NDN packet error: {0}")]
    NdnPacket(String),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}

/// Reasons a Name element is rejected by the parser.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    /// TLV-LENGTH of the Name element exceeds [`crate::name::NAME_MAX_LENGTH`].
    #[error("name is {0} octets, exceeds maximum")]
    TooLong(usize),

    /// Component TLV-TYPE is outside 1..=32767.
    #[error("bad name component type {0}")]
    BadComponentType(u64),

    /// ImplicitSha256DigestComponent is not 32 octets.
    #[error("digest component has length {0}, expected 32")]
    BadDigestLength(usize),

    /// A component follows the ImplicitSha256DigestComponent.
    #[error("name has a component after the digest component")]
    ComponentAfterDigest,

    /// TLV-VALUE is not in one contiguous buffer.
    #[error("name is not in contiguous memory")]
    Fragmented,

    /// TLV-TYPE, TLV-LENGTH or TLV-VALUE runs past the end of input.
    #[error("name component is truncated")]
    Truncated,
}
