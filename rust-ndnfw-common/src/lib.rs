//! Common types and utilities for the NDN forwarding core.
//!
//! This crate provides the name engine, the packet model and the shared
//! identifiers used by the forwarding pipeline and its tools.

pub mod error;
pub mod mempool;
pub mod metrics;
pub mod name;
pub mod packet;
pub mod tlv;
pub mod types;

/// Reexport of common types
pub use error::{Error, NameError};
pub use name::{LName, Name, NameCompareResult, PName};
pub use packet::{Data, Interest, InterestGuiders, L3Packet, Nack, NackReason, OutPacket};
pub use types::{FaceId, FwToken};

pub type Result<T> = std::result::Result<T, Error>;
