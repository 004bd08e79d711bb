//! Forwarding core for the NDN forwarder.
//!
//! This crate provides the Pending Interest Table, the FIB, forwarding
//! strategies, per-path congestion control, and the Interest/Data/Nack
//! pipeline that ties them together, plus a dispatcher running one pipeline
//! per tokio worker task.

pub mod config;
pub mod congestion;
pub mod dispatch;
pub mod fib;
pub mod fwd;
pub mod pit;
pub mod strategy;

pub use config::FwdConfig;
pub use dispatch::{DispatchError, Dispatcher};
pub use fib::{Fib, FibEntry};
pub use fwd::{DropReason, FaceTable, Forwarder, FwdCounters, RxOutcome};
pub use strategy::{SgCtx, SgEvent, SgForwardResult, Strategy, StrategyRegistry};
