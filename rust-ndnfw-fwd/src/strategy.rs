//! Forwarding strategies.
//!
//! A strategy is bound to a FIB entry and invoked by the pipeline once per
//! event with an [`SgCtx`]. During the call it may forward the Interest to
//! nexthops or return Nacks to the downstreams; it cannot keep the context
//! after returning.

use crate::fib::FibEntry;
use crate::pit::{ExtArena, PitEntry};
use rust_ndnfw_common::{FaceId, NackReason};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// What triggered a strategy invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgEvent {
    Interest,
    Data,
    /// An upstream Nack that did not resolve the entry by itself.
    Nack { face: FaceId, reason: NackReason },
}

/// Result of [`SgCtx::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgForwardResult {
    Ok,
    /// Face is down, unknown, or a downstream of this entry.
    BadFace,
    /// Hop limit would reach zero.
    HopZero,
    /// The path's congestion window is full.
    Congested,
    /// Too soon after the previous transmission to this face.
    Suppressed,
    /// Every candidate nonce was rejected by this upstream.
    NoNonce,
    /// No room for another upstream record.
    UpFull,
    /// No outgoing packet header available.
    AllocError,
}

impl SgForwardResult {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Pipeline primitives a strategy can reach through its context.
pub trait SgHost {
    fn sg_forward(&mut self, token: u64, face: FaceId, now: Instant) -> SgForwardResult;
    fn sg_return_nacks(&mut self, token: u64, reason: NackReason, now: Instant);
    fn sg_pit_entry(&self, token: u64) -> Option<(&PitEntry, &ExtArena)>;
    fn sg_is_down(&self, face: FaceId) -> bool;
}

/// Context for one strategy invocation.
pub struct SgCtx<'a> {
    host: &'a mut dyn SgHost,
    token: u64,
    fib_entry: &'a FibEntry,
    event: SgEvent,
    now: Instant,
    n_forwarded: usize,
    nacks_returned: Option<NackReason>,
}

impl<'a> SgCtx<'a> {
    pub fn new(host: &'a mut dyn SgHost, token: u64, fib_entry: &'a FibEntry, event: SgEvent, now: Instant) -> Self {
        Self {
            host,
            token,
            fib_entry,
            event,
            now,
            n_forwarded: 0,
            nacks_returned: None,
        }
    }

    pub fn event(&self) -> SgEvent {
        self.event
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn fib_entry(&self) -> &FibEntry {
        self.fib_entry
    }

    pub fn nexthops(&self) -> &'a [FaceId] {
        self.fib_entry.nexthops()
    }

    pub fn is_down(&self, face: FaceId) -> bool {
        self.host.sg_is_down(face)
    }

    /// The PIT entry and the arena holding its extension blocks.
    pub fn pit_entry(&self) -> Option<(&PitEntry, &ExtArena)> {
        self.host.sg_pit_entry(self.token)
    }

    /// Whether the entry has an upstream record for `face`.
    pub fn has_upstream(&self, face: FaceId) -> bool {
        self.pit_entry()
            .map_or(false, |(entry, arena)| entry.find_up(arena, face).is_some())
    }

    /// Whether some upstream is still waiting for Data or a Nack.
    pub fn has_pending_upstream(&self) -> bool {
        self.pit_entry()
            .map_or(false, |(entry, arena)| entry.ups(arena).any(|up| up.is_pending()))
    }

    /// Forward the Interest to `face`.
    pub fn forward(&mut self, face: FaceId) -> SgForwardResult {
        let res = self.host.sg_forward(self.token, face, self.now);
        if res.is_ok() {
            self.n_forwarded += 1;
        }
        res
    }

    /// Send a Nack to every downstream.
    pub fn return_nacks(&mut self, reason: NackReason) {
        self.host.sg_return_nacks(self.token, reason, self.now);
        self.nacks_returned = Some(reason);
    }

    /// Interests forwarded during this invocation.
    pub fn n_forwarded(&self) -> usize {
        self.n_forwarded
    }

    /// Reason of the Nacks returned during this invocation, if any.
    pub fn nacks_returned(&self) -> Option<NackReason> {
        self.nacks_returned
    }
}

pub trait Strategy: Send + Sync + fmt::Debug {
    fn id(&self) -> u32;
    fn name(&self) -> &str;
    /// Handle one event; the result code is only logged.
    fn invoke(&self, ctx: &mut SgCtx<'_>) -> u64;
}

/// Forward to every nexthop.
#[derive(Debug, Default)]
pub struct Multicast;

impl Strategy for Multicast {
    fn id(&self) -> u32 {
        1
    }

    fn name(&self) -> &str {
        "multicast"
    }

    fn invoke(&self, ctx: &mut SgCtx<'_>) -> u64 {
        if ctx.event() != SgEvent::Interest {
            return 0;
        }
        for &nh in ctx.nexthops() {
            ctx.forward(nh);
        }
        if ctx.n_forwarded() == 0 && !ctx.has_pending_upstream() {
            ctx.return_nacks(NackReason::NoRoute);
        }
        ctx.n_forwarded() as u64
    }
}

/// Forward to the first usable nexthop; on Nack, move on to the next one.
#[derive(Debug, Default)]
pub struct BestRoute;

impl BestRoute {
    fn forward_first(ctx: &mut SgCtx<'_>, untried_only: bool) -> bool {
        for &nh in ctx.nexthops() {
            if ctx.is_down(nh) || (untried_only && ctx.has_upstream(nh)) {
                continue;
            }
            if ctx.forward(nh).is_ok() {
                return true;
            }
        }
        false
    }
}

impl Strategy for BestRoute {
    fn id(&self) -> u32 {
        2
    }

    fn name(&self) -> &str {
        "best-route"
    }

    fn invoke(&self, ctx: &mut SgCtx<'_>) -> u64 {
        match ctx.event() {
            SgEvent::Interest => {
                if !Self::forward_first(ctx, false) && !ctx.has_pending_upstream() {
                    ctx.return_nacks(NackReason::NoRoute);
                }
            }
            SgEvent::Nack { .. } => {
                Self::forward_first(ctx, true);
            }
            SgEvent::Data => {}
        }
        ctx.n_forwarded() as u64
    }
}

/// Strategies selectable by name when a FIB entry is inserted.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    by_name: HashMap<String, Arc<dyn Strategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self { by_name: HashMap::new() }
    }

    /// Registry with `multicast` and `best-route`.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register(Arc::new(Multicast));
        reg.register(Arc::new(BestRoute));
        reg
    }

    /// Add a strategy, replacing any with the same name.
    pub fn register(&mut self, sg: Arc<dyn Strategy>) {
        self.by_name.insert(sg.name().to_string(), sg);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
        self.by_name.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
