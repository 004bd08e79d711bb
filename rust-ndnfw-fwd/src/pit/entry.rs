//! PIT entry and its downstream/upstream records.

use super::arena::{ExtArena, ExtIdx};
use super::iter::{self, Dn, PitDnIt, PitUpIt, Slots, Up};
use crate::config::SuppressConfig;
use arrayvec::ArrayVec;
use rust_ndnfw_common::{FaceId, Interest, InterestGuiders, NackReason};
use std::time::{Duration, Instant};

/// Downstream slots stored inline in the entry.
pub const PIT_MAX_DNS: usize = 6;
/// Upstream slots stored inline in the entry.
pub const PIT_MAX_UPS: usize = 2;
/// Downstream slots per extension block.
pub const PIT_MAX_EXT_DNS: usize = 16;
/// Upstream slots per extension block.
pub const PIT_MAX_EXT_UPS: usize = 8;
/// Rejected nonces remembered per upstream.
pub const PIT_MAX_REJ_NONCES: usize = 4;

/// A requester waiting for a reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitDn {
    /// `FaceId::NONE` marks an unused slot.
    pub face: FaceId,
    pub nonce: u32,
    pub expiry: Option<Instant>,
    /// Token to return with the reply.
    pub token: u64,
}

impl PitDn {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.map_or(true, |t| t < now)
    }
}

/// A path this entry has forwarded the Interest along.
#[derive(Debug, Clone, Default)]
pub struct PitUp {
    /// `FaceId::NONE` marks an unused slot.
    pub face: FaceId,
    /// Nonce of the last transmission.
    pub nonce: u32,
    /// Outcome; `None` while a reply is pending.
    pub nack: Option<NackReason>,
    pub last_tx: Option<Instant>,
    /// Retransmissions are suppressed until `last_tx + suppress`.
    pub suppress: Duration,
    pub n_tx: u32,
    rejected: ArrayVec<u32, PIT_MAX_REJ_NONCES>,
}

impl PitUp {
    /// Remember a nonce the upstream reported as duplicate.
    pub fn add_rejected_nonce(&mut self, nonce: u32) {
        if self.rejected.contains(&nonce) {
            return;
        }
        if self.rejected.is_full() {
            self.rejected.remove(0);
        }
        self.rejected.push(nonce);
    }

    pub fn has_rejected_nonce(&self, nonce: u32) -> bool {
        self.rejected.contains(&nonce)
    }

    /// Whether a retransmission now would come too soon after the last one.
    pub fn should_suppress(&self, now: Instant) -> bool {
        self.last_tx.map_or(false, |t| now < t + self.suppress)
    }

    /// Record a transmission, growing the suppression interval.
    pub fn record_tx(&mut self, now: Instant, nonce: u32, cfg: &SuppressConfig) {
        self.suppress = if self.n_tx == 0 {
            cfg.min()
        } else {
            self.suppress.mul_f64(cfg.multiplier).min(cfg.max())
        };
        self.nonce = nonce;
        self.last_tx = Some(now);
        self.n_tx += 1;
        self.nack = None;
    }

    /// Whether this upstream still owes a reply.
    pub fn is_pending(&self) -> bool {
        !self.face.is_none() && self.nack.is_none()
    }
}

/// One outstanding Interest for a name.
#[derive(Debug)]
pub struct PitEntry {
    pub(crate) token: u64,
    pub(crate) interest: Interest,
    pub(crate) expiry: Instant,
    /// Key under which the table's expiry index holds this entry.
    pub(crate) sweep_at: Instant,
    pub(crate) tx_hop_limit: u8,
    pub(crate) fib_prefix_len: usize,
    pub(crate) fib_seq: u64,
    pub(crate) dns: [PitDn; PIT_MAX_DNS],
    pub(crate) ups: [PitUp; PIT_MAX_UPS],
    pub(crate) ext: Option<ExtIdx>,
    pub(crate) n_dns: usize,
    pub(crate) n_ups: usize,
}

impl PitEntry {
    pub(crate) fn new(token: u64, interest: Interest, now: Instant) -> Self {
        Self {
            token,
            tx_hop_limit: interest.hop_limit.saturating_sub(1),
            interest,
            expiry: now,
            sweep_at: now,
            fib_prefix_len: 0,
            fib_seq: 0,
            dns: Default::default(),
            ups: Default::default(),
            ext: None,
            n_dns: 0,
            n_ups: 0,
        }
    }

    /// PIT token of this entry (48 bits).
    pub fn token(&self) -> u64 {
        self.token
    }

    /// The Interest that created this entry.
    pub fn interest(&self) -> &Interest {
        &self.interest
    }

    /// Latest downstream expiry.
    pub fn expiry(&self) -> Instant {
        self.expiry
    }

    pub fn n_dns(&self) -> usize {
        self.n_dns
    }

    pub fn n_ups(&self) -> usize {
        self.n_ups
    }

    pub fn has_ext(&self) -> bool {
        self.ext.is_some()
    }

    /// Remember which FIB entry this Interest was forwarded under.
    pub(crate) fn set_fib_entry(&mut self, prefix_len: usize, seq: u64) {
        self.fib_prefix_len = prefix_len;
        self.fib_seq = seq;
    }

    pub fn fib_entry_ref(&self) -> (usize, u64) {
        (self.fib_prefix_len, self.fib_seq)
    }

    /// Occupied downstream records in slot order.
    pub fn dns<'a>(&'a self, arena: &'a ExtArena) -> Slots<'a, Dn> {
        Slots::new(self, arena)
    }

    /// Occupied upstream records in slot order.
    pub fn ups<'a>(&'a self, arena: &'a ExtArena) -> Slots<'a, Up> {
        Slots::new(self, arena)
    }

    pub fn find_dn(&self, arena: &ExtArena, face: FaceId) -> Option<PitDnIt> {
        iter::find::<Dn>(self, arena, face)
    }

    pub fn find_up(&self, arena: &ExtArena, face: FaceId) -> Option<PitUpIt> {
        iter::find::<Up>(self, arena, face)
    }

    /// Find the downstream record for `face`, or add one.
    ///
    /// Returns `None` if a new record is needed but no extension block is
    /// available.
    pub fn insert_dn<'a>(&'a mut self, arena: &'a mut ExtArena, face: FaceId) -> Option<&'a mut PitDn> {
        let it = match self.find_dn(arena, face) {
            Some(it) => it,
            None => {
                let it = iter::append::<Dn>(self, arena)?;
                let dn = it.get_mut(self, arena);
                *dn = PitDn {
                    face,
                    ..Default::default()
                };
                it
            }
        };
        Some(it.get_mut(self, arena))
    }

    /// Find the upstream record for `face`, or add one.
    pub fn insert_up<'a>(&'a mut self, arena: &'a mut ExtArena, face: FaceId) -> Option<&'a mut PitUp> {
        let it = match self.find_up(arena, face) {
            Some(it) => it,
            None => {
                let it = iter::append::<Up>(self, arena)?;
                let up = it.get_mut(self, arena);
                *up = PitUp {
                    face,
                    ..Default::default()
                };
                it
            }
        };
        Some(it.get_mut(self, arena))
    }

    /// Record an Interest arrival from `face`.
    ///
    /// Returns `false` when the downstream record cannot be stored.
    pub fn record_rx(&mut self, arena: &mut ExtArena, face: FaceId, interest: &Interest, token: u64, now: Instant) -> bool {
        let expiry = now + interest.lifetime;
        let Some(dn) = self.insert_dn(arena, face) else {
            return false;
        };
        dn.nonce = interest.nonce;
        dn.expiry = Some(expiry);
        dn.token = token;
        self.expiry = self.expiry.max(expiry);
        true
    }

    /// Whether a live downstream on another face already carries `nonce`.
    pub fn has_duplicate_nonce(&self, arena: &ExtArena, face: FaceId, nonce: u32, now: Instant) -> bool {
        self.dns(arena)
            .any(|dn| dn.face != face && dn.nonce == nonce && !dn.is_expired(now))
    }

    /// Pick a nonce to send toward `up`: `preferred` unless the upstream
    /// rejected it, otherwise the first live downstream nonce it has not
    /// rejected.
    pub fn choose_nonce(&self, arena: &ExtArena, up: &PitUp, preferred: u32, now: Instant) -> Option<u32> {
        if !up.has_rejected_nonce(preferred) {
            return Some(preferred);
        }
        self.dns(arena)
            .filter(|dn| !dn.is_expired(now))
            .map(|dn| dn.nonce)
            .find(|&nonce| !up.has_rejected_nonce(nonce))
    }

    /// Guiders for an Interest sent now: remaining lifetime and decremented hop limit.
    pub fn tx_guiders(&self, nonce: u32, now: Instant) -> InterestGuiders {
        InterestGuiders {
            nonce,
            lifetime: self.expiry.saturating_duration_since(now),
            hop_limit: self.tx_hop_limit,
        }
    }
}
