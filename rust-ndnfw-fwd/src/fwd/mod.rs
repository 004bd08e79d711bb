//! The forwarding pipeline.
//!
//! A [`Forwarder`] is one worker: it owns a PIT, a header pool and the
//! congestion state of its upstream paths, and shares the FIB and face table
//! with the other workers. Every received packet is processed to completion
//! by one call to [`Forwarder::process`].

mod data;
mod interest;
mod nack;

use crate::config::{FwdConfig, SuppressConfig};
use crate::congestion::CongestionTable;
use crate::fib::Fib;
use crate::pit::{ExtArena, Pit, PitEntry};
use crate::strategy::{SgForwardResult, SgHost};
use log::debug;
use rust_ndnfw_common::mempool::HeaderPool;
use rust_ndnfw_common::metrics::{Counter, Gauge};
use rust_ndnfw_common::packet::RxPacket;
use rust_ndnfw_common::{FaceId, FwToken, InterestGuiders, L3Packet, Nack, NackReason, OutPacket};
use std::sync::Arc;
use std::time::Instant;

/// Face boundary.
pub trait FaceTable: Send + Sync {
    fn is_down(&self, face: FaceId) -> bool;
    /// Fire-and-forget send; the face owns the packet afterwards.
    fn transmit(&self, face: FaceId, pkt: OutPacket);
}

/// Per-worker forwarding counters.
#[derive(Debug, Default)]
pub struct FwdCounters {
    pub n_rx_interests: Counter,
    pub n_rx_data: Counter,
    pub n_rx_nacks: Counter,
    pub n_tx_interests: Counter,
    pub n_tx_data: Counter,
    pub n_tx_nacks: Counter,

    /// Interests arriving with HopLimit zero.
    pub n_hop_zero: Counter,
    pub n_no_fib: Counter,
    pub n_pit_full: Counter,
    /// Downstream record could not be added.
    pub n_dn_full: Counter,
    /// Interests looping back with a nonce seen on another face.
    pub n_dup_nonce: Counter,
    pub n_data_mismatch: Counter,
    pub n_nack_mismatch: Counter,
    pub n_nack_dup_retx: Counter,
    pub n_alloc_errors: Counter,
    pub n_expired: Counter,

    pub pit_size: Gauge,
}

/// Why a packet was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    HopZero,
    PitFull,
    DnFull,
    NoPitEntry,
    NoUpstream,
    WrongNonce,
}

/// Result of processing one received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxOutcome {
    /// Interest forwarded to this many upstreams.
    Forwarded(usize),
    /// Entry is waiting on upstreams; nothing sent downstream.
    Pending,
    /// Nacks returned downstream with this reason.
    Nacked(NackReason),
    /// Data returned to this many downstreams.
    Satisfied(usize),
    /// Interest resent upstream after a Duplicate Nack.
    Retransmitted,
    Dropped(DropReason),
}

pub struct Forwarder {
    id: u8,
    pit: Pit,
    fib: Arc<Fib>,
    faces: Arc<dyn FaceTable>,
    headers: HeaderPool,
    congestion: CongestionTable,
    suppress: SuppressConfig,
    counters: Arc<FwdCounters>,
}

impl Forwarder {
    pub fn new(id: u8, cfg: &FwdConfig, fib: Arc<Fib>, faces: Arc<dyn FaceTable>) -> Self {
        Self {
            id,
            pit: Pit::new(cfg.pit_capacity, cfg.ext_pool_capacity),
            fib,
            faces,
            headers: HeaderPool::new(cfg.header_pool_capacity),
            congestion: CongestionTable::new(cfg.congestion.enabled),
            suppress: cfg.suppress.clone(),
            counters: Arc::new(FwdCounters::default()),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn pit(&self) -> &Pit {
        &self.pit
    }

    pub fn congestion(&self) -> &CongestionTable {
        &self.congestion
    }

    pub fn counters(&self) -> &Arc<FwdCounters> {
        &self.counters
    }

    pub fn headers(&self) -> &HeaderPool {
        &self.headers
    }

    pub fn process(&mut self, pkt: RxPacket, now: Instant) -> RxOutcome {
        let RxPacket { face, token, l3 } = pkt;
        match l3 {
            L3Packet::Interest(interest) => self.rx_interest(face, token, interest, now),
            L3Packet::Data(data) => self.rx_data(face, token, data, now),
            L3Packet::Nack(nack) => self.rx_nack(face, token, nack, now),
        }
    }

    /// Erase every entry whose downstreams have all expired.
    ///
    /// Upstreams still pending count as timeouts on their paths.
    pub fn expire(&mut self, now: Instant) -> usize {
        let expired = self.pit.expired(now);
        for &token in &expired {
            debug!("[Fwd {}] expire token={:012x}", self.id, token);
            self.erase_entry(token, now, true, None);
        }
        self.counters.n_expired.add(expired.len() as u64);
        expired.len()
    }

    /// Erase a PIT entry, releasing the window slots of its pending upstreams
    /// other than `answered`.
    fn erase_entry(&mut self, token: u64, now: Instant, timeout: bool, answered: Option<FaceId>) {
        if let Some((entry, arena)) = self.pit.entry(token) {
            for up in entry
                .ups(arena)
                .filter(|up| up.is_pending() && Some(up.face) != answered)
            {
                if timeout {
                    self.congestion.on_timeout(up.face, now);
                } else {
                    self.congestion.on_cancel(up.face);
                }
            }
        }
        self.pit.erase(token);
        self.counters.pit_size.set(self.pit.len() as u64);
    }

    /// Forward the entry's Interest to `face`.
    pub(crate) fn forward_interest(&mut self, token: u64, face: FaceId, now: Instant) -> SgForwardResult {
        if face.is_none() || self.faces.is_down(face) {
            return SgForwardResult::BadFace;
        }
        let Some((entry, arena)) = self.pit.entry_mut(token) else {
            return SgForwardResult::BadFace;
        };
        if entry.dns(arena).any(|dn| dn.face == face && !dn.is_expired(now)) {
            return SgForwardResult::BadFace;
        }
        if entry.tx_hop_limit == 0 {
            return SgForwardResult::HopZero;
        }

        let existing = entry.find_up(arena, face).map(|it| it.get(entry, arena).clone());
        let was_pending = existing.as_ref().map_or(false, |up| up.is_pending() && up.n_tx > 0);
        if !was_pending && !self.congestion.may_send(face) {
            return SgForwardResult::Congested;
        }
        let up = existing.unwrap_or_default();
        if up.should_suppress(now) {
            return SgForwardResult::Suppressed;
        }

        let preferred = if up.n_tx > 0 { up.nonce } else { entry.interest.nonce };
        let Some(nonce) = entry.choose_nonce(arena, &up, preferred, now) else {
            return SgForwardResult::NoNonce;
        };

        let guiders = entry.tx_guiders(nonce, now);
        let Some((out, lease)) = entry.interest.modify_guiders(guiders, &self.headers) else {
            self.counters.n_alloc_errors.increment();
            debug!("[Fwd {}] ^ no-interest-to={} drop=alloc-error", self.id, face);
            return SgForwardResult::AllocError;
        };
        let Some(up) = entry.insert_up(arena, face) else {
            debug!("[Fwd {}] ^ no-interest-to={} drop=PitUp-full", self.id, face);
            return SgForwardResult::UpFull;
        };
        up.record_tx(now, nonce, &self.suppress);
        if !was_pending {
            self.congestion.on_tx(face);
        }

        let fw_token = FwToken::new(self.id, token);
        debug!(
            "[Fwd {}] ^ interest-to={} {} up-token={}",
            self.id, face, guiders, fw_token
        );
        self.faces
            .transmit(face, OutPacket::new(L3Packet::Interest(out), fw_token.0, lease));
        self.counters.n_tx_interests.increment();
        SgForwardResult::Ok
    }

    /// Send a Nack to every live downstream of the entry.
    ///
    /// Stops at the first allocation failure. Returns the number sent.
    pub(crate) fn tx_nacks(&self, token: u64, reason: NackReason, hop_limit: u8, now: Instant) -> usize {
        let Some((entry, arena)) = self.pit.entry(token) else {
            return 0;
        };
        let mut n = 0;
        for dn in entry.dns(arena) {
            if dn.is_expired(now) {
                continue;
            }
            if self.faces.is_down(dn.face) {
                debug!("[Fwd {}] ^ no-nack-to={} drop=face-down", self.id, dn.face);
                continue;
            }

            let guiders = InterestGuiders {
                nonce: dn.nonce,
                lifetime: entry.interest.lifetime,
                hop_limit,
            };
            let Some((out, lease)) = entry.interest.modify_guiders(guiders, &self.headers) else {
                self.counters.n_alloc_errors.increment();
                debug!("[Fwd {}] ^ no-nack-to={} drop=alloc-error", self.id, dn.face);
                break;
            };
            debug!(
                "[Fwd {}] ^ nack-to={} reason={} nonce={:08x} dn-token={:016x}",
                self.id, dn.face, reason, dn.nonce, dn.token
            );
            let nack = Nack::from_interest(out, reason);
            self.faces
                .transmit(dn.face, OutPacket::new(L3Packet::Nack(nack), dn.token, lease));
            self.counters.n_tx_nacks.increment();
            n += 1;
        }
        n
    }
}

impl SgHost for Forwarder {
    fn sg_forward(&mut self, token: u64, face: FaceId, now: Instant) -> SgForwardResult {
        self.forward_interest(token, face, now)
    }

    fn sg_return_nacks(&mut self, token: u64, reason: NackReason, now: Instant) {
        self.tx_nacks(token, reason, 1, now);
    }

    fn sg_pit_entry(&self, token: u64) -> Option<(&PitEntry, &ExtArena)> {
        self.pit.entry(token)
    }

    fn sg_is_down(&self, face: FaceId) -> bool {
        self.faces.is_down(face)
    }
}
