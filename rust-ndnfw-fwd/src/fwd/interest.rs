use super::{DropReason, Forwarder, RxOutcome};
use crate::pit::PitInsert;
use crate::strategy::{SgCtx, SgEvent};
use log::debug;
use rust_ndnfw_common::{FaceId, Interest, L3Packet, Nack, NackReason, OutPacket};
use std::sync::Arc;
use std::time::Instant;

impl Forwarder {
    pub(crate) fn rx_interest(&mut self, face: FaceId, token: u64, interest: Interest, now: Instant) -> RxOutcome {
        self.counters.n_rx_interests.increment();
        debug!(
            "[Fwd {}] interest-from={} name={} {} dn-token={:016x}",
            self.id,
            face,
            interest.name,
            interest.guiders(),
            token
        );

        if interest.hop_limit == 0 {
            self.counters.n_hop_zero.increment();
            debug!("[Fwd {}] ^ drop=hop-zero", self.id);
            return RxOutcome::Dropped(DropReason::HopZero);
        }

        let fib = Arc::clone(&self.fib);
        let rs = fib.read();
        let Some(fib_entry) = rs.lpm(&interest.name) else {
            self.counters.n_no_fib.increment();
            debug!("[Fwd {}] ^ drop=no-FIB-match nack-to={}", self.id, face);
            self.reply_nack(face, token, interest, NackReason::NoRoute);
            return RxOutcome::Nacked(NackReason::NoRoute);
        };

        let (pit_token, is_new) = match self.pit.insert(&interest, now) {
            PitInsert::New(t) => (t, true),
            PitInsert::Existing(t) => (t, false),
            PitInsert::Full => {
                self.counters.n_pit_full.increment();
                debug!("[Fwd {}] ^ drop=PIT-full", self.id);
                return RxOutcome::Dropped(DropReason::PitFull);
            }
        };
        self.counters.pit_size.set(self.pit.len() as u64);

        let Some((entry, arena)) = self.pit.entry_mut(pit_token) else {
            return RxOutcome::Dropped(DropReason::NoPitEntry);
        };
        if !is_new && entry.has_duplicate_nonce(arena, face, interest.nonce, now) {
            self.counters.n_dup_nonce.increment();
            debug!(
                "[Fwd {}] ^ drop=duplicate-nonce nonce={:08x} nack-to={}",
                self.id, interest.nonce, face
            );
            self.reply_nack(face, token, interest, NackReason::Duplicate);
            return RxOutcome::Nacked(NackReason::Duplicate);
        }
        if !entry.record_rx(arena, face, &interest, token, now) {
            self.counters.n_dn_full.increment();
            debug!("[Fwd {}] ^ drop=PitDn-full", self.id);
            if is_new {
                self.erase_entry(pit_token, now, false, None);
            }
            return RxOutcome::Dropped(DropReason::DnFull);
        }
        entry.set_fib_entry(fib_entry.prefix().len(), fib_entry.seq());
        let dyns = fib_entry.dyn_for(self.id);
        if let Some(d) = dyns {
            d.n_rx_interests.increment();
        }
        debug!(
            "[Fwd {}] ^ pit-entry token={:012x} new={} fib-entry-depth={}",
            self.id,
            pit_token,
            is_new,
            fib_entry.prefix().len()
        );

        let sg = Arc::clone(fib_entry.strategy());
        let mut ctx = SgCtx::new(self, pit_token, fib_entry, SgEvent::Interest, now);
        let res = sg.invoke(&mut ctx);
        let n_forwarded = ctx.n_forwarded();
        let returned = ctx.nacks_returned();
        drop(ctx);
        if let Some(d) = dyns {
            d.n_tx_interests.add(n_forwarded as u64);
        }
        drop(rs);
        debug!(
            "[Fwd {}] ^ sg-id={} sg-res={} sg-forwarded={}",
            self.id,
            sg.id(),
            res,
            n_forwarded
        );

        if n_forwarded > 0 {
            return RxOutcome::Forwarded(n_forwarded);
        }
        let Some(reason) = returned else {
            return RxOutcome::Pending;
        };
        let n_pending = self
            .pit
            .entry(pit_token)
            .map_or(0, |(entry, arena)| entry.ups(arena).filter(|up| up.is_pending()).count());
        if n_pending == 0 {
            self.erase_entry(pit_token, now, false, None);
        }
        RxOutcome::Nacked(reason)
    }

    /// Return a Nack for an Interest that never made it into the PIT.
    fn reply_nack(&mut self, face: FaceId, token: u64, interest: Interest, reason: NackReason) {
        if self.faces.is_down(face) {
            debug!("[Fwd {}] ^ no-nack-to={} drop=face-down", self.id, face);
            return;
        }
        let Some(lease) = self.headers.try_alloc() else {
            self.counters.n_alloc_errors.increment();
            debug!("[Fwd {}] ^ no-nack-to={} drop=alloc-error", self.id, face);
            return;
        };
        let nack = Nack::from_interest(interest, reason);
        self.faces
            .transmit(face, OutPacket::new(L3Packet::Nack(nack), token, lease));
        self.counters.n_tx_nacks.increment();
    }
}
