use super::{DropReason, Forwarder, RxOutcome};
use crate::fib::FibEntryDyn;
use crate::strategy::{SgCtx, SgEvent};
use log::debug;
use rust_ndnfw_common::{FaceId, FwToken, L3Packet, Nack, NackReason, OutPacket};
use std::sync::Arc;
use std::time::Instant;

impl Forwarder {
    pub(crate) fn rx_nack(&mut self, face: FaceId, token: u64, nack: Nack, now: Instant) -> RxOutcome {
        self.counters.n_rx_nacks.increment();
        let reason = nack.reason;
        let pit_token = FwToken(token).pit_token();
        debug!(
            "[Fwd {}] nack-from={} up-token={:016x} reason={}",
            self.id, face, token, reason
        );

        if self.pit.find_by_nack(pit_token, &nack).is_none() {
            self.counters.n_nack_mismatch.increment();
            debug!("[Fwd {}] ^ drop=no-PIT-entry", self.id);
            return RxOutcome::Dropped(DropReason::NoPitEntry);
        }
        let Some((entry, arena)) = self.pit.entry_mut(pit_token) else {
            return RxOutcome::Dropped(DropReason::NoPitEntry);
        };

        // the upstream this Nack answers, and the state of all the others
        let Some(it) = entry.find_up(arena, face) else {
            self.counters.n_nack_mismatch.increment();
            debug!("[Fwd {}] ^ drop=no-PitUp", self.id);
            return RxOutcome::Dropped(DropReason::NoUpstream);
        };
        let up_nonce = it.get(entry, arena).nonce;
        if up_nonce != nack.interest.nonce {
            self.counters.n_nack_mismatch.increment();
            debug!(
                "[Fwd {}] ^ drop=wrong-nonce up-nonce={:08x} nack-nonce={:08x}",
                self.id, up_nonce, nack.interest.nonce
            );
            return RxOutcome::Dropped(DropReason::WrongNonce);
        }
        let mut n_pending = 0;
        let mut least_severe = reason;
        for up in entry.ups(arena).filter(|up| up.face != face) {
            match up.nack {
                None => n_pending += 1,
                Some(r) => least_severe = least_severe.least_severe(r),
            }
        }

        // a repeated Nack for an upstream that already has an outcome holds no window slot
        let was_pending = it.get(entry, arena).is_pending();
        it.get_mut(entry, arena).nack = Some(reason);
        let name = entry.interest().name.clone();
        let (prefix_len, seq) = entry.fib_entry_ref();
        if was_pending {
            self.congestion
                .on_nack(face, reason == NackReason::Congestion, now);
        }

        let fib = Arc::clone(&self.fib);
        let rs = fib.read();
        let fib_entry = rs.find_again(&name, prefix_len, seq);
        let dyns = fib_entry.and_then(|e| e.dyn_for(self.id));
        if let Some(d) = dyns {
            d.n_rx_nacks.increment();
        }

        if reason == NackReason::Duplicate && self.retransmit_duplicate(pit_token, face, dyns, now) {
            return RxOutcome::Retransmitted;
        }

        let mut n_forwarded = 0;
        if let Some(fib_entry) = fib_entry {
            let sg = Arc::clone(fib_entry.strategy());
            let mut ctx = SgCtx::new(self, pit_token, fib_entry, SgEvent::Nack { face, reason }, now);
            let res = sg.invoke(&mut ctx);
            n_forwarded = ctx.n_forwarded();
            drop(ctx);
            if let Some(d) = dyns {
                d.n_tx_interests.add(n_forwarded as u64);
            }
            debug!(
                "[Fwd {}] ^ fib-entry-depth={} sg-id={} sg-res={}",
                self.id,
                fib_entry.prefix().len(),
                sg.id(),
                res
            );
        }
        drop(rs);

        if n_pending + n_forwarded > 0 {
            debug!(
                "[Fwd {}] ^ up-pendings={} sg-forwarded={}",
                self.id, n_pending, n_forwarded
            );
            return RxOutcome::Pending;
        }

        let hop_limit = nack.interest.hop_limit.saturating_add(1);
        self.tx_nacks(pit_token, least_severe, hop_limit, now);
        self.erase_entry(pit_token, now, false, None);
        RxOutcome::Nacked(least_severe)
    }

    /// Resend toward `face` with a nonce it has not rejected.
    ///
    /// Returns `false` if no such nonce exists or the Interest could not be
    /// sent; the Nack then counts as the upstream's outcome.
    fn retransmit_duplicate(
        &mut self,
        pit_token: u64,
        face: FaceId,
        dyns: Option<&FibEntryDyn>,
        now: Instant,
    ) -> bool {
        let Some((entry, arena)) = self.pit.entry_mut(pit_token) else {
            return false;
        };
        let Some(it) = entry.find_up(arena, face) else {
            return false;
        };
        let up = it.get_mut(entry, arena);
        let rejected = up.nonce;
        up.add_rejected_nonce(rejected);

        let up = it.get(entry, arena);
        let Some(nonce) = entry.choose_nonce(arena, up, rejected, now) else {
            debug!("[Fwd {}] ^ duplicate no-alt-nonce", self.id);
            return false;
        };
        if self.faces.is_down(face) {
            debug!("[Fwd {}] ^ no-interest-to={} drop=face-down", self.id, face);
            return false;
        }

        let guiders = entry.tx_guiders(nonce, now);
        let Some((out, lease)) = entry.interest.modify_guiders(guiders, &self.headers) else {
            self.counters.n_alloc_errors.increment();
            debug!("[Fwd {}] ^ no-interest-to={} drop=alloc-error", self.id, face);
            return false;
        };

        let fw_token = FwToken::new(self.id, pit_token);
        debug!(
            "[Fwd {}] ^ interest-to={} {} up-token={}",
            self.id, face, guiders, fw_token
        );
        self.faces
            .transmit(face, OutPacket::new(L3Packet::Interest(out), fw_token.0, lease));
        self.counters.n_tx_interests.increment();
        self.counters.n_nack_dup_retx.increment();
        if let Some(d) = dyns {
            d.n_tx_interests.increment();
        }

        it.get_mut(entry, arena).record_tx(now, nonce, &self.suppress);
        self.congestion.on_tx(face);
        true
    }
}
