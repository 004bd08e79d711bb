use super::{DropReason, Forwarder, RxOutcome};
use crate::strategy::{SgCtx, SgEvent};
use log::debug;
use rust_ndnfw_common::{Data, FaceId, FwToken, L3Packet, OutPacket};
use std::sync::Arc;
use std::time::Instant;

impl Forwarder {
    pub(crate) fn rx_data(&mut self, face: FaceId, token: u64, data: Data, now: Instant) -> RxOutcome {
        self.counters.n_rx_data.increment();
        let pit_token = FwToken(token).pit_token();
        debug!(
            "[Fwd {}] data-from={} name={} up-token={:016x}",
            self.id, face, data.name, token
        );

        if self.pit.find_by_data(pit_token, &data).is_none() {
            self.counters.n_data_mismatch.increment();
            debug!("[Fwd {}] ^ drop=no-PIT-entry", self.id);
            return RxOutcome::Dropped(DropReason::NoPitEntry);
        }
        let Some((entry, arena)) = self.pit.entry_mut(pit_token) else {
            return RxOutcome::Dropped(DropReason::NoPitEntry);
        };

        // RTT sample only for an upstream sent to exactly once
        let mut answered = None;
        if let Some(it) = entry.find_up(arena, face) {
            let up = it.get(entry, arena);
            if up.is_pending() {
                let rtt = up
                    .last_tx
                    .filter(|_| up.n_tx == 1)
                    .map(|t| now.saturating_duration_since(t));
                self.congestion.on_data(face, now, rtt);
                answered = Some(face);
            }
        }
        let name = entry.interest().name.clone();
        let (prefix_len, seq) = entry.fib_entry_ref();

        let fib = Arc::clone(&self.fib);
        let rs = fib.read();
        if let Some(fib_entry) = rs.find_again(&name, prefix_len, seq) {
            if let Some(d) = fib_entry.dyn_for(self.id) {
                d.n_rx_data.increment();
            }
            let sg = Arc::clone(fib_entry.strategy());
            let mut ctx = SgCtx::new(self, pit_token, fib_entry, SgEvent::Data, now);
            sg.invoke(&mut ctx);
        }
        drop(rs);

        let n = self.tx_data(pit_token, &data, now);
        self.erase_entry(pit_token, now, false, answered);
        RxOutcome::Satisfied(n)
    }

    /// Send Data to every live downstream; stops at the first allocation failure.
    fn tx_data(&self, pit_token: u64, data: &Data, now: Instant) -> usize {
        let Some((entry, arena)) = self.pit.entry(pit_token) else {
            return 0;
        };
        let mut n = 0;
        for dn in entry.dns(arena) {
            if dn.is_expired(now) {
                continue;
            }
            if self.faces.is_down(dn.face) {
                debug!("[Fwd {}] ^ no-data-to={} drop=face-down", self.id, dn.face);
                continue;
            }
            let Some(lease) = self.headers.try_alloc() else {
                self.counters.n_alloc_errors.increment();
                debug!("[Fwd {}] ^ no-data-to={} drop=alloc-error", self.id, dn.face);
                break;
            };
            debug!("[Fwd {}] ^ data-to={} dn-token={:016x}", self.id, dn.face, dn.token);
            self.faces
                .transmit(dn.face, OutPacket::new(L3Packet::Data(data.clone()), dn.token, lease));
            self.counters.n_tx_data.increment();
            n += 1;
        }
        n
    }
}
