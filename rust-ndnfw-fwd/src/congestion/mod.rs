//! Per-upstream congestion control.
//!
//! Each upstream face has a [`PathState`]: a CUBIC window, an RTT estimator
//! and the number of Interests sent on it that have not yet produced an
//! outcome. The forwarder consults [`CongestionTable::may_send`] before
//! forwarding and reports every outcome back.

pub mod cubic;
pub mod rtt;

pub use cubic::TcpCubic;
pub use rtt::RttEstimator;

use log::debug;
use rust_ndnfw_common::FaceId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct PathState {
    pub cubic: TcpCubic,
    pub rtt: RttEstimator,
    /// Interests sent and not yet answered, Nacked or expired.
    pub outstanding: usize,
    last_decrease: Option<Instant>,
}

impl PathState {
    /// A window below one still lets one Interest through, so the path can
    /// recover once replies come back.
    pub fn may_send(&self) -> bool {
        self.outstanding < self.cubic.cwnd().max(1)
    }

    /// Decrease the window, unless the last decrease was less than one sRTT
    /// ago (one RTO before the first RTT sample).
    ///
    /// Returns whether the window changed.
    pub fn on_congestion(&mut self, now: Instant) -> bool {
        let guard = self.rtt.srtt().unwrap_or_else(|| self.rtt.rto());
        if let Some(last) = self.last_decrease {
            if now < last + guard {
                return false;
            }
        }
        self.cubic.decrease(now);
        self.last_decrease = Some(now);
        true
    }

    fn release(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}

#[derive(Debug)]
pub struct CongestionTable {
    enabled: bool,
    paths: HashMap<FaceId, PathState>,
}

impl CongestionTable {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            paths: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, face: FaceId) -> Option<&PathState> {
        self.paths.get(&face)
    }

    /// Whether one more Interest may be sent on `face`.
    pub fn may_send(&self, face: FaceId) -> bool {
        !self.enabled || self.paths.get(&face).map_or(true, PathState::may_send)
    }

    pub fn on_tx(&mut self, face: FaceId) {
        self.paths.entry(face).or_default().outstanding += 1;
    }

    /// Data came back on `face` after `rtt`.
    pub fn on_data(&mut self, face: FaceId, now: Instant, rtt: Option<Duration>) {
        let path = self.paths.entry(face).or_default();
        path.release();
        let Some(rtt) = rtt else {
            return;
        };
        path.rtt.add_sample(rtt);
        let srtt = path.rtt.srtt().unwrap_or(rtt);
        path.cubic.increase(now, srtt);
    }

    /// A Nack came back on `face`.
    pub fn on_nack(&mut self, face: FaceId, congestion: bool, now: Instant) {
        let path = self.paths.entry(face).or_default();
        path.release();
        if congestion && path.on_congestion(now) {
            debug!("cc-decrease face={} cwnd={:.2}", face, path.cubic.window());
        }
    }

    /// The PIT entry went away while an Interest on `face` was outstanding.
    pub fn on_cancel(&mut self, face: FaceId) {
        if let Some(path) = self.paths.get_mut(&face) {
            path.release();
        }
    }

    /// An Interest on `face` got no reply before its PIT entry expired.
    pub fn on_timeout(&mut self, face: FaceId, now: Instant) {
        let path = self.paths.entry(face).or_default();
        path.release();
        path.rtt.backoff();
        if path.on_congestion(now) {
            debug!("cc-timeout face={} cwnd={:.2}", face, path.cubic.window());
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::rtt::RTO_INITIAL;

    #[test]
    fn test_decrease_within_rtt_ignored() {
        let mut now = Instant::now();
        let rtt = Duration::from_millis(100);
        let mut path = PathState::default();
        path.rtt.add_sample(rtt);

        for _ in 0..98 {
            path.cubic.increase(now, rtt);
            now += Duration::from_millis(5);
        }
        assert!(path.on_congestion(now));
        assert_eq!(path.cubic.cwnd(), 70);
        now += Duration::from_millis(5);

        path.cubic.increase(now, rtt);
        let before = path.cubic.window();
        now += Duration::from_millis(5);

        assert!(!path.on_congestion(now));
        assert_eq!(path.cubic.window(), before);

        assert!(path.on_congestion(now + rtt));
        assert!(path.cubic.window() < before);
    }

    #[test]
    fn test_window_gates_outstanding() {
        let face = FaceId(1);
        let mut table = CongestionTable::new(true);
        assert!(table.may_send(face));

        table.on_tx(face);
        assert!(table.may_send(face));
        table.on_tx(face);
        assert!(!table.may_send(face));

        let now = Instant::now();
        table.on_data(face, now, Some(Duration::from_millis(20)));
        assert_eq!(table.get(face).unwrap().outstanding, 1);
        assert_eq!(table.get(face).unwrap().cubic.cwnd(), 3);
        assert!(table.may_send(face));
    }

    #[test]
    fn test_disabled_never_gates() {
        let face = FaceId(1);
        let mut table = CongestionTable::new(false);
        for _ in 0..10 {
            table.on_tx(face);
        }
        assert!(table.may_send(face));
    }

    #[test]
    fn test_nack_releases_and_decreases() {
        let face = FaceId(2);
        let now = Instant::now();
        let mut table = CongestionTable::new(true);
        table.on_tx(face);
        table.on_nack(face, false, now);
        assert_eq!(table.get(face).unwrap().outstanding, 0);
        assert_eq!(table.get(face).unwrap().cubic.window(), 2.0);

        table.on_tx(face);
        table.on_nack(face, true, now);
        assert!(table.get(face).unwrap().cubic.window() < 2.0);
    }

    #[test]
    fn test_window_below_one_still_sends_one() {
        let face = FaceId(3);
        let mut now = Instant::now();
        let mut table = CongestionTable::new(true);
        for _ in 0..3 {
            table.on_tx(face);
            table.on_timeout(face, now);
            now += Duration::from_secs(10);
        }
        let path = table.get(face).unwrap();
        assert!(path.cubic.window() < 1.0);
        assert_eq!(path.cubic.cwnd(), 0);
        assert!(table.may_send(face));

        table.on_tx(face);
        assert!(!table.may_send(face));
    }

    #[test]
    fn test_decrease_before_rtt_sample_waits_one_rto() {
        let now = Instant::now();
        let mut path = PathState::default();
        assert!(path.on_congestion(now));
        assert!(!path.on_congestion(now + Duration::from_millis(500)));
        assert!((path.cubic.window() - 1.4).abs() < 1e-9);
        assert!(path.on_congestion(now + RTO_INITIAL));
    }
}
