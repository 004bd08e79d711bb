//! Round-trip time estimation per RFC 6298.

use std::time::Duration;

pub const RTO_INITIAL: Duration = Duration::from_secs(1);
pub const RTO_MIN: Duration = Duration::from_millis(200);
pub const RTO_MAX: Duration = Duration::from_secs(60);

const ALPHA: f64 = 1.0 / 8.0;
const BETA: f64 = 1.0 / 4.0;
const K: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct RttEstimator {
    srtt: Option<Duration>,
    rttvar: Duration,
    rto: Duration,
}

impl Default for RttEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RttEstimator {
    pub fn new() -> Self {
        Self {
            srtt: None,
            rttvar: Duration::ZERO,
            rto: RTO_INITIAL,
        }
    }

    pub fn add_sample(&mut self, rtt: Duration) {
        match self.srtt {
            None => {
                self.srtt = Some(rtt);
                self.rttvar = rtt / 2;
            }
            Some(srtt) => {
                let delta = if srtt > rtt { srtt - rtt } else { rtt - srtt };
                self.rttvar = self.rttvar.mul_f64(1.0 - BETA) + delta.mul_f64(BETA);
                self.srtt = Some(srtt.mul_f64(1.0 - ALPHA) + rtt.mul_f64(ALPHA));
            }
        }
        let srtt = self.srtt.unwrap_or(rtt);
        self.rto = (srtt + self.rttvar.mul_f64(K)).clamp(RTO_MIN, RTO_MAX);
    }

    /// Smoothed RTT, `None` before the first sample.
    pub fn srtt(&self) -> Option<Duration> {
        self.srtt
    }

    pub fn rttvar(&self) -> Duration {
        self.rttvar
    }

    pub fn rto(&self) -> Duration {
        self.rto
    }

    /// Back off after a timeout.
    pub fn backoff(&mut self) {
        self.rto = (self.rto * 2).min(RTO_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample() {
        let mut rtt = RttEstimator::new();
        assert_eq!(rtt.srtt(), None);
        assert_eq!(rtt.rto(), RTO_INITIAL);

        rtt.add_sample(Duration::from_millis(100));
        assert_eq!(rtt.srtt(), Some(Duration::from_millis(100)));
        assert_eq!(rtt.rttvar(), Duration::from_millis(50));
        assert_eq!(rtt.rto(), Duration::from_millis(300));
    }

    #[test]
    fn test_smoothing_and_clamp() {
        let mut rtt = RttEstimator::new();
        for _ in 0..50 {
            rtt.add_sample(Duration::from_millis(10));
        }
        let srtt = rtt.srtt().unwrap();
        assert!(srtt >= Duration::from_millis(9) && srtt <= Duration::from_millis(11));
        assert_eq!(rtt.rto(), RTO_MIN);

        rtt.backoff();
        assert_eq!(rtt.rto(), RTO_MIN * 2);
        for _ in 0..20 {
            rtt.backoff();
        }
        assert_eq!(rtt.rto(), RTO_MAX);
    }
}
