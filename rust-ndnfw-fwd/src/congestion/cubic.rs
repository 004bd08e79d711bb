//! CUBIC congestion window (RFC 8312 shape).

use std::time::{Duration, Instant};

/// Initial window.
pub const CUBIC_IW: f64 = 2.0;
/// Scaling constant.
pub const CUBIC_C: f64 = 0.4;
/// Multiplicative decrease factor.
pub const CUBIC_BETA: f64 = 0.7;
/// ssthresh never drops below this.
pub const CUBIC_MIN_SSTHRESH: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
struct Epoch {
    /// Time of the last decrease.
    t0: Instant,
    /// Window just before the last decrease.
    w_max: f64,
    /// Seconds from `t0` until the cubic curve returns to `w_max`.
    k: f64,
}

#[derive(Debug, Clone)]
pub struct TcpCubic {
    window: f64,
    ssthresh: f64,
    epoch: Option<Epoch>,
}

impl Default for TcpCubic {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpCubic {
    pub fn new() -> Self {
        Self {
            window: CUBIC_IW,
            ssthresh: f64::INFINITY,
            epoch: None,
        }
    }

    /// Current window, not rounded.
    pub fn window(&self) -> f64 {
        self.window
    }

    /// Window floored to a count of Interests.
    pub fn cwnd(&self) -> usize {
        self.window.floor().max(0.0) as usize
    }

    pub fn ssthresh(&self) -> f64 {
        self.ssthresh
    }

    /// Grow the window after a successful round trip.
    pub fn increase(&mut self, now: Instant, srtt: Duration) {
        // ssthresh only becomes finite in decrease(), which also sets the epoch
        let epoch = match self.epoch {
            Some(epoch) if self.window >= self.ssthresh => epoch,
            _ => {
                self.window += 1.0;
                return;
            }
        };

        let t = now.saturating_duration_since(epoch.t0).as_secs_f64();
        let rtt = srtt.as_secs_f64().max(1e-6);

        let tk = t - epoch.k;
        let w_cubic = CUBIC_C * tk * tk * tk + epoch.w_max;
        let w_est = epoch.w_max * CUBIC_BETA + (3.0 * (1.0 - CUBIC_BETA) / (1.0 + CUBIC_BETA)) * (t / rtt);
        if w_cubic < w_est {
            // TCP-friendly region
            self.window = w_est;
            return;
        }

        // concave or convex region; W_cubic(t) rather than W_cubic(t + RTT)
        self.window += (w_cubic - self.window) / self.window;
    }

    /// Shrink the window on a congestion signal.
    pub fn decrease(&mut self, now: Instant) {
        let w_max = self.window;
        self.epoch = Some(Epoch {
            t0: now,
            w_max,
            k: ((1.0 - CUBIC_BETA) / CUBIC_C * w_max).cbrt(),
        });
        self.window *= CUBIC_BETA;
        self.ssthresh = self.window.max(CUBIC_MIN_SSTHRESH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_start() {
        let now = Instant::now();
        let rtt = Duration::from_millis(100);
        let mut ca = TcpCubic::new();
        assert_eq!(ca.window(), 2.0);
        assert!(ca.ssthresh().is_infinite());

        for _ in 0..3 {
            ca.increase(now, rtt);
        }
        assert_eq!(ca.window(), 5.0);

        ca.decrease(now);
        assert!((ca.window() - 3.5).abs() < 1e-9);
        assert!((ca.ssthresh() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_ssthresh_floor() {
        let mut ca = TcpCubic::new();
        ca.decrease(Instant::now());
        assert!((ca.window() - 1.4).abs() < 1e-9);
        assert_eq!(ca.ssthresh(), CUBIC_MIN_SSTHRESH);
        assert_eq!(ca.cwnd(), 1);
    }

    #[test]
    fn test_congestion_avoidance() {
        let mut now = Instant::now();
        let rtt = Duration::from_millis(100);
        let mut ca = TcpCubic::new();

        for _ in 0..98 {
            ca.increase(now, rtt);
            now += Duration::from_millis(5);
        }
        assert_eq!(ca.cwnd(), 100);

        ca.decrease(now);
        assert_eq!(ca.cwnd(), 70);
        now += Duration::from_millis(5);

        let first = ca.window();
        let mut last = first;
        for _ in 0..1000 {
            ca.increase(now, rtt);
            assert!(ca.window() >= last);
            last = ca.window();
            now += Duration::from_millis(1);
        }
        assert!(last > first);

        ca.decrease(now);
        assert!(ca.window() < last);
    }
}
