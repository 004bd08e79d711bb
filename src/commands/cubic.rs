//! CUBIC window trace

use rust_ndnfw_fwd::congestion::TcpCubic;
use std::time::{Duration, Instant};

/// Simulate `steps` round trips of `rtt_ms` each, decreasing every
/// `loss_every` round trips, and print the window after each.
pub fn print_trace(steps: usize, rtt_ms: u64, loss_every: usize) {
    let rtt = Duration::from_millis(rtt_ms.max(1));
    let mut cubic = TcpCubic::new();
    let mut now = Instant::now();

    println!("{:>6}  {:>10}  {:>10}  {:>6}  event", "step", "window", "ssthresh", "cwnd");
    for step in 1..=steps {
        now += rtt;
        let event = if loss_every > 0 && step % loss_every == 0 {
            cubic.decrease(now);
            "decrease"
        } else {
            // one increase per Interest in flight
            for _ in 0..cubic.cwnd().max(1) {
                cubic.increase(now, rtt);
            }
            "increase"
        };
        println!(
            "{:>6}  {:>10.3}  {:>10.3}  {:>6}  {}",
            step,
            cubic.window(),
            cubic.ssthresh(),
            cubic.cwnd(),
            event
        );
    }
}
