//! In-process forwarding benchmark
//!
//! A consumer face sends Interests under a prefix routed to a producer face.
//! The producer answers each Interest with Data, or with a Nack when asked to,
//! and every reply travels back through the dispatcher like a received packet.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rust_ndnfw_common::packet::RxPacket;
use rust_ndnfw_common::{Data, FaceId, Interest, L3Packet, Nack, NackReason, Name, OutPacket};
use rust_ndnfw_fwd::{DispatchError, Dispatcher, FaceTable, Fib, StrategyRegistry};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::commands::config;
use crate::utils::{format_duration, format_rate, print_header, Timer};

const CONSUMER: FaceId = FaceId(1);
const PRODUCER: FaceId = FaceId(2);
/// Interests the consumer keeps outstanding.
const MAX_IN_FLIGHT: usize = 256;
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Both faces feed one channel read by the benchmark loop.
struct LoopbackFaces {
    tx: mpsc::UnboundedSender<(FaceId, OutPacket)>,
}

impl FaceTable for LoopbackFaces {
    fn is_down(&self, face: FaceId) -> bool {
        face != CONSUMER && face != PRODUCER
    }

    fn transmit(&self, face: FaceId, pkt: OutPacket) {
        if self.tx.send((face, pkt)).is_err() {
            debug!("loopback closed, dropping packet to {}", face);
        }
    }
}

#[derive(Debug, Default)]
struct BenchmarkResults {
    sent: usize,
    data: usize,
    nacks: BTreeMap<&'static str, usize>,
    queue_full: usize,
}

impl BenchmarkResults {
    fn replies(&self) -> usize {
        self.data + self.nacks.values().sum::<usize>()
    }
}

/// Run the benchmark with the specified parameters
pub async fn run_benchmark(
    count: usize,
    prefix: &str,
    strategy: &str,
    nack_every: usize,
    file: Option<&Path>,
) -> Result<()> {
    let cfg = config::load(file)?;
    let prefix = Name::from_uri(prefix).context("Invalid benchmark prefix")?;
    let sg = StrategyRegistry::builtin()
        .get(strategy)
        .with_context(|| format!("Unknown strategy {:?}", strategy))?;
    info!(
        "Running benchmark: count={}, prefix={}, strategy={}, workers={}",
        count, prefix, strategy, cfg.n_workers
    );

    let fib = Arc::new(Fib::new(cfg.n_workers));
    fib.insert(prefix.clone(), &[PRODUCER], sg)
        .context("Failed to install benchmark route")?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let faces: Arc<dyn FaceTable> = Arc::new(LoopbackFaces { tx });
    let dispatcher = Dispatcher::start(&cfg, fib, faces).context("Failed to start forwarding workers")?;

    let timer = Timer::new("benchmark");
    let mut results = BenchmarkResults::default();
    let mut served = 0usize;
    while results.replies() < count {
        // top up the consumer's window
        while results.sent < count && results.sent - results.replies() < MAX_IN_FLIGHT {
            let name = prefix
                .append_generic(results.sent.to_string().as_bytes())
                .context("Benchmark name too long")?;
            let interest = Interest::new(name)
                .with_nonce(nonce_for(results.sent))
                .with_lifetime(REPLY_TIMEOUT);
            let pkt = RxPacket::new(CONSUMER, results.sent as u64, L3Packet::Interest(interest));
            match dispatcher.dispatch(pkt) {
                Ok(_) => results.sent += 1,
                Err(DispatchError::QueueFull) => {
                    results.queue_full += 1;
                    break;
                }
                Err(e) => anyhow::bail!("dispatch failed: {:?}", e),
            }
        }

        let Ok(Some((face, out))) = timeout(REPLY_TIMEOUT, rx.recv()).await else {
            warn!(
                "No reply within {}, stopping with {} of {} answered",
                format_duration(REPLY_TIMEOUT),
                results.replies(),
                count
            );
            break;
        };
        match (face, out.l3) {
            (PRODUCER, L3Packet::Interest(interest)) => {
                served += 1;
                let l3 = if nack_every > 0 && served % nack_every == 0 {
                    L3Packet::Nack(Nack::from_interest(interest, NackReason::Congestion))
                } else {
                    L3Packet::Data(Data::new(interest.name, &b"benchmark"[..]))
                };
                if let Err(e) = dispatcher.dispatch(RxPacket::new(PRODUCER, out.token, l3)) {
                    debug!("producer reply dropped: {:?}", e);
                }
            }
            (CONSUMER, L3Packet::Data(_)) => results.data += 1,
            (CONSUMER, L3Packet::Nack(nack)) => {
                *results.nacks.entry(nack.reason.as_str()).or_default() += 1;
            }
            (face, l3) => debug!("unexpected {:?} on {}", l3, face),
        }
    }
    let elapsed = timer.elapsed();
    drop(timer);

    let forwarders = dispatcher.shutdown().await;
    print_benchmark_results(&results, elapsed);
    print_header("Workers");
    for fwd in &forwarders {
        let c = fwd.counters();
        let window = fwd
            .congestion()
            .get(PRODUCER)
            .map_or(0.0, |path| path.cubic.window());
        println!(
            "worker {}: rx-interests={} tx-interests={} rx-data={} rx-nacks={} tx-nacks={} expired={} cwnd={:.2}",
            fwd.id(),
            c.n_rx_interests.value(),
            c.n_tx_interests.value(),
            c.n_rx_data.value(),
            c.n_rx_nacks.value(),
            c.n_tx_nacks.value(),
            c.n_expired.value(),
            window
        );
    }
    Ok(())
}

/// Distinct nonces for consecutive Interests.
fn nonce_for(i: usize) -> u32 {
    (i as u32).wrapping_mul(0x9E37_79B9)
}

fn print_benchmark_results(results: &BenchmarkResults, elapsed: Duration) {
    print_header("Benchmark Results");
    println!("Interests sent: {}", results.sent);
    println!("Data received:  {}", results.data);
    for (reason, n) in &results.nacks {
        println!("Nack {:<12} {}", format!("{}:", reason), n);
    }
    println!("Queue-full retries: {}", results.queue_full);
    println!("Elapsed: {}", format_duration(elapsed));
    println!("Throughput: {}", format_rate(results.replies(), elapsed));
}
