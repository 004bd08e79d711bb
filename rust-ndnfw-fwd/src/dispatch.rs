//! Distribution of received packets over forwarding workers.
//!
//! Each worker is a tokio task owning one [`Forwarder`], so every PIT entry
//! has a single writer. Interests are steered by name hash, which keeps all
//! Interests for one name on the same worker; Data and Nacks go back to the
//! worker named in their forwarding token.

use crate::config::FwdConfig;
use crate::fib::Fib;
use crate::fwd::{FaceTable, Forwarder, FwdCounters};
use log::{debug, info, warn};
use rust_ndnfw_common::metrics::Counter;
use rust_ndnfw_common::packet::RxPacket;
use rust_ndnfw_common::{Error, FwToken, L3Packet, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Why [`Dispatcher::dispatch`] refused a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// Forwarding token names no worker.
    BadToken,
    /// The worker's queue is full.
    QueueFull,
    /// The worker has stopped.
    Closed,
}

pub struct Dispatcher {
    inputs: Vec<mpsc::Sender<RxPacket>>,
    workers: Vec<JoinHandle<Forwarder>>,
    counters: Vec<Arc<FwdCounters>>,
    n_bad_token: Counter,
    n_queue_drops: Counter,
}

impl Dispatcher {
    /// Spawn `cfg.n_workers` forwarding workers on the current tokio runtime.
    pub fn start(cfg: &FwdConfig, fib: Arc<Fib>, faces: Arc<dyn FaceTable>) -> Result<Self> {
        cfg.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::Other("dispatcher needs a tokio runtime".to_string()));
        }

        let mut inputs = Vec::with_capacity(cfg.n_workers);
        let mut workers = Vec::with_capacity(cfg.n_workers);
        let mut counters = Vec::with_capacity(cfg.n_workers);
        for id in 0..cfg.n_workers {
            let fwd = Forwarder::new(id as u8, cfg, Arc::clone(&fib), Arc::clone(&faces));
            let (tx, rx) = mpsc::channel(cfg.queue_capacity);
            counters.push(Arc::clone(fwd.counters()));
            inputs.push(tx);
            workers.push(tokio::spawn(run_worker(fwd, rx, cfg.expiry_sweep())));
        }
        info!("Started {} forwarding workers", cfg.n_workers);

        Ok(Self {
            inputs,
            workers,
            counters,
            n_bad_token: Counter::new(),
            n_queue_drops: Counter::new(),
        })
    }

    pub fn n_workers(&self) -> usize {
        self.inputs.len()
    }

    /// Worker that must process `pkt`.
    pub fn worker_for(&self, pkt: &RxPacket) -> Option<usize> {
        let n = self.inputs.len();
        match &pkt.l3 {
            L3Packet::Interest(interest) => Some((interest.name.compute_hash() % n as u64) as usize),
            L3Packet::Data(_) | L3Packet::Nack(_) => {
                let worker = FwToken(pkt.token).worker() as usize;
                (worker < n).then_some(worker)
            }
        }
    }

    /// Queue a packet for its worker without waiting.
    pub fn dispatch(&self, pkt: RxPacket) -> std::result::Result<usize, DispatchError> {
        let Some(worker) = self.worker_for(&pkt) else {
            self.n_bad_token.increment();
            debug!("dispatch drop=bad-token token={:016x}", pkt.token);
            return Err(DispatchError::BadToken);
        };
        match self.inputs[worker].try_send(pkt) {
            Ok(()) => Ok(worker),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.n_queue_drops.increment();
                debug!("dispatch drop=queue-full worker={}", worker);
                Err(DispatchError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DispatchError::Closed),
        }
    }

    /// Counters of each worker, indexed by worker id.
    pub fn counters(&self) -> &[Arc<FwdCounters>] {
        &self.counters
    }

    pub fn n_bad_token(&self) -> u64 {
        self.n_bad_token.value()
    }

    pub fn n_queue_drops(&self) -> u64 {
        self.n_queue_drops.value()
    }

    /// Close the queues, let workers drain them, and return the forwarders.
    pub async fn shutdown(self) -> Vec<Forwarder> {
        drop(self.inputs);
        let mut forwarders = Vec::with_capacity(self.workers.len());
        for handle in self.workers {
            match handle.await {
                Ok(fwd) => forwarders.push(fwd),
                Err(e) => warn!("Forwarding worker failed: {}", e),
            }
        }
        info!("Stopped {} forwarding workers", forwarders.len());
        forwarders
    }
}

/// Worker loop. Time comes from the tokio clock so that a paused runtime
/// drives PIT expiry as well.
async fn run_worker(mut fwd: Forwarder, mut rx: mpsc::Receiver<RxPacket>, sweep: Duration) -> Forwarder {
    let mut ticker = tokio::time::interval(sweep);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!("[Fwd {}] worker started", fwd.id());
    loop {
        tokio::select! {
            pkt = rx.recv() => match pkt {
                Some(pkt) => {
                    fwd.process(pkt, Instant::now().into_std());
                }
                None => break,
            },
            _ = ticker.tick() => {
                fwd.expire(Instant::now().into_std());
            }
        }
    }
    debug!("[Fwd {}] worker stopped", fwd.id());
    fwd
}
