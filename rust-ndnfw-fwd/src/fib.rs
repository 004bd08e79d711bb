//! Forwarding Information Base.
//!
//! The table is an immutable snapshot behind an [`ArcSwap`]. Readers take a
//! [`FibReadSection`] for one lookup-and-strategy call; the control plane
//! publishes a modified copy on every update. A superseded snapshot is freed
//! when the last read section holding it is dropped.

use crate::strategy::Strategy;
use arc_swap::{ArcSwap, Guard};
use arrayvec::ArrayVec;
use log::debug;
use rust_ndnfw_common::metrics::Counter;
use rust_ndnfw_common::{FaceId, Name};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const FIB_MAX_NEXTHOPS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FibError {
    #[error("FIB entry needs at least one nexthop")]
    NoNexthops,
    #[error("{0} nexthops exceed the limit of 8")]
    TooManyNexthops(usize),
    #[error("nexthop face id 0 is reserved")]
    BadNexthop,
}

/// Counters of one FIB entry, as seen by one forwarding worker.
#[derive(Debug, Default)]
pub struct FibEntryDyn {
    pub n_rx_interests: Counter,
    pub n_rx_data: Counter,
    pub n_rx_nacks: Counter,
    pub n_tx_interests: Counter,
}

#[derive(Debug)]
pub struct FibEntry {
    prefix: Name,
    nexthops: ArrayVec<FaceId, FIB_MAX_NEXTHOPS>,
    strategy: Arc<dyn Strategy>,
    seq: u64,
    dyns: Arc<[FibEntryDyn]>,
}

impl FibEntry {
    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    pub fn nexthops(&self) -> &[FaceId] {
        &self.nexthops
    }

    pub fn strategy(&self) -> &Arc<dyn Strategy> {
        &self.strategy
    }

    /// Changes whenever the entry is replaced.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Counter block of `worker`.
    pub fn dyn_for(&self, worker: u8) -> Option<&FibEntryDyn> {
        self.dyns.get(worker as usize)
    }

    /// Counters summed over all workers: rx Interests, rx Data, rx Nacks, tx Interests.
    pub fn counters(&self) -> [u64; 4] {
        self.dyns.iter().fold([0; 4], |mut acc, d| {
            acc[0] += d.n_rx_interests.value();
            acc[1] += d.n_rx_data.value();
            acc[2] += d.n_rx_nacks.value();
            acc[3] += d.n_tx_interests.value();
            acc
        })
    }
}

/// One published FIB snapshot.
#[derive(Debug, Default, Clone)]
pub struct FibTable {
    by_hash: HashMap<u64, Vec<Arc<FibEntry>>>,
    max_comps: usize,
    len: usize,
}

impl FibTable {
    fn get(&self, name: &Name, n_comps: usize) -> Option<&Arc<FibEntry>> {
        let end = if n_comps == 0 { 0 } else { name.comp_end(n_comps - 1) };
        let prefix = &name.value()[..end];
        self.by_hash
            .get(&name.prefix_hash(n_comps))?
            .iter()
            .find(|e| &e.prefix.value()[..] == prefix)
    }

    fn lpm(&self, name: &Name) -> Option<&Arc<FibEntry>> {
        let top = name.len().min(self.max_comps);
        (0..=top).rev().find_map(|n| self.get(name, n))
    }

    fn put(&mut self, entry: Arc<FibEntry>) {
        self.max_comps = self.max_comps.max(entry.prefix.len());
        let bucket = self.by_hash.entry(entry.prefix.compute_hash()).or_default();
        match bucket.iter_mut().find(|e| e.prefix == entry.prefix) {
            Some(old) => *old = entry,
            None => {
                bucket.push(entry);
                self.len += 1;
            }
        }
    }

    fn remove(&mut self, prefix: &Name) -> bool {
        let hash = prefix.compute_hash();
        let Some(bucket) = self.by_hash.get_mut(&hash) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|e| e.prefix != *prefix);
        if bucket.len() == before {
            return false;
        }
        if bucket.is_empty() {
            self.by_hash.remove(&hash);
        }
        self.len -= 1;
        self.max_comps = self
            .by_hash
            .values()
            .flatten()
            .map(|e| e.prefix.len())
            .max()
            .unwrap_or(0);
        true
    }
}

/// A consistent view of the FIB for the duration of one lookup.
pub struct FibReadSection {
    table: Guard<Arc<FibTable>>,
}

impl FibReadSection {
    /// Entry with exactly this prefix.
    pub fn find(&self, prefix: &Name) -> Option<&FibEntry> {
        self.table.get(prefix, prefix.len()).map(Arc::as_ref)
    }

    /// Longest-prefix match.
    pub fn lpm(&self, name: &Name) -> Option<&FibEntry> {
        self.table.lpm(name).map(Arc::as_ref)
    }

    /// The entry a PIT entry was forwarded under, identified by prefix length
    /// and sequence number; falls back to longest-prefix match if it has been
    /// replaced.
    pub fn find_again(&self, name: &Name, prefix_len: usize, seq: u64) -> Option<&FibEntry> {
        if prefix_len <= name.len() {
            if let Some(entry) = self.table.get(name, prefix_len) {
                if entry.seq == seq {
                    return Some(entry);
                }
            }
        }
        self.lpm(name)
    }

    pub fn len(&self) -> usize {
        self.table.len
    }

    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }
}

/// The FIB shared by all forwarding workers.
#[derive(Debug)]
pub struct Fib {
    table: ArcSwap<FibTable>,
    writer: Mutex<()>,
    next_seq: AtomicU64,
    n_workers: usize,
}

impl Fib {
    pub fn new(n_workers: usize) -> Self {
        Self {
            table: ArcSwap::from_pointee(FibTable::default()),
            writer: Mutex::new(()),
            next_seq: AtomicU64::new(1),
            n_workers,
        }
    }

    pub fn read(&self) -> FibReadSection {
        FibReadSection {
            table: self.table.load(),
        }
    }

    /// Insert or replace the entry for `prefix`; returns its sequence number.
    ///
    /// A replaced entry keeps its counters.
    pub fn insert(&self, prefix: Name, nexthops: &[FaceId], strategy: Arc<dyn Strategy>) -> Result<u64, FibError> {
        if nexthops.is_empty() {
            return Err(FibError::NoNexthops);
        }
        if nexthops.iter().any(|nh| nh.is_none()) {
            return Err(FibError::BadNexthop);
        }
        let nexthops = ArrayVec::<FaceId, FIB_MAX_NEXTHOPS>::try_from(nexthops)
            .map_err(|_| FibError::TooManyNexthops(nexthops.len()))?;

        let _w = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let mut table = FibTable::clone(&self.table.load());
        let dyns = match table.get(&prefix, prefix.len()) {
            Some(old) => Arc::clone(&old.dyns),
            None => (0..self.n_workers).map(|_| FibEntryDyn::default()).collect(),
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        debug!(
            "fib-insert prefix={} nexthops={:?} strategy={} seq={}",
            prefix,
            nexthops,
            strategy.name(),
            seq
        );
        table.put(Arc::new(FibEntry {
            prefix,
            nexthops,
            strategy,
            seq,
            dyns,
        }));
        self.table.store(Arc::new(table));
        Ok(seq)
    }

    pub fn erase(&self, prefix: &Name) -> bool {
        let _w = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let mut table = FibTable::clone(&self.table.load());
        if !table.remove(prefix) {
            return false;
        }
        debug!("fib-erase prefix={}", prefix);
        self.table.store(Arc::new(table));
        true
    }

    pub fn len(&self) -> usize {
        self.table.load().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
