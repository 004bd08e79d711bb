//! Pending Interest Table.
//!
//! A [`Pit`] is owned by exactly one forwarding worker. Entries are keyed by
//! a 48-bit token for the reply path and by name plus selectors for Interest
//! aggregation.

mod arena;
mod entry;
mod iter;

pub use arena::{ExtArena, ExtBlock, ExtIdx};
pub use entry::{
    PitDn, PitEntry, PitUp, PIT_MAX_DNS, PIT_MAX_EXT_DNS, PIT_MAX_EXT_UPS, PIT_MAX_REJ_NONCES, PIT_MAX_UPS,
};
pub use iter::{Dn, PitDnIt, PitUpIt, SlotIt, SlotKind, Slots, Up};

use log::trace;
use rust_ndnfw_common::types::PIT_TOKEN_MASK;
use rust_ndnfw_common::{Data, Interest, Name, Nack};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PitKey {
    name: Name,
    can_be_prefix: bool,
    must_be_fresh: bool,
}

impl PitKey {
    fn of(interest: &Interest) -> Self {
        Self {
            name: interest.name.clone(),
            can_be_prefix: interest.can_be_prefix,
            must_be_fresh: interest.must_be_fresh,
        }
    }
}

/// Outcome of [`Pit::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitInsert {
    /// A new entry was created.
    New(u64),
    /// The Interest aggregates onto an existing entry.
    Existing(u64),
    /// The table is at capacity.
    Full,
}

#[derive(Debug)]
pub struct Pit {
    entries: HashMap<u64, PitEntry>,
    by_key: HashMap<PitKey, u64>,
    /// (sweep_at, token); an entry's expiry only moves forward, so its key
    /// never lies after its real expiry.
    by_expiry: BTreeSet<(Instant, u64)>,
    arena: ExtArena,
    capacity: usize,
    last_token: u64,
}

impl Pit {
    pub fn new(capacity: usize, ext_capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            by_key: HashMap::new(),
            by_expiry: BTreeSet::new(),
            arena: ExtArena::new(ext_capacity),
            capacity,
            last_token: 0,
        }
    }

    /// Find the entry matching the Interest's name and selectors, or create one.
    pub fn insert(&mut self, interest: &Interest, now: Instant) -> PitInsert {
        let key = PitKey::of(interest);
        if let Some(&token) = self.by_key.get(&key) {
            return PitInsert::Existing(token);
        }
        if self.entries.len() >= self.capacity {
            return PitInsert::Full;
        }

        let token = self.next_token();
        self.entries.insert(token, PitEntry::new(token, interest.clone(), now));
        self.by_key.insert(key, token);
        self.by_expiry.insert((now, token));
        trace!("pit-insert token={:012x} name={}", token, interest.name);
        PitInsert::New(token)
    }

    fn next_token(&mut self) -> u64 {
        loop {
            self.last_token = (self.last_token + 1) & PIT_TOKEN_MASK;
            if self.last_token != 0 && !self.entries.contains_key(&self.last_token) {
                return self.last_token;
            }
        }
    }

    pub fn get(&self, token: u64) -> Option<&PitEntry> {
        self.entries.get(&token)
    }

    pub fn get_mut(&mut self, token: u64) -> Option<&mut PitEntry> {
        self.entries.get_mut(&token)
    }

    /// The entry together with the arena holding its extension blocks.
    pub fn entry_mut(&mut self, token: u64) -> Option<(&mut PitEntry, &mut ExtArena)> {
        let entry = self.entries.get_mut(&token)?;
        Some((entry, &mut self.arena))
    }

    /// The entry together with the arena, read-only.
    pub fn entry(&self, token: u64) -> Option<(&PitEntry, &ExtArena)> {
        let entry = self.entries.get(&token)?;
        Some((entry, &self.arena))
    }

    pub fn arena(&self) -> &ExtArena {
        &self.arena
    }

    /// Token of the entry this Data satisfies.
    pub fn find_by_data(&self, token: u64, data: &Data) -> Option<u64> {
        let entry = self.entries.get(&token)?;
        let interest = entry.interest();
        data.can_satisfy(&interest.name, interest.can_be_prefix)
            .then_some(token)
    }

    /// Token of the entry this Nack refers to.
    pub fn find_by_nack(&self, token: u64, nack: &Nack) -> Option<u64> {
        let entry = self.entries.get(&token)?;
        (entry.interest().name == nack.interest.name).then_some(token)
    }

    /// Remove an entry, returning its extension blocks to the arena.
    pub fn erase(&mut self, token: u64) -> bool {
        let Some(mut entry) = self.entries.remove(&token) else {
            return false;
        };
        self.by_key.remove(&PitKey::of(entry.interest()));
        self.by_expiry.remove(&(entry.sweep_at, token));
        let n = self.arena.free_chain(entry.ext.take());
        trace!("pit-erase token={:012x} ext-freed={}", token, n);
        true
    }

    /// Tokens of entries whose every downstream has expired, oldest first.
    ///
    /// Only index keys before `now` are visited; an entry found there that
    /// was refreshed since is re-keyed at its current expiry.
    pub fn expired(&mut self, now: Instant) -> Vec<u64> {
        let mut expired = Vec::new();
        while let Some(&(at, token)) = self.by_expiry.first() {
            if at >= now {
                break;
            }
            self.by_expiry.pop_first();
            let Some(entry) = self.entries.get_mut(&token) else {
                continue;
            };
            if entry.expiry() < now {
                expired.push((at, token));
            } else {
                entry.sweep_at = entry.expiry();
                self.by_expiry.insert((entry.sweep_at, token));
            }
        }
        // expired entries stay indexed until erased
        self.by_expiry.extend(expired.iter().copied());
        expired.into_iter().map(|(_, token)| token).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_ndnfw_common::FaceId;
    use std::time::Duration;

    fn interest(uri: &str) -> Interest {
        Interest::new(Name::from_uri(uri).unwrap())
            .with_nonce(1)
            .with_lifetime(Duration::from_millis(100))
    }

    #[test]
    fn test_insert_aggregates_by_name_and_selectors() {
        let now = Instant::now();
        let mut pit = Pit::new(8, 8);

        let PitInsert::New(a) = pit.insert(&interest("/a"), now) else {
            panic!("expected new entry");
        };
        assert_eq!(pit.insert(&interest("/a").with_nonce(2), now), PitInsert::Existing(a));
        assert!(matches!(
            pit.insert(&interest("/a").with_can_be_prefix(true), now),
            PitInsert::New(b) if b != a
        ));
        assert!(matches!(
            pit.insert(&interest("/a").with_must_be_fresh(true), now),
            PitInsert::New(_)
        ));
        assert_eq!(pit.len(), 3);
    }

    #[test]
    fn test_full() {
        let now = Instant::now();
        let mut pit = Pit::new(1, 0);
        assert!(matches!(pit.insert(&interest("/a"), now), PitInsert::New(_)));
        assert_eq!(pit.insert(&interest("/b"), now), PitInsert::Full);
    }

    #[test]
    fn test_find_by_data() {
        let now = Instant::now();
        let mut pit = Pit::new(8, 0);
        let PitInsert::New(exact) = pit.insert(&interest("/a/b"), now) else {
            panic!("expected new entry");
        };
        let PitInsert::New(prefix) = pit.insert(&interest("/a").with_can_be_prefix(true), now) else {
            panic!("expected new entry");
        };

        let data = Data::new(Name::from_uri("/a/b").unwrap(), &b"x"[..]);
        assert_eq!(pit.find_by_data(exact, &data), Some(exact));
        assert_eq!(pit.find_by_data(prefix, &data), Some(prefix));

        let other = Data::new(Name::from_uri("/a/b/c").unwrap(), &b"x"[..]);
        assert_eq!(pit.find_by_data(exact, &other), None);
        assert_eq!(pit.find_by_data(prefix, &other), Some(prefix));
        assert_eq!(pit.find_by_data(0xdead, &other), None);
    }

    #[test]
    fn test_erase_releases_extensions() {
        let now = Instant::now();
        let mut pit = Pit::new(8, 4);
        let PitInsert::New(token) = pit.insert(&interest("/a"), now) else {
            panic!("expected new entry");
        };
        {
            let (entry, arena) = pit.entry_mut(token).unwrap();
            for f in 1..=(PIT_MAX_DNS + PIT_MAX_EXT_DNS + 1) as u16 {
                assert!(entry.insert_dn(arena, FaceId(f)).is_some());
            }
        }
        assert_eq!(pit.arena().in_use(), 2);

        assert!(pit.erase(token));
        assert_eq!(pit.arena().in_use(), 0);
        assert!(pit.get(token).is_none());
        assert!(!pit.erase(token));

        // the name is free again and gets a fresh token
        assert!(matches!(pit.insert(&interest("/a"), now), PitInsert::New(t) if t != token));
    }

    #[test]
    fn test_expired() {
        let now = Instant::now();
        let mut pit = Pit::new(8, 0);
        let i = interest("/a");
        let PitInsert::New(token) = pit.insert(&i, now) else {
            panic!("expected new entry");
        };
        let (entry, arena) = pit.entry_mut(token).unwrap();
        assert!(entry.record_rx(arena, FaceId(1), &i, 7, now));

        assert!(pit.expired(now + Duration::from_millis(50)).is_empty());
        assert_eq!(pit.expired(now + Duration::from_millis(150)), vec![token]);
        // still reported until erased
        assert_eq!(pit.expired(now + Duration::from_millis(150)), vec![token]);
        assert!(pit.erase(token));
        assert!(pit.expired(now + Duration::from_millis(150)).is_empty());
    }

    #[test]
    fn test_expired_follows_refreshed_downstream() {
        let now = Instant::now();
        let mut pit = Pit::new(8, 0);
        let i = interest("/a");
        let PitInsert::New(a) = pit.insert(&i, now) else {
            panic!("expected new entry");
        };
        let PitInsert::New(b) = pit.insert(&interest("/b"), now) else {
            panic!("expected new entry");
        };
        {
            let (entry, arena) = pit.entry_mut(a).unwrap();
            assert!(entry.record_rx(arena, FaceId(1), &i, 1, now));
        }
        {
            let (entry, arena) = pit.entry_mut(b).unwrap();
            assert!(entry.record_rx(arena, FaceId(2), &interest("/b"), 2, now));
        }

        // /a is refreshed at +80ms, so it now lives until +180ms
        let t1 = now + Duration::from_millis(80);
        let (entry, arena) = pit.entry_mut(a).unwrap();
        assert!(entry.record_rx(arena, FaceId(1), &i, 1, t1));

        assert_eq!(pit.expired(now + Duration::from_millis(150)), vec![b]);
        assert!(pit.erase(b));
        assert!(pit.expired(now + Duration::from_millis(170)).is_empty());
        assert_eq!(pit.expired(now + Duration::from_millis(190)), vec![a]);
    }
}
