//! Iterators over downstream and upstream slots of a PIT entry.
//!
//! Slots live first in the entry's inline arrays and then in a chain of
//! extension blocks. A [`SlotIt`] walks that chain one slot at a time:
//!
//! ```ignore
//! let mut it = PitDnIt::new(entry);
//! while it.valid() {
//!     let dn = it.get(entry, arena);
//!     if dn.face.is_none() {
//!         break;
//!     }
//!     it.next(entry, arena);
//! }
//! ```
//!
//! The iterator holds no borrow; the entry and arena are passed to each call.

use super::arena::{ExtArena, ExtBlock, ExtIdx};
use super::entry::{PitDn, PitEntry, PitUp, PIT_MAX_DNS, PIT_MAX_EXT_DNS, PIT_MAX_EXT_UPS, PIT_MAX_UPS};
use rust_ndnfw_common::FaceId;
use std::marker::PhantomData;

/// Selects the downstream or upstream half of a PIT entry.
pub trait SlotKind {
    type Slot;
    const MAX_IN_ENTRY: usize;
    const MAX_IN_EXT: usize;

    fn in_entry(entry: &PitEntry) -> &[Self::Slot];
    fn in_entry_mut(entry: &mut PitEntry) -> &mut [Self::Slot];
    fn in_ext(ext: &ExtBlock) -> &[Self::Slot];
    fn in_ext_mut(ext: &mut ExtBlock) -> &mut [Self::Slot];

    /// Number of occupied slots.
    fn count(entry: &PitEntry) -> usize;
    fn count_mut(entry: &mut PitEntry) -> &mut usize;
    fn face(slot: &Self::Slot) -> FaceId;
}

/// Downstream slots.
#[derive(Debug)]
pub enum Dn {}

/// Upstream slots.
#[derive(Debug)]
pub enum Up {}

impl SlotKind for Dn {
    type Slot = PitDn;
    const MAX_IN_ENTRY: usize = PIT_MAX_DNS;
    const MAX_IN_EXT: usize = PIT_MAX_EXT_DNS;

    fn in_entry(entry: &PitEntry) -> &[PitDn] {
        &entry.dns
    }
    fn in_entry_mut(entry: &mut PitEntry) -> &mut [PitDn] {
        &mut entry.dns
    }
    fn in_ext(ext: &ExtBlock) -> &[PitDn] {
        &ext.dns
    }
    fn in_ext_mut(ext: &mut ExtBlock) -> &mut [PitDn] {
        &mut ext.dns
    }
    fn count(entry: &PitEntry) -> usize {
        entry.n_dns
    }
    fn count_mut(entry: &mut PitEntry) -> &mut usize {
        &mut entry.n_dns
    }
    fn face(slot: &PitDn) -> FaceId {
        slot.face
    }
}

impl SlotKind for Up {
    type Slot = PitUp;
    const MAX_IN_ENTRY: usize = PIT_MAX_UPS;
    const MAX_IN_EXT: usize = PIT_MAX_EXT_UPS;

    fn in_entry(entry: &PitEntry) -> &[PitUp] {
        &entry.ups
    }
    fn in_entry_mut(entry: &mut PitEntry) -> &mut [PitUp] {
        &mut entry.ups
    }
    fn in_ext(ext: &ExtBlock) -> &[PitUp] {
        &ext.ups
    }
    fn in_ext_mut(ext: &mut ExtBlock) -> &mut [PitUp] {
        &mut ext.ups
    }
    fn count(entry: &PitEntry) -> usize {
        entry.n_ups
    }
    fn count_mut(entry: &mut PitEntry) -> &mut usize {
        &mut entry.n_ups
    }
    fn face(slot: &PitUp) -> FaceId {
        slot.face
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Entry,
    Ext(ExtIdx),
}

/// Cursor over the slots of one kind.
#[derive(Debug)]
pub struct SlotIt<K> {
    /// Logical index across the entry and all extensions.
    pub index: usize,
    i: usize,
    max: usize,
    seg: Segment,
    _kind: PhantomData<K>,
}

impl<K> Clone for SlotIt<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for SlotIt<K> {}

pub type PitDnIt = SlotIt<Dn>;
pub type PitUpIt = SlotIt<Up>;

impl<K: SlotKind> SlotIt<K> {
    /// Position at logical index 0 in the entry's inline array.
    pub fn new(_entry: &PitEntry) -> Self {
        Self {
            index: 0,
            i: 0,
            max: K::MAX_IN_ENTRY,
            seg: Segment::Entry,
            _kind: PhantomData,
        }
    }

    /// Whether the cursor points at a slot. Does not look at slot contents.
    pub fn valid(&self) -> bool {
        self.i < self.max
    }

    /// Advance, following the extension chain when the current array ends.
    pub fn next(&mut self, entry: &PitEntry, arena: &ExtArena) {
        debug_assert!(self.valid());
        self.index += 1;
        self.i += 1;
        if self.i < self.max {
            return;
        }

        if let Some(ext) = self.next_link(entry, arena) {
            self.i = 0;
            self.max = K::MAX_IN_EXT;
            self.seg = Segment::Ext(ext);
        }
    }

    fn next_link(&self, entry: &PitEntry, arena: &ExtArena) -> Option<ExtIdx> {
        match self.seg {
            Segment::Entry => entry.ext,
            Segment::Ext(idx) => arena.get(idx).next,
        }
    }

    /// Append an extension block after the end of the chain and point at its
    /// first slot.
    ///
    /// Only meaningful once the cursor has run off the end of the chain.
    /// Returns `false` if the arena is exhausted; nothing is changed then.
    pub fn extend(&mut self, entry: &mut PitEntry, arena: &mut ExtArena) -> bool {
        debug_assert!(!self.valid());
        if self.valid() || self.next_link(entry, arena).is_some() {
            return false;
        }

        let Some(ext) = arena.alloc() else {
            return false;
        };
        match self.seg {
            Segment::Entry => entry.ext = Some(ext),
            Segment::Ext(prev) => arena.get_mut(prev).next = Some(ext),
        }
        self.i = 0;
        self.max = K::MAX_IN_EXT;
        self.seg = Segment::Ext(ext);
        true
    }

    pub fn get<'a>(&self, entry: &'a PitEntry, arena: &'a ExtArena) -> &'a K::Slot {
        match self.seg {
            Segment::Entry => &K::in_entry(entry)[self.i],
            Segment::Ext(idx) => &K::in_ext(arena.get(idx))[self.i],
        }
    }

    pub fn get_mut<'a>(&self, entry: &'a mut PitEntry, arena: &'a mut ExtArena) -> &'a mut K::Slot {
        match self.seg {
            Segment::Entry => &mut K::in_entry_mut(entry)[self.i],
            Segment::Ext(idx) => &mut K::in_ext_mut(arena.get_mut(idx))[self.i],
        }
    }
}

/// Borrowing iterator over the occupied slots of one kind.
pub struct Slots<'a, K: SlotKind> {
    entry: &'a PitEntry,
    arena: &'a ExtArena,
    it: SlotIt<K>,
    remaining: usize,
}

impl<'a, K: SlotKind> Slots<'a, K> {
    pub(crate) fn new(entry: &'a PitEntry, arena: &'a ExtArena) -> Self {
        Self {
            entry,
            arena,
            it: SlotIt::new(entry),
            remaining: K::count(entry),
        }
    }
}

impl<'a, K: SlotKind> Iterator for Slots<'a, K>
where
    K::Slot: 'a,
{
    type Item = &'a K::Slot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || !self.it.valid() {
            return None;
        }
        let slot = self.it.get(self.entry, self.arena);
        if K::face(slot).is_none() {
            self.remaining = 0;
            return None;
        }
        self.remaining -= 1;
        self.it.next(self.entry, self.arena);
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Cursor at the slot bound to `face`, if any.
pub(crate) fn find<K: SlotKind>(entry: &PitEntry, arena: &ExtArena, face: FaceId) -> Option<SlotIt<K>> {
    let mut it = SlotIt::<K>::new(entry);
    let mut remaining = K::count(entry);
    while remaining > 0 && it.valid() {
        let slot_face = K::face(it.get(entry, arena));
        if slot_face.is_none() {
            break;
        }
        if slot_face == face {
            return Some(it);
        }
        remaining -= 1;
        it.next(entry, arena);
    }
    None
}

/// Cursor at the first empty slot, extending the chain if needed.
///
/// The occupied count is bumped; the caller fills the slot. Returns `None` if
/// the arena is exhausted.
pub(crate) fn append<K: SlotKind>(entry: &mut PitEntry, arena: &mut ExtArena) -> Option<SlotIt<K>> {
    let mut it = SlotIt::<K>::new(entry);
    for _ in 0..K::count(entry) {
        it.next(entry, arena);
    }
    if !it.valid() && !it.extend(entry, arena) {
        return None;
    }
    *K::count_mut(entry) += 1;
    Some(it)
}
