//! Bounded arena of PIT entry extension blocks.

use super::entry::{PitDn, PitUp, PIT_MAX_EXT_DNS, PIT_MAX_EXT_UPS};

/// Index of an extension block within its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtIdx(u32);

/// Overflow storage for a PIT entry whose inline slots are full.
#[derive(Debug, Clone, Default)]
pub struct ExtBlock {
    pub(crate) dns: [PitDn; PIT_MAX_EXT_DNS],
    pub(crate) ups: [PitUp; PIT_MAX_EXT_UPS],
    pub(crate) next: Option<ExtIdx>,
}

/// Extension blocks of one PIT.
///
/// Blocks are created lazily up to `capacity` and recycled through a free
/// list. Allocation never blocks; it fails once `capacity` blocks are in use.
#[derive(Debug)]
pub struct ExtArena {
    blocks: Vec<ExtBlock>,
    free: Vec<u32>,
    capacity: usize,
}

impl ExtArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Take a block with every slot empty and no successor.
    pub fn alloc(&mut self) -> Option<ExtIdx> {
        if let Some(i) = self.free.pop() {
            self.blocks[i as usize] = ExtBlock::default();
            return Some(ExtIdx(i));
        }
        if self.blocks.len() >= self.capacity {
            return None;
        }
        self.blocks.push(ExtBlock::default());
        Some(ExtIdx((self.blocks.len() - 1) as u32))
    }

    /// Return every block of a chain; returns how many were released.
    pub fn free_chain(&mut self, head: Option<ExtIdx>) -> usize {
        let mut n = 0;
        let mut cur = head;
        while let Some(idx) = cur {
            cur = self.blocks[idx.0 as usize].next.take();
            self.free.push(idx.0);
            n += 1;
        }
        n
    }

    pub fn get(&self, idx: ExtIdx) -> &ExtBlock {
        &self.blocks[idx.0 as usize]
    }

    pub fn get_mut(&mut self, idx: ExtIdx) -> &mut ExtBlock {
        &mut self.blocks[idx.0 as usize]
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.blocks.len() - self.free.len()
    }
}
