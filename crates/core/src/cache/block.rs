//! Cache blocks and sets.
//!
//! A [`Set`] owns a fixed number of [`Block`]s and a recency queue of their way
//! indices ordered from least recently used (front) to most recently used (back).
//! The queue is maintained by the cache controller through [`Set::touch`]; victim
//! finders only read it.

/// Re-reference prediction value stamped with the policy epoch that wrote it.
///
/// A stamp from an older epoch is treated as absent, which lets a policy forget
/// every counter in O(1) on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RrpvStamp {
    pub(crate) value: u8,
    pub(crate) epoch: u64,
}

/// One slot within a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Tag of the resident line; meaningful only while `is_valid`.
    pub tag: u64,
    set_id: usize,
    way_id: usize,
    /// Whether the block holds live data.
    pub is_valid: bool,
    /// Whether the resident line was written since it was filled.
    pub is_dirty: bool,
    /// Whether the block is pinned against eviction.
    ///
    /// Set by the controller only. Victim finders respect it but never change it.
    pub is_locked: bool,
    pub(crate) rrpv: Option<RrpvStamp>,
}

impl Block {
    /// Creates an empty, unlocked block at `way_id` of set `set_id`.
    pub const fn new(set_id: usize, way_id: usize) -> Self {
        Self {
            tag: 0,
            set_id,
            way_id,
            is_valid: false,
            is_dirty: false,
            is_locked: false,
            rrpv: None,
        }
    }

    /// Index of the owning set.
    #[inline]
    pub const fn set_id(&self) -> usize {
        self.set_id
    }

    /// Index of this block within its set; the block's stable identity.
    #[inline]
    pub const fn way_id(&self) -> usize {
        self.way_id
    }

    /// True if the block is empty and may be filled without evicting anything.
    #[inline]
    pub const fn is_free(&self) -> bool {
        !self.is_valid && !self.is_locked
    }
}

/// A fixed-size associativity group.
///
/// Every way appears exactly once in the recency queue and the queue length
/// equals the associativity for the lifetime of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    id: usize,
    blocks: Vec<Block>,
    recency_queue: Vec<usize>,
}

impl Set {
    /// Creates a set of `ways` empty blocks.
    ///
    /// The initial recency order is way 0 (least recent) through `ways - 1` (most recent).
    pub fn new(set_id: usize, ways: usize) -> Self {
        Self {
            id: set_id,
            blocks: (0..ways).map(|way| Block::new(set_id, way)).collect(),
            recency_queue: (0..ways).collect(),
        }
    }

    /// Index of the set within its cache.
    #[inline]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Associativity of the set.
    #[inline]
    pub fn ways(&self) -> usize {
        self.blocks.len()
    }

    /// Way indices ordered from least to most recently used.
    #[inline]
    pub fn recency_queue(&self) -> &[usize] {
        &self.recency_queue
    }

    /// All blocks, indexed by way.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the block at `way`, if it exists.
    #[inline]
    pub fn block(&self, way: usize) -> Option<&Block> {
        self.blocks.get(way)
    }

    /// Returns the block at `way` mutably, if it exists.
    #[inline]
    pub fn block_mut(&mut self, way: usize) -> Option<&mut Block> {
        self.blocks.get_mut(way)
    }

    /// `(way, block)` pairs in recency order, least recently used first.
    ///
    /// The way is the block's position in the set, as listed in the queue.
    pub fn iter_lru(&self) -> impl Iterator<Item = (usize, &Block)> + '_ {
        self.recency_queue.iter().map(|&way| (way, &self.blocks[way]))
    }

    /// Moves `way` to the most recently used end of the queue.
    ///
    /// Unknown ways are ignored.
    pub fn touch(&mut self, way: usize) {
        if let Some(pos) = self.recency_queue.iter().position(|&w| w == way) {
            let w = self.recency_queue.remove(pos);
            self.recency_queue.push(w);
        }
    }

    /// Returns the way holding a valid line with `tag`.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.is_valid && b.tag == tag)
    }

    /// Empties every block and restores the initial recency order.
    ///
    /// Lock flags are controller state and survive the reset.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            block.tag = 0;
            block.is_valid = false;
            block.is_dirty = false;
            block.rrpv = None;
        }
        self.recency_queue.clear();
        self.recency_queue.extend(0..self.blocks.len());
    }

    /// Builds a set directly from blocks and a recency order.
    ///
    /// `recency_queue` must be a permutation of `0..blocks.len()`; `None` is returned otherwise.
    /// Each block's `set_id` and `way_id` are rewritten to match its position.
    pub fn from_parts(id: usize, mut blocks: Vec<Block>, recency_queue: Vec<usize>) -> Option<Self> {
        let mut seen = vec![false; blocks.len()];
        if recency_queue.len() != blocks.len() {
            return None;
        }
        for &way in &recency_queue {
            match seen.get_mut(way) {
                Some(slot) if !*slot => *slot = true,
                _ => return None,
            }
        }
        for (way, block) in blocks.iter_mut().enumerate() {
            block.set_id = id;
            block.way_id = way;
        }
        Some(Self {
            id,
            blocks,
            recency_queue,
        })
    }
}
