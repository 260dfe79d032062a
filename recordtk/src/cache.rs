use super::{Error, SIZE_CACHE_GROW};

const INITIAL_CAPACITY: usize = 16;

//////////////////////////////////////////// SizeCache /////////////////////////////////////////////

/// Sizes of every record in one tree, in the order the size pass visits them.
///
/// Slot 0 holds the root.  Each nested record gets the next free slot when the size pass first
/// reaches it, before its own children, so the encode pass can find a child's size by counting
/// the records it has walked so far.  A cache may be cleared and reused across encodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SizeCache {
    sizes: Vec<usize>,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sizes: Vec::with_capacity(capacity),
        }
    }

    /// Number of reserved slots.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Forget all sizes but keep the allocation.
    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }

    /// Make sure `index` is a valid slot.  New slots read as zero until set.
    pub fn reserve(&mut self, index: usize) {
        if index >= self.sizes.len() {
            if index >= self.sizes.capacity() {
                SIZE_CACHE_GROW.click();
            }
            self.sizes.resize(index + 1, 0);
        }
    }

    pub fn set(&mut self, index: usize, size: usize) {
        self.reserve(index);
        self.sizes[index] = size;
    }

    /// The size stored at `index`.  Reading a slot the size pass never reserved is an error.
    pub fn get(&self, index: usize) -> Result<usize, Error> {
        self.sizes
            .get(index)
            .copied()
            .ok_or(Error::CacheIndexOverflow {
                index,
                len: self.sizes.len(),
            })
    }
}

impl Default for SizeCache {
    fn default() -> Self {
        Self::new()
    }
}
