//! Slab arena with index handles
//!
//! Transposition table nodes live in fixed-capacity slabs and refer to each
//! other by `Handle` instead of by pointer. Freeing happens in bulk: `reset`
//! drops every node but keeps the first slab's allocation.

/// Location of a node: slab number and offset in the slab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    slab: u32,
    offset: u32,
}

pub struct Arena<T> {
    slabs: Vec<Vec<T>>,
    first_capacity: usize,
    slab_capacity: usize,
    len: usize,
}

impl<T> Arena<T> {
    /// Arena whose first slab holds `first_capacity` items and every later
    /// slab `slab_capacity` items. Nothing is allocated until first use.
    pub fn new(first_capacity: usize, slab_capacity: usize) -> Self {
        Arena {
            slabs: Vec::new(),
            first_capacity: first_capacity.max(1),
            slab_capacity: slab_capacity.max(1),
            len: 0,
        }
    }

    fn capacity_of(&self, slab: usize) -> usize {
        if slab == 0 {
            self.first_capacity
        } else {
            self.slab_capacity
        }
    }

    /// Whether the next `alloc` has to open a new slab
    pub fn needs_slab(&self) -> bool {
        match self.slabs.last() {
            None => true,
            Some(last) => last.len() >= self.capacity_of(self.slabs.len() - 1),
        }
    }

    /// Bytes the next new slab would take
    pub fn next_slab_bytes(&self) -> usize {
        self.capacity_of(self.slabs.len()) * std::mem::size_of::<T>()
    }

    /// Store a value and return its handle
    pub fn alloc(&mut self, value: T) -> Handle {
        if self.needs_slab() {
            let capacity = self.capacity_of(self.slabs.len());
            self.slabs.push(Vec::with_capacity(capacity));
        }
        let slab = self.slabs.len() - 1;
        let items = &mut self.slabs[slab];
        let offset = items.len();
        items.push(value);
        self.len += 1;
        Handle {
            slab: slab as u32,
            offset: offset as u32,
        }
    }

    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slabs
            .get(handle.slab as usize)
            .and_then(|items| items.get(handle.offset as usize))
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slabs
            .get_mut(handle.slab as usize)
            .and_then(|items| items.get_mut(handle.offset as usize))
    }

    /// Drop every item, keeping the first slab's allocation
    pub fn reset(&mut self) {
        self.slabs.truncate(1);
        if let Some(first) = self.slabs.first_mut() {
            first.clear();
        }
        self.len = 0;
    }

    /// Drop every item and all allocations
    pub fn release(&mut self) {
        self.slabs = Vec::new();
        self.len = 0;
    }

    /// Items stored
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Bytes reserved by all slabs
    pub fn bytes(&self) -> usize {
        self.slabs.iter().map(|s| s.capacity()).sum::<usize>() * std::mem::size_of::<T>()
    }
}
