/// Allocates and recycles contiguous ranges of zone indices.
///
/// Each zone manager receives `[first, first + count)`. Indices below the
/// reserved start (zone 0, the outdoor zone) are never handed out. Freed ranges
/// are merged with their neighbours and reused first-fit.
///
/// # Example
///
/// ```ignore
/// let mut alloc = ZoneRangeAllocator::new(1);
/// let a = alloc.alloc(4);  // 1..5
/// let b = alloc.alloc(2);  // 5..7
/// alloc.free(a, 4);
/// let c = alloc.alloc(3);  // 1..4 (recycled)
/// ```
#[derive(Debug)]
pub struct ZoneRangeAllocator {
    /// Free ranges as (first, count), sorted by `first`, never adjacent
    free_ranges: Vec<(u32, u32)>,
    next_id: u32,
    reserved: u32,
    len: u32,
}

impl ZoneRangeAllocator {
    /// Create an allocator whose first `reserved` indices are never allocated.
    pub fn new(reserved: u32) -> Self {
        Self {
            free_ranges: Vec::new(),
            next_id: reserved,
            reserved,
            len: 0,
        }
    }

    /// Allocate `count` contiguous indices and return the first one.
    pub fn alloc(&mut self, count: u32) -> u32 {
        debug_assert!(count > 0, "allocating an empty zone range");
        self.len += count;

        if let Some(pos) = self.free_ranges.iter().position(|&(_, n)| n >= count) {
            let (first, n) = self.free_ranges[pos];
            if n == count {
                self.free_ranges.remove(pos);
            } else {
                self.free_ranges[pos] = (first + count, n - count);
            }
            return first;
        }

        let first = self.next_id;
        self.next_id += count;
        first
    }

    /// Return a range to the pool.
    pub fn free(&mut self, first: u32, count: u32) {
        debug_assert!(
            first >= self.reserved && first + count <= self.next_id,
            "freeing an unallocated zone range: {}..{}", first, first + count
        );
        self.len -= count;

        let pos = self.free_ranges.partition_point(|&(f, _)| f < first);
        self.free_ranges.insert(pos, (first, count));

        // Merge with the following range
        if pos + 1 < self.free_ranges.len() {
            let (f, n) = self.free_ranges[pos];
            let (next_f, next_n) = self.free_ranges[pos + 1];
            if f + n == next_f {
                self.free_ranges[pos] = (f, n + next_n);
                self.free_ranges.remove(pos + 1);
            }
        }
        // Merge with the preceding range
        if pos > 0 {
            let (prev_f, prev_n) = self.free_ranges[pos - 1];
            let (f, n) = self.free_ranges[pos];
            if prev_f + prev_n == f {
                self.free_ranges[pos - 1] = (prev_f, prev_n + n);
                self.free_ranges.remove(pos);
            }
        }
    }

    /// Highest index ever allocated + 1 (at least the reserved count).
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of currently allocated indices
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for ZoneRangeAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
#[path = "zone_range_allocator_tests.rs"]
mod tests;
