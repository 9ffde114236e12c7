//! Internal building blocks shared by the container and the zone graph.

mod ref_pool;
mod zone_range_allocator;

pub use ref_pool::RefPool;
pub use zone_range_allocator::ZoneRangeAllocator;
