/// Bin grid geometry.
///
/// World X/Y is mapped onto an N x N ring of square bins: coordinates wrap
/// every `bin_size * N` units, so the grid covers an unbounded world with a
/// fixed array. One extra overflow bin (index N * N) holds entities whose
/// extent covers the whole ring on both axes, and global-bounds entities. An
/// entity covering the ring on one axis only is linked in every bin of its rows
/// or columns.

use crate::error::Result;
use crate::engine_bail;
use crate::scene::AABB;

/// Container configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerConfig {
    /// Width of one square bin, in world units
    pub bin_size: f32,
    /// Bins per axis (N)
    pub bin_count: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self { bin_size: 64.0, bin_count: 16 }
    }
}

impl ContainerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.bin_size.is_finite() && self.bin_size > 0.0) {
            engine_bail!("galaxy3d::SpatialContainer", InvalidConfig,
                "bin_size must be positive and finite, got {}", self.bin_size);
        }
        if self.bin_count == 0 {
            engine_bail!("galaxy3d::SpatialContainer", InvalidConfig,
                "bin_count must be at least 1");
        }
        Ok(())
    }

    /// Wrap period of the ring along one axis.
    pub fn total_span(&self) -> f32 {
        self.bin_size * self.bin_count as f32
    }
}

/// Inclusive bin range along one axis. `max` may exceed N - 1 when the range
/// wraps; actual bins are taken modulo N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRange {
    pub min: u32,
    pub max: u32,
}

impl BinRange {
    pub fn bins(&self, bin_count: u32) -> impl Iterator<Item = u32> {
        (self.min..=self.max).map(move |b| b % bin_count)
    }

    pub fn len(&self) -> u32 {
        self.max - self.min + 1
    }
}

/// Where an entity is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinPlacement {
    Grid { x: BinRange, y: BinRange },
    Overflow,
}

#[derive(Debug, Clone, Copy)]
pub struct BinGrid {
    config: ContainerConfig,
}

impl BinGrid {
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn bin_count(&self) -> u32 {
        self.config.bin_count
    }

    /// Index of the overflow bin (one past the grid bins).
    pub fn overflow_bin(&self) -> u32 {
        self.config.bin_count * self.config.bin_count
    }

    /// Number of bin lists including the overflow bin.
    pub fn list_count(&self) -> usize {
        self.overflow_bin() as usize + 1
    }

    /// Bin coordinate of a world coordinate on one axis.
    pub fn bin_coord(&self, coord: f32) -> u32 {
        let wrapped = coord.rem_euclid(self.config.total_span());
        let bin = (wrapped / self.config.bin_size).floor() as u32;
        // rem_euclid can round up to the span itself
        bin.min(self.config.bin_count - 1)
    }

    /// Bins covered by `[min, max]` on one axis.
    pub fn get_bin_range(&self, min: f32, max: f32) -> BinRange {
        let n = self.config.bin_count;
        if max - min >= self.config.total_span() - self.config.bin_size {
            return BinRange { min: 0, max: n - 1 };
        }
        let min_bin = self.bin_coord(min);
        let mut max_bin = self.bin_coord(max);
        if max_bin < min_bin {
            max_bin += n;
        }
        BinRange { min: min_bin, max: max_bin.min(min_bin + n - 1) }
    }

    pub fn is_full_range(&self, range: &BinRange) -> bool {
        range.len() >= self.config.bin_count
    }

    /// Placement of a world box.
    pub fn placement(&self, world_box: &AABB, global_bounds: bool) -> BinPlacement {
        if global_bounds {
            return BinPlacement::Overflow;
        }
        let x = self.get_bin_range(world_box.min.x, world_box.max.x);
        let y = self.get_bin_range(world_box.min.y, world_box.max.y);
        if self.is_full_range(&x) && self.is_full_range(&y) {
            BinPlacement::Overflow
        } else {
            BinPlacement::Grid { x, y }
        }
    }

    pub fn bin_index(&self, x: u32, y: u32) -> u32 {
        let n = self.config.bin_count;
        (y % n) * n + (x % n)
    }

    /// Every bin of a rectangle of ranges.
    pub fn bins_in(&self, x: BinRange, y: BinRange) -> impl Iterator<Item = u32> + '_ {
        let n = self.config.bin_count;
        y.bins(n).flat_map(move |by| x.bins(n).map(move |bx| self.bin_index(bx, by)))
    }

    /// Bins linked for a placement.
    pub fn placement_bins(&self, placement: &BinPlacement) -> Vec<u32> {
        match placement {
            BinPlacement::Grid { x, y } => self.bins_in(*x, *y).collect(),
            BinPlacement::Overflow => vec![self.overflow_bin()],
        }
    }

    /// Grid bins a query box must visit (the overflow bin excluded).
    pub fn query_bins(&self, region: &AABB) -> Vec<u32> {
        let x = self.get_bin_range(region.min.x, region.max.x);
        let y = self.get_bin_range(region.min.y, region.max.y);
        self.bins_in(x, y).collect()
    }
}

#[cfg(test)]
#[path = "bin_grid_tests.rs"]
mod tests;
