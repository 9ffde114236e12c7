/// Height-field terrain.
///
/// `TerrainHeightField` is what the traversal needs from a terrain: a height
/// lookup and a segment test, both in the terrain's local space (Z up).
/// `HeightFieldTerrain` is a regular grid implementation with bilinear heights.

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use super::bounds::AABB;
use super::object::{RayHit, SceneObject};

/// Bisection steps refining a terrain crossing.
const REFINE_STEPS: u32 = 10;

pub trait TerrainHeightField {
    /// Surface height at local (x, y), `None` outside the field.
    fn height_at(&self, x: f32, y: f32) -> Option<f32>;

    /// Parameter in [0, 1] where the segment first goes below the surface.
    fn cast_ray(&self, start: Vec3, end: Vec3) -> Option<f32>;
}

/// Regular grid of height samples starting at the local origin.
#[derive(Debug, Clone)]
pub struct HeightFieldTerrain {
    heights: Vec<f32>,
    size_x: usize,
    size_y: usize,
    spacing: f32,
}

impl HeightFieldTerrain {
    /// Create a terrain from row-major samples (`heights[y * size_x + x]`).
    pub fn new(size_x: usize, size_y: usize, spacing: f32, heights: Vec<f32>) -> Result<Self> {
        if size_x < 2 || size_y < 2 {
            engine_bail!("galaxy3d::Terrain", InvalidConfig,
                "Height field needs at least 2x2 samples, got {}x{}", size_x, size_y);
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            engine_bail!("galaxy3d::Terrain", InvalidConfig,
                "Height field spacing must be positive, got {}", spacing);
        }
        if heights.len() != size_x * size_y {
            engine_bail!("galaxy3d::Terrain", InvalidConfig,
                "Height field expects {} samples, got {}", size_x * size_y, heights.len());
        }
        Ok(Self { heights, size_x, size_y, spacing })
    }

    /// Create a terrain whose samples come from `f(x_index, y_index)`.
    pub fn from_fn(
        size_x: usize,
        size_y: usize,
        spacing: f32,
        f: impl Fn(usize, usize) -> f32,
    ) -> Result<Self> {
        let heights = (0..size_y)
            .flat_map(|y| (0..size_x).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(size_x, size_y, spacing, heights)
    }

    pub fn flat(size_x: usize, size_y: usize, spacing: f32, height: f32) -> Result<Self> {
        Self::new(size_x, size_y, spacing, vec![height; size_x * size_y])
    }

    pub fn set_height(&mut self, x: usize, y: usize, height: f32) {
        debug_assert!(x < self.size_x && y < self.size_y, "height sample out of range");
        if let Some(sample) = self.heights.get_mut(y * self.size_x + x) {
            *sample = height;
        }
    }

    fn sample(&self, x: usize, y: usize) -> f32 {
        self.heights[y * self.size_x + x]
    }

    /// Local-space bounds of the surface.
    pub fn bounds(&self) -> AABB {
        let (min_h, max_h) = self.heights.iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), h| (lo.min(*h), hi.max(*h)));
        AABB::new(
            Vec3::new(0.0, 0.0, min_h),
            Vec3::new(
                (self.size_x - 1) as f32 * self.spacing,
                (self.size_y - 1) as f32 * self.spacing,
                max_h,
            ),
        )
    }

    /// Surface normal from central differences (Z up).
    pub fn normal_at(&self, x: f32, y: f32) -> Vec3 {
        let d = self.spacing * 0.5;
        let h = |px: f32, py: f32| self.height_at(px, py).or_else(|| self.height_at(x, y)).unwrap_or(0.0);
        let dx = h(x + d, y) - h(x - d, y);
        let dy = h(x, y + d) - h(x, y - d);
        Vec3::new(-dx, -dy, 2.0 * d).normalize_or_zero()
    }

    fn is_below(&self, p: Vec3) -> bool {
        self.height_at(p.x, p.y).is_some_and(|h| p.z < h)
    }

    /// Grid cell index range covered by `[min, max]` along one axis.
    fn cell_range(&self, min: f32, max: f32, size: usize) -> Option<(usize, usize)> {
        let last = size as i64 - 2;
        let lo = ((min / self.spacing).floor() as i64).max(0);
        let hi = ((max / self.spacing).floor() as i64).min(last);
        if lo > hi { None } else { Some((lo as usize, hi as usize)) }
    }
}

impl TerrainHeightField for HeightFieldTerrain {
    fn height_at(&self, x: f32, y: f32) -> Option<f32> {
        let gx = x / self.spacing;
        let gy = y / self.spacing;
        let max_x = (self.size_x - 1) as f32;
        let max_y = (self.size_y - 1) as f32;
        if !(0.0..=max_x).contains(&gx) || !(0.0..=max_y).contains(&gy) {
            return None;
        }

        let ix = (gx.floor() as usize).min(self.size_x - 2);
        let iy = (gy.floor() as usize).min(self.size_y - 2);
        let fx = gx - ix as f32;
        let fy = gy - iy as f32;

        let h00 = self.sample(ix, iy);
        let h10 = self.sample(ix + 1, iy);
        let h01 = self.sample(ix, iy + 1);
        let h11 = self.sample(ix + 1, iy + 1);
        let bottom = h00 + (h10 - h00) * fx;
        let top = h01 + (h11 - h01) * fx;
        Some(bottom + (top - bottom) * fy)
    }

    fn cast_ray(&self, start: Vec3, end: Vec3) -> Option<f32> {
        let dir = end - start;
        let length = dir.length();
        if length == 0.0 {
            return None;
        }
        if self.is_below(start) {
            return Some(0.0);
        }

        // March in half-cell steps, then refine the first crossing
        let steps = (length / (self.spacing * 0.5)).ceil().max(1.0) as u32;
        let mut prev_t = 0.0;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            if self.is_below(start + dir * t) {
                let (mut lo, mut hi) = (prev_t, t);
                for _ in 0..REFINE_STEPS {
                    let mid = 0.5 * (lo + hi);
                    if self.is_below(start + dir * mid) {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                return Some(hi);
            }
            prev_t = t;
        }
        None
    }
}

impl SceneObject for HeightFieldTerrain {
    fn cast_ray(&self, _object_box: &AABB, start: Vec3, end: Vec3) -> Option<RayHit> {
        let t = TerrainHeightField::cast_ray(self, start, end)?;
        let p = start + (end - start) * t;
        Some(RayHit { t, normal: self.normal_at(p.x, p.y) })
    }

    fn build_poly_list(&self, _object_box: &AABB, local_region: &AABB, out: &mut Vec<Vec<Vec3>>) -> bool {
        let Some((x0, x1)) = self.cell_range(local_region.min.x, local_region.max.x, self.size_x) else {
            return false;
        };
        let Some((y0, y1)) = self.cell_range(local_region.min.y, local_region.max.y, self.size_y) else {
            return false;
        };

        let before = out.len();
        let point = |x: usize, y: usize| {
            Vec3::new(x as f32 * self.spacing, y as f32 * self.spacing, self.sample(x, y))
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (p00, p10, p01, p11) = (point(x, y), point(x + 1, y), point(x, y + 1), point(x + 1, y + 1));
                let cell_low = p00.z.min(p10.z).min(p01.z).min(p11.z);
                let cell_high = p00.z.max(p10.z).max(p01.z).max(p11.z);
                if cell_high < local_region.min.z || cell_low > local_region.max.z {
                    continue;
                }
                out.push(vec![p00, p10, p11]);
                out.push(vec![p00, p11, p01]);
            }
        }
        out.len() > before
    }

    fn as_terrain(&self) -> Option<&dyn TerrainHeightField> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "terrain_tests.rs"]
mod tests;
