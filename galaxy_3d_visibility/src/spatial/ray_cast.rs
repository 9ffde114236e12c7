/// Ray casts through the bin grid.
///
/// The overflow bin is always tested. The grid bins are found by rasterizing
/// the segment's X/Y projection: a segment inside a single row or column visits
/// that row or column directly, otherwise the segment is swept along X one bin
/// column at a time and each column visits only the Y bins the segment crosses
/// inside it.

use glam::Vec3;
use crate::scene::{ObjectKey, ObjectTypes, RayInfo};
use super::bin_grid::BinGrid;
use super::container::{SceneEntity, SpatialContainer};

impl SpatialContainer {
    /// Closest hit along `start -> end` among collision-enabled entities of `mask`.
    ///
    /// A zero-length segment never hits.
    pub fn cast_ray(&mut self, start: Vec3, end: Vec3, mask: ObjectTypes) -> Option<RayInfo> {
        if start == end {
            return None;
        }
        self.stats.queries += 1;
        let query_key = self.next_query_key();

        let grid = *self.grid();
        let mut bins = vec![grid.overflow_bin()];
        bins.extend(ray_bins(&grid, start, end));

        let mut best: Option<(ObjectKey, f32, Vec3)> = None;
        for bin in bins {
            for key in self.refs.list_iter(bin) {
                let Some(entity) = self.objects.get_mut(key) else {
                    continue;
                };
                if let Some((t, normal)) = test_entity(entity, query_key, start, end, mask) {
                    if best.map_or(true, |(_, best_t, _)| t < best_t) {
                        best = Some((key, t, normal));
                    }
                }
            }
        }

        best.map(|(object, t, normal)| RayInfo {
            object,
            t,
            point: start + (end - start) * t,
            normal,
        })
    }

    /// Like `cast_ray`, but a hit on an entity without a game object counts as
    /// no hit.
    pub fn cast_ray_game_objects(&mut self, start: Vec3, end: Vec3, mask: ObjectTypes) -> Option<RayInfo> {
        let info = self.cast_ray(start, end, mask)?;
        let has_game_object = self.objects
            .get(info.object)
            .is_some_and(|e| e.object.has_game_object());
        if has_game_object { Some(info) } else { None }
    }
}

/// Exact test of one entity, in its local space. Returns (t, world normal).
fn test_entity(
    entity: &mut SceneEntity,
    query_key: u32,
    start: Vec3,
    end: Vec3,
    mask: ObjectTypes,
) -> Option<(f32, Vec3)> {
    let state = &mut entity.state;
    if state.last_query_key == query_key {
        return None;
    }
    state.last_query_key = query_key;

    if !state.type_mask().intersects(mask) || !state.is_collision_enabled() {
        return None;
    }
    if !state.is_global_bounds() && state.world_box().ray_intersect(start, end).is_none() {
        return None;
    }

    let local_start = state.world_to_local(start);
    let local_end = state.world_to_local(end);
    let hit = entity.object.cast_ray(state.object_box(), local_start, local_end)?;
    Some((hit.t, state.local_normal_to_world(hit.normal)))
}

/// Grid bins crossed by the X/Y projection of a segment (overflow excluded).
pub(crate) fn ray_bins(grid: &BinGrid, start: Vec3, end: Vec3) -> Vec<u32> {
    let n = grid.bin_count();
    let size = grid.config().bin_size;
    let x_range = grid.get_bin_range(start.x.min(end.x), start.x.max(end.x));
    let y_range = grid.get_bin_range(start.y.min(end.y), start.y.max(end.y));

    // Single row or column, or a segment spanning the whole ring
    if x_range.len() == 1 || y_range.len() == 1
        || grid.is_full_range(&x_range) || grid.is_full_range(&y_range)
    {
        return grid.bins_in(x_range, y_range).collect();
    }

    let (a, b) = if start.x <= end.x { (start, end) } else { (end, start) };
    let slope = (b.y - a.y) / (b.x - a.x);
    let y_at = |x: f32| a.y + (x - a.x) * slope;

    let mut bins = Vec::new();
    let mut x = a.x;
    for _ in 0..=x_range.len() {
        if x >= b.x {
            break;
        }
        let boundary = ((x / size).floor() + 1.0) * size;
        let step_end = boundary.min(b.x);
        if step_end <= x {
            break;
        }

        let column = grid.bin_coord(0.5 * (x + step_end));
        let (ya, yb) = (y_at(x), y_at(step_end));
        let rows = grid.get_bin_range(ya.min(yb), ya.max(yb));
        bins.extend(rows.bins(n).map(|row| grid.bin_index(column, row)));
        x = step_end;
    }
    bins
}

#[cfg(test)]
#[path = "ray_cast_tests.rs"]
mod tests;
