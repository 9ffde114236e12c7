/// Terrain occlusion: skip small outdoor entities hidden behind terrain.
///
/// Sample points on top of the entity's world box are joined to the camera and
/// each segment is tested against every terrain in short pieces. The entity is
/// hidden only when every sample is blocked.

use glam::Vec3;
use crate::scene::{ObjectKey, TerrainHeightField};
use crate::spatial::{ObjectState, SpatialContainer};
use crate::zone::OUTDOOR_ZONE;

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainOcclusionConfig {
    pub enabled: bool,
    /// Entities wider than this (X or Y) are never occluded
    pub max_footprint: f32,
    /// Ascending split points along the camera-to-sample segment. Pieces run
    /// from 0 to each fraction in turn; the stretch past the last one is not tested.
    pub sample_fractions: Vec<f32>,
}

impl Default for TerrainOcclusionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_footprint: 256.0,
            sample_fractions: vec![0.25, 0.5, 0.75],
        }
    }
}

type Occluder<'a> = (&'a ObjectState, &'a dyn TerrainHeightField);

/// True when terrain hides the entity `key` from `eye`.
pub(crate) fn is_occluded_by_terrain(
    container: &SpatialContainer,
    config: &TerrainOcclusionConfig,
    eye: Vec3,
    key: ObjectKey,
    state: &ObjectState,
    zones: &[u32],
) -> bool {
    if !config.enabled || state.is_global_bounds() || zones != [OUTDOOR_ZONE] {
        return false;
    }
    let extents = state.world_box().extents();
    if extents.x.max(extents.y) > config.max_footprint {
        return false;
    }

    let occluders: Vec<Occluder<'_>> = container
        .terrains()
        .iter()
        .filter(|&&terrain| terrain != key)
        .filter_map(|&terrain| {
            let terrain_state = container.object_state(terrain)?;
            let field = container.object(terrain)?.as_terrain()?;
            Some((terrain_state, field))
        })
        .collect();
    if !is_eye_above_terrain(&occluders, eye) {
        return false;
    }

    let world_box = state.world_box();
    let (min, max) = (world_box.min, world_box.max);
    let center = world_box.center();
    let samples = [
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(center.x, center.y, max.z),
    ];
    samples
        .iter()
        .all(|&sample| is_sample_blocked(&occluders, &config.sample_fractions, eye, sample))
}

/// The eye is over at least one terrain and above every terrain it is over.
fn is_eye_above_terrain(occluders: &[Occluder<'_>], eye: Vec3) -> bool {
    let mut over_terrain = false;
    for (state, field) in occluders {
        let local = state.world_to_local(eye);
        if let Some(height) = field.height_at(local.x, local.y) {
            if local.z <= height {
                return false;
            }
            over_terrain = true;
        }
    }
    over_terrain
}

fn is_sample_blocked(occluders: &[Occluder<'_>], fractions: &[f32], eye: Vec3, sample: Vec3) -> bool {
    let mut previous = 0.0;
    for &fraction in fractions {
        let start = eye.lerp(sample, previous);
        let end = eye.lerp(sample, fraction);
        let blocked = occluders.iter().any(|(state, field)| {
            field.cast_ray(state.world_to_local(start), state.world_to_local(end)).is_some()
        });
        if blocked {
            return true;
        }
        previous = fraction;
    }
    false
}

#[cfg(test)]
#[path = "occlusion_tests.rs"]
mod tests;
