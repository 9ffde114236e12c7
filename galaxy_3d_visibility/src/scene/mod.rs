//! Scene module: entities, bounds and the world that ties the container to the
//! zone graph.
//!
//! Entities are boxed `SceneObject`s keyed by `ObjectKey`. `SceneWorld` owns the
//! spatial container and the zone graph and keeps zone membership up to date
//! as entities are added, moved and removed.

mod bounds;
mod mock_object;
mod object;
mod terrain;
mod world;

pub use bounds::{AABB, Polyhedron, GLOBAL_BOUNDS_EXTENT};
pub use mock_object::MockObject;
pub use object::{ObjectDesc, ObjectKey, ObjectTypes, RayHit, RayInfo, SceneObject};
pub use terrain::{HeightFieldTerrain, TerrainHeightField};
pub use world::SceneWorld;
