//! Spatial container: bin-grid index, range queries, ray casts and collision lists.

mod bin_grid;
mod collision;
mod container;
mod ray_cast;

pub use bin_grid::{BinGrid, BinPlacement, BinRange, ContainerConfig};
pub use collision::{CollisionList, Contact, PolyList, Polygon, SweepVolume};
pub use container::{ContainerStats, ObjectState, QueryRegion, SpatialContainer};
pub(crate) use container::SceneEntity;
