/*!
# Galaxy 3D Visibility

Spatial indexing and visibility determination for the Galaxy 3D engine.

This crate keeps every scene entity in a uniform bin grid, partitions the world
into zones owned by zone managers (buildings, caves), and answers "what does
this camera see" with a depth-first traversal that recurses through transform
portals (mirrors, teleporters).

## Architecture

- **SpatialContainer**: bin-grid index, box/frustum queries, ray casts, collision lists
- **ZoneGraph**: zone ranges, zone owners and per-zone membership
- **ZoneManager / PortalOwner**: entity-side zone and portal behaviour
- **SceneWorld**: the container and zone graph kept consistent as entities move
- **VisibilityTraversal**: one pass per viewpoint, producing a `TraversalState` tree

Entities implement `SceneObject` and are stored behind stable `ObjectKey`s.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod scene;
pub mod spatial;
pub mod traversal;
pub mod zone;
pub(crate) mod utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Spatial container sub-module
    pub mod spatial {
        pub use crate::spatial::*;
    }

    // Zone sub-module
    pub mod zone {
        pub use crate::zone::*;
    }

    // Traversal sub-module
    pub mod traversal {
        pub use crate::traversal::*;
    }
}

// Re-export math library at crate root
pub use glam;
