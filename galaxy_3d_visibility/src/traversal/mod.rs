//! Traversal module: visibility passes over the zone graph.
//!
//! A `VisibilityTraversal` runs one pass per camera and one more per transform
//! portal it crosses, producing a tree of `TraversalState`s for the renderer.

mod occlusion;
mod render_context;
mod traversal_state;
mod visibility;

pub use occlusion::TerrainOcclusionConfig;
pub use render_context::RenderContext;
pub use traversal_state::{RenderImage, TransformPortal, TraversalState, TraversalStatus, ZoneState};
pub use visibility::{TraversalConfig, TraversalRequest, VisibilityTraversal};
