//! Camera module: viewpoint, frustums and viewport.
//!
//! A `Camera` is owned by the caller and handed to the traversal, which derives
//! a child camera for every portal it crosses.

mod camera;
mod frustum;
mod view_frustum;
mod viewport;

pub use camera::Camera;
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use view_frustum::ViewFrustum;
pub use viewport::Viewport;
