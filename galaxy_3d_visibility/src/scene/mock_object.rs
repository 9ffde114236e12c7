/// Mock scene object for tests (no geometry beyond its box).
///
/// Records how many render images it submitted through a shared counter, so a
/// test can keep the counter after handing the object to a world.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use crate::traversal::RenderContext;
use super::object::SceneObject;

#[derive(Debug)]
pub struct MockObject {
    pub name: String,
    translucent: bool,
    game_object: bool,
    submissions: Arc<AtomicU32>,
}

impl MockObject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            translucent: false,
            game_object: true,
            submissions: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Submit as a translucent image (sorted back to front).
    pub fn translucent(mut self) -> Self {
        self.translucent = true;
        self
    }

    /// Report no game object on ray hits.
    pub fn without_game_object(mut self) -> Self {
        self.game_object = false;
        self
    }

    pub fn submission_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.submissions)
    }

    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::Relaxed)
    }
}

impl SceneObject for MockObject {
    fn prepare_render_image(&mut self, ctx: &mut RenderContext<'_>) -> bool {
        if !ctx.is_object_rendered() {
            return false;
        }
        ctx.submit(self.translucent);
        self.submissions.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn has_game_object(&self) -> bool {
        self.game_object
    }
}
