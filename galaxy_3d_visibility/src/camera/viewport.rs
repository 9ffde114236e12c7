/// Viewport: screen rectangle a pass renders into.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport with the full [0, 1] depth range.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height, min_depth: 0.0, max_depth: 1.0 }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest rectangle covering both viewports.
    pub fn union(&self, other: &Viewport) -> Viewport {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Viewport {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
            min_depth: self.min_depth.min(other.min_depth),
            max_depth: self.max_depth.max(other.max_depth),
        }
    }

    /// Overlap of both viewports, `None` when it is empty.
    pub fn intersection(&self, other: &Viewport) -> Option<Viewport> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let result = Viewport {
            x,
            y,
            width: self.right().min(other.right()) - x,
            height: self.bottom().min(other.bottom()) - y,
            min_depth: self.min_depth.max(other.min_depth),
            max_depth: self.max_depth.min(other.max_depth),
        };
        if result.is_empty() { None } else { Some(result) }
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
