//! Axis-aligned bounding boxes

use glam::Vec2;

/// Box given by its top-left corner and size (screen coordinates, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, s: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::splat(s))
    }

    #[test]
    fn test_overlap() {
        let player = square(200.0, 450.0, 60.0);
        assert!(player.overlaps(&square(210.0, 420.0, 40.0)));
        assert!(square(210.0, 420.0, 40.0).overlaps(&player));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let player = square(200.0, 450.0, 60.0);
        assert!(!player.overlaps(&square(160.0, 450.0, 40.0)));
        assert!(!player.overlaps(&square(220.0, 410.0, 40.0)));
    }

    #[test]
    fn test_disjoint() {
        let player = square(200.0, 450.0, 60.0);
        assert!(!player.overlaps(&square(0.0, 0.0, 40.0)));
    }
}
