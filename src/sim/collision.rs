//! Axis-aligned collision detection
//!
//! Actor and obstacles are plain rectangles; touching edges do not count as a
//! hit, only overlap with positive area does.

use glam::Vec2;

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// True iff both the x- and y-intervals intersect with positive measure
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

/// Index of the first box in `others` overlapping `subject`
pub fn first_overlap(subject: &Aabb, others: impl IntoIterator<Item = Aabb>) -> Option<usize> {
    others.into_iter().position(|other| subject.overlaps(&other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap_inside() {
        assert!(rect(0.0, 0.0, 10.0, 10.0).overlaps(&rect(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&rect(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&rect(0.0, 10.0, 10.0, 10.0)));
        assert!(!a.overlaps(&rect(10.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_separated_on_one_axis() {
        // x-intervals intersect, y-intervals do not
        assert!(!rect(0.0, 0.0, 10.0, 10.0).overlaps(&rect(5.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_first_overlap_index() {
        let actor = rect(100.0, 240.0, 40.0, 60.0);
        let boxes = [rect(500.0, 200.0, 50.0, 100.0), rect(120.0, 250.0, 50.0, 50.0)];
        assert_eq!(first_overlap(&actor, boxes), Some(1));
        assert_eq!(first_overlap(&actor, boxes[..1].iter().copied()), None);
    }

    fn interval_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> bool {
        a0.max(b0) < a1.min(b1)
    }

    proptest! {
        #[test]
        fn overlap_matches_interval_definition(
            ax in -100i32..100, ay in -100i32..100, aw in 1i32..60, ah in 1i32..60,
            bx in -100i32..100, by in -100i32..100, bw in 1i32..60, bh in 1i32..60,
        ) {
            let a = rect(ax as f32, ay as f32, aw as f32, ah as f32);
            let b = rect(bx as f32, by as f32, bw as f32, bh as f32);

            let expected = interval_overlap(a.min.x, a.max().x, b.min.x, b.max().x)
                && interval_overlap(a.min.y, a.max().y, b.min.y, b.max().y);

            prop_assert_eq!(a.overlaps(&b), expected);
            // Symmetric
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
