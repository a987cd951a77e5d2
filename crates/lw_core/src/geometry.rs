//! Axis-aligned rectangles and line colliders.
//!
//! Coordinates are screen-space: origin at the top-left, y grows downward.
//! Actors are anchored at their bottom-center ("midbottom"), so a body standing
//! on a floor line has `position.y == line.top()`.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle whose bottom edge is centered on `anchor`.
    pub fn from_midbottom(anchor: Vec2, size: Vec2) -> Self {
        Self {
            x: anchor.x - size.x / 2.0,
            y: anchor.y - size.y,
            width: size.x,
            height: size.y,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn midbottom(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.bottom())
    }

    /// Grow the rectangle by `margin` on both the left and the right side.
    pub fn expanded_x(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            width: self.width + margin * 2.0,
            ..*self
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn offset(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Standard AABB test. Touching edges do not count as overlap.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn from_velocity(vel_x: f32, current: Facing) -> Facing {
        if vel_x > 0.0 {
            Facing::Right
        } else if vel_x < 0.0 {
            Facing::Left
        } else {
            current
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// A degenerate rectangle standing in for ground, walls, platform edges and
/// pipe boundaries.
///
/// Horizontal lines only ever resolve motion on the y axis and vertical lines
/// only on the x axis; the resolver never mixes the two groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCollider {
    pub x: f32,
    pub y: f32,
    pub length: f32,
    pub orientation: Orientation,
    pub thickness: f32,
    /// Vertical line bounding a pipe; resolved with a widened tolerance band.
    pub pipe_edge: bool,
    pub color: Option<[u8; 3]>,
}

impl LineCollider {
    pub fn horizontal(x: f32, y: f32, length: f32) -> Self {
        Self {
            x,
            y,
            length,
            orientation: Orientation::Horizontal,
            thickness: 1.0,
            pipe_edge: false,
            color: None,
        }
    }

    pub fn vertical(x: f32, y: f32, length: f32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            ..Self::horizontal(x, y, length)
        }
    }

    pub fn with_color(mut self, color: Option<[u8; 3]>) -> Self {
        self.color = color;
        self
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness.max(1.0);
        self
    }

    pub fn as_pipe_edge(mut self) -> Self {
        self.pipe_edge = true;
        self
    }

    pub fn rect(&self) -> Rect {
        match self.orientation {
            Orientation::Horizontal => Rect::new(self.x, self.y, self.length, self.thickness),
            Orientation::Vertical => Rect::new(self.x, self.y, self.thickness, self.length),
        }
    }

    pub fn left(&self) -> f32 {
        self.rect().left()
    }

    pub fn right(&self) -> f32 {
        self.rect().right()
    }

    pub fn top(&self) -> f32 {
        self.rect().top()
    }

    pub fn bottom(&self) -> f32 {
        self.rect().bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlaps_detects_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &right));
        assert!(!overlaps(&a, &below));
    }

    #[test]
    fn from_midbottom_places_bottom_edge_on_anchor() {
        let r = Rect::from_midbottom(Vec2::new(100.0, 500.0), Vec2::new(30.0, 40.0));
        assert_eq!(r.left(), 85.0);
        assert_eq!(r.right(), 115.0);
        assert_eq!(r.top(), 460.0);
        assert_eq!(r.bottom(), 500.0);
        assert_eq!(r.midbottom(), Vec2::new(100.0, 500.0));
    }

    #[test]
    fn union_covers_both_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 30.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u.top(), 0.0);
        assert_eq!(u.bottom(), 40.0);
    }

    #[test]
    fn line_rect_is_one_pixel_thick() {
        let ground = LineCollider::horizontal(0.0, 500.0, 1600.0);
        assert_eq!(ground.rect(), Rect::new(0.0, 500.0, 1600.0, 1.0));

        let wall = LineCollider::vertical(40.0, 400.0, 100.0);
        assert_eq!(wall.rect(), Rect::new(40.0, 400.0, 1.0, 100.0));
        assert!(!wall.pipe_edge);
        assert!(wall.as_pipe_edge().pipe_edge);
    }

    #[test]
    fn expanded_x_grows_both_sides() {
        let r = Rect::new(10.0, 0.0, 1.0, 5.0).expanded_x(3.0);
        assert_eq!(r.left(), 7.0);
        assert_eq!(r.right(), 14.0);
        assert_eq!(r.height, 5.0);
    }

    #[test]
    fn facing_follows_velocity_sign() {
        assert_eq!(Facing::from_velocity(1.0, Facing::Left), Facing::Right);
        assert_eq!(Facing::from_velocity(-1.0, Facing::Right), Facing::Left);
        assert_eq!(Facing::from_velocity(0.0, Facing::Left), Facing::Left);
    }
}
