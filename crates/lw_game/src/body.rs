use glam::Vec2;
use lw_core::{Facing, Rect};

/// Kinematic state shared by the player and every enemy.
///
/// `position` is the bottom-center anchor. Integration is semi-implicit
/// Euler with one tick as the unit of time: velocity is updated first, then
/// `position += velocity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub size: Vec2,
    /// Authoritative only between resolution and the next integration.
    pub grounded: bool,
    pub alive: bool,
    pub facing: Facing,
}

impl KinematicBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            size,
            grounded: false,
            alive: true,
            facing: Facing::Right,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_midbottom(self.position, self.size)
    }

    /// Where the body was before this tick's `position += velocity`.
    pub fn previous_rect(&self) -> Rect {
        Rect::from_midbottom(self.position - self.velocity, self.size)
    }

    pub fn half_width(&self) -> f32 {
        self.size.x / 2.0
    }

    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    pub fn update_facing(&mut self) {
        self.facing = Facing::from_velocity(self.velocity.x, self.facing);
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    /// Stop all motion and forces.
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_anchored_at_midbottom() {
        let body = KinematicBody::new(Vec2::new(100.0, 500.0), Vec2::new(40.0, 40.0));
        let rect = body.rect();
        assert_eq!(rect.bottom(), 500.0);
        assert_eq!(rect.top(), 460.0);
        assert_eq!(rect.center_x(), 100.0);
    }

    #[test]
    fn previous_rect_undoes_one_tick_of_velocity() {
        let mut body = KinematicBody::new(Vec2::new(100.0, 500.0), Vec2::new(40.0, 40.0));
        body.velocity = Vec2::new(3.0, 7.0);
        body.integrate();
        assert_eq!(body.position, Vec2::new(103.0, 507.0));
        assert_eq!(body.previous_rect().bottom(), 500.0);
        assert_eq!(body.previous_rect().center_x(), 100.0);
    }

    #[test]
    fn facing_holds_when_stopped() {
        let mut body = KinematicBody::new(Vec2::ZERO, Vec2::ONE);
        body.velocity.x = -1.0;
        body.update_facing();
        assert_eq!(body.facing, Facing::Left);
        body.velocity.x = 0.0;
        body.update_facing();
        assert_eq!(body.facing, Facing::Left);
    }

    #[test]
    fn non_finite_state_is_detected() {
        let mut body = KinematicBody::new(Vec2::ZERO, Vec2::ONE);
        assert!(body.is_finite());
        body.velocity.y = f32::NAN;
        assert!(!body.is_finite());
    }
}
