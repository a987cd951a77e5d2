use glam::Vec2;
use lw_core::Rect;
use serde::Deserialize;

use crate::body::KinematicBody;

fn default_smoothing() -> f32 {
    0.1
}

fn default_max_lead() -> f32 {
    100.0
}

fn default_full_lead_speed() -> f32 {
    15.0
}

/// How the camera chases its horizontal target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CameraMode {
    /// Snap to the target every tick.
    #[default]
    Direct,
    /// Move `factor` of the remaining distance per tick.
    Smoothed {
        #[serde(default = "default_smoothing")]
        factor: f32,
    },
    /// Smoothed, with the target shifted ahead of the player's motion.
    /// The lead reaches `max_lead` once `|vx| >= full_lead_speed`.
    LookAhead {
        #[serde(default = "default_smoothing")]
        factor: f32,
        #[serde(default = "default_max_lead")]
        max_lead: f32,
        #[serde(default = "default_full_lead_speed")]
        full_lead_speed: f32,
    },
}

impl CameraMode {
    pub fn validate(&self) -> Result<(), String> {
        let factor = match *self {
            Self::Direct => return Ok(()),
            Self::Smoothed { factor } => factor,
            Self::LookAhead {
                factor,
                max_lead,
                full_lead_speed,
            } => {
                if max_lead < 0.0 {
                    return Err("Config validation failed: camera max_lead must be >= 0".to_string());
                }
                if full_lead_speed <= 0.0 {
                    return Err(
                        "Config validation failed: camera full_lead_speed must be > 0".to_string(),
                    );
                }
                factor
            }
        };
        if factor <= 0.0 || factor > 1.0 {
            return Err(format!(
                "Config validation failed: camera factor must be in (0, 1], got {factor}"
            ));
        }
        Ok(())
    }
}

/// Scroll offset into the level. World minus offset gives screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: Vec2::new(viewport_width, viewport_height),
        }
    }

    fn clamp_x(&self, x: f32, map_width: f32) -> f32 {
        x.clamp(0.0, (map_width - self.viewport.x).max(0.0))
    }

    fn centered_x(&self, target: &KinematicBody) -> f32 {
        target.position.x - self.viewport.x / 2.0
    }

    /// Jump straight to the target, ignoring smoothing. Used on level load.
    pub fn snap_to(&mut self, target: &KinematicBody, map_width: f32) {
        self.offset = Vec2::new(self.clamp_x(self.centered_x(target), map_width), 0.0);
    }

    pub fn follow(&mut self, target: &KinematicBody, map_width: f32, mode: CameraMode) {
        let centered = self.centered_x(target);
        let x = match mode {
            CameraMode::Direct => centered,
            CameraMode::Smoothed { factor } => self.offset.x + (centered - self.offset.x) * factor,
            CameraMode::LookAhead {
                factor,
                max_lead,
                full_lead_speed,
            } => {
                let vx = target.velocity.x;
                let lead = (vx.abs() / full_lead_speed).min(1.0) * max_lead * vx.signum();
                let goal = if vx == 0.0 { centered } else { centered + lead };
                self.offset.x + (goal - self.offset.x) * factor
            }
        };
        self.offset.x = self.clamp_x(x, map_width);
    }

    /// Follow on both axes; the vertical offset stays within `[0, viewport height]`.
    pub fn follow_both_axes(&mut self, target: &KinematicBody, map_width: f32) {
        self.offset.x = self.clamp_x(self.centered_x(target), map_width);
        self.offset.y = (target.position.y - self.viewport.y / 2.0).clamp(0.0, self.viewport.y);
    }

    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        point - self.offset
    }

    pub fn rect_to_screen(&self, rect: &Rect) -> Rect {
        rect.offset(-self.offset)
    }

    /// Any part of `rect` falls inside the viewport.
    pub fn is_visible(&self, rect: &Rect) -> bool {
        let screen = self.rect_to_screen(rect);
        screen.right() > 0.0
            && screen.left() < self.viewport.x
            && screen.bottom() > 0.0
            && screen.top() < self.viewport.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32, y: f32) -> KinematicBody {
        KinematicBody::new(Vec2::new(x, y), Vec2::new(40.0, 40.0))
    }

    #[test]
    fn direct_mode_centers_and_clamps() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.follow(&body_at(600.0, 464.0), 1600.0, CameraMode::Direct);
        assert_eq!(camera.offset.x, 200.0);

        camera.follow(&body_at(100.0, 464.0), 1600.0, CameraMode::Direct);
        assert_eq!(camera.offset.x, 0.0);

        camera.follow(&body_at(1550.0, 464.0), 1600.0, CameraMode::Direct);
        assert_eq!(camera.offset.x, 800.0);
    }

    #[test]
    fn map_narrower_than_viewport_pins_to_zero() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.follow(&body_at(500.0, 464.0), 600.0, CameraMode::Direct);
        assert_eq!(camera.offset.x, 0.0);
    }

    #[test]
    fn smoothed_mode_closes_a_fraction_of_the_gap() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.follow(
            &body_at(1000.0, 464.0),
            1600.0,
            CameraMode::Smoothed { factor: 0.5 },
        );
        assert_eq!(camera.offset.x, 300.0);
        camera.follow(
            &body_at(1000.0, 464.0),
            1600.0,
            CameraMode::Smoothed { factor: 0.5 },
        );
        assert_eq!(camera.offset.x, 450.0);
    }

    #[test]
    fn look_ahead_leads_in_direction_of_motion() {
        let mode = CameraMode::LookAhead {
            factor: 1.0,
            max_lead: 100.0,
            full_lead_speed: 15.0,
        };
        let mut camera = Camera::new(800.0, 600.0);
        let mut body = body_at(1000.0, 464.0);

        body.velocity.x = 7.5;
        camera.follow(&body, 1600.0, mode);
        assert_eq!(camera.offset.x, 650.0);

        body.velocity.x = -30.0;
        camera.follow(&body, 1600.0, mode);
        assert_eq!(camera.offset.x, 500.0);

        body.velocity.x = 0.0;
        camera.follow(&body, 1600.0, mode);
        assert_eq!(camera.offset.x, 600.0);
    }

    #[test]
    fn both_axes_clamps_vertical_offset() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.follow_both_axes(&body_at(600.0, 464.0), 1600.0);
        assert_eq!(camera.offset, Vec2::new(200.0, 164.0));

        camera.follow_both_axes(&body_at(600.0, 64.0), 1600.0);
        assert_eq!(camera.offset.y, 0.0);

        camera.follow_both_axes(&body_at(600.0, 2000.0), 1600.0);
        assert_eq!(camera.offset.y, 600.0);
    }

    #[test]
    fn snap_resets_vertical_offset() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.offset = Vec2::new(10.0, 300.0);
        camera.snap_to(&body_at(400.0, 434.0), 1600.0);
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn screen_projection_and_visibility() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.offset = Vec2::new(200.0, 0.0);
        assert_eq!(
            camera.world_to_screen(Vec2::new(600.0, 464.0)),
            Vec2::new(400.0, 464.0)
        );
        assert!(camera.is_visible(&Rect::new(180.0, 100.0, 40.0, 40.0)));
        assert!(!camera.is_visible(&Rect::new(100.0, 100.0, 40.0, 40.0)));
        assert!(!camera.is_visible(&Rect::new(1000.0, 100.0, 40.0, 40.0)));
    }

    #[test]
    fn mode_validation() {
        assert!(CameraMode::Direct.validate().is_ok());
        assert!(CameraMode::Smoothed { factor: 0.25 }.validate().is_ok());
        assert!(CameraMode::Smoothed { factor: 0.0 }.validate().is_err());
        assert!(CameraMode::LookAhead {
            factor: 0.1,
            max_lead: 100.0,
            full_lead_speed: 0.0,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn look_ahead_fields_default_when_omitted() {
        let mode: CameraMode =
            serde_json::from_str(r#"{ "mode": "look_ahead" }"#).expect("parse camera mode");
        assert_eq!(
            mode,
            CameraMode::LookAhead {
                factor: 0.1,
                max_lead: 100.0,
                full_lead_speed: 15.0,
            }
        );
    }
}
