use glam::Vec2;
use lw_core::animation::WalkCycle;
use lw_core::{InputSnapshot, Key, SimulationContext};

use crate::body::KinematicBody;
use crate::collision::{resolve, ColliderSet, Contacts, ResolveParams};
use crate::tuning::{CollisionTuning, PlayerTuning, WorldTuning};

#[derive(Debug, Clone, Copy, PartialEq)]
struct DeathAnimation {
    started_ms: u64,
}

/// The input-driven character.
///
/// Per tick: reset acceleration to gravity, regenerate health, pick the
/// horizontal acceleration from input (turnaround when reversing, friction
/// when idle), clamp to `max_speed`, jump if grounded, apply gravity up to
/// terminal velocity, integrate, then resolve against the level.
#[derive(Debug, Clone)]
pub struct Player {
    pub body: KinematicBody,
    pub contacts: Contacts,
    pub health: f32,
    pub sprite_index: usize,
    pub rotation_deg: f32,
    pub alpha: u8,
    tuning: PlayerTuning,
    params: ResolveParams,
    walk: WalkCycle,
    last_regen_ms: u64,
    death: Option<DeathAnimation>,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: PlayerTuning, collision: &CollisionTuning) -> Self {
        Self {
            body: KinematicBody::new(spawn, Vec2::new(tuning.width, tuning.height)),
            contacts: Contacts::default(),
            health: tuning.max_health,
            sprite_index: 0,
            rotation_deg: 0.0,
            alpha: 255,
            tuning,
            params: ResolveParams::new(collision, tuning.landing_tolerance),
            walk: WalkCycle::new(3, tuning.walk_base_interval_ms, tuning.walk_speed_factor_ms)
                .with_neutral_jump_frame(),
            last_regen_ms: 0,
            death: None,
        }
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn update(&mut self, ctx: &SimulationContext, colliders: &ColliderSet) -> Result<(), String> {
        let now_ms = ctx.now_ms();
        if self.death.is_some() {
            self.advance_death(now_ms);
            return self.check_finite();
        }

        self.step_motion(&ctx.input, now_ms);
        if self.death.is_some() {
            return self.check_finite();
        }

        self.contacts = resolve(&mut self.body, colliders, &self.params);
        self.body.update_facing();
        self.sprite_index = self.walk.update(
            self.body.velocity.x,
            self.body.facing,
            self.body.grounded,
            now_ms,
        );
        self.check_finite()
    }

    /// Everything up to and including integration; no collision.
    pub fn step_motion(&mut self, input: &InputSnapshot, now_ms: u64) {
        let t = self.tuning;
        self.body.acceleration = Vec2::new(0.0, t.gravity);

        self.regenerate(now_ms);
        if self.health <= 0.0 {
            self.die(now_ms);
            return;
        }

        let vel_x = self.body.velocity.x;
        match input.move_x() {
            1 => self.body.acceleration.x = if vel_x >= 0.0 { t.accel } else { t.turnaround },
            -1 => self.body.acceleration.x = if vel_x <= 0.0 { -t.accel } else { -t.turnaround },
            _ => {
                if vel_x != 0.0 {
                    self.body.acceleration.x = -vel_x.signum() * t.friction;
                    // friction stops the body; it never pushes it backwards
                    if vel_x.abs() <= t.friction {
                        self.body.velocity.x = 0.0;
                        self.body.acceleration.x = 0.0;
                    }
                }
            }
        }
        self.body.velocity.x =
            (self.body.velocity.x + self.body.acceleration.x).clamp(-t.max_speed, t.max_speed);

        if input.is_held(Key::Jump) && self.body.grounded {
            self.body.velocity.y = -t.jump_speed;
        }
        self.body.velocity.y = (self.body.velocity.y + t.gravity).min(t.terminal_velocity);

        self.body.integrate();
    }

    fn regenerate(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_regen_ms) >= self.tuning.regen_interval_ms {
            self.health = (self.health + self.tuning.regen_amount).min(self.tuning.max_health);
            self.last_regen_ms = now_ms;
        }
    }

    /// Apply a health delta (negative for damage). Reaching zero kills.
    pub fn change_health(&mut self, amount: f32, now_ms: u64) {
        self.health = (self.health + amount).clamp(0.0, self.tuning.max_health);
        if self.health <= 0.0 {
            self.die(now_ms);
        }
    }

    pub fn health_fraction(&self) -> f32 {
        self.health / self.tuning.max_health
    }

    /// Enter the death animation. Only the first call has any effect.
    pub fn die(&mut self, now_ms: u64) {
        if self.death.is_some() {
            return;
        }
        log::info!(
            "Player died at ({:.1}, {:.1}) with health {}",
            self.body.position.x,
            self.body.position.y,
            self.health
        );
        self.death = Some(DeathAnimation { started_ms: now_ms });
        self.body.velocity = Vec2::new(0.0, self.tuning.death_velocity_y);
        self.body.acceleration = Vec2::ZERO;
        self.body.grounded = false;
        self.body.alive = false;
        self.contacts = Contacts::default();
    }

    fn advance_death(&mut self, now_ms: u64) {
        let Some(death) = self.death else {
            return;
        };
        let elapsed = now_ms.saturating_sub(death.started_ms);
        let duration = self.tuning.death_duration_ms;
        let half = duration as f32 / 2.0;

        self.body.velocity.y += self.tuning.gravity * 0.5;
        self.body.integrate();

        if (elapsed as f32) < half {
            self.rotation_deg = (elapsed as f32 * self.tuning.death_spin_speed) % 360.0;
        } else {
            let fade = (elapsed as f32 - half) / half;
            self.alpha = (255.0 - 255.0 * fade).clamp(0.0, 255.0) as u8;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.death.is_some()
    }

    /// Death animation has played out.
    pub fn death_finished(&self, now_ms: u64) -> bool {
        self.death
            .is_some_and(|d| now_ms.saturating_sub(d.started_ms) >= self.tuning.death_duration_ms)
    }

    pub fn is_grounded(&self) -> bool {
        self.body.grounded
    }

    /// Fell below the kill plane or ran off the right end of the map.
    pub fn is_out_of_bounds(&self, world: &WorldTuning) -> bool {
        self.body.position.y > world.ground_height + self.tuning.kill_margin
            || self.body.position.x > world.map_width + self.tuning.map_edge_margin
    }

    /// Upward kick after stomping an enemy.
    pub fn bounce(&mut self) {
        self.body.velocity.y = -self.tuning.jump_speed * self.tuning.stomp_bounce;
        self.body.grounded = false;
    }

    /// Hold still for a scripted sequence.
    pub fn freeze(&mut self) {
        self.body.halt();
    }

    fn check_finite(&self) -> Result<(), String> {
        if self.body.is_finite() {
            Ok(())
        } else {
            Err(format!(
                "Player state became non-finite: position {:?}, velocity {:?}",
                self.body.position, self.body.velocity
            ))
        }
    }
}
