//! Gameplay tuning loaded from `assets/config/game.json`.
//!
//! Every section and every field is optional in the file; anything omitted
//! falls back to the stock tuning the built-in levels were designed around.
//! Physics units are pixels per tick and pixels per tick squared.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::camera::CameraMode;
use crate::collision::ResolutionOrder;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub collision: CollisionTuning,
    pub camera: CameraMode,
    pub session: SessionTuning,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub map_width: f32,
    /// Screen y of the main ground; kill planes are measured from here.
    pub ground_height: f32,
    pub fps: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            map_width: 1600.0,
            ground_height: 534.0,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub accel: f32,
    pub turnaround: f32,
    pub friction: f32,
    pub max_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub terminal_velocity: f32,
    pub landing_tolerance: f32,
    pub max_health: f32,
    pub regen_amount: f32,
    pub regen_interval_ms: u64,
    pub death_velocity_y: f32,
    pub death_spin_speed: f32,
    pub death_duration_ms: u64,
    /// Multiplier on `jump_speed` for the bounce after a stomp.
    pub stomp_bounce: f32,
    pub kill_margin: f32,
    pub map_edge_margin: f32,
    pub walk_base_interval_ms: f32,
    pub walk_speed_factor_ms: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            accel: 0.7,
            turnaround: 1.2,
            friction: 0.3,
            max_speed: 4.5,
            gravity: 1.0,
            jump_speed: 20.0,
            terminal_velocity: 20.0,
            landing_tolerance: 10.0,
            max_health: 100.0,
            regen_amount: 4.0,
            regen_interval_ms: 16,
            death_velocity_y: -15.0,
            death_spin_speed: 10.0,
            death_duration_ms: 1000,
            stomp_bounce: 0.7,
            kill_margin: 50.0,
            map_edge_margin: 20.0,
            walk_base_interval_ms: 130.0,
            walk_speed_factor_ms: 12.0,
        }
    }
}

/// Tuning shared by every enemy kind. Per-kind speed, size and jump
/// behaviour live on `EnemyKind`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub landing_tolerance: f32,
    pub flip_chance: f64,
    pub jump_cooldown_ms: f32,
    pub kill_margin: f32,
    pub contact_damage: f32,
    pub stomp_tolerance: f32,
    pub walk_base_interval_ms: f32,
    pub walk_speed_factor_ms: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            terminal_velocity: 20.0,
            landing_tolerance: 5.0,
            flip_chance: 0.3,
            jump_cooldown_ms: 500.0,
            kill_margin: 200.0,
            contact_damage: 10.0,
            stomp_tolerance: 20.0,
            walk_base_interval_ms: 130.0,
            walk_speed_factor_ms: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    pub order: ResolutionOrder,
    pub pipe_edge_margin: f32,
    pub junction_tolerance: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            order: ResolutionOrder::VerticalFirst,
            pipe_edge_margin: 3.0,
            junction_tolerance: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub start_level: usize,
    pub rng_seed: u64,
    pub success_rise_ms: u64,
    pub success_banner_ms: u64,
    pub success_rise_height: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            start_level: 1,
            rng_seed: 0x5EED,
            success_rise_ms: 3000,
            success_banner_ms: 1000,
            success_rise_height: 400.0,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let world = &config.world;
    if world.fps == 0 {
        return Err("Config validation failed: world.fps must be positive".to_string());
    }
    if world.viewport_width <= 0.0 || world.viewport_height <= 0.0 {
        return Err("Config validation failed: viewport must have positive size".to_string());
    }
    if world.map_width < world.viewport_width {
        log::warn!(
            "Map width {} is narrower than the viewport {}; the camera will not scroll",
            world.map_width,
            world.viewport_width
        );
    }

    let player = &config.player;
    if player.width <= 0.0 || player.height <= 0.0 {
        return Err("Config validation failed: player size must be positive".to_string());
    }
    if player.max_speed <= 0.0 {
        return Err("Config validation failed: player.max_speed must be positive".to_string());
    }
    if player.friction < 0.0 || player.accel < 0.0 || player.turnaround < 0.0 {
        return Err(
            "Config validation failed: player accel, turnaround and friction must not be negative"
                .to_string(),
        );
    }
    if player.terminal_velocity < player.gravity.max(0.0) {
        return Err(format!(
            "Config validation failed: player.terminal_velocity {} is below gravity {}",
            player.terminal_velocity, player.gravity
        ));
    }
    if player.max_health <= 0.0 {
        return Err("Config validation failed: player.max_health must be positive".to_string());
    }
    if player.death_duration_ms == 0 {
        return Err("Config validation failed: player.death_duration_ms must be positive".to_string());
    }

    let enemy = &config.enemy;
    if !(0.0..=1.0).contains(&enemy.flip_chance) {
        return Err(format!(
            "Config validation failed: enemy.flip_chance {} is outside [0, 1]",
            enemy.flip_chance
        ));
    }
    if enemy.terminal_velocity < enemy.gravity.max(0.0) {
        return Err(format!(
            "Config validation failed: enemy.terminal_velocity {} is below gravity {}",
            enemy.terminal_velocity, enemy.gravity
        ));
    }

    if config.collision.pipe_edge_margin < 0.0 || config.collision.junction_tolerance < 0.0 {
        return Err("Config validation failed: collision margins must not be negative".to_string());
    }

    config.camera.validate()?;

    if config.session.start_level == 0 {
        return Err("Config validation failed: session.start_level is 1-based".to_string());
    }
    Ok(())
}
