//! Level orchestration: owns every actor of the running level and drives
//! them once per tick.
//!
//! The session moves through three phases. `Normal` runs physics, combat and
//! the camera. Touching the goal switches to `Success`, a scripted rise with
//! the physics suspended, which ends by loading the next level. Dying
//! switches to `Dead`, which plays the death animation until
//! [`Session::game_over`] reports true. Restart and level-select keys are
//! honoured in every phase.

use glam::Vec2;
use lw_core::{overlaps, Facing, InputSnapshot, Key, Rect, SimulationContext};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::camera::Camera;
use crate::enemy::{ContactOutcome, Enemy, EnemyKind};
use crate::level::{Level, LevelDescriptor};
use crate::player::Player;
use crate::tuning::{GameConfig, WorldTuning};

const PLAYER_SPRITE: &str = "player";

#[derive(Debug, Clone, Copy, PartialEq)]
struct SuccessAnimation {
    started_ms: u64,
    start_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Normal,
    Success(SuccessAnimation),
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Normal,
    Success,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy(EnemyKind),
}

/// What the presentation layer needs to draw one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub kind: ActorKind,
    pub rect: Rect,
    pub sprite_index: usize,
    pub facing: Facing,
    pub rotation_deg: f32,
    pub alpha: u8,
    pub sprite: Option<String>,
}

impl BodySnapshot {
    /// No sprite sheet: draw a solid rectangle instead.
    pub fn is_placeholder(&self) -> bool {
        self.sprite.is_none()
    }
}

/// Read-only view of one tick, rebuilt on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Player first, then enemies in spawn order.
    pub bodies: Vec<BodySnapshot>,
    pub camera_offset: Vec2,
    pub dead: bool,
    pub grounded: bool,
    pub health: f32,
    pub success: bool,
    pub phase: PhaseKind,
    pub banner_visible: bool,
    pub level_number: usize,
}

pub struct Session {
    config: GameConfig,
    catalog: Vec<LevelDescriptor>,
    level_number: usize,
    level: Level,
    world: WorldTuning,
    player: Player,
    enemies: Vec<Enemy>,
    camera: Camera,
    phase: Phase,
    rng: Pcg32,
    now_ms: u64,
}

impl Session {
    /// `catalog` holds the playable levels; level `n` is `catalog[n - 1]`.
    pub fn new(config: GameConfig, catalog: Vec<LevelDescriptor>) -> Result<Self, String> {
        if catalog.is_empty() {
            return Err("Session needs at least one level".to_string());
        }
        let number = config.session.start_level;
        let level = build_level(&catalog, number, config.world.map_width)?;
        let world = level_world(&level, &config.world);
        let player = Player::new(level.player_spawn, config.player, &config.collision);
        let enemies = spawn_enemies(&level, &config, 0);
        let mut camera = Camera::new(config.world.viewport_width, config.world.viewport_height);
        camera.snap_to(&player.body, level.map_width);
        let rng = level_rng(config.session.rng_seed, number);

        log::info!(
            "Loaded level {number} '{}': {} colliders, {} enemies",
            level.name,
            level.colliders.len(),
            enemies.len()
        );

        Ok(Self {
            config,
            catalog,
            level_number: number,
            level,
            world,
            player,
            enemies,
            camera,
            phase: Phase::Normal,
            rng,
            now_ms: 0,
        })
    }

    /// Rebuild level `number` from its descriptor, discarding all actor state.
    /// On error the current level is left running.
    pub fn reset(&mut self, number: usize) -> Result<(), String> {
        let level = build_level(&self.catalog, number, self.config.world.map_width)?;
        self.world = level_world(&level, &self.config.world);
        self.player = Player::new(level.player_spawn, self.config.player, &self.config.collision);
        self.enemies = spawn_enemies(&level, &self.config, self.now_ms);
        self.camera.snap_to(&self.player.body, level.map_width);
        self.rng = level_rng(self.config.session.rng_seed, number);
        self.phase = Phase::Normal;
        self.level_number = number;

        log::info!(
            "Loaded level {number} '{}': {} colliders, {} enemies",
            level.name,
            level.colliders.len(),
            self.enemies.len()
        );
        self.level = level;
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), String> {
        self.reset(self.level_number)
    }

    pub fn switch_level(&mut self, number: usize) -> Result<(), String> {
        if number == 0 || number > self.catalog.len() {
            return Err(format!(
                "Cannot switch to level {number}; {} levels loaded",
                self.catalog.len()
            ));
        }
        log::info!("Switching from level {} to {number}", self.level_number);
        self.reset(number)
    }

    pub fn update(&mut self, ctx: &SimulationContext) {
        self.now_ms = ctx.now_ms();
        if self.handle_session_keys(&ctx.input) {
            return;
        }
        match self.phase {
            Phase::Normal => self.update_normal(ctx),
            Phase::Success(animation) => self.update_success(animation),
            Phase::Dead => self.update_dead(ctx),
        }
    }

    /// Restart and level select. Returns true when the level was reloaded.
    fn handle_session_keys(&mut self, input: &InputSnapshot) -> bool {
        if let Some(number) = input.level_selected() {
            match self.switch_level(number) {
                Ok(()) => return true,
                Err(e) => log::warn!("{e}"),
            }
        }
        if input.is_just_pressed(Key::Restart) {
            log::info!("Restarting level {}", self.level_number);
            match self.restart() {
                Ok(()) => return true,
                Err(e) => log::error!("Restart failed: {e}"),
            }
        }
        false
    }

    fn update_normal(&mut self, ctx: &SimulationContext) {
        let now_ms = ctx.now_ms();
        if let Err(e) = self.player.update(ctx, &self.level.colliders) {
            log::warn!("{e}; treating as death");
            self.player.die(now_ms);
        }
        self.update_enemies(ctx);

        if let Some(goal_x) = self.resolve_contacts(now_ms) {
            self.begin_success(goal_x, now_ms);
            return;
        }

        if !self.player.is_dead() && self.player.is_out_of_bounds(&self.world) {
            self.player.die(now_ms);
        }
        if self.player.is_dead() {
            log::info!("Level {} failed", self.level_number);
            self.phase = Phase::Dead;
        }
        self.camera
            .follow(&self.player.body, self.level.map_width, self.config.camera);
    }

    fn update_enemies(&mut self, ctx: &SimulationContext) {
        let colliders = &self.level.colliders;
        let world = &self.world;
        let rng = &mut self.rng;
        self.enemies.retain_mut(|enemy| {
            if let Err(e) = enemy.update(ctx, colliders, &mut *rng) {
                log::warn!("Evicting {}: {e}", enemy.kind.label());
                return false;
            }
            if enemy.is_out_of_bounds(world) {
                log::debug!(
                    "{} fell out of the level at ({:.1}, {:.1})",
                    enemy.kind.label(),
                    enemy.body.position.x,
                    enemy.body.position.y
                );
                return false;
            }
            true
        });
    }

    /// Stomps and contact damage. Returns the x of the goal the living
    /// player touched, if any.
    fn resolve_contacts(&mut self, now_ms: u64) -> Option<f32> {
        if self.player.is_dead() {
            return None;
        }
        let player_rect = self.player.body.rect();
        let mut reached_goal = None;
        let mut stomped = false;

        for enemy in &mut self.enemies {
            if enemy.kind.is_goal() {
                if reached_goal.is_none() && overlaps(&player_rect, &enemy.body.rect()) {
                    reached_goal = Some(enemy.body.position.x);
                }
                continue;
            }
            match enemy.classify_contact(&self.player.body) {
                ContactOutcome::Stomp => {
                    log::debug!(
                        "Stomped {} at ({:.1}, {:.1})",
                        enemy.kind.label(),
                        enemy.body.position.x,
                        enemy.body.position.y
                    );
                    enemy.body.alive = false;
                    stomped = true;
                }
                ContactOutcome::Damage => {
                    let damage = self.config.enemy.contact_damage;
                    log::debug!("{} hit the player for {damage}", enemy.kind.label());
                    self.player.change_health(-damage, now_ms);
                }
                ContactOutcome::None => {}
            }
        }

        self.enemies.retain(|enemy| enemy.body.alive);
        if stomped && !self.player.is_dead() {
            self.player.bounce();
        }
        reached_goal.filter(|_| !self.player.is_dead())
    }

    fn begin_success(&mut self, goal_x: f32, now_ms: u64) {
        log::info!(
            "Level {} complete at {:.1}s",
            self.level_number,
            now_ms as f64 / 1000.0
        );
        self.player.freeze();
        self.player.body.facing = if goal_x < self.player.body.position.x {
            Facing::Left
        } else {
            Facing::Right
        };
        self.phase = Phase::Success(SuccessAnimation {
            started_ms: now_ms,
            start_y: self.player.body.position.y,
        });
    }

    fn update_success(&mut self, animation: SuccessAnimation) {
        let session = self.config.session;
        let elapsed = self.now_ms.saturating_sub(animation.started_ms);

        if elapsed < session.success_rise_ms {
            let progress = elapsed as f32 / session.success_rise_ms as f32;
            self.player.body.position.y =
                animation.start_y - session.success_rise_height * progress * progress;
            self.player.rotation_deg = progress * 360.0;
            self.camera
                .follow_both_axes(&self.player.body, self.level.map_width);
        } else if elapsed < session.success_rise_ms + session.success_banner_ms {
            self.player.body.position.y = animation.start_y - session.success_rise_height;
        } else {
            let next = self.level_number % self.catalog.len() + 1;
            if let Err(e) = self.reset(next) {
                log::error!("Failed to advance to level {next}: {e}");
            }
        }
    }

    fn update_dead(&mut self, ctx: &SimulationContext) {
        if let Err(e) = self.player.update(ctx, &self.level.colliders) {
            log::warn!("{e}");
        }
        self.update_enemies(ctx);
    }

    /// The death animation has finished playing.
    pub fn game_over(&self) -> bool {
        self.phase == Phase::Dead && self.player.death_finished(self.now_ms)
    }

    pub fn is_dead(&self) -> bool {
        self.player.is_dead()
    }

    pub fn is_grounded(&self) -> bool {
        self.player.is_grounded()
    }

    pub fn health(&self) -> f32 {
        self.player.health
    }

    pub fn is_success(&self) -> bool {
        matches!(self.phase, Phase::Success(_))
    }

    pub fn phase(&self) -> PhaseKind {
        match self.phase {
            Phase::Normal => PhaseKind::Normal,
            Phase::Success(_) => PhaseKind::Success,
            Phase::Dead => PhaseKind::Dead,
        }
    }

    pub fn banner_visible(&self) -> bool {
        let Phase::Success(animation) = self.phase else {
            return false;
        };
        let rise = self.config.session.success_rise_ms;
        let elapsed = self.now_ms.saturating_sub(animation.started_ms);
        elapsed >= rise && elapsed < rise + self.config.session.success_banner_ms
    }

    pub fn level_number(&self) -> usize {
        self.level_number
    }

    pub fn level_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let mut bodies = Vec::with_capacity(self.enemies.len() + 1);
        bodies.push(BodySnapshot {
            kind: ActorKind::Player,
            rect: self.player.body.rect(),
            sprite_index: self.player.sprite_index,
            facing: self.player.body.facing,
            rotation_deg: self.player.rotation_deg,
            alpha: self.player.alpha,
            sprite: Some(PLAYER_SPRITE.to_string()),
        });
        bodies.extend(self.enemies.iter().map(|enemy| BodySnapshot {
            kind: ActorKind::Enemy(enemy.kind),
            rect: enemy.body.rect(),
            sprite_index: enemy.sprite_index,
            facing: enemy.body.facing,
            rotation_deg: 0.0,
            alpha: 255,
            sprite: enemy.sprite.clone(),
        }));

        FrameSnapshot {
            bodies,
            camera_offset: self.camera.offset,
            dead: self.is_dead(),
            grounded: self.is_grounded(),
            health: self.health(),
            success: self.is_success(),
            phase: self.phase(),
            banner_visible: self.banner_visible(),
            level_number: self.level_number,
        }
    }
}

fn build_level(
    catalog: &[LevelDescriptor],
    number: usize,
    default_map_width: f32,
) -> Result<Level, String> {
    let descriptor = number
        .checked_sub(1)
        .and_then(|index| catalog.get(index))
        .ok_or_else(|| {
            format!(
                "Level {number} does not exist; levels are numbered 1 to {}",
                catalog.len()
            )
        })?;
    Level::build(descriptor, default_map_width)
}

/// World bounds of one level: its own width and kill-plane ground.
fn level_world(level: &Level, base: &WorldTuning) -> WorldTuning {
    WorldTuning {
        map_width: level.map_width,
        ground_height: level.ground_height,
        ..*base
    }
}

fn spawn_enemies(level: &Level, config: &GameConfig, now_ms: u64) -> Vec<Enemy> {
    level
        .enemies
        .iter()
        .map(|spawn| {
            Enemy::new(
                spawn.kind,
                spawn.position,
                spawn.scale,
                config.enemy,
                &config.collision,
            )
            .with_sprite(spawn.sprite.clone())
            .spawned_at(now_ms)
        })
        .collect()
}

/// Each level gets its own stream so a restart replays identically.
fn level_rng(seed: u64, number: usize) -> Pcg32 {
    Pcg32::seed_from_u64(seed ^ number as u64)
}
