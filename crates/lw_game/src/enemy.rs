//! Autonomous enemies and the goal marker.
//!
//! Every enemy walks at a constant speed in its current direction, rerolls
//! its direction on a fixed interval, optionally hops at random while
//! grounded, and turns around when it walks into a wall. They resolve against
//! level geometry with the same policy as the player, using a tighter landing
//! tolerance. Randomness comes from the caller's RNG so a seeded session
//! replays identically.

use glam::Vec2;
use lw_core::animation::WalkCycle;
use lw_core::{overlaps, Rect, SimulationContext};
use rand::Rng;

use crate::body::KinematicBody;
use crate::collision::{resolve, ColliderSet, Contacts, ResolveParams};
use crate::tuning::{CollisionTuning, EnemyTuning, WorldTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Walker,
    Jumper,
    Coin,
    /// End-of-level marker. Never stomped, never damages; touching it wins.
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpProfile {
    /// Chance per grounded tick once the cooldown has elapsed.
    pub probability: f64,
    pub speed: f32,
    pub initial_cooldown_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub move_speed: f32,
    pub flip_interval_ms: u64,
    /// Unscaled sprite size; level descriptors scale it by percentages.
    pub base_size: Vec2,
    pub walk_frames: usize,
    pub jump: Option<JumpProfile>,
}

impl EnemyKind {
    /// Descriptor tag as used in level files.
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(Self::Walker),
            2 => Some(Self::Jumper),
            0 => Some(Self::Coin),
            -1 => Some(Self::Goal),
            _ => None,
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            Self::Walker => 1,
            Self::Jumper => 2,
            Self::Coin => 0,
            Self::Goal => -1,
        }
    }

    pub fn is_goal(self) -> bool {
        self == Self::Goal
    }

    pub fn profile(self) -> EnemyProfile {
        match self {
            Self::Walker => EnemyProfile {
                move_speed: 1.0,
                flip_interval_ms: 1500,
                base_size: Vec2::new(110.0, 110.0),
                walk_frames: 2,
                jump: None,
            },
            Self::Jumper => EnemyProfile {
                move_speed: 2.0,
                flip_interval_ms: 2500,
                base_size: Vec2::new(16.0, 32.0),
                walk_frames: 3,
                jump: Some(JumpProfile {
                    probability: 1.0 / 128.0,
                    speed: 16.0,
                    initial_cooldown_ms: 160.0,
                }),
            },
            Self::Coin => EnemyProfile {
                move_speed: 3.0,
                flip_interval_ms: 2000,
                base_size: Vec2::new(110.0, 110.0),
                walk_frames: 1,
                jump: None,
            },
            Self::Goal => EnemyProfile {
                move_speed: 0.0,
                flip_interval_ms: 2000,
                base_size: Vec2::new(1400.0, 1900.0),
                walk_frames: 1,
                jump: None,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Walker => "walker",
            Self::Jumper => "jumper",
            Self::Coin => "coin",
            Self::Goal => "goal",
        }
    }
}

/// Result of the player touching an enemy this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    None,
    /// Player came down on top: the enemy is removed and the player bounces.
    Stomp,
    /// Any other touch: the player takes damage and the enemy stays.
    Damage,
}

/// Stomp when the player is falling, its feet are above the enemy's middle
/// and within `stomp_tolerance` of the enemy's top.
pub fn classify_contact(
    player_rect: &Rect,
    player_vel_y: f32,
    enemy_rect: &Rect,
    stomp_tolerance: f32,
) -> ContactOutcome {
    if !overlaps(player_rect, enemy_rect) {
        return ContactOutcome::None;
    }
    if player_vel_y > 0.0
        && player_rect.bottom() < enemy_rect.center_y()
        && (player_rect.bottom() - enemy_rect.top()).abs() < stomp_tolerance
    {
        ContactOutcome::Stomp
    } else {
        ContactOutcome::Damage
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: KinematicBody,
    pub contacts: Contacts,
    /// +1 walking right, -1 walking left.
    pub direction: f32,
    pub sprite_index: usize,
    /// Optional sprite-sheet reference carried through from the descriptor.
    pub sprite: Option<String>,
    tuning: EnemyTuning,
    profile: EnemyProfile,
    params: ResolveParams,
    walk: WalkCycle,
    last_flip_ms: u64,
    jump_cooldown_ms: f32,
}

impl Enemy {
    /// `scale` is in percent of the kind's base sprite size.
    pub fn new(
        kind: EnemyKind,
        spawn: Vec2,
        scale: Vec2,
        tuning: EnemyTuning,
        collision: &CollisionTuning,
    ) -> Self {
        let profile = kind.profile();
        let size = (profile.base_size * scale / 100.0).floor().max(Vec2::ONE);
        Self {
            kind,
            body: KinematicBody::new(spawn, size),
            contacts: Contacts::default(),
            direction: 1.0,
            sprite_index: 0,
            sprite: None,
            tuning,
            profile,
            params: ResolveParams::new(collision, tuning.landing_tolerance),
            walk: WalkCycle::new(
                profile.walk_frames,
                tuning.walk_base_interval_ms,
                tuning.walk_speed_factor_ms,
            ),
            last_flip_ms: 0,
            jump_cooldown_ms: profile.jump.map_or(0.0, |j| j.initial_cooldown_ms),
        }
    }

    pub fn with_sprite(mut self, sprite: Option<String>) -> Self {
        self.sprite = sprite;
        self
    }

    /// Start the direction-flip timer at `now_ms` instead of session start.
    pub fn spawned_at(mut self, now_ms: u64) -> Self {
        self.last_flip_ms = now_ms;
        self
    }

    pub fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    pub fn update<R: Rng>(
        &mut self,
        ctx: &SimulationContext,
        colliders: &ColliderSet,
        rng: &mut R,
    ) -> Result<(), String> {
        let now_ms = ctx.now_ms();
        self.body.acceleration = Vec2::new(0.0, self.tuning.gravity);
        self.body.velocity.x = self.direction * self.profile.move_speed;

        if now_ms.saturating_sub(self.last_flip_ms) > self.profile.flip_interval_ms {
            if rng.random::<f64>() < self.tuning.flip_chance {
                self.direction = -self.direction;
            }
            self.last_flip_ms = now_ms;
        }

        if let Some(jump) = self.profile.jump {
            if self.body.grounded
                && self.jump_cooldown_ms <= 0.0
                && rng.random::<f64>() < jump.probability
            {
                self.body.velocity.y = -jump.speed;
                self.body.grounded = false;
                self.jump_cooldown_ms = self.tuning.jump_cooldown_ms;
            } else if self.jump_cooldown_ms > 0.0 {
                self.jump_cooldown_ms -= ctx.frame_ms();
            }
        }

        self.body.velocity.y =
            (self.body.velocity.y + self.tuning.gravity).min(self.tuning.terminal_velocity);
        self.body.integrate();

        self.contacts = resolve(&mut self.body, colliders, &self.params);
        if self.contacts.right {
            self.direction = -1.0;
        } else if self.contacts.left {
            self.direction = 1.0;
        }
        if self.contacts.blocked_horizontally() {
            self.body.velocity.x = self.direction * self.profile.move_speed;
        }

        self.body.update_facing();
        self.sprite_index = self.walk.update(
            self.body.velocity.x,
            self.body.facing,
            self.body.grounded,
            now_ms,
        );

        if self.body.is_finite() {
            Ok(())
        } else {
            Err(format!(
                "{} state became non-finite: position {:?}, velocity {:?}",
                self.kind.label(),
                self.body.position,
                self.body.velocity
            ))
        }
    }

    /// Fell far enough below the ground to be discarded.
    pub fn is_out_of_bounds(&self, world: &WorldTuning) -> bool {
        self.body.position.y > world.ground_height + self.tuning.kill_margin
    }

    pub fn classify_contact(&self, player: &KinematicBody) -> ContactOutcome {
        if self.kind.is_goal() {
            return ContactOutcome::None;
        }
        classify_contact(
            &player.rect(),
            player.velocity.y,
            &self.body.rect(),
            self.tuning.stomp_tolerance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_core::{FrameClock, InputSnapshot, LineCollider};
    use proptest::prelude::*;
    use rand::{RngCore, SeedableRng};
    use rand_pcg::Pcg32;

    /// Every roll comes out as 0.0, so any flip check that runs flips.
    struct AlwaysZero;

    impl RngCore for AlwaysZero {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn spawn(kind: EnemyKind, x: f32, y: f32) -> Enemy {
        Enemy::new(
            kind,
            Vec2::new(x, y),
            Vec2::new(100.0, 100.0),
            EnemyTuning::default(),
            &CollisionTuning::default(),
        )
    }

    fn run(
        enemy: &mut Enemy,
        colliders: &ColliderSet,
        ticks: usize,
        rng: &mut Pcg32,
        clock: &mut FrameClock,
    ) {
        for _ in 0..ticks {
            clock.tick();
            let ctx = SimulationContext::new(clock, InputSnapshot::default());
            enemy.update(&ctx, colliders, rng).expect("enemy update");
        }
    }

    #[test]
    fn tags_round_trip() {
        for kind in [EnemyKind::Walker, EnemyKind::Jumper, EnemyKind::Coin, EnemyKind::Goal] {
            assert_eq!(EnemyKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EnemyKind::from_tag(7), None);
    }

    #[test]
    fn size_is_scaled_by_percent() {
        let enemy = Enemy::new(
            EnemyKind::Goal,
            Vec2::new(1200.0, 534.0),
            Vec2::new(9.0, 7.0),
            EnemyTuning::default(),
            &CollisionTuning::default(),
        );
        assert_eq!(enemy.body.size, Vec2::new(126.0, 133.0));
    }

    #[test]
    fn walker_lands_and_walks_at_constant_speed() {
        let colliders = ColliderSet::from_lines([LineCollider::horizontal(0.0, 534.0, 1600.0)]);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut clock = FrameClock::default();
        let mut enemy = spawn(EnemyKind::Walker, 400.0, 400.0);

        run(&mut enemy, &colliders, 30, &mut rng, &mut clock);
        assert!(enemy.body.grounded);
        assert_eq!(enemy.body.position.y, 534.0);
        assert_eq!(enemy.body.velocity.x.abs(), 1.0);
    }

    #[test]
    fn enemy_turns_around_at_wall() {
        let colliders = ColliderSet::from_lines([
            LineCollider::horizontal(0.0, 534.0, 1600.0),
            LineCollider::vertical(300.0, 400.0, 134.0),
        ]);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut clock = FrameClock::default();
        let mut enemy = spawn(EnemyKind::Coin, 250.0, 534.0);
        enemy.body.grounded = true;

        let mut bounced = false;
        for _ in 0..40 {
            run(&mut enemy, &colliders, 1, &mut rng, &mut clock);
            if enemy.contacts.right {
                bounced = true;
                assert_eq!(enemy.direction, -1.0);
                assert_eq!(enemy.body.velocity.x, -3.0);
                assert_eq!(enemy.body.rect().right(), 300.0);
            }
            assert!(enemy.body.rect().right() <= 300.0);
        }
        assert!(bounced);
    }

    #[test]
    fn jumper_waits_for_cooldown_then_hops() {
        let colliders = ColliderSet::from_lines([
            LineCollider::horizontal(0.0, 534.0, 1600.0),
            LineCollider::vertical(0.0, 0.0, 600.0),
            LineCollider::vertical(1599.0, 0.0, 600.0),
        ]);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut clock = FrameClock::default();
        let mut enemy = spawn(EnemyKind::Jumper, 800.0, 534.0);
        enemy.body.grounded = true;

        let mut first_jump_ms = None;
        for _ in 0..3000 {
            run(&mut enemy, &colliders, 1, &mut rng, &mut clock);
            if enemy.body.velocity.y < 0.0 {
                first_jump_ms = Some(clock.now_ms());
                break;
            }
        }
        let at = first_jump_ms.expect("jumper should hop within 3000 ticks");
        assert!(at > 160, "jumped at {at}ms, before the initial cooldown");
        assert_eq!(enemy.body.velocity.y, -15.0);
    }

    #[test]
    fn late_spawn_waits_a_full_interval_before_flipping() {
        let colliders = ColliderSet::from_lines([LineCollider::horizontal(0.0, 534.0, 1600.0)]);
        let mut clock = FrameClock::default();
        for _ in 0..600 {
            clock.tick();
        }
        assert!(clock.now_ms() >= 9_990);

        let mut enemy = spawn(EnemyKind::Walker, 800.0, 534.0).spawned_at(clock.now_ms());
        let mut rng = AlwaysZero;
        let interval_ticks = enemy.profile().flip_interval_ms * 1000 / clock.frame_us();
        for _ in 0..interval_ticks {
            clock.tick();
            let ctx = SimulationContext::new(&clock, InputSnapshot::default());
            enemy.update(&ctx, &colliders, &mut rng).expect("enemy update");
            assert_eq!(enemy.direction, 1.0, "flipped at {}ms", clock.now_ms());
        }

        for _ in 0..5 {
            clock.tick();
            let ctx = SimulationContext::new(&clock, InputSnapshot::default());
            enemy.update(&ctx, &colliders, &mut rng).expect("enemy update");
        }
        assert_eq!(enemy.direction, -1.0);
    }

    #[test]
    fn walker_never_jumps() {
        let colliders = ColliderSet::from_lines([LineCollider::horizontal(0.0, 534.0, 1600.0)]);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut clock = FrameClock::default();
        let mut enemy = spawn(EnemyKind::Walker, 800.0, 534.0);
        for _ in 0..600 {
            run(&mut enemy, &colliders, 1, &mut rng, &mut clock);
            assert!(enemy.body.velocity.y >= 0.0);
        }
    }

    #[test]
    fn same_seed_same_path() {
        let colliders = ColliderSet::from_lines([LineCollider::horizontal(0.0, 534.0, 1600.0)]);
        let path = |seed: u64| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut clock = FrameClock::default();
            let mut enemy = spawn(EnemyKind::Jumper, 800.0, 534.0);
            run(&mut enemy, &colliders, 1200, &mut rng, &mut clock);
            enemy.body
        };
        assert_eq!(path(9), path(9));
    }

    #[test]
    fn falls_out_below_kill_plane() {
        let mut enemy = spawn(EnemyKind::Walker, 100.0, 700.0);
        let world = WorldTuning::default();
        assert!(!enemy.is_out_of_bounds(&world));
        enemy.body.position.y = 735.0;
        assert!(enemy.is_out_of_bounds(&world));
    }

    #[test]
    fn goal_is_never_stomped_or_damaging() {
        let goal = spawn(EnemyKind::Goal, 100.0, 500.0);
        let mut player = KinematicBody::new(Vec2::new(100.0, 500.0), Vec2::new(40.0, 40.0));
        player.velocity.y = 5.0;
        assert_eq!(goal.classify_contact(&player), ContactOutcome::None);
    }

    #[test]
    fn falling_onto_head_is_a_stomp() {
        let enemy = Rect::new(100.0, 460.0, 40.0, 40.0);
        let player = Rect::new(100.0, 425.0, 40.0, 40.0);
        assert_eq!(classify_contact(&player, 4.0, &enemy, 20.0), ContactOutcome::Stomp);
    }

    #[test]
    fn side_touch_is_damage() {
        let enemy = Rect::new(100.0, 460.0, 40.0, 40.0);
        let player = Rect::new(130.0, 460.0, 40.0, 40.0);
        assert_eq!(classify_contact(&player, 1.0, &enemy, 20.0), ContactOutcome::Damage);
    }

    #[test]
    fn rising_into_enemy_is_damage() {
        let enemy = Rect::new(100.0, 460.0, 40.0, 40.0);
        let player = Rect::new(100.0, 425.0, 40.0, 40.0);
        assert_eq!(classify_contact(&player, -4.0, &enemy, 20.0), ContactOutcome::Damage);
    }

    #[test]
    fn apart_is_no_contact() {
        let enemy = Rect::new(100.0, 460.0, 40.0, 40.0);
        let player = Rect::new(300.0, 460.0, 40.0, 40.0);
        assert_eq!(classify_contact(&player, 4.0, &enemy, 20.0), ContactOutcome::None);
    }

    proptest! {
        #[test]
        fn overlap_is_always_stomp_or_damage(
            px in 60.0f32..140.0,
            py in 420.0f32..500.0,
            vy in -20.0f32..20.0,
        ) {
            let enemy = Rect::new(100.0, 460.0, 40.0, 40.0);
            let player = Rect::new(px, py, 40.0, 40.0);
            let outcome = classify_contact(&player, vy, &enemy, 20.0);
            if overlaps(&player, &enemy) {
                prop_assert_ne!(outcome, ContactOutcome::None);
                if outcome == ContactOutcome::Stomp {
                    prop_assert!(vy > 0.0);
                    prop_assert!(player.bottom() < enemy.center_y());
                }
            } else {
                prop_assert_eq!(outcome, ContactOutcome::None);
            }
        }
    }
}
