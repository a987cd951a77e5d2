//! Level descriptors and the builder that turns them into collider sets.
//!
//! A descriptor is plain data: ground and wall lines, pipes, enemy spawns and
//! the player spawn. Entries are compact JSON arrays so levels stay readable
//! as tables:
//!
//! ```json
//! {
//!   "ground": [[0, 534, 1600, [0, 222, 0]]],
//!   "wall":   [[0, 0, 600]],
//!   "pipe":   [[380, 534, 40, 120, [221, 112, 112]]],
//!   "enemy":  [[2, [120, 384], 70, 70], [-1, [1200, 534], 9, 7, "princess"]],
//!   "player": [600, 464]
//! }
//! ```
//!
//! Line entries are `[x, y, length, color?]`. Pipe entries are
//! `[x, base_y, width, height, color?]` and rise upward from `base_y`. Enemy
//! entries are `[tag, [x, y], scale_w_percent, scale_h_percent, sprite?]`.
//!
//! `map_width` and `ground_height` are optional. Without `ground_height` the
//! kill planes hang below the lowest ground line of the level.

use glam::Vec2;
use lw_core::LineCollider;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::collision::ColliderSet;
use crate::enemy::EnemyKind;

pub const BUILTIN_LEVEL_COUNT: usize = 3;

const BUILTIN_LEVELS: [&str; BUILTIN_LEVEL_COUNT] = [
    include_str!("../../../assets/levels/level1.json"),
    include_str!("../../../assets/levels/level2.json"),
    include_str!("../../../assets/levels/level3.json"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct LevelDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub map_width: Option<f32>,
    #[serde(default)]
    pub ground_height: Option<f32>,
    #[serde(default)]
    pub ground: Vec<LineSpec>,
    #[serde(default)]
    pub wall: Vec<LineSpec>,
    #[serde(default)]
    pub pipe: Vec<PipeSpec>,
    #[serde(default)]
    pub enemy: Vec<EnemySpec>,
    pub player: [f32; 2],
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum LineSpec {
    Colored(f32, f32, f32, [u8; 3]),
    Plain(f32, f32, f32),
}

impl LineSpec {
    pub fn origin(&self) -> Vec2 {
        match *self {
            Self::Colored(x, y, ..) | Self::Plain(x, y, _) => Vec2::new(x, y),
        }
    }

    pub fn length(&self) -> f32 {
        match *self {
            Self::Colored(_, _, length, _) | Self::Plain(_, _, length) => length,
        }
    }

    pub fn color(&self) -> Option<[u8; 3]> {
        match *self {
            Self::Colored(.., color) => Some(color),
            Self::Plain(..) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum PipeSpec {
    Colored(f32, f32, f32, f32, [u8; 3]),
    Plain(f32, f32, f32, f32),
}

impl PipeSpec {
    /// `(x, base_y, width, height)`
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            Self::Colored(x, y, w, h, _) | Self::Plain(x, y, w, h) => (x, y, w, h),
        }
    }

    pub fn color(&self) -> Option<[u8; 3]> {
        match *self {
            Self::Colored(.., color) => Some(color),
            Self::Plain(..) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnemySpec {
    WithSprite(i32, [f32; 2], f32, f32, String),
    Plain(i32, [f32; 2], f32, f32),
}

impl EnemySpec {
    pub fn tag(&self) -> i32 {
        match self {
            Self::WithSprite(tag, ..) | Self::Plain(tag, ..) => *tag,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Self::WithSprite(_, pos, ..) | Self::Plain(_, pos, ..) => Vec2::from(*pos),
        }
    }

    /// Percent of the kind's base sprite size.
    pub fn scale(&self) -> Vec2 {
        match self {
            Self::WithSprite(_, _, w, h, _) | Self::Plain(_, _, w, h) => Vec2::new(*w, *h),
        }
    }

    pub fn sprite(&self) -> Option<&str> {
        match self {
            Self::WithSprite(.., sprite) => Some(sprite),
            Self::Plain(..) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub position: Vec2,
    pub scale: Vec2,
    pub sprite: Option<String>,
}

/// A descriptor resolved into the data a session runs on. Immutable once built.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub colliders: ColliderSet,
    pub player_spawn: Vec2,
    pub enemies: Vec<EnemySpawn>,
    pub map_width: f32,
    /// Screen y the kill planes are measured from.
    pub ground_height: f32,
}

impl Level {
    pub fn build(descriptor: &LevelDescriptor, default_map_width: f32) -> Result<Self, String> {
        validate_level(descriptor)?;

        let ground_height = descriptor
            .ground_height
            .unwrap_or_else(|| lowest_floor(descriptor));

        let mut colliders = ColliderSet::new();
        for spec in &descriptor.ground {
            let origin = spec.origin();
            colliders.push(
                LineCollider::horizontal(origin.x, origin.y, spec.length()).with_color(spec.color()),
            );
        }
        for spec in &descriptor.wall {
            let origin = spec.origin();
            colliders.push(
                LineCollider::vertical(origin.x, origin.y, spec.length()).with_color(spec.color()),
            );
        }
        for spec in &descriptor.pipe {
            for line in pipe_lines(spec) {
                colliders.push(line);
            }
            if let Some(underside) = pipe_underside(spec, ground_height) {
                colliders.push(underside);
            }
        }

        let mut enemies = Vec::with_capacity(descriptor.enemy.len());
        for spec in &descriptor.enemy {
            let kind = EnemyKind::from_tag(spec.tag())
                .ok_or_else(|| format!("Unknown enemy tag {}", spec.tag()))?;
            enemies.push(EnemySpawn {
                kind,
                position: spec.position(),
                scale: spec.scale(),
                sprite: spec.sprite().map(str::to_string),
            });
        }

        Ok(Self {
            name: descriptor.name.clone(),
            colliders,
            player_spawn: Vec2::from(descriptor.player),
            enemies,
            map_width: descriptor.map_width.unwrap_or(default_map_width),
            ground_height,
        })
    }

    pub fn has_goal(&self) -> bool {
        self.enemies.iter().any(|spawn| spawn.kind.is_goal())
    }
}

/// Top edge plus two side edges; the sides are flagged as pipe edges so the
/// resolver widens them.
pub fn pipe_lines(spec: &PipeSpec) -> [LineCollider; 3] {
    let (x, base_y, width, height) = spec.bounds();
    let top_y = base_y - height;
    let color = spec.color();
    [
        LineCollider::horizontal(x, top_y, width).with_color(color),
        LineCollider::vertical(x, top_y, height)
            .with_color(color)
            .as_pipe_edge(),
        LineCollider::vertical(x + width - 1.0, top_y, height)
            .with_color(color)
            .as_pipe_edge(),
    ]
}

/// Bottom edge of a pipe that floats above the ground, so a jump from below
/// bonks on it. Pipes standing on the ground get none.
pub fn pipe_underside(spec: &PipeSpec, ground_height: f32) -> Option<LineCollider> {
    let (x, base_y, width, _) = spec.bounds();
    (base_y < ground_height)
        .then(|| LineCollider::horizontal(x, base_y - 1.0, width).with_color(spec.color()))
}

/// Lowest ground line, falling back to the lowest pipe base.
fn lowest_floor(descriptor: &LevelDescriptor) -> f32 {
    let grounds = descriptor.ground.iter().map(|spec| spec.origin().y);
    let lowest = grounds.fold(f32::NEG_INFINITY, f32::max);
    if lowest.is_finite() {
        return lowest;
    }
    descriptor
        .pipe
        .iter()
        .map(|spec| spec.bounds().1)
        .fold(f32::NEG_INFINITY, f32::max)
}

pub fn load_level_from_path(path: &Path) -> Result<LevelDescriptor, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    let descriptor: LevelDescriptor = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&descriptor)?;
    Ok(descriptor)
}

/// One of the bundled levels, numbered from 1.
pub fn builtin_level(number: usize) -> Result<LevelDescriptor, String> {
    let raw = number
        .checked_sub(1)
        .and_then(|index| BUILTIN_LEVELS.get(index))
        .ok_or_else(|| {
            format!("No built-in level {number}; levels are numbered 1 to {BUILTIN_LEVEL_COUNT}")
        })?;
    let descriptor: LevelDescriptor = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse built-in level {number}: {e}"))?;
    validate_level(&descriptor)?;
    Ok(descriptor)
}

pub fn builtin_levels() -> Result<Vec<LevelDescriptor>, String> {
    (1..=BUILTIN_LEVEL_COUNT).map(builtin_level).collect()
}

pub fn validate_level(descriptor: &LevelDescriptor) -> Result<(), String> {
    let label = if descriptor.name.is_empty() {
        "<unnamed>"
    } else {
        descriptor.name.as_str()
    };

    if !descriptor.player.iter().all(|v| v.is_finite()) {
        return Err(format!(
            "Level validation failed: '{label}' player spawn is not finite"
        ));
    }
    if descriptor.ground.is_empty() && descriptor.pipe.is_empty() {
        return Err(format!(
            "Level validation failed: '{label}' has nothing to stand on"
        ));
    }
    for (group, specs) in [("ground", &descriptor.ground), ("wall", &descriptor.wall)] {
        for (i, spec) in specs.iter().enumerate() {
            let length = spec.length();
            if !spec.origin().is_finite() || !length.is_finite() || length <= 0.0 {
                return Err(format!(
                    "Level validation failed: '{label}' {group} {i} needs a finite origin and positive length"
                ));
            }
        }
    }
    for (i, spec) in descriptor.pipe.iter().enumerate() {
        let (x, y, w, h) = spec.bounds();
        let size = Vec2::new(w, h);
        if !Vec2::new(x, y).is_finite() || !size.is_finite() || size.min_element() <= 0.0 {
            return Err(format!(
                "Level validation failed: '{label}' pipe {i} needs positive width and height"
            ));
        }
    }
    for (i, spec) in descriptor.enemy.iter().enumerate() {
        if EnemyKind::from_tag(spec.tag()).is_none() {
            return Err(format!(
                "Level validation failed: '{label}' enemy {i} has unknown tag {}",
                spec.tag()
            ));
        }
        let scale = spec.scale();
        if !spec.position().is_finite() || !scale.is_finite() || scale.min_element() <= 0.0 {
            return Err(format!(
                "Level validation failed: '{label}' enemy {i} needs a finite spawn and positive scale"
            ));
        }
    }
    if let Some(width) = descriptor.map_width {
        if !width.is_finite() || width <= 0.0 {
            return Err(format!(
                "Level validation failed: '{label}' map_width must be positive"
            ));
        }
    }
    if let Some(height) = descriptor.ground_height {
        if !height.is_finite() {
            return Err(format!(
                "Level validation failed: '{label}' ground_height must be finite"
            ));
        }
    }
    if !descriptor.enemy.iter().any(|e| e.tag() == EnemyKind::Goal.tag()) {
        log::warn!("Level '{label}' has no goal. It can only be left by restart or level select.");
    }
    Ok(())
}
