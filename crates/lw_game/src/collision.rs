//! Line-collider collision: detection and resolution.
//!
//! Level geometry is a bag of 1px line segments. Horizontal lines (ground,
//! platform tops, pipe tops) only ever push bodies on the y axis; vertical
//! lines (walls, step faces, pipe sides) only on the x axis. The two groups
//! are stored and queried separately.
//!
//! Resolution runs once per tick, after the body has integrated:
//!  1. **Vertical** -- the broad phase uses the swept bounds (the current rect
//!     stretched back to last tick's height) so a fast fall cannot step over
//!     a thin line. Of all lines the body crossed downward this tick, the highest one
//!     becomes the support. A body that crossed nothing is airborne; there is
//!     no sticky ground.
//!  2. **Horizontal** -- overlap with a vertical line while moving toward it
//!     snaps the body flush against it. Pipe sides are widened by a margin.
//!     A wall stub rising from the very line the body stands on (the step and
//!     pipe-top junctions) only blocks a real crossing, never a plain overlap,
//!     so the body can walk off the junction instead of sticking to it.
//!
//! Vertical-first is the default order: the horizontal pass then sees the
//! landed rect and knows the support line. Horizontal-first is kept for
//! comparison; it has no support line to consult, so junction stubs block.

use lw_core::{overlaps, LineCollider, Orientation, Rect};
use serde::Deserialize;

use crate::body::KinematicBody;
use crate::tuning::CollisionTuning;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrder {
    #[default]
    VerticalFirst,
    HorizontalFirst,
}

/// Directional contacts from the last resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
    /// Index into the horizontal group of the line the body landed on.
    pub support: Option<usize>,
}

impl Contacts {
    pub fn blocked_horizontally(&self) -> bool {
        self.left || self.right
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    horizontal: Vec<LineCollider>,
    vertical: Vec<LineCollider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: impl IntoIterator<Item = LineCollider>) -> Self {
        let mut set = Self::new();
        for line in lines {
            set.push(line);
        }
        set
    }

    pub fn push(&mut self, line: LineCollider) {
        match line.orientation {
            Orientation::Horizontal => self.horizontal.push(line),
            Orientation::Vertical => self.vertical.push(line),
        }
    }

    pub fn horizontal(&self) -> &[LineCollider] {
        &self.horizontal
    }

    pub fn vertical(&self) -> &[LineCollider] {
        &self.vertical
    }

    pub fn len(&self) -> usize {
        self.horizontal.len() + self.vertical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineCollider> {
        self.horizontal.iter().chain(self.vertical.iter())
    }
}

/// Per-actor resolution parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveParams {
    pub order: ResolutionOrder,
    /// How far below a line top the previous bottom may sit and still land.
    pub landing_tolerance: f32,
    pub pipe_edge_margin: f32,
    pub junction_tolerance: f32,
}

impl ResolveParams {
    pub fn new(collision: &CollisionTuning, landing_tolerance: f32) -> Self {
        Self {
            order: collision.order,
            landing_tolerance,
            pipe_edge_margin: collision.pipe_edge_margin,
            junction_tolerance: collision.junction_tolerance,
        }
    }
}

impl Default for ResolveParams {
    fn default() -> Self {
        Self::new(&CollisionTuning::default(), 10.0)
    }
}

// --- detection ---

/// Naive broad phase: every line whose rect overlaps `bounds`.
pub fn broad_phase<'a>(
    bounds: Rect,
    lines: &'a [LineCollider],
) -> impl Iterator<Item = (usize, &'a LineCollider)> + 'a {
    lines
        .iter()
        .enumerate()
        .filter(move |(_, line)| overlaps(&bounds, &line.rect()))
}

/// Current rect stretched vertically to cover where the body was before this
/// tick. The x extent stays current so a body that just left a ledge is not
/// supported by it.
pub fn swept_bounds(body: &KinematicBody) -> Rect {
    let rect = body.rect();
    let span = rect.union(&body.previous_rect());
    Rect::new(rect.x, span.y, rect.width, span.height)
}

/// Falling body whose bottom crossed `line.top()` this tick.
pub fn is_landing(rect: &Rect, vel_y: f32, line: &LineCollider, tolerance: f32) -> bool {
    vel_y > 0.0 && rect.bottom() > line.top() && rect.bottom() - vel_y <= line.top() + tolerance
}

/// Rising body whose top crossed `line.bottom()` this tick.
pub fn is_ceiling_hit(rect: &Rect, vel_y: f32, line: &LineCollider) -> bool {
    vel_y < 0.0 && rect.top() < line.bottom() && rect.top() - vel_y >= line.bottom()
}

/// Body edge crossed the near face of `face` on the x axis this tick.
pub fn is_crossing_x(rect: &Rect, vel_x: f32, face: &Rect) -> bool {
    (vel_x > 0.0 && rect.right() > face.left() && rect.right() - vel_x <= face.left())
        || (vel_x < 0.0 && rect.left() < face.right() && rect.left() - vel_x >= face.right())
}

fn detection_rect(line: &LineCollider, pipe_edge_margin: f32) -> Rect {
    if line.pipe_edge {
        line.rect().expanded_x(pipe_edge_margin)
    } else {
        line.rect()
    }
}

fn is_moving_toward(rect: &Rect, vel_x: f32, face: &Rect) -> bool {
    (vel_x > 0.0 && face.center_x() >= rect.center_x())
        || (vel_x < 0.0 && face.center_x() <= rect.center_x())
}

// --- resolution ---

pub fn resolve(body: &mut KinematicBody, colliders: &ColliderSet, params: &ResolveParams) -> Contacts {
    let mut contacts = Contacts::default();
    match params.order {
        ResolutionOrder::VerticalFirst => {
            resolve_vertical(body, colliders.horizontal(), params, &mut contacts);
            resolve_horizontal(body, colliders, params, &mut contacts);
        }
        ResolutionOrder::HorizontalFirst => {
            resolve_horizontal(body, colliders, params, &mut contacts);
            resolve_vertical(body, colliders.horizontal(), params, &mut contacts);
        }
    }
    contacts
}

fn resolve_vertical(
    body: &mut KinematicBody,
    lines: &[LineCollider],
    params: &ResolveParams,
    contacts: &mut Contacts,
) {
    let rect = body.rect();
    let vel_y = body.velocity.y;

    let mut support: Option<(usize, f32)> = None;
    let mut ceiling: Option<f32> = None;
    for (index, line) in broad_phase(swept_bounds(body), lines) {
        if is_landing(&rect, vel_y, line, params.landing_tolerance) {
            if support.map_or(true, |(_, top)| line.top() < top) {
                support = Some((index, line.top()));
            }
        } else if is_ceiling_hit(&rect, vel_y, line) {
            ceiling = Some(ceiling.map_or(line.bottom(), |bottom: f32| bottom.max(line.bottom())));
        }
    }

    if let Some((index, top)) = support {
        body.position.y = top;
        body.velocity.y = 0.0;
        body.acceleration.y = 0.0;
        contacts.down = true;
        contacts.support = Some(index);
    } else if let Some(bottom) = ceiling {
        body.position.y = bottom + body.size.y;
        body.velocity.y = 0.0;
        contacts.up = true;
    }
    body.grounded = contacts.down;
}

fn resolve_horizontal(
    body: &mut KinematicBody,
    colliders: &ColliderSet,
    params: &ResolveParams,
    contacts: &mut Contacts,
) {
    let support = contacts
        .support
        .and_then(|index| colliders.horizontal().get(index));

    for line in colliders.vertical() {
        let vel_x = body.velocity.x;
        if vel_x == 0.0 {
            break;
        }
        let rect = body.rect();
        let face = detection_rect(line, params.pipe_edge_margin);
        if !overlaps(&rect, &face) {
            continue;
        }

        let at_junction = support.is_some_and(|ground| {
            ground.left() <= line.x
                && line.x <= ground.right()
                && (ground.top() - line.top()).abs() < params.junction_tolerance
        });
        let blocks = if at_junction {
            is_crossing_x(&rect, vel_x, &face)
        } else {
            is_moving_toward(&rect, vel_x, &face)
        };
        if !blocks {
            continue;
        }

        if vel_x > 0.0 {
            body.position.x = face.left() - body.half_width();
            contacts.right = true;
        } else {
            body.position.x = face.right() + body.half_width();
            contacts.left = true;
        }
        body.velocity.x = 0.0;
        body.acceleration.x = 0.0;
    }
}
