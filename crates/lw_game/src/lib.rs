//! Gameplay core for a line-collider platformer.
//!
//! Levels are built from one-pixel horizontal and vertical line colliders.
//! Horizontal lines stop vertical motion and vertical lines stop horizontal
//! motion. A [`session::Session`] owns the player, the enemies and the camera
//! for the running level and advances them once per tick from a
//! [`lw_core::SimulationContext`].

pub mod body;
pub mod camera;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod player;
pub mod replay;
pub mod session;
pub mod tuning;
