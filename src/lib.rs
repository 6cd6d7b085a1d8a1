//! `ghostly` library crate root.
//!
//! A ghost silhouette floating over a flickering background with a pulsing caption,
//! drawn as tessellated vector meshes.
//!
//! - `ghost`: outline geometry, meshes, caption and the animated `GhostView`
//! - `anim`: keyframed tracks with easing and repeat modes
//! - `scene`: renderer-agnostic scene graph and camera
//! - `font`: system fonts to glyph outlines to triangle meshes
//! - `render`: winit window runner and wgpu renderer
//!
//! The binary stays thin and calls `run_app`.

pub mod anim;
pub mod font;
pub mod ghost;
pub mod render;
pub mod scene;

use render::app::{AppConfig, run_with_builder};
use render::ghost_state::GhostState;

/// Open the ghost window with default settings and run until it is closed.
///
/// Does not initialize logging; that is left to the caller.
pub fn run_app() -> anyhow::Result<()> {
    run_ghost(AppConfig::default(), ghost::GhostConfig::default())
}

/// Open the ghost window with explicit window and view settings.
pub fn run_ghost(app: AppConfig, ghost: ghost::GhostConfig) -> anyhow::Result<()> {
    run_with_builder(app, move |window| async move { GhostState::new(window, ghost).await })
}
