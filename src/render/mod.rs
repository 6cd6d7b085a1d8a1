//! Window, GPU and drawing.
//!
//! Entry point: `render::app::run_with_builder` with a state such as
//! `render::ghost_state::GhostState`.

pub mod app;

/// Device/surface wrapper shared by the renderer and app states.
pub mod gpu;

/// Batched solid-color renderer for scene draw items.
pub mod mesh_renderer;

/// Frame clock and size conversions.
pub mod util;

/// The `AppState` that shows the animated ghost.
pub mod ghost_state;
