//! The ghost: silhouette geometry, caption, meshes and the animated view tying them together.

pub mod caption;
pub mod config;
pub mod paint;
pub mod shape;
pub mod view;

pub use config::{GhostConfig, ShadowSpec, TweenSpec};
pub use shape::{BoundingRect, Outline, PathCommand, ghost_outline};
pub use view::{AnimationFlags, GhostView, Lifecycle};
