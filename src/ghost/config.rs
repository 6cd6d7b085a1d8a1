//! Tunables for the ghost view.
//!
//! Every value has a default matching the intended look; callers override fields with
//! struct update syntax.

use crate::anim::Ease;
use crate::scene::Rgba;

/// Duration and easing of one auto-reversing tween.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TweenSpec {
    pub duration_s: f32,
    pub ease: Ease,
}

impl TweenSpec {
    #[inline]
    pub const fn ease_in_out(duration_s: f32) -> Self {
        Self {
            duration_s,
            ease: Ease::InOut,
        }
    }
}

/// Soft drop shadow drawn as concentric translucent layers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowSpec {
    /// How far the shadow spreads past the silhouette (pt).
    pub radius: f32,
    /// Color; its alpha is the opacity right under the silhouette edge.
    pub color: Rgba,
    /// Number of layers (more is smoother).
    pub layers: u32,
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            radius: 10.0,
            color: Rgba::BLACK.with_alpha(0.33),
            layers: 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GhostConfig {
    // Caption.
    pub caption: String,
    pub caption_families: Vec<String>,
    pub caption_size_pt: f32,
    pub caption_weight: u16,
    pub caption_color: Rgba,
    /// Caption (opacity, scale) while `show_text` is false / true.
    pub caption_hidden: (f32, f32),
    pub caption_shown: (f32, f32),

    // Ghost.
    pub frame_size_pt: [f32; 2],
    pub fill_color: Rgba,
    pub stroke_color: Rgba,
    pub stroke_width_pt: f32,
    pub shadow: ShadowSpec,
    /// Vertical offset magnitude; `float_up` moves from `+d` to `-d`.
    pub float_distance_pt: f32,

    // Layout.
    pub stack_spacing_pt: f32,

    // Background flicker: `flicker_color` false -> true.
    pub background_from: Rgba,
    pub background_to: Rgba,

    pub flicker: TweenSpec,
    pub float: TweenSpec,
    pub text: TweenSpec,

    /// Tessellation tolerance for shapes and glyphs (pt).
    pub tolerance: f32,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            caption: "I'm a bad guy...".to_string(),
            caption_families: vec![
                "SF Pro Display".to_string(),
                "Helvetica Neue".to_string(),
                "Inter".to_string(),
                "Arial".to_string(),
                "DejaVu Sans".to_string(),
                "sans-serif".to_string(),
            ],
            caption_size_pt: 28.0,
            caption_weight: 700,
            caption_color: Rgba::WHITE,
            caption_hidden: (0.0, 0.9),
            caption_shown: (1.0, 1.1),

            frame_size_pt: [150.0, 200.0],
            fill_color: Rgba::WHITE,
            stroke_color: Rgba::BLACK,
            stroke_width_pt: 3.0,
            shadow: ShadowSpec::default(),
            float_distance_pt: 20.0,

            stack_spacing_pt: 8.0,

            background_from: Rgba::RED,
            background_to: Rgba::BLACK,

            flicker: TweenSpec::ease_in_out(0.2),
            float: TweenSpec::ease_in_out(2.0),
            text: TweenSpec::ease_in_out(1.5),

            tolerance: 0.05,
        }
    }
}
