//! Caption text as a vector mesh centered on its own origin.
//!
//! Centering on the origin lets the timeline scale the caption about its middle.

use crate::font::text::{TextLayoutOptions, TextMesh, layout_ascii_text_to_mesh};
use crate::font::{FontError, FontQuery, FontSystem};
use crate::ghost::config::GhostConfig;

/// Lay out `config.caption` for a y-down scene and center its line box on (0, 0).
pub fn build_caption(fonts: &FontSystem, config: &GhostConfig) -> Result<TextMesh, FontError> {
    let opts = TextLayoutOptions {
        font: FontQuery {
            families: config.caption_families.clone(),
            weight: config.caption_weight,
            italic: false,
        },
        font_size_pt: config.caption_size_pt,
        tolerance: config.tolerance,
        flip_y: true,
        ..Default::default()
    };

    let text = layout_ascii_text_to_mesh(fonts, &config.caption, &opts)?;
    Ok(center_line_box(text))
}

/// Shift a y-down text mesh (baseline at y = 0) so its line box is centered on the origin.
pub fn center_line_box(mut text: TextMesh) -> TextMesh {
    let shift_x = -0.5 * text.advance_width_pt;
    // Line box spans [-ascent, +descent]; move its middle to 0.
    let shift_y = 0.5 * (text.ascent_pt - text.descent_pt);
    for p in &mut text.mesh.positions {
        p[0] += shift_x;
        p[1] += shift_y;
    }
    text
}
