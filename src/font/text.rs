//! Single-line text layout into one merged mesh.
//!
//! - Input: an ASCII string
//! - Output: a `scene::Mesh2D` in pt, pen starting at x = 0 on a baseline at y = 0
//!
//! The layout model is intentionally naive: one baseline, one font size, pen advances by
//! each glyph's horizontal advance, no kerning or shaping. That is enough for a short
//! caption.

use log::debug;

use crate::font::tessellate::{Affine2x3, TessellateOptions, append_mesh, tessellate_path_to_mesh};
use crate::font::{FontError, FontQuery, FontSystem};
use crate::scene::Mesh2D;

/// Layout options for `layout_ascii_text_to_mesh`.
#[derive(Debug, Clone)]
pub struct TextLayoutOptions {
    /// Font selection query (family list, weight, italic).
    pub font: FontQuery,

    /// Font size in pt.
    pub font_size_pt: f32,

    /// Tessellation tolerance (smaller -> smoother curves, more triangles).
    pub tolerance: f32,

    /// Extra spacing between glyphs in pt (added after each advance).
    pub letter_spacing_pt: f32,

    /// Flip glyph Y so the text reads upright in a y-down scene.
    pub flip_y: bool,

    /// If true, replace non-ASCII characters with '?'.
    /// If false, return an error on non-ASCII.
    pub replace_non_ascii: bool,
}

impl Default for TextLayoutOptions {
    fn default() -> Self {
        Self {
            font: FontQuery {
                families: vec!["sans-serif".to_string()],
                weight: 400,
                italic: false,
            },
            font_size_pt: 28.0,
            tolerance: 0.02,
            letter_spacing_pt: 0.0,
            flip_y: false,
            replace_non_ascii: true,
        }
    }
}

/// Result of laying out a string into a mesh.
///
/// `ascent_pt` / `descent_pt` are positive distances above / below the baseline, so the
/// line box is `ascent_pt + descent_pt` tall.
#[derive(Debug, Clone)]
pub struct TextMesh {
    pub mesh: Mesh2D,
    pub advance_width_pt: f32,
    pub ascent_pt: f32,
    pub descent_pt: f32,
}

impl TextMesh {
    #[inline]
    pub fn line_height_pt(&self) -> f32 {
        self.ascent_pt + self.descent_pt
    }
}

/// Lay out an ASCII string into a single merged mesh (pt-space).
///
/// Behavior:
/// - Each character becomes one glyph; newlines are skipped.
/// - Glyphs without an outline (e.g. space) still advance the pen.
/// - With `flip_y`, glyphs extend toward negative y (up in a y-down scene).
pub fn layout_ascii_text_to_mesh(
    font_system: &FontSystem,
    text: &str,
    opts: &TextLayoutOptions,
) -> Result<TextMesh, FontError> {
    if opts.font_size_pt <= 0.0 {
        return Err(FontError::InvalidSize(opts.font_size_pt));
    }

    let face = font_system.resolve(&opts.font)?;
    let scale = face.font_units_to_pt_scale(opts.font_size_pt);
    let scale_y = if opts.flip_y { -scale } else { scale };

    let tess_opts = TessellateOptions {
        tolerance: opts.tolerance.max(0.0005),
        ..Default::default()
    };

    let mut merged = Mesh2D::default();
    let mut pen_x_pt = 0.0f32;

    for ch in text.chars() {
        let ch = if ch.is_ascii() {
            ch
        } else if opts.replace_non_ascii {
            '?'
        } else {
            return Err(FontError::MissingChar(ch));
        };
        if ch == '\n' {
            continue;
        }

        let glyph_id = font_system.glyph_id_for_char(&face, ch)?;
        let adv_pt = font_system.glyph_h_metrics(&face, glyph_id)?.advance_width * scale;

        match font_system.glyph_outline_path(&face, glyph_id) {
            Ok(outline) => {
                let xf = Affine2x3::scale_translate(scale, scale_y, pen_x_pt, 0.0);
                let glyph_mesh = tessellate_path_to_mesh(&outline, xf, tess_opts)?;
                append_mesh(&mut merged, &glyph_mesh)?;
            }
            Err(FontError::MissingGlyph { .. }) => {}
            Err(e) => return Err(e),
        }

        pen_x_pt += adv_pt + opts.letter_spacing_pt;
    }

    debug!(
        "text: {:?} -> {} vertices, {:.1} pt wide",
        text,
        merged.positions.len(),
        pen_x_pt
    );

    Ok(TextMesh {
        mesh: merged,
        advance_width_pt: pen_x_pt,
        ascent_pt: face.v_metrics.ascender * scale,
        descent_pt: -face.v_metrics.descender * scale,
    })
}
