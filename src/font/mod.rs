//! Font module root.
//!
//! Text is rendered as **vector glyph outlines**:
//! - Discover system fonts via `fontdb`.
//! - Resolve a requested family/weight/style to a concrete face, with fallbacks.
//! - Extract glyph outlines (move_to/line_to/quad_to/curve_to) from TTF/OTF via `ttf-parser`.
//! - Convert outlines to `lyon::path::Path` and tessellate into triangles (`tessellate`).
//! - Lay out a single line of text into one merged mesh (`text`).

pub mod tessellate;
pub mod text;

use std::{fs, path::Path as FsPath, sync::Arc};

use fontdb::{Database, Family, Query, Source, Style, Weight};
use log::debug;
use lyon::math::point;
use lyon::path::Path;

use crate::font::tessellate::TessellateError;

/// Simplified font style selection.
#[derive(Debug, Clone, Default)]
pub struct FontQuery {
    /// Preferred font family names, in priority order.
    /// Generic names (`serif`, `sans-serif`, `monospace`) map to fontdb's generic families.
    pub families: Vec<String>,

    /// Weight in CSS terms (100..900): 400 = regular, 700 = bold.
    pub weight: u16,

    /// Italic / oblique.
    pub italic: bool,
}

/// Vertical metrics in **font units** (units-per-em).
#[derive(Debug, Copy, Clone)]
pub struct FontVMetrics {
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

/// Per-glyph horizontal metrics in font units.
#[derive(Debug, Copy, Clone, Default)]
pub struct GlyphHMetrics {
    pub advance_width: f32,
}

/// A resolved face plus its bytes.
///
/// - `bytes` contains the full font file/collection.
/// - `index` selects the face within the collection.
#[derive(Debug, Clone)]
pub struct ResolvedFace {
    pub bytes: Arc<[u8]>,
    pub index: u32,
    pub v_metrics: FontVMetrics,
}

impl ResolvedFace {
    /// Scale factor mapping font units -> pt for the given font size.
    #[inline]
    pub fn font_units_to_pt_scale(&self, font_size_pt: f32) -> f32 {
        font_size_pt / self.v_metrics.units_per_em
    }

    fn parse(&self) -> Result<ttf_parser::Face<'_>, FontError> {
        ttf_parser::Face::parse(&self.bytes, self.index).map_err(|_| FontError::ParseFailed)
    }
}

/// Errors produced by the font subsystem.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error("no fonts found on this system")]
    NoFontsAvailable,

    #[error("failed to resolve a font face for query: {0:?}")]
    ResolveFailed(FontQuery),

    #[error("font face has no file-backed source")]
    NonFileBackedSource,

    #[error("failed to read font file {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font face")]
    ParseFailed,

    #[error("no glyph for character {0:?}")]
    MissingChar(char),

    #[error("glyph outline not found for glyph id {glyph_id}")]
    MissingGlyph { glyph_id: u16 },

    #[error("missing horizontal metrics for glyph id {glyph_id}")]
    MissingMetrics { glyph_id: u16 },

    #[error("invalid font size {0} pt")]
    InvalidSize(f32),

    #[error(transparent)]
    Tessellate(#[from] TessellateError),
}

/// Owns a `fontdb::Database` with the system fonts loaded.
pub struct FontSystem {
    db: Database,
}

impl FontSystem {
    /// Create a new font system and load system fonts.
    pub fn new() -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_system_fonts();

        if db.faces().next().is_none() {
            return Err(FontError::NoFontsAvailable);
        }
        debug!("font: loaded {} system faces", db.len());

        Ok(Self { db })
    }

    /// Resolve a `FontQuery` to a concrete face.
    ///
    /// Resolution order:
    /// - the named/generic families in the query, with the requested weight/style
    /// - generic `sans-serif` with the same weight/style
    /// - the first face in the database
    pub fn resolve(&self, query: &FontQuery) -> Result<ResolvedFace, FontError> {
        let style = if query.italic {
            Style::Italic
        } else {
            Style::Normal
        };
        let weight = Weight(query.weight.clamp(1, 1000));

        let mut families: Vec<Family<'_>> = Vec::new();
        for f in &query.families {
            let s = f.trim();
            if s.eq_ignore_ascii_case("serif") {
                families.push(Family::Serif);
            } else if s.eq_ignore_ascii_case("sans-serif") || s.eq_ignore_ascii_case("sans") {
                families.push(Family::SansSerif);
            } else if s.eq_ignore_ascii_case("monospace") || s.eq_ignore_ascii_case("mono") {
                families.push(Family::Monospace);
            } else if !s.is_empty() {
                families.push(Family::Name(s));
            }
        }

        let query_with = |families: &[Family<'_>]| {
            self.db.query(&Query {
                families,
                weight,
                style,
                stretch: fontdb::Stretch::Normal,
            })
        };

        let id = query_with(families.as_slice())
            .or_else(|| query_with(&[Family::SansSerif]))
            .or_else(|| self.db.faces().next().map(|f| f.id))
            .ok_or_else(|| FontError::ResolveFailed(query.clone()))?;

        let face = self
            .db
            .face(id)
            .ok_or_else(|| FontError::ResolveFailed(query.clone()))?;

        let (path, index) = match &face.source {
            Source::File(p) => (p.clone(), face.index),
            _ => return Err(FontError::NonFileBackedSource),
        };
        debug!("font: resolved {:?} -> {}", query.families, path.display());

        let bytes = read_font_bytes(&path)?;

        let parsed = ttf_parser::Face::parse(&bytes, index).map_err(|_| FontError::ParseFailed)?;
        let units_per_em = parsed.units_per_em() as f32;

        // Prefer OS/2 typographic metrics, fall back to hhea.
        let asc = parsed
            .typographic_ascender()
            .unwrap_or_else(|| parsed.ascender()) as f32;
        let desc = parsed
            .typographic_descender()
            .unwrap_or_else(|| parsed.descender()) as f32;

        Ok(ResolvedFace {
            bytes,
            index,
            v_metrics: FontVMetrics {
                units_per_em,
                ascender: asc,
                descender: desc,
            },
        })
    }

    /// Extract a glyph outline as a lyon `Path` in **font units** (Y up).
    pub fn glyph_outline_path(
        &self,
        face: &ResolvedFace,
        glyph_id: u16,
    ) -> Result<Path, FontError> {
        let parsed = face.parse()?;

        let mut builder = LyonOutlineBuilder::new();
        // `None` means the glyph has no outline (e.g. space).
        parsed
            .outline_glyph(ttf_parser::GlyphId(glyph_id), &mut builder)
            .ok_or(FontError::MissingGlyph { glyph_id })?;

        Ok(builder.build())
    }

    /// Find the glyph id for a Unicode codepoint.
    pub fn glyph_id_for_char(&self, face: &ResolvedFace, ch: char) -> Result<u16, FontError> {
        let parsed = face.parse()?;
        let gid = parsed.glyph_index(ch).ok_or(FontError::MissingChar(ch))?;
        Ok(gid.0)
    }

    /// Horizontal advance of a glyph, in font units.
    pub fn glyph_h_metrics(
        &self,
        face: &ResolvedFace,
        glyph_id: u16,
    ) -> Result<GlyphHMetrics, FontError> {
        let parsed = face.parse()?;
        let adv = parsed
            .glyph_hor_advance(ttf_parser::GlyphId(glyph_id))
            .ok_or(FontError::MissingMetrics { glyph_id })? as f32;

        Ok(GlyphHMetrics { advance_width: adv })
    }
}

fn read_font_bytes(path: &FsPath) -> Result<Arc<[u8]>, FontError> {
    let data = fs::read(path).map_err(|source| FontError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Arc::<[u8]>::from(data))
}

/// Convert `ttf-parser` outline callbacks into a `lyon::path::Path`.
///
/// A glyph may contain multiple contours; `move_to` starts a new one.
struct LyonOutlineBuilder {
    builder: lyon::path::path::Builder,
    contour_open: bool,
}

impl LyonOutlineBuilder {
    fn new() -> Self {
        Self {
            builder: Path::builder(),
            contour_open: false,
        }
    }

    fn build(mut self) -> Path {
        if self.contour_open {
            self.builder.close();
        }
        self.builder.build()
    }
}

impl ttf_parser::OutlineBuilder for LyonOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.contour_open {
            self.builder.close();
        }
        self.builder.begin(point(x, y));
        self.contour_open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(point(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quadratic_bezier_to(point(x1, y1), point(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder
            .cubic_bezier_to(point(x1, y1), point(x2, y2), point(x, y));
    }

    fn close(&mut self) {
        if self.contour_open {
            self.builder.close();
            self.contour_open = false;
        }
    }
}
