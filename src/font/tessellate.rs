//! Path tessellation helpers.
//!
//! Converts vector paths (`lyon::path::Path`) into renderer-friendly triangle meshes
//! (`crate::scene::Mesh2D`):
//! - fill via `lyon::tessellation::FillTessellator` (every sub-path is treated as closed)
//! - stroke via `lyon::tessellation::StrokeTessellator` (open sub-paths stay open)
//!
//! Used for glyph outlines as well as the ghost silhouette.

use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    LineCap, LineJoin, StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor,
    VertexBuffers,
};

use crate::scene::Mesh2D;

/// Tessellation failures, per tessellator.
#[derive(thiserror::Error, Debug)]
pub enum TessellateError {
    #[error("fill tessellation failed: {0}")]
    Fill(String),

    #[error("stroke tessellation failed: {0}")]
    Stroke(String),

    #[error("mesh exceeds u16 index range ({0} vertices)")]
    TooManyVertices(usize),
}

/// Fill tessellation options.
///
/// - `tolerance`: smaller => more triangles (smoother curves), larger => fewer triangles.
/// - `fill_rule`: NonZero matches both font outlines and the usual UI path fill.
#[derive(Debug, Copy, Clone)]
pub struct TessellateOptions {
    pub tolerance: f32,
    pub fill_rule: FillRule,
}

impl Default for TessellateOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.02,
            fill_rule: FillRule::NonZero,
        }
    }
}

/// Stroke tessellation options. Defaults follow common UI stroke defaults: butt caps,
/// miter joins.
#[derive(Debug, Copy, Clone)]
pub struct StrokeStyle {
    pub width: f32,
    pub tolerance: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            tolerance: 0.02,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
        }
    }
}

impl StrokeStyle {
    #[inline]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    #[inline]
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Simple affine transform for 2D points (column-vector convention).
///
/// Matrix:
/// [ a c tx ]
/// [ b d ty ]
/// [ 0 0  1 ]
#[derive(Debug, Copy, Clone)]
pub struct Affine2x3 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Affine2x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2x3 {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Non-uniform scale followed by a translation. A negative `sy` flips Y.
    #[inline]
    pub fn scale_translate(sx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx,
            ty,
        }
    }

    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = self.a * x + self.c * y + self.tx;
        let ny = self.b * x + self.d * y + self.ty;
        (nx, ny)
    }
}

/// A vertex for tessellation output (2D position only).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TessVertex {
    pub position: [f32; 2],
}

/// Builds `TessVertex` from lyon fill/stroke vertices, applying a transform.
struct TessVertexCtor {
    xf: Affine2x3,
}

impl TessVertexCtor {
    #[inline]
    fn vertex(&self, x: f32, y: f32) -> TessVertex {
        let (x, y) = self.xf.transform_point(x, y);
        TessVertex { position: [x, y] }
    }
}

impl FillVertexConstructor<TessVertex> for TessVertexCtor {
    fn new_vertex(&mut self, v: FillVertex) -> TessVertex {
        let p = v.position();
        self.vertex(p.x, p.y)
    }
}

impl StrokeVertexConstructor<TessVertex> for TessVertexCtor {
    fn new_vertex(&mut self, v: StrokeVertex) -> TessVertex {
        let p = v.position();
        self.vertex(p.x, p.y)
    }
}

/// Fill-tessellate a path into a `scene::Mesh2D`.
///
/// `transform` is applied to all output points (e.g. font units -> pt + positioning).
pub fn tessellate_path_to_mesh(
    path: &Path,
    transform: Affine2x3,
    opts: TessellateOptions,
) -> Result<Mesh2D, TessellateError> {
    let mut tess = FillTessellator::new();
    let mut buffers: VertexBuffers<TessVertex, u16> = VertexBuffers::new();

    let fill = FillOptions::tolerance(opts.tolerance).with_fill_rule(opts.fill_rule);

    let ctor = TessVertexCtor { xf: transform };
    tess.tessellate_path(path, &fill, &mut BuffersBuilder::new(&mut buffers, ctor))
        .map_err(|e| TessellateError::Fill(format!("{e:?}")))?;

    Ok(mesh_from_buffers(&buffers))
}

/// Stroke-tessellate a path into a `scene::Mesh2D`.
///
/// Open sub-paths are stroked exactly as drawn (no implicit closing segment).
pub fn stroke_path_to_mesh(
    path: &Path,
    transform: Affine2x3,
    style: StrokeStyle,
) -> Result<Mesh2D, TessellateError> {
    let mut tess = StrokeTessellator::new();
    let mut buffers: VertexBuffers<TessVertex, u16> = VertexBuffers::new();

    let stroke = StrokeOptions::tolerance(style.tolerance)
        .with_line_width(style.width)
        .with_line_cap(style.line_cap)
        .with_line_join(style.line_join);

    let ctor = TessVertexCtor { xf: transform };
    tess.tessellate_path(path, &stroke, &mut BuffersBuilder::new(&mut buffers, ctor))
        .map_err(|e| TessellateError::Stroke(format!("{e:?}")))?;

    Ok(mesh_from_buffers(&buffers))
}

/// Convert lyon `VertexBuffers<TessVertex, u16>` into `scene::Mesh2D`.
#[inline]
pub fn mesh_from_buffers(buffers: &VertexBuffers<TessVertex, u16>) -> Mesh2D {
    Mesh2D {
        positions: buffers.vertices.iter().map(|v| v.position).collect(),
        indices: buffers.indices.clone(),
    }
}

/// Append `src` into `dst` with index offset (u16 indices).
pub fn append_mesh(dst: &mut Mesh2D, src: &Mesh2D) -> Result<(), TessellateError> {
    let base = dst.positions.len();
    let total = base + src.positions.len();
    if total > u16::MAX as usize {
        return Err(TessellateError::TooManyVertices(total));
    }

    dst.positions.extend_from_slice(&src.positions);

    let base_u16 = base as u16;
    dst.indices
        .extend(src.indices.iter().copied().map(|i| base_u16 + i));
    Ok(())
}
