//! Turn a ghost `Outline` into colored meshes: soft shadow, fill, stroke.

use std::f32::consts::TAU;

use log::debug;
use lyon::math::{Point, vector};
use lyon::path::iterator::PathIterator;
use lyon::path::path::Builder;
use lyon::path::{Path, PathEvent};

use crate::font::tessellate::{
    Affine2x3, StrokeStyle, TessellateError, TessellateOptions, stroke_path_to_mesh,
    tessellate_path_to_mesh,
};
use crate::ghost::config::ShadowSpec;
use crate::ghost::shape::Outline;
use crate::scene::{Mesh2D, Rgba};

/// One translucent shadow layer.
#[derive(Debug, Clone)]
pub struct ShadowLayer {
    pub mesh: Mesh2D,
    pub color: Rgba,
}

/// Everything needed to draw the ghost, in the outline's coordinate space.
#[derive(Debug, Clone)]
pub struct GhostMeshes {
    /// Back to front.
    pub shadow: Vec<ShadowLayer>,
    pub fill: Mesh2D,
    pub stroke: Mesh2D,
}

impl GhostMeshes {
    /// Tessellate the outline.
    ///
    /// The fill closes the open body implicitly; the stroke follows the literal open path.
    pub fn build(
        outline: &Outline,
        stroke_width: f32,
        shadow: ShadowSpec,
        tolerance: f32,
    ) -> Result<Self, TessellateError> {
        let path = outline.to_path();

        let fill = tessellate_path_to_mesh(
            &path,
            Affine2x3::IDENTITY,
            TessellateOptions {
                tolerance,
                ..Default::default()
            },
        )?;
        let stroke_style = StrokeStyle::default()
            .with_width(stroke_width)
            .with_tolerance(tolerance);
        let stroke = stroke_path_to_mesh(&path, Affine2x3::IDENTITY, stroke_style)?;

        let shadow = shadow_layers(&path, stroke_style, shadow)?;

        debug!(
            "ghost: fill {} / stroke {} vertices, {} shadow layers",
            fill.positions.len(),
            stroke.positions.len(),
            shadow.len()
        );

        Ok(Self {
            shadow,
            fill,
            stroke,
        })
    }
}

/// Per-layer alpha such that `layers` stacked layers reach `target` opacity.
pub fn layer_alpha(target: f32, layers: u32) -> f32 {
    let n = layers.max(1) as f32;
    1.0 - (1.0 - target.clamp(0.0, 1.0)).powf(1.0 / n)
}

/// Concentric silhouettes, each spreading a bit further past the stroked outline.
///
/// Each layer is one NonZero fill of the grown body, so every point it covers is blended
/// exactly once. Where all layers overlap the shadow reaches the configured opacity;
/// toward the outer rim fewer layers cover, so it fades out over `radius`.
fn shadow_layers(
    path: &Path,
    stroke: StrokeStyle,
    spec: ShadowSpec,
) -> Result<Vec<ShadowLayer>, TessellateError> {
    if spec.layers == 0 || spec.color.a <= 0.0 {
        return Ok(Vec::new());
    }

    let body = body_polygon(path, stroke.tolerance);
    let color = spec.color.with_alpha(layer_alpha(spec.color.a, spec.layers));
    let opts = TessellateOptions {
        tolerance: stroke.tolerance,
        ..Default::default()
    };
    let mut out = Vec::with_capacity(spec.layers as usize);

    for i in 1..=spec.layers {
        let spread = spec.radius.max(0.0) * i as f32 / spec.layers as f32;
        let grown = grown_outline(&body, stroke.width * 0.5 + spread, stroke.tolerance);
        let mesh = tessellate_path_to_mesh(&grown, Affine2x3::IDENTITY, opts)?;
        out.push(ShadowLayer { mesh, color });
    }

    Ok(out)
}

/// The first sub-path of `path`, flattened. The closing edge is implied.
fn body_polygon(path: &Path, tolerance: f32) -> Vec<Point> {
    let mut points = Vec::new();
    for ev in path.iter().flattened(tolerance) {
        match ev {
            PathEvent::Begin { at } => points.push(at),
            PathEvent::Line { to, .. } => points.push(to),
            PathEvent::End { .. } => break,
            _ => {}
        }
    }
    points
}

/// `polygon` grown by `radius`: the polygon itself, a band along every edge and a disc
/// at every vertex. All contours wind the same way, so a NonZero fill is their union.
fn grown_outline(polygon: &[Point], radius: f32, tolerance: f32) -> Path {
    let mut b = Path::builder();
    add_contour(&mut b, polygon);
    if radius <= 0.0 {
        return b.build();
    }

    let segments = disc_segments(radius, tolerance);
    for (i, &a) in polygon.iter().enumerate() {
        let c = polygon[(i + 1) % polygon.len()];
        let d = c - a;
        let len = d.length();
        if len > f32::EPSILON {
            let n = vector(-d.y, d.x) * (radius / len);
            add_contour(&mut b, &[a + n, c + n, c - n, a - n]);
        }

        let disc: Vec<Point> = (0..segments)
            .map(|k| {
                let t = TAU * k as f32 / segments as f32;
                a + vector(t.cos(), t.sin()) * radius
            })
            .collect();
        add_contour(&mut b, &disc);
    }

    b.build()
}

/// Closed contour through `points`, reversed if needed so its signed area is positive.
fn add_contour(b: &mut Builder, points: &[Point]) {
    let [first, rest @ ..] = points else {
        return;
    };
    if rest.len() < 2 {
        return;
    }

    let twice_area: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p.x * q.y - q.x * p.y)
        .sum();

    b.begin(*first);
    if twice_area >= 0.0 {
        rest.iter().for_each(|&p| {
            b.line_to(p);
        });
    } else {
        rest.iter().rev().for_each(|&p| {
            b.line_to(p);
        });
    }
    b.end(true);
}

/// Polygon segments needed for a circle of `radius` to stay within `tolerance`.
fn disc_segments(radius: f32, tolerance: f32) -> usize {
    let tol = tolerance.clamp(1e-3, radius);
    let step = 2.0 * (1.0 - tol / radius).acos();
    ((TAU / step).ceil() as usize).clamp(8, 64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghost::shape::{BoundingRect, ghost_outline};
    use lyon::math::point;

    #[test]
    fn layer_alpha_accumulates_to_target() {
        let a = layer_alpha(0.33, 8);
        let total = 1.0 - (1.0 - a).powi(8);
        assert!((total - 0.33).abs() < 1e-4);
        assert!((layer_alpha(0.5, 1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn shadow_spreads_past_the_stroke() {
        let outline = ghost_outline(BoundingRect::new(0.0, 0.0, 150.0, 200.0));
        let meshes =
            GhostMeshes::build(&outline, 3.0, ShadowSpec::default(), 0.1).expect("tessellate");

        assert_eq!(meshes.shadow.len(), 8);
        assert!(!meshes.fill.is_empty());
        assert!(!meshes.stroke.is_empty());

        let stroke_b = meshes.stroke.bounds();
        let outer_b = meshes.shadow[7].mesh.bounds();
        assert!(outer_b.min[0] < stroke_b.min[0]);
        assert!(outer_b.max[1] > stroke_b.max[1]);
    }

    /// Triangles of `mesh` strictly containing `p`.
    fn coverage(mesh: &Mesh2D, p: [f32; 2]) -> usize {
        let edge = |u: [f32; 2], v: [f32; 2]| {
            (v[0] - u[0]) * (p[1] - u[1]) - (v[1] - u[1]) * (p[0] - u[0])
        };
        mesh.indices
            .chunks_exact(3)
            .filter(|tri| {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.positions[usize::from(i)]);
                let (d0, d1, d2) = (edge(a, b), edge(b, c), edge(c, a));
                (d0 > 0.0 && d1 > 0.0 && d2 > 0.0) || (d0 < 0.0 && d1 < 0.0 && d2 < 0.0)
            })
            .count()
    }

    #[test]
    fn shadow_layers_cover_each_point_once() {
        let outline = ghost_outline(BoundingRect::new(0.0, 0.0, 150.0, 200.0));
        let meshes =
            GhostMeshes::build(&outline, 3.0, ShadowSpec::default(), 0.1).expect("tessellate");
        let outer = &meshes.shadow[7].mesh;

        // Below the gap between the left edge (x = 30) and the arc start (x = 15): outside
        // the fill, inside the spread of both ends.
        assert_eq!(coverage(outer, [22.3, 85.1]), 1);
        assert_eq!(coverage(outer, [75.3, 100.1]), 1);

        let b = outer.bounds();
        let mut y = b.min[1] + 0.37;
        while y < b.max[1] {
            let mut x = b.min[0] + 0.53;
            while x < b.max[0] {
                assert!(coverage(outer, [x, y]) <= 1, "overlap at ({x}, {y})");
                x += 3.1;
            }
            y += 3.3;
        }
    }

    #[test]
    fn grown_outline_keeps_the_polygon_winding_positive() {
        let clockwise = [point(0.0, 0.0), point(0.0, 10.0), point(10.0, 10.0), point(10.0, 0.0)];
        let mesh = tessellate_path_to_mesh(
            &grown_outline(&clockwise, 2.0, 0.1),
            Affine2x3::IDENTITY,
            TessellateOptions::default(),
        )
        .expect("fill");

        let b = mesh.bounds();
        assert!((b.min[0] + 2.0).abs() < 0.1 && (b.max[1] - 12.0).abs() < 0.1);
        assert_eq!(coverage(&mesh, [5.1, 5.3]), 1);
        assert_eq!(coverage(&mesh, [-1.1, -1.2]), 1);
    }

    #[test]
    fn fill_covers_the_bulging_bottom() {
        let outline = ghost_outline(BoundingRect::new(0.0, 0.0, 150.0, 200.0));
        let meshes = GhostMeshes::build(
            &outline,
            3.0,
            ShadowSpec {
                layers: 0,
                ..Default::default()
            },
            0.1,
        )
        .expect("tessellate");

        assert!(meshes.shadow.is_empty());
        let b = meshes.fill.bounds();
        // Head top at y = 20, curve bottom at y = (160 + 220) / 2 = 190.
        assert!((b.min[1] - 20.0).abs() < 0.5, "top = {}", b.min[1]);
        assert!((b.max[1] - 190.0).abs() < 0.5, "bottom = {}", b.max[1]);
    }
}
