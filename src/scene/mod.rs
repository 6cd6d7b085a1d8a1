//! Scene graph abstractions.
//!
//! The ghost view is composed from a handful of named objects ("mobjects"):
//! - a full-bleed background quad
//! - the ghost root (shadow, fill and stroke meshes as children)
//! - the caption mesh
//!
//! A camera maps world coordinates (logical **pt**, y pointing down like a window)
//! to clip space, and renderers consume a flattened list of draw items.
//!
//! Transforms are explicit and composable (matrix order matters). Each mobject keeps
//! its static placement (`base_from_parent`) apart from the animated layer
//! (`anim_from_parent`) so relayout and animation never overwrite each other.
//!
//! This module does not depend on wgpu; it is renderer-agnostic.

use std::collections::BTreeMap;

/// 2D affine transform stored as a 3x3 matrix in column-major order.
///
/// Convention:
/// - Column vectors (x, y, 1)
/// - Composition is `world_from_local = parent * local`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine2 {
    /// Column-major 3x3 matrix.
    pub m: [[f32; 3]; 3],
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [tx, ty, 1.0]],
        }
    }

    #[inline]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Compose transforms: `self * rhs`.
    ///
    /// With column-vector convention, `rhs` applies first, then `self`.
    #[inline]
    pub fn mul(self, rhs: Self) -> Self {
        let a = self.m;
        let b = rhs.m;

        let mut out = [[0.0f32; 3]; 3];
        for col in 0..3 {
            for row in 0..3 {
                out[col][row] =
                    a[0][row] * b[col][0] + a[1][row] * b[col][1] + a[2][row] * b[col][2];
            }
        }
        Self { m: out }
    }

    #[inline]
    pub fn transform_point(self, x: f32, y: f32) -> (f32, f32) {
        let nx = self.m[0][0] * x + self.m[1][0] * y + self.m[2][0];
        let ny = self.m[0][1] * x + self.m[1][1] * y + self.m[2][1];
        (nx, ny)
    }

    /// Translation part of the transform.
    #[inline]
    pub fn translation(self) -> [f32; 2] {
        [self.m[2][0], self.m[2][1]]
    }

    /// Embed into a 4x4 (column-major) for GPU MVP use.
    #[inline]
    pub fn to_mat4(self) -> [[f32; 4]; 4] {
        let m = self.m;
        [
            [m[0][0], m[0][1], 0.0, m[0][2]],
            [m[1][0], m[1][1], 0.0, m[1][2]],
            [0.0, 0.0, 1.0, 0.0],
            [m[2][0], m[2][1], 0.0, m[2][2]],
        ]
    }
}

/// Axis-aligned bounding box in pt-space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Aabb2 {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Aabb2 {
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY, f32::INFINITY],
            max: [f32::NEG_INFINITY, f32::NEG_INFINITY],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    #[inline]
    pub fn include_point(&mut self, p: [f32; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }
}

/// Simple RGBA color (components in `[0, 1]`, treated as sRGB by the renderer).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise linear interpolation (`t` is not clamped).
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// An owned CPU triangle mesh (2D positions, u16 indices).
#[derive(Debug, Clone, Default)]
pub struct Mesh2D {
    pub positions: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl Mesh2D {
    /// Axis-aligned rectangle with its top-left corner at `origin`.
    pub fn rect(origin: [f32; 2], size: [f32; 2]) -> Self {
        let [x0, y0] = origin;
        let x1 = x0 + size[0];
        let y1 = y0 + size[1];
        Self {
            positions: vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    pub fn bounds(&self) -> Aabb2 {
        let mut b = Aabb2::empty();
        for &p in &self.positions {
            b.include_point(p);
        }
        b
    }
}

/// A draw item produced by flattening the scene graph.
///
/// - `world_from_local` must already be fully composed for this item.
/// - `z` is a simple painter's-order; higher draws later.
#[derive(Debug, Clone)]
pub struct DrawItem2D {
    pub mesh: Mesh2D,
    pub fill: Rgba,
    pub world_from_local: Affine2,
    pub z: i32,
}

/// A "mobject": a node in the scene graph.
#[derive(Debug, Clone)]
pub struct Mobject2D {
    pub name: String,

    /// Static placement (layout).
    pub base_from_parent: Affine2,
    /// Animated layer, written by `anim::Timeline::apply`.
    pub anim_from_parent: Affine2,
    /// Always `base_from_parent * anim_from_parent`.
    pub local_from_parent: Affine2,
    pub z: i32,

    pub fill: Rgba,
    pub mesh: Option<Mesh2D>,

    pub children: Vec<Mobject2D>,
}

impl Default for Mobject2D {
    fn default() -> Self {
        Self {
            name: "mobject".to_string(),
            base_from_parent: Affine2::IDENTITY,
            anim_from_parent: Affine2::IDENTITY,
            local_from_parent: Affine2::IDENTITY,
            z: 0,
            fill: Rgba::WHITE,
            mesh: None,
            children: Vec::new(),
        }
    }
}

impl Mobject2D {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn with_mesh(mut self, mesh: Mesh2D) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[inline]
    pub fn with_fill(mut self, fill: Rgba) -> Self {
        self.fill = fill;
        self
    }

    #[inline]
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    #[inline]
    pub fn with_base_transform(mut self, base_from_parent: Affine2) -> Self {
        self.set_base_transform(base_from_parent);
        self
    }

    /// Replace the static placement, keeping the animated layer.
    #[inline]
    pub fn set_base_transform(&mut self, base_from_parent: Affine2) {
        self.base_from_parent = base_from_parent;
        self.local_from_parent = self.base_from_parent.mul(self.anim_from_parent);
    }

    /// Replace the animated layer, keeping the static placement.
    #[inline]
    pub fn set_anim_transform(&mut self, anim_from_parent: Affine2) {
        self.anim_from_parent = anim_from_parent;
        self.local_from_parent = self.base_from_parent.mul(self.anim_from_parent);
    }

    #[inline]
    pub fn add_child(&mut self, child: Mobject2D) {
        self.children.push(child);
    }

    /// Conservative local-space AABB from the mesh and (transformed) children.
    pub fn compute_local_bounds(&self) -> Aabb2 {
        let mut bounds = self.mesh.as_ref().map(Mesh2D::bounds).unwrap_or_else(Aabb2::empty);

        for child in &self.children {
            let child_bounds = child.compute_local_bounds();
            if child_bounds.is_empty() {
                continue;
            }

            let corners = [
                [child_bounds.min[0], child_bounds.min[1]],
                [child_bounds.max[0], child_bounds.min[1]],
                [child_bounds.max[0], child_bounds.max[1]],
                [child_bounds.min[0], child_bounds.max[1]],
            ];

            for c in corners {
                let (x, y) = child.local_from_parent.transform_point(c[0], c[1]);
                bounds.include_point([x, y]);
            }
        }

        bounds
    }

    /// Flatten this subtree into draw items, composing transforms.
    ///
    /// Children inherit the parent's fill alpha multiplicatively so fading a root fades
    /// the whole subtree.
    pub fn flatten(&self, world_from_parent: Affine2, alpha: f32, out: &mut Vec<DrawItem2D>) {
        let world_from_local = world_from_parent.mul(self.local_from_parent);

        if let Some(mesh) = &self.mesh {
            if !mesh.is_empty() {
                out.push(DrawItem2D {
                    mesh: mesh.clone(),
                    fill: self.fill.with_alpha(self.fill.a * alpha),
                    world_from_local,
                    z: self.z,
                });
            }
        }

        let child_alpha = if self.mesh.is_some() { alpha } else { alpha * self.fill.a };
        for child in &self.children {
            child.flatten(world_from_local, child_alpha, out);
        }
    }
}

/// A simple 2D camera operating in pt-space.
///
/// The mapping is:
/// - Translate by -center
/// - Scale by zoom
/// - Apply aspect correction so that zoom is isotropic in world space
/// - Optionally flip Y so world y grows downward (window convention)
#[derive(Debug, Copy, Clone)]
pub struct Camera2D {
    pub center_pt: [f32; 2],
    pub zoom: f32,
    pub viewport_aspect: f32,
    pub y_down: bool,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            center_pt: [0.0, 0.0],
            zoom: 1.0,
            viewport_aspect: 1.0,
            y_down: false,
        }
    }
}

impl Camera2D {
    /// Make one world pt cover one logical pixel of a `width_pt x height_pt` viewport,
    /// with world `(0, 0)` at the top-left corner.
    pub fn fit_viewport_pt(&mut self, width_pt: f32, height_pt: f32) {
        let w = width_pt.max(1.0);
        let h = height_pt.max(1.0);
        self.viewport_aspect = w / h;
        self.center_pt = [w * 0.5, h * 0.5];
        self.zoom = 2.0 / w.min(h);
        self.y_down = true;
    }

    /// Compute an affine transform from world(pt) to clip space.
    pub fn clip_from_world(&self) -> Affine2 {
        let t = Affine2::translate(-self.center_pt[0], -self.center_pt[1]);

        let ax = if self.viewport_aspect > 1.0 {
            1.0 / self.viewport_aspect
        } else {
            1.0
        };
        let ay = if self.viewport_aspect < 1.0 {
            self.viewport_aspect
        } else {
            1.0
        };
        let flip = if self.y_down { -1.0 } else { 1.0 };

        let s = Affine2::scale(self.zoom * ax, self.zoom * ay * flip);

        s.mul(t)
    }
}

/// A top-level scene that holds named mobjects.
#[derive(Debug, Default)]
pub struct Scene2D {
    pub camera: Camera2D,
    pub roots: Vec<Mobject2D>,
    /// Name -> index into `roots`.
    pub index: BTreeMap<String, usize>,
}

impl Scene2D {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, m: Mobject2D) {
        let idx = self.roots.len();
        self.index.insert(m.name.clone(), idx);
        self.roots.push(m);
    }

    pub fn get(&self, name: &str) -> Option<&Mobject2D> {
        self.index.get(name).and_then(|&i| self.roots.get(i))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Mobject2D> {
        let i = *self.index.get(name)?;
        self.roots.get_mut(i)
    }

    /// Drop every root object.
    pub fn clear(&mut self) {
        self.roots.clear();
        self.index.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Flatten the full scene into draw items, sorted back to front by `z`.
    ///
    /// The sort is stable, so items sharing a `z` keep scene order.
    pub fn flatten(&self) -> Vec<DrawItem2D> {
        let mut items = Vec::new();
        for root in &self.roots {
            root.flatten(Affine2::IDENTITY, 1.0, &mut items);
        }
        items.sort_by_key(|it| it.z);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn translate_after_scale() {
        let xf = Affine2::translate(10.0, 5.0).mul(Affine2::scale(2.0, 3.0));
        let (x, y) = xf.transform_point(1.0, 1.0);
        assert!(approx(x, 12.0));
        assert!(approx(y, 8.0));
    }

    #[test]
    fn base_and_anim_layers_compose() {
        let mut m = Mobject2D::new("ghost").with_base_transform(Affine2::translate(100.0, 50.0));
        m.set_anim_transform(Affine2::translate(0.0, 20.0));
        assert_eq!(m.local_from_parent.translation(), [100.0, 70.0]);

        // Relayout keeps the animated offset.
        m.set_base_transform(Affine2::translate(10.0, 10.0));
        assert_eq!(m.local_from_parent.translation(), [10.0, 30.0]);
    }

    #[test]
    fn y_down_camera_maps_corners_to_clip() {
        let mut cam = Camera2D::default();
        cam.fit_viewport_pt(400.0, 200.0);
        let clip = cam.clip_from_world();

        let (x, y) = clip.transform_point(0.0, 0.0);
        assert!(approx(x, -1.0));
        assert!(approx(y, 1.0));

        let (x, y) = clip.transform_point(400.0, 200.0);
        assert!(approx(x, 1.0));
        assert!(approx(y, -1.0));
    }

    #[test]
    fn flatten_sorts_by_z_and_propagates_alpha() {
        let mut scene = Scene2D::new();
        let mut group = Mobject2D::new("group")
            .with_fill(Rgba::WHITE.with_alpha(0.5))
            .with_z(5);
        group.add_child(
            Mobject2D::new("child")
                .with_mesh(Mesh2D::rect([0.0, 0.0], [1.0, 1.0]))
                .with_z(3),
        );
        scene.add_root(group);
        scene.add_root(
            Mobject2D::new("back")
                .with_mesh(Mesh2D::rect([0.0, 0.0], [1.0, 1.0]))
                .with_z(0),
        );

        let items = scene.flatten();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].z, 0);
        assert_eq!(items[1].z, 3);
        assert!(approx(items[1].fill.a, 0.5));
    }

    #[test]
    fn clear_empties_index() {
        let mut scene = Scene2D::new();
        scene.add_root(Mobject2D::new("a"));
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.get("a").is_none());
    }

    #[test]
    fn rgba_lerp_midpoint() {
        let mid = Rgba::RED.lerp(Rgba::BLACK, 0.5);
        assert!(approx(mid.r, 0.5));
        assert!(approx(mid.g, 0.0));
        assert!(approx(mid.a, 1.0));
    }
}
