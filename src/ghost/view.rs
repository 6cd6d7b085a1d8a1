//! The animated ghost view.
//!
//! `GhostView` owns three independent flags and the scene they drive:
//!
//! | flag            | drives                    | false -> true            |
//! |-----------------|---------------------------|--------------------------|
//! | `flicker_color` | background fill           | red -> black             |
//! | `float_up`      | ghost vertical offset     | +20 pt -> -20 pt         |
//! | `show_text`     | caption opacity and scale | (0, 0.9) -> (1, 1.1)     |
//!
//! Mounting toggles each flag once and registers an auto-reversing tween per driven property,
//! starting at the mount time and repeating until the view is unmounted. The view is
//! renderer-agnostic: callers feed it a clock and read back draw items.

use log::{debug, info};

use crate::anim::{AnimTarget, Repeat, Timeline, Track};
use crate::font::tessellate::TessellateError;
use crate::font::text::TextMesh;
use crate::ghost::config::GhostConfig;
use crate::ghost::paint::GhostMeshes;
use crate::ghost::shape::{BoundingRect, ghost_outline};
use crate::scene::{Aabb2, Affine2, DrawItem2D, Mesh2D, Mobject2D, Rgba, Scene2D};

/// Scene root names.
pub const BACKGROUND: &str = "background";
pub const GHOST: &str = "ghost";
pub const CAPTION: &str = "caption";

const Z_BACKGROUND: i32 = 0;
const Z_SHADOW: i32 = 1;
const Z_FILL: i32 = 2;
const Z_STROKE: i32 = 3;
const Z_CAPTION: i32 = 4;

/// The three animation flags. All start `false`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AnimationFlags {
    pub float_up: bool,
    pub flicker_color: bool,
    pub show_text: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Lifecycle {
    /// Built, flags untouched, static pose.
    Created,
    /// Flags toggled; tweens run from `at_s` on.
    Mounted { at_s: f64 },
    /// Scene and timeline discarded.
    Unmounted,
}

/// Where the vertical stack lands in the viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StackLayout {
    /// Top-left of the ghost frame.
    pub ghost_origin: [f32; 2],
    /// Center of the caption line box, if there is a caption.
    pub caption_center: Option<[f32; 2]>,
}

/// Center a column of `[ghost frame, spacing, caption line]` in the viewport.
pub fn stack_layout(
    viewport_pt: [f32; 2],
    frame_pt: [f32; 2],
    spacing_pt: f32,
    caption_height_pt: Option<f32>,
) -> StackLayout {
    let [w, h] = viewport_pt;
    let [fw, fh] = frame_pt;

    let stack_h = fh + caption_height_pt.map_or(0.0, |c| spacing_pt + c);
    let top = (h - stack_h) * 0.5;

    StackLayout {
        ghost_origin: [(w - fw) * 0.5, top],
        caption_center: caption_height_pt.map(|c| [w * 0.5, top + fh + spacing_pt + c * 0.5]),
    }
}

pub struct GhostView {
    config: GhostConfig,
    flags: AnimationFlags,
    lifecycle: Lifecycle,
    scene: Scene2D,
    timeline: Timeline,
    viewport_pt: [f32; 2],
    caption_height_pt: Option<f32>,
}

impl GhostView {
    /// Build the scene for a viewport (in logical pt). `caption` must already be centered
    /// on its origin (see `ghost::caption::build_caption`); `None` renders without it.
    pub fn new(
        config: GhostConfig,
        viewport_pt: [f32; 2],
        caption: Option<TextMesh>,
    ) -> Result<Self, TessellateError> {
        let [fw, fh] = config.frame_size_pt;
        let outline = ghost_outline(BoundingRect::new(0.0, 0.0, fw, fh));
        let meshes = GhostMeshes::build(
            &outline,
            config.stroke_width_pt,
            config.shadow,
            config.tolerance,
        )?;

        let mut scene = Scene2D::new();
        scene.add_root(
            Mobject2D::new(BACKGROUND)
                .with_fill(config.background_from)
                .with_z(Z_BACKGROUND),
        );

        let mut ghost = Mobject2D::new(GHOST).with_fill(Rgba::WHITE);
        for (i, layer) in meshes.shadow.into_iter().enumerate() {
            ghost.add_child(
                Mobject2D::new(format!("{GHOST}.shadow.{i}"))
                    .with_mesh(layer.mesh)
                    .with_fill(layer.color)
                    .with_z(Z_SHADOW),
            );
        }
        ghost.add_child(
            Mobject2D::new(format!("{GHOST}.fill"))
                .with_mesh(meshes.fill)
                .with_fill(config.fill_color)
                .with_z(Z_FILL),
        );
        ghost.add_child(
            Mobject2D::new(format!("{GHOST}.stroke"))
                .with_mesh(meshes.stroke)
                .with_fill(config.stroke_color)
                .with_z(Z_STROKE),
        );
        scene.add_root(ghost);

        let caption_height_pt = caption.as_ref().map(TextMesh::line_height_pt);
        if let Some(text) = caption {
            scene.add_root(
                Mobject2D::new(CAPTION)
                    .with_mesh(text.mesh)
                    .with_fill(config.caption_color)
                    .with_z(Z_CAPTION),
            );
        }

        let mut view = Self {
            config,
            flags: AnimationFlags::default(),
            lifecycle: Lifecycle::Created,
            scene,
            timeline: Timeline::new(),
            viewport_pt,
            caption_height_pt,
        };
        view.layout();
        view.apply_static_pose();
        Ok(view)
    }

    #[inline]
    pub fn flags(&self) -> AnimationFlags {
        self.flags
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn scene(&self) -> &Scene2D {
        &self.scene
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[inline]
    pub fn config(&self) -> &GhostConfig {
        &self.config
    }

    #[inline]
    pub fn viewport_pt(&self) -> [f32; 2] {
        self.viewport_pt
    }

    /// Toggle every flag once and start the three tweens at `now_s`.
    ///
    /// Returns `false` (and changes nothing) unless the view is freshly created.
    pub fn mount(&mut self, now_s: f64) -> bool {
        if self.lifecycle != Lifecycle::Created {
            return false;
        }

        let before = self.flags;
        let after = AnimationFlags {
            float_up: !before.float_up,
            flicker_color: !before.flicker_color,
            show_text: !before.show_text,
        };
        self.flags = after;

        let forever = Repeat::Forever { autoreverse: true };
        let cfg = &self.config;

        let (alpha_from, scale_from) = self.caption_pose(before.show_text);
        let (alpha_to, scale_to) = self.caption_pose(after.show_text);

        let tracks = [
            Track::new_fill(
                AnimTarget::Name(BACKGROUND.into()),
                self.background_color(before.flicker_color),
                self.background_color(after.flicker_color),
            )
            .tween(0.0, 1.0, cfg.flicker.duration_s, cfg.flicker.ease),
            Track::new_translate_y(AnimTarget::Name(GHOST.into())).tween(
                self.float_offset(before.float_up),
                self.float_offset(after.float_up),
                cfg.float.duration_s,
                cfg.float.ease,
            ),
            Track::new_alpha(AnimTarget::Name(CAPTION.into())).tween(
                alpha_from,
                alpha_to,
                cfg.text.duration_s,
                cfg.text.ease,
            ),
            Track::new_scale(AnimTarget::Name(CAPTION.into())).tween(
                scale_from,
                scale_to,
                cfg.text.duration_s,
                cfg.text.ease,
            ),
        ];
        for track in tracks {
            self.timeline
                .add_track(track.starting_at(now_s).repeat(forever));
        }

        self.lifecycle = Lifecycle::Mounted { at_s: now_s };
        info!(
            "ghost view mounted at {now_s:.3}s ({} tracks)",
            self.timeline.len()
        );
        true
    }

    /// Stop every animation and drop the scene. Further updates do nothing.
    pub fn unmount(&mut self) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        self.timeline.clear();
        self.scene.clear();
        self.lifecycle = Lifecycle::Unmounted;
        info!("ghost view unmounted");
    }

    /// Sample the running tweens at `now_s`.
    pub fn update(&mut self, now_s: f64) {
        if let Lifecycle::Mounted { .. } = self.lifecycle {
            self.timeline.apply(&mut self.scene, now_s);
        }
    }

    /// Relayout for a new viewport; animated values are preserved.
    pub fn resize(&mut self, viewport_pt: [f32; 2]) {
        self.viewport_pt = viewport_pt;
        if self.lifecycle != Lifecycle::Unmounted {
            self.layout();
        }
    }

    /// Z-sorted draw items for the current frame.
    pub fn draw_items(&self) -> Vec<DrawItem2D> {
        self.scene.flatten()
    }

    /// Ghost bounds (shadow included) in viewport space.
    pub fn ghost_bounds(&self) -> Option<Aabb2> {
        let ghost = self.scene.get(GHOST)?;
        let local = ghost.compute_local_bounds();
        if local.is_empty() {
            return None;
        }
        let corners = [
            [local.min[0], local.min[1]],
            [local.max[0], local.min[1]],
            [local.max[0], local.max[1]],
            [local.min[0], local.max[1]],
        ];

        let mut out = Aabb2::empty();
        for [x, y] in corners {
            let (wx, wy) = ghost.local_from_parent.transform_point(x, y);
            out.include_point([wx, wy]);
        }
        Some(out)
    }

    fn layout(&mut self) {
        let [w, h] = self.viewport_pt;
        let layout = stack_layout(
            self.viewport_pt,
            self.config.frame_size_pt,
            self.config.stack_spacing_pt,
            self.caption_height_pt,
        );
        debug!("layout: viewport {w}x{h} pt -> {layout:?}");

        self.scene.camera.fit_viewport_pt(w, h);

        if let Some(bg) = self.scene.get_mut(BACKGROUND) {
            bg.mesh = Some(Mesh2D::rect([0.0, 0.0], [w.max(0.0), h.max(0.0)]));
        }
        if let Some(ghost) = self.scene.get_mut(GHOST) {
            let [x, y] = layout.ghost_origin;
            ghost.set_base_transform(Affine2::translate(x, y));
        }
        if let (Some(caption), Some([x, y])) =
            (self.scene.get_mut(CAPTION), layout.caption_center)
        {
            caption.set_base_transform(Affine2::translate(x, y));
        }
    }

    /// Show the value each flag currently selects, without animation.
    fn apply_static_pose(&mut self) {
        let flags = self.flags;
        let bg = self.background_color(flags.flicker_color);
        let offset = self.float_offset(flags.float_up);
        let (alpha, scale) = self.caption_pose(flags.show_text);

        if let Some(obj) = self.scene.get_mut(BACKGROUND) {
            obj.fill = bg;
        }
        if let Some(obj) = self.scene.get_mut(GHOST) {
            obj.set_anim_transform(Affine2::translate(0.0, offset));
        }
        if let Some(obj) = self.scene.get_mut(CAPTION) {
            obj.fill.a = alpha;
            obj.set_anim_transform(Affine2::scale(scale, scale));
        }
    }

    fn background_color(&self, flicker_color: bool) -> Rgba {
        if flicker_color {
            self.config.background_to
        } else {
            self.config.background_from
        }
    }

    fn float_offset(&self, float_up: bool) -> f32 {
        if float_up {
            -self.config.float_distance_pt
        } else {
            self.config.float_distance_pt
        }
    }

    fn caption_pose(&self, show_text: bool) -> (f32, f32) {
        if show_text {
            self.config.caption_shown
        } else {
            self.config.caption_hidden
        }
    }
}
