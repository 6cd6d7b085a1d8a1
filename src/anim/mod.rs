//! Keyframe timeline for `Scene2D`.
//!
//! Animates a small set of properties on named root mobjects:
//! - `Mobject2D.anim_from_parent` (vertical translation, uniform scale)
//! - `Mobject2D.fill` (alpha only, or a full color mix between two endpoints)
//!
//! Tracks carry their own start time and repeat mode, so a view can register a tween
//! at mount time and let it loop (optionally ping-ponging) for as long as it lives.
//!
//! Timeline time is `f64` seconds: a forever track is sampled days after it started, and
//! only the phase within one period is narrowed to `f32`.
//!
//! Usage sketch:
//! ```ignore
//! use ghostly::anim::{AnimTarget, Ease, Repeat, Timeline, Track};
//! let mut tl = Timeline::new();
//! tl.add_track(
//!     Track::new_translate_y(AnimTarget::Name("ghost".into()))
//!         .tween(20.0, -20.0, 2.0, Ease::InOut)
//!         .starting_at(mount_s)
//!         .repeat(Repeat::Forever { autoreverse: true }),
//! );
//! // per frame:
//! tl.apply(&mut scene, clock.elapsed_s());
//! ```

use std::collections::HashMap;

use crate::scene::{Affine2, Rgba, Scene2D};

/// How to map animation time into a normalized [0,1] parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Ease {
    Linear,
    /// The standard UI ease-in-out timing curve: `cubic-bezier(0.42, 0, 0.58, 1)`.
    InOut,
}

impl Ease {
    #[inline]
    pub fn sample(self, x: f32) -> f32 {
        let t = x.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InOut => UnitBezier::new(0.42, 0.0, 0.58, 1.0).solve(t),
        }
    }
}

/// A cubic Bézier timing curve through (0,0) and (1,1) with two free control points.
#[derive(Debug, Copy, Clone)]
struct UnitBezier {
    ax: f32,
    bx: f32,
    cx: f32,
    ay: f32,
    by: f32,
    cy: f32,
}

impl UnitBezier {
    const EPSILON: f32 = 1e-6;

    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        let ay = 1.0 - cy - by;
        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    #[inline]
    fn curve_x(&self, s: f32) -> f32 {
        ((self.ax * s + self.bx) * s + self.cx) * s
    }

    #[inline]
    fn curve_y(&self, s: f32) -> f32 {
        ((self.ay * s + self.by) * s + self.cy) * s
    }

    #[inline]
    fn curve_dx(&self, s: f32) -> f32 {
        (3.0 * self.ax * s + 2.0 * self.bx) * s + self.cx
    }

    /// Find the curve parameter whose x equals `x`: Newton first, bisection if it stalls.
    fn solve_param(&self, x: f32) -> f32 {
        let mut s = x;
        for _ in 0..8 {
            let err = self.curve_x(s) - x;
            if err.abs() < Self::EPSILON {
                return s;
            }
            let d = self.curve_dx(s);
            if d.abs() < Self::EPSILON {
                break;
            }
            s -= err / d;
        }

        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        s = x;
        while lo < hi {
            let v = self.curve_x(s);
            if (v - x).abs() < Self::EPSILON {
                break;
            }
            if x > v {
                lo = s;
            } else {
                hi = s;
            }
            let next = (lo + hi) * 0.5;
            if next == s {
                break;
            }
            s = next;
        }
        s
    }

    fn solve(&self, x: f32) -> f32 {
        self.curve_y(self.solve_param(x))
    }
}

/// Identifies which object in the scene to animate.
#[derive(Debug, Clone)]
pub enum AnimTarget {
    /// Target a root object by name.
    Name(String),
}

impl AnimTarget {
    fn resolve_index(&self, scene: &Scene2D) -> Option<usize> {
        match self {
            AnimTarget::Name(name) => scene.index.get(name).copied(),
        }
    }
}

/// A keyframe in seconds with a scalar value.
///
/// `ease` shapes the segment that starts at this keyframe.
#[derive(Debug, Copy, Clone)]
pub struct Keyframe {
    pub time_s: f32,
    pub value: f32,
    pub ease: Ease,
}

impl Keyframe {
    #[inline]
    pub fn at(time_s: f32, value: f32) -> Self {
        Self {
            time_s: time_s.max(0.0),
            value,
            ease: Ease::Linear,
        }
    }

    #[inline]
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Interpolate a scalar track across keyframes (sorted by time).
fn sample_keyframes(frames: &[Keyframe], t_s: f32) -> Option<f32> {
    let (first, rest) = frames.split_first()?;

    let mut prev = *first;
    if rest.is_empty() || t_s <= prev.time_s {
        return Some(prev.value);
    }

    for next in rest {
        if t_s < next.time_s {
            let dt = (next.time_s - prev.time_s).max(1e-6);
            let u = (t_s - prev.time_s) / dt;
            let k = prev.ease.sample(u);
            return Some(lerp(prev.value, next.value, k));
        }
        prev = *next;
    }

    // Past end: hold last value.
    Some(prev.value)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Triangle wave over `[0, 1]`: 0 -> 1 over one period, back to 0 over the next.
#[inline]
fn ping_pong_01(t: f64, period_s: f64) -> f64 {
    let x = (t / period_s) % 2.0;
    if x <= 1.0 { x } else { 2.0 - x }
}

/// What property to animate for a target.
#[derive(Debug, Clone)]
pub enum Property {
    /// Alpha channel (`fill.a`) of the target.
    Alpha { keyframes: Vec<Keyframe> },

    /// Translation Y (pt) of the animated layer.
    TranslateY { keyframes: Vec<Keyframe> },

    /// Uniform scale around the local origin.
    Scale { keyframes: Vec<Keyframe> },

    /// Full fill color; keyframe values are the mix factor from `from` to `to`.
    Fill {
        from: Rgba,
        to: Rgba,
        keyframes: Vec<Keyframe>,
    },
}

impl Property {
    fn keyframes(&self) -> &[Keyframe] {
        match self {
            Property::Alpha { keyframes }
            | Property::TranslateY { keyframes }
            | Property::Scale { keyframes }
            | Property::Fill { keyframes, .. } => keyframes,
        }
    }

    fn keyframes_mut(&mut self) -> &mut Vec<Keyframe> {
        match self {
            Property::Alpha { keyframes }
            | Property::TranslateY { keyframes }
            | Property::Scale { keyframes }
            | Property::Fill { keyframes, .. } => keyframes,
        }
    }

    fn start_end(&self) -> Option<(f32, f32)> {
        let frames = self.keyframes();
        // Keyframes are kept sorted by `Track::with_keyframes`.
        Some((frames.first()?.time_s, frames.last()?.time_s))
    }

    fn sample(&self, t_s: f32) -> Option<f32> {
        sample_keyframes(self.keyframes(), t_s)
    }
}

/// How a track behaves past its last keyframe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Play once and hold the last value.
    #[default]
    Once,
    /// Loop over the keyframe span forever; with `autoreverse`, alternate forward and
    /// backward playback instead of jumping back to the start.
    Forever { autoreverse: bool },
}

/// One animation track applies one property to one target.
#[derive(Debug, Clone)]
pub struct Track {
    pub target: AnimTarget,
    pub property: Property,
    /// Timeline time at which keyframe time 0 plays.
    pub start_s: f64,
    pub repeat: Repeat,
}

impl Track {
    fn with_property(target: AnimTarget, property: Property) -> Self {
        Self {
            target,
            property,
            start_s: 0.0,
            repeat: Repeat::Once,
        }
    }

    pub fn new_alpha(target: AnimTarget) -> Self {
        Self::with_property(target, Property::Alpha { keyframes: Vec::new() })
    }

    pub fn new_translate_y(target: AnimTarget) -> Self {
        Self::with_property(target, Property::TranslateY { keyframes: Vec::new() })
    }

    pub fn new_scale(target: AnimTarget) -> Self {
        Self::with_property(target, Property::Scale { keyframes: Vec::new() })
    }

    pub fn new_fill(target: AnimTarget, from: Rgba, to: Rgba) -> Self {
        Self::with_property(
            target,
            Property::Fill {
                from,
                to,
                keyframes: Vec::new(),
            },
        )
    }

    pub fn with_keyframes(mut self, mut keyframes: Vec<Keyframe>) -> Self {
        // Keep deterministic ordering.
        keyframes.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        *self.property.keyframes_mut() = keyframes;
        self
    }

    /// Single eased segment from `from` (at 0) to `to` (at `duration_s`).
    pub fn tween(self, from: f32, to: f32, duration_s: f32, ease: Ease) -> Self {
        self.with_keyframes(vec![
            Keyframe::at(0.0, from).ease(ease),
            Keyframe::at(duration_s, to),
        ])
    }

    #[inline]
    pub fn starting_at(mut self, start_s: f64) -> Self {
        self.start_s = start_s;
        self
    }

    #[inline]
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn bounds(&self) -> Option<(f32, f32)> {
        self.property.start_end()
    }

    /// Map timeline time to keyframe time, honoring the start offset and repeat mode.
    ///
    /// The period phase is taken in `f64`; only the result is narrowed.
    fn local_time(&self, t_s: f64) -> f32 {
        let u = t_s - self.start_s;
        let Repeat::Forever { autoreverse } = self.repeat else {
            return u as f32;
        };
        let Some((first, last)) = self.bounds() else {
            return u as f32;
        };

        let first_s = f64::from(first);
        let span = f64::from(last) - first_s;
        if span <= 0.0 || u <= first_s {
            return u as f32;
        }

        let p = u - first_s;
        let phase = if autoreverse {
            ping_pong_01(p, span) * span
        } else {
            p.rem_euclid(span)
        };
        (first_s + phase) as f32
    }

    /// Sample this track's value at timeline time `t_s`.
    pub fn sample(&self, t_s: f64) -> Option<f32> {
        self.property.sample(self.local_time(t_s))
    }
}

/// A timeline holds multiple tracks. Tracks are evaluated independently at time t.
#[derive(Debug, Default)]
pub struct Timeline {
    pub tracks: Vec<Track>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    pub fn add_track(&mut self, track: Track) -> &mut Self {
        self.tracks.push(track);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Drop every track.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Apply this timeline to the scene at time `t_s`.
    ///
    /// - Only root mobjects (by name) are targeted.
    /// - Transform tracks are composed in a fixed order: Scale -> Translate,
    ///   and written to the animated layer; the static placement is never touched.
    /// - Alpha and fill overwrite the target's fill.
    /// - When several tracks hit the same property, the last one in track order wins.
    pub fn apply(&self, scene: &mut Scene2D, t_s: f64) {
        #[derive(Debug, Default, Copy, Clone)]
        struct Parts {
            sx: Option<f32>,
            ty: Option<f32>,
            alpha: Option<f32>,
            fill: Option<Rgba>,
        }

        let mut parts: HashMap<usize, Parts> = HashMap::new();

        for tr in &self.tracks {
            let Some(idx) = tr.target.resolve_index(scene) else {
                continue;
            };

            let Some(v) = tr.sample(t_s) else {
                continue;
            };

            let p = parts.entry(idx).or_default();

            match &tr.property {
                Property::Alpha { .. } => p.alpha = Some(v),
                Property::TranslateY { .. } => p.ty = Some(v),
                Property::Scale { .. } => p.sx = Some(v),
                Property::Fill { from, to, .. } => p.fill = Some(from.lerp(*to, v)),
            }
        }

        for (idx, p) in parts {
            let Some(obj) = scene.roots.get_mut(idx) else {
                continue;
            };

            if p.sx.is_some() || p.ty.is_some() {
                let s = p.sx.unwrap_or(1.0);
                let xf_s = Affine2::scale(s, s);
                let xf_t = Affine2::translate(0.0, p.ty.unwrap_or(0.0));
                obj.set_anim_transform(xf_t.mul(xf_s));
            }

            if let Some(fill) = p.fill {
                obj.fill = fill;
            }
            if let Some(a) = p.alpha {
                obj.fill.a = a.clamp(0.0, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Mobject2D;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn ease_in_out_endpoints_and_symmetry() {
        assert!(approx(Ease::InOut.sample(0.0), 0.0));
        assert!(approx(Ease::InOut.sample(1.0), 1.0));
        assert!(approx(Ease::InOut.sample(0.5), 0.5));

        let a = Ease::InOut.sample(0.2);
        let b = Ease::InOut.sample(0.8);
        assert!(approx(a + b, 1.0));
    }

    #[test]
    fn ease_in_out_is_slow_at_the_ends_and_monotonic() {
        assert!(Ease::InOut.sample(0.1) < 0.1);
        assert!(Ease::InOut.sample(0.9) > 0.9);

        let mut prev = 0.0;
        for i in 1..=100 {
            let v = Ease::InOut.sample(i as f32 / 100.0);
            assert!(v >= prev - 1e-6, "not monotonic at {i}");
            prev = v;
        }
    }

    #[test]
    fn ease_clamps_input() {
        assert_eq!(Ease::InOut.sample(-1.0), Ease::InOut.sample(0.0));
        assert!(approx(Ease::Linear.sample(3.0), 1.0));
        assert!(approx(Ease::Linear.sample(0.25), 0.25));
    }

    #[test]
    fn keyframes_hold_outside_range() {
        let track = Track::new_alpha(AnimTarget::Name("x".into())).with_keyframes(vec![
            Keyframe::at(2.0, 1.0),
            Keyframe::at(1.0, 0.0),
        ]);
        assert_eq!(track.sample(0.0), Some(0.0));
        assert!(approx(track.sample(1.5).unwrap_or_default(), 0.5));
        assert_eq!(track.sample(5.0), Some(1.0));
    }

    #[test]
    fn forever_autoreverse_ping_pongs() {
        let track = Track::new_translate_y(AnimTarget::Name("ghost".into()))
            .tween(20.0, -20.0, 2.0, Ease::InOut)
            .starting_at(10.0)
            .repeat(Repeat::Forever { autoreverse: true });

        let at = |t: f64| track.sample(t).unwrap_or(f32::NAN);
        assert!(approx(at(10.0), 20.0));
        assert!(approx(at(11.0), 0.0));
        assert!(approx(at(12.0), -20.0));
        assert!(approx(at(13.0), 0.0));
        assert!(approx(at(14.0), 20.0));
        assert!(approx(at(16.0), -20.0));
        // Before the start the first value holds.
        assert!(approx(at(3.0), 20.0));
    }

    #[test]
    fn forever_without_reverse_wraps() {
        let track = Track::new_alpha(AnimTarget::Name("x".into()))
            .tween(0.0, 1.0, 1.0, Ease::Linear)
            .repeat(Repeat::Forever { autoreverse: false });
        assert!(approx(track.sample(0.25).unwrap_or_default(), 0.25));
        assert!(approx(track.sample(1.25).unwrap_or_default(), 0.25));
    }

    #[test]
    fn forever_track_stays_smooth_after_days() {
        let track = Track::new_alpha(AnimTarget::Name("background".into()))
            .tween(0.0, 1.0, 0.2, Ease::Linear)
            .repeat(Repeat::Forever { autoreverse: true });

        // At 60 fps each frame advances a twelfth of the 0.2 s period, from the first
        // second up to ~11.6 days in.
        for base in [0.0, 86_400.0, 1_000_000.0] {
            for k in 0..6u32 {
                let t = base + f64::from(k) / 60.0;
                let v = track.sample(t).unwrap_or(f32::NAN);
                assert!(approx(v, k as f32 / 12.0), "base {base}, frame {k}: {v}");
            }
        }

        let late = Track::new_alpha(AnimTarget::Name("background".into()))
            .tween(0.0, 1.0, 0.2, Ease::Linear)
            .starting_at(1_000_000.05)
            .repeat(Repeat::Forever { autoreverse: true });
        assert!(approx(late.sample(1_000_000.15).unwrap_or(f32::NAN), 0.5));
        assert!(approx(late.sample(1_000_000.30).unwrap_or(f32::NAN), 0.75));
    }

    #[test]
    fn apply_writes_anim_layer_and_fill() {
        let mut scene = Scene2D::new();
        scene.add_root(
            Mobject2D::new("caption").with_base_transform(Affine2::translate(100.0, 100.0)),
        );
        scene.add_root(Mobject2D::new("background"));

        let mut tl = Timeline::new();
        tl.add_track(
            Track::new_scale(AnimTarget::Name("caption".into())).tween(0.9, 1.1, 1.0, Ease::Linear),
        )
        .add_track(
            Track::new_alpha(AnimTarget::Name("caption".into())).tween(0.0, 1.0, 1.0, Ease::Linear),
        )
        .add_track(
            Track::new_fill(AnimTarget::Name("background".into()), Rgba::RED, Rgba::BLACK)
                .tween(0.0, 1.0, 1.0, Ease::Linear),
        )
        .add_track(Track::new_alpha(AnimTarget::Name("missing".into())));

        tl.apply(&mut scene, 0.5);

        let caption = scene.get("caption").expect("caption");
        assert!(approx(caption.fill.a, 0.5));
        assert!(approx(caption.anim_from_parent.m[0][0], 1.0));
        assert_eq!(caption.local_from_parent.translation(), [100.0, 100.0]);

        let bg = scene.get("background").expect("background");
        assert!(approx(bg.fill.r, 0.5));
        assert_eq!(bg.anim_from_parent, Affine2::IDENTITY);
    }
}
