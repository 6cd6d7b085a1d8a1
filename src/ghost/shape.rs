//! Ghost silhouette geometry.
//!
//! `ghost_outline` maps a bounding rectangle to an ordered list of drawing commands; it is
//! pure and infallible. `Outline::to_path` turns those commands into a `lyon` path.
//!
//! Coordinates are y-down. Angles are measured from +x toward +y, so with
//! `clockwise == false` an arc sweeps toward increasing angles: 180° -> 360° passes
//! through the top of the circle.

use std::f32::consts::{PI, TAU};

use lyon::geom::Arc;
use lyon::math::{Angle, Point, point, vector};
use lyon::path::Path;
use lyon::path::path::Builder;

/// Layout box the shape is drawn into.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoundingRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingRect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn mid_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn mid_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// True when the two rectangles share interior area.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }
}

/// One drawing command of an `Outline`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    /// Circular arc; angles in radians.
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    },
    LineTo(Point),
    QuadTo {
        control: Point,
        to: Point,
    },
    /// Closed ellipse inscribed in `rect`, always its own sub-path.
    Ellipse {
        rect: BoundingRect,
    },
}

/// Ordered drawing commands describing the ghost: one open body sub-path plus two
/// closed eye ellipses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    commands: Vec<PathCommand>,
}

impl Outline {
    #[inline]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Build a lyon path.
    ///
    /// Sub-path rules:
    /// - an arc begins a sub-path at its start point when none is open, otherwise it
    ///   connects to its start point with a line
    /// - lines and curves extend the open sub-path; without one, a line or curve only
    ///   begins a sub-path at its end point
    /// - an ellipse ends the open sub-path without closing it, then adds its own closed
    ///   sub-path
    /// - whatever is still open at the end is ended open
    pub fn to_path(&self) -> Path {
        let mut b = Path::builder();
        let mut open = false;

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if open {
                        b.end(false);
                    }
                    b.begin(p);
                    open = true;
                }
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                    clockwise,
                } => {
                    let start = center + vector(start_angle.cos(), start_angle.sin()) * radius;
                    if open {
                        b.line_to(start);
                    } else {
                        b.begin(start);
                        open = true;
                    }
                    let arc = Arc {
                        center,
                        radii: vector(radius, radius),
                        start_angle: Angle::radians(start_angle),
                        sweep_angle: Angle::radians(arc_sweep(start_angle, end_angle, clockwise)),
                        x_rotation: Angle::radians(0.0),
                    };
                    arc.for_each_quadratic_bezier(&mut |seg| {
                        b.quadratic_bezier_to(seg.ctrl, seg.to);
                    });
                }
                PathCommand::LineTo(p) => {
                    if open {
                        b.line_to(p);
                    } else {
                        b.begin(p);
                        open = true;
                    }
                }
                PathCommand::QuadTo { control, to } => {
                    if open {
                        b.quadratic_bezier_to(control, to);
                    } else {
                        b.begin(to);
                        open = true;
                    }
                }
                PathCommand::Ellipse { rect } => {
                    if open {
                        b.end(false);
                        open = false;
                    }
                    add_ellipse(&mut b, rect);
                }
            }
        }

        if open {
            b.end(false);
        }
        b.build()
    }
}

/// Signed sweep from `start` to `end`: positive (increasing angle) unless `clockwise`.
fn arc_sweep(start: f32, end: f32, clockwise: bool) -> f32 {
    let delta = (end - start).rem_euclid(TAU);
    if clockwise {
        if delta == 0.0 { 0.0 } else { delta - TAU }
    } else {
        delta
    }
}

/// Closed ellipse as four cubic quadrants, starting at the right-most point and
/// running toward increasing angle.
fn add_ellipse(b: &mut Builder, rect: BoundingRect) {
    // Control-point distance for a quarter circle.
    const KAPPA: f32 = 0.552_284_8;

    let cx = rect.mid_x();
    let cy = rect.mid_y();
    let rx = rect.width * 0.5;
    let ry = rect.height * 0.5;
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;

    b.begin(point(cx + rx, cy));
    b.cubic_bezier_to(point(cx + rx, cy + ky), point(cx + kx, cy + ry), point(cx, cy + ry));
    b.cubic_bezier_to(point(cx - kx, cy + ry), point(cx - rx, cy + ky), point(cx - rx, cy));
    b.cubic_bezier_to(point(cx - rx, cy - ky), point(cx - kx, cy - ry), point(cx, cy - ry));
    b.cubic_bezier_to(point(cx + kx, cy - ry), point(cx + rx, cy - ky), point(cx + rx, cy));
    b.end(true);
}

/// Eye radius as a fraction of the rect width.
const EYE_RADIUS_FRACTION: f32 = 0.05;

/// Generate the ghost outline for a bounding rectangle.
///
/// Zero-sized rects are not special-cased; they produce a degenerate outline.
pub fn ghost_outline(rect: BoundingRect) -> Outline {
    let w = rect.width;
    let h = rect.height;

    let head_center = point(rect.mid_x(), rect.min_y() + h * 0.4);
    let eye_r = w * EYE_RADIUS_FRACTION;
    let eye_d = eye_r * 2.0;

    let commands = vec![
        // Head: upper half circle, left to right over the top.
        PathCommand::Arc {
            center: head_center,
            radius: w * 0.4,
            start_angle: PI,
            end_angle: 0.0,
            clockwise: false,
        },
        // Right edge.
        PathCommand::LineTo(point(rect.max_x() * 0.8, rect.max_y() * 0.8)),
        // Bottom bulges below the rect.
        PathCommand::QuadTo {
            control: point(rect.mid_x(), rect.max_y() * 1.1),
            to: point(rect.max_x() * 0.2, rect.max_y() * 0.8),
        },
        // Left edge, stopping short of the arc start.
        PathCommand::LineTo(point(rect.min_x() + w * 0.2, rect.min_y() + h * 0.4)),
        PathCommand::Ellipse {
            rect: BoundingRect::new(rect.mid_x() - eye_d, rect.mid_y() - eye_r, eye_d, eye_d),
        },
        PathCommand::Ellipse {
            rect: BoundingRect::new(
                rect.mid_x() + eye_r * 0.5,
                rect.mid_y() - eye_r,
                eye_d,
                eye_d,
            ),
        },
    ];

    Outline { commands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::path::PathEvent;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn sweep_direction() {
        assert!(approx(arc_sweep(PI, 0.0, false), PI));
        assert!(approx(arc_sweep(PI, 0.0, true), -PI));
        assert!(approx(arc_sweep(0.0, PI * 0.5, false), PI * 0.5));
        assert!(approx(arc_sweep(0.0, PI * 0.5, true), -PI * 1.5));
    }

    #[test]
    fn head_arc_passes_through_top() {
        let rect = BoundingRect::new(0.0, 0.0, 150.0, 200.0);
        let path = ghost_outline(rect).to_path();

        // The lowest y reached is the top of the head circle: 80 - 60 = 20.
        let mut min_y = f32::INFINITY;
        for ev in path.iter() {
            if let PathEvent::Quadratic { from, ctrl, to } = ev {
                for i in 0..=16 {
                    let t = i as f32 / 16.0;
                    let mt = 1.0 - t;
                    let y = mt * mt * from.y + 2.0 * mt * t * ctrl.y + t * t * to.y;
                    min_y = min_y.min(y);
                }
            }
        }
        assert!((min_y - 20.0).abs() < 0.2, "min_y = {min_y}");
    }

    #[test]
    fn body_stays_open_and_eyes_close() {
        let path = ghost_outline(BoundingRect::new(0.0, 0.0, 100.0, 100.0)).to_path();

        let ends: Vec<bool> = path
            .iter()
            .filter_map(|ev| match ev {
                PathEvent::End { close, .. } => Some(close),
                _ => None,
            })
            .collect();
        assert_eq!(ends, vec![false, true, true]);
    }

    #[test]
    fn body_starts_at_arc_start() {
        let path = ghost_outline(BoundingRect::new(0.0, 0.0, 150.0, 200.0)).to_path();
        let first = path.iter().next();
        match first {
            Some(PathEvent::Begin { at }) => {
                assert!(approx(at.x, 15.0));
                assert!(approx(at.y, 80.0));
            }
            other => panic!("unexpected first event: {other:?}"),
        }
    }

    #[test]
    fn curve_without_current_point_starts_at_its_end() {
        let outline = Outline {
            commands: vec![
                PathCommand::QuadTo {
                    control: point(5.0, 50.0),
                    to: point(10.0, 0.0),
                },
                PathCommand::LineTo(point(20.0, 0.0)),
            ],
        };
        let events: Vec<PathEvent> = outline.to_path().iter().collect();
        assert!(matches!(events[0], PathEvent::Begin { at } if at == point(10.0, 0.0)));
        assert!(matches!(events[1], PathEvent::Line { to, .. } if to == point(20.0, 0.0)));
        assert!(matches!(events[2], PathEvent::End { close: false, .. }));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn move_to_ends_the_open_sub_path() {
        let outline = Outline {
            commands: vec![
                PathCommand::LineTo(point(0.0, 0.0)),
                PathCommand::LineTo(point(10.0, 0.0)),
                PathCommand::MoveTo(point(0.0, 10.0)),
                PathCommand::QuadTo {
                    control: point(5.0, 20.0),
                    to: point(10.0, 10.0),
                },
            ],
        };
        let path = outline.to_path();
        let begins: Vec<Point> = path
            .iter()
            .filter_map(|ev| match ev {
                PathEvent::Begin { at } => Some(at),
                _ => None,
            })
            .collect();
        assert_eq!(begins, vec![point(0.0, 0.0), point(0.0, 10.0)]);
        assert!(
            path.iter()
                .any(|ev| matches!(ev, PathEvent::Quadratic { ctrl, .. } if ctrl == point(5.0, 20.0)))
        );
    }

    #[test]
    fn zero_rect_is_degenerate_not_fatal() {
        let outline = ghost_outline(BoundingRect::default());
        assert_eq!(outline.commands().len(), 6);
        let path = outline.to_path();
        assert!(path.iter().count() > 0);
    }

    #[test]
    fn eyes_do_not_overlap() {
        for w in [1.0f32, 37.0, 100.0, 150.0, 640.0] {
            let outline = ghost_outline(BoundingRect::new(3.0, 7.0, w, w * 1.3));
            let eyes: Vec<BoundingRect> = outline
                .commands()
                .iter()
                .filter_map(|c| match c {
                    PathCommand::Ellipse { rect } => Some(*rect),
                    _ => None,
                })
                .collect();
            assert_eq!(eyes.len(), 2);
            assert!(!eyes[0].overlaps(&eyes[1]), "eyes overlap for w = {w}");
        }
    }
}
