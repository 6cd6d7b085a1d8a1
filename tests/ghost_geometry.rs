//! Outline geometry for concrete rectangles.

use ghostly::ghost::{BoundingRect, PathCommand, ghost_outline};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn eyes(rect: BoundingRect) -> Vec<BoundingRect> {
    ghost_outline(rect)
        .commands()
        .iter()
        .filter_map(|c| match c {
            PathCommand::Ellipse { rect } => Some(*rect),
            _ => None,
        })
        .collect()
}

#[test]
fn reference_rect_150_by_200() {
    let rect = BoundingRect::new(0.0, 0.0, 150.0, 200.0);
    let outline = ghost_outline(rect);
    let cmds = outline.commands();

    match cmds[0] {
        PathCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        } => {
            assert!(approx(center.x, 75.0) && approx(center.y, 80.0));
            assert!(approx(radius, 60.0));
            assert!(approx(start_angle, std::f32::consts::PI));
            assert!(approx(end_angle, 0.0));
            assert!(!clockwise);
        }
        other => panic!("expected the head arc first, got {other:?}"),
    }

    match cmds[1] {
        PathCommand::LineTo(p) => assert!(approx(p.x, 120.0) && approx(p.y, 160.0)),
        other => panic!("expected the right edge, got {other:?}"),
    }

    match cmds[2] {
        PathCommand::QuadTo { control, to } => {
            assert!(approx(control.x, 75.0) && approx(control.y, 220.0));
            assert!(approx(to.x, 30.0) && approx(to.y, 160.0));
        }
        other => panic!("expected the bottom curve, got {other:?}"),
    }

    match cmds[3] {
        PathCommand::LineTo(p) => assert!(approx(p.x, 30.0) && approx(p.y, 80.0)),
        other => panic!("expected the left edge, got {other:?}"),
    }

    let e = eyes(rect);
    assert_eq!(e.len(), 2);
    assert!(approx(e[0].x, 60.0) && approx(e[0].y, 92.5));
    assert!(approx(e[1].x, 78.75) && approx(e[1].y, 92.5));
    for eye in &e {
        assert!(approx(eye.width, 15.0) && approx(eye.height, 15.0));
    }
}

#[test]
fn head_scales_with_the_rect() {
    for (x, y, w, h) in [
        (0.0, 0.0, 10.0, 10.0),
        (5.0, -3.0, 80.0, 40.0),
        (100.0, 200.0, 300.0, 500.0),
    ] {
        let rect = BoundingRect::new(x, y, w, h);
        let PathCommand::Arc { center, radius, .. } = ghost_outline(rect).commands()[0] else {
            panic!("first command is not an arc");
        };
        assert!(approx(radius, 0.4 * w));
        assert!(approx(center.y, y + 0.4 * h));
    }
}

#[test]
fn curve_control_hangs_below_the_rect() {
    for h in [1.0f32, 50.0, 200.0, 999.0] {
        let rect = BoundingRect::new(0.0, 0.0, 120.0, h);
        let PathCommand::QuadTo { control, .. } = ghost_outline(rect).commands()[2] else {
            panic!("third command is not the bottom curve");
        };
        assert!(approx(control.y, 1.1 * rect.max_y()));
        assert!(control.y > rect.max_y());
    }
}

#[test]
fn eyes_are_separate_squares() {
    let e = eyes(BoundingRect::new(0.0, 0.0, 100.0, 100.0));
    // Left eye spans [40, 50], right eye spans [52.5, 62.5].
    assert!(approx(e[0].min_x(), 40.0) && approx(e[0].max_x(), 50.0));
    assert!(approx(e[1].min_x(), 52.5) && approx(e[1].max_x(), 62.5));
    assert!(!e[0].overlaps(&e[1]));

    for eye in &e {
        assert!(approx(eye.width, 10.0));
        assert!(approx(eye.height, 10.0));
    }
}
