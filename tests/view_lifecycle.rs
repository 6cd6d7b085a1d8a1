//! Mount / update / unmount behavior of the ghost view, without a window.

use ghostly::font::text::TextMesh;
use ghostly::ghost::view::{BACKGROUND, CAPTION, GHOST};
use ghostly::ghost::{AnimationFlags, GhostConfig, GhostView, Lifecycle};
use ghostly::scene::Mesh2D;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn caption() -> TextMesh {
    TextMesh {
        mesh: Mesh2D::rect([-60.0, -12.0], [120.0, 24.0]),
        advance_width_pt: 120.0,
        ascent_pt: 24.0,
        descent_pt: 8.0,
    }
}

fn view() -> GhostView {
    GhostView::new(GhostConfig::default(), [420.0, 640.0], Some(caption())).expect("view")
}

#[test]
fn mount_toggles_every_flag_once() {
    let mut v = view();
    assert_eq!(v.flags(), AnimationFlags::default());

    assert!(v.mount(1.0));
    let on = AnimationFlags {
        float_up: true,
        flicker_color: true,
        show_text: true,
    };
    assert_eq!(v.flags(), on);
    assert_eq!(v.lifecycle(), Lifecycle::Mounted { at_s: 1.0 });
    let tracks = v.timeline().len();

    // Later mounts change nothing.
    assert!(!v.mount(3.0));
    assert_eq!(v.flags(), on);
    assert_eq!(v.timeline().len(), tracks);
    assert_eq!(v.lifecycle(), Lifecycle::Mounted { at_s: 1.0 });

    // Flags stay set while the animations run.
    for i in 0..50u32 {
        v.update(1.0 + f64::from(i) * 0.37);
        assert_eq!(v.flags(), on);
    }
}

#[test]
fn animations_repeat_and_reverse() {
    let mut v = view();
    v.mount(0.0);

    let ghost_y = |v: &GhostView| {
        v.scene()
            .get(GHOST)
            .map(|g| g.anim_from_parent.translation()[1])
            .expect("ghost")
    };

    v.update(0.0);
    assert!(approx(ghost_y(&v), 20.0));
    v.update(1.0);
    assert!(approx(ghost_y(&v), 0.0));
    v.update(2.0);
    assert!(approx(ghost_y(&v), -20.0));
    v.update(3.0);
    assert!(approx(ghost_y(&v), 0.0));
    v.update(4.0);
    assert!(approx(ghost_y(&v), 20.0));

    // Caption midway through its second (reverse) pass.
    v.update(1.5 + 0.75);
    let c = v.scene().get(CAPTION).expect("caption");
    assert!(approx(c.fill.a, 0.5));
    assert!(approx(c.anim_from_parent.m[0][0], 1.0));
}

#[test]
fn background_flickers_between_red_and_black() {
    let mut v = view();
    v.mount(0.0);

    v.update(0.1);
    let mid = v.scene().get(BACKGROUND).expect("background").fill;
    assert!(approx(mid.r, 0.5));
    assert!(approx(mid.g, 0.0) && approx(mid.b, 0.0));

    v.update(0.3);
    let back = v.scene().get(BACKGROUND).expect("background").fill;
    assert!(approx(back.r, 0.5));
}

#[test]
fn unmount_leaves_nothing_behind() {
    let mut v = view();
    v.mount(0.0);
    v.update(0.5);
    v.unmount();

    assert_eq!(v.lifecycle(), Lifecycle::Unmounted);
    assert!(v.timeline().is_empty());
    assert!(v.scene().is_empty());
    assert!(v.draw_items().is_empty());

    // Everything after unmount is inert.
    v.update(10.0);
    v.resize([100.0, 100.0]);
    v.unmount();
    assert!(!v.mount(11.0));
    assert!(v.draw_items().is_empty());
}

#[test]
fn unmount_before_mount_is_fine() {
    let mut v = view();
    v.unmount();
    assert_eq!(v.lifecycle(), Lifecycle::Unmounted);
    assert!(!v.mount(0.0));
    assert_eq!(v.flags(), AnimationFlags::default());
}

#[test]
fn resize_recenters_the_stack() {
    let mut v = view();
    v.mount(0.0);
    v.update(2.0);

    let ghost = v.scene().get(GHOST).expect("ghost");
    // Stack: 200 + 8 + 32 = 240 tall in a 640 pt window -> top at 200.
    assert_eq!(ghost.base_from_parent.translation(), [135.0, 200.0]);
    let anim = ghost.anim_from_parent;

    v.resize([1000.0, 240.0]);
    let ghost = v.scene().get(GHOST).expect("ghost");
    assert_eq!(ghost.base_from_parent.translation(), [425.0, 0.0]);
    assert_eq!(ghost.anim_from_parent, anim);

    let c = v.scene().get(CAPTION).expect("caption");
    assert_eq!(c.base_from_parent.translation(), [500.0, 224.0]);
}
