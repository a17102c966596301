//! Integration tests: client pixels → image pixels → normalized boxes.
//!
//! Exercises the full `bt-core` geometry pipeline the editor relies on.

use bt_core::coords::{ContainerRect, CoordinateMapper, NaturalSize, normalize, normalize_rect};
use bt_core::model::{BoundingBox, PixelRect};

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn downscaled() -> CoordinateMapper {
    // 1000×500 image shown at 500×250 with the container at (50, 10).
    CoordinateMapper::new(
        ContainerRect {
            left: 50.0,
            top: 10.0,
            width: 500.0,
            height: 250.0,
        },
        NaturalSize::new(1000.0, 500.0),
    )
}

// ─── Scenario from the product walkthrough ──────────────────────────────

#[test]
fn downscaled_drag_produces_expected_box() {
    let m = downscaled();
    let (ax, ay) = m.to_image_space(100.0, 60.0).unwrap();
    let (bx, by) = m.to_image_space(300.0, 160.0).unwrap();
    assert_eq!((ax, ay), (100.0, 100.0));
    assert_eq!((bx, by), (500.0, 300.0));

    let rect = PixelRect::from_corners(ax, ay, bx, by);
    let b = m.normalize_rect(&rect);
    assert!(approx(b.x, 0.1), "x={}", b.x);
    assert!(approx(b.y, 0.2), "y={}", b.y);
    assert!(approx(b.w, 0.4), "w={}", b.w);
    assert!(approx(b.h, 0.4), "h={}", b.h);
    assert!(b.is_finalized());
}

// ─── Round-trip property ────────────────────────────────────────────────

#[test]
fn normalized_box_matches_corner_formula_in_every_direction() {
    let natural = NaturalSize::new(640.0, 480.0);
    let drags = [
        ((10.0, 20.0), (200.0, 300.0)),
        ((200.0, 300.0), (10.0, 20.0)),
        ((600.0, 10.0), (40.0, 470.0)),
        ((0.0, 0.0), (640.0, 480.0)),
        ((320.0, 240.0), (321.0, 241.0)),
    ];

    for ((ax, ay), (bx, by)) in drags {
        let rect = PixelRect::from_corners(ax, ay, bx, by);
        let b = normalize_rect(&rect, natural);

        let expected = BoundingBox::new(
            normalize(f64::min(ax, bx), natural.width),
            normalize(f64::min(ay, by), natural.height),
            normalize((bx - ax).abs(), natural.width),
            normalize((by - ay).abs(), natural.height),
        );
        assert!(approx(b.x, expected.x), "{ax},{ay} → {bx},{by}: x");
        assert!(approx(b.y, expected.y), "{ax},{ay} → {bx},{by}: y");
        assert!(approx(b.w, expected.w), "{ax},{ay} → {bx},{by}: w");
        assert!(approx(b.h, expected.h), "{ax},{ay} → {bx},{by}: h");
        assert!(b.is_finalized());
    }
}

#[test]
fn overlay_rect_follows_container_resize() {
    let mut m = downscaled();
    let b = BoundingBox::new(0.1, 0.2, 0.4, 0.4);

    let before = m.to_overlay_rect(&b);
    m.set_container(ContainerRect {
        left: 0.0,
        top: 0.0,
        width: 1000.0,
        height: 500.0,
    });
    let after = m.to_overlay_rect(&b);

    // Same normalized box, twice the on-screen size after a 2× zoom.
    assert!(approx(after.w, before.w * 2.0));
    assert!(approx(after.h, before.h * 2.0));
    assert!(approx(after.x, 100.0));
    assert!(approx(after.y, 100.0));
}

#[test]
fn drag_outside_the_image_is_clamped() {
    let m = downscaled();
    // Container spans client x 50..550; go past both edges.
    let (ax, ay) = m.to_image_space(20.0, 0.0).unwrap();
    let (bx, by) = m.to_image_space(700.0, 400.0).unwrap();
    let b = m.normalize_rect(&PixelRect::from_corners(ax, ay, bx, by));
    assert_eq!(b, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
}
