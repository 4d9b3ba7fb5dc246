use proptest::prelude::*;

use space_ships::compute::{clamp_position, collides};
use space_ships::entities::Rect;

fn on_screen_rect() -> impl Strategy<Value = Rect> {
    (0.0f32..1000.0, 0.0f32..1000.0, 1.0f32..200.0, 1.0f32..200.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn clamp_keeps_ship_on_screen(
        start in -5000.0f32..5000.0,
        delta in -1.0e6f32..1.0e6,
        screen in 50.0f32..2000.0,
        frac in 0.0f32..1.0,
    ) {
        let ship = screen * frac;
        let x = clamp_position(start, delta, screen, ship);
        prop_assert!(x >= 0.0);
        prop_assert!(x <= screen - ship);
    }

    #[test]
    fn collision_is_symmetric(a in on_screen_rect(), b in on_screen_rect()) {
        prop_assert_eq!(collides(&a, &b), collides(&b, &a));
    }

    #[test]
    fn on_screen_overlap_always_collides(a in on_screen_rect(), dx in 0.0f32..1.0, dy in 0.0f32..1.0) {
        // b's corner sits inside a
        let b = Rect::new(a.x + a.width * dx, a.y + a.height * dy, 10.0, 10.0);
        prop_assert!(collides(&a, &b));
    }

    #[test]
    fn above_top_edge_never_collides(a in on_screen_rect(), lift in 0.001f32..500.0) {
        // Same box, pushed partly above the top edge: full spatial overlap.
        let b = Rect::new(a.x, -lift, a.width, a.height + lift);
        prop_assert!(!collides(&a, &b));
        prop_assert!(!collides(&b, &a));
    }
}
