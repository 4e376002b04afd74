//! Property-based invariant tests for the rectangles used by anchoring and
//! hit testing.
//!
//! 1. Intersection is commutative and fits inside both inputs.
//! 2. A cell is in the intersection exactly when it is in both inputs.
//! 3. `shrink` never grows a rectangle and stays inside it.
//! 4. `row` yields a one-row slice inside the rectangle.
//! 5. No panics on extreme u16 values.

use lookup_core::geometry::Rect;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (any::<u16>(), any::<u16>(), any::<u16>(), any::<u16>())
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn screen_rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=300, 0u16..=100, 0u16..=300, 0u16..=100).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn encloses(outer: &Rect, inner: &Rect) -> bool {
    inner.x >= outer.x
        && inner.y >= outer.y
        && inner.right() <= outer.right()
        && inner.bottom() <= outer.bottom()
}

// ═════════════════════════════════════════════════════════════════════════
// Intersection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn intersection_commutative(a in screen_rect_strategy(), b in screen_rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_fits_within_both(a in screen_rect_strategy(), b in screen_rect_strategy()) {
        let i = a.intersection(&b);
        if !i.is_empty() {
            prop_assert!(encloses(&a, &i), "a={:?} i={:?}", a, i);
            prop_assert!(encloses(&b, &i), "b={:?} i={:?}", b, i);
        }
    }

    #[test]
    fn hit_test_agrees_with_intersection(
        a in screen_rect_strategy(),
        b in screen_rect_strategy(),
        px in 0u16..=600,
        py in 0u16..=200,
    ) {
        let both = a.contains(px, py) && b.contains(px, py);
        prop_assert_eq!(both, a.intersection(&b).contains(px, py));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Shrink / row
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shrink_stays_inside(r in screen_rect_strategy(), n in 0u16..=60) {
        let body = r.shrink(n);
        prop_assert!(body.width <= r.width);
        prop_assert!(body.height <= r.height);
        if !body.is_empty() {
            prop_assert!(encloses(&r, &body));
        }
    }

    #[test]
    fn row_is_single_line_inside(r in screen_rect_strategy(), offset in 0u16..=200) {
        match r.row(offset) {
            Some(row) => {
                prop_assert!(offset < r.height);
                prop_assert_eq!(row.height, 1);
                prop_assert_eq!(row.width, r.width);
                prop_assert!(encloses(&r, &row));
            }
            None => prop_assert!(offset >= r.height),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Extremes
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_panic_on_extremes(a in rect_strategy(), b in rect_strategy(), px in any::<u16>(), py in any::<u16>()) {
        let _ = a.intersection(&b);
        let _ = a.contains(px, py);
        let _ = a.shrink(u16::MAX);
        let _ = a.row(u16::MAX);
        prop_assert!(a.right() >= a.x);
        prop_assert!(a.bottom() >= a.y);
    }
}
