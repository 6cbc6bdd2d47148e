use std::f64::consts::TAU;

use super::{EDGE_EPSILON, POINTER_ANGLE};

/// Normalize an angle to the half-open range [0, 2π), handling negative inputs.
pub fn normalize_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

/// Angular width of one wedge on a wheel with `n` segments.
pub fn segment_step(n: usize) -> f64 {
    TAU / n as f64
}

/// Wheel-local center angle of segment `index`, with segment 0 starting at the
/// pointer offset and segments proceeding clockwise.
pub fn segment_center(index: usize, n: usize) -> f64 {
    POINTER_ANGLE + (index as f64 + 0.5) * segment_step(n)
}

/// The segment whose wheel-local range currently sits under the fixed pointer.
///
/// Inverse of the end-rotation construction in the spin engine: a wheel rotated
/// to put `segment_center(i, n)` under the pointer maps back to `i`. The epsilon
/// nudge keeps exact wedge edges from flickering between neighbours.
pub fn segment_at_pointer(n: usize, rotation: f64) -> usize {
    debug_assert!(n > 0, "segment_at_pointer on an empty wheel");
    let local = normalize_angle(-rotation);
    let index = ((local + EDGE_EPSILON) / segment_step(n)) as usize;
    index % n
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn normalize_maps_into_unit_circle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(-0.0), 0.0);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((normalize_angle(-FRAC_PI_2) - (TAU - FRAC_PI_2)).abs() < 1e-12);
        let r = normalize_angle(-1e-300);
        assert!((0.0..TAU).contains(&r));
    }

    #[test]
    fn pointer_index_always_in_range() {
        for n in 1..=64 {
            for step in 0..200 {
                let rotation = step as f64 * 0.137 - 13.0;
                assert!(segment_at_pointer(n, rotation) < n);
            }
        }
    }

    #[test]
    fn pointer_agrees_with_center_for_every_segment() {
        for n in 1..=64 {
            for target in 0..n {
                let rotation = normalize_angle(POINTER_ANGLE - segment_center(target, n));
                assert_eq!(segment_at_pointer(n, rotation), target, "n={n}");
            }
        }
    }

    #[test]
    fn exact_wedge_edges_do_not_flicker() {
        // rotation 0 puts the pointer exactly on segment 0's leading edge
        assert_eq!(segment_at_pointer(12, 0.0), 0);
        assert_eq!(segment_at_pointer(12, TAU), 0);
        // rotating backwards by one full wedge brings segment 1 under the pointer
        assert_eq!(segment_at_pointer(12, -TAU / 12.0), 1);
    }

    #[test]
    fn single_segment_wheel_always_points_at_zero() {
        for step in 0..50 {
            assert_eq!(segment_at_pointer(1, step as f64 * 0.31), 0);
        }
    }
}
