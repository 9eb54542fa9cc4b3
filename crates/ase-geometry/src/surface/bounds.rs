//! Interval-arithmetic box bounds shared by the curved surfaces.

use ase_math::{Aabb3, Interval, Point3, Vector3};

/// Box containing `origin + sum(s_i * dir_i)` for every `s_i` in its interval.
pub(crate) fn interval_box(origin: Point3, terms: &[(Interval, Vector3)]) -> Aabb3 {
    let mut lo = origin;
    let mut hi = origin;
    for (scalar, dir) in terms {
        for k in 0..3 {
            let c = *scalar * dir[k];
            lo[k] += c.lo;
            hi[k] += c.hi;
        }
    }
    Aabb3::new(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ase_math::DVec3;

    #[test]
    fn test_unit_circle_box() {
        let full = Interval::new(-1.0, 1.0);
        let b = interval_box(DVec3::new(1.0, 0.0, 0.0), &[(full, DVec3::X), (full, DVec3::Y)]);
        assert_eq!(b.min, DVec3::new(0.0, -1.0, 0.0));
        assert_eq!(b.max, DVec3::new(2.0, 1.0, 0.0));
    }
}
