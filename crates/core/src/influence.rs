//! Influence functions: distance to a hypothesis mapped into a bounded vote.
//!
//! Both functions peak at 1 for zero distance, fall off monotonically in
//! `|d|` and vanish outside the tolerance band `[-epsilon, epsilon]`. Because
//! they only depend on `|d|` and never increase with it, their range over an
//! interval of distances follows from the extremes of `|d|`.

use crate::interval::Interval;

/// Falloff policy for a candidate's contribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InfluenceKind {
    /// Truncated quadratic, `1 - (d/eps)^2`. Least-squares flavoured.
    LeastSquares,
    /// Linear tent, `1 - |d|/eps`. Bounded slope, less sensitive to outliers.
    #[default]
    Robust,
}

impl InfluenceKind {
    /// Point evaluation for a non-negative distance magnitude. Returns the
    /// upper end of the enclosure, so it never undercuts a box bound.
    #[inline]
    pub fn at(self, abs_d: f64, epsilon: f64) -> f64 {
        influence(self, Interval::point(abs_d), epsilon).hi
    }
}

/// Interval bound on the influence of a candidate at signed distance `d`.
///
/// Wide distance intervals produce the widest sound result: the upper end is
/// taken at the point of `d` closest to zero, the lower end at the farthest.
pub fn influence(kind: InfluenceKind, d: Interval, epsilon: f64) -> Interval {
    let r = d.abs() * Interval::point(epsilon).recip_positive();
    let v = match kind {
        InfluenceKind::LeastSquares => 1.0 - r.sqr(),
        InfluenceKind::Robust => 1.0 - r,
    };
    Interval {
        lo: v.lo.clamp(0.0, 1.0),
        hi: v.hi.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_at_zero_distance() {
        for kind in [InfluenceKind::LeastSquares, InfluenceKind::Robust] {
            assert_eq!(influence(kind, Interval::point(0.0), 2.0), Interval::point(1.0));
        }
    }

    #[test]
    fn zero_outside_band() {
        for kind in [InfluenceKind::LeastSquares, InfluenceKind::Robust] {
            assert_eq!(influence(kind, Interval::new(2.0, 9.0), 2.0), Interval::ZERO);
            assert_eq!(influence(kind, Interval::new(-9.0, -2.5), 2.0), Interval::ZERO);
        }
    }

    #[test]
    fn wide_interval_spans_extremes() {
        let b = influence(InfluenceKind::Robust, Interval::new(-1.0, 3.0), 2.0);
        assert_eq!(b, Interval::new(0.0, 1.0));

        let b = influence(InfluenceKind::LeastSquares, Interval::new(0.5, 1.0), 2.0);
        assert!((b.hi - 0.9375).abs() < 1e-12);
        assert!((b.lo - 0.75).abs() < 1e-12);
    }

    #[test]
    fn interval_bound_contains_point_values() {
        let d = Interval::new(-0.7, 1.6);
        for kind in [InfluenceKind::LeastSquares, InfluenceKind::Robust] {
            let b = influence(kind, d, 2.0);
            for i in 0..=20 {
                let x = d.lo + d.width() * f64::from(i) / 20.0;
                let v = influence(kind, Interval::point(x), 2.0);
                assert!(b.encloses(v), "{kind:?}: {v:?} not in {b:?}");
            }
        }
    }

    #[test]
    fn least_squares_is_flatter_near_zero() {
        let ls = InfluenceKind::LeastSquares.at(0.5, 2.0);
        let r = InfluenceKind::Robust.at(0.5, 2.0);
        assert!(ls > r);
    }
}
