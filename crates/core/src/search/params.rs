//! Parameter boxes: products of intervals over the model's dimensions.

use std::ops::Index;

use crate::error::{RastError, Result};
use crate::interval::Interval;

/// How a dimension's convergence tolerance is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// Offsets measured in page units, converged below `delta`.
    Linear,
    /// Slopes and angles, converged below `adelta`.
    Angular,
}

/// Static description of one search dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimension {
    pub kind: DimensionKind,
    /// Multiplier turning the dimension's width into an effective range when
    /// choosing which dimension to bisect. For a slope this is roughly the
    /// horizontal extent over which the slope acts.
    pub split_scale: f64,
}

impl Dimension {
    pub const fn linear() -> Self {
        Self {
            kind: DimensionKind::Linear,
            split_scale: 1.0,
        }
    }

    pub const fn angular(split_scale: f64) -> Self {
        Self {
            kind: DimensionKind::Angular,
            split_scale,
        }
    }
}

/// All models whose parameters lie inside the given intervals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterBox<const K: usize> {
    dims: [Interval; K],
}

impl<const K: usize> ParameterBox<K> {
    pub const fn new(dims: [Interval; K]) -> Self {
        Self { dims }
    }

    pub const fn intervals(&self) -> &[Interval; K] {
        &self.dims
    }

    pub fn width(&self, dim: usize) -> f64 {
        self.dims[dim].width()
    }

    /// Point estimate: the midpoint of every interval.
    pub fn midpoint(&self) -> [f64; K] {
        self.dims.map(Interval::midpoint)
    }

    pub fn contains_point(&self, p: &[f64; K]) -> bool {
        self.dims.iter().zip(p).all(|(i, &v)| i.contains(v))
    }

    /// Whether `other` is a subset of this box along every dimension.
    pub fn encloses(&self, other: &Self) -> bool {
        self.dims.iter().zip(&other.dims).all(|(a, b)| a.encloses(*b))
    }

    /// Halve dimension `dim`, leaving the others untouched.
    pub fn bisect(&self, dim: usize) -> (Self, Self) {
        let (lo, hi) = self.dims[dim].bisect();
        let mut left = *self;
        let mut right = *self;
        left.dims[dim] = lo;
        right.dims[dim] = hi;
        (left, right)
    }

    /// Initial boxes must be finite with positive width in every dimension.
    pub fn validate(&self) -> Result<()> {
        for (i, d) in self.dims.iter().enumerate() {
            if !d.is_valid() {
                return Err(RastError::InvalidInput(format!(
                    "parameter dimension {i} is not a finite interval: [{}, {}]",
                    d.lo, d.hi
                )));
            }
            if d.width() <= 0.0 {
                return Err(RastError::InvalidInput(format!(
                    "parameter dimension {i} has non-positive width"
                )));
            }
        }
        Ok(())
    }
}

impl<const K: usize> Index<usize> for ParameterBox<K> {
    type Output = Interval;

    fn index(&self, dim: usize) -> &Interval {
        &self.dims[dim]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box() -> ParameterBox<3> {
        ParameterBox::new([
            Interval::new(-0.1, 0.1),
            Interval::new(0.0, 200.0),
            Interval::new(0.0, 20.0),
        ])
    }

    #[test]
    fn bisect_only_touches_one_dimension() {
        let p = sample_box();
        let (l, r) = p.bisect(1);
        assert_eq!(l[1], Interval::new(0.0, 100.0));
        assert_eq!(r[1], Interval::new(100.0, 200.0));
        assert_eq!(l[0], p[0]);
        assert_eq!(r[2], p[2]);
        assert!(p.encloses(&l) && p.encloses(&r));
    }

    #[test]
    fn midpoint_is_inside() {
        let p = sample_box();
        let m = p.midpoint();
        assert_eq!(m, [0.0, 100.0, 10.0]);
        assert!(p.contains_point(&m));
    }

    #[test]
    fn validate_rejects_flat_and_nan_dimensions() {
        assert!(sample_box().validate().is_ok());
        let flat = ParameterBox::new([Interval::point(1.0)]);
        assert!(matches!(flat.validate(), Err(RastError::InvalidInput(_))));
        let nan = ParameterBox::new([Interval {
            lo: f64::NAN,
            hi: 1.0,
        }]);
        assert!(matches!(nan.validate(), Err(RastError::InvalidInput(_))));
    }
}
