//! Closed-interval arithmetic.
//!
//! Every operation returns an interval that contains the result of the same
//! operation applied to any pair of reals drawn from the operands. The search
//! engine relies on this to turn per-candidate distance ranges into quality
//! bounds that never underestimate what a parameter box can achieve.
//!
//! Endpoints are rounded outward. Each primitive recovers the exact rounding
//! error of its float result (TwoSum for addition, a fused multiply-add for
//! products, squares, roots and reciprocals) and steps the endpoint one ulp
//! only when the float result fell on the wrong side. Exact results stay
//! exact.

use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

/// A closed interval [lo, hi] representing a range of possible values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    /// Lower bound
    pub lo: f64,
    /// Upper bound
    pub hi: f64,
}

/// Rounding error of `s = a + b`: the exact sum is `s + err`.
#[inline(always)]
fn sum_err(a: f64, b: f64, s: f64) -> f64 {
    let bb = s - a;
    (a - (s - bb)) + (b - bb)
}

#[inline(always)]
fn add_down(a: f64, b: f64) -> f64 {
    let s = a + b;
    if sum_err(a, b, s) < 0.0 { s.next_down() } else { s }
}

#[inline(always)]
fn add_up(a: f64, b: f64) -> f64 {
    let s = a + b;
    if sum_err(a, b, s) > 0.0 { s.next_up() } else { s }
}

#[inline(always)]
fn mul_down(a: f64, b: f64) -> f64 {
    let p = a * b;
    if a.mul_add(b, -p) < 0.0 { p.next_down() } else { p }
}

#[inline(always)]
fn mul_up(a: f64, b: f64) -> f64 {
    let p = a * b;
    if a.mul_add(b, -p) > 0.0 { p.next_up() } else { p }
}

/// Square root of a non-negative value, rounded toward `-inf` or `+inf`.
#[inline(always)]
fn sqrt_dir(x: f64, up: bool) -> f64 {
    let r = x.sqrt();
    let err = r.mul_add(r, -x);
    match (up, err) {
        (false, e) if e > 0.0 => r.next_down().max(0.0),
        (true, e) if e < 0.0 => r.next_up(),
        _ => r,
    }
}

/// `1 / x` for positive `x`, rounded toward `-inf` or `+inf`.
#[inline(always)]
fn recip_dir(x: f64, up: bool) -> f64 {
    let r = 1.0 / x;
    let err = r.mul_add(x, -1.0);
    match (up, err) {
        (false, e) if e > 0.0 => r.next_down(),
        (true, e) if e < 0.0 => r.next_up(),
        _ => r,
    }
}

impl Interval {
    /// Zero interval
    pub const ZERO: Self = Self { lo: 0.0, hi: 0.0 };

    /// Create a new interval
    #[inline(always)]
    pub fn new(lo: f64, hi: f64) -> Self {
        debug_assert!(lo <= hi, "lo ({}) > hi ({})", lo, hi);
        Self { lo, hi }
    }

    /// Create a point interval [v, v]
    #[inline(always)]
    pub const fn point(v: f64) -> Self {
        Self { lo: v, hi: v }
    }

    /// Interval spanning two values given in any order
    #[inline(always)]
    pub fn spanning(a: f64, b: f64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    #[inline(always)]
    pub fn width(self) -> f64 {
        self.hi - self.lo
    }

    #[inline(always)]
    pub fn midpoint(self) -> f64 {
        self.lo + (self.hi - self.lo) / 2.0
    }

    #[inline(always)]
    pub fn is_point(self) -> bool {
        self.width() == 0.0
    }

    /// Both endpoints are finite and ordered.
    pub fn is_valid(self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo <= self.hi
    }

    #[inline(always)]
    pub fn contains(self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    /// Whether `other` lies entirely inside this interval.
    #[inline(always)]
    pub fn encloses(self, other: Self) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    /// Split at the midpoint. The halves share the midpoint and cover `self`.
    pub fn bisect(self) -> (Self, Self) {
        let mid = self.midpoint();
        (Self { lo: self.lo, hi: mid }, Self { lo: mid, hi: self.hi })
    }

    /// Smallest interval containing both operands.
    #[inline(always)]
    pub fn hull(self, other: Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// Absolute value of an interval
    #[inline(always)]
    pub fn abs(self) -> Self {
        if self.lo >= 0.0 {
            self
        } else if self.hi <= 0.0 {
            Self {
                lo: -self.hi,
                hi: -self.lo,
            }
        } else {
            Self {
                lo: 0.0,
                hi: self.hi.max(-self.lo),
            }
        }
    }

    /// Square of an interval
    #[inline(always)]
    pub fn sqr(self) -> Self {
        if self.lo >= 0.0 {
            Self {
                lo: mul_down(self.lo, self.lo),
                hi: mul_up(self.hi, self.hi),
            }
        } else if self.hi <= 0.0 {
            Self {
                lo: mul_down(self.hi, self.hi),
                hi: mul_up(self.lo, self.lo),
            }
        } else {
            Self {
                lo: 0.0,
                hi: mul_up(self.lo, self.lo).max(mul_up(self.hi, self.hi)),
            }
        }
    }

    /// Square root (clamped to non-negative)
    #[inline(always)]
    pub fn sqrt(self) -> Self {
        Self {
            lo: sqrt_dir(self.lo.max(0.0), false),
            hi: sqrt_dir(self.hi.max(0.0), true),
        }
    }

    /// Reciprocal of a strictly positive interval.
    #[inline(always)]
    pub fn recip_positive(self) -> Self {
        debug_assert!(self.lo > 0.0, "reciprocal of non-positive interval");
        Self {
            lo: recip_dir(self.hi, false),
            hi: recip_dir(self.lo, true),
        }
    }

    /// Pointwise maximum: bounds `max(a, b)` for `a` in self, `b` in other.
    #[inline(always)]
    pub fn max(self, other: Self) -> Self {
        Self {
            lo: self.lo.max(other.lo),
            hi: self.hi.max(other.hi),
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Interval {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            lo: add_down(self.lo, rhs.lo),
            hi: add_up(self.hi, rhs.hi),
        }
    }
}

impl Add<f64> for Interval {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: f64) -> Self {
        Self {
            lo: add_down(self.lo, rhs),
            hi: add_up(self.hi, rhs),
        }
    }
}

impl Sub for Interval {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self {
            lo: add_down(self.lo, -rhs.hi),
            hi: add_up(self.hi, -rhs.lo),
        }
    }
}

impl Sub<Interval> for f64 {
    type Output = Interval;
    #[inline(always)]
    fn sub(self, rhs: Interval) -> Interval {
        Interval {
            lo: add_down(self, -rhs.hi),
            hi: add_up(self, -rhs.lo),
        }
    }
}

impl Mul for Interval {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        let pairs = [
            (self.lo, rhs.lo),
            (self.lo, rhs.hi),
            (self.hi, rhs.lo),
            (self.hi, rhs.hi),
        ];
        pairs.iter().fold(
            Self {
                lo: f64::INFINITY,
                hi: f64::NEG_INFINITY,
            },
            |acc, &(x, y)| Self {
                lo: acc.lo.min(mul_down(x, y)),
                hi: acc.hi.max(mul_up(x, y)),
            },
        )
    }
}

impl Mul<f64> for Interval {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: f64) -> Self {
        if rhs >= 0.0 {
            Self {
                lo: mul_down(self.lo, rhs),
                hi: mul_up(self.hi, rhs),
            }
        } else {
            Self {
                lo: mul_down(self.hi, rhs),
                hi: mul_up(self.lo, rhs),
            }
        }
    }
}

impl Neg for Interval {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            lo: -self.hi,
            hi: -self.lo,
        }
    }
}

impl Sum for Interval {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
