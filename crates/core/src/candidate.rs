//! Candidate boxes: the connected components a search explains.

use crate::geometry::{HasBBox, Rect};

/// Stable index of a candidate within one extraction call.
pub type CandidateId = u32;

/// One connected component from the page, reduced to its bounding box.
///
/// The weight is the component's vote in quality sums. It defaults to one so
/// that quality thresholds read as "number of characters on the line".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub bbox: Rect,
    pub weight: f64,
}

impl Candidate {
    pub const fn new(bbox: Rect) -> Self {
        Self { bbox, weight: 1.0 }
    }

    pub const fn with_weight(bbox: Rect, weight: f64) -> Self {
        Self { bbox, weight }
    }

    /// Zero-area, inverted or non-finite boxes cannot anchor any hypothesis.
    pub fn is_degenerate(&self) -> bool {
        let (x0, y0, x1, y1) = self.bbox;
        !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
            || !(self.weight.is_finite() && self.weight > 0.0)
    }
}

impl HasBBox for Candidate {
    fn x0(&self) -> f64 {
        self.bbox.0
    }

    fn y0(&self) -> f64 {
        self.bbox.1
    }

    fn x1(&self) -> f64 {
        self.bbox.2
    }

    fn y1(&self) -> f64 {
        self.bbox.3
    }
}

/// Horizontal extent spanned by a set of candidates.
pub fn horizontal_extent(candidates: &[Candidate], ids: &[CandidateId]) -> f64 {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &id in ids {
        let c = &candidates[id as usize];
        lo = lo.min(c.x0());
        hi = hi.max(c.x1());
    }
    if hi > lo { hi - lo } else { 0.0 }
}
