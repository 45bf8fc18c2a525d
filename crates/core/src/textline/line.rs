//! Text lines produced by the constrained line search.

use std::fmt;

use crate::candidate::CandidateId;
use crate::geometry::{HasBBox, Rect};

/// A line hypothesis accepted by the search.
///
/// The baseline is `y = m*x + c` and the descender line runs `d` below it.
/// `matches` lists the candidates attributed exclusively to this line.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub m: f64,
    pub c: f64,
    pub d: f64,
    pub xheight: f64,
    /// Union of the attributed boxes.
    pub bbox: Rect,
    /// Sum of the attributed boxes' weighted contributions at (m, c, d).
    pub quality: f64,
    pub matches: Vec<CandidateId>,
}

impl TextLine {
    pub fn baseline_at(&self, x: f64) -> f64 {
        self.m * x + self.c
    }

    pub fn descender_at(&self, x: f64) -> f64 {
        self.baseline_at(x) - self.d
    }

    /// Skew angle of the baseline in radians.
    pub fn angle(&self) -> f64 {
        self.m.atan()
    }

    /// Translate match ids through `ids`, where `ids[local]` is the caller's id.
    pub(crate) fn remap(&mut self, ids: &[CandidateId]) {
        for id in &mut self.matches {
            *id = ids[*id as usize];
        }
    }
}

impl HasBBox for TextLine {
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

impl fmt::Display for TextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x0, y0, x1, y1) = self.bbox;
        write!(
            f,
            "{x0:.0} {y0:.0} {x1:.0} {y1:.0} {:.3} {:.6} {:.2} {:.0}",
            self.c, self.m, self.d, self.xheight
        )
    }
}
