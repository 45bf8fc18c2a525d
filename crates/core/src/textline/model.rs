//! The constrained text-line model plugged into the search engine.
//!
//! A hypothesis is a baseline `y = m*x + c` together with a descender line
//! `d` below it. A box votes for the hypothesis when the bottom center of the
//! box lies near the baseline, or near the descender line while the box still
//! reaches above the baseline. Votes are bounded with interval arithmetic over
//! the whole parameter box, so a box that is out of the band everywhere in
//! the box is dropped from the state's matches.

use itertools::Itertools;
use tracing::trace;

use crate::candidate::{Candidate, CandidateId, horizontal_extent};
use crate::geometry::{HasBBox, Rect, bbox_union, coverage_fraction};
use crate::influence::influence;
use crate::interval::Interval;
use crate::search::{Bound, Dimension, ParameterBox, SearchConfig, SearchProblem, SearchState};
use crate::textline::charstats::mode_rounded;
use crate::textline::line::TextLine;
use crate::textline::params::TextLineParams;

/// Index of the slope in a text-line parameter box.
pub const SLOPE: usize = 0;
/// Index of the baseline intercept.
pub const INTERCEPT: usize = 1;
/// Index of the descender offset.
pub const DESCENDER: usize = 2;

/// Per-box vote split by the line it was cast through.
#[derive(Clone, Copy, Debug)]
struct Vote {
    baseline: Interval,
    descender: Interval,
}

impl Vote {
    fn total(self) -> Interval {
        self.baseline.max(self.descender)
    }
}

/// Search problem for one extraction call over a fixed candidate set.
pub struct TextLineModel<'a> {
    candidates: &'a [Candidate],
    params: &'a TextLineParams,
    config: SearchConfig,
    page_xheight: f64,
    slope_scale: f64,
    claimed: Vec<bool>,
}

impl<'a> TextLineModel<'a> {
    pub fn new(
        candidates: &'a [Candidate],
        params: &'a TextLineParams,
        config: SearchConfig,
        page_xheight: f64,
    ) -> Self {
        // A slope error of dm moves the baseline by up to dm * |x|
        let reach = candidates
            .iter()
            .map(|c| c.x0().abs().max(c.x1().abs()))
            .fold(1.0, f64::max);
        Self {
            candidates,
            params,
            config,
            page_xheight,
            slope_scale: reach * params.split_scale[SLOPE],
            claimed: vec![false; candidates.len()],
        }
    }

    /// Whether a candidate has been attributed to an accepted line.
    pub fn is_claimed(&self, id: CandidateId) -> bool {
        self.claimed[id as usize]
    }

    /// True quality of the concrete line `(m, c, d)` over `ids`.
    pub fn quality_at(&self, point: [f64; 3], ids: &[CandidateId]) -> f64 {
        let [m, c, d] = point.map(Interval::point);
        let norm = normalizer(m);
        ids.iter()
            .filter(|&&id| !self.is_claimed(id))
            .map(|&id| {
                let cand = &self.candidates[id as usize];
                self.vote(cand, m, c, d, norm).total().hi * cand.weight
            })
            .sum()
    }

    fn vote(
        &self,
        cand: &Candidate,
        m: Interval,
        c: Interval,
        d: Interval,
        norm: Interval,
    ) -> Vote {
        let p = self.params;
        let (x, y) = cand.bottom_center();
        let baseline = m * x + c;
        let residual = y - baseline;
        let on_baseline = influence(p.influence, residual * norm, p.epsilon);

        // A descender must still cross the baseline
        let top = cand.y1();
        let descender = if top > baseline.lo {
            let v = influence(p.influence, (residual + d) * norm, p.epsilon) * p.descender_weight;
            if top > baseline.hi {
                v
            } else {
                Interval::new(0.0, v.hi)
            }
        } else {
            Interval::ZERO
        };
        Vote {
            baseline: on_baseline,
            descender,
        }
    }

    /// Anchors split at horizontal gaps wider than `min_gap`; the heaviest
    /// run survives (the leftmost one on ties).
    fn heaviest_run(&self, anchors: Vec<CandidateId>) -> Vec<CandidateId> {
        let sorted: Vec<CandidateId> = anchors
            .into_iter()
            .sorted_by(|&a, &b| {
                let (ca, cb) = (&self.candidates[a as usize], &self.candidates[b as usize]);
                ca.x0().total_cmp(&cb.x0()).then(a.cmp(&b))
            })
            .collect();
        let Some(max_gap) = self.params.min_gap else {
            return sorted;
        };

        let mut runs: Vec<(f64, Vec<CandidateId>)> = Vec::new();
        let mut right = f64::NEG_INFINITY;
        for id in sorted {
            let cand = &self.candidates[id as usize];
            match runs.last_mut() {
                Some((weight, run)) if cand.x0() - right <= max_gap => {
                    *weight += cand.weight;
                    run.push(id);
                }
                _ => runs.push((cand.weight, vec![id])),
            }
            right = right.max(cand.x1());
        }
        runs.into_iter()
            .fold(None::<(f64, Vec<CandidateId>)>, |best, run| match best {
                Some(b) if b.0 >= run.0 => Some(b),
                _ => Some(run),
            })
            .map(|(_, run)| run)
            .unwrap_or_default()
    }

    /// Area a box must mostly fall into to be attributed to the line.
    fn line_region(&self, anchors: &[CandidateId], m: f64, c: f64, d: f64, xheight: f64) -> Rect {
        let (x0, x1) = anchors.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &id| {
            let cand = &self.candidates[id as usize];
            (lo.min(cand.x0()), hi.max(cand.x1()))
        });
        let b = Interval::spanning(m * x0 + c, m * x1 + c);
        (
            x0,
            b.lo - d - self.params.epsilon,
            x1,
            b.hi + self.params.line_height_ratio * xheight,
        )
    }
}

/// `1 / sqrt(1 + m^2)`: turns vertical residuals into perpendicular distances.
fn normalizer(m: Interval) -> Interval {
    (m.sqr() + 1.0).sqrt().recip_positive()
}

impl SearchProblem<3> for TextLineModel<'_> {
    type Output = TextLine;

    fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    fn dimensions(&self) -> [Dimension; 3] {
        let s = self.params.split_scale;
        [
            Dimension::angular(self.slope_scale),
            Dimension {
                split_scale: s[INTERCEPT],
                ..Dimension::linear()
            },
            Dimension {
                split_scale: s[DESCENDER],
                ..Dimension::linear()
            },
        ]
    }

    fn bound(&self, params: &ParameterBox<3>, candidates: &[CandidateId]) -> Bound {
        let (m, c, d) = (params[SLOPE], params[INTERCEPT], params[DESCENDER]);
        let norm = normalizer(m);
        let mut bound = Bound::default();
        for &id in candidates {
            if self.is_claimed(id) {
                continue;
            }
            let cand = &self.candidates[id as usize];
            let q = self.vote(cand, m, c, d, norm).total();
            if q.hi > 0.0 {
                bound.quality = bound.quality + q * cand.weight;
                bound.matches.push(id);
            }
        }
        bound
    }

    fn extent(&self, matches: &[CandidateId]) -> f64 {
        horizontal_extent(self.candidates, matches)
    }

    fn accept(&mut self, state: &SearchState<3>) -> Option<TextLine> {
        let [m, c, d] = state.estimate();
        let point = [m, c, d].map(Interval::point);
        let norm = normalizer(point[SLOPE]);

        // Boxes that actually vote for the point estimate
        let members: Vec<(CandidateId, Vote)> = state
            .matches()
            .iter()
            .filter(|&&id| !self.is_claimed(id))
            .map(|&id| {
                let cand = &self.candidates[id as usize];
                (id, self.vote(cand, point[0], point[1], point[2], norm))
            })
            .filter(|(_, v)| v.total().hi > 0.0)
            .collect();

        let min_height = self.params.min_box_height * self.page_xheight;
        let anchors: Vec<CandidateId> = members
            .iter()
            .filter(|(id, _)| self.candidates[*id as usize].height() >= min_height)
            .map(|(id, _)| *id)
            .collect();
        let anchors = self.heaviest_run(anchors);
        if anchors.len() < self.config.min_count
            || self.extent(&anchors) < self.config.min_length
        {
            trace!(anchors = anchors.len(), "line rejected: too few anchors");
            return None;
        }

        // Line x-height: boxes sitting on the baseline rather than hanging below it
        let sitting = members
            .iter()
            .filter(|(id, v)| anchors.contains(id) && v.baseline.hi >= v.descender.hi)
            .map(|(id, _)| self.candidates[*id as usize].height());
        let xheight = mode_rounded(sitting)
            .or_else(|| {
                let heights: Vec<f64> = anchors
                    .iter()
                    .map(|&id| self.candidates[id as usize].height())
                    .sorted_by(f64::total_cmp)
                    .collect();
                heights.get(heights.len() / 2).copied()
            })
            .unwrap_or(self.page_xheight);

        let region = self.line_region(&anchors, m, c, d, xheight);
        let attributed: Vec<(CandidateId, Vote)> = members
            .into_iter()
            .filter(|(id, _)| {
                coverage_fraction(self.candidates[*id as usize].bbox, region)
                    > self.params.minoverlap
            })
            .collect();
        let anchored = attributed
            .iter()
            .filter(|(id, _)| anchors.contains(id))
            .count();
        if anchored < self.config.min_count {
            trace!(anchored, "line rejected: anchors outside the line region");
            return None;
        }

        let mut bbox: Option<Rect> = None;
        let mut quality = 0.0;
        let mut matches = Vec::with_capacity(attributed.len());
        for (id, vote) in attributed {
            let cand = &self.candidates[id as usize];
            self.claimed[id as usize] = true;
            bbox = Some(bbox.map_or(cand.bbox, |b| bbox_union(b, cand.bbox)));
            quality += vote.total().hi * cand.weight;
            matches.push(id);
        }

        Some(TextLine {
            m,
            c,
            d,
            xheight,
            bbox: bbox.unwrap_or(region),
            quality,
            matches,
        })
    }
}
