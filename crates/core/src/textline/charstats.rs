//! Page character statistics estimated from component boxes.
//!
//! These only parameterise thresholds (`xheight`, `min_gap`); the search
//! itself never reads them.

use std::collections::BTreeMap;

use crate::candidate::Candidate;
use crate::geometry::{HasBBox, Rect, bbox_union};

/// Horizontal neighbours further apart than this many x-heights are not
/// counted as character or word gaps.
const MAX_GAP_XHEIGHTS: f64 = 5.0;

/// Character and spacing statistics of a page or column.
#[derive(Debug, Clone, PartialEq)]
pub struct CharStats {
    /// Snug bounds of all usable boxes.
    pub page: Rect,
    pub xheight: f64,
    /// Most common gap between horizontally adjacent boxes.
    pub char_spacing: f64,
    /// Most common gap clearly wider than the character spacing.
    pub word_spacing: f64,
}

impl CharStats {
    /// Estimate statistics from candidate boxes. Degenerate boxes are ignored;
    /// returns `None` when nothing usable remains.
    pub fn estimate(candidates: &[Candidate]) -> Option<Self> {
        let mut boxes: Vec<&Candidate> = candidates.iter().filter(|c| !c.is_degenerate()).collect();
        let page = boxes.iter().map(|c| c.bbox).reduce(bbox_union)?;
        let xheight = mode_rounded(boxes.iter().map(|c| c.height()))?;

        boxes.sort_by(|a, b| a.x0().total_cmp(&b.x0()));
        let gaps = horizontal_gaps(&boxes, xheight * MAX_GAP_XHEIGHTS);
        let char_spacing = mode_rounded(gaps.iter().copied()).unwrap_or(0.0);
        let word_threshold = char_spacing + (xheight / 4.0).max(1.0);
        let word_spacing = mode_rounded(gaps.iter().copied().filter(|&g| g > word_threshold))
            .unwrap_or_else(|| (char_spacing * 3.0).max(xheight / 2.0));

        Some(Self {
            page,
            xheight,
            char_spacing,
            word_spacing,
        })
    }
}

/// Most frequent value after rounding to whole units. Ties go to the
/// smaller value.
pub(crate) fn mode_rounded(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut hist: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values {
        if v.is_finite() {
            *hist.entry(v.round() as i64).or_default() += 1;
        }
    }
    let mut best: Option<(i64, usize)> = None;
    for (value, count) in hist {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value as f64)
}

/// Gap from each box to its nearest right neighbour on the same row.
///
/// `boxes` must be sorted by `x0`.
fn horizontal_gaps(boxes: &[&Candidate], max_gap: f64) -> Vec<f64> {
    let mut gaps = Vec::new();
    for (i, a) in boxes.iter().enumerate() {
        for b in &boxes[i + 1..] {
            let gap = b.x0() - a.x1();
            if gap > max_gap {
                break;
            }
            if gap < 0.0 {
                continue;
            }
            let overlap = a.y1().min(b.y1()) - a.y0().max(b.y0());
            if overlap >= a.height().min(b.height()) / 2.0 {
                gaps.push(gap);
                break;
            }
        }
    }
    gaps
}
