//! Text-line extraction entry points.
//!
//! `TextLineFinder` validates and filters the caller's boxes, derives the
//! initial parameter box and page x-height, and runs one search per page or
//! per column. Match ids in the returned lines always refer to positions in
//! the caller's candidate slice.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::debug;

use crate::candidate::{Candidate, CandidateId};
use crate::error::{RastError, Result};
use crate::geometry::{HasBBox, Rect, bbox_contains_point};
use crate::interval::Interval;
use crate::search::{ParameterBox, SearchStats, search_with_stats};
use crate::textline::charstats::CharStats;
use crate::textline::line::TextLine;
use crate::textline::model::TextLineModel;
use crate::textline::params::TextLineParams;

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Finds text lines among component boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLineFinder {
    params: TextLineParams,
}

impl TextLineFinder {
    pub fn new(params: TextLineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TextLineParams {
        &self.params
    }

    /// Parameter box covering every line through the boxes' bottoms with a
    /// slope within `max_slope` and a descender up to `max_descender`.
    ///
    /// Returns `None` when no candidate is usable.
    pub fn initial_box(&self, candidates: &[Candidate]) -> Option<ParameterBox<3>> {
        let p = &self.params;
        let usable = candidates.iter().filter(|c| !c.is_degenerate());
        let (reach, lo, hi) = usable.fold(None, |acc: Option<(f64, f64, f64)>, c| {
            let reach = c.x0().abs().max(c.x1().abs());
            Some(match acc {
                None => (reach, c.y0(), c.y0()),
                Some((r, lo, hi)) => (r.max(reach), lo.min(c.y0()), hi.max(c.y0())),
            })
        })?;
        let tilt = p.max_slope * reach;
        Some(ParameterBox::new([
            Interval::new(-p.max_slope, p.max_slope),
            Interval::new(
                lo - tilt - p.epsilon,
                hi + tilt + p.max_descender + p.epsilon,
            ),
            Interval::new(0.0, p.max_descender),
        ]))
    }

    /// Extract lines over the whole candidate set, best first.
    pub fn extract(&self, candidates: &[Candidate]) -> Result<Vec<TextLine>> {
        self.extract_with_stats(candidates, None)
            .map(|(lines, _)| lines)
    }

    /// Extract lines whose parameters lie inside `initial`.
    pub fn extract_in(
        &self,
        candidates: &[Candidate],
        initial: ParameterBox<3>,
    ) -> Result<Vec<TextLine>> {
        self.extract_with_stats(candidates, Some(initial))
            .map(|(lines, _)| lines)
    }

    /// Like [`extract_in`](Self::extract_in), also returning the search
    /// counters. `None` derives the initial box from the candidates.
    pub fn extract_with_stats(
        &self,
        candidates: &[Candidate],
        initial: Option<ParameterBox<3>>,
    ) -> Result<(Vec<TextLine>, SearchStats)> {
        self.params.validate()?;
        if candidates.is_empty() {
            return Err(RastError::InvalidInput("no candidates".to_string()));
        }
        if candidates.len() > CandidateId::MAX as usize {
            return Err(RastError::InvalidInput(format!(
                "too many candidates: {}",
                candidates.len()
            )));
        }

        // Local ids index `usable`; `ids` maps them back to the caller's
        let (ids, usable): (Vec<CandidateId>, Vec<Candidate>) = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_degenerate())
            .map(|(i, c)| (i as CandidateId, *c))
            .unzip();
        if usable.is_empty() {
            return Err(RastError::InvalidInput(
                "every candidate box is degenerate".to_string(),
            ));
        }
        if usable.len() < candidates.len() {
            debug!(
                dropped = candidates.len() - usable.len(),
                "ignoring degenerate candidate boxes"
            );
        }

        let initial = match initial {
            Some(b) => b,
            None => self.initial_box(&usable).ok_or_else(|| {
                RastError::InvalidInput("no usable candidates".to_string())
            })?,
        };
        let xheight = self
            .params
            .xheight
            .or_else(|| CharStats::estimate(&usable).map(|s| s.xheight))
            .unwrap_or(1.0);

        let config = self.params.search_config();
        debug!(
            candidates = usable.len(),
            xheight,
            ?initial,
            "extracting text lines"
        );
        let mut model = TextLineModel::new(&usable, &self.params, config.clone(), xheight);
        let (mut lines, stats) = search_with_stats(&mut model, initial, &config)?;
        for line in &mut lines {
            line.remap(&ids);
        }
        Ok((lines, stats))
    }

    /// Extract lines separately inside each column rectangle.
    ///
    /// A candidate belongs to the first column containing the center of its
    /// box; candidates outside every column are ignored, as are columns with
    /// fewer candidates than `min_count`. Columns are searched in parallel and
    /// the merged lines are ordered by quality, ties keeping column order.
    pub fn extract_columns(
        &self,
        candidates: &[Candidate],
        columns: &[Rect],
    ) -> Result<Vec<TextLine>> {
        self.params.validate()?;
        if candidates.is_empty() {
            return Err(RastError::InvalidInput("no candidates".to_string()));
        }

        let mut members: Vec<Vec<CandidateId>> = vec![Vec::new(); columns.len()];
        for (i, cand) in candidates.iter().enumerate() {
            if cand.is_degenerate() {
                continue;
            }
            let center = (
                (cand.x0() + cand.x1()) / 2.0,
                (cand.y0() + cand.y1()) / 2.0,
            );
            if let Some(col) = columns.iter().position(|&r| bbox_contains_point(r, center)) {
                members[col].push(i as CandidateId);
            }
        }

        let min_count = self.params.search_config().min_count;
        let work: Vec<Vec<CandidateId>> = members
            .into_iter()
            .filter(|ids| !ids.is_empty() && ids.len() >= min_count)
            .collect();
        debug!(
            columns = columns.len(),
            searched = work.len(),
            "extracting text lines by column"
        );

        let threads = match self.params.threads {
            0 => default_thread_count(),
            n => n,
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RastError::Configuration(e.to_string()))?;

        let per_column: Vec<Result<Vec<TextLine>>> = pool.install(|| {
            work.par_iter()
                .map(|ids| -> Result<Vec<TextLine>> {
                    let subset: Vec<Candidate> =
                        ids.iter().map(|&id| candidates[id as usize]).collect();
                    let mut lines = self.extract(&subset)?;
                    for line in &mut lines {
                        line.remap(ids);
                    }
                    Ok(lines)
                })
                .collect()
        });

        let mut lines = Vec::new();
        for column in per_column {
            lines.extend(column?);
        }
        lines.sort_by(|a, b| b.quality.total_cmp(&a.quality));
        Ok(lines)
    }
}
