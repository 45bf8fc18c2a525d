//! Text-line finding parameters.
//!
//! Contains TextLineParams for controlling the constrained line search.

use crate::error::{RastError, Result};
use crate::influence::InfluenceKind;
use crate::search::SearchConfig;
use crate::textline::charstats::CharStats;

/// Parameters for constrained text-line finding.
///
/// Distances are in page units. Heights given as ratios are relative to the
/// page x-height, which is taken from `xheight` or estimated from the
/// candidates when that is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLineParams {
    /// Half-width of the band around the baseline (or descender line) inside
    /// which a box contributes to a line.
    pub epsilon: f64,

    /// Falloff of a box's contribution inside the band.
    pub influence: InfluenceKind,

    /// Lines are searched with slopes in `[-max_slope, max_slope]`.
    pub max_slope: f64,

    /// Descender offsets are searched in `[0, max_descender]`.
    pub max_descender: f64,

    /// Weight of a match through the descender line relative to a baseline match.
    pub descender_weight: f64,

    /// Per-dimension multipliers (slope, intercept, descender) applied to the
    /// effective range when choosing the dimension to bisect. The slope
    /// dimension is additionally scaled by the horizontal reach of the boxes.
    pub split_scale: [f64; 3],

    /// Convergence width for intercept and descender.
    pub delta: f64,

    /// Convergence width for the slope.
    pub adelta: f64,

    /// Minimum quality of an accepted line.
    pub min_q: f64,

    /// Minimum number of boxes on an accepted line.
    pub min_count: usize,

    /// Minimum horizontal extent of an accepted line.
    pub min_length: f64,

    /// Boxes further apart than this horizontally split a line. `None` keeps
    /// every box on the hypothesis regardless of gaps.
    pub min_gap: Option<f64>,

    /// Page x-height. `None` estimates it from the candidates.
    pub xheight: Option<f64>,

    /// Boxes lower than this ratio of the page x-height cannot anchor a line.
    /// They are still attributed to a line they sit inside.
    pub min_box_height: f64,

    /// Fraction of a box's area that must lie inside a line's region for the
    /// box to be assigned to that line.
    pub minoverlap: f64,

    /// Height of a line's region above the baseline, as a ratio of the line
    /// x-height.
    pub line_height_ratio: f64,

    /// Relax `min_count` and `min_length` to recover very short lines.
    pub aggressive: bool,

    /// Stop after this many lines.
    pub max_results: usize,

    /// Bisections allowed along one search branch.
    pub max_splits: u8,

    /// Optional cap on search iterations per extraction.
    pub max_iterations: Option<usize>,

    /// Worker threads for column extraction. 0 uses the available parallelism.
    pub threads: usize,
}

impl Default for TextLineParams {
    fn default() -> Self {
        Self {
            epsilon: 5.0,
            influence: InfluenceKind::Robust,
            max_slope: 0.1,
            max_descender: 20.0,
            descender_weight: 0.5,
            split_scale: [1.0, 1.0, 1.0],
            delta: 1.0,
            adelta: 0.001,
            min_q: 2.0,
            min_count: 2,
            min_length: 30.0,
            min_gap: None,
            xheight: None,
            min_box_height: 0.4,
            minoverlap: 0.7,
            line_height_ratio: 2.0,
            aggressive: false,
            max_results: 1000,
            max_splits: 48,
            max_iterations: None,
            threads: 0,
        }
    }
}

impl TextLineParams {
    /// Parameters tuned to a page's character statistics.
    pub fn from_char_stats(stats: &CharStats) -> Self {
        Self {
            xheight: Some(stats.xheight),
            min_gap: Some(stats.word_spacing * 1.5),
            ..Self::default()
        }
    }

    /// Engine thresholds, with `aggressive` applied.
    pub fn search_config(&self) -> SearchConfig {
        let (min_count, min_length) = if self.aggressive {
            (self.min_count.min(1), 0.0)
        } else {
            (self.min_count, self.min_length)
        };
        SearchConfig {
            delta: self.delta,
            adelta: self.adelta,
            min_q: self.min_q,
            min_count,
            min_length,
            max_results: self.max_results,
            max_splits: self.max_splits,
            max_iterations: self.max_iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("epsilon", self.epsilon),
            ("max_slope", self.max_slope),
            ("max_descender", self.max_descender),
            ("line_height_ratio", self.line_height_ratio),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(RastError::Configuration(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        if self.split_scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(RastError::Configuration(
                "split_scale entries must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.descender_weight) {
            return Err(RastError::Configuration(format!(
                "descender_weight must lie in [0, 1], got {}",
                self.descender_weight
            )));
        }
        if !(0.0..1.0).contains(&self.minoverlap) {
            return Err(RastError::Configuration(format!(
                "minoverlap must lie in [0, 1), got {}",
                self.minoverlap
            )));
        }
        if !(self.min_box_height.is_finite() && self.min_box_height >= 0.0) {
            return Err(RastError::Configuration(format!(
                "min_box_height must be non-negative, got {}",
                self.min_box_height
            )));
        }
        if let Some(x) = self.xheight
            && !(x.is_finite() && x > 0.0)
        {
            return Err(RastError::Configuration(format!(
                "xheight must be positive, got {x}"
            )));
        }
        if let Some(g) = self.min_gap
            && !(g.is_finite() && g >= 0.0)
        {
            return Err(RastError::Configuration(format!(
                "min_gap must be non-negative, got {g}"
            )));
        }
        self.search_config().validate()
    }
}
