//! Search thresholds and the tolerance predicates built on them.

use crate::error::{RastError, Result};
use crate::search::params::{Dimension, DimensionKind, ParameterBox};

/// Parameters for a branch-and-bound search.
///
/// Every tolerance comparison the engine performs goes through
/// [`is_converged`](Self::is_converged) and [`is_final`](Self::is_final).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Convergence width for linear dimensions.
    pub delta: f64,
    /// Convergence width for angular dimensions.
    pub adelta: f64,
    /// Minimum lower quality bound of an acceptable result.
    pub min_q: f64,
    /// Minimum number of matched candidates.
    pub min_count: usize,
    /// Minimum extent spanned by the matched candidates.
    pub min_length: f64,
    /// Stop once this many results have been accepted.
    pub max_results: usize,
    /// Bisections allowed along one branch before it is dropped.
    pub max_splits: u8,
    /// Optional cap on main-loop iterations. Results found so far are kept.
    pub max_iterations: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delta: 1.0,
            adelta: 0.001,
            min_q: 2.0,
            min_count: 2,
            min_length: 30.0,
            max_results: 1000,
            max_splits: 48,
            max_iterations: None,
        }
    }
}

impl SearchConfig {
    /// Reject thresholds that no input could ever satisfy.
    pub fn validate(&self) -> Result<()> {
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(RastError::Configuration(format!(
                "delta must be positive, got {}",
                self.delta
            )));
        }
        if !(self.adelta.is_finite() && self.adelta > 0.0) {
            return Err(RastError::Configuration(format!(
                "adelta must be positive, got {}",
                self.adelta
            )));
        }
        if self.min_q.is_nan() || self.min_length.is_nan() {
            return Err(RastError::Configuration(
                "quality and length thresholds must be numbers".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(RastError::Configuration(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks that `candidates` items can meet `min_count`.
    pub fn validate_for(&self, candidates: usize) -> Result<()> {
        self.validate()?;
        if self.min_count > candidates {
            return Err(RastError::Configuration(format!(
                "min_count {} exceeds the {} available candidates",
                self.min_count, candidates
            )));
        }
        Ok(())
    }

    /// Convergence tolerance for a dimension kind.
    #[inline]
    pub const fn tolerance(&self, kind: DimensionKind) -> f64 {
        match kind {
            DimensionKind::Linear => self.delta,
            DimensionKind::Angular => self.adelta,
        }
    }

    /// An interval of this width no longer needs splitting.
    #[inline]
    pub fn is_converged(&self, width: f64, kind: DimensionKind) -> bool {
        width < self.tolerance(kind)
    }

    /// Every dimension of `params` has converged.
    pub fn is_final<const K: usize>(
        &self,
        params: &ParameterBox<K>,
        dims: &[Dimension; K],
    ) -> bool {
        dims.iter()
            .enumerate()
            .all(|(i, d)| self.is_converged(params.width(i), d.kind))
    }

    /// The result thresholds a finalized state must pass before acceptance.
    pub fn meets_thresholds(&self, quality_lo: f64, count: usize, extent: f64) -> bool {
        quality_lo >= self.min_q && count >= self.min_count && extent >= self.min_length
    }
}
