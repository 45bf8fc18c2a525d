//! Best-first branch-and-bound over parameter boxes.
//!
//! The engine pops the state with the highest quality bound, and either
//! hands it to the problem for acceptance (once every dimension has
//! converged) or bisects it and re-bounds the children. Problems plug in
//! through [`SearchProblem`]; the engine owns the queue and all states.

use std::collections::BinaryHeap;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::candidate::CandidateId;
use crate::error::{RastError, Result};
use crate::interval::Interval;
use crate::search::config::SearchConfig;
use crate::search::params::{Dimension, ParameterBox};
use crate::search::state::SearchState;

/// Quality bound and surviving candidates for one parameter box.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bound {
    pub quality: Interval,
    /// Candidates that could still contribute somewhere inside the box.
    pub matches: Vec<CandidateId>,
}

/// How many dimensions are bisected per expansion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Bisect the widest dimension: two children.
    #[default]
    Widest,
    /// Bisect the two widest dimensions: four children.
    TwoWidest,
}

/// A concrete model searched by the engine.
pub trait SearchProblem<const K: usize> {
    type Output;

    /// Number of candidates; ids run from zero to this value.
    fn candidate_count(&self) -> usize;

    fn dimensions(&self) -> [Dimension; K];

    fn split_policy(&self) -> SplitPolicy {
        SplitPolicy::Widest
    }

    /// Bound the quality of any model in `params`, considering only
    /// `candidates`. The returned matches must be a subset of `candidates`.
    ///
    /// The bound must never be lower than the true quality at any point of
    /// `params`. Candidates no longer available to the problem (for example
    /// claimed by an accepted result) must be left out.
    fn bound(&self, params: &ParameterBox<K>, candidates: &[CandidateId]) -> Bound;

    /// Extent spanned by a match set, compared against `min_length`.
    fn extent(&self, matches: &[CandidateId]) -> f64;

    /// Turn a converged state into a result, or refuse it.
    fn accept(&mut self, state: &SearchState<K>) -> Option<Self::Output>;
}

/// Counters describing one search run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Main-loop iterations (states popped).
    pub iterations: usize,
    /// States split into children.
    pub expanded: usize,
    /// Stale states re-bounded after a result was accepted.
    pub reevaluated: usize,
    /// States dropped because they could no longer meet the thresholds.
    pub pruned: usize,
    /// Branches dropped for exceeding `max_splits` or producing invalid bounds.
    pub degenerate: usize,
    pub accepted: usize,
    /// Converged states refused by the thresholds or by the problem.
    pub rejected: usize,
}

/// Run a search and return the accepted results in pop order.
pub fn search<P, const K: usize>(
    problem: &mut P,
    initial: ParameterBox<K>,
    config: &SearchConfig,
) -> Result<Vec<P::Output>>
where
    P: SearchProblem<K>,
{
    search_with_stats(problem, initial, config).map(|(results, _)| results)
}

/// Like [`search`], also returning the run's counters.
pub fn search_with_stats<P, const K: usize>(
    problem: &mut P,
    initial: ParameterBox<K>,
    config: &SearchConfig,
) -> Result<(Vec<P::Output>, SearchStats)>
where
    P: SearchProblem<K>,
{
    let n = problem.candidate_count();
    if n == 0 {
        return Err(RastError::InvalidInput("empty candidate set".to_string()));
    }
    if n > CandidateId::MAX as usize {
        return Err(RastError::InvalidInput(format!(
            "too many candidates: {n}"
        )));
    }
    initial.validate()?;
    config.validate_for(n)?;

    debug!(candidates = n, dims = K, "starting branch-and-bound search");

    let mut engine = Engine::new(problem.dimensions(), config);
    let all: Vec<CandidateId> = (0..n as CandidateId).collect();
    let bound = problem.bound(&initial, &all);
    if let Some(root) = engine.admit(problem, initial, bound, None, 0, 0) {
        engine.queue.push(root);
    } else {
        debug!("no candidate can reach the thresholds inside the initial box");
    }

    let results = engine.run(problem);
    debug!(
        results = results.len(),
        iterations = engine.stats.iterations,
        expanded = engine.stats.expanded,
        reevaluated = engine.stats.reevaluated,
        degenerate = engine.stats.degenerate,
        "search finished"
    );
    Ok((results, engine.stats))
}

struct Engine<'a, const K: usize> {
    dims: [Dimension; K],
    config: &'a SearchConfig,
    queue: BinaryHeap<SearchState<K>>,
    next_rank: u32,
    generation: u32,
    stats: SearchStats,
}

impl<'a, const K: usize> Engine<'a, K> {
    fn new(dims: [Dimension; K], config: &'a SearchConfig) -> Self {
        Self {
            dims,
            config,
            queue: BinaryHeap::new(),
            next_rank: 0,
            generation: 0,
            stats: SearchStats::default(),
        }
    }

    fn run<P: SearchProblem<K>>(&mut self, problem: &mut P) -> Vec<P::Output> {
        let mut results = Vec::new();
        while results.len() < self.config.max_results {
            if let Some(limit) = self.config.max_iterations
                && self.stats.iterations >= limit
            {
                debug!(limit, "iteration budget exhausted");
                break;
            }
            let Some(top) = self.queue.pop() else {
                break;
            };
            self.stats.iterations += 1;

            // Nothing left in the queue can do better than this state
            if top.quality().hi < self.config.min_q {
                self.stats.pruned += 1 + self.queue.len();
                self.queue.clear();
                break;
            }

            if top.generation() != self.generation {
                self.stats.reevaluated += 1;
                let bound = problem.bound(top.params(), top.matches());
                let params = *top.params();
                let (depth, splits) = (top.depth(), top.splits());
                if let Some(state) = self.admit(problem, params, bound, Some(&top), depth, splits)
                {
                    self.queue.push(state);
                }
                continue;
            }

            if self.config.is_final(top.params(), &self.dims) {
                self.finalize(problem, &top, &mut results);
                continue;
            }

            self.expand(problem, &top);
        }
        results
    }

    fn finalize<P: SearchProblem<K>>(
        &mut self,
        problem: &mut P,
        state: &SearchState<K>,
        results: &mut Vec<P::Output>,
    ) {
        let extent = problem.extent(state.matches());
        if !self
            .config
            .meets_thresholds(state.quality().lo, state.matches().len(), extent)
        {
            self.stats.rejected += 1;
            return;
        }
        match problem.accept(state) {
            Some(result) => {
                debug!(
                    quality = state.quality().hi,
                    matches = state.matches().len(),
                    depth = state.depth(),
                    "accepted result"
                );
                results.push(result);
                self.stats.accepted += 1;
                self.generation += 1;
            }
            None => self.stats.rejected += 1,
        }
    }

    fn expand<P: SearchProblem<K>>(&mut self, problem: &mut P, parent: &SearchState<K>) {
        self.stats.expanded += 1;
        let split_dims = self.split_dimensions(parent.params(), problem.split_policy());
        let budget = u8::try_from(split_dims.len())
            .ok()
            .and_then(|n| parent.splits().checked_add(n))
            .filter(|&s| s <= self.config.max_splits);
        let Some(splits) = budget else {
            trace!(
                rank = parent.rank(),
                splits = parent.splits(),
                "dropping branch past the split budget"
            );
            self.stats.degenerate += 1 << split_dims.len();
            return;
        };

        let mut children: SmallVec<[ParameterBox<K>; 4]> = SmallVec::new();
        children.push(*parent.params());
        for &dim in &split_dims {
            children = children
                .into_iter()
                .flat_map(|b| {
                    let (lo, hi) = b.bisect(dim);
                    [lo, hi]
                })
                .collect();
        }

        let depth = parent.depth() + 1;
        for child in children {
            // Bisection below float resolution leaves one half unchanged
            if child == *parent.params() {
                self.stats.degenerate += 1;
                continue;
            }
            let bound = problem.bound(&child, parent.matches());
            if let Some(state) = self.admit(problem, child, bound, Some(parent), depth, splits) {
                self.queue.push(state);
            }
        }
    }

    /// Dimensions to bisect: the widest unconverged ones by effective range.
    fn split_dimensions(
        &self,
        params: &ParameterBox<K>,
        policy: SplitPolicy,
    ) -> SmallVec<[usize; 2]> {
        let mut open: SmallVec<[(usize, f64); 4]> = self
            .dims
            .iter()
            .enumerate()
            .filter(|(i, d)| !self.config.is_converged(params.width(*i), d.kind))
            .map(|(i, d)| (i, params.width(i) * d.split_scale))
            .collect();
        // Stable sort keeps the lower index first on ties
        open.sort_by(|a, b| b.1.total_cmp(&a.1));
        let take = match policy {
            SplitPolicy::Widest => 1,
            SplitPolicy::TwoWidest => 2,
        };
        open.into_iter().take(take).map(|(i, _)| i).collect()
    }

    /// Build a queued state from a bound, or drop it if it cannot succeed.
    ///
    /// `parent` is the state being split or re-evaluated; `None` for the root.
    fn admit<P: SearchProblem<K>>(
        &mut self,
        problem: &P,
        params: ParameterBox<K>,
        bound: Bound,
        parent: Option<&SearchState<K>>,
        depth: u32,
        splits: u8,
    ) -> Option<SearchState<K>> {
        if !bound.quality.is_valid() {
            self.stats.degenerate += 1;
            return None;
        }
        if bound.matches.is_empty()
            || bound.quality.hi < self.config.min_q
            || bound.matches.len() < self.config.min_count
            || problem.extent(&bound.matches) < self.config.min_length
        {
            self.stats.pruned += 1;
            return None;
        }

        let matches = match parent {
            Some(p) if p.matches().len() == bound.matches.len() => p.shared_matches().clone(),
            _ => Arc::from(bound.matches),
        };
        let rank = self.next_rank;
        self.next_rank = self.next_rank.wrapping_add(1);
        Some(SearchState::new(
            params,
            matches,
            bound.quality,
            depth,
            splits,
            rank,
            self.generation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One-dimensional toy: find positions covered by many unit-width
    /// segments. Quality is the number of segments containing the point.
    struct Coverage {
        segments: Vec<(f64, f64)>,
        claimed: Vec<bool>,
    }

    impl Coverage {
        fn new(segments: Vec<(f64, f64)>) -> Self {
            let claimed = vec![false; segments.len()];
            Self { segments, claimed }
        }
    }

    impl SearchProblem<1> for Coverage {
        type Output = (f64, Vec<CandidateId>);

        fn candidate_count(&self) -> usize {
            self.segments.len()
        }

        fn dimensions(&self) -> [Dimension; 1] {
            [Dimension::linear()]
        }

        fn bound(&self, params: &ParameterBox<1>, candidates: &[CandidateId]) -> Bound {
            let x = params[0];
            let mut bound = Bound::default();
            for &id in candidates {
                if self.claimed[id as usize] {
                    continue;
                }
                let (a, b) = self.segments[id as usize];
                if b < x.lo || a > x.hi {
                    continue;
                }
                let all_inside = a <= x.lo && x.hi <= b;
                bound.quality = bound.quality
                    + Interval::new(if all_inside { 1.0 } else { 0.0 }, 1.0);
                bound.matches.push(id);
            }
            bound
        }

        fn extent(&self, matches: &[CandidateId]) -> f64 {
            matches.len() as f64
        }

        fn accept(&mut self, state: &SearchState<1>) -> Option<Self::Output> {
            for &id in state.matches() {
                self.claimed[id as usize] = true;
            }
            Some((state.estimate()[0], state.matches().to_vec()))
        }
    }

    fn config() -> SearchConfig {
        SearchConfig {
            delta: 0.1,
            min_q: 2.0,
            min_count: 2,
            min_length: 0.0,
            ..SearchConfig::default()
        }
    }

    fn clusters() -> Coverage {
        Coverage::new(vec![
            (10.0, 11.0),
            (10.2, 11.2),
            (10.4, 11.4),
            (30.0, 31.0),
            (30.5, 31.5),
            (70.0, 71.0),
        ])
    }

    #[test]
    fn finds_densest_cluster_first() {
        let mut p = clusters();
        let initial = ParameterBox::new([Interval::new(0.0, 100.0)]);
        let (results, stats) = search_with_stats(&mut p, initial, &config()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].0 > 10.3 && results[0].0 < 11.1);
        assert_eq!(results[0].1, vec![0, 1, 2]);
        assert!(results[1].0 > 30.4 && results[1].0 < 31.1);
        assert_eq!(results[1].1, vec![3, 4]);
        assert_eq!(stats.accepted, 2);
        assert!(stats.reevaluated > 0);
    }

    #[test]
    fn max_results_caps_output() {
        let mut p = clusters();
        let initial = ParameterBox::new([Interval::new(0.0, 100.0)]);
        let cfg = SearchConfig {
            max_results: 1,
            ..config()
        };
        let results = search(&mut p, initial, &cfg).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn split_budget_bounds_work() {
        let mut p = clusters();
        let initial = ParameterBox::new([Interval::new(0.0, 100.0)]);
        let cfg = SearchConfig {
            max_splits: 1,
            ..config()
        };
        let (results, stats) = search_with_stats(&mut p, initial, &cfg).unwrap();
        assert!(results.is_empty());
        assert!(stats.degenerate > 0);
        assert!(stats.iterations <= 3);
    }

    #[test]
    fn iteration_budget_stops_early() {
        let mut p = clusters();
        let initial = ParameterBox::new([Interval::new(0.0, 100.0)]);
        let cfg = SearchConfig {
            max_iterations: Some(5),
            ..config()
        };
        let (results, stats) = search_with_stats(&mut p, initial, &cfg).unwrap();
        assert!(results.is_empty());
        assert_eq!(stats.iterations, 5);
    }

    #[test]
    fn two_widest_policy_produces_four_children() {
        struct Flat;
        impl SearchProblem<2> for Flat {
            type Output = ();
            fn candidate_count(&self) -> usize {
                1
            }
            fn dimensions(&self) -> [Dimension; 2] {
                [Dimension::linear(), Dimension::linear()]
            }
            fn split_policy(&self) -> SplitPolicy {
                SplitPolicy::TwoWidest
            }
            fn bound(&self, _: &ParameterBox<2>, c: &[CandidateId]) -> Bound {
                Bound {
                    quality: Interval::new(0.0, 5.0),
                    matches: c.to_vec(),
                }
            }
            fn extent(&self, _: &[CandidateId]) -> f64 {
                100.0
            }
            fn accept(&mut self, _: &SearchState<2>) -> Option<()> {
                None
            }
        }

        let cfg = SearchConfig {
            min_count: 1,
            max_iterations: Some(1),
            ..SearchConfig::default()
        };
        let initial = ParameterBox::new([Interval::new(0.0, 8.0), Interval::new(0.0, 8.0)]);
        let dims = Flat.dimensions();
        let mut engine = Engine::new(dims, &cfg);
        let split = engine.split_dimensions(&initial, SplitPolicy::TwoWidest);
        assert_eq!(split.as_slice(), &[0, 1]);
        let root = engine
            .admit(&Flat, initial, Flat.bound(&initial, &[0]), None, 0, 0)
            .unwrap();
        engine.expand(&mut Flat, &root);
        assert_eq!(engine.queue.len(), 4);
        assert!(engine.queue.iter().all(|s| s.splits() == 2 && s.depth() == 1));
    }

    /// Every box looks promising and no state is ever accepted.
    struct Stubborn;

    impl SearchProblem<1> for Stubborn {
        type Output = ();
        fn candidate_count(&self) -> usize {
            2
        }
        fn dimensions(&self) -> [Dimension; 1] {
            [Dimension::linear()]
        }
        fn bound(&self, _: &ParameterBox<1>, c: &[CandidateId]) -> Bound {
            Bound {
                quality: Interval::new(0.0, 5.0),
                matches: c.to_vec(),
            }
        }
        fn extent(&self, _: &[CandidateId]) -> f64 {
            100.0
        }
        fn accept(&mut self, _: &SearchState<1>) -> Option<()> {
            None
        }
    }

    #[test]
    fn box_below_float_resolution_terminates() {
        let initial = ParameterBox::new([Interval::new(100.0, 100.0f64.next_up())]);
        let cfg = SearchConfig {
            delta: 1e-300,
            max_splits: u8::MAX,
            max_iterations: None,
            ..config()
        };
        let (results, stats) = search_with_stats(&mut Stubborn, initial, &cfg).unwrap();
        assert!(results.is_empty());
        assert!(stats.degenerate >= 1);
        assert!(stats.iterations <= 3);
    }

    #[test]
    fn full_split_counter_drops_branch() {
        let cfg = SearchConfig {
            max_splits: u8::MAX,
            ..config()
        };
        let initial = ParameterBox::new([Interval::new(0.0, 8.0)]);
        let mut engine = Engine::new(Stubborn.dimensions(), &cfg);
        let root = engine
            .admit(&Stubborn, initial, Stubborn.bound(&initial, &[0, 1]), None, 0, u8::MAX)
            .unwrap();
        engine.expand(&mut Stubborn, &root);
        assert!(engine.queue.is_empty());
        assert_eq!(engine.stats.degenerate, 2);

        // One bisection short of the counter's limit still splits
        let root = engine
            .admit(&Stubborn, initial, Stubborn.bound(&initial, &[0, 1]), None, 0, u8::MAX - 1)
            .unwrap();
        engine.expand(&mut Stubborn, &root);
        assert_eq!(engine.queue.len(), 2);
        assert!(engine.queue.iter().all(|s| s.splits() == u8::MAX));
    }

    #[test]
    fn rejects_empty_and_impossible_inputs() {
        let mut empty = Coverage::new(vec![]);
        let initial = ParameterBox::new([Interval::new(0.0, 100.0)]);
        assert!(matches!(
            search(&mut empty, initial, &config()),
            Err(RastError::InvalidInput(_))
        ));

        let mut single = Coverage::new(vec![(1.0, 2.0)]);
        assert!(matches!(
            search(&mut single, initial, &config()),
            Err(RastError::Configuration(_))
        ));

        let flat = ParameterBox::new([Interval::new(5.0, 5.0)]);
        assert!(matches!(
            search(&mut clusters(), flat, &config()),
            Err(RastError::InvalidInput(_))
        ));
    }
}
