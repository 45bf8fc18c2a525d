//! Generic best-first branch-and-bound search.
//!
//! - `params` - Parameter boxes and dimension descriptions
//! - `config` - Thresholds and tolerance predicates
//! - `state` - Immutable search states and their queue ordering
//! - `engine` - The `SearchProblem` trait and the search loop

mod config;
mod engine;
mod params;
mod state;

pub use config::SearchConfig;
pub use engine::{Bound, SearchProblem, SearchStats, SplitPolicy, search, search_with_stats};
pub use params::{Dimension, DimensionKind, ParameterBox};
pub use state::SearchState;
