//! Constrained text-line finding.
//!
//! - `params` - Search and acceptance thresholds
//! - `charstats` - Page x-height and spacing estimates
//! - `model` - The `(m, c, d)` line model searched by the engine
//! - `line` - Accepted lines
//! - `finder` - Extraction entry points

mod charstats;
mod finder;
mod line;
mod model;
mod params;

pub use charstats::CharStats;
pub use finder::TextLineFinder;
pub use line::TextLine;
pub use model::{DESCENDER, INTERCEPT, SLOPE, TextLineModel};
pub use params::TextLineParams;
