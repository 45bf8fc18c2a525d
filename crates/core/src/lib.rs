//! rast - geometric branch-and-bound search for text lines in page images.
//!
//! The search engine in [`search`] is generic over the model being fitted;
//! [`textline`] instantiates it for baselines with a descender offset.

pub mod candidate;
pub mod error;
pub mod geometry;
pub mod influence;
pub mod interval;
pub mod search;
pub mod textline;

pub use candidate::{Candidate, CandidateId};
pub use error::{RastError, Result};
pub use interval::Interval;
pub use textline::{CharStats, TextLine, TextLineFinder, TextLineParams};
