//! Shared data structures for TBM soil matching
//!
//! - `Dimension` / `Reading`: one observation of thrust, torque and cutter speed
//! - `ParameterRange` / `SoilProfile`: reference rows of the soil table
//! - `DimensionScore` / `MatchResult`: per-query scoring output

mod measurement;
mod soil;
mod matching;

pub use measurement::*;
pub use soil::*;
pub use matching::*;
