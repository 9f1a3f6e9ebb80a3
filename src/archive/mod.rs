//! Pareto archive.
//!
//! - [`ParetoArchive`]: bounded set of mutually non-dominated solutions
//! - [`crowding_distance`]: diversity measure used to prune the archive

mod crowding;
mod pareto;

pub use crowding::{crowding_distance, crowding_distance_into};
pub use pareto::{ParetoArchive, UpdateOutcome};
