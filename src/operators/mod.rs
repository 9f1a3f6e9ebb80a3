//! Search operators over knapsack selections.
//!
//! - [`GreedyConstruction`]: randomized efficiency-biased greedy construction
//! - [`Perturbation`]: random bit flips followed by efficiency-based repair
//! - [`LocalSearch`]: bounded-depth add/swap/drop neighborhood descent
//!
//! Every operator returns feasible solutions and draws randomness only from
//! the generator it is given, so a seeded generator reproduces a run.

mod construction;
mod local_search;
mod perturbation;

pub use construction::GreedyConstruction;
pub use local_search::{Improved, LocalSearch, Move};
pub use perturbation::{repair, Perturbation, Perturbed};
