//! Problem representation.
//!
//! - [`ProblemModel`]: validated, immutable instance data
//! - [`FeasibilityChecker`]: capacity-constraint evaluation
//! - [`ProblemLoader`]: parser for the whitespace-token instance format

mod feasibility;
mod loading;
mod model;

pub use feasibility::FeasibilityChecker;
pub use loading::ProblemLoader;
pub use model::{ProblemModel, MAX_OBJECTIVES, MIN_OBJECTIVES};
