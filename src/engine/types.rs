//! Session state and run statistics.

use std::fmt;

/// Lifecycle state of a [`Session`](super::Session).
///
/// ```text
/// Uninitialized --load_problem--> ProblemLoaded --set_parameters--> Ready
///       ^                                                            |
///       |                                              run_single_iteration
///    cleanup (from any state)                                        v
///       |                         Completed <--run_optimization-- Running
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolverState {
    /// No problem loaded.
    #[default]
    Uninitialized,
    /// A problem is loaded but no population has been built.
    ProblemLoaded,
    /// Population and archive are built; no iteration has run yet.
    Ready,
    /// At least one iteration has run and the budget is not exhausted.
    Running,
    /// The run is over. Only queries and `cleanup` are allowed.
    Completed,
}

impl SolverState {
    /// Returns `true` once a problem is available for queries.
    pub fn has_problem(self) -> bool {
        !matches!(self, SolverState::Uninitialized)
    }

    /// Stable numeric code used at the C boundary.
    pub fn code(self) -> i32 {
        match self {
            SolverState::Uninitialized => 0,
            SolverState::ProblemLoaded => 1,
            SolverState::Ready => 2,
            SolverState::Running => 3,
            SolverState::Completed => 4,
        }
    }
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolverState::Uninitialized => "uninitialized",
            SolverState::ProblemLoaded => "problem_loaded",
            SolverState::Ready => "ready",
            SolverState::Running => "running",
            SolverState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Counters collected while a session iterates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Iterations completed since the last `set_parameters`.
    pub iterations: usize,

    /// Archive size after each iteration.
    pub archive_sizes: Vec<usize>,

    /// Local-search moves accepted over all iterations.
    pub accepted_moves: usize,

    /// Perturbations that needed repair.
    pub repaired_perturbations: usize,
}
