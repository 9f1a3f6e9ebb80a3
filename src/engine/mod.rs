//! Solver engine.
//!
//! A [`Session`] drives one optimization run through the states of
//! [`SolverState`]:
//!
//! 1. `load_problem` installs a [`ProblemModel`](crate::problem::ProblemModel)
//! 2. `set_parameters` seeds the generator, builds the population with
//!    greedy construction and fills a fresh archive
//! 3. `run_single_iteration` / `run_optimization` iterate perturbation,
//!    repair, local search and archive update over the population
//! 4. queries read the archive; `cleanup` releases everything
//!
//! # Key Types
//!
//! - [`Parameters`]: validated configuration with key/value and TOML front ends
//! - [`Session`]: the stateful solver
//! - [`SolveStats`]: per-run counters
//!
//! # References
//!
//! - Lust & Teghem (2010), "Two-phase Pareto local search for the biobjective
//!   traveling salesman problem"
//! - Zitzler & Thiele (1999), "Multiobjective evolutionary algorithms: a
//!   comparative case study and the strength Pareto approach"

mod config;
mod session;
mod types;

pub use config::{ParameterKey, Parameters, DEFAULT_SEED};
pub use session::Session;
pub use types::{SolveStats, SolverState};
