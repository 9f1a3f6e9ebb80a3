//! Multi-objective multidimensional knapsack (MOKP) engine.
//!
//! Chooses a subset of items under two to four capacity constraints so as
//! to maximize as many competing profit objectives at once, and returns an
//! approximate Pareto front instead of a single optimum.
//!
//! - **Problem**: validated instance data, feasibility checks and a text
//!   instance loader ([`problem`]).
//! - **Dominance**: strict and epsilon Pareto dominance under an explicit
//!   optimization sense ([`dominance`]).
//! - **Operators**: randomized greedy construction, bit-flip perturbation
//!   with repair, and bounded-depth local search ([`operators`]).
//! - **Archive**: bounded non-dominated set pruned by crowding distance
//!   ([`archive`]).
//! - **Engine**: the steppable [`Session`] state machine and its
//!   [`Parameters`] ([`engine`]).
//! - **Persistence** and a **C ABI** for host environments ([`persist`],
//!   [`ffi`]).
//!
//! # Example
//!
//! ```
//! use u_mokp::{Parameters, ProblemModel, Session};
//!
//! let problem = ProblemModel::new(
//!     vec![10.0, 15.0],
//!     vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
//!     vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
//! )
//! .unwrap();
//!
//! let mut session = Session::new();
//! session.load_problem(problem).unwrap();
//! session.set_parameters(Parameters::default().with_seed(1)).unwrap();
//! session.run_optimization(50).unwrap();
//!
//! for s in session.pareto_solutions(usize::MAX).unwrap() {
//!     println!("{:?} uses {:?}", s.objectives(), s.capacities_used());
//! }
//! ```
//!
//! The engine is single-threaded and deterministic: the same problem,
//! parameters and iteration count reproduce the same archive.

pub mod archive;
pub mod dominance;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod operators;
pub mod persist;
pub mod problem;
pub mod solution;

pub use archive::ParetoArchive;
pub use dominance::ObjectiveSense;
pub use engine::{Parameters, Session, SolverState};
pub use error::{MokpError, Result};
pub use problem::ProblemModel;
pub use solution::Solution;
