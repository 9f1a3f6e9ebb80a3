//! The solver session: lifecycle, iteration loop and queries.

use super::config::Parameters;
use super::types::{SolveStats, SolverState};
use crate::archive::ParetoArchive;
use crate::dominance::ObjectiveSense;
use crate::error::{MokpError, Result};
use crate::operators::{GreedyConstruction, LocalSearch, Perturbation};
use crate::problem::{FeasibilityChecker, ProblemLoader, ProblemModel};
use crate::solution::Solution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A single optimization run over one problem.
///
/// The session owns its population, archive and random stream. Every
/// operation checks the current [`SolverState`] and fails with
/// [`MokpError::NotInitialized`] or [`MokpError::InvalidState`] instead of
/// silently doing nothing. The text of the last returned error is kept for
/// [`last_error`](Self::last_error).
///
/// Each iteration visits every population member in order: perturb and
/// repair, improve by local search, offer the result to the archive, and
/// put it back in the member's slot. A generation is staged in full before
/// anything is committed: if it fails, the session is left as it was after
/// the previous iteration.
///
/// # Examples
///
/// ```
/// use u_mokp::engine::{Parameters, Session, SolverState};
/// use u_mokp::problem::ProblemModel;
///
/// let problem = ProblemModel::new(
///     vec![10.0, 15.0],
///     vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
///     vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
/// )
/// .unwrap();
///
/// let mut session = Session::new();
/// session.load_problem(problem).unwrap();
/// session
///     .set_parameters(Parameters::default().with_max_iterations(20).with_seed(1))
///     .unwrap();
/// session.run_optimization(20).unwrap();
///
/// assert_eq!(session.state(), SolverState::Completed);
/// assert!(session.pareto_size().unwrap() > 0);
/// ```
#[derive(Debug)]
pub struct Session {
    state: SolverState,
    problem: Option<Arc<ProblemModel>>,
    parameters: Parameters,
    population: Vec<Solution>,
    offspring: Vec<Solution>,
    archive: ParetoArchive,
    rng: ChaCha8Rng,
    construction: GreedyConstruction,
    perturbation: Option<Perturbation>,
    local_search: Option<LocalSearch>,
    iteration: usize,
    stats: SolveStats,
    last_iteration_time: Option<Duration>,
    last_error: RefCell<Option<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session in [`SolverState::Uninitialized`].
    pub fn new() -> Self {
        let parameters = Parameters::default();
        Self {
            state: SolverState::Uninitialized,
            problem: None,
            rng: ChaCha8Rng::seed_from_u64(parameters.effective_seed()),
            parameters,
            population: Vec::new(),
            offspring: Vec::new(),
            archive: ParetoArchive::new(ObjectiveSense::default()),
            construction: GreedyConstruction::new(),
            perturbation: None,
            local_search: None,
            iteration: 0,
            stats: SolveStats::default(),
            last_iteration_time: None,
            last_error: RefCell::new(None),
        }
    }

    /// The default parameter set.
    pub fn default_parameters() -> Parameters {
        Parameters::default()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Installs a problem. Allowed while uninitialized or when a problem is
    /// loaded but no parameters are set; the previous problem is replaced.
    pub fn load_problem(&mut self, problem: impl Into<Arc<ProblemModel>>) -> Result<()> {
        const OP: &str = "load_problem";
        if !matches!(
            self.state,
            SolverState::Uninitialized | SolverState::ProblemLoaded
        ) {
            return self.fail(OP, self.invalid_state(OP));
        }

        let problem = problem.into();
        info!(
            event = "problem_loaded",
            items = problem.num_items(),
            objectives = problem.num_objectives(),
            sense = %problem.sense(),
        );
        self.archive = ParetoArchive::new(problem.sense());
        self.problem = Some(problem);
        self.state = SolverState::ProblemLoaded;
        Ok(())
    }

    /// Validates and installs a problem given as dimensions plus
    /// objective-major matrices.
    pub fn load_problem_parts(
        &mut self,
        num_items: usize,
        num_objectives: usize,
        capacities: &[f64],
        weights: &[Vec<f64>],
        profits: &[Vec<f64>],
    ) -> Result<()> {
        let problem =
            ProblemModel::from_parts(num_items, num_objectives, capacities, weights, profits);
        match problem {
            Ok(p) => self.load_problem(p),
            Err(e) => self.fail("load_problem", e),
        }
    }

    /// Parses a problem file (see [`ProblemLoader`]) and installs it.
    pub fn load_problem_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match ProblemLoader::new().from_path(path) {
            Ok(p) => self.load_problem(p),
            Err(e) => self.fail("load_problem", e),
        }
    }

    /// Validates `parameters`, seeds the generator, builds the population
    /// and a fresh archive from it.
    ///
    /// On error the session is left exactly as it was.
    pub fn set_parameters(&mut self, parameters: Parameters) -> Result<()> {
        const OP: &str = "set_parameters";
        let problem = self.require_problem(OP)?;
        if !matches!(self.state, SolverState::ProblemLoaded | SolverState::Ready) {
            return self.fail(OP, self.invalid_state(OP));
        }
        match self.build(&problem, parameters) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(OP, e),
        }
    }

    fn build(&mut self, problem: &ProblemModel, parameters: Parameters) -> Result<()> {
        parameters.validate_for(problem)?;
        let perturbation = Perturbation::new(parameters.perturbation_rate)?;
        let local_search = LocalSearch::new(parameters.kappa, parameters.local_search_depth)?;
        let mut rng = ChaCha8Rng::seed_from_u64(parameters.effective_seed());

        let mut population = Vec::new();
        population.try_reserve_exact(parameters.population_size)?;
        for _ in 0..parameters.population_size {
            population.push(self.construction.construct(problem, &mut rng));
        }

        let mut archive = ParetoArchive::bounded(parameters.archive_size, problem.sense());
        for s in &population {
            archive.update(s.clone())?;
        }

        info!(
            event = "parameters_set",
            population = population.len(),
            archive_size = archive.len(),
            max_iterations = parameters.max_iterations,
            seed = parameters.effective_seed(),
        );

        self.parameters = parameters;
        self.perturbation = Some(perturbation);
        self.local_search = Some(local_search);
        self.rng = rng;
        self.population = population;
        self.offspring = Vec::new();
        self.archive = archive;
        self.iteration = 0;
        self.stats = SolveStats::default();
        self.last_iteration_time = None;
        self.state = SolverState::Ready;
        Ok(())
    }

    /// Runs one iteration.
    ///
    /// The session moves to [`SolverState::Running`], or to
    /// [`SolverState::Completed`] when this iteration uses up
    /// `max_iterations`.
    pub fn run_single_iteration(&mut self) -> Result<()> {
        const OP: &str = "run_single_iteration";
        self.check_runnable(OP)?;
        match self.step() {
            Ok(()) => {
                self.state = if self.iteration >= self.parameters.max_iterations {
                    SolverState::Completed
                } else {
                    SolverState::Running
                };
                Ok(())
            }
            Err(e) => self.fail(OP, e),
        }
    }

    /// Runs up to `max_iterations` iterations, bounded by the remaining
    /// budget, and completes the session. Returns the number of iterations
    /// run.
    ///
    /// If an iteration fails, the archive keeps everything gathered by the
    /// iterations before it.
    pub fn run_optimization(&mut self, max_iterations: usize) -> Result<usize> {
        const OP: &str = "run_optimization";
        if max_iterations == 0 {
            return self.fail(
                OP,
                MokpError::InvalidParameter("max_iterations must be at least 1".into()),
            );
        }
        self.check_runnable(OP)?;

        let start = Instant::now();
        let remaining = self.parameters.max_iterations - self.iteration;
        let n = max_iterations.min(remaining);
        for _ in 0..n {
            if let Err(e) = self.step() {
                self.state = SolverState::Running;
                return self.fail(OP, e);
            }
        }
        self.state = SolverState::Completed;

        info!(
            event = "solve_end",
            iterations = n,
            total_iterations = self.iteration,
            archive_size = self.archive.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
        );
        Ok(n)
    }

    /// Releases the problem, population and archive, resets the parameters
    /// and the random stream to their defaults and returns to
    /// [`SolverState::Uninitialized`]. Calling it again is a no-op.
    pub fn cleanup(&mut self) {
        if self.state == SolverState::Uninitialized && self.problem.is_none() {
            return;
        }
        debug!(event = "cleanup", state = %self.state);
        self.problem = None;
        self.parameters = Parameters::default();
        self.rng = ChaCha8Rng::seed_from_u64(self.parameters.effective_seed());
        self.population = Vec::new();
        self.offspring = Vec::new();
        self.archive.clear();
        self.perturbation = None;
        self.local_search = None;
        self.iteration = 0;
        self.stats = SolveStats::default();
        self.last_iteration_time = None;
        self.state = SolverState::Uninitialized;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of archived solutions.
    pub fn pareto_size(&self) -> Result<usize> {
        self.require_problem("pareto_size")?;
        Ok(self.archive.len())
    }

    /// Archived solutions in archive order, at most `limit` of them.
    pub fn pareto_solutions(&self, limit: usize) -> Result<&[Solution]> {
        self.require_problem("pareto_solutions")?;
        let members = self.archive.members();
        Ok(&members[..limit.min(members.len())])
    }

    /// Evaluates an arbitrary selection against the loaded problem. Does
    /// not touch the population or archive.
    pub fn evaluate_solution(&self, selection: &[bool]) -> Result<Solution> {
        const OP: &str = "evaluate_solution";
        let problem = self.require_problem(OP)?;
        Solution::try_evaluate(&problem, selection.to_vec()).or_else(|e| self.fail(OP, e))
    }

    /// Whether a selection respects every capacity of the loaded problem.
    pub fn is_feasible(&self, selection: &[bool]) -> Result<bool> {
        const OP: &str = "is_feasible";
        let problem = self.require_problem(OP)?;
        if selection.len() != problem.num_items() {
            return self.fail(
                OP,
                MokpError::MalformedInput(format!(
                    "selection has {} entries, problem has {} items",
                    selection.len(),
                    problem.num_items()
                )),
            );
        }
        Ok(FeasibilityChecker::new(&problem).is_feasible(selection))
    }

    /// `(num_objectives, num_items)` of the loaded problem.
    pub fn problem_info(&self) -> Result<(usize, usize)> {
        let problem = self.require_problem("problem_info")?;
        Ok((problem.num_objectives(), problem.num_items()))
    }

    /// The loaded problem, if any.
    pub fn problem(&self) -> Option<&ProblemModel> {
        self.problem.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Iterations run since the last `set_parameters`.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The active parameters (defaults until `set_parameters` succeeds).
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The working population.
    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    /// The Pareto archive.
    pub fn archive(&self) -> &ParetoArchive {
        &self.archive
    }

    /// Counters collected since the last `set_parameters`.
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Wall time of the most recent iteration.
    pub fn last_iteration_time(&self) -> Option<Duration> {
        self.last_iteration_time
    }

    /// Message of the most recent error returned by this session.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn step(&mut self) -> Result<()> {
        let start = Instant::now();
        let (Some(problem), Some(perturbation), Some(local_search)) = (
            self.problem.as_deref(),
            self.perturbation.as_ref(),
            self.local_search.as_mut(),
        ) else {
            return Err(MokpError::NotInitialized("session has no active run".into()));
        };

        let mut rng = self.rng.clone();
        let mut repaired = 0;
        let mut moves = 0;
        self.offspring.clear();
        self.offspring.try_reserve_exact(self.population.len())?;
        for member in &self.population {
            let perturbed = perturbation.perturb(problem, member, &mut rng);
            if perturbed.repaired > 0 {
                repaired += 1;
            }
            let improved = local_search.improve(problem, perturbed.solution, &mut rng);
            moves += improved.moves;
            self.offspring.push(improved.solution);
        }

        // with room reserved the updates below cannot fail
        self.archive.try_reserve(self.offspring.len())?;
        self.stats.archive_sizes.try_reserve(1)?;
        for child in &self.offspring {
            self.archive.update(child.clone())?;
        }

        std::mem::swap(&mut self.population, &mut self.offspring);
        self.rng = rng;
        self.iteration += 1;
        self.stats.iterations += 1;
        self.stats.repaired_perturbations += repaired;
        self.stats.accepted_moves += moves;
        self.stats.archive_sizes.push(self.archive.len());
        let elapsed = start.elapsed();
        self.last_iteration_time = Some(elapsed);

        debug!(
            event = "iteration",
            iteration = self.iteration,
            archive_size = self.archive.len(),
            elapsed_us = elapsed.as_micros() as u64,
        );
        Ok(())
    }

    fn check_runnable(&self, op: &'static str) -> Result<()> {
        self.require_problem(op)?;
        let runnable = matches!(self.state, SolverState::Ready | SolverState::Running)
            && self.iteration < self.parameters.max_iterations;
        if runnable {
            Ok(())
        } else {
            self.fail(op, self.invalid_state(op))
        }
    }

    fn require_problem(&self, op: &'static str) -> Result<Arc<ProblemModel>> {
        match &self.problem {
            Some(p) => Ok(Arc::clone(p)),
            None => self.fail(
                op,
                MokpError::NotInitialized(format!("`{op}` requires a loaded problem")),
            ),
        }
    }

    fn invalid_state(&self, operation: &'static str) -> MokpError {
        MokpError::InvalidState {
            operation,
            state: self.state,
        }
    }

    /// Records `err` as the last error and returns it.
    fn fail<T>(&self, op: &'static str, err: MokpError) -> Result<T> {
        match &err {
            MokpError::NotInitialized(_) | MokpError::InvalidState { .. } => {
                warn!(event = "rejected", operation = op, state = %self.state, error = %err);
            }
            _ => debug!(event = "failed", operation = op, error = %err),
        }
        *self.last_error.borrow_mut() = Some(err.to_string());
        Err(err)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dominance::strictly_dominates;

    fn scenario() -> ProblemModel {
        ProblemModel::new(
            vec![10.0, 15.0],
            vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
            vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
        )
        .unwrap()
    }

    /// 30 items, 3 objectives, deterministic pseudo-random data.
    fn medium() -> ProblemModel {
        let n = 30;
        let m = 3;
        let mut x: u64 = 12345;
        let mut next = || {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((x >> 33) % 90 + 10) as f64
        };
        let weights: Vec<Vec<f64>> = (0..m).map(|_| (0..n).map(|_| next()).collect()).collect();
        let profits: Vec<Vec<f64>> = (0..m).map(|_| (0..n).map(|_| next()).collect()).collect();
        let capacities = weights.iter().map(|r| r.iter().sum::<f64>() / 2.0).collect();
        ProblemModel::new(capacities, weights, profits).unwrap()
    }

    fn ready(problem: ProblemModel, params: Parameters) -> Session {
        let mut s = Session::new();
        s.load_problem(problem).unwrap();
        s.set_parameters(params).unwrap();
        s
    }

    fn assert_archive_invariants(session: &Session) {
        let problem = session.problem().unwrap();
        let members = session.archive().members();
        for a in members {
            assert!(a.is_feasible(problem));
            for b in members {
                assert!(!strictly_dominates(a.objectives(), b.objectives(), problem.sense()));
            }
        }
    }

    #[test]
    fn test_new_session_is_uninitialized() {
        let s = Session::new();
        assert_eq!(s.state(), SolverState::Uninitialized);
        assert!(s.last_error().is_none());
        assert_eq!(Session::default_parameters(), Parameters::default());
    }

    #[test]
    fn test_operations_before_load() {
        let mut s = Session::new();
        assert!(matches!(
            s.run_single_iteration(),
            Err(MokpError::NotInitialized(_))
        ));
        assert!(matches!(
            s.set_parameters(Parameters::default()),
            Err(MokpError::NotInitialized(_))
        ));
        assert!(matches!(s.pareto_size(), Err(MokpError::NotInitialized(_))));
        assert!(matches!(
            s.evaluate_solution(&[true]),
            Err(MokpError::NotInitialized(_))
        ));
        assert!(s.last_error().unwrap().contains("evaluate_solution"));
    }

    #[test]
    fn test_run_before_parameters_is_invalid_state() {
        let mut s = Session::new();
        s.load_problem(scenario()).unwrap();
        assert_eq!(s.state(), SolverState::ProblemLoaded);
        let err = s.run_single_iteration().unwrap_err();
        assert!(matches!(
            err,
            MokpError::InvalidState {
                state: SolverState::ProblemLoaded,
                ..
            }
        ));
        assert_eq!(s.last_error(), Some(err.to_string()));
        assert_eq!(s.pareto_size().unwrap(), 0);
    }

    #[test]
    fn test_reload_allowed_only_before_parameters() {
        let mut s = Session::new();
        s.load_problem(scenario()).unwrap();
        s.load_problem(medium()).unwrap();
        assert_eq!(s.problem_info().unwrap(), (3, 30));

        s.set_parameters(Parameters::default()).unwrap();
        assert!(matches!(
            s.load_problem(scenario()),
            Err(MokpError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_set_parameters_builds_population_and_archive() {
        let s = ready(scenario(), Parameters::default().with_population_size(6));
        assert_eq!(s.state(), SolverState::Ready);
        assert_eq!(s.population().len(), 6);
        assert!(s.pareto_size().unwrap() >= 1);
        assert!(s.population().iter().all(|p| p.is_feasible(&scenario())));
        assert_archive_invariants(&s);
    }

    #[test]
    fn test_invalid_parameters_leave_session_untouched() {
        let mut s = ready(scenario(), Parameters::default().with_seed(3));
        let before: Vec<Solution> = s.archive().members().to_vec();

        let err = s
            .set_parameters(Parameters::default().with_perturbation_rate(2.0))
            .unwrap_err();
        assert!(matches!(err, MokpError::InvalidParameter(_)));
        assert_eq!(s.state(), SolverState::Ready);
        assert_eq!(s.parameters().seed, Some(3));
        assert_eq!(s.archive().members(), &before[..]);

        // archive cap below 2 * objectives
        assert!(s
            .set_parameters(Parameters::default().with_archive_size(Some(3)))
            .is_err());
    }

    #[test]
    fn test_single_iterations_then_complete() {
        let mut s = ready(scenario(), Parameters::default().with_max_iterations(3));
        s.run_single_iteration().unwrap();
        assert_eq!(s.state(), SolverState::Running);
        s.run_single_iteration().unwrap();
        s.run_single_iteration().unwrap();
        assert_eq!(s.state(), SolverState::Completed);
        assert_eq!(s.iteration(), 3);
        assert!(s.last_iteration_time().is_some());

        let err = s.run_single_iteration().unwrap_err();
        assert!(matches!(
            err,
            MokpError::InvalidState {
                state: SolverState::Completed,
                ..
            }
        ));
    }

    #[test]
    fn test_run_optimization_bounds_by_budget() {
        let mut s = ready(medium(), Parameters::default().with_max_iterations(15));
        s.run_single_iteration().unwrap();
        assert_eq!(s.run_optimization(1000).unwrap(), 14);
        assert_eq!(s.iteration(), 15);
        assert_eq!(s.state(), SolverState::Completed);
        assert!(matches!(
            s.run_optimization(1),
            Err(MokpError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_run_optimization_rejects_zero() {
        let mut s = ready(scenario(), Parameters::default());
        assert!(matches!(
            s.run_optimization(0),
            Err(MokpError::InvalidParameter(_))
        ));
        assert_eq!(s.state(), SolverState::Ready);
    }

    #[test]
    fn test_archive_invariants_after_run() {
        let mut s = ready(
            medium(),
            Parameters::default()
                .with_max_iterations(25)
                .with_archive_size(Some(12))
                .with_seed(5),
        );
        s.run_optimization(25).unwrap();
        assert!(s.pareto_size().unwrap() <= 12);
        assert_archive_invariants(&s);
        assert!(s.population().iter().all(|p| p.is_feasible(s.problem().unwrap())));
    }

    #[test]
    fn test_strict_kappa_run() {
        let mut s = ready(
            medium(),
            Parameters::default().with_kappa(0.0).with_max_iterations(10),
        );
        s.run_optimization(10).unwrap();
        assert_archive_invariants(&s);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let run = || {
            let mut s = ready(
                medium(),
                Parameters::default().with_max_iterations(20).with_seed(77),
            );
            s.run_optimization(20).unwrap();
            s.archive()
                .iter()
                .map(|m| m.objectives().to_vec())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_stats_track_iterations() {
        let mut s = ready(medium(), Parameters::default().with_max_iterations(8));
        s.run_optimization(8).unwrap();
        let stats = s.stats();
        assert_eq!(stats.iterations, 8);
        assert_eq!(stats.archive_sizes.len(), 8);
        assert_eq!(*stats.archive_sizes.last().unwrap(), s.pareto_size().unwrap());
    }

    #[test]
    fn test_evaluate_solution_is_pure() {
        let s = ready(scenario(), Parameters::default());
        let archive_before = s.archive().members().to_vec();

        let sel = [true, false, false, false, true];
        let a = s.evaluate_solution(&sel).unwrap();
        let b = s.evaluate_solution(&sel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.objectives(), &[5.0, 9.0]);
        assert_eq!(a.capacities_used(), &[3.0, 3.0]);
        assert_eq!(s.archive().members(), &archive_before[..]);
    }

    #[test]
    fn test_is_feasible_scenario() {
        let mut s = Session::new();
        s.load_problem(scenario()).unwrap();
        assert!(s.is_feasible(&[true, false, false, false, true]).unwrap());
        assert!(!s.is_feasible(&[true; 5]).unwrap());
        assert!(s.is_feasible(&[false; 5]).unwrap());
        assert!(matches!(
            s.is_feasible(&[true; 3]),
            Err(MokpError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_pareto_solutions_limit() {
        let mut s = ready(medium(), Parameters::default().with_max_iterations(10));
        s.run_optimization(10).unwrap();
        let size = s.pareto_size().unwrap();
        assert_eq!(s.pareto_solutions(usize::MAX).unwrap().len(), size);
        assert_eq!(s.pareto_solutions(1).unwrap().len(), 1.min(size));
        assert!(s.pareto_solutions(0).unwrap().is_empty());
    }

    #[test]
    fn test_load_problem_parts_validates() {
        let mut s = Session::new();
        let err = s
            .load_problem_parts(
                2,
                2,
                &[10.0, 10.0],
                &[vec![1.0, 1.0], vec![1.0]],
                &[vec![1.0, 1.0], vec![1.0, 1.0]],
            )
            .unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));
        assert_eq!(s.state(), SolverState::Uninitialized);
        assert!(s.last_error().is_some());
    }

    #[test]
    fn test_rounding_instance_builds_feasible_archive() {
        // 0.1 + 0.2 + 0.3 exceeds 0.6 when summed in index order
        let p = ProblemModel::new(
            vec![0.6, 10.0],
            vec![vec![0.1, 0.2, 0.3], vec![1.0, 1.0, 1.0]],
            vec![vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]],
        )
        .unwrap();
        for seed in 0..20 {
            let mut s = ready(
                p.clone(),
                Parameters::default().with_seed(seed).with_max_iterations(5),
            );
            assert_archive_invariants(&s);
            assert!(s.population().iter().all(|m| m.is_feasible(&p)));
            s.run_optimization(5).unwrap();
            assert_archive_invariants(&s);
        }
    }

    #[test]
    fn test_generation_replaces_population_as_a_whole() {
        let mut s = ready(medium(), Parameters::default().with_max_iterations(4));
        for k in 1..=4 {
            s.run_single_iteration().unwrap();
            assert_eq!(s.population().len(), Parameters::default().population_size);
            assert_eq!(s.stats().iterations, k);
            assert_eq!(s.stats().archive_sizes.len(), k);
            assert_eq!(s.iteration(), k);
        }
        assert_archive_invariants(&s);
    }

    #[test]
    fn test_cleanup_resets_random_stream() {
        let mut s = ready(scenario(), Parameters::default().with_seed(9));
        s.run_single_iteration().unwrap();
        s.cleanup();
        let fresh = Session::new();
        assert_eq!(s.rng, fresh.rng);
        assert_eq!(s.parameters(), &Parameters::default());

        // a reused session replays the same run as a fresh one
        let run = |mut session: Session| {
            session.load_problem(scenario()).unwrap();
            session.set_parameters(Parameters::default().with_max_iterations(3)).unwrap();
            session.run_optimization(3).unwrap();
            session.archive().members().to_vec()
        };
        assert_eq!(run(s), run(fresh));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut s = ready(scenario(), Parameters::default());
        s.run_single_iteration().unwrap();
        s.cleanup();
        assert_eq!(s.state(), SolverState::Uninitialized);
        assert!(s.problem().is_none());
        assert!(s.archive().is_empty());
        s.cleanup();
        assert_eq!(s.state(), SolverState::Uninitialized);

        // a cleaned session can be reused
        s.load_problem(scenario()).unwrap();
        s.set_parameters(Parameters::default()).unwrap();
        assert!(s.pareto_size().unwrap() > 0);
    }
}
