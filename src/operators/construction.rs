//! Randomized greedy construction.
//!
//! # References
//!
//! - Efraimidis & Spirakis (2006), "Weighted random sampling with a reservoir"

use super::perturbation::repair;
use crate::problem::{FeasibilityChecker, ProblemModel};
use crate::solution::Solution;
use rand::Rng;

/// Builds feasible solutions by drawing items with probability
/// proportional to their aggregate efficiency.
///
/// Items are drawn without replacement. A drawn item is added if the
/// selection stays within every capacity; construction ends once every item
/// has been drawn, and a final [`repair`] pass drops anything a fresh
/// capacity sum rejects. The draw order is produced in one pass with exponential
/// keys `ln(u) / efficiency` sorted descending, which is distributed like
/// repeated roulette-wheel draws without replacement.
///
/// The struct only holds scratch space and can be reused across calls.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_mokp::operators::GreedyConstruction;
/// use u_mokp::problem::ProblemModel;
///
/// let problem = ProblemModel::new(
///     vec![10.0, 15.0],
///     vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
///     vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
/// )
/// .unwrap();
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let solution = GreedyConstruction::new().construct(&problem, &mut rng);
/// assert!(solution.is_feasible(&problem));
/// assert!(solution.selected_count() > 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreedyConstruction {
    keys: Vec<(f64, usize)>,
}

impl GreedyConstruction {
    /// Creates a construction heuristic with empty scratch space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one feasible solution.
    pub fn construct<R: Rng>(&mut self, problem: &ProblemModel, rng: &mut R) -> Solution {
        let n = problem.num_items();
        let checker = FeasibilityChecker::new(problem);

        self.keys.clear();
        self.keys.extend((0..n).map(|i| {
            // u in (0, 1] so that ln(u) is finite
            let u = 1.0 - rng.random::<f64>();
            let w = problem.efficiency(i);
            let key = if w > 0.0 { u.ln() / w } else { f64::NEG_INFINITY };
            (key, i)
        }));
        // descending key, ascending index on ties
        self.keys
            .sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut selection = vec![false; n];
        let mut usage = vec![0.0; problem.num_objectives()];
        for &(_, item) in &self.keys {
            if checker.fits(&usage, item) {
                selection[item] = true;
                for (o, u) in usage.iter_mut().enumerate() {
                    *u += problem.weight(o, item);
                }
            }
        }
        // draw-order sums can round below an index-order sum
        repair(problem, &mut selection);

        Solution::evaluate(problem, selection)
    }
}
