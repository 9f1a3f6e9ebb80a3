//! Random bit-flip perturbation with greedy repair.

use crate::error::{MokpError, Result};
use crate::problem::{FeasibilityChecker, ProblemModel};
use crate::solution::Solution;
use rand::Rng;

/// Output of [`Perturbation::perturb`].
#[derive(Debug, Clone)]
pub struct Perturbed {
    /// The perturbed, repaired solution. Always feasible.
    pub solution: Solution,

    /// Number of items removed by repair (0 if the flips stayed feasible).
    pub repaired: usize,
}

/// Diversification step: flips a fixed number of distinct random bits.
///
/// The number of flips is `max(1, round(rate * num_items))`, capped at
/// `num_items`. If the result violates a capacity it is passed through
/// [`repair`].
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_mokp::operators::Perturbation;
/// use u_mokp::problem::ProblemModel;
/// use u_mokp::solution::Solution;
///
/// let problem = ProblemModel::new(
///     vec![10.0, 15.0],
///     vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
///     vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
/// )
/// .unwrap();
///
/// let op = Perturbation::new(0.4).unwrap();
/// assert_eq!(op.flip_count(5), 2);
///
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let start = Solution::from_items(&problem, &[0, 4]);
/// let out = op.perturb(&problem, &start, &mut rng);
/// assert!(out.solution.is_feasible(&problem));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    rate: f64,
}

impl Perturbation {
    /// Creates a perturbation flipping roughly `rate` of the items.
    ///
    /// # Errors
    ///
    /// [`MokpError::InvalidParameter`] if `rate` is outside `[0, 1]`.
    pub fn new(rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(MokpError::InvalidParameter(format!(
                "perturbation_rate must be in [0, 1], got {rate}"
            )));
        }
        Ok(Self { rate })
    }

    /// The flip fraction.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of bits flipped on a problem with `num_items` items.
    pub fn flip_count(&self, num_items: usize) -> usize {
        let k = (self.rate * num_items as f64).round() as usize;
        k.max(1).min(num_items)
    }

    /// Flips `flip_count` distinct uniformly chosen bits of `solution` and
    /// repairs the result.
    pub fn perturb<R: Rng>(
        &self,
        problem: &ProblemModel,
        solution: &Solution,
        rng: &mut R,
    ) -> Perturbed {
        let n = problem.num_items();
        let mut selection = solution.selection().to_vec();
        for i in rand::seq::index::sample(rng, n, self.flip_count(n)).iter() {
            selection[i] = !selection[i];
        }

        let repaired = repair(problem, &mut selection);
        Perturbed {
            solution: Solution::evaluate(problem, selection),
            repaired,
        }
    }
}

/// Removes selected items until `selection` is feasible, returning how many
/// were removed.
///
/// Each step drops the selected item with the lowest aggregate efficiency,
/// taking the lowest index on ties. Usage is updated incrementally and
/// confirmed with a fresh sum before stopping. Weights are non-negative, so
/// the loop ends at the latest when the selection is empty.
pub fn repair(problem: &ProblemModel, selection: &mut [bool]) -> usize {
    let checker = FeasibilityChecker::new(problem);
    let mut usage = checker.usage(selection);
    if checker.within_capacity(&usage) {
        return 0;
    }

    let mut candidates: Vec<usize> = (0..selection.len()).filter(|&i| selection[i]).collect();
    candidates.sort_by(|&a, &b| {
        problem
            .efficiency(a)
            .total_cmp(&problem.efficiency(b))
            .then(a.cmp(&b))
    });

    let mut removed = 0;
    for item in candidates {
        selection[item] = false;
        removed += 1;
        for (o, u) in usage.iter_mut().enumerate() {
            *u -= problem.weight(o, item);
        }
        // subtraction drifts from a fresh sum; the fresh one decides
        if checker.within_capacity(&usage) {
            usage = checker.usage(selection);
            if checker.within_capacity(&usage) {
                break;
            }
        }
    }

    removed
}
