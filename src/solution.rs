//! Candidate item selections with their derived objective and usage vectors.

use crate::error::{MokpError, Result};
use crate::problem::{FeasibilityChecker, ProblemModel};

/// A candidate knapsack assignment.
///
/// `objectives` and `capacities_used` are cached sums over the selected
/// items. They are computed from the selection whenever a `Solution` is
/// built and cannot be modified independently, so they always agree with
/// `selection`.
///
/// # Examples
///
/// ```
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
/// let s = Solution::from_items(&problem, &[0, 4]);
/// assert_eq!(s.objectives(), &[5.0, 9.0]);
/// assert_eq!(s.capacities_used(), &[3.0, 3.0]);
/// assert!(s.is_feasible(&problem));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    selection: Vec<bool>,
    objectives: Vec<f64>,
    capacities_used: Vec<f64>,
}

impl Solution {
    /// Evaluates a selection against `problem`.
    ///
    /// `selection.len()` must equal `problem.num_items()`; use
    /// [`try_evaluate`](Self::try_evaluate) for unchecked input.
    pub fn evaluate(problem: &ProblemModel, selection: Vec<bool>) -> Self {
        debug_assert_eq!(selection.len(), problem.num_items());

        let m = problem.num_objectives();
        let mut objectives = vec![0.0; m];
        let mut capacities_used = vec![0.0; m];
        for (i, _) in selection.iter().enumerate().filter(|(_, &s)| s) {
            for o in 0..m {
                objectives[o] += problem.profit(o, i);
                capacities_used[o] += problem.weight(o, i);
            }
        }

        Self {
            selection,
            objectives,
            capacities_used,
        }
    }

    /// Evaluates a selection supplied from outside the engine.
    ///
    /// # Errors
    ///
    /// [`MokpError::MalformedInput`] if the selection length does not match
    /// the number of items.
    pub fn try_evaluate(problem: &ProblemModel, selection: Vec<bool>) -> Result<Self> {
        if selection.len() != problem.num_items() {
            return Err(MokpError::MalformedInput(format!(
                "selection has {} entries, problem has {} items",
                selection.len(),
                problem.num_items()
            )));
        }
        Ok(Self::evaluate(problem, selection))
    }

    /// The empty selection: zero objectives, zero usage, always feasible.
    pub fn empty(problem: &ProblemModel) -> Self {
        Self::evaluate(problem, vec![false; problem.num_items()])
    }

    /// Builds a solution selecting exactly the listed items.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    pub fn from_items(problem: &ProblemModel, items: &[usize]) -> Self {
        let mut selection = vec![false; problem.num_items()];
        for &i in items {
            selection[i] = true;
        }
        Self::evaluate(problem, selection)
    }

    /// Selection bits, one per item.
    #[inline]
    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    /// Objective vector.
    #[inline]
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// Capacity used on every constraint.
    #[inline]
    pub fn capacities_used(&self) -> &[f64] {
        &self.capacities_used
    }

    /// Whether `item` is selected.
    #[inline]
    pub fn is_selected(&self, item: usize) -> bool {
        self.selection[item]
    }

    /// Number of selected items.
    pub fn selected_count(&self) -> usize {
        self.selection.iter().filter(|&&s| s).count()
    }

    /// Indices of the selected items, ascending.
    pub fn selected_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.selection
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
    }

    /// Whether the cached usage respects every capacity of `problem`.
    pub fn is_feasible(&self, problem: &ProblemModel) -> bool {
        FeasibilityChecker::new(problem).within_capacity(&self.capacities_used)
    }

    /// Consumes the solution and returns its selection.
    pub fn into_selection(self) -> Vec<bool> {
        self.selection
    }
}
