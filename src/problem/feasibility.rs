//! Capacity-constraint evaluation.

use super::model::ProblemModel;

/// Evaluates capacity constraints for item selections.
///
/// A selection is feasible iff, for every constraint `o`, the summed weight
/// of the selected items does not exceed `capacities[o]`. The empty
/// selection is always feasible.
///
/// All methods are pure functions of the problem and their arguments.
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityChecker<'a> {
    problem: &'a ProblemModel,
}

impl<'a> FeasibilityChecker<'a> {
    /// Creates a checker bound to `problem`.
    pub fn new(problem: &'a ProblemModel) -> Self {
        Self { problem }
    }

    /// Computes the capacity used on every constraint in one pass over the
    /// selection.
    pub fn usage(&self, selection: &[bool]) -> Vec<f64> {
        debug_assert_eq!(selection.len(), self.problem.num_items());

        let m = self.problem.num_objectives();
        let mut used = vec![0.0; m];
        for (i, _) in selection.iter().enumerate().filter(|(_, &s)| s) {
            for (o, u) in used.iter_mut().enumerate() {
                *u += self.problem.weight(o, i);
            }
        }
        used
    }

    /// Returns `true` if the selection respects every capacity.
    pub fn is_feasible(&self, selection: &[bool]) -> bool {
        self.within_capacity(&self.usage(selection))
    }

    /// Returns `true` if a usage vector respects every capacity.
    #[inline]
    pub fn within_capacity(&self, usage: &[f64]) -> bool {
        usage
            .iter()
            .zip(self.problem.capacities())
            .all(|(&u, &c)| u <= c)
    }

    /// Returns `true` if `item` can be added on top of `usage` without
    /// exceeding any capacity.
    #[inline]
    pub fn fits(&self, usage: &[f64], item: usize) -> bool {
        usage
            .iter()
            .zip(self.problem.capacities())
            .enumerate()
            .all(|(o, (&u, &c))| u + self.problem.weight(o, item) <= c)
    }
}
