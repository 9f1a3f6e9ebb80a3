//! Bounded-depth neighborhood descent.
//!
//! The neighborhood of a selection is every feasible selection reachable by
//! one add, one drop, or one swap (drop one selected item and add one
//! unselected item). Neighbors are evaluated incrementally from the current
//! objective and usage vectors.

use crate::dominance::{epsilon_dominates, strictly_dominates, ObjectiveSense};
use crate::error::{MokpError, Result};
use crate::problem::{ProblemModel, MAX_OBJECTIVES};
use crate::solution::Solution;
use rand::seq::SliceRandom;
use rand::Rng;

/// A single neighborhood move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Select an unselected item.
    Add(usize),
    /// Deselect a selected item.
    Drop(usize),
    /// Deselect `out` and select `into`.
    Swap {
        /// Item leaving the selection.
        out: usize,
        /// Item entering the selection.
        into: usize,
    },
}

impl Move {
    /// The move that reverts this one.
    pub fn inverse(self) -> Move {
        match self {
            Move::Add(i) => Move::Drop(i),
            Move::Drop(i) => Move::Add(i),
            Move::Swap { out, into } => Move::Swap {
                out: into,
                into: out,
            },
        }
    }
}

/// Output of [`LocalSearch::improve`].
#[derive(Debug, Clone)]
pub struct Improved {
    /// The final solution. Feasible whenever the input was.
    pub solution: Solution,

    /// Number of moves accepted (at most the search depth).
    pub moves: usize,
}

/// First-improvement local search with kappa-tolerant acceptance.
///
/// Each step shuffles the selected and unselected items, then scans add
/// moves, swap moves and drop moves in that order. The first feasible
/// neighbor that is accepted becomes the current solution:
///
/// - `kappa = 0`: the neighbor must strictly dominate the current solution.
/// - `kappa > 0`: the neighbor must epsilon-dominate the current solution
///   and differ from it in objective space.
///
/// The inverse of the previous move is skipped, so a step never undoes the
/// one before it. The search stops after `depth` accepted moves or when a
/// full scan accepts nothing.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_mokp::operators::LocalSearch;
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
/// let mut ls = LocalSearch::new(0.0, 2).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let out = ls.improve(&problem, Solution::empty(&problem), &mut rng);
/// assert_eq!(out.moves, 2);
/// assert_eq!(out.solution.selected_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearch {
    kappa: f64,
    depth: usize,
    selected: Vec<usize>,
    unselected: Vec<usize>,
}

impl LocalSearch {
    /// Creates a local search with acceptance tolerance `kappa` and at most
    /// `depth` accepted moves per call.
    ///
    /// # Errors
    ///
    /// [`MokpError::InvalidParameter`] if `kappa` is negative or not finite.
    pub fn new(kappa: f64, depth: usize) -> Result<Self> {
        if !kappa.is_finite() || kappa < 0.0 {
            return Err(MokpError::InvalidParameter(format!(
                "kappa must be finite and non-negative, got {kappa}"
            )));
        }
        Ok(Self {
            kappa,
            depth,
            selected: Vec::new(),
            unselected: Vec::new(),
        })
    }

    /// Acceptance tolerance.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Maximum accepted moves per call.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` if a neighbor with objectives `candidate` replaces a
    /// current solution with objectives `current`.
    pub fn accepts(&self, candidate: &[f64], current: &[f64], sense: ObjectiveSense) -> bool {
        if self.kappa == 0.0 {
            strictly_dominates(candidate, current, sense)
        } else {
            candidate != current && epsilon_dominates(candidate, current, self.kappa, sense)
        }
    }

    /// Runs up to `depth` improvement steps starting from `solution`.
    pub fn improve<R: Rng>(
        &mut self,
        problem: &ProblemModel,
        solution: Solution,
        rng: &mut R,
    ) -> Improved {
        let mut current = solution;
        let mut last: Option<Move> = None;
        let mut moves = 0;

        while moves < self.depth {
            let Some(mv) = self.find_move(problem, &current, last, rng) else {
                break;
            };

            let mut selection = current.selection().to_vec();
            apply(&mut selection, mv);
            let next = Solution::evaluate(problem, selection);
            // incremental sums can differ from a fresh evaluation in the
            // last bits; the fresh one decides
            if !next.is_feasible(problem) && current.is_feasible(problem) {
                break;
            }
            current = next;
            last = Some(mv);
            moves += 1;
        }

        Improved {
            solution: current,
            moves,
        }
    }

    /// Scans the neighborhood of `current` and returns the first accepted
    /// move, skipping the inverse of `last`.
    fn find_move<R: Rng>(
        &mut self,
        problem: &ProblemModel,
        current: &Solution,
        last: Option<Move>,
        rng: &mut R,
    ) -> Option<Move> {
        let m = problem.num_objectives();
        let sense = problem.sense();
        let obj = current.objectives();
        let forbidden = last.map(Move::inverse);

        self.selected.clear();
        self.unselected.clear();
        for (i, &s) in current.selection().iter().enumerate() {
            if s {
                self.selected.push(i);
            } else {
                self.unselected.push(i);
            }
        }
        self.selected.shuffle(rng);
        self.unselected.shuffle(rng);

        let mut cand_obj = [0.0; MAX_OBJECTIVES];

        let candidates = self
            .unselected
            .iter()
            .map(|&j| Move::Add(j))
            .chain(self.selected.iter().flat_map(|&i| {
                self.unselected
                    .iter()
                    .map(move |&j| Move::Swap { out: i, into: j })
            }))
            .chain(self.selected.iter().map(|&i| Move::Drop(i)));

        for mv in candidates {
            if Some(mv) == forbidden {
                continue;
            }
            let (out, into) = match mv {
                Move::Add(j) => (None, Some(j)),
                Move::Drop(i) => (Some(i), None),
                Move::Swap { out, into } => (Some(out), Some(into)),
            };
            let feasible = neighbor(
                problem,
                current,
                out,
                into,
                &mut cand_obj[..m],
            );
            if feasible && self.accepts(&cand_obj[..m], obj, sense) {
                return Some(mv);
            }
        }

        None
    }
}

/// Writes the objectives of `current` with `out` removed and `into` added;
/// returns false if a capacity would be exceeded.
fn neighbor(
    problem: &ProblemModel,
    current: &Solution,
    out: Option<usize>,
    into: Option<usize>,
    objectives: &mut [f64],
) -> bool {
    let caps = problem.capacities();
    for o in 0..objectives.len() {
        let mut p = current.objectives()[o];
        let mut w = current.capacities_used()[o];
        if let Some(i) = out {
            p -= problem.profit(o, i);
            w -= problem.weight(o, i);
        }
        if let Some(j) = into {
            p += problem.profit(o, j);
            w += problem.weight(o, j);
        }
        if w > caps[o] {
            return false;
        }
        objectives[o] = p;
    }
    true
}

fn apply(selection: &mut [bool], mv: Move) {
    match mv {
        Move::Add(j) => selection[j] = true,
        Move::Drop(i) => selection[i] = false,
        Move::Swap { out, into } => {
            selection[out] = false;
            selection[into] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scenario() -> ProblemModel {
        ProblemModel::new(
            vec![10.0, 15.0],
            vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
            vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_kappa_validation() {
        assert!(LocalSearch::new(0.0, 5).is_ok());
        assert!(matches!(
            LocalSearch::new(-0.1, 5),
            Err(MokpError::InvalidParameter(_))
        ));
        assert!(LocalSearch::new(f64::INFINITY, 5).is_err());
    }

    #[test]
    fn test_inverse() {
        assert_eq!(Move::Add(3).inverse(), Move::Drop(3));
        assert_eq!(Move::Drop(3).inverse(), Move::Add(3));
        assert_eq!(
            Move::Swap { out: 1, into: 2 }.inverse(),
            Move::Swap { out: 2, into: 1 }
        );
    }

    #[test]
    fn test_accepts_strict_when_kappa_zero() {
        let ls = LocalSearch::new(0.0, 1).unwrap();
        let sense = ObjectiveSense::Maximize;
        assert!(ls.accepts(&[5.0, 9.0], &[5.0, 8.0], sense));
        assert!(!ls.accepts(&[5.0, 9.0], &[5.0, 9.0], sense));
        assert!(!ls.accepts(&[6.0, 7.0], &[5.0, 9.0], sense));
    }

    #[test]
    fn test_accepts_tolerant_when_kappa_positive() {
        let ls = LocalSearch::new(0.1, 1).unwrap();
        let sense = ObjectiveSense::Maximize;
        // within 10% on the second objective, better on the first
        assert!(ls.accepts(&[6.0, 8.5], &[5.0, 9.0], sense));
        // identical point is never a move
        assert!(!ls.accepts(&[5.0, 9.0], &[5.0, 9.0], sense));
        // more than 10% worse
        assert!(!ls.accepts(&[6.0, 8.0], &[5.0, 9.0], sense));
    }

    #[test]
    fn test_depth_zero_is_identity() {
        let p = scenario();
        let mut ls = LocalSearch::new(0.0, 0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let start = Solution::from_items(&p, &[0]);
        let out = ls.improve(&p, start.clone(), &mut rng);
        assert_eq!(out.moves, 0);
        assert_eq!(out.solution, start);
    }

    #[test]
    fn test_strict_search_never_gets_worse() {
        let p = scenario();
        let mut ls = LocalSearch::new(0.0, 5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let start = Solution::from_items(&p, &[4]);
        let out = ls.improve(&p, start.clone(), &mut rng);
        assert!(out.moves > 0);
        assert!(strictly_dominates(
            out.solution.objectives(),
            start.objectives(),
            ObjectiveSense::Maximize
        ));
    }

    #[test]
    fn test_halts_at_local_optimum() {
        // a single item that fits: selecting it dominates everything else
        let p = ProblemModel::new(
            vec![1.0, 1.0],
            vec![vec![1.0], vec![1.0]],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap();
        let mut ls = LocalSearch::new(0.0, 10).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = ls.improve(&p, Solution::empty(&p), &mut rng);
        assert_eq!(out.moves, 1);
        assert!(out.solution.is_selected(0));
    }

    #[test]
    fn test_no_immediate_undo() {
        // with a large kappa, dropping the only item would be accepted
        // right after adding it if undo moves were allowed
        let p = ProblemModel::new(
            vec![1.0, 1.0],
            vec![vec![1.0], vec![1.0]],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap();
        let mut ls = LocalSearch::new(1.0, 10).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = ls.improve(&p, Solution::empty(&p), &mut rng);
        assert_eq!(out.moves, 1);
        assert!(out.solution.is_selected(0));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let p = scenario();
        let run = |seed| {
            let mut ls = LocalSearch::new(0.05, 5).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            ls.improve(&p, Solution::from_items(&p, &[1]), &mut rng).solution
        };
        assert_eq!(run(8), run(8));
    }

    proptest! {
        #[test]
        fn prop_improve_keeps_feasibility(
            items in prop::collection::btree_set(0usize..5, 0..=5),
            kappa in 0.0f64..0.5,
            depth in 0usize..8,
            seed in any::<u64>(),
        ) {
            let p = scenario();
            let mut sel = vec![false; 5];
            for i in items {
                sel[i] = true;
            }
            crate::operators::repair(&p, &mut sel);
            let start = Solution::evaluate(&p, sel);

            let mut ls = LocalSearch::new(kappa, depth).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = ls.improve(&p, start, &mut rng);
            prop_assert!(out.solution.is_feasible(&p));
            prop_assert!(out.moves <= depth);
        }
    }
}
