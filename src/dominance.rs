//! Pareto dominance between objective vectors.
//!
//! The archive always uses strict dominance. The relaxed
//! [`epsilon_dominates`] test exists only for local-search acceptance.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Laumanns et al. (2002), "Combining Convergence and Diversity in
//!   Evolutionary Multiobjective Optimization"

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction in which every objective is optimized.
///
/// Knapsack profits are naturally maximized, which is the default. The
/// sense is carried by the problem so that callers state it explicitly
/// rather than having it inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    /// Higher values are better.
    #[default]
    Maximize,
    /// Lower values are better.
    Minimize,
}

impl ObjectiveSense {
    /// Returns `true` if `a` is strictly better than `b`.
    #[inline]
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            ObjectiveSense::Maximize => a > b,
            ObjectiveSense::Minimize => a < b,
        }
    }
}

impl fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveSense::Maximize => write!(f, "maximize"),
            ObjectiveSense::Minimize => write!(f, "minimize"),
        }
    }
}

/// Dominance comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other (including equal vectors).
    Neither,
}

/// Compares two objective vectors for strict Pareto dominance.
///
/// # Example
///
/// ```
/// use u_mokp::dominance::{dominance_cmp, Dominance, ObjectiveSense};
///
/// let sense = ObjectiveSense::Maximize;
/// assert_eq!(dominance_cmp(&[5.0, 9.0], &[4.0, 9.0], sense), Dominance::Left);
/// assert_eq!(dominance_cmp(&[5.0, 1.0], &[4.0, 9.0], sense), Dominance::Neither);
/// ```
pub fn dominance_cmp(a: &[f64], b: &[f64], sense: ObjectiveSense) -> Dominance {
    debug_assert_eq!(a.len(), b.len(), "objective vectors must have equal length");

    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if sense.better(va, vb) {
            a_better_in_some = true;
        } else if sense.better(vb, va) {
            b_better_in_some = true;
        }
        if a_better_in_some && b_better_in_some {
            return Dominance::Neither;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Returns `true` if `a` strictly dominates `b`: at least as good in every
/// objective and strictly better in at least one.
#[inline]
pub fn strictly_dominates(a: &[f64], b: &[f64], sense: ObjectiveSense) -> bool {
    dominance_cmp(a, b, sense) == Dominance::Left
}

/// Returns `true` if `a` epsilon-dominates `b` under relative tolerance
/// `kappa`.
///
/// For maximization this is `a[o] >= (1 - kappa) * b[o]` for every `o`;
/// for minimization `a[o] <= (1 + kappa) * b[o]`. With `kappa = 0` it is
/// weak dominance.
pub fn epsilon_dominates(a: &[f64], b: &[f64], kappa: f64, sense: ObjectiveSense) -> bool {
    debug_assert_eq!(a.len(), b.len(), "objective vectors must have equal length");
    debug_assert!(kappa >= 0.0, "kappa must be non-negative");

    match sense {
        ObjectiveSense::Maximize => a
            .iter()
            .zip(b.iter())
            .all(|(&va, &vb)| va >= (1.0 - kappa) * vb),
        ObjectiveSense::Minimize => a
            .iter()
            .zip(b.iter())
            .all(|(&va, &vb)| va <= (1.0 + kappa) * vb),
    }
}
