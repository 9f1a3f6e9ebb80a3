//! Immutable MOKP instance description.

use crate::dominance::ObjectiveSense;
use crate::error::{MokpError, Result};

/// Smallest supported number of objectives.
pub const MIN_OBJECTIVES: usize = 2;

/// Largest supported number of objectives (and capacity constraints).
pub const MAX_OBJECTIVES: usize = 4;

/// Normalized weight below which an item is treated as weightless when
/// computing its efficiency.
const WEIGHTLESS_EPS: f64 = 1e-12;

/// A multi-objective multidimensional knapsack instance.
///
/// Objective `o` has its own capacity `capacities[o]`, and item `i`
/// consumes `weight(o, i)` of it while contributing `profit(o, i)` to
/// objective `o`. Matrices are stored objective-major.
///
/// The model is validated once at construction and never mutated
/// afterwards; sessions share it read-only.
///
/// # Examples
///
/// ```
/// use u_mokp::problem::ProblemModel;
///
/// let problem = ProblemModel::new(
///     vec![10.0, 15.0],
///     vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
///     vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
/// )
/// .unwrap();
/// assert_eq!(problem.num_items(), 5);
/// assert_eq!(problem.num_objectives(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemModel {
    num_items: usize,
    num_objectives: usize,
    capacities: Vec<f64>,
    weights: Vec<Vec<f64>>,
    profits: Vec<Vec<f64>>,
    efficiency: Vec<f64>,
    sense: ObjectiveSense,
}

impl ProblemModel {
    /// Builds and validates a problem from objective-major matrices.
    ///
    /// The number of objectives is taken from `capacities.len()` and the
    /// number of items from the first weight row.
    ///
    /// # Errors
    ///
    /// - [`MokpError::InvalidParameter`] if the objective count is outside
    ///   `[2, 4]` or there are no items.
    /// - [`MokpError::MalformedInput`] if the matrices are not rectangular,
    ///   a value is negative or non-finite, or a capacity is not strictly
    ///   positive.
    pub fn new(capacities: Vec<f64>, weights: Vec<Vec<f64>>, profits: Vec<Vec<f64>>) -> Result<Self> {
        let num_objectives = capacities.len();
        if !(MIN_OBJECTIVES..=MAX_OBJECTIVES).contains(&num_objectives) {
            return Err(MokpError::InvalidParameter(format!(
                "number of objectives must be in [{MIN_OBJECTIVES}, {MAX_OBJECTIVES}], got {num_objectives}"
            )));
        }
        if weights.len() != num_objectives || profits.len() != num_objectives {
            return Err(MokpError::MalformedInput(format!(
                "expected {num_objectives} weight and profit rows, got {} and {}",
                weights.len(),
                profits.len()
            )));
        }

        let num_items = weights[0].len();
        if num_items == 0 {
            return Err(MokpError::InvalidParameter(
                "number of items must be at least 1".into(),
            ));
        }

        for (o, &c) in capacities.iter().enumerate() {
            if !c.is_finite() || c <= 0.0 {
                return Err(MokpError::MalformedInput(format!(
                    "capacity {o} must be finite and strictly positive, got {c}"
                )));
            }
        }
        check_matrix("weight", &weights, num_items)?;
        check_matrix("profit", &profits, num_items)?;

        let efficiency = (0..num_items)
            .map(|i| {
                let gain: f64 = profits.iter().map(|row| row[i]).sum();
                let load: f64 = weights
                    .iter()
                    .zip(capacities.iter())
                    .map(|(row, &c)| row[i] / c)
                    .sum();
                gain / load.max(WEIGHTLESS_EPS)
            })
            .collect();

        Ok(Self {
            num_items,
            num_objectives,
            capacities,
            weights,
            profits,
            efficiency,
            sense: ObjectiveSense::default(),
        })
    }

    /// Builds a problem from explicitly declared dimensions, checking that
    /// the supplied data matches them.
    ///
    /// This is the shape in which host bindings hand problems over.
    pub fn from_parts(
        num_items: usize,
        num_objectives: usize,
        capacities: &[f64],
        weights: &[Vec<f64>],
        profits: &[Vec<f64>],
    ) -> Result<Self> {
        if !(MIN_OBJECTIVES..=MAX_OBJECTIVES).contains(&num_objectives) {
            return Err(MokpError::InvalidParameter(format!(
                "number of objectives must be in [{MIN_OBJECTIVES}, {MAX_OBJECTIVES}], got {num_objectives}"
            )));
        }
        if num_items == 0 {
            return Err(MokpError::InvalidParameter(
                "number of items must be at least 1".into(),
            ));
        }
        if capacities.len() != num_objectives {
            return Err(MokpError::MalformedInput(format!(
                "expected {num_objectives} capacities, got {}",
                capacities.len()
            )));
        }
        if weights.len() != num_objectives || profits.len() != num_objectives {
            return Err(MokpError::MalformedInput(format!(
                "expected {num_objectives} weight and profit rows, got {} and {}",
                weights.len(),
                profits.len()
            )));
        }
        if let Some(row) = weights.iter().chain(profits.iter()).find(|r| r.len() != num_items) {
            return Err(MokpError::MalformedInput(format!(
                "expected rows of {num_items} items, found a row of {}",
                row.len()
            )));
        }

        Self::new(capacities.to_vec(), weights.to_vec(), profits.to_vec())
    }

    /// Sets the optimization sense of every objective.
    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = sense;
        self
    }

    /// Number of items.
    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Number of objectives (equal to the number of capacity constraints).
    #[inline]
    pub fn num_objectives(&self) -> usize {
        self.num_objectives
    }

    /// Capacity of every constraint.
    #[inline]
    pub fn capacities(&self) -> &[f64] {
        &self.capacities
    }

    /// Weight of item `item` on constraint `objective`.
    #[inline]
    pub fn weight(&self, objective: usize, item: usize) -> f64 {
        self.weights[objective][item]
    }

    /// Profit of item `item` on objective `objective`.
    #[inline]
    pub fn profit(&self, objective: usize, item: usize) -> f64 {
        self.profits[objective][item]
    }

    /// Weight row of one constraint.
    #[inline]
    pub fn weights(&self, objective: usize) -> &[f64] {
        &self.weights[objective]
    }

    /// Profit row of one objective.
    #[inline]
    pub fn profits(&self, objective: usize) -> &[f64] {
        &self.profits[objective]
    }

    /// Aggregate profit-to-weight efficiency of an item.
    ///
    /// Total profit over the sum of capacity-normalized weights, so that
    /// constraints of different magnitude count equally. Weightless items
    /// get a very large efficiency.
    #[inline]
    pub fn efficiency(&self, item: usize) -> f64 {
        self.efficiency[item]
    }

    /// Optimization sense shared by all objectives.
    #[inline]
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }
}

fn check_matrix(name: &str, rows: &[Vec<f64>], num_items: usize) -> Result<()> {
    for (o, row) in rows.iter().enumerate() {
        if row.len() != num_items {
            return Err(MokpError::MalformedInput(format!(
                "{name} row {o} has {} entries, expected {num_items}",
                row.len()
            )));
        }
        if let Some((i, v)) = row.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(MokpError::MalformedInput(format!(
                "{name}[{o}][{i}] must be finite and non-negative, got {v}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ProblemModel {
        ProblemModel::new(
            vec![10.0, 15.0],
            vec![vec![2.0, 3.0, 4.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0, 2.0]],
            vec![vec![3.0, 4.0, 5.0, 6.0, 2.0], vec![5.0, 6.0, 7.0, 8.0, 4.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let p = small();
        assert_eq!(p.num_items(), 5);
        assert_eq!(p.num_objectives(), 2);
        assert_eq!(p.capacities(), &[10.0, 15.0]);
        assert_eq!(p.weight(1, 3), 4.0);
        assert_eq!(p.profit(0, 4), 2.0);
        assert_eq!(p.sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn test_efficiency() {
        let p = small();
        // item 4: profit 2 + 4 = 6, load 1/10 + 2/15
        let expected = 6.0 / (0.1 + 2.0 / 15.0);
        assert!((p.efficiency(4) - expected).abs() < 1e-9);
        // item 0: 8 / (0.2 + 1/15) = 30, the best; item 3: 14 / (0.5 + 4/15), the worst
        let best = (0..5)
            .max_by(|&a, &b| p.efficiency(a).partial_cmp(&p.efficiency(b)).unwrap())
            .unwrap();
        let worst = (0..5)
            .min_by(|&a, &b| p.efficiency(a).partial_cmp(&p.efficiency(b)).unwrap())
            .unwrap();
        assert_eq!(best, 0);
        assert_eq!(worst, 3);
    }

    #[test]
    fn test_weightless_item_is_most_efficient() {
        let p = ProblemModel::new(
            vec![5.0, 5.0],
            vec![vec![0.0, 1.0], vec![0.0, 1.0]],
            vec![vec![1.0, 100.0], vec![1.0, 100.0]],
        )
        .unwrap();
        assert!(p.efficiency(0) > p.efficiency(1));
    }

    #[test]
    fn test_rejects_objective_count() {
        let err = ProblemModel::new(vec![1.0], vec![vec![1.0]], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, MokpError::InvalidParameter(_)));

        let err = ProblemModel::new(
            vec![1.0; 5],
            vec![vec![1.0]; 5],
            vec![vec![1.0]; 5],
        )
        .unwrap_err();
        assert!(matches!(err, MokpError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = ProblemModel::new(
            vec![1.0, 1.0],
            vec![vec![1.0, 2.0], vec![1.0]],
            vec![vec![1.0, 2.0], vec![1.0, 2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let err = ProblemModel::new(
            vec![1.0, 1.0],
            vec![vec![1.0, -2.0], vec![1.0, 1.0]],
            vec![vec![1.0, 2.0], vec![1.0, 2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));

        let err = ProblemModel::new(
            vec![1.0, 1.0],
            vec![vec![1.0, 2.0], vec![1.0, 1.0]],
            vec![vec![1.0, f64::NAN], vec![1.0, 2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        let err = ProblemModel::new(
            vec![0.0, 1.0],
            vec![vec![1.0], vec![1.0]],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));
    }

    #[test]
    fn test_rejects_empty_items() {
        let err = ProblemModel::new(vec![1.0, 1.0], vec![vec![], vec![]], vec![vec![], vec![]])
            .unwrap_err();
        assert!(matches!(err, MokpError::InvalidParameter(_)));
    }

    #[test]
    fn test_from_parts_checks_declared_dimensions() {
        let w = vec![vec![1.0, 2.0], vec![1.0, 2.0]];
        let p = vec![vec![1.0, 2.0], vec![1.0, 2.0]];
        assert!(ProblemModel::from_parts(2, 2, &[3.0, 3.0], &w, &p).is_ok());

        let err = ProblemModel::from_parts(3, 2, &[3.0, 3.0], &w, &p).unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));

        let err = ProblemModel::from_parts(2, 2, &[3.0], &w, &p).unwrap_err();
        assert!(matches!(err, MokpError::MalformedInput(_)));

        let err = ProblemModel::from_parts(2, 1, &[3.0], &w[..1], &p[..1]).unwrap_err();
        assert!(matches!(err, MokpError::InvalidParameter(_)));
    }

    #[test]
    fn test_with_sense() {
        let p = small().with_sense(ObjectiveSense::Minimize);
        assert_eq!(p.sense(), ObjectiveSense::Minimize);
    }
}
