//! Crowding distance for diversity-preserving pruning.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

/// Crowding distance assignment for diversity preservation.
///
/// Computes the crowding distance for each point, measuring how spread out
/// the points are in objective space. Higher distance means the point is
/// more isolated (more diverse).
///
/// For every objective with a non-zero range, each point holding the minimum
/// or the maximum value receives `f64::INFINITY`, ties included, so the
/// extremes of the front are never the least crowded. An objective on which
/// all points agree marks no extremes and adds nothing. The sort is stable:
/// among equal values, the lower index comes first.
///
/// # Algorithm (Deb et al., 2002)
///
/// For each objective:
/// 1. Sort points by objective value
/// 2. Assign infinity to every point tied with a boundary value
/// 3. For interior points, add the normalized gap between the two neighbors
///
/// # Complexity
///
/// O(m * n * log n) where m = number of objectives, n = number of points
///
/// # Example
///
/// ```
/// use u_mokp::archive::crowding_distance;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
/// ];
///
/// let distances = crowding_distance(&objectives);
///
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// assert!(distances[1].is_finite());
/// ```
pub fn crowding_distance<V: AsRef<[f64]>>(objectives: &[V]) -> Vec<f64> {
    let n = objectives.len();
    let m = objectives.first().map_or(0, |v| v.as_ref().len());
    let mut order = Vec::with_capacity(n);
    let mut distances = Vec::with_capacity(n);
    crowding_distance_into(
        n,
        m,
        |i, o| objectives[i].as_ref()[o],
        &mut order,
        &mut distances,
    );
    distances
}

/// Same as [`crowding_distance`] over `n` points with `m` objectives read
/// through `value(point, objective)`, writing into caller-owned buffers.
///
/// `order` is scratch space; `distances` is cleared and filled with one
/// value per point. Reusing both across calls avoids allocation once they
/// have grown to the working size.
pub fn crowding_distance_into<F>(
    n: usize,
    m: usize,
    value: F,
    order: &mut Vec<usize>,
    distances: &mut Vec<f64>,
) where
    F: Fn(usize, usize) -> f64,
{
    distances.clear();
    if n <= 2 {
        distances.resize(n, f64::INFINITY);
        return;
    }
    distances.resize(n, 0.0);

    for obj_idx in 0..m {
        let at = |i: usize| value(i, obj_idx);

        order.clear();
        order.extend(0..n);
        order.sort_by(|&a, &b| {
            at(a)
                .partial_cmp(&at(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let (lo, hi) = (at(order[0]), at(order[n - 1]));
        let range = hi - lo;
        if range.partial_cmp(&0.0) != Some(std::cmp::Ordering::Greater) {
            continue;
        }

        for k in 0..n {
            let v = at(order[k]);
            if v == lo || v == hi {
                distances[order[k]] = f64::INFINITY;
            } else {
                let gap = at(order[k + 1]) - at(order[k - 1]);
                distances[order[k]] += gap / range;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crowding_single() {
        let objs = vec![vec![1.0, 2.0]];
        let dist = crowding_distance(&objs);
        assert_eq!(dist.len(), 1);
        assert!(dist[0].is_infinite());
    }

    #[test]
    fn test_crowding_two() {
        let objs = vec![vec![1.0, 3.0], vec![3.0, 1.0]];
        let dist = crowding_distance(&objs);
        assert!(dist.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_crowding_evenly_spaced() {
        let objs = vec![
            vec![0.0, 4.0],
            vec![1.0, 3.0],
            vec![2.0, 2.0],
            vec![3.0, 1.0],
            vec![4.0, 0.0],
        ];
        let dist = crowding_distance(&objs);

        assert!(dist[0].is_infinite());
        assert!(dist[4].is_infinite());
        // each interior point: 2/4 per objective, two objectives
        for d in &dist[1..4] {
            assert!((d - 1.0).abs() < 1e-10, "expected 1.0, got {d}");
        }
    }

    #[test]
    fn test_crowding_identifies_most_crowded() {
        let objs = vec![
            vec![0.0, 10.0],
            vec![4.0, 6.0],
            vec![4.5, 5.5], // squeezed between its neighbors
            vec![5.0, 5.0],
            vec![10.0, 0.0],
        ];
        let dist = crowding_distance(&objs);
        let most_crowded = (0..objs.len())
            .min_by(|&a, &b| dist[a].partial_cmp(&dist[b]).unwrap())
            .unwrap();
        assert_eq!(most_crowded, 2);
    }

    #[test]
    fn test_crowding_zero_range_objective() {
        let objs = vec![vec![1.0, 5.0], vec![2.0, 5.0], vec![3.0, 5.0]];
        let dist = crowding_distance(&objs);
        assert!(dist[0].is_infinite());
        assert!(dist[2].is_infinite());
        assert!(dist[1].is_finite());
    }

    #[test]
    fn test_tied_extremes_are_all_infinite() {
        // objective 1 has its maximum 5 at indices 0, 2 and 4
        let objs = vec![
            vec![1.0, 5.0, 0.0],
            vec![2.0, 3.0, 2.5],
            vec![3.0, 5.0, 1.0],
            vec![4.0, 1.0, 2.0],
            vec![5.0, 5.0, 3.0],
        ];
        let dist = crowding_distance(&objs);
        for i in [0, 2, 4] {
            assert!(dist[i].is_infinite(), "index {i}: {dist:?}");
        }
        // index 3 holds the minimum of objective 1
        assert!(dist[3].is_infinite());
        assert!(dist[1].is_finite());
    }

    #[test]
    fn test_into_reuses_buffers() {
        let objs = vec![vec![1.0, 5.0], vec![3.0, 3.0], vec![5.0, 1.0]];
        let mut order = Vec::new();
        let mut dist = vec![42.0; 10];
        crowding_distance_into(3, 2, |i, o| objs[i][o], &mut order, &mut dist);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist, crowding_distance(&objs));
    }
}
