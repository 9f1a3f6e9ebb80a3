//! Bounded archive of mutually non-dominated solutions.

use super::crowding::crowding_distance_into;
use crate::dominance::{strictly_dominates, ObjectiveSense};
use crate::error::Result;
use crate::solution::Solution;
use tracing::trace;

/// What [`ParetoArchive::update`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The candidate was dominated by, or equal in objective space to, an
    /// existing member. The archive is unchanged.
    Rejected,
    /// The candidate was inserted.
    Inserted {
        /// Members removed because the candidate dominates them.
        removed: usize,
        /// Whether a member was pruned to respect the size cap.
        pruned: bool,
    },
}

impl UpdateOutcome {
    /// Returns `true` if the candidate entered the archive.
    #[inline]
    pub fn is_inserted(&self) -> bool {
        matches!(self, UpdateOutcome::Inserted { .. })
    }
}

/// A set of solutions in which no member strictly dominates another.
///
/// Members are kept in insertion order. When a size cap is set and an
/// insertion exceeds it, the member with the smallest crowding distance is
/// removed. Every member holding the minimum or maximum of some objective
/// has infinite distance, ties included, so extremes are kept. Ties on the
/// smallest distance remove the earliest-inserted member; in particular, if
/// every member is extreme the earliest-inserted one goes.
///
/// A candidate whose objective vector equals that of an existing member is
/// rejected, so the archive holds one representative per point of the
/// front.
///
/// # Examples
///
/// ```
/// use u_mokp::archive::ParetoArchive;
/// use u_mokp::dominance::ObjectiveSense;
/// use u_mokp::problem::ProblemModel;
/// use u_mokp::solution::Solution;
///
/// let problem = ProblemModel::new(
///     vec![10.0, 10.0],
///     vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]],
///     vec![vec![5.0, 1.0, 3.0], vec![1.0, 5.0, 3.0]],
/// )
/// .unwrap();
///
/// let mut archive = ParetoArchive::new(ObjectiveSense::Maximize);
/// archive.update(Solution::from_items(&problem, &[0])).unwrap();
/// archive.update(Solution::from_items(&problem, &[1])).unwrap();
/// assert_eq!(archive.len(), 2);
///
/// // {0, 1} = (6, 6) dominates both single-item solutions
/// archive.update(Solution::from_items(&problem, &[0, 1])).unwrap();
/// assert_eq!(archive.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ParetoArchive {
    members: Vec<Solution>,
    capacity: Option<usize>,
    sense: ObjectiveSense,
    order: Vec<usize>,
    distances: Vec<f64>,
}

impl ParetoArchive {
    /// Creates an unbounded archive.
    pub fn new(sense: ObjectiveSense) -> Self {
        Self::bounded(None, sense)
    }

    /// Creates an archive holding at most `capacity` members (`None` for
    /// unbounded).
    pub fn bounded(capacity: Option<usize>, sense: ObjectiveSense) -> Self {
        Self {
            members: Vec::new(),
            capacity,
            sense,
            order: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// Offers a candidate to the archive.
    ///
    /// 1. If a member strictly dominates the candidate or has the same
    ///    objective vector, the candidate is discarded.
    /// 2. Otherwise every member the candidate strictly dominates is
    ///    removed, and the candidate is appended.
    /// 3. If the size cap is now exceeded, one member is pruned by crowding
    ///    distance.
    ///
    /// # Errors
    ///
    /// [`MokpError::ResourceExhaustion`](crate::MokpError::ResourceExhaustion)
    /// if the archive cannot grow.
    pub fn update(&mut self, candidate: Solution) -> Result<UpdateOutcome> {
        let sense = self.sense;
        let rejected = self.members.iter().any(|m| {
            m.objectives() == candidate.objectives()
                || strictly_dominates(m.objectives(), candidate.objectives(), sense)
        });
        if rejected {
            return Ok(UpdateOutcome::Rejected);
        }

        let before = self.members.len();
        self.members
            .retain(|m| !strictly_dominates(candidate.objectives(), m.objectives(), sense));
        let removed = before - self.members.len();

        self.members.try_reserve(1)?;
        self.members.push(candidate);

        let pruned = match self.capacity {
            Some(cap) if self.members.len() > cap => {
                self.prune_one();
                true
            }
            _ => false,
        };

        Ok(UpdateOutcome::Inserted { removed, pruned })
    }

    /// Reserves room for `additional` insertions, so that the next
    /// `additional` calls to [`update`](Self::update) do not allocate for
    /// members.
    ///
    /// # Errors
    ///
    /// [`MokpError::ResourceExhaustion`](crate::MokpError::ResourceExhaustion)
    /// if the memory cannot be reserved. The archive is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.members.try_reserve(additional)?;
        Ok(())
    }

    /// Removes the most crowded member.
    fn prune_one(&mut self) {
        let members = &self.members;
        let m = members.first().map_or(0, |s| s.objectives().len());
        crowding_distance_into(
            members.len(),
            m,
            |i, o| members[i].objectives()[o],
            &mut self.order,
            &mut self.distances,
        );

        // strict `<` keeps the earliest index on ties, including the case
        // where every distance is infinite
        let mut victim = 0;
        for (i, &d) in self.distances.iter().enumerate().skip(1) {
            if d < self.distances[victim] {
                victim = i;
            }
        }

        trace!(
            event = "archive_prune",
            index = victim,
            crowding = self.distances[victim],
            size = self.members.len(),
        );
        self.members.remove(victim);
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the archive has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The size cap, if any.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// The optimization sense used for dominance.
    #[inline]
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Members in insertion order.
    #[inline]
    pub fn members(&self) -> &[Solution] {
        &self.members
    }

    /// Iterates members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.members.iter()
    }

    /// Removes every member and releases the scratch buffers.
    pub fn clear(&mut self) {
        self.members = Vec::new();
        self.order = Vec::new();
        self.distances = Vec::new();
    }
}

impl<'a> IntoIterator for &'a ParetoArchive {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
