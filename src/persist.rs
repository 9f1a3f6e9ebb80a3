//! Saving and restoring archive contents.
//!
//! Results are stored as a JSON array of [`ArchiveRecord`]s in archive
//! order. [`write_objectives`] produces the plain text dump with one
//! whitespace-separated objective vector per line.

use crate::error::{MokpError, Result};
use crate::problem::ProblemModel;
use crate::solution::Solution;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Absolute tolerance when checking stored sums against a re-evaluation.
const SUM_TOLERANCE: f64 = 1e-9;

/// One persisted archive member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Objective vector.
    pub objectives: Vec<f64>,
    /// Capacity used on every constraint.
    pub capacities_used: Vec<f64>,
    /// Selection bits, one per item.
    pub selection: Vec<bool>,
}

impl From<&Solution> for ArchiveRecord {
    fn from(s: &Solution) -> Self {
        Self {
            objectives: s.objectives().to_vec(),
            capacities_used: s.capacities_used().to_vec(),
            selection: s.selection().to_vec(),
        }
    }
}

impl ArchiveRecord {
    /// Re-evaluates the record against `problem`.
    ///
    /// # Errors
    ///
    /// [`MokpError::MalformedInput`] if the selection has the wrong length,
    /// the stored sums disagree with the re-evaluation, or the selection is
    /// infeasible.
    pub fn to_solution(&self, problem: &ProblemModel) -> Result<Solution> {
        let solution = Solution::try_evaluate(problem, self.selection.clone())?;
        if !approx_eq(&self.objectives, solution.objectives())
            || !approx_eq(&self.capacities_used, solution.capacities_used())
        {
            return Err(MokpError::MalformedInput(format!(
                "stored sums {:?} / {:?} do not match the selection ({:?} / {:?})",
                self.objectives,
                self.capacities_used,
                solution.objectives(),
                solution.capacities_used()
            )));
        }
        if !solution.is_feasible(problem) {
            return Err(MokpError::MalformedInput(
                "stored selection exceeds a capacity".into(),
            ));
        }
        Ok(solution)
    }
}

fn approx_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= SUM_TOLERANCE)
}

/// Writes `solutions` as a JSON array of records.
pub fn save_results<'a, W, I>(writer: W, solutions: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Solution>,
{
    let records: Vec<ArchiveRecord> = solutions.into_iter().map(ArchiveRecord::from).collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

/// Writes `solutions` to `path`, replacing it atomically via a temporary
/// sibling file.
pub fn save_results_to_path<'a, I>(path: impl AsRef<Path>, solutions: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Solution>,
{
    let path = path.as_ref();
    let tmp_path = path.with_extension("json.tmp");
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    save_results(&mut writer, solutions)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    std::fs::rename(tmp_path, path)?;
    Ok(())
}

/// Reads records written by [`save_results`].
pub fn load_results<R: Read>(reader: R) -> Result<Vec<ArchiveRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads records from a file written by [`save_results_to_path`].
pub fn load_results_from_path(path: impl AsRef<Path>) -> Result<Vec<ArchiveRecord>> {
    load_results(BufReader::new(File::open(path)?))
}

/// Re-validates every record against `problem`, in order.
pub fn restore_solutions(records: &[ArchiveRecord], problem: &ProblemModel) -> Result<Vec<Solution>> {
    records.iter().map(|r| r.to_solution(problem)).collect()
}

/// Writes one line per solution with its objective values separated by
/// spaces.
pub fn write_objectives<'a, W, I>(mut writer: W, solutions: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Solution>,
{
    for s in solutions {
        let mut first = true;
        for v in s.objectives() {
            if !first {
                writer.write_all(b" ")?;
            }
            write!(writer, "{v}")?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
