//! Problem instance loader for the text MOKP format.
//!
//! The format is a stream of whitespace-separated tokens:
//!
//! ```raw
//! nf ni                      // number of objectives, number of items
//! c_1                        // capacity of constraint 1
//! label w_1_1 p_1_1          // one triple per item: label, weight, profit
//! ...
//! label w_1_ni p_1_ni
//! c_2
//! ...
//! ```
//!
//! Item labels are read and ignored. Everything after `#` on a line is a
//! comment.

use super::model::{ProblemModel, MAX_OBJECTIVES, MIN_OBJECTIVES};
use crate::dominance::ObjectiveSense;
use crate::error::{MokpError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Loader for text MOKP instances.
///
/// # Examples
///
/// ```
/// use u_mokp::problem::ProblemLoader;
///
/// let text = "2 2\n\
///             10\n a 4 3\n b 5 2\n\
///             12\n a 6 1\n b 2 7\n";
/// let problem = ProblemLoader::new().from_str(text).unwrap();
/// assert_eq!(problem.num_items(), 2);
/// assert_eq!(problem.capacities(), &[10.0, 12.0]);
/// assert_eq!(problem.profit(1, 1), 7.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemLoader {
    sense: ObjectiveSense,
}

impl ProblemLoader {
    /// Creates a loader producing maximization problems.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the objective sense assigned to loaded problems.
    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = sense;
        self
    }

    /// Parses an instance from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(&self, text: &str) -> Result<ProblemModel> {
        let tokens = text
            .lines()
            .flat_map(|line| strip_comment(line).split_whitespace())
            .map(str::to_owned)
            .collect();
        self.parse(tokens)
    }

    /// Parses an instance from any buffered reader.
    pub fn from_reader<R: BufRead>(&self, reader: R) -> Result<ProblemModel> {
        let mut tokens = Vec::new();
        for line in reader.lines() {
            let line = line?;
            tokens.extend(strip_comment(&line).split_whitespace().map(str::to_owned));
        }
        self.parse(tokens)
    }

    /// Parses an instance from a file.
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<ProblemModel> {
        let file = File::open(path)?;
        self.from_reader(BufReader::new(file))
    }

    fn parse(&self, tokens: Vec<String>) -> Result<ProblemModel> {
        let mut stream = Tokens::new(tokens);

        let nf: usize = stream.next("objective count")?;
        let ni: usize = stream.next("item count")?;
        if !(MIN_OBJECTIVES..=MAX_OBJECTIVES).contains(&nf) {
            return Err(MokpError::InvalidParameter(format!(
                "number of objectives must be in [{MIN_OBJECTIVES}, {MAX_OBJECTIVES}], got {nf}"
            )));
        }
        if ni == 0 {
            return Err(MokpError::InvalidParameter(
                "problem must have at least one item".into(),
            ));
        }
        // a header can claim more items than the input holds
        let row_len = ni.min(stream.remaining() / 3);

        let mut capacities = Vec::with_capacity(nf);
        let mut weights = Vec::with_capacity(nf);
        let mut profits = Vec::with_capacity(nf);
        for _ in 0..nf {
            capacities.push(stream.next::<f64>("capacity")?);
            let mut w = Vec::with_capacity(row_len);
            let mut p = Vec::with_capacity(row_len);
            for _ in 0..ni {
                stream.skip("item label")?;
                w.push(stream.next::<f64>("weight")?);
                p.push(stream.next::<f64>("profit")?);
            }
            weights.push(w);
            profits.push(p);
        }

        if let Some(extra) = stream.peek() {
            return Err(MokpError::MalformedInput(format!(
                "unexpected trailing token '{extra}' at position {}",
                stream.position()
            )));
        }

        Ok(ProblemModel::new(capacities, weights, profits)?.with_sense(self.sense))
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

struct Tokens {
    tokens: Vec<String>,
    pos: usize,
}

impl Tokens {
    fn new(tokens: Vec<String>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn skip(&mut self, what: &str) -> Result<()> {
        self.raw(what).map(|_| ())
    }

    fn raw(&mut self, what: &str) -> Result<&str> {
        let pos = self.pos;
        let token = self.tokens.get(pos).ok_or_else(|| {
            MokpError::MalformedInput(format!(
                "unexpected end of input at token {pos} while reading {what}"
            ))
        })?;
        self.pos += 1;
        Ok(token.as_str())
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let pos = self.pos;
        let token = self.raw(what)?;
        token.parse::<T>().map_err(|_| {
            MokpError::MalformedInput(format!(
                "could not parse token '{token}' at position {pos} as {what}"
            ))
        })
    }
}
