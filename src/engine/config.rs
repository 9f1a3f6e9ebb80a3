//! Solver parameters.

use crate::error::{MokpError, Result};
use crate::problem::ProblemModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Seed used when [`Parameters::seed`] is `None`.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for a solver session.
///
/// # Examples
///
/// ```
/// use u_mokp::engine::Parameters;
///
/// let params = Parameters::default()
///     .with_population_size(20)
///     .with_max_iterations(500)
///     .with_kappa(0.0)
///     .with_seed(7);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Number of solutions kept in the working population.
    pub population_size: usize,

    /// Total iterations a session may run.
    pub max_iterations: usize,

    /// Archive size cap. `None` means unbounded.
    pub archive_size: Option<usize>,

    /// Fraction of items flipped by each perturbation, in `[0, 1]`.
    pub perturbation_rate: f64,

    /// Relative tolerance of local-search acceptance. 0 means strict
    /// dominance.
    pub kappa: f64,

    /// Maximum accepted local-search moves per iteration.
    pub local_search_depth: usize,

    /// Random seed. `None` uses [`DEFAULT_SEED`].
    pub seed: Option<u64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            population_size: 10,
            max_iterations: 100,
            archive_size: Some(28_000),
            perturbation_rate: 0.05,
            kappa: 0.05,
            local_search_depth: 5,
            seed: None,
        }
    }
}

impl Parameters {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the iteration limit.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the archive size cap (`None` for unbounded).
    pub fn with_archive_size(mut self, cap: Option<usize>) -> Self {
        self.archive_size = cap;
        self
    }

    /// Sets the perturbation rate.
    pub fn with_perturbation_rate(mut self, rate: f64) -> Self {
        self.perturbation_rate = rate;
        self
    }

    /// Sets the local-search acceptance tolerance.
    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    /// Sets the local-search depth.
    pub fn with_local_search_depth(mut self, depth: usize) -> Self {
        self.local_search_depth = depth;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The seed actually used to initialize the generator.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Validates the parameters on their own.
    ///
    /// # Errors
    ///
    /// [`MokpError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(invalid("population_size must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be at least 1"));
        }
        if self.archive_size == Some(0) {
            return Err(invalid("archive_size must be at least 1 or unbounded"));
        }
        if !(0.0..=1.0).contains(&self.perturbation_rate) {
            return Err(invalid(format!(
                "perturbation_rate must be in [0, 1], got {}",
                self.perturbation_rate
            )));
        }
        if !self.kappa.is_finite() || self.kappa < 0.0 {
            return Err(invalid(format!(
                "kappa must be finite and non-negative, got {}",
                self.kappa
            )));
        }
        Ok(())
    }

    /// Validates the parameters against a loaded problem.
    ///
    /// In addition to [`validate`](Self::validate), a capped archive must
    /// hold at least `2 * num_objectives` members, room for one minimum and
    /// one maximum per objective.
    pub fn validate_for(&self, problem: &ProblemModel) -> Result<()> {
        self.validate()?;
        let min_cap = 2 * problem.num_objectives();
        match self.archive_size {
            Some(cap) if cap < min_cap => Err(invalid(format!(
                "archive_size must be at least {min_cap} for {} objectives, got {cap}",
                problem.num_objectives()
            ))),
            _ => Ok(()),
        }
    }

    /// Sets one parameter from its textual key and value.
    ///
    /// Keys accept snake_case and camelCase spellings. For `archive_size`
    /// the values `none` and `unbounded` remove the cap; for `seed`, `none`
    /// restores the default seed.
    ///
    /// # Errors
    ///
    /// [`MokpError::InvalidParameter`] for an unknown key or an unparsable
    /// value. Range checks are left to [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mokp::engine::Parameters;
    ///
    /// let mut params = Parameters::default();
    /// params.set("populationSize", "25").unwrap();
    /// params.set("archive_size", "unbounded").unwrap();
    /// assert_eq!(params.population_size, 25);
    /// assert_eq!(params.archive_size, None);
    /// assert!(params.set("temperature", "1.0").is_err());
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key: ParameterKey = key.parse()?;
        let value = value.trim();
        match key {
            ParameterKey::PopulationSize => self.population_size = parse(key, value)?,
            ParameterKey::MaxIterations => self.max_iterations = parse(key, value)?,
            ParameterKey::ArchiveSize => {
                self.archive_size = match value {
                    "none" | "unbounded" => None,
                    v => Some(parse(key, v)?),
                }
            }
            ParameterKey::PerturbationRate => self.perturbation_rate = parse(key, value)?,
            ParameterKey::Kappa => self.kappa = parse(key, value)?,
            ParameterKey::LocalSearchDepth => self.local_search_depth = parse(key, value)?,
            ParameterKey::Seed => {
                self.seed = match value {
                    "none" => None,
                    v => Some(parse(key, v)?),
                }
            }
        }
        Ok(())
    }

    /// Builds parameters from defaults overridden by key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (k, v) in pairs {
            params.set(k.as_ref(), v.as_ref())?;
        }
        Ok(params)
    }

    /// Parses parameters from a TOML document. Missing fields keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`MokpError::InvalidParameter`] if the document does not parse or
    /// names an unknown field.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mokp::engine::Parameters;
    ///
    /// let params = Parameters::from_toml_str(
    ///     r#"
    ///     population_size = 30
    ///     kappa = 0.0
    ///     seed = 123
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(params.population_size, 30);
    /// assert_eq!(params.max_iterations, 100);
    /// assert_eq!(params.seed, Some(123));
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| invalid(format!("parameter file: {e}")))
    }

    /// Reads parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// The enumerated parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    /// `population_size`
    PopulationSize,
    /// `max_iterations`
    MaxIterations,
    /// `archive_size`
    ArchiveSize,
    /// `perturbation_rate`
    PerturbationRate,
    /// `kappa`
    Kappa,
    /// `local_search_depth`
    LocalSearchDepth,
    /// `seed`
    Seed,
}

impl ParameterKey {
    /// Every key, in declaration order.
    pub const ALL: [ParameterKey; 7] = [
        ParameterKey::PopulationSize,
        ParameterKey::MaxIterations,
        ParameterKey::ArchiveSize,
        ParameterKey::PerturbationRate,
        ParameterKey::Kappa,
        ParameterKey::LocalSearchDepth,
        ParameterKey::Seed,
    ];

    /// The snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKey::PopulationSize => "population_size",
            ParameterKey::MaxIterations => "max_iterations",
            ParameterKey::ArchiveSize => "archive_size",
            ParameterKey::PerturbationRate => "perturbation_rate",
            ParameterKey::Kappa => "kappa",
            ParameterKey::LocalSearchDepth => "local_search_depth",
            ParameterKey::Seed => "seed",
        }
    }

    fn camel_case(self) -> &'static str {
        match self {
            ParameterKey::PopulationSize => "populationSize",
            ParameterKey::MaxIterations => "maxIterations",
            ParameterKey::ArchiveSize => "archiveSize",
            ParameterKey::PerturbationRate => "perturbationRate",
            ParameterKey::Kappa => "kappa",
            ParameterKey::LocalSearchDepth => "localSearchDepth",
            ParameterKey::Seed => "seed",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKey {
    type Err = MokpError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ParameterKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.camel_case() == s)
            .ok_or_else(|| invalid(format!("unknown parameter '{s}'")))
    }
}

fn invalid(msg: impl Into<String>) -> MokpError {
    MokpError::InvalidParameter(msg.into())
}

fn parse<T: FromStr>(key: ParameterKey, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid(format!("invalid value '{value}' for {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let p = Parameters::default();
        assert_eq!(p.population_size, 10);
        assert_eq!(p.max_iterations, 100);
        assert_eq!(p.archive_size, Some(28_000));
        assert_eq!(p.perturbation_rate, 0.05);
        assert_eq!(p.kappa, 0.05);
        assert_eq!(p.local_search_depth, 5);
        assert_eq!(p.seed, None);
        assert_eq!(p.effective_seed(), DEFAULT_SEED);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let base = Parameters::default();
        let bad = [
            base.clone().with_population_size(0),
            base.clone().with_max_iterations(0),
            base.clone().with_archive_size(Some(0)),
            base.clone().with_perturbation_rate(1.5),
            base.clone().with_perturbation_rate(-0.1),
            base.clone().with_kappa(-1.0),
            base.clone().with_kappa(f64::NAN),
        ];
        for p in bad {
            assert!(
                matches!(p.validate(), Err(MokpError::InvalidParameter(_))),
                "accepted {p:?}"
            );
        }
    }

    #[test]
    fn test_validate_for_archive_floor() {
        let problem = ProblemModel::new(
            vec![1.0, 1.0, 1.0],
            vec![vec![1.0], vec![1.0], vec![1.0]],
            vec![vec![1.0], vec![1.0], vec![1.0]],
        )
        .unwrap();
        let small = Parameters::default().with_archive_size(Some(5));
        assert!(small.validate().is_ok());
        assert!(small.validate_for(&problem).is_err());
        assert!(Parameters::default()
            .with_archive_size(Some(6))
            .validate_for(&problem)
            .is_ok());
        assert!(Parameters::default()
            .with_archive_size(None)
            .validate_for(&problem)
            .is_ok());
    }

    #[test]
    fn test_key_spellings() {
        for key in ParameterKey::ALL {
            assert_eq!(key.as_str().parse::<ParameterKey>().unwrap(), key);
            assert_eq!(key.camel_case().parse::<ParameterKey>().unwrap(), key);
        }
        assert!("PopulationSize".parse::<ParameterKey>().is_err());
    }

    #[test]
    fn test_set_values() {
        let mut p = Parameters::default();
        p.set("max_iterations", "250").unwrap();
        p.set("perturbationRate", "0.2").unwrap();
        p.set("seed", "9").unwrap();
        p.set("archive_size", "64").unwrap();
        assert_eq!(p.max_iterations, 250);
        assert_eq!(p.perturbation_rate, 0.2);
        assert_eq!(p.seed, Some(9));
        assert_eq!(p.archive_size, Some(64));

        p.set("seed", "none").unwrap();
        assert_eq!(p.seed, None);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut p = Parameters::default();
        let err = p.set("mutation", "1").unwrap_err();
        assert!(err.to_string().contains("unknown parameter 'mutation'"));
        assert!(matches!(
            p.set("kappa", "abc"),
            Err(MokpError::InvalidParameter(_))
        ));
        assert!(p.set("population_size", "-3").is_err());
    }

    #[test]
    fn test_from_pairs() {
        let p = Parameters::from_pairs([("populationSize", "4"), ("kappa", "0")]).unwrap();
        assert_eq!(p.population_size, 4);
        assert_eq!(p.kappa, 0.0);
        assert!(Parameters::from_pairs([("bogus", "1")]).is_err());
    }

    #[test]
    fn test_toml_unknown_field_rejected() {
        let err = Parameters::from_toml_str("population = 3").unwrap_err();
        assert!(matches!(err, MokpError::InvalidParameter(_)));
    }

    #[test]
    fn test_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_iterations = 7\narchive_size = 50").unwrap();
        let p = Parameters::from_toml_file(file.path()).unwrap();
        assert_eq!(p.max_iterations, 7);
        assert_eq!(p.archive_size, Some(50));
        assert_eq!(p.population_size, 10);
    }
}
