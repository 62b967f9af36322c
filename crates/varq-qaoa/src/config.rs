//! Run configuration.
//!
//! Configuration is assembled from several sources, later ones overriding
//! earlier ones:
//!
//! 1. Built-in defaults
//! 2. A YAML or JSON file (chosen by extension, YAML otherwise)
//! 3. Environment variables (`VARQ_*`)
//! 4. CLI arguments, applied by the binary
//!
//! [`QaoaConfig::validate`] runs last, before a runner is built.

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use varq_ops::{EvolutionMethod, PauliHamiltonian, PauliTerm};
use varq_optim::{Bfgs, NelderMead, OptimizationResult, Optimizer};

use crate::ansatz::Convention;
use crate::error::ConfigError;
use crate::init::InitStrategy;
use crate::oracle::OracleConfig;
use crate::problems::{Graph, Observables, two_qubit_ising};

/// Complete description of a QAOA run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaoaConfig {
    /// Number of QAOA layers `p`.
    pub depth: usize,
    pub problem: ProblemConfig,
    pub convention: Convention,
    pub evolution: EvolutionMethod,
    pub oracle: OracleConfig,
    pub optimizer: OptimizerConfig,
    pub init: InitStrategy,
    pub logging: LoggingConfig,
}

impl Default for QaoaConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            problem: ProblemConfig::default(),
            convention: Convention::default(),
            evolution: EvolutionMethod::default(),
            oracle: OracleConfig::default(),
            optimizer: OptimizerConfig::default(),
            init: InitStrategy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl QaoaConfig {
    /// Load defaults, then `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Read a config file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Apply `VARQ_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VARQ_DEPTH") {
            self.depth = parse_env("VARQ_DEPTH", &val)?;
        }
        if let Some(val) = lookup("VARQ_SHOTS") {
            self.set_shots(parse_env("VARQ_SHOTS", &val)?);
        }
        if let Some(val) = lookup("VARQ_SEED") {
            self.set_seed(parse_env("VARQ_SEED", &val)?);
        }
        if let Some(val) = lookup("VARQ_STRATEGY") {
            self.optimizer.strategy = val.parse()?;
        }
        if let Some(val) = lookup("VARQ_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Seed every random source: the random initializer and the sampler.
    pub fn set_seed(&mut self, seed: u64) {
        if let InitStrategy::Random { seed: s } = &mut self.init {
            *s = Some(seed);
        }
        if let OracleConfig::Sampling { seed: s, .. } = &mut self.oracle {
            *s = Some(seed);
        }
    }

    /// Switch to the sampling backend with `shots` per term.
    pub fn set_shots(&mut self, shots: u32) {
        let seed = match self.oracle {
            OracleConfig::Sampling { seed, .. } => seed,
            OracleConfig::Statevector => match self.init {
                InitStrategy::Random { seed } => seed,
                _ => None,
            },
        };
        self.oracle = OracleConfig::Sampling { shots, seed };
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        self.problem.observables()?;
        self.init.validate(self.depth)?;
        self.optimizer.validate()?;
        if let OracleConfig::Sampling { shots: 0, .. } = self.oracle {
            return Err(ConfigError::ZeroShots);
        }
        if let EvolutionMethod::Trotter { steps: 0 } = self.evolution {
            return Err(ConfigError::ZeroTrotterSteps);
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

/// The cost problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemConfig {
    /// `-Z0 Z1 - field * Z0`.
    TwoQubitIsing {
        #[serde(default)]
        field: f64,
    },
    /// `Σ J_ij Z_i Z_j + Σ h_i Z_i`.
    Ising {
        num_qubits: usize,
        #[serde(default)]
        couplings: Vec<(usize, usize, f64)>,
        #[serde(default)]
        fields: Vec<(usize, f64)>,
    },
    /// MaxCut on a weighted graph.
    MaxCut(Graph),
    /// Arbitrary Pauli sum.
    Pauli {
        num_qubits: usize,
        terms: Vec<PauliTerm>,
    },
}

impl Default for ProblemConfig {
    fn default() -> Self {
        ProblemConfig::TwoQubitIsing { field: 0.5 }
    }
}

impl ProblemConfig {
    /// Number of qubits the problem acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            ProblemConfig::TwoQubitIsing { .. } => 2,
            ProblemConfig::Ising { num_qubits, .. } | ProblemConfig::Pauli { num_qubits, .. } => {
                *num_qubits
            }
            ProblemConfig::MaxCut(graph) => graph.n_nodes,
        }
    }

    /// Cost observable for this problem.
    pub fn cost_hamiltonian(&self) -> PauliHamiltonian {
        match self {
            ProblemConfig::TwoQubitIsing { field } => two_qubit_ising(*field),
            ProblemConfig::Ising {
                couplings, fields, ..
            } => PauliHamiltonian::ising(couplings, fields),
            ProblemConfig::MaxCut(graph) => graph.maxcut_hamiltonian(),
            ProblemConfig::Pauli { terms, .. } => PauliHamiltonian::new(terms.clone()),
        }
    }

    /// Cost observable with the transverse-field mixer.
    pub fn observables(&self) -> Result<Observables, ConfigError> {
        Observables::with_transverse_mixer(self.num_qubits(), self.cost_hamiltonian())
    }
}

/// Classical optimizer choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    NelderMead,
    Bfgs,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::NelderMead, Strategy::Bfgs];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::NelderMead => write!(f, "nelder-mead"),
            Strategy::Bfgs => write!(f, "bfgs"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nelder-mead" | "nelder_mead" | "neldermead" | "nm" => Ok(Strategy::NelderMead),
            "bfgs" => Ok(Strategy::Bfgs),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Optimizer selection and stopping criteria.
///
/// `tolerance` maps to `xatol`/`fatol` for Nelder-Mead and `gtol` for BFGS.
/// Unset fields keep each optimizer's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub strategy: Strategy,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub max_evaluations: Option<usize>,
}

impl OptimizerConfig {
    /// Build the optimizer for `strategy` with these stopping criteria.
    pub fn build(&self, strategy: Strategy) -> Result<ConfiguredOptimizer, ConfigError> {
        let optimizer = match strategy {
            Strategy::NelderMead => {
                let mut nm = NelderMead::new();
                if let Some(tol) = self.tolerance {
                    nm = nm.with_tol(tol);
                }
                if let Some(maxiter) = self.max_iterations {
                    nm = nm.with_maxiter(maxiter);
                }
                if let Some(maxfev) = self.max_evaluations {
                    nm = nm.with_maxfev(maxfev);
                }
                nm.validate()?;
                ConfiguredOptimizer::NelderMead(nm)
            }
            Strategy::Bfgs => {
                let mut bfgs = Bfgs::new();
                if let Some(tol) = self.tolerance {
                    bfgs = bfgs.with_tol(tol);
                }
                if let Some(maxiter) = self.max_iterations {
                    bfgs = bfgs.with_maxiter(maxiter);
                }
                if let Some(maxfev) = self.max_evaluations {
                    bfgs = bfgs.with_maxfev(maxfev);
                }
                bfgs.validate()?;
                ConfiguredOptimizer::Bfgs(bfgs)
            }
        };
        Ok(optimizer)
    }

    /// Check the stopping criteria without keeping the optimizer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build(self.strategy).map(|_| ())
    }
}

/// An optimizer picked at runtime from a [`Strategy`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfiguredOptimizer {
    NelderMead(NelderMead),
    Bfgs(Bfgs),
}

impl Optimizer for ConfiguredOptimizer {
    fn name(&self) -> &'static str {
        match self {
            ConfiguredOptimizer::NelderMead(nm) => nm.name(),
            ConfiguredOptimizer::Bfgs(bfgs) => bfgs.name(),
        }
    }

    fn minimize<F, E>(&self, objective: F, initial_params: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        match self {
            ConfiguredOptimizer::NelderMead(nm) => nm.minimize(objective, initial_params),
            ConfiguredOptimizer::Bfgs(bfgs) => bfgs.minimize(objective, initial_params),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use varq_optim::OptionsError;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = QaoaConfig::default();
        assert_eq!(config.depth, 1);
        assert_eq!(config.problem, ProblemConfig::TwoQubitIsing { field: 0.5 });
        assert_eq!(config.optimizer.strategy, Strategy::NelderMead);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
depth: 2
problem:
  kind: max_cut
  n_nodes: 3
  edges: [[0, 1, 1.0], [1, 2, 1.0], [0, 2, 1.0]]
convention:
  order: mixer_then_cost
evolution:
  method: trotter
  steps: 4
oracle:
  kind: sampling
  shots: 2048
  seed: 9
optimizer:
  strategy: bfgs
  tolerance: 1.0e-6
init:
  kind: linear_ramp
"#;
        let config: QaoaConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.depth, 2);
        assert_eq!(config.problem, ProblemConfig::MaxCut(Graph::triangle()));
        assert_eq!(config.evolution, EvolutionMethod::Trotter { steps: 4 });
        assert_eq!(
            config.oracle,
            OracleConfig::Sampling {
                shots: 2048,
                seed: Some(9)
            }
        );
        assert_eq!(config.optimizer.strategy, Strategy::Bfgs);
        assert_eq!(config.optimizer.tolerance, Some(1e-6));
        assert_eq!(config.init, InitStrategy::LinearRamp);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_pauli_problem_json() {
        let json = r#"{
            "problem": {
                "kind": "pauli",
                "num_qubits": 2,
                "terms": [
                    {"coefficient": -1.0, "operators": [[0, "Z"], [1, "Z"]]},
                    {"coefficient": -0.5, "operators": [[0, "Z"]]}
                ]
            }
        }"#;
        let config: QaoaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.problem.cost_hamiltonian(), two_qubit_ising(0.5));
        assert_eq!(config.depth, 1);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = QaoaConfig::default();
        config
            .apply_overrides_from(lookup(&[
                ("VARQ_DEPTH", "3"),
                ("VARQ_SEED", "17"),
                ("VARQ_SHOTS", "512"),
                ("VARQ_STRATEGY", "bfgs"),
                ("VARQ_LOG_LEVEL", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.depth, 3);
        assert_eq!(config.init, InitStrategy::Random { seed: Some(17) });
        assert_eq!(
            config.oracle,
            OracleConfig::Sampling {
                shots: 512,
                seed: Some(17)
            }
        );
        assert_eq!(config.optimizer.strategy, Strategy::Bfgs);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = QaoaConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[("VARQ_DEPTH", "two")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "VARQ_DEPTH", .. }));

        let err = config
            .apply_overrides_from(lookup(&[("VARQ_STRATEGY", "cobyla")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStrategy(_)));
    }

    #[test]
    fn test_validate_rejects() {
        let config = QaoaConfig {
            depth: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDepth)));

        let config = QaoaConfig {
            init: InitStrategy::Fixed { values: vec![0.1] },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InitLength { .. })));

        let config = QaoaConfig {
            oracle: OracleConfig::Sampling { shots: 0, seed: None },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroShots)));

        let config = QaoaConfig {
            evolution: EvolutionMethod::Trotter { steps: 0 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTrotterSteps)));

        let mut config = QaoaConfig::default();
        config.optimizer.max_evaluations = Some(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Options(OptionsError::ZeroLimit("max_evaluations")))
        ));

        let config = QaoaConfig {
            problem: ProblemConfig::Ising {
                num_qubits: 2,
                couplings: vec![(0, 2, 1.0)],
                fields: vec![],
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Observable { .. })));
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Nelder-Mead".parse::<Strategy>().unwrap(), Strategy::NelderMead);
        assert_eq!("nm".parse::<Strategy>().unwrap(), Strategy::NelderMead);
        assert_eq!("BFGS".parse::<Strategy>().unwrap(), Strategy::Bfgs);
        assert!("powell".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Bfgs.to_string(), "bfgs");
    }

    #[test]
    fn test_build_applies_limits() {
        let options = OptimizerConfig {
            tolerance: Some(1e-6),
            max_iterations: Some(10),
            ..Default::default()
        };
        assert_eq!(
            options.build(Strategy::NelderMead).unwrap(),
            ConfiguredOptimizer::NelderMead(NelderMead::new().with_tol(1e-6).with_maxiter(10))
        );
        assert_eq!(
            options.build(Strategy::Bfgs).unwrap(),
            ConfiguredOptimizer::Bfgs(Bfgs::new().with_tol(1e-6).with_maxiter(10))
        );
        assert_eq!(options.build(Strategy::Bfgs).unwrap().name(), "bfgs");
    }

    #[test]
    fn test_bundled_configs_are_valid() {
        for yaml in [
            include_str!("../../../configs/ising_2q.yaml"),
            include_str!("../../../configs/maxcut_square.yaml"),
        ] {
            let config: QaoaConfig = serde_yaml::from_str(yaml).unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_missing_file() {
        let err = QaoaConfig::from_file(Path::new("/nonexistent/varq.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
