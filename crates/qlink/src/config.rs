//! Configuration for link simulations.
//!
//! Sources, highest precedence first:
//! 1. Environment variables (`QLINK_` prefix)
//! 2. Configuration file (YAML)
//! 3. Default values

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::noise_models::{
    DepolarizingParams, LinearDecayParams, ThermalNoiseParams, Topology, clamped_relaxation_times,
};
use crate::purity::PURITY_TOLERANCE;

/// Largest parameter of a two-qubit depolarizing channel, 4^2 / (4^2 - 1).
const MAX_TWO_QUBIT_DEPOLARIZING: f64 = 16.0 / 15.0;

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Parameters for the 1/(1+d) thermal model.
    #[serde(default)]
    pub thermal: ThermalNoiseParams,

    /// Parameters for the floored linear-decay thermal model.
    #[serde(default)]
    pub linear_decay: LinearDecayParams,

    /// Parameters for the depolarizing model.
    #[serde(default)]
    pub depolarizing: DepolarizingParams,

    /// Qubits and pairs that carry local noise.
    #[serde(default)]
    pub topology: Topology,

    /// Tolerance on the largest eigenvalue when testing purity.
    #[serde(default = "default_purity_tolerance")]
    pub purity_tolerance: f64,

    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_purity_tolerance() -> f64 {
    PURITY_TOLERANCE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            thermal: ThermalNoiseParams::default(),
            linear_decay: LinearDecayParams::default(),
            depolarizing: DepolarizingParams::default(),
            topology: Topology::default(),
            purity_tolerance: default_purity_tolerance(),
            log_level: default_log_level(),
        }
    }
}

impl LinkConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(contents: &str) -> ConfigResult<Self> {
        let config: LinkConfig = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => LinkConfig::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Merge `QLINK_*` environment variables into this configuration.
    ///
    /// Unset or unparsable variables leave the current value unchanged.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("QLINK_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(val) = lookup("QLINK_PURITY_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.purity_tolerance = val;
        }

        // Baselines apply to both thermal models
        if let Some(val) = lookup("QLINK_T1_BASE").and_then(|v| v.parse().ok()) {
            self.thermal.t1_base = val;
            self.linear_decay.t1_base = val;
        }
        if let Some(val) = lookup("QLINK_T2_BASE").and_then(|v| v.parse().ok()) {
            self.thermal.t2_base = val;
            self.linear_decay.t2_base = val;
        }
        if let Some(val) = lookup("QLINK_GATE_TIME").and_then(|v| v.parse().ok()) {
            self.thermal.gate_time = val;
            self.linear_decay.gate_time_1q = val;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("thermal.t1_base", self.thermal.t1_base),
            ("thermal.t2_base", self.thermal.t2_base),
            ("linear_decay.t1_base", self.linear_decay.t1_base),
            ("linear_decay.t2_base", self.linear_decay.t2_base),
            ("linear_decay.floor", self.linear_decay.floor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("thermal.gate_time", self.thermal.gate_time),
            ("linear_decay.gate_time_1q", self.linear_decay.gate_time_1q),
            ("linear_decay.gate_time_2q", self.linear_decay.gate_time_2q),
            ("linear_decay.t1_decay_per_km", self.linear_decay.t1_decay_per_km),
            ("linear_decay.t2_decay_per_km", self.linear_decay.t2_decay_per_km),
            ("depolarizing.rate_per_km", self.depolarizing.rate_per_km),
            ("depolarizing.two_qubit_factor", self.depolarizing.two_qubit_factor),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        // A channel needs T2 <= 2*T1 at every distance. Both models are
        // monotone in distance, and T2 - 2*T1 is piecewise linear under the
        // floor, so the extremes sit at d = 0 and where either time clamps.
        let thermal = (self.thermal.t1_base, self.thermal.t2_base);
        check_relaxation_pair("thermal", 0.0, thermal)?;
        let decay = &self.linear_decay;
        let kinks = [
            0.0,
            (decay.t1_base - decay.floor) / decay.t1_decay_per_km,
            (decay.t2_base - decay.floor) / decay.t2_decay_per_km,
        ];
        for distance in kinks.into_iter().filter(|d| d.is_finite() && *d >= 0.0) {
            check_relaxation_pair(
                "linear_decay",
                distance,
                clamped_relaxation_times(distance, decay),
            )?;
        }

        let p = self.depolarizing.max_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::Validation(format!(
                "depolarizing.max_probability must lie in [0, 1], got {p}"
            )));
        }
        let p2 = p * self.depolarizing.two_qubit_factor;
        if p2 > MAX_TWO_QUBIT_DEPOLARIZING {
            return Err(ConfigError::Validation(format!(
                "two-qubit depolarizing probability {p2} exceeds {MAX_TWO_QUBIT_DEPOLARIZING}"
            )));
        }

        let tol = self.purity_tolerance;
        if !(tol > 0.0 && tol < 1.0) {
            return Err(ConfigError::Validation(format!(
                "purity_tolerance must lie in (0, 1), got {tol}"
            )));
        }

        let qubits: BTreeSet<u32> = self.topology.qubits.iter().copied().collect();
        if qubits.len() != self.topology.qubits.len() {
            return Err(ConfigError::Validation(
                "topology.qubits contains duplicates".to_string(),
            ));
        }
        for &(a, b) in &self.topology.pairs {
            if a == b {
                return Err(ConfigError::Validation(format!(
                    "topology pair ({a}, {b}) uses the same qubit twice"
                )));
            }
            if !qubits.contains(&a) || !qubits.contains(&b) {
                return Err(ConfigError::Validation(format!(
                    "topology pair ({a}, {b}) is outside topology.qubits"
                )));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        Ok(())
    }
}

fn check_relaxation_pair(model: &str, distance: f64, (t1, t2): (f64, f64)) -> ConfigResult<()> {
    if t2 > 2.0 * t1 {
        return Err(ConfigError::Validation(format!(
            "{model}: T2 ({t2}) exceeds 2*T1 ({t1}) at {distance} km"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        assert_eq!(config.thermal.t1_base, 50e3);
        assert_eq!(config.linear_decay.gate_time_2q, 300.0);
        assert_eq!(config.depolarizing.max_probability, 0.1);
        assert_eq!(config.topology.pairs, vec![(1, 2), (3, 4)]);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "thermal:\n  t1_base: 40000\nlog_level: debug\n";
        let config = LinkConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.thermal.t1_base, 40e3);
        assert_eq!(config.thermal.t2_base, 70e3);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.topology, Topology::default());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let err = LinkConfig::from_yaml("thermal: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LinkConfig::from_file("/nonexistent/qlink.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_merge_vars_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QLINK_T1_BASE", "40000"),
            ("QLINK_GATE_TIME", "50"),
            ("QLINK_PURITY_TOLERANCE", "not-a-number"),
            ("QLINK_LOG_LEVEL", "warn"),
        ]
        .into_iter()
        .collect();
        let config = LinkConfig::default().merge_vars(|k| vars.get(k).map(ToString::to_string));

        assert_eq!(config.thermal.t1_base, 40e3);
        assert_eq!(config.linear_decay.t1_base, 40e3);
        assert_eq!(config.thermal.gate_time, 50.0);
        assert_eq!(config.linear_decay.gate_time_1q, 50.0);
        assert_eq!(config.purity_tolerance, PURITY_TOLERANCE);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LinkConfig::default();
        config.thermal.t1_base = 0.0;
        assert!(config.validate().is_err());

        let mut config = LinkConfig::default();
        config.depolarizing.max_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = LinkConfig::default();
        config.purity_tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = LinkConfig::default();
        config.topology.pairs.push((2, 2));
        assert!(config.validate().is_err());

        let mut config = LinkConfig::default();
        config.topology.pairs.push((4, 7));
        assert!(config.validate().is_err());

        let mut config = LinkConfig::default();
        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unphysical_relaxation_times() {
        let err = LinkConfig::from_yaml("thermal: {t1_base: 10000, t2_base: 70000}").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err =
            LinkConfig::from_yaml("linear_decay: {t1_base: 10000, t2_base: 70000}").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        // T2 = 2*T1 is still a valid channel
        assert!(LinkConfig::from_yaml("thermal: {t1_base: 35000, t2_base: 70000}").is_ok());

        // Valid at 0 km, but T1 reaches the floor at 24 km while T2 is still 70000
        let yaml = "linear_decay: {t1_base: 50000, t2_base: 70000, t1_decay_per_km: 2000, t2_decay_per_km: 0}";
        assert!(matches!(LinkConfig::from_yaml(yaml), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_after_env_override() {
        let vars: HashMap<&str, &str> = [("QLINK_T1_BASE", "10000")].into_iter().collect();
        let config = LinkConfig::default().merge_vars(|k| vars.get(k).map(ToString::to_string));
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_two_qubit_depolarizing_overflow() {
        let err = LinkConfig::from_yaml("depolarizing: {max_probability: 1.0, two_qubit_factor: 1.5}")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        assert!(
            LinkConfig::from_yaml("depolarizing: {max_probability: 0.5, two_qubit_factor: 2.0}")
                .is_ok()
        );
    }
}
