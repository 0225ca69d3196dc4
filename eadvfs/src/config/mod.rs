//! Simulator configuration loading.
//!
//! Every tunable of the simulator has a built-in default; a YAML file may
//! override any subset of them.  The expected structure is:
//! ```yaml
//! power:
//!   idle_power_w: 0.2
//!   levels:
//!     - { speed: 1.0, power_w: 1.5, label: "1.0GHz" }
//!     - { speed: 1.5, power_w: 2.6, label: "1.5GHz" }
//!     - { speed: 2.0, power_w: 4.5, label: "2.0GHz" }
//! policy:
//!   governor: eadvfs
//!   short_job_threshold_ms: 30
//!   short_fraction_threshold: 0.6
//!   utilization_threshold: 0.6
//!   long_job_avg_ms: 200
//! engine:
//!   lookahead_ms: 200
//!   quantum_ms: 50
//!   epsilon: 1.0e-9
//!   horizon_ms: 100000     # `null` disables the horizon
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::engine::{Engine, EngineConfig};
use crate::policy::{Governor, PolicyConfig};
use crate::power::{FrequencyLevel, PowerModel};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Every section and field is optional; absent values keep their defaults.
#[derive(Debug, Default, Deserialize)]
struct SimConfigFile {
    #[serde(default)]
    power: Option<PowerSection>,
    #[serde(default)]
    policy: Option<PolicySection>,
    #[serde(default)]
    engine: Option<EngineSection>,
}

#[derive(Debug, Deserialize)]
struct PowerSection {
    idle_power_w: Option<f64>,
    levels: Option<Vec<LevelEntry>>,
}

#[derive(Debug, Deserialize)]
struct LevelEntry {
    speed: f64,
    power_w: f64,
    /// Defaults to `"<speed>x"` when absent.
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PolicySection {
    governor: Option<String>,
    short_job_threshold_ms: Option<f64>,
    short_fraction_threshold: Option<f64>,
    utilization_threshold: Option<f64>,
    long_job_avg_ms: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EngineSection {
    lookahead_ms: Option<f64>,
    quantum_ms: Option<f64>,
    epsilon: Option<f64>,
    /// Outer `None`: key absent.  `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "present")]
    horizon_ms: Option<Option<f64>>,
}

/// Distinguish an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ── SimulatorConfig ───────────────────────────────────────────────────────────

/// Everything needed to build an [`Engine`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulatorConfig {
    pub power: PowerModel,
    pub policy: PolicyConfig,
    pub governor: Governor,
    pub engine: EngineConfig,
}

impl SimulatorConfig {
    /// Parse `path` and overlay its values on the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, the level table is rejected by
    /// [`PowerModel::new`], or the governor name is unknown.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading simulator configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Parse YAML text and overlay its values on the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        let file: SimConfigFile = if content.trim().is_empty() {
            SimConfigFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };

        let mut cfg = Self::default();

        if let Some(power) = file.power {
            let idle = power.idle_power_w.unwrap_or(cfg.power.idle_power_w());
            let levels = match power.levels {
                Some(entries) => entries
                    .into_iter()
                    .map(|e| {
                        let label = e.label.unwrap_or_else(|| format!("{}x", e.speed));
                        FrequencyLevel::new(e.speed, e.power_w, label)
                    })
                    .collect(),
                None => cfg.power.levels().to_vec(),
            };
            cfg.power = PowerModel::new(levels, idle).context("Invalid power model")?;
        }

        if let Some(policy) = file.policy {
            if let Some(name) = policy.governor {
                cfg.governor = name.parse().context("Invalid governor")?;
            }
            let p = &mut cfg.policy;
            p.short_job_threshold_ms = policy
                .short_job_threshold_ms
                .unwrap_or(p.short_job_threshold_ms);
            p.short_fraction_threshold = policy
                .short_fraction_threshold
                .unwrap_or(p.short_fraction_threshold);
            p.utilization_threshold = policy
                .utilization_threshold
                .unwrap_or(p.utilization_threshold);
            p.long_job_avg_ms = policy.long_job_avg_ms.unwrap_or(p.long_job_avg_ms);
        }

        if let Some(engine) = file.engine {
            let e = &mut cfg.engine;
            e.lookahead_ms = engine.lookahead_ms.unwrap_or(e.lookahead_ms);
            e.quantum_ms = engine.quantum_ms.unwrap_or(e.quantum_ms);
            e.epsilon = engine.epsilon.unwrap_or(e.epsilon);
            if let Some(horizon) = engine.horizon_ms {
                e.horizon_ms = horizon;
            }
        }

        for (i, level) in cfg.power.levels().iter().enumerate() {
            debug!(
                "  Level {}: {} | speed x{} | {}W",
                i, level.label, level.speed, level.power_w
            );
        }
        debug!(
            governor = %cfg.governor,
            policy = ?cfg.policy,
            engine = ?cfg.engine,
            idle_power_w = cfg.power.idle_power_w(),
            "configuration resolved"
        );

        Ok(cfg)
    }

    /// Validate the remaining parameters and build the engine.
    pub fn build_engine(&self) -> Result<Engine> {
        Engine::new(
            Arc::new(self.power.clone()),
            self.policy,
            self.governor,
            self.engine,
        )
        .context("Invalid simulator configuration")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
