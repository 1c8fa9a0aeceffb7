//! Configuration file support for portfolio simulations.
//!
//! Allows loading simulation settings and allocation tables from TOML files
//! for reproducible runs.

use crate::engine::SimulationConfig;
use crate::error::{PortfolioError, Result};
use crate::types::ContributionFrequency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete simulation configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioFileConfig {
    /// Capital and contribution settings.
    #[serde(default)]
    pub portfolio: PortfolioSettings,
    /// Strategy id -> percent of deployed capital, 0-100.
    #[serde(default)]
    pub allocations: BTreeMap<String, f64>,
}

/// Capital and contribution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSettings {
    /// Starting balance in dollars.
    #[serde(default = "default_balance")]
    pub initial_balance: f64,
    /// Recurring cash flow; negative withdraws.
    #[serde(default)]
    pub contribution_amount: f64,
    /// Cadence: monthly, quarterly, semi-annually or annually.
    #[serde(default)]
    pub contribution_frequency: ContributionFrequency,
}

fn default_balance() -> f64 {
    100_000.0
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            initial_balance: 100_000.0,
            contribution_amount: 0.0,
            contribution_frequency: ContributionFrequency::Monthly,
        }
    }
}

impl PortfolioFileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: PortfolioFileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| PortfolioError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine would silently misbehave on.
    pub fn validate(&self) -> Result<()> {
        if self.portfolio.initial_balance < 0.0 {
            return Err(PortfolioError::ConfigError(format!(
                "initial_balance must be non-negative, got {}",
                self.portfolio.initial_balance
            )));
        }
        for (id, weight) in &self.allocations {
            if !(0.0..=100.0).contains(weight) {
                return Err(PortfolioError::ConfigError(format!(
                    "allocation for '{}' must be between 0 and 100, got {}",
                    id, weight
                )));
            }
        }
        Ok(())
    }

    /// Convert to the engine's simulation settings.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            initial_balance: self.portfolio.initial_balance,
            contribution_amount: self.portfolio.contribution_amount,
            contribution_frequency: self.portfolio.contribution_frequency,
        }
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# Blendfolio configuration file
# Weights are percent of deployed capital and need not sum to 100.

[portfolio]
initial_balance = 100000.0
contribution_amount = 0.0
# One of: "monthly", "quarterly", "semi-annually", "annually"
contribution_frequency = "monthly"

[allocations]
# strategy-id = weight
trend-following = 40.0
mean-reversion = 35.0
breakout = 25.0
"#
        .to_string()
    }
}
