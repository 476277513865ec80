//! Node configuration.

use std::net::SocketAddr;

use anyhow::Context;
use noesis_core::WordSpec;
use noesis_planner::PlannerConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "NOESIS_CONFIG";

/// Configuration for the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address the API listens on.
    pub listen: SocketAddr,

    /// Seed the kitchen world on startup.
    pub demo: bool,

    /// Extra words for the lexicon.
    pub lexicon: Vec<WordSpec>,

    /// Search settings. `planner.tick_interval_ms` also paces the engine.
    pub planner: PlannerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            demo: true,
            lexicon: Vec::new(),
            planner: PlannerConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load from the file named by `NOESIS_CONFIG`, or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                let config = Self::from_json(&text)
                    .with_context(|| format!("parsing config file {}", path))?;
                info!("Loaded configuration from {}", path);
                Ok(config)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use noesis_planner::ExpansionBackend;

    #[test]
    fn test_partial_config() {
        let config = NodeConfig::from_json(
            r#"{
                "listen": "127.0.0.1:4000",
                "demo": false,
                "planner": {"backend": "rule_table"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.listen.port(), 4000);
        assert!(!config.demo);
        assert_eq!(config.planner.tick_interval_ms, 16);
        assert_eq!(config.planner.backend, ExpansionBackend::RuleTable);
        assert_eq!(config.planner.tick_budget_ms, 8);
    }

    #[test]
    fn test_rejects_malformed_config() {
        assert!(NodeConfig::from_json(r#"{"planner": {"tick_interval_ms": "soon"}}"#).is_err());
    }

    #[test]
    fn test_planner_paces_engine() {
        let config = NodeConfig::from_json(r#"{"planner": {"tick_interval_ms": 5}}"#).unwrap();
        assert_eq!(config.planner.tick_interval(), Duration::from_millis(5));
    }
}
