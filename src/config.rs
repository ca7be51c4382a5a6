use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ranges::RangeCharts;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdviserConfig {
    /// λ used when a caller does not send one.
    pub default_lambda: f32,
    pub session_ttl_secs: u64,
    pub eviction_interval_secs: u64,
    pub external_timeout_ms: u64,
    /// Optional JSON range charts replacing the built-in tables.
    pub charts_path: Option<PathBuf>,
}

impl Default for AdviserConfig {
    fn default() -> Self {
        Self {
            default_lambda: 0.5,
            session_ttl_secs: 1800,
            eviction_interval_secs: 60,
            external_timeout_ms: 2500,
            charts_path: None,
        }
    }
}

impl AdviserConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_millis(self.external_timeout_ms)
    }

    pub fn charts(&self) -> Result<RangeCharts> {
        match &self.charts_path {
            Some(path) => RangeCharts::load(path),
            None => Ok(RangeCharts::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AdviserConfig = serde_json::from_str(r#"{"default_lambda":0.8}"#).unwrap();
        assert_eq!(config.default_lambda, 0.8);
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
        assert_eq!(config.external_timeout(), Duration::from_millis(2500));
        assert!(config.charts_path.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AdviserConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
