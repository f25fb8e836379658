use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::collect::global_variables::{
    DEFAULT_OVERLAY_URL, GADM2_URL_TEMPLATE, GADM3_URL_TEMPLATE, SIZE_THRESHOLD,
};

/// Runtime knobs for one invocation
/// Defaults come from `collect::global_variables`; `from_env` lets users point
/// at mirrors without recompiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeMapConfig {
    pub gadm2_url_template: String,
    pub gadm3_url_template: String,
    pub overlay_url: String,
    pub size_threshold: usize,
}

impl Default for MemeMapConfig {
    fn default() -> Self {
        MemeMapConfig {
            gadm2_url_template: GADM2_URL_TEMPLATE.to_string(),
            gadm3_url_template: GADM3_URL_TEMPLATE.to_string(),
            overlay_url: DEFAULT_OVERLAY_URL.to_string(),
            size_threshold: SIZE_THRESHOLD,
        }
    }
}

impl MemeMapConfig {
    /// Defaults overridden by `MEMEMAP_GADM2_URL`, `MEMEMAP_GADM3_URL`,
    /// `MEMEMAP_OVERLAY_URL` and `MEMEMAP_SIZE_THRESHOLD`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MemeMapConfig::default();
        if let Some(value) = lookup("MEMEMAP_GADM2_URL") {
            config.gadm2_url_template = value;
        }
        if let Some(value) = lookup("MEMEMAP_GADM3_URL") {
            config.gadm3_url_template = value;
        }
        if let Some(value) = lookup("MEMEMAP_OVERLAY_URL") {
            config.overlay_url = value;
        }
        if let Some(value) = lookup("MEMEMAP_SIZE_THRESHOLD") {
            config.size_threshold = value
                .trim()
                .parse()
                .with_context(|| format!("MEMEMAP_SIZE_THRESHOLD is not a number: {}", value))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MemeMapConfig::default();
        assert_eq!(config.size_threshold, 150_000_000);
        assert!(config.gadm3_url_template.contains("{iso}"));
        assert!(config.gadm3_url_template.contains("{level}"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MEMEMAP_OVERLAY_URL", "http://localhost/cat.png"),
            ("MEMEMAP_SIZE_THRESHOLD", " 42 "),
        ]
        .into_iter()
        .collect();
        let config =
            MemeMapConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.overlay_url, "http://localhost/cat.png");
        assert_eq!(config.size_threshold, 42);
        assert_eq!(config.gadm2_url_template, GADM2_URL_TEMPLATE);
    }

    #[test]
    fn test_bad_threshold() {
        let result = MemeMapConfig::from_lookup(|k| {
            (k == "MEMEMAP_SIZE_THRESHOLD").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }
}
