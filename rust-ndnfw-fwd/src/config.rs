//! Forwarder configuration.
//!
//! Values come from an optional file (TOML, JSON or YAML, chosen by
//! extension) and are overridden by `NDNFW__*` environment variables, e.g.
//! `NDNFW__N_WORKERS=4` or `NDNFW__SUPPRESS__MAX_MS=200`.

use rust_ndnfw_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest worker count; the worker id must fit in one token byte.
pub const MAX_WORKERS: usize = 256;

/// Retransmission suppression backoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuppressConfig {
    pub min_ms: u64,
    pub multiplier: f64,
    pub max_ms: u64,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            min_ms: 10,
            multiplier: 2.0,
            max_ms: 100,
        }
    }
}

impl SuppressConfig {
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CongestionConfig {
    /// Gate forwarding on the per-path CUBIC window.
    pub enabled: bool,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FwdConfig {
    pub n_workers: usize,
    /// Per-worker input queue length.
    pub queue_capacity: usize,
    /// Per-worker PIT entries.
    pub pit_capacity: usize,
    /// Per-worker PIT extension blocks.
    pub ext_pool_capacity: usize,
    /// Per-worker outgoing packet headers.
    pub header_pool_capacity: usize,
    pub suppress: SuppressConfig,
    pub congestion: CongestionConfig,
    pub expiry_sweep_ms: u64,
}

impl Default for FwdConfig {
    fn default() -> Self {
        Self {
            n_workers: 2,
            queue_capacity: 1024,
            pit_capacity: 65536,
            ext_pool_capacity: 4096,
            header_pool_capacity: 8192,
            suppress: SuppressConfig::default(),
            congestion: CongestionConfig::default(),
            expiry_sweep_ms: 100,
        }
    }
}

impl FwdConfig {
    /// Load from an optional file plus the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let cfg: FwdConfig = builder
            .add_source(config::Environment::with_prefix("NDNFW").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::Config(msg.to_string()));
        if self.n_workers == 0 {
            return fail("n_workers must be at least 1");
        }
        if self.n_workers > MAX_WORKERS {
            return fail("n_workers must not exceed 256");
        }
        if self.queue_capacity == 0 || self.pit_capacity == 0 || self.header_pool_capacity == 0 {
            return fail("queue, PIT and header pool capacities must be positive");
        }
        if self.ext_pool_capacity == 0 {
            return fail("ext_pool_capacity must be positive");
        }
        if self.expiry_sweep_ms == 0 {
            return fail("expiry_sweep_ms must be positive");
        }
        if !(self.suppress.multiplier >= 1.0) {
            return fail("suppress.multiplier must be at least 1");
        }
        if self.suppress.min_ms > self.suppress.max_ms {
            return fail("suppress.min_ms exceeds suppress.max_ms");
        }
        Ok(())
    }

    pub fn expiry_sweep(&self) -> Duration {
        Duration::from_millis(self.expiry_sweep_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = FwdConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.suppress.min(), Duration::from_millis(10));
        assert_eq!(cfg.suppress.max(), Duration::from_millis(100));
    }

    #[test]
    fn test_validate_rejects() {
        let mut cfg = FwdConfig::default();
        cfg.n_workers = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = FwdConfig::default();
        cfg.n_workers = 257;
        assert!(cfg.validate().is_err());

        let mut cfg = FwdConfig::default();
        cfg.suppress.multiplier = 0.5;
        assert!(cfg.validate().is_err());

        let mut cfg = FwdConfig::default();
        cfg.suppress.min_ms = 500;
        assert!(cfg.validate().is_err());

        let mut cfg = FwdConfig::default();
        cfg.ext_pool_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let body = serde_json::json!({
            "n_workers": 4,
            "suppress": { "max_ms": 250 }
        });
        write!(file, "{}", body).unwrap();

        let cfg = FwdConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.n_workers, 4);
        assert_eq!(cfg.suppress.max_ms, 250);
        assert_eq!(cfg.suppress.min_ms, 10);
        assert_eq!(cfg.pit_capacity, 65536);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", serde_json::json!({ "n_workers": 0 })).unwrap();
        assert!(matches!(FwdConfig::load(Some(file.path())), Err(Error::Config(_))));
    }
}
