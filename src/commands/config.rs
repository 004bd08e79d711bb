//! Effective configuration dump

use anyhow::{Context, Result};
use rust_ndnfw_fwd::FwdConfig;
use std::path::Path;

pub fn load(file: Option<&Path>) -> Result<FwdConfig> {
    FwdConfig::load(file).context("Failed to load forwarder configuration")
}

/// Print the configuration after file and environment overrides.
pub fn show_config(file: Option<&Path>) -> Result<()> {
    let cfg = load(file)?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
