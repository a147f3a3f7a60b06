//! Policy configuration loading

use std::fs;
use std::path::Path;

use log::debug;
use sandbox_policy::{PolicyConfig, Result, SandboxError, TargetArch};

/// Command-line overrides applied on top of the file configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub allow_fork: bool,
    pub read_write: bool,
    pub arches: Vec<TargetArch>,
}

/// Read a JSON configuration file
pub fn load_config_file(path: &Path) -> Result<PolicyConfig> {
    let raw = fs::read_to_string(path)?;
    let config: PolicyConfig = serde_json::from_str(&raw).map_err(|e| {
        SandboxError::InvalidConfig(format!("{}: {}", path.display(), e))
    })?;
    debug!("loaded policy configuration from {}", path.display());
    Ok(config)
}

/// Resolve the effective configuration: defaults, then file, then flags
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<PolicyConfig> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => PolicyConfig::default(),
    };

    if overrides.allow_fork {
        config.allow_fork = true;
    }
    if overrides.read_write {
        config.read_only = false;
    }
    if !overrides.arches.is_empty() {
        config.arches = overrides.arches.clone();
    }

    config.validate()?;
    Ok(config)
}
