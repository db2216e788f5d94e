//! CLI subcommands.

pub mod banks;
pub mod config;
pub mod parse;

use std::path::{Path, PathBuf};

use ccintel_core::fallback::usable_credential;
use ccintel_core::models::config::CcintelConfig;
use ccintel_core::templates::TemplateTable;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ccintel")
        .join("config.json")
}

/// Load the config from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CcintelConfig> {
    if let Some(path) = config_path {
        return Ok(CcintelConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(CcintelConfig::from_file(&default_path)?)
    } else {
        Ok(CcintelConfig::default())
    }
}

/// Template table from an override path, the config, or the built-in one.
pub fn load_templates(
    override_path: Option<&Path>,
    config: &CcintelConfig,
) -> anyhow::Result<TemplateTable> {
    match override_path.or(config.templates.path.as_deref()) {
        Some(path) => TemplateTable::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load templates from {}: {}", path.display(), e)),
        None => Ok(TemplateTable::builtin().clone()),
    }
}

/// API key from the command line or the configured environment variable.
///
/// Blank and placeholder keys count as absent.
pub fn resolve_credential(explicit: Option<&str>, config: &CcintelConfig) -> Option<String> {
    let from_env = std::env::var(&config.fallback.api_key_env).ok();
    let candidate = explicit.map(str::to_string).or(from_env);
    usable_credential(candidate.as_deref()).map(str::to_string)
}
