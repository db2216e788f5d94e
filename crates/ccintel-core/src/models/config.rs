//! Configuration structures for the statement pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for ccintel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CcintelConfig {
    /// LLM fallback configuration.
    pub fallback: FallbackConfig,

    /// Template table configuration.
    pub templates: TemplateConfig,

    /// PDF text source configuration.
    pub pdf: PdfConfig,
}

/// LLM fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Allow the fallback stage to run when a credential is present.
    pub enabled: bool,

    /// Gemini model name.
    pub model: String,

    /// Base URL of the generative language API.
    pub base_url: String,

    /// Upper bound for a single fallback call, in seconds.
    pub timeout_secs: u64,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Statement text beyond this many characters is not sent.
    pub max_prompt_chars: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_prompt_chars: 30_000,
        }
    }
}

impl FallbackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Template table configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// JSON template table replacing the built-in one.
    pub path: Option<PathBuf>,
}

/// PDF text source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF readable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 20 }
    }
}

impl CcintelConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
