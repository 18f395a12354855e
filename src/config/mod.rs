//! Configuration for kerneval
//!
//! Loads `kerneval.toml` from the working directory (or an explicit
//! `--config` path). Everything has a sensible default so the harness
//! runs with no config file at all. Model lists and tool paths live
//! here and are passed into constructors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "kerneval.toml";

/// Example config written by `kerneval init`
pub const EXAMPLE_CONFIG: &str = r#"# kerneval configuration

[generation]
# Backend: gemini, openai, openrouter, ollama
backend = "gemini"
# Model variants evaluated per prompt
models = ["gemini-1.5-flash", "gemini-2.5-flash"]
max_tokens = 4096
temperature = 0.2

[tools]
make_program = "make"
# Kernel build tree; defaults to /lib/modules/$(uname -r)/build
# kernel_build_dir = "/lib/modules/6.8.0/build"
build_timeout_secs = 60
clang_tidy = "clang-tidy"
clang_timeout_secs = 30
# Extra include paths passed to clang-tidy as -I flags
include_paths = []
"#;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub generation: GenerationConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub backend: String,
    pub models: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-2.5-flash".to_string(),
            ],
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub make_program: String,
    /// Passed to make as KDIR=...; None keeps the recipe's default
    pub kernel_build_dir: Option<PathBuf>,
    pub build_timeout_secs: u64,
    pub clang_tidy: String,
    pub clang_timeout_secs: u64,
    pub include_paths: Vec<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            make_program: "make".to_string(),
            kernel_build_dir: None,
            build_timeout_secs: 60,
            clang_tidy: "clang-tidy".to_string(),
            clang_timeout_secs: 30,
            include_paths: Vec::new(),
        }
    }
}

/// Load configuration.
///
/// An explicitly passed path must exist and parse. The default
/// `kerneval.toml` is optional: missing means defaults, malformed means
/// a warning plus defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EvalConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: EvalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    let default_path = Path::new(CONFIG_FILE);
    if !default_path.exists() {
        debug!("No {} found, using defaults", CONFIG_FILE);
        return Ok(EvalConfig::default());
    }

    match std::fs::read_to_string(default_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
                Ok(EvalConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}", CONFIG_FILE, e);
            Ok(EvalConfig::default())
        }
    }
}
