use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ScreenClickError, ScreenClickResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub vlm: VlmConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Ollama server settings. `OLLAMA_HOST`, `OLLAMA_PORT` and `OLLAMA_MODEL`
/// environment variables override whatever config.toml says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlmConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout. VLM localization on CPU can take a while.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    11434
}

fn default_model() -> String {
    "mistral-small3.2:latest".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for VlmConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model: default_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl VlmConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_capture_timeout")]
    pub timeout_secs: u64,
}

fn default_capture_timeout() -> u64 {
    10
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_capture_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_timeout")]
    pub timeout_secs: u64,
}

fn default_input_timeout() -> u64 {
    5
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_input_timeout(),
        }
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join("config.toml");
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    None
}

fn read_config_file(path: &Path) -> ScreenClickResult<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ScreenClickError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| ScreenClickError::Config(format!("cannot parse {}: {e}", path.display())))
}

/// Load config.toml from next to the executable or the working directory,
/// falling back to defaults when absent, then apply environment overrides.
/// An unreadable or malformed config.toml is an error; a missing one is not.
pub fn load_config() -> ScreenClickResult<AppConfig> {
    let mut config = match resolve_config_path() {
        Some(path) => {
            let config = read_config_file(&path)?;
            tracing::info!(path = %path.display(), model = %config.vlm.model, "config loaded");
            config
        }
        None => {
            tracing::debug!("no config.toml found, using defaults");
            AppConfig::default()
        }
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(host) = std::env::var("OLLAMA_HOST") {
        if !host.is_empty() {
            config.vlm.host = host;
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        match port.parse::<u16>() {
            Ok(port) if port > 0 => config.vlm.port = port,
            _ => tracing::warn!(value = %port, "ignoring invalid OLLAMA_PORT"),
        }
    }
    if let Ok(model) = std::env::var("OLLAMA_MODEL") {
        if !model.is_empty() {
            config.vlm.model = model;
        }
    }
}
