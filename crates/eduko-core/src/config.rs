//! Configuration resolution for the Eduko backend.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/eduko/settings.json)
//! 3. Project config (.eduko/settings.json)
//! 4. Environment variables (highest priority below CLI flags)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Eduko backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub genai: GenAiConfig,
}

/// Flow-endpoint server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address for the flow endpoints.
    pub addr: String,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:9002".to_string(),
            max_body_bytes: 1024 * 1024, // 1 MB
            log_level: "info".to_string(),
        }
    }
}

/// Signalling relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Listen address for the relay WebSocket server.
    pub addr: String,
    /// Upper bound on peers per session. Joins beyond this are refused.
    pub max_session_peers: usize,
    /// Maximum accepted text frame size.
    pub max_frame_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:4000".to_string(),
            max_session_peers: 16,
            max_frame_bytes: 64 * 1024, // SDP offers are a few KB at most
        }
    }
}

/// Hosted generation model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiConfig {
    /// Model used for text and structured-JSON flows.
    pub model: String,
    /// Model used for speech synthesis.
    pub tts_model: String,
    /// Per-request timeout for generation calls (seconds).
    pub request_timeout_secs: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // Load project config
    if let Some(dir) = project_dir {
        let project_path = dir.join(".eduko").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Path of the global settings file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".eduko").join("settings.json"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
            .map(|p| p.join("eduko").join("settings.json"))
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.api = overlay.api;
    base.relay = overlay.relay;
    base.genai = overlay.genai;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("EDUKO_API_ADDR") {
        config.api.addr = val;
    }
    if let Ok(val) = std::env::var("EDUKO_RELAY_ADDR") {
        config.relay.addr = val;
    }
    if let Ok(val) = std::env::var("EDUKO_LOG_LEVEL") {
        config.api.log_level = val;
    }
    if let Ok(val) = std::env::var("EDUKO_GENAI_MODEL") {
        config.genai.model = val;
    }
    if let Ok(val) = std::env::var("EDUKO_MAX_SESSION_PEERS") {
        if let Ok(n) = val.parse() {
            config.relay.max_session_peers = n;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_relay_listens_on_4000() {
        let config = Config::default();
        assert_eq!(config.relay.addr, "0.0.0.0:4000");
    }

    #[test]
    fn default_session_cap_is_16() {
        let config = Config::default();
        assert_eq!(config.relay.max_session_peers, 16);
    }

    #[test]
    fn project_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let eduko_dir = dir.path().join(".eduko");
        std::fs::create_dir_all(&eduko_dir).unwrap();
        std::fs::write(
            eduko_dir.join("settings.json"),
            r#"{"relay": {"addr": "127.0.0.1:5000", "max_session_peers": 4, "max_frame_bytes": 1024}}"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config.relay.addr, "127.0.0.1:5000");
        assert_eq!(config.relay.max_session_peers, 4);
        // Untouched section keeps its defaults.
        assert_eq!(config.genai.model, "gemini-2.5-flash");
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let eduko_dir = dir.path().join(".eduko");
        std::fs::create_dir_all(&eduko_dir).unwrap();
        std::fs::write(eduko_dir.join("settings.json"), "not json").unwrap();

        let err = load_config(Some(dir.path())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
