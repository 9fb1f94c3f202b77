//! Engine configuration: defaults that tune memory accounting without
//! changing the validated semantics, plus the environment-driven
//! serialization toggle of §6. Mirrors the teacher's `NeurlangConfig`
//! load/find_and_load pattern.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config file not found: {0}")]
    NotFound(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration, matching `npu-cost-model.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub serialization: SerializationConfig,

    #[serde(default)]
    pub predictor: PredictorConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Searches up from `start_dir` for `npu-cost-model.toml`; returns the
    /// default configuration if none is found before the filesystem root.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join("npu-cost-model.toml");
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether CSV/JSON serialization of cost results is enabled, honoring
    /// the `ENABLE_VPUNN_DATA_SERIALIZATION` environment override (named
    /// after the original's build flag) ahead of the config file value.
    pub fn serialization_enabled(&self) -> bool {
        match std::env::var("ENABLE_VPUNN_DATA_SERIALIZATION") {
            Ok(v) => v != "0",
            Err(_) => self.serialization.enabled,
        }
    }
}

/// Memory-accounting overrides; these tune the margins the cost engine
/// applies around the byte-exact numbers `engine::memory_breakdown`
/// computes, not the validated placement itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Page size used to round the total CMX footprint up before comparing
    /// against the device budget. `0` disables rounding.
    #[serde(default = "default_page_alignment_bytes")]
    pub page_alignment_bytes: u32,

    /// Fixed CMX reservation subtracted from each device's advertised
    /// budget before validation, modeling firmware/runtime overhead that
    /// isn't visible to this crate's tensor accounting.
    #[serde(default)]
    pub cmx_reserved_overhead_bytes: u64,
}

fn default_page_alignment_bytes() -> u32 {
    16384
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { page_alignment_bytes: default_page_alignment_bytes(), cmx_reserved_overhead_bytes: 0 }
    }
}

impl MemoryConfig {
    /// Rounds `bytes` up to the next multiple of `page_alignment_bytes`
    /// (no-op when alignment is `0`).
    pub fn align(&self, bytes: u64) -> u64 {
        if self.page_alignment_bytes == 0 {
            return bytes;
        }
        let align = self.page_alignment_bytes as u64;
        bytes.div_ceil(align) * align
    }
}

/// CSV/JSON serialization toggle for §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializationConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_serialization_output")]
    pub output_path: String,
}

fn default_serialization_output() -> String {
    "cost_results.csv".to_string()
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self { enabled: false, output_path: default_serialization_output() }
    }
}

/// Which predictor backend the CLI wires up by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    #[serde(default)]
    pub use_remote: bool,

    #[serde(default = "default_remote_base_url")]
    pub remote_base_url: String,

    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
}

fn default_remote_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    30
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            remote_base_url: default_remote_base_url(),
            remote_timeout_secs: default_remote_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_alignment() {
        let config = EngineConfig::default();
        assert_eq!(config.memory.page_alignment_bytes, 16384);
        assert!(!config.predictor.use_remote);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml_str = r#"
[memory]
cmx_reserved_overhead_bytes = 4096

[predictor]
use_remote = true
"#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.cmx_reserved_overhead_bytes, 4096);
        assert_eq!(config.memory.page_alignment_bytes, 16384);
        assert!(config.predictor.use_remote);
    }

    #[test]
    fn align_rounds_up_to_page_boundary() {
        let mem = MemoryConfig::default();
        assert_eq!(mem.align(1), 16384);
        assert_eq!(mem.align(16384), 16384);
        assert_eq!(mem.align(16385), 32768);
    }

    #[test]
    fn zero_alignment_disables_rounding() {
        let mem = MemoryConfig { page_alignment_bytes: 0, cmx_reserved_overhead_bytes: 0 };
        assert_eq!(mem.align(12345), 12345);
    }
}
