//! narrate configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::text::chunker::{BATCH_MAX_SIZE, DEFAULT_MAX_SIZE};

const DEFAULT_DELAY_MS: u64 = 100;
const DEFAULT_VOICE_FILTER: &str = "en-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Default voice short name (e.g. "en-US-AriaNeural")
    #[serde(default)]
    pub voice: Option<String>,

    /// Default rate modifier (e.g. "+10%"). None means service default.
    #[serde(default)]
    pub rate: Option<String>,

    /// Maximum chunk size for single-document conversion
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum chunk size for per-chapter batch conversion
    #[serde(default = "default_batch_chunk_size")]
    pub batch_chunk_size: usize,

    /// Pause between chunks, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub inter_chunk_delay_ms: u64,

    /// Substring filter for voice short names (e.g. "en-")
    #[serde(default = "default_voice_filter")]
    pub voice_filter: String,
}

fn default_chunk_size() -> usize {
    DEFAULT_MAX_SIZE
}

fn default_batch_chunk_size() -> usize {
    BATCH_MAX_SIZE
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_voice_filter() -> String {
    DEFAULT_VOICE_FILTER.to_string()
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            voice: None,
            rate: None,
            chunk_size: default_chunk_size(),
            batch_chunk_size: default_batch_chunk_size(),
            inter_chunk_delay_ms: default_delay_ms(),
            voice_filter: default_voice_filter(),
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/narrate/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("narrate")
            .join("config.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: NarrateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NarrateConfig::default();
        assert!(config.voice.is_none());
        assert!(config.rate.is_none());
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.batch_chunk_size, 2500);
        assert_eq!(config.inter_chunk_delay_ms, 100);
        assert_eq!(config.voice_filter, "en-");
    }

    #[test]
    fn test_config_path() {
        let path = NarrateConfig::config_path().unwrap();
        assert!(path.ends_with("narrate/config.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice = "en-GB-SoniaNeural"
rate = "-10%"
chunk_size = 2000
voice_filter = "en-GB"
"#;
        let config: NarrateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voice, Some("en-GB-SoniaNeural".to_string()));
        assert_eq!(config.rate, Some("-10%".to_string()));
        assert_eq!(config.chunk_size, 2000);
        assert_eq!(config.batch_chunk_size, 2500);
        assert_eq!(config.voice_filter, "en-GB");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: NarrateConfig = toml::from_str("").unwrap();
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.inter_chunk_delay_ms, 100);
    }
}
