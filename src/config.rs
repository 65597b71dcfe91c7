//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::loader::{FileLoader, HttpLoader, PlaylistLoader, DEFAULT_USER_AGENT};
use crate::models::PlaylistSource;
use crate::player::DEFAULT_PLAYER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: PlaylistSource,
    // Preselected when no deep link resolves
    #[serde(default)]
    pub default_channel: Option<String>,
    #[serde(default = "default_player")]
    pub external_player: String,
    #[serde(default = "default_true")]
    pub single_window_mode: bool,
    // Base URL for copied share links; empty copies the stream address
    #[serde(default)]
    pub share_base_url: String,
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_player() -> String { DEFAULT_PLAYER.to_string() }
fn default_true() -> bool { true }
fn default_timeout() -> u64 { 60 }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: PlaylistSource::default(),
            default_channel: None,
            external_player: default_player(),
            single_window_mode: true,
            share_base_url: String::new(),
            http_timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("channel_guide");
        path.push("config.json");
        path
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Text loader for the configured source; `None` for inline lists
    pub fn loader(&self) -> Option<Box<dyn PlaylistLoader + Send>> {
        match &self.source {
            PlaylistSource::Url(url) => Some(Box::new(
                HttpLoader::new(url.as_str())
                    .with_user_agent(&self.user_agent)
                    .with_timeout(Duration::from_secs(self.http_timeout_secs.max(1))),
            )),
            PlaylistSource::File(path) => Some(Box::new(FileLoader::new(path))),
            PlaylistSource::Inline(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelRecord;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.external_player, "ffplay");
        assert!(config.single_window_mode);
        assert_eq!(config.http_timeout_secs, 60);
    }

    #[test]
    fn test_source_variants() {
        let config: AppConfig =
            serde_json::from_str(r#"{"source": {"type": "url", "value": "http://example.test/list.m3u"}}"#).unwrap();
        assert_eq!(config.source, PlaylistSource::Url("http://example.test/list.m3u".to_string()));
        assert_eq!(config.loader().map(|l| l.describe()).as_deref(), Some("http://example.test/list.m3u"));

        let config: AppConfig = serde_json::from_str(
            r#"{"source": {"type": "inline", "value": [{"id": "c1", "name": "One", "streamUrl": "http://example.test/1"}]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.source,
            PlaylistSource::Inline(vec![ChannelRecord::new("c1", "One").with_stream("http://example.test/1")])
        );
        assert!(config.loader().is_none());
    }

    #[test]
    fn test_demo_config() {
        let config: AppConfig = serde_json::from_str(include_str!("../demos/config.json")).unwrap();
        assert_eq!(config.default_channel.as_deref(), Some("news1"));
        match config.source {
            PlaylistSource::Inline(records) => {
                assert_eq!(records.len(), 3);
                assert!(records[1].is_active());
                assert!(!records[2].is_active());
            }
            other => panic!("expected inline source, got {:?}", other),
        }
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig {
            source: PlaylistSource::File("/tmp/list.m3u".to_string()),
            default_channel: Some("n1".to_string()),
            external_player: "mpv".to_string(),
            ..AppConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[]").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
        assert_eq!(AppConfig::load_from(&dir.path().join("absent.json")), AppConfig::default());
    }
}
