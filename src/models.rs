//! Data models for the channel guide

use serde::{Deserialize, Serialize};

/// One entry in the channel catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>, // Embeddable player page, used when no stream
}

impl ChannelRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            logo_url: None,
            stream_url: None,
            embed_url: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_stream(mut self, url: impl Into<String>) -> Self {
        self.stream_url = Some(url.into());
        self
    }

    pub fn with_embed(mut self, url: impl Into<String>) -> Self {
        self.embed_url = Some(url.into());
        self
    }

    pub fn with_logo(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    /// True when the record has a non-empty stream URL or any embed URL
    pub fn is_active(&self) -> bool {
        self.stream_url.as_deref().is_some_and(|s| !s.is_empty()) || self.embed_url.is_some()
    }
}

/// Where the channel list comes from (persisted in config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PlaylistSource {
    Url(String),
    File(String),
    Inline(Vec<ChannelRecord>),
}

impl Default for PlaylistSource {
    fn default() -> Self {
        PlaylistSource::Inline(Vec::new())
    }
}

impl PlaylistSource {
    /// Classify a command line argument as URL or file path
    pub fn from_arg(arg: &str) -> Self {
        let lower = arg.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            PlaylistSource::Url(arg.to_string())
        } else {
            PlaylistSource::File(arg.to_string())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PlaylistSource::Url(url) => url.clone(),
            PlaylistSource::File(path) => path.clone(),
            PlaylistSource::Inline(list) => format!("inline list ({} channels)", list.len()),
        }
    }
}
