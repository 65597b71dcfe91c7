//! Playlist text loaders (local file, HTTP/HTTPS, in-memory)

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = "VLC/3.0.16 LibVLC/3.0.16";

/// Fetches the full playlist document as text
pub trait PlaylistLoader {
    fn fetch(&self) -> Result<String>;

    /// Human readable origin, for logs and the status bar
    fn describe(&self) -> String;
}

/// Reads a playlist from the local filesystem
#[derive(Debug, Clone)]
pub struct FileLoader {
    pub path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlaylistLoader for FileLoader {
    fn fetch(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Downloads a playlist over HTTP or HTTPS
#[derive(Debug, Clone)]
pub struct HttpLoader {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        if !user_agent.is_empty() {
            self.user_agent = user_agent.to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl PlaylistLoader for HttpLoader {
    fn fetch(&self) -> Result<String> {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .timeout_connect(Some(Duration::from_secs(30)))
            .build()
            .new_agent();

        let mut response = agent
            .get(&self.url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => Error::HttpStatus(code),
                other => Error::Http(other),
            })?;

        if response.status() != 200 {
            return Err(Error::HttpStatus(response.status().as_u16()));
        }

        Ok(response.body_mut().read_to_string()?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Serves a fixed document, e.g. a playlist bundled with the binary
#[derive(Debug, Clone, Default)]
pub struct StaticLoader(pub String);

impl PlaylistLoader for StaticLoader {
    fn fetch(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "built-in playlist".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_loader_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "#EXTM3U").unwrap();
        writeln!(file, "#EXTINF:-1 tvg-id=\"a\",A").unwrap();
        writeln!(file, "http://example.test/a.m3u8").unwrap();

        let loader = FileLoader::new(file.path());
        let text = loader.fetch().unwrap();
        assert!(text.starts_with("#EXTM3U"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_file_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileLoader::new(dir.path().join("missing.m3u"));
        assert!(matches!(loader.fetch(), Err(Error::Io(_))));
    }

    #[test]
    fn test_http_loader_builder() {
        let loader = HttpLoader::new("http://example.test/list.m3u")
            .with_user_agent("")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(loader.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(loader.timeout, Duration::from_secs(5));

        let loader = loader.with_user_agent("Custom/1.0");
        assert_eq!(loader.user_agent, "Custom/1.0");
        assert_eq!(loader.describe(), "http://example.test/list.m3u");
    }

    #[test]
    fn test_static_loader() {
        let loader = StaticLoader("#EXTM3U\n".to_string());
        assert_eq!(loader.fetch().unwrap(), "#EXTM3U\n");
    }
}
