//! Hands a selected channel to an external player or the system browser

use std::process::{Child, Command, Stdio};

use crate::error::{Error, Result};
use crate::models::ChannelRecord;

pub const DEFAULT_PLAYER: &str = "ffplay";

/// The address a record would be played from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayTarget {
    Stream(String),
    Embed(String), // Opened in the browser
}

impl PlayTarget {
    pub fn url(&self) -> &str {
        match self {
            PlayTarget::Stream(url) | PlayTarget::Embed(url) => url,
        }
    }
}

/// Stream URL when non-empty, otherwise the embed page
pub fn playable_address(record: &ChannelRecord) -> Option<PlayTarget> {
    if let Some(url) = record.stream_url.as_deref().filter(|u| !u.is_empty()) {
        return Some(PlayTarget::Stream(url.to_string()));
    }
    record.embed_url.clone().map(PlayTarget::Embed)
}

/// Program and arguments for launching `player` on a stream
pub fn player_command(player: &str, title: &str, url: &str) -> (String, Vec<String>) {
    let program = if player.trim().is_empty() { DEFAULT_PLAYER } else { player.trim() };
    let lower = program.to_lowercase();

    let mut args = Vec::new();
    if lower.contains("ffplay") {
        args.extend(["-window_title".to_string(), title.to_string(), "-autoexit".to_string()]);
    } else if lower.contains("mpv") {
        args.push(format!("--force-media-title={}", title));
    } else if lower.contains("vlc") {
        args.push(format!("--meta-title={}", title));
    }
    args.push(url.to_string());

    (program.to_string(), args)
}

/// Platform command that opens a URL in the default browser
pub fn browser_command(url: &str) -> (String, Vec<String>) {
    if cfg!(target_os = "windows") {
        ("cmd".to_string(), vec!["/C".into(), "start".into(), String::new(), url.to_string()])
    } else if cfg!(target_os = "macos") {
        ("open".to_string(), vec![url.to_string()])
    } else {
        ("xdg-open".to_string(), vec![url.to_string()])
    }
}

#[derive(Debug, Default)]
pub struct Player {
    pub command: String,
    pub single_window: bool,
    // Replaced on each stream launch in single window mode
    current: Option<Child>,
    // Launched and left running; reaped once they exit
    detached: Vec<Child>,
}

impl Player {
    pub fn new(command: &str, single_window: bool) -> Self {
        Self {
            command: command.to_string(),
            single_window,
            current: None,
            detached: Vec::new(),
        }
    }

    /// Launch the record; fails with `StreamUnavailable` for placeholders
    pub fn play(&mut self, record: &ChannelRecord) -> Result<PlayTarget> {
        let target = playable_address(record).ok_or_else(|| Error::StreamUnavailable(record.id.clone()))?;

        let (program, args) = match &target {
            PlayTarget::Stream(url) => player_command(&self.command, &record.name, url),
            PlayTarget::Embed(url) => browser_command(url),
        };
        self.reap();

        tracing::info!(channel = %record.id, program = %program, url = %target.url(), "starting playback");

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::PlayerLaunch { player: program.clone(), source })?;

        if self.single_window && matches!(target, PlayTarget::Stream(_)) {
            self.stop();
            self.current = Some(child);
        } else {
            self.detached.push(child);
        }
        Ok(target)
    }

    /// Drop detached processes that have exited
    pub fn reap(&mut self) {
        self.detached.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }

    /// Kill the running player process, if any
    pub fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait(); // Reap the process
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if self.single_window {
            self.stop();
        }
        self.reap();
    }
}
