use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub const DEFAULT_HIGHSCORE_FILE: &str = "highscore.txt";

/// File-backed best score. The file holds a single decimal integer and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHSCORE_FILE)
    }
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored best score; a missing, unreadable or malformed file counts as 0.
    pub fn load_high_score(&self) -> u32 {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "no high score on disk");
                return 0;
            }
        };
        match raw.trim().parse::<u32>() {
            Ok(score) => score,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "ignoring malformed high score");
                0
            }
        }
    }

    pub fn save_high_score(&self, score: u32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, score.to_string())
    }

    /// Persists `score` only when it beats `previous`. Returns whether it was written.
    pub fn submit(&self, score: u32, previous: u32) -> io::Result<bool> {
        if score <= previous {
            return Ok(false);
        }
        self.save_high_score(score)?;
        info!(score, previous, path = %self.path.display(), "new high score");
        Ok(true)
    }
}
