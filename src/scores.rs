//! Local high-score history.
//!
//! Scores are kept as `{"scores": [{"score", "played_at", "player_name"}]}`,
//! ordered by score then recency (both descending) and capped at
//! [`MAX_ENTRIES`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::Score;

/// Number of entries retained.
pub const MAX_ENTRIES: usize = 5;

/// Name recorded when the player leaves theirs blank.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: Score,
    /// UTC timestamp, `YYYY-MM-DDTHH:MM:SSZ`.
    pub played_at: String,
    pub player_name: String,
}

#[derive(Deserialize)]
struct RawEntry {
    score: Score,
    played_at: String,
    #[serde(default)]
    player_name: Option<Value>,
}

#[derive(Serialize)]
struct ScoreFile<'a> {
    scores: &'a [ScoreEntry],
}

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("score file has no `scores` array")]
    MissingScores,
}

#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
    entries: Vec<ScoreEntry>,
}

impl ScoreStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ScoreStore { path: path.into(), entries: Vec::new() }
    }

    /// Replace the in-memory list with the file contents.
    ///
    /// A missing file is an empty history. Entries without an integer
    /// `score` or a string `played_at` are skipped.
    pub fn load(&mut self) -> Result<(), ScoreError> {
        self.entries.clear();
        if !self.path.try_exists()? {
            return Ok(());
        }
        let text = fs::read_to_string(&self.path)?;
        let root: Value = serde_json::from_str(&text)?;
        let items = root
            .get("scores")
            .and_then(Value::as_array)
            .ok_or(ScoreError::MissingScores)?;

        for item in items {
            match RawEntry::deserialize(item) {
                Ok(raw) => self.entries.push(ScoreEntry {
                    score: raw.score,
                    played_at: raw.played_at,
                    player_name: normalize_name(
                        raw.player_name
                            .and_then(|v| v.as_str().map(str::to_string))
                            .unwrap_or_default(),
                    ),
                }),
                Err(e) => debug!("skipping score entry {item}: {e}"),
            }
        }
        self.sort_and_trim();
        Ok(())
    }

    /// Write the history as pretty JSON, creating parent directories.
    pub fn save(&self) -> Result<(), ScoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut text = serde_json::to_string_pretty(&ScoreFile { scores: &self.entries })?;
        text.push('\n');
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Record a finished game. `played_at` defaults to now (UTC).
    pub fn add_score(&mut self, score: Score, player_name: &str, played_at: Option<String>) {
        self.entries.push(ScoreEntry {
            score,
            played_at: played_at.unwrap_or_else(current_utc_iso8601),
            player_name: normalize_name(player_name.to_string()),
        });
        self.sort_and_trim();
    }

    pub fn top_scores(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Highest recorded score, 0 when there is none.
    pub fn best_score(&self) -> Score {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sort_and_trim(&mut self) {
        self.entries
            .sort_by(|a, b| b.score.cmp(&a.score).then_with(|| b.played_at.cmp(&a.played_at)));
        self.entries.truncate(MAX_ENTRIES);
    }
}

fn normalize_name(name: String) -> String {
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

pub fn current_utc_iso8601() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
