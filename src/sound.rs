//! Mapping from engine outcomes to sound-effect triggers.
//!
//! Playback itself belongs to the front end; this only decides which cues
//! a move or a finished game should fire, in the order they fire.

use crate::engine::{MoveResult, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    TileSlide,
    Merge,
    Spawn,
    GameOver,
    HighScore,
}

impl SoundEffect {
    /// Asset file name a front end would load for this cue.
    pub fn file_name(self) -> &'static str {
        match self {
            SoundEffect::TileSlide => "tile_slide.wav",
            SoundEffect::Merge => "merge.wav",
            SoundEffect::Spawn => "spawn.wav",
            SoundEffect::GameOver => "game_over.wav",
            SoundEffect::HighScore => "high_score.wav",
        }
    }
}

/// Cues for one move: slide on any change, merge when points were scored,
/// spawn when a tile appeared. Empty for a no-op move.
pub fn move_cues(result: &MoveResult) -> Vec<SoundEffect> {
    let mut cues = Vec::with_capacity(3);
    if !result.moved {
        return cues;
    }
    cues.push(SoundEffect::TileSlide);
    if result.score_delta > 0 {
        cues.push(SoundEffect::Merge);
    }
    if result.spawned.is_some() {
        cues.push(SoundEffect::Spawn);
    }
    cues
}

/// Cues for the end of a game; a new best adds a high-score fanfare.
pub fn game_over_cues(final_score: Score, previous_best: Score) -> Vec<SoundEffect> {
    if final_score > previous_best {
        vec![SoundEffect::GameOver, SoundEffect::HighScore]
    } else {
        vec![SoundEffect::GameOver]
    }
}
