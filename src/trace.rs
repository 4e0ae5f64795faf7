//! Binary session recordings.
//!
//! A session is fully determined by its seed and move list; the recorded
//! final grid and score let [`replay`] check that the engine still
//! reproduces it bit for bit.
//!
//! Layout (little-endian): magic, version, endianness, seed u32, steps u32,
//! start u64, final score u64, name length u16, name bytes, one byte per
//! move, 16 u32 final-grid cells row-major, CRC32C of all preceding bytes.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::{Direction, Game, Grid, Score, EMPTY_GRID, GRID_SIZE};

const MAGIC: &[u8; 4] = b"G2S1";
const VERSION: u8 = 1;
const ENDIAN_LE: u8 = 0; // 0 = little-endian
const HEADER_LEN: usize = 4 + 1 + 1 + 4 + 4 + 8 + 8 + 2;
const GRID_BYTES: usize = GRID_SIZE * GRID_SIZE * 4;

/// File extension used for recordings.
pub const SESSION_EXT: &str = "g2s";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub seed: u32,
    pub start_unix_s: u64,
    pub final_score: Score,
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub meta: Meta,
    pub moves: Vec<Direction>,
    pub final_grid: Grid,
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("unsupported endianness")]
    Endianness,
    #[error("file too short or malformed")]
    Malformed,
    #[error("checksum mismatch")]
    Checksum,
    #[error("unknown move code {0}")]
    MoveCode(u8),
    #[error("player name or move list too long to encode")]
    TooLong,
}

#[inline]
fn read_u16_le(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?))
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?))
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> Option<u64> {
    Some(u64::from_le_bytes(bytes.get(..8)?.try_into().ok()?))
}

pub fn encode_session(session: &Session) -> Result<Vec<u8>, TraceError> {
    let name_bytes = session.meta.player_name.as_deref().map(str::as_bytes).unwrap_or(&[]);
    let name_len: u16 = name_bytes.len().try_into().map_err(|_| TraceError::TooLong)?;
    let steps: u32 = session.moves.len().try_into().map_err(|_| TraceError::TooLong)?;

    let payload_len = name_bytes.len() + session.moves.len() + GRID_BYTES;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload_len + 4);

    // Header
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.push(ENDIAN_LE);
    buf.extend_from_slice(&session.meta.seed.to_le_bytes());
    buf.extend_from_slice(&steps.to_le_bytes());
    buf.extend_from_slice(&session.meta.start_unix_s.to_le_bytes());
    buf.extend_from_slice(&session.meta.final_score.to_le_bytes());
    buf.extend_from_slice(&name_len.to_le_bytes());
    buf.extend_from_slice(name_bytes);

    // Payload: moves, then final grid
    buf.extend(session.moves.iter().map(|d| d.as_u8()));
    for &cell in session.final_grid.iter().flatten() {
        buf.extend_from_slice(&cell.to_le_bytes());
    }

    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn write_session_to_path<P: AsRef<Path>>(path: P, session: &Session) -> Result<(), TraceError> {
    let data = encode_session(session)?;
    let mut f = fs::File::create(path)?;
    f.write_all(&data)?;
    Ok(())
}

pub fn parse_session_bytes(bytes: &[u8]) -> Result<Session, TraceError> {
    if bytes.len() < HEADER_LEN + GRID_BYTES + 4 {
        return Err(TraceError::Malformed);
    }

    // Validate checksum first to avoid reading garbage fields
    let (content, trailer) = bytes.split_at(bytes.len() - 4);
    let file_crc = read_u32_le(trailer).ok_or(TraceError::Malformed)?;
    if file_crc != crc32c::crc32c(content) {
        return Err(TraceError::Checksum);
    }

    if &content[..4] != MAGIC || content[4] != VERSION {
        return Err(TraceError::MagicOrVersion);
    }
    if content[5] != ENDIAN_LE {
        return Err(TraceError::Endianness);
    }

    let mut off = 6;
    let seed = read_u32_le(&content[off..]).ok_or(TraceError::Malformed)?;
    off += 4;
    let steps = read_u32_le(&content[off..]).ok_or(TraceError::Malformed)? as usize;
    off += 4;
    let start_unix_s = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?;
    off += 8;
    let final_score = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?;
    off += 8;
    let name_len = read_u16_le(&content[off..]).ok_or(TraceError::Malformed)? as usize;
    off += 2;

    if content.len() != off + name_len + steps + GRID_BYTES {
        return Err(TraceError::Malformed);
    }
    let player_name = match name_len {
        0 => None,
        n => {
            let name =
                std::str::from_utf8(&content[off..off + n]).map_err(|_| TraceError::Malformed)?;
            Some(name.to_string())
        }
    };
    off += name_len;

    let moves = content[off..off + steps]
        .iter()
        .map(|&b| Direction::from_u8(b).ok_or(TraceError::MoveCode(b)))
        .collect::<Result<Vec<_>, _>>()?;
    off += steps;

    let mut final_grid = EMPTY_GRID;
    for (i, cell) in final_grid.iter_mut().flatten().enumerate() {
        *cell = read_u32_le(&content[off + i * 4..]).ok_or(TraceError::Malformed)?;
    }

    Ok(Session {
        meta: Meta { seed, start_unix_s, final_score, player_name },
        moves,
        final_grid,
    })
}

pub fn parse_session_file<P: AsRef<Path>>(path: P) -> Result<Session, TraceError> {
    let data = fs::read(path)?;
    parse_session_bytes(&data)
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Result of re-running a recorded session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub final_grid: Grid,
    pub final_score: Score,
    /// Grid and score both equal the recorded ones.
    pub matches: bool,
}

/// Re-run `session` from its seed with spawning enabled.
pub fn replay(session: &Session) -> Replay {
    let mut game = Game::with_seed(session.meta.seed);
    for &dir in &session.moves {
        game.make_move(dir);
    }
    let final_grid = *game.grid();
    let final_score = game.score();
    Replay {
        final_grid,
        final_score,
        matches: final_grid == session.final_grid && final_score == session.meta.final_score,
    }
}

/// Collects the seed and every attempted move of the current game.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    seed: u32,
    start_unix_s: u64,
    moves: Vec<Direction>,
}

impl SessionRecorder {
    pub fn new(seed: u32) -> Self {
        SessionRecorder { seed, start_unix_s: now_unix_seconds(), moves: Vec::with_capacity(1024) }
    }

    /// Forget recorded moves and start tracking a new game.
    pub fn restart(&mut self, seed: u32) {
        *self = SessionRecorder::new(seed);
    }

    /// Record an attempted move, including ones that changed nothing.
    pub fn record(&mut self, dir: Direction) {
        self.moves.push(dir);
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    /// Snapshot the recording against the game it tracked.
    pub fn finish(&self, game: &Game, player_name: Option<&str>) -> Session {
        Session {
            meta: Meta {
                seed: self.seed,
                start_unix_s: self.start_unix_s,
                final_score: game.score(),
                player_name: player_name.filter(|n| !n.is_empty()).map(str::to_string),
            },
            moves: self.moves.clone(),
            final_grid: *game.grid(),
        }
    }
}
