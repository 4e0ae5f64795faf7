//! Engine module: the 4x4 board, move resolution, seeded tile spawning and
//! game-over detection for one play session.
//!
//! - `Game` owns the grid, the running score and the spawn RNG.
//! - Line sliding/merging and board queries live in `ops`.
//! - The Mersenne Twister wrapper and bounded draws live in `rng`.

mod ops;
mod rng;
pub mod state;

pub use ops::{
    empty_cells, is_game_over, is_valid_grid, slide_and_merge_line, LineResult, MAX_TILE,
};
pub use rng::entropy_seed;
pub use state::{Direction, EngineError, Game, MoveResult, SpawnedTile};

/// Side length of the board.
pub const GRID_SIZE: usize = 4;

/// Tile value: 0 for empty, otherwise a power of two >= 2.
pub type Tile = u32;

/// Cumulative or per-move score.
pub type Score = u64;

/// Row-major board, `grid[row][col]`.
pub type Grid = [[Tile; GRID_SIZE]; GRID_SIZE];

/// A grid with no tiles.
pub const EMPTY_GRID: Grid = [[0; GRID_SIZE]; GRID_SIZE];
