use std::fmt;

use log::{debug, trace};

use super::ops;
use super::rng::{entropy_seed, SpawnRng};
use super::{Grid, Score, Tile, EMPTY_GRID, GRID_SIZE};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// One-byte code used by session recordings.
    #[inline]
    pub fn as_u8(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    #[inline]
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A tile placed by the spawner after a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedTile {
    pub row: usize,
    pub col: usize,
    pub value: Tile,
}

/// What a single move attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResult {
    /// Whether any cell changed.
    pub moved: bool,
    /// Sum of the tiles created by merges this move.
    pub score_delta: Score,
    /// Absent on a no-op move or when spawning was suppressed.
    pub spawned: Option<SpawnedTile>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid tile {value} at row {row}, col {col}")]
    InvalidTile { row: usize, col: usize, value: Tile },
}

/// One play session: grid, cumulative score and the seeded spawn RNG.
///
/// ```
/// use tile_2048::engine::{Direction, Game};
///
/// let mut game = Game::with_seed(42);
/// let before = game.grid().iter().flatten().filter(|&&v| v != 0).count();
/// assert_eq!(before, 2);
/// let res = game.make_move(Direction::Left);
/// assert!(res.moved || res.spawned.is_none());
/// ```
#[derive(Clone)]
pub struct Game {
    grid: Grid,
    score: Score,
    seed: u32,
    rng: SpawnRng,
}

impl Game {
    /// New session seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(entropy_seed())
    }

    /// New session with an explicit seed; identical seeds replay identically.
    pub fn with_seed(seed: u32) -> Self {
        let mut game = Game { grid: EMPTY_GRID, score: 0, seed, rng: SpawnRng::from_seed(seed) };
        game.reset_with_seed(seed);
        game
    }

    /// Start over with a fresh entropy seed.
    pub fn reset(&mut self) {
        self.reset_with_seed(entropy_seed());
    }

    /// Clear the board, zero the score, reseed and spawn two tiles.
    pub fn reset_with_seed(&mut self, seed: u32) {
        self.seed = seed;
        self.rng.reseed(seed);
        self.grid = EMPTY_GRID;
        self.score = 0;
        self.spawn_tile();
        self.spawn_tile();
        debug!("reset with seed {seed}");
    }

    /// Overwrite grid and score without touching the RNG or spawning.
    ///
    /// Values are not checked; use [`Game::try_load_state`] for untrusted input.
    pub fn load_state(&mut self, grid: Grid, score: Score) {
        self.grid = grid;
        self.score = score;
    }

    /// Like [`Game::load_state`] but rejects cells that are neither 0 nor a
    /// power of two >= 2. State is unchanged on error.
    pub fn try_load_state(&mut self, grid: Grid, score: Score) -> Result<(), EngineError> {
        if let Some((row, col, value)) = ops::first_invalid_cell(&grid) {
            return Err(EngineError::InvalidTile { row, col, value });
        }
        self.load_state(grid, score);
        Ok(())
    }

    /// Slide/merge in `dir`; on change add the score delta and, if
    /// `spawn_on_move`, place one random tile.
    ///
    /// A move that changes nothing leaves grid, score and RNG untouched.
    pub fn apply_move(&mut self, dir: Direction, spawn_on_move: bool) -> MoveResult {
        let mut next = self.grid;
        let (moved, score_delta) = ops::shift_grid(&mut next, dir);
        if !moved {
            return MoveResult::default();
        }
        self.grid = next;
        self.score += score_delta;
        let spawned = if spawn_on_move { self.spawn_tile() } else { None };
        MoveResult { moved, score_delta, spawned }
    }

    /// Move with spawning.
    #[inline]
    pub fn make_move(&mut self, dir: Direction) -> MoveResult {
        self.apply_move(dir, true)
    }

    /// Move without spawning.
    #[inline]
    pub fn shift(&mut self, dir: Direction) -> MoveResult {
        self.apply_move(dir, false)
    }

    /// Place a 2 (9/10) or 4 (1/10) in a uniformly chosen empty cell.
    pub(crate) fn spawn_tile(&mut self) -> Option<SpawnedTile> {
        let empty = ops::empty_cells(&self.grid);
        if empty.is_empty() {
            return None;
        }
        let idx = self.rng.next_bounded(empty.len() as u32) as usize;
        let (row, col) = empty[idx];
        let value = if self.rng.next_bounded(10) == 0 { 4 } else { 2 };
        self.grid[row][col] = value;
        trace!("spawned {value} at ({row}, {col})");
        Some(SpawnedTile { row, col, value })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    /// Seed of the current session.
    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// True when no direction can change the board.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        ops::is_game_over(&self.grid)
    }

    /// Highest tile value on the board, 0 when empty.
    #[inline]
    pub fn highest_tile(&self) -> Tile {
        ops::highest_tile(&self.grid)
    }

    #[inline]
    pub fn empty_count(&self) -> usize {
        ops::empty_cells(&self.grid).len()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("grid", &self.grid)
            .field("score", &self.score)
            .field("seed", &self.seed)
            .finish()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = "-".repeat(GRID_SIZE * 8 - 1);
        for (r, row) in self.grid.iter().enumerate() {
            if r > 0 {
                writeln!(f, "{sep}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_MOVES: [Direction; 10] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
        Direction::Left,
    ];

    fn row0(values: [Tile; 4]) -> Grid {
        let mut g = EMPTY_GRID;
        g[0] = values;
        g
    }

    fn tile_count(g: &Grid) -> usize {
        g.iter().flatten().filter(|&&v| v != 0).count()
    }

    fn tile_sum(g: &Grid) -> u64 {
        g.iter().flatten().map(|&v| v as u64).sum()
    }

    fn mirror(g: &Grid) -> Grid {
        let mut out = *g;
        for row in out.iter_mut() {
            row.reverse();
        }
        out
    }

    fn play(seed: u32) -> (Grid, Score, Vec<bool>) {
        let mut game = Game::with_seed(seed);
        let moved = GOLDEN_MOVES.iter().map(|&d| game.make_move(d).moved).collect();
        (*game.grid(), game.score(), moved)
    }

    #[test]
    fn reset_spawns_two_tiles() {
        let game = Game::with_seed(3);
        assert_eq!(game.score(), 0);
        assert_eq!(tile_count(game.grid()), 2);
        assert!(game.grid().iter().flatten().all(|&v| v == 0 || v == 2 || v == 4));
    }

    #[test]
    fn four_twos_merge_pairwise() {
        let mut game = Game::with_seed(0);
        game.load_state(row0([2, 2, 2, 2]), 0);
        let res = game.shift(Direction::Left);
        assert!(res.moved);
        assert_eq!(res.score_delta, 8);
        assert!(res.spawned.is_none());
        assert_eq!(*game.grid(), row0([4, 4, 0, 0]));
        assert_eq!(game.score(), 8);
    }

    #[test]
    fn double_merge_happens_once_per_tile() {
        let mut game = Game::with_seed(0);
        game.load_state(row0([2, 2, 4, 4]), 0);
        let res = game.shift(Direction::Left);
        assert!(res.moved);
        assert_eq!(res.score_delta, 12);
        assert_eq!(*game.grid(), row0([4, 8, 0, 0]));
        assert_eq!(game.score(), 12);
    }

    #[test]
    fn noop_move_does_not_mutate_or_spawn() {
        let grid: Grid = [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 64]];
        let mut game = Game::with_seed(0);
        game.load_state(grid, 99);
        let res = game.make_move(Direction::Left);
        assert_eq!(res, MoveResult::default());
        assert_eq!(*game.grid(), grid);
        assert_eq!(game.score(), 99);
    }

    #[test]
    fn noop_move_does_not_advance_rng() {
        let mut a = Game::with_seed(11);
        let mut b = Game::with_seed(11);
        let stuck = row0([2, 4, 8, 16]);
        a.load_state(stuck, 0);
        b.load_state(stuck, 0);
        assert!(!a.make_move(Direction::Left).moved);
        assert_eq!(a.make_move(Direction::Down), b.make_move(Direction::Down));
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn score_accumulates_across_moves() {
        let mut game = Game::with_seed(0);
        let mut grid = EMPTY_GRID;
        grid[0] = [2, 2, 0, 0];
        grid[1] = [4, 4, 0, 0];
        game.load_state(grid, 0);

        let first = game.shift(Direction::Left);
        assert!(first.moved);
        assert_eq!(first.score_delta, 12);
        assert_eq!(game.score(), 12);

        let second = game.shift(Direction::Left);
        assert!(!second.moved);
        assert_eq!(second.score_delta, 0);
        assert_eq!(game.score(), 12);
    }

    #[test]
    fn game_over_for_dead_and_alive_boards() {
        let mut game = Game::with_seed(0);
        let dead: Grid = [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 64]];
        game.load_state(dead, 0);
        assert!(game.is_game_over());

        let alive: Grid = [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 32]];
        game.load_state(alive, 0);
        assert!(!game.is_game_over());
    }

    #[test]
    fn game_over_agrees_with_move_attempts() {
        let boards: [Grid; 3] = [
            [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 64]],
            [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 32]],
            [[2, 4, 8, 16], [4, 8, 16, 2], [2, 4, 8, 16], [4, 8, 16, 0]],
        ];
        for grid in boards {
            let mut probe = Game::with_seed(0);
            probe.load_state(grid, 0);
            let any_moves = Direction::ALL.iter().any(|&d| {
                let mut g = probe.clone();
                g.shift(d).moved
            });
            assert_eq!(probe.is_game_over(), !any_moves, "{grid:?}");
        }
    }

    #[test]
    fn left_and_right_are_mirror_images() {
        let grids: [Grid; 3] = [
            [[2, 2, 4, 0], [0, 4, 4, 4], [8, 0, 8, 2], [2, 4, 8, 16]],
            [[0, 0, 0, 2], [2, 0, 2, 0], [4, 4, 4, 4], [16, 8, 8, 0]],
            [[2, 4, 2, 4], [0, 0, 0, 0], [64, 64, 0, 2], [2, 0, 0, 2]],
        ];
        for grid in grids {
            let mut left = Game::with_seed(0);
            left.load_state(grid, 0);
            let mut right = Game::with_seed(0);
            right.load_state(mirror(&grid), 0);
            let l = left.shift(Direction::Left);
            let r = right.shift(Direction::Right);
            assert_eq!(l.moved, r.moved);
            assert_eq!(l.score_delta, r.score_delta);
            assert_eq!(mirror(left.grid()), *right.grid());
        }
    }

    #[test]
    fn shifting_conserves_tile_sum() {
        let grid: Grid = [[2, 2, 4, 8], [4, 0, 4, 0], [2, 2, 2, 0], [0, 16, 0, 16]];
        for dir in Direction::ALL {
            let mut game = Game::with_seed(0);
            game.load_state(grid, 0);
            let res = game.shift(dir);
            assert_eq!(tile_sum(game.grid()), tile_sum(&grid));
            if res.score_delta > 0 {
                assert!(tile_count(game.grid()) < tile_count(&grid));
            } else {
                assert_eq!(tile_count(game.grid()), tile_count(&grid));
            }
        }
    }

    #[test]
    fn reachable_tiles_stay_powers_of_two() {
        let mut game = Game::with_seed(2024);
        for i in 0..400 {
            if game.is_game_over() {
                break;
            }
            game.make_move(Direction::ALL[i % 4]);
            assert!(ops::is_valid_grid(game.grid()));
        }
    }

    #[test]
    fn spawn_on_full_board_is_none() {
        let mut game = Game::with_seed(0);
        let full: Grid = [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 64]];
        game.load_state(full, 0);
        assert_eq!(game.spawn_tile(), None);
        assert_eq!(*game.grid(), full);
    }

    #[test]
    fn spawned_tile_lands_on_board() {
        let mut game = Game::with_seed(5);
        game.load_state(row0([0, 2, 0, 2]), 0);
        let res = game.make_move(Direction::Left);
        let tile = res.spawned.expect("moved board spawns");
        assert!(tile.value == 2 || tile.value == 4);
        assert_eq!(game.grid()[tile.row][tile.col], tile.value);
        assert_eq!(tile_count(game.grid()), 2);
    }

    #[test]
    fn same_seed_same_session() {
        assert_eq!(play(1234), play(1234));
        assert_eq!(play(77), play(77));
    }

    #[test]
    fn seed_1234_golden_snapshot() {
        let (grid, score, moved) = play(1234);
        assert_eq!(grid, [[2, 16, 0, 0], [2, 0, 0, 0], [4, 0, 2, 0], [0, 0, 0, 0]]);
        assert_eq!(score, 48);
        assert!(moved.iter().all(|&m| m));
    }

    #[test]
    fn reset_with_same_seed_restarts_session() {
        let mut game = Game::with_seed(9);
        let start = *game.grid();
        game.make_move(Direction::Up);
        game.make_move(Direction::Left);
        game.reset_with_seed(9);
        assert_eq!(*game.grid(), start);
        assert_eq!(game.score(), 0);
        assert_eq!(game.seed(), 9);
    }

    #[test]
    fn try_load_state_rejects_bad_tiles() {
        let mut game = Game::with_seed(1);
        let before = *game.grid();
        let bad = row0([2, 3, 0, 0]);
        assert_eq!(
            game.try_load_state(bad, 5),
            Err(EngineError::InvalidTile { row: 0, col: 1, value: 3 })
        );
        assert_eq!(*game.grid(), before);
        assert_eq!(game.score(), 0);
        assert!(game.try_load_state(row0([2, 4, 0, 0]), 5).is_ok());
        assert_eq!(game.score(), 5);
    }

    #[test]
    fn largest_mergeable_tiles_load_and_merge() {
        let mut game = Game::with_seed(1);
        let before = *game.grid();
        let top = ops::MAX_TILE * 2;
        assert_eq!(
            game.try_load_state(row0([top, top, 0, 0]), 0),
            Err(EngineError::InvalidTile { row: 0, col: 0, value: top })
        );
        assert_eq!(*game.grid(), before);

        game.try_load_state(row0([ops::MAX_TILE, ops::MAX_TILE, 0, 0]), 0).unwrap();
        let res = game.shift(Direction::Left);
        assert!(res.moved);
        assert_eq!(res.score_delta, top as Score);
        assert_eq!(game.grid()[0], [top, 0, 0, 0]);
    }

    #[test]
    fn highest_tile_and_empty_count() {
        let mut game = Game::with_seed(3);
        let mut grid = [[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2048, 2], [0, 0, 0, 4]];
        game.load_state(grid, 0);
        assert_eq!(game.highest_tile(), 2048);
        assert_eq!(game.empty_count(), 3);
        grid = EMPTY_GRID;
        game.load_state(grid, 0);
        assert_eq!(game.highest_tile(), 0);
        assert_eq!(game.empty_count(), 16);
    }

    #[test]
    fn direction_codes_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_u8(d.as_u8()), Some(d));
        }
        assert_eq!(Direction::from_u8(4), None);
    }

    #[test]
    fn display_renders_four_rows() {
        let mut game = Game::with_seed(0);
        game.load_state(row0([2, 0, 0, 2048]), 0);
        let text = game.to_string();
        assert_eq!(text.lines().count(), 7);
        assert!(text.lines().next().is_some_and(|l| l.contains("2048")));
    }
}
