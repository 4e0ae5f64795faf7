//! tile-2048: a 2048 game engine with seeded, reproducible sessions
//!
//! This crate provides:
//! - A `Game` state machine over a fixed 4x4 grid (`engine` module)
//! - Local high-score history and settings files (`scores`, `settings`)
//! - Sound-cue mapping for front ends (`sound`)
//! - A binary session recording format with replay verification (`trace`)
//! - TOML front-end configuration (`config`)
//!
//! Quick start:
//! ```
//! use tile_2048::engine::{Direction, Game};
//!
//! // Deterministic session from an explicit seed
//! let mut game = Game::with_seed(42);
//! let res = game.make_move(Direction::Left);
//! if res.moved {
//!     assert!(res.spawned.is_some());
//! }
//! assert!(!game.is_game_over());
//! ```
//!
//! Scenario setup without spawning:
//! ```
//! use tile_2048::engine::{Direction, Game, EMPTY_GRID};
//!
//! let mut game = Game::with_seed(0);
//! let mut grid = EMPTY_GRID;
//! grid[0] = [2, 2, 2, 2];
//! game.load_state(grid, 0);
//! let res = game.shift(Direction::Left);
//! assert_eq!(res.score_delta, 8);
//! assert_eq!(game.grid()[0], [4, 4, 0, 0]);
//! ```
//!
pub mod config;
pub mod engine;
pub mod scores;
pub mod settings;
pub mod sound;
pub mod trace;
