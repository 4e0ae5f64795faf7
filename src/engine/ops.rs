use super::{Direction, Grid, Score, Tile, GRID_SIZE};

/// Outcome of sliding one line toward index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineResult {
    pub values: [Tile; GRID_SIZE],
    pub moved: bool,
    pub score_delta: Score,
}

/// Slide and merge one line toward index 0.
///
/// Zeros are compacted out first, then adjacent equal tiles merge pairwise
/// left to right. A merged tile is never merged again in the same move, so
/// `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]`.
pub fn slide_and_merge_line(line: &[Tile; GRID_SIZE]) -> LineResult {
    let mut compact = [0; GRID_SIZE];
    let mut len = 0;
    for &v in line.iter().filter(|&&v| v != 0) {
        compact[len] = v;
        len += 1;
    }

    let mut result = LineResult::default();
    let mut write = 0;
    let mut i = 0;
    while i < len {
        if i + 1 < len && compact[i] == compact[i + 1] {
            let merged = compact[i] * 2;
            result.values[write] = merged;
            result.score_delta += merged as Score;
            i += 2;
        } else {
            result.values[write] = compact[i];
            i += 1;
        }
        write += 1;
    }

    result.moved = result.values != *line;
    result
}

/// Board coordinates of line `idx` in traversal order for `dir`.
///
/// Index 0 of the returned array is always the cell at the edge tiles move
/// toward.
fn line_cells(dir: Direction, idx: usize) -> [(usize, usize); GRID_SIZE] {
    let mut cells = [(0, 0); GRID_SIZE];
    for (k, cell) in cells.iter_mut().enumerate() {
        let rev = GRID_SIZE - 1 - k;
        *cell = match dir {
            Direction::Left => (idx, k),
            Direction::Right => (idx, rev),
            Direction::Up => (k, idx),
            Direction::Down => (rev, idx),
        };
    }
    cells
}

/// Slide every line of `grid` in `dir`, writing results back in place.
///
/// Returns whether any line changed and the summed merge score. When no
/// line changes the grid is left exactly as it was.
pub(crate) fn shift_grid(grid: &mut Grid, dir: Direction) -> (bool, Score) {
    let mut moved = false;
    let mut score_delta = 0;
    for idx in 0..GRID_SIZE {
        let cells = line_cells(dir, idx);
        let line = cells.map(|(r, c)| grid[r][c]);
        let res = slide_and_merge_line(&line);
        moved |= res.moved;
        score_delta += res.score_delta;
        for (&(r, c), &v) in cells.iter().zip(res.values.iter()) {
            grid[r][c] = v;
        }
    }
    (moved, score_delta)
}

/// Empty cells as `(row, col)` in row-major order.
pub fn empty_cells(grid: &Grid) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
    for (r, row) in grid.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            if v == 0 {
                out.push((r, c));
            }
        }
    }
    out
}

/// True iff the board is full and no orthogonal neighbours are equal.
///
/// Computed from the cells directly; agrees with "no direction moves".
pub fn is_game_over(grid: &Grid) -> bool {
    if grid.iter().flatten().any(|&v| v == 0) {
        return false;
    }
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            if c + 1 < GRID_SIZE && grid[r][c] == grid[r][c + 1] {
                return false;
            }
            if r + 1 < GRID_SIZE && grid[r][c] == grid[r + 1][c] {
                return false;
            }
        }
    }
    true
}

/// Largest tile that can still merge without overflowing [`Tile`].
pub const MAX_TILE: Tile = 1 << (Tile::BITS - 2);

/// Every cell is 0 or a power of two in `2..=MAX_TILE`.
pub fn is_valid_grid(grid: &Grid) -> bool {
    first_invalid_cell(grid).is_none()
}

pub(crate) fn first_invalid_cell(grid: &Grid) -> Option<(usize, usize, Tile)> {
    for (r, row) in grid.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            if v != 0 && (v < 2 || v > MAX_TILE || !v.is_power_of_two()) {
                return Some((r, c, v));
            }
        }
    }
    None
}

pub(crate) fn highest_tile(grid: &Grid) -> Tile {
    grid.iter().flatten().copied().max().unwrap_or(0)
}

pub(crate) fn format_val(val: Tile) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{:^7}", x),
    }
}
