use serde::{Deserialize, Serialize};

use super::piece::{Piece, StoneColor};

/// Number of visible board rows.
pub const ROWS: usize = 20;
/// Number of board columns.
pub const COLS: usize = 10;

/// Fraction of the board that must be occupied before the danger cue fires.
pub const DANGER_FILL_RATIO: f64 = 0.7;
/// Occupied-cell count corresponding to [`DANGER_FILL_RATIO`], rounded up.
pub const DANGER_FILL_THRESHOLD: usize = (ROWS * COLS * 7).div_ceil(10);
/// Any stone at a row below this cutoff (rows 0..8) triggers the danger cue.
pub const DANGER_HIGH_ROW_CUTOFF: usize = 8;

/// Orthogonal neighbor offsets used by the group flood-fill.
pub(crate) const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A single board cell.
///
/// `BlockBlack` and `BlockWhite` are reserved obstacle variants: consumers
/// may render them, but no rule or generator ever produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
    BlockBlack,
    BlockWhite,
    EyeBlack,
    EyeWhite,
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_eye(self) -> bool {
        matches!(self, Cell::EyeBlack | Cell::EyeWhite)
    }

    /// Returns the stone color for plain black/white stones.
    ///
    /// Eye markers and the reserved obstacle variants are not stones and
    /// never form capturable groups.
    #[must_use]
    pub fn stone_color(self) -> Option<StoneColor> {
        match self {
            Cell::Black => Some(StoneColor::Black),
            Cell::White => Some(StoneColor::White),
            _ => None,
        }
    }

    /// Whether this eye marker protects groups of the given stone color.
    #[must_use]
    pub fn eye_matches(self, color: StoneColor) -> bool {
        matches!(
            (self, color),
            (Cell::EyeBlack, StoneColor::Black) | (Cell::EyeWhite, StoneColor::White)
        )
    }
}

/// The playing field: a ROWS×COLS cell matrix plus a parallel locked mask.
///
/// Locked cells belong to a placed eye-frame. They are immune to gravity and
/// to capture-driven removal; only an explicit frame collapse clears them.
/// Out-of-range access is a programmer error and panics via indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
    locked: [[bool; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[Cell::Empty; COLS]; ROWS],
            locked: [[false; COLS]; ROWS],
        }
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    #[must_use]
    pub fn is_locked(&self, row: usize, col: usize) -> bool {
        self.locked[row][col]
    }

    pub fn set_locked(&mut self, row: usize, col: usize, locked: bool) {
        self.locked[row][col] = locked;
    }

    /// Returns an iterator over the board rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; COLS]> {
        self.cells.iter()
    }

    /// Checks whether the piece, translated by the given deltas, fits.
    ///
    /// Every translated cell must stay inside the column range and above the
    /// bottom edge, and must land on an empty cell once it is on the visible
    /// board. Rows above the board (row < 0) are unconditionally valid so a
    /// freshly spawned piece may overlap the spawn buffer.
    #[must_use]
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn is_valid_position(&self, piece: &Piece, d_row: isize, d_col: isize) -> bool {
        piece.cell_positions().all(|(row, col, _)| {
            let row = row + d_row;
            let col = col + d_col;
            if col < 0 || col >= COLS as isize {
                return false;
            }
            if row >= ROWS as isize {
                return false;
            }
            if row < 0 {
                return true;
            }
            self.cells[row as usize][col as usize].is_empty()
        })
    }

    /// Settles every column independently.
    ///
    /// Locked cells keep their row. Non-locked occupied cells are rewritten
    /// bottom-up into the lowest non-locked slots, preserving their relative
    /// vertical order; a locked row only blocks its own slot, stones above
    /// it may settle beneath it.
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn apply_gravity(&mut self) {
        for col in 0..COLS {
            let mut new_column = [Cell::Empty; ROWS];
            let mut new_locked = [false; ROWS];
            for row in 0..ROWS {
                if self.locked[row][col] {
                    new_column[row] = self.cells[row][col];
                    new_locked[row] = true;
                }
            }

            let mut write_row = ROWS as isize - 1;
            for row in (0..ROWS).rev() {
                if self.locked[row][col] || self.cells[row][col].is_empty() {
                    continue;
                }
                while write_row >= 0 && new_locked[write_row as usize] {
                    write_row -= 1;
                }
                if write_row < 0 {
                    break;
                }
                new_column[write_row as usize] = self.cells[row][col];
                write_row -= 1;
            }

            for row in 0..ROWS {
                self.cells[row][col] = new_column[row];
                self.locked[row][col] = new_locked[row];
            }
        }
    }

    /// Counts occupied board cells, plus the in-flight piece's cells that
    /// would land on currently-empty board cells.
    #[must_use]
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn occupied_cells(&self, falling_piece: Option<&Piece>) -> usize {
        let mut occupied = self
            .cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count();
        if let Some(piece) = falling_piece {
            for (row, col, _) in piece.cell_positions() {
                if (0..ROWS as isize).contains(&row)
                    && (0..COLS as isize).contains(&col)
                    && self.cells[row as usize][col as usize].is_empty()
                {
                    occupied += 1;
                }
            }
        }
        occupied
    }

    /// The danger predicate: board fill (counting the in-flight piece) at or
    /// above the threshold, or any stone in the high rows. Presentation-only;
    /// has no effect on game rules.
    #[must_use]
    pub fn is_danger_zone(&self, falling_piece: Option<&Piece>) -> bool {
        if self.occupied_cells(falling_piece) >= DANGER_FILL_THRESHOLD {
            return true;
        }
        self.cells[..DANGER_HIGH_ROW_CUTOFF]
            .iter()
            .flatten()
            .any(|cell| !cell.is_empty())
    }
}
