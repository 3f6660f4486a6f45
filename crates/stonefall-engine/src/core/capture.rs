use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{
    board::{Board, COLS, Cell, NEIGHBOR_OFFSETS, ROWS},
    piece::StoneColor,
};

/// A stone removed (or about to be removed) from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovedStone {
    pub row: usize,
    pub col: usize,
    pub color: StoneColor,
}

/// One captured group plus the opposing stones that surround it.
///
/// `capturing` lists the unique opposite-color neighbors of the group, in
/// scan order; consumers use it to stage highlight animations. Group ids are
/// sequential within a cascade and carry no rule meaning.
#[derive(Debug, Clone)]
pub struct CaptureGroup {
    pub group_id: usize,
    pub captured: Vec<RemovedStone>,
    pub capturing: Vec<RemovedStone>,
    pub capturing_color: StoneColor,
}

/// Stones captured per capturing color.
///
/// `black` counts stones black has captured (removed white stones), and
/// vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTally {
    pub black: u32,
    pub white: u32,
}

impl CaptureTally {
    pub fn credit(&mut self, capturing_color: StoneColor, stones: u32) {
        match capturing_color {
            StoneColor::Black => self.black += stones,
            StoneColor::White => self.white += stones,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.black + self.white
    }
}

/// Aggregate result of one or more capture passes.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutcome {
    pub total_removed: u32,
    pub capture_totals: CaptureTally,
    pub removed_stones: Vec<RemovedStone>,
    pub groups: Vec<CaptureGroup>,
}

impl CaptureOutcome {
    /// Folds a later pass into this aggregate, renumbering its group ids to
    /// continue the sequence.
    pub fn absorb(&mut self, mut pass: CaptureOutcome) {
        let offset = self.groups.len();
        for group in &mut pass.groups {
            group.group_id += offset;
        }
        self.total_removed += pass.total_removed;
        self.capture_totals.black += pass.capture_totals.black;
        self.capture_totals.white += pass.capture_totals.white;
        self.removed_stones.extend(pass.removed_stones);
        self.groups.extend(pass.groups);
    }
}

#[derive(Debug)]
struct GroupAnalysis {
    stones: Vec<(usize, usize)>,
    liberties: usize,
    has_eye_support: bool,
}

/// Flood-fills the same-color group containing (row, col), counting its
/// distinct empty neighbors and whether any neighbor is a matching eye cell.
#[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn evaluate_group(
    board: &Board,
    row: usize,
    col: usize,
    color: StoneColor,
    visited: &mut [[bool; COLS]; ROWS],
) -> GroupAnalysis {
    let mut queue = VecDeque::from([(row, col)]);
    let mut stones = Vec::new();
    let mut liberty = [[false; COLS]; ROWS];
    let mut liberties = 0;
    let mut has_eye_support = false;
    visited[row][col] = true;

    while let Some((current_row, current_col)) = queue.pop_front() {
        stones.push((current_row, current_col));
        for (d_row, d_col) in NEIGHBOR_OFFSETS {
            let next_row = current_row as isize + d_row;
            let next_col = current_col as isize + d_col;
            if !(0..ROWS as isize).contains(&next_row) || !(0..COLS as isize).contains(&next_col) {
                continue;
            }
            let (next_row, next_col) = (next_row as usize, next_col as usize);
            let space = board.cell(next_row, next_col);
            if space.is_empty() {
                if !liberty[next_row][next_col] {
                    liberty[next_row][next_col] = true;
                    liberties += 1;
                }
            } else if space.is_eye() {
                if space.eye_matches(color) {
                    has_eye_support = true;
                }
            } else if space == color.cell() && !visited[next_row][next_col] {
                visited[next_row][next_col] = true;
                queue.push_back((next_row, next_col));
            }
        }
    }

    GroupAnalysis {
        stones,
        liberties,
        has_eye_support,
    }
}

/// Collects the unique stones of the capturing color orthogonally adjacent
/// to the captured group, in group scan order.
#[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn collect_capturing_stones(
    board: &Board,
    captured: &[(usize, usize)],
    capturing_color: StoneColor,
) -> Vec<RemovedStone> {
    let mut seen = [[false; COLS]; ROWS];
    let mut result = Vec::new();
    for &(row, col) in captured {
        for (d_row, d_col) in NEIGHBOR_OFFSETS {
            let target_row = row as isize + d_row;
            let target_col = col as isize + d_col;
            if !(0..ROWS as isize).contains(&target_row)
                || !(0..COLS as isize).contains(&target_col)
            {
                continue;
            }
            let (target_row, target_col) = (target_row as usize, target_col as usize);
            if board.cell(target_row, target_col) != capturing_color.cell()
                || seen[target_row][target_col]
            {
                continue;
            }
            seen[target_row][target_col] = true;
            result.push(RemovedStone {
                row: target_row,
                col: target_col,
                color: capturing_color,
            });
        }
    }
    result
}

/// Runs one capture pass without mutating the board.
///
/// Scans row-major; every unvisited stone roots a group evaluation. A group
/// is captured iff it has zero liberties and no matching eye support. All
/// capturable groups found in the scan are reported together.
#[must_use]
pub fn resolve_captures(board: &Board) -> CaptureOutcome {
    let mut visited = [[false; COLS]; ROWS];
    let mut outcome = CaptureOutcome::default();

    for row in 0..ROWS {
        for col in 0..COLS {
            let Some(color) = board.cell(row, col).stone_color() else {
                continue;
            };
            if visited[row][col] {
                continue;
            }

            let analysis = evaluate_group(board, row, col, color, &mut visited);
            if analysis.liberties > 0 || analysis.has_eye_support {
                continue;
            }

            let capturing_color = color.opposite();
            let captured: Vec<_> = analysis
                .stones
                .iter()
                .map(|&(row, col)| RemovedStone { row, col, color })
                .collect();
            #[expect(clippy::cast_possible_truncation)]
            let count = captured.len() as u32;
            outcome.total_removed += count;
            outcome.capture_totals.credit(capturing_color, count);
            outcome.removed_stones.extend_from_slice(&captured);
            outcome.groups.push(CaptureGroup {
                group_id: outcome.groups.len() + 1,
                capturing: collect_capturing_stones(board, &analysis.stones, capturing_color),
                captured,
                capturing_color,
            });
        }
    }

    outcome
}

/// Resolves captures to a fixed point, interleaving gravity.
///
/// Each pass removes every capturable group (locked cells stay on the
/// board), settles the columns, and rescans, since settling can strip the
/// liberties of groups that were safe before. Stops once a pass captures
/// nothing, or once a pass clears no cells (a captured group made entirely
/// of locked stones would otherwise rescan forever).
pub fn run_capture_cascade(board: &mut Board) -> CaptureOutcome {
    let mut outcome = CaptureOutcome::default();
    loop {
        let pass = resolve_captures(board);
        if pass.groups.is_empty() {
            break;
        }

        let mut cleared = 0;
        for stone in &pass.removed_stones {
            if !board.is_locked(stone.row, stone.col) {
                board.set_cell(stone.row, stone.col, Cell::Empty);
                cleared += 1;
            }
        }
        outcome.absorb(pass);
        board.apply_gravity();

        if cleared == 0 {
            break;
        }
    }
    outcome
}
