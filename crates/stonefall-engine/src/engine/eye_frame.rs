use serde::Serialize;

use crate::core::{Board, COLS, Cell, EYE_FRAME_RING_OFFSETS, ROWS};

/// Captures required to collapse a frame placed at the given score.
#[must_use]
pub fn clear_threshold(score: u64) -> i64 {
    if score >= 100_000 {
        40
    } else if score >= 50_000 {
        30
    } else {
        20
    }
}

/// A placed eye-frame obstacle awaiting collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EyeFrame {
    pub center_row: usize,
    pub center_col: usize,
    pub captures_left: i64,
}

/// Tracks every placed eye-frame and its remaining capture budget.
#[derive(Debug, Clone, Default)]
pub struct EyeFrameTracker {
    frames: Vec<EyeFrame>,
}

impl EyeFrameTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly locked frame. The budget is fixed from the score
    /// at placement time and unaffected by later score growth.
    pub fn place(&mut self, center_row: usize, center_col: usize, score: u64) {
        self.frames.push(EyeFrame {
            center_row,
            center_col,
            captures_left: clear_threshold(score),
        });
    }

    /// Subtracts a completed cascade's total from every active frame and
    /// returns the frames whose budget ran out. Collapsed frames leave the
    /// tracker; clearing their cells is the caller's job.
    pub fn absorb_captures(&mut self, removed: u32) -> Vec<EyeFrame> {
        if removed == 0 {
            return Vec::new();
        }
        for frame in &mut self.frames {
            frame.captures_left -= i64::from(removed);
        }
        let collapsed = self
            .frames
            .iter()
            .copied()
            .filter(|frame| frame.captures_left <= 0)
            .collect();
        self.frames.retain(|frame| frame.captures_left > 0);
        collapsed
    }

    #[must_use]
    pub fn frames(&self) -> &[EyeFrame] {
        &self.frames
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Empties and unlocks all nine cells of a collapsed frame. Cells the frame
/// would have outside the board are skipped.
pub fn clear_frame_cells(board: &mut Board, center_row: usize, center_col: usize) {
    let offsets = EYE_FRAME_RING_OFFSETS.iter().chain(&[(0, 0)]);
    for &(d_row, d_col) in offsets {
        let row = center_row.wrapping_add_signed(d_row);
        let col = center_col.wrapping_add_signed(d_col);
        if row >= ROWS || col >= COLS {
            continue;
        }
        board.set_cell(row, col, Cell::Empty);
        board.set_locked(row, col, false);
    }
}
