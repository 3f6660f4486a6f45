use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};

use super::board::{COLS, Cell};

/// Row the anchor of a freshly spawned piece sits at, above the visible board.
pub const SPAWN_ROW: isize = -2;

/// Offsets of the eight ring cells around an eye-frame center.
pub const EYE_FRAME_RING_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Color of a Go stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StoneColor {
    Black,
    White,
}

impl StoneColor {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            StoneColor::Black => StoneColor::White,
            StoneColor::White => StoneColor::Black,
        }
    }

    #[must_use]
    pub fn cell(self) -> Cell {
        match self {
            StoneColor::Black => Cell::Black,
            StoneColor::White => Cell::White,
        }
    }

    /// The eye marker protecting groups of this color.
    #[must_use]
    pub fn eye_cell(self) -> Cell {
        match self {
            StoneColor::Black => Cell::EyeBlack,
            StoneColor::White => Cell::EyeWhite,
        }
    }
}

impl Distribution<StoneColor> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> StoneColor {
        if rng.random_bool(0.5) {
            StoneColor::Black
        } else {
            StoneColor::White
        }
    }
}

/// One cell of a piece, positioned relative to the piece anchor.
///
/// `board_value` overrides the stone color when the cell is written to the
/// board on lock; the eye-frame center uses it to leave the board cell empty
/// while still drawing an eye marker in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceCell {
    pub row: u8,
    pub col: u8,
    pub color: StoneColor,
    pub board_value: Option<Cell>,
    pub lock_on_place: bool,
    pub is_eye_center: bool,
}

impl PieceCell {
    const fn stone(row: u8, col: u8, color: StoneColor) -> Self {
        Self {
            row,
            col,
            color,
            board_value: None,
            lock_on_place: false,
            is_eye_center: false,
        }
    }

    /// The value written to the board when the piece locks.
    #[must_use]
    pub fn lock_value(&self) -> Cell {
        self.board_value.unwrap_or_else(|| self.color.cell())
    }

    /// The value shown while the piece is in flight.
    #[must_use]
    pub fn draw_value(&self) -> Cell {
        if self.is_eye_center {
            self.color.eye_cell()
        } else {
            self.color.cell()
        }
    }
}

/// A fixed piece shape from the template pool.
#[derive(Debug, Clone, Copy)]
pub struct PieceTemplate {
    pub name: &'static str,
    pub cells: &'static [PieceCell],
}

/// The ten spawnable stone formations, named after the Go shapes they form.
pub const PIECE_TEMPLATES: [PieceTemplate; 10] = {
    use StoneColor::{Black as B, White as W};
    const fn c(row: u8, col: u8, color: StoneColor) -> PieceCell {
        PieceCell::stone(row, col, color)
    }
    [
        PieceTemplate {
            name: "TigerMouth",
            cells: &[c(0, 1, B), c(1, 0, B), c(1, 1, W), c(1, 2, B)],
        },
        PieceTemplate {
            name: "TigerMouthWhite",
            cells: &[c(0, 1, W), c(1, 0, W), c(1, 1, B), c(1, 2, W)],
        },
        PieceTemplate {
            name: "BambooJoint",
            cells: &[c(0, 0, B), c(1, 0, W), c(2, 0, B), c(3, 0, W)],
        },
        PieceTemplate {
            name: "BambooJointWhite",
            cells: &[c(0, 0, W), c(1, 0, B), c(2, 0, W), c(3, 0, B)],
        },
        PieceTemplate {
            name: "Hane",
            cells: &[c(0, 0, W), c(0, 1, B), c(1, 1, B), c(1, 2, W)],
        },
        PieceTemplate {
            name: "HaneWhite",
            cells: &[c(0, 0, B), c(0, 1, W), c(1, 1, W), c(1, 2, B)],
        },
        PieceTemplate {
            name: "Clamp",
            cells: &[c(0, 0, W), c(1, 0, W), c(1, 1, B), c(1, 2, B)],
        },
        PieceTemplate {
            name: "ClampBlack",
            cells: &[c(0, 0, B), c(1, 0, B), c(1, 1, W), c(1, 2, W)],
        },
        PieceTemplate {
            name: "Seki",
            cells: &[c(0, 0, B), c(0, 1, W), c(1, 0, W), c(1, 1, B)],
        },
        PieceTemplate {
            name: "SekiAlt",
            cells: &[c(0, 0, W), c(0, 1, B), c(1, 0, B), c(1, 1, W)],
        },
    ]
};

/// Anchor position of a piece. Rows above the board are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    pub row: isize,
    pub col: isize,
}

/// Direction of a rotation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// A falling formation at a specific location and orientation.
///
/// Pieces are immutable. Movement and rotation operations return new `Piece`
/// instances; the session validates them against the board before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    name: &'static str,
    cells: ArrayVec<PieceCell, 9>,
    width: u8,
    height: u8,
    rotation: u8,
    position: PiecePosition,
    eye_frame_color: Option<StoneColor>,
}

impl Piece {
    /// Instantiates a template at the spawn position, centered horizontally.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn from_template(template: &PieceTemplate) -> Self {
        let width = template.cells.iter().map(|cell| cell.col).max().unwrap_or(0) + 1;
        let height = template.cells.iter().map(|cell| cell.row).max().unwrap_or(0) + 1;
        Self {
            name: template.name,
            cells: template.cells.iter().copied().collect(),
            width,
            height,
            rotation: 0,
            position: PiecePosition {
                row: SPAWN_ROW,
                col: ((COLS - width as usize) / 2) as isize,
            },
            eye_frame_color: None,
        }
    }

    /// Builds the 3×3 eye-frame obstacle for the given color.
    ///
    /// The center cell draws as an eye marker but writes `Empty` to the board
    /// on lock; the eight ring cells are stones. All nine cells lock in place.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    pub fn eye_frame(color: StoneColor) -> Self {
        let mut cells = ArrayVec::new();
        cells.push(PieceCell {
            row: 1,
            col: 1,
            color,
            board_value: Some(Cell::Empty),
            lock_on_place: true,
            is_eye_center: true,
        });
        for (d_row, d_col) in EYE_FRAME_RING_OFFSETS {
            cells.push(PieceCell {
                row: (1 + d_row) as u8,
                col: (1 + d_col) as u8,
                color,
                board_value: Some(color.cell()),
                lock_on_place: true,
                is_eye_center: false,
            });
        }
        Self {
            name: "EyeFrame",
            cells,
            width: 3,
            height: 3,
            rotation: 0,
            position: PiecePosition {
                row: SPAWN_ROW,
                col: ((COLS - 3) / 2) as isize,
            },
            eye_frame_color: Some(color),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn width(&self) -> u8 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u8 {
        self.height
    }

    #[must_use]
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    #[must_use]
    pub fn is_eye_frame(&self) -> bool {
        self.eye_frame_color.is_some()
    }

    #[must_use]
    pub fn eye_frame_color(&self) -> Option<StoneColor> {
        self.eye_frame_color
    }

    #[must_use]
    pub fn cells(&self) -> &[PieceCell] {
        &self.cells
    }

    /// Iterates over board coordinates of each cell at the current position.
    pub fn cell_positions(&self) -> impl Iterator<Item = (isize, isize, PieceCell)> + '_ {
        self.cells.iter().map(move |cell| {
            (
                self.position.row + isize::from(cell.row),
                self.position.col + isize::from(cell.col),
                *cell,
            )
        })
    }

    #[must_use]
    pub fn with_position(&self, row: isize, col: isize) -> Self {
        let mut piece = self.clone();
        piece.position = PiecePosition { row, col };
        piece
    }

    #[must_use]
    pub fn translated(&self, d_row: isize, d_col: isize) -> Self {
        self.with_position(self.position.row + d_row, self.position.col + d_col)
    }

    /// Returns the piece rotated a quarter turn, bounding box swapped.
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let mut piece = self.clone();
        for cell in &mut piece.cells {
            let (row, col) = match direction {
                RotationDirection::Clockwise => (cell.col, self.height - 1 - cell.row),
                RotationDirection::CounterClockwise => (self.width - 1 - cell.col, cell.row),
            };
            cell.row = row;
            cell.col = col;
        }
        piece.width = self.height;
        piece.height = self.width;
        piece.rotation = match direction {
            RotationDirection::Clockwise => (self.rotation + 1) % 4,
            RotationDirection::CounterClockwise => (self.rotation + 3) % 4,
        };
        piece
    }

    /// Resets position and orientation to the spawn state, keeping the cell
    /// layout of rotation 0 intact.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn at_spawn(&self) -> Self {
        let mut piece = self.clone();
        while piece.rotation != 0 {
            piece = piece.rotated(RotationDirection::CounterClockwise);
        }
        piece.position = PiecePosition {
            row: SPAWN_ROW,
            col: ((COLS - piece.width as usize) / 2) as isize,
        };
        piece
    }
}
