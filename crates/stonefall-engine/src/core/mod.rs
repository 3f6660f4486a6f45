pub use self::{board::*, capture::*, piece::*};

pub(crate) mod board;
pub(crate) mod capture;
pub(crate) mod piece;
