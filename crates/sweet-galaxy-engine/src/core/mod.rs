pub use self::{board::*, piece::*, position::*, topology::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod position;
pub(crate) mod topology;
