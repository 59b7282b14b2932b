pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a swap request was rejected.
///
/// A rejected swap leaves the session as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SwapError {
    #[display("a cascade is still resolving")]
    Processing,
    #[display("the session is over")]
    Terminal,
    #[display("no moves left")]
    OutOfMoves,
    #[display("cells {from} and {to} are not adjacent")]
    NotAdjacent { from: Position, to: Position },
    #[display("cell {pos} is locked")]
    Locked { pos: Position },
    #[display("cell {pos} has no piece")]
    EmptyCell { pos: Position },
}

/// Reason a shuffle request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShuffleError {
    #[display("a cascade is still resolving")]
    Processing,
    #[display("the session is over")]
    Terminal,
    #[display("a legal swap is still available")]
    NotDeadlocked,
}
