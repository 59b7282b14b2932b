//! Game rules and session management.
//!
//! The rules are a pipeline of pure stages, each taking a [`Board`] and
//! returning a new one:
//!
//! - [`match_detector`] marks runs of three or more
//! - [`special_synthesizer`] turns long and crossing runs into specials
//! - [`explosion`] widens the removal set with the blasts of marked specials
//! - [`gravity`] removes marked pieces, drops survivors and refills
//!
//! [`Cascade`] drives these stages as a step-wise state machine, and
//! [`GameSession`] wraps it with the move budget, score, goals and swap
//! validation. [`find_hint`] and [`is_deadlocked`] are read-only queries on
//! a settled board.
//!
//! # Example
//!
//! ```
//! use sweet_galaxy_engine::{BoardSeed, GameSession, Goal};
//!
//! let session = GameSession::start_level(2, BoardSeed::from_u128(7));
//! assert!(
//!     session
//!         .spec()
//!         .goals()
//!         .iter()
//!         .any(|goal| matches!(goal, Goal::Collect { .. }))
//! );
//! ```
//!
//! [`Board`]: crate::core::Board

pub use self::{
    board_generator::*, cascade::*, game_session::*, goals::*, hint::*, level::*, scoring::*,
};

mod board_generator;
mod cascade;
pub mod explosion;
mod game_session;
mod goals;
pub mod gravity;
mod hint;
mod level;
pub mod match_detector;
mod scoring;
pub mod special_synthesizer;
