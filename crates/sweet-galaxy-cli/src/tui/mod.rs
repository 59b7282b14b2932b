//! Minimal terminal application runtime on top of ratatui.

use crossterm::event::Event;
use ratatui::Frame;

pub use self::runner::Tui;

mod event_loop;
mod runner;

/// A terminal application driven by [`Tui::run`].
pub trait App {
    /// Called once before the first event. Configure the tick rate here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    /// Handles key presses, resizes and other terminal events.
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances timers and game state, once per tick.
    fn update(&mut self, tui: &mut Tui);
}

/// What woke the event loop.
#[derive(Debug, Clone, derive_more::From)]
pub(crate) enum TuiEvent {
    Tick,
    Render,
    #[from]
    Crossterm(Event),
}
