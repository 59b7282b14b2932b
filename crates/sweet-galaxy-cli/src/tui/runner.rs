use std::time::Duration;

use super::{App, TuiEvent, event_loop::EventLoop};

/// Owns the event loop and runs an [`App`] until it asks to exit.
#[derive(Default, Debug)]
pub struct Tui {
    events: EventLoop,
}

impl Tui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick rate in ticks per second.
    pub fn set_tick_rate(&mut self, rate: f64) {
        self.events
            .set_tick_interval(Duration::from_secs_f64(1.0 / rate));
    }

    /// Runs `app` on the alternate screen and restores the terminal on
    /// return.
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => _ = terminal.draw(|frame| app.draw(frame))?,
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }
}
