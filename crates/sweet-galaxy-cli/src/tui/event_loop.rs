use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::TuiEvent;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Produces ticks at a fixed interval and a render whenever something
/// happened since the last one.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Duration,
    next_tick: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            next_tick: Instant::now(),
            // the first frame is drawn before any event arrives
            dirty: true,
        }
    }
}

impl EventLoop {
    pub(super) fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
        self.next_tick = Instant::now() + interval;
    }

    /// Blocks until the next tick is due, a render is needed or a terminal
    /// event arrives.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if now >= self.next_tick {
                self.next_tick = now + self.tick_interval;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }
            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }
            if event::poll(self.next_tick.saturating_duration_since(now))? {
                self.dirty = true;
                return Ok(event::read()?.into());
            }
        }
    }
}
