use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use sweet_galaxy_engine::{
    BoardSeed, CascadeStep, GRID_SIZE, Position, ScoringRules, SwapMove, SwapOutcome,
};

use crate::{
    record::RecordingSession,
    ui::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay},
};

/// Pause after a swap before matches are resolved.
const MATCH_DELAY: Duration = Duration::from_millis(50);
/// How long removed pieces stay on screen before gravity.
const REMOVAL_DELAY: Duration = Duration::from_millis(400);
/// How long the refilled board is shown before the next match check.
const REFILL_DELAY: Duration = Duration::from_millis(500);
/// How long an unmatched swap is shown before it is undone.
const REVERT_DELAY: Duration = Duration::from_millis(420);
/// Idle time after which a hint is shown.
const HINT_DELAY: Duration = Duration::from_secs(15);

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←↑↓→"], "Move/Swap"),
    (&["Space"], "Select"),
    (&["H"], "Hint"),
    (&["R"], "Restart"),
    (&["Q"], "Quit"),
];
const DEADLOCKED_KEYS: &[KeyBinding] = &[
    (&["S"], "Shuffle"),
    (&["R"], "Restart"),
    (&["Q"], "Quit"),
];
const COMPLETED_KEYS: &[KeyBinding] = &[
    (&["N"], "Next Level"),
    (&["R"], "Retry"),
    (&["Q"], "Quit"),
];
const FAILED_KEYS: &[KeyBinding] = &[(&["R"], "Retry"), (&["Q"], "Quit")];

/// What the screen asks the app to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRequest {
    Restart,
    NextLevel,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            _ => None,
        }
    }

    fn step(self, pos: Position) -> Option<Position> {
        match self {
            Self::Up => pos.up(),
            Self::Down => pos.down(),
            Self::Left => pos.left(),
            Self::Right => pos.right(),
        }
    }
}

/// A level being played in the terminal.
///
/// Cascades are stepped on timers so each stage stays visible for a moment.
/// All timing goes through the `now` arguments.
#[derive(Debug)]
pub struct LevelScreen {
    session: RecordingSession,
    best_score: Option<u32>,
    cursor: Position,
    selected: Option<Position>,
    hint: Option<SwapMove>,
    message: Option<String>,
    next_step_at: Option<Instant>,
    revert_at: Option<Instant>,
    idle_since: Instant,
    request: Option<LevelRequest>,
}

impl LevelScreen {
    pub fn new(
        level: u32,
        seed: BoardSeed,
        rules: ScoringRules,
        best_score: Option<u32>,
        now: Instant,
    ) -> Self {
        let center = GRID_SIZE / 2;
        Self {
            session: RecordingSession::new(level, seed, rules),
            best_score,
            cursor: Position::new(center, center).expect("center is on the grid"),
            selected: None,
            hint: None,
            message: None,
            next_step_at: None,
            revert_at: None,
            idle_since: now,
            request: None,
        }
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn set_best_score(&mut self, score: u32) {
        self.best_score = Some(score);
    }

    /// Returns `true` once the level is won or lost.
    pub fn is_finished(&self) -> bool {
        self.session.status().is_terminal()
    }

    pub fn take_request(&mut self) -> Option<LevelRequest> {
        self.request.take()
    }

    fn can_act(&self) -> bool {
        self.session.status().is_playing() && !self.session.is_processing()
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let deadlocked = self.can_act() && self.session.is_deadlocked();
        let session_display = SessionDisplay::new(&self.session, self.cursor)
            .selected(self.selected)
            .hint(self.hint)
            .best_score(self.best_score)
            .deadlocked(deadlocked)
            .message(self.message.as_deref());

        let keys = if self.session.status().is_completed() {
            COMPLETED_KEYS
        } else if self.session.status().is_failed() {
            FAILED_KEYS
        } else if deadlocked {
            DEADLOCKED_KEYS
        } else {
            PLAYING_KEYS
        };

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(20), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(KeyBindingDisplay::new(keys), help_area);
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        let Some(event) = event.as_key_press_event() else {
            return;
        };
        self.idle_since = now;

        if let Some(direction) = Direction::from_key(event.code) {
            self.move_or_swap(direction, now);
            return;
        }

        let can_act = self.can_act();
        let is_completed = self.session.status().is_completed();
        match event.code {
            KeyCode::Char(' ') | KeyCode::Enter if can_act => self.select(now),
            KeyCode::Esc => self.selected = None,
            KeyCode::Char('h') if can_act => {
                self.hint = self.session.find_hint();
                if self.hint.is_none() {
                    self.message = Some("no valid swap".to_owned());
                }
            }
            KeyCode::Char('s') if can_act && self.session.is_deadlocked() => self.shuffle(),
            KeyCode::Char('n') if is_completed => self.request = Some(LevelRequest::NextLevel),
            KeyCode::Char('r') => self.request = Some(LevelRequest::Restart),
            KeyCode::Char('q') => self.request = Some(LevelRequest::Quit),
            _ => {}
        }
    }

    /// Runs the cascade and revert timers that are due.
    pub fn update(&mut self, now: Instant) {
        if self.revert_at.is_some_and(|at| now >= at) {
            self.revert_at = None;
            if let Some(mv) = self.session.revert_swap() {
                log::trace!("reverted unmatched swap {mv}");
            }
        }

        if self.next_step_at.is_some_and(|at| now >= at) {
            self.hint = None;
            self.next_step_at = match self.session.step() {
                CascadeStep::Resolved(report) => {
                    self.message = Some(if report.combo > 0 {
                        format!("combo x{}  +{}", report.combo + 1, report.score_delta)
                    } else {
                        format!("+{}", report.score_delta)
                    });
                    Some(now + REMOVAL_DELAY)
                }
                CascadeStep::Dropped => Some(now + REFILL_DELAY + MATCH_DELAY),
                CascadeStep::Settled => {
                    self.idle_since = now;
                    None
                }
            };
        }

        if self.hint.is_none()
            && self.session.pending_revert().is_none()
            && self.can_act()
            && now.duration_since(self.idle_since) >= HINT_DELAY
        {
            self.hint = self.session.find_hint();
        }
    }

    fn move_or_swap(&mut self, direction: Direction, now: Instant) {
        match self.selected {
            Some(from) if self.can_act() => {
                if let Some(to) = direction.step(from) {
                    self.cursor = to;
                    self.swap(from, to, now);
                }
            }
            _ => {
                if let Some(next) = direction.step(self.cursor) {
                    self.cursor = next;
                }
            }
        }
    }

    fn select(&mut self, now: Instant) {
        match self.selected {
            Some(selected) if selected == self.cursor => self.selected = None,
            Some(selected) if selected.is_adjacent(self.cursor) => {
                self.swap(selected, self.cursor, now);
            }
            _ => self.selected = Some(self.cursor),
        }
    }

    fn swap(&mut self, from: Position, to: Position, now: Instant) {
        self.selected = None;
        self.hint = None;
        self.revert_at = None;
        match self.session.try_swap(from, to) {
            Ok(SwapOutcome::NoMatch) => {
                self.revert_at = Some(now + REVERT_DELAY);
                self.message = Some("no match".to_owned());
            }
            Ok(outcome) => {
                log::debug!("swap {from} <-> {to}: {outcome:?}");
                self.next_step_at = Some(now + MATCH_DELAY);
                self.message = None;
            }
            Err(err) => {
                log::trace!("swap {from} <-> {to} rejected: {err}");
                self.message = Some(err.to_string());
            }
        }
    }

    fn shuffle(&mut self) {
        match self.session.try_shuffle() {
            Ok(()) => self.message = Some("board shuffled".to_owned()),
            Err(err) => log::warn!("shuffle rejected: {err}"),
        }
    }
}
