use std::{path::PathBuf, time::Instant};

use chrono::Utc;
use crossterm::event::Event;
use rand::Rng as _;
use ratatui::Frame;
use sweet_galaxy_engine::{BoardSeed, MAX_LEVEL, ScoringRules};

use crate::{
    command::play::screen::{LevelRequest, LevelScreen},
    storage::{Progress, ProgressStore},
    tui::{App, Tui},
};

/// Ticks per second; bounds how late a cascade timer can fire.
const TICK_RATE: f64 = 50.0;

#[derive(Debug)]
pub struct PlayApp {
    screen: Option<LevelScreen>,
    rules: ScoringRules,
    store: ProgressStore,
    progress: Progress,
    record_dir: Option<PathBuf>,
    result_saved: bool,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(
        rules: ScoringRules,
        store: ProgressStore,
        progress: Progress,
        record_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            screen: None,
            rules,
            store,
            progress,
            record_dir,
            result_saved: false,
            is_exiting: false,
        }
    }

    pub fn start(&mut self, level: u32, seed: BoardSeed) {
        let best_score = self.progress.best(level).map(|entry| entry.score);
        self.screen = Some(LevelScreen::new(
            level,
            seed,
            self.rules,
            best_score,
            Instant::now(),
        ));
        self.result_saved = false;
    }

    /// Stores the result of a finished level, once.
    fn save_result(&mut self) {
        let Some(screen) = &mut self.screen else {
            return;
        };
        if self.result_saved || !screen.is_finished() {
            return;
        }
        self.result_saved = true;

        let session = screen.session();
        if let Some(stars) = session.stars() {
            let score = session.score();
            if self
                .progress
                .record_completion(session.level(), score, stars, Utc::now())
            {
                screen.set_best_score(score);
            }
            self.store.save(&self.progress);
        }

        if let Some(record_dir) = &self.record_dir {
            match screen.session().recording().save(record_dir) {
                Ok(path) => log::info!("recording saved to {}", path.display()),
                Err(err) => log::warn!("{err:#}; recording not saved"),
            }
        }
    }

    fn apply_request(&mut self) {
        let Some(screen) = &mut self.screen else {
            return;
        };
        let level = screen.session().level();
        match screen.take_request() {
            None => {}
            Some(LevelRequest::Quit) => self.is_exiting = true,
            Some(LevelRequest::Restart) => self.start(level, rand::rng().random()),
            Some(LevelRequest::NextLevel) => {
                let next = level + 1;
                if next <= MAX_LEVEL && self.progress.is_unlocked(next) {
                    self.start(next, rand::rng().random());
                }
            }
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(TICK_RATE);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting || self.screen.is_none()
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        if let Some(screen) = &mut self.screen {
            screen.handle_event(&event, Instant::now());
        }
        self.apply_request();
    }

    fn draw(&self, frame: &mut Frame) {
        if let Some(screen) = &self.screen {
            screen.draw(frame);
        }
    }

    fn update(&mut self, _tui: &mut Tui) {
        if let Some(screen) = &mut self.screen {
            screen.update(Instant::now());
        }
        self.save_result();
    }
}
