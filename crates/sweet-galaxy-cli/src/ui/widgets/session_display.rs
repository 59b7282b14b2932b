use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use sweet_galaxy_engine::{GameSession, GoalProgress, Position, SessionStatus, SwapMove};

use crate::ui::widgets::{BoardDisplay, GoalsDisplay, SessionStatsDisplay, color, style};

/// Board with the score panel and goals beside it.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    goals: Vec<GoalProgress>,
    cursor: Position,
    selected: Option<Position>,
    hint: Option<SwapMove>,
    best_score: Option<u32>,
    deadlocked: bool,
    message: Option<&'a str>,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession, cursor: Position) -> Self {
        Self {
            session,
            goals: session.goal_progress(),
            cursor,
            selected: None,
            hint: None,
            best_score: None,
            deadlocked: false,
            message: None,
        }
    }

    pub fn selected(self, selected: Option<Position>) -> Self {
        Self { selected, ..self }
    }

    pub fn hint(self, hint: Option<SwapMove>) -> Self {
        Self { hint, ..self }
    }

    pub fn best_score(self, best_score: Option<u32>) -> Self {
        Self { best_score, ..self }
    }

    /// Shows the "no valid swap" notice over the board.
    pub fn deadlocked(self, deadlocked: bool) -> Self {
        Self { deadlocked, ..self }
    }

    /// One-line message under the board.
    pub fn message(self, message: Option<&'a str>) -> Self {
        Self { message, ..self }
    }

    fn popup(&self) -> Option<(String, Style)> {
        match self.session.status() {
            SessionStatus::Completed => {
                let stars = "*".repeat(usize::from(self.session.stars().unwrap_or(0)));
                Some((
                    format!("LEVEL COMPLETE  {stars}\nbonus +{}", self.session.bonus()),
                    style::COMPLETED,
                ))
            }
            SessionStatus::Failed => Some(("OUT OF MOVES".to_owned(), style::FAILED)),
            SessionStatus::Playing if self.deadlocked => Some((
                "No valid swap left.\nShuffle the board to continue.".to_owned(),
                style::NOTICE,
            )),
            SessionStatus::Playing => None,
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block_padding = Padding::horizontal(1);
        let border_style = match self.session.status() {
            SessionStatus::Playing if self.session.is_processing() => color::YELLOW,
            SessionStatus::Playing => color::WHITE,
            SessionStatus::Completed => color::GREEN,
            SessionStatus::Failed => color::RED,
        };

        let board = BoardDisplay::new(self.session.board(), self.session.topology())
            .cursor(self.cursor)
            .selected(self.selected)
            .hint(self.hint)
            .block(
                Block::bordered()
                    .title(Line::from(format!("LEVEL {}", self.session.level())).centered())
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let stats = SessionStatsDisplay::new(self.session)
            .best_score(self.best_score)
            .block(
                Block::bordered()
                    .title(Line::from("STATS").centered())
                    .padding(block_padding)
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let goals = GoalsDisplay::new(&self.goals).block(
            Block::bordered()
                .title(Line::from("GOALS").centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT),
        );

        let [left_column, center_column] = Layout::horizontal([
            Constraint::Length(u16::max(stats.width(), goals.width())),
            Constraint::Length(board.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area, goals_area] = Layout::vertical([
            Constraint::Length(stats.height()),
            Constraint::Length(goals.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let [board_area, message_area] =
            Layout::vertical([Constraint::Length(board.height()), Constraint::Length(1)])
                .areas(center_column);

        let board_width = board.width();
        stats.render(stats_area, buf);
        goals.render(goals_area, buf);
        board.render(board_area, buf);
        if let Some(message) = self.message {
            Line::styled(message, style::DIM)
                .centered()
                .render(message_area, buf);
        }

        if let Some((text, style)) = self.popup() {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let height = u16::try_from(text.height()).unwrap_or(1);
            let area = board_area.centered(
                Constraint::Length(board_width),
                Constraint::Length(height + 2),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(height)), buf);
        }
    }
}
