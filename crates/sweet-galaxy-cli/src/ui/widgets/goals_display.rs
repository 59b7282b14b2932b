use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use sweet_galaxy_engine::{Goal, GoalProgress};

use crate::ui::widgets::style;

/// One line per goal, checked off once satisfied.
pub struct GoalsDisplay<'a> {
    goals: &'a [GoalProgress],
    block: Option<BlockWidget<'a>>,
}

impl<'a> GoalsDisplay<'a> {
    pub fn new(goals: &'a [GoalProgress]) -> Self {
        Self { goals, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.goals.len()).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

fn goal_line(progress: &GoalProgress) -> Line<'static> {
    let (text, target) = match progress.goal {
        Goal::Score { target } => ("SCORE".to_owned(), target),
        Goal::Collect { color, target } => (color.to_string().to_uppercase(), target),
        Goal::Moves { limit } => ("MOVES".to_owned(), limit),
    };
    let (mark, style) = if progress.satisfied {
        ("+", style::DONE)
    } else if progress.goal.is_move_budget() {
        (" ", style::DIM)
    } else {
        ("-", style::DEFAULT)
    };
    let current = progress.current.min(target);
    Line::styled(format!("{mark} {text:<7}{current:>5}/{target}"), style)
}

impl Widget for GoalsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let rows = Layout::vertical(self.goals.iter().map(|_| Constraint::Length(1))).split(area);
        for (progress, row) in self.goals.iter().zip(rows.iter()) {
            goal_line(progress).render(*row, buf);
        }
    }
}
