use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use sweet_galaxy_engine::GameSession;

use crate::ui::widgets::style;

pub struct SessionStatsDisplay<'a> {
    session: &'a GameSession,
    best_score: Option<u32>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> SessionStatsDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            best_score: None,
            block: None,
        }
    }

    pub fn best_score(self, best_score: Option<u32>) -> Self {
        Self { best_score, ..self }
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
        u16::try_from(ROWS.len()).unwrap() + super::block_vertical_margin(self.block.as_ref())
    }
}

type Value = &'static dyn Fn(&SessionStatsDisplay<'_>) -> String;

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(Value),
    LabelValue(&'static str, Value),
}

const ROWS: &[Row] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(&|this| this.session.score().to_string()),
    Row::LabelValue("TARGET:", &|this| {
        this.session.spec().score_target().to_string()
    }),
    Row::LabelValue("BEST:", &|this| {
        this.best_score
            .map_or_else(|| "-".to_owned(), |score| score.to_string())
    }),
    Row::Empty,
    Row::LabelValue("LEVEL:", &|this| this.session.level().to_string()),
    Row::LabelValue("MOVES:", &|this| this.session.moves_left().to_string()),
    Row::LabelValue("COMBO:", &|this| match this.session.combo() {
        0 => "-".to_owned(),
        combo => format!("x{combo}"),
    }),
    Row::LabelValue("STARS:", &|this| {
        let stars = this.session.stars().unwrap_or(0);
        "*".repeat(usize::from(stars))
    }),
];

impl Widget for SessionStatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;

        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas[..].iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(&self), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(&self), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}
