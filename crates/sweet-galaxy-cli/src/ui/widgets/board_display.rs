use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};
use sweet_galaxy_engine::{Board, GRID_SIZE, Position, SwapMove, Topology};

use crate::ui::widgets::{CellDisplay, Highlight};

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    topology: &'a Topology,
    cursor: Option<Position>,
    selected: Option<Position>,
    hint: Option<SwapMove>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board, topology: &'a Topology) -> Self {
        Self {
            board,
            topology,
            cursor: None,
            selected: None,
            hint: None,
            block: None,
        }
    }

    pub fn cursor(self, cursor: Position) -> Self {
        Self {
            cursor: Some(cursor),
            ..self
        }
    }

    pub fn selected(self, selected: Option<Position>) -> Self {
        Self { selected, ..self }
    }

    pub fn hint(self, hint: Option<SwapMove>) -> Self {
        Self { hint, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        8 * CellDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        8 * CellDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }

    fn highlight_at(&self, pos: Position) -> Option<Highlight> {
        if self.selected == Some(pos) {
            Some(Highlight::Selected)
        } else if self.cursor == Some(pos) {
            Some(Highlight::Cursor)
        } else if self.hint.is_some_and(|hint| hint.from == pos || hint.to == pos) {
            Some(Highlight::Hint)
        } else {
            None
        }
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..GRID_SIZE).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..GRID_SIZE).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let cell_areas = area
            .layout::<GRID_SIZE>(&vertical)
            .into_iter()
            .flat_map(|row| row.layout::<GRID_SIZE>(&horizontal));

        for (pos, cell_area) in iter::zip(Position::all(), cell_areas) {
            CellDisplay::from_cell(self.topology.get(pos), self.board.get(pos))
                .highlight(self.highlight_at(pos))
                .render(cell_area, buf);
        }
    }
}
