use ratatui::{
    layout::Constraint,
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::Line,
    widgets::Widget,
};
use sweet_galaxy_engine::{CellKind, Piece, PieceColor, PieceKind};

use crate::ui::widgets::{color, style};

/// Extra emphasis on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Cursor,
    Selected,
    Hint,
}

/// One grid cell: its layout kind as background, its piece as a symbol.
#[derive(Debug)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        4
    }

    pub fn height() -> u16 {
        2
    }

    pub fn from_cell(kind: CellKind, piece: Option<&Piece>) -> Self {
        let background = match kind {
            CellKind::Playable | CellKind::Void => color::BLACK,
            CellKind::Gel => color::GEL,
            CellKind::Locked => color::LOCK,
            CellKind::Obstruction => return Self::new(style::STONE, "▓▓"),
        };
        let Some(piece) = piece else {
            return Self::new(Style::new().bg(background), "");
        };
        if piece.is_marked() {
            return Self::new(style::MARKED, symbol(piece.kind()));
        }
        Self::new(
            Style::new().fg(piece_color(piece.color())).bg(background),
            symbol(piece.kind()),
        )
    }

    pub fn highlight(self, highlight: Option<Highlight>) -> Self {
        let style = match highlight {
            None => return self,
            Some(Highlight::Cursor) => self.style.bg(color::CURSOR),
            Some(Highlight::Selected) => self.style.bg(color::SELECTED),
            Some(Highlight::Hint) => self.style.bg(color::HINT),
        };
        Self { style, ..self }
    }
}

fn piece_color(color: PieceColor) -> Color {
    match color {
        PieceColor::Red => color::RED,
        PieceColor::Blue => color::BLUE,
        PieceColor::Green => color::GREEN,
        PieceColor::Yellow => color::YELLOW,
        PieceColor::Purple => color::PURPLE,
        PieceColor::Orange => color::ORANGE,
    }
}

fn symbol(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::Plain => "●",
        PieceKind::RowClear => "↔",
        PieceKind::ColumnClear => "↕",
        PieceKind::AreaClear => "✸",
        PieceKind::ColorClear { .. } => "★",
    }
}

impl Widget for CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.style);
        Line::styled(self.symbol, self.style)
            .centered()
            .render(area.centered_vertically(Constraint::Length(1)), buf);
    }
}
