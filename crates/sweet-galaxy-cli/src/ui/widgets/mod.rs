use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{
    board_display::*, cell_display::*, goals_display::*, key_binding_display::*,
    session_display::*, session_stats_display::*,
};

mod board_display;
mod cell_display;
mod goals_display;
mod key_binding_display;
mod session_display;
mod session_stats_display;

mod color {
    use ratatui::style::Color;

    pub const RED: Color = Color::Rgb(255, 70, 70);
    pub const BLUE: Color = Color::Rgb(80, 140, 255);
    pub const GREEN: Color = Color::Rgb(40, 220, 90);
    pub const YELLOW: Color = Color::Rgb(255, 225, 0);
    pub const PURPLE: Color = Color::Rgb(190, 90, 255);
    pub const ORANGE: Color = Color::Rgb(255, 150, 20);

    pub const GEL: Color = Color::Rgb(90, 30, 90);
    pub const LOCK: Color = Color::Rgb(70, 70, 90);
    pub const STONE: Color = Color::Rgb(120, 110, 100);
    pub const CURSOR: Color = Color::Rgb(60, 60, 60);
    pub const SELECTED: Color = Color::Rgb(0, 110, 130);
    pub const HINT: Color = Color::Rgb(120, 100, 0);

    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
}

pub mod style {
    use ratatui::style::{Color, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const DIM: Style = fg_bg(color::GRAY, color::BLACK);
    pub const DONE: Style = fg_bg(color::GREEN, color::BLACK);
    pub const MARKED: Style = fg_bg(color::BLACK, color::WHITE);
    pub const STONE: Style = fg_bg(color::BLACK, color::STONE);

    pub const COMPLETED: Style = fg_bg(color::BLACK, color::GREEN);
    pub const FAILED: Style = fg_bg(color::WHITE, color::RED);
    pub const NOTICE: Style = fg_bg(color::BLACK, color::YELLOW);
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
