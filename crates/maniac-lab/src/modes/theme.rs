use maniac_ui::prelude::*;

use super::{Commands, UiCommand};

pub const TITLE_SIZE: f32 = 32.0;
pub const BODY_SIZE: f32 = 16.0;

pub fn text_color() -> Color {
    Color::from_srgb_u8(230, 230, 230, 255)
}

pub fn dim_text_color() -> Color {
    Color::from_srgb_u8(150, 150, 155, 255)
}

pub fn panel_color() -> Color {
    Color::from_srgb_u8(30, 30, 34, 230)
}

pub fn label(text: impl Into<String>, size: f32) -> Text {
    Text::new(text, size, text_color())
}

/// A button that does nothing yet.
pub fn inert_button(caption: &str) -> Button {
    Button::new(Text::new(caption, BODY_SIZE, dim_text_color()))
        .background(Color::from_srgb_u8(50, 50, 55, 255))
        .hover_background(Color::from_srgb_u8(60, 60, 66, 255))
        .padding(Edges::symmetric(6.0, 12.0))
        .corner_radius(4.0)
}

/// A button that queues `command` when clicked.
pub fn command_button(caption: &str, commands: &Commands, command: impl Fn() -> UiCommand + 'static) -> Button {
    let commands = commands.clone();
    Button::new(label(caption, BODY_SIZE))
        .background(Color::from_srgb_u8(55, 70, 100, 255))
        .hover_background(Color::from_srgb_u8(70, 90, 130, 255))
        .press_background(Color::from_srgb_u8(40, 55, 80, 255))
        .padding(Edges::symmetric(6.0, 12.0))
        .corner_radius(4.0)
        .on_click(move || commands.push(command()))
}

/// Horizontal bar across the top of an editor screen.
pub fn menu_bar(row: Row) -> Container {
    Container::new()
        .background(Color::from_srgb_u8(24, 24, 28, 240))
        .padding(Edges::symmetric(4.0, 8.0))
        .child(row.spacing(6.0).cross_align(Align::Center))
}
