//! Colors handed to the compositor canvas.

mod color;

pub use color::Color;
