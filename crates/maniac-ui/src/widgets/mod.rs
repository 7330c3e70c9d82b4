pub mod button;
pub mod container;
pub mod flex;
pub mod list;
pub mod text;
pub mod window;
