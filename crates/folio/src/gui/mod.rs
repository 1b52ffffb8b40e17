pub mod app;
pub mod hero;
pub mod theme;
pub mod window;
