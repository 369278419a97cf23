pub mod app;
pub mod form;
pub mod input;
pub mod renderer;
pub mod sound;
