pub mod gamepad;
pub mod input;
pub mod prompt;
pub mod renderer;
pub mod screen;
pub mod sound;
pub mod viewport;
