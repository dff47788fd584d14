pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod terminal;
