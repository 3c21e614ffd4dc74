pub mod gamepad;
pub mod input;
pub mod present;
pub mod renderer;
