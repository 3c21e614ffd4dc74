pub mod clock;
pub mod event;
pub mod step;
pub mod world;
