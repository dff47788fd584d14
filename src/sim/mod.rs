pub mod event;
pub mod frontend;
pub mod level;
pub mod sequencer;
pub mod session;
pub mod step;
pub mod view;
pub mod world;
