pub mod app;
pub mod board;
pub mod events;
pub mod records;
pub mod round;
pub mod scheduler;
pub mod scoring;
pub mod settings;
pub mod state;
pub mod storage;
pub mod timer;
