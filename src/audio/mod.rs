// Audio module - capture and engine lifecycle
//
// buffer_pool: pre-allocated lock-free transfer queues
// capture: cpal input stream construction
// engine: BeatEngine lifecycle and the detection thread

pub mod buffer_pool;
pub mod capture;
pub mod engine;

pub use engine::BeatEngine;
