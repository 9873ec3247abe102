// beatpulse - real-time beat detection
//
// Streaming DSP pipeline that turns a live mono audio feed into
// debounced beat events: Hann windowing, FFT magnitude spectrum,
// low-frequency onset energy, adaptive rolling-mean threshold and a
// cooldown gate. The pure pipeline lives in `dsp`; `audio` wraps it
// with cpal capture, a lock-free buffer pool and a broadcast event
// channel.

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod events;

pub use audio::BeatEngine;
pub use config::{AppConfig, CaptureConfig, DetectorConfig};
pub use dsp::BeatDetector;
pub use error::{AudioError, DetectorError, ErrorCode};
pub use events::{BeatEvent, BeatReceiver};
