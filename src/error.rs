// Error types for the beat detection engine
//
// This module defines custom error types for audio capture and detector
// construction, providing structured error handling with numeric codes.

use log::error;
use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling and
/// log correlation across the engine.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log an audio error with structured context
///
/// Logs audio errors with the numeric error code, the component the error
/// occurred in, and a human-readable message. Non-blocking, never panics.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=BeatEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio capture and engine lifecycle errors
///
/// Error code range: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Engine is already running
    AlreadyRunning,

    /// Failed to open the capture stream (no device, device busy, bad format)
    StreamOpenFailed { reason: String },

    /// Hardware error while starting or running a stream
    HardwareError { details: String },

    /// Detector construction failed, engine cannot start
    DetectorInvalid { source: DetectorError },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::AlreadyRunning => 1001,
            AudioError::StreamOpenFailed { .. } => 1002,
            AudioError::HardwareError { .. } => 1003,
            AudioError::DetectorInvalid { .. } => 1004,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::AlreadyRunning => {
                "Engine already running. Call stop() first.".to_string()
            }
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open capture stream: {}", reason)
            }
            AudioError::HardwareError { details } => {
                format!("Hardware error: {}", details)
            }
            AudioError::DetectorInvalid { source } => {
                format!("Detector configuration invalid: {}", source.message())
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AudioError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AudioError {}

impl From<DetectorError> for AudioError {
    fn from(err: DetectorError) -> Self {
        AudioError::DetectorInvalid { source: err }
    }
}

/// Detector construction errors
///
/// These are configuration errors surfaced once at construction time;
/// the per-frame processing path is infallible.
///
/// Error code range: 2001-2004
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// Analysis frame size is not a supported power of two
    FrameSizeNotPowerOfTwo { size: usize },

    /// Energy history capacity must be at least 1
    HistoryEmpty,

    /// Low-frequency cutoff must be positive and below Nyquist
    CutoffOutOfRange { cutoff_hz: f32, nyquist_hz: f32 },

    /// Cooldown duration must not be negative
    NegativeCooldown { cooldown_secs: f32 },
}

impl ErrorCode for DetectorError {
    fn code(&self) -> i32 {
        match self {
            DetectorError::FrameSizeNotPowerOfTwo { .. } => 2001,
            DetectorError::HistoryEmpty => 2002,
            DetectorError::CutoffOutOfRange { .. } => 2003,
            DetectorError::NegativeCooldown { .. } => 2004,
        }
    }

    fn message(&self) -> String {
        match self {
            DetectorError::FrameSizeNotPowerOfTwo { size } => {
                format!("Frame size must be a power of two >= 2 (got {})", size)
            }
            DetectorError::HistoryEmpty => {
                "Energy history length must be at least 1".to_string()
            }
            DetectorError::CutoffOutOfRange {
                cutoff_hz,
                nyquist_hz,
            } => {
                format!(
                    "Low-frequency cutoff {} Hz outside (0, {} Hz)",
                    cutoff_hz, nyquist_hz
                )
            }
            DetectorError::NegativeCooldown { cooldown_secs } => {
                format!("Cooldown must be >= 0 seconds (got {})", cooldown_secs)
            }
        }
    }
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DetectorError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DetectorError {}
