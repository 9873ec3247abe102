//! Configuration for the detector and the capture engine
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling parameter tuning without recompilation. Detection parameters
//! (frame size, cutoff, threshold multiplier, cooldown, history length)
//! and capture-side buffer sizing can be adjusted via the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::DetectorError;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub capture: CaptureConfig,
}

/// Beat detection algorithm parameters
///
/// All parameters are fixed at detector construction; changing them
/// requires building a new detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Analysis frame size in samples (power of two)
    pub frame_size: usize,
    /// Upper edge of the low-frequency band used for onset energy, in Hz
    pub low_freq_cutoff_hz: f32,
    /// Multiplier applied to the rolling mean energy to form the threshold.
    /// The default of 1.0 gates on the rolling mean itself, which is a
    /// sensitive setting; raise it to demand louder onsets.
    pub threshold_multiplier: f32,
    /// Minimum time between reported beats, in seconds
    pub cooldown_secs: f32,
    /// Number of recent energy values kept for the adaptive threshold.
    /// 43 frames of 1024 samples is roughly one second at 44.1 kHz.
    pub history_len: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            low_freq_cutoff_hz: 200.0,
            threshold_multiplier: 1.0,
            cooldown_secs: 0.25,
            history_len: 43,
        }
    }
}

impl DetectorConfig {
    /// Validate the configuration against a sample rate
    ///
    /// Surfaces every construction-time fatal condition from one place so
    /// the per-frame path stays infallible.
    pub fn validate(&self, sample_rate: u32) -> Result<(), DetectorError> {
        if self.frame_size < 2 || !self.frame_size.is_power_of_two() {
            return Err(DetectorError::FrameSizeNotPowerOfTwo {
                size: self.frame_size,
            });
        }
        if self.history_len == 0 {
            return Err(DetectorError::HistoryEmpty);
        }
        let nyquist = sample_rate as f32 * 0.5;
        if self.low_freq_cutoff_hz <= 0.0 || self.low_freq_cutoff_hz >= nyquist {
            return Err(DetectorError::CutoffOutOfRange {
                cutoff_hz: self.low_freq_cutoff_hz,
                nyquist_hz: nyquist,
            });
        }
        if self.cooldown_secs < 0.0 {
            return Err(DetectorError::NegativeCooldown {
                cooldown_secs: self.cooldown_secs,
            });
        }
        Ok(())
    }
}

/// Capture engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Number of pre-allocated transfer buffers
    pub buffer_pool_size: usize,
    /// Capacity of each transfer buffer in samples
    pub buffer_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            buffer_pool_size: 16,
            buffer_capacity: 2048,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// Falls back to defaults with a warning if the file is missing or
    /// cannot be parsed; a bad config file never prevents startup.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
