// BeatDetector - the full per-frame detection pipeline
//
// Composes windowing, spectral transform, energy extraction, adaptive
// thresholding and the debounce gate into a single synchronous
// `process` call. All buffers are sized at construction; the steady
// state path performs no allocation, takes no locks and never blocks,
// so it is safe to run inside a real-time audio callback.

use crate::config::DetectorConfig;
use crate::error::DetectorError;
use crate::events::BeatEvent;

use super::energy::EnergyExtractor;
use super::gate::BeatGate;
use super::spectrum::SpectralTransform;
use super::threshold::ThresholdTracker;
use super::window::FrameWindower;

/// Streaming beat detector over fixed-size audio frames
///
/// Frames are expected back to back (hop = frame size). A frame shorter
/// than the analysis size is zero-padded; a longer one is truncated.
/// Timestamps come from an internal sample clock advanced by each
/// frame's consumed length, so results are deterministic for a given
/// input signal.
pub struct BeatDetector {
    windower: FrameWindower,
    transform: SpectralTransform,
    extractor: EnergyExtractor,
    tracker: ThresholdTracker,
    gate: BeatGate,
    frame_size: usize,
    sample_rate: u32,
    /// Samples consumed since construction or the last reset
    samples_processed: u64,
}

impl BeatDetector {
    /// Build a detector for a fixed sample rate
    ///
    /// All configuration errors surface here; `process` itself cannot
    /// fail.
    pub fn new(config: &DetectorConfig, sample_rate: u32) -> Result<Self, DetectorError> {
        config.validate(sample_rate)?;

        let cooldown_samples = (config.cooldown_secs * sample_rate as f32).round() as u64;

        Ok(Self {
            windower: FrameWindower::new(config.frame_size),
            transform: SpectralTransform::new(config.frame_size)?,
            extractor: EnergyExtractor::new(
                config.frame_size,
                sample_rate,
                config.low_freq_cutoff_hz,
            ),
            tracker: ThresholdTracker::new(config.history_len, config.threshold_multiplier),
            gate: BeatGate::new(cooldown_samples),
            frame_size: config.frame_size,
            sample_rate,
            samples_processed: 0,
        })
    }

    /// Run one frame through the pipeline
    ///
    /// Returns the beat fired by this frame, if any. Not crossing the
    /// threshold is the normal outcome of most frames and is not an
    /// error.
    pub fn process(&mut self, frame: &[f32]) -> Option<BeatEvent> {
        let consumed = frame.len().min(self.frame_size) as u64;

        let windowed = self.windower.apply(frame);
        let magnitudes = self.transform.magnitudes(windowed);
        let energy = self.extractor.extract(magnitudes);
        let threshold = self.tracker.update(energy);

        self.samples_processed += consumed;
        let now = self.samples_processed;

        if self.gate.check(energy, threshold, now) {
            Some(BeatEvent {
                timestamp_ms: now * 1000 / self.sample_rate as u64,
                energy,
                threshold,
            })
        } else {
            None
        }
    }

    /// Clear history, gate state and the sample clock
    ///
    /// Equivalent to constructing a fresh detector; the FFT plan and
    /// window coefficients are kept.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.gate.reset();
        self.samples_processed = 0;
    }

    /// Analysis frame size in samples
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Sample rate the detector was built for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples consumed since construction or the last reset
    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }
}
