// DSP module - the pure beat detection pipeline
//
// Stages in data-flow order: FrameWindower -> SpectralTransform ->
// EnergyExtractor -> ThresholdTracker -> BeatGate, composed by
// BeatDetector. Everything here is synchronous, allocation-free after
// construction and owned by a single thread.

pub mod detector;
pub mod energy;
pub mod gate;
pub mod spectrum;
pub mod threshold;
pub mod window;

pub use detector::BeatDetector;
pub use energy::EnergyExtractor;
pub use gate::BeatGate;
pub use spectrum::SpectralTransform;
pub use threshold::ThresholdTracker;
pub use window::FrameWindower;
