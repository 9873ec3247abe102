// Beat event payload and subscription surface
//
// A BeatEvent is created per detection and handed to subscribers through
// a bounded broadcast channel; it is never persisted.

use serde::{Deserialize, Serialize};

/// Default capacity of the beat event channel.
///
/// A subscriber that falls more than this many events behind loses the
/// oldest undelivered events (drop-oldest); the detection thread never
/// blocks on a slow subscriber.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A single detected beat
///
/// Timestamps come from the detector's sample clock (samples processed
/// since start, converted to milliseconds), so offline analysis of the
/// same signal is fully deterministic. `energy` and `threshold` are the
/// values the gate compared, letting a visual layer scale its reaction
/// to how far above the ambient baseline the onset landed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatEvent {
    /// Milliseconds since detection started, sample-clock derived
    pub timestamp_ms: u64,
    /// Low-frequency onset energy of the triggering frame
    pub energy: f32,
    /// Adaptive threshold the energy exceeded
    pub threshold: f32,
}

/// Receiving half of a beat subscription
pub type BeatReceiver = tokio::sync::broadcast::Receiver<BeatEvent>;
