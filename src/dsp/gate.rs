// BeatGate - debounced detection state machine
//
// Two states: Idle (ready to fire) and Cooling (suppressing repeats).
// The gate fires on strict energy > threshold while Idle and then stays
// in Cooling until the cooldown has elapsed. Time is measured on the
// caller's sample clock, so the comparison is exact integer arithmetic.

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    /// Ready to fire on the next qualifying frame
    Idle,
    /// Suppressing detections until the cooldown elapses
    Cooling,
}

/// Debounce gate enforcing a minimum inter-beat interval
pub struct BeatGate {
    state: GateState,
    /// Sample-clock position of the last fired beat
    last_beat_at: u64,
    /// Minimum samples between beats
    cooldown_samples: u64,
}

impl BeatGate {
    pub fn new(cooldown_samples: u64) -> Self {
        Self {
            state: GateState::Idle,
            last_beat_at: 0,
            cooldown_samples,
        }
    }

    /// Evaluate one frame; returns true when a beat fires
    ///
    /// The Cooling -> Idle transition is checked before the energy test,
    /// so a frame arriving exactly at the cooldown boundary can fire.
    /// Equal energy and threshold does not fire.
    pub fn check(&mut self, energy: f32, threshold: f32, now_samples: u64) -> bool {
        if self.state == GateState::Cooling
            && now_samples.saturating_sub(self.last_beat_at) >= self.cooldown_samples
        {
            self.state = GateState::Idle;
        }

        if self.state == GateState::Idle && energy > threshold {
            self.state = GateState::Cooling;
            self.last_beat_at = now_samples;
            return true;
        }

        false
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.state = GateState::Idle;
        self.last_beat_at = 0;
    }
}
