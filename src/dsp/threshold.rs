// ThresholdTracker - adaptive detection threshold
//
// Keeps a fixed-capacity FIFO of recent onset energies and derives the
// detection threshold as their mean times a configurable multiplier.
// The rolling mean tracks ambient loudness, so the detector adapts to
// quiet and loud passages without manual calibration; the capacity
// bounds memory and sets the adaptation speed.

use std::collections::VecDeque;

/// Rolling-mean threshold over a bounded energy history
pub struct ThresholdTracker {
    /// Most recent energies, oldest first; never exceeds `capacity`
    history: VecDeque<f32>,
    capacity: usize,
    multiplier: f32,
}

impl ThresholdTracker {
    /// Create a tracker with the given history capacity and multiplier
    ///
    /// Capacity is allocated up front; pushing never reallocates.
    pub fn new(capacity: usize, multiplier: f32) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            multiplier,
        }
    }

    /// Record an energy value and return the updated threshold
    ///
    /// The oldest value is evicted once the history is full. The mean is
    /// taken over however many values exist so far, so the threshold is
    /// meaningful from the very first frame; an empty history (capacity
    /// misuse guarded upstream) yields 0.
    pub fn update(&mut self, energy: f32) -> f32 {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(energy);

        if self.history.is_empty() {
            return 0.0;
        }
        let mean = self.history.iter().sum::<f32>() / self.history.len() as f32;
        mean * self.multiplier
    }

    /// Number of energies currently held
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True until the first energy is recorded
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Discard all recorded energies
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
