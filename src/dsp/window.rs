// FrameWindower - Hann windowing and zero-padding
//
// Applies a precomputed Hann window to incoming samples and pads the
// result to exactly the analysis frame size. The output buffer is owned
// by the windower and reused for every frame; nothing allocates after
// construction.

/// Applies a Hann window and zero-padding to raw sample frames
pub struct FrameWindower {
    /// Precomputed Hann coefficients, length = frame_size
    coefficients: Vec<f32>,
    /// Reused output buffer, length = frame_size
    output: Vec<f32>,
}

impl FrameWindower {
    /// Create a windower for the given analysis frame size
    ///
    /// Hann coefficient for index i: `0.5 - 0.5 * cos(2*pi*i / (N-1))`
    pub fn new(frame_size: usize) -> Self {
        let denominator = frame_size.saturating_sub(1).max(1) as f32;
        let coefficients = (0..frame_size)
            .map(|i| {
                0.5 - 0.5 * ((2.0 * std::f32::consts::PI * i as f32) / denominator).cos()
            })
            .collect();

        Self {
            coefficients,
            output: vec![0.0; frame_size],
        }
    }

    /// Window a raw frame and return a slice of exactly `frame_size` samples
    ///
    /// The first `min(samples.len(), frame_size)` positions hold the
    /// windowed input; the remainder is zeroed. Samples beyond
    /// `frame_size` are truncated. An empty input is legal and yields an
    /// all-zero frame.
    pub fn apply(&mut self, samples: &[f32]) -> &[f32] {
        let used = samples.len().min(self.output.len());

        for i in 0..used {
            self.output[i] = samples[i] * self.coefficients[i];
        }
        for value in &mut self.output[used..] {
            *value = 0.0;
        }

        &self.output
    }

    /// Analysis frame size this windower produces
    pub fn frame_size(&self) -> usize {
        self.output.len()
    }
}
