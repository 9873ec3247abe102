// EnergyExtractor - low-frequency onset energy
//
// Reduces a magnitude spectrum to one scalar: the mean magnitude of the
// bins at or below the configured cutoff frequency. Percussive onsets
// show up as spikes in this band. The cutoff bin is computed once at
// construction since the sample rate is fixed for the engine's life.

/// Extracts mean low-frequency magnitude from a spectrum
pub struct EnergyExtractor {
    /// Number of leading bins averaged, clamped to `[1, bin_count - 1]`
    cutoff_bin: usize,
}

impl EnergyExtractor {
    /// Compute the cutoff bin for the given analysis parameters
    ///
    /// `cutoff_bin = floor(frame_size * cutoff_hz / (0.5 * sample_rate))`,
    /// clamped so at least one bin and at most `frame_size/2 - 1` bins
    /// contribute.
    pub fn new(frame_size: usize, sample_rate: u32, cutoff_hz: f32) -> Self {
        let nyquist = 0.5 * sample_rate as f32;
        let raw = (frame_size as f32 * cutoff_hz / nyquist) as usize;
        let cutoff_bin = raw.clamp(1, (frame_size / 2).saturating_sub(1).max(1));

        Self { cutoff_bin }
    }

    /// Mean magnitude of bins `0..cutoff_bin`; always >= 0
    pub fn extract(&self, magnitudes: &[f32]) -> f32 {
        let upper = self.cutoff_bin.min(magnitudes.len());
        if upper == 0 {
            return 0.0;
        }
        magnitudes[..upper].iter().sum::<f32>() / upper as f32
    }

    /// Index one past the last bin included in the energy mean
    pub fn cutoff_bin(&self) -> usize {
        self.cutoff_bin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_give_expected_bin() {
        // floor(1024 * 200 / 22050) = 9
        let extractor = EnergyExtractor::new(1024, 44100, 200.0);
        assert_eq!(extractor.cutoff_bin(), 9);
    }

    #[test]
    fn test_cutoff_clamped_to_at_least_one_bin() {
        let extractor = EnergyExtractor::new(1024, 44100, 1.0);
        assert_eq!(extractor.cutoff_bin(), 1);
    }

    #[test]
    fn test_cutoff_clamped_below_bin_count() {
        let extractor = EnergyExtractor::new(1024, 44100, 22_000.0);
        assert_eq!(extractor.cutoff_bin(), 511);
    }

    #[test]
    fn test_energy_is_mean_of_low_bins() {
        let extractor = EnergyExtractor::new(1024, 44100, 200.0);
        let mut magnitudes = vec![0.0; 512];
        for slot in magnitudes.iter_mut().take(9) {
            *slot = 2.0;
        }
        // High bins must not contribute
        magnitudes[100] = 1000.0;

        assert!((extractor.extract(&magnitudes) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_yields_zero_energy() {
        let extractor = EnergyExtractor::new(1024, 44100, 200.0);
        assert_eq!(extractor.extract(&vec![0.0; 512]), 0.0);
    }

    #[test]
    fn test_energy_never_negative() {
        let extractor = EnergyExtractor::new(1024, 44100, 200.0);
        // Magnitudes are non-negative by construction; the mean stays so
        let magnitudes = vec![0.3; 512];
        assert!(extractor.extract(&magnitudes) >= 0.0);
    }
}
