// SpectralTransform - forward FFT and magnitude spectrum
//
// Computes the magnitude spectrum of a windowed frame via rustfft. The
// FFT plan, the complex working buffer, the scratch buffer and the
// magnitude buffer are all allocated once at construction and reused
// for every frame.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::DetectorError;

/// FFT processor producing magnitudes for bins `0..N/2`
pub struct SpectralTransform {
    fft: Arc<dyn Fft<f32>>,
    frame_size: usize,
    /// Complex working buffer, length = frame_size
    buffer: Vec<Complex<f32>>,
    /// Scratch space required by the in-place transform
    scratch: Vec<Complex<f32>>,
    /// Reused magnitude output, length = frame_size / 2
    magnitudes: Vec<f32>,
}

impl SpectralTransform {
    /// Plan a forward FFT for the given frame size
    ///
    /// Fails if `frame_size` is not a power of two of at least 2; this is
    /// the only fallible step, surfaced at construction rather than
    /// per frame.
    pub fn new(frame_size: usize) -> Result<Self, DetectorError> {
        if frame_size < 2 || !frame_size.is_power_of_two() {
            return Err(DetectorError::FrameSizeNotPowerOfTwo { size: frame_size });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Ok(Self {
            fft,
            frame_size,
            buffer: vec![Complex::new(0.0, 0.0); frame_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            magnitudes: vec![0.0; frame_size / 2],
        })
    }

    /// Transform a windowed frame and return its magnitude spectrum
    ///
    /// Bin `k` of the returned slice corresponds to frequency
    /// `k * sample_rate / frame_size`; magnitude is `sqrt(re^2 + im^2)`.
    ///
    /// # Panics
    /// Debug-asserts that `windowed.len() == frame_size`; the windower
    /// upstream guarantees this.
    pub fn magnitudes(&mut self, windowed: &[f32]) -> &[f32] {
        debug_assert_eq!(windowed.len(), self.frame_size);

        for (slot, &sample) in self.buffer.iter_mut().zip(windowed.iter()) {
            *slot = Complex::new(sample, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (magnitude, bin) in self.magnitudes.iter_mut().zip(self.buffer.iter()) {
            *magnitude = bin.norm();
        }

        &self.magnitudes
    }

    /// Number of magnitude bins produced per frame (`frame_size / 2`)
    pub fn bin_count(&self) -> usize {
        self.magnitudes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(matches!(
            SpectralTransform::new(1000),
            Err(DetectorError::FrameSizeNotPowerOfTwo { size: 1000 })
        ));
        assert!(matches!(
            SpectralTransform::new(0),
            Err(DetectorError::FrameSizeNotPowerOfTwo { size: 0 })
        ));
        assert!(SpectralTransform::new(1024).is_ok());
    }

    #[test]
    fn test_bin_count_is_half_frame_size() {
        let transform = SpectralTransform::new(1024).unwrap();
        assert_eq!(transform.bin_count(), 512);
    }

    #[test]
    fn test_silence_has_zero_magnitude() {
        let mut transform = SpectralTransform::new(256).unwrap();
        let spectrum = transform.magnitudes(&[0.0; 256]);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_dc_signal_concentrates_in_bin_zero() {
        let mut transform = SpectralTransform::new(256).unwrap();
        let spectrum = transform.magnitudes(&[1.0; 256]);

        assert!((spectrum[0] - 256.0).abs() < 1e-3, "DC bin should hold the full sum");
        assert!(
            spectrum[1..].iter().all(|&m| m < 1e-3),
            "a constant signal has no energy outside bin 0"
        );
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let frame_size = 256;
        let mut transform = SpectralTransform::new(frame_size).unwrap();

        // A sine at exactly bin 8 (8 cycles per frame)
        let signal: Vec<f32> = (0..frame_size)
            .map(|i| {
                (2.0 * std::f32::consts::PI * 8.0 * i as f32 / frame_size as f32).sin()
            })
            .collect();

        let spectrum = transform.magnitudes(&signal);
        let peak_bin = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        assert_eq!(peak_bin, 8, "spectral peak should land on the sine's bin");
    }

    #[test]
    fn test_repeated_calls_are_consistent() {
        let mut transform = SpectralTransform::new(128).unwrap();
        let signal: Vec<f32> = (0..128).map(|i| (i as f32 * 0.1).sin()).collect();

        let first = transform.magnitudes(&signal).to_vec();
        transform.magnitudes(&[0.0; 128]);
        let second = transform.magnitudes(&signal).to_vec();

        assert_eq!(first, second, "reused buffers must not leak state");
    }
}
