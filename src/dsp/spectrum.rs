//! Harmonic analysis of a wavetable via direct DFT.
//!
//! The result is the coefficient pair a band-limited periodic oscillator
//! consumes. DC is always dropped and coefficients are never normalized, so
//! whatever amplitude (and quantization distortion) the table carries is
//! preserved in the rendered tone.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::wavetable::{TABLE_SIZE, WaveTable};

/// Number of harmonic slots (including the zeroed DC slot).
pub const HARMONICS: usize = TABLE_SIZE / 2;

/// Cosine (`real`) and negated sine (`imag`) coefficients for harmonics
/// `0..HARMONICS`. Index 0 is DC and is always zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicSpectrum {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl HarmonicSpectrum {
    /// An all-zero spectrum (silence).
    pub fn silent() -> Self {
        HarmonicSpectrum {
            real: vec![0.0; HARMONICS],
            imag: vec![0.0; HARMONICS],
        }
    }

    /// Magnitude of harmonic `k`, or 0 past the end.
    pub fn magnitude(&self, k: usize) -> f64 {
        match (self.real.get(k), self.imag.get(k)) {
            (Some(re), Some(im)) => re.hypot(*im),
            _ => 0.0,
        }
    }

    /// Evaluate the band-limited waveform at `phase` in [0, 1).
    ///
    /// Inverse of [`compute_spectrum`] up to a factor of 2 (the negative
    /// frequencies are folded in here).
    pub fn evaluate(&self, phase: f64) -> f64 {
        let mut sum = 0.0;
        for k in 1..self.real.len().min(self.imag.len()) {
            let w = 2.0 * PI * k as f64 * phase;
            sum += self.real[k] * w.cos() - self.imag[k] * w.sin();
        }
        2.0 * sum
    }
}

impl Default for HarmonicSpectrum {
    fn default() -> Self {
        Self::silent()
    }
}

/// Direct O(N·H) DFT of one table period.
pub fn compute_spectrum(table: &WaveTable) -> HarmonicSpectrum {
    let n = TABLE_SIZE as f64;
    let mut real = vec![0.0; HARMONICS];
    let mut imag = vec![0.0; HARMONICS];

    for k in 1..HARMONICS {
        let mut sum_re = 0.0;
        let mut sum_im = 0.0;
        for (i, &x) in table.iter().enumerate() {
            let phase = 2.0 * PI * (k * i) as f64 / n;
            sum_re += x * phase.cos();
            sum_im -= x * phase.sin();
        }
        real[k] = sum_re / n;
        imag[k] = sum_im / n;
    }

    HarmonicSpectrum { real, imag }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::quantizer;
    use crate::dsp::wavetable::DefaultWaveform;

    fn pure_sine() -> WaveTable {
        let mut t = [0.0; TABLE_SIZE];
        for (i, v) in t.iter_mut().enumerate() {
            *v = (2.0 * PI * i as f64 / TABLE_SIZE as f64).sin();
        }
        t
    }

    #[test]
    fn spectrum_has_half_table_length_and_no_dc() {
        let mut table = DefaultWaveform::Square.table();
        for v in table.iter_mut() {
            *v += 0.3; // add a DC offset
        }
        let s = compute_spectrum(&table);
        assert_eq!(s.real.len(), HARMONICS);
        assert_eq!(s.imag.len(), HARMONICS);
        assert_eq!(s.real[0], 0.0);
        assert_eq!(s.imag[0], 0.0);
    }

    #[test]
    fn pure_sine_lands_in_first_harmonic() {
        let s = compute_spectrum(&pure_sine());
        // sin → -i/2 at k=1, so imag[1] = -0.5, real[1] = 0
        assert!(s.real[1].abs() < 1e-12);
        assert!((s.imag[1] + 0.5).abs() < 1e-12, "imag[1] = {}", s.imag[1]);
        for k in 2..HARMONICS {
            assert!(s.magnitude(k) < 1e-12, "harmonic {k} should be empty");
        }
    }

    #[test]
    fn spectrum_is_not_normalized() {
        let mut half = pure_sine();
        for v in half.iter_mut() {
            *v *= 0.5;
        }
        let full = compute_spectrum(&pure_sine());
        let scaled = compute_spectrum(&half);
        assert!((scaled.magnitude(1) - full.magnitude(1) * 0.5).abs() < 1e-12);
    }

    #[test]
    fn spectrum_is_deterministic() {
        let table = DefaultWaveform::Triangle.table();
        assert_eq!(compute_spectrum(&table), compute_spectrum(&table));
    }

    #[test]
    fn evaluate_reconstructs_pure_sine() {
        let s = compute_spectrum(&pure_sine());
        for i in 0..TABLE_SIZE {
            let phase = i as f64 / TABLE_SIZE as f64;
            let expected = (2.0 * PI * phase).sin();
            assert!(
                (s.evaluate(phase) - expected).abs() < 1e-9,
                "mismatch at {i}"
            );
        }
    }

    fn fundamental_share(s: &HarmonicSpectrum) -> f64 {
        let total: f64 = (1..HARMONICS).map(|k| s.magnitude(k).powi(2)).sum();
        s.magnitude(1).powi(2) / total
    }

    #[test]
    fn coarse_quantization_keeps_fundamental_dominant() {
        let sine = DefaultWaveform::Sine.table();
        let clean = compute_spectrum(&sine);
        let crushed = compute_spectrum(&quantizer::quantize(&sine, 4));

        assert!(
            fundamental_share(&crushed) < fundamental_share(&clean),
            "Quantization should move energy out of harmonic 1"
        );
        let h1 = crushed.magnitude(1);
        for k in 2..HARMONICS {
            assert!(h1 > crushed.magnitude(k), "Harmonic 1 should dominate harmonic {k}");
        }
    }
}
