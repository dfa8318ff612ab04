//! Band-limited periodic oscillator driven by a harmonic spectrum.
//!
//! The spectrum is rendered once into a dense lookup cycle whenever it
//! changes; playback then reads that cycle with linear interpolation. Only
//! harmonics below `HARMONICS` exist in the cycle, so the tone is
//! band-limited by construction.

use super::spectrum::HarmonicSpectrum;

/// Resolution of the rendered lookup cycle.
const CYCLE_LEN: usize = 2048;

/// A phase-accumulating oscillator playing one harmonic spectrum.
#[derive(Debug, Clone)]
pub struct PeriodicOscillator {
    pub frequency: f64,
    /// Output gain applied after lookup.
    pub amplitude: f64,
    phase: f64,
    sample_rate: f64,
    spectrum: HarmonicSpectrum,
    cycle: Vec<f64>,
}

impl PeriodicOscillator {
    pub fn new(sample_rate: f64) -> Self {
        PeriodicOscillator {
            frequency: 440.0,
            amplitude: 0.5,
            phase: 0.0,
            sample_rate,
            spectrum: HarmonicSpectrum::silent(),
            cycle: vec![0.0; CYCLE_LEN],
        }
    }

    /// Install a new spectrum. Phase is preserved.
    pub fn set_spectrum(&mut self, spectrum: HarmonicSpectrum) {
        for (i, v) in self.cycle.iter_mut().enumerate() {
            *v = spectrum.evaluate(i as f64 / CYCLE_LEN as f64);
        }
        self.spectrum = spectrum;
    }

    pub fn spectrum(&self) -> &HarmonicSpectrum {
        &self.spectrum
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase increment per sample.
    fn phase_inc(&self) -> f64 {
        self.frequency / self.sample_rate
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let pos = self.phase * CYCLE_LEN as f64;
        let i0 = (pos as usize) % CYCLE_LEN;
        let i1 = (i0 + 1) % CYCLE_LEN;
        let frac = pos - pos.floor();
        let sample = self.cycle[i0] + (self.cycle[i1] - self.cycle[i0]) * frac;

        self.phase += self.phase_inc();
        self.phase -= self.phase.floor();

        sample * self.amplitude
    }

    /// Reset oscillator phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::spectrum::compute_spectrum;
    use crate::dsp::wavetable::DefaultWaveform;

    fn sine_osc() -> PeriodicOscillator {
        let mut osc = PeriodicOscillator::new(44100.0);
        osc.amplitude = 1.0;
        osc.set_spectrum(compute_spectrum(&DefaultWaveform::Sine.table()));
        osc
    }

    #[test]
    fn silent_by_default() {
        let mut osc = PeriodicOscillator::new(44100.0);
        for _ in 0..256 {
            assert_eq!(osc.next_sample(), 0.0);
        }
    }

    #[test]
    fn sine_starts_near_zero() {
        let mut osc = sine_osc();
        let s = osc.next_sample();
        assert!(s.abs() < 0.05, "Sine should start near 0, got {s}");
    }

    #[test]
    fn output_stays_bounded() {
        let mut osc = sine_osc();
        osc.frequency = 440.0;
        for _ in 0..44100 {
            let s = osc.next_sample();
            assert!(s.abs() <= 1.1, "Sample out of range: {s}");
        }
    }

    #[test]
    fn phase_wraps_and_resets() {
        let mut osc = sine_osc();
        osc.frequency = 11025.0; // quarter cycle per sample
        for _ in 0..5 {
            osc.next_sample();
        }
        assert!((osc.phase() - 0.25).abs() < 1e-12);
        osc.reset();
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn set_spectrum_keeps_phase() {
        let mut osc = sine_osc();
        osc.frequency = 1000.0;
        for _ in 0..10 {
            osc.next_sample();
        }
        let before = osc.phase();
        osc.set_spectrum(compute_spectrum(&DefaultWaveform::Square.table()));
        assert_eq!(osc.phase(), before);
    }
}
