//! Dual oscillator engine: two phase-coupled voices at `f` and `f * ratio`.
//!
//! The left voice plays the base frequency, the right voice plays the base
//! frequency times a snapped ratio. Snapping into unison resets both
//! phases so the XY figure settles on a clean diagonal/ellipse.

use log::debug;

use super::oscillator::PeriodicOscillator;
use super::spectrum::HarmonicSpectrum;
use super::wavetable::{Channel, CouplingMode};

pub const MIN_RATIO: f64 = 0.1;
pub const MAX_RATIO: f64 = 4.0;
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.05;
pub const MIN_FREQUENCY: f64 = 20.0;
pub const MAX_FREQUENCY: f64 = 20000.0;

/// Tolerance used to decide two ratios are the same value.
const RATIO_EPSILON: f64 = 1e-3;

/// Lock state of the ratio, always derived from the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioLock {
    Unlocked,
    /// Locked at exactly 1.0.
    Unison,
    /// Locked at an integer greater than 1.
    Integer(u32),
}

impl RatioLock {
    pub fn classify(ratio: f64) -> Self {
        let nearest = ratio.round();
        if (ratio - nearest).abs() > RATIO_EPSILON || nearest < 1.0 {
            RatioLock::Unlocked
        } else if nearest == 1.0 {
            RatioLock::Unison
        } else {
            RatioLock::Integer(nearest as u32)
        }
    }
}

/// What `set_ratio` did with its input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioChange {
    /// The ratio now in effect.
    pub ratio: f64,
    /// Whether the input was pulled onto an integer.
    pub snapped: bool,
    /// Whether both phases were reset (transition into unison).
    pub phase_reset: bool,
}

/// Left/right oscillator pair with ratio and coupling policy.
#[derive(Debug, Clone)]
pub struct DualOscillatorEngine {
    base_frequency: f64,
    ratio: f64,
    snap_threshold: f64,
    coupling: CouplingMode,
    left: PeriodicOscillator,
    right: PeriodicOscillator,
}

impl DualOscillatorEngine {
    pub fn new(sample_rate: f64) -> Self {
        let mut engine = DualOscillatorEngine {
            base_frequency: 440.0,
            ratio: 1.0,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            coupling: CouplingMode::Linked,
            left: PeriodicOscillator::new(sample_rate),
            right: PeriodicOscillator::new(sample_rate),
        };
        engine.retune();
        engine
    }

    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold.clamp(0.0, 0.5);
        self
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn lock(&self) -> RatioLock {
        RatioLock::classify(self.ratio)
    }

    pub fn coupling(&self) -> CouplingMode {
        self.coupling
    }

    pub(crate) fn set_coupling(&mut self, mode: CouplingMode) {
        if self.coupling != mode {
            debug!("Coupling mode {:?} -> {:?}", self.coupling, mode);
            self.coupling = mode;
        }
    }

    pub fn oscillator(&self, channel: Channel) -> &PeriodicOscillator {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Spectrum currently loaded into `channel`.
    pub fn spectrum(&self, channel: Channel) -> &HarmonicSpectrum {
        self.oscillator(channel).spectrum()
    }

    /// Set the left frequency; the right follows at `f * ratio`.
    pub fn set_base_frequency(&mut self, frequency: f64) {
        let f = if frequency.is_finite() {
            frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
        } else {
            self.base_frequency
        };
        self.base_frequency = f;
        self.retune();
    }

    /// Apply a new ratio with integer snapping.
    ///
    /// Inputs within the snap threshold of an integer snap onto it; all
    /// others are rounded to two decimals. Phases reset only when the
    /// ratio moves into 1.0 from somewhere else.
    pub fn set_ratio(&mut self, ratio: f64) -> RatioChange {
        let r = if ratio.is_finite() {
            ratio.clamp(MIN_RATIO, MAX_RATIO)
        } else {
            self.ratio
        };

        let nearest = r.round();
        let snapped = (r - nearest).abs() <= self.snap_threshold;
        let target = if snapped {
            nearest
        } else {
            (r * 100.0).round() / 100.0
        };

        let mut phase_reset = false;
        if (target - self.ratio).abs() > RATIO_EPSILON {
            self.ratio = target;
            self.retune();
            if RatioLock::classify(target) == RatioLock::Unison {
                self.reset_phases();
                phase_reset = true;
            }
            debug!("Ratio -> {target} (snapped: {snapped}, phase reset: {phase_reset})");
        }

        RatioChange {
            ratio: self.ratio,
            snapped,
            phase_reset,
        }
    }

    /// Load changed spectra into the oscillators according to the coupling
    /// mode. `None` leaves that channel's oscillator as it is.
    ///
    /// Linked: both voices play `left`. Independent: each plays its own.
    pub fn apply_waveform(&mut self, left: Option<HarmonicSpectrum>, right: Option<HarmonicSpectrum>) {
        match self.coupling {
            CouplingMode::Linked => {
                if let Some(left) = left {
                    self.right.set_spectrum(left.clone());
                    self.left.set_spectrum(left);
                }
            }
            CouplingMode::Independent => {
                if let Some(left) = left {
                    self.left.set_spectrum(left);
                }
                if let Some(right) = right {
                    self.right.set_spectrum(right);
                }
            }
        }
    }

    pub fn reset_phases(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// Render one stereo frame.
    pub fn next_frame(&mut self) -> (f64, f64) {
        (self.left.next_sample(), self.right.next_sample())
    }

    fn retune(&mut self) {
        self.left.frequency = self.base_frequency;
        self.right.frequency = self.base_frequency * self.ratio;
    }
}
