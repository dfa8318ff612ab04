//! Synth: the engine object the host talks to.
//!
//! Owns the wavetables, the oscillator pair, the trigger history and the
//! note stepper. Every edit re-quantizes and re-derives spectra before it
//! returns, so the next rendered block already plays the new waveform.

use log::{debug, warn};

use crate::config::{MAX_SMOOTHING_WINDOW, SynthConfig};
use crate::dsp::arpeggiator::Arpeggiator;
use crate::dsp::engine::{DualOscillatorEngine, RatioChange, RatioLock};
use crate::dsp::note::midi_to_frequency;
use crate::dsp::quantizer;
use crate::dsp::resampler::{self, Point};
use crate::dsp::spectrum::{HarmonicSpectrum, compute_spectrum};
use crate::dsp::trigger::{TriggerEngine, smooth_waveform};
use crate::dsp::wavetable::{
    Channel, CouplingMode, DefaultWaveform, TABLE_SIZE, WaveTable, WavetableStore,
};
use crate::error::{CurveError, SynthError};

pub const MIN_OCTAVE: i32 = -3;
pub const MAX_OCTAVE: i32 = 3;

#[derive(Debug, Clone)]
pub struct Synth {
    config: SynthConfig,
    store: WavetableStore,
    glitch_steps: u32,
    engine: DualOscillatorEngine,
    trigger: TriggerEngine,
    arp: Arpeggiator,
    octave: i32,
    last_note: Option<i32>,
}

impl Synth {
    pub fn new(config: SynthConfig) -> Self {
        let mut engine = DualOscillatorEngine::new(config.sample_rate)
            .with_snap_threshold(config.snap_threshold);
        engine.set_base_frequency(config.base_frequency);

        let mut synth = Synth {
            store: WavetableStore::new(),
            glitch_steps: quantizer::clamp_steps(config.glitch_steps),
            engine,
            trigger: TriggerEngine::new(config.trigger_history),
            arp: Arpeggiator::new(config.arp_bpm, config.arp_division),
            octave: 0,
            last_note: None,
            config,
        };
        synth.refresh(true);
        synth
    }

    /// Build a synth from a JSON config (see [`SynthConfig`]).
    pub fn from_json(json: &str) -> Result<Self, SynthError> {
        let config = SynthConfig::from_json(json)?;
        Ok(Synth::new(config))
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    // ── Wavetable editing ──────────────────────────────────

    /// Write one control point. In linked mode the right channel always
    /// mirrors the left, so right-channel writes only stick once the
    /// channels are independent.
    pub fn set_control_point(&mut self, channel: Channel, index: usize, value: f64) {
        self.store.set_control_point(channel, index, value);
        self.refresh(false);
    }

    /// Replace a whole control table.
    pub fn bulk_set_from_curve(&mut self, channel: Channel, table: &WaveTable) {
        self.store.bulk_set_from_curve(channel, table);
        self.refresh(false);
    }

    /// A pad drag from one slot to another: every slot in between gets a
    /// linearly interpolated value. Writes the left channel.
    pub fn draw_pad_stroke(&mut self, from: (usize, f64), to: (usize, f64)) {
        let (mut a, mut b) = (from, to);
        if a.0 > b.0 {
            std::mem::swap(&mut a, &mut b);
        }
        let (start, end) = (a.0.min(TABLE_SIZE - 1), b.0.min(TABLE_SIZE - 1));
        for i in start..=end {
            let t = if end == start {
                0.0
            } else {
                (i - start) as f64 / (end - start) as f64
            };
            self.store
                .set_control_point(Channel::Left, i, a.1 + (b.1 - a.1) * t);
        }
        self.refresh(false);
    }

    /// Change the quantizer resolution (clamped to 4–64) for both channels.
    pub fn quantize(&mut self, steps: u32) {
        self.glitch_steps = quantizer::clamp_steps(steps);
        self.refresh(true);
    }

    /// Load a built-in waveform into both channels and re-link them.
    pub fn select_default_waveform(&mut self, kind: DefaultWaveform) {
        debug!("Default waveform {kind:?}");
        self.store.load_default(kind);
        self.engine.set_coupling(CouplingMode::Linked);
        self.refresh(false);
    }

    /// Turn a drawn XY path into the two channel tables.
    ///
    /// On success the channels become independent, both phases restart at
    /// 0 and the trigger's phase history starts over. Degenerate paths
    /// leave everything untouched.
    pub fn resample_from_curve(&mut self, points: &[Point]) -> Result<(), CurveError> {
        let curve = match resampler::resample(points, &self.config.capture_region) {
            Ok(curve) => curve,
            Err(e) => {
                warn!("Ignoring drawn curve: {e}");
                return Err(e);
            }
        };

        let right = curve.right_table(self.engine.ratio(), self.store.control(Channel::Right));
        self.store.bulk_set_from_curve(Channel::Left, &curve.left_table());
        self.store.bulk_set_from_curve(Channel::Right, &right);
        self.engine.set_coupling(CouplingMode::Independent);
        self.refresh(false);
        self.engine.reset_phases();
        self.trigger.clear_history();
        Ok(())
    }

    /// Re-quantize changed channels and hand their new spectra to the
    /// oscillators. Untouched channels keep their rendered cycle.
    fn refresh(&mut self, all: bool) {
        if self.engine.coupling() == CouplingMode::Linked {
            self.store.mirror_left();
        }
        let mut changed = [None, None];
        for ch in Channel::BOTH {
            if all || self.store.is_dirty(ch) {
                self.store.quantize(ch, self.glitch_steps);
                changed[ch.index()] = Some(compute_spectrum(self.store.quantized(ch)));
            }
        }
        let [left, right] = changed;
        self.engine.apply_waveform(left, right);
    }

    // ── Tuning ─────────────────────────────────────────────

    pub fn set_base_frequency(&mut self, frequency: f64) {
        self.engine.set_base_frequency(frequency);
    }

    pub fn set_ratio(&mut self, ratio: f64) -> RatioChange {
        self.engine.set_ratio(ratio)
    }

    /// Play a MIDI note, shifted by the current octave offset.
    pub fn note_on(&mut self, midi: i32) {
        self.last_note = Some(midi);
        self.engine
            .set_base_frequency(midi_to_frequency(midi + self.octave * 12));
    }

    /// Move the octave offset by `direction` octaves (clamped to ±3) and
    /// re-tune the last played note.
    pub fn change_octave(&mut self, direction: i32) {
        self.octave = (self.octave + direction).clamp(MIN_OCTAVE, MAX_OCTAVE);
        if let Some(midi) = self.last_note {
            self.note_on(midi);
        }
    }

    /// Forget the last played note, e.g. after the host moves the
    /// frequency slider by hand.
    pub fn clear_last_note(&mut self) {
        self.last_note = None;
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    // ── Arpeggiator ────────────────────────────────────────

    pub fn press_note(&mut self, midi: i32) {
        self.arp.press(midi);
    }

    pub fn release_note(&mut self, midi: i32) {
        self.arp.release(midi);
    }

    pub fn release_all_notes(&mut self) {
        self.arp.release_all();
    }

    /// Advance the arpeggiator clock; plays and returns a note when due.
    pub fn tick(&mut self, now_ms: f64) -> Option<i32> {
        let note = self.arp.tick(now_ms)?;
        self.note_on(note);
        Some(note)
    }

    // ── Scope ──────────────────────────────────────────────

    /// Whether a host point falls inside the XY drawing area.
    pub fn in_capture_region(&self, point: Point) -> bool {
        self.config.capture_region.contains(point)
    }

    /// Trigger offset for a pair of analysis windows at `ratio`.
    pub fn compute_trigger(&mut self, left: &[f32], right: &[f32], ratio: f64) -> usize {
        self.trigger.compute(left, right, ratio)
    }

    /// Smooth both windows with the configured moving average, then
    /// trigger at the current ratio. Returns the smoothed windows too, so
    /// the host draws what was triggered on.
    pub fn scope_frame(&mut self, left: &[f32], right: &[f32]) -> (usize, Vec<f32>, Vec<f32>) {
        let window = self.config.smoothing_window.clamp(1, MAX_SMOOTHING_WINDOW);
        let left = smooth_waveform(left, window);
        let right = smooth_waveform(right, window);
        let idx = self.trigger.compute(&left, &right, self.engine.ratio());
        (idx, left, right)
    }

    // ── Audio ──────────────────────────────────────────────

    /// Render `frames` samples per channel.
    pub fn render_stereo(&mut self, frames: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for _ in 0..frames {
            let (l, r) = self.engine.next_frame();
            left.push(l as f32);
            right.push(r as f32);
        }
        (left, right)
    }

    // ── Accessors ──────────────────────────────────────────

    pub fn control_table(&self, channel: Channel) -> &WaveTable {
        self.store.control(channel)
    }

    pub fn quantized_table(&self, channel: Channel) -> &WaveTable {
        self.store.quantized(channel)
    }

    /// Spectrum the oscillator on `channel` is playing.
    pub fn spectrum(&self, channel: Channel) -> &HarmonicSpectrum {
        self.engine.spectrum(channel)
    }

    pub fn glitch_steps(&self) -> u32 {
        self.glitch_steps
    }

    pub fn coupling(&self) -> CouplingMode {
        self.engine.coupling()
    }

    pub fn ratio(&self) -> f64 {
        self.engine.ratio()
    }

    pub fn lock(&self) -> RatioLock {
        self.engine.lock()
    }

    pub fn base_frequency(&self) -> f64 {
        self.engine.base_frequency()
    }

    pub fn phase(&self, channel: Channel) -> f64 {
        self.engine.oscillator(channel).phase()
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}
