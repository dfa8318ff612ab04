pub mod config;
pub mod dsp;
pub mod error;
pub mod synth;

use crate::config::SynthConfig;
use crate::dsp::note;
use crate::dsp::resampler::Point;
use crate::dsp::trigger;
use crate::dsp::wavetable::{Channel, CouplingMode, DefaultWaveform};
use crate::synth::Synth;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the lissajous-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: map a 0–1000 slider position to a frequency in Hz.
#[wasm_bindgen(js_name = sliderToFrequency)]
pub fn slider_to_frequency(position: f64) -> f64 {
    note::slider_to_frequency(position)
}

/// WASM-exposed: map a frequency to the nearest slider position.
#[wasm_bindgen(js_name = frequencyToSlider)]
pub fn frequency_to_slider(frequency: f64) -> u32 {
    note::frequency_to_slider(frequency)
}

/// WASM-exposed: single-channel fallback trigger (rising crossing before
/// the peak).
#[wasm_bindgen(js_name = risingEdge)]
pub fn rising_edge(buf: &[f32]) -> usize {
    trigger::rising_edge(buf)
}

fn channel_from(idx: u8) -> Channel {
    if idx == 0 { Channel::Left } else { Channel::Right }
}

/// WASM-exposed synth handle. Channels are addressed as 0 (left) and
/// 1 (right); tables and buffers cross the boundary as `Float32Array`.
#[wasm_bindgen]
pub struct WasmSynth {
    inner: Synth,
}

#[wasm_bindgen]
impl WasmSynth {
    /// Create a synth from an optional JSON config string.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmSynth, JsValue> {
        let inner = match config_json {
            Some(json) => Synth::from_json(&json).map_err(|e| JsValue::from_str(&format!("{e}")))?,
            None => Synth::new(SynthConfig::default()),
        };
        Ok(WasmSynth { inner })
    }

    #[wasm_bindgen(js_name = setControlPoint)]
    pub fn set_control_point(&mut self, channel: u8, index: usize, value: f64) {
        self.inner.set_control_point(channel_from(channel), index, value);
    }

    /// Overwrite the control table from `values`. Extra values are
    /// ignored; missing ones keep their current value. NaN reads as 0.
    #[wasm_bindgen(js_name = bulkSetFromCurve)]
    pub fn bulk_set_from_curve(&mut self, channel: u8, values: &[f32]) {
        let ch = channel_from(channel);
        let mut table = *self.inner.control_table(ch);
        for (dst, &v) in table.iter_mut().zip(values) {
            *dst = v as f64;
        }
        self.inner.bulk_set_from_curve(ch, &table);
    }

    #[wasm_bindgen(js_name = drawPadStroke)]
    pub fn draw_pad_stroke(&mut self, from_index: usize, from_value: f64, to_index: usize, to_value: f64) {
        self.inner
            .draw_pad_stroke((from_index, from_value), (to_index, to_value));
    }

    pub fn quantize(&mut self, steps: u32) {
        self.inner.quantize(steps);
    }

    /// Select "sine", "triangle" or "square". Returns false for unknown names.
    #[wasm_bindgen(js_name = selectDefaultWaveform)]
    pub fn select_default_waveform(&mut self, name: &str) -> bool {
        match DefaultWaveform::from_name(name) {
            Some(kind) => {
                self.inner.select_default_waveform(kind);
                true
            }
            None => {
                log::warn!("Unknown waveform '{name}'");
                false
            }
        }
    }

    /// Select by button index: 0=sine, 1=triangle, 2=square.
    #[wasm_bindgen(js_name = selectWaveformIndex)]
    pub fn select_waveform_index(&mut self, index: usize) -> bool {
        match DefaultWaveform::from_index(index) {
            Some(kind) => {
                self.inner.select_default_waveform(kind);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = setBaseFrequency)]
    pub fn set_base_frequency(&mut self, frequency: f64) {
        self.inner.set_base_frequency(frequency);
        self.inner.clear_last_note();
    }

    /// Apply a ratio and return the value in effect after snapping.
    #[wasm_bindgen(js_name = setRatio)]
    pub fn set_ratio(&mut self, ratio: f64) -> f64 {
        self.inner.set_ratio(ratio).ratio
    }

    /// Resample a drawn curve given as flat `[x0, y0, x1, y1, ...]`
    /// coordinates. Returns false if the curve was ignored.
    #[wasm_bindgen(js_name = resampleFromCurve)]
    pub fn resample_from_curve(&mut self, xy: &[f64]) -> bool {
        let points: Vec<Point> = xy.chunks_exact(2).map(|p| Point::new(p[0], p[1])).collect();
        self.inner.resample_from_curve(&points).is_ok()
    }

    #[wasm_bindgen(js_name = inCaptureRegion)]
    pub fn in_capture_region(&self, x: f64, y: f64) -> bool {
        self.inner.in_capture_region(Point::new(x, y))
    }

    #[wasm_bindgen(js_name = computeTrigger)]
    pub fn compute_trigger(&mut self, left: &[f32], right: &[f32], ratio: f64) -> usize {
        self.inner.compute_trigger(left, right, ratio)
    }

    /// Smooth and trigger at the current ratio. Returns
    /// `{ index, left, right }`.
    #[wasm_bindgen(js_name = scopeFrame)]
    pub fn scope_frame(&mut self, left: &[f32], right: &[f32]) -> Result<JsValue, JsValue> {
        let (index, left, right) = self.inner.scope_frame(left, right);
        let frame = ScopeFrame { index, left, right };
        serde_wasm_bindgen::to_value(&frame).map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    #[wasm_bindgen(js_name = quantizedTable)]
    pub fn quantized_table(&self, channel: u8) -> Vec<f32> {
        self.inner
            .quantized_table(channel_from(channel))
            .iter()
            .map(|&v| v as f32)
            .collect()
    }

    /// The `{ real, imag }` coefficients the channel is playing.
    pub fn spectrum(&self, channel: u8) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.spectrum(channel_from(channel)))
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Render `frames` stereo frames as interleaved L/R samples for an
    /// AudioWorklet.
    #[wasm_bindgen(js_name = renderStereo)]
    pub fn render_stereo(&mut self, frames: usize) -> Vec<f32> {
        let (left, right) = self.inner.render_stereo(frames);
        left.iter().zip(&right).flat_map(|(&l, &r)| [l, r]).collect()
    }

    #[wasm_bindgen(js_name = noteOn)]
    pub fn note_on(&mut self, midi: i32) {
        self.inner.note_on(midi);
    }

    /// Play a named note such as "C4". Returns false if it does not parse.
    #[wasm_bindgen(js_name = noteOnName)]
    pub fn note_on_name(&mut self, name: &str) -> bool {
        match note::note_to_midi(name) {
            Some(midi) => {
                self.inner.note_on(midi);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = changeOctave)]
    pub fn change_octave(&mut self, direction: i32) -> i32 {
        self.inner.change_octave(direction);
        self.inner.octave()
    }

    #[wasm_bindgen(js_name = pressNote)]
    pub fn press_note(&mut self, midi: i32) {
        self.inner.press_note(midi);
    }

    #[wasm_bindgen(js_name = releaseNote)]
    pub fn release_note(&mut self, midi: i32) {
        self.inner.release_note(midi);
    }

    #[wasm_bindgen(js_name = releaseAllNotes)]
    pub fn release_all_notes(&mut self) {
        self.inner.release_all_notes();
    }

    /// Advance the arpeggiator to `now_ms`; returns the note played, if any.
    pub fn tick(&mut self, now_ms: f64) -> Option<i32> {
        self.inner.tick(now_ms)
    }

    pub fn ratio(&self) -> f64 {
        self.inner.ratio()
    }

    #[wasm_bindgen(js_name = baseFrequency)]
    pub fn base_frequency(&self) -> f64 {
        self.inner.base_frequency()
    }

    #[wasm_bindgen(js_name = glitchSteps)]
    pub fn glitch_steps(&self) -> u32 {
        self.inner.glitch_steps()
    }

    /// "linked" or "independent".
    pub fn coupling(&self) -> String {
        match self.inner.coupling() {
            CouplingMode::Linked => "linked".to_string(),
            CouplingMode::Independent => "independent".to_string(),
        }
    }
}

#[derive(serde::Serialize)]
struct ScopeFrame {
    index: usize,
    left: Vec<f32>,
    right: Vec<f32>,
}
