//! Wavetable store: control and quantized tables for both channels.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::quantizer;

/// Samples per table (one signal period).
pub const TABLE_SIZE: usize = 64;

/// One period of a waveform.
pub type WaveTable = [f64; TABLE_SIZE];

/// Output channel. Left drives the X axis, Right the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub const BOTH: [Channel; 2] = [Channel::Left, Channel::Right];

    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// How the two channels share waveform data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouplingMode {
    /// Right mirrors Left.
    Linked,
    /// Each channel carries its own table (after an XY drawing).
    Independent,
}

/// Built-in waveforms selectable from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultWaveform {
    Sine,
    Triangle,
    Square,
}

impl DefaultWaveform {
    /// Parse a waveform name. Unknown names yield `None`.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "sine" => Some(DefaultWaveform::Sine),
            "triangle" | "tri" => Some(DefaultWaveform::Triangle),
            "square" => Some(DefaultWaveform::Square),
            _ => None,
        }
    }

    /// Button order used by the host UI: 0=sine, 1=triangle, 2=square.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(DefaultWaveform::Sine),
            1 => Some(DefaultWaveform::Triangle),
            2 => Some(DefaultWaveform::Square),
            _ => None,
        }
    }

    /// Generate the table. `t` spans [0, 1] inclusive across the table,
    /// so the first and last samples coincide for the sine.
    pub fn table(self) -> WaveTable {
        let mut table = [0.0; TABLE_SIZE];
        for (i, v) in table.iter_mut().enumerate() {
            let t = i as f64 / (TABLE_SIZE - 1) as f64;
            *v = match self {
                DefaultWaveform::Sine => (2.0 * PI * t).sin(),
                DefaultWaveform::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
                DefaultWaveform::Square => {
                    if t < 0.5 {
                        1.0
                    } else {
                        -1.0
                    }
                }
            };
        }
        table
    }
}

/// Per-channel control tables and their quantized ("glitch") copies.
#[derive(Debug, Clone)]
pub struct WavetableStore {
    control: [WaveTable; 2],
    quantized: [WaveTable; 2],
    dirty: [bool; 2],
}

impl WavetableStore {
    /// Both channels start as an unquantized sine.
    pub fn new() -> Self {
        let sine = DefaultWaveform::Sine.table();
        WavetableStore {
            control: [sine; 2],
            quantized: [sine; 2],
            dirty: [true; 2],
        }
    }

    pub fn control(&self, channel: Channel) -> &WaveTable {
        &self.control[channel.index()]
    }

    pub fn quantized(&self, channel: Channel) -> &WaveTable {
        &self.quantized[channel.index()]
    }

    /// Whether the control table changed since the last `quantize`.
    pub fn is_dirty(&self, channel: Channel) -> bool {
        self.dirty[channel.index()]
    }

    /// Write a single control point. Index and value clamp silently.
    pub fn set_control_point(&mut self, channel: Channel, index: usize, value: f64) {
        let idx = index.min(TABLE_SIZE - 1);
        let ch = channel.index();
        self.control[ch][idx] = sanitize(value);
        self.dirty[ch] = true;
    }

    /// Replace a whole control table. Values clamp like single points.
    pub fn bulk_set_from_curve(&mut self, channel: Channel, table: &WaveTable) {
        let ch = channel.index();
        for (dst, &v) in self.control[ch].iter_mut().zip(table) {
            *dst = sanitize(v);
        }
        self.dirty[ch] = true;
    }

    /// Recompute the quantized table for `channel`.
    pub fn quantize(&mut self, channel: Channel, steps: u32) {
        let ch = channel.index();
        self.quantized[ch] = quantizer::quantize(&self.control[ch], steps);
        self.dirty[ch] = false;
    }

    /// Load a built-in waveform into both channels.
    pub fn load_default(&mut self, kind: DefaultWaveform) {
        let table = kind.table();
        for ch in Channel::BOTH {
            self.bulk_set_from_curve(ch, &table);
        }
    }

    /// Copy the left control table into the right channel.
    pub fn mirror_left(&mut self) {
        let left = self.control[0];
        self.bulk_set_from_curve(Channel::Right, &left);
    }
}

/// NaN becomes silence; everything else clamps into [-1, 1].
fn sanitize(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) }
}

impl Default for WavetableStore {
    fn default() -> Self {
        Self::new()
    }
}
