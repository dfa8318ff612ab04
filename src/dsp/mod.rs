//! DSP core: wavetables, harmonic analysis, the oscillator pair and the
//! scope trigger.
//!
//! Everything here is synchronous and bounded by the table size or the
//! analysis window length, so it is safe to call from a render tick.

pub mod arpeggiator;
pub mod engine;
pub mod note;
pub mod oscillator;
pub mod quantizer;
pub mod resampler;
pub mod spectrum;
pub mod trigger;
pub mod wavetable;
