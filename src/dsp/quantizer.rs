//! Glitch quantizer: step-reduces a control table.

use super::wavetable::WaveTable;

/// Coarsest allowed resolution.
pub const MIN_STEPS: u32 = 4;
/// Finest allowed resolution (one step per table slot).
pub const MAX_STEPS: u32 = 64;

/// Clamp a requested step count into `[MIN_STEPS, MAX_STEPS]`.
pub fn clamp_steps(steps: u32) -> u32 {
    steps.clamp(MIN_STEPS, MAX_STEPS)
}

/// Quantization step `q = 2 / steps` for a (clamped) step count.
pub fn step_size(steps: u32) -> f64 {
    2.0 / clamp_steps(steps) as f64
}

/// Snap every sample to the nearest multiple of `2 / steps`.
///
/// Pure and idempotent: quantizing an already-quantized table with the
/// same `steps` returns it unchanged. Values are not re-clamped to [-1, 1],
/// so step counts that do not divide 2 evenly can overshoot by less than
/// half a step.
pub fn quantize(table: &WaveTable, steps: u32) -> WaveTable {
    let q = step_size(steps);
    let mut out = [0.0; super::wavetable::TABLE_SIZE];
    for (dst, &src) in out.iter_mut().zip(table.iter()) {
        *dst = (src / q).round() * q;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::wavetable::DefaultWaveform;

    #[test]
    fn steps_are_clamped() {
        assert_eq!(clamp_steps(0), 4);
        assert_eq!(clamp_steps(3), 4);
        assert_eq!(clamp_steps(17), 17);
        assert_eq!(clamp_steps(1000), 64);
    }

    #[test]
    fn quantize_is_idempotent() {
        let sine = DefaultWaveform::Sine.table();
        for steps in MIN_STEPS..=MAX_STEPS {
            let once = quantize(&sine, steps);
            let twice = quantize(&once, steps);
            for i in 0..once.len() {
                assert!(
                    (once[i] - twice[i]).abs() < 1e-12,
                    "steps={steps} index={i}: {} vs {}",
                    once[i],
                    twice[i]
                );
            }
        }
    }

    #[test]
    fn quantize_error_is_bounded() {
        let tri = DefaultWaveform::Triangle.table();
        for steps in MIN_STEPS..=MAX_STEPS {
            let q = step_size(steps);
            let out = quantize(&tri, steps);
            for i in 0..out.len() {
                assert!(
                    (out[i] - tri[i]).abs() <= q / 2.0 + 1e-9,
                    "steps={steps} index={i} exceeded half a step"
                );
            }
        }
    }

    #[test]
    fn four_steps_uses_five_levels() {
        let out = quantize(&DefaultWaveform::Sine.table(), 4);
        let levels = [-1.0, -0.5, 0.0, 0.5, 1.0];
        for &v in out.iter() {
            assert!(
                levels.iter().any(|&l| (v - l).abs() < 1e-12),
                "Unexpected level {v}"
            );
        }
    }

    #[test]
    fn out_of_range_steps_match_clamped() {
        let sine = DefaultWaveform::Sine.table();
        assert_eq!(quantize(&sine, 1), quantize(&sine, 4));
        assert_eq!(quantize(&sine, 500), quantize(&sine, 64));
    }
}
