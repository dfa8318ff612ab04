//! Pitch helpers: note names, MIDI numbers, and the log-scale frequency
//! slider.

/// Lowest frequency reachable from the slider.
pub const SLIDER_MIN_FREQ: f64 = 20.0;
/// Highest frequency reachable from the slider.
pub const SLIDER_MAX_FREQ: f64 = 5000.0;
/// Slider resolution: positions run `0..=SLIDER_STEPS`.
pub const SLIDER_STEPS: u32 = 1000;

/// Parse a note name (e.g. "C4", "F#3", "Bb5") into a MIDI note number.
pub fn note_to_midi(note: &str) -> Option<i32> {
    let bytes = note.as_bytes();
    let base = match *bytes.first()? as char {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let (semitone, idx) = match bytes.get(1).map(|&b| b as char) {
        Some('#') => (base + 1, 2),
        Some('b') => (base - 1, 2),
        _ => (base, 1),
    };

    let octave: i32 = note[idx..].parse().ok()?;
    // C4 = 60
    Some((octave + 1) * 12 + semitone)
}

/// Equal-tempered frequency of a MIDI note, A4 (69) = 440 Hz.
pub fn midi_to_frequency(midi: i32) -> f64 {
    440.0 * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

/// Map a slider position in `0..=1000` onto 20–5000 Hz, logarithmically.
pub fn slider_to_frequency(position: f64) -> f64 {
    let t = position.clamp(0.0, SLIDER_STEPS as f64) / SLIDER_STEPS as f64;
    let (lo, hi) = (SLIDER_MIN_FREQ.ln(), SLIDER_MAX_FREQ.ln());
    (lo + t * (hi - lo)).exp()
}

/// Inverse of [`slider_to_frequency`], rounded to a whole slider step.
pub fn frequency_to_slider(frequency: f64) -> u32 {
    let f = frequency.clamp(SLIDER_MIN_FREQ, SLIDER_MAX_FREQ);
    let (lo, hi) = (SLIDER_MIN_FREQ.ln(), SLIDER_MAX_FREQ.ln());
    ((f.ln() - lo) / (hi - lo) * SLIDER_STEPS as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names() {
        assert_eq!(note_to_midi("C4"), Some(60));
        assert_eq!(note_to_midi("A4"), Some(69));
        assert_eq!(note_to_midi("F#3"), Some(54));
        assert_eq!(note_to_midi("Bb5"), Some(82));
        assert_eq!(note_to_midi("C-1"), Some(0));
        assert_eq!(note_to_midi("H2"), None);
        assert_eq!(note_to_midi(""), None);
        assert_eq!(note_to_midi("C"), None);
    }

    #[test]
    fn a4_is_440() {
        assert!((midi_to_frequency(69) - 440.0).abs() < 1e-9);
        assert!((midi_to_frequency(81) - 880.0).abs() < 1e-9);
        assert!((midi_to_frequency(60) - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn slider_endpoints() {
        assert!((slider_to_frequency(0.0) - 20.0).abs() < 1e-9);
        assert!((slider_to_frequency(1000.0) - 5000.0).abs() < 1e-6);
        assert!((slider_to_frequency(-10.0) - 20.0).abs() < 1e-9);
        assert_eq!(frequency_to_slider(1.0), 0);
        assert_eq!(frequency_to_slider(99999.0), 1000);
    }

    #[test]
    fn slider_round_trips_440() {
        let pos = frequency_to_slider(440.0);
        let f = slider_to_frequency(pos as f64);
        // One slider step is about 0.55% in frequency.
        assert!((f - 440.0).abs() / 440.0 < 0.006, "got {f}");
    }
}
