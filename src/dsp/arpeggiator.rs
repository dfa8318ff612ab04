//! Up-mode arpeggiator stepping through held notes at a fixed tempo.
//!
//! The host calls [`Arpeggiator::tick`] once per frame with its clock; the
//! arpeggiator answers with a note whenever a step is due.

/// Steps through held MIDI notes in press order.
#[derive(Debug, Clone)]
pub struct Arpeggiator {
    held: Vec<i32>,
    index: usize,
    step_ms: f64,
    last_step_ms: Option<f64>,
}

impl Arpeggiator {
    /// `division` steps per beat at `bpm`.
    pub fn new(bpm: f64, division: u32) -> Self {
        let bpm = if bpm.is_finite() { bpm.max(1.0) } else { 120.0 };
        Arpeggiator {
            held: Vec::new(),
            index: 0,
            step_ms: 60_000.0 / bpm / division.max(1) as f64,
            last_step_ms: None,
        }
    }

    /// Milliseconds between steps.
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    pub fn held(&self) -> &[i32] {
        &self.held
    }

    /// Add a note. Re-pressing a held note is ignored. Restarts the pattern.
    pub fn press(&mut self, midi: i32) {
        if !self.held.contains(&midi) {
            self.held.push(midi);
            self.index = 0;
        }
    }

    /// Remove a note. Restarts the pattern.
    pub fn release(&mut self, midi: i32) {
        if let Some(pos) = self.held.iter().position(|&n| n == midi) {
            self.held.remove(pos);
            self.index = 0;
        }
    }

    pub fn release_all(&mut self) {
        self.held.clear();
        self.index = 0;
    }

    /// Advance the clock. Returns the note to play if a step is due.
    pub fn tick(&mut self, now_ms: f64) -> Option<i32> {
        if self.held.is_empty() {
            return None;
        }
        let due = match self.last_step_ms {
            Some(last) => now_ms - last >= self.step_ms,
            None => true,
        };
        if !due {
            return None;
        }
        let note = self.held[self.index % self.held.len()];
        self.index = (self.index + 1) % self.held.len();
        self.last_step_ms = Some(now_ms);
        Some(note)
    }
}
