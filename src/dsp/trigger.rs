//! Oscilloscope trigger: picks a render start offset inside a live
//! analysis window so the drawn waveform holds still between frames.
//!
//! Three strategies, chosen purely from the frequency ratio:
//!
//! - **Synchronized** (ratio ≈ 1): both channels share one period, so pick
//!   the rising zero crossing where the channels agree best.
//! - **Periodic** (ratio ≈ n > 1): plain zero crossing is ambiguous across
//!   sub-periods; score left crossings by their correlation one period on.
//! - **PhaseTracking** (anything else): no exact period fits the window,
//!   so smooth the inter-channel phase over recent frames and search near
//!   the prediction.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use log::debug;

/// Distance from an integer within which a ratio counts as that integer.
pub const INTEGER_TOLERANCE: f64 = 0.01;
/// Phase estimates kept for smoothing.
pub const HISTORY_CAPACITY: usize = 10;
/// Upper bound on the phase history length.
pub const MAX_HISTORY_CAPACITY: usize = 1024;

/// Trigger strategy for a given ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerStrategy {
    Synchronized,
    Periodic { multiple: usize },
    PhaseTracking,
}

impl TriggerStrategy {
    pub fn classify(ratio: f64) -> Self {
        let nearest = ratio.round();
        if !ratio.is_finite() || (ratio - nearest).abs() >= INTEGER_TOLERANCE || nearest < 1.0 {
            TriggerStrategy::PhaseTracking
        } else if nearest == 1.0 {
            TriggerStrategy::Synchronized
        } else {
            TriggerStrategy::Periodic {
                multiple: nearest as usize,
            }
        }
    }
}

/// Negative-to-non-negative transition arriving at `i`.
fn rising_at(buf: &[f32], i: usize) -> bool {
    i > 0 && i < buf.len() && buf[i - 1] < 0.0 && buf[i] >= 0.0
}

/// First index of the maximum sample.
fn peak_index(buf: &[f32]) -> usize {
    let mut best = 0;
    let mut best_val = f32::NEG_INFINITY;
    for (i, &v) in buf.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best = i;
        }
    }
    best
}

/// Rising crossing in either channel with the smallest `|L - R|`.
/// Returns 0 when neither channel crosses.
pub fn synchronized_trigger(left: &[f32], right: &[f32]) -> usize {
    let n = left.len().min(right.len());
    let mut best = 0;
    let mut best_diff = f32::INFINITY;
    for i in 1..n {
        if rising_at(left, i) || rising_at(right, i) {
            let diff = (left[i] - right[i]).abs();
            if diff < best_diff {
                best_diff = diff;
                best = i;
            }
        }
    }
    best
}

/// Left-channel crossing within the first sub-period whose continuation
/// best matches the next sub-period. Returns 0 when none is found.
pub fn periodic_trigger(left: &[f32], multiple: usize) -> usize {
    let n = left.len();
    if n == 0 || multiple == 0 {
        return 0;
    }
    let period = n / multiple;

    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for i in 1..period {
        if !rising_at(left, i) {
            continue;
        }
        let overlap = period.min(n - i);
        let score: f64 = (0..overlap)
            .map(|j| left[i + j] as f64 * left[(i + period + j) % n] as f64)
            .sum();
        if score > best_score {
            best_score = score;
            best = i;
        }
    }
    best
}

/// Running estimate of the inter-channel phase offset.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    history: VecDeque<f64>,
    capacity: usize,
}

impl PhaseTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY_CAPACITY);
        PhaseTracker {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Mean of the stored estimates, in radians.
    pub fn smoothed_phase(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    fn push(&mut self, phase: f64) {
        self.history.push_back(phase);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// Record this frame's peak offset and return the predicted trigger,
    /// snapped to the nearest left crossing within a quarter window.
    pub fn trigger(&mut self, left: &[f32], right: &[f32]) -> usize {
        let n = left.len().min(right.len());
        if n == 0 {
            return 0;
        }
        let nf = n as f64;

        let peak_l = peak_index(&left[..n]);
        let peak_r = peak_index(&right[..n]);
        self.push((peak_r as f64 - peak_l as f64) / nf * TAU);

        let predicted = (peak_l as f64 + self.smoothed_phase() / TAU * nf).rem_euclid(nf);

        let quarter = (n / 4) as i64;
        let mut best = (predicted.round() as usize) % n;
        let mut best_dist = i64::MAX;
        for offset in -quarter..=quarter {
            let i = ((predicted + offset as f64).rem_euclid(nf).round() as usize) % n;
            if rising_at(left, i) && offset.abs() < best_dist {
                best_dist = offset.abs();
                best = i;
            }
        }
        best
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

/// Strategy dispatcher holding the phase history between frames.
#[derive(Debug, Clone, Default)]
pub struct TriggerEngine {
    tracker: PhaseTracker,
    last_strategy: Option<TriggerStrategy>,
}

impl TriggerEngine {
    pub fn new(history_capacity: usize) -> Self {
        TriggerEngine {
            tracker: PhaseTracker::new(history_capacity),
            last_strategy: None,
        }
    }

    pub fn tracker(&self) -> &PhaseTracker {
        &self.tracker
    }

    pub fn last_strategy(&self) -> Option<TriggerStrategy> {
        self.last_strategy
    }

    /// Drop the phase history, e.g. once both channels restart in phase.
    pub fn clear_history(&mut self) {
        self.tracker.clear();
    }

    /// Start offset for rendering `left`/`right`, always in
    /// `[0, left.len())` (0 for an empty window).
    pub fn compute(&mut self, left: &[f32], right: &[f32], ratio: f64) -> usize {
        let strategy = TriggerStrategy::classify(ratio);
        if self.last_strategy != Some(strategy) {
            debug!("Trigger strategy -> {strategy:?}");
            self.last_strategy = Some(strategy);
        }

        let idx = match strategy {
            TriggerStrategy::Synchronized => synchronized_trigger(left, right),
            TriggerStrategy::Periodic { multiple } => periodic_trigger(left, multiple),
            TriggerStrategy::PhaseTracking => self.tracker.trigger(left, right),
        };
        if idx < left.len() { idx } else { 0 }
    }
}

/// Single-channel fallback: walk back from the peak to the nearest rising
/// crossing, wrapping around the window. Returns 0 if there is none.
pub fn rising_edge(buf: &[f32]) -> usize {
    let n = buf.len();
    if n == 0 {
        return 0;
    }
    let peak = peak_index(buf);
    for offset in 0..n {
        let i = (peak + n - offset) % n;
        let prev = (i + n - 1) % n;
        if buf[prev] < 0.0 && buf[i] >= 0.0 {
            return i;
        }
    }
    0
}

/// Circular moving average over `window` samples (odd sizes centre
/// exactly; even sizes round down to the next odd one).
pub fn smooth_waveform(buf: &[f32], window: usize) -> Vec<f32> {
    let n = buf.len();
    let half = window / 2;
    let count = (2 * half + 1) as f32;
    (0..n)
        .map(|i| {
            let sum: f32 = (0..=2 * half)
                .map(|k| buf[(i + n * (half / n + 1) + k - half) % n])
                .sum();
            sum / count
        })
        .collect()
}
