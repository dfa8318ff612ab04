//! Curve resampler: turns a hand-drawn XY path into a wavetable pair.
//!
//! The path is parameterized by arclength so the pen speed of the gesture
//! does not matter: each of the `TABLE_SIZE` output samples sits at an
//! equal distance along the curve.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;

use super::wavetable::{TABLE_SIZE, WaveTable};

/// A point in host (UI) coordinates; y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// The on-screen rectangle a curve is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CaptureRegion {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Map a UI point into [-1, 1]², each axis on its own, clamped.
    /// Left/top edges map to -1, right/bottom edges to +1.
    pub fn normalize(&self, p: Point) -> Point {
        Point {
            x: map_clamped(p.x, self.x, self.width),
            y: map_clamped(p.y, self.y, self.height),
        }
    }
}

impl Default for CaptureRegion {
    fn default() -> Self {
        CaptureRegion {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

fn map_clamped(v: f64, start: f64, span: f64) -> f64 {
    if span <= 0.0 || !v.is_finite() {
        return 0.0;
    }
    ((v - start) / span * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// Equal-arclength samples of a normalized curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledCurve {
    pub x: WaveTable,
    pub y: WaveTable,
}

impl ResampledCurve {
    /// The left channel plays the X trace directly.
    pub fn left_table(&self) -> WaveTable {
        self.x
    }

    /// The right channel plays the inverted Y trace, time-warped by the
    /// nearest-integer ratio. Slots the warp never reaches keep their
    /// value from `previous`.
    pub fn right_table(&self, ratio: f64, previous: &WaveTable) -> WaveTable {
        let warp = ratio.round().max(0.0) as usize;
        let mut out = *previous;
        for (s, &y) in self.y.iter().enumerate() {
            out[(s * warp) % TABLE_SIZE] = -y;
        }
        out
    }
}

/// Resample `points` to exactly `TABLE_SIZE` samples per axis.
///
/// Fewer than two points, or a path of zero length, is rejected without
/// producing anything.
pub fn resample(points: &[Point], region: &CaptureRegion) -> Result<ResampledCurve, CurveError> {
    if points.len() < 2 {
        return Err(CurveError::TooFewPoints {
            count: points.len(),
        });
    }

    let norm: Vec<Point> = points.iter().map(|&p| region.normalize(p)).collect();
    let segments: Vec<f64> = norm.windows(2).map(|w| w[0].distance(w[1])).collect();
    let total: f64 = segments.iter().sum();
    if total <= 0.0 {
        return Err(CurveError::ZeroLength);
    }

    let step = total / (TABLE_SIZE - 1) as f64;
    let mut x = [0.0; TABLE_SIZE];
    let mut y = [0.0; TABLE_SIZE];

    // `seg` indexes the segment from norm[seg] to norm[seg + 1];
    // `acc` is the arclength at its start.
    let mut seg = 0;
    let mut acc = 0.0;
    for s in 0..TABLE_SIZE {
        let target = s as f64 * step;
        while seg + 1 < segments.len() && acc + segments[seg] < target {
            acc += segments[seg];
            seg += 1;
        }
        let len = segments[seg];
        let t = if len > 0.0 {
            ((target - acc) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let p = norm[seg].lerp(norm[seg + 1], t);
        x[s] = p.x;
        y[s] = p.y;
    }

    Ok(ResampledCurve { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> CaptureRegion {
        CaptureRegion {
            x: 100.0,
            y: 50.0,
            width: 200.0,
            height: 200.0,
        }
    }

    #[test]
    fn normalize_maps_edges_and_clamps() {
        let r = region();
        assert_eq!(r.normalize(Point::new(100.0, 50.0)), Point::new(-1.0, -1.0));
        assert_eq!(r.normalize(Point::new(300.0, 250.0)), Point::new(1.0, 1.0));
        assert_eq!(r.normalize(Point::new(200.0, 150.0)), Point::new(0.0, 0.0));
        assert_eq!(r.normalize(Point::new(-50.0, 900.0)), Point::new(-1.0, 1.0));
    }

    #[test]
    fn contains_checks_bounds() {
        let r = region();
        assert!(r.contains(Point::new(150.0, 60.0)));
        assert!(!r.contains(Point::new(99.0, 60.0)));
    }

    #[test]
    fn too_few_points_is_rejected() {
        assert_eq!(
            resample(&[], &region()),
            Err(CurveError::TooFewPoints { count: 0 })
        );
        assert_eq!(
            resample(&[Point::new(150.0, 150.0)], &region()),
            Err(CurveError::TooFewPoints { count: 1 })
        );
    }

    #[test]
    fn zero_length_is_rejected() {
        let p = Point::new(150.0, 150.0);
        assert_eq!(resample(&[p, p, p], &region()), Err(CurveError::ZeroLength));
    }

    #[test]
    fn straight_line_is_evenly_spaced() {
        // Horizontal stroke across the full width, through the middle.
        let pts = [Point::new(100.0, 150.0), Point::new(300.0, 150.0)];
        let curve = resample(&pts, &region()).unwrap();
        assert_eq!(curve.x.len(), TABLE_SIZE);
        for s in 0..TABLE_SIZE {
            let expected = -1.0 + 2.0 * s as f64 / (TABLE_SIZE - 1) as f64;
            assert!((curve.x[s] - expected).abs() < 1e-9, "x[{s}] = {}", curve.x[s]);
            assert!(curve.y[s].abs() < 1e-12);
        }
    }

    #[test]
    fn pen_speed_does_not_matter() {
        // Same L-shaped path, one drawn with many points on the first leg.
        let sparse = [
            Point::new(100.0, 50.0),
            Point::new(300.0, 50.0),
            Point::new(300.0, 250.0),
        ];
        let mut dense = vec![Point::new(100.0, 50.0)];
        for i in 1..=20 {
            dense.push(Point::new(100.0 + 10.0 * i as f64, 50.0));
        }
        dense.push(Point::new(300.0, 250.0));

        let a = resample(&sparse, &region()).unwrap();
        let b = resample(&dense, &region()).unwrap();
        for s in 0..TABLE_SIZE {
            assert!((a.x[s] - b.x[s]).abs() < 1e-9);
            assert!((a.y[s] - b.y[s]).abs() < 1e-9);
        }
    }

    #[test]
    fn duplicate_points_do_not_produce_nan() {
        let pts = [
            Point::new(100.0, 50.0),
            Point::new(100.0, 50.0),
            Point::new(300.0, 250.0),
            Point::new(300.0, 250.0),
        ];
        let curve = resample(&pts, &region()).unwrap();
        assert!(curve.x.iter().chain(curve.y.iter()).all(|v| v.is_finite()));
        assert_eq!(curve.x[0], -1.0);
        assert_eq!(curve.x[TABLE_SIZE - 1], 1.0);
    }

    #[test]
    fn resampling_is_deterministic() {
        let pts: Vec<Point> = (0..37)
            .map(|i| {
                let a = i as f64 * 0.3;
                Point::new(200.0 + 80.0 * a.cos(), 150.0 + 60.0 * (2.0 * a).sin())
            })
            .collect();
        assert_eq!(resample(&pts, &region()), resample(&pts, &region()));
    }

    #[test]
    fn right_table_inverts_y() {
        let pts = [Point::new(100.0, 50.0), Point::new(300.0, 250.0)];
        let curve = resample(&pts, &region()).unwrap();
        let right = curve.right_table(1.0, &[0.0; TABLE_SIZE]);
        for s in 0..TABLE_SIZE {
            assert_eq!(right[s], -curve.y[s]);
        }
    }

    #[test]
    fn right_table_warps_by_integer_ratio() {
        let pts = [Point::new(100.0, 50.0), Point::new(300.0, 250.0)];
        let curve = resample(&pts, &region()).unwrap();
        let previous = [0.75; TABLE_SIZE];
        let right = curve.right_table(2.2, &previous);

        // Sample s lands at 2s mod N; the later lap wins.
        for s in TABLE_SIZE / 2..TABLE_SIZE {
            assert_eq!(right[(2 * s) % TABLE_SIZE], -curve.y[s]);
        }
        // Odd slots are never written.
        for i in (1..TABLE_SIZE).step_by(2) {
            assert_eq!(right[i], 0.75);
        }
    }
}
