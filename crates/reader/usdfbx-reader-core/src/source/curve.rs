//! Keyed animation curves evaluated at (fractional) frames.
//!
//! Model:
//! - Keys are ordered by frame; the interpolation of a key governs the segment that
//!   starts at it.
//! - Before the first key and after the last the curve holds the end value.
//! - Cubic segments are Hermite splines. A key without an explicit slope gets an
//!   automatic one from its neighbours (zero at the ends).

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Cubic,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub frame: f64,
    pub value: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Value change per frame leaving this key; automatic when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
}

impl CurveKey {
    pub fn new(frame: f64, value: f64, interpolation: Interpolation) -> Self {
        Self {
            frame,
            value,
            interpolation,
            slope: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct AnimCurve {
    keys: Vec<CurveKey>,
}

impl From<Vec<CurveKey>> for AnimCurve {
    fn from(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.frame.total_cmp(&b.frame));
        keys.dedup_by(|later, earlier| later.frame == earlier.frame);
        Self { keys }
    }
}

impl From<AnimCurve> for Vec<CurveKey> {
    fn from(curve: AnimCurve) -> Self {
        curve.keys
    }
}

impl AnimCurve {
    pub fn new(keys: Vec<CurveKey>) -> Self {
        keys.into()
    }

    /// A single-key curve holding `value` everywhere.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![CurveKey::new(0.0, value, Interpolation::Constant)])
    }

    /// Linear curve through `(frame, value)` points.
    pub fn linear(points: &[(f64, f64)]) -> Self {
        Self::new(
            points
                .iter()
                .map(|&(f, v)| CurveKey::new(f, v, Interpolation::Linear))
                .collect(),
        )
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn auto_slope(&self, i: usize) -> f64 {
        let n = self.keys.len();
        if i == 0 || i + 1 >= n {
            return 0.0;
        }
        let prev = &self.keys[i - 1];
        let next = &self.keys[i + 1];
        let span = next.frame - prev.frame;
        if span <= 0.0 {
            0.0
        } else {
            (next.value - prev.value) / span
        }
    }

    fn slope(&self, i: usize) -> f64 {
        self.keys[i].slope.unwrap_or_else(|| self.auto_slope(i))
    }

    /// Evaluate at `frame`. An empty curve evaluates to 0.
    pub fn evaluate(&self, frame: f64) -> f64 {
        let n = self.keys.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 || frame <= self.keys[0].frame {
            return self.keys[0].value;
        }
        if frame >= self.keys[n - 1].frame {
            return self.keys[n - 1].value;
        }
        // First key strictly after `frame`; the segment is [i0, i1].
        let i1 = self.keys.partition_point(|k| k.frame <= frame);
        let i0 = i1 - 1;
        let left = &self.keys[i0];
        let right = &self.keys[i1];
        let span = (right.frame - left.frame).max(f64::EPSILON);
        let t = ((frame - left.frame) / span).clamp(0.0, 1.0);
        match left.interpolation {
            Interpolation::Constant => left.value,
            Interpolation::Linear => left.value + (right.value - left.value) * t,
            Interpolation::Cubic => {
                let m0 = self.slope(i0) * span;
                let m1 = self.slope(i1) * span;
                let t2 = t * t;
                let t3 = t2 * t;
                (2.0 * t3 - 3.0 * t2 + 1.0) * left.value
                    + (t3 - 2.0 * t2 + t) * m0
                    + (-2.0 * t3 + 3.0 * t2) * right.value
                    + (t3 - t2) * m1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_outside_keyed_range() {
        let c = AnimCurve::linear(&[(5.0, 1.0), (10.0, 2.0)]);
        assert_eq!(c.evaluate(0.0), 1.0);
        assert_eq!(c.evaluate(20.0), 2.0);
        assert!((c.evaluate(7.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn constant_segments_step() {
        let c = AnimCurve::new(vec![
            CurveKey::new(0.0, 1.0, Interpolation::Constant),
            CurveKey::new(10.0, 3.0, Interpolation::Constant),
        ]);
        assert_eq!(c.evaluate(9.99), 1.0);
        assert_eq!(c.evaluate(10.0), 3.0);
    }

    #[test]
    fn cubic_passes_through_keys_and_eases() {
        let c = AnimCurve::new(vec![
            CurveKey::new(0.0, 0.0, Interpolation::Cubic),
            CurveKey::new(10.0, 10.0, Interpolation::Cubic),
        ]);
        assert_eq!(c.evaluate(0.0), 0.0);
        assert_eq!(c.evaluate(10.0), 10.0);
        // Flat end slopes: symmetric ease, midpoint exact, quarter point below linear.
        assert!((c.evaluate(5.0) - 5.0).abs() < 1e-9);
        assert!(c.evaluate(2.5) < 2.5);
    }

    #[test]
    fn keys_are_sorted_on_construction() {
        let c = AnimCurve::linear(&[(10.0, 1.0), (0.0, 0.0)]);
        assert_eq!(c.keys()[0].frame, 0.0);
        assert!((c.evaluate(5.0) - 0.5).abs() < 1e-12);
        assert_eq!(AnimCurve::default().evaluate(3.0), 0.0);
    }
}
