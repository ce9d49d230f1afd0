//! Frame-range sampling of curve-bound properties and per-frame value functions.
//!
//! Model:
//! - A `FrameRange` is inclusive on both ends; every integer frame is visited once, in order.
//! - Nothing is sampled without an active animation layer.
//! - Curve sampling collects all channels of a property per frame (unbound channels read as
//!   0) and runs them through the channel mapper, so samples share the default's type.
//! - Equal consecutive samples are kept; collapsing is the caller's decision.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use usdfbx_api_core::Value;

use crate::convert::map_channels;
use crate::ids::AnimLayerId;
use crate::source::SourceProperty;

/// Ordered `(time, value)` pairs.
pub type TimeSamples = Vec<(f64, Value)>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl Default for FrameRange {
    fn default() -> Self {
        Self { start: 0, end: 0 }
    }
}

impl FrameRange {
    /// Inclusive range; swapped bounds are reordered.
    pub fn new(start: i64, end: i64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn frames(&self) -> RangeInclusive<i64> {
        self.start.min(self.end)..=self.end.max(self.start)
    }

    /// Frame count, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        usize::try_from(self.end.abs_diff(self.start))
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }

    /// A range always holds at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Sample `prop`'s curves on `layer` at every frame of `range`.
///
/// Empty when there is no layer, the property has no curve node on it, or no channel
/// of that node carries a curve.
pub fn sample_property(
    prop: &SourceProperty,
    layer: Option<AnimLayerId>,
    range: FrameRange,
) -> TimeSamples {
    let Some(layer) = layer else {
        return Vec::new();
    };
    if !prop.is_animated(layer) {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(range.len());
    for frame in range.frames() {
        let t = frame as f64;
        if let Some(channels) = prop.curve_channels(layer, t) {
            out.push((t, map_channels(prop.ty, &channels).value));
        }
    }
    out
}

/// Evaluate `f` at every frame of `range`. Empty when there is no layer.
pub fn sample_with<F>(layer: Option<AnimLayerId>, range: FrameRange, mut f: F) -> TimeSamples
where
    F: FnMut(f64) -> Value,
{
    if layer.is_none() {
        return Vec::new();
    }
    range
        .frames()
        .map(|frame| {
            let t = frame as f64;
            (t, f(t))
        })
        .collect()
}

/// Whether every sample equals the first one.
pub fn is_constant(samples: &[(f64, Value)]) -> bool {
    match samples.split_first() {
        Some(((_, first), rest)) => rest.iter().all(|(_, v)| v == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AnimCurve, SourceType, SourceValue};

    #[test]
    fn range_length_counts_both_ends() {
        assert_eq!(FrameRange::default().len(), 1);
        assert_eq!(FrameRange::new(9, 5).len(), 5);
        assert_eq!(FrameRange::new(-2, 2).len(), 5);
        let wide = FrameRange::new(i32::MIN as i64, i32::MAX as i64);
        assert_eq!(wide.len() as u64, (u32::MAX as u64 + 1).min(usize::MAX as u64));
        assert_eq!(FrameRange::new(i64::MIN, i64::MAX).len(), usize::MAX);
        let unordered = FrameRange { start: 3, end: -3 };
        assert_eq!(unordered.len(), 7);
    }

    #[test]
    fn constant_curve_yields_one_sample_per_frame() {
        let layer = AnimLayerId(0);
        let prop = SourceProperty::new("w", SourceType::Double, SourceValue::Number(0.0))
            .with_curve(layer, 0, AnimCurve::constant(2.5));
        let samples = sample_property(&prop, Some(layer), FrameRange::new(0, 10));
        assert_eq!(samples.len(), 11);
        assert!(samples.iter().all(|(_, v)| *v == Value::Double(2.5)));
        assert!(is_constant(&samples));
        let times: Vec<f64> = samples.iter().map(|(t, _)| *t).collect();
        assert_eq!(times.first(), Some(&0.0));
        assert_eq!(times.last(), Some(&10.0));
    }

    #[test]
    fn missing_layer_or_curves_is_empty() {
        let layer = AnimLayerId(0);
        let prop = SourceProperty::new("w", SourceType::Double, SourceValue::Number(1.0));
        assert!(sample_property(&prop, Some(layer), FrameRange::new(0, 3)).is_empty());
        let animated = prop.with_curve(layer, 0, AnimCurve::constant(1.0));
        assert!(sample_property(&animated, None, FrameRange::new(0, 3)).is_empty());
        assert!(sample_property(&animated, Some(AnimLayerId(1)), FrameRange::new(0, 3)).is_empty());
        assert!(sample_with(None, FrameRange::new(0, 3), Value::Double).is_empty());
    }

    #[test]
    fn unbound_channels_read_zero() {
        let layer = AnimLayerId(0);
        let prop = SourceProperty::new(
            "offset",
            SourceType::Double3,
            SourceValue::Numbers(vec![5.0, 5.0, 5.0]),
        )
        .with_curve(layer, 2, AnimCurve::linear(&[(0.0, 0.0), (2.0, 2.0)]));
        let samples = sample_property(&prop, Some(layer), FrameRange::new(0, 2));
        assert_eq!(samples[1], (1.0, Value::Double3([0.0, 0.0, 1.0])));
    }

    #[test]
    fn value_function_visits_every_frame() {
        let samples = sample_with(Some(AnimLayerId(0)), FrameRange::new(3, 5), |t| {
            Value::Float(t as f32)
        });
        assert_eq!(
            samples,
            vec![
                (3.0, Value::Float(3.0)),
                (4.0, Value::Float(4.0)),
                (5.0, Value::Float(5.0))
            ]
        );
        assert!(!is_constant(&samples));
    }
}
