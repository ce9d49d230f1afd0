//! Named, typed node properties and their per-layer curve bindings.

use serde::{Deserialize, Serialize};

use super::curve::AnimCurve;
use crate::ids::AnimLayerId;

/// Well-known property names and the values they take when a node does not carry them.
pub mod names {
    pub const LCL_TRANSLATION: &str = "Lcl Translation";
    pub const LCL_ROTATION: &str = "Lcl Rotation";
    pub const LCL_SCALING: &str = "Lcl Scaling";
    pub const ROTATION_PIVOT: &str = "RotationPivot";
    pub const VISIBILITY: &str = "Visibility";
    pub const FOCAL_LENGTH: &str = "FocalLength";
    pub const FOCUS_DISTANCE: &str = "FocusDistance";
    pub const FIELD_OF_VIEW: &str = "FieldOfView";

    /// Fallback channels for a well-known property, `[0.0]` for anything else.
    pub fn fallback(name: &str) -> Vec<f64> {
        match name {
            LCL_TRANSLATION | LCL_ROTATION | ROTATION_PIVOT => vec![0.0; 3],
            LCL_SCALING => vec![1.0; 3],
            VISIBILITY => vec![1.0],
            FOCAL_LENGTH => vec![34.89327],
            FOCUS_DISTANCE => vec![200.0],
            FIELD_OF_VIEW => vec![25.114999],
            _ => vec![0.0],
        }
    }
}

/// Source-side data type tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    Bool,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    LongLong,
    ULongLong,
    HalfFloat,
    Float,
    Double,
    Double2,
    Double3,
    Double4,
    Double4x4,
    Enum,
    String,
    /// Carried as a frame count.
    Time,
    Reference,
    Blob,
    Distance,
    DateTime,
    Undefined,
}

impl SourceType {
    /// Number of float channels an animation curve node of this type carries.
    pub fn channel_count(self) -> usize {
        match self {
            SourceType::Double2 => 2,
            SourceType::Double3 => 3,
            SourceType::Double4 => 4,
            SourceType::Double4x4 => 16,
            _ => 1,
        }
    }
}

/// Default value of a source property.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceValue {
    #[default]
    None,
    Bool(bool),
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
}

impl SourceValue {
    /// First numeric component; booleans read as 0/1, text and none as 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            SourceValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            SourceValue::Number(n) => *n,
            SourceValue::Numbers(v) => v.first().copied().unwrap_or(0.0),
            SourceValue::None | SourceValue::Text(_) => 0.0,
        }
    }

    /// Exactly `n` numeric components, zero-padded.
    pub fn components(&self, n: usize) -> Vec<f64> {
        let mut out = match self {
            SourceValue::Numbers(v) => v.iter().copied().take(n).collect(),
            SourceValue::None | SourceValue::Text(_) => Vec::new(),
            other => vec![other.as_f64()],
        };
        out.resize(n, 0.0);
        out
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SourceValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Curves binding one property on one animation layer, one optional curve per channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    pub layer: AnimLayerId,
    pub channels: Vec<Option<AnimCurve>>,
}

impl CurveNode {
    pub fn has_curves(&self) -> bool {
        self.channels.iter().any(Option::is_some)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SourceType,
    #[serde(default)]
    pub user_defined: bool,
    #[serde(default)]
    pub value: SourceValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curve_nodes: Vec<CurveNode>,
}

impl SourceProperty {
    pub fn new(name: impl Into<String>, ty: SourceType, value: SourceValue) -> Self {
        Self {
            name: name.into(),
            ty,
            user_defined: false,
            value,
            curve_nodes: Vec::new(),
        }
    }

    /// A user-defined property.
    pub fn user(name: impl Into<String>, ty: SourceType, value: SourceValue) -> Self {
        Self {
            user_defined: true,
            ..Self::new(name, ty, value)
        }
    }

    /// Bind `curve` to `channel` on `layer`, creating the curve node as needed.
    pub fn with_curve(mut self, layer: AnimLayerId, channel: usize, curve: AnimCurve) -> Self {
        self.set_curve(layer, channel, curve);
        self
    }

    pub fn set_curve(&mut self, layer: AnimLayerId, channel: usize, curve: AnimCurve) {
        let count = self.ty.channel_count().max(channel + 1);
        let idx = match self.curve_nodes.iter().position(|n| n.layer == layer) {
            Some(i) => i,
            None => {
                self.curve_nodes.push(CurveNode {
                    layer,
                    channels: Vec::new(),
                });
                self.curve_nodes.len() - 1
            }
        };
        let node = &mut self.curve_nodes[idx];
        if node.channels.len() < count {
            node.channels.resize(count, None);
        }
        node.channels[channel] = Some(curve);
    }

    pub fn curve_node(&self, layer: AnimLayerId) -> Option<&CurveNode> {
        self.curve_nodes.iter().find(|n| n.layer == layer)
    }

    /// Whether any channel carries a curve on `layer`.
    pub fn is_animated(&self, layer: AnimLayerId) -> bool {
        self.curve_node(layer).is_some_and(CurveNode::has_curves)
    }

    /// Channel values at `frame`: curves where bound, the default elsewhere.
    pub fn evaluate(&self, layer: Option<AnimLayerId>, frame: f64) -> Vec<f64> {
        let mut out = self.value.components(self.ty.channel_count());
        if let Some(node) = layer.and_then(|l| self.curve_node(l)) {
            for (slot, curve) in out.iter_mut().zip(&node.channels) {
                if let Some(curve) = curve {
                    *slot = curve.evaluate(frame);
                }
            }
        }
        out
    }

    /// Curve-only channel values at `frame`; unbound channels read as 0.
    /// `None` when the property has no curve on `layer`.
    pub fn curve_channels(&self, layer: AnimLayerId, frame: f64) -> Option<Vec<f64>> {
        let node = self.curve_node(layer).filter(|n| n.has_curves())?;
        let count = self.ty.channel_count().max(node.channels.len()).min(16);
        Some(
            (0..count)
                .map(|i| match node.channels.get(i) {
                    Some(Some(curve)) => curve.evaluate(frame),
                    _ => 0.0,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_values_from_json() {
        let p: SourceProperty = serde_json::from_str(
            r#"{ "name": "Lcl Translation", "type": "double3", "value": [1, 2, 3] }"#,
        )
        .unwrap();
        assert_eq!(p.value, SourceValue::Numbers(vec![1.0, 2.0, 3.0]));
        assert!(!p.user_defined);
        let q: SourceProperty =
            serde_json::from_str(r#"{ "name": "tag", "type": "string", "value": "hero" }"#)
                .unwrap();
        assert_eq!(q.value.as_text(), Some("hero"));
    }

    #[test]
    fn evaluate_mixes_default_and_curves() {
        let layer = AnimLayerId(0);
        let p = SourceProperty::new(
            names::LCL_TRANSLATION,
            SourceType::Double3,
            SourceValue::Numbers(vec![1.0, 2.0, 3.0]),
        )
        .with_curve(layer, 1, AnimCurve::constant(9.0));
        assert_eq!(p.evaluate(Some(layer), 4.0), vec![1.0, 9.0, 3.0]);
        assert_eq!(p.evaluate(None, 4.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(p.curve_channels(layer, 4.0), Some(vec![0.0, 9.0, 0.0]));
        assert_eq!(p.curve_channels(AnimLayerId(1), 4.0), None);
    }

    #[test]
    fn curve_node_without_curves_is_not_animated() {
        let mut p = SourceProperty::new("x", SourceType::Double, SourceValue::Number(1.0));
        p.curve_nodes.push(CurveNode {
            layer: AnimLayerId(0),
            channels: vec![None],
        });
        assert!(!p.is_animated(AnimLayerId(0)));
    }
}
