//! Value: runtime instances of the closed target type set.
//!
//! Every property default, time sample and metadata entry authored into a
//! stage is one of these variants. Matrices are stored row-major with the
//! translation in the last row; quaternions are stored as (x, y, z, w).

use half::f16;
use serde::{Deserialize, Serialize};

/// Row-major 4x4 matrix, translation in row 3.
pub type Matrix4 = [[f64; 4]; 4];

pub const IDENTITY_MATRIX: Matrix4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Coarse kind enum for pattern-matching and quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Empty,
    Bool,
    UChar,
    Int,
    UInt,
    Int64,
    UInt64,
    Half,
    Float,
    Double,
    Float2,
    Float3,
    Double2,
    Double3,
    Double4,
    Matrix4d,
    TimeCode,
    Token,
    String,
    IntArray,
    FloatArray,
    TokenArray,
    Float2Array,
    Float3Array,
    QuatfArray,
    Half3Array,
    Matrix4dArray,
    Array,
    TokenListOp,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Value {
    /// No value; used as the placeholder default of relationships.
    #[default]
    Empty,

    Bool(bool),
    UChar(u8),
    Int(i32),
    UInt(u32),
    Int64(i64),
    UInt64(u64),
    Half(f16),
    Float(f32),
    Double(f64),

    Float2([f32; 2]),
    Float3([f32; 3]),
    Double2([f64; 2]),
    Double3([f64; 3]),
    Double4([f64; 4]),
    Matrix4d(Matrix4),

    /// Frame-relative time code.
    TimeCode(f64),

    /// Interned-style identifier string.
    Token(String),
    String(String),

    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    TokenArray(Vec<String>),
    Float2Array(Vec<[f32; 2]>),
    Float3Array(Vec<[f32; 3]>),
    /// Quaternions (x, y, z, w)
    QuatfArray(Vec<[f32; 4]>),
    Half3Array(Vec<[f16; 3]>),
    Matrix4dArray(Vec<Matrix4>),

    /// Heterogeneous array, used when per-owner values are aggregated into one property.
    Array(Vec<Value>),

    /// Prepended items of a token list-op (e.g. `apiSchemas` metadata).
    TokenListOp(Vec<String>),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Empty => ValueKind::Empty,
            Value::Bool(_) => ValueKind::Bool,
            Value::UChar(_) => ValueKind::UChar,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Half(_) => ValueKind::Half,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Float2(_) => ValueKind::Float2,
            Value::Float3(_) => ValueKind::Float3,
            Value::Double2(_) => ValueKind::Double2,
            Value::Double3(_) => ValueKind::Double3,
            Value::Double4(_) => ValueKind::Double4,
            Value::Matrix4d(_) => ValueKind::Matrix4d,
            Value::TimeCode(_) => ValueKind::TimeCode,
            Value::Token(_) => ValueKind::Token,
            Value::String(_) => ValueKind::String,
            Value::IntArray(_) => ValueKind::IntArray,
            Value::FloatArray(_) => ValueKind::FloatArray,
            Value::TokenArray(_) => ValueKind::TokenArray,
            Value::Float2Array(_) => ValueKind::Float2Array,
            Value::Float3Array(_) => ValueKind::Float3Array,
            Value::QuatfArray(_) => ValueKind::QuatfArray,
            Value::Half3Array(_) => ValueKind::Half3Array,
            Value::Matrix4dArray(_) => ValueKind::Matrix4dArray,
            Value::Array(_) => ValueKind::Array,
            Value::TokenListOp(_) => ValueKind::TokenListOp,
        }
    }

    /// Convenience constructors
    pub fn token(s: impl Into<String>) -> Self {
        Value::Token(s.into())
    }

    pub fn tokens<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::TokenArray(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Value::Token(s) => Some(s),
            _ => None,
        }
    }

    /// Number of elements for array-valued variants, `None` for scalars.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::IntArray(v) => Some(v.len()),
            Value::FloatArray(v) => Some(v.len()),
            Value::TokenArray(v) => Some(v.len()),
            Value::Float2Array(v) => Some(v.len()),
            Value::Float3Array(v) => Some(v.len()),
            Value::QuatfArray(v) => Some(v.len()),
            Value::Half3Array(v) => Some(v.len()),
            Value::Matrix4dArray(v) => Some(v.len()),
            Value::Array(v) => Some(v.len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json_shape() {
        let v = Value::Float3([1.0, 2.0, 3.0]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "float3");
        assert_eq!(json["data"][2], 3.0);
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn array_len_only_for_arrays() {
        assert_eq!(Value::IntArray(vec![1, 2, 3]).array_len(), Some(3));
        assert_eq!(Value::Int(3).array_len(), None);
        assert_eq!(Value::tokens(["a", "b"]).array_len(), Some(2));
    }
}
