//! Coercion helpers between Value shapes.
//!
//! Readers compute in double precision and author into the declared property type; these
//! helpers narrow or widen a value so a property's default and its time samples always
//! share one representation.

use half::f16;

use crate::value::Value;
use crate::value_type::ValueTypeName;

/// Attempt to read a Value as a scalar f64.
/// - numeric scalars -> their value
/// - Bool -> 1.0 / 0.0
/// - tuples -> first component
pub fn to_f64(v: &Value) -> Option<f64> {
    Some(match v {
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::UChar(x) => f64::from(*x),
        Value::Int(x) => f64::from(*x),
        Value::UInt(x) => f64::from(*x),
        Value::Int64(x) => *x as f64,
        Value::UInt64(x) => *x as f64,
        Value::Half(x) => x.to_f64(),
        Value::Float(x) => f64::from(*x),
        Value::Double(x) | Value::TimeCode(x) => *x,
        Value::Float2(a) => f64::from(a[0]),
        Value::Float3(a) => f64::from(a[0]),
        Value::Double2(a) => a[0],
        Value::Double3(a) => a[0],
        Value::Double4(a) => a[0],
        _ => return None,
    })
}

/// Flatten a scalar or tuple value into its components.
pub fn to_components(v: &Value) -> Option<Vec<f64>> {
    Some(match v {
        Value::Float2(a) => a.iter().map(|x| f64::from(*x)).collect(),
        Value::Float3(a) => a.iter().map(|x| f64::from(*x)).collect(),
        Value::Double2(a) => a.to_vec(),
        Value::Double3(a) => a.to_vec(),
        Value::Double4(a) => a.to_vec(),
        Value::Matrix4d(m) => m.iter().flatten().copied().collect(),
        other => vec![to_f64(other)?],
    })
}

fn component(c: &[f64], i: usize) -> f64 {
    c.get(i).copied().unwrap_or(0.0)
}

/// Convert `v` into the representation of `ty`.
///
/// Values already of the right kind are returned unchanged. Numeric scalars and tuples
/// convert between each other (missing components read as 0). Tokens and strings only
/// convert into each other. Returns `None` when no sensible conversion exists.
pub fn coerce(v: &Value, ty: ValueTypeName) -> Option<Value> {
    if ty.accepts(v) {
        return Some(v.clone());
    }
    match ty {
        ValueTypeName::Token => {
            return match v {
                Value::String(s) => Some(Value::Token(s.clone())),
                _ => None,
            }
        }
        ValueTypeName::String => {
            return match v {
                Value::Token(s) => Some(Value::String(s.clone())),
                _ => None,
            }
        }
        _ => {}
    }
    let c = to_components(v)?;
    let f = |i| component(&c, i);
    let out = match ty {
        ValueTypeName::Bool => Value::Bool(f(0) != 0.0),
        ValueTypeName::UChar => Value::UChar(f(0) as u8),
        ValueTypeName::Int => Value::Int(f(0) as i32),
        ValueTypeName::UInt => Value::UInt(f(0) as u32),
        ValueTypeName::Int64 => Value::Int64(f(0) as i64),
        ValueTypeName::UInt64 => Value::UInt64(f(0) as u64),
        ValueTypeName::Half => Value::Half(f16::from_f64(f(0))),
        ValueTypeName::Float => Value::Float(f(0) as f32),
        ValueTypeName::Double => Value::Double(f(0)),
        ValueTypeName::TimeCode => Value::TimeCode(f(0)),
        ValueTypeName::Float2 => Value::Float2([f(0) as f32, f(1) as f32]),
        ValueTypeName::Float3 => Value::Float3([f(0) as f32, f(1) as f32, f(2) as f32]),
        ValueTypeName::Double2 => Value::Double2([f(0), f(1)]),
        ValueTypeName::Double3 => Value::Double3([f(0), f(1), f(2)]),
        ValueTypeName::Double4 => Value::Double4([f(0), f(1), f(2), f(3)]),
        ValueTypeName::Matrix4d if c.len() == 16 => {
            let mut m = [[0.0; 4]; 4];
            for (i, x) in c.iter().enumerate() {
                m[i / 4][i % 4] = *x;
            }
            Value::Matrix4d(m)
        }
        _ => return None,
    };
    Some(out)
}
