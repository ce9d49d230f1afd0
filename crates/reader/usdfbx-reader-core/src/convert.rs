//! Source property types onto the closed target type set.
//!
//! One table drives both the default value of a property and the values built from its
//! sampled animation channels, so a property's default and its time samples always share
//! a type. Nothing here fails: unmapped types degrade to a sentinel token.

use half::f16;
use usdfbx_api_core::{clean_name, Matrix4, Value, ValueTypeName};

use crate::source::{SourceProperty, SourceType, SourceValue};

/// Default value of a property whose source type has no target counterpart.
pub const UNKNOWN_TYPE: &str = "UNKNOWN TYPE";
/// Sampled value of a property whose channels cannot be expressed in its target type.
pub const UNKNOWN_VALUE: &str = "UNKNOWN VALUE";

pub const USER_PROPERTIES_NAMESPACE: &str = "userProperties:";

#[derive(Clone, Debug, PartialEq)]
pub struct MappedValue {
    pub type_name: ValueTypeName,
    pub value: Value,
}

/// Target type for a source type.
pub fn map_type(ty: SourceType) -> ValueTypeName {
    match ty {
        SourceType::Bool => ValueTypeName::Bool,
        SourceType::Char | SourceType::UChar => ValueTypeName::UChar,
        SourceType::Short | SourceType::Int => ValueTypeName::Int,
        SourceType::UShort | SourceType::UInt => ValueTypeName::UInt,
        SourceType::LongLong => ValueTypeName::Int64,
        SourceType::ULongLong => ValueTypeName::UInt64,
        SourceType::HalfFloat => ValueTypeName::Half,
        SourceType::Float | SourceType::Distance => ValueTypeName::Float,
        SourceType::Double => ValueTypeName::Double,
        SourceType::Double2 => ValueTypeName::Double2,
        SourceType::Double3 => ValueTypeName::Double3,
        SourceType::Double4 => ValueTypeName::Double4,
        SourceType::Double4x4 => ValueTypeName::Matrix4d,
        SourceType::Time => ValueTypeName::TimeCode,
        SourceType::Blob | SourceType::String => ValueTypeName::Token,
        SourceType::Enum
        | SourceType::Reference
        | SourceType::DateTime
        | SourceType::Undefined => ValueTypeName::Token,
    }
}

fn matrix_from(c: &[f64]) -> Matrix4 {
    let mut m = [[0.0; 4]; 4];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = c.get(i * 4 + j).copied().unwrap_or(0.0);
        }
    }
    m
}

/// Build a value of `ty`'s target type from numeric components (missing ones read as 0).
/// `None` for types that are not numeric.
fn numeric_value(ty: SourceType, c: &[f64]) -> Option<Value> {
    let at = |i: usize| c.get(i).copied().unwrap_or(0.0);
    Some(match ty {
        SourceType::Bool => Value::Bool(at(0) != 0.0),
        // Values outside 0..=255 wrap the way an 8-bit cast does.
        SourceType::Char | SourceType::UChar => Value::UChar(at(0) as i64 as u8),
        SourceType::Short | SourceType::Int => Value::Int(at(0) as i32),
        SourceType::UShort | SourceType::UInt => Value::UInt(at(0) as u32),
        SourceType::LongLong => Value::Int64(at(0) as i64),
        SourceType::ULongLong => Value::UInt64(at(0) as u64),
        SourceType::HalfFloat => Value::Half(f16::from_f64(at(0))),
        SourceType::Float | SourceType::Distance => Value::Float(at(0) as f32),
        SourceType::Double => Value::Double(at(0)),
        SourceType::Double2 => Value::Double2([at(0), at(1)]),
        SourceType::Double3 => Value::Double3([at(0), at(1), at(2)]),
        SourceType::Double4 => Value::Double4([at(0), at(1), at(2), at(3)]),
        SourceType::Double4x4 => Value::Matrix4d(matrix_from(c)),
        SourceType::Time => Value::TimeCode(at(0)),
        _ => return None,
    })
}

/// Target type and default value of a property.
pub fn map_default(ty: SourceType, value: &SourceValue) -> MappedValue {
    let type_name = map_type(ty);
    let value = match ty {
        SourceType::Blob | SourceType::String => {
            Value::Token(value.as_text().unwrap_or_default().to_string())
        }
        _ => numeric_value(ty, &value.components(ty.channel_count()))
            .unwrap_or_else(|| Value::token(UNKNOWN_TYPE)),
    };
    MappedValue { type_name, value }
}

/// Target type and value built from a sampled channel vector (at most 16 channels).
pub fn map_channels(ty: SourceType, channels: &[f64]) -> MappedValue {
    let channels = &channels[..channels.len().min(16)];
    MappedValue {
        type_name: map_type(ty),
        value: numeric_value(ty, channels).unwrap_or_else(|| Value::token(UNKNOWN_VALUE)),
    }
}

/// [`map_default`] for a property.
pub fn map_property(prop: &SourceProperty) -> MappedValue {
    map_default(prop.ty, &prop.value)
}

/// `userProperties:<name>` with the source name made path-safe.
pub fn user_property_name(source_name: &str) -> String {
    format!("{USER_PROPERTIES_NAMESPACE}{}", clean_name(source_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_integers_widen() {
        let m = map_default(SourceType::Short, &SourceValue::Number(-7.0));
        assert_eq!(m.type_name, ValueTypeName::Int);
        assert_eq!(m.value, Value::Int(-7));
        let m = map_default(SourceType::UShort, &SourceValue::Number(7.0));
        assert_eq!(m.value, Value::UInt(7));
        let m = map_default(SourceType::Char, &SourceValue::Number(-1.0));
        assert_eq!(m.value, Value::UChar(255));
    }

    #[test]
    fn default_and_channels_agree_on_type() {
        for ty in [
            SourceType::Bool,
            SourceType::Int,
            SourceType::HalfFloat,
            SourceType::Distance,
            SourceType::Double3,
            SourceType::Double4x4,
            SourceType::Time,
        ] {
            let d = map_default(ty, &SourceValue::Number(1.0));
            let c = map_channels(ty, &[1.0]);
            assert_eq!(d.type_name, c.type_name, "{ty:?}");
            assert_eq!(d.value.kind(), c.value.kind(), "{ty:?}");
            assert!(d.type_name.accepts(&d.value), "{ty:?}");
        }
    }

    #[test]
    fn unmapped_types_use_sentinels() {
        let d = map_default(SourceType::Enum, &SourceValue::Number(2.0));
        assert_eq!(d.type_name, ValueTypeName::Token);
        assert_eq!(d.value, Value::token(UNKNOWN_TYPE));
        let c = map_channels(SourceType::Reference, &[1.0]);
        assert_eq!(c.value, Value::token(UNKNOWN_VALUE));
        let s = map_channels(SourceType::String, &[]);
        assert_eq!(s.value, Value::token(UNKNOWN_VALUE));
        let text = map_default(SourceType::String, &SourceValue::Text("hero".into()));
        assert_eq!(text.value, Value::token("hero"));
    }

    #[test]
    fn missing_channels_read_zero() {
        let m = map_channels(SourceType::Double4, &[1.0, 2.0]);
        assert_eq!(m.value, Value::Double4([1.0, 2.0, 0.0, 0.0]));
        let mut sixteen = vec![0.0; 16];
        sixteen[12] = 5.0;
        match map_channels(SourceType::Double4x4, &sixteen).value {
            Value::Matrix4d(m) => assert_eq!(m[3][0], 5.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn user_property_names_are_namespaced() {
        assert_eq!(user_property_name("Blend Amount"), "userProperties:Blend_Amount");
    }
}
