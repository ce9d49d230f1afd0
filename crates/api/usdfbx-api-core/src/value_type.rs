//! Target type names and property variability.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::value::{Value, ValueKind};

/// Schema-level type name of a target property.
///
/// Several type names share one value representation (`point3f[]`, `normal3f[]` and
/// `color3f[]` all hold `Value::Float3Array`); the role distinguishes them.
/// Serializes as its schema spelling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueTypeName {
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

    BoolArray,
    UCharArray,
    IntArray,
    UIntArray,
    Int64Array,
    UInt64Array,
    HalfArray,
    FloatArray,
    DoubleArray,
    Float2Array,
    Float3Array,
    Double2Array,
    Double3Array,
    Double4Array,
    Matrix4dArray,
    TimeCodeArray,
    TokenArray,
    StringArray,

    Point3fArray,
    Normal3fArray,
    Color3fArray,
    TexCoord2fArray,
    QuatfArray,
    Half3Array,
}

impl ValueTypeName {
    pub const ALL: [ValueTypeName; 42] = {
        use ValueTypeName::*;
        [
            Bool, UChar, Int, UInt, Int64, UInt64, Half, Float, Double, Float2, Float3, Double2,
            Double3, Double4, Matrix4d, TimeCode, Token, String, BoolArray, UCharArray, IntArray,
            UIntArray, Int64Array, UInt64Array, HalfArray, FloatArray, DoubleArray, Float2Array,
            Float3Array, Double2Array, Double3Array, Double4Array, Matrix4dArray, TimeCodeArray,
            TokenArray, StringArray, Point3fArray, Normal3fArray, Color3fArray, TexCoord2fArray,
            QuatfArray, Half3Array,
        ]
    };

    /// The schema spelling, e.g. `float3` or `texCoord2f[]`.
    pub fn as_str(self) -> &'static str {
        use ValueTypeName::*;
        match self {
            Bool => "bool",
            UChar => "uchar",
            Int => "int",
            UInt => "uint",
            Int64 => "int64",
            UInt64 => "uint64",
            Half => "half",
            Float => "float",
            Double => "double",
            Float2 => "float2",
            Float3 => "float3",
            Double2 => "double2",
            Double3 => "double3",
            Double4 => "double4",
            Matrix4d => "matrix4d",
            TimeCode => "timecode",
            Token => "token",
            String => "string",
            BoolArray => "bool[]",
            UCharArray => "uchar[]",
            IntArray => "int[]",
            UIntArray => "uint[]",
            Int64Array => "int64[]",
            UInt64Array => "uint64[]",
            HalfArray => "half[]",
            FloatArray => "float[]",
            DoubleArray => "double[]",
            Float2Array => "float2[]",
            Float3Array => "float3[]",
            Double2Array => "double2[]",
            Double3Array => "double3[]",
            Double4Array => "double4[]",
            Matrix4dArray => "matrix4d[]",
            TimeCodeArray => "timecode[]",
            TokenArray => "token[]",
            StringArray => "string[]",
            Point3fArray => "point3f[]",
            Normal3fArray => "normal3f[]",
            Color3fArray => "color3f[]",
            TexCoord2fArray => "texCoord2f[]",
            QuatfArray => "quatf[]",
            Half3Array => "half3[]",
        }
    }

    pub fn is_array(self) -> bool {
        self.as_str().ends_with("[]")
    }

    /// The array type holding elements of this scalar type. Array types map to themselves.
    pub fn array_type(self) -> ValueTypeName {
        use ValueTypeName::*;
        match self {
            Bool => BoolArray,
            UChar => UCharArray,
            Int => IntArray,
            UInt => UIntArray,
            Int64 => Int64Array,
            UInt64 => UInt64Array,
            Half => HalfArray,
            Float => FloatArray,
            Double => DoubleArray,
            Float2 => Float2Array,
            Float3 => Float3Array,
            Double2 => Double2Array,
            Double3 => Double3Array,
            Double4 => Double4Array,
            Matrix4d => Matrix4dArray,
            TimeCode => TimeCodeArray,
            Token => TokenArray,
            String => StringArray,
            other => other,
        }
    }

    /// The value kind a default of this type is expected to hold, when it has a
    /// dedicated variant. Aggregated scalar arrays are carried as `Value::Array`.
    pub fn value_kind(self) -> ValueKind {
        use ValueTypeName::*;
        match self {
            Bool => ValueKind::Bool,
            UChar => ValueKind::UChar,
            Int => ValueKind::Int,
            UInt => ValueKind::UInt,
            Int64 => ValueKind::Int64,
            UInt64 => ValueKind::UInt64,
            Half => ValueKind::Half,
            Float => ValueKind::Float,
            Double => ValueKind::Double,
            Float2 => ValueKind::Float2,
            Float3 => ValueKind::Float3,
            Double2 => ValueKind::Double2,
            Double3 => ValueKind::Double3,
            Double4 => ValueKind::Double4,
            Matrix4d => ValueKind::Matrix4d,
            TimeCode => ValueKind::TimeCode,
            Token => ValueKind::Token,
            String => ValueKind::String,
            IntArray => ValueKind::IntArray,
            FloatArray => ValueKind::FloatArray,
            TokenArray => ValueKind::TokenArray,
            Float2Array | TexCoord2fArray => ValueKind::Float2Array,
            Float3Array | Point3fArray | Normal3fArray | Color3fArray => ValueKind::Float3Array,
            QuatfArray => ValueKind::QuatfArray,
            Half3Array => ValueKind::Half3Array,
            Matrix4dArray => ValueKind::Matrix4dArray,
            _ => ValueKind::Array,
        }
    }

    /// Whether `value` is an acceptable default for this type.
    pub fn accepts(self, value: &Value) -> bool {
        value.is_empty() || value.kind() == self.value_kind()
    }
}

impl fmt::Display for ValueTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueTypeName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown value type name '{s}'"))
    }
}

impl Serialize for ValueTypeName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValueTypeName {
    fn deserialize<D>(deserializer: D) -> Result<ValueTypeName, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = std::string::String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Whether a property may carry time samples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variability {
    #[default]
    Varying,
    Uniform,
}
