use bitcode::{Decode, Encode};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Declared type of a call parameter.
///
/// The discriminants are part of method signature ids and must not change.
#[repr(u8)]
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Encode, Decode, TryFromPrimitive, IntoPrimitive,
)]
pub enum ValueType {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Str = 4,
    Bytes = 5,
    FloatList = 6,
    StrList = 7,
}

/// An argument or a successful result carried by a frame.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    FloatList(Vec<f64>),
    StrList(Vec<String>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::Bytes(_) => ValueType::Bytes,
            Value::FloatList(_) => ValueType::FloatList,
            Value::StrList(_) => ValueType::StrList,
        }
    }
}

/// A [`Value`] did not hold the variant a conversion asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected a {expected:?} value, found {found:?}")]
pub struct ValueTypeError {
    pub expected: ValueType,
    pub found: ValueType,
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueTypeError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(ValueTypeError {
                            expected: ValueType::$variant,
                            found: other.value_type(),
                        }),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => Str,
    Vec<u8> => Bytes,
    Vec<f64> => FloatList,
    Vec<String> => StrList,
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl TryFrom<Value> for () {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(()),
            other => Err(ValueTypeError {
                expected: ValueType::Null,
                found: other.value_type(),
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl TryFrom<Value> for i32 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let found = value.value_type();
        let wide = i64::try_from(value)?;
        i32::try_from(wide).map_err(|_| ValueTypeError {
            expected: ValueType::Int,
            found,
        })
    }
}
