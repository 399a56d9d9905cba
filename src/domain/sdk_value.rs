//! SDK response values and their conversion to JSON.
//!
//! Responses coming back from the pool SDK carry big integers and account
//! addresses that have no JSON representation. Each response type maps
//! itself into the closed [`SdkValue`] variant set through [`ToSdkValue`],
//! and [`serialize`] performs one structural recursion that turns the tree
//! into a `serde_json::Value` made only of JSON primitives.

use num::BigInt;
use serde_json::{Map, Number, Value};

use super::Pubkey;

/// A value as returned by the pool SDK, before JSON conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkValue {
    /// Any JSON value that needs no conversion. Passed through unchanged.
    Scalar(Value),
    /// Arbitrary-precision integer, rendered as a base-10 string.
    BigInteger(BigInt),
    /// Account address, rendered as base58.
    Address(Pubkey),
    /// Ordered sequence.
    Sequence(Vec<SdkValue>),
    /// Keyed structure with insertion order preserved.
    Keyed(Vec<(String, SdkValue)>),
}

impl SdkValue {
    /// Builds a [`SdkValue::Keyed`] from `(key, value)` pairs.
    pub fn keyed<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SdkValue)>,
    {
        Self::Keyed(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// JSON `null`.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Value::Null)
    }
}

/// Adapter from an SDK response type into [`SdkValue`].
pub trait ToSdkValue {
    /// Maps `self` into the closed variant set.
    fn to_sdk_value(&self) -> SdkValue;
}

impl ToSdkValue for SdkValue {
    fn to_sdk_value(&self) -> SdkValue {
        self.clone()
    }
}

impl<T: ToSdkValue> ToSdkValue for Vec<T> {
    fn to_sdk_value(&self) -> SdkValue {
        SdkValue::Sequence(self.iter().map(ToSdkValue::to_sdk_value).collect())
    }
}

impl<T: ToSdkValue> ToSdkValue for Option<T> {
    fn to_sdk_value(&self) -> SdkValue {
        self.as_ref().map_or_else(SdkValue::null, ToSdkValue::to_sdk_value)
    }
}

impl ToSdkValue for Pubkey {
    fn to_sdk_value(&self) -> SdkValue {
        SdkValue::Address(*self)
    }
}

impl From<Pubkey> for SdkValue {
    fn from(key: Pubkey) -> Self {
        Self::Address(key)
    }
}

impl From<BigInt> for SdkValue {
    fn from(n: BigInt) -> Self {
        Self::BigInteger(n)
    }
}

macro_rules! big_integer_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SdkValue {
                fn from(n: $t) -> Self {
                    Self::BigInteger(BigInt::from(n))
                }
            }
        )*
    };
}

big_integer_from!(u64, u128, i64, i128);

impl From<f64> for SdkValue {
    fn from(n: f64) -> Self {
        Self::Scalar(Number::from_f64(n).map_or(Value::Null, Value::Number))
    }
}

impl From<u8> for SdkValue {
    fn from(n: u8) -> Self {
        Self::Scalar(Value::from(n))
    }
}

impl From<bool> for SdkValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Value::Bool(b))
    }
}

impl From<&str> for SdkValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for SdkValue {
    fn from(s: String) -> Self {
        Self::Scalar(Value::String(s))
    }
}

impl<T: Into<SdkValue>> From<Vec<T>> for SdkValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Lifts already-serialized JSON back into the variant set, so that
/// `serialize` can be applied to its own output.
impl From<Value> for SdkValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Keyed(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
            other => Self::Scalar(other),
        }
    }
}

/// Converts an SDK value tree into JSON.
///
/// Big integers become base-10 strings, addresses become base58 strings,
/// sequences and keyed structures are converted element-wise with order
/// preserved, everything else is returned as is. Never fails.
#[must_use]
pub fn serialize(value: &SdkValue) -> Value {
    match value {
        SdkValue::Scalar(v) => v.clone(),
        SdkValue::BigInteger(n) => Value::String(n.to_str_radix(10)),
        SdkValue::Address(key) => Value::String(key.to_base58()),
        SdkValue::Sequence(items) => Value::Array(items.iter().map(serialize).collect()),
        SdkValue::Keyed(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (key, field) in fields {
                map.insert(key.clone(), serialize(field));
            }
            Value::Object(map)
        }
    }
}
