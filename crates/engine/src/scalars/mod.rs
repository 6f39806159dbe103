//! Scalar coercion contracts and the built-in scalars.
//!
//! Messages follow the reference GraphQL implementation so that clients see familiar errors.

mod datetime;

use async_graphql_value::ConstValue;
use serde_json::{Number, Value};

pub use datetime::{DateScalar, DateTimeScalar, TimeScalar};

/// Coercion capability of a scalar type.
///
/// Failures are plain messages, wrapped by the engine into located errors.
pub trait ScalarImplementation: Send + Sync {
    /// Resolver result to response value.
    fn coerce_output(&self, value: &Value) -> Result<Value, String>;

    /// Variable value to internal value.
    fn coerce_input(&self, value: &Value) -> Result<Value, String>;

    /// Document literal to internal value. Defaults to going through [`Self::coerce_input`].
    fn parse_literal(&self, value: &ConstValue) -> Result<Value, String> {
        let json = value.clone().into_json().map_err(|error| error.to_string())?;
        self.coerce_input(&json)
    }
}

const MAX_INT: i64 = i32::MAX as i64;
const MIN_INT: i64 = i32::MIN as i64;

fn integer_in_range(number: &Number) -> Option<i64> {
    let int = match number.as_i64() {
        Some(int) => int,
        None => {
            let float = number.as_f64()?;
            if float.fract() != 0.0 || !float.is_finite() {
                return None;
            }
            float as i64
        }
    };
    (MIN_INT..=MAX_INT).contains(&int).then_some(int)
}

fn is_integral(number: &Number) -> bool {
    number.is_i64() || number.is_u64() || number.as_f64().is_some_and(|float| float.fract() == 0.0)
}

pub struct IntScalar;

impl ScalarImplementation for IntScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        let number = match value {
            Value::Number(number) => number.clone(),
            Value::Bool(flag) => Number::from(i64::from(*flag)),
            Value::String(string) => match string.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(number) => number,
                None => return Err(format!("Int cannot represent non-integer value: {value}")),
            },
            _ => return Err(format!("Int cannot represent non-integer value: {value}")),
        };

        if !is_integral(&number) {
            return Err(format!("Int cannot represent non-integer value: {value}"));
        }

        integer_in_range(&number)
            .map(Value::from)
            .ok_or_else(|| format!("Int cannot represent non 32-bit signed integer value: {value}"))
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Number(number) if is_integral(number) => integer_in_range(number)
                .map(Value::from)
                .ok_or_else(|| format!("Int cannot represent non 32-bit signed integer value: {value}")),
            _ => Err(format!("Int cannot represent non-integer value: {value}")),
        }
    }
}

pub struct FloatScalar;

impl ScalarImplementation for FloatScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Number(_) => Ok(value.clone()),
            Value::Bool(flag) => Ok(Value::from(if *flag { 1.0 } else { 0.0 })),
            Value::String(string) => string
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("Float cannot represent non numeric value: {value}")),
            _ => Err(format!("Float cannot represent non numeric value: {value}")),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Number(_) => Ok(value.clone()),
            _ => Err(format!("Float cannot represent non numeric value: {value}")),
        }
    }
}

pub struct StringScalar;

impl ScalarImplementation for StringScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) => Ok(Value::String(number.to_string())),
            Value::Bool(flag) => Ok(Value::String(flag.to_string())),
            _ => Err(format!("String cannot represent value: {value}")),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(format!("String cannot represent a non string value: {value}")),
        }
    }
}

pub struct BooleanScalar;

impl ScalarImplementation for BooleanScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Number(number) if number.as_f64().is_some_and(f64::is_finite) => {
                Ok(Value::Bool(number.as_f64() != Some(0.0)))
            }
            _ => Err(format!("Boolean cannot represent a non boolean value: {value}")),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(format!("Boolean cannot represent a non boolean value: {value}")),
        }
    }
}

pub struct IdScalar;

impl ScalarImplementation for IdScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) if number.is_i64() || number.is_u64() => Ok(Value::String(number.to_string())),
            _ => Err(format!("ID cannot represent value: {value}")),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) if number.is_i64() || number.is_u64() => Ok(Value::String(number.to_string())),
            _ => Err(format!("ID cannot represent value: {value}")),
        }
    }
}
