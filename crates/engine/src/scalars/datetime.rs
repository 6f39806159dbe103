use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat};
use serde_json::Value;

use super::ScalarImplementation;

/// `YYYY-MM-DD`.
pub struct DateScalar;

/// RFC 3339 date-time with an offset. UTC is written with a `Z` suffix.
pub struct DateTimeScalar;

/// `HH:MM:SS` with optional fractional seconds.
pub struct TimeScalar;

fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    value
        .as_str()
        .and_then(|string| NaiveDate::parse_from_str(string, "%Y-%m-%d").ok())
        .ok_or_else(|| format!("Date cannot represent value: {value}"))
}

fn parse_date_time(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .and_then(|string| DateTime::parse_from_rfc3339(string).ok())
        .map(|date_time| date_time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .ok_or_else(|| format!("DateTime cannot represent value: {value}"))
}

fn parse_time(value: &Value) -> Result<NaiveTime, String> {
    value
        .as_str()
        .and_then(|string| NaiveTime::parse_from_str(string, "%H:%M:%S%.f").ok())
        .ok_or_else(|| format!("Time cannot represent value: {value}"))
}

impl ScalarImplementation for DateScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        parse_date(value).map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        self.coerce_output(value)
    }
}

impl ScalarImplementation for DateTimeScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        parse_date_time(value).map(Value::String)
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        self.coerce_output(value)
    }
}

impl ScalarImplementation for TimeScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        parse_time(value).map(|time| Value::String(time.format("%H:%M:%S%.f").to_string()))
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        self.coerce_output(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn date() {
        assert_eq!(DateScalar.coerce_input(&json!("2024-02-29")), Ok(json!("2024-02-29")));
        assert_eq!(
            DateScalar.coerce_input(&json!("2023-02-29")),
            Err("Date cannot represent value: \"2023-02-29\"".to_string())
        );
        assert!(DateScalar.coerce_input(&json!(20240229)).is_err());
    }

    #[test]
    fn date_time_is_normalized() {
        assert_eq!(
            DateTimeScalar.coerce_input(&json!("2024-05-01T10:00:00+00:00")),
            Ok(json!("2024-05-01T10:00:00Z"))
        );
        assert_eq!(
            DateTimeScalar.coerce_output(&json!("2024-05-01T10:00:00.250+02:00")),
            Ok(json!("2024-05-01T10:00:00.250+02:00"))
        );
        assert!(DateTimeScalar.coerce_output(&json!("2024-05-01")).is_err());
    }

    #[test]
    fn time() {
        assert_eq!(TimeScalar.coerce_input(&json!("08:30:00")), Ok(json!("08:30:00")));
        assert_eq!(TimeScalar.coerce_input(&json!("08:30:00.5")), Ok(json!("08:30:00.500")));
        assert!(TimeScalar.coerce_input(&json!("8h30")).is_err());
    }
}
