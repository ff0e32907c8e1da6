use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Inverse of [`datetime_to_unix_seconds`]; `None` outside chrono's range.
#[must_use]
pub fn unix_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{datetime_to_unix_seconds, decimal_to_f64, unix_seconds_to_datetime};

    #[test]
    fn datetime_survives_unix_seconds_conversion() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single().expect("valid time");
        let seconds = datetime_to_unix_seconds(time);
        assert_eq!(unix_seconds_to_datetime(seconds), Some(time));
    }

    #[test]
    fn decimal_conversion_keeps_value() {
        let value = decimal_to_f64(Decimal::new(12_345, 2), "price").expect("convert");
        assert!((value - 123.45).abs() <= 1e-12);
    }
}
