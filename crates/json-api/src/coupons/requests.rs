//! Request parsing helpers

use std::fmt::Display;

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Deserializer, Serialize};

use crate::extensions::*;

/// A product id, sent by the dashboard either as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub(crate) enum ProductId {
    Text(String),
    Number(i64),
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        match id {
            ProductId::Text(id) => id,
            ProductId::Number(id) => id.to_string(),
        }
    }
}

/// Deserialize a field where `null` is meaningful: a missing field is
/// `None`, `null` is `Some(None)`.
///
/// Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Treat missing and blank strings alike.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Bad request carrying the error's own message.
pub(crate) fn invalid<E: Display>(error: E) -> StatusError {
    StatusError::bad_request().brief(error.to_string())
}

/// Parse an RFC 3339 timestamp, or a plain date taken as midnight UTC.
pub(crate) fn parse_timestamp(value: &str, field: &str) -> Result<Timestamp, StatusError> {
    timestamp_from_str(value)
        .or_400(&format!("{field} must be an RFC 3339 timestamp or a YYYY-MM-DD date"))
}

fn timestamp_from_str(value: &str) -> Result<Timestamp, jiff::Error> {
    let value = value.trim();

    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    Ok(value.parse::<Date>()?.to_zoned(TimeZone::UTC)?.timestamp())
}

pub(crate) fn to_decimal(value: f64, field: &str) -> Result<Decimal, StatusError> {
    Decimal::try_from(value).or_400(&format!("{field} must be a finite number"))
}

/// JSON number for a monetary value.
pub(crate) fn to_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use salvo::http::StatusCode;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn plain_dates_start_at_midnight_utc() -> TestResult {
        assert_eq!(
            parse_timestamp("2025-06-01", "validFrom")?,
            "2025-06-01T00:00:00Z".parse::<Timestamp>()?
        );

        Ok(())
    }

    #[test]
    fn rfc3339_timestamps_keep_their_offset() -> TestResult {
        assert_eq!(
            parse_timestamp("2025-06-01T12:30:00+02:00", "validFrom")?,
            "2025-06-01T10:30:00Z".parse::<Timestamp>()?
        );

        Ok(())
    }

    #[test]
    fn unparseable_timestamps_are_bad_requests() {
        let error = parse_timestamp("next tuesday", "validUntil").err();

        assert_eq!(error.map(|error| error.code), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn product_ids_accept_strings_and_numbers() -> TestResult {
        let ids: Vec<ProductId> = serde_json::from_str(r#"["sku-1", 42]"#)?;
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();

        assert_eq!(ids, ["sku-1".to_string(), "42".to_string()]);

        Ok(())
    }

    #[test]
    fn nullable_fields_tell_null_from_missing() -> TestResult {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "nullable")]
            cap: Option<Option<f64>>,
        }

        let missing: Body = serde_json::from_str("{}")?;
        let cleared: Body = serde_json::from_str(r#"{"cap": null}"#)?;
        let set: Body = serde_json::from_str(r#"{"cap": 5}"#)?;

        assert!(missing.cap.is_none(), "missing field should be None");
        assert!(matches!(cleared.cap, Some(None)), "null should be Some(None)");
        assert!(
            set.cap
                .flatten()
                .is_some_and(|cap| (cap - 5.0).abs() < f64::EPSILON),
            "a number should be kept"
        );

        Ok(())
    }

    #[test]
    fn numbers_convert_to_decimals() -> TestResult {
        assert_eq!(to_decimal(19.99, "value")?, dec!(19.99));
        assert!((to_number(dec!(12.5)) - 12.5).abs() < f64::EPSILON, "expected 12.5");

        Ok(())
    }
}
