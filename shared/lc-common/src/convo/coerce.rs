//! Lenient numeric decoding.
//!
//! Token limits arrive either as numbers or as numeric strings from form
//! inputs. Blank and non-numeric strings decode as absent. Token counts are
//! whole numbers, so a fractional value is an error rather than truncated.

use serde::de::{self, Deserializer, Visitor};

struct CoerceNumber;

impl<'de> Visitor<'de> for CoerceNumber {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(Some)
            .map_err(|_| E::custom(format!("number {v} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        from_float(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_numeric_str(v).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }
}

fn from_float(v: f64) -> Result<Option<i64>, String> {
    if !v.is_finite() {
        Ok(None)
    } else if v.fract() == 0.0 {
        Ok(Some(v as i64))
    } else {
        Err(format!("expected a whole number, got {v}"))
    }
}

/// Parse a form value the way a number input would.
///
/// ```
/// use lc_common::convo::coerce::parse_numeric_str;
///
/// assert_eq!(parse_numeric_str(" 4096 "), Ok(Some(4096)));
/// assert_eq!(parse_numeric_str("2048.0"), Ok(Some(2048)));
/// assert_eq!(parse_numeric_str(""), Ok(None));
/// assert_eq!(parse_numeric_str("lots"), Ok(None));
/// assert!(parse_numeric_str("12.9").is_err());
/// ```
pub fn parse_numeric_str(v: &str) -> Result<Option<i64>, String> {
    let trimmed = v.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Some(n));
    }
    trimmed.parse::<f64>().map_or(Ok(None), from_float)
}

/// `deserialize_with` target for optional numeric fields.
pub fn number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CoerceNumber)
}
