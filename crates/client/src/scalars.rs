//! Deserializers for Frappe field encodings.
//!
//! Frappe stores `Check` fields as `0`/`1` integers, leaves unset `Date`
//! and `Link` fields as `null` or `""`, and formats datetimes as
//! `YYYY-MM-DD HH:MM:SS.ffffff` without a timezone.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// `Check` field: accepts `0`/`1`, booleans and their string forms.
pub fn check<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().map_or_else(
            || n.as_f64().is_some_and(|v| v.abs() > f64::EPSILON),
            |v| v != 0,
        )),
        Value::String(s) => match s.trim() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(de::Error::custom(format!("invalid check value '{other}'"))),
        },
        Value::Null => Ok(false),
        other => Err(de::Error::custom(format!("invalid check value {other}"))),
    }
}

/// Optional `Data`/`Link` field: `null` and blank strings become `None`.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

/// Optional `Date` field.
pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = opt_text(deserializer)? else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid date '{raw}': {e}")))
}

/// Optional `Datetime` field.
pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = opt_text(deserializer)? else {
        return Ok(None);
    };
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid datetime '{raw}'")))
}

/// `Float`/`Currency` field that may come back as `null`.
pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// `Int` quantity that may arrive as a float (`2.0`) or `null`.
///
/// Fractions are truncated; `null`, zero and negatives become 1.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(1.0);
    if !raw.is_finite() || raw < 1.0 {
        return Ok(1);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(raw.min(f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "check")]
        published: bool,
        #[serde(default, deserialize_with = "opt_text")]
        parent: Option<String>,
        #[serde(default, deserialize_with = "opt_date")]
        valid_from: Option<NaiveDate>,
        #[serde(default, deserialize_with = "opt_datetime")]
        creation: Option<NaiveDateTime>,
        #[serde(default, deserialize_with = "float")]
        qty: f64,
    }

    #[test]
    fn test_frappe_encodings() {
        let row: Row = serde_json::from_value(json!({
            "published": 1,
            "parent": "",
            "valid_from": "2024-03-01",
            "creation": "2024-03-01 09:15:42.123456",
            "qty": null,
        }))
        .unwrap();

        assert!(row.published);
        assert_eq!(row.parent, None);
        assert_eq!(row.valid_from, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(
            row.creation.unwrap().format("%H:%M:%S").to_string(),
            "09:15:42"
        );
        assert!(row.qty.abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert!(!row.published);
        assert!(row.valid_from.is_none());
        assert!(row.creation.is_none());
    }

    #[test]
    fn test_check_rejects_garbage() {
        let result: Result<Row, _> = serde_json::from_value(json!({"published": "maybe"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_datetime_without_fraction() {
        let row: Row = serde_json::from_value(json!({"creation": "2023-12-31 23:59:59"})).unwrap();
        assert!(row.creation.is_some());
    }

    #[test]
    fn test_count_tolerates_floats() {
        #[derive(Deserialize)]
        struct Line {
            #[serde(default = "one", deserialize_with = "count")]
            qty: u32,
        }
        const fn one() -> u32 {
            1
        }

        let parse = |v| serde_json::from_value::<Line>(v).unwrap().qty;
        assert_eq!(parse(json!({"qty": 2.0})), 2);
        assert_eq!(parse(json!({"qty": 3})), 3);
        assert_eq!(parse(json!({"qty": 0})), 1);
        assert_eq!(parse(json!({"qty": null})), 1);
        assert_eq!(parse(json!({})), 1);
    }
}
