//! Forgiving deserializers for form-shaped backend payloads.
//!
//! The backend stores whatever the forms sent, so numbers arrive as JSON
//! numbers, strings with thousands separators, empty strings or `null`.
//! Anything that does not parse coerces to zero instead of failing the whole
//! payload.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::validation::{parse_amount, parse_date, parse_quantity};

fn value_to_amount(value: Value) -> BigDecimal {
    match value {
        Value::Number(n) => parse_amount(&n.to_string()),
        Value::String(s) => parse_amount(&s),
        _ => BigDecimal::from(0),
    }
}

/// Decimal amount; invalid input becomes zero
pub fn amount<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(value_to_amount).unwrap_or_else(|| BigDecimal::from(0)))
}

/// List of decimal amounts, as used by chart series
pub fn amount_list<'de, D>(deserializer: D) -> Result<Vec<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(value_to_amount)
        .collect())
}

/// Whole, non-negative quantity; invalid input becomes zero
pub fn quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0)
            .max(0),
        Some(Value::String(s)) => parse_quantity(&s),
        _ => 0,
    })
}

/// Text field that the backend may hand back as a number (account codes)
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Boolean stored either as a JSON bool or as `"Yes"` / `"No"`
pub fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "true"),
        _ => false,
    })
}

/// Optional numeric id; anything that is not a whole number (such as the
/// `"custom"` marker on walk-in invoices) reads as `None`
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

/// Optional date in `YYYY-MM-DD` or `Month D, YYYY` form
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_date))
}

/// Required date; unlike amounts a bad date is a decode error
pub fn required_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised date '{}'", raw)))
}
