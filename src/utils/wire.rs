//! Serializers for outbound payloads.
//!
//! `bigdecimal` writes amounts as strings, while the backend sums and charts
//! them as plain JSON numbers. Money fields are sent through [`amount`].

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};

/// Decimal amount as a JSON number
pub fn amount<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let number = value
        .to_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| S::Error::custom(format!("amount {} does not fit a JSON number", value)))?;
    serializer.serialize_f64(number)
}

/// Sequential document number: a JSON number when it is all digits, the
/// original text otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentNumber<'a> {
    Sequence(u64),
    Text(&'a str),
}

impl<'a> From<&'a str> for DocumentNumber<'a> {
    fn from(number: &'a str) -> Self {
        match number.trim().parse::<u64>() {
            Ok(n) => DocumentNumber::Sequence(n),
            Err(_) => DocumentNumber::Text(number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[derive(Serialize)]
    struct Line {
        #[serde(serialize_with = "amount")]
        debit: BigDecimal,
    }

    #[test]
    fn test_amounts_are_numbers() {
        let line = Line {
            debit: BigDecimal::from_str("1270.50").unwrap(),
        };
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value, json!({ "debit": 1270.5 }));
        assert!(value["debit"].is_number());
    }

    #[test]
    fn test_document_numbers() {
        assert_eq!(
            serde_json::to_value(DocumentNumber::from("1042")).unwrap(),
            json!(1042)
        );
        assert_eq!(
            serde_json::to_value(DocumentNumber::from("JRN-0427")).unwrap(),
            json!("JRN-0427")
        );
    }
}
