use crate::model::OrderNumberError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for orders submitted through intake.
///
/// Order numbers are strings of ASCII digits whose last digit is a Luhn check digit.
/// Construction through [`OrderNumber::parse`] (or [`FromStr`]) enforces both rules,
/// so every `OrderNumber` that reaches a queue is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Validates and wraps a raw order number.
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, OrderNumberError> {
        let digits = raw.trim();
        if digits.is_empty() {
            return Err(OrderNumberError::Empty);
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::NotNumeric(digits.to_string()));
        }
        if !luhn_valid(digits) {
            return Err(OrderNumberError::Checksum(digits.to_string()));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_luhn_valid_numbers() {
        for raw in ["12345678903", "9278923470", "79927398713", " 2377225624\n"] {
            assert!(OrderNumber::parse(raw).is_ok(), "{raw} should be valid");
        }
        assert_eq!(
            OrderNumber::parse(" 2377225624\n").unwrap().as_str(),
            "2377225624"
        );
    }

    #[test]
    fn test_rejects_bad_checksum() {
        assert_eq!(
            OrderNumber::parse("12345678902"),
            Err(OrderNumberError::Checksum("12345678902".into()))
        );
    }

    #[test]
    fn test_rejects_non_digits_and_empty() {
        assert_eq!(OrderNumber::parse("   "), Err(OrderNumberError::Empty));
        assert!(matches!(
            OrderNumber::parse("12a45"),
            Err(OrderNumberError::NotNumeric(_))
        ));
        assert!(matches!(
            OrderNumber::parse("-12345678903"),
            Err(OrderNumberError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: OrderNumber = serde_json::from_str("\"12345678903\"").unwrap();
        assert_eq!(ok.to_string(), "12345678903");
        assert!(serde_json::from_str::<OrderNumber>("\"12345678902\"").is_err());
    }
}
