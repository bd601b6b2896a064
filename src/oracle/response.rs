//! # Oracle Vocabulary
//!
//! Types describing what the accrual oracle reports about an order, plus the JSON
//! body it sends on success:
//!
//! ```text
//! GET /api/orders/{number}
//! 200 {"order": "12345678903", "status": "PROCESSED", "accrual": 500}
//! 429 Retry-After: 60
//! ```

use crate::model::{Accrual, OrderNumber};
use crate::oracle::OracleError;
use serde::Deserialize;
use std::time::Duration;

/// Status vocabulary used by the accrual oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// A well-formed status report for one order.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub status: AccrualStatus,
    /// Only carried when `status` is `Processed`.
    pub accrual: Option<Accrual>,
}

/// Every non-error outcome of a single oracle request.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleResponse {
    Resolved(Resolution),
    /// The caller is over quota and must not ask about this order again before `retry_after`.
    RateLimited { retry_after: Duration },
}

/// Body of a 200 response.
#[derive(Debug, Deserialize)]
pub struct AccrualResponseBody {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default)]
    pub accrual: Option<f64>,
}

impl AccrualResponseBody {
    /// Checks the body against the order that was asked about.
    pub fn into_resolution(self, requested: &OrderNumber) -> Result<Resolution, OracleError> {
        if self.order.trim() != requested.as_str() {
            return Err(OracleError::OrderMismatch {
                requested: requested.to_string(),
                returned: self.order,
            });
        }
        let accrual = match (self.status, self.accrual) {
            (AccrualStatus::Processed, Some(amount)) => Some(
                Accrual::from_f64(amount).map_err(|e| OracleError::MalformedBody(e.to_string()))?,
            ),
            _ => None,
        };
        Ok(Resolution {
            status: self.status,
            accrual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn number() -> OrderNumber {
        OrderNumber::parse("12345678903").unwrap()
    }

    fn parse(body: &str) -> Result<Resolution, OracleError> {
        let body: AccrualResponseBody =
            serde_json::from_str(body).map_err(|e| OracleError::MalformedBody(e.to_string()))?;
        body.into_resolution(&number())
    }

    #[test]
    fn test_processed_body_carries_accrual() {
        let resolution =
            parse(r#"{"order":"12345678903","status":"PROCESSED","accrual":500}"#).unwrap();
        assert_eq!(resolution.status, AccrualStatus::Processed);
        assert_eq!(resolution.accrual.unwrap().value(), dec!(500));
    }

    #[test]
    fn test_accrual_dropped_for_non_processed() {
        let resolution =
            parse(r#"{"order":"12345678903","status":"PROCESSING","accrual":12.5}"#).unwrap();
        assert_eq!(resolution.status, AccrualStatus::Processing);
        assert_eq!(resolution.accrual, None);

        let resolution = parse(r#"{"order":"12345678903","status":"REGISTERED"}"#).unwrap();
        assert_eq!(resolution.status, AccrualStatus::Registered);
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        assert!(matches!(
            parse(r#"{"order":"12345678903","status":"LOST"}"#),
            Err(OracleError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_negative_accrual_is_malformed() {
        assert!(matches!(
            parse(r#"{"order":"12345678903","status":"PROCESSED","accrual":-3}"#),
            Err(OracleError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_mismatched_order_rejected() {
        assert_eq!(
            parse(r#"{"order":"79927398713","status":"INVALID"}"#),
            Err(OracleError::OrderMismatch {
                requested: "12345678903".into(),
                returned: "79927398713".into(),
            })
        );
    }
}
