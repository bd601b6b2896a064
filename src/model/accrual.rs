use crate::model::AccrualError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Loyalty points settled by the accrual oracle for a processed order.
///
/// A wrapper around `rust_decimal::Decimal` so amounts never pass through binary
/// floating point once they enter the system. Always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Accrual(Decimal);

impl Accrual {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, AccrualError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AccrualError::Negative(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Converts the JSON number reported by the oracle.
    pub fn from_f64(value: f64) -> Result<Self, AccrualError> {
        if !value.is_finite() {
            return Err(AccrualError::NotFinite);
        }
        let decimal = Decimal::try_from(value)
            .map_err(|_| AccrualError::OutOfRange(value.to_string()))?;
        Self::new(decimal.normalize())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Accrual {
    type Error = AccrualError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Accrual> for Decimal {
    fn from(accrual: Accrual) -> Self {
        accrual.0
    }
}

impl Display for Accrual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_oracle_number() {
        assert_eq!(Accrual::from_f64(500.0).unwrap().value(), dec!(500));
        assert_eq!(Accrual::from_f64(729.98).unwrap().value(), dec!(729.98));
        assert_eq!(Accrual::from_f64(0.0).unwrap(), Accrual::ZERO);
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        assert!(matches!(
            Accrual::from_f64(-1.5),
            Err(AccrualError::Negative(_))
        ));
        assert_eq!(Accrual::from_f64(f64::NAN), Err(AccrualError::NotFinite));
        assert_eq!(
            Accrual::from_f64(f64::INFINITY),
            Err(AccrualError::NotFinite)
        );
    }

    #[test]
    fn test_rejects_finite_values_beyond_decimal_range() {
        assert!(matches!(
            Accrual::from_f64(1e300),
            Err(AccrualError::OutOfRange(_))
        ));
        assert!(matches!(
            Accrual::from_f64(-1e300),
            Err(AccrualError::OutOfRange(_))
        ));
    }
}
