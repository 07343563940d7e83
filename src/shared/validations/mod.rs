//! Field validators shared by request DTOs

use rust_decimal::Decimal;
use validator::ValidationError;

/// Largest single money amount accepted from a client: 1,000,000.00.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

fn too_large() -> ValidationError {
    let mut err = ValidationError::new("amount_too_large");
    err.message = Some(format!("amount must not exceed {}", MAX_AMOUNT).into());
    err
}

/// Money amounts that must be strictly positive (recharges).
pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if !value.is_sign_positive() || value.is_zero() {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("amount must be greater than zero".into());
        return Err(err);
    }
    if *value > MAX_AMOUNT {
        return Err(too_large());
    }
    Ok(())
}

/// Money amounts that may be zero but never negative (opening balances).
pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative_amount");
        err.message = Some("amount must not be negative".into());
        return Err(err);
    }
    if *value > MAX_AMOUNT {
        return Err(too_large());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        assert!(validate_positive_amount(&Decimal::new(1, 2)).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn non_negative_amount_accepts_zero() {
        assert!(validate_non_negative_amount(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(&Decimal::new(50, 0)).is_ok());
        assert!(validate_non_negative_amount(&Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn amounts_are_capped() {
        assert!(validate_positive_amount(&MAX_AMOUNT).is_ok());
        assert!(validate_positive_amount(&(MAX_AMOUNT + Decimal::new(1, 2))).is_err());
        assert!(validate_positive_amount(&Decimal::MAX).is_err());
        assert!(validate_non_negative_amount(&Decimal::MAX).is_err());
    }
}
