//! Field-level bounds checks shared by recipe create and update.

use crate::api::ApiError;

pub const MIN_COOKING_TIME_MINUTES: i32 = 1;
pub const MAX_COOKING_TIME_MINUTES: i32 = 600;
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MAX_INGREDIENT_AMOUNT: i32 = 10000;

pub fn validate_cooking_time(minutes: i32) -> Result<(), ApiError> {
    if !(MIN_COOKING_TIME_MINUTES..=MAX_COOKING_TIME_MINUTES).contains(&minutes) {
        return Err(ApiError::validation(
            "cooking_time_minutes",
            format!(
                "Cooking time must be between {} and {} minutes",
                MIN_COOKING_TIME_MINUTES, MAX_COOKING_TIME_MINUTES
            ),
        ));
    }
    Ok(())
}

pub fn validate_amount(amount: i32) -> Result<(), ApiError> {
    if !(MIN_INGREDIENT_AMOUNT..=MAX_INGREDIENT_AMOUNT).contains(&amount) {
        return Err(ApiError::validation(
            "amount",
            format!(
                "Ingredient amount must be between {} and {}",
                MIN_INGREDIENT_AMOUNT, MAX_INGREDIENT_AMOUNT
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    fn field_of(err: ApiError) -> Option<&'static str> {
        match err {
            ApiError::Validation { field, .. } => field,
            _ => panic!("expected a validation error"),
        }
    }

    #[test]
    fn cooking_time_bounds() {
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(600).is_ok());
        assert!(validate_cooking_time(601).is_err());
        assert!(validate_cooking_time(-5).is_err());
    }

    #[test]
    fn cooking_time_error_is_field_scoped() {
        let err = validate_cooking_time(601).unwrap_err();
        assert_eq!(field_of(err), Some("cooking_time_minutes"));
    }

    #[test]
    fn amount_bounds() {
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(10000).is_ok());
        assert!(validate_amount(10001).is_err());
    }

    #[test]
    fn amount_error_is_field_scoped() {
        let err = validate_amount(0).unwrap_err();
        assert_eq!(field_of(err), Some("amount"));
    }
}
