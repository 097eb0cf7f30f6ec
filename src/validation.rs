//! Form validation.
//!
//! Forms derive `validator::Validate`; this module turns the result into the
//! field → message map that clients render next to each input. No I/O.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult, FieldErrors};

/// Rejects empty and whitespace-only strings
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Rejects an unticked checkbox
pub fn accepted(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(ValidationError::new("not_accepted"));
    }
    Ok(())
}

/// First message per field; an empty map means the form may be submitted
pub fn validate_form<T: Validate>(form: &T) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors(&errors),
    }
}

/// Gate for service operations
pub fn check_form<T: Validate>(form: &T) -> AppResult<()> {
    let errors = validate_form(form);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidForm(errors))
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            list.first().map(|error| {
                let message = error
                    .message
                    .clone()
                    .unwrap_or_else(|| Cow::from(format!("{} is invalid", field)));
                (field.to_string(), message.into_owned())
            })
        })
        .collect()
}
