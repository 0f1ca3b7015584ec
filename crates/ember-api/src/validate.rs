use crate::ApiError;

/// Check a password change before sending it.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), ApiError> {
    if current.is_empty() || new.is_empty() {
        return Err(ApiError::Validation("password must not be empty".to_string()));
    }
    if new != confirm {
        return Err(ApiError::Validation(
            "new password and confirmation do not match".to_string(),
        ));
    }
    Ok(())
}

/// Minimal shape check for an email address.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("invalid email address: {email}")))
    }
}
