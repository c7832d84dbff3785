//! # Validation Utilities
//!
//! Input validation helpers for admin account fields.

/// Special characters accepted by the password complexity rule.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()-_=+{}[]|;:,.<>?/";

/// Validate email format (basic check).
pub fn validate_email(email: &str) -> Result<(), String> {
    validate_length(email, 2, 50, "Email")?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

/// Validate that the character count lies in `min..=max`.
pub fn validate_length(value: &str, min: usize, max: usize, field_name: &str) -> Result<(), String> {
    validate_min_length(value, min, field_name)?;

    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field_name, max))
    } else {
        Ok(())
    }
}

/// Validate a person name: 2-50 alphabetic characters.
pub fn validate_alpha(value: &str, field_name: &str) -> Result<(), String> {
    validate_length(value, 2, 50, field_name)?;

    if value.chars().all(char::is_alphabetic) {
        Ok(())
    } else {
        Err(format!("{} must contain only alphabetic characters", field_name))
    }
}

/// Validate a phone number: optional `+`, then 2-15 digits not starting with 0.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    let valid = (2..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if valid {
        Ok(())
    } else {
        Err("Invalid phone number format".to_string())
    }
}

/// Validate a username: 3-50 characters without whitespace.
pub fn validate_username(username: &str) -> Result<(), String> {
    validate_length(username, 3, 50, "Username")?;

    if username.chars().any(char::is_whitespace) {
        Err("Username cannot contain spaces".to_string())
    } else {
        Ok(())
    }
}

/// Validate password complexity.
///
/// At least 8 (and at most 255) characters with an uppercase letter, a lowercase
/// letter, a digit and one of [`PASSWORD_SPECIAL_CHARS`].
pub fn validate_password_complexity(password: &str) -> Result<(), String> {
    validate_length(password, 8, 255, "Password")?;

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err("Password does not meet complexity requirements".to_string())
    }
}
