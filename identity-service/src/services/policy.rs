//! Credential policy checks.
//!
//! Runs before any hashing: the hasher itself only rejects empty input,
//! so strength requirements are enforced here.

use super::ServiceError;

const PASSWORD_MIN_LENGTH: usize = 8;
const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 30;

/// Password strength policy: minimum length, at least one digit and one
/// special (non-alphanumeric) character.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < PASSWORD_MIN_LENGTH {
        return Err(ServiceError::Validation {
            field: "password",
            message: format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_LENGTH
            ),
        });
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ServiceError::Validation {
            field: "password",
            message: "Password must contain at least one number".to_string(),
        });
    }

    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(ServiceError::Validation {
            field: "password",
            message: "Password must contain at least one special character".to_string(),
        });
    }

    Ok(())
}

/// Username policy: 3-30 alphanumeric characters (checked post-normalization).
pub fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.len() < USERNAME_MIN_LENGTH || username.len() > USERNAME_MAX_LENGTH {
        return Err(ServiceError::Validation {
            field: "username",
            message: format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
            ),
        });
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ServiceError::Validation {
            field: "username",
            message: "Username may only contain letters and numbers".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compliant_password() {
        assert!(validate_password("Passw0rd!").is_ok());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("Sh0rt!").is_err());
    }

    #[test]
    fn rejects_password_without_digit() {
        assert!(validate_password("longenough!").is_err());
    }

    #[test]
    fn rejects_password_without_special_character() {
        assert!(validate_password("longenough1").is_err());
    }

    #[test]
    fn username_bounds_and_charset() {
        assert!(validate_username("alice1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("alice-1").is_err());
        assert!(validate_username("alice 1").is_err());
    }
}
