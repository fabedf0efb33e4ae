//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::AuthError;

/// Maximum accepted identity string length
pub const MAX_USERNAME_LEN: usize = 20;
/// Maximum accepted password length
pub const MAX_PASSWORD_LEN: usize = 128;

fn srn_regex() -> &'static Regex {
    static SRN_REGEX: OnceLock<Regex> = OnceLock::new();
    SRN_REGEX.get_or_init(|| {
        Regex::new(r"^PES\d[A-Z]{2}\d{2}[A-Z]{2}\d{3}$").expect("Failed to compile SRN regex")
    })
}

/// Whether `srn` is a well-formed student registration number.
///
/// Matching is done on the upper-cased raw input, so `pes1ug21cs001` is valid
/// but surrounding whitespace is not.
pub fn is_valid_srn(srn: &str) -> bool {
    srn_regex().is_match(&srn.to_uppercase())
}

/// Validate an SRN
pub fn validate_srn(srn: &str) -> Result<(), AuthError> {
    if is_valid_srn(srn) {
        Ok(())
    } else {
        Err(AuthError::InvalidSrnFormat)
    }
}

/// Validate login credentials and return the trimmed pair
pub fn validate_credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), AuthError> {
    validate_srn(username)?;

    let username = username.trim();
    let password = password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    if username.len() > MAX_USERNAME_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::InputTooLong);
    }

    Ok((username, password))
}
