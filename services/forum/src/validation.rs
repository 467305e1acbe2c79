//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_USERNAME_LENGTH: usize = 32;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_TOPIC_NAME_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 200;

/// Path segments under `/users/` that cannot be usernames
const RESERVED_USERNAMES: [&str; 1] = ["me"];

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters long"
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^\S+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username must not contain whitespace".to_string());
    }

    if RESERVED_USERNAMES.contains(&username) {
        return Err(format!("Username '{username}' is reserved"));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        ));
    }

    Ok(())
}

/// Validate that a text field is present and, optionally, not too long
pub fn validate_required(field: &str, value: &str, max_length: Option<usize>) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }

    if let Some(max) = max_length {
        if value.chars().count() > max {
            return Err(format!("{field} must be at most {max} characters long"));
        }
    }

    Ok(())
}
