//! Input rules shared by the API handlers and the client.
//!
//! Lengths are counted in characters, not bytes, so a 250-character post
//! of emoji is accepted just like one of ASCII.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MAX_POST_CHARS: usize = 250;
pub const MAX_DM_CHARS: usize = 500;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").expect("username pattern compiles"));

/// Display strings are the exact messages returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Username must be 3-20 chars (letters, numbers, underscore)")]
    InvalidUsername,

    #[error("Message content is required")]
    EmptyContent,

    #[error("Message cannot exceed {max} characters")]
    ContentTooLong { max: usize },

    #[error("Message cannot contain null characters")]
    NulInContent,

    #[error("Recipient is required")]
    MissingRecipient,

    #[error("Invalid user id")]
    InvalidUserId,
}

pub fn email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_CHARS {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooShort)
    }
}

pub fn username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername)
    }
}

/// Registration checks, in the order the caller sees them: presence,
/// email format, password length, username format.
pub fn registration(
    email_addr: &str,
    user_name: Option<&str>,
    pass: &str,
) -> Result<(), ValidationError> {
    if email_addr.is_empty() || pass.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    email(email_addr)?;
    password(pass)?;
    username(user_name.unwrap_or_default())
}

/// Pre-flight checks the login form runs before contacting the server.
/// The server itself only ever answers "Invalid credentials".
pub fn login(email_addr: &str, pass: &str) -> Result<(), ValidationError> {
    if email_addr.is_empty() || pass.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    email(email_addr)?;
    password(pass)
}

pub fn content(content: &str, max: usize) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.chars().count() > max {
        return Err(ValidationError::ContentTooLong { max });
    }
    // SQLite's length() stops at the first NUL, which would trip the
    // column CHECK constraints.
    if content.contains('\0') {
        return Err(ValidationError::NulInContent);
    }
    Ok(())
}

/// Path ids must be positive integers.
pub fn user_id(raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidUserId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_local_part_at_and_dotted_domain() {
        assert!(email("a@b.co").is_ok());
        assert!(email("first.last@mail.example.org").is_ok());
        assert_eq!(email("no-at.example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("a@nodot"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("a b@c.d"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("@b.co"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn username_charset_and_length() {
        assert!(username("abc").is_ok());
        assert!(username("user_name_2024").is_ok());
        assert!(username("a".repeat(20).as_str()).is_ok());
        assert_eq!(username("ab"), Err(ValidationError::InvalidUsername));
        assert_eq!(username(&"a".repeat(21)), Err(ValidationError::InvalidUsername));
        assert_eq!(username("bad-name"), Err(ValidationError::InvalidUsername));
        assert_eq!(username(""), Err(ValidationError::InvalidUsername));
    }

    #[test]
    fn registration_checks_run_in_order() {
        assert_eq!(
            registration("", Some("alice"), "secret1"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            registration("not-an-email", Some("x"), "1"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            registration("a@b.co", Some("x"), "12345"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            registration("a@b.co", None, "123456"),
            Err(ValidationError::InvalidUsername)
        );
        assert!(registration("a@b.co", Some("alice"), "123456").is_ok());
    }

    #[test]
    fn content_bounds_count_characters() {
        assert_eq!(content("", MAX_POST_CHARS), Err(ValidationError::EmptyContent));
        assert!(content(&"x".repeat(MAX_POST_CHARS), MAX_POST_CHARS).is_ok());
        assert_eq!(
            content(&"x".repeat(MAX_POST_CHARS + 1), MAX_POST_CHARS),
            Err(ValidationError::ContentTooLong { max: MAX_POST_CHARS })
        );
        // 250 four-byte characters is still 250 characters
        assert!(content(&"🦀".repeat(MAX_POST_CHARS), MAX_POST_CHARS).is_ok());
    }

    #[test]
    fn content_rejects_nul_anywhere() {
        assert_eq!(content("\0hello", MAX_POST_CHARS), Err(ValidationError::NulInContent));
        assert_eq!(content("hi\0", MAX_DM_CHARS), Err(ValidationError::NulInContent));
        assert!(content("tab\tand newline\n", MAX_DM_CHARS).is_ok());
    }

    #[test]
    fn too_long_message_names_the_limit() {
        let err = content(&"x".repeat(501), MAX_DM_CHARS).unwrap_err();
        assert_eq!(err.to_string(), "Message cannot exceed 500 characters");
    }

    #[test]
    fn user_id_must_be_positive_integer() {
        assert_eq!(user_id("42"), Ok(42));
        assert_eq!(user_id("0"), Err(ValidationError::InvalidUserId));
        assert_eq!(user_id("-3"), Err(ValidationError::InvalidUserId));
        assert_eq!(user_id("abc"), Err(ValidationError::InvalidUserId));
    }
}
