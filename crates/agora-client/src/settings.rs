//! Account page helpers. The server has no password-change endpoint, so the
//! form is checked locally and goes no further.

use thiserror::Error;

use agora_types::validate::{self, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordChangeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Passwords do not match.")]
    Mismatch,
}

pub struct PasswordChange<'a> {
    pub new_password: &'a str,
    pub confirm: &'a str,
}

impl PasswordChange<'_> {
    pub fn validate(&self) -> Result<(), PasswordChangeError> {
        validate::password(self.new_password)?;
        if self.new_password != self.confirm {
            return Err(PasswordChangeError::Mismatch);
        }
        Ok(())
    }
}
