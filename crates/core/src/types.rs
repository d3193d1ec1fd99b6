//! Validated input newtypes.
//!
//! Wrapping raw strings at the edges means the services can trust that an
//! `EmailAddress` is plausibly an email and a `NonEmptyText` has content,
//! without re-validating on every use.

use crate::{ClinicError, ClinicResult};
use serde::{Deserialize, Serialize};

/// A non-empty, trimmed piece of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if the value is empty or
    /// whitespace-only.
    pub fn new(value: impl Into<String>) -> ClinicResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ClinicError::InvalidInput("value cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lowercased, minimally validated email address.
///
/// Validation is deliberately shallow: one `@`, non-empty local part, and a
/// domain containing a dot. Deliverability is not this layer's problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if the value does not look like an
    /// email address.
    pub fn parse(value: &str) -> ClinicResult<Self> {
        let value = value.trim().to_ascii_lowercase();
        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| ClinicError::InvalidInput("invalid email address".into()))?;
        if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            return Err(ClinicError::InvalidInput("invalid email address".into()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
