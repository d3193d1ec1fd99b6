//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services as `Arc<ClinicConfig>`. Request handlers never read process-wide
//! environment variables, which keeps behaviour consistent across
//! multi-threaded runtimes and test harnesses.

use crate::{ClinicError, ClinicResult};
use std::path::{Path, PathBuf};

/// Default lifetime of an issued bearer token.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClinicConfig {
    data_dir: PathBuf,
    token_secret: String,
    token_ttl_hours: i64,
}

impl ClinicConfig {
    /// Create a new `ClinicConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if the token secret is empty or the
    /// token lifetime is not positive.
    pub fn new(
        data_dir: PathBuf,
        token_secret: String,
        token_ttl_hours: i64,
    ) -> ClinicResult<Self> {
        if token_secret.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "token secret cannot be empty".into(),
            ));
        }
        if token_ttl_hours <= 0 {
            return Err(ClinicError::InvalidInput(
                "token lifetime must be positive".into(),
            ));
        }

        Ok(Self {
            data_dir,
            token_secret,
            token_ttl_hours,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn token_secret(&self) -> &[u8] {
        self.token_secret.as_bytes()
    }

    pub fn token_ttl_hours(&self) -> i64 {
        self.token_ttl_hours
    }
}
