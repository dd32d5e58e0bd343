//! Session lifetime configuration.
//!
//! ```toml
//! [session]
//! valid_period_secs = 1209600
//! regen_before_secs = 604800
//! ```
//!
//! Every field is optional and falls back to [`AUTH_TOKEN_VALID_PERIOD`] and
//! [`AUTH_TOKEN_REGEN_BEFORE`]. The secret key is not part of this file.

use std::path::Path;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::session::SessionPolicy;
use crate::{AUTH_TOKEN_REGEN_BEFORE, AUTH_TOKEN_VALID_PERIOD};

/// Authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub session: SessionConfig,
}

/// Token lifetime, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_valid_period_secs")]
    pub valid_period_secs: u64,
    #[serde(default = "default_regen_before_secs")]
    pub regen_before_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            valid_period_secs: default_valid_period_secs(),
            regen_before_secs: default_regen_before_secs(),
        }
    }
}

fn default_valid_period_secs() -> u64 {
    AUTH_TOKEN_VALID_PERIOD.num_seconds().unsigned_abs()
}

fn default_regen_before_secs() -> u64 {
    AUTH_TOKEN_REGEN_BEFORE.num_seconds().unsigned_abs()
}

impl AuthConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }

    /// Builds the validated [`SessionPolicy`] described by this config.
    pub fn policy(&self) -> Result<SessionPolicy> {
        SessionPolicy::new(
            seconds(self.session.valid_period_secs, "valid_period_secs")?,
            seconds(self.session.regen_before_secs, "regen_before_secs")?,
        )
    }
}

fn seconds(value: u64, field: &str) -> Result<TimeDelta> {
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| Error::InvalidLifetime(format!("{field} is too large: {value}")))
}
