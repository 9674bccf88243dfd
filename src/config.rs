//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::time::Duration;

use crate::constants::window::DEFAULT_LOOKBACK_MONTHS;
use crate::error::{Error, Result};

/// Default upstream origin.
pub const DEFAULT_API_BASE: &str = "https://api.planningcenteronline.com";

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// `Planning Center` Online application ID
    pub pco_app_id: String,
    /// `Planning Center` Online secret
    pub pco_secret: String,
    /// Upstream origin, without a trailing slash
    pub api_base: String,
    /// How many months back scheduling, check-ins and registrations are read
    pub lookback_months: u32,
    /// Per-request timeout; `None` waits for the upstream indefinitely
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            pco_app_id: String::new(),
            pco_secret: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `load` feeds this from the process environment; tests feed it a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(app_id) = lookup("PCO_APP_ID") {
            config.pco_app_id = app_id.trim().to_string();
        }

        if let Some(secret) = lookup("PCO_SECRET") {
            config.pco_secret = secret.trim().to_string();
        }

        if let Some(base) = lookup("PCO_API_BASE") {
            let base = base.trim().trim_end_matches('/');
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(Error::config(
                    format!("PCO_API_BASE must be an http(s) URL, got {base:?}"),
                    "Unset PCO_API_BASE to use the public Planning Center API",
                ));
            }
            config.api_base = base.to_string();
        }

        if let Some(months) = lookup("PCO_LOOKBACK_MONTHS") {
            config.lookback_months = match months.trim().parse::<u32>() {
                Ok(m) if m > 0 => m,
                _ => {
                    return Err(Error::config(
                        format!("PCO_LOOKBACK_MONTHS must be a positive integer, got {months:?}"),
                        "Unset PCO_LOOKBACK_MONTHS to use the nine month default",
                    ))
                }
            };
        }

        if let Some(secs) = lookup("PCO_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                Error::config(
                    format!("PCO_TIMEOUT_SECS must be a whole number of seconds, got {secs:?}"),
                    "Unset PCO_TIMEOUT_SECS to disable request timeouts",
                )
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Check if `Planning Center` is configured
    pub fn has_planning_center_credentials(&self) -> bool {
        !self.pco_app_id.is_empty() && !self.pco_secret.is_empty()
    }

    /// Fail unless both credentials are present.
    ///
    /// Missing credentials are a startup condition, not a per-lookup error.
    pub fn require_credentials(&self) -> Result<()> {
        if self.has_planning_center_credentials() {
            Ok(())
        } else {
            Err(Error::config(
                "PCO_APP_ID or PCO_SECRET is not set",
                "Set PCO_APP_ID and PCO_SECRET environment variables",
            ))
        }
    }
}
