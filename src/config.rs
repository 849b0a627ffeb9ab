use std::time::Duration;

use serde_json::Value;

use crate::errors::{codes, PayError};

pub(crate) const DEFAULT_API_VERSION_PREFIX: &str = "/api/v1";
pub(crate) const DEFAULT_MAX_TRIES: u32 = 10;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration consumed by every stage of a purchase attempt.
///
/// This is a plain value threaded through construction; there is no
/// process-wide settings object. Build one with [`Default`] and field
/// assignment, or merge caller-supplied JSON over the defaults with
/// [`PayConfig::merge_value`].
///
/// Storage capabilities are not part of this value: the device receipt store
/// and the local fallback store are injected as optional collaborators when
/// the facade is constructed, and passing `None` for the fallback disables
/// it.
#[derive(Debug, Clone)]
pub struct PayConfig {
    /// Base URL of the remote payment API, e.g. `https://pay.example.com`.
    /// Required unless `fake_products` is set.
    pub api_url_base: String,
    /// Version prefix joined onto `api_url_base` for every endpoint.
    pub api_version_prefix: String,
    /// Substitute a stub catalog and locally minted payment tokens for the
    /// remote API, so the whole flow runs offline.
    pub fake_products: bool,
    /// Default maximum number of transaction-status queries per attempt.
    pub max_tries: u32,
    /// Default delay between transaction-status queries, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for PayConfig {
    fn default() -> Self {
        Self {
            api_url_base: String::new(),
            api_version_prefix: DEFAULT_API_VERSION_PREFIX.to_owned(),
            fake_products: false,
            max_tries: DEFAULT_MAX_TRIES,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PayConfig {
    /// Merges a JSON object of camelCase settings over this configuration.
    ///
    /// Recognized keys: `apiUrlBase`, `apiVersionPrefix`, `fakeProducts`,
    /// `maxTries`, `pollIntervalMs`. An unrecognized key is a caller error.
    pub fn merge_value(mut self, overrides: &Value) -> Result<Self, PayError> {
        let Some(map) = overrides.as_object() else {
            return Err(PayError::configuration(
                codes::INVALID_CONFIG,
                "configuration overrides must be a JSON object",
            ));
        };
        for (key, value) in map {
            match key.as_str() {
                "apiUrlBase" => self.api_url_base = string_setting(key, value)?,
                "apiVersionPrefix" => self.api_version_prefix = string_setting(key, value)?,
                "fakeProducts" => self.fake_products = bool_setting(key, value)?,
                "maxTries" => {
                    self.max_tries = u32::try_from(integer_setting(key, value)?)
                        .map_err(|_| setting_type_error(key, "a 32-bit integer"))?
                }
                "pollIntervalMs" => self.poll_interval_ms = integer_setting(key, value)?,
                _ => {
                    return Err(PayError::configuration(
                        codes::UNKNOWN_CONFIG_KEY,
                        format!("unrecognized configuration key '{key}'"),
                    ))
                }
            }
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), PayError> {
        if self.max_tries == 0 {
            return Err(PayError::configuration(
                codes::INVALID_CONFIG,
                "maxTries must be greater than zero",
            ));
        }
        if !self.fake_products {
            if self.api_url_base.is_empty() {
                return Err(PayError::configuration(
                    codes::INVALID_CONFIG,
                    "apiUrlBase is required unless fakeProducts is set",
                ));
            }
            if !self.api_url_base.starts_with("http://")
                && !self.api_url_base.starts_with("https://")
            {
                return Err(PayError::configuration(
                    codes::INVALID_CONFIG,
                    format!("apiUrlBase '{}' is not an absolute URL", self.api_url_base),
                ));
            }
        }
        Ok(())
    }

    /// Root of every endpoint path: base URL plus version prefix.
    pub(crate) fn api_root(&self) -> String {
        format!("{}{}", self.api_url_base, self.api_version_prefix)
    }
}

/// Per-call overrides for the transaction-status poll loop. Unset fields
/// fall back to the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct PurchaseOptions {
    pub max_tries: Option<u32>,
    pub poll_interval_ms: Option<u64>,
}

/// Poll parameters resolved from [`PurchaseOptions`] over [`PayConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct PollConfig {
    pub(crate) max_tries: u32,
    pub(crate) interval: Duration,
}

impl PurchaseOptions {
    pub(crate) fn resolve(&self, config: &PayConfig) -> Result<PollConfig, PayError> {
        let max_tries = self.max_tries.unwrap_or(config.max_tries);
        if max_tries == 0 {
            return Err(PayError::configuration(
                codes::INVALID_CONFIG,
                "maxTries must be greater than zero",
            ));
        }
        Ok(PollConfig {
            max_tries,
            interval: Duration::from_millis(
                self.poll_interval_ms.unwrap_or(config.poll_interval_ms),
            ),
        })
    }
}

fn string_setting(key: &str, value: &Value) -> Result<String, PayError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| setting_type_error(key, "a string"))
}

fn bool_setting(key: &str, value: &Value) -> Result<bool, PayError> {
    value
        .as_bool()
        .ok_or_else(|| setting_type_error(key, "a boolean"))
}

fn integer_setting(key: &str, value: &Value) -> Result<u64, PayError> {
    value
        .as_u64()
        .ok_or_else(|| setting_type_error(key, "a non-negative integer"))
}

fn setting_type_error(key: &str, expected: &str) -> PayError {
    PayError::configuration(
        codes::INVALID_CONFIG,
        format!("configuration key '{key}' must be {expected}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PayErrorKind;

    #[test]
    fn merge_value_overrides_recognized_keys() {
        let config = PayConfig::default()
            .merge_value(&serde_json::json!({
                "apiUrlBase": "https://pay.example.com",
                "apiVersionPrefix": "/api/v2",
                "maxTries": 3,
                "pollIntervalMs": 50
            }))
            .unwrap();
        assert_eq!(config.api_url_base, "https://pay.example.com");
        assert_eq!(config.api_version_prefix, "/api/v2");
        assert_eq!(config.max_tries, 3);
        assert_eq!(config.poll_interval_ms, 50);
        assert!(!config.fake_products);
        config.validate().unwrap();
    }

    #[test]
    fn merge_value_rejects_unknown_keys() {
        let err = PayConfig::default()
            .merge_value(&serde_json::json!({ "apiUrl": "https://pay.example.com" }))
            .unwrap_err();
        assert_eq!(err.kind, PayErrorKind::Configuration);
        assert_eq!(err.code, codes::UNKNOWN_CONFIG_KEY);
    }

    #[test]
    fn merge_value_rejects_wrong_types() {
        let err = PayConfig::default()
            .merge_value(&serde_json::json!({ "maxTries": "three" }))
            .unwrap_err();
        assert_eq!(err.code, codes::INVALID_CONFIG);
    }

    #[test]
    fn validate_requires_api_url_unless_faking() {
        let err = PayConfig::default().validate().unwrap_err();
        assert_eq!(err.code, codes::INVALID_CONFIG);

        let fake = PayConfig {
            fake_products: true,
            ..PayConfig::default()
        };
        fake.validate().unwrap();
    }

    #[test]
    fn validate_rejects_relative_api_url() {
        let config = PayConfig {
            api_url_base: "pay.example.com".to_owned(),
            ..PayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn options_resolve_over_config_defaults() {
        let config = PayConfig::default();
        let poll = PurchaseOptions {
            max_tries: Some(2),
            poll_interval_ms: None,
        }
        .resolve(&config)
        .unwrap();
        assert_eq!(poll.max_tries, 2);
        assert_eq!(poll.interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
    }

    #[test]
    fn options_reject_zero_tries() {
        let err = PurchaseOptions {
            max_tries: Some(0),
            poll_interval_ms: None,
        }
        .resolve(&PayConfig::default())
        .unwrap_err();
        assert_eq!(err.kind, PayErrorKind::Configuration);
    }
}
