//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default poll interval for relay blob copies, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default lifetime of a snapshot SAS grant (24 hours), in seconds.
pub const DEFAULT_SAS_DURATION_SECS: u64 = 86_400;

/// Longest relay prefix that still leaves room for a unique suffix within the
/// 24-character storage account name limit.
pub const MAX_RELAY_PREFIX_LEN: usize = 11;

/// Settings for the Azure CLI gateway and the copy pipeline, derived from
/// environment variables and configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "DISKCOPY",
    discovery(
        app_name = "diskcopy",
        env_var = "DISKCOPY_CONFIG_PATH",
        config_file_name = "diskcopy.toml",
        dotfile_name = ".diskcopy.toml",
        project_file_name = "diskcopy.toml"
    )
)]
pub struct DiskCopyConfig {
    /// Path to the Azure CLI executable.
    #[ortho_config(default = "az".to_owned())]
    pub az_bin: String,
    /// Subscription passed to every `az` invocation. When absent the CLI's
    /// active subscription is used.
    pub subscription: Option<String>,
    /// Seconds between relay copy status checks.
    #[ortho_config(default = 5)]
    pub poll_interval_secs: u64,
    /// Lifetime of the read SAS granted on a disk snapshot.
    #[ortho_config(default = 86_400)]
    pub sas_duration_secs: u64,
    /// Container created in the relay storage account.
    #[ortho_config(default = "vhds".to_owned())]
    pub relay_container: String,
    /// Prefix for auto-created relay storage account names.
    #[ortho_config(default = "diskcopy".to_owned())]
    pub relay_account_prefix: String,
    /// `key=value` tag applied to every resource the copy creates.
    #[ortho_config(default = "created_by=disk-copy-extension".to_owned())]
    pub created_by_tag: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to diskcopy.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

impl Default for DiskCopyConfig {
    fn default() -> Self {
        Self {
            az_bin: String::from("az"),
            subscription: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            sas_duration_secs: DEFAULT_SAS_DURATION_SECS,
            relay_container: String::from("vhds"),
            relay_account_prefix: String::from("diskcopy"),
            created_by_tag: String::from("created_by=disk-copy-extension"),
        }
    }
}

impl DiskCopyConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("diskcopy")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Relay poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Performs semantic validation. Error messages include guidance on how
    /// to provide missing values via environment variables or configuration
    /// files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.az_bin,
            &FieldMetadata::new("Azure CLI binary", "DISKCOPY_AZ_BIN", "az_bin"),
        )?;
        Self::require_field(
            &self.relay_container,
            &FieldMetadata::new(
                "relay container name",
                "DISKCOPY_RELAY_CONTAINER",
                "relay_container",
            ),
        )?;
        Self::require_field(
            &self.relay_account_prefix,
            &FieldMetadata::new(
                "relay account prefix",
                "DISKCOPY_RELAY_ACCOUNT_PREFIX",
                "relay_account_prefix",
            ),
        )?;
        Self::require_field(
            &self.created_by_tag,
            &FieldMetadata::new("created-by tag", "DISKCOPY_CREATED_BY_TAG", "created_by_tag"),
        )?;
        if let Some(subscription) = self.subscription.as_deref() {
            Self::require_field(
                subscription,
                &FieldMetadata::new("subscription", "DISKCOPY_SUBSCRIPTION", "subscription"),
            )?;
        }

        let prefix = &self.relay_account_prefix;
        if prefix.len() > MAX_RELAY_PREFIX_LEN
            || !prefix
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(format!(
                "relay_account_prefix '{prefix}' must be lowercase alphanumeric and at most {MAX_RELAY_PREFIX_LEN} characters"
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "poll_interval_secs must be greater than zero",
            )));
        }
        if self.sas_duration_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "sas_duration_secs must be greater than zero",
            )));
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
