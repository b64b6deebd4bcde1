//! Sparkpost configuration

use std::{collections::BTreeMap, fmt, time::Duration};

use clap::{ArgAction, Parser};
use thiserror::Error;

use super::{dsn::DsnError, payload::PayloadOptions, SparkpostDsn};
use crate::domain::communication::email_addresses::{Address, EmailAddress, EmailAddressError};

/// Sparkpost settings, from the command line or the environment
#[derive(Clone, Parser)]
pub struct SparkpostSettings {
    /// The mailer connection string, e.g. `mautic+sparkpost+api://:KEY@default?region=us`
    #[clap(long, env = "MAILER_DSN")]
    pub dsn: String,

    /// Sender address used for test emails
    #[clap(long, env = "MAILER_FROM_EMAIL")]
    pub from_email: Option<String>,

    /// Sender name used for test emails
    #[clap(long, env = "MAILER_FROM_NAME")]
    pub from_name: Option<String>,

    /// Headers added to every message, as `name:value`
    #[clap(
        long = "custom-header",
        env = "MAILER_CUSTOM_HEADERS",
        value_delimiter = ',',
        value_parser = parse_header
    )]
    pub custom_headers: Vec<(String, String)>,

    /// Enable open and click tracking
    #[clap(long, env = "SPARKPOST_TRACKING_ENABLED", default_value_t = false, action = ArgAction::Set)]
    pub tracking_enabled: bool,

    /// HTTP timeout, in seconds
    #[clap(long, env = "SPARKPOST_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl SparkpostSettings {
    /// Timeout applied to each request
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for SparkpostSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparkpostSettings")
            .field("dsn", &"********")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("custom_headers", &self.custom_headers)
            .field("tracking_enabled", &self.tracking_enabled)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected `name:value`, got `{raw}`")),
    }
}

/// Errors raised while building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The connection string is invalid
    #[error(transparent)]
    Dsn(#[from] DsnError),

    /// The sender address is invalid
    #[error("Invalid sender address: {0}")]
    Sender(#[from] EmailAddressError),
}

/// Validated Sparkpost configuration
#[derive(Debug, Clone)]
pub struct SparkpostConfig {
    dsn: SparkpostDsn,
    base_url: String,
    from: Option<Address>,
    pub(super) payload: PayloadOptions,
}

impl SparkpostConfig {
    /// Creates a configuration targeting the DSN's region
    pub fn new(dsn: SparkpostDsn) -> Self {
        Self {
            base_url: format!("https://{}", dsn.region().host()),
            dsn,
            from: None,
            payload: PayloadOptions::default(),
        }
    }

    /// Sets the sender used for test emails
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Adds a header sent with every message
    pub fn with_global_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.global_headers.insert(name.into(), value.into());
        self
    }

    /// Enables or disables open and click tracking
    pub fn with_tracking(mut self, enabled: bool) -> Self {
        self.payload.tracking_enabled = enabled;
        self
    }

    /// Points the mailer at another API root, such as a local mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The API key
    pub fn api_key(&self) -> &str {
        self.dsn.api_key()
    }

    /// The API root, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The sender used for test emails
    pub fn from(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    /// Whether open and click tracking are enabled
    pub fn tracking_enabled(&self) -> bool {
        self.payload.tracking_enabled
    }

    /// Headers sent with every message
    pub fn global_headers(&self) -> &BTreeMap<String, String> {
        &self.payload.global_headers
    }
}

impl TryFrom<&SparkpostSettings> for SparkpostConfig {
    type Error = ConfigError;

    fn try_from(settings: &SparkpostSettings) -> Result<Self, Self::Error> {
        let mut config = Self::new(SparkpostDsn::parse(&settings.dsn)?)
            .with_tracking(settings.tracking_enabled);

        if let Some(email) = &settings.from_email {
            let email = EmailAddress::new(email)?;
            config = config.with_from(Address::new(email, settings.from_name.as_deref()));
        }

        for (name, value) in &settings.custom_headers {
            config = config.with_global_header(name, value);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn settings(args: &[&str]) -> Result<SparkpostSettings, clap::Error> {
        SparkpostSettings::try_parse_from(std::iter::once("sparkpost").chain(args.iter().copied()))
    }

    #[test]
    fn test_config_from_settings() -> TestResult {
        let settings = settings(&[
            "--dsn",
            "mautic+sparkpost+api://:some_api@some_host:25?region=us",
            "--from-email",
            "admin@mautic.test",
            "--from-name",
            "Admin",
            "--custom-header",
            "x-global-custom-header:value123",
            "--tracking-enabled",
            "true",
        ])?;

        let config = SparkpostConfig::try_from(&settings)?;

        assert_eq!(config.api_key(), "some_api");
        assert_eq!(config.base_url(), "https://api.sparkpost.com");
        assert_eq!(
            config.from().map(ToString::to_string).as_deref(),
            Some("Admin <admin@mautic.test>")
        );
        assert_eq!(
            config.global_headers().get("x-global-custom-header").map(String::as_str),
            Some("value123")
        );
        assert!(config.tracking_enabled());
        assert_eq!(settings.timeout(), Duration::from_secs(30));

        Ok(())
    }

    #[test]
    fn test_custom_headers_are_comma_separated() -> TestResult {
        let settings = settings(&[
            "--dsn",
            "mautic+sparkpost+api://:key@default?region=eu",
            "--custom-header",
            "x-a:1,x-b: 2",
        ])?;

        assert_eq!(
            settings.custom_headers,
            vec![
                ("x-a".to_string(), "1".to_string()),
                ("x-b".to_string(), "2".to_string())
            ]
        );
        assert!(!settings.tracking_enabled);

        Ok(())
    }

    #[test]
    fn test_malformed_custom_header() {
        let result = settings(&[
            "--dsn",
            "mautic+sparkpost+api://:key@default?region=eu",
            "--custom-header",
            "no-colon",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_region_blocks_configuration() -> TestResult {
        let settings = settings(&["--dsn", "mautic+sparkpost+api://:key@default?region="])?;

        let err = SparkpostConfig::try_from(&settings).unwrap_err();

        assert!(matches!(err, ConfigError::Dsn(DsnError::RegionEmpty)));
        assert_eq!(err.to_string(), "Sparkpost region cannot be empty.");

        Ok(())
    }

    #[test]
    fn test_invalid_region_blocks_configuration() -> TestResult {
        let settings = settings(&[
            "--dsn",
            "mautic+sparkpost+api://:key@default?region=invalid_region",
        ])?;

        let err = SparkpostConfig::try_from(&settings).unwrap_err();

        assert!(matches!(err, ConfigError::Dsn(DsnError::RegionInvalid(_))));

        Ok(())
    }

    #[test]
    fn test_invalid_sender_blocks_configuration() -> TestResult {
        let settings = settings(&[
            "--dsn",
            "mautic+sparkpost+api://:key@default?region=us",
            "--from-email",
            "not an email",
        ])?;

        let err = SparkpostConfig::try_from(&settings).unwrap_err();

        assert!(matches!(err, ConfigError::Sender(_)));

        Ok(())
    }

    #[test]
    fn test_base_url_override() -> TestResult {
        let config = SparkpostConfig::new(SparkpostDsn::parse(
            "mautic+sparkpost+api://:key@default?region=eu",
        )?);
        assert_eq!(config.base_url(), "https://api.eu.sparkpost.com");

        let config = config.with_base_url("http://127.0.0.1:1234/");
        assert_eq!(config.base_url(), "http://127.0.0.1:1234");

        Ok(())
    }

    #[test]
    fn test_debug_redacts_dsn() -> TestResult {
        let settings = settings(&["--dsn", "mautic+sparkpost+api://:secret@default?region=us"])?;

        assert!(!format!("{:?}", settings).contains("secret"));
        assert!(!format!("{:?}", SparkpostConfig::try_from(&settings)?).contains("secret"));

        Ok(())
    }
}
