//! Provider credentials and fallback settings, loaded once at startup.

use core_config::{env_non_empty, env_parse_or, ConfigError, FromEnv};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Sender used when a message does not name one
pub const DEFAULT_SENDER: &str = "briefing@news-briefing-app.com";

/// Directory, relative to the working directory, that receives debug emails
pub const DEFAULT_DEBUG_DIR: &str = "debug-emails";

pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net";

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ResendCredentials {
    pub api_key: String,
}

#[derive(Clone)]
pub struct SendGridCredentials {
    pub api_key: String,
}

#[derive(Clone)]
pub struct MailgunCredentials {
    pub api_key: String,
    pub domain: String,
    /// `https://api.mailgun.net`, or the EU endpoint
    pub api_base: String,
}

#[derive(Clone)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Implicit TLS when true, opportunistic STARTTLS otherwise
    pub secure: bool,
}

/// Mail delivery configuration.
///
/// A provider is present only when every credential it requires is set and
/// non-empty. Missing credentials are not an error; the provider is simply
/// left out of the delivery chain.
#[derive(Clone)]
pub struct MailerConfig {
    pub default_sender: String,
    pub resend: Option<ResendCredentials>,
    pub sendgrid: Option<SendGridCredentials>,
    pub mailgun: Option<MailgunCredentials>,
    pub smtp: Option<SmtpCredentials>,
    pub debug_dir: PathBuf,
    /// Per-attempt timeout applied by each transport
    pub timeout: Duration,
}

impl MailerConfig {
    /// Names of the configured providers, in delivery order
    pub fn configured_providers(&self) -> Vec<&'static str> {
        [
            ("resend", self.resend.is_some()),
            ("sendgrid", self.sendgrid.is_some()),
            ("mailgun", self.mailgun.is_some()),
            ("smtp", self.smtp.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, configured)| configured.then_some(name))
        .collect()
    }

    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = dir.into();
        self
    }

    pub fn with_default_sender(mut self, sender: impl Into<String>) -> Self {
        self.default_sender = sender.into();
        self
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            default_sender: DEFAULT_SENDER.to_string(),
            resend: None,
            sendgrid: None,
            mailgun: None,
            smtp: None,
            debug_dir: default_debug_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn default_debug_dir() -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_DEBUG_DIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DEBUG_DIR))
}

impl FromEnv for MailerConfig {
    /// Reads:
    /// - `DEFAULT_EMAIL_SENDER`
    /// - `RESEND_API_KEY`
    /// - `SENDGRID_API_KEY`
    /// - `MAILGUN_API_KEY`, `MAILGUN_DOMAIN`, `MAILGUN_API_BASE`
    /// - `EMAIL_HOST`, `EMAIL_USER`, `EMAIL_PASSWORD`, `EMAIL_PORT`, `EMAIL_SECURE`
    /// - `DEBUG_EMAIL_DIR`
    /// - `EMAIL_PROVIDER_TIMEOUT_SECS`
    fn from_env() -> Result<Self, ConfigError> {
        let resend = env_non_empty("RESEND_API_KEY").map(|api_key| ResendCredentials { api_key });

        let sendgrid =
            env_non_empty("SENDGRID_API_KEY").map(|api_key| SendGridCredentials { api_key });

        let mailgun = match (
            env_non_empty("MAILGUN_API_KEY"),
            env_non_empty("MAILGUN_DOMAIN"),
        ) {
            (Some(api_key), Some(domain)) => Some(MailgunCredentials {
                api_key,
                domain,
                api_base: env_non_empty("MAILGUN_API_BASE")
                    .unwrap_or_else(|| DEFAULT_MAILGUN_API_BASE.to_string()),
            }),
            _ => None,
        };

        let smtp = match (
            env_non_empty("EMAIL_HOST"),
            env_non_empty("EMAIL_USER"),
            env_non_empty("EMAIL_PASSWORD"),
        ) {
            (Some(host), Some(user), Some(password)) => Some(SmtpCredentials {
                host,
                port: env_parse_or("EMAIL_PORT", DEFAULT_SMTP_PORT)?,
                user,
                password,
                secure: env_non_empty("EMAIL_SECURE")
                    .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            }),
            _ => None,
        };

        Ok(Self {
            default_sender: env_non_empty("DEFAULT_EMAIL_SENDER")
                .unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            resend,
            sendgrid,
            mailgun,
            smtp,
            debug_dir: env_non_empty("DEBUG_EMAIL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_debug_dir),
            timeout: Duration::from_secs(env_parse_or(
                "EMAIL_PROVIDER_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}

// Credentials stay out of logs.
impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("default_sender", &self.default_sender)
            .field("providers", &self.configured_providers())
            .field("debug_dir", &self.debug_dir)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 13] = [
        "DEFAULT_EMAIL_SENDER",
        "RESEND_API_KEY",
        "SENDGRID_API_KEY",
        "MAILGUN_API_KEY",
        "MAILGUN_DOMAIN",
        "MAILGUN_API_BASE",
        "EMAIL_HOST",
        "EMAIL_USER",
        "EMAIL_PASSWORD",
        "EMAIL_PORT",
        "EMAIL_SECURE",
        "DEBUG_EMAIL_DIR",
        "EMAIL_PROVIDER_TIMEOUT_SECS",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut kvs: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|k| (*k, None)).collect();
        for &(key, value) in vars {
            kvs.retain(|(k, _)| *k != key);
            kvs.push((key, Some(value)));
        }
        temp_env::with_vars(kvs, f);
    }

    #[test]
    fn test_no_credentials_configures_nothing() {
        with_env(&[], || {
            let config = MailerConfig::from_env().unwrap();
            assert!(config.configured_providers().is_empty());
            assert_eq!(config.default_sender, DEFAULT_SENDER);
            assert!(config.debug_dir.ends_with(DEFAULT_DEBUG_DIR));
            assert_eq!(config.timeout, Duration::from_secs(30));
        });
    }

    #[test]
    fn test_all_providers_in_priority_order() {
        with_env(
            &[
                ("RESEND_API_KEY", "re_123"),
                ("SENDGRID_API_KEY", "SG.abc"),
                ("MAILGUN_API_KEY", "key-1"),
                ("MAILGUN_DOMAIN", "mg.example.com"),
                ("EMAIL_HOST", "smtp.example.com"),
                ("EMAIL_USER", "user"),
                ("EMAIL_PASSWORD", "secret"),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(
                    config.configured_providers(),
                    vec!["resend", "sendgrid", "mailgun", "smtp"]
                );

                let smtp = config.smtp.unwrap();
                assert_eq!(smtp.port, 587);
                assert!(!smtp.secure);
                assert_eq!(config.mailgun.unwrap().api_base, DEFAULT_MAILGUN_API_BASE);
            },
        );
    }

    #[test]
    fn test_partial_credentials_leave_provider_out() {
        with_env(
            &[
                ("MAILGUN_API_KEY", "key-1"),
                ("EMAIL_HOST", "smtp.example.com"),
                ("EMAIL_USER", "user"),
                ("EMAIL_PASSWORD", ""),
                ("RESEND_API_KEY", "  "),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert!(config.configured_providers().is_empty());
            },
        );
    }

    #[test]
    fn test_smtp_port_and_secure_flag() {
        with_env(
            &[
                ("EMAIL_HOST", "smtp.example.com"),
                ("EMAIL_USER", "user"),
                ("EMAIL_PASSWORD", "secret"),
                ("EMAIL_PORT", "465"),
                ("EMAIL_SECURE", "true"),
            ],
            || {
                let smtp = MailerConfig::from_env().unwrap().smtp.unwrap();
                assert_eq!(smtp.port, 465);
                assert!(smtp.secure);
            },
        );
    }

    #[test]
    fn test_invalid_smtp_port_is_an_error() {
        with_env(
            &[
                ("EMAIL_HOST", "smtp.example.com"),
                ("EMAIL_USER", "user"),
                ("EMAIL_PASSWORD", "secret"),
                ("EMAIL_PORT", "submission"),
            ],
            || {
                let err = MailerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("EMAIL_PORT"));
            },
        );
    }

    #[test]
    fn test_sender_dir_and_timeout_overrides() {
        with_env(
            &[
                ("DEFAULT_EMAIL_SENDER", "news@briefme.test"),
                ("DEBUG_EMAIL_DIR", "/var/tmp/briefme-debug"),
                ("EMAIL_PROVIDER_TIMEOUT_SECS", "5"),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.default_sender, "news@briefme.test");
                assert_eq!(config.debug_dir, PathBuf::from("/var/tmp/briefme-debug"));
                assert_eq!(config.timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_blank_sender_keeps_default() {
        with_env(&[("DEFAULT_EMAIL_SENDER", "  ")], || {
            let config = MailerConfig::from_env().unwrap();
            assert_eq!(config.default_sender, DEFAULT_SENDER);
        });
    }

    #[test]
    fn test_mailgun_api_base_override() {
        with_env(
            &[
                ("MAILGUN_API_KEY", "key-1"),
                ("MAILGUN_DOMAIN", "mg.example.com"),
                ("MAILGUN_API_BASE", "https://api.eu.mailgun.net"),
            ],
            || {
                let mailgun = MailerConfig::from_env().unwrap().mailgun.unwrap();
                assert_eq!(mailgun.api_base, "https://api.eu.mailgun.net");
                assert_eq!(mailgun.domain, "mg.example.com");
            },
        );
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        with_env(&[("EMAIL_PROVIDER_TIMEOUT_SECS", "soon")], || {
            let err = MailerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("EMAIL_PROVIDER_TIMEOUT_SECS"));
        });
    }

    #[test]
    fn test_builder_overrides() {
        let config = MailerConfig::default()
            .with_debug_dir("/tmp/outbox")
            .with_default_sender("me@b.com");
        assert_eq!(config.debug_dir, PathBuf::from("/tmp/outbox"));
        assert_eq!(config.default_sender, "me@b.com");
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        with_env(&[("RESEND_API_KEY", "re_supersecret")], || {
            let config = MailerConfig::from_env().unwrap();
            let printed = format!("{:?}", config);
            assert!(printed.contains("resend"));
            assert!(!printed.contains("re_supersecret"));
        });
    }
}
