use core_config::{AppInfo, ConfigError, Environment, FromEnv, app_info, env_or_default};
use core_config::server::ServerConfig;
use mailer::MailerConfig;

/// Sender for the Resend-only test route
pub const DEFAULT_RESEND_FROM: &str = "onboarding@resend.dev";

/// Everything the service reads from the environment, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mailer: MailerConfig,
    /// `RESEND_FROM_EMAIL`
    pub resend_from: String,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mailer: MailerConfig::from_env()?,
            resend_from: env_or_default("RESEND_FROM_EMAIL", DEFAULT_RESEND_FROM),
        })
    }
}
