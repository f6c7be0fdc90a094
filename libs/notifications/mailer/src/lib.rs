//! Transactional email delivery with ordered provider fallback.
//!
//! ## Delivery order
//!
//! 1. Resend (`RESEND_API_KEY`)
//! 2. SendGrid (`SENDGRID_API_KEY`)
//! 3. Mailgun (`MAILGUN_API_KEY` + `MAILGUN_DOMAIN`)
//! 4. SMTP (`EMAIL_HOST` + `EMAIL_USER` + `EMAIL_PASSWORD`)
//! 5. Debug store: the message is saved as an HTML file under `debug-emails/`
//!
//! Providers without credentials are skipped. A failing provider is logged and
//! the next one is tried; each gets a single attempt.
//!
//! ## Usage
//!
//! ```ignore
//! use core_config::FromEnv;
//! use mailer::{Dispatcher, MailerConfig, Message};
//!
//! let config = MailerConfig::from_env()?;
//! let dispatcher = Dispatcher::from_config(&config)?;
//!
//! let result = dispatcher
//!     .send(&Message::new("reader@example.com", "Weekly Update").with_text("Hello"))
//!     .await?;
//!
//! if result.is_debug() {
//!     // nothing left the machine
//! }
//! ```

pub mod config;
pub mod debug;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod provider;

pub use config::{
    MailerConfig, MailgunCredentials, ResendCredentials, SendGridCredentials, SmtpCredentials,
    DEFAULT_SENDER,
};
pub use debug::DebugStore;
pub use dispatcher::Dispatcher;
pub use error::{DeliveryError, MailerResult};
pub use models::{
    DebugArtifact, DebugRecord, DeliveryResult, Message, OutboundMessage, ProviderReceipt,
    Recipients,
};
pub use provider::{
    EmailProvider, MailgunProvider, MockProvider, ResendProvider, SendGridProvider, SmtpProvider,
};
