//! Ordered delivery with graceful degradation.
//!
//! Providers are tried one at a time in the order they were added. The first
//! success wins. Failures are logged and the next provider is tried. When
//! nothing delivers the message, it is written to the debug store instead.

use crate::config::MailerConfig;
use crate::debug::DebugStore;
use crate::error::{DeliveryError, MailerResult};
use crate::models::{DeliveryResult, Message, ProviderReceipt};
use crate::provider::{
    http_client, EmailProvider, MailgunProvider, ResendProvider, SendGridProvider, SmtpProvider,
};
use tracing::{debug, info, instrument, warn};

/// Sends messages through the provider chain, falling back to the debug store.
pub struct Dispatcher {
    providers: Vec<Box<dyn EmailProvider>>,
    default_sender: String,
    debug_store: DebugStore,
}

impl Dispatcher {
    /// An empty chain: every message goes to the debug store until providers are added.
    pub fn new(default_sender: impl Into<String>, debug_store: DebugStore) -> Self {
        Self {
            providers: Vec::new(),
            default_sender: default_sender.into(),
            debug_store,
        }
    }

    /// Build the standard chain: resend, sendgrid, mailgun, smtp.
    ///
    /// Providers without credentials are left out. Fails only when the
    /// shared HTTP client cannot be built.
    pub fn from_config(config: &MailerConfig) -> eyre::Result<Self> {
        let client = http_client(config.timeout)?;
        let mut dispatcher = Self::new(
            config.default_sender.clone(),
            DebugStore::new(config.debug_dir.clone()),
        );

        if let Some(credentials) = &config.resend {
            dispatcher.push(ResendProvider::new(credentials.clone(), client.clone()));
        }
        if let Some(credentials) = &config.sendgrid {
            dispatcher.push(SendGridProvider::new(credentials.clone(), client.clone()));
        }
        if let Some(credentials) = &config.mailgun {
            dispatcher.push(MailgunProvider::new(credentials.clone(), client.clone()));
        }
        if let Some(credentials) = &config.smtp {
            dispatcher.push(SmtpProvider::new(credentials.clone(), config.timeout));
        }

        Ok(dispatcher)
    }

    /// Append a provider to the end of the chain
    pub fn with_provider(mut self, provider: impl EmailProvider + 'static) -> Self {
        self.push(provider);
        self
    }

    fn push(&mut self, provider: impl EmailProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Provider names in delivery order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn default_sender(&self) -> &str {
        &self.default_sender
    }

    pub fn debug_store(&self) -> &DebugStore {
        &self.debug_store
    }

    /// Deliver `message` through the first provider that accepts it.
    ///
    /// Each configured provider gets exactly one attempt. If all of them fail,
    /// or none is configured, the message is saved to the debug store and a
    /// `debug-` result is returned. The only failure a caller sees is an
    /// invalid message or an unwritable debug store.
    #[instrument(skip_all, fields(to = %message.to, subject = %message.subject))]
    pub async fn send(&self, message: &Message) -> MailerResult<DeliveryResult> {
        if message.to.is_empty() {
            return Err(DeliveryError::InvalidMessage("recipient is required".to_string()));
        }
        if message.subject.trim().is_empty() {
            return Err(DeliveryError::InvalidMessage("subject is required".to_string()));
        }

        let outbound = message.resolve(&self.default_sender);

        for provider in &self.providers {
            let name = provider.name();

            if !provider.is_configured() {
                debug!(provider = name, "Provider not configured, skipping");
                continue;
            }

            match provider.attempt(&outbound).await {
                Ok(payload) => {
                    info!(provider = name, "Email delivered");
                    return Ok(DeliveryResult::Provider(ProviderReceipt {
                        provider: name,
                        payload,
                    }));
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "Failed to send with provider, falling back");
                }
            }
        }

        let record = self.debug_store.save(&outbound).await?;
        Ok(DeliveryResult::Debug(record.artifact()))
    }
}
