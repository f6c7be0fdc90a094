//! SMTP email provider using lettre

use super::EmailProvider;
use crate::config::SmtpCredentials;
use crate::models::OutboundMessage;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::{json, Value};
use std::time::Duration;

/// SMTP email provider.
///
/// A fresh connection is opened for every attempt and dropped afterwards.
pub struct SmtpProvider {
    credentials: SmtpCredentials,
    timeout: Duration,
}

impl SmtpProvider {
    pub fn new(credentials: SmtpCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let config = &self.credentials;
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
        } else {
            let tls = TlsParameters::new(config.host.clone())
                .wrap_err("Invalid SMTP TLS parameters")?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(tls))
        };

        Ok(builder
            .credentials(creds)
            .port(config.port)
            .timeout(Some(self.timeout))
            .build())
    }

    fn build_message(&self, message: &OutboundMessage) -> Result<Message> {
        let from: Mailbox = message.from.parse().wrap_err("Invalid from address")?;

        let mut builder = Message::builder()
            .message_id(None)
            .from(from)
            .subject(&message.subject);

        for address in message.to.addresses() {
            let to: Mailbox = address
                .parse()
                .wrap_err_with(|| format!("Invalid to address: {}", address))?;
            builder = builder.to(to);
        }

        let email = match (&message.text, &message.html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(email)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn is_configured(&self) -> bool {
        let config = &self.credentials;
        [&config.host, &config.user, &config.password]
            .iter()
            .all(|value| !value.trim().is_empty())
    }

    async fn attempt(&self, message: &OutboundMessage) -> Result<Value> {
        let email = self.build_message(message)?;
        let message_id = email.headers().get_raw("Message-ID").map(str::to_string);

        let response = self
            .transport()?
            .send(email)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        tracing::info!(
            host = %self.credentials.host,
            to = %message.to,
            subject = %message.subject,
            "Email sent via SMTP"
        );

        let reply = response.message().collect::<Vec<_>>().join(" ");

        Ok(json!({
            "messageId": message_id,
            "response": format!("{} {}", response.code(), reply),
        }))
    }
}
