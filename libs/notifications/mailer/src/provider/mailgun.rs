//! Mailgun email provider
//!
//! Posts form-encoded messages to `/v3/{domain}/messages` with HTTP basic
//! auth (`api:<key>`).

use crate::config::MailgunCredentials;
use crate::models::OutboundMessage;
use crate::provider::{response_error, success_payload, EmailProvider};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Mailgun email provider
pub struct MailgunProvider {
    credentials: MailgunCredentials,
    client: Client,
}

impl MailgunProvider {
    pub fn new(credentials: MailgunCredentials, client: Client) -> Self {
        Self {
            credentials,
            client,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.credentials.api_base.trim_end_matches('/'),
            self.credentials.domain
        )
    }
}

fn form_fields(message: &OutboundMessage) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("from", message.from.clone()),
        ("to", message.to.addresses().join(",")),
        ("subject", message.subject.clone()),
    ];

    if let Some(text) = &message.text {
        fields.push(("text", text.clone()));
    }
    if let Some(html) = &message.html {
        fields.push(("html", html.clone()));
    }

    fields
}

#[async_trait]
impl EmailProvider for MailgunProvider {
    fn name(&self) -> &'static str {
        "mailgun"
    }

    fn is_configured(&self) -> bool {
        !self.credentials.api_key.trim().is_empty() && !self.credentials.domain.trim().is_empty()
    }

    async fn attempt(&self, message: &OutboundMessage) -> Result<Value> {
        let url = self.messages_url();

        debug!(to = %message.to, domain = %self.credentials.domain, "Sending email via Mailgun");

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(&self.credentials.api_key))
            .form(&form_fields(message))
            .send()
            .await
            .wrap_err("Mailgun request failed")?;

        if !response.status().is_success() {
            return Err(response_error("Mailgun", response).await);
        }

        Ok(success_payload(response).await)
    }
}
