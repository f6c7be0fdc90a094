use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// One destination address or a list of them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Non-blank addresses, trimmed, in the order given
    pub fn addresses(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            Self::One(address) => vec![address.as_str()],
            Self::Many(addresses) => addresses.iter().map(String::as_str).collect(),
        };
        all.into_iter()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses().is_empty()
    }
}

impl fmt::Display for Recipients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addresses().join(", "))
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self::One(address.to_string())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self::One(address)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(addresses: Vec<&str>) -> Self {
        Self::Many(addresses.into_iter().map(str::to_string).collect())
    }
}

/// Email message handed to the dispatcher.
///
/// Subject and bodies arrive already rendered. `from` falls back to the
/// configured default sender when absent or blank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub to: Recipients,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Message {
    /// Create a new message with the required fields
    pub fn new(to: impl Into<Recipients>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: None,
            text: None,
            from: None,
        }
    }

    /// Set HTML body
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set plain text body
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an explicit sender
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Resolve the sender and drop empty bodies, producing what providers see.
    ///
    /// A blank `from` falls back to the default. Bodies are dropped only when
    /// they are the empty string; whitespace is content.
    pub fn resolve(&self, default_sender: &str) -> OutboundMessage {
        let from = self
            .from
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(default_sender);

        OutboundMessage {
            to: self.to.clone(),
            subject: self.subject.clone(),
            html: non_empty(self.html.as_deref()),
            text: non_empty(self.text.as_deref()),
            from: from.to_string(),
        }
    }
}

fn non_empty(body: Option<&str>) -> Option<String> {
    body.filter(|b| !b.is_empty()).map(str::to_string)
}

/// A message with its sender resolved, as passed to every provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: Recipients,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub from: String,
}

/// Successful delivery through a real provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReceipt {
    /// Name of the provider that accepted the message
    pub provider: &'static str,
    /// Provider response, passed through untouched
    pub payload: Value,
}

/// Synthetic confirmation for a message saved by the debug fallback
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DebugArtifact {
    /// Always `debug-<timestamp>`
    pub message_id: String,
    pub file_path: PathBuf,
    pub timestamp: String,
}

/// Outcome of a send.
///
/// Serializes to the provider payload as-is, or to `{messageId, filePath, timestamp}`
/// for the debug fallback, so callers can relay it without inspecting it.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryResult {
    Provider(ProviderReceipt),
    Debug(DebugArtifact),
}

impl DeliveryResult {
    /// Provider name, or `"debug"` for the fallback
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Provider(receipt) => receipt.provider,
            Self::Debug(_) => "debug",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, Self::Debug(_))
    }

    /// Message identifier if the provider reported one
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Provider(receipt) => ["id", "messageId", "message_id"]
                .iter()
                .find_map(|key| receipt.payload.get(*key).and_then(Value::as_str)),
            Self::Debug(artifact) => Some(&artifact.message_id),
        }
    }
}

impl Serialize for DeliveryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Provider(receipt) => receipt.payload.serialize(serializer),
            Self::Debug(artifact) => artifact.serialize(serializer),
        }
    }
}

/// What the debug fallback wrote to disk for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugRecord {
    /// Filesystem-safe send time, also used in the file name
    pub timestamp: String,
    /// Collision suffix of the file name, 0 for the first file in a millisecond
    pub sequence: u32,
    pub to: String,
    pub from: String,
    pub subject: String,
    /// The complete HTML document that was written
    pub body: String,
    pub file_path: PathBuf,
}

impl DebugRecord {
    pub fn artifact(&self) -> DebugArtifact {
        let message_id = match self.sequence {
            0 => format!("debug-{}", self.timestamp),
            n => format!("debug-{}-{}", self.timestamp, n),
        };

        DebugArtifact {
            message_id,
            file_path: self.file_path.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}
