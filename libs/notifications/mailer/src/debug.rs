//! Debug fallback: messages nobody delivered are saved as standalone HTML
//! files so they can be inspected locally.

use crate::error::{DeliveryError, MailerResult};
use crate::models::{DebugRecord, OutboundMessage};
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

const SUBJECT_SLUG_CHARS: usize = 20;

/// Append-only store of undelivered messages.
#[derive(Debug, Clone)]
pub struct DebugStore {
    dir: PathBuf,
}

impl DebugStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the message to `<dir>/<timestamp>-<slug>.html`.
    ///
    /// The directory is created on demand. Existing files are never
    /// overwritten: a second save in the same millisecond gets a `-1`, `-2`,
    /// ... suffix.
    pub async fn save(&self, message: &OutboundMessage) -> MailerResult<DebugRecord> {
        self.save_at(message, Utc::now()).await
    }

    pub(crate) async fn save_at(
        &self,
        message: &OutboundMessage,
        now: DateTime<Utc>,
    ) -> MailerResult<DebugRecord> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| self.io_error(&self.dir, source))?;

        let timestamp = file_timestamp(&now);
        let body = render_document(message, &display_date(&now));

        let (file_path, sequence, mut file) = self
            .create_unique(&timestamp, &subject_slug(&message.subject))
            .await?;

        file.write_all(body.as_bytes())
            .await
            .map_err(|source| self.io_error(&file_path, source))?;
        file.flush()
            .await
            .map_err(|source| self.io_error(&file_path, source))?;

        info!(path = %file_path.display(), to = %message.to, "Debug email saved");

        Ok(DebugRecord {
            timestamp,
            sequence,
            to: message.to.to_string(),
            from: message.from.clone(),
            subject: message.subject.clone(),
            body,
            file_path,
        })
    }

    async fn create_unique(
        &self,
        timestamp: &str,
        slug: &str,
    ) -> MailerResult<(PathBuf, u32, File)> {
        let mut suffix = 0u32;

        loop {
            let name = if suffix == 0 {
                format!("{}-{}.html", timestamp, slug)
            } else {
                format!("{}-{}-{}.html", timestamp, slug, suffix)
            };
            let path = self.dir.join(name);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, suffix, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(source) => return Err(self.io_error(&path, source)),
            }
        }
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> DeliveryError {
        DeliveryError::DebugStore {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// ISO-8601 UTC with milliseconds, `:` and `.` replaced by `-`
pub fn file_timestamp(now: &DateTime<Utc>) -> String {
    sanitize_timestamp(&now.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn sanitize_timestamp(timestamp: &str) -> String {
    timestamp.replace([':', '.'], "-")
}

/// First 20 characters of the subject, anything but ASCII letters and digits turned into `-`
pub fn subject_slug(subject: &str) -> String {
    subject
        .chars()
        .take(SUBJECT_SLUG_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn display_date(now: &DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Self-contained HTML page: metadata block, then the HTML body or the
/// plain-text body inside `<pre>`.
pub fn render_document(message: &OutboundMessage, sent_at: &str) -> String {
    let body = match (&message.html, &message.text) {
        (Some(html), _) => html.clone(),
        (None, Some(text)) => format!("<pre>{}</pre>", escape_html(text)),
        (None, None) => "<pre></pre>".to_string(),
    };

    let subject = escape_html(&message.subject);

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{subject}</title>
    <style>
      .metadata {{ background: #f0f0f0; padding: 20px; margin-bottom: 20px; }}
      .body {{ padding: 20px; }}
    </style>
  </head>
  <body>
    <div class="metadata">
      <p><strong>To:</strong> {to}</p>
      <p><strong>From:</strong> {from}</p>
      <p><strong>Subject:</strong> {subject}</p>
      <p><strong>Date:</strong> {date}</p>
    </div>
    <div class="body">
      {body}
    </div>
  </body>
</html>
"#,
        subject = subject,
        to = escape_html(&message.to.to_string()),
        from = escape_html(&message.from),
        date = escape_html(sent_at),
        body = body,
    )
}

/// Escape text for safe inclusion in HTML
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use chrono::TimeZone;

    #[test]
    fn test_subject_slug_truncates_then_sanitizes() {
        assert_eq!(subject_slug("Hi! @@@ Test??"), "Hi------Test--");
        assert_eq!(subject_slug("Your BriefMe News Briefing - 10/16/2026"), "Your-BriefMe-News-Br");
        assert_eq!(subject_slug("Größe"), "Gr--e");
    }

    #[test]
    fn test_file_timestamp_is_filesystem_safe() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap();
        assert_eq!(file_timestamp(&now), "2026-10-16T09-30-05-000Z");
    }

    #[test]
    fn test_render_document_wraps_text_in_pre() {
        let message = Message::new("a@b.com", "Weekly Update")
            .with_text("Hello")
            .resolve("briefing@news-briefing-app.com");

        let doc = render_document(&message, "2026-10-16 09:30:05 UTC");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<pre>Hello</pre>"));
        assert!(doc.contains("<strong>From:</strong> briefing@news-briefing-app.com"));
        assert!(doc.contains("<title>Weekly Update</title>"));
    }

    #[test]
    fn test_render_document_prefers_html_body() {
        let message = Message::new("a@b.com", "Briefing")
            .with_html("<h1>Top stories</h1>")
            .with_text("Top stories")
            .resolve("me@b.com");

        let doc = render_document(&message, "now");
        assert!(doc.contains("<h1>Top stories</h1>"));
        assert!(!doc.contains("<pre>"));
    }

    #[tokio::test]
    async fn test_same_millisecond_saves_get_distinct_files_and_ids() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = DebugStore::new(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap();
        let message = Message::new("a@b.com", "Weekly Update")
            .with_text("Hello")
            .resolve("me@b.com");

        let first = store.save_at(&message, now).await.unwrap().artifact();
        let second = store.save_at(&message, now).await.unwrap().artifact();

        assert_ne!(first.file_path, second.file_path);
        assert_ne!(first.message_id, second.message_id);
        assert_eq!(first.message_id, "debug-2026-10-16T09-30-05-000Z");
        assert_eq!(second.message_id, "debug-2026-10-16T09-30-05-000Z-1");
        assert!(second
            .file_path
            .ends_with("2026-10-16T09-30-05-000Z-Weekly-Update-1.html"));
    }

    #[test]
    fn test_render_document_keeps_whitespace_text() {
        let message = Message::new("a@b.com", "Spacing")
            .with_text("   \n   ")
            .resolve("me@b.com");

        let doc = render_document(&message, "now");
        assert!(doc.contains("<pre>   \n   </pre>"));
    }

    #[test]
    fn test_render_document_escapes_text_body() {
        let message = Message::new("a@b.com", "Alert")
            .with_text("a < b & c")
            .resolve("me@b.com");

        let doc = render_document(&message, "now");
        assert!(doc.contains("<pre>a &lt; b &amp; c</pre>"));
    }
}
