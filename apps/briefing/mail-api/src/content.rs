//! Bodies for the test and briefing routes.

use chrono::{DateTime, Utc};
use mailer::debug::escape_html;

pub const TEST_EMAIL_SUBJECT: &str = "BriefMe Test Email";

const DEFAULT_RESEND_MESSAGE: &str = "This is a test email from the BriefMe News Briefing App.";

/// Subject line for a delivered briefing, e.g. `Your BriefMe News Briefing - March 4, 2025`
pub fn briefing_subject(date: &DateTime<Utc>) -> String {
    format!("Your BriefMe News Briefing - {}", date.format("%B %-d, %Y"))
}

/// Account test email sent through the full provider chain
pub fn test_email_html(email: &str, name: Option<&str>) -> String {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("there");

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #3B82F6;">BriefMe Test Email</h1>
  <p>Hello {name},</p>
  <p>This is a test email from your BriefMe account. If you're receiving this email, your email delivery settings are working correctly.</p>
  <p>Your real news briefings will look much better than this test email and contain personalized news content based on your topics and keywords.</p>
  <div style="background-color: #F3F4F6; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <h2 style="color: #1F2937; margin-top: 0;">Your settings</h2>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Delivery time:</strong> 9:00 AM (default)</p>
  </div>
  <p>If you have any questions or need assistance, please reply to this email or contact our support team.</p>
  <p>Best regards,<br>The BriefMe Team</p>
</div>"#,
        name = escape_html(name),
        email = escape_html(email),
    )
}

/// Test email for the Resend-only route
pub fn resend_direct_html(message: Option<&str>, sent_at: &DateTime<Utc>) -> String {
    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_RESEND_MESSAGE);

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #9333EA;">BriefMe Test Email (Resend Service)</h1>
  <p>Hello there,</p>
  <p>{message}</p>
  <div style="background-color: #F3F4F6; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <p>Sent from the web test tool at {sent_at}.</p>
  </div>
  <p>Best regards,<br>The BriefMe Team</p>
</div>"#,
        message = escape_html(message),
        sent_at = sent_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
