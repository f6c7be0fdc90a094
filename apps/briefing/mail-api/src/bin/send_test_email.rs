//! Send one email through the provider chain and print the result
//!
//! Run with: cargo run -p briefing_mail_api --bin send_test_email -- --to you@example.com

use clap::Parser;
use core_config::{Environment, FromEnv};
use eyre::{Result, WrapErr};
use mailer::{Dispatcher, MailerConfig, Message};

#[derive(Debug, Parser)]
#[command(about = "Send a test email through the configured providers")]
struct Args {
    /// Recipient address; repeat for several recipients
    #[arg(long, required = true)]
    to: Vec<String>,

    #[arg(long, default_value = "BriefMe Test Email")]
    subject: String,

    /// Plain-text body
    #[arg(long)]
    text: Option<String>,

    /// HTML body
    #[arg(long)]
    html: Option<String>,

    /// Sender address, defaults to DEFAULT_EMAIL_SENDER
    #[arg(long, env = "SEND_TEST_EMAIL_FROM")]
    from: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    core_config::tracing::init_tracing(&Environment::from_env());

    let config = MailerConfig::from_env().wrap_err("Failed to load mail configuration")?;
    let dispatcher = Dispatcher::from_config(&config)?;

    println!("Providers: {:?}", dispatcher.provider_names());
    println!("Sending to: {}", args.to.join(", "));
    println!("Subject: {}", args.subject);

    let mut message = Message::new(args.to, args.subject);
    if let Some(html) = args.html {
        message = message.with_html(html);
    }
    if let Some(from) = args.from {
        message = message.with_from(from);
    }
    let has_html = message.html.is_some();
    message = match args.text {
        Some(text) => message.with_text(text),
        None if !has_html => message.with_text("Hello! This is a test email from BriefMe."),
        None => message,
    };

    let result = dispatcher.send(&message).await?;

    if result.is_debug() {
        println!("No provider delivered the message; saved to the debug store");
    } else {
        println!("Delivered via {}", result.provider());
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
