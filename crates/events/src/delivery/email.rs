//! SMTP delivery for notification emails.
//!
//! Built on `lettre`'s Tokio transport. When `SMTP_HOST` is absent,
//! [`EmailConfig::from_env`] returns `None` and the application runs without
//! a mailer; notifications then reach only the database and WebSocket
//! channels.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Everything that can go wrong between "send this" and the SMTP server
/// accepting it.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Connection, TLS, or authentication failure at the SMTP layer.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// A sender or recipient address that does not parse.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message itself could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

// STARTTLS submission port.
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "noreply@atelio.local";

/// SMTP settings, all read from the environment.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// The RFC 5322 "From" on every outgoing message.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    /// Mailbox that gets a copy of admin-audience payment and ticket
    /// events, as a record outside individual inboxes.
    pub system_mailbox: Option<String>,
}

impl EmailConfig {
    /// Read the `SMTP_*` variables. A missing `SMTP_HOST` yields `None`:
    /// the deployment has opted out of email entirely.
    ///
    /// | Variable              | Required | Default                 |
    /// |-----------------------|----------|-------------------------|
    /// | `SMTP_HOST`           | yes      | —                       |
    /// | `SMTP_PORT`           | no       | `587`                   |
    /// | `SMTP_FROM`           | no       | `noreply@atelio.local`  |
    /// | `SMTP_USER`           | no       | —                       |
    /// | `SMTP_PASSWORD`       | no       | —                       |
    /// | `SMTP_SYSTEM_MAILBOX` | no       | —                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            system_mailbox: std::env::var("SMTP_SYSTEM_MAILBOX").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails over a shared SMTP transport.
pub struct EmailDelivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    system_mailbox: Option<String>,
}

impl EmailDelivery {
    /// Build the transport from the given configuration.
    ///
    /// The transport pools its connections internally, so one instance
    /// serves the whole process.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address,
            system_mailbox: config.system_mailbox,
        })
    }

    /// The configured system mailbox, if any.
    pub fn system_mailbox(&self) -> Option<&str> {
        self.system_mailbox.as_deref()
    }

    /// Send one HTML email.
    pub async fn send(&self, to_email: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport.send(email).await?;

        tracing::info!(to = to_email, subject, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_smtp_host_disables_email() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn error_messages_name_the_failing_layer() {
        let build = EmailError::Build("missing body".to_string());
        assert_eq!(build.to_string(), "Email build error: missing body");

        let parse_err = "not-an-email".parse::<lettre::Address>().unwrap_err();
        let address = EmailError::Address(parse_err);
        assert!(address.to_string().starts_with("Email address parse error"));
    }
}
