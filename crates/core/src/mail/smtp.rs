use crate::config::Settings;
use crate::domain::report::OutboundMessage;
use crate::mail::{MailSession, MailTransport};
use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

/// SMTP submission with a mandatory STARTTLS upgrade.
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let username = settings.require_email_user()?.to_string();
        let password = settings.require_email_password()?.to_string();

        let timeout_secs = std::env::var("SMTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            host: settings.smtp_host().to_string(),
            port: settings.smtp_port()?,
            credentials: Credentials::new(username, password),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[async_trait::async_trait]
impl MailTransport for SmtpMailer {
    async fn open(&self) -> Result<Box<dyn MailSession>> {
        let hello = ClientId::default();
        let mut conn = AsyncSmtpConnection::connect_tokio1(
            (self.host.as_str(), self.port),
            Some(self.timeout),
            &hello,
            None,
            None,
        )
        .await
        .with_context(|| format!("SMTP connect to {}:{} failed", self.host, self.port))?;

        let tls = match TlsParameters::new(self.host.clone()) {
            Ok(tls) => tls,
            Err(err) => {
                conn.abort().await;
                return Err(err).context("invalid TLS parameters for SMTP host");
            }
        };
        if let Err(err) = conn.starttls(tls, &hello).await {
            conn.abort().await;
            return Err(err).context("SMTP STARTTLS negotiation failed");
        }

        tracing::debug!(host = %self.host, port = self.port, "SMTP session opened");
        Ok(Box::new(SmtpSession {
            conn,
            credentials: self.credentials.clone(),
        }))
    }
}

struct SmtpSession {
    conn: AsyncSmtpConnection,
    credentials: Credentials,
}

#[async_trait::async_trait]
impl MailSession for SmtpSession {
    async fn authenticate(&mut self) -> Result<()> {
        self.conn
            .auth(AUTH_MECHANISMS, &self.credentials)
            .await
            .context("SMTP AUTH rejected")?;
        Ok(())
    }

    async fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        let email = build_message(message)?;
        self.conn
            .send(email.envelope(), &email.formatted())
            .await
            .context("SMTP transaction failed")?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(err) = self.conn.quit().await {
            self.conn.abort().await;
            return Err(err).context("SMTP QUIT failed; connection aborted");
        }
        tracing::debug!("SMTP session closed");
        Ok(())
    }
}

pub fn build_message(message: &OutboundMessage) -> Result<Message> {
    let from: Mailbox = message
        .from
        .parse()
        .with_context(|| format!("invalid from address {:?}", message.from))?;
    let to: Mailbox = message
        .to
        .parse()
        .with_context(|| format!("invalid to address {:?}", message.to))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html_body.clone())
        .context("failed to build report email")
}
