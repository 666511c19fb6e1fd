pub mod smtp;

use crate::domain::report::OutboundMessage;
use anyhow::Context;

/// Opens mail sessions. Opening covers connect and TLS negotiation.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    async fn open(&self) -> anyhow::Result<Box<dyn MailSession>>;
}

#[async_trait::async_trait]
pub trait MailSession: Send {
    async fn authenticate(&mut self) -> anyhow::Result<()>;

    async fn send(&mut self, message: &OutboundMessage) -> anyhow::Result<()>;

    /// Releases the connection. Called exactly once per opened session.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Sends one message over a fresh session. The session is closed on every path once it was opened.
pub async fn dispatch(transport: &dyn MailTransport, message: &OutboundMessage) -> anyhow::Result<()> {
    let mut session = transport.open().await.context("failed to open mail session")?;

    let outcome = deliver(session.as_mut(), message).await;

    if let Err(err) = session.close().await {
        tracing::warn!(error = %format!("{err:#}"), "mail session did not close cleanly");
    }

    outcome?;
    tracing::info!(to = %message.to, subject = %message.subject, "report mail sent");
    Ok(())
}

async fn deliver(session: &mut dyn MailSession, message: &OutboundMessage) -> anyhow::Result<()> {
    session
        .authenticate()
        .await
        .context("mail authentication failed")?;
    session
        .send(message)
        .await
        .context("mail send failed")?;
    Ok(())
}
