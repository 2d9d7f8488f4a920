//! SMTP delivery of alert reports.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::render::{render_html, render_text, subject};
use super::{AlertReport, Notifier, NotifyError, NotifyResult};
use crate::config::SmtpSettings;

/// Transport security towards the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpTls {
    /// Plain SMTP
    #[default]
    None,
    /// Upgrade with STARTTLS
    Starttls,
    /// Implicit TLS (SMTPS)
    Tls,
}

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Mails reports through an SMTP relay
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    relay: String,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("relay", &self.relay)
            .field("from", &self.from.to_string())
            .field("to", &self.to.len())
            .finish_non_exhaustive()
    }
}

fn parse_mailbox(address: &str) -> NotifyResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

impl SmtpNotifier {
    /// Builds the transport and validates every address up front
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::NotConfigured`] without a relay host, sender or
    /// recipients, [`NotifyError::InvalidAddress`] for a malformed address and
    /// [`NotifyError::Transport`] if the TLS parameters cannot be built.
    pub fn from_settings(settings: &SmtpSettings) -> NotifyResult<Self> {
        let host = settings.host.trim();
        if host.is_empty() {
            return Err(NotifyError::NotConfigured("smtp.host is empty".to_string()));
        }
        let from = settings
            .from
            .as_deref()
            .ok_or_else(|| NotifyError::NotConfigured("smtp.from is not set".to_string()))
            .and_then(parse_mailbox)?;
        let to = settings
            .to
            .iter()
            .map(|a| parse_mailbox(a))
            .collect::<NotifyResult<Vec<_>>>()?;
        if to.is_empty() {
            return Err(NotifyError::NotConfigured("smtp.to is empty".to_string()));
        }

        let tls_parameters = || {
            TlsParameters::builder(host.to_string())
                .dangerous_accept_invalid_certs(settings.accept_invalid_certs)
                .dangerous_accept_invalid_hostnames(settings.accept_invalid_certs)
                .build()
                .map_err(|e| NotifyError::Transport(e.to_string()))
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(settings.port)
            .timeout(Some(SMTP_TIMEOUT));
        builder = match settings.tls {
            SmtpTls::None => builder.tls(Tls::None),
            SmtpTls::Starttls => builder.tls(Tls::Required(tls_parameters()?)),
            SmtpTls::Tls => builder.tls(Tls::Wrapper(tls_parameters()?)),
        };

        if let (Some(username), Some(password)) = (&settings.username, &settings.password)
            && !username.is_empty()
        {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_owned(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
            relay: format!("{host}:{}", settings.port),
        })
    }

    /// Builds the multipart message for a report
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Message`] if lettre rejects the message.
    pub fn build_message(&self, report: &AlertReport) -> NotifyResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject(report));
        for mailbox in &self.to {
            builder = builder.to(mailbox.clone());
        }
        builder
            .multipart(MultiPart::alternative_plain_html(
                render_text(report),
                render_html(report),
            ))
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, report: &AlertReport) -> NotifyResult<()> {
        let message = self.build_message(report)?;
        debug!(relay = %self.relay, recipients = self.to.len(), "Sending alert report");

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        info!(
            relay = %self.relay,
            recipients = self.to.len(),
            readings = report.readings.len(),
            "Alert report sent"
        );
        Ok(())
    }
}
