use std::fmt::Display;
use std::path::Path;

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};

use crate::config::{EmailSection, SenderCredentials};
use crate::data::Attendee;
use crate::{CertsendError, Result};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const PASSWORD_ENV_VAR: &str = "CERTSEND_SMTP_PASSWORD";
const KEYRING_SERVICE: &str = "certsend";

/// Encryption mode for an SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encryption {
    None,
    StartTls,
    Tls,
}

impl Encryption {
    fn for_port(port: Option<u16>) -> Self {
        match port {
            None | Some(465) => Self::Tls,
            Some(25) => Self::None,
            Some(_) => Self::StartTls,
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Self::Tls => 465,
            Self::StartTls => 587,
            Self::None => 25,
        }
    }
}

/// Where and how certificates are submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub encryption: Encryption,
    /// RFC 5322 from address used for all sent messages.
    pub from: String,
}

impl SmtpSettings {
    /// Fill in host, port and encryption from what the configuration leaves out.
    ///
    /// Without a host the well-known Gmail submission endpoint is used.
    pub fn from_sender(sender: &SenderCredentials) -> Self {
        let Some(host) = sender.smtp_host.clone().filter(|h| !h.trim().is_empty()) else {
            return Self {
                host: DEFAULT_SMTP_HOST.to_string(),
                port: DEFAULT_SMTP_PORT,
                encryption: Encryption::Tls,
                from: sender.email.clone(),
            };
        };
        let encryption = sender
            .encryption
            .unwrap_or_else(|| Encryption::for_port(sender.smtp_port));
        Self {
            host,
            port: sender.smtp_port.unwrap_or_else(|| encryption.default_port()),
            encryption,
            from: sender.email.clone(),
        }
    }
}

/// SMTP account credentials.
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

/// Resolve the sender password: configuration, then `CERTSEND_SMTP_PASSWORD`,
/// then the OS keychain entry `certsend` / `<sender email>`.
pub fn resolve_credentials(sender: &SenderCredentials) -> Result<SmtpCredentials> {
    resolve_credentials_with(
        sender,
        std::env::var(PASSWORD_ENV_VAR).ok(),
        retrieve_keyring_password,
    )
}

fn resolve_credentials_with(
    sender: &SenderCredentials,
    env_password: Option<String>,
    keychain: impl FnOnce(&str) -> Result<Option<String>>,
) -> Result<SmtpCredentials> {
    let password = match (&sender.password, env_password) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) if !p.is_empty() => p,
        (None, _) => keychain(&sender.email)?.ok_or_else(|| CertsendError::MissingCredential {
            sender: sender.email.clone(),
        })?,
    };
    Ok(SmtpCredentials {
        username: sender.email.clone(),
        password,
    })
}

fn retrieve_keyring_password(account: &str) -> Result<Option<String>> {
    let entry =
        keyring::Entry::new(KEYRING_SERVICE, account).map_err(|e| CertsendError::Keyring {
            reason: e.to_string(),
        })?;
    match entry.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(CertsendError::Keyring {
            reason: e.to_string(),
        }),
    }
}

/// Build a lettre async SMTP transport from the given settings and credentials.
pub fn build_transport(
    settings: &SmtpSettings,
    credentials: &SmtpCredentials,
) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let creds = Credentials::new(credentials.username.clone(), credentials.password.clone());
    let transport = match settings.encryption {
        Encryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| CertsendError::SmtpConnect {
                reason: e.to_string(),
            })?
            .port(settings.port)
            .credentials(creds)
            .build(),
        Encryption::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| CertsendError::SmtpConnect {
                reason: e.to_string(),
            })?
            .port(settings.port)
            .credentials(creds)
            .build(),
        Encryption::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .credentials(creds)
            .build(),
    };
    Ok(transport)
}

/// Replace every `$field` token in `body` with the attendee's value for it.
pub fn process_body(attendee: &Attendee, body: &str) -> String {
    let mut fields = attendee.fields();
    // `$fullnameX`-style keys must not be clobbered by a shorter prefix key.
    fields.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));
    fields
        .iter()
        .fold(body.to_string(), |acc, (key, value)| {
            acc.replace(&format!("${key}"), value)
        })
}

/// Content type for a certificate attachment, from the template extension.
pub fn attachment_content_type(extension: &str) -> ContentType {
    let mime = mime_guess::from_ext(extension).first_or_octet_stream();
    ContentType::parse(mime.essence_str()).unwrap_or(ContentType::TEXT_PLAIN)
}

/// Build the certificate email for one attendee: HTML body plus the image attachment.
pub fn build_message(
    email: &EmailSection,
    from: &str,
    attendee: &Attendee,
    entry_index: usize,
    attachment: Vec<u8>,
    content_type: ContentType,
) -> Result<Message> {
    let from_mbox = from
        .parse::<Mailbox>()
        .map_err(|e| CertsendError::SmtpSend {
            entry_index,
            reason: format!("invalid from address '{from}': {e}"),
        })?;
    let to_mbox = attendee
        .email
        .parse::<Mailbox>()
        .map_err(|e| CertsendError::SmtpSend {
            entry_index,
            reason: format!("invalid to address '{}': {e}", attendee.email),
        })?;

    let mixed = MultiPart::mixed()
        .singlepart(SinglePart::html(process_body(attendee, &email.body)))
        .singlepart(
            Attachment::new(email.attached_certificate_filename.clone())
                .body(attachment, content_type),
        );

    Message::builder()
        .from(from_mbox)
        .to(to_mbox)
        .subject(&email.subject)
        .multipart(mixed)
        .map_err(|e| CertsendError::SmtpSend {
            entry_index,
            reason: format!("failed to build message: {e}"),
        })
}

/// Whether one certificate reached the SMTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Failed(String),
}

/// Send outcome for a single attendee.
#[derive(Debug, Clone)]
pub struct SendResult {
    /// 1-based attendee index.
    pub entry_index: usize,
    pub recipient: String,
    pub outcome: SendOutcome,
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        self.outcome == SendOutcome::Sent
    }
}

/// Aggregate send report for all attendees.
#[derive(Debug, Default)]
pub struct SendReport {
    pub results: Vec<SendResult>,
}

impl SendReport {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SendResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Mails saved certificates over one transport, one attendee at a time.
pub struct CertificateMailer<'a, T> {
    transport: &'a T,
    email: &'a EmailSection,
    from: &'a str,
    content_type: ContentType,
}

impl<'a, T> CertificateMailer<'a, T>
where
    T: AsyncTransport + Sync,
    T::Error: Display,
{
    pub fn new(transport: &'a T, email: &'a EmailSection, from: &'a str, extension: &str) -> Self {
        Self {
            transport,
            email,
            from,
            content_type: attachment_content_type(extension),
        }
    }

    /// Mail the certificate saved at `certificate`. Never fails the batch: any
    /// problem becomes [`SendOutcome::Failed`] and is logged with the attendee index.
    pub async fn deliver(
        &self,
        attendee: &Attendee,
        entry_index: usize,
        certificate: &Path,
    ) -> SendResult {
        let outcome = match self.try_deliver(attendee, entry_index, certificate).await {
            Ok(()) => {
                tracing::info!(
                    attendee = entry_index,
                    recipient = %attendee.email,
                    "certificate sent"
                );
                SendOutcome::Sent
            }
            Err(reason) => {
                tracing::error!(
                    attendee = entry_index,
                    recipient = %attendee.email,
                    error = %reason,
                    "failed to send certificate"
                );
                SendOutcome::Failed(reason)
            }
        };
        SendResult {
            entry_index,
            recipient: attendee.email.clone(),
            outcome,
        }
    }

    async fn try_deliver(
        &self,
        attendee: &Attendee,
        entry_index: usize,
        certificate: &Path,
    ) -> std::result::Result<(), String> {
        let bytes = std::fs::read(certificate).map_err(|e| {
            CertsendError::Io {
                path: certificate.to_path_buf(),
                source: e,
            }
            .to_string()
        })?;
        let message = build_message(
            self.email,
            self.from,
            attendee,
            entry_index,
            bytes,
            self.content_type.clone(),
        )
        .map_err(|e| e.to_string())?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
