//! The per-run batch: render every attendee's certificate, then preview, save
//! and mail it according to the selected actions.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use lettre::AsyncTransport;

use crate::config::RunConfig;
use crate::data::Attendee;
use crate::output::{ClearOutcome, RunOutput};
use crate::preview::Previewer;
use crate::render::CertificateRenderer;
use crate::smtp::{CertificateMailer, SendReport};
use crate::CertsendError;

/// Which side effects a run performs for each certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions {
    pub preview: bool,
    pub save: bool,
    pub send: bool,
}

impl Actions {
    pub const PREVIEW_ONLY: Self = Self {
        preview: true,
        save: false,
        send: false,
    };

    /// Parse an optional comma-separated selector; nothing selected means preview.
    pub fn parse(selector: Option<&str>) -> crate::Result<Self> {
        match selector {
            Some(s) if !s.trim().is_empty() => s.parse(),
            _ => Ok(Self::PREVIEW_ONLY),
        }
    }

    /// Sending attaches the file on disk, so it needs the certificate written too.
    pub fn writes_output(&self) -> bool {
        self.save || self.send
    }

    /// Output sent but not explicitly saved is only scaffolding for the attachment.
    pub fn clears_output(&self, clear_requested: bool) -> bool {
        clear_requested || (self.send && !self.save)
    }
}

impl FromStr for Actions {
    type Err = CertsendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut actions = Self::default();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "preview" => actions.preview = true,
                "save" => actions.save = true,
                "send" => actions.send = true,
                _ => {
                    return Err(CertsendError::ActionSelection {
                        action: token.to_string(),
                    })
                }
            }
        }
        if actions == Self::default() {
            return Ok(Self::PREVIEW_ONLY);
        }
        Ok(actions)
    }
}

/// Everything fixed for the duration of a run.
pub struct BatchContext<'a> {
    pub config: &'a RunConfig,
    pub renderer: &'a CertificateRenderer,
    pub output: &'a RunOutput,
    pub actions: Actions,
    pub clear_requested: bool,
}

#[derive(Debug)]
pub struct BatchSummary {
    pub processed: usize,
    /// Certificates written during the run (they may since have been cleared).
    pub written: Vec<PathBuf>,
    pub sends: Option<SendReport>,
    pub cleared: Option<ClearOutcome>,
}

impl BatchSummary {
    pub fn summary_line(&self) -> String {
        let plural = if self.processed == 1 { "" } else { "s" };
        let mut line = format!(
            "{} certificate{plural} processed successfully",
            self.processed
        );
        if let Some(report) = self.sends.as_ref().filter(|r| r.failure_count() > 0) {
            line.push_str(&format!(
                " ({} of {} emails failed to send)",
                report.failure_count(),
                report.results.len()
            ));
        }
        line
    }
}

/// Process every attendee in list order.
///
/// Rendering, preview and save failures abort the batch. Send failures are
/// recorded in the summary's [`SendReport`] and the batch carries on.
pub async fn run_batch<P, T>(
    ctx: &BatchContext<'_>,
    attendees: &[Attendee],
    mut previewer: Option<&mut P>,
    mailer: Option<&CertificateMailer<'_, T>>,
) -> crate::Result<BatchSummary>
where
    P: Previewer + ?Sized,
    T: AsyncTransport + Sync,
    T::Error: Display,
{
    let actions = ctx.actions;
    if actions.preview && previewer.is_none() {
        return Err(CertsendError::PreviewUnavailable);
    }
    if actions.send && mailer.is_none() {
        return Err(CertsendError::SmtpConnect {
            reason: "send was selected but no SMTP transport is configured".to_string(),
        });
    }

    let title = &ctx.config.email.attached_certificate_filename;
    let mut written = Vec::new();
    let mut sends = actions.send.then(SendReport::default);

    for (offset, attendee) in attendees.iter().enumerate() {
        let index = offset + 1;
        let certificate = ctx.renderer.render(&attendee.fullname);

        if actions.preview {
            if let Some(previewer) = previewer.as_mut() {
                previewer.show(title, &certificate)?;
            }
        }

        let saved = if actions.writes_output() {
            let path = ctx.output.save(
                index,
                ctx.renderer.extension(),
                ctx.renderer.format(),
                &certificate,
            )?;
            written.push(path.clone());
            Some(path)
        } else {
            None
        };
        tracing::info!(attendee = index, "certificate generated");

        if let (Some(report), Some(mailer), Some(path)) = (sends.as_mut(), mailer, saved) {
            report.results.push(mailer.deliver(attendee, index, &path).await);
        }
    }

    let cleared = actions
        .clears_output(ctx.clear_requested)
        .then(|| ctx.output.clear());

    Ok(BatchSummary {
        processed: attendees.len(),
        written,
        sends,
        cleared,
    })
}
