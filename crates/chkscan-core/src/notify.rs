//! Failure notification.
//!
//! [`Notifier`] is the seam the pipeline calls when verification fails;
//! [`SmtpNotifier`] is the production implementation that mails an HTML report
//! over STARTTLS with username/password auth.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fmt::Write as _;

use crate::config::SmtpConfig;
use crate::report::RunReport;

/// Fixed subject line of the failure mail.
pub const SUBJECT: &str = "CHECKING CHKSUM";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid mail address {address:?} (set SMTP_FROM if the login is not an address): {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends a report about archives that failed verification.
pub trait Notifier {
    fn notify(&self, report: &RunReport) -> Result<(), NotifyError>;
}

/// Mails the report through an authenticated STARTTLS submission server.
pub struct SmtpNotifier {
    smtp: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }

    fn build_message(&self, report: &RunReport) -> Result<Message, NotifyError> {
        let from: Mailbox = self.smtp.sender.parse().map_err(|source| NotifyError::Address {
            address: self.smtp.sender.clone(),
            source,
        })?;
        let to: Mailbox = self.smtp.receiver.parse().map_err(|source| NotifyError::Address {
            address: self.smtp.receiver.clone(),
            source,
        })?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render_html(report))?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, report: &RunReport) -> Result<(), NotifyError> {
        let message = self.build_message(report)?;
        let credentials = Credentials::new(self.smtp.username.clone(), self.smtp.password.clone());
        let mailer = SmtpTransport::starttls_relay(&self.smtp.server)?
            .port(self.smtp.port)
            .credentials(credentials)
            .build();
        tracing::info!(
            "Sending email to {} about missing chksum files...",
            self.smtp.receiver
        );
        mailer.send(&message)?;
        tracing::info!("Email sent successfully.");
        Ok(())
    }
}

/// HTML body: one `<li>` per archive missing its marker, plus a second list for
/// archives that could not be downloaded or opened.
pub fn render_html(report: &RunReport) -> String {
    let mut html = String::from("<html><body>\n<p>Hello,</p>\n");
    if !report.without_marker.is_empty() {
        html.push_str("<p>CHKSUM not Available for the following 7z file(s):</p>\n<ul>");
        for name in &report.without_marker {
            let _ = write!(html, "<li>{}</li>", escape_html(name));
        }
        html.push_str("</ul>\n");
    }
    if !report.failed.is_empty() {
        html.push_str("<p>The following 7z file(s) could not be verified:</p>\n<ul>");
        for f in &report.failed {
            let _ = write!(
                html,
                "<li>{} ({})</li>",
                escape_html(&f.file_name),
                escape_html(&f.reason)
            );
        }
        html.push_str("</ul>\n");
    }
    html.push_str("<p>Regards,<br>DevOps</p>\n</body></html>");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
