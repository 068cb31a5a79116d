use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use backend_domain::ports::ReportMailer;
use backend_domain::{MailConfig, ReportEmail};

/// Delivers report emails through an SMTP relay using STARTTLS.
pub struct SmtpReportMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl SmtpReportMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| anyhow!("smtp_host is not configured"))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("invalid SMTP relay {}", host))?
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.smtp_timeout_seconds)));
        if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox(&config.mail_from)?,
            recipients: parse_recipients(&config.mail_recipients)?,
        })
    }
}

#[async_trait]
impl ReportMailer for SmtpReportMailer {
    async fn send(&self, email: ReportEmail) -> Result<usize> {
        let subject = email.subject.clone();
        let message = build_message(&self.from, &self.recipients, email)?;
        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;
        info!(
            "sent '{}' to {} recipients",
            subject,
            self.recipients.len()
        );
        Ok(self.recipients.len())
    }
}

/// Used when no SMTP relay is configured: logs what would have been sent.
pub struct DryRunMailer {
    recipients: Vec<String>,
}

impl DryRunMailer {
    pub fn new(recipients: Vec<String>) -> Self {
        Self { recipients }
    }
}

#[async_trait]
impl ReportMailer for DryRunMailer {
    async fn send(&self, email: ReportEmail) -> Result<usize> {
        let attachments: Vec<&str> = email
            .attachments
            .iter()
            .map(|item| item.filename.as_str())
            .collect();
        warn!(
            "smtp_host not set, skipping delivery of '{}' ({} bytes html, {} inline images, attachments {:?}) to {:?}",
            email.subject,
            email.html.len(),
            email.inline_images.len(),
            attachments,
            self.recipients
        );
        Ok(0)
    }
}

pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn ReportMailer>> {
    if config.smtp_host.is_some() {
        Ok(Arc::new(SmtpReportMailer::from_config(config)?))
    } else {
        Ok(Arc::new(DryRunMailer::new(config.mail_recipients.clone())))
    }
}

/// multipart/mixed holding multipart/related (HTML plus inline images)
/// followed by one part per attachment.
pub fn build_message(
    from: &Mailbox,
    recipients: &[Mailbox],
    email: ReportEmail,
) -> Result<Message> {
    if recipients.is_empty() {
        return Err(anyhow!("no recipients configured"));
    }

    let mut related = MultiPart::related().singlepart(SinglePart::html(email.html));
    for image in email.inline_images {
        let content_type = parse_content_type(&image.content_type)?;
        related = related.singlepart(
            Attachment::new_inline(image.content_id).body(image.bytes, content_type),
        );
    }

    let mut mixed = MultiPart::mixed().multipart(related);
    for attachment in email.attachments {
        let content_type = parse_content_type(&attachment.content_type)?;
        mixed = mixed
            .singlepart(Attachment::new(attachment.filename).body(attachment.bytes, content_type));
    }

    let mut builder = Message::builder().from(from.clone()).subject(email.subject);
    for recipient in recipients {
        builder = builder.to(recipient.clone());
    }
    builder
        .multipart(mixed)
        .context("failed to build report message")
}

fn parse_content_type(value: &str) -> Result<ContentType> {
    ContentType::parse(value).map_err(|err| anyhow!("invalid content type {}: {}", value, err))
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .with_context(|| format!("invalid mail address {}", address))
}

fn parse_recipients(addresses: &[String]) -> Result<Vec<Mailbox>> {
    addresses.iter().map(|address| parse_mailbox(address)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{EmailAttachment, InlineImage};

    fn email() -> ReportEmail {
        ReportEmail {
            subject: "Daily Sales Report - 04/06/2024".to_string(),
            html: "<img src=\"cid:sales_by_hour.svg\" />".to_string(),
            inline_images: vec![InlineImage {
                content_id: "sales_by_hour.svg".to_string(),
                content_type: "image/svg+xml".to_string(),
                bytes: b"<svg></svg>".to_vec(),
            }],
            attachments: vec![EmailAttachment {
                filename: "sales_detail_2024-06-04_to_2024-06-04.csv".to_string(),
                content_type: "text/csv; charset=utf-8".to_string(),
                bytes: b"sold_at,price\n".to_vec(),
            }],
        }
    }

    #[test]
    fn message_nests_inline_images_and_attachment() {
        let from = parse_mailbox("reports@example.com").expect("from");
        let recipients =
            parse_recipients(&["ops@example.com".to_string(), "owner@example.com".to_string()])
                .expect("recipients");

        let message = build_message(&from, &recipients, email()).expect("message");
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Daily Sales Report - 04/06/2024"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("multipart/related"));
        assert!(raw.contains("Content-ID: <sales_by_hour.svg>"));
        assert!(raw.contains("sales_detail_2024-06-04_to_2024-06-04.csv"));
        assert!(raw.contains("ops@example.com"));
        assert!(raw.contains("owner@example.com"));
    }

    #[test]
    fn message_without_recipients_is_rejected() {
        let from = parse_mailbox("reports@example.com").expect("from");
        assert!(build_message(&from, &[], email()).is_err());
    }

    #[test]
    fn bad_addresses_are_rejected() {
        assert!(parse_recipients(&["not an address".to_string()]).is_err());
    }

    #[tokio::test]
    async fn dry_run_mailer_reports_zero_recipients() {
        let mailer = build_mailer(&MailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_password: None,
            mail_from: String::new(),
            mail_recipients: vec!["ops@example.com".to_string()],
            smtp_timeout_seconds: 30,
        })
        .expect("mailer");

        assert_eq!(mailer.send(email()).await.expect("send"), 0);
    }
}
