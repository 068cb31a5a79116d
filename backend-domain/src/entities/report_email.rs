// Composed report email, ready for delivery

#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Referenced from the HTML body as `cid:<content_id>`.
    pub content_id: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEmail {
    pub subject: String,
    pub html: String,
    pub inline_images: Vec<InlineImage>,
    pub attachments: Vec<EmailAttachment>,
}
