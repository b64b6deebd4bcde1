//! Sparkpost request bodies

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::domain::communication::mailer::{Attachment, MailerError, Message, Recipient};

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
}

/// Headers describing the MIME structure or the envelope, never forwarded
const STANDARD_HEADERS: [&str; 11] = [
    "MIME-Version",
    "received",
    "dkim-signature",
    "Content-Type",
    "Content-Transfer-Encoding",
    "To",
    "From",
    "Subject",
    "Reply-To",
    "CC",
    "BCC",
];

/// Placeholders every personalized send carries, even when the host has no value
const REQUIRED_TOKENS: [&str; 6] = [
    "{signature}",
    "{tracking_pixel}",
    "{unsubscribe_text}",
    "{unsubscribe_url}",
    "{webview_text}",
    "{webview_url}",
];

const SUBJECT_TOKEN: &str = "{subject}";

/// Settings applied to every payload
#[derive(Debug, Clone, Default)]
pub struct PayloadOptions {
    /// Headers added to every message, overridden by the message's own
    pub global_headers: BTreeMap<String, String>,

    /// Enables both open and click tracking
    pub tracking_enabled: bool,
}

/// Sparkpost substitution key for a host placeholder: `{contactfield=email}` becomes `CONTACTFIELDEMAIL`
pub fn merge_var_name(placeholder: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(placeholder, "")
        .to_ascii_uppercase()
}

/// The `content` block shared by both endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub from: String,
    pub subject: String,
    pub headers: BTreeMap<String, String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub reply_to: String,
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub data: String,
}

impl From<&Attachment> for AttachmentPayload {
    fn from(attachment: &Attachment) -> Self {
        Self {
            name: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            data: STANDARD.encode(&attachment.data),
        }
    }
}

/// Open and click tracking always move together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackingOptions {
    pub open_tracking: bool,
    pub click_tracking: bool,
}

impl TrackingOptions {
    pub fn new(enabled: bool) -> Self {
        Self {
            open_tracking: enabled,
            click_tracking: enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientPayload {
    pub address: RecipientAddress,
    pub substitution_data: BTreeMap<String, String>,
}

/// Body of `POST /api/v1/transmissions/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransmissionRequest {
    pub content: Content,
    pub recipients: Vec<RecipientPayload>,
    pub inline_css: Option<bool>,
    pub tags: Vec<String>,
    pub campaign_id: String,
    pub options: TrackingOptions,
}

/// Body of `POST /api/v1/utils/content-previewer/`
#[derive(Debug, Serialize)]
pub struct PreviewRequest<'a> {
    pub content: &'a Content,
    pub inline_css: Option<bool>,
    pub tags: &'a [String],
    pub campaign_id: &'a str,
    pub options: TrackingOptions,
    pub substitution_data: &'a BTreeMap<String, String>,
}

impl TransmissionRequest {
    /// Builds the transmission for `message`
    pub fn build(message: &Message, options: &PayloadOptions) -> Result<Self, MailerError> {
        let from = message.from.as_ref().ok_or(MailerError::MissingSender)?;

        if message.to.is_empty() {
            return Err(MailerError::MissingRecipients);
        }

        let personalized = message.is_personalized();
        let placeholders = placeholders(message, personalized);
        let rewrite = |text: &str| to_sparkpost_syntax(text, &placeholders);

        let content = Content {
            from: from.to_string(),
            subject: rewrite(&message.subject),
            headers: merge_headers(&options.global_headers, &message.headers),
            html: message.html_body.as_deref().map(rewrite),
            text: message.plain_body.as_deref().map(rewrite),
            reply_to: message
                .reply_to
                .as_ref()
                .unwrap_or(from)
                .email()
                .to_string(),
            attachments: message.attachments.iter().map(Into::into).collect(),
        };

        let recipients = message
            .to
            .iter()
            .map(|recipient| RecipientPayload {
                address: RecipientAddress {
                    email: recipient.address.email().to_string(),
                    name: recipient.address.name().map(str::to_string),
                },
                substitution_data: substitution_data(message, recipient, personalized),
            })
            .collect();

        Ok(Self {
            content,
            recipients,
            inline_css: message.inline_css,
            tags: message.tags.clone(),
            campaign_id: message.campaign_id.clone().unwrap_or_default(),
            options: TrackingOptions::new(options.tracking_enabled),
        })
    }

    /// The preview request for this transmission, substituted with the first recipient's data
    pub fn preview(&self) -> PreviewRequest<'_> {
        static EMPTY: BTreeMap<String, String> = BTreeMap::new();

        PreviewRequest {
            content: &self.content,
            inline_css: self.inline_css,
            tags: &self.tags,
            campaign_id: &self.campaign_id,
            options: self.options,
            substitution_data: self
                .recipients
                .first()
                .map(|recipient| &recipient.substitution_data)
                .unwrap_or(&EMPTY),
        }
    }
}

/// Placeholder to substitution key, for every placeholder used by the send
fn placeholders(message: &Message, personalized: bool) -> BTreeMap<String, String> {
    let mut placeholders: BTreeMap<String, String> = message
        .to
        .iter()
        .flat_map(|recipient| recipient.tokens.keys())
        .map(|token| (token.clone(), merge_var_name(token)))
        .collect();

    if personalized {
        for token in REQUIRED_TOKENS.into_iter().chain([SUBJECT_TOKEN]) {
            placeholders
                .entry(token.to_string())
                .or_insert_with(|| merge_var_name(token));
        }
    }

    placeholders
}

fn to_sparkpost_syntax(text: &str, placeholders: &BTreeMap<String, String>) -> String {
    placeholders
        .iter()
        .fold(text.to_string(), |text, (placeholder, key)| {
            text.replace(placeholder.as_str(), &format!("{{{{{{ {key} }}}}}}"))
        })
}

fn substitution_data(
    message: &Message,
    recipient: &Recipient,
    personalized: bool,
) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();

    if personalized {
        for token in REQUIRED_TOKENS {
            data.insert(merge_var_name(token), String::new());
        }
        data.insert(
            merge_var_name(SUBJECT_TOKEN),
            rendered_subject(&message.subject, recipient),
        );
    }

    for (token, value) in &recipient.tokens {
        data.insert(merge_var_name(token), value.clone());
    }

    data
}

/// The subject with the recipient's own values in place of its placeholders
fn rendered_subject(subject: &str, recipient: &Recipient) -> String {
    recipient
        .tokens
        .iter()
        .fold(subject.to_string(), |subject, (token, value)| {
            subject.replace(token.as_str(), value)
        })
}

fn merge_headers(
    global: &BTreeMap<String, String>,
    specific: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    for (name, value) in global.iter().chain(specific) {
        if STANDARD_HEADERS
            .iter()
            .any(|standard| standard.eq_ignore_ascii_case(name))
        {
            continue;
        }

        headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(name));
        headers.insert(name.clone(), value.clone());
    }

    headers
}
