//! Email message

use std::collections::BTreeMap;

use crate::domain::communication::email_addresses::Address;

/// Email message
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The sender of the email
    pub from: Option<Address>,

    /// The recipients of the email
    pub to: Vec<Recipient>,

    /// Where replies should go, defaults to the sender
    pub reply_to: Option<Address>,

    /// The subject of the email
    pub subject: String,

    /// The HTML body of the email
    pub html_body: Option<String>,

    /// The plain text body of the email
    pub plain_body: Option<String>,

    /// Custom headers, by name
    pub headers: BTreeMap<String, String>,

    /// Files attached to the email
    pub attachments: Vec<Attachment>,

    /// Tags reported back by the provider's events
    pub tags: Vec<String>,

    /// Campaign the email belongs to
    pub campaign_id: Option<String>,

    /// Whether the provider should inline CSS into the HTML body
    pub inline_css: Option<bool>,
}

impl Message {
    /// Creates an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Adds a recipient without personalization tokens
    pub fn to(mut self, address: Address) -> Self {
        self.to.push(Recipient::new(address));
        self
    }

    /// Adds a recipient together with its resolved tokens
    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.to.push(recipient);
        self
    }

    /// Sets the reply-to address
    pub fn reply_to(mut self, reply_to: Address) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Sets the subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the HTML body
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    /// Sets the plain text body
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.plain_body = Some(text.into());
        self
    }

    /// Adds a custom header, replacing any previous value
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds an attachment
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Whether any recipient carries personalization tokens
    pub fn is_personalized(&self) -> bool {
        self.to.iter().any(|recipient| !recipient.tokens.is_empty())
    }
}

/// A recipient and the values of the tokens resolved for them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    /// The recipient's address
    pub address: Address,

    /// Placeholder (e.g. `{contactfield=email}`) to value
    pub tokens: BTreeMap<String, String>,
}

impl Recipient {
    /// Creates a recipient without tokens
    pub fn new(address: Address) -> Self {
        Self {
            address,
            tokens: BTreeMap::new(),
        }
    }

    /// Adds a resolved token
    pub fn token(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(placeholder.into(), value.into());
        self
    }
}

/// A file attached to a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient
    pub filename: String,

    /// MIME type
    pub content_type: String,

    /// Raw file contents
    pub data: Vec<u8>,
}
