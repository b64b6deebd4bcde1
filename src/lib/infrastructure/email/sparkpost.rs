//! Sparkpost API mailer
//!
//! Every send is two sequential calls: the content previewer checks that the
//! message renders, then the transmissions endpoint delivers it. A failure in
//! either call aborts the send; nothing is retried here.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    domain::communication::{
        email_addresses::Address,
        mailer::{
            Mailer, MailerError, Message, RenderedPreview, SendObserver, TransmissionResult,
        },
    },
    infrastructure::http::HttpClient,
};

mod config;
mod dsn;
mod payload;
mod response;

pub use config::{ConfigError, SparkpostConfig, SparkpostSettings};
pub use dsn::{DsnError, Region, SparkpostDsn, SCHEME};
pub use payload::merge_var_name;

use payload::TransmissionRequest;
use response::{decode, PreviewResponse, TransmissionResponse};

const PREVIEW_PATH: &str = "/api/v1/utils/content-previewer/";
const TRANSMISSIONS_PATH: &str = "/api/v1/transmissions/";

/// Subject of the connectivity test email
pub const TEST_EMAIL_SUBJECT: &str = "Mautic test email";

/// Body of the connectivity test email
pub const TEST_EMAIL_TEXT: &str =
    "Hi! This is a test email from Mautic. Testing...testing...1...2...3!";

/// Sparkpost mailer
pub struct SparkpostMailer<H: HttpClient> {
    config: Arc<SparkpostConfig>,
    http: Arc<H>,
    observer: Option<Arc<dyn SendObserver>>,
}

impl<H: HttpClient> SparkpostMailer<H> {
    /// Create a new Sparkpost mailer
    pub fn new(config: SparkpostConfig, http: Arc<H>) -> Self {
        Self {
            config: Arc::new(config),
            http,
            observer: None,
        }
    }

    /// Notify `observer` after every send
    pub fn with_observer(mut self, observer: Arc<dyn SendObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The mailer's configuration
    pub fn config(&self) -> &SparkpostConfig {
        &self.config
    }

    /// Previews then transmits `message`, without notifying the observer.
    pub(crate) async fn do_send_api(
        &self,
        message: &Message,
    ) -> Result<TransmissionResult, MailerError> {
        let transmission = TransmissionRequest::build(message, &self.config.payload)?;

        debug!(
            recipients = transmission.recipients.len(),
            attachments = message.attachments.len(),
            "sending Sparkpost transmission"
        );

        let preview: RenderedPreview = self
            .post::<_, PreviewResponse>(PREVIEW_PATH, &transmission.preview())
            .await?
            .into();

        debug!(
            subject_len = preview.subject.len(),
            has_html = preview.html.is_some(),
            "content preview rendered"
        );

        let results = self
            .post::<_, TransmissionResponse>(TRANSMISSIONS_PATH, &transmission)
            .await?
            .results;

        if results.total_rejected_recipients > 0 {
            return Err(MailerError::RejectedRecipients {
                rejected: results.total_rejected_recipients,
                accepted: results.total_accepted_recipients,
                transmission_id: Some(results.id).filter(|id| !id.is_empty()),
            });
        }

        Ok(TransmissionResult {
            id: results.id,
            total_accepted_recipients: results.total_accepted_recipients,
            total_rejected_recipients: results.total_rejected_recipients,
            preview,
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, MailerError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url(), path);
        let body = serde_json::to_string(body)?;

        debug!(%url, bytes = body.len(), "sending Sparkpost request");

        let response = self
            .http
            .post_json(&url, self.config.api_key(), body)
            .await
            .map_err(MailerError::Transport)?;

        debug!(
            %url,
            status = response.status,
            bytes = response.body.len(),
            "Sparkpost response"
        );

        decode(&response)
    }

    fn test_message(&self, to: &Address) -> Result<Message, MailerError> {
        let from = self
            .config
            .from()
            .cloned()
            .ok_or(MailerError::MissingSender)?;

        Ok(Message::new()
            .from(from.clone())
            .reply_to(from)
            .to(to.clone())
            .subject(TEST_EMAIL_SUBJECT)
            .text(TEST_EMAIL_TEXT))
    }

    fn notify(&self, message: &Message, result: &Result<TransmissionResult, MailerError>) {
        if let Some(observer) = &self.observer {
            match result {
                Ok(transmission) => observer.on_sent(message, transmission),
                Err(err) => observer.on_failed(message, err),
            }
        }
    }
}

impl<H: HttpClient> Clone for SparkpostMailer<H> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            http: Arc::clone(&self.http),
            observer: self.observer.clone(),
        }
    }
}

impl<H: HttpClient> fmt::Debug for SparkpostMailer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparkpostMailer")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<H: HttpClient> Mailer for SparkpostMailer<H> {
    async fn send(&self, message: &Message) -> Result<TransmissionResult, MailerError> {
        let result = self.do_send_api(message).await;

        self.notify(message, &result);

        result
    }

    async fn send_test_email(&self, to: &Address) -> Result<TransmissionResult, MailerError> {
        let message = self.test_message(to)?;

        self.send(&message).await
    }
}
