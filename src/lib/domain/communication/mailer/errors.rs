//! Mailer errors

use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The message has no sender
    #[error("The message has no sender address")]
    MissingSender,

    /// The message has no recipients
    #[error("The message has no recipients")]
    MissingRecipients,

    /// The provider answered with a body that is not JSON
    #[error(
        "Invalid Sparkpost JSON response. JSON error: \"{json_error}\", HTTP status code: {status}, HTTP response string: \"{body}\""
    )]
    InvalidResponse {
        /// Decoder error description
        json_error: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The provider answered with JSON of an unexpected shape
    #[error("Unexpected Sparkpost response, HTTP status code: {status}, HTTP response string: \"{body}\"")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The provider refused the request
    #[error("Unable to send an email: {message} (code {status}).")]
    Api {
        /// Error messages reported by the provider
        message: String,
        /// HTTP status code
        status: u16,
    },

    /// The provider accepted the call but rejected some recipients
    #[error("Sparkpost rejected {rejected} recipient(s) ({accepted} accepted)")]
    RejectedRecipients {
        /// Number of rejected recipients
        rejected: u64,
        /// Number of accepted recipients
        accepted: u64,
        /// Transmission id, when the provider returned one
        transmission_id: Option<String>,
    },

    /// The provider could not be reached
    #[error("Could not reach the remote Sparkpost server: {0:#}")]
    Transport(anyhow::Error),

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for MailerError {
    fn from(err: anyhow::Error) -> Self {
        MailerError::UnknownError(err)
    }
}

impl From<serde_json::Error> for MailerError {
    fn from(err: serde_json::Error) -> Self {
        MailerError::UnknownError(err.into())
    }
}
