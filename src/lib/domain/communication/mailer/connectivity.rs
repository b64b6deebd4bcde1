//! Transport connectivity check

use serde::Serialize;
use tracing::debug;

use super::Mailer;
use crate::domain::communication::email_addresses::Address;

/// Outcome of a transport check, shaped for display to whoever ran it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportCheck {
    /// Whether the test email was accepted
    pub success: bool,

    /// Human-readable outcome
    pub message: String,

    /// Provider transmission id on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_id: Option<String>,
}

/// Sends the diagnostic email through `mailer` and reports the outcome.
pub async fn check_transport<M: Mailer>(mailer: &M, to: &Address) -> TransportCheck {
    match mailer.send_test_email(to).await {
        Ok(result) => TransportCheck {
            success: true,
            message: "Success!".to_string(),
            transmission_id: Some(result.id),
        },
        Err(err) => {
            debug!("transport check failed: {:?}", err);

            TransportCheck {
                success: false,
                message: err.to_string(),
                transmission_id: None,
            }
        }
    }
}
