//! Send notifications

#[cfg(test)]
use mockall::mock;
use tracing::{info, warn};

use super::{MailerError, Message, TransmissionResult};

/// Notified once a send has finished
pub trait SendObserver: Send + Sync + 'static {
    /// Called after the provider accepted every recipient
    fn on_sent(&self, message: &Message, result: &TransmissionResult);

    /// Called after a send failed, before the error is returned
    fn on_failed(&self, message: &Message, error: &MailerError);
}

#[cfg(test)]
mock! {
    pub SendObserver {}

    impl SendObserver for SendObserver {
        fn on_sent(&self, message: &Message, result: &TransmissionResult);
        fn on_failed(&self, message: &Message, error: &MailerError);
    }
}

/// Logs send outcomes
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SendObserver for TracingObserver {
    fn on_sent(&self, message: &Message, result: &TransmissionResult) {
        info!(
            transmission_id = %result.id,
            accepted = result.total_accepted_recipients,
            subject = %message.subject,
            "email sent"
        );
    }

    fn on_failed(&self, message: &Message, error: &MailerError) {
        warn!(
            recipients = message.to.len(),
            subject = %message.subject,
            "email could not be sent: {error}"
        );
    }
}
