//! Email service module

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod connectivity;
mod errors;
mod message;
mod observer;
mod transmission;

pub use connectivity::{check_transport, TransportCheck};
pub use errors::MailerError;
pub use message::{Attachment, Message, Recipient};
pub use observer::{SendObserver, TracingObserver};
pub use transmission::{RenderedPreview, TransmissionResult};

use super::email_addresses::Address;

/// Email service
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Send a message
    ///
    /// # Arguments
    /// * `message` - The [`Message`] to deliver to all of its recipients.
    ///
    /// # Returns
    /// - [`Ok`] with the provider's [`TransmissionResult`] if every recipient was accepted.
    /// - [`Err`] containing a [`MailerError`] otherwise.
    async fn send(&self, message: &Message) -> Result<TransmissionResult, MailerError>;

    /// Send the canned diagnostic email used to check connectivity
    ///
    /// # Arguments
    /// * `to` - The [`Address`] receiving the test email.
    async fn send_test_email(&self, to: &Address) -> Result<TransmissionResult, MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, message: &Message) -> Result<TransmissionResult, MailerError>;
        async fn send_test_email(&self, to: &Address) -> Result<TransmissionResult, MailerError>;
    }
}

#[cfg(test)]
pub mod tests {
    pub use super::observer::MockSendObserver;
    pub use super::MockMailer;
}
