//! Email communication

pub mod email_addresses;
pub mod mailer;
