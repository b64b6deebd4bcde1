//! Email transports

pub mod sparkpost;
