//! Adapters for external services

pub mod email;
pub mod http;
