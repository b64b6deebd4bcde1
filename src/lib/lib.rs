#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sparkpost mail transport
//!
//! Forwards outgoing messages to the Sparkpost transmissions API after checking
//! that their content renders through the content previewer.

pub mod domain;
pub mod infrastructure;
