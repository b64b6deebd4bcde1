//! Outcome of a successful send

/// Content as rendered by the provider's previewer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedPreview {
    /// Rendered subject
    pub subject: String,

    /// Rendered HTML body, absent for text-only messages
    pub html: Option<String>,
}

/// Result of a transmission accepted by the provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransmissionResult {
    /// Provider transmission id, used to correlate delivery events
    pub id: String,

    /// Number of recipients the provider accepted
    pub total_accepted_recipients: u64,

    /// Number of recipients the provider rejected
    pub total_rejected_recipients: u64,

    /// The preview rendered before the transmission was created
    pub preview: RenderedPreview,
}
