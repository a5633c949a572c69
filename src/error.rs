use thiserror::Error;

/// Errors surfaced by invoice generation and storage. Every error is terminal
/// to the single operation it occurs in; callers keep their in-memory state
/// and may retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected user input. The message is user-facing plain text.
    #[error("{0}")]
    Validation(String),

    /// A rendering asset the layout committed space for is unavailable.
    #[error("required asset missing: {0}")]
    AssetMissing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid invoice record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("QR encoding failed: {0}")]
    Qr(String),
}
