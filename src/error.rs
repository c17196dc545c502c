//! Error types for Mailgun operations.

use std::io;
use std::path::PathBuf;

/// Errors surfaced by the request builder and [`crate::MailgunService`].
///
/// Remote API failures (any non-200 status) and transport failures are *not*
/// represented here: they produce a response whose success flag is `false`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A builder input was empty or otherwise unusable.
    #[error("Invalid argument `{0}`: value must not be empty")]
    InvalidArgument(&'static str),

    /// Attachment kind other than `inline` or `attachment`.
    #[error("Unknown attachment kind: {0}")]
    UnknownAttachmentKind(String),

    /// Domain or API key was not configured.
    #[error("{0} is not set. Please set a valid {0} before executing requests")]
    MissingConfig(&'static str),

    /// An attachment file could not be read.
    #[error("Failed to read attachment {}: {source}", .path.display())]
    Attachment {
        /// Path of the attachment.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL is invalid.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}
