//! # Mailgun Client
//! Asynchronous wrapper around the Mailgun transactional email HTTP API: describe a call with [`RequestBuilder`], run it through [`MailgunService`], and get back typed responses such as [`SendMailResponse`] or [`EventCollection`].
//!
//! ## Audience and uses
//! For Rust services that send mail through Mailgun and need to inspect what happened afterwards: queue messages with attachments, page through delivery events, and check the unsubscribe, bounce and complaint lists before mailing an address ([`MailgunService::is_suppressed`]).
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, so ensure the chosen Tokio features (`rt-multi-thread` or `current_thread`) are available in your application.
//!
//! ## Out of scope
//! No retries, backoff or rate limiting: every call is one HTTP round trip. Pagination follows one link per call ([`MailgunService::get_page`]). Attachments are read fully into memory before upload.
//!
//! ## Errors
//! Invalid builder input and missing configuration fail immediately with [`Error::InvalidArgument`] or [`Error::MissingConfig`]. Remote API errors and transport failures are not errors: they produce a response whose `success` flag is `false`. A body that does not match the expected response type surfaces as [`Error::Json`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use mailgun_client::{MailgunService, RequestBuilder, SendMailResponse};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailgun_client::Error> {
//!     let service = MailgunService::new("mg.example.com", "key-xxx")?;
//!
//!     let (suppressed, reason) = service.is_suppressed("you@example.com").await?;
//!     if suppressed {
//!         println!("Not sending: {}", reason);
//!         return Ok(());
//!     }
//!
//!     let request = RequestBuilder::new()
//!         .for_send_message()
//!         .from("Me <me@mg.example.com>")?
//!         .to("you@example.com")?
//!         .subject("Hello")?
//!         .text("Sent with mailgun-client")
//!         .attachment("report.pdf")?
//!         .build();
//!
//!     let sent: SendMailResponse = service.get_response(&request).await?;
//!     println!("{}: {}", sent.id, sent.message);
//!     Ok(())
//! }
//! ```

mod builder;
mod error;
mod event;
mod models;
mod request;
mod service;

pub use builder::RequestBuilder;
pub use error::Error;
pub use event::EventType;
pub use models::{
    ApiResponse, EmailAddressCollection, EmailAddressResponse, EventCollection, EventRecord,
    PagedResponse, Paging, SendMailResponse,
};
pub use request::{Attachment, AttachmentKind, ResourceRequest};
pub use service::{
    BASE_URL, EU_BASE_URL, MailgunService, MailgunServiceBuilder, RawResponse, TransportStatus,
};

/// Result type alias for Mailgun operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
