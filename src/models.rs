//! Typed Mailgun API responses.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// A typed response whose success flag is derived from the HTTP exchange.
///
/// The flag is never read from the body; [`crate::MailgunService`] sets it
/// after inspecting the transport outcome and status code.
pub trait ApiResponse: DeserializeOwned + Default {
    /// `true` when the call completed with HTTP 200.
    fn success(&self) -> bool;

    #[doc(hidden)]
    fn set_success(&mut self, success: bool);
}

macro_rules! impl_api_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn set_success(&mut self, success: bool) {
                    self.success = success;
                }
            }
        )*
    };
}

/// Single-address lookup in a suppression list (unsubscribes, bounces,
/// complaints).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailAddressResponse {
    /// Set by the service: the lookup completed with HTTP 200.
    #[serde(skip)]
    pub success: bool,
    /// The suppressed address, absent when not listed.
    pub address: Option<String>,
    /// SMTP error code, bounces only.
    pub code: Option<String>,
    /// SMTP error text, bounces only.
    pub error: Option<String>,
    /// Unsubscribed tags, unsubscribes only.
    pub tags: Vec<String>,
    /// When the entry was added, RFC 1123.
    pub created_at: Option<String>,
    /// Error message returned instead of an entry, e.g. when not found.
    pub message: Option<String>,
}

impl EmailAddressResponse {
    /// Whether the lookup returned a non-empty address.
    pub fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

impl fmt::Display for EmailAddressResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address.as_deref().unwrap_or_default())
    }
}

/// Links to neighbouring pages of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Paging {
    /// Following page.
    pub next: Option<String>,
    /// Preceding page.
    pub previous: Option<String>,
    /// First page.
    pub first: Option<String>,
    /// Last page.
    pub last: Option<String>,
}

/// A page of `T` items with paging links.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de>"))]
pub struct PagedResponse<T> {
    /// Set by the service: the call completed with HTTP 200.
    #[serde(skip)]
    pub success: bool,
    /// Items on this page.
    pub items: Vec<T>,
    /// Links to neighbouring pages.
    pub paging: Option<Paging>,
}

impl<T> Default for PagedResponse<T> {
    fn default() -> Self {
        Self {
            success: false,
            items: Vec::new(),
            paging: None,
        }
    }
}

impl<T> PagedResponse<T> {
    /// URL of the next page, if any.
    pub fn next_page(&self) -> Option<&str> {
        Self::link(self.paging.as_ref()?.next.as_deref())
    }

    /// URL of the previous page, if any.
    pub fn previous_page(&self) -> Option<&str> {
        Self::link(self.paging.as_ref()?.previous.as_deref())
    }

    fn link(url: Option<&str>) -> Option<&str> {
        url.filter(|u| !u.is_empty())
    }
}

impl<T: DeserializeOwned> ApiResponse for PagedResponse<T> {
    fn success(&self) -> bool {
        self.success
    }

    fn set_success(&mut self, success: bool) {
        self.success = success;
    }
}

/// One entry from the events API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Event identifier.
    pub id: String,
    /// Event kind, e.g. `delivered`.
    #[serde(rename = "event")]
    pub event_name: String,
    /// Address the event concerns.
    pub recipient: String,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<f64>,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event_name)
    }
}

/// Acknowledgement returned when a message is queued.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendMailResponse {
    /// Set by the service: the message was accepted with HTTP 200.
    #[serde(skip)]
    pub success: bool,
    /// Message-Id of the queued message.
    pub id: String,
    /// Status text, e.g. `Queued. Thank you.`
    pub message: String,
}

impl_api_response!(EmailAddressResponse, SendMailResponse);

/// Page of suppression list entries.
pub type EmailAddressCollection = PagedResponse<EmailAddressResponse>;

/// Page of events.
pub type EventCollection = PagedResponse<EventRecord>;
