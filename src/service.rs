//! Mailgun async service implementation.

use crate::models::{ApiResponse, EmailAddressResponse};
use crate::request::ResourceRequest;
use crate::{Error, EventType, RequestBuilder, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode, Url};
use std::fmt;
use std::time::Duration;

/// Default Mailgun API endpoint (US region).
pub const BASE_URL: &str = "https://api.mailgun.net/v3";
/// Mailgun API endpoint for domains hosted in the EU region.
pub const EU_BASE_URL: &str = "https://api.eu.mailgun.net/v3";

const API_USER: &str = "api";
const USER_AGENT_VALUE: &str = concat!("mailgun-client/", env!("CARGO_PKG_VERSION"));

/// Async client for the Mailgun HTTP API.
///
/// Use [`MailgunService::new`] for defaults or [`MailgunService::builder`]
/// for custom settings like the EU endpoint, proxies, or a timeout.
pub struct MailgunService {
    http: reqwest::Client,
    domain: String,
    api_key: String,
    base_url: String,
    proxy: Option<String>,
}

impl fmt::Debug for MailgunService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailgunService")
            .field("domain", &self.domain)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// How far a request got before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// A response was received and its body read, whatever the status code.
    Completed,
    /// Connection, DNS, TLS, or body read failure.
    Error,
    /// The configured timeout elapsed.
    TimedOut,
}

/// The unmodified outcome of [`MailgunService::execute`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Whether the exchange completed.
    pub transport: TransportStatus,
    /// `None` when no response was received.
    pub status: Option<StatusCode>,
    /// Response body, empty when none was read.
    pub body: String,
    /// Transport error description, if the request did not complete.
    pub error_message: Option<String>,
}

impl RawResponse {
    fn failed(status: Option<StatusCode>, err: reqwest::Error) -> Self {
        let transport = if err.is_timeout() {
            TransportStatus::TimedOut
        } else {
            TransportStatus::Error
        };

        Self {
            transport,
            status,
            body: String::new(),
            error_message: Some(err.to_string()),
        }
    }

    /// `true` when the request completed with HTTP 200.
    pub fn is_success(&self) -> bool {
        self.transport == TransportStatus::Completed && self.status == Some(StatusCode::OK)
    }
}

impl MailgunService {
    /// Create a builder for configuring the service.
    pub fn builder() -> MailgunServiceBuilder {
        MailgunServiceBuilder::new()
    }

    /// Create a service for `domain` authenticated with `api_key`.
    ///
    /// # Errors
    /// [`Error::MissingConfig`] if either value is empty.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailgun_client::MailgunService;
    /// # fn main() -> Result<(), mailgun_client::Error> {
    /// let service = MailgunService::new("mg.example.com", "key-3ax6xnjp29jd6fds4gc373sgvjxteol0")?;
    /// assert_eq!(service.domain(), "mg.example.com");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(domain: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        MailgunServiceBuilder::new()
            .domain(domain)
            .api_key(api_key)
            .build()
    }

    /// Sending domain requests are made for.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// API endpoint, without the domain.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Perform `request` and return the raw outcome.
    ///
    /// Transport failures do not produce an `Err`; they are reported through
    /// [`RawResponse::transport`]. Errors are returned only for problems
    /// detected before anything is sent, such as an unreadable attachment.
    pub async fn execute(&self, request: &ResourceRequest) -> Result<RawResponse> {
        let url = self.resource_url(request.resource())?;
        let method = request.method().clone();

        log::debug!(
            "{} {} ({} parameters, {} attachments)",
            method,
            request.resource(),
            request.parameters().len(),
            request.attachments().len()
        );

        let mut builder = self
            .http
            .request(method.clone(), url)
            .basic_auth(API_USER, Some(&self.api_key));

        if sends_query(&method) {
            if !request.attachments().is_empty() {
                log::warn!(
                    "{} {} cannot carry attachments, {} file(s) dropped",
                    method,
                    request.resource(),
                    request.attachments().len()
                );
            }
            builder = builder.query(request.parameters());
        } else if request.attachments().is_empty() {
            builder = builder.form(request.parameters());
        } else {
            builder = builder.multipart(multipart_form(request).await?);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("{} {} failed: {}", method, request.resource(), err);
                return Ok(RawResponse::failed(None, err));
            }
        };

        let status = response.status();
        log::debug!("{} {} -> {}", method, request.resource(), status);

        match response.text().await {
            Ok(body) => Ok(RawResponse {
                transport: TransportStatus::Completed,
                status: Some(status),
                body,
                error_message: None,
            }),
            Err(err) => {
                log::warn!("{} {} body read failed: {}", method, request.resource(), err);
                Ok(RawResponse::failed(Some(status), err))
            }
        }
    }

    /// Perform `request` and parse the body into `T`.
    ///
    /// The result's success flag is `true` only if the request completed
    /// with HTTP 200. Other outcomes still return the parsed body, which for
    /// a transport failure is `T::default()`.
    ///
    /// # Errors
    /// [`Error::Json`] if a non-empty body does not match `T`.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailgun_client::{MailgunService, RequestBuilder, SendMailResponse};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailgun_client::Error> {
    /// let service = MailgunService::new("mg.example.com", "key-xxx")?;
    /// let request = RequestBuilder::new()
    ///     .for_send_message()
    ///     .from("me@mg.example.com")?
    ///     .to("you@example.com")?
    ///     .subject("Hi")?
    ///     .text("Hello there")
    ///     .build();
    /// let sent: SendMailResponse = service.get_response(&request).await?;
    /// println!("{} {}", sent.success, sent.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_response<T: ApiResponse>(&self, request: &ResourceRequest) -> Result<T> {
        let raw = self.execute(request).await?;

        let mut value: T = if raw.body.trim().is_empty() {
            T::default()
        } else {
            serde_json::from_str(&raw.body).inspect_err(|err| {
                log::debug!(
                    "{} body did not match expected shape: {}",
                    request.resource(),
                    err
                );
            })?
        };

        value.set_success(raw.is_success());
        Ok(value)
    }

    /// Fetch the page at `page_url` (taken from a response's paging links)
    /// for the collection `request` targets.
    ///
    /// Only the last path segment of `page_url` is used, appended to the
    /// request's resource. This fits the token-style links of the events
    /// API. Query-style links such as the suppression lists'
    /// `bounces?page=next&address=...` are not understood: the segment,
    /// query included, is appended verbatim. A link ending in `/` appends
    /// an empty segment.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailgun_client::{EventCollection, EventType, MailgunService, RequestBuilder};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailgun_client::Error> {
    /// let service = MailgunService::new("mg.example.com", "key-xxx")?;
    /// let request = RequestBuilder::new()
    ///     .for_events(EventType::ACCEPTED)
    ///     .limit(10)
    ///     .build();
    /// let mut page: EventCollection = service.get_response(&request).await?;
    /// let mut items = std::mem::take(&mut page.items);
    /// if let Some(next) = page.next_page() {
    ///     let next: EventCollection = service.get_page(&request, next).await?;
    ///     items.extend(next.items);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_page<T: ApiResponse>(
        &self,
        request: &ResourceRequest,
        page_url: &str,
    ) -> Result<T> {
        self.get_response(&request.for_page(page_url)).await
    }

    /// Check whether `address` is on one of the domain's suppression lists.
    ///
    /// Unsubscribes, bounces and complaints are queried in that order, one
    /// request each, stopping at the first list containing the address. The
    /// returned event type is [`EventType::UNSUBSCRIBED`],
    /// [`EventType::FAILED`] or [`EventType::COMPLAINED`] respectively, or
    /// [`EventType::NONE`] when the address is not suppressed.
    pub async fn is_suppressed(&self, address: &str) -> Result<(bool, EventType)> {
        if address.is_empty() {
            return Err(Error::InvalidArgument("address"));
        }

        let mut builder = RequestBuilder::new();
        let lookups = [
            (
                builder.for_unsubscribes_address(address).build(),
                EventType::UNSUBSCRIBED,
            ),
            (
                builder.for_bounces_address(address).build(),
                EventType::FAILED,
            ),
            (
                builder.for_complaints_address(address).build(),
                EventType::COMPLAINED,
            ),
        ];

        for (request, suppression) in lookups {
            let response: EmailAddressResponse = self.get_response(&request).await?;
            if response.has_address() {
                log::debug!("{} is suppressed ({})", address, suppression);
                return Ok((true, suppression));
            }
        }

        Ok((false, EventType::NONE))
    }

    fn resource_url(&self, resource: &str) -> Result<Url> {
        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.domain,
            resource
        );
        Ok(Url::parse(&url)?)
    }
}

/// Methods whose parameters travel in the query string.
fn sends_query(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::DELETE | Method::HEAD)
}

async fn multipart_form(request: &ResourceRequest) -> Result<Form> {
    let mut form = Form::new();

    for (name, value) in request.parameters() {
        form = form.text(name.clone(), value.clone());
    }

    for attachment in request.attachments() {
        let data = tokio::fs::read(&attachment.path)
            .await
            .map_err(|source| Error::Attachment {
                path: attachment.path.clone(),
                source,
            })?;
        let part = Part::bytes(data).file_name(attachment.file_name());
        form = form.part(attachment.kind.as_str(), part);
    }

    Ok(form)
}

/// Builder for configuring a Mailgun service.
///
/// Start with [`MailgunService::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct MailgunServiceBuilder {
    domain: String,
    api_key: String,
    base_url: String,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
    timeout: Option<Duration>,
}

impl Default for MailgunServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MailgunServiceBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - No domain or API key (both must be set before [`build`](Self::build))
    /// - US endpoint ([`BASE_URL`])
    /// - No proxy
    /// - `danger_accept_invalid_certs = false`
    /// - No timeout beyond the transport default
    pub fn new() -> Self {
        Self {
            domain: String::new(),
            api_key: String::new(),
            base_url: BASE_URL.to_string(),
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout: None,
        }
    }

    /// Sending domain, e.g. `mg.example.com`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Private API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Override the API endpoint, e.g. [`EU_BASE_URL`].
    ///
    /// Also useful for testing against a local server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080" or "socks5://127.0.0.1:1080").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Bound each request, from connecting until the body is read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the service.
    ///
    /// No network request is made.
    ///
    /// # Errors
    /// [`Error::MissingConfig`] if the domain or API key is empty,
    /// [`Error::Url`] for an invalid base URL, [`Error::Http`] if the proxy
    /// or TLS configuration is rejected.
    pub fn build(self) -> Result<MailgunService> {
        if self.domain.is_empty() {
            return Err(Error::MissingConfig("domain"));
        }
        if self.api_key.is_empty() {
            return Err(Error::MissingConfig("api_key"));
        }
        Url::parse(&self.base_url)?;

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(MailgunService {
            http: builder.build()?,
            domain: self.domain,
            api_key: self.api_key,
            base_url: self.base_url,
            proxy: self.proxy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_domain_fails_fast() {
        let err = MailgunService::new("", "key-test").unwrap_err();
        assert!(matches!(err, Error::MissingConfig("domain")));
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let err = MailgunService::builder()
            .domain("mg.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingConfig("api_key")));
        assert_eq!(
            err.to_string(),
            "api_key is not set. Please set a valid api_key before executing requests"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = MailgunService::builder()
            .domain("mg.example.com")
            .api_key("key-test")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn resource_url_includes_domain() {
        let service = MailgunService::builder()
            .domain("mg.example.com")
            .api_key("key-test")
            .base_url(EU_BASE_URL)
            .build()
            .unwrap();

        let url = service.resource_url("bounces/a@example.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.eu.mailgun.net/v3/mg.example.com/bounces/a@example.com"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let service = MailgunService::new("mg.example.com", "key-secret").unwrap();
        let debug = format!("{service:?}");
        assert!(debug.contains("mg.example.com"));
        assert!(!debug.contains("key-secret"));
    }

    #[test]
    fn only_completed_200_is_success() {
        let raw = |transport, status| RawResponse {
            transport,
            status,
            body: String::new(),
            error_message: None,
        };

        assert!(raw(TransportStatus::Completed, Some(StatusCode::OK)).is_success());
        assert!(!raw(TransportStatus::Completed, Some(StatusCode::CREATED)).is_success());
        assert!(!raw(TransportStatus::Completed, Some(StatusCode::NOT_FOUND)).is_success());
        assert!(!raw(TransportStatus::Error, Some(StatusCode::OK)).is_success());
        assert!(!raw(TransportStatus::TimedOut, None).is_success());
    }

    #[test]
    fn query_methods() {
        assert!(sends_query(&Method::GET));
        assert!(sends_query(&Method::DELETE));
        assert!(!sends_query(&Method::POST));
        assert!(!sends_query(&Method::PUT));
    }
}
