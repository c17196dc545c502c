//! Fluent construction of [`ResourceRequest`] values.

use crate::request::{Attachment, AttachmentKind, ResourceRequest};
use crate::{Error, EventType, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use std::path::PathBuf;

/// Characters left unescaped when an address is used as a path segment.
const ADDRESS_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@');

/// RFC 1123 date format used by the Mailgun API.
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Builder for [`ResourceRequest`].
///
/// Setters that validate their input return [`Result`]; the rest return the
/// builder directly, so a chain reads naturally with `?`:
///
/// ```
/// use mailgun_client::RequestBuilder;
///
/// # fn main() -> Result<(), mailgun_client::Error> {
/// let request = RequestBuilder::new()
///     .for_send_message()
///     .from("Excited User <me@example.com>")?
///     .to("someone@example.com")?
///     .subject("Hello")?
///     .text("Testing some Mailgun awesomeness!")
///     .build();
///
/// assert_eq!(request.resource(), "messages");
/// # Ok(())
/// # }
/// ```
///
/// [`build`](Self::build) returns a snapshot, so one builder can be
/// re-targeted and built several times without the results sharing state.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    request: ResourceRequest,
}

impl RequestBuilder {
    /// Create a builder for a `GET` request with no resource set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource path, relative to the domain.
    pub fn resource(&mut self, resource: impl Into<String>) -> &mut Self {
        self.request.resource = resource.into();
        self
    }

    /// Set the HTTP method. Default is `GET`.
    pub fn method(&mut self, method: Method) -> &mut Self {
        self.request.method = method;
        self
    }

    /// Add a parameter, replacing any previous value under the same name.
    pub fn with_parameter(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.request
            .parameters
            .insert(name.into(), value.to_string());
        self
    }

    /// Add a file under the given kind (`"inline"` or `"attachment"`).
    pub fn add_file(&mut self, kind: &str, path: impl Into<PathBuf>) -> Result<&mut Self> {
        let kind = kind.parse::<AttachmentKind>()?;
        self.push_file(kind, path.into())
    }

    fn push_file(&mut self, kind: AttachmentKind, path: PathBuf) -> Result<&mut Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("path"));
        }

        self.request.attachments.push(Attachment::new(kind, path));
        Ok(self)
    }

    /// Target the events resource, filtered to `event_types` when not empty.
    pub fn for_events(&mut self, event_types: EventType) -> &mut Self {
        self.request.resource = "events".to_string();

        if !event_types.is_empty() {
            self.with_parameter("event", event_types);
        }

        self
    }

    /// Target the messages resource.
    pub fn for_messages(&mut self) -> &mut Self {
        self.request.resource = "messages".to_string();
        self
    }

    /// Target the messages resource with `POST`, i.e. send a message.
    pub fn for_send_message(&mut self) -> &mut Self {
        self.for_messages().method(Method::POST)
    }

    /// Target the unsubscribes list.
    pub fn for_unsubscribes(&mut self) -> &mut Self {
        self.request.resource = "unsubscribes".to_string();
        self
    }

    /// Target a single address in the unsubscribes list.
    pub fn for_unsubscribes_address(&mut self, address: &str) -> &mut Self {
        self.request.resource = address_resource("unsubscribes", address);
        self
    }

    /// Target the bounces list.
    pub fn for_bounces(&mut self) -> &mut Self {
        self.request.resource = "bounces".to_string();
        self
    }

    /// Target a single address in the bounces list.
    pub fn for_bounces_address(&mut self, address: &str) -> &mut Self {
        self.request.resource = address_resource("bounces", address);
        self
    }

    /// Target the complaints list.
    pub fn for_complaints(&mut self) -> &mut Self {
        self.request.resource = "complaints".to_string();
        self
    }

    /// Target a single address in the complaints list.
    pub fn for_complaints_address(&mut self, address: &str) -> &mut Self {
        self.request.resource = address_resource("complaints", address);
        self
    }

    /// Only return events at or after `begin`.
    pub fn begin(&mut self, begin: DateTime<Utc>) -> &mut Self {
        self.with_parameter("begin", begin.format(RFC1123_FORMAT))
    }

    /// Only return events at or before `end`.
    pub fn end(&mut self, end: DateTime<Utc>) -> &mut Self {
        self.with_parameter("end", end.format(RFC1123_FORMAT))
    }

    /// Order events oldest first (`true`) or newest first (`false`).
    pub fn ascending(&mut self, ascending: bool) -> &mut Self {
        self.with_parameter("ascending", if ascending { "yes" } else { "no" })
    }

    /// Ask for a pretty-printed response body. `false` adds nothing.
    pub fn pretty(&mut self, pretty: bool) -> &mut Self {
        if pretty {
            self.with_parameter("pretty", "yes");
        }
        self
    }

    /// Sender address, e.g. `Name <me@example.com>`.
    pub fn from(&mut self, from: &str) -> Result<&mut Self> {
        self.required("from", from)
    }

    /// Recipient address. Fails on empty input.
    pub fn to(&mut self, to: &str) -> Result<&mut Self> {
        self.required("to", to)
    }

    /// Carbon-copy recipient. Fails on empty input.
    pub fn cc(&mut self, cc: &str) -> Result<&mut Self> {
        self.required("cc", cc)
    }

    /// Blind carbon-copy recipient. Fails on empty input.
    pub fn bcc(&mut self, bcc: &str) -> Result<&mut Self> {
        self.required("bcc", bcc)
    }

    /// Message subject. Fails on empty input.
    pub fn subject(&mut self, subject: &str) -> Result<&mut Self> {
        self.required("subject", subject)
    }

    /// Filter by recipient address. Fails on empty input.
    pub fn recipient(&mut self, recipient: &str) -> Result<&mut Self> {
        self.required("recipient", recipient)
    }

    /// Set the `Reply-To` header of the sent message.
    pub fn reply_to(&mut self, address: &str) -> Result<&mut Self> {
        if address.is_empty() {
            return Err(Error::InvalidArgument("reply_to"));
        }
        Ok(self.with_parameter("h:Reply-To", address))
    }

    /// Plain-text body. Empty input is ignored.
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.optional("text", text)
    }

    /// HTML body. Empty input is ignored.
    pub fn html(&mut self, html: &str) -> &mut Self {
        self.optional("html", html)
    }

    /// Tag the message. Empty input is ignored.
    pub fn tag(&mut self, tag: &str) -> &mut Self {
        self.optional("o:tag", tag)
    }

    /// Maximum number of items per page. Values below 1 add nothing.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        if limit > 0 {
            self.with_parameter("limit", limit);
        }
        self
    }

    /// Add an inline file.
    pub fn inline(&mut self, path: impl Into<PathBuf>) -> Result<&mut Self> {
        self.push_file(AttachmentKind::Inline, path.into())
    }

    /// Add several inline files. Stops at the first empty path.
    pub fn inline_all<I, P>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.inline(path)?;
        }
        Ok(self)
    }

    /// Add a regular attachment.
    pub fn attachment(&mut self, path: impl Into<PathBuf>) -> Result<&mut Self> {
        self.push_file(AttachmentKind::Attachment, path.into())
    }

    /// Add several regular attachments. Stops at the first empty path.
    pub fn attachment_all<I, P>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.attachment(path)?;
        }
        Ok(self)
    }

    /// Snapshot of the accumulated request.
    pub fn build(&self) -> ResourceRequest {
        self.request.clone()
    }

    fn required(&mut self, name: &'static str, value: &str) -> Result<&mut Self> {
        if value.is_empty() {
            return Err(Error::InvalidArgument(name));
        }
        Ok(self.with_parameter(name, value))
    }

    fn optional(&mut self, name: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.with_parameter(name, value);
        }
        self
    }
}

fn address_resource(collection: &str, address: &str) -> String {
    format!(
        "{}/{}",
        collection,
        utf8_percent_encode(address, ADDRESS_SEGMENT_ENCODE_SET)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn send_message_round_trip() {
        let request = RequestBuilder::new()
            .for_send_message()
            .from("Sender <me@example.com>")
            .unwrap()
            .to("mail@example.com")
            .unwrap()
            .subject("Hi")
            .unwrap()
            .text("It is I, Leclerc!")
            .build();

        assert_eq!(request.resource(), "messages");
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.parameters().len(), 4);
        assert_eq!(request.parameter("from"), Some("Sender <me@example.com>"));
        assert_eq!(request.parameter("to"), Some("mail@example.com"));
        assert_eq!(request.parameter("subject"), Some("Hi"));
        assert_eq!(request.parameter("text"), Some("It is I, Leclerc!"));
    }

    #[test]
    fn resource_and_method_last_write_wins() {
        let mut builder = RequestBuilder::new();
        builder.resource("domains").method(Method::DELETE);

        let request = builder.build();
        assert_eq!(request.resource(), "domains");
        assert_eq!(request.method(), &Method::DELETE);

        let request = builder.resource("x").for_bounces().build();
        assert_eq!(request.resource(), "bounces");
        assert_eq!(request.method(), &Method::DELETE);

        let request = builder.for_bounces().resource("tags").method(Method::PUT).build();
        assert_eq!(request.resource(), "tags");
        assert_eq!(request.method(), &Method::PUT);

        let request = builder.method(Method::PUT).for_send_message().build();
        assert_eq!(request.resource(), "messages");
        assert_eq!(request.method(), &Method::POST);
    }

    #[test]
    fn for_messages_keeps_get() {
        let request = RequestBuilder::new().for_messages().build();
        assert_eq!(request.resource(), "messages");
        assert_eq!(request.method(), &Method::GET);
    }

    #[test]
    fn for_events_joins_flags() {
        let request = RequestBuilder::new()
            .for_events(EventType::UNSUBSCRIBED | EventType::FAILED)
            .build();

        assert_eq!(request.resource(), "events");
        assert_eq!(request.parameter("event"), Some("failed OR unsubscribed"));
    }

    #[test]
    fn for_events_without_flags_adds_no_filter() {
        let request = RequestBuilder::new().for_events(EventType::NONE).build();

        assert_eq!(request.resource(), "events");
        assert!(request.parameter("event").is_none());
    }

    #[test]
    fn required_fields_reject_empty_input() {
        let mut builder = RequestBuilder::new();

        assert!(matches!(builder.from(""), Err(Error::InvalidArgument("from"))));
        assert!(matches!(builder.to(""), Err(Error::InvalidArgument("to"))));
        assert!(matches!(builder.cc(""), Err(Error::InvalidArgument("cc"))));
        assert!(matches!(builder.bcc(""), Err(Error::InvalidArgument("bcc"))));
        assert!(matches!(
            builder.subject(""),
            Err(Error::InvalidArgument("subject"))
        ));
        assert!(matches!(
            builder.recipient(""),
            Err(Error::InvalidArgument("recipient"))
        ));
        assert!(matches!(
            builder.reply_to(""),
            Err(Error::InvalidArgument("reply_to"))
        ));

        assert_eq!(builder.build(), ResourceRequest::default());
    }

    #[test]
    fn required_fields_set_named_parameters() {
        let request = RequestBuilder::new()
            .cc("cc@example.com")
            .unwrap()
            .bcc("bcc@example.com")
            .unwrap()
            .recipient("r@example.com")
            .unwrap()
            .reply_to("reply@example.com")
            .unwrap()
            .build();

        assert_eq!(request.parameter("cc"), Some("cc@example.com"));
        assert_eq!(request.parameter("bcc"), Some("bcc@example.com"));
        assert_eq!(request.parameter("recipient"), Some("r@example.com"));
        assert_eq!(request.parameter("h:Reply-To"), Some("reply@example.com"));
    }

    #[test]
    fn optional_fields_ignore_empty_input() {
        let request = RequestBuilder::new().text("").html("").tag("").build();
        assert!(request.parameters().is_empty());

        let request = RequestBuilder::new()
            .text("plain")
            .html("<p>rich</p>")
            .tag("newsletter")
            .build();
        assert_eq!(request.parameters().len(), 3);
        assert_eq!(request.parameter("text"), Some("plain"));
        assert_eq!(request.parameter("html"), Some("<p>rich</p>"));
        assert_eq!(request.parameter("o:tag"), Some("newsletter"));
    }

    #[test]
    fn limit_only_when_positive() {
        assert_eq!(
            RequestBuilder::new().limit(10).build().parameter("limit"),
            Some("10")
        );
        assert!(RequestBuilder::new().limit(0).build().parameters().is_empty());
        assert!(RequestBuilder::new().limit(-5).build().parameters().is_empty());
    }

    #[test]
    fn pretty_only_when_true() {
        assert_eq!(
            RequestBuilder::new().pretty(true).build().parameter("pretty"),
            Some("yes")
        );
        assert!(RequestBuilder::new().pretty(false).build().parameters().is_empty());
    }

    #[test]
    fn begin_and_end_use_rfc1123() {
        let begin = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();

        let request = RequestBuilder::new()
            .for_events(EventType::NONE)
            .begin(begin)
            .end(end)
            .ascending(true)
            .build();

        assert_eq!(request.parameter("begin"), Some("Tue, 05 Mar 2024 14:07:09 GMT"));
        assert_eq!(request.parameter("end"), Some("Wed, 06 Mar 2024 00:00:00 GMT"));
        assert_eq!(request.parameter("ascending"), Some("yes"));
    }

    #[test]
    fn with_parameter_last_write_wins() {
        let request = RequestBuilder::new()
            .with_parameter("limit", 5)
            .with_parameter("limit", 25)
            .build();

        assert_eq!(request.parameters().len(), 1);
        assert_eq!(request.parameter("limit"), Some("25"));
    }

    #[test]
    fn address_lookups_embed_encoded_address() {
        let mut builder = RequestBuilder::new();

        assert_eq!(builder.for_unsubscribes().build().resource(), "unsubscribes");
        assert_eq!(builder.for_bounces().build().resource(), "bounces");
        assert_eq!(builder.for_complaints().build().resource(), "complaints");

        assert_eq!(
            builder.for_bounces_address("test@example.com").build().resource(),
            "bounces/test@example.com"
        );
        assert_eq!(
            builder
                .for_complaints_address("first.last@example.com")
                .build()
                .resource(),
            "complaints/first.last@example.com"
        );
        assert_eq!(
            builder
                .for_unsubscribes_address("a+b/c@example.com")
                .build()
                .resource(),
            "unsubscribes/a%2Bb%2Fc@example.com"
        );
    }

    #[test]
    fn build_returns_independent_snapshots() {
        let mut builder = RequestBuilder::new();

        let unsubscribes = builder.for_unsubscribes_address("x@example.com").build();
        let bounces = builder.for_bounces_address("x@example.com").build();

        assert_eq!(unsubscribes.resource(), "unsubscribes/x@example.com");
        assert_eq!(bounces.resource(), "bounces/x@example.com");
    }

    #[test]
    fn files_are_added_in_order() {
        let request = RequestBuilder::new()
            .inline("logo.png")
            .unwrap()
            .attachment_all(["a.pdf", "b.pdf"])
            .unwrap()
            .add_file("inline", "banner.png")
            .unwrap()
            .build();

        let kinds: Vec<_> = request.attachments().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            [
                AttachmentKind::Inline,
                AttachmentKind::Attachment,
                AttachmentKind::Attachment,
                AttachmentKind::Inline,
            ]
        );

        let inline: Vec<_> = request
            .attachment_paths(AttachmentKind::Inline)
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(inline, ["logo.png", "banner.png"]);
    }

    #[test]
    fn add_file_rejects_empty_kind_or_path() {
        let mut builder = RequestBuilder::new();

        assert!(matches!(
            builder.add_file("", "a.txt"),
            Err(Error::InvalidArgument("kind"))
        ));
        assert!(matches!(
            builder.add_file("attachment", ""),
            Err(Error::InvalidArgument("path"))
        ));
        assert!(matches!(
            builder.add_file("signature", "a.txt"),
            Err(Error::UnknownAttachmentKind(_))
        ));
        assert!(builder.build().attachments().is_empty());
    }

    #[test]
    fn plural_files_stop_at_first_empty_path() {
        let mut builder = RequestBuilder::new();

        let result = builder.inline_all(["one.png", "", "three.png"]);

        assert!(matches!(result, Err(Error::InvalidArgument("path"))));
        let request = builder.build();
        assert_eq!(request.attachments().len(), 1);
        assert_eq!(request.attachments()[0], Attachment::inline("one.png"));
    }
}
