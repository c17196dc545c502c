//! Request descriptions produced by [`crate::RequestBuilder`].

use crate::Error;
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a file is attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentKind {
    /// Referenced from the HTML body via `cid:`.
    #[default]
    Inline,
    /// Regular file attachment.
    Attachment,
}

impl AttachmentKind {
    /// Multipart field name used by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::Inline => "inline",
            AttachmentKind::Attachment => "attachment",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(Error::InvalidArgument("kind")),
            "inline" => Ok(AttachmentKind::Inline),
            "attachment" => Ok(AttachmentKind::Attachment),
            other => Err(Error::UnknownAttachmentKind(other.to_string())),
        }
    }
}

/// A file to upload with a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attachment {
    /// Inline or regular attachment.
    pub kind: AttachmentKind,
    /// Local file to upload.
    pub path: PathBuf,
}

impl Attachment {
    /// Attachment of `kind` for the file at `path`.
    pub fn new(kind: AttachmentKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Inline attachment for `path`.
    pub fn inline(path: impl Into<PathBuf>) -> Self {
        Self::new(AttachmentKind::Inline, path)
    }

    /// File name sent in the multipart part.
    pub(crate) fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// One API call: target resource, HTTP method, parameters and files.
///
/// Parameter keys are unique; writing an existing key replaces its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub(crate) resource: String,
    pub(crate) method: Method,
    pub(crate) parameters: BTreeMap<String, String>,
    pub(crate) attachments: Vec<Attachment>,
}

impl Default for ResourceRequest {
    fn default() -> Self {
        Self {
            resource: String::new(),
            method: Method::GET,
            parameters: BTreeMap::new(),
            attachments: Vec::new(),
        }
    }
}

impl ResourceRequest {
    /// Start a new [`crate::RequestBuilder`].
    pub fn builder() -> crate::RequestBuilder {
        crate::RequestBuilder::new()
    }

    /// Resource path relative to the domain, e.g. `events` or `bounces/a@b.com`.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// HTTP method, `GET` unless changed.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// All parameters, ordered by name.
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Value of a single parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Files in insertion order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Paths of all attachments of the given kind, in insertion order.
    pub fn attachment_paths(&self, kind: AttachmentKind) -> impl Iterator<Item = &Path> {
        self.attachments
            .iter()
            .filter(move |a| a.kind == kind)
            .map(|a| a.path.as_path())
    }

    /// Copy of this request pointing at the page referenced by `page_url`.
    ///
    /// Mailgun encodes the page token as the last path segment of its paging
    /// links, so `events` + `https://api.mailgun.net/v3/dom/events/page/XYZ9`
    /// becomes `events/XYZ9`. Query-style links are not understood: the last
    /// segment is appended verbatim, query included.
    pub fn for_page(&self, page_url: &str) -> ResourceRequest {
        let token = page_url
            .rsplit_once('/')
            .map_or(page_url, |(_, token)| token);

        let mut paged = self.clone();
        paged.resource = format!("{}/{}", self.resource, token);
        paged
    }
}
