use std::collections::BTreeMap;
use std::fmt;

use crate::schema::Schema;

/// Where a tool argument is carried in the backing HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgSource {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl ArgSource {
    /// Parse an OpenAPI `in` value. `body` is never a parameter location; it
    /// is produced only by the request body extractor.
    pub fn from_location(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ArgSource::Path),
            "query" => Some(ArgSource::Query),
            "header" => Some(ArgSource::Header),
            "cookie" => Some(ArgSource::Cookie),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArgSource::Path => "path",
            ArgSource::Query => "query",
            ArgSource::Header => "header",
            ArgSource::Cookie => "cookie",
            ArgSource::Body => "body",
        }
    }
}

impl fmt::Display for ArgSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema payload of an [`Arg`]. Parameters carry one schema, the request
/// body carries one per content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSchema {
    Single(Schema),
    /// Keyed by content type; the map keeps content types sorted.
    ByContentType(BTreeMap<String, Schema>),
}

/// One input to a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: String,
    pub description: Option<String>,
    pub source: ArgSource,
    pub required: bool,
    pub deprecated: bool,
    pub schema: ArgSchema,
}

/// HTTP header attached to a request template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// How the backing endpoint is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    /// Server URL (trailing `/` trimmed) followed by the path template.
    pub url: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// At most one `Content-Type` header.
    pub headers: Vec<Header>,
}

/// One documented `(status code, content type)` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseVariant {
    pub status_code: String,
    pub content_type: String,
    /// Markdown documentation of the response.
    pub body: String,
    /// `A`, `B`, ..., `Z`, `AA`, ... by position.
    pub suffix: String,
}

/// One generated operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    /// Sorted by name.
    pub args: Vec<Arg>,
    /// Draft-7 JSON Schema for the tool input, pretty printed.
    pub input_schema: String,
    pub request: RequestTemplate,
    pub responses: Vec<ResponseVariant>,
}
