//! Immutable request snapshot.
//!
//! [`Request`] is the input boundary for controllers and middleware: a
//! one-time snapshot of the inbound request, built at the process boundary
//! and never mutated afterwards. It carries no validation logic - security
//! checks are middleware's job, not the snapshot's.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// Error returned when parsing an unknown HTTP method.
#[derive(Debug, Error)]
#[error("invalid HTTP method '{0}'")]
pub struct InvalidMethod(pub String);

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

/// Immutable snapshot of an inbound HTTP request.
///
/// Accessors only; no mutation, no magic. Use [`Request::builder`] at the
/// front-controller boundary to assemble one.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    content_length: u64,
    remote_addr: String,
}

impl Request {
    /// Starts building a request snapshot.
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            request: Request {
                method,
                path: path.into(),
                query: Vec::new(),
                form: Vec::new(),
                headers: Vec::new(),
                content_length: 0,
                remote_addr: "0.0.0.0".to_string(),
            },
        }
    }

    /// The HTTP request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A value from the query string.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// A value from the submitted form body.
    pub fn form(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// A header value, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The declared `Content-Length`, 0 when absent.
    ///
    /// This is the *declared* size; nothing here reads the body.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// The client address as seen by the transport.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Whether this is a POST request.
    pub fn is_post(&self) -> bool {
        self.method == Method::Post
    }
}

/// Builder for [`Request`] snapshots.
#[derive(Debug)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Adds a query-string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    /// Adds a form pair.
    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.form.push((key.into(), value.into()));
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the declared content length.
    pub fn content_length(mut self, length: u64) -> Self {
        self.request.content_length = length;
        self
    }

    /// Sets the client address.
    pub fn remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.request.remote_addr = addr.into();
        self
    }

    /// Finalizes the snapshot.
    pub fn build(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn test_method_parse_rejects_unknown() {
        assert!("TRACE".parse::<Method>().is_err());
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn test_builder_roundtrip() {
        let request = Request::builder(Method::Post, "/shorten")
            .query("ref", "home")
            .form("url", "https://example.org")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .content_length(42)
            .remote_addr("203.0.113.9")
            .build();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "/shorten");
        assert_eq!(request.query("ref"), Some("home"));
        assert_eq!(request.form("url"), Some("https://example.org"));
        assert_eq!(request.content_length(), 42);
        assert_eq!(request.remote_addr(), "203.0.113.9");
        assert!(request.is_post());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = Request::builder(Method::Get, "/")
            .header("X-Requested-With", "fetch")
            .build();

        assert_eq!(request.header("x-requested-with"), Some("fetch"));
        assert_eq!(request.header("X-REQUESTED-WITH"), Some("fetch"));
        assert_eq!(request.header("x-missing"), None);
    }

    #[test]
    fn test_defaults() {
        let request = Request::builder(Method::Get, "/").build();
        assert_eq!(request.content_length(), 0);
        assert_eq!(request.remote_addr(), "0.0.0.0");
        assert_eq!(request.query("missing"), None);
    }
}
