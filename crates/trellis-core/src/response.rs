//! Response values and terminal output writers.
//!
//! Controllers never write output themselves; they return an [`Outcome`]
//! and the application turns it into a [`Response`] sent through a
//! [`ResponseSink`]. The sink is the single seam between the dispatch
//! engine and the transport: tests capture responses in memory, the
//! front controller writes HTTP/1.1 to a stream.

use std::io::{self, Write};

use serde_json::Value;

/// What a controller action produces.
///
/// This is the three-way response contract: transport framing (HTML vs
/// JSON) is decided centrally from the variant, never by the controller
/// touching the sink. [`Outcome::AlreadySent`] means the controller (or a
/// guard) queued a terminal response itself - typically a redirect - and
/// the application must do nothing further beyond flushing it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A fully rendered HTML body.
    Html { body: String, status: u16 },
    /// Structured data, serialized as JSON.
    Json { data: Value, status: u16 },
    /// Output was already produced; do nothing further.
    AlreadySent,
}

impl Outcome {
    /// An HTML outcome with status 200.
    pub fn html(body: impl Into<String>) -> Self {
        Outcome::Html {
            body: body.into(),
            status: 200,
        }
    }

    /// A JSON outcome with status 200.
    pub fn json(data: Value) -> Self {
        Outcome::Json { data, status: 200 }
    }

    /// Returns the same outcome with a different status code.
    ///
    /// Has no effect on [`Outcome::AlreadySent`].
    pub fn with_status(self, status: u16) -> Self {
        match self {
            Outcome::Html { body, .. } => Outcome::Html { body, status },
            Outcome::Json { data, .. } => Outcome::Json { data, status },
            Outcome::AlreadySent => Outcome::AlreadySent,
        }
    }

    /// Short label for hook payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Html { .. } => "html",
            Outcome::Json { .. } => "json",
            Outcome::AlreadySent => "already_sent",
        }
    }
}

/// A finished response: status, headers, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Ordered header list; duplicates are written in order.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// An HTML response.
    pub fn html(content: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            headers: vec![(
                "Content-Type".to_string(),
                "text/html; charset=UTF-8".to_string(),
            )],
            body: content.into().into_bytes(),
        }
    }

    /// A JSON response.
    pub fn json(data: &Value, status: u16) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status,
            headers: vec![(
                "Content-Type".to_string(),
                "application/json; charset=UTF-8".to_string(),
            )],
            body: serde_json::to_vec(data)?,
        })
    }

    /// A redirect response (301/302), empty body.
    pub fn redirect(url: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            headers: vec![("Location".to_string(), url.into())],
            body: Vec::new(),
        }
    }

    /// A bare status response with no body and no content type.
    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header, builder style.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The canonical reason phrase for this status, "Unknown" otherwise.
    pub fn reason(&self) -> &'static str {
        reason_phrase(self.status)
    }
}

/// Terminal writer the application hands finished responses to.
pub trait ResponseSink {
    /// Writes a response. Called at most once per request.
    fn send(&mut self, response: Response) -> io::Result<()>;
}

/// HTTP/1.1 sink writing status line, headers, and body to a stream.
///
/// Refuses a second send: output for a request goes out exactly once.
#[derive(Debug)]
pub struct HttpSink<W: Write> {
    out: W,
    sent: bool,
}

impl<W: Write> HttpSink<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self { out, sent: false }
    }

    /// Whether a response has already been written.
    pub fn headers_sent(&self) -> bool {
        self.sent
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResponseSink for HttpSink<W> {
    fn send(&mut self, response: Response) -> io::Result<()> {
        if self.sent {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "response already sent",
            ));
        }
        self.sent = true;

        write!(
            self.out,
            "HTTP/1.1 {} {}\r\n",
            response.status,
            reason_phrase(response.status)
        )?;
        for (name, value) in &response.headers {
            write!(self.out, "{}: {}\r\n", name, value)?;
        }
        write!(self.out, "Content-Length: {}\r\n\r\n", response.body.len())?;
        self.out.write_all(&response.body)?;
        self.out.flush()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
