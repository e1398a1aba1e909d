use core::fmt::{self, Display, Write};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request header. `Content-Length` is never passed here; it is derived
/// from the [`Body`].
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// A request body that knows its exact encoded length up front.
pub trait Body {
    /// Number of bytes [`write_to`](Body::write_to) emits.
    fn content_length(&self) -> usize;

    /// Serialize the body.
    fn write_to(&self, out: &mut dyn Write) -> fmt::Result;
}

/// A request ready to serialize.
pub struct Request<'a> {
    pub method: Method,
    /// Request target, written as-is after the method.
    pub target: &'a dyn Display,
    pub headers: &'a [Header<'a>],
    pub body: Option<&'a dyn Body>,
}

impl Request<'_> {
    /// Serialize the request head and body into `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        // Request line
        write!(out, "{} {} HTTP/1.1\r\n", self.method.as_str(), self.target)?;

        // Headers
        for header in self.headers {
            write!(out, "{}: {}\r\n", header.name, header.value)?;
        }

        // Body
        match self.body {
            Some(body) => {
                write!(out, "Content-Length: {}\r\n\r\n", body.content_length())?;
                body.write_to(out)
            }
            None => out.write_str("\r\n"),
        }
    }
}
