//! Request parsing
//!
//! Only what the routes need: method, path, query string and a form body
//! sized by `Content-Length`. Other headers are skipped.

use heapless::String;

/// Largest request accepted (head and body)
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Largest decoded form value
pub const MAX_FIELD_LEN: usize = 64;

const HEAD_END: &[u8] = b"\r\n\r\n";

/// Request methods the routes distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    fn resolve(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

/// Request parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Head terminator or part of the body not received yet
    Incomplete,
    /// Not a well-formed HTTP/1.x request
    Malformed,
}

/// A parsed request borrowing from the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    /// Target without the query string
    pub path: &'a str,
    /// Text after `?`, empty if none
    pub query: &'a str,
    pub body: &'a str,
}

impl Request<'_> {
    /// Look up a form field
    ///
    /// The query string is searched first, then an urlencoded body. Values
    /// are percent-decoded with `+` as space.
    ///
    /// # Returns
    /// `None` if the field is absent, does not decode to UTF-8 or is longer
    /// than [`MAX_FIELD_LEN`].
    pub fn arg(&self, name: &str) -> Option<String<MAX_FIELD_LEN>> {
        form_field(self.query, name).or_else(|| form_field(self.body, name))
    }
}

/// Parse a request from the bytes received so far
///
/// # Errors
/// [`HttpError::Incomplete`] until the head and the announced body are
/// present; [`HttpError::Malformed`] for anything that can never become a
/// valid request.
pub fn parse_request(raw: &[u8]) -> Result<Request<'_>, HttpError> {
    let head_len = raw
        .windows(HEAD_END.len())
        .position(|window| window == HEAD_END)
        .ok_or(HttpError::Incomplete)?;
    let head = core::str::from_utf8(&raw[..head_len]).map_err(|_| HttpError::Malformed)?;

    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or("").split_whitespace();
    let (Some(method), Some(target), Some(version)) =
        (request_line.next(), request_line.next(), request_line.next())
    else {
        return Err(HttpError::Malformed);
    };
    if !version.starts_with("HTTP/1.") || !target.starts_with('/') {
        return Err(HttpError::Malformed);
    }

    let mut content_length = 0usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            return Err(HttpError::Malformed);
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value.trim().parse().map_err(|_| HttpError::Malformed)?;
        }
    }

    let body_start = head_len + HEAD_END.len();
    let body_end = body_start
        .checked_add(content_length)
        .filter(|&end| end <= MAX_REQUEST_SIZE)
        .ok_or(HttpError::Malformed)?;
    let body = raw
        .get(body_start..body_end)
        .ok_or(HttpError::Incomplete)?;
    let body = core::str::from_utf8(body).map_err(|_| HttpError::Malformed)?;

    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    Ok(Request {
        method: Method::resolve(method),
        path,
        query,
        body,
    })
}

fn form_field(form: &str, name: &str) -> Option<String<MAX_FIELD_LEN>> {
    form.split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| percent_decode(value))
}

fn percent_decode<const N: usize>(text: &str) -> Option<String<N>> {
    let mut bytes: heapless::Vec<u8, N> = heapless::Vec::new();
    let mut input = text.bytes();
    while let Some(byte) = input.next() {
        let decoded = match byte {
            b'+' => b' ',
            b'%' => {
                let high = hex_digit(input.next()?)?;
                let low = hex_digit(input.next()?)?;
                (high << 4) | low
            }
            other => other,
        };
        bytes.push(decoded).ok()?;
    }

    let mut out = String::new();
    out.push_str(core::str::from_utf8(&bytes).ok()?).ok()?;
    Some(out)
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
