//! Connection handling
//!
//! One connection is served at a time. Its bytes accumulate across ticks
//! until a full request is present, then the response is written and the
//! connection closed.

use core::fmt::Write as _;

use heapless::String;
use log::{debug, info, warn};
use pinlink_hal::{FileStorage, Listener, Stream};
use pinlink_protocol::ResultCode;

use super::request::{parse_request, HttpError, MAX_REQUEST_SIZE};
use super::router::{route, ControlPanel, Response, Status};

/// Time a client has to deliver a complete request
pub const REQUEST_TIMEOUT_MS: u64 = 2000;

const CHUNK_SIZE: usize = 256;

struct Pending<S> {
    stream: S,
    buffer: [u8; MAX_REQUEST_SIZE],
    len: usize,
    since_ms: u64,
}

/// Poll-driven HTTP server
pub struct HttpServer<S> {
    pending: Option<Pending<S>>,
    listening_on: Option<u16>,
}

impl<S: Stream> Default for HttpServer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Stream> HttpServer<S> {
    /// Create an idle server
    pub fn new() -> Self {
        Self {
            pending: None,
            listening_on: None,
        }
    }

    /// Check if a connection is being served
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the connection in progress
    pub fn close(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            pending.stream.close();
        }
    }

    /// Service the server once
    ///
    /// # Arguments
    /// * `listener` - Listener for the HTTP port
    /// * `port` - Configured HTTP port
    /// * `now_ms` - Current time
    /// * `panel` - Executes commands for the routes
    /// * `storage` - Static files and the persisted record
    ///
    /// # Returns
    /// [`ResultCode::Http`] when listening or answering failed, otherwise
    /// success. Command results go back to the client, not to the caller.
    pub fn tick<L, P, F>(
        &mut self,
        listener: &mut L,
        port: u16,
        now_ms: u64,
        panel: &mut P,
        storage: &mut F,
    ) -> ResultCode
    where
        L: Listener<Stream = S>,
        P: ControlPanel + ?Sized,
        F: FileStorage,
    {
        if self.listening_on != Some(port) {
            self.close();
            if let Err(error) = listener.listen(port) {
                warn!("cannot listen on http port {}: {:?}", port, error);
                return ResultCode::Http;
            }
            info!("http server on port {}", port);
            self.listening_on = Some(port);
        }

        let mut pending = match self.pending.take() {
            Some(pending) => pending,
            None => match listener.accept() {
                Some(stream) => Pending {
                    stream,
                    buffer: [0; MAX_REQUEST_SIZE],
                    len: 0,
                    since_ms: now_ms,
                },
                None => return ResultCode::Success,
            },
        };

        if !receive(&mut pending) {
            debug!("http client went away");
            pending.stream.close();
            return ResultCode::Success;
        }

        let response = match parse_request(&pending.buffer[..pending.len]) {
            Ok(request) => Some(route(&request, panel, storage)),
            Err(HttpError::Incomplete)
                if pending.len < MAX_REQUEST_SIZE
                    && now_ms.saturating_sub(pending.since_ms) < REQUEST_TIMEOUT_MS =>
            {
                None
            }
            Err(error) => {
                warn!("bad http request: {:?}", error);
                Some(Response::text(Status::BadRequest, "Bad Request"))
            }
        };
        let Some(response) = response else {
            self.pending = Some(pending);
            return ResultCode::Success;
        };

        let result = respond(&mut pending.stream, &response, storage);
        pending.stream.close();
        match result {
            Ok(()) => ResultCode::Success,
            Err(code) => {
                warn!("http response failed");
                code
            }
        }
    }
}

/// Pull every ready byte into the request buffer
///
/// Returns `false` once the peer has closed or the stream failed.
fn receive<S: Stream>(pending: &mut Pending<S>) -> bool {
    while pending.len < MAX_REQUEST_SIZE {
        match pending.stream.read_ready() {
            Ok(true) => match pending.stream.read(&mut pending.buffer[pending.len..]) {
                Ok(0) | Err(_) => return false,
                Ok(n) => pending.len += n,
            },
            Ok(false) => break,
            Err(_) => return false,
        }
    }
    true
}

fn respond<S: Stream, F: FileStorage>(
    stream: &mut S,
    response: &Response,
    storage: &mut F,
) -> Result<(), ResultCode> {
    let (status, content_type, length) = match response {
        Response::Text {
            status,
            content_type,
            body,
        } => (*status, *content_type, body.len()),
        Response::File {
            content_type, size, ..
        } => (Status::Ok, *content_type, *size),
    };

    let mut head: String<192> = String::new();
    write!(
        head,
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        status.code(),
        status.reason(),
        content_type,
        length
    )
    .map_err(|_| ResultCode::Http)?;
    stream.write_all(head.as_bytes()).map_err(|_| ResultCode::Http)?;

    match response {
        Response::Text { body, .. } => {
            stream.write_all(body.as_bytes()).map_err(|_| ResultCode::Http)?;
        }
        Response::File { path, size, .. } => {
            let mut chunk = [0u8; CHUNK_SIZE];
            let mut offset = 0;
            while offset < *size {
                let n = storage
                    .read_at(path, offset, &mut chunk)
                    .map_err(|_| ResultCode::Http)?;
                if n == 0 {
                    break;
                }
                stream.write_all(&chunk[..n]).map_err(|_| ResultCode::Http)?;
                offset += n;
            }
        }
    }
    stream.flush().map_err(|_| ResultCode::Http)
}
