//! HTTP control panel
//!
//! A single-connection HTTP/1.x server polled from the device tick. Requests
//! are parsed in place from a fixed buffer, routed to the dispatcher or to
//! static files in storage, answered with `Connection: close` and closed.

pub mod request;
pub mod router;
pub mod server;

pub use request::{parse_request, HttpError, Method, Request, MAX_REQUEST_SIZE};
pub use router::{route, ControlPanel, Response, Status};
pub use server::{HttpServer, REQUEST_TIMEOUT_MS};
