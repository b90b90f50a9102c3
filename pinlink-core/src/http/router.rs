//! Route table
//!
//! | Route                  | Effect                                      |
//! |------------------------|---------------------------------------------|
//! | `GET /`                | `/index.html` from storage                  |
//! | `GET /configure/show`  | raw persisted configuration record          |
//! | `POST /configure`      | `config arg1 arg2 arg3`, replies the code   |
//! | `GET /read?pin=`       | `read pin`, replies the value               |
//! | `GET /read_all`        | reads every pin, replies `A0,D0,...,D8`     |
//! | `POST /write`          | `write pin value`, replies `OK` or the code |
//! | anything else          | static file from storage                    |

use core::fmt::Write;

use heapless::{String, Vec};
use log::debug;
use pinlink_hal::{FileStorage, PinDriver, SystemControl};
use pinlink_protocol::{PinId, ResultCode};

use super::request::{Method, Request};
use crate::config::{ConfigStore, MAX_RECORD_SIZE};
use crate::dispatch::{CommandSink, Dispatcher};

/// Largest text response body
pub const MAX_BODY_LEN: usize = 512;

/// Longest static file path
pub const MAX_PATH_LEN: usize = 96;

/// Response status codes in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
}

impl Status {
    /// Numeric status code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Reason phrase for the status line
    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
        }
    }
}

/// What to send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A short generated body
    Text {
        status: Status,
        content_type: &'static str,
        body: String<MAX_BODY_LEN>,
    },
    /// A file streamed from storage
    File {
        path: String<MAX_PATH_LEN>,
        content_type: &'static str,
        size: usize,
    },
}

impl Response {
    /// Plain-text response
    ///
    /// Bodies longer than [`MAX_BODY_LEN`] are cut short.
    pub fn text(status: Status, body: &str) -> Self {
        let mut text = String::new();
        for c in body.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        Response::Text {
            status,
            content_type: "text/plain",
            body: text,
        }
    }

    /// Status of the response
    pub fn status(&self) -> Status {
        match self {
            Response::Text { status, .. } => *status,
            Response::File { .. } => Status::Ok,
        }
    }

    fn code(status: Status, code: ResultCode) -> Self {
        let mut body: String<8> = String::new();
        let _ = write!(body, "{}", code.code());
        Self::text(status, &body)
    }
}

/// Command execution plus read access to pin values
pub trait ControlPanel: CommandSink {
    /// Last value read from a pin
    fn pin_value(&self, pin: PinId) -> Option<i32>;
}

impl<D: PinDriver, S: SystemControl> ControlPanel for Dispatcher<'_, D, S> {
    fn pin_value(&self, pin: PinId) -> Option<i32> {
        self.pins().value(pin)
    }
}

/// Route one request
///
/// # Arguments
/// * `request` - Parsed request
/// * `panel` - Executes commands on behalf of the request
/// * `storage` - Static files and the persisted record
pub fn route<P, F>(request: &Request<'_>, panel: &mut P, storage: &mut F) -> Response
where
    P: ControlPanel + ?Sized,
    F: FileStorage,
{
    debug!("http {:?} {}", request.method, request.path);
    match (request.method, request.path) {
        (Method::Get, "/") => static_file("/index.html", storage),
        (Method::Get, "/configure/show") => show_config(storage),
        (Method::Post, "/configure") => configure(request, panel),
        (Method::Get, "/read") => read(request, panel),
        (Method::Get, "/read_all") => read_all(panel),
        (Method::Post, "/write") => write(request, panel),
        (_, path) => static_file(path, storage),
    }
}

fn show_config<F: FileStorage>(storage: &mut F) -> Response {
    let mut buffer = [0u8; MAX_RECORD_SIZE];
    match ConfigStore::read_persisted(storage, &mut buffer) {
        Ok(Some(text)) => Response::text(Status::Ok, text),
        Ok(None) => Response::text(Status::Ok, "Configuration file not found."),
        Err(code) => Response::code(Status::Ok, code),
    }
}

fn configure<P: ControlPanel + ?Sized>(request: &Request<'_>, panel: &mut P) -> Response {
    let args: Vec<_, 3> = ["arg1", "arg2", "arg3"]
        .iter()
        .map_while(|name| request.arg(name))
        .collect();
    let mut tokens: Vec<&str, 4> = Vec::new();
    let _ = tokens.push("config");
    for arg in args.iter() {
        let _ = tokens.push(arg.as_str());
    }
    Response::code(Status::Ok, panel.execute(&tokens))
}

fn read<P: ControlPanel + ?Sized>(request: &Request<'_>, panel: &mut P) -> Response {
    let Some(pin) = request.arg("pin") else {
        return Response::text(Status::BadRequest, "Missing pin");
    };
    let code = panel.execute(&["read", pin.as_str()]);
    if !code.is_success() {
        return Response::code(Status::BadRequest, code);
    }

    let value = panel.pin_value(PinId::resolve(&pin)).unwrap_or_default();
    let mut body: String<12> = String::new();
    let _ = write!(body, "{}", value);
    Response::text(Status::Ok, &body)
}

fn read_all<P: ControlPanel + ?Sized>(panel: &mut P) -> Response {
    let mut body: String<MAX_BODY_LEN> = String::new();
    for (i, pin) in PinId::ALL.iter().enumerate() {
        // Unset pins keep reporting their last value
        let _ = panel.execute(&["read", pin.name()]);
        if i > 0 {
            let _ = body.push(',');
        }
        let _ = write!(body, "{}", panel.pin_value(*pin).unwrap_or_default());
    }
    Response::text(Status::Ok, &body)
}

fn write<P: ControlPanel + ?Sized>(request: &Request<'_>, panel: &mut P) -> Response {
    let (Some(pin), Some(value)) = (request.arg("pin"), request.arg("value")) else {
        return Response::text(Status::BadRequest, "Missing pin or value");
    };
    match panel.execute(&["write", pin.as_str(), value.as_str()]) {
        ResultCode::Success => Response::text(Status::Ok, "OK"),
        code => Response::code(Status::Ok, code),
    }
}

fn static_file<F: FileStorage>(path: &str, storage: &mut F) -> Response {
    let mut full: String<MAX_PATH_LEN> = String::new();
    let fits = full.push_str(path).is_ok()
        && (!path.ends_with('/') || full.push_str("index.html").is_ok());

    if fits {
        if let Ok(size) = storage.size(&full) {
            return Response::File {
                content_type: content_type(&full),
                path: full,
                size,
            };
        }
    }

    let mut body: String<MAX_BODY_LEN> = String::new();
    let _ = write!(body, "Could not find file: {}", path);
    Response::text(Status::NotFound, &body)
}

fn content_type(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match extension {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "text/plain",
    }
}
