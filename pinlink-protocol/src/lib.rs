//! Pinlink Command Grammar
//!
//! This crate defines the text protocol shared by every Pinlink transport:
//! the serial console, raw socket sessions and the HTTP control panel all
//! reduce their input to the same token vector.
//!
//! # Protocol Overview
//!
//! One command per `\n`-terminated line, tokens separated by spaces:
//! ```text
//! reset
//! config show
//! config pin <PIN> <input|output>
//! config <field> <value>
//! read <PIN>
//! write <PIN> <value>
//! ```
//!
//! Keywords are case-insensitive. Every dispatch produces a [`ResultCode`],
//! a stable 16-bit value grouped into families.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod keywords;
pub mod line;
pub mod result;
pub mod tokens;

pub use keywords::{Command, ConfigCommand, PinDirection, PinId, Protocol};
pub use line::{LineBuffer, LineError, LINE_BUFFER_SIZE, MAX_LINE_SIZE};
pub use result::{ResultCode, ResultFamily};
pub use tokens::{tokenize, Tokens, MAX_TOKENS};
