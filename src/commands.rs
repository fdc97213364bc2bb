//! # Text Command Tables
//!
//! Command/response mapping for the ping-pong and binding characteristics.
//! Both tables are total: every input maps to exactly one response.

use bytes::{BufMut, Bytes, BytesMut};

/// Response to an unrecognized ping-pong command
pub const PING_PONG_UNKNOWN: &str = "UNKNOWN_CMD";

/// Response to an unrecognized binding command
pub const BINDING_UNKNOWN: &str = "UNKNOWN_COMMAND";

/// Prefix of an echo request and its reply
pub const ECHO_PREFIX: &str = "ECHO:";
pub const ECHO_REPLY_PREFIX: &str = "ECHO_REPLY:";

/// Message pushed periodically over the ping-pong channel
pub const HEARTBEAT_MESSAGE: &str = "HEARTBEAT";

/// Map a ping-pong command to its response
///
/// Matching is exact, case-sensitive and done on raw bytes, so an echo
/// reply carries the suffix back unchanged even when it is not UTF-8.
///
/// # Examples
///
/// ```
/// use extreme_link::commands::ping_pong_response;
///
/// assert_eq!(ping_pong_response(b"PING"), "PONG");
/// assert_eq!(ping_pong_response(b"ECHO:hi"), "ECHO_REPLY:hi");
/// assert_eq!(ping_pong_response(b"ping"), "UNKNOWN_CMD");
/// ```
pub fn ping_pong_response(command: &[u8]) -> Bytes {
    match command {
        b"PING" => Bytes::from_static(b"PONG"),
        b"TEST" => Bytes::from_static(b"OK"),
        b"STATUS" => Bytes::from_static(b"READY"),
        _ => match command.strip_prefix(ECHO_PREFIX.as_bytes()) {
            Some(suffix) => {
                let mut reply = BytesMut::with_capacity(ECHO_REPLY_PREFIX.len() + suffix.len());
                reply.put_slice(ECHO_REPLY_PREFIX.as_bytes());
                reply.put_slice(suffix);
                reply.freeze()
            }
            None => Bytes::from_static(PING_PONG_UNKNOWN.as_bytes()),
        },
    }
}

/// Commands accepted on the binding characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingCommand {
    Start,
    Stop,
    Status,
    Unknown,
}

impl BindingCommand {
    pub fn parse(command: &str) -> Self {
        match command {
            "START_BINDING" => BindingCommand::Start,
            "STOP_BINDING" => BindingCommand::Stop,
            "STATUS" => BindingCommand::Status,
            _ => BindingCommand::Unknown,
        }
    }
}

pub const BINDING_STARTED: &str = "BINDING_STARTED";
pub const BINDING_STOPPED: &str = "BINDING_STOPPED";
pub const BINDING_ACTIVE: &str = "BINDING_ACTIVE";
pub const BINDING_INACTIVE: &str = "BINDING_INACTIVE";

/// Status line reported for the current binding flag
pub fn binding_status(active: bool) -> &'static str {
    if active {
        BINDING_ACTIVE
    } else {
        BINDING_INACTIVE
    }
}
