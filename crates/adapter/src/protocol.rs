//! Wire protocol: line-delimited JSON, one message per line.
//!
//! Every message carries `type` and `seq`.

use serde::{Deserialize, Serialize};

use crate::core::{GridError, GridSnapshot};

/// Version announced in `welcome`; clients must share the major version.
pub const PROTOCOL_VERSION: &str = "1.0.0";

fn default_true() -> bool {
    true
}

/// `hello` - first message on every connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    pub client: String,
    pub protocol_version: String,
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

/// `command` - one game command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<u32>,
}

/// Anything a client may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    InvalidCommand,
    Backpressure,
    OutOfRange,
    BudgetExhausted,
    EmptyCell,
    SameCell,
    IllegalState,
}

impl From<&GridError> for ErrorCode {
    fn from(err: &GridError) -> Self {
        match err {
            GridError::OutOfRangeCellId { .. } => ErrorCode::OutOfRange,
            GridError::BudgetExhausted(_) => ErrorCode::BudgetExhausted,
            GridError::EmptyCell(_) => ErrorCode::EmptyCell,
            GridError::SameCell(_) => ErrorCode::SameCell,
            GridError::IllegalStateTransition { .. } => ErrorCode::IllegalState,
        }
    }
}

/// Anything the server sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Welcome {
        seq: u64,
        protocol_version: String,
    },
    Ack {
        seq: u64,
        changed: bool,
    },
    Error {
        seq: u64,
        code: ErrorCode,
        message: String,
    },
    Observation {
        seq: u64,
        snapshot: GridSnapshot,
    },
}

impl ServerMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ServerMessage::Welcome { seq, .. }
            | ServerMessage::Ack { seq, .. }
            | ServerMessage::Error { seq, .. }
            | ServerMessage::Observation { seq, .. } => *seq,
        }
    }
}

/// Result of parsing one inbound line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    /// Valid JSON with a `type` we do not know
    Unknown { seq: u64 },
}

/// Parse one line. Unknown message types are not a hard error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    match serde_json::from_str::<ClientMessage>(json) {
        Ok(ClientMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(ClientMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            #[derive(Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown {
                    seq: envelope.seq.unwrap_or(0),
                }),
            }
        }
    }
}

/// Pull `"seq": N` out of a line that failed to parse
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok()
}

/// True when `version` shares our major version
pub fn is_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    major(version).is_some() && major(version) == major(PROTOCOL_VERSION)
}

pub fn create_hello(seq: u64, client: &str) -> ClientMessage {
    ClientMessage::Hello(HelloMessage {
        seq,
        client: client.to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        stream_observations: true,
    })
}

pub fn create_welcome(seq: u64, protocol_version: &str) -> ServerMessage {
    ServerMessage::Welcome {
        seq,
        protocol_version: protocol_version.to_string(),
    }
}

pub fn create_ack(seq: u64, changed: bool) -> ServerMessage {
    ServerMessage::Ack { seq, changed }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error {
        seq,
        code,
        message: message.to_string(),
    }
}

pub fn create_observation(seq: u64, snapshot: GridSnapshot) -> ServerMessage {
    ServerMessage::Observation { seq, snapshot }
}
