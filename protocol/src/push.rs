//! Text frames of the ranking push channel.
//!
//! The backend speaks Socket.IO v5 on top of Engine.IO v4 over a plain
//! WebSocket. Only the handful of text packets the client needs are modeled:
//! handshake, heartbeat, namespace connect/disconnect and events. Binary
//! packets are rejected.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Empty frame")]
    Empty,
    #[error("Unknown packet type {0:?}")]
    UnknownPacket(char),
    #[error("Binary packets are not supported")]
    Binary,
    #[error("Malformed frame: {0}")]
    Malformed(&'static str),
    #[error("Invalid frame payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine.IO handshake parameters, sent by the server right after the socket opens.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    pub ping_interval: u32,
    pub ping_timeout: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PushFrame {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    Connect { namespace: String },
    Disconnect { namespace: String },
    ConnectError { namespace: String, message: String },
    Event {
        namespace: String,
        name: String,
        data: Value,
    },
}

impl PushFrame {
    pub fn connect(namespace: &str) -> Self {
        Self::Connect {
            namespace: namespace.to_owned(),
        }
    }

    /// Whether this is `event` emitted on `namespace`.
    pub fn is_event(&self, namespace: &str, event: &str) -> bool {
        matches!(self, Self::Event { namespace: ns, name, .. } if ns == namespace && name == event)
    }

    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(FrameError::Empty)?;
        let rest = chars.as_str();
        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(rest)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '4' => parse_message(rest),
            '6' => Ok(Self::Noop),
            'b' => Err(FrameError::Binary),
            other => Err(FrameError::UnknownPacket(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Open(handshake) => format!(
                r#"0{{"sid":{},"pingInterval":{},"pingTimeout":{}}}"#,
                Value::from(handshake.sid.as_str()),
                handshake.ping_interval,
                handshake.ping_timeout
            ),
            Self::Close => "1".into(),
            Self::Ping => "2".into(),
            Self::Pong => "3".into(),
            Self::Noop => "6".into(),
            Self::Connect { namespace } => format!("40{}", namespace_prefix(namespace)),
            Self::Disconnect { namespace } => format!("41{}", namespace_prefix(namespace)),
            Self::ConnectError { namespace, message } => format!(
                "44{}{}",
                namespace_prefix(namespace),
                serde_json::json!({ "message": message })
            ),
            Self::Event {
                namespace,
                name,
                data,
            } => {
                let args = if data.is_null() {
                    serde_json::json!([name])
                } else {
                    serde_json::json!([name, data])
                };
                format!("42{}{}", namespace_prefix(namespace), args)
            }
        }
    }
}

fn namespace_prefix(namespace: &str) -> String {
    if namespace.is_empty() || namespace == "/" {
        String::new()
    } else {
        format!("{},", namespace)
    }
}

/// Splits an optional `/namespace,` prefix off a Socket.IO packet body.
fn split_namespace(body: &str) -> (String, &str) {
    if let Some(stripped) = body.strip_prefix('/') {
        match stripped.find(',') {
            Some(end) => (format!("/{}", &stripped[..end]), &stripped[end + 1..]),
            // a bare namespace with no payload, e.g. `40/ranking`
            None => (body.to_owned(), ""),
        }
    } else {
        ("/".to_owned(), body)
    }
}

fn parse_message(body: &str) -> Result<PushFrame, FrameError> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or(FrameError::Malformed("missing socket packet type"))?;
    let (namespace, payload) = split_namespace(chars.as_str());
    // ack ids are not used by the client, skip them
    let payload = payload.trim_start_matches(|c: char| c.is_ascii_digit());

    match kind {
        '0' => Ok(PushFrame::Connect { namespace }),
        '1' => Ok(PushFrame::Disconnect { namespace }),
        '2' => {
            let args: Vec<Value> = serde_json::from_str(payload)?;
            let mut args = args.into_iter();
            let name = match args.next() {
                Some(Value::String(name)) => name,
                _ => return Err(FrameError::Malformed("event without a name")),
            };
            let data = args.next().unwrap_or(Value::Null);
            Ok(PushFrame::Event {
                namespace,
                name,
                data,
            })
        }
        '4' => {
            let message = match serde_json::from_str::<Value>(payload)? {
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
                Value::String(message) => message,
                _ => String::new(),
            };
            Ok(PushFrame::ConnectError { namespace, message })
        }
        '5' | '6' => Err(FrameError::Binary),
        // acks are never requested
        '3' => Ok(PushFrame::Noop),
        other => Err(FrameError::UnknownPacket(other)),
    }
}
