//! Messages exchanged with the broker and, through it, with the peer.

use crate::libgame::gesture::Move;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Game data sent to the connected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Gesture { gesture: Move },
    Score { score: u32 },
}

impl Payload {
    /// Returns `None` for anything that is not a well-formed payload.
    pub fn parse(value: &Value) -> Option<Payload> {
        Payload::deserialize(value).ok()
    }
}

/// Client to broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToBroker<P = Value> {
    Connect { peer: String },
    Data { payload: P },
}

/// Broker to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FromBroker {
    /// Session id assigned to this client.
    Open { id: String },
    Connection { peer: String },
    Data { payload: Value },
    Closed { peer: String },
    Error { reason: String },
}

impl<P: Serialize> ToBroker<P> {
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl ToBroker {
    pub fn parse(text: &str) -> serde_json::Result<ToBroker> {
        serde_json::from_str(text)
    }
}

impl FromBroker {
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn parse(text: &str) -> serde_json::Result<FromBroker> {
        serde_json::from_str(text)
    }
}
