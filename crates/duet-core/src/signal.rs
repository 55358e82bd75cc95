use serde::{Deserialize, Serialize};

/// Peer-connection negotiation message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

/// A relayed negotiation message. The payload is opaque and never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMessage {
    pub id: u64,
    pub from_participant_id: String,
    pub to_participant_id: String,
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub payload: serde_json::Value,
    pub created_at: u64,
}
