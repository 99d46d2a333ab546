use serde::{Deserialize, Serialize};

/// Command sent back to the engine over the streaming connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    Stop,
}

impl ClientCommand {
    pub fn to_json(&self) -> String {
        // A unit-variant tagged enum cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl std::fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientCommand::Stop => write!(f, "stop"),
        }
    }
}

/// Body of the start request, sent over the HTTP channel rather than the
/// streaming connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub source: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<u32>,
    pub algorithm: String,
    pub graph_type: String,
    pub graph_file: String,
    pub speed: f64,
}

/// Engine's answer to a start request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartAck {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Selectable options reported by the engine's config endpoint, fetched once
/// at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub algorithms: Vec<String>,
    pub graph_types: Vec<String>,
    pub predefined_graphs: Vec<String>,
}
