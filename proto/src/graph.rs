use serde::{Deserialize, Serialize};

/// Node identifier assigned by the engine. Unique within a run.
pub type NodeId = u32;

/// A graph node as reported by the engine's `init` event. Positions are
/// layout hints supplied by the engine, not computed client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A directed edge as reported by the engine's `init` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub capacity: f64,
    #[serde(default)]
    pub flow: f64,
}

impl std::fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({}/{})", self.source, self.target, self.flow, self.capacity)
    }
}
