use crate::analytics::ConversionHealth;
use crate::navigation::ComponentHandles;
use crate::stage::Position;
use serde::{Deserialize, Serialize};

/// Node type tag for the editable canvas.
pub const STAGE_NODE_TYPE: &str = "stageNode";
/// Node type tag for the read-only analytics overlay.
pub const ANALYTICS_NODE_TYPE: &str = "analyticsNode";
pub const FLOW_EDGE_TYPE: &str = "flowEdge";
pub const ANALYTICS_EDGE_TYPE: &str = "analyticsEdge";

// --- Persisted stage records (as stored by the backend) ---

/// A stage record as stored by the persistence collaborator.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiStage {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "stageOrder", alias = "index")]
    pub order: Option<u32>,
    #[serde(default)]
    pub components: Vec<UiComponent>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub connections: Option<Vec<UiConnection>>,
}

/// A component record with its untyped configuration blob.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConnection {
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(alias = "targetStageId", alias = "target")]
    pub target_stage_id: String,
}

// --- Rendering host contract ---

/// A canvas node. Field names are matched by the rendering host.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub position: Position,
    pub data: StageNodeData,
    pub selected: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageNodeData {
    pub label: String,
    pub order: u32,
    pub components: Vec<ComponentHandles>,
    /// Advisory: the stage has components but none of them can navigate.
    pub has_no_navigation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<NodeAnalytics>,
}

/// Live funnel metrics shown on an overlay node.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeAnalytics {
    pub leads: u64,
    pub recent_activity: u64,
    /// Drives the pulse indicator.
    pub is_active: bool,
    pub conversion_rate: Option<f64>,
    pub health: Option<ConversionHealth>,
}

/// A canvas edge. Field names are matched by the rendering host.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(rename = "type")]
    pub edge_type: &'static str,
    pub data: EdgeData,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_activity: Option<u64>,
    /// Number of animated dots, 0 to 3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_intensity: Option<u8>,
}
