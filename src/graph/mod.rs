//! The stage graph: projection of a stage list onto canvas nodes and edges.
//!
//! Nodes and edges are never cached. The host calls [`recompute`] whenever the
//! stage list, the analytics snapshot or the selection changes.

use crate::analytics::{
    ConversionHealth, StageAnalyticsMap, conversion_rates, flow_intensity, is_active,
};
use crate::navigation::resolve_stage;
use crate::stage::Stage;
use crate::ui::{
    ANALYTICS_EDGE_TYPE, ANALYTICS_NODE_TYPE, EdgeData, FLOW_EDGE_TYPE, FlowEdge, FlowNode,
    NodeAnalytics, STAGE_NODE_TYPE, StageNodeData,
};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

pub mod editor;
pub mod layout;
pub mod mutations;

pub use editor::FlowEditor;
pub use layout::GridLayout;
pub use mutations::*;

/// Which surface the graph is rendered for.
#[derive(Debug, Clone, Copy)]
pub enum ViewMode<'a> {
    /// Drag, connect, delete and auto-arrange.
    Editable,
    /// Read-only overlay of live funnel metrics.
    Analytics(&'a StageAnalyticsMap),
}

/// Everything the rendering host needs for one frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphView {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Identity of the `ordinal`-th connection of `source`.
pub fn edge_id(source: &str, target: &str, source_handle: Option<&str>, ordinal: usize) -> String {
    format!(
        "e-{}-{}-{}-{}",
        source,
        target,
        source_handle.unwrap_or("default"),
        ordinal
    )
}

/// One node per stage, placed on `layout` unless a position is stored.
pub fn to_nodes(stages: &[Stage], selected_id: Option<&str>, layout: &GridLayout) -> Vec<FlowNode> {
    stages
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let navigation = resolve_stage(stage);
            FlowNode {
                id: stage.id.clone(),
                node_type: STAGE_NODE_TYPE,
                position: stage.position.unwrap_or_else(|| layout.position_for(index)),
                data: StageNodeData {
                    label: stage.name.clone(),
                    order: stage.order,
                    components: navigation.components,
                    has_no_navigation: navigation.has_no_navigation,
                    analytics: None,
                },
                selected: selected_id == Some(stage.id.as_str()),
            }
        })
        .collect()
}

/// One edge per connection whose target exists. Dangling connections are skipped.
pub fn to_edges(stages: &[Stage]) -> Vec<FlowEdge> {
    let known: AHashSet<&str> = stages.iter().map(|s| s.id.as_str()).collect();
    let known = &known;

    stages
        .iter()
        .flat_map(move |stage| {
            stage
                .connections
                .iter()
                .enumerate()
                .filter(move |(_, c)| known.contains(c.target_stage_id.as_str()))
                .map(move |(ordinal, c)| FlowEdge {
                    id: edge_id(
                        &stage.id,
                        &c.target_stage_id,
                        c.source_handle.as_deref(),
                        ordinal,
                    ),
                    source: stage.id.clone(),
                    target: c.target_stage_id.clone(),
                    source_handle: c.source_handle.clone(),
                    edge_type: FLOW_EDGE_TYPE,
                    data: EdgeData::default(),
                })
        })
        .collect()
}

/// Derives the full view from its three inputs.
pub fn recompute(stages: &[Stage], mode: ViewMode<'_>, selected_id: Option<&str>) -> GraphView {
    recompute_with_layout(stages, mode, selected_id, &GridLayout::default())
}

pub fn recompute_with_layout(
    stages: &[Stage],
    mode: ViewMode<'_>,
    selected_id: Option<&str>,
    layout: &GridLayout,
) -> GraphView {
    let mut nodes = to_nodes(stages, selected_id, layout);
    let mut edges = to_edges(stages);

    if let ViewMode::Analytics(analytics) = mode {
        overlay_analytics(stages, analytics, &mut nodes, &mut edges);
    }

    GraphView { nodes, edges }
}

fn overlay_analytics(
    stages: &[Stage],
    analytics: &StageAnalyticsMap,
    nodes: &mut [FlowNode],
    edges: &mut [FlowEdge],
) {
    let mut ordered: Vec<&Stage> = stages.iter().collect();
    ordered.sort_by_key(|s| s.order);
    let ordered_ids: Vec<String> = ordered.into_iter().map(|s| s.id.clone()).collect();
    let conversions: AHashMap<String, Option<f64>> = conversion_rates(&ordered_ids, analytics)
        .into_iter()
        .map(|c| (c.stage_id, c.rate))
        .collect();

    for node in nodes.iter_mut() {
        let stats = analytics.get(&node.id);
        let rate = conversions.get(&node.id).copied().flatten();
        node.node_type = ANALYTICS_NODE_TYPE;
        node.data.analytics = Some(NodeAnalytics {
            leads: stats.leads,
            recent_activity: stats.recent_activity,
            is_active: is_active(stats.recent_activity),
            conversion_rate: rate,
            health: rate.map(ConversionHealth::classify),
        });
    }

    for edge in edges.iter_mut() {
        let recent = analytics.recent_activity(&edge.target);
        edge.edge_type = ANALYTICS_EDGE_TYPE;
        edge.data = EdgeData {
            recent_activity: Some(recent),
            flow_intensity: Some(flow_intensity(recent)),
        };
    }
}
