//! Pure transformations of a stage list. None of them validate for cycles or
//! duplicates, and none of them touch persistence.

use crate::stage::{Connection, Position, Stage};
use ahash::AHashSet;

/// Replaces one stage's position. Unknown ids leave the list unchanged.
pub fn apply_position_change(stages: &[Stage], stage_id: &str, position: Position) -> Vec<Stage> {
    stages
        .iter()
        .map(|s| {
            if s.id == stage_id {
                Stage {
                    position: Some(position),
                    ..s.clone()
                }
            } else {
                s.clone()
            }
        })
        .collect()
}

/// Appends a connection to the source stage.
pub fn apply_new_connection(
    stages: &[Stage],
    source_stage_id: &str,
    source_handle: Option<&str>,
    target_stage_id: &str,
) -> Vec<Stage> {
    stages
        .iter()
        .map(|s| {
            let mut s = s.clone();
            if s.id == source_stage_id {
                s.connections.push(Connection::new(
                    source_handle.map(str::to_string),
                    target_stage_id,
                ));
            }
            s
        })
        .collect()
}

/// Drops every connection for which `predicate(stage, connection)` holds.
pub fn remove_connections<F>(stages: &[Stage], predicate: F) -> Vec<Stage>
where
    F: Fn(&Stage, &Connection) -> bool,
{
    stages
        .iter()
        .map(|s| Stage {
            connections: s
                .connections
                .iter()
                .filter(|c| !predicate(s, c))
                .cloned()
                .collect(),
            ..s.clone()
        })
        .collect()
}

/// Removes all connections between each `(source, target)` pair, regardless of handle.
pub fn remove_edges_between(stages: &[Stage], pairs: &[(String, String)]) -> Vec<Stage> {
    remove_connections(stages, |stage, conn| {
        pairs
            .iter()
            .any(|(source, target)| *source == stage.id && *target == conn.target_stage_id)
    })
}

/// Deletes a stage and every connection pointing at it.
pub fn remove_stage(stages: &[Stage], stage_id: &str) -> Vec<Stage> {
    let remaining: Vec<Stage> = stages.iter().filter(|s| s.id != stage_id).cloned().collect();
    remove_connections(&remaining, |_, conn| conn.target_stage_id == stage_id)
}

/// Drops connections whose target stage no longer exists.
pub fn prune_dangling(stages: &[Stage]) -> Vec<Stage> {
    let known: AHashSet<&str> = stages.iter().map(|s| s.id.as_str()).collect();
    remove_connections(stages, |_, conn| {
        !known.contains(conn.target_stage_id.as_str())
    })
}

/// Whether any connection targets a missing stage.
pub fn has_dangling(stages: &[Stage]) -> bool {
    let known: AHashSet<&str> = stages.iter().map(|s| s.id.as_str()).collect();
    stages
        .iter()
        .flat_map(|s| &s.connections)
        .any(|c| !known.contains(c.target_stage_id.as_str()))
}
