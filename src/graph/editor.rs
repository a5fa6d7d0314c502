use super::layout::GridLayout;
use super::mutations::{
    apply_new_connection, apply_position_change, prune_dangling, remove_edges_between,
    remove_stage,
};
use super::{GraphView, ViewMode, recompute_with_layout};
use crate::backend::StageStore;
use crate::error::StoreError;
use crate::stage::{Position, Stage};
use crate::ui::FlowEdge;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, warn};

/// The editable canvas of one quiz.
///
/// Each structural mutation is applied locally, dangling connections are
/// pruned, and the whole stage list is handed to the [`StageStore`]. A failed
/// save keeps the local state and returns the error to the caller.
pub struct FlowEditor {
    quiz_id: String,
    stages: Vec<Stage>,
    selected: Option<String>,
    store: Arc<dyn StageStore>,
    layout: GridLayout,
}

impl FlowEditor {
    pub fn new(quiz_id: impl Into<String>, stages: Vec<Stage>, store: Arc<dyn StageStore>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            stages,
            selected: None,
            store,
            layout: GridLayout::default(),
        }
    }

    /// Loads the stage list of `quiz_id` from the store.
    pub async fn load(
        quiz_id: impl Into<String>,
        store: Arc<dyn StageStore>,
    ) -> Result<Self, StoreError> {
        let quiz_id = quiz_id.into();
        let mut stages = store.load_stages(&quiz_id).await?;
        stages.sort_by_key(|s| s.order);
        Ok(Self::new(quiz_id, stages, store))
    }

    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Sets the selected stage, from a node click or from outside the canvas.
    /// Unknown ids clear the selection.
    pub fn select(&mut self, stage_id: Option<&str>) {
        self.selected = stage_id
            .filter(|id| self.stages.iter().any(|s| s.id == *id))
            .map(str::to_string);
    }

    pub fn view(&self, mode: ViewMode<'_>) -> GraphView {
        recompute_with_layout(&self.stages, mode, self.selected(), &self.layout)
    }

    pub async fn move_stage(&mut self, stage_id: &str, position: Position) -> Result<(), StoreError> {
        let next = apply_position_change(&self.stages, stage_id, position);
        self.commit(next).await
    }

    pub async fn connect(
        &mut self,
        source_stage_id: &str,
        source_handle: Option<&str>,
        target_stage_id: &str,
    ) -> Result<(), StoreError> {
        let next = apply_new_connection(&self.stages, source_stage_id, source_handle, target_stage_id);
        self.commit(next).await
    }

    /// Handles a bulk edge-delete event. Edges are matched by (source, target)
    /// only, so every connection sharing a pair with a deleted edge is removed.
    pub async fn delete_edges(&mut self, edges: &[FlowEdge]) -> Result<(), StoreError> {
        let pairs: Vec<(String, String)> = edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .unique()
            .collect();
        let next = remove_edges_between(&self.stages, &pairs);
        self.commit(next).await
    }

    /// Places every node on the grid in its current on-screen order.
    pub async fn auto_arrange(&mut self, node_order: &[String]) -> Result<(), StoreError> {
        let next = self.layout.arrange(&self.stages, node_order);
        self.commit(next).await
    }

    pub async fn remove_stage(&mut self, stage_id: &str) -> Result<(), StoreError> {
        if self.selected.as_deref() == Some(stage_id) {
            self.selected = None;
        }
        let next = remove_stage(&self.stages, stage_id);
        self.commit(next).await
    }

    async fn commit(&mut self, next: Vec<Stage>) -> Result<(), StoreError> {
        self.stages = prune_dangling(&next);
        debug!(quiz_id = %self.quiz_id, stages = self.stages.len(), "Persisting stage graph");
        self.store
            .save_stages(&self.quiz_id, &self.stages)
            .await
            .inspect_err(|e| warn!(quiz_id = %self.quiz_id, error = %e, "Failed to persist stages"))
    }
}
