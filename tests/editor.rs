//! Tests for the editable flow canvas and its persistence.
mod common;
use common::*;
use quizflow::prelude::*;
use std::sync::Arc;

async fn load_editor(backend: &Arc<MemoryBackend>) -> FlowEditor {
    FlowEditor::load(QUIZ, backend.clone()).await.unwrap()
}

#[tokio::test]
async fn test_move_stage_persists_positions() {
    let backend = create_backend(create_quiz_stages(), vec![], vec![]);
    let mut editor = load_editor(&backend).await;

    editor.move_stage("q1", Position::new(640.0, 80.0)).await.unwrap();

    assert_eq!(backend.saves(), 1);
    let stored = backend.stages(QUIZ);
    assert_eq!(stored[1].position, Some(Position::new(640.0, 80.0)));
    assert_eq!(stored, editor.stages());
}

#[tokio::test]
async fn test_connect_adds_edge() {
    let backend = create_backend(create_quiz_stages(), vec![], vec![]);
    let mut editor = load_editor(&backend).await;

    editor.connect("result", None, "welcome").await.unwrap();

    let view = editor.view(ViewMode::Editable);
    assert!(view.edges.iter().any(|e| e.source == "result" && e.target == "welcome"));
    assert_eq!(backend.stages(QUIZ)[4].connections, vec![Connection::to("welcome")]);
}

#[tokio::test]
async fn test_delete_edges_matches_by_stage_pair() {
    let backend = create_backend(create_quiz_stages(), vec![], vec![]);
    let mut editor = load_editor(&backend).await;
    editor.connect("q1", None, "q2").await.unwrap();

    let edge = editor
        .view(ViewMode::Editable)
        .edges
        .into_iter()
        .find(|e| e.source == "q1" && e.target == "q2")
        .unwrap();
    editor.delete_edges(&[edge]).await.unwrap();

    let q1 = &editor.stages()[1];
    assert_eq!(q1.connections.len(), 1);
    assert_eq!(q1.connections[0].target_stage_id, "result");
}

#[tokio::test]
async fn test_auto_arrange_uses_screen_order() {
    let mut stages = create_quiz_stages();
    stages[0].position = Some(Position::new(999.0, 999.0));
    let backend = create_backend(stages, vec![], vec![]);
    let mut editor = load_editor(&backend).await;

    let order: Vec<String> = ["result", "loading", "q2", "q1", "welcome"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    editor.auto_arrange(&order).await.unwrap();

    let positions: Vec<_> = editor.stages().iter().map(|s| s.position.unwrap()).collect();
    assert_eq!(positions[4], Position::new(100.0, 100.0));
    assert_eq!(positions[1], Position::new(1000.0, 100.0));
    assert_eq!(positions[0], Position::new(100.0, 300.0));
    assert_eq!(backend.saves(), 1);
}

#[tokio::test]
async fn test_selection_is_bidirectional() {
    let backend = create_backend(create_quiz_stages(), vec![], vec![]);
    let mut editor = load_editor(&backend).await;

    editor.select(Some("q1"));
    assert_eq!(editor.selected(), Some("q1"));
    let view = editor.view(ViewMode::Editable);
    assert!(view.nodes.iter().find(|n| n.id == "q1").unwrap().selected);

    editor.select(Some("does-not-exist"));
    assert_eq!(editor.selected(), None);
    assert_eq!(backend.saves(), 0);
}

#[tokio::test]
async fn test_remove_stage_prunes_and_clears_selection() {
    let backend = create_backend(create_quiz_stages(), vec![], vec![]);
    let mut editor = load_editor(&backend).await;
    editor.select(Some("loading"));

    editor.remove_stage("loading").await.unwrap();

    assert_eq!(editor.selected(), None);
    assert_eq!(editor.stages().len(), 4);
    assert!(editor.stages()[2].connections.is_empty());
}

#[tokio::test]
async fn test_next_mutation_cleans_up_dangling_connections() {
    let mut stages = create_quiz_stages();
    stages[0].connections.push(Connection::to("gone"));
    let backend = create_backend(stages, vec![], vec![]);
    let mut editor = load_editor(&backend).await;
    assert_eq!(editor.stages()[0].connections.len(), 2);

    editor.move_stage("q2", Position::new(1.0, 2.0)).await.unwrap();

    assert_eq!(editor.stages()[0].connections.len(), 1);
    assert_eq!(backend.stages(QUIZ)[0].connections.len(), 1);
}

#[tokio::test]
async fn test_failed_save_keeps_local_state() {
    let mut editor = FlowEditor::new(QUIZ, create_quiz_stages(), Arc::new(FailingStore));

    let err = editor
        .move_stage("welcome", Position::new(3.0, 4.0))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Write("disk full".to_string()));
    assert_eq!(editor.stages()[0].position, Some(Position::new(3.0, 4.0)));
}

#[tokio::test]
async fn test_load_unknown_quiz_fails() {
    let backend = create_backend(vec![], vec![], vec![]);
    let result = FlowEditor::load("missing", backend).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}
