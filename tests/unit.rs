//! Unit tests for loading, formatting and error reporting.
mod common;
use chrono::Duration;
use common::*;
use quizflow::analytics::compute_stage_analytics;
use quizflow::error::SnapshotError;
use quizflow::prelude::*;

const STAGE_RECORDS_JSON: &str = r#"[
  {
    "id": "intro",
    "name": "Intro",
    "order": 0,
    "position": { "x": 10.0, "y": 20.0 },
    "components": [
      { "id": "go", "type": "button", "name": "Go", "config": { "action": "next", "label": "Start" } }
    ],
    "connections": [ { "sourceHandle": "go", "targetStageId": "pick" } ]
  },
  {
    "id": "pick",
    "name": "Pick",
    "order": 1,
    "components": [
      { "id": "fav", "type": "single_choice", "config": {
          "question": "Favourite?",
          "options": [ { "id": 1, "text": "Red", "nextStageId": "end" }, { "id": "2", "label": "Blue" }, { "text": "no id" } ]
      } },
      { "id": "img", "type": "image", "config": { "src": "a.png" } }
    ]
  },
  {
    "id": "end",
    "name": "End",
    "order": 2,
    "components": [
      { "id": "share", "type": "button", "config": { "action": "custom_url", "url": "https://example.com" } },
      { "id": "jump", "type": "button", "config": { "action": "specific_stage", "targetStageId": "intro" } }
    ],
    "connections": null
  }
]"#;

#[test]
fn test_stage_loader_converts_records() {
    let stages = StageLoader::new().from_json(STAGE_RECORDS_JSON).unwrap();
    assert_eq!(stages.len(), 3);

    let intro = &stages[0];
    assert_eq!(intro.position, Some(Position::new(10.0, 20.0)));
    assert_eq!(intro.connections, vec![Connection::new(Some("go".into()), "pick")]);
    match &intro.components[0].config {
        ComponentConfig::Button(cfg) => {
            assert_eq!(cfg.label, "Start");
            assert_eq!(cfg.action, ButtonAction::Next);
        }
        other => panic!("unexpected config {:?}", other),
    }

    match &stages[1].components[0].config {
        ComponentConfig::SingleChoice(cfg) => {
            assert_eq!(cfg.options.len(), 2);
            assert_eq!(cfg.options[0].id, "1");
            assert_eq!(cfg.options[0].target_stage_id.as_deref(), Some("end"));
            assert_eq!(cfg.options[1].text, "Blue");
        }
        other => panic!("unexpected config {:?}", other),
    }
    assert_eq!(stages[1].components[1].kind(), ComponentKind::Other);

    let end = &stages[2];
    assert!(end.connections.is_empty());
    assert_eq!(
        end.components[1].config,
        ComponentConfig::button(
            "",
            ButtonAction::SpecificStage {
                target_stage_id: Some("intro".into())
            }
        )
    );
}

#[test]
fn test_stage_loader_rejects_missing_id() {
    let err = StageLoader::new()
        .from_json(r#"[{"name":"nameless"}]"#)
        .unwrap_err();
    assert!(err.to_string().contains("'id'"));
}

#[test]
fn test_funnel_formatter() {
    let stages = create_plain_stages(3);
    let stage_ids: Vec<String> = stages.iter().map(|s| s.id.clone()).collect();
    let sessions = vec![
        session("a").completed(minutes_ago(1)),
        session("b"),
        session("c"),
    ];
    let responses = vec![
        response("a", "s1", 10),
        response("b", "s1", 10),
        response("a", "s2", 2),
    ];
    let analytics =
        compute_stage_analytics(&stage_ids, &sessions, &responses, fixed_now(), Duration::minutes(5));

    let report = FunnelFormatter::format_funnel(&stages, &analytics);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("Stage 0") && lines[0].contains("conversion: -"));
    assert!(lines[1].contains("66.7% (warning)"));
    assert!(lines[2].contains("50% (warning)") && lines[2].contains("[1 recent]"));
    assert_eq!(lines[3], "sessions: 3  completed: 1  completion: 33.3%");
}

#[test]
fn test_format_percent() {
    assert_eq!(FunnelFormatter::format_percent(100.0), "100%");
    assert_eq!(FunnelFormatter::format_percent(12.345), "12.3%");
}

#[test]
fn test_error_display() {
    let err = SubscriptionError::Rejected {
        quiz_id: "quiz-1".to_string(),
        entity: WatchedEntity::Responses,
        reason: "denied".to_string(),
    };
    assert!(err.to_string().contains("responses"));
    assert!(err.to_string().contains("quiz-1"));

    let err = FetchError::Sessions("timeout".to_string());
    assert!(err.to_string().contains("timeout"));

    let err = StageConversionError::DuplicateStageId("s1".to_string());
    assert!(err.to_string().contains("s1"));
}

#[test]
fn test_snapshot_missing_file() {
    let err = QuizSnapshot::from_file("definitely/not/here.json").unwrap_err();
    assert!(matches!(err, SnapshotError::Io { .. }));
    assert!(err.to_string().contains("definitely/not/here.json"));
}
