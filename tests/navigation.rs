//! Tests for navigation eligibility resolution.
mod common;
use common::*;
use quizflow::navigation::{
    classify, option_handle_id, resolve_component, stages_without_navigation,
};
use quizflow::prelude::*;

fn button(action: ButtonAction) -> Component {
    Component::new("btn", "Button", ComponentConfig::button("Go", action))
}

#[test]
fn test_button_actions() {
    assert_eq!(classify(&button(ButtonAction::Next)), Eligibility::Connectable);
    assert_eq!(classify(&button(ButtonAction::Submit)), Eligibility::Connectable);
    assert_eq!(
        classify(&button(ButtonAction::SpecificStage {
            target_stage_id: Some("q2".into())
        })),
        Eligibility::Connectable
    );
    assert_eq!(
        classify(&button(ButtonAction::CustomUrl { url: None })),
        Eligibility::Inert
    );
    assert_eq!(
        classify(&button(ButtonAction::Unknown("share".into()))),
        Eligibility::Inert
    );
}

#[test]
fn test_loading_is_always_connectable() {
    let loader = Component::new(
        "l",
        "Loader",
        ComponentConfig::Loading(LoadingConfig { duration_ms: None }),
    );
    let handles = resolve_component(&loader);
    assert!(handles.is_connectable);
    assert_eq!(handles.handle_id.as_deref(), Some("l"));
}

#[test]
fn test_choice_options_expose_their_own_handles() {
    let stages = create_quiz_stages();
    let navigation = resolve_stage(&stages[1]);
    let choice = &navigation.components[0];

    assert_eq!(choice.eligibility(), Eligibility::OptionBearing);
    assert!(!choice.is_connectable);
    assert_eq!(choice.handle_id, None);
    let handles: Vec<_> = choice.options.iter().map(|o| o.handle_id.clone()).collect();
    assert_eq!(
        handles,
        [option_handle_id("q1-choice", "a"), option_handle_id("q1-choice", "b")]
    );
    assert_eq!(choice.options[0].target_stage_id.as_deref(), Some("q2"));
    assert!(!navigation.has_no_navigation);
}

#[test]
fn test_empty_choice_falls_back_to_inert() {
    let choice = Component::new(
        "c",
        "Choice",
        ComponentConfig::multiple_choice("Pick", Vec::new()),
    );
    let handles = resolve_component(&choice);
    assert_eq!(handles.eligibility(), Eligibility::Inert);
    assert_eq!(handles.handle_ids().count(), 0);
}

#[test]
fn test_stage_without_navigation_is_flagged() {
    let stages = create_quiz_stages();
    // q2 only has a text input, result only a custom-url button.
    assert_eq!(stages_without_navigation(&stages), ["q2", "result"]);
}

#[test]
fn test_dangling_connections_do_not_affect_warnings() {
    let stages = create_quiz_stages();
    let without_loading: Vec<Stage> = stages.into_iter().filter(|s| s.id != "loading").collect();
    // q2 still points at the removed loader.
    assert_eq!(without_loading[2].connections[0].target_stage_id, "loading");
    assert_eq!(stages_without_navigation(&without_loading), ["q2", "result"]);
    assert!(resolve_stage(&without_loading[0]).components[0].is_connectable);
}

#[test]
fn test_handles_flow_into_node_data() {
    let nodes = to_nodes(&create_quiz_stages(), None, &GridLayout::default());
    assert!(nodes[2].data.has_no_navigation);
    assert_eq!(nodes[1].data.components[0].options.len(), 2);
}
