//! Navigation eligibility: which components of a stage can originate a
//! connection, and under which handle ids.
//!
//! Eligibility is derived at read time from the component's typed configuration
//! and is never stored.

use crate::stage::{ButtonAction, Component, ComponentConfig, ComponentKind, Stage};
use serde::Serialize;

/// How a component participates in navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// The component itself exposes one handle.
    Connectable,
    /// Each option of the component exposes its own handle.
    OptionBearing,
    Inert,
}

/// A connection point for one option of a choice component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionHandle {
    pub option_id: String,
    pub text: String,
    pub handle_id: String,
    pub target_stage_id: Option<String>,
}

/// A component as the canvas renders it, with its connection points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHandles {
    pub component_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub kind: ComponentKind,
    pub is_connectable: bool,
    /// Present only when `is_connectable`.
    pub handle_id: Option<String>,
    pub options: Vec<OptionHandle>,
}

impl ComponentHandles {
    pub fn eligibility(&self) -> Eligibility {
        if !self.options.is_empty() {
            Eligibility::OptionBearing
        } else if self.is_connectable {
            Eligibility::Connectable
        } else {
            Eligibility::Inert
        }
    }

    /// All handle ids this component exposes, in render order.
    pub fn handle_ids(&self) -> impl Iterator<Item = &str> {
        self.handle_id
            .as_deref()
            .into_iter()
            .chain(self.options.iter().map(|o| o.handle_id.as_str()))
    }
}

/// The resolved navigation surface of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNavigation {
    pub stage_id: String,
    pub components: Vec<ComponentHandles>,
    /// Advisory warning: the stage has components but none can navigate.
    pub has_no_navigation: bool,
}

pub fn component_handle_id(component_id: &str) -> String {
    component_id.to_string()
}

pub fn option_handle_id(component_id: &str, option_id: &str) -> String {
    format!("{}-{}", component_id, option_id)
}

/// Classifies a component. Choice components with no options fall through to
/// the regular path and are inert.
pub fn classify(component: &Component) -> Eligibility {
    match &component.config {
        ComponentConfig::Button(cfg) => match cfg.action {
            ButtonAction::Next | ButtonAction::Submit | ButtonAction::SpecificStage { .. } => {
                Eligibility::Connectable
            }
            ButtonAction::CustomUrl { .. } | ButtonAction::Unknown(_) => Eligibility::Inert,
        },
        ComponentConfig::Loading(_) => Eligibility::Connectable,
        ComponentConfig::SingleChoice(cfg) | ComponentConfig::MultipleChoice(cfg) => {
            if cfg.options.is_empty() {
                Eligibility::Inert
            } else {
                Eligibility::OptionBearing
            }
        }
        ComponentConfig::Text(_) | ComponentConfig::Other { .. } => Eligibility::Inert,
    }
}

pub fn resolve_component(component: &Component) -> ComponentHandles {
    let eligibility = classify(component);

    let options = match (&component.config, eligibility) {
        (
            ComponentConfig::SingleChoice(cfg) | ComponentConfig::MultipleChoice(cfg),
            Eligibility::OptionBearing,
        ) => cfg
            .options
            .iter()
            .map(|o| OptionHandle {
                option_id: o.id.clone(),
                text: o.text.clone(),
                handle_id: option_handle_id(&component.id, &o.id),
                target_stage_id: o.target_stage_id.clone(),
            })
            .collect(),
        _ => Vec::new(),
    };

    let is_connectable = eligibility == Eligibility::Connectable;
    ComponentHandles {
        component_id: component.id.clone(),
        name: component.name.clone(),
        icon: component.icon.clone(),
        kind: component.kind(),
        is_connectable,
        handle_id: is_connectable.then(|| component_handle_id(&component.id)),
        options,
    }
}

pub fn resolve_stage(stage: &Stage) -> StageNavigation {
    let components: Vec<ComponentHandles> =
        stage.components.iter().map(resolve_component).collect();
    let has_no_navigation = !components.is_empty()
        && components
            .iter()
            .all(|c| c.eligibility() == Eligibility::Inert);

    StageNavigation {
        stage_id: stage.id.clone(),
        components,
        has_no_navigation,
    }
}

/// Ids of stages that would show the "no outgoing navigation" warning.
pub fn stages_without_navigation(stages: &[Stage]) -> Vec<String> {
    stages
        .iter()
        .map(resolve_stage)
        .filter(|n| n.has_no_navigation)
        .map(|n| n.stage_id)
        .collect()
}
