use super::definition::*;
use crate::error::StageConversionError;
use crate::ui::{UiComponent, UiStage};
use ahash::{AHashMap, AHashSet};
use serde_json::Value as Json;

/// A trait for persisted stage formats that can be converted into typed `Stage`s.
///
/// `StageLoader` implements the conversion for the backend's own record shape
/// (`UiStage`); other storage formats can provide their own translation layer.
///
/// # Example
///
/// ```rust,no_run
/// use quizflow::stage::{IntoStages, Stage};
/// use quizflow::error::StageConversionError;
///
/// struct Screen { key: String, title: String }
/// struct Survey { screens: Vec<Screen> }
///
/// impl IntoStages for Survey {
///     fn into_stages(self) -> Result<Vec<Stage>, StageConversionError> {
///         Ok(self
///             .screens
///             .into_iter()
///             .enumerate()
///             .map(|(i, s)| Stage::new(s.key, i as u32, s.title))
///             .collect())
///     }
/// }
/// ```
pub trait IntoStages {
    /// Consumes the object and converts it into an ordered stage list.
    fn into_stages(self) -> Result<Vec<Stage>, StageConversionError>;
}

/// Converts persisted `UiStage` records into typed stages.
///
/// Component configuration blobs are untyped in storage. The loader resolves
/// each component's type name to a `ComponentKind` and reads the fields that
/// kind needs. Missing or malformed fields never fail the conversion: a choice
/// component without an `options` array simply has zero options.
pub struct StageLoader {
    type_mappings: AHashMap<String, ComponentKind>,
}

impl Default for StageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl StageLoader {
    pub fn new() -> Self {
        Self {
            type_mappings: AHashMap::new(),
        }
    }

    /// Maps a custom component type name onto one of the built-in kinds.
    pub fn with_type_mapping(mut self, user_type_name: &str, kind: ComponentKind) -> Self {
        self.type_mappings.insert(user_type_name.to_string(), kind);
        self
    }

    /// Parses a JSON array of stage records.
    pub fn from_json(&self, json: &str) -> Result<Vec<Stage>, StageConversionError> {
        let records: Vec<UiStage> =
            serde_json::from_str(json).map_err(|e| StageConversionError::Json(e.to_string()))?;
        self.convert(records)
    }

    pub fn convert(&self, records: Vec<UiStage>) -> Result<Vec<Stage>, StageConversionError> {
        let mut seen = AHashSet::new();
        let mut stages = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let id = record.id.ok_or(StageConversionError::MissingField {
                index,
                field: "id",
            })?;
            if !seen.insert(id.clone()) {
                return Err(StageConversionError::DuplicateStageId(id));
            }

            let components = record
                .components
                .into_iter()
                .map(|c| self.convert_component(c))
                .collect();

            let connections = record
                .connections
                .unwrap_or_default()
                .into_iter()
                .map(|c| Connection::new(c.source_handle, c.target_stage_id))
                .collect();

            stages.push(Stage {
                id,
                order: record.order.unwrap_or(index as u32),
                name: record.name,
                components,
                position: record.position,
                connections,
            });
        }

        stages.sort_by_key(|s| s.order);
        Ok(stages)
    }

    fn resolve_kind(&self, type_name: &str) -> Option<ComponentKind> {
        self.type_mappings
            .get(type_name)
            .copied()
            .or_else(|| ComponentKind::from_type_name(type_name))
    }

    fn convert_component(&self, raw: UiComponent) -> Component {
        let cfg = &raw.config;
        let config = match self.resolve_kind(&raw.component_type) {
            Some(ComponentKind::Button) => {
                let action = str_field(cfg, &["action", "buttonAction"]).unwrap_or_default();
                ComponentConfig::Button(ButtonConfig {
                    label: str_field(cfg, &["label", "text"]).unwrap_or_default(),
                    action: ButtonAction::from_name(
                        &action,
                        str_field(cfg, &["targetStageId", "target_stage_id", "stageId"]),
                        str_field(cfg, &["url", "customUrl", "custom_url"]),
                    ),
                })
            }
            Some(ComponentKind::Loading) => ComponentConfig::Loading(LoadingConfig {
                duration_ms: cfg
                    .get("durationMs")
                    .or_else(|| cfg.get("duration"))
                    .and_then(Json::as_u64),
            }),
            Some(ComponentKind::SingleChoice) => ComponentConfig::SingleChoice(choice_config(cfg)),
            Some(ComponentKind::MultipleChoice) => {
                ComponentConfig::MultipleChoice(choice_config(cfg))
            }
            Some(ComponentKind::Text) => ComponentConfig::Text(TextConfig {
                placeholder: str_field(cfg, &["placeholder"]),
            }),
            Some(ComponentKind::Other) | None => ComponentConfig::Other {
                type_name: raw.component_type.clone(),
            },
        };

        Component {
            id: raw.id,
            name: raw.name,
            icon: raw.icon,
            config,
        }
    }
}

impl IntoStages for Vec<UiStage> {
    fn into_stages(self) -> Result<Vec<Stage>, StageConversionError> {
        StageLoader::new().convert(self)
    }
}

fn str_field(value: &Json, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Json::as_str))
        .map(str::to_string)
}

fn choice_config(cfg: &Json) -> ChoiceConfig {
    let options = cfg
        .get("options")
        .and_then(Json::as_array)
        .map(|items| items.iter().filter_map(choice_option).collect())
        .unwrap_or_default();

    ChoiceConfig {
        question: str_field(cfg, &["question", "title"]).unwrap_or_default(),
        options,
    }
}

fn choice_option(item: &Json) -> Option<ChoiceOption> {
    let id = match item.get("id")? {
        Json::String(s) => s.clone(),
        Json::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(ChoiceOption {
        id,
        text: str_field(item, &["text", "label"]).unwrap_or_default(),
        target_stage_id: str_field(item, &["targetStageId", "nextStageId", "target_stage_id"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_options_array_degrades_to_zero_options() {
        let json = r#"[{"id":"s1","name":"Q","components":[
            {"id":"c1","type":"single_choice","config":{"question":"Pick"}}
        ]}]"#;
        let stages = StageLoader::new().from_json(json).unwrap();
        match &stages[0].components[0].config {
            ComponentConfig::SingleChoice(cfg) => assert!(cfg.options.is_empty()),
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn custom_type_mapping_is_applied() {
        let json = r#"[{"id":"s1","components":[
            {"id":"c1","type":"cta","config":{"action":"next"}}
        ]}]"#;
        let stages = StageLoader::new()
            .with_type_mapping("cta", ComponentKind::Button)
            .from_json(json)
            .unwrap();
        assert_eq!(stages[0].components[0].kind(), ComponentKind::Button);
    }

    #[test]
    fn duplicate_stage_ids_are_rejected() {
        let json = r#"[{"id":"s1"},{"id":"s1"}]"#;
        let err = StageLoader::new().from_json(json).unwrap_err();
        assert!(matches!(err, StageConversionError::DuplicateStageId(id) if id == "s1"));
    }

    #[test]
    fn stages_are_sorted_by_order() {
        let json = r#"[{"id":"b","order":1},{"id":"a","order":0}]"#;
        let stages = StageLoader::new().from_json(json).unwrap();
        let ids: Vec<_> = stages.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
