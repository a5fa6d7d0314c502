use serde::{Deserialize, Serialize};

/// A 2D canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One step/screen of a quiz and a node in the navigation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    /// Ordinal position in the authored sequence.
    pub order: u32,
    pub name: String,
    pub components: Vec<Component>,
    /// Explicit canvas position. `None` means "place on the default grid".
    pub position: Option<Position>,
    pub connections: Vec<Connection>,
}

impl Stage {
    pub fn new(id: impl Into<String>, order: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order,
            name: name.into(),
            components: Vec::new(),
            position: None,
            connections: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// A directed edge from a stage (optionally scoped to a component or option handle)
/// to a target stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// `None` is the stage's default, unscoped outgoing edge.
    pub source_handle: Option<String>,
    pub target_stage_id: String,
}

impl Connection {
    pub fn new(source_handle: Option<String>, target_stage_id: impl Into<String>) -> Self {
        Self {
            source_handle,
            target_stage_id: target_stage_id.into(),
        }
    }

    /// An unscoped connection to `target_stage_id`.
    pub fn to(target_stage_id: impl Into<String>) -> Self {
        Self::new(None, target_stage_id)
    }
}

/// A configurable UI element placed within a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub config: ComponentConfig,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: ComponentConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            config,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.config.kind()
    }
}

/// The closed set of component kinds the flow model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Button,
    Loading,
    SingleChoice,
    MultipleChoice,
    Text,
    Other,
}

impl ComponentKind {
    /// Resolves one of the built-in component type names.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "button" => Some(Self::Button),
            "loading" | "loader" | "transition" => Some(Self::Loading),
            "single_choice" | "single-choice" | "radio" => Some(Self::SingleChoice),
            "multiple_choice" | "multiple-choice" | "checkbox" => Some(Self::MultipleChoice),
            "text" | "text_input" | "input" | "textarea" => Some(Self::Text),
            _ => None,
        }
    }
}

/// What a button does when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Next,
    Submit,
    SpecificStage { target_stage_id: Option<String> },
    CustomUrl { url: Option<String> },
    /// Any action name the flow model does not know about.
    Unknown(String),
}

impl ButtonAction {
    pub fn from_name(name: &str, target_stage_id: Option<String>, url: Option<String>) -> Self {
        match name {
            "next" | "next_stage" => Self::Next,
            "submit" | "submit_form" => Self::Submit,
            "specific_stage" | "go_to_stage" | "jump" => Self::SpecificStage { target_stage_id },
            "custom_url" | "url" | "redirect" => Self::CustomUrl { url },
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingConfig {
    /// Auto-advance delay in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A selectable option of a choice component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    /// Explicit destination stage configured on the option.
    pub target_stage_id: Option<String>,
}

impl ChoiceOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            target_stage_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceConfig {
    pub question: String,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub placeholder: Option<String>,
}

/// Type-specific configuration, one variant per component kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentConfig {
    Button(ButtonConfig),
    Loading(LoadingConfig),
    SingleChoice(ChoiceConfig),
    MultipleChoice(ChoiceConfig),
    Text(TextConfig),
    /// Components the flow model treats as inert (images, headings, ...).
    Other { type_name: String },
}

impl ComponentConfig {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentConfig::Button(_) => ComponentKind::Button,
            ComponentConfig::Loading(_) => ComponentKind::Loading,
            ComponentConfig::SingleChoice(_) => ComponentKind::SingleChoice,
            ComponentConfig::MultipleChoice(_) => ComponentKind::MultipleChoice,
            ComponentConfig::Text(_) => ComponentKind::Text,
            ComponentConfig::Other { .. } => ComponentKind::Other,
        }
    }

    pub fn button(label: impl Into<String>, action: ButtonAction) -> Self {
        ComponentConfig::Button(ButtonConfig {
            label: label.into(),
            action,
        })
    }

    pub fn single_choice(question: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        ComponentConfig::SingleChoice(ChoiceConfig {
            question: question.into(),
            options,
        })
    }

    pub fn multiple_choice(question: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        ComponentConfig::MultipleChoice(ChoiceConfig {
            question: question.into(),
            options,
        })
    }
}
