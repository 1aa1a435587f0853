//! The seam to the language-model side: the catalog it chooses from, the
//! request it receives and the reply it returns.

use crate::component::ComponentRegistry;
use crate::render::GeneratedComponent;
use crate::schema::PropsSchema;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub mod local;
pub mod thread;

pub use local::LocalBackend;
pub use thread::{ChatMessage, ChatThread, Role, ThreadError, ThreadState};

pub const RENDER_TOOL_NAME: &str = "render_component";

/// One selectable component as the backend sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub props_schema: PropsSchema,
}

pub fn catalog(registry: &ComponentRegistry) -> Vec<CatalogEntry> {
    registry
        .all()
        .iter()
        .map(|record| CatalogEntry {
            name: record.name.clone(),
            description: record.description.clone(),
            props_schema: record.props_schema.clone(),
        })
        .collect()
}

pub fn system_context(registry: &ComponentRegistry) -> String {
    let extracted: Vec<&str> = registry
        .all()
        .iter()
        .filter(|record| !record.is_synthetic())
        .map(|record| record.name.as_str())
        .collect();
    let containers: Vec<&str> = registry
        .all()
        .iter()
        .filter(|record| !record.is_synthetic() && record.is_container)
        .map(|record| record.name.as_str())
        .collect();
    let combinations = registry.len() - extracted.len();

    let mut context = String::from(
        "You build user interfaces from a fixed design system. Answer every UI request by \
         calling the render_component tool with one registered component name and its props.\n",
    );
    context.push_str(&format!("Registered components: {}.\n", extracted.join(", ")));
    if !containers.is_empty() {
        context.push_str(&format!(
            "Containers accept nested components under `children`: {}.\n",
            containers.join(", ")
        ));
    }
    context.push_str(
        "A `children` value may be text, a nested {componentName, props} description, or an \
         array mixing both. Any other prop may also hold a nested description.\n",
    );
    if combinations > 0 {
        context.push_str(&format!(
            "{combinations} pre-composed components named `Outer_containing_Inner` take flattened \
             props: the outer component's props keep their names and nested props are prefixed \
             with the lower-cased component name (for example `button_label`).\n",
        ));
    }
    context.push_str("Only use prop names and values allowed by each component's schema.");
    context
}

/// Tool definition handed to the backend alongside the catalog.
pub fn render_component_tool(registry: &ComponentRegistry) -> Value {
    json!({
        "name": RENDER_TOOL_NAME,
        "description": "Render one registered component, optionally with nested components.",
        "parameters": {
            "type": "object",
            "properties": {
                "componentName": {"type": "string", "enum": registry.names()},
                "props": {"type": "object", "additionalProperties": true}
            },
            "required": ["componentName", "props"]
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub system_context: String,
    pub messages: Vec<ChatMessage>,
    pub catalog: Vec<CatalogEntry>,
}

impl AssistantRequest {
    pub fn new(registry: &ComponentRegistry, messages: Vec<ChatMessage>) -> Self {
        Self {
            system_context: system_context(registry),
            messages,
            catalog: catalog(registry),
        }
    }

    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub component: Option<GeneratedComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("assistant backend unavailable: {0}")]
    Unavailable(String),
    #[error("invalid component description: {0}")]
    InvalidDescription(String),
    #[error("request has no user message")]
    NoPrompt,
}

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn respond(&self, request: AssistantRequest) -> Result<AssistantReply, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentRecord;
    use crate::render::ComponentRef;
    use crate::schema::{PropShape, SchemaProperty};

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        let mut schema = PropsSchema::default();
        schema
            .properties
            .insert("label".into(), SchemaProperty::new(PropShape::String));
        registry.register(ComponentRecord::new(
            "Button",
            "A button",
            schema,
            ComponentRef::host("Button"),
        ));
        registry.register(
            ComponentRecord::new(
                "Stack",
                "A stack",
                PropsSchema::default(),
                ComponentRef::host("Stack"),
            )
            .with_container(true),
        );
        registry
    }

    #[test]
    fn catalog_serializes_camel_case() {
        let entries = catalog(&registry());
        assert_eq!(entries.len(), 2);
        let value = serde_json::to_value(&entries[0]).expect("serialize");
        assert_eq!(value["name"], "Button");
        assert_eq!(value["propsSchema"]["properties"]["label"]["type"], "string");
    }

    #[test]
    fn system_context_names_components_and_containers() {
        let context = system_context(&registry());
        assert!(context.contains("Registered components: Button, Stack."));
        assert!(context.contains("under `children`: Stack."));
        assert!(!context.contains("pre-composed"));
    }

    #[test]
    fn tool_lists_registered_names() {
        let tool = render_component_tool(&registry());
        assert_eq!(tool["name"], RENDER_TOOL_NAME);
        assert_eq!(
            tool["parameters"]["properties"]["componentName"]["enum"],
            json!(["Button", "Stack"])
        );
    }
}
