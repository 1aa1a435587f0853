//! Offline backend: accepts a component description typed straight into the
//! chat, or picks the registered component a prompt names.

use crate::assistant::{
    AssistantBackend, AssistantReply, AssistantRequest, BackendError, CatalogEntry,
};
use crate::render::GeneratedComponent;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

const TEXT_PROPS: [&str; 5] = ["label", "title", "text", "content", "placeholder"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssistantBackend for LocalBackend {
    async fn respond(&self, request: AssistantRequest) -> Result<AssistantReply, BackendError> {
        let prompt = request
            .last_user_message()
            .map(|message| message.content.trim().to_string())
            .ok_or(BackendError::NoPrompt)?;

        if prompt.starts_with('{') {
            return description_reply(&prompt);
        }

        match best_match(&prompt, &request.catalog) {
            Some(entry) => {
                debug!(component = %entry.name, "prompt matched component");
                let props = seed_props(entry, &prompt);
                Ok(AssistantReply {
                    content: format!("Here is a {}.", entry.name.replace('_', " ")),
                    component: Some(GeneratedComponent::new(entry.name.clone(), props)),
                })
            }
            None => {
                let available: Vec<&str> = request
                    .catalog
                    .iter()
                    .map(|entry| entry.name.as_str())
                    .filter(|name| !name.contains("_containing_"))
                    .collect();
                Ok(AssistantReply {
                    content: format!(
                        "No registered component matches that request. Try one of: {}.",
                        available.join(", ")
                    ),
                    component: None,
                })
            }
        }
    }
}

fn description_reply(prompt: &str) -> Result<AssistantReply, BackendError> {
    let value: Value = serde_json::from_str(prompt)
        .map_err(|err| BackendError::InvalidDescription(err.to_string()))?;
    let component = GeneratedComponent::from_value(&value).ok_or_else(|| {
        BackendError::InvalidDescription("expected an object with a string componentName".into())
    })?;
    Ok(AssistantReply {
        content: format!("Rendering {}.", component.component_name),
        component: Some(component),
    })
}

/// Picks the entry whose name parts are all mentioned, preferring the one
/// with the most parts. Ties keep catalog order.
fn best_match<'a>(prompt: &str, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    let lowered = prompt.to_ascii_lowercase();
    let tokens = token_set(&lowered);
    let compact: String = lowered.chars().filter(char::is_ascii_alphanumeric).collect();

    let mut best: Option<(&CatalogEntry, usize)> = None;
    for entry in catalog {
        let parts = name_parts(&entry.name);
        let all_mentioned = parts
            .iter()
            .all(|part| mentions(part, &tokens, &compact));
        if !all_mentioned {
            continue;
        }
        match best {
            Some((_, count)) if count >= parts.len() => {}
            _ => best = Some((entry, parts.len())),
        }
    }
    best.map(|(entry, _)| entry)
}

fn name_parts(name: &str) -> Vec<String> {
    name.split("_containing_")
        .flat_map(|segment| segment.split("_and_"))
        .map(str::to_ascii_lowercase)
        .collect()
}

fn mentions(part: &str, tokens: &BTreeSet<&str>, compact: &str) -> bool {
    tokens.contains(part)
        || tokens.contains(format!("{part}s").as_str())
        || (part.len() > 6 && compact.contains(part))
}

fn token_set(text: &str) -> BTreeSet<&str> {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Puts quoted prompt text into the first text-like prop the schema offers.
fn seed_props(entry: &CatalogEntry, prompt: &str) -> Map<String, Value> {
    let mut props = Map::new();
    let Some(text) = quoted_text(prompt) else {
        return props;
    };
    let target = TEXT_PROPS
        .into_iter()
        .find(|name| entry.props_schema.has(name))
        .map(str::to_string)
        .or_else(|| {
            entry
                .props_schema
                .properties
                .keys()
                .find(|key| TEXT_PROPS.iter().any(|name| key.ends_with(&format!("_{name}"))))
                .cloned()
        });
    if let Some(target) = target {
        props.insert(target, Value::String(text.to_string()));
    }
    props
}

fn quoted_text(prompt: &str) -> Option<&str> {
    let start = prompt.find('"')? + 1;
    let end = prompt[start..].find('"')? + start;
    Some(&prompt[start..end]).filter(|text| !text.is_empty())
}
