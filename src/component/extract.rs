use crate::component::{ComponentRecord, CHILDREN_PROP};
use crate::render::ComponentRef;
use crate::schema::{props_schema, ArgTypes};
use crate::story::StoryParameters;
use tracing::debug;

const UNKNOWN_COMPONENT: &str = "UnknownComponent";

/// What a loaded story knows about the component it renders.
#[derive(Debug, Clone, Default)]
pub struct StoryContext {
    /// Title path such as `Components/Button`.
    pub title: Option<String>,
    pub name: Option<String>,
    pub component_id: Option<String>,
    pub component: Option<ComponentRef>,
    pub arg_types: ArgTypes,
    pub parameters: StoryParameters,
}

pub fn extract(context: &StoryContext) -> Option<ComponentRecord> {
    if context.parameters.auto_extract_disabled() {
        debug!(title = ?context.title, "auto extraction disabled for story");
        return None;
    }
    let component = context.component.clone()?;

    let name = component_name(context);
    let description = context
        .parameters
        .component_description()
        .map(str::to_string)
        .unwrap_or_else(|| format!("A {name} component"));
    let schema = props_schema(&context.arg_types);
    let is_container =
        context.arg_types.contains_key(CHILDREN_PROP) || schema.has(CHILDREN_PROP);

    debug!(
        component = %name,
        props = schema.len(),
        is_container,
        "component extracted"
    );
    Some(ComponentRecord::new(name, description, schema, component).with_container(is_container))
}

pub fn component_name(context: &StoryContext) -> String {
    if let Some(title) = context.title.as_deref() {
        return component_name_from_title(title).to_string();
    }
    if let Some(component_id) = context.component_id.as_deref() {
        let last = component_id.rsplit('-').next().unwrap_or(component_id);
        return capitalize(last);
    }
    UNKNOWN_COMPONENT.to_string()
}

/// `Design System/Forms/Input` names the `Input` component.
pub fn component_name_from_title(title: &str) -> &str {
    title.rsplit('/').next().unwrap_or(title)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
