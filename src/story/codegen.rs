//! Story file source for an assistant-generated component.

use crate::render::GeneratedComponent;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_STORY_NAME: &str = "Generated";
const ARGS_INDENT: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryOptions {
    pub story_name: Option<String>,
    /// Defaults to `@/components/<Name>`.
    pub component_import_path: Option<String>,
}

pub fn generate_story_code(component: &GeneratedComponent, options: &StoryOptions) -> String {
    let name = &component.component_name;
    let story_name = options.story_name.as_deref().unwrap_or(DEFAULT_STORY_NAME);
    let import_path = options
        .component_import_path
        .clone()
        .unwrap_or_else(|| format!("@/components/{name}"));
    let args = format_props(&component.props, ARGS_INDENT);

    format!(
        "import type {{ Meta, StoryObj }} from '@storybook/react';
import {{ {name} }} from '{import_path}';

const meta = {{
  title: 'Generated/{name}',
  component: {name},
  parameters: {{
    layout: 'centered',
  }},
  tags: ['autodocs'],
}} satisfies Meta<typeof {name}>;

export default meta;
type Story = StoryObj<typeof meta>;

export const {story_name}: Story = {{
  args: {args},
}};
"
    )
}

pub fn story_file_name(component: &GeneratedComponent) -> String {
    format!("{}.stories.tsx", component.component_name)
}

/// Writes the story into `dir` and returns its path.
pub fn write_story_file(
    component: &GeneratedComponent,
    options: &StoryOptions,
    dir: &Path,
) -> io::Result<PathBuf> {
    let path = dir.join(story_file_name(component));
    fs::write(&path, generate_story_code(component, options))?;
    Ok(path)
}

fn format_props(props: &Map<String, Value>, indent: usize) -> String {
    if props.is_empty() {
        return "{}".to_string();
    }

    let spaces = " ".repeat(indent);
    let lines: Vec<String> = props
        .iter()
        .map(|(key, value)| format!("{spaces}{key}: {},", format_value(value, indent + 2)))
        .collect();
    format!(
        "{{\n{}\n{}}}",
        lines.join("\n"),
        " ".repeat(indent.saturating_sub(2))
    )
}

fn format_value(value: &Value, indent: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => format!("'{}'", text.replace('\'', "\\'")),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| format_value(item, indent + 2))
                .collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(object) => format_props(object, indent + 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn component(name: &str, props: Value) -> GeneratedComponent {
        GeneratedComponent::from_value(&json!({"componentName": name, "props": props}))
            .expect("description")
    }

    #[test]
    fn default_options_produce_full_story() {
        let code = generate_story_code(
            &component("Button", json!({"label": "Click me", "disabled": false})),
            &StoryOptions::default(),
        );

        assert_eq!(
            code,
            "import type { Meta, StoryObj } from '@storybook/react';
import { Button } from '@/components/Button';

const meta = {
  title: 'Generated/Button',
  component: Button,
  parameters: {
    layout: 'centered',
  },
  tags: ['autodocs'],
} satisfies Meta<typeof Button>;

export default meta;
type Story = StoryObj<typeof meta>;

export const Generated: Story = {
  args: {
    disabled: false,
    label: 'Click me',
  },
};
"
        );
    }

    #[test]
    fn custom_story_name_and_import_path() {
        let code = generate_story_code(
            &component("Button", json!({})),
            &StoryOptions {
                story_name: Some("Primary".into()),
                component_import_path: Some("../components/Button".into()),
            },
        );
        assert!(code.contains("export const Primary: Story"));
        assert!(code.contains("import { Button } from '../components/Button'"));
        assert!(code.contains("args: {},"));
    }

    #[test]
    fn nested_values_are_formatted() {
        let code = generate_story_code(
            &component(
                "Complex",
                json!({
                    "items": ["one", "two", "three"],
                    "style": {"color": "red", "fontSize": 14},
                    "empty": [],
                    "text": "It's a test"
                }),
            ),
            &StoryOptions::default(),
        );
        assert!(code.contains("items: ['one', 'two', 'three'],"));
        assert!(code.contains("    style: {\n        color: 'red',\n        fontSize: 14,\n      },"));
        assert!(code.contains("empty: [],"));
        assert!(code.contains("text: 'It\\'s a test',"));
    }

    #[test]
    fn file_name_follows_component() {
        assert_eq!(
            story_file_name(&component("Alert", json!({}))),
            "Alert.stories.tsx"
        );
    }
}
