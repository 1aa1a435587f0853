//! Story metadata as a story catalog serves it, and the source trait that
//! loads it.

use crate::component::StoryContext;
use crate::render::ComponentRef;
use crate::schema::ArgTypes;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use indexmap::IndexMap;
use std::path::PathBuf;
use thiserror::Error;

pub mod bundle;
pub mod codegen;
pub mod index;
pub mod prepare;

pub use bundle::BundleStorySource;
pub use codegen::{generate_story_code, story_file_name, StoryOptions};
pub use index::{one_story_per_component, story_ids, unique_components};
pub use prepare::{prepare_all, PreparationDiagnostic, PreparationEvent, PreparationReport};

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse story bundle: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("story `{0}` is not in the bundle")]
    UnknownStory(String),
    #[error("story source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    Story,
    Docs,
    Other(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Story => "story",
            Self::Docs => "docs",
            Self::Other(kind) => kind.as_str(),
        }
    }
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "story" => Self::Story,
            "docs" => Self::Docs,
            _ => Self::Other(raw),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryIndexEntry {
    pub id: String,
    /// Title path such as `Components/Button`.
    pub title: String,
    pub name: String,
    #[serde(default)]
    pub import_path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StoryIndexEntry {
    pub fn is_story(&self) -> bool {
        self.kind == EntryKind::Story
    }

    pub fn component_name(&self) -> &str {
        crate::component::extract::component_name_from_title(&self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryIndex {
    #[serde(default)]
    pub v: u32,
    #[serde(default)]
    pub entries: IndexMap<String, StoryIndexEntry>,
}

impl StoryIndex {
    pub fn entries(&self) -> impl Iterator<Item = &StoryIndexEntry> {
        self.entries.values()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryParameters {
    #[serde(default)]
    pub docs: Option<DocsParameters>,
    #[serde(default)]
    pub storyweave: Option<StoryweaveParameters>,
}

impl StoryParameters {
    pub fn auto_extract_disabled(&self) -> bool {
        self.storyweave
            .as_ref()
            .and_then(|params| params.auto_extract)
            == Some(false)
    }

    pub fn component_description(&self) -> Option<&str> {
        self.docs
            .as_ref()?
            .description
            .as_ref()?
            .component
            .as_deref()
            .filter(|description| !description.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsParameters {
    #[serde(default)]
    pub description: Option<DocsDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsDescription {
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryweaveParameters {
    #[serde(default)]
    pub auto_extract: Option<bool>,
}

/// Per-story metadata loaded on demand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the component the story renders; absent for component-less
    /// stories.
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub component_id: Option<String>,
    #[serde(default)]
    pub arg_types: ArgTypes,
    #[serde(default)]
    pub parameters: StoryParameters,
}

/// A loaded story with its component resolved to a renderable handle.
#[derive(Debug, Clone)]
pub struct PreparedStory {
    pub id: String,
    pub metadata: StoryMetadata,
    pub component: Option<ComponentRef>,
}

impl PreparedStory {
    pub fn context(&self) -> StoryContext {
        StoryContext {
            title: self.metadata.title.clone(),
            name: self.metadata.name.clone(),
            component_id: self.metadata.component_id.clone(),
            component: self.component.clone(),
            arg_types: self.metadata.arg_types.clone(),
            parameters: self.metadata.parameters.clone(),
        }
    }
}

#[async_trait]
pub trait StorySource: Send + Sync {
    async fn fetch_index(&self) -> Result<StoryIndex, StoryError>;

    /// Loads one story. `Ok(None)` means the story exists but has nothing to
    /// extract.
    async fn load_story(&self, id: &str) -> Result<Option<PreparedStory>, StoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_entries_parse_kinds() {
        let index: StoryIndex = serde_json::from_value(json!({
            "v": 5,
            "entries": {
                "components-button--primary": {
                    "id": "components-button--primary",
                    "title": "Components/Button",
                    "name": "Primary",
                    "importPath": "./src/Button.stories.tsx",
                    "type": "story",
                    "tags": ["autodocs"]
                },
                "components-button--docs": {
                    "id": "components-button--docs",
                    "title": "Components/Button",
                    "name": "Docs",
                    "importPath": "./src/Button.stories.tsx",
                    "type": "docs"
                },
                "intro--page": {
                    "id": "intro--page",
                    "title": "Intro",
                    "name": "Page",
                    "type": "mdx"
                }
            }
        }))
        .expect("index");

        assert_eq!(index.v, 5);
        let kinds: Vec<&str> = index.entries().map(|entry| entry.kind.as_str()).collect();
        assert_eq!(kinds, vec!["story", "docs", "mdx"]);
        assert_eq!(
            index.entries["components-button--primary"].component_name(),
            "Button"
        );
    }

    #[test]
    fn index_order_decides_the_representative_story() {
        let index: StoryIndex = serde_json::from_value(json!({
            "v": 5,
            "entries": {
                "components-card--with-title": {
                    "id": "components-card--with-title",
                    "title": "Components/Card",
                    "name": "With Title",
                    "type": "story"
                },
                "components-card--basic": {
                    "id": "components-card--basic",
                    "title": "Components/Card",
                    "name": "Basic",
                    "type": "story"
                },
                "components-avatar--default": {
                    "id": "components-avatar--default",
                    "title": "Components/Avatar",
                    "name": "Default",
                    "type": "story"
                }
            }
        }))
        .expect("index");

        assert_eq!(
            crate::story::index::one_story_per_component(index.entries()),
            vec![
                ("Card".to_string(), "components-card--with-title".to_string()),
                ("Avatar".to_string(), "components-avatar--default".to_string()),
            ]
        );
    }

    #[test]
    fn parameters_read_docs_and_opt_out() {
        let parameters: StoryParameters = serde_json::from_value(json!({
            "docs": {"description": {"component": "Primary action", "story": "Blue"}},
            "storyweave": {"autoExtract": false}
        }))
        .expect("parameters");
        assert_eq!(parameters.component_description(), Some("Primary action"));
        assert!(parameters.auto_extract_disabled());

        let empty = StoryParameters::default();
        assert_eq!(empty.component_description(), None);
        assert!(!empty.auto_extract_disabled());
    }
}
