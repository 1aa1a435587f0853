use crate::render::ComponentRef;
use crate::story::{PreparedStory, StoryError, StoryIndex, StoryMetadata, StorySource};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const DEMO_BUNDLE: &str = include_str!("demo_bundle.json");

/// Story catalog held in one JSON document: the index plus the metadata of
/// every story it lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleStorySource {
    index: StoryIndex,
    #[serde(default)]
    stories: BTreeMap<String, StoryMetadata>,
}

impl BundleStorySource {
    pub fn from_json(raw: &str) -> Result<Self, StoryError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, StoryError> {
        let raw = fs::read_to_string(path).map_err(|source| StoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The bundled design system: thirteen components across layout,
    /// feedback, forms and typography.
    pub fn demo() -> Result<Self, StoryError> {
        Self::from_json(DEMO_BUNDLE)
    }

    pub fn index(&self) -> &StoryIndex {
        &self.index
    }

    pub fn story_count(&self) -> usize {
        self.stories.len()
    }
}

#[async_trait]
impl StorySource for BundleStorySource {
    async fn fetch_index(&self) -> Result<StoryIndex, StoryError> {
        Ok(self.index.clone())
    }

    async fn load_story(&self, id: &str) -> Result<Option<PreparedStory>, StoryError> {
        let metadata = self
            .stories
            .get(id)
            .cloned()
            .ok_or_else(|| StoryError::UnknownStory(id.to_string()))?;
        debug!(story = id, component = ?metadata.component, "story loaded");

        let component = metadata.component.as_deref().map(ComponentRef::host);
        Ok(Some(PreparedStory {
            id: id.to_string(),
            metadata,
            component,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::extract;
    use crate::story::one_story_per_component;

    #[test]
    fn demo_bundle_lists_thirteen_components() {
        let bundle = BundleStorySource::demo().expect("demo bundle");
        let components = one_story_per_component(bundle.index().entries());
        assert_eq!(components.len(), 13);
        assert_eq!(bundle.story_count(), 13);
        assert!(components.iter().any(|(name, _)| name == "FormField"));
    }

    #[tokio::test]
    async fn demo_stories_extract_with_containers_marked() {
        let bundle = BundleStorySource::demo().expect("demo bundle");
        let story = bundle
            .load_story("layout-stack--default")
            .await
            .expect("load")
            .expect("story");
        let record = extract(&story.context()).expect("record");

        assert_eq!(record.name, "Stack");
        assert!(record.is_container);
        assert!(record.props_schema.has("direction"));
        assert!(!record.props_schema.has("children"));

        let button = bundle
            .load_story("components-button--default")
            .await
            .expect("load")
            .expect("story");
        let record = extract(&button.context()).expect("record");
        assert!(!record.is_container);
        assert!(!record.props_schema.has("onClick"));
        assert_eq!(
            record.description,
            "A versatile button component with multiple style variants and sizes."
        );
    }

    #[tokio::test]
    async fn unknown_story_is_an_error() {
        let bundle = BundleStorySource::demo().expect("demo bundle");
        let error = bundle.load_story("missing--story").await.expect_err("unknown");
        assert!(matches!(error, StoryError::UnknownStory(id) if id == "missing--story"));
    }

    #[test]
    fn malformed_bundle_is_a_parse_error() {
        assert!(matches!(
            BundleStorySource::from_json("{\"index\": 3}"),
            Err(StoryError::Parse(_))
        ));
    }
}
