//! Normalized component records and the stores built from them.

use crate::render::ComponentRef;
use crate::schema::PropsSchema;

pub mod combination;
pub mod extract;
pub mod registry;

pub use combination::{generate, register_combinations, CombinationError, ComponentNode};
pub use extract::{extract, StoryContext};
pub use registry::{ComponentRegistry, ListenerId, Progress};

/// Prop slot that marks a component as a container.
pub const CHILDREN_PROP: &str = "children";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    Extracted,
    /// Pre-built nesting. `structure` is the ASCII diagram of the tree.
    Combination { depth: usize, structure: String },
}

#[derive(Debug, Clone)]
pub struct ComponentRecord {
    pub name: String,
    pub description: String,
    pub props_schema: PropsSchema,
    pub component: ComponentRef,
    pub is_container: bool,
    pub origin: RecordOrigin,
}

impl ComponentRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        props_schema: PropsSchema,
        component: ComponentRef,
    ) -> Self {
        let is_container = props_schema.has(CHILDREN_PROP);
        Self {
            name: name.into(),
            description: description.into(),
            props_schema,
            component,
            is_container,
            origin: RecordOrigin::Extracted,
        }
    }

    pub fn with_container(mut self, is_container: bool) -> Self {
        self.is_container = is_container;
        self
    }

    pub fn with_origin(mut self, origin: RecordOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, RecordOrigin::Combination { .. })
    }

    pub fn nesting_depth(&self) -> usize {
        match &self.origin {
            RecordOrigin::Extracted => 1,
            RecordOrigin::Combination { depth, .. } => *depth,
        }
    }
}
