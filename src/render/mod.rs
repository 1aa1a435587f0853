//! Render output model and the component handle stored in the registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod tree;

pub use tree::{GeneratedComponent, TreeRenderer, MAX_RENDER_DEPTH};

pub type Props = BTreeMap<String, PropValue>;

/// A prop handed to a component: either a plain JSON value or an
/// already-rendered node (a resolved nested description).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Node(RenderNode),
    Value(Value),
}

impl PropValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&RenderNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Value(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Element {
        key: String,
        component: String,
        props: Props,
        children: Vec<RenderNode>,
    },
    Text {
        text: String,
    },
    /// Non-text primitive passed where a node was expected.
    Value {
        value: Value,
    },
    /// Placeholder for a component name the registry does not know.
    Missing {
        key: String,
        name: String,
    },
    /// Error boundary output for a component that failed while rendering.
    Fault {
        key: String,
        component: String,
        message: String,
    },
    Empty,
}

impl RenderNode {
    pub fn element(
        key: impl Into<String>,
        component: impl Into<String>,
        props: Props,
        children: Vec<RenderNode>,
    ) -> Self {
        Self::Element {
            key: key.into(),
            component: component.into(),
            props,
            children,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Element { key, .. } | Self::Missing { key, .. } | Self::Fault { key, .. } => {
                Some(key.as_str())
            }
            Self::Text { .. } | Self::Value { .. } | Self::Empty => None,
        }
    }

    pub fn component(&self) -> Option<&str> {
        match self {
            Self::Element { component, .. } | Self::Fault { component, .. } => {
                Some(component.as_str())
            }
            Self::Missing { name, .. } => Some(name.as_str()),
            Self::Text { .. } | Self::Value { .. } | Self::Empty => None,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Element { children, .. } => children.as_slice(),
            _ => &[],
        }
    }

    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        match self {
            Self::Element { props, .. } => props.get(name),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Counts element nodes reachable through children and node-valued props.
    pub fn element_count(&self) -> usize {
        match self {
            Self::Element {
                props, children, ..
            } => {
                1 + children.iter().map(Self::element_count).sum::<usize>()
                    + props
                        .values()
                        .filter_map(PropValue::as_node)
                        .map(Self::element_count)
                        .sum::<usize>()
            }
            _ => 0,
        }
    }

    /// Longest chain of nested elements starting at this node.
    pub fn element_depth(&self) -> usize {
        match self {
            Self::Element {
                props, children, ..
            } => {
                let deepest_child = children
                    .iter()
                    .chain(props.values().filter_map(PropValue::as_node))
                    .map(Self::element_depth)
                    .max()
                    .unwrap_or(0);
                1 + deepest_child
            }
            _ => 0,
        }
    }

    pub fn find(&self, component: &str) -> Option<&RenderNode> {
        if self.component() == Some(component) {
            return Some(self);
        }
        match self {
            Self::Element {
                props, children, ..
            } => children
                .iter()
                .chain(props.values().filter_map(PropValue::as_node))
                .find_map(|child| child.find(component)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("invalid props for {component}: {message}")]
    InvalidProps { component: String, message: String },
    #[error("component panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Failed(String),
}

/// Anything that can turn props and children into a node.
pub trait Renderable: Send + Sync {
    fn render(
        &self,
        key: &str,
        props: Props,
        children: Vec<RenderNode>,
    ) -> Result<RenderNode, RenderError>;
}

impl<F> Renderable for F
where
    F: Fn(&str, Props, Vec<RenderNode>) -> Result<RenderNode, RenderError> + Send + Sync,
{
    fn render(
        &self,
        key: &str,
        props: Props,
        children: Vec<RenderNode>,
    ) -> Result<RenderNode, RenderError> {
        self(key, props, children)
    }
}

/// Renders into a plain element carrying its own name. Stands in for the
/// design-system components a loaded story points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostComponent {
    name: String,
}

impl HostComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Renderable for HostComponent {
    fn render(
        &self,
        key: &str,
        props: Props,
        children: Vec<RenderNode>,
    ) -> Result<RenderNode, RenderError> {
        Ok(RenderNode::element(key, self.name.clone(), props, children))
    }
}

/// Shared, cheaply cloned handle to a renderable component.
#[derive(Clone)]
pub struct ComponentRef {
    inner: Arc<dyn Renderable>,
    label: String,
}

impl ComponentRef {
    pub fn new(label: impl Into<String>, component: impl Renderable + 'static) -> Self {
        Self {
            inner: Arc::new(component),
            label: label.into(),
        }
    }

    pub fn host(name: &str) -> Self {
        Self::new(name, HostComponent::new(name))
    }

    pub fn from_fn<F>(label: impl Into<String>, render: F) -> Self
    where
        F: Fn(&str, Props, Vec<RenderNode>) -> Result<RenderNode, RenderError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(label, render)
    }

    pub fn render(
        &self,
        key: &str,
        props: Props,
        children: Vec<RenderNode>,
    ) -> Result<RenderNode, RenderError> {
        self.inner.render(key, props, children)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
