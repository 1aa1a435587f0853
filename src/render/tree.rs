use crate::component::{ComponentRegistry, CHILDREN_PROP};
use crate::render::{ComponentRef, PropValue, Props, RenderError, RenderNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

pub const MAX_RENDER_DEPTH: usize = 10;

const ROOT_PREFIX: &str = "root";

/// Component description produced by the assistant: a name plus props, where
/// any prop (and `children`) may hold further descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedComponent {
    pub component_name: String,
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl GeneratedComponent {
    pub fn new(component_name: impl Into<String>, props: Map<String, Value>) -> Self {
        Self {
            component_name: component_name.into(),
            props,
        }
    }

    /// Duck-typed read of an untrusted value: any object with a string
    /// `componentName` counts, a missing or non-object `props` reads as empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let component_name = object.get("componentName")?.as_str()?;
        let props = object
            .get("props")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Some(Self::new(component_name, props))
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("componentName".into(), self.component_name.clone().into());
        object.insert("props".into(), Value::Object(self.props.clone()));
        Value::Object(object)
    }
}

pub fn is_component_description(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|object| object.get("componentName"))
        .is_some_and(Value::is_string)
}

/// Resolves assistant descriptions against the registry into render trees.
pub struct TreeRenderer<'a> {
    registry: &'a ComponentRegistry,
    max_depth: usize,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            max_depth: MAX_RENDER_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn render(&self, description: &GeneratedComponent) -> RenderNode {
        self.render_value(&description.to_value())
    }

    pub fn render_value(&self, description: &Value) -> RenderNode {
        self.render_at(description, 0, ROOT_PREFIX)
    }

    fn render_at(&self, value: &Value, depth: usize, key_prefix: &str) -> RenderNode {
        if depth > self.max_depth {
            warn!(depth, max_depth = self.max_depth, "render depth limit reached");
            return RenderNode::Empty;
        }

        let Some(description) = GeneratedComponent::from_value(value) else {
            return RenderNode::Value {
                value: value.clone(),
            };
        };

        let key = format!("{key_prefix}-{}-{depth}", description.component_name);
        let Some(record) = self.registry.get(&description.component_name) else {
            debug!(component = %description.component_name, "unknown component in description");
            return RenderNode::Missing {
                key,
                name: description.component_name,
            };
        };

        let mut props = Props::new();
        for (name, value) in &description.props {
            if name == CHILDREN_PROP {
                continue;
            }
            let prop = if is_component_description(value) {
                PropValue::Node(self.render_at(value, depth + 1, &format!("{key}.{name}")))
            } else {
                PropValue::Value(value.clone())
            };
            props.insert(name.clone(), prop);
        }

        let children = description
            .props
            .get(CHILDREN_PROP)
            .map(|children| self.render_children(children, depth, &key))
            .unwrap_or_default();

        contain(&record.component, &key, &description.component_name, props, children)
    }

    fn render_children(&self, children: &Value, depth: usize, key: &str) -> Vec<RenderNode> {
        match children {
            Value::Null => Vec::new(),
            Value::String(text) => vec![RenderNode::Text { text: text.clone() }],
            Value::Number(number) => vec![RenderNode::Text {
                text: number.to_string(),
            }],
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Value::String(text) => Some(RenderNode::Text { text: text.clone() }),
                    Value::Number(number) => Some(RenderNode::Text {
                        text: number.to_string(),
                    }),
                    item if is_component_description(item) => {
                        Some(self.render_at(item, depth + 1, &format!("{key}.{index}")))
                    }
                    _ => None,
                })
                .collect(),
            value if is_component_description(value) => {
                vec![self.render_at(value, depth + 1, &format!("{key}.0"))]
            }
            other => vec![RenderNode::Value {
                value: other.clone(),
            }],
        }
    }
}

/// Error boundary around one component: failures turn into a `Fault` node
/// for that subtree only.
fn contain(
    component: &ComponentRef,
    key: &str,
    name: &str,
    props: Props,
    children: Vec<RenderNode>,
) -> RenderNode {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| component.render(key, props, children)));
    let error = match outcome {
        Ok(Ok(node)) => return node,
        Ok(Err(error)) => error,
        Err(payload) => RenderError::Panicked(panic_message(payload.as_ref())),
    };

    warn!(component = %name, key = %key, error = %error, "component render failed");
    RenderNode::Fault {
        key: key.to_string(),
        component: name.to_string(),
        message: error.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentRecord;
    use crate::schema::PropsSchema;
    use serde_json::json;

    fn registry_with(names: &[&str]) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for name in names {
            registry.register(ComponentRecord::new(
                *name,
                format!("A {name} component"),
                PropsSchema::default(),
                ComponentRef::host(name),
            ));
        }
        registry
    }

    #[test]
    fn card_with_button_child() {
        let registry = registry_with(&["Card", "Button"]);
        let node = TreeRenderer::new(&registry).render_value(&json!({
            "componentName": "Card",
            "props": {
                "title": "Welcome",
                "children": [{"componentName": "Button", "props": {"label": "Go"}}]
            }
        }));

        assert_eq!(node.component(), Some("Card"));
        assert_eq!(node.key(), Some("root-Card-0"));
        assert_eq!(node.prop("title").and_then(PropValue::as_str), Some("Welcome"));
        assert!(node.prop("children").is_none());

        let [button] = node.children() else {
            panic!("card should have exactly one child");
        };
        assert_eq!(button.component(), Some("Button"));
        assert_eq!(button.key(), Some("root-Card-0.0-Button-1"));
        assert_eq!(button.prop("label").and_then(PropValue::as_str), Some("Go"));
    }

    #[test]
    fn deep_descriptions_are_cut_at_max_depth() {
        let mut description = json!({"componentName": "Box", "props": {}});
        for _ in 0..19 {
            description = json!({"componentName": "Box", "props": {"children": description}});
        }

        let registry = registry_with(&["Box"]);
        let node = TreeRenderer::new(&registry).render_value(&description);

        assert_eq!(node.element_depth(), MAX_RENDER_DEPTH + 1);
        assert!(node.element_count() <= MAX_RENDER_DEPTH + 1);
    }

    #[test]
    fn custom_depth_limit() {
        let description = json!({
            "componentName": "Box",
            "props": {"children": {"componentName": "Box", "props": {
                "children": {"componentName": "Box"}
            }}}
        });
        let registry = registry_with(&["Box"]);
        let node = TreeRenderer::new(&registry)
            .with_max_depth(1)
            .render_value(&description);

        assert_eq!(node.element_depth(), 2);
        assert_eq!(node.children()[0].children(), &[RenderNode::Empty]);
    }

    #[test]
    fn unknown_component_renders_placeholder() {
        let registry = registry_with(&["Card"]);
        let node = TreeRenderer::new(&registry).render_value(&json!({
            "componentName": "Card",
            "props": {"children": {"componentName": "Carousel", "props": {}}}
        }));

        assert_eq!(
            node.children(),
            &[RenderNode::Missing {
                key: "root-Card-0.0-Carousel-1".into(),
                name: "Carousel".into(),
            }]
        );
    }

    #[test]
    fn non_descriptions_pass_through() {
        let registry = registry_with(&[]);
        let renderer = TreeRenderer::new(&registry);
        assert_eq!(
            renderer.render_value(&json!({"name": "Card"})),
            RenderNode::Value {
                value: json!({"name": "Card"})
            }
        );
        assert_eq!(
            renderer.render_value(&json!({"componentName": 3})),
            RenderNode::Value {
                value: json!({"componentName": 3})
            }
        );
    }

    #[test]
    fn children_shapes() {
        let registry = registry_with(&["Stack", "Text"]);
        let renderer = TreeRenderer::new(&registry);

        let node = renderer.render_value(&json!({
            "componentName": "Stack",
            "props": {"children": ["hello", 42, null, true, {"componentName": "Text"}]}
        }));
        let children = node.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], RenderNode::Text { text: "hello".into() });
        assert_eq!(children[1], RenderNode::Text { text: "42".into() });
        assert_eq!(children[2].key(), Some("root-Stack-0.4-Text-1"));

        let node = renderer.render_value(&json!({
            "componentName": "Stack",
            "props": {"children": null}
        }));
        assert!(node.children().is_empty());

        let node = renderer.render_value(&json!({
            "componentName": "Stack",
            "props": {"children": true}
        }));
        assert_eq!(node.children(), &[RenderNode::Value { value: json!(true) }]);
    }

    #[test]
    fn nested_description_props_become_nodes() {
        let registry = registry_with(&["Alert", "Avatar"]);
        let node = TreeRenderer::new(&registry).render_value(&json!({
            "componentName": "Alert",
            "props": {
                "icon": {"componentName": "Avatar", "props": {"name": "Ada"}},
                "variant": "info"
            }
        }));

        let icon = node
            .prop("icon")
            .and_then(PropValue::as_node)
            .expect("icon rendered as node");
        assert_eq!(icon.key(), Some("root-Alert-0.icon-Avatar-1"));
        assert_eq!(node.prop("variant").and_then(PropValue::as_str), Some("info"));
    }

    #[test]
    fn failing_components_are_isolated() {
        let mut registry = registry_with(&["Stack", "Button"]);
        registry.register(ComponentRecord::new(
            "Broken",
            "Always fails",
            PropsSchema::default(),
            ComponentRef::from_fn("Broken", |_key, _props, _children| {
                Err(RenderError::Failed("no theme provider".into()))
            }),
        ));
        registry.register(ComponentRecord::new(
            "Explosive",
            "Always panics",
            PropsSchema::default(),
            ComponentRef::from_fn("Explosive", |_key, _props, _children| {
                panic!("boom");
            }),
        ));

        let node = TreeRenderer::new(&registry).render_value(&json!({
            "componentName": "Stack",
            "props": {"children": [
                {"componentName": "Broken"},
                {"componentName": "Explosive"},
                {"componentName": "Button", "props": {"label": "Still here"}}
            ]}
        }));

        let children = node.children();
        assert_eq!(node.component(), Some("Stack"));
        assert_eq!(
            children[0],
            RenderNode::Fault {
                key: "root-Stack-0.0-Broken-1".into(),
                component: "Broken".into(),
                message: "no theme provider".into(),
            }
        );
        assert!(matches!(
            &children[1],
            RenderNode::Fault { message, .. } if message.contains("boom")
        ));
        assert_eq!(
            children[2].prop("label").and_then(PropValue::as_str),
            Some("Still here")
        );
    }

    #[test]
    fn generated_component_reads_camel_case() {
        let parsed: GeneratedComponent =
            serde_json::from_value(json!({"componentName": "Badge", "props": {"label": "New"}}))
                .expect("description");
        assert_eq!(parsed.component_name, "Badge");
        assert_eq!(GeneratedComponent::from_value(&parsed.to_value()), Some(parsed));
    }
}
