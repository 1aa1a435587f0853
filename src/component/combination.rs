//! Pre-built nestings of containers and leaves, each exposed as one synthetic
//! component whose props are the flattened, prefix-namespaced union of its
//! members' props.

use crate::component::{ComponentRecord, ComponentRegistry, RecordOrigin, CHILDREN_PROP};
use crate::config::ComposerSettings;
use crate::render::{ComponentRef, Props, RenderError, RenderNode};
use crate::schema::PropsSchema;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{info, warn};

const EXAMPLE_KEY_LIMIT: usize = 4;
const STEP_LEAF_LIMIT: usize = 3;
const STEP_CONTAINER_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinationError {
    #[error("prefix `{prefix}` appears twice in {tree}")]
    PrefixCollision { tree: String, prefix: String },
    #[error("flattened prop `{key}` appears twice in {tree}")]
    KeyCollision { tree: String, key: String },
}

/// One member of a nesting. The root has an empty prefix and keeps its prop
/// names as they are.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub component: ComponentRecord,
    pub children: Vec<ComponentNode>,
    pub prefix: String,
}

impl ComponentNode {
    pub fn root(component: &ComponentRecord, children: Vec<ComponentNode>) -> Self {
        Self {
            component: component.clone(),
            children,
            prefix: String::new(),
        }
    }

    pub fn nested(component: &ComponentRecord, children: Vec<ComponentNode>) -> Self {
        Self {
            component: component.clone(),
            children,
            prefix: component.name.to_lowercase(),
        }
    }

    /// Third-level container, namespaced apart from a same-named leaf.
    pub fn inner(component: &ComponentRecord, children: Vec<ComponentNode>) -> Self {
        Self {
            component: component.clone(),
            children,
            prefix: format!("inner{}", component.name.to_lowercase()),
        }
    }

    pub fn leaf(component: &ComponentRecord) -> Self {
        Self::nested(component, Vec::new())
    }

    fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn combined_name(&self) -> String {
        if self.children.is_empty() {
            return self.component.name.clone();
        }
        let children = self
            .children
            .iter()
            .map(Self::combined_name)
            .collect::<Vec<_>>()
            .join("_and_");
        format!("{}_containing_{children}", self.component.name)
    }

    /// Number of nesting levels below this node.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    fn flat_key(&self, prop: &str) -> String {
        if self.is_root() {
            prop.to_string()
        } else {
            format!("{}_{prop}", self.prefix)
        }
    }

    fn own_props(&self) -> impl Iterator<Item = &str> {
        self.component
            .props_schema
            .properties
            .keys()
            .map(String::as_str)
            .filter(|prop| *prop != CHILDREN_PROP)
    }

    fn descendants(&self) -> Vec<&ComponentNode> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }

    fn diagram(&self) -> String {
        let mut lines = vec![self.component.name.clone()];
        self.diagram_children("", &mut lines);
        lines.join("\n")
    }

    fn diagram_children(&self, indent: &str, lines: &mut Vec<String>) {
        let last = self.children.len().saturating_sub(1);
        for (index, child) in self.children.iter().enumerate() {
            let (branch, carry) = if index == last {
                ("`-- ", "    ")
            } else {
                ("+-- ", "|   ")
            };
            lines.push(format!("{indent}{branch}{}", child.component.name));
            child.diagram_children(&format!("{indent}{carry}"), lines);
        }
    }
}

/// Builds every curated combination of the extracted records.
pub fn generate(records: &[ComponentRecord], settings: &ComposerSettings) -> Vec<ComponentRecord> {
    let extracted: Vec<&ComponentRecord> =
        records.iter().filter(|record| !record.is_synthetic()).collect();
    let containers: Vec<&ComponentRecord> = extracted
        .iter()
        .copied()
        .filter(|record| record.is_container)
        .collect();
    let leaves: Vec<&ComponentRecord> = extracted
        .iter()
        .copied()
        .filter(|record| !record.is_container)
        .collect();
    if containers.is_empty() || leaves.is_empty() {
        return Vec::new();
    }

    let primary = curated(&containers, &settings.primary_containers);
    let secondary = curated(&containers, &settings.secondary_containers);
    let leaf_pairs: Vec<(&ComponentRecord, &ComponentRecord)> = leaves
        .iter()
        .enumerate()
        .flat_map(|(i, first)| leaves[i + 1..].iter().map(move |second| (*first, *second)))
        .collect();

    let mut trees = Vec::new();

    for container in &containers {
        for leaf in &leaves {
            trees.push(ComponentNode::root(container, vec![ComponentNode::leaf(leaf)]));
        }
    }

    for container in &containers {
        for (first, second) in &leaf_pairs {
            trees.push(ComponentNode::root(
                container,
                vec![ComponentNode::leaf(first), ComponentNode::leaf(second)],
            ));
        }
    }

    for outer in &primary {
        for inner in &secondary {
            for leaf in &leaves {
                trees.push(ComponentNode::root(
                    outer,
                    vec![ComponentNode::nested(inner, vec![ComponentNode::leaf(leaf)])],
                ));
            }
        }
    }

    for outer in &primary {
        for inner in &secondary {
            for (first, second) in &leaf_pairs {
                trees.push(ComponentNode::root(
                    outer,
                    vec![ComponentNode::nested(
                        inner,
                        vec![ComponentNode::leaf(first), ComponentNode::leaf(second)],
                    )],
                ));
            }
        }
    }

    let mut innermost: Vec<Vec<ComponentNode>> = leaves
        .iter()
        .take(STEP_LEAF_LIMIT)
        .map(|leaf| vec![ComponentNode::leaf(leaf)])
        .collect();
    if let [first, second, ..] = leaves.as_slice() {
        innermost.push(vec![ComponentNode::leaf(first), ComponentNode::leaf(second)]);
    }
    for outer in primary.iter().take(STEP_CONTAINER_LIMIT) {
        for middle in secondary.iter().take(STEP_CONTAINER_LIMIT) {
            let inners = secondary
                .iter()
                .filter(|inner| inner.name != middle.name)
                .take(STEP_CONTAINER_LIMIT);
            for inner in inners {
                for members in &innermost {
                    trees.push(ComponentNode::root(
                        outer,
                        vec![ComponentNode::nested(
                            middle,
                            vec![ComponentNode::inner(inner, members.clone())],
                        )],
                    ));
                }
            }
        }
    }

    let mut combinations = Vec::with_capacity(trees.len());
    for tree in trees {
        match combine(tree) {
            Ok(record) => combinations.push(record),
            Err(error) => warn!(%error, "combination skipped"),
        }
    }
    combinations
}

/// Generates combinations from the registry's extracted records and registers
/// them. Returns how many were new.
pub fn register_combinations(registry: &mut ComponentRegistry, settings: &ComposerSettings) -> usize {
    let combinations = generate(registry.all(), settings);
    let generated = combinations.len();
    let registered = combinations
        .into_iter()
        .map(|record| registry.register(record))
        .filter(|added| *added)
        .count();
    info!(generated, registered, "component combinations registered");
    registered
}

fn curated<'a>(containers: &[&'a ComponentRecord], names: &[String]) -> Vec<&'a ComponentRecord> {
    names
        .iter()
        .filter_map(|name| containers.iter().find(|record| record.name == *name).copied())
        .collect()
}

/// Turns one nesting into a synthetic record.
pub fn combine(root: ComponentNode) -> Result<ComponentRecord, CombinationError> {
    let name = root.combined_name();

    let mut prefixes = BTreeSet::new();
    for node in root.descendants() {
        if !prefixes.insert(node.prefix.as_str()) {
            return Err(CombinationError::PrefixCollision {
                tree: name,
                prefix: node.prefix.clone(),
            });
        }
    }

    let schema = flatten(&root, &name)?;
    let depth = root.depth();
    let structure = root.diagram();
    let description = describe(&root, depth, &structure);

    let tree = root;
    let component = ComponentRef::from_fn(name.clone(), move |key, props, children| {
        render_combination(&tree, key, props, children)
    });

    Ok(ComponentRecord::new(name, description, schema, component)
        .with_container(true)
        .with_origin(RecordOrigin::Combination { depth, structure }))
}

fn flatten(root: &ComponentNode, tree: &str) -> Result<PropsSchema, CombinationError> {
    let mut schema = PropsSchema::default();
    let nodes = std::iter::once(root).chain(root.descendants());
    for node in nodes {
        let source = &node.component.props_schema;
        for prop in node.own_props() {
            let key = node.flat_key(prop);
            let Some(property) = source.get(prop) else {
                continue;
            };
            if schema.properties.insert(key.clone(), property.clone()).is_some() {
                return Err(CombinationError::KeyCollision {
                    tree: tree.to_string(),
                    key,
                });
            }
            if source.required.iter().any(|required| required == prop) {
                schema.required.push(key);
            }
        }
    }
    Ok(schema)
}

fn describe(root: &ComponentNode, depth: usize, structure: &str) -> String {
    let members = root
        .descendants()
        .iter()
        .map(|node| node.component.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let examples: Vec<String> = root
        .descendants()
        .into_iter()
        .flat_map(|node| node.own_props().map(move |prop| node.flat_key(prop)))
        .take(EXAMPLE_KEY_LIMIT)
        .collect();

    let mut description = format!(
        "Pre-composed {} with {members} nested inside (nesting depth {depth}).\nStructure:\n{structure}\n",
        root.component.name
    );
    description.push_str(
        "Root props keep their names; nested props are prefixed with the lower-cased component name",
    );
    if examples.is_empty() {
        description.push('.');
    } else {
        description.push_str(&format!(" (e.g. {}).", examples.join(", ")));
    }
    description
}

fn render_combination(
    root: &ComponentNode,
    key: &str,
    mut props: Props,
    extra_children: Vec<RenderNode>,
) -> Result<RenderNode, RenderError> {
    let mut children = render_members(&root.children, key, &mut props)?;
    children.extend(extra_children);
    root.component.component.render(key, props, children)
}

fn render_members(
    nodes: &[ComponentNode],
    parent_key: &str,
    bag: &mut Props,
) -> Result<Vec<RenderNode>, RenderError> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let key = format!("{parent_key}.{index}-{}", node.component.name);
            let children = render_members(&node.children, &key, bag)?;
            let own: Props = node
                .own_props()
                .filter_map(|prop| {
                    bag.remove(&node.flat_key(prop))
                        .map(|value| (prop.to_string(), value))
                })
                .collect();
            node.component.component.render(&key, own, children)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PropValue;
    use crate::schema::{props_schema, ArgTypes};
    use serde_json::{json, Value};

    fn record(name: &str, arg_types: Value) -> ComponentRecord {
        let arg_types: ArgTypes =
            serde_json::from_value(arg_types).expect("arg types");
        let is_container = arg_types.contains_key(CHILDREN_PROP);
        ComponentRecord::new(
            name,
            format!("A {name} component"),
            props_schema(&arg_types),
            ComponentRef::host(name),
        )
        .with_container(is_container)
    }

    fn card() -> ComponentRecord {
        record(
            "Card",
            json!({
                "title": {"control": "text", "type": {"name": "string", "required": true}},
                "elevated": {"control": "boolean"},
                "children": {"control": false}
            }),
        )
    }

    fn button() -> ComponentRecord {
        record(
            "Button",
            json!({
                "label": {"control": "text"},
                "variant": {"control": "select", "options": ["primary", "secondary"]},
                "onClick": {"action": "clicked", "type": {"name": "function"}}
            }),
        )
    }

    fn settings() -> ComposerSettings {
        ComposerSettings::default()
    }

    fn find<'a>(records: &'a [ComponentRecord], name: &str) -> &'a ComponentRecord {
        records
            .iter()
            .find(|record| record.name == name)
            .unwrap_or_else(|| panic!("{name} should be generated"))
    }

    #[test]
    fn container_with_leaf_flattens_props() {
        let records = vec![card(), button()];
        let combinations = generate(&records, &settings());

        assert_eq!(combinations.len(), 1);
        let combined = find(&combinations, "Card_containing_Button");
        let keys: Vec<&str> = combined
            .props_schema
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["title", "elevated", "button_label", "button_variant"]);
        assert_eq!(combined.props_schema.required, vec!["title".to_string()]);
        assert!(combined.is_synthetic());
        assert_eq!(combined.nesting_depth(), 1);
        assert!(combined.description.contains("nesting depth 1"));
        assert!(combined.description.contains("Card\n`-- Button"));
    }

    #[test]
    fn no_containers_or_no_leaves_means_no_combinations() {
        assert!(generate(&[button()], &settings()).is_empty());
        assert!(generate(&[card()], &settings()).is_empty());
        assert!(generate(&[], &settings()).is_empty());
    }

    #[test]
    fn synthetic_records_do_not_participate() {
        let records = vec![card(), button()];
        let mut all = records.clone();
        all.extend(generate(&records, &settings()));
        assert_eq!(generate(&all, &settings()).len(), 1);
    }

    #[test]
    fn leaf_pairs_and_curated_nestings() {
        let stack = record(
            "Stack",
            json!({
                "direction": {"control": "select", "options": ["row", "column"]},
                "children": {"control": false}
            }),
        );
        let boxed = record(
            "Box",
            json!({"padding": {"control": "number"}, "children": {"control": false}}),
        );
        let text = record("Text", json!({"content": {"control": "text"}}));
        let records = vec![boxed, stack, button(), text];
        let combinations = generate(&records, &settings());
        let names: BTreeSet<&str> = combinations.iter().map(|r| r.name.as_str()).collect();

        for expected in [
            "Box_containing_Button",
            "Stack_containing_Text",
            "Stack_containing_Button_and_Text",
            "Box_containing_Stack_containing_Button",
            "Box_containing_Stack_containing_Button_and_Text",
        ] {
            assert!(names.contains(expected), "missing {expected}");
        }
        assert!(names.contains("Box_containing_Box_containing_Button"));
        assert!(!names.contains("Stack_containing_Box_containing_Button"));

        let nested = find(&combinations, "Box_containing_Stack_containing_Button");
        assert_eq!(nested.nesting_depth(), 2);
        assert!(nested.props_schema.has("stack_direction"));
        assert!(nested.props_schema.has("button_label"));
        assert!(nested.props_schema.has("padding"));

        let same_kind = find(&combinations, "Box_containing_Box_containing_Button");
        let keys: Vec<&str> = same_kind
            .props_schema
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["padding", "box_padding", "button_label", "button_variant"]);
    }

    #[test]
    fn three_level_nesting_prefixes_the_inner_container() {
        let boxed = record(
            "Box",
            json!({"padding": {"control": "number"}, "children": {"control": false}}),
        );
        let stack = record(
            "Stack",
            json!({
                "direction": {"control": "select", "options": ["row", "column"]},
                "children": {"control": false}
            }),
        );
        let form_field = record(
            "FormField",
            json!({"label": {"control": "text"}, "children": {"control": false}}),
        );
        let records = vec![boxed, stack, form_field, button()];
        let combinations = generate(&records, &settings());

        let name = "Box_containing_Stack_containing_FormField_containing_Button";
        let combined = find(&combinations, name);
        assert_eq!(combined.nesting_depth(), 3);
        let keys: Vec<&str> = combined
            .props_schema
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "padding",
                "stack_direction",
                "innerformfield_label",
                "button_label",
                "button_variant"
            ]
        );
        assert!(combined.description.contains("Box\n`-- Stack\n    `-- FormField\n        `-- Button"));

        let mut props = Props::new();
        props.insert("padding".into(), json!(8).into());
        props.insert("stack_direction".into(), json!("row").into());
        props.insert("innerformfield_label".into(), json!("Email").into());
        props.insert("button_label".into(), json!("Go").into());
        let node = combined
            .component
            .render("root-Box-0", props, Vec::new())
            .expect("render");

        assert_eq!(node.prop("padding"), Some(&PropValue::Value(json!(8))));
        let [stack_node] = node.children() else {
            panic!("box should hold only the stack");
        };
        assert_eq!(stack_node.prop("direction").and_then(PropValue::as_str), Some("row"));
        let [field_node] = stack_node.children() else {
            panic!("stack should hold only the form field");
        };
        assert_eq!(field_node.component(), Some("FormField"));
        assert_eq!(field_node.key(), Some("root-Box-0.0-Stack.0-FormField"));
        assert_eq!(field_node.prop("label").and_then(PropValue::as_str), Some("Email"));
        let [button_node] = field_node.children() else {
            panic!("form field should hold only the button");
        };
        assert_eq!(button_node.key(), Some("root-Box-0.0-Stack.0-FormField.0-Button"));
        assert_eq!(button_node.prop("label").and_then(PropValue::as_str), Some("Go"));
    }

    #[test]
    fn render_reslices_flat_props_per_node() {
        let stack = record(
            "Stack",
            json!({
                "direction": {"control": "select", "options": ["row", "column"]},
                "children": {"control": false}
            }),
        );
        let boxed = record(
            "Box",
            json!({"padding": {"control": "number"}, "children": {"control": false}}),
        );
        let tree = ComponentNode::root(
            &boxed,
            vec![ComponentNode::nested(&stack, vec![ComponentNode::leaf(&button())])],
        );
        let combined = combine(tree).expect("combination");

        let mut props = Props::new();
        props.insert("padding".into(), json!(4).into());
        props.insert("stack_direction".into(), json!("row").into());
        props.insert("button_label".into(), json!("Go").into());
        let extra = RenderNode::Text {
            text: "after".into(),
        };

        let node = combined
            .component
            .render("root-Box-0", props, vec![extra.clone()])
            .expect("render");

        assert_eq!(node.component(), Some("Box"));
        assert_eq!(node.prop("padding"), Some(&PropValue::Value(json!(4))));
        assert!(node.prop("stack_direction").is_none());
        let [stack_node, trailing] = node.children() else {
            panic!("box should hold the stack and the extra child");
        };
        assert_eq!(trailing, &extra);
        assert_eq!(stack_node.component(), Some("Stack"));
        assert_eq!(stack_node.key(), Some("root-Box-0.0-Stack"));
        assert_eq!(stack_node.prop("direction").and_then(PropValue::as_str), Some("row"));
        let button_node = &stack_node.children()[0];
        assert_eq!(button_node.prop("label").and_then(PropValue::as_str), Some("Go"));
        assert!(button_node.prop("variant").is_none());
    }

    #[test]
    fn key_collision_rejects_tree() {
        let clashing = record(
            "Panel",
            json!({"button_label": {"control": "text"}, "children": {"control": false}}),
        );
        let tree = ComponentNode::root(&clashing, vec![ComponentNode::leaf(&button())]);
        assert_eq!(
            combine(tree).err(),
            Some(CombinationError::KeyCollision {
                tree: "Panel_containing_Button".into(),
                key: "button_label".into(),
            })
        );

        let records = vec![clashing, button()];
        assert!(generate(&records, &settings()).is_empty());
    }

    #[test]
    fn prefix_collision_rejects_tree() {
        let boxed = record("Box", json!({"children": {"control": false}}));
        let inner_box_leaf = record("InnerBox", json!({"tone": {"control": "text"}}));
        let stack = record("Stack", json!({"children": {"control": false}}));
        let tree = ComponentNode::root(
            &stack,
            vec![ComponentNode::inner(&boxed, vec![ComponentNode::leaf(&inner_box_leaf)])],
        );
        assert!(matches!(
            combine(tree),
            Err(CombinationError::PrefixCollision { prefix, .. }) if prefix == "innerbox"
        ));
    }

    #[test]
    fn register_combinations_adds_to_registry() {
        let mut registry = ComponentRegistry::new();
        registry.register(card());
        registry.register(button());

        assert_eq!(register_combinations(&mut registry, &settings()), 1);
        assert!(registry.has("Card_containing_Button"));
        assert_eq!(register_combinations(&mut registry, &settings()), 0);
    }

    #[test]
    fn diagram_marks_siblings() {
        let text = record("Text", json!({}));
        let tree = ComponentNode::root(
            &card(),
            vec![ComponentNode::leaf(&button()), ComponentNode::leaf(&text)],
        );
        assert_eq!(tree.diagram(), "Card\n+-- Button\n`-- Text");
        assert_eq!(tree.combined_name(), "Card_containing_Button_and_Text");
    }
}
