//! Paints render trees with egui widgets styled after the demo design system.

use crate::theme::Theme;
use eframe::egui::{self, Align2, FontId, RichText, Sense};
use serde_json::Value;
use storyweave::render::{PropValue, RenderNode};

const TEXT_PROPS: [&str; 4] = ["text", "content", "label", "title"];

pub struct Canvas<'a> {
    theme: &'a Theme,
}

impl<'a> Canvas<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    pub fn show(&self, ui: &mut egui::Ui, node: &RenderNode) {
        let theme = self.theme;
        match node {
            RenderNode::Element { component, .. } => self.element(ui, component, node),
            RenderNode::Text { text } => {
                ui.label(RichText::new(text).color(theme.ink));
            }
            RenderNode::Value { value } => {
                ui.label(RichText::new(value_text(value)).color(theme.ink));
            }
            RenderNode::Missing { name, .. } => {
                theme.notice_frame(theme.warning).show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("Unknown component: {name}"))
                            .color(theme.warning)
                            .size(12.0),
                    );
                });
            }
            RenderNode::Fault {
                component, message, ..
            } => {
                theme.notice_frame(theme.danger).show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("{component} failed to render"))
                            .color(theme.danger)
                            .strong(),
                    );
                    ui.label(RichText::new(message).color(theme.ink_muted).size(12.0));
                });
            }
            RenderNode::Empty => {}
        }
    }

    fn element(&self, ui: &mut egui::Ui, component: &str, node: &RenderNode) {
        let theme = self.theme;
        match component {
            "Button" => {
                let label = prop_text(node, &["label", "text"])
                    .or_else(|| text_content(node))
                    .unwrap_or_else(|| "Button".to_string());
                let variant = prop_text(node, &["variant"]).unwrap_or_default();
                let (fill, text_color) = match variant.as_str() {
                    "" | "primary" => (theme.accent, theme.ink_on_accent),
                    "danger" => (theme.danger, theme.ink_on_accent),
                    other => (theme.inset, theme.tone(other)),
                };
                let height = match prop_text(node, &["size"]).as_deref() {
                    Some("small") => theme.control_height - 8.0,
                    Some("large") => theme.control_height + 8.0,
                    _ => theme.control_height,
                };
                let button = egui::Button::new(RichText::new(label).color(text_color).size(13.0))
                    .fill(fill)
                    .stroke(theme.hairline_stroke())
                    .corner_radius(egui::CornerRadius::same(theme.corner_s))
                    .min_size(egui::vec2(0.0, height));
                ui.add_enabled(!prop_flag(node, "disabled"), button);
            }
            "Card" => {
                theme.card_frame().show(ui, |ui| {
                    if let Some(title) = prop_text(node, &["title"]) {
                        ui.label(RichText::new(title).color(theme.ink).size(15.0).strong());
                    }
                    if let Some(description) = prop_text(node, &["description", "subtitle"]) {
                        ui.label(RichText::new(description).color(theme.ink_muted).size(12.0));
                    }
                    self.children(ui, node);
                    if let Some(footer) = prop_text(node, &["footer"]) {
                        ui.separator();
                        ui.label(RichText::new(footer).color(theme.ink_muted).size(12.0));
                    }
                });
            }
            "Box" => {
                theme
                    .panel_frame(theme.inset, theme.space_s)
                    .show(ui, |ui| self.children(ui, node));
            }
            "Stack" => {
                if is_row(node) {
                    ui.horizontal_wrapped(|ui| self.children(ui, node));
                } else {
                    ui.vertical(|ui| self.children(ui, node));
                }
            }
            "Alert" => {
                let tone = theme.tone(&prop_text(node, &["type", "variant"]).unwrap_or_default());
                theme.notice_frame(tone).show(ui, |ui| {
                    if let Some(title) = prop_text(node, &["title"]) {
                        ui.label(RichText::new(title).color(tone).strong());
                    }
                    if let Some(message) = prop_text(node, &["message", "description"]) {
                        ui.label(RichText::new(message).color(theme.ink));
                    }
                    self.children(ui, node);
                });
            }
            "Text" => {
                let text = prop_text(node, &["content", "text"])
                    .or_else(|| text_content(node))
                    .unwrap_or_default();
                let size = match prop_text(node, &["variant"]).as_deref() {
                    Some("lead") => 17.0,
                    Some("caption") | Some("label") => 12.0,
                    _ => 14.0,
                };
                let color = match prop_text(node, &["color"]).as_deref() {
                    None | Some("default") => theme.ink,
                    Some(color) => theme.tone(color),
                };
                let mut text = RichText::new(text).color(color).size(size);
                if matches!(
                    prop_text(node, &["weight"]).as_deref(),
                    Some("semibold") | Some("bold")
                ) {
                    text = text.strong();
                }
                ui.label(text);
            }
            "Badge" => {
                let tone = theme.tone(&prop_text(node, &["color", "variant"]).unwrap_or_default());
                let text = prop_text(node, &["text", "label"])
                    .or_else(|| text_content(node))
                    .unwrap_or_default();
                egui::Frame::new()
                    .fill(tone)
                    .corner_radius(egui::CornerRadius::same(theme.corner_pill))
                    .inner_margin(egui::Margin::symmetric(theme.space_s, 2))
                    .show(ui, |ui| {
                        ui.label(RichText::new(text).color(theme.ink_on_accent).size(11.0));
                    });
            }
            "Avatar" => {
                let name = prop_text(node, &["name", "alt", "fallback"]).unwrap_or_default();
                let diameter = match prop_text(node, &["size"]).as_deref() {
                    Some("small") => 24.0,
                    Some("large") => 48.0,
                    Some("xlarge") => 64.0,
                    _ => 36.0,
                };
                let (rect, _) = ui.allocate_exact_size(egui::vec2(diameter, diameter), Sense::hover());
                let painter = ui.painter();
                painter.circle_filled(rect.center(), diameter / 2.0, theme.accent_soft);
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    initials(&name),
                    FontId::proportional(diameter * 0.4),
                    theme.ink_on_accent,
                );
            }
            "Divider" => match prop_text(node, &["label"]) {
                Some(label) => {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(label).color(theme.ink_muted).size(11.0));
                        ui.separator();
                    });
                }
                None => {
                    ui.separator();
                }
            },
            "Input" => {
                let mut value = prop_text(node, &["value"]).unwrap_or_default();
                let placeholder = prop_text(node, &["placeholder"]).unwrap_or_default();
                if let Some(label) = prop_text(node, &["label"]) {
                    ui.label(RichText::new(label).color(theme.ink_muted).size(12.0));
                }
                ui.add_enabled(
                    !prop_flag(node, "disabled"),
                    egui::TextEdit::singleline(&mut value)
                        .password(prop_text(node, &["type"]).as_deref() == Some("password"))
                        .desired_width(f32::INFINITY)
                        .hint_text(placeholder),
                );
                if let Some(error) = prop_text(node, &["error"]) {
                    ui.label(RichText::new(error).color(theme.danger).size(12.0));
                } else if let Some(help) = prop_text(node, &["helperText"]) {
                    ui.label(RichText::new(help).color(theme.ink_muted).size(12.0));
                }
            }
            "FormField" => {
                ui.vertical(|ui| {
                    if let Some(label) = prop_text(node, &["label"]) {
                        let label = if prop_flag(node, "required") {
                            format!("{label} *")
                        } else {
                            label
                        };
                        ui.label(RichText::new(label).color(theme.ink_muted).size(12.0));
                    }
                    self.children(ui, node);
                    if let Some(error) = prop_text(node, &["error"]) {
                        ui.label(RichText::new(error).color(theme.danger).size(12.0));
                    } else if let Some(help) = prop_text(node, &["helperText"]) {
                        ui.label(RichText::new(help).color(theme.ink_muted).size(12.0));
                    }
                });
            }
            "List" => {
                let separated = prop_text(node, &["variant"]).as_deref() == Some("separated");
                let items = list_items(node);
                let children = node.children();
                for (index, item) in items.iter().enumerate() {
                    if separated && index > 0 {
                        ui.separator();
                    }
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("•").color(theme.ink_muted));
                        ui.label(RichText::new(item).color(theme.ink));
                    });
                }
                for (index, child) in children.iter().enumerate() {
                    if separated && (index > 0 || !items.is_empty()) {
                        ui.separator();
                    }
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("•").color(theme.ink_muted));
                        self.show(ui, child);
                    });
                }
            }
            "Accordion" => {
                let title = prop_text(node, &["title", "label"]).unwrap_or_else(|| "Section".into());
                egui::CollapsingHeader::new(RichText::new(title).color(theme.ink))
                    .id_salt(node.key().unwrap_or(component))
                    .default_open(prop_flag(node, "defaultExpanded"))
                    .show(ui, |ui| self.children(ui, node));
            }
            _ => {
                theme.card_frame().show(ui, |ui| {
                    ui.label(RichText::new(component).color(theme.ink_muted).size(12.0));
                    if let Some(text) = prop_text(node, &TEXT_PROPS) {
                        ui.label(RichText::new(text).color(theme.ink));
                    }
                    self.children(ui, node);
                });
            }
        }
        self.node_props(ui, node);
    }

    fn children(&self, ui: &mut egui::Ui, node: &RenderNode) {
        for child in node.children() {
            self.show(ui, child);
        }
    }

    /// Nested descriptions passed through props other than `children`.
    fn node_props(&self, ui: &mut egui::Ui, node: &RenderNode) {
        let RenderNode::Element { props, .. } = node else {
            return;
        };
        for (name, value) in props {
            if let PropValue::Node(child) = value {
                ui.label(RichText::new(name).color(self.theme.ink_muted).size(11.0));
                self.show(ui, child);
            }
        }
    }
}

/// First of `names` holding a scalar, rendered as display text.
pub fn prop_text(node: &RenderNode, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        let value = node.prop(name)?.as_value()?;
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
            _ => None,
        }
    })
}

pub fn prop_flag(node: &RenderNode, name: &str) -> bool {
    node.prop(name)
        .and_then(PropValue::as_value)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Text gathered from the node's text and primitive children.
pub fn text_content(node: &RenderNode) -> Option<String> {
    let parts: Vec<String> = node
        .children()
        .iter()
        .filter_map(|child| match child {
            RenderNode::Text { text } => Some(text.clone()),
            RenderNode::Value { value } => Some(value_text(value)),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn is_row(node: &RenderNode) -> bool {
    matches!(
        prop_text(node, &["direction"]).as_deref(),
        Some("row") | Some("horizontal")
    )
}

fn list_items(node: &RenderNode) -> Vec<String> {
    node.prop("items")
        .and_then(PropValue::as_value)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_text).collect())
        .unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
