//! Renderer contract and the renderer-agnostic form view.
//!
//! A [`FormView`] is the laid-out form for one render pass: headings, controls
//! bound to field paths with their current values and validation messages, and
//! any UI schema defects. Renderers draw it and report edits through the change
//! callback as whole replacement [`FormData`] objects.

use crate::bundle::SchemaBundle;
use crate::data::{FieldPath, FormData};
use crate::layout::{ControlLabel, LayoutElement, LayoutIssue};
use crate::schema::{self, EnumOption, FieldKind, FieldNode};
use serde_json::Value;
use std::collections::HashMap;

/// Rendering capability driven by the form controller.
///
/// `render` receives the view for the current bundle and data. Every edit the
/// renderer performs during the pass is reported through `on_change` with the
/// entire updated data object; the renderer never mutates controller state.
pub trait FormRenderer {
    type Ui;

    fn render(&mut self, view: &FormView<'_>, on_change: &mut dyn FnMut(FormData)) -> Self::Ui;
}

/// Laid-out form for one render pass.
#[derive(Debug, Clone)]
pub struct FormView<'a> {
    pub bundle: Option<&'a SchemaBundle>,
    pub data: &'a FormData,
    pub nodes: Vec<ViewNode>,
    pub issues: Vec<LayoutIssue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Heading { label: String, depth: usize },
    Text { text: String, depth: usize },
    Control(ControlView),
    /// Something that could not be rendered: a layout defect or an unsupported field.
    Flag { message: String, depth: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlView {
    pub path: FieldPath,
    /// Empty when the UI schema hides the label.
    pub label: String,
    pub description: Option<String>,
    pub depth: usize,
    pub required: bool,
    pub kind: ControlKind,
    pub value: Option<Value>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Text { format: Option<String> },
    Number { integer: bool },
    Checkbox,
    Select { options: Vec<EnumOption> },
    /// Array of primitives, edited as comma-separated text.
    List { item: Box<ControlKind> },
    /// Appends `template` to the array at the control's path.
    AppendItem { template: Value },
    /// Removes the array element at the control's path.
    RemoveItem,
}

impl<'a> FormView<'a> {
    /// Lays out `bundle` for `data`. With no bundle the view is empty.
    pub fn build(bundle: Option<&'a SchemaBundle>, data: &'a FormData) -> FormView<'a> {
        let mut view = FormView {
            bundle,
            data,
            nodes: Vec::new(),
            issues: Vec::new(),
        };
        let Some(bundle) = bundle else {
            return view;
        };

        let mut errors: HashMap<FieldPath, Vec<String>> = HashMap::new();
        for issue in schema::validate(bundle.root(), data) {
            errors.entry(issue.path).or_default().push(issue.message);
        }
        let mut builder = Builder {
            root: bundle.root(),
            data,
            errors,
            nodes: Vec::new(),
            issues: Vec::new(),
        };
        match LayoutElement::parse_root(bundle.uischema()) {
            Some(layout) => builder.element(&layout, 0),
            None => builder.field(bundle.root(), &FieldPath::root(), &ControlLabel::Default, 0),
        }
        view.nodes = builder.nodes;
        view.issues = builder.issues;
        view
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn controls(&self) -> impl Iterator<Item = &ControlView> {
        self.nodes.iter().filter_map(|n| match n {
            ViewNode::Control(c) => Some(c),
            _ => None,
        })
    }

    pub fn control(&self, path: &FieldPath) -> Option<&ControlView> {
        self.controls()
            .find(|c| &c.path == path && !matches!(c.kind, ControlKind::AppendItem { .. } | ControlKind::RemoveItem))
    }
}

struct Builder<'a> {
    root: &'a FieldNode,
    data: &'a FormData,
    errors: HashMap<FieldPath, Vec<String>>,
    nodes: Vec<ViewNode>,
    issues: Vec<LayoutIssue>,
}

impl<'a> Builder<'a> {
    fn flag(&mut self, issue: LayoutIssue, depth: usize) {
        self.nodes.push(ViewNode::Flag {
            message: issue.to_string(),
            depth,
        });
        self.issues.push(issue);
    }

    fn element(&mut self, element: &LayoutElement, depth: usize) {
        match element {
            LayoutElement::Vertical(children) | LayoutElement::Horizontal(children) => {
                for child in children {
                    self.element(child, depth);
                }
            }
            LayoutElement::Group { label, elements } => {
                let inner = match label {
                    Some(label) => {
                        self.nodes.push(ViewNode::Heading {
                            label: label.clone(),
                            depth,
                        });
                        depth + 1
                    }
                    None => depth,
                };
                for child in elements {
                    self.element(child, inner);
                }
            }
            LayoutElement::Label(text) => self.nodes.push(ViewNode::Text {
                text: text.clone(),
                depth,
            }),
            LayoutElement::Unknown(kind) => self.flag(LayoutIssue::UnknownElement(kind.clone()), depth),
            LayoutElement::Control { scope: None, .. } => self.flag(LayoutIssue::MissingScope, depth),
            LayoutElement::Control {
                scope: Some(scope),
                label,
            } => {
                let root: &'a FieldNode = self.root;
                let resolved = FieldPath::from_scope(scope)
                    .and_then(|path| root.lookup(&path).map(|node| (path, node)));
                match resolved {
                    Some((path, node)) => self.field(node, &path, label, depth),
                    None => self.flag(LayoutIssue::DanglingScope(scope.clone()), depth),
                }
            }
        }
    }

    fn field(&mut self, node: &FieldNode, path: &FieldPath, label: &ControlLabel, depth: usize) {
        let label = match label {
            ControlLabel::Default => node.label.clone(),
            ControlLabel::Hidden => String::new(),
            ControlLabel::Text(text) => text.clone(),
        };

        match &node.kind {
            FieldKind::Object { properties, .. } => {
                let inner = if path.is_root() {
                    depth
                } else {
                    self.nodes.push(ViewNode::Heading {
                        label: label.clone(),
                        depth,
                    });
                    depth + 1
                };
                for property in properties {
                    let Some(name) = property.name.as_deref() else {
                        continue;
                    };
                    self.field(property, &path.child(name), &ControlLabel::Default, inner);
                }
            }
            FieldKind::Array { items, .. } if !items.is_primitive() => {
                self.nodes.push(ViewNode::Heading {
                    label: label.clone(),
                    depth,
                });
                let len = self
                    .data
                    .get(path)
                    .and_then(Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0);
                let item_label = if items.label.is_empty() { label.clone() } else { items.label.clone() };
                for i in 0..len {
                    let item_path = path.index(i);
                    self.field(
                        items,
                        &item_path,
                        &ControlLabel::Text(format!("{} {}", item_label, i + 1)),
                        depth + 1,
                    );
                    self.push_control(&item_path, format!("Remove {} {}", item_label, i + 1), None, ControlKind::RemoveItem, depth + 1);
                }
                let template = match items.kind {
                    FieldKind::Object { .. } => Value::Object(Default::default()),
                    FieldKind::Array { .. } => Value::Array(Vec::new()),
                    _ => Value::Null,
                };
                self.push_control(path, format!("Add {}", item_label), None, ControlKind::AppendItem { template }, depth + 1);
            }
            FieldKind::Unsupported { type_name } => self.nodes.push(ViewNode::Flag {
                message: format!("no control for \"{}\" ({})", label, type_name),
                depth,
            }),
            kind => {
                let Some(control) = primitive_control(kind) else {
                    return;
                };
                self.push_control(path, label, node.description.clone(), control, depth);
            }
        }
    }

    fn push_control(
        &mut self,
        path: &FieldPath,
        label: String,
        description: Option<String>,
        kind: ControlKind,
        depth: usize,
    ) {
        let is_action = matches!(kind, ControlKind::AppendItem { .. } | ControlKind::RemoveItem);
        let (value, errors, required) = if is_action {
            (None, Vec::new(), false)
        } else {
            (
                self.data.get(path).cloned(),
                self.errors.get(path).cloned().unwrap_or_default(),
                self.root.is_required(path),
            )
        };
        self.nodes.push(ViewNode::Control(ControlView {
            path: path.clone(),
            label,
            description,
            depth,
            required,
            kind,
            value,
            errors,
        }));
    }
}

fn primitive_control(kind: &FieldKind) -> Option<ControlKind> {
    match kind {
        FieldKind::String { format, .. } => Some(ControlKind::Text {
            format: format.clone(),
        }),
        FieldKind::Number { integer, .. } => Some(ControlKind::Number { integer: *integer }),
        FieldKind::Boolean => Some(ControlKind::Checkbox),
        FieldKind::Enum { options } => Some(ControlKind::Select {
            options: options.clone(),
        }),
        FieldKind::Array { items, .. } => primitive_control(&items.kind).map(|item| ControlKind::List {
            item: Box::new(item),
        }),
        FieldKind::Object { .. } | FieldKind::Unsupported { .. } => None,
    }
}

impl ControlKind {
    /// Converts typed-in text to the value stored in form data. Empty text clears the field.
    pub fn coerce(&self, input: &str) -> Result<Option<Value>, String> {
        let input = input.trim();
        match self {
            ControlKind::Text { .. } => Ok((!input.is_empty()).then(|| Value::String(input.to_string()))),
            _ if input.is_empty() => Ok(None),
            ControlKind::Number { integer: true } => input
                .parse::<i64>()
                .map(|n| Some(Value::from(n)))
                .map_err(|_| "must be integer".to_string()),
            ControlKind::Number { integer: false } => input
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| "must be number".to_string()),
            ControlKind::Checkbox => match input {
                "true" | "yes" | "y" | "1" => Ok(Some(Value::Bool(true))),
                "false" | "no" | "n" | "0" => Ok(Some(Value::Bool(false))),
                _ => Err("must be boolean".to_string()),
            },
            ControlKind::Select { options } => options
                .iter()
                .find(|o| o.label == input || o.value.as_str() == Some(input))
                .map(|o| Some(o.value.clone()))
                .ok_or_else(|| "must be equal to one of the allowed values".to_string()),
            ControlKind::List { item } => {
                let mut values = Vec::new();
                for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    if let Some(v) = item.coerce(part)? {
                        values.push(v);
                    }
                }
                Ok((!values.is_empty()).then_some(Value::Array(values)))
            }
            ControlKind::AppendItem { .. } | ControlKind::RemoveItem => {
                Err("this control does not take text".to_string())
            }
        }
    }

    /// Whether the renderer should offer a text buffer for this control.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ControlKind::Text { .. } | ControlKind::Number { .. } | ControlKind::List { .. }
        )
    }
}

impl ControlView {
    /// Text for an edit buffer or a read-only display of the current value.
    pub fn display_value(&self) -> String {
        match (&self.kind, &self.value) {
            (_, None) | (_, Some(Value::Null)) => String::new(),
            (ControlKind::Select { options }, Some(v)) => options
                .iter()
                .find(|o| &o.value == v)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| display_scalar(v)),
            (_, Some(Value::Array(items))) => items.iter().map(display_scalar).collect::<Vec<_>>().join(", "),
            (_, Some(v)) => display_scalar(v),
        }
    }

    /// Full replacement data after typing `input` into this control.
    pub fn edit(&self, data: &FormData, input: &str) -> Result<FormData, String> {
        let value = self.kind.coerce(input)?;
        Ok(data.with_value(&self.path, value))
    }

    /// Full replacement data after toggling a checkbox.
    pub fn toggle(&self, data: &FormData) -> Option<FormData> {
        if self.kind != ControlKind::Checkbox {
            return None;
        }
        let current = self.value.as_ref().and_then(Value::as_bool).unwrap_or(false);
        Some(data.with_value(&self.path, Some(Value::Bool(!current))))
    }

    /// Full replacement data after moving a select `step` options forward (negative: back).
    pub fn cycle(&self, data: &FormData, step: isize) -> Option<FormData> {
        let ControlKind::Select { options } = &self.kind else {
            return None;
        };
        if options.is_empty() {
            return None;
        }
        let len = options.len() as isize;
        let next = match self
            .value
            .as_ref()
            .and_then(|v| options.iter().position(|o| &o.value == v))
        {
            Some(i) => (i as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        Some(data.with_value(&self.path, Some(options[next as usize].value.clone())))
    }

    /// Full replacement data after activating an add or remove control.
    pub fn activate(&self, data: &FormData) -> Option<FormData> {
        match &self.kind {
            ControlKind::AppendItem { template } => {
                let len = data
                    .get(&self.path)
                    .and_then(Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0);
                Some(data.with_value(&self.path.index(len), Some(template.clone())))
            }
            ControlKind::RemoveItem => Some(data.with_value(&self.path, None)),
            _ => None,
        }
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(schema: Value, uischema: Value) -> SchemaBundle {
        SchemaBundle::new(schema, uischema).unwrap()
    }

    #[test]
    fn no_bundle_renders_nothing() {
        let data = FormData::new();
        let view = FormView::build(None, &data);
        assert!(view.is_empty());
        assert!(view.issues.is_empty());
    }

    #[test]
    fn empty_uischema_lays_out_every_property() {
        let b = bundle(
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "contact": { "type": "object", "properties": { "email": { "type": "string", "format": "email" } } }
                }
            }),
            json!({}),
        );
        let data = FormData::new();
        let view = FormView::build(Some(&b), &data);
        let labels: Vec<String> = view
            .nodes
            .iter()
            .map(|n| match n {
                ViewNode::Heading { label, .. } => format!("# {}", label),
                ViewNode::Control(c) => c.path.to_string(),
                other => format!("{:?}", other),
            })
            .collect();
        assert_eq!(labels, ["name", "# Contact", "contact.email"]);
    }

    #[test]
    fn uischema_order_and_groups_are_honored() {
        let b = bundle(
            json!({
                "type": "object",
                "properties": { "a": { "type": "string" }, "b": { "type": "boolean" } }
            }),
            json!({
                "type": "VerticalLayout",
                "elements": [
                    { "type": "Group", "label": "Second first", "elements": [
                        { "type": "Control", "scope": "#/properties/b", "label": "Bee" }
                    ]},
                    { "type": "Control", "scope": "#/properties/a" }
                ]
            }),
        );
        let data = FormData::new();
        let view = FormView::build(Some(&b), &data);
        assert_eq!(
            view.nodes[0],
            ViewNode::Heading {
                label: "Second first".into(),
                depth: 0
            }
        );
        let ViewNode::Control(bee) = &view.nodes[1] else {
            panic!("expected control");
        };
        assert_eq!((bee.label.as_str(), bee.depth), ("Bee", 1));
        assert_eq!(bee.kind, ControlKind::Checkbox);
        assert_eq!(view.controls().nth(1).unwrap().label, "A");
    }

    #[test]
    fn dangling_scopes_are_flagged_not_fatal() {
        let b = bundle(
            json!({ "type": "object", "properties": { "name": { "type": "string" } } }),
            json!({
                "type": "VerticalLayout",
                "elements": [
                    { "type": "Control", "scope": "#/properties/ghost" },
                    { "type": "Control" },
                    { "type": "Control", "scope": "#/properties/name" }
                ]
            }),
        );
        let data = FormData::new();
        let view = FormView::build(Some(&b), &data);
        assert_eq!(
            view.issues,
            vec![
                LayoutIssue::DanglingScope("#/properties/ghost".into()),
                LayoutIssue::MissingScope
            ]
        );
        assert_eq!(view.controls().count(), 1);
        assert!(view.control(&FieldPath::root().child("name")).is_some());
    }

    #[test]
    fn controls_carry_values_and_validation_errors() {
        let b = bundle(
            json!({
                "type": "object",
                "properties": { "age": { "type": "integer", "minimum": 18 }, "name": { "type": "string" } },
                "required": ["name"]
            }),
            json!({}),
        );
        let data = FormData::from_value(json!({ "age": 12 })).unwrap();
        let view = FormView::build(Some(&b), &data);
        let age = view.control(&FieldPath::root().child("age")).unwrap();
        assert_eq!(age.value, Some(json!(12)));
        assert_eq!(age.errors, vec!["must be >= 18".to_string()]);
        let name = view.control(&FieldPath::root().child("name")).unwrap();
        assert!(name.required);
        assert_eq!(name.errors, vec!["is a required property".to_string()]);
    }

    #[test]
    fn edits_produce_whole_replacement_data() {
        let b = bundle(
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "rate": { "type": "number" },
                    "remote": { "type": "boolean" },
                    "level": { "enum": ["junior", "senior"] },
                    "skills": { "type": "array", "items": { "type": "string" } }
                }
            }),
            json!({}),
        );
        let data = FormData::from_value(json!({ "name": "Alice" })).unwrap();
        let view = FormView::build(Some(&b), &data);
        let control = |key: &str| view.control(&FieldPath::root().child(key)).unwrap();

        let next = control("rate").edit(&data, "42.5").unwrap();
        assert_eq!(next.to_value(), json!({ "name": "Alice", "rate": 42.5 }));
        assert_eq!(control("rate").edit(&data, "lots"), Err("must be number".to_string()));

        let next = control("remote").toggle(&data).unwrap();
        assert_eq!(next.to_value(), json!({ "name": "Alice", "remote": true }));

        let next = control("level").cycle(&data, -1).unwrap();
        assert_eq!(next.to_value(), json!({ "name": "Alice", "level": "senior" }));

        let next = control("skills").edit(&data, "rust, sql,").unwrap();
        assert_eq!(next.to_value(), json!({ "name": "Alice", "skills": ["rust", "sql"] }));

        let next = control("name").edit(&data, "  ").unwrap();
        assert!(next.is_empty());
    }

    #[test]
    fn arrays_of_objects_get_per_item_controls() {
        let b = bundle(
            json!({
                "type": "object",
                "properties": {
                    "projects": {
                        "type": "array",
                        "items": { "type": "object", "title": "Project", "properties": { "client": { "type": "string" } } }
                    }
                }
            }),
            json!({ "type": "VerticalLayout", "elements": [{ "type": "Control", "scope": "#/properties/projects" }] }),
        );
        let data = FormData::from_value(json!({ "projects": [{ "client": "Acme" }] })).unwrap();
        let view = FormView::build(Some(&b), &data);

        let client = FieldPath::root().child("projects").index(0).child("client");
        assert_eq!(view.control(&client).unwrap().display_value(), "Acme");

        let add = view
            .controls()
            .find(|c| matches!(c.kind, ControlKind::AppendItem { .. }))
            .unwrap();
        assert_eq!(add.label, "Add Project");
        let next = add.activate(&data).unwrap();
        assert_eq!(next.to_value(), json!({ "projects": [{ "client": "Acme" }, {}] }));

        let remove = view.controls().find(|c| c.kind == ControlKind::RemoveItem).unwrap();
        let next = remove.activate(&data).unwrap();
        assert_eq!(next.to_value(), json!({ "projects": [] }));
    }

    #[test]
    fn unsupported_fields_are_flagged() {
        let b = bundle(
            json!({ "type": "object", "properties": { "file": { "type": "binary" } } }),
            json!({}),
        );
        let data = FormData::new();
        let view = FormView::build(Some(&b), &data);
        assert!(matches!(&view.nodes[0], ViewNode::Flag { message, .. } if message.contains("binary")));
    }
}
