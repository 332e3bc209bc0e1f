//! UI schema layout elements.

use serde_json::Value;
use std::fmt;

/// One element of a UI schema.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    Vertical(Vec<LayoutElement>),
    Horizontal(Vec<LayoutElement>),
    /// `Group`, `Categorization` and `Category` all render as a labelled section.
    Group {
        label: Option<String>,
        elements: Vec<LayoutElement>,
    },
    Control {
        scope: Option<String>,
        label: ControlLabel,
    },
    Label(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlLabel {
    /// Use the schema's title or the humanized property name.
    Default,
    /// `"label": false`
    Hidden,
    Text(String),
}

/// A UI schema defect found while laying out a form. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutIssue {
    UnknownElement(String),
    MissingScope,
    /// The scope does not name a field of the schema.
    DanglingScope(String),
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutIssue::UnknownElement(t) => write!(f, "unknown layout element \"{}\"", t),
            LayoutIssue::MissingScope => f.write_str("control without a scope"),
            LayoutIssue::DanglingScope(s) => write!(f, "no field for scope \"{}\"", s),
        }
    }
}

impl LayoutElement {
    /// `None` for an empty UI schema (`null`, `{}` or an object without `type`),
    /// in which case a default layout is generated from the schema.
    pub fn parse_root(uischema: &Value) -> Option<LayoutElement> {
        uischema.get("type")?;
        Some(Self::parse(uischema))
    }

    pub fn parse(element: &Value) -> LayoutElement {
        let children = || -> Vec<LayoutElement> {
            element
                .get("elements")
                .and_then(Value::as_array)
                .map(|els| els.iter().map(Self::parse).collect())
                .unwrap_or_default()
        };
        let label = || element.get("label").and_then(Value::as_str).map(str::to_string);

        match element.get("type").and_then(Value::as_str) {
            Some("VerticalLayout") => LayoutElement::Vertical(children()),
            Some("HorizontalLayout") => LayoutElement::Horizontal(children()),
            Some("Group" | "Categorization" | "Category") => LayoutElement::Group {
                label: label(),
                elements: children(),
            },
            Some("Control") => LayoutElement::Control {
                scope: element.get("scope").and_then(Value::as_str).map(str::to_string),
                label: match element.get("label") {
                    Some(Value::Bool(false)) => ControlLabel::Hidden,
                    Some(Value::String(s)) => ControlLabel::Text(s.clone()),
                    _ => ControlLabel::Default,
                },
            },
            Some("Label") => LayoutElement::Label(
                element
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
            Some(other) => LayoutElement::Unknown(other.to_string()),
            None => LayoutElement::Unknown("untyped".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_uischema_means_default_layout() {
        assert_eq!(LayoutElement::parse_root(&json!({})), None);
        assert_eq!(LayoutElement::parse_root(&Value::Null), None);
    }

    #[test]
    fn parses_nested_groups_and_controls() {
        let ui = json!({
            "type": "VerticalLayout",
            "elements": [
                { "type": "Group", "label": "Contact", "elements": [
                    { "type": "Control", "scope": "#/properties/email", "label": "E-mail" },
                    { "type": "Control", "scope": "#/properties/phone", "label": false }
                ]},
                { "type": "Label", "text": "Thanks!" },
                { "type": "Stepper" }
            ]
        });
        let LayoutElement::Vertical(elements) = LayoutElement::parse_root(&ui).unwrap() else {
            panic!("expected vertical layout");
        };
        assert_eq!(elements.len(), 3);
        let LayoutElement::Group { label, elements: controls } = &elements[0] else {
            panic!("expected group");
        };
        assert_eq!(label.as_deref(), Some("Contact"));
        assert_eq!(
            controls[0],
            LayoutElement::Control {
                scope: Some("#/properties/email".into()),
                label: ControlLabel::Text("E-mail".into())
            }
        );
        assert!(matches!(controls[1], LayoutElement::Control { label: ControlLabel::Hidden, .. }));
        assert_eq!(elements[1], LayoutElement::Label("Thanks!".into()));
        assert_eq!(elements[2], LayoutElement::Unknown("Stepper".into()));
    }
}
