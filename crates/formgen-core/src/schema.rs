//! Typed view of a generated JSON schema.
//!
//! The schema is only known at runtime, so it is parsed into a tree of
//! [`FieldNode`]s dispatched on the `type` tag. Nodes the client cannot
//! handle become [`FieldKind::Unsupported`] instead of failing the parse.

use crate::data::{FieldPath, FormData, PathSegment};
use crate::error::FormError;
use serde_json::Value;

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Property name under the parent object (`None` for the root and array items).
    pub name: Option<String>,
    /// `title`, else the humanized property name.
    pub label: String,
    pub description: Option<String>,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        /// Display hint such as `date` or `email`; not enforced.
        format: Option<String>,
    },
    Number {
        integer: bool,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Enum {
        options: Vec<EnumOption>,
    },
    Object {
        properties: Vec<FieldNode>,
        required: Vec<String>,
    },
    Array {
        items: Box<FieldNode>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Unsupported {
        type_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumOption {
    pub value: Value,
    pub label: String,
}

/// Data that does not satisfy the schema at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub path: FieldPath,
    pub message: String,
}

impl FieldNode {
    /// Parses the root of a bundle's schema. The root must describe an object.
    pub fn parse_root(schema: &Value) -> Result<FieldNode, FormError> {
        if !schema.is_object() {
            return Err(FormError::Parse("schema must be a JSON object".into()));
        }
        let root = FieldNode::parse(None, schema);
        match root.kind {
            FieldKind::Object { .. } => Ok(root),
            _ => Err(FormError::Parse(
                "schema root must have type \"object\"".into(),
            )),
        }
    }

    /// Parses any schema node. Never fails; unknown shapes become `Unsupported`.
    pub fn parse(name: Option<&str>, schema: &Value) -> FieldNode {
        let label = schema
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.map(humanize).unwrap_or_default());
        let description = schema
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        FieldNode {
            name: name.map(str::to_string),
            label,
            description,
            kind: parse_kind(schema),
        }
    }

    /// Child node addressed by `path`, walking object properties and array items.
    pub fn lookup(&self, path: &FieldPath) -> Option<&FieldNode> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, &current.kind) {
                (PathSegment::Key(k), FieldKind::Object { properties, .. }) => {
                    properties.iter().find(|p| p.name.as_deref() == Some(k.as_str()))?
                }
                (PathSegment::Index(_), FieldKind::Array { items, .. }) => items,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Whether the property `name` of this object node is listed in `required`.
    pub fn requires(&self, name: &str) -> bool {
        match &self.kind {
            FieldKind::Object { required, .. } => required.iter().any(|r| r == name),
            _ => false,
        }
    }

    /// Whether the field at `path` is required by its parent object.
    pub fn is_required(&self, path: &FieldPath) -> bool {
        let Some((PathSegment::Key(last), parent)) = path.segments().split_last() else {
            return false;
        };
        let parent_path = FieldPath::root();
        let parent_path = parent.iter().fold(parent_path, |p, s| match s {
            PathSegment::Key(k) => p.child(k.clone()),
            PathSegment::Index(i) => p.index(*i),
        });
        self.lookup(&parent_path)
            .map(|node| node.requires(last))
            .unwrap_or(false)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::String { .. } | FieldKind::Number { .. } | FieldKind::Boolean | FieldKind::Enum { .. }
        )
    }
}

fn type_tag(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn as_usize(schema: &Value, key: &str) -> Option<usize> {
    schema.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

fn parse_kind(schema: &Value) -> FieldKind {
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        let options = values
            .iter()
            .map(|v| EnumOption {
                value: v.clone(),
                label: match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect();
        return FieldKind::Enum { options };
    }
    if let Some(one_of) = schema.get("oneOf").and_then(Value::as_array) {
        let options: Vec<EnumOption> = one_of
            .iter()
            .filter_map(|entry| {
                let value = entry.get("const")?.clone();
                let label = entry
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| match &value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                Some(EnumOption { value, label })
            })
            .collect();
        if !options.is_empty() && options.len() == one_of.len() {
            return FieldKind::Enum { options };
        }
    }

    let tag = type_tag(schema).or_else(|| schema.get("properties").map(|_| "object"));
    match tag {
        Some("string") => FieldKind::String {
            min_length: as_usize(schema, "minLength"),
            max_length: as_usize(schema, "maxLength"),
            format: schema.get("format").and_then(Value::as_str).map(str::to_string),
        },
        Some(t @ ("number" | "integer")) => FieldKind::Number {
            integer: t == "integer",
            minimum: schema.get("minimum").and_then(Value::as_f64),
            maximum: schema.get("maximum").and_then(Value::as_f64),
        },
        Some("boolean") => FieldKind::Boolean,
        Some("object") => {
            let properties = schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, node)| FieldNode::parse(Some(name), node))
                        .collect()
                })
                .unwrap_or_default();
            let required = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            FieldKind::Object { properties, required }
        }
        Some("array") => {
            let items = schema
                .get("items")
                .map(|items| FieldNode::parse(None, items))
                .unwrap_or_else(|| FieldNode {
                    name: None,
                    label: String::new(),
                    description: None,
                    kind: FieldKind::String {
                        min_length: None,
                        max_length: None,
                        format: None,
                    },
                });
            FieldKind::Array {
                items: Box::new(items),
                min_items: as_usize(schema, "minItems"),
                max_items: as_usize(schema, "maxItems"),
            }
        }
        Some(other) => FieldKind::Unsupported {
            type_name: other.to_string(),
        },
        None => FieldKind::Unsupported {
            type_name: "untyped".to_string(),
        },
    }
}

/// `firstName` and `first_name` both become `First Name`.
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Checks `data` against the schema tree rooted at `root`.
pub fn validate(root: &FieldNode, data: &FormData) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let value = data.to_value();
    validate_node(root, &FieldPath::root(), Some(&value), false, &mut issues);
    issues
}

fn issue(out: &mut Vec<ValidationIssue>, path: &FieldPath, message: impl Into<String>) {
    out.push(ValidationIssue {
        path: path.clone(),
        message: message.into(),
    });
}

fn validate_node(
    node: &FieldNode,
    path: &FieldPath,
    value: Option<&Value>,
    required: bool,
    out: &mut Vec<ValidationIssue>,
) {
    let value = match value {
        None | Some(Value::Null) => {
            if required {
                issue(out, path, "is a required property");
            }
            return;
        }
        Some(v) => v,
    };

    match &node.kind {
        FieldKind::String {
            min_length,
            max_length,
            ..
        } => {
            let Some(s) = value.as_str() else {
                return issue(out, path, "must be string");
            };
            let len = s.chars().count();
            if let Some(min) = min_length {
                if len < *min {
                    issue(out, path, format!("must NOT have fewer than {} characters", min));
                }
            }
            if let Some(max) = max_length {
                if len > *max {
                    issue(out, path, format!("must NOT have more than {} characters", max));
                }
            }
        }
        FieldKind::Number {
            integer,
            minimum,
            maximum,
        } => {
            let Some(n) = value.as_f64() else {
                return issue(out, path, if *integer { "must be integer" } else { "must be number" });
            };
            if *integer && n.fract() != 0.0 {
                issue(out, path, "must be integer");
            }
            if let Some(min) = minimum {
                if n < *min {
                    issue(out, path, format!("must be >= {}", min));
                }
            }
            if let Some(max) = maximum {
                if n > *max {
                    issue(out, path, format!("must be <= {}", max));
                }
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                issue(out, path, "must be boolean");
            }
        }
        FieldKind::Enum { options } => {
            if !options.iter().any(|o| &o.value == value) {
                issue(out, path, "must be equal to one of the allowed values");
            }
        }
        FieldKind::Object { properties, required } => {
            let Some(map) = value.as_object() else {
                return issue(out, path, "must be object");
            };
            for property in properties {
                let Some(name) = property.name.as_deref() else {
                    continue;
                };
                let is_required = required.iter().any(|r| r == name);
                validate_node(property, &path.child(name), map.get(name), is_required, out);
            }
        }
        FieldKind::Array {
            items,
            min_items,
            max_items,
        } => {
            let Some(list) = value.as_array() else {
                return issue(out, path, "must be array");
            };
            if let Some(min) = min_items {
                if list.len() < *min {
                    issue(out, path, format!("must NOT have fewer than {} items", min));
                }
            }
            if let Some(max) = max_items {
                if list.len() > *max {
                    issue(out, path, format!("must NOT have more than {} items", max));
                }
            }
            for (i, item) in list.iter().enumerate() {
                validate_node(items, &path.index(i), Some(item), false, out);
            }
        }
        FieldKind::Unsupported { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "firstName": { "type": "string", "minLength": 2 },
                "age": { "type": "integer", "minimum": 16, "maximum": 99 },
                "role": { "type": "string", "enum": ["Student", "Teacher"] },
                "subscribed": { "type": "boolean" },
                "address": {
                    "type": "object",
                    "properties": { "city": { "type": "string", "title": "Town" } },
                    "required": ["city"]
                },
                "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 2 }
            },
            "required": ["firstName"]
        })
    }

    #[test]
    fn parses_every_field_kind_in_schema_order() {
        let root = FieldNode::parse_root(&profile_schema()).unwrap();
        let FieldKind::Object { properties, required } = &root.kind else {
            panic!("root is an object");
        };
        let names: Vec<_> = properties.iter().map(|p| p.name.clone().unwrap()).collect();
        assert_eq!(names, ["firstName", "age", "role", "subscribed", "address", "tags"]);
        assert_eq!(required, &vec!["firstName".to_string()]);
        assert_eq!(properties[0].label, "First Name");
        assert!(matches!(properties[1].kind, FieldKind::Number { integer: true, .. }));
        assert!(matches!(&properties[2].kind, FieldKind::Enum { options } if options.len() == 2));
        assert_eq!(properties[3].kind, FieldKind::Boolean);
        assert!(matches!(properties[5].kind, FieldKind::Array { max_items: Some(2), .. }));
    }

    #[test]
    fn lookup_follows_nested_paths() {
        let root = FieldNode::parse_root(&profile_schema()).unwrap();
        let city = FieldPath::root().child("address").child("city");
        assert_eq!(root.lookup(&city).unwrap().label, "Town");
        assert!(root.is_required(&city));
        assert!(root.is_required(&FieldPath::root().child("firstName")));
        assert!(!root.is_required(&FieldPath::root().child("age")));
        assert!(root.lookup(&FieldPath::root().child("missing")).is_none());
        let tag = FieldPath::root().child("tags").index(0);
        assert!(root.lookup(&tag).unwrap().is_primitive());
    }

    #[test]
    fn non_object_root_is_a_parse_error() {
        let err = FieldNode::parse_root(&json!({ "type": "string" })).unwrap_err();
        assert!(matches!(err, FormError::Parse(_)));
        assert!(FieldNode::parse_root(&json!("nope")).is_err());
    }

    #[test]
    fn one_of_with_consts_is_an_enum() {
        let node = FieldNode::parse(
            Some("level"),
            &json!({ "oneOf": [{ "const": "jr", "title": "Junior" }, { "const": "sr", "title": "Senior" }] }),
        );
        let FieldKind::Enum { options } = node.kind else {
            panic!("expected enum");
        };
        assert_eq!(options[1].label, "Senior");
        assert_eq!(options[1].value, json!("sr"));
    }

    #[test]
    fn unknown_types_are_kept_as_unsupported() {
        let node = FieldNode::parse(Some("blob"), &json!({ "type": "binary" }));
        assert_eq!(
            node.kind,
            FieldKind::Unsupported {
                type_name: "binary".into()
            }
        );
    }

    #[test]
    fn validation_reports_constraint_violations() {
        let root = FieldNode::parse_root(&profile_schema()).unwrap();
        let data = FormData::from_value(json!({
            "age": 12,
            "role": "Janitor",
            "address": {},
            "tags": ["a", "b", "c"]
        }))
        .unwrap();
        let issues = validate(&root, &data);
        let messages: Vec<(String, String)> = issues
            .into_iter()
            .map(|i| (i.path.to_string(), i.message))
            .collect();
        assert!(messages.contains(&("firstName".into(), "is a required property".into())));
        assert!(messages.contains(&("age".into(), "must be >= 16".into())));
        assert!(messages.contains(&("role".into(), "must be equal to one of the allowed values".into())));
        assert!(messages.contains(&("address.city".into(), "is a required property".into())));
        assert!(messages.contains(&("tags".into(), "must NOT have more than 2 items".into())));
    }

    #[test]
    fn valid_data_has_no_issues() {
        let root = FieldNode::parse_root(&profile_schema()).unwrap();
        let data = FormData::from_value(json!({
            "firstName": "Alice",
            "age": 20,
            "address": { "city": "Lyon" }
        }))
        .unwrap();
        assert!(validate(&root, &data).is_empty());
    }

    #[test]
    fn humanize_splits_camel_and_snake_case() {
        assert_eq!(humanize("firstName"), "First Name");
        assert_eq!(humanize("hourly_rate"), "Hourly Rate");
        assert_eq!(humanize("email"), "Email");
    }
}
