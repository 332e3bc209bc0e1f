//! The generated form: data schema plus presentation layout, always together.

use crate::error::FormError;
use crate::schema::FieldNode;
use serde_json::Value;

/// A generated form description.
///
/// `schema` and `uischema` only ever exist as a pair; there is no way to build a
/// bundle from one without the other. The schema is parsed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaBundle {
    schema: Value,
    uischema: Value,
    root: FieldNode,
}

impl SchemaBundle {
    pub fn new(schema: Value, uischema: Value) -> Result<Self, FormError> {
        let root = FieldNode::parse_root(&schema)?;
        Ok(Self {
            schema,
            uischema,
            root,
        })
    }

    /// Parses the serialized `{ "schema": ..., "uischema": ... }` object returned by
    /// the generation service. Both keys must be present.
    pub fn from_form_structure(raw: &str) -> Result<Self, FormError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| FormError::Parse(format!("form structure is not valid JSON: {}", e)))?;
        let Value::Object(mut map) = value else {
            return Err(FormError::Parse("form structure must be a JSON object".into()));
        };
        let schema = map
            .remove("schema")
            .ok_or_else(|| FormError::Parse("form structure is missing \"schema\"".into()))?;
        let uischema = map
            .remove("uischema")
            .ok_or_else(|| FormError::Parse("form structure is missing \"uischema\"".into()))?;
        Self::new(schema, uischema)
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn uischema(&self) -> &Value {
        &self.uischema
    }

    /// Parsed schema tree; the root is always an object node.
    pub fn root(&self) -> &FieldNode {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_complete_form_structure() {
        let raw = json!({
            "schema": { "type": "object", "properties": { "name": { "type": "string" } } },
            "uischema": { "type": "VerticalLayout", "elements": [] }
        })
        .to_string();
        let bundle = SchemaBundle::from_form_structure(&raw).unwrap();
        assert_eq!(bundle.schema()["properties"]["name"]["type"], "string");
        assert_eq!(bundle.uischema()["type"], "VerticalLayout");
    }

    #[test]
    fn schema_without_uischema_is_rejected() {
        let raw = json!({ "schema": { "type": "object", "properties": {} } }).to_string();
        let err = SchemaBundle::from_form_structure(&raw).unwrap_err();
        assert_eq!(
            err,
            FormError::Parse("form structure is missing \"uischema\"".into())
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SchemaBundle::from_form_structure("{ not json").unwrap_err();
        assert!(matches!(err, FormError::Parse(m) if m.starts_with("form structure is not valid JSON")));
    }
}
