//! Schema-shaped form data and the paths that address into it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One step of a [`FieldPath`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Address of a field inside [`FormData`], e.g. `address.city` or `children[1].name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parses a UI schema scope such as `#/properties/address/properties/city`.
    ///
    /// Returns `None` for anything that is not a chain of `properties/<name>` pairs
    /// below `#`; those scopes cannot address a single data location.
    pub fn from_scope(scope: &str) -> Option<Self> {
        let mut parts = scope.trim().split('/');
        if parts.next()? != "#" {
            return None;
        }
        let mut segments = Vec::new();
        loop {
            match parts.next() {
                None => break,
                Some("") => continue,
                Some("properties") => {
                    let name = parts.next().filter(|n| !n.is_empty())?;
                    segments.push(PathSegment::Key(unescape_pointer(name)));
                }
                Some(_) => return None,
            }
        }
        Some(Self(segments))
    }

    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last object key on the path, used for default labels.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            PathSegment::Key(k) => Some(k.as_str()),
            PathSegment::Index(_) => None,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => write!(f, "{}", k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Form state. Its keys are whatever the active schema defines; it has no fixed field set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Map<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON object; any other value is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = match first {
            PathSegment::Key(k) => self.0.get(k)?,
            PathSegment::Index(_) => return None,
        };
        for segment in rest {
            current = match (segment, current) {
                (PathSegment::Key(k), Value::Object(map)) => map.get(k)?,
                (PathSegment::Index(i), Value::Array(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns a full copy of this data with `path` set to `value` (`None` removes it).
    ///
    /// Missing intermediate objects and arrays are created. Setting the root path
    /// replaces everything when `value` is an object and is otherwise ignored.
    pub fn with_value(&self, path: &FieldPath, value: Option<Value>) -> FormData {
        let mut next = self.clone();
        match path.segments().split_first() {
            None => {
                next = match value {
                    Some(Value::Object(map)) => FormData(map),
                    None => FormData::new(),
                    Some(_) => next,
                };
            }
            Some((PathSegment::Key(k), rest)) => set_in_map(&mut next.0, k, rest, value),
            Some((PathSegment::Index(_), _)) => {}
        }
        next
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn empty_container(next: Option<&PathSegment>) -> Value {
    match next {
        Some(PathSegment::Index(_)) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

fn set_in_map(map: &mut Map<String, Value>, key: &str, rest: &[PathSegment], value: Option<Value>) {
    if rest.is_empty() {
        match value {
            Some(v) => {
                map.insert(key.to_string(), v);
            }
            None => {
                map.remove(key);
            }
        }
        return;
    }
    if value.is_none() && !map.contains_key(key) {
        return;
    }
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| empty_container(rest.first()));
    set_in_value(slot, rest, value);
}

fn set_in_value(target: &mut Value, segments: &[PathSegment], value: Option<Value>) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    match first {
        PathSegment::Key(k) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                set_in_map(map, k, rest, value);
            }
        }
        PathSegment::Index(i) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            let Value::Array(items) = target else {
                return;
            };
            if rest.is_empty() {
                match value {
                    Some(v) => {
                        if *i >= items.len() {
                            items.resize(*i + 1, Value::Null);
                        }
                        items[*i] = v;
                    }
                    None => {
                        if *i < items.len() {
                            items.remove(*i);
                        }
                    }
                }
                return;
            }
            if *i >= items.len() {
                if value.is_none() {
                    return;
                }
                items.resize(*i + 1, Value::Null);
            }
            if items[*i].is_null() {
                items[*i] = empty_container(rest.first());
            }
            set_in_value(&mut items[*i], rest, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scope_parsing_accepts_nested_properties() {
        let path = FieldPath::from_scope("#/properties/address/properties/city").unwrap();
        assert_eq!(path, FieldPath::root().child("address").child("city"));
        assert_eq!(path.to_string(), "address.city");
        assert_eq!(FieldPath::from_scope("#"), Some(FieldPath::root()));
    }

    #[test]
    fn scope_parsing_rejects_non_property_chains() {
        assert_eq!(FieldPath::from_scope("#/definitions/thing"), None);
        assert_eq!(FieldPath::from_scope("/properties/name"), None);
        assert_eq!(FieldPath::from_scope("#/properties"), None);
        assert_eq!(FieldPath::from_scope("#/properties/list/items"), None);
    }

    #[test]
    fn with_value_creates_intermediate_containers() {
        let data = FormData::new();
        let path = FieldPath::root().child("children").index(1).child("name");
        let next = data.with_value(&path, Some(json!("Bea")));
        assert_eq!(
            next.to_value(),
            json!({ "children": [null, { "name": "Bea" }] })
        );
        assert_eq!(next.get(&path), Some(&json!("Bea")));
        assert!(data.is_empty());
    }

    #[test]
    fn clearing_a_value_removes_the_key() {
        let data = FormData::from_value(json!({ "name": "Alice", "age": 30 })).unwrap();
        let next = data.with_value(&FieldPath::root().child("name"), None);
        assert_eq!(next.to_value(), json!({ "age": 30 }));
    }

    #[test]
    fn clearing_a_missing_nested_value_leaves_data_alone() {
        let data = FormData::from_value(json!({ "age": 30 })).unwrap();
        let next = data.with_value(&FieldPath::root().child("address").child("city"), None);
        assert_eq!(next, data);
    }
}
