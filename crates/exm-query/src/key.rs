//! Semantic query descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// Ordered list of JSON values identifying a cached query, e.g.
/// `["exams", {"goal_id": "g-1"}, {"page": 1, "page_size": 12}]`.
///
/// Equality is value equality. A key matches a prefix when its leading parts
/// equal the prefix parts, which is how invalidation targets families of
/// queries (`["exams"]` matches every exam list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<Value>);

impl QueryKey {
    /// Key with a single string root, e.g. `"goals"`.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self(vec![Value::String(name.to_string())])
    }

    #[must_use]
    pub fn from_parts(parts: Vec<Value>) -> Self {
        Self(parts)
    }

    /// Append a plain string or id part.
    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.0.push(Value::String(id.to_string()));
        self
    }

    /// Append any serializable part (filters, pagination).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Key`] if `part` cannot be represented as JSON.
    pub fn with<T: Serialize + ?Sized>(mut self, part: &T) -> Result<Self, QueryError> {
        let value = serde_json::to_value(part).map_err(|e| QueryError::Key(e.to_string()))?;
        self.0.push(value);
        Ok(self)
    }

    #[must_use]
    pub fn parts(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Stable map key: the compact JSON rendering with object fields sorted,
    /// so keys that compare equal always share a slot.
    pub(crate) fn hash_key(&self) -> String {
        Value::Array(self.0.iter().map(canonical).collect()).to_string()
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<_> = map.iter().collect();
            fields.sort_unstable_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                fields
                    .into_iter()
                    .map(|(name, field)| (name.clone(), canonical(field)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_as_compact_json() {
        let key = QueryKey::root("exams")
            .with(&json!({ "goal_id": "g-1" }))
            .unwrap()
            .with(&json!({ "page": 1, "page_size": 12 }))
            .unwrap();
        assert_eq!(
            key.to_string(),
            r#"["exams",{"goal_id":"g-1"},{"page":1,"page_size":12}]"#
        );
    }

    #[test]
    fn prefix_matching() {
        let list = QueryKey::root("exams").with(&json!({ "goal_id": "g-1" })).unwrap();
        assert!(list.starts_with(&QueryKey::root("exams")));
        assert!(list.starts_with(&list));
        assert!(!list.starts_with(&QueryKey::root("exam")));
        assert!(!QueryKey::root("exams").starts_with(&list));
    }

    #[test]
    fn equality_is_by_value() {
        let a = QueryKey::root("goal").id("g-1");
        let b = QueryKey::from_parts(vec![json!("goal"), json!("g-1")]);
        assert_eq!(a, b);
        assert_eq!(a.hash_key(), b.hash_key());
    }

    #[test]
    fn reordered_object_fields_share_a_slot() {
        let a = QueryKey::root("goals")
            .with(&json!({ "name": "math", "status": "doing" }))
            .unwrap();
        let b = QueryKey::from_parts(vec![
            json!("goals"),
            serde_json::from_str(r#"{"status":"doing","name":"math"}"#).unwrap(),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.hash_key(), b.hash_key());
        assert_eq!(a.hash_key(), r#"["goals",{"name":"math","status":"doing"}]"#);
    }

    #[test]
    fn round_trips_as_plain_array() {
        let key = QueryKey::root("question").id("q-1");
        let raw = serde_json::to_string(&key).unwrap();
        assert_eq!(raw, r#"["question","q-1"]"#);
        assert_eq!(serde_json::from_str::<QueryKey>(&raw).unwrap(), key);
    }
}
