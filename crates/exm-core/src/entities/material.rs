//! Structured reading material attached to a question.
//!
//! The backend sends material as a JSON object whose keys are block labels
//! (`"paragraph_1"`, `"table"`, ...) in extraction order. Whether
//! `serde_json::Map` keeps insertion order depends on its `preserve_order`
//! feature, so the blocks are kept in a `Vec` and the map is (de)serialized
//! by hand.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered text blocks extracted from a source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Material {
    blocks: Vec<(String, String)>,
}

impl Material {
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Append a block, replacing the text of an existing label in place.
    pub fn insert(&mut self, label: impl Into<String>, text: impl Into<String>) {
        let label = label.into();
        let text = text.into();
        if let Some(slot) = self.blocks.iter_mut().find(|(l, _)| *l == label) {
            slot.1 = text;
        } else {
            self.blocks.push((label, text));
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Serialize for Material {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.blocks.len()))?;
        for (label, text) in &self.blocks {
            map.serialize_entry(label, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Material {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MaterialVisitor;

        impl<'de> Visitor<'de> for MaterialVisitor {
            type Value = Material;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of material block labels to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Material, A::Error> {
                let mut material = Material::new();
                while let Some((label, text)) = access.next_entry::<String, String>()? {
                    material.insert(label, text);
                }
                Ok(material)
            }
        }

        deserializer.deserialize_map(MaterialVisitor)
    }
}
