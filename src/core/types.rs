use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable document identifier, matching the record store's primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u64);

impl DocId {
    pub fn new(id: u64) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        DocId(id)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
        }
    }
}

/// A document entry as handed to the index writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new(id: DocId) -> Self {
        Document {
            id,
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .insert(name.to_string(), FieldValue::Text(value.into()));
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.as_text())
    }
}
