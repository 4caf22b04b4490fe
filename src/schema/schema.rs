use serde::{Deserialize, Serialize};

pub const FIELD_DOC_ID: &str = "doc_id";
pub const FIELD_FILENAME: &str = "filename";
pub const FIELD_ORIGINAL_FILENAME: &str = "original_filename";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_UPLOAD_DATE: &str = "upload_date";
pub const FIELD_UPLOAD_DATE_ISO: &str = "upload_date_iso";
pub const FIELD_USER_ID: &str = "user_id";

/// How a field's value is treated at indexing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Run through the analyzer; searchable by analyzed terms
    Text,
    /// Indexed as a single exact-match token, no analysis
    Keyword,
    /// Stored for retrieval only, never searchable
    Stored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    pub stored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    pub fn add_field(mut self, name: &str, kind: FieldKind, stored: bool) -> Self {
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            kind,
            stored,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names searched by default, OR-grouped
    pub fn default_search_fields() -> [&'static str; 3] {
        [FIELD_CONTENT, FIELD_ORIGINAL_FILENAME, FIELD_FILENAME]
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed schema for uploaded documents
pub fn document_schema() -> Schema {
    Schema::new()
        .add_field(FIELD_DOC_ID, FieldKind::Keyword, true)
        .add_field(FIELD_FILENAME, FieldKind::Text, true)
        .add_field(FIELD_ORIGINAL_FILENAME, FieldKind::Text, true)
        .add_field(FIELD_CONTENT, FieldKind::Text, true)
        .add_field(FIELD_UPLOAD_DATE, FieldKind::Stored, true)
        .add_field(FIELD_UPLOAD_DATE_ISO, FieldKind::Stored, true)
        .add_field(FIELD_USER_ID, FieldKind::Keyword, true)
}
