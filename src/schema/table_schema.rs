use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Stable identifiers of one table and its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field name -> identifier, in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl TableSchema {
    pub fn new(id: Option<&str>) -> Self {
        Self { id: id.map(str::to_string), fields: IndexMap::new() }
    }

    pub fn with_field(mut self, name: &str, id: &str) -> Self {
        self.fields.insert(name.to_string(), id.to_string());
        self
    }

    /// Identifier of `name`, exact match first, then ignoring ASCII case.
    pub fn field_id(&self, name: &str) -> Option<&str> {
        if let Some(id) = self.fields.get(name) {
            return Some(id);
        }
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, id)| id.as_str())
    }

    /// Field name carrying identifier `id`.
    pub fn field_name(&self, id: &str) -> Option<&str> {
        self.fields.iter().find(|(_, field_id)| *field_id == id).map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::TableSchema;

    #[test]
    pub fn test_field_id_case_insensitive() {
        let schema = TableSchema::new(Some("t-1")).with_field("Name", "f-1").with_field("Salary", "f-2");

        assert_eq!(schema.field_id("Name"), Some("f-1"));
        assert_eq!(schema.field_id("salary"), Some("f-2"));
        assert_eq!(schema.field_id("Missing"), None);
        assert_eq!(schema.field_name("f-2"), Some("Salary"));
    }
}
