use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    schema::{SchemaProvider, TableSchema},
    EngineError,
};

/// Table name -> [`TableSchema`], loaded from a JSON document shaped like
///
/// ```json
/// { "Employee": { "id": "tbl-1", "fields": { "Id": "fld-1", "Name": "fld-2" } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDirectory {
    pub tables: IndexMap<String, TableSchema>,
}

impl SchemaDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, schema: TableSchema) -> Option<TableSchema> {
        self.tables.insert(name.to_string(), schema)
    }

    /// `(name as declared, schema)` for `name`, ignoring ASCII case.
    pub fn table(&self, name: &str) -> Option<(&str, &TableSchema)> {
        if let Some((key, schema)) = self.tables.get_key_value(name) {
            return Some((key.as_str(), schema));
        }
        self.tables
            .iter()
            .find(|(table, _)| table.eq_ignore_ascii_case(name))
            .map(|(table, schema)| (table.as_str(), schema))
    }

    pub fn field_id(&self, table: &str, field: &str) -> Option<&str> {
        self.table(table).and_then(|(_, schema)| schema.field_id(field))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Merges the tables of `json_value` into the directory, replacing tables
    /// with the same name. Returns the number of tables read.
    pub fn load_from_json(&mut self, json_value: Value) -> Result<usize, EngineError> {
        let Value::Object(_) = json_value else {
            return Err(EngineError::SchemaLoad {
                path: "<json>".to_string(),
                reason: "document root is not a JSON object".to_string(),
            });
        };

        let loaded: IndexMap<String, TableSchema> =
            serde_json::from_value(json_value).map_err(EngineError::InvalidSchema)?;
        let count = loaded.len();
        self.tables.extend(loaded);

        Ok(count)
    }

    pub fn load_from_file(&mut self, file_path: &Path) -> Result<String, EngineError> {
        let path = file_path.to_string_lossy().to_string();

        let file_content = fs::read_to_string(file_path)
            .map_err(|err| EngineError::SchemaLoad { path: path.clone(), reason: err.to_string() })?;

        let json_value = serde_json::from_str::<Value>(&file_content).map_err(EngineError::InvalidSchema)?;

        let count = self.load_from_json(json_value).map_err(|err| match err {
            EngineError::SchemaLoad { reason, .. } => EngineError::SchemaLoad { path: path.clone(), reason },
            other => other,
        })?;

        Ok(format!("Loaded {} tables from {}", count, path))
    }
}

impl SchemaProvider for SchemaDirectory {
    fn schema_of(&self, table: &str) -> Option<TableSchema> {
        self.table(table).map(|(_, schema)| schema.clone())
    }

    fn field_by_id(&self, id: &str) -> Option<(String, String)> {
        self.tables.iter().find_map(|(table, schema)| {
            schema.field_name(id).map(|field| (table.clone(), field.to_string()))
        })
    }

    fn table_by_id(&self, id: &str) -> Option<String> {
        self.tables
            .iter()
            .find(|(_, schema)| schema.id.as_deref() == Some(id))
            .map(|(table, _)| table.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::Write};

    use serde_json::json;
    use tempfile::TempDir;

    use crate::{schema::{SchemaDirectory, SchemaProvider}, EngineError};

    fn sample() -> serde_json::Value {
        json!({
            "Employee": { "id": "tbl-emp", "fields": { "Id": "fld-1", "Name": "fld-2" } },
            "Department": { "fields": { "Id": "fld-3" } }
        })
    }

    #[test]
    pub fn test_load_from_json() {
        let mut directory = SchemaDirectory::new();
        let count = directory.load_from_json(sample()).expect("Failed to load schema");

        assert_eq!(count, 2);
        assert_eq!(directory.field_id("employee", "NAME"), Some("fld-2"));
        assert_eq!(directory.table("EMPLOYEE").map(|(name, _)| name), Some("Employee"));
        assert!(directory.field_id("Employee", "Salary").is_none());
    }

    #[test]
    pub fn test_reverse_lookup() {
        let mut directory = SchemaDirectory::new();
        directory.load_from_json(sample()).expect("Failed to load schema");

        assert_eq!(directory.field_by_id("fld-3"), Some(("Department".to_string(), "Id".to_string())));
        assert_eq!(directory.table_by_id("tbl-emp"), Some("Employee".to_string()));
        assert!(directory.table_by_id("nope").is_none());
    }

    #[test]
    pub fn test_load_from_json_rejects_array() {
        let mut directory = SchemaDirectory::new();
        let result = directory.load_from_json(json!([]));

        assert!(matches!(result, Err(EngineError::SchemaLoad { .. })));
    }

    #[test]
    pub fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("schema.json");
        let mut file = File::create(&file_path).expect("Failed to create schema file");
        file.write_all(sample().to_string().as_bytes()).expect("Failed to write schema file");

        let mut directory = SchemaDirectory::new();
        let message = directory.load_from_file(&file_path).expect("Failed to load schema file");

        assert!(message.contains("Loaded 2 tables"));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    pub fn test_load_from_file_errors() {
        let mut directory = SchemaDirectory::new();
        let missing = directory.load_from_file(std::path::Path::new("/path/that/does/not/exist.json"));
        assert!(matches!(missing, Err(EngineError::SchemaLoad { .. })));

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("invalid.json");
        let mut file = File::create(&file_path).expect("Failed to create schema file");
        file.write_all(b"{ invalid json content }").expect("Failed to write schema file");

        let invalid = directory.load_from_file(&file_path);
        assert!(matches!(invalid, Err(EngineError::InvalidSchema(_))));
        assert!(directory.is_empty());
    }
}
