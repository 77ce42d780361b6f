pub mod table_schema;
pub use table_schema::*;

pub mod directory;
pub use directory::*;

pub mod placeholder;
pub use placeholder::*;

/// Source of table/field identifiers for the wire mapper.
pub trait SchemaProvider {
    /// Schema of `table`, matched case-insensitively.
    fn schema_of(&self, table: &str) -> Option<TableSchema>;

    /// `(table, field)` names behind a field identifier.
    fn field_by_id(&self, _id: &str) -> Option<(String, String)> {
        None
    }

    /// Table name behind a table identifier.
    fn table_by_id(&self, _id: &str) -> Option<String> {
        None
    }
}
