/// Errors surfaced by the engine's public entry points. Parsing itself never
/// fails; these cover synthesis from the wire format, schema and config
/// loading, and the backend collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A wire query without a table reference cannot produce a `FROM` clause.
    #[error("Query has no table reference to build FROM from")]
    MissingTable,
    #[error("Could not load schema from {path}: {reason}")]
    SchemaLoad { path: String, reason: String },
    #[error("Invalid schema document: {0}")]
    InvalidSchema(#[source] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[source] serde_json::Error),
    #[error("Invalid wire query: {0}")]
    InvalidWire(#[source] serde_json::Error),
    #[error("Backend failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use crate::EngineError;

    #[test]
    pub fn test_error_messages() {
        assert_eq!(EngineError::MissingTable.to_string(), "Query has no table reference to build FROM from");

        let err = EngineError::SchemaLoad { path: "s.json".into(), reason: "not found".into() };
        assert_eq!(err.to_string(), "Could not load schema from s.json: not found");
    }
}
