use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    schema::SchemaProvider,
    wire::{WireMapper, WireQuery},
    Config, EngineError,
};

/// Values bound to the `@name` parameters of a query, keyed by name
/// without the `@`.
pub type ParameterBindings = IndexMap<String, Value>;

/// Rows returned by the execution backend.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub rows: Vec<Value>,
    pub row_count: u64,
    pub execution_time_ms: u64,
    pub has_more: bool,
}

/// Statistics kept in history, without the rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub row_count: u64,
    pub execution_time_ms: u64,
    pub has_more: bool,
}

impl From<&ExecutionResult> for ExecutionStats {
    fn from(result: &ExecutionResult) -> Self {
        Self { row_count: result.row_count, execution_time_ms: result.execution_time_ms, has_more: result.has_more }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub saved_query_id: String,
    pub raw_sql: String,
    pub wire: WireQuery,
    pub stats: ExecutionStats,
}

/// Runs wire queries against the data source.
pub trait QueryExecutor {
    fn execute(&self, wire: &WireQuery, bindings: &ParameterBindings) -> Result<ExecutionResult, EngineError>;
}

/// Persists executed queries under an opaque saved-query id.
pub trait HistoryStore {
    fn record(&mut self, entry: HistoryEntry) -> Result<(), EngineError>;
}

/// Maps `sql` to its wire form, executes it and records the run.
pub fn run_sql(
    sql: &str,
    saved_query_id: &str,
    bindings: &ParameterBindings,
    config: &Config,
    schema: Option<&dyn SchemaProvider>,
    executor: &dyn QueryExecutor,
    history: &mut dyn HistoryStore,
) -> Result<ExecutionResult, EngineError> {
    let wire = WireMapper::new(config, schema).sql_to_json(sql);
    if wire.query_object_id.is_empty() {
        return Err(EngineError::MissingTable);
    }

    let result = executor.execute(&wire, bindings)?;
    debug!(saved_query_id, rows = result.row_count, ms = result.execution_time_ms, "query executed");

    history.record(HistoryEntry {
        saved_query_id: saved_query_id.to_string(),
        raw_sql: sql.to_string(),
        stats: ExecutionStats::from(&result),
        wire,
    })?;

    Ok(result)
}
