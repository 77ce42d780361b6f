use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::grid::{GridDeltas, GridMerger, ParsedBase};

pub type SharedGridSession = Arc<Mutex<GridSession>>;

/// Editor state for one grid: the frozen base statement, its cached parse,
/// and the text currently shown to the user.
///
/// Merges always start from the cached base, never from a previous merge
/// result. The cache is dropped by [`GridSession::invalidate`] and
/// [`GridSession::user_edited`]; the next merge then freezes whatever text
/// is current at that moment as the new base.
#[derive(Debug, Default, Clone)]
pub struct GridSession {
    base: Option<ParsedBase>,
    current_sql: String,
}

impl GridSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedGridSession {
        Arc::new(Mutex::new(self))
    }

    /// A new query was loaded: `sql` becomes both the base and the current text.
    pub fn load(&mut self, sql: &str) {
        if self.base_sql() == Some(sql) {
            debug!("base statement unchanged, keeping cached parse");
        } else {
            debug!("caching parse of new base statement");
            self.base = Some(ParsedBase::parse(sql));
        }
        self.current_sql = sql.to_string();
    }

    pub fn invalidate(&mut self) {
        if self.base.take().is_some() {
            debug!("grid base parse invalidated");
        }
    }

    /// The user changed the SQL text outside the grid.
    pub fn user_edited(&mut self, sql: &str) {
        self.invalidate();
        self.current_sql = sql.to_string();
    }

    pub fn base_sql(&self) -> Option<&str> {
        self.base.as_ref().map(|base| base.sql.as_str())
    }

    pub fn current_sql(&self) -> &str {
        &self.current_sql
    }

    /// Merged text for `deltas`. Does not change the current text.
    pub fn merge(&mut self, deltas: &GridDeltas) -> String {
        let current = &self.current_sql;
        let base = self.base.get_or_insert_with(|| {
            debug!("no cached base parse, freezing current text as base");
            ParsedBase::parse(current)
        });

        GridMerger::merge(base, deltas)
    }

    /// Merges and makes the result current. `None` when the merged text is
    /// what is already shown.
    pub fn apply(&mut self, deltas: &GridDeltas) -> Option<String> {
        let merged = self.merge(deltas);
        if merged == self.current_sql {
            debug!("merged statement unchanged, skipping");
            return None;
        }

        self.current_sql = merged.clone();
        Some(merged)
    }
}
