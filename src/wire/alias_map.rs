use indexmap::IndexMap;

use crate::model::{StructuredQuery, TableRef};

/// Qualifier (alias and table name, lower-cased) -> table, built from FROM
/// and every JOIN before any field is resolved.
#[derive(Debug, Default, Clone)]
pub struct AliasMap {
    qualifiers: IndexMap<String, TableRef>,
    tables: Vec<TableRef>,
}

impl AliasMap {
    pub fn from_query(query: &StructuredQuery) -> Self {
        let mut map = Self::default();
        for table in query.from.iter().chain(query.joins.iter().map(|join| &join.right_object)) {
            map.insert(table);
        }
        map
    }

    fn insert(&mut self, table: &TableRef) {
        if let Some(alias) = &table.alias {
            self.qualifiers.entry(alias.to_lowercase()).or_insert_with(|| table.clone());
        }
        self.qualifiers.entry(table.name.to_lowercase()).or_insert_with(|| table.clone());
        self.tables.push(table.clone());
    }

    pub fn resolve(&self, qualifier: &str) -> Option<&TableRef> {
        self.qualifiers.get(&qualifier.trim().to_lowercase())
    }

    /// Tables in declaration order, FROM first.
    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    pub fn main_table(&self) -> Option<&TableRef> {
        self.tables.first()
    }
}
