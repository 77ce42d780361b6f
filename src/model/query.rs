use serde::{Deserialize, Serialize};

use crate::model::{AggregateField, FilterClause, Join, Pager, QueryFilter, QueryParameter, SortField, TableRef};

/// Parsed, in-memory form of a SELECT statement. Built fresh on every parse.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub query_name: String,
    pub distinct: bool,
    pub top: Option<u64>,
    /// Plain SELECT entries in source order, duplicates kept.
    pub selected_fields: Vec<String>,
    pub aggregates: Vec<AggregateField>,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub where_clause: Option<FilterClause>,
    pub group_by: Vec<String>,
    pub having: Option<FilterClause>,
    pub sort: Vec<SortField>,
    pub pager: Option<Pager>,
    pub parameters: Vec<QueryParameter>,
}

impl StructuredQuery {
    /// Parses `sql` leniently; see [`crate::parser::StructuredParser`].
    pub fn parse(sql: &str) -> Self {
        crate::parser::StructuredParser::parse(sql)
    }

    /// Aggregate whose alias equals `name`, ignoring ASCII case.
    pub fn aggregate_by_alias(&self, name: &str) -> Option<&AggregateField> {
        self.aggregates.iter().find(|agg| agg.alias.eq_ignore_ascii_case(name))
    }

    /// All SELECT entries as SQL fragments, plain and aggregate re-interleaved
    /// by their original position.
    pub fn select_entries(&self) -> Vec<String> {
        let total = self.selected_fields.len() + self.aggregates.len();
        let mut plain = self.selected_fields.iter();
        let mut entries = Vec::with_capacity(total);
        for position in 0..total {
            match self.aggregates.iter().find(|agg| agg.position == position) {
                Some(agg) => entries.push(format!("{} AS {}", agg.expression(), agg.alias)),
                None => match plain.next() {
                    Some(field) => entries.push(field.clone()),
                    None => break,
                },
            }
        }
        // positions past the end (hand-built models) are appended in order
        for agg in self.aggregates.iter().filter(|agg| agg.position >= total) {
            entries.push(format!("{} AS {}", agg.expression(), agg.alias));
        }
        entries
    }

    pub fn where_filters(&self) -> &[QueryFilter] {
        self.where_clause.as_ref().map(|c| c.filters.as_slice()).unwrap_or(&[])
    }

    pub fn having_filters(&self) -> &[QueryFilter] {
        self.having.as_ref().map(|c| c.filters.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{AggregateField, StructuredQuery};

    #[test]
    pub fn test_select_entries_interleave() {
        let query = StructuredQuery {
            selected_fields: vec!["CustomerId".into(), "Region".into()],
            aggregates: vec![AggregateField {
                function: "COUNT".into(),
                argument: "*".into(),
                alias: "Total".into(),
                position: 1,
            }],
            ..Default::default()
        };

        assert_eq!(query.select_entries(), vec!["CustomerId", "COUNT(*) AS Total", "Region"]);
    }

    #[test]
    pub fn test_aggregate_by_alias() {
        let query = StructuredQuery {
            aggregates: vec![AggregateField {
                function: "SUM".into(),
                argument: "Amount".into(),
                alias: "Revenue".into(),
                position: 0,
            }],
            ..Default::default()
        };

        assert!(query.aggregate_by_alias("revenue").is_some());
        assert!(query.aggregate_by_alias("Amount").is_none());
    }
}
