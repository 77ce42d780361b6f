use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    model::{Conjunction, FilterValueType, JoinType, OperatorCode, Pager, SortDirection},
    EngineError,
};

/// Query object exchanged with the execution backend.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireQuery {
    #[serde(rename = "QueryObjectID", default)]
    pub query_object_id: String,
    #[serde(rename = "ResultField_AppfieldIds", default)]
    pub result_field_ids: Vec<String>,
    #[serde(rename = "RawSQL_AppfieldIds", default)]
    pub raw_sql_fields: Vec<RawSqlField>,
    #[serde(rename = "GroupByFields", default)]
    pub group_by_fields: Vec<String>,
    #[serde(rename = "WhereClause", default)]
    pub where_clause: WireFilterClause,
    #[serde(rename = "HavingClause", default)]
    pub having_clause: WireFilterClause,
    #[serde(rename = "Joins", default)]
    pub joins: Vec<WireJoin>,
    #[serde(rename = "Sort", default)]
    pub sort: Vec<WireSort>,
    #[serde(rename = "TopCount", default, skip_serializing_if = "Option::is_none")]
    pub top_count: Option<u64>,
    #[serde(rename = "Distinct", default, skip_serializing_if = "Option::is_none")]
    pub distinct: Option<bool>,
    #[serde(rename = "Pager", default, skip_serializing_if = "Option::is_none")]
    pub pager: Option<WirePager>,
    #[serde(rename = "QueryName", default, skip_serializing_if = "String::is_empty")]
    pub query_name: String,
    /// Identifier -> names it was resolved from, so the query can be turned
    /// back into SQL without a schema.
    #[serde(rename = "References", default, skip_serializing_if = "IndexMap::is_empty")]
    pub references: IndexMap<String, WireReference>,
}

impl WireQuery {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(EngineError::InvalidWire)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, EngineError> {
        serde_json::from_value(value).map_err(EngineError::InvalidWire)
    }

    pub fn to_value(&self) -> serde_json::Value {
        // every field serializes to plain JSON
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Aggregate (or other computed) SELECT entry.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSqlField {
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
}

/// Serializes as `{}` when there are no filters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFilterClause {
    #[serde(rename = "Filters", default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<WireFilter>,
}

impl WireFilterClause {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFilter {
    #[serde(rename = "FieldID")]
    pub field_id: String,
    #[serde(rename = "FieldName", default, skip_serializing_if = "String::is_empty")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: OperatorCode,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "ValueType", default)]
    pub value_type: FilterValueType,
    #[serde(rename = "Conjunction", default)]
    pub conjunction: Conjunction,
    #[serde(rename = "GroupID", default)]
    pub group_id: u32,
    #[serde(rename = "Sequence", default)]
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSort {
    #[serde(rename = "FieldID")]
    pub field_id: String,
    #[serde(rename = "SortSequence", default)]
    pub direction: SortDirection,
    #[serde(rename = "Sequence", default)]
    pub sequence: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePager {
    #[serde(rename = "PageSize")]
    pub page_size: u64,
    #[serde(rename = "PageNumber")]
    pub page_number: u64,
}

impl From<Pager> for WirePager {
    fn from(pager: Pager) -> Self {
        Self { page_size: pager.page_size, page_number: pager.page_number }
    }
}

impl From<WirePager> for Pager {
    fn from(pager: WirePager) -> Self {
        Pager::new(pager.page_size, pager.page_number)
    }
}

/// Join in either of the two shapes backends expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireJoin {
    Relationship {
        #[serde(rename = "JoinType")]
        join_type: JoinType,
        #[serde(rename = "Relationship")]
        relationship: Relationship,
    },
    Legacy {
        #[serde(rename = "JoinType")]
        join_type: JoinType,
        #[serde(rename = "RightObjectID")]
        right_object_id: String,
        #[serde(rename = "LeftFieldID")]
        left_field_id: String,
        #[serde(rename = "RightFieldID")]
        right_field_id: String,
    },
}

impl WireJoin {
    pub fn join_type(&self) -> JoinType {
        match self {
            WireJoin::Relationship { join_type, .. } | WireJoin::Legacy { join_type, .. } => *join_type,
        }
    }

    /// `(target table, left field, right field)` identifiers.
    pub fn ids(&self) -> (&str, &str, &str) {
        match self {
            WireJoin::Relationship { relationship, .. } => (
                relationship.target_table.as_str(),
                relationship.source_field.as_str(),
                relationship.target_field.as_str(),
            ),
            WireJoin::Legacy { right_object_id, left_field_id, right_field_id, .. } => {
                (right_object_id.as_str(), left_field_id.as_str(), right_field_id.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source_table: String,
    pub source_field: String,
    pub target_table: String,
    pub target_field: String,
}

/// Names behind one identifier of a [`WireQuery`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireReference {
    #[serde(rename = "Table")]
    pub table: String,
    #[serde(rename = "Field", default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Table alias, or the display alias of a SELECT entry.
    #[serde(rename = "Alias", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Reference exactly as written in SQL (`e.Name`).
    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        model::{Conjunction, JoinType, OperatorCode},
        wire::{Relationship, WireFilter, WireFilterClause, WireJoin, WireQuery},
    };

    #[test]
    pub fn test_empty_clauses_serialize_as_empty_object() {
        let wire = WireQuery { query_object_id: "t-1".into(), ..Default::default() };
        let value = wire.to_value();

        assert_eq!(value["WhereClause"], json!({}));
        assert_eq!(value["HavingClause"], json!({}));
        assert!(value.get("TopCount").is_none());
        assert!(value.get("References").is_none());
    }

    #[test]
    pub fn test_filters_serialize_with_codes() {
        let wire = WireQuery {
            where_clause: WireFilterClause {
                filters: vec![WireFilter {
                    field_id: "f-1".into(),
                    field_name: "Salary".into(),
                    operator: OperatorCode::GreaterThan,
                    value: "50000".into(),
                    value_type: Default::default(),
                    conjunction: Conjunction::Or,
                    group_id: 0,
                    sequence: 1,
                }],
            },
            ..Default::default()
        };

        assert_eq!(
            wire.to_value()["WhereClause"],
            json!({"Filters": [{
                "FieldID": "f-1", "FieldName": "Salary", "Operator": 1, "Value": "50000",
                "ValueType": 0, "Conjunction": 2, "GroupID": 0, "Sequence": 1
            }]})
        );
    }

    #[test]
    pub fn test_accepts_both_join_shapes() {
        let wire = WireQuery::from_value(json!({
            "QueryObjectID": "t-1",
            "WhereClause": {},
            "Joins": [
                {"JoinType": 2, "Relationship": {
                    "sourceTable": "t-1", "sourceField": "f-1", "targetTable": "t-2", "targetField": "f-2"
                }},
                {"JoinType": 1, "RightObjectID": "t-3", "LeftFieldID": "f-3", "RightFieldID": "f-4"}
            ]
        }))
        .expect("Failed to read wire query");

        assert_eq!(wire.joins.len(), 2);
        assert!(matches!(&wire.joins[0], WireJoin::Relationship { relationship: Relationship { target_table, .. }, .. } if target_table == "t-2"));
        assert_eq!(wire.joins[0].join_type(), JoinType::Left);
        assert_eq!(wire.joins[1].ids(), ("t-3", "f-3", "f-4"));
        assert!(wire.having_clause.is_empty());
    }

    #[test]
    pub fn test_rejects_invalid_operator() {
        let result = WireQuery::from_value(json!({
            "QueryObjectID": "t-1",
            "WhereClause": {"Filters": [{"FieldID": "f", "Operator": 21, "Value": "x"}]}
        }));

        assert!(result.is_err());
    }
}
