use tracing::debug;

use crate::{
    model::StructuredQuery,
    parser::{
        ast::{CollectionParser, FilterBuilder, GroupByParser, JoinParser, OrderByParser, ParameterParser},
        ClauseExtractor, Clauses, CommentStripper, SelectListParser,
    },
};

/// Raw SQL to [`StructuredQuery`]. Lenient: clauses that cannot be read come
/// back absent and unrecognized conditions are dropped.
pub struct StructuredParser;

impl StructuredParser {
    pub fn parse(sql: &str) -> StructuredQuery {
        let stripped = CommentStripper::strip(sql);
        let clauses = ClauseExtractor::extract(&stripped.text);

        let mut query = Self::from_clauses(&clauses);
        query.query_name = stripped.name.unwrap_or_default();

        let filters = query.where_filters().iter().chain(query.having_filters()).collect::<Vec<_>>();
        query.parameters = ParameterParser::parse(&stripped.text, &filters);

        debug!(
            fields = query.selected_fields.len(),
            aggregates = query.aggregates.len(),
            joins = query.joins.len(),
            where_filters = query.where_filters().len(),
            having_filters = query.having_filters().len(),
            "parsed statement"
        );

        query
    }

    fn from_clauses(clauses: &Clauses) -> StructuredQuery {
        let select = clauses.select.as_deref().map(SelectListParser::parse).unwrap_or_default();
        let from = clauses.from.as_deref().and_then(CollectionParser::parse);
        let joins = JoinParser::parse_chain(&clauses.joins, from.as_ref());

        StructuredQuery {
            distinct: clauses.distinct,
            top: clauses.top,
            selected_fields: select.fields,
            aggregates: select.aggregates,
            from,
            joins,
            where_clause: clauses.where_body.as_deref().and_then(FilterBuilder::build_where),
            group_by: clauses.group_by.as_deref().map(GroupByParser::parse).unwrap_or_default(),
            having: clauses.having.as_deref().and_then(FilterBuilder::build_having),
            sort: clauses.order_by.as_deref().map(OrderByParser::parse).unwrap_or_default(),
            pager: clauses.pager,
            ..Default::default()
        }
    }
}
