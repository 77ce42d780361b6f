use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{
    model::{FilterClause, Join, QueryFilter, SortField, StructuredQuery, TableRef},
    parser::SelectListParser,
    schema::{placeholder_id, SchemaProvider},
    synth::SqlSynthesizer,
    wire::{
        AliasMap, RawSqlField, Relationship, WireFilter, WireFilterClause, WireJoin, WirePager, WireQuery,
        WireReference, WireSort,
    },
    Config, EngineError, JoinStyle,
};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[\w\[\]"`]+(\.[\w\[\]"`]+)*$"#).unwrap());
static EXPLICIT_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)^(?P<expr>.+)\s+AS\s+(?P<alias>[\w\[\]"`]+)$"#).unwrap());
static IMPLICIT_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?P<expr>[\w.\[\]"`]+)\s+(?P<alias>[\w\[\]"`]+)$"#).unwrap());

/// [`StructuredQuery`] <-> [`WireQuery`], resolving names against an optional
/// schema. References the schema cannot resolve get deterministic
/// placeholder identifiers.
pub struct WireMapper<'a> {
    config: &'a Config,
    schema: Option<&'a dyn SchemaProvider>,
}

impl<'a> WireMapper<'a> {
    pub fn new(config: &'a Config, schema: Option<&'a dyn SchemaProvider>) -> Self {
        Self { config, schema }
    }

    pub fn sql_to_json(&self, sql: &str) -> WireQuery {
        self.to_wire(&StructuredQuery::parse(sql))
    }

    /// Fails only when the wire query names no table.
    pub fn json_to_sql(&self, wire: &WireQuery) -> Result<String, EngineError> {
        let query = self.to_structured(wire)?;
        Ok(SqlSynthesizer::new(self.config).render(&query))
    }

    pub fn to_wire(&self, query: &StructuredQuery) -> WireQuery {
        let mut resolver = Resolver::new(self, query);

        let query_object_id = query.from.as_ref().map(|from| resolver.table_id(from)).unwrap_or_default();

        let joins = query.joins.iter().map(|join| resolver.join(join)).collect::<Vec<_>>();

        let result_field_ids = query
            .selected_fields
            .iter()
            .map(|entry| {
                let (expression, alias) = split_alias(entry);
                let id = resolver.field_id(&expression);
                if let (Some(alias), Some(reference)) = (alias, resolver.references.get_mut(&id)) {
                    reference.alias.get_or_insert(alias);
                }
                id
            })
            .collect();

        let raw_sql_fields = query
            .aggregates
            .iter()
            .map(|aggregate| RawSqlField { data: aggregate.expression(), display_name: aggregate.alias.clone() })
            .collect();

        let where_clause = WireFilterClause {
            filters: query.where_filters().iter().map(|filter| resolver.filter(filter, false)).collect(),
        };
        let having_clause = WireFilterClause {
            filters: query.having_filters().iter().map(|filter| resolver.filter(filter, true)).collect(),
        };

        let group_by_fields = query.group_by.iter().map(|field| resolver.field_id(field)).collect();

        let sort = query
            .sort
            .iter()
            .enumerate()
            .map(|(i, sort)| WireSort {
                field_id: resolver.output_field_id(&sort.field_name),
                direction: sort.direction,
                sequence: i as u32 + 1,
            })
            .collect();

        WireQuery {
            query_object_id,
            result_field_ids,
            raw_sql_fields,
            group_by_fields,
            where_clause,
            having_clause,
            joins,
            sort,
            top_count: query.top,
            distinct: query.distinct.then_some(true),
            pager: query.pager.map(WirePager::from),
            query_name: query.query_name.clone(),
            references: resolver.references,
        }
    }

    pub fn to_structured(&self, wire: &WireQuery) -> Result<StructuredQuery, EngineError> {
        if wire.query_object_id.trim().is_empty() {
            return Err(EngineError::MissingTable);
        }

        let namer = Namer { mapper: self, wire, qualify: !wire.joins.is_empty() };
        let from = namer.table(&wire.query_object_id);

        let mut selected_fields = wire
            .result_field_ids
            .iter()
            .map(|id| match wire.references.get(id).and_then(|r| r.alias.as_deref()) {
                Some(alias) => format!("{} AS {}", namer.field(id), alias),
                None => namer.field(id),
            })
            .collect::<Vec<_>>();

        let mut aggregates = vec![];
        for raw in &wire.raw_sql_fields {
            let entry = match raw.display_name.trim() {
                "" => raw.data.clone(),
                alias if alias == raw.data.trim() => raw.data.clone(),
                alias => format!("{} AS {}", raw.data, alias),
            };
            let position = selected_fields.len() + aggregates.len();
            match SelectListParser::parse(&entry).aggregates.pop() {
                Some(mut aggregate) => {
                    aggregate.position = position;
                    aggregates.push(aggregate);
                }
                None => selected_fields.push(entry),
            }
        }

        let joins = wire
            .joins
            .iter()
            .map(|join| {
                let (target, left, right) = join.ids();
                Join {
                    join_type: join.join_type(),
                    right_object: namer.table(target),
                    left_field: namer.field(left),
                    right_field: namer.field(right),
                }
            })
            .collect();

        let mut sort = wire.sort.iter().collect::<Vec<_>>();
        sort.sort_by_key(|sort| sort.sequence);

        Ok(StructuredQuery {
            query_name: wire.query_name.clone(),
            distinct: wire.distinct.unwrap_or(false),
            top: wire.top_count,
            selected_fields,
            aggregates,
            from: Some(from),
            joins,
            where_clause: namer.filters(&wire.where_clause),
            group_by: wire.group_by_fields.iter().map(|id| namer.field(id)).collect(),
            having: namer.filters(&wire.having_clause),
            sort: sort.into_iter().map(|sort| SortField::new(namer.field(&sort.field_id), sort.direction)).collect(),
            pager: wire.pager.map(Into::into),
            parameters: vec![],
        })
    }

    fn placeholder(&self, table: &str, field: Option<&str>) -> String {
        placeholder_id(&self.config.placeholder_prefix, table, field)
    }
}

/// `sql_to_json` with the default configuration.
pub fn sql_to_json(sql: &str, schema: Option<&dyn SchemaProvider>) -> WireQuery {
    let config = Config::default();
    WireMapper::new(&config, schema).sql_to_json(sql)
}

/// `json_to_sql` with the default configuration and no schema.
pub fn json_to_sql(wire: &WireQuery) -> Result<String, EngineError> {
    let config = Config::default();
    WireMapper::new(&config, None).json_to_sql(wire)
}

/// SELECT entry without its alias, and the alias. An implicit alias is only
/// recognized after a plain column reference.
fn split_alias(entry: &str) -> (String, Option<String>) {
    let entry = entry.trim();
    for pattern in [&*EXPLICIT_ALIAS, &*IMPLICIT_ALIAS] {
        if let Some(caps) = pattern.captures(entry) {
            return (caps["expr"].trim().to_string(), Some(caps["alias"].to_string()));
        }
    }
    (entry.to_string(), None)
}

fn unbracket(name: &str) -> &str {
    name.trim().trim_matches(|c| matches!(c, '[' | ']' | '"' | '`'))
}

/// Field and table resolution for one `to_wire` call.
struct Resolver<'m, 'q> {
    mapper: &'m WireMapper<'m>,
    query: &'q StructuredQuery,
    aliases: AliasMap,
    references: IndexMap<String, WireReference>,
}

impl<'m, 'q> Resolver<'m, 'q> {
    fn new(mapper: &'m WireMapper<'m>, query: &'q StructuredQuery) -> Self {
        Self { mapper, query, aliases: AliasMap::from_query(query), references: IndexMap::new() }
    }

    fn table_id(&mut self, table: &TableRef) -> String {
        let name = unbracket(&table.name);
        let id = self
            .mapper
            .schema
            .and_then(|schema| schema.schema_of(name))
            .and_then(|schema| schema.id)
            .unwrap_or_else(|| self.mapper.placeholder(name, None));

        self.references.entry(id.clone()).or_insert_with(|| WireReference {
            table: table.name.clone(),
            field: None,
            alias: table.alias.clone(),
            source: None,
        });
        id
    }

    /// Identifier of a column reference. Unqualified names belong to the
    /// first table in scope whose schema knows them, else the FROM table.
    /// Expressions get a placeholder keyed by their text.
    fn field_id(&mut self, text: &str) -> String {
        let text = text.trim();
        let main_table = self.aliases.main_table().map(|table| table.name.clone()).unwrap_or_default();

        if !IDENTIFIER.is_match(text) {
            let id = self.mapper.placeholder(&main_table, Some(text));
            self.references.entry(id.clone()).or_insert_with(|| WireReference {
                table: main_table,
                field: None,
                alias: None,
                source: Some(text.to_string()),
            });
            return id;
        }

        let (table, field) = match text.rsplit_once('.') {
            Some((qualifier, field)) => {
                let table = self
                    .aliases
                    .resolve(qualifier)
                    .map(|table| table.name.clone())
                    .unwrap_or_else(|| qualifier.to_string());
                (table, field)
            }
            None => (self.owner_of(text).unwrap_or(main_table), text),
        };

        let id = self
            .mapper
            .schema
            .and_then(|schema| schema.schema_of(unbracket(&table)))
            .and_then(|schema| schema.field_id(unbracket(field)).map(str::to_string))
            .unwrap_or_else(|| self.mapper.placeholder(unbracket(&table), Some(unbracket(field))));

        self.references.entry(id.clone()).or_insert_with(|| WireReference {
            table,
            field: Some(field.to_string()),
            alias: None,
            source: Some(text.to_string()),
        });
        id
    }

    fn owner_of(&self, field: &str) -> Option<String> {
        let schema = self.mapper.schema?;
        self.aliases
            .tables()
            .iter()
            .find(|table| {
                schema
                    .schema_of(unbracket(&table.name))
                    .is_some_and(|schema| schema.field_id(unbracket(field)).is_some())
            })
            .map(|table| table.name.clone())
    }

    /// Aggregate calls and aggregate aliases pass through verbatim.
    fn output_field_id(&mut self, text: &str) -> String {
        let text = text.trim();
        if text.contains('(') || self.query.aggregate_by_alias(text).is_some() {
            return text.to_string();
        }
        self.field_id(text)
    }

    fn filter(&mut self, filter: &QueryFilter, having: bool) -> WireFilter {
        let field_id = match having {
            true => self.output_field_id(&filter.field_name),
            false => self.field_id(&filter.field_name),
        };

        WireFilter {
            field_id,
            field_name: filter.field_name.clone(),
            operator: filter.operator,
            value: filter.value.clone(),
            value_type: filter.value_type,
            conjunction: filter.conjunction,
            group_id: filter.group_id,
            sequence: filter.sequence,
        }
    }

    fn join(&mut self, join: &Join) -> WireJoin {
        let target_table = self.table_id(&join.right_object);
        let source = join
            .left_field
            .rsplit_once('.')
            .and_then(|(qualifier, _)| self.aliases.resolve(qualifier).cloned())
            .or_else(|| self.aliases.main_table().cloned());
        let source_table = source.map(|table| self.table_id(&table)).unwrap_or_default();
        let source_field = self.field_id(&join.left_field);
        let target_field = self.field_id(&join.right_field);

        match self.mapper.config.join_style {
            JoinStyle::Relationship => WireJoin::Relationship {
                join_type: join.join_type,
                relationship: Relationship { source_table, source_field, target_table, target_field },
            },
            JoinStyle::Legacy => WireJoin::Legacy {
                join_type: join.join_type,
                right_object_id: target_table,
                left_field_id: source_field,
                right_field_id: target_field,
            },
        }
    }
}

/// Name lookup for `to_structured`: wire references first, then the
/// schema's reverse lookup, then the identifier itself.
struct Namer<'m, 'w> {
    mapper: &'m WireMapper<'m>,
    wire: &'w WireQuery,
    qualify: bool,
}

impl Namer<'_, '_> {
    fn table(&self, id: &str) -> TableRef {
        if let Some(reference) = self.wire.references.get(id) {
            return TableRef::new(reference.table.clone(), reference.alias.clone());
        }
        let name = self.mapper.schema.and_then(|schema| schema.table_by_id(id));
        TableRef::new(name.unwrap_or_else(|| id.to_string()), None)
    }

    fn field(&self, id: &str) -> String {
        if let Some(reference) = self.wire.references.get(id) {
            if let Some(source) = &reference.source {
                return source.clone();
            }
            if let Some(field) = &reference.field {
                return self.qualified(&reference.table, field);
            }
        }

        match self.mapper.schema.and_then(|schema| schema.field_by_id(id)) {
            Some((table, field)) => self.qualified(&table, &field),
            None => {
                debug!(id, "no name for identifier, using it verbatim");
                id.to_string()
            }
        }
    }

    /// Qualifies with the table's alias (or name) when the query joins.
    fn qualified(&self, table: &str, field: &str) -> String {
        if !self.qualify || table.is_empty() {
            return field.to_string();
        }
        let qualifier = self
            .wire
            .references
            .values()
            .find(|reference| reference.field.is_none() && reference.table.eq_ignore_ascii_case(table))
            .and_then(|reference| reference.alias.clone())
            .unwrap_or_else(|| table.to_string());
        format!("{}.{}", qualifier, field)
    }

    fn filters(&self, clause: &WireFilterClause) -> Option<FilterClause> {
        let mut filters = clause.filters.iter().collect::<Vec<_>>();
        filters.sort_by_key(|filter| filter.sequence);

        let filters = filters
            .into_iter()
            .map(|wire| {
                let field_name = match wire.field_name.trim() {
                    "" => self.field(&wire.field_id),
                    name => name.to_string(),
                };
                let mut filter = QueryFilter::new(field_name, wire.operator, wire.value.clone())
                    .with_conjunction(wire.conjunction)
                    .with_group(wire.group_id);
                filter.value_type = wire.value_type;
                filter
            })
            .collect();

        FilterClause::non_empty(filters)
    }
}
