use tracing::debug;

use crate::{
    grid::{GridDeltas, GridFilter},
    model::{bare_field, AggregateField, Conjunction, QueryFilter},
    parser::{
        ast::{ConditionParser, FilterBuilder, FlatCondition, Predicate},
        ClauseExtractor, Clauses, CommentStripper, SelectList, SelectListParser,
    },
    synth::{FilterRenderer, RenderedCondition},
};

/// A leaf condition of the base statement, kept with its original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseCondition {
    pub condition: FlatCondition,
    /// Field the condition tests, when the condition could be read.
    pub field: Option<String>,
    /// The condition as a filter, when it could be read.
    pub filter: Option<QueryFilter>,
}

/// One-time parse of a frozen base statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBase {
    pub sql: String,
    pub name: Option<String>,
    pub clauses: Clauses,
    pub select: SelectList,
    pub where_conditions: Vec<BaseCondition>,
    pub having_conditions: Vec<BaseCondition>,
    /// Boolean structure of the WHERE body; `None` when it could not be parsed.
    pub where_tree: Option<Predicate>,
    pub having_tree: Option<Predicate>,
}

/// Base WHERE or HAVING text left after dropping replaced conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeptBody {
    text: String,
    top_level_or: bool,
}

impl ParsedBase {
    pub fn parse(sql: &str) -> Self {
        let stripped = CommentStripper::strip(sql);
        let clauses = ClauseExtractor::extract(&stripped.text);
        let select = clauses.select.as_deref().map(SelectListParser::parse).unwrap_or_default();

        let where_conditions = Self::conditions(clauses.where_body.as_deref(), false);
        let having_conditions = Self::conditions(clauses.having.as_deref(), true);
        let where_tree = clauses.where_body.as_deref().and_then(|body| Predicate::parse(body).ok());
        let having_tree = clauses.having.as_deref().and_then(|body| Predicate::parse(body).ok());

        debug!(
            where_conditions = where_conditions.len(),
            having_conditions = having_conditions.len(),
            aggregates = select.aggregates.len(),
            "parsed grid base statement"
        );

        Self {
            sql: sql.to_string(),
            name: stripped.name,
            clauses,
            select,
            where_conditions,
            having_conditions,
            where_tree,
            having_tree,
        }
    }

    fn conditions(body: Option<&str>, having: bool) -> Vec<BaseCondition> {
        let Some(body) = body else {
            return vec![];
        };

        FilterBuilder::flat_conditions(body)
            .into_iter()
            .map(|condition| {
                let filter = match having {
                    true => ConditionParser::parse_having_condition(&condition.text, 0, condition.group_id),
                    false => ConditionParser::parse(&condition.text, 0, condition.group_id),
                };
                BaseCondition { field: filter.as_ref().map(|f| f.field_name.clone()), filter, condition }
            })
            .collect()
    }

    /// Aggregate of the SELECT list whose alias is `field`.
    pub fn aggregate_for(&self, field: &str) -> Option<&AggregateField> {
        let field = field.trim();
        self.select.aggregates.iter().find(|agg| agg.alias.eq_ignore_ascii_case(field))
    }
}

fn same_field(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
        || bare_field(left.trim()).eq_ignore_ascii_case(bare_field(right.trim()))
}

/// Combines a [`ParsedBase`] with the live grid deltas.
pub struct GridMerger;

impl GridMerger {
    pub fn merge(base: &ParsedBase, deltas: &GridDeltas) -> String {
        let clauses = &base.clauses;
        let mut lines = vec![];

        if let Some(name) = &base.name {
            lines.push(format!("-- {}", name));
        }
        if let Some(select) = &clauses.select_raw {
            lines.push(format!("SELECT {}", select));
        }
        if let Some(from) = &clauses.from {
            lines.push(format!("FROM {}", from));
        }
        lines.extend(clauses.joins.iter().cloned());

        let (where_deltas, having_deltas) = Self::route(base, deltas);

        let where_body = Self::where_body(base, deltas, &where_deltas);
        if !where_body.is_empty() {
            lines.push(format!("WHERE {}", where_body));
        }

        match deltas.has_groups() {
            true => {
                let groups = deltas.groups().map(|g| g.field.trim().to_string()).collect::<Vec<_>>();
                lines.push(format!("GROUP BY {}", groups.join(", ")));
            }
            false => {
                if let Some(group_by) = &clauses.group_by {
                    lines.push(format!("GROUP BY {}", group_by));
                }
            }
        }

        let having_body = Self::having_body(base, &having_deltas);
        if !having_body.is_empty() {
            lines.push(format!("HAVING {}", having_body));
        }

        match deltas.has_sorts() {
            true => {
                let sorts = deltas
                    .sorts()
                    .map(|s| format!("{} {}", s.field.trim(), s.direction.sql()))
                    .collect::<Vec<_>>();
                lines.push(format!("ORDER BY {}", sorts.join(", ")));
            }
            false => {
                if let Some(order_by) = &clauses.order_by {
                    lines.push(format!("ORDER BY {}", order_by));
                }
            }
        }

        if let Some(limit) = &clauses.limit {
            lines.push(format!("LIMIT {}", limit));
        }

        lines.join("\n")
    }

    /// Delta filters as query filters, split into WHERE and HAVING. A filter
    /// on an aggregate alias tests the aggregate expression in HAVING.
    fn route(base: &ParsedBase, deltas: &GridDeltas) -> (Vec<QueryFilter>, Vec<QueryFilter>) {
        let mut where_filters = vec![];
        let mut having_filters = vec![];

        for GridFilter { field, operator, value } in deltas.filters() {
            match base.aggregate_for(field) {
                Some(agg) => having_filters.push(QueryFilter::new(agg.expression(), *operator, value.as_str())),
                None => where_filters.push(QueryFilter::new(field.trim(), *operator, value.as_str())),
            }
        }

        (where_filters, having_filters)
    }

    fn where_body(base: &ParsedBase, deltas: &GridDeltas, where_deltas: &[QueryFilter]) -> String {
        let replaced = |condition: &BaseCondition| match &condition.field {
            Some(field) => deltas.filters().any(|delta| same_field(field, &delta.field)),
            None => false,
        };
        let moved = |condition: &BaseCondition| match &condition.field {
            Some(field) => base.aggregate_for(field).is_some(),
            None => false,
        };

        let kept = Self::keep(base.where_tree.as_ref(), &base.where_conditions, |c| replaced(c) || moved(c));
        let additions = where_deltas.iter().filter_map(FilterRenderer::render_filter).collect();
        Self::combine(kept, additions)
    }

    fn having_body(base: &ParsedBase, having_deltas: &[QueryFilter]) -> String {
        let replaced = |condition: &BaseCondition| match &condition.field {
            Some(field) => having_deltas.iter().any(|delta| {
                same_field(field, &delta.field_name)
                    || base.aggregate_for(field).is_some_and(|agg| same_field(&agg.expression(), &delta.field_name))
            }),
            None => false,
        };
        let kept = Self::keep(base.having_tree.as_ref(), &base.having_conditions, replaced);
        let mut additions = vec![];

        // base WHERE conditions naming an aggregate alias, rewritten on the expression
        for condition in &base.where_conditions {
            let (Some(field), Some(filter)) = (&condition.field, &condition.filter) else {
                continue;
            };
            let Some(agg) = base.aggregate_for(field) else {
                continue;
            };
            if having_deltas.iter().any(|delta| same_field(&agg.expression(), &delta.field_name)) {
                continue;
            }
            let mut filter = filter.clone();
            filter.field_name = agg.expression();
            if let Some(text) = FilterRenderer::render_filter(&filter) {
                debug!(alias = agg.alias.as_str(), "routing aggregate alias condition to HAVING");
                additions.push(text);
            }
        }

        additions.extend(having_deltas.iter().filter_map(FilterRenderer::render_filter));
        Self::combine(kept, additions)
    }

    /// Base conditions that survive `dropped`, verbatim and with their
    /// parentheses. Without a tree the conditions are joined flat.
    fn keep(
        tree: Option<&Predicate>,
        conditions: &[BaseCondition],
        dropped: impl Fn(&BaseCondition) -> bool,
    ) -> Option<KeptBody> {
        let is_dropped = |text: &str| {
            let replaced = conditions.iter().find(|c| c.condition.text == text).is_some_and(&dropped);
            if replaced {
                debug!(condition = text, "replacing base condition");
            }
            replaced
        };

        if let Some(tree) = tree {
            let kept = tree.retain(&|text| !is_dropped(text))?;
            return Some(KeptBody { text: kept.sql(), top_level_or: matches!(kept, Predicate::Or(_)) });
        }

        let kept = conditions
            .iter()
            .filter(|base| !is_dropped(&base.condition.text))
            .map(|base| RenderedCondition {
                text: base.condition.text.clone(),
                conjunction: base.condition.conjunction,
                group_id: base.condition.group_id,
            })
            .collect::<Vec<_>>();
        if kept.is_empty() {
            return None;
        }

        let top_level_or = kept.iter().skip(1).any(|c| c.conjunction == Conjunction::Or);
        Some(KeptBody { text: FilterRenderer::join(&kept), top_level_or })
    }

    /// Surviving base text followed by the additions, all joined with AND. A
    /// base with a top-level OR is parenthesised first.
    fn combine(kept: Option<KeptBody>, additions: Vec<String>) -> String {
        let mut parts = vec![];

        if let Some(KeptBody { text, top_level_or }) = kept {
            match top_level_or && !additions.is_empty() {
                true => parts.push(format!("({})", text)),
                false => parts.push(text),
            }
        }

        parts.extend(additions);
        parts.join(" AND ")
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        grid::{GridDeltas, GridFilter, GridGroup, GridMerger, GridSort, ParsedBase},
        model::{OperatorCode, SortDirection},
    };

    fn merge(sql: &str, deltas: &GridDeltas) -> String {
        GridMerger::merge(&ParsedBase::parse(sql), deltas)
    }

    #[test]
    pub fn test_no_deltas_keeps_base() {
        let merged = merge(
            "-- Staff\nSELECT e.Id, e.Name FROM Employee e INNER JOIN Dept d ON e.DeptId = d.Id \
             WHERE e.Salary > 100 ORDER BY e.Name LIMIT 10",
            &GridDeltas::new(),
        );

        assert_eq!(
            merged,
            "-- Staff\nSELECT e.Id, e.Name\nFROM Employee e\nINNER JOIN Dept d ON e.DeptId = d.Id\n\
             WHERE e.Salary > 100\nORDER BY e.Name\nLIMIT 10"
        );
    }

    #[test]
    pub fn test_delta_replaces_base_condition() {
        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("Region", OperatorCode::EqualTo, "South"));

        let merged = merge("SELECT Id FROM Orders WHERE o.region = 'North' AND Amount > 5", &deltas);

        assert_eq!(merged, "SELECT Id\nFROM Orders\nWHERE Amount > 5 AND Region = 'South'");
    }

    #[test]
    pub fn test_top_level_or_is_parenthesised() {
        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("c", OperatorCode::GreaterThan, "3"));

        let merged = merge("SELECT a FROM t WHERE a = 1 OR b = 2", &deltas);

        assert_eq!(merged, "SELECT a\nFROM t\nWHERE (a = 1 OR b = 2) AND c > 3");
    }

    #[test]
    pub fn test_group_survives_dropped_first_member() {
        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("b", OperatorCode::EqualTo, "9"));

        let merged = merge("SELECT a FROM t WHERE a = 1 OR (b = 2 AND c = 3)", &deltas);

        assert_eq!(merged, "SELECT a\nFROM t\nWHERE (a = 1 OR (c = 3)) AND b = 9");
    }

    #[test]
    pub fn test_aggregate_alias_goes_to_having() {
        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("Total", OperatorCode::GreaterThan, "10"));
        deltas.set_filter(GridFilter::new("Region", OperatorCode::EqualTo, "North"));

        let merged = merge(
            "SELECT Region, COUNT(*) AS Total FROM Orders GROUP BY Region HAVING COUNT(*) > 5",
            &deltas,
        );

        assert_eq!(
            merged,
            "SELECT Region, COUNT(*) AS Total\nFROM Orders\nWHERE Region = 'North'\nGROUP BY Region\nHAVING COUNT(*) > 10"
        );
    }

    #[test]
    pub fn test_base_where_on_alias_moves_to_having() {
        let merged = merge(
            "SELECT Region, SUM(Amount) AS Revenue FROM Orders WHERE Revenue >= 100 AND Region = 'North' GROUP BY Region",
            &GridDeltas::new(),
        );

        assert_eq!(
            merged,
            "SELECT Region, SUM(Amount) AS Revenue\nFROM Orders\nWHERE Region = 'North'\nGROUP BY Region\nHAVING SUM(Amount) >= 100"
        );
    }

    #[test]
    pub fn test_sort_and_group_replace_wholesale() {
        let mut deltas = GridDeltas::new();
        deltas.set_sort(GridSort::new("Amount", SortDirection::Desc));
        deltas.set_sort(GridSort::new("Id", SortDirection::Asc));
        deltas.set_group(GridGroup::new("Region"));

        let merged = merge("SELECT Id FROM Orders GROUP BY Id ORDER BY Name", &deltas);

        assert_eq!(merged, "SELECT Id\nFROM Orders\nGROUP BY Region\nORDER BY Amount DESC, Id ASC");
    }

    #[test]
    pub fn test_merge_is_idempotent() {
        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("Region", OperatorCode::EqualTo, "North"));
        deltas.set_filter(GridFilter::new("Total", OperatorCode::GreaterThan, "3"));
        deltas.set_filter(GridFilter::new("Name", OperatorCode::Contains, "ann"));
        deltas.set_sort(GridSort::new("Total", SortDirection::Desc));

        let base = "-- By region\nSELECT Region, Name, COUNT(*) AS Total FROM Orders o \
                    WHERE Region = 'South' OR (Amount > 5 AND Name IS NOT NULL) \
                    GROUP BY Region, Name LIMIT 50";

        let once = merge(base, &deltas);
        let twice = merge(&once, &deltas);

        assert_eq!(once, twice);
    }

    #[test]
    pub fn test_nested_groups_keep_their_meaning() {
        let base = "SELECT a FROM t WHERE ((a = 1 OR b = 2) AND c = 3) OR d = 4";

        let merged = merge(base, &GridDeltas::new());
        assert_eq!(merged, "SELECT a\nFROM t\nWHERE ((a = 1 OR b = 2) AND c = 3) OR d = 4");

        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("c", OperatorCode::EqualTo, "5"));

        let once = merge(base, &deltas);
        assert_eq!(once, "SELECT a\nFROM t\nWHERE ((a = 1 OR b = 2) OR d = 4) AND c = 5");
        assert_eq!(merge(&once, &deltas), once);
    }

    #[test]
    pub fn test_unparsable_body_is_joined_flat() {
        let mut deltas = GridDeltas::new();
        deltas.set_filter(GridFilter::new("b", OperatorCode::EqualTo, "9"));

        let merged = merge("SELECT a FROM t WHERE a = 1 OR b = 2 OR c = 3 AND", &deltas);

        assert_eq!(merged, "SELECT a\nFROM t\nWHERE (a = 1 OR c = 3) AND b = 9");
    }
}
