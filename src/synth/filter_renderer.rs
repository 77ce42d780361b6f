use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{split_between, Conjunction, QueryFilter};

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?(\d+(\.\d*)?|\.\d+)$").unwrap());

/// One condition already in SQL form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCondition {
    pub text: String,
    pub conjunction: Conjunction,
    pub group_id: u32,
}

/// Renders filter lists back to WHERE/HAVING bodies.
pub struct FilterRenderer;

impl FilterRenderer {
    /// Joins filters with their stored conjunctions. Filters that render to
    /// nothing are skipped.
    pub fn render(filters: &[QueryFilter]) -> String {
        let conditions = filters
            .iter()
            .filter_map(|filter| {
                Self::render_filter(filter).map(|text| RenderedCondition {
                    text,
                    conjunction: filter.conjunction,
                    group_id: filter.group_id,
                })
            })
            .collect::<Vec<_>>();

        Self::join(&conditions)
    }

    /// The conjunction of the first condition is ignored; runs sharing a
    /// non-zero group id are wrapped in parentheses.
    pub fn join(conditions: &[RenderedCondition]) -> String {
        let mut out = String::new();
        for (i, condition) in conditions.iter().enumerate() {
            let previous_group = i.checked_sub(1).map(|p| conditions[p].group_id);
            let next_group = conditions.get(i + 1).map(|next| next.group_id);

            if i > 0 {
                out.push(' ');
                out.push_str(condition.conjunction.sql());
                out.push(' ');
            }
            if condition.group_id != 0 && previous_group != Some(condition.group_id) {
                out.push('(');
            }
            out.push_str(&condition.text);
            if condition.group_id != 0 && next_group != Some(condition.group_id) {
                out.push(')');
            }
        }

        out
    }

    /// One condition, or `None` when the filter has nothing to compare with.
    pub fn render_filter(filter: &QueryFilter) -> Option<String> {
        let field = filter.field_name.trim();
        let operator = filter.operator;

        if operator.is_null_test() {
            return Some(format!("{} {}", field, operator.sql()));
        }

        if filter.value.is_empty() {
            debug!(field, "skipping filter without value");
            return None;
        }

        if operator.is_list() {
            let items = filter.value.split(',').map(|item| Self::value_sql(filter, item.trim())).collect::<Vec<_>>();
            return Some(format!("{} {} ({})", field, operator.sql(), items.join(", ")));
        }

        if operator.is_range() {
            let Some((low, high)) = split_between(&filter.value) else {
                debug!(field, value = filter.value.as_str(), "skipping range filter without two bounds");
                return None;
            };
            return Some(format!("{} {} {} AND {}", field, operator.sql(), Self::value_sql(filter, low), Self::value_sql(filter, high)));
        }

        if operator.is_pattern() {
            let value = match filter.is_parameter() {
                true => filter.value.clone(),
                false => Self::quote_text(&operator.like_pattern(&filter.value)),
            };
            return Some(format!("{} {} {}", field, operator.sql(), value));
        }

        Some(format!("{} {} {}", field, operator.sql(), Self::value_sql(filter, &filter.value)))
    }

    /// A `@name` item of a parameter filter stays bare; anything else is a
    /// literal.
    fn value_sql(filter: &QueryFilter, value: &str) -> String {
        if filter.is_parameter() && value.starts_with('@') {
            return value.to_string();
        }
        Self::quote(value)
    }

    /// Quotes a literal unless it reads as a number. Numeric-looking text
    /// loses its quotes, so `'007'` comes back as `007`.
    pub fn quote(value: &str) -> String {
        if NUMERIC.is_match(value) {
            return value.to_string();
        }
        Self::quote_text(value)
    }

    fn quote_text(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}
