use tracing::debug;

use crate::{
    model::{Conjunction, FilterClause, QueryFilter},
    parser::{
        ast::{ConditionParser, FlatCondition, Predicate},
        Splitter,
    },
};

/// Builds the flat filter list of a WHERE or HAVING body.
pub struct FilterBuilder;

impl FilterBuilder {
    pub fn build_where(body: &str) -> Option<FilterClause> {
        FilterClause::non_empty(Self::filters(&Self::flat_conditions(body), false))
    }

    pub fn build_having(body: &str) -> Option<FilterClause> {
        FilterClause::non_empty(Self::filters(&Self::flat_conditions(body), true))
    }

    /// Leaf conditions of a boolean body. When the predicate tree cannot be
    /// built the body is split on top-level AND/OR instead, without groups.
    pub fn flat_conditions(body: &str) -> Vec<FlatCondition> {
        match Predicate::parse(body) {
            Ok(predicate) => predicate.flatten(),
            Err(err) => {
                debug!(%err, "falling back to flat condition split");
                let mut conjunction = Conjunction::And;
                Splitter::split_conditions(body)
                    .into_iter()
                    .map(|part| {
                        let condition = FlatCondition { text: part.text, conjunction, group_id: 0 };
                        conjunction = part.boundary.unwrap_or(Conjunction::And);
                        condition
                    })
                    .collect()
            }
        }
    }

    /// Parses each condition; unrecognized ones are dropped and the rest are
    /// numbered from 1.
    pub fn filters(conditions: &[FlatCondition], having: bool) -> Vec<QueryFilter> {
        let mut filters = Vec::with_capacity(conditions.len());

        for condition in conditions {
            let sequence = filters.len() as u32 + 1;
            let parsed = match having {
                true => ConditionParser::parse_having_condition(&condition.text, sequence, condition.group_id),
                false => ConditionParser::parse(&condition.text, sequence, condition.group_id),
            };
            match parsed {
                Some(filter) => filters.push(filter.with_conjunction(condition.conjunction)),
                None => debug!(condition = condition.text.as_str(), "dropping unrecognized condition"),
            }
        }

        filters
    }
}
