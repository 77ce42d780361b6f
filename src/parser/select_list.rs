use once_cell::sync::Lazy;
use regex::Regex;

use crate::{model::AggregateField, parser::Splitter};

static AGGREGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)^(?P<function>COUNT|SUM|AVG|MAX|MIN|GROUP_CONCAT|STRING_AGG|ARRAY_AGG)\s*\((?P<argument>.*)\)(?:\s+(?:AS\s+)?(?P<alias>[\w\[\]"`]+))?$"#,
    )
    .unwrap()
});

/// SELECT list split into plain entries and aggregate calls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectList {
    pub fields: Vec<String>,
    pub aggregates: Vec<AggregateField>,
}

pub struct SelectListParser;

impl SelectListParser {
    /// Plain entries are kept exactly as written, aliases included. An entry
    /// is an aggregate only when the whole entry is one call of a known
    /// aggregate function, optionally followed by an alias.
    pub fn parse(text: &str) -> SelectList {
        let mut list = SelectList::default();

        for (position, entry) in Splitter::split_commas(text).into_iter().enumerate() {
            match Self::aggregate(&entry, position) {
                Some(aggregate) => list.aggregates.push(aggregate),
                None => list.fields.push(entry),
            }
        }

        list
    }

    fn aggregate(entry: &str, position: usize) -> Option<AggregateField> {
        let caps = AGGREGATE.captures(entry)?;
        let argument = caps["argument"].trim();
        if !Self::balanced(argument) {
            // `SUM(a) + SUM(b)` and friends stay plain entries
            return None;
        }

        let function = caps["function"].to_uppercase();
        let alias = caps
            .name("alias")
            .map(|alias| alias.as_str().to_string())
            .unwrap_or_else(|| AggregateField::generated_alias(&function, argument));

        Some(AggregateField { function, argument: argument.to_string(), alias, position })
    }

    fn balanced(text: &str) -> bool {
        let mut depth = 0i32;
        let mut quote: Option<char> = None;
        for ch in text.chars() {
            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) => {}
                None => match ch {
                    '\'' | '"' => quote = Some(ch),
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth < 0 {
                            return false;
                        }
                    }
                    _ => {}
                },
            }
        }
        depth == 0 && quote.is_none()
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::SelectListParser;

    #[test]
    pub fn test_plain_fields_keep_order_and_duplicates() {
        let list = SelectListParser::parse("Id, e.Name, Id, Salary * 2 AS Doubled");

        assert_eq!(list.fields, vec!["Id", "e.Name", "Id", "Salary * 2 AS Doubled"]);
        assert!(list.aggregates.is_empty());
    }

    #[test]
    pub fn test_aggregate_aliases() {
        let list = SelectListParser::parse("CustomerId, COUNT(*) AS Total, sum(o.Amount) Revenue, AVG(Price)");

        assert_eq!(list.fields, vec!["CustomerId"]);
        assert_eq!(list.aggregates.len(), 3);

        assert_eq!(list.aggregates[0].alias, "Total");
        assert_eq!(list.aggregates[0].expression(), "COUNT(*)");
        assert_eq!(list.aggregates[0].position, 1);

        assert_eq!(list.aggregates[1].function, "SUM");
        assert_eq!(list.aggregates[1].argument, "o.Amount");
        assert_eq!(list.aggregates[1].alias, "Revenue");

        assert_eq!(list.aggregates[2].alias, "avg_Price");
        assert_eq!(list.aggregates[2].position, 3);
    }

    #[test]
    pub fn test_compound_expression_is_plain() {
        let list = SelectListParser::parse("SUM(a) + SUM(b) AS Both, COUNTRY");

        assert_eq!(list.fields, vec!["SUM(a) + SUM(b) AS Both", "COUNTRY"]);
        assert!(list.aggregates.is_empty());
    }

    #[test]
    pub fn test_nested_call_argument() {
        let list = SelectListParser::parse("MAX(COALESCE(a, 0)) AS Top");

        assert_eq!(list.aggregates[0].argument, "COALESCE(a, 0)");
        assert_eq!(list.aggregates[0].alias, "Top");
    }
}
