use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    model::{is_aggregate_function, join_between, FilterValueType, OperatorCode, QueryFilter},
    parser::Splitter,
};

/// Field position: a function call with a flat argument list, or a
/// (possibly qualified, bracketed or quoted) column reference.
const FIELD: &str = r#"(?P<field>[A-Za-z_]\w*\s*\([^()]*\)|[\w.\[\]"`]+)"#;

static IS_NULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^{FIELD}\s+IS\s+(?P<not>NOT\s+)?NULL$")).unwrap());
static IN_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^{FIELD}\s+(?P<not>NOT\s+)?IN\s*\((?P<list>.*)\)$")).unwrap());
static BETWEEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^{FIELD}\s+(?P<not>NOT\s+)?BETWEEN\s+(?P<low>.+?)\s+AND\s+(?P<high>.+)$")).unwrap()
});
static LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^{FIELD}\s+(?P<not>NOT\s+)?LIKE\s+(?P<value>.+)$")).unwrap());
static COMPARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^{FIELD}\s*(?P<op><>|!=|>=|<=|=|>|<)\s*(?P<value>.+)$")).unwrap());

static DANGLING_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+(AND|OR)\s*$").unwrap());
static DANGLING_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(AND|OR)\s+").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[\w.\[\]"`]+$"#).unwrap());

/// Turns one isolated condition into a [`QueryFilter`].
///
/// Patterns are tried in a fixed order, first match wins: `IS [NOT] NULL`,
/// `[NOT] IN (...)`, `[NOT] BETWEEN .. AND ..`, `[NOT] LIKE`, then a plain
/// comparison. Anything else yields `None`.
pub struct ConditionParser;

impl ConditionParser {
    /// WHERE flavour: a function call in field position is reduced to the
    /// column it wraps (`UPPER(Name)` -> `Name`).
    pub fn parse(text: &str, sequence: u32, group_id: u32) -> Option<QueryFilter> {
        Self::parse_with(text, sequence, group_id, false)
    }

    /// HAVING flavour: an aggregate call in field position is kept whole as
    /// the field name (`SUM(Amount)`).
    pub fn parse_having_condition(text: &str, sequence: u32, group_id: u32) -> Option<QueryFilter> {
        Self::parse_with(text, sequence, group_id, true)
    }

    fn parse_with(text: &str, sequence: u32, group_id: u32, aggregate_aware: bool) -> Option<QueryFilter> {
        let text = Self::clean(text);
        if text.is_empty() {
            return None;
        }

        let (field, operator, value, value_type) = Self::match_condition(&text)?;
        let field = Self::resolve_field(&field, aggregate_aware)?;

        Some(
            QueryFilter::new(field, operator, value)
                .with_value_type(value_type)
                .with_group(group_id)
                .with_sequence(sequence),
        )
    }

    fn match_condition(text: &str) -> Option<(String, OperatorCode, String, FilterValueType)> {
        if let Some(caps) = IS_NULL.captures(text) {
            let operator = if Self::negated(&caps) { OperatorCode::IsNotNull } else { OperatorCode::IsNull };
            return Some((caps["field"].to_string(), operator, String::new(), FilterValueType::Literal));
        }

        if let Some(caps) = IN_LIST.captures(text) {
            let operator = if Self::negated(&caps) { OperatorCode::NotIn } else { OperatorCode::In };
            let raw_items = Splitter::split_commas(&caps["list"]);
            let value_type = Self::value_type(raw_items.iter().map(String::as_str));
            let items = raw_items.iter().map(|item| Self::unquote(item)).collect::<Vec<_>>().join(",");
            return Some((caps["field"].to_string(), operator, items, value_type));
        }

        if let Some(caps) = BETWEEN.captures(text) {
            let operator = if Self::negated(&caps) { OperatorCode::NotBetween } else { OperatorCode::Between };
            let value_type = Self::value_type([&caps["low"], &caps["high"]]);
            let value = join_between(&Self::unquote(&caps["low"]), &Self::unquote(&caps["high"]));
            return Some((caps["field"].to_string(), operator, value, value_type));
        }

        if let Some(caps) = LIKE.captures(text) {
            let value_type = Self::value_type([&caps["value"]]);
            let pattern = Self::unquote(&caps["value"]);
            let operator = OperatorCode::classify_like(&pattern, Self::negated(&caps));
            let value = match value_type {
                FilterValueType::Parameter => pattern,
                FilterValueType::Literal => pattern.trim_matches('%').to_string(),
            };
            return Some((caps["field"].to_string(), operator, value, value_type));
        }

        if let Some(caps) = COMPARE.captures(text) {
            let operator = OperatorCode::from_symbol(&caps["op"])?;
            let value_type = Self::value_type([&caps["value"]]);
            return Some((caps["field"].to_string(), operator, Self::unquote(&caps["value"]), value_type));
        }

        None
    }

    /// Parameter when any raw (still quoted) value is a bare `@name`.
    fn value_type<'a>(raw: impl IntoIterator<Item = &'a str>) -> FilterValueType {
        match raw.into_iter().any(|value| value.trim().starts_with('@')) {
            true => FilterValueType::Parameter,
            false => FilterValueType::Literal,
        }
    }

    fn negated(caps: &Captures) -> bool {
        caps.name("not").is_some()
    }

    /// Trims, drops dangling conjunctions and unwraps parentheses that
    /// enclose the whole condition.
    fn clean(text: &str) -> String {
        let mut text = text.trim().to_string();

        loop {
            let before = text.len();
            text = DANGLING_TAIL.replace(&text, "").trim().to_string();
            text = DANGLING_HEAD.replace(&text, "").trim().to_string();
            if let Some(inner) = Self::enclosed(&text) {
                text = inner.trim().to_string();
            }
            if text.len() == before {
                return text;
            }
        }
    }

    fn enclosed(text: &str) -> Option<&str> {
        let inner = text.strip_prefix('(')?.strip_suffix(')')?;
        // `(a) = (b)` starts and ends with parentheses without being wrapped
        let mut depth = 0i32;
        for ch in inner.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return None;
            }
        }
        match depth {
            0 => Some(inner),
            _ => None,
        }
    }

    fn resolve_field(raw: &str, aggregate_aware: bool) -> Option<String> {
        let raw = raw.trim();
        let Some(open) = raw.find('(') else {
            return Some(raw.to_string());
        };

        let function = raw[..open].trim();
        let argument = raw[open + 1..].trim_end_matches(')').trim();
        if aggregate_aware && is_aggregate_function(function) {
            return Some(format!("{}({})", function.to_uppercase(), argument));
        }

        Splitter::split_commas(argument)
            .into_iter()
            .next()
            .filter(|column| IDENTIFIER.is_match(column))
    }

    /// Removes one pair of surrounding quotes and collapses escaped quotes.
    pub fn unquote(value: &str) -> String {
        let value = value.trim();
        let mut chars = value.chars();
        let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
            return value.to_string();
        };

        if value.len() < 2 || first != last || !(first == '\'' || first == '"') {
            return value.to_string();
        }

        let inner = &value[1..value.len() - 1];
        let doubled = format!("{first}{first}");
        let escaped = format!("\\{first}");
        inner.replace(&doubled, &first.to_string()).replace(&escaped, &first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{split_between, FilterValueType, OperatorCode},
        parser::ast::ConditionParser,
    };

    #[test]
    pub fn test_parse_comparison() {
        let filter = ConditionParser::parse("Salary > 50000", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.field_name, "Salary");
        assert_eq!(filter.operator, OperatorCode::GreaterThan);
        assert_eq!(filter.value, "50000");
        assert_eq!(filter.sequence, 1);
        assert_eq!(filter.value_type, FilterValueType::Literal);
    }

    #[test]
    pub fn test_parse_quoted_value() {
        let filter = ConditionParser::parse("e.Department = 'O''Brien'", 2, 0).expect("Failed to parse condition");

        assert_eq!(filter.field_name, "e.Department");
        assert_eq!(filter.operator, OperatorCode::EqualTo);
        assert_eq!(filter.value, "O'Brien");
        assert_eq!(filter.id, "f2");
    }

    #[test]
    pub fn test_parse_not_equal_symbols() {
        let bang = ConditionParser::parse("a != 1", 1, 0).expect("Failed to parse condition");
        let angle = ConditionParser::parse("a<>1", 1, 0).expect("Failed to parse condition");

        assert_eq!(bang.operator, OperatorCode::NotEqualTo);
        assert_eq!(angle.operator, OperatorCode::NotEqualTo);
    }

    #[test]
    pub fn test_parse_is_null() {
        let filter = ConditionParser::parse("ManagerId IS NOT NULL", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.operator, OperatorCode::IsNotNull);
        assert_eq!(filter.value, "");

        let filter = ConditionParser::parse("ManagerId is null", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.operator, OperatorCode::IsNull);
    }

    #[test]
    pub fn test_parse_in_list() {
        let filter = ConditionParser::parse("Region NOT IN ('North', 'South')", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.operator, OperatorCode::NotIn);
        assert_eq!(filter.value, "North,South");
    }

    #[test]
    pub fn test_parse_between() {
        let filter = ConditionParser::parse("x BETWEEN 1 AND 10", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.operator, OperatorCode::Between);
        assert_eq!(filter.value, "1|10");
        assert_eq!(filter.between_bounds(), Some(("1", "10")));

        let filter = ConditionParser::parse("d NOT BETWEEN 'a|b' AND 'c'", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.operator, OperatorCode::NotBetween);
        assert_eq!(split_between(&filter.value), Some(("a|b", "c")));
    }

    #[test]
    pub fn test_parse_like_classification() {
        let cases = [
            ("Name LIKE '%x%'", OperatorCode::Contains),
            ("Name LIKE 'x%'", OperatorCode::StartsWith),
            ("Name LIKE '%x'", OperatorCode::EndsWith),
            ("Name LIKE 'x'", OperatorCode::Contains),
            ("Name NOT LIKE '%x%'", OperatorCode::NotContains),
            ("Name NOT LIKE 'x%'", OperatorCode::NotStartsWith),
        ];

        for (text, expected) in cases {
            let filter = ConditionParser::parse(text, 1, 0).expect("Failed to parse condition");
            assert_eq!(filter.operator, expected, "{}", text);
            assert_eq!(filter.value, "x", "{}", text);
        }
    }

    #[test]
    pub fn test_parse_parameter() {
        let filter = ConditionParser::parse("HireDate >= @from", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.value, "@from");
        assert_eq!(filter.value_type, FilterValueType::Parameter);

        let filter = ConditionParser::parse("Email LIKE @pattern", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.value, "@pattern");
        assert!(filter.is_parameter());
    }

    #[test]
    pub fn test_quoted_sigil_is_a_literal() {
        let filter = ConditionParser::parse("Handle = '@bob'", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.value, "@bob");
        assert_eq!(filter.value_type, FilterValueType::Literal);

        let filter = ConditionParser::parse("Email LIKE '@%'", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.operator, OperatorCode::StartsWith);
        assert_eq!(filter.value, "@");
        assert_eq!(filter.value_type, FilterValueType::Literal);

        let filter = ConditionParser::parse("Tag IN ('@a', '@b')", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.value, "@a,@b");
        assert_eq!(filter.value_type, FilterValueType::Literal);
    }

    #[test]
    pub fn test_priority_in_before_compare() {
        let filter = ConditionParser::parse("Code IN ('=', '>')", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.operator, OperatorCode::In);
        assert_eq!(filter.value, "=,>");
    }

    #[test]
    pub fn test_dangling_conjunction_and_parentheses() {
        let filter = ConditionParser::parse("(a = 1) AND", 3, 2).expect("Failed to parse condition");

        assert_eq!(filter.field_name, "a");
        assert_eq!(filter.value, "1");
        assert_eq!(filter.group_id, 2);
    }

    #[test]
    pub fn test_function_is_reduced_in_where() {
        let filter = ConditionParser::parse("UPPER(c.Name) = 'BOB'", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.field_name, "c.Name");
    }

    #[test]
    pub fn test_having_keeps_aggregate() {
        let filter = ConditionParser::parse_having_condition("COUNT(*) > 5", 1, 0).expect("Failed to parse condition");

        assert_eq!(filter.field_name, "COUNT(*)");
        assert_eq!(filter.operator, OperatorCode::GreaterThan);
        assert_eq!(filter.value, "5");

        let filter = ConditionParser::parse_having_condition("sum(o.Amount) >= 10", 1, 0).expect("Failed to parse condition");
        assert_eq!(filter.field_name, "SUM(o.Amount)");
    }

    #[test]
    pub fn test_unrecognized_condition() {
        assert!(ConditionParser::parse("EXISTS (SELECT 1 FROM t)", 1, 0).is_none());
        assert!(ConditionParser::parse("   AND ", 1, 0).is_none());
    }
}
