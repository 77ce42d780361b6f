use serde::{Deserialize, Serialize};

use crate::model::OperatorCode;

/// Joins the two BETWEEN bounds of a value: `low|high`.
pub const BETWEEN_SEPARATOR: char = '|';

/// Leads a length-prefixed BETWEEN value, `\u{1E}<low byte length>:<low><high>`,
/// used when the plain form would be ambiguous.
pub const BETWEEN_LENGTH_MARKER: char = '\u{1E}';

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Conjunction {
    #[default]
    And = 1,
    Or = 2,
}

impl Conjunction {
    pub fn sql(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }

    pub fn parse(text: &str) -> Option<Conjunction> {
        match text.trim().to_uppercase().as_str() {
            "AND" => Some(Conjunction::And),
            "OR" => Some(Conjunction::Or),
            _ => None,
        }
    }
}

impl From<Conjunction> for u8 {
    fn from(value: Conjunction) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for Conjunction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Conjunction::And),
            2 => Ok(Conjunction::Or),
            _ => Err(format!("Invalid conjunction code: '{}'", value)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum FilterValueType {
    #[default]
    Literal = 0,
    Parameter = 1,
}

impl From<FilterValueType> for u8 {
    fn from(value: FilterValueType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for FilterValueType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterValueType::Literal),
            1 => Ok(FilterValueType::Parameter),
            _ => Err(format!("Invalid value type: '{}'", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub id: String,
    pub field_name: String,
    pub operator: OperatorCode,
    /// Unquoted value. BETWEEN bounds are joined by [`join_between`], IN
    /// items by `,`.
    pub value: String,
    pub value_type: FilterValueType,
    pub conjunction: Conjunction,
    pub group_id: u32,
    /// 1-based reconstruction order.
    pub sequence: u32,
}

impl QueryFilter {
    pub fn new(field_name: impl Into<String>, operator: OperatorCode, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            field_name: field_name.into(),
            operator,
            value: value.into(),
            value_type: FilterValueType::Literal,
            conjunction: Conjunction::And,
            group_id: 0,
            sequence: 1,
        }
    }

    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self { self.conjunction = conjunction; self }
    pub fn with_group(mut self, group_id: u32) -> Self { self.group_id = group_id; self }
    pub fn with_value_type(mut self, value_type: FilterValueType) -> Self { self.value_type = value_type; self }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self.id = format!("f{}", sequence);
        self
    }

    pub fn is_parameter(&self) -> bool {
        self.value_type == FilterValueType::Parameter
    }

    /// Lower and upper BETWEEN bounds.
    pub fn between_bounds(&self) -> Option<(&str, &str)> {
        split_between(&self.value)
    }

    /// Bare column name, without any table qualifier.
    pub fn bare_field(&self) -> &str {
        bare_field(&self.field_name)
    }
}

/// `low|high` when neither bound contains `|` and the low bound does not
/// start with [`BETWEEN_LENGTH_MARKER`]; the length-prefixed form otherwise.
pub fn join_between(low: &str, high: &str) -> String {
    let plain = !low.contains(BETWEEN_SEPARATOR)
        && !high.contains(BETWEEN_SEPARATOR)
        && !low.starts_with(BETWEEN_LENGTH_MARKER);
    match plain {
        true => format!("{low}{BETWEEN_SEPARATOR}{high}"),
        false => format!("{BETWEEN_LENGTH_MARKER}{}:{low}{high}", low.len()),
    }
}

pub fn split_between(value: &str) -> Option<(&str, &str)> {
    if let Some(rest) = value.strip_prefix(BETWEEN_LENGTH_MARKER) {
        let prefixed = rest.split_once(':').and_then(|(length, bounds)| {
            let length = length.parse::<usize>().ok()?;
            Some((bounds.get(..length)?, bounds.get(length..)?))
        });
        if prefixed.is_some() {
            return prefixed;
        }
    }
    value.split_once(BETWEEN_SEPARATOR)
}

/// Strips a `table.` qualifier when the reference is not a function call.
pub fn bare_field(field: &str) -> &str {
    if field.contains('(') {
        return field;
    }
    field.rsplit('.').next().unwrap_or(field)
}

/// Filters of a WHERE or HAVING clause, kept in `sequence` order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub filters: Vec<QueryFilter>,
}

impl FilterClause {
    pub fn new(filters: Vec<QueryFilter>) -> Self {
        let mut clause = Self { filters };
        clause.resequence();
        clause
    }

    /// `None` for an empty clause, so absence is the only empty shape.
    pub fn non_empty(filters: Vec<QueryFilter>) -> Option<Self> {
        match filters.is_empty() {
            true => None,
            false => Some(Self::new(filters)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn resequence(&mut self) {
        for (i, filter) in self.filters.iter_mut().enumerate() {
            filter.sequence = i as u32 + 1;
            filter.id = format!("f{}", filter.sequence);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{bare_field, join_between, split_between, Conjunction, FilterClause, FilterValueType, OperatorCode, QueryFilter};

    #[test]
    pub fn test_between_separator() {
        assert_eq!(join_between("1", "10"), "1|10");
        assert_eq!(split_between("1|10"), Some(("1", "10")));
        assert_eq!(split_between("10"), None);

        let joined = join_between("a|b", "c");
        assert_eq!(split_between(&joined), Some(("a|b", "c")));
    }

    #[test]
    pub fn test_between_bounds_holding_control_characters() {
        let cases = [
            ("a\u{1F}", "b"),
            ("a", "b|\u{1E}"),
            ("\u{1E}3:x", "y"),
            ("a|\u{1F}\u{1E}", "\u{1E}|\u{1F}"),
            ("", "|"),
            ("é|", "ü"),
        ];

        for (low, high) in cases {
            let joined = join_between(low, high);
            assert_eq!(split_between(&joined), Some((low, high)), "{:?}", joined);
        }
    }

    #[test]
    pub fn test_value_type_is_literal_unless_set() {
        let filter = QueryFilter::new("Handle", OperatorCode::EqualTo, "@bob");
        assert_eq!(filter.value_type, FilterValueType::Literal);
        assert!(!filter.is_parameter());

        let filter = filter.with_value_type(FilterValueType::Parameter);
        assert!(filter.is_parameter());
    }

    #[test]
    pub fn test_resequence() {
        let clause = FilterClause::new(vec![
            QueryFilter::new("a", OperatorCode::EqualTo, "1").with_sequence(7),
            QueryFilter::new("b", OperatorCode::EqualTo, "2").with_conjunction(Conjunction::Or),
        ]);
        let sequences = clause.filters.iter().map(|f| f.sequence).collect::<Vec<_>>();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(clause.filters[1].id, "f2");
        assert!(FilterClause::non_empty(vec![]).is_none());
    }

    #[test]
    pub fn test_bare_field() {
        assert_eq!(bare_field("e.Salary"), "Salary");
        assert_eq!(bare_field("Salary"), "Salary");
        assert_eq!(bare_field("COUNT(o.Id)"), "COUNT(o.Id)");
    }
}
