use std::fmt;

use serde::{Deserialize, Serialize};

/// Relational operator codes shared by the condition parser, the SQL
/// synthesizer and the wire format.
///
/// `SplitContains`/`NotSplitContains` render exactly like
/// `Contains`/`NotContains` but are distinct codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum OperatorCode {
    GreaterThan = 1,
    LessThan = 2,
    EqualTo = 3,
    NotEqualTo = 4,
    GreaterThanOrEqual = 5,
    LessThanOrEqual = 6,
    In = 7,
    NotIn = 8,
    IsNull = 9,
    IsNotNull = 10,
    Contains = 11,
    NotContains = 12,
    StartsWith = 13,
    NotStartsWith = 14,
    EndsWith = 15,
    NotEndsWith = 16,
    Between = 17,
    NotBetween = 18,
    SplitContains = 19,
    NotSplitContains = 20,
}

/// How a pattern operator wraps its value with `%` wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcards {
    Both,
    Trailing,
    Leading,
}

impl OperatorCode {
    pub const ALL: [OperatorCode; 20] = [
        OperatorCode::GreaterThan,
        OperatorCode::LessThan,
        OperatorCode::EqualTo,
        OperatorCode::NotEqualTo,
        OperatorCode::GreaterThanOrEqual,
        OperatorCode::LessThanOrEqual,
        OperatorCode::In,
        OperatorCode::NotIn,
        OperatorCode::IsNull,
        OperatorCode::IsNotNull,
        OperatorCode::Contains,
        OperatorCode::NotContains,
        OperatorCode::StartsWith,
        OperatorCode::NotStartsWith,
        OperatorCode::EndsWith,
        OperatorCode::NotEndsWith,
        OperatorCode::Between,
        OperatorCode::NotBetween,
        OperatorCode::SplitContains,
        OperatorCode::NotSplitContains,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// SQL text placed between the field and the value.
    pub fn sql(self) -> &'static str {
        match self {
            OperatorCode::GreaterThan => ">",
            OperatorCode::LessThan => "<",
            OperatorCode::EqualTo => "=",
            OperatorCode::NotEqualTo => "<>",
            OperatorCode::GreaterThanOrEqual => ">=",
            OperatorCode::LessThanOrEqual => "<=",
            OperatorCode::In => "IN",
            OperatorCode::NotIn => "NOT IN",
            OperatorCode::IsNull => "IS NULL",
            OperatorCode::IsNotNull => "IS NOT NULL",
            OperatorCode::Contains
            | OperatorCode::StartsWith
            | OperatorCode::EndsWith
            | OperatorCode::SplitContains => "LIKE",
            OperatorCode::NotContains
            | OperatorCode::NotStartsWith
            | OperatorCode::NotEndsWith
            | OperatorCode::NotSplitContains => "NOT LIKE",
            OperatorCode::Between => "BETWEEN",
            OperatorCode::NotBetween => "NOT BETWEEN",
        }
    }

    /// Maps a comparison symbol (`=`, `!=`, `<>`, ...) or keyword
    /// (`IN`, `NOT LIKE`, ...) back to its code. Pattern keywords map to the
    /// `Contains` family since the wildcard layout is unknown here.
    pub fn from_symbol(symbol: &str) -> Option<OperatorCode> {
        let normalized = symbol.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        let op = match normalized.as_str() {
            ">" => OperatorCode::GreaterThan,
            "<" => OperatorCode::LessThan,
            "=" => OperatorCode::EqualTo,
            "!=" | "<>" => OperatorCode::NotEqualTo,
            ">=" => OperatorCode::GreaterThanOrEqual,
            "<=" => OperatorCode::LessThanOrEqual,
            "IN" => OperatorCode::In,
            "NOT IN" => OperatorCode::NotIn,
            "IS NULL" => OperatorCode::IsNull,
            "IS NOT NULL" => OperatorCode::IsNotNull,
            "LIKE" => OperatorCode::Contains,
            "NOT LIKE" => OperatorCode::NotContains,
            "BETWEEN" => OperatorCode::Between,
            "NOT BETWEEN" => OperatorCode::NotBetween,
            _ => return None,
        };
        Some(op)
    }

    /// Classifies a LIKE pattern by where its `%` wildcards sit.
    pub fn classify_like(pattern: &str, negated: bool) -> OperatorCode {
        if pattern.chars().all(|c| c == '%') {
            return if negated { OperatorCode::NotContains } else { OperatorCode::Contains };
        }

        let leading = pattern.starts_with('%');
        let trailing = pattern.ends_with('%');
        match (leading, trailing, negated) {
            (true, false, false) => OperatorCode::EndsWith,
            (true, false, true) => OperatorCode::NotEndsWith,
            (false, true, false) => OperatorCode::StartsWith,
            (false, true, true) => OperatorCode::NotStartsWith,
            (_, _, false) => OperatorCode::Contains,
            (_, _, true) => OperatorCode::NotContains,
        }
    }

    pub fn wildcards(self) -> Option<Wildcards> {
        match self {
            OperatorCode::Contains
            | OperatorCode::NotContains
            | OperatorCode::SplitContains
            | OperatorCode::NotSplitContains => Some(Wildcards::Both),
            OperatorCode::StartsWith | OperatorCode::NotStartsWith => Some(Wildcards::Trailing),
            OperatorCode::EndsWith | OperatorCode::NotEndsWith => Some(Wildcards::Leading),
            _ => None,
        }
    }

    /// Wraps `value` in the `%` layout this operator implies.
    pub fn like_pattern(self, value: &str) -> String {
        match self.wildcards() {
            Some(Wildcards::Both) => format!("%{value}%"),
            Some(Wildcards::Trailing) => format!("{value}%"),
            Some(Wildcards::Leading) => format!("%{value}"),
            None => value.to_string(),
        }
    }

    pub fn is_pattern(self) -> bool {
        self.wildcards().is_some()
    }

    pub fn is_null_test(self) -> bool {
        matches!(self, OperatorCode::IsNull | OperatorCode::IsNotNull)
    }

    pub fn is_range(self) -> bool {
        matches!(self, OperatorCode::Between | OperatorCode::NotBetween)
    }

    pub fn is_list(self) -> bool {
        matches!(self, OperatorCode::In | OperatorCode::NotIn)
    }
}

impl From<OperatorCode> for u8 {
    fn from(value: OperatorCode) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for OperatorCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        OperatorCode::ALL
            .iter()
            .copied()
            .find(|op| op.code() == value)
            .ok_or_else(|| format!("Invalid operator code: '{}'", value))
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}
