use serde::{Deserialize, Serialize};

pub const AGGREGATE_FUNCTIONS: [&str; 8] = [
    "COUNT", "SUM", "AVG", "MAX", "MIN", "GROUP_CONCAT", "STRING_AGG", "ARRAY_AGG",
];

pub fn is_aggregate_function(name: &str) -> bool {
    AGGREGATE_FUNCTIONS.iter().any(|f| f.eq_ignore_ascii_case(name.trim()))
}

/// An aggregate entry of the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateField {
    /// Upper-cased function name.
    pub function: String,
    /// Text between the call parentheses, as written.
    pub argument: String,
    pub alias: String,
    /// Index of the entry in the original SELECT list.
    pub position: usize,
}

impl AggregateField {
    /// `FUNC(argument)`
    pub fn expression(&self) -> String {
        format!("{}({})", self.function, self.argument)
    }

    /// `func_field` name used when the statement gives no alias.
    pub fn generated_alias(function: &str, argument: &str) -> String {
        let field = argument
            .rsplit('.')
            .next()
            .unwrap_or(argument)
            .trim()
            .trim_start_matches("DISTINCT ")
            .trim_start_matches("distinct ");
        let field = match field {
            "*" | "" => "all".to_string(),
            other => other
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                .collect(),
        };
        format!("{}_{}", function.to_lowercase(), field)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{is_aggregate_function, AggregateField};

    #[test]
    pub fn test_is_aggregate_function() {
        assert!(is_aggregate_function("count"));
        assert!(is_aggregate_function("STRING_AGG"));
        assert!(!is_aggregate_function("UPPER"));
    }

    #[test]
    pub fn test_generated_alias() {
        assert_eq!(AggregateField::generated_alias("SUM", "o.Amount"), "sum_Amount");
        assert_eq!(AggregateField::generated_alias("COUNT", "*"), "count_all");
        assert_eq!(AggregateField::generated_alias("MAX", "DISTINCT price"), "max_price");
    }
}
