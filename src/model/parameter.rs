use serde::{Deserialize, Serialize};

/// One per distinct `@name` sigil found in the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameter {
    /// Parameter name without the sigil.
    pub field_name: String,
    pub is_mandatory: bool,
    /// Field the parameter is compared against, or the parameter name when it
    /// never appears in a filter.
    pub mapping_field_name: String,
}
