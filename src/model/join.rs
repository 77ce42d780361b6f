use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum JoinType {
    #[default]
    Inner = 1,
    Left = 2,
    Right = 3,
    Full = 4,
}

impl JoinType {
    pub fn sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

impl From<JoinType> for u8 {
    fn from(value: JoinType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for JoinType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(JoinType::Inner),
            2 => Ok(JoinType::Left),
            3 => Ok(JoinType::Right),
            4 => Ok(JoinType::Full),
            _ => Err(format!("Invalid join type: '{}'", value)),
        }
    }
}

/// A table reference with its optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self { name: name.into(), alias }
    }

    /// Name other clauses use to qualify this table's columns.
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// True when `qualifier` is this table's alias or name.
    pub fn answers_to(&self, qualifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(qualifier)
            || self.alias.as_deref().is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }

    pub fn sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// `left_field` belongs to a table already in scope, `right_field` to the
/// table this join introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub join_type: JoinType,
    pub right_object: TableRef,
    pub left_field: String,
    pub right_field: String,
}

impl Join {
    pub fn sql(&self) -> String {
        format!(
            "{} {} ON {} = {}",
            self.join_type.sql(),
            self.right_object.sql(),
            self.left_field,
            self.right_field
        )
    }
}
