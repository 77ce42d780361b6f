/// Clauses of a SELECT statement, in the order they may appear.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    #[default]
    Select = 0,
    From = 1,
    Joins = 2,
    Where = 3,
    GroupBy = 4,
    Having = 5,
    OrderBy = 6,
    Limit = 7,
    EOF = 8,
}
