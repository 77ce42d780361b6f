use crate::{model::{Conjunction, JoinType}, parser::{QueryParser, WordComparer}};

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub distinct: WordComparer,
    pub top: WordComparer,
    pub from: WordComparer,
    pub inner_join: WordComparer,
    pub left_join: WordComparer,
    pub left_outer_join: WordComparer,
    pub right_join: WordComparer,
    pub right_outer_join: WordComparer,
    pub full_join: WordComparer,
    pub full_outer_join: WordComparer,
    pub join: WordComparer,
    pub on: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub having: WordComparer,
    pub order_by: WordComparer,
    pub limit: WordComparer,
    pub offset: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub between: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT").with_whitespace_postfix().with_eof(),
            distinct: WordComparer::new("DISTINCT").with_whitespace_postfix(),
            top: WordComparer::new("TOP").with_whitespace_postfix().with_delimiter('('),
            from: WordComparer::new("FROM").with_whitespace_postfix().with_eof(),
            inner_join: WordComparer::new("INNER JOIN").with_whitespace_postfix(),
            left_join: WordComparer::new("LEFT JOIN").with_whitespace_postfix(),
            left_outer_join: WordComparer::new("LEFT OUTER JOIN").with_whitespace_postfix(),
            right_join: WordComparer::new("RIGHT JOIN").with_whitespace_postfix(),
            right_outer_join: WordComparer::new("RIGHT OUTER JOIN").with_whitespace_postfix(),
            full_join: WordComparer::new("FULL JOIN").with_whitespace_postfix(),
            full_outer_join: WordComparer::new("FULL OUTER JOIN").with_whitespace_postfix(),
            join: WordComparer::new("JOIN").with_whitespace_postfix(),
            on: WordComparer::new("ON").with_whitespace_postfix().with_delimiter('('),
            r#where: WordComparer::new("WHERE").with_whitespace_postfix().with_delimiter('(').with_eof(),
            group_by: WordComparer::new("GROUP BY").with_whitespace_postfix().with_eof(),
            having: WordComparer::new("HAVING").with_whitespace_postfix().with_delimiter('(').with_eof(),
            order_by: WordComparer::new("ORDER BY").with_whitespace_postfix().with_eof(),
            limit: WordComparer::new("LIMIT").with_whitespace_postfix().with_eof(),
            offset: WordComparer::new("OFFSET").with_whitespace_postfix(),
            and: WordComparer::new("AND").with_whitespace_postfix().with_delimiter('('),
            or: WordComparer::new("OR").with_whitespace_postfix().with_delimiter('('),
            between: WordComparer::new("BETWEEN").with_whitespace_postfix(),
        }
    }

    /// True when the cursor sits on the first character of a word: the
    /// previous character is a delimiter (or there is none).
    pub fn at_word_start(&self, parser: &QueryParser) -> bool {
        let previous = parser.previous();
        !WordComparer::is_any_delimiter(parser.current()) &&
            (previous == '\0' || previous.is_whitespace() || previous == ')' || previous == '(' || previous == ',')
    }

    /// Join keyword at the cursor with its matched length.
    pub fn join_keyword(&self, parser: &QueryParser) -> Option<(JoinType, usize)> {
        let candidates = [
            (&self.inner_join, JoinType::Inner),
            (&self.left_outer_join, JoinType::Left),
            (&self.left_join, JoinType::Left),
            (&self.right_outer_join, JoinType::Right),
            (&self.right_join, JoinType::Right),
            (&self.full_outer_join, JoinType::Full),
            (&self.full_join, JoinType::Full),
            (&self.join, JoinType::Inner),
        ];

        candidates
            .into_iter()
            .find_map(|(comparer, join_type)| comparer.matches(parser).map(|length| (join_type, length)))
    }

    /// AND/OR boundary at the cursor, with its matched length.
    pub fn conjunction(&self, parser: &QueryParser) -> Option<(Conjunction, usize)> {
        if let Some(length) = self.and.matches(parser) {
            return Some((Conjunction::And, length));
        }
        if let Some(length) = self.or.matches(parser) {
            return Some((Conjunction::Or, length));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::{model::{Conjunction, JoinType}, parser::{QueryComparers, QueryParser}};

    #[test]
    pub fn test_join_keyword() {
        let comparers = QueryComparers::new();

        assert_eq!(comparers.join_keyword(&QueryParser::new("LEFT OUTER JOIN d ON")), Some((JoinType::Left, 15)));
        assert_eq!(comparers.join_keyword(&QueryParser::new("join d ON")), Some((JoinType::Inner, 4)));
        assert_eq!(comparers.join_keyword(&QueryParser::new("FULL JOIN d")), Some((JoinType::Full, 9)));
        assert_eq!(comparers.join_keyword(&QueryParser::new("JOINED")), None);
    }

    #[test]
    pub fn test_conjunction() {
        let comparers = QueryComparers::new();

        assert_eq!(comparers.conjunction(&QueryParser::new("AND (x)")), Some((Conjunction::And, 3)));
        assert_eq!(comparers.conjunction(&QueryParser::new("or y")), Some((Conjunction::Or, 2)));
        assert_eq!(comparers.conjunction(&QueryParser::new("ORDER")), None);
    }

    #[test]
    pub fn test_at_word_start() {
        let comparers = QueryComparers::new();
        let mut parser = QueryParser::new("a.band AND b");

        parser.jump(3);
        assert!(!comparers.at_word_start(&parser));
        parser.jump(4);
        assert!(comparers.at_word_start(&parser));
    }
}
