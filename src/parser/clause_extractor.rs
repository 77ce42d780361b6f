use tracing::trace;

use crate::{model::Pager, parser::{ast::LimitAndOffsetParser, Phase, QueryParser}};

/// Raw text of each clause of a comment-free SELECT statement.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Clauses {
    /// Text between `SELECT` and `FROM`, exactly as written.
    pub select_raw: Option<String>,
    /// SELECT list with any leading `DISTINCT` / `TOP n` removed.
    pub select: Option<String>,
    pub distinct: bool,
    pub top: Option<u64>,
    pub from: Option<String>,
    /// One entry per JOIN, each starting with its join keyword.
    pub joins: Vec<String>,
    pub where_body: Option<String>,
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
    pub pager: Option<Pager>,
}

impl Clauses {
    /// The JOIN chain as a single fragment, `None` when there are no joins.
    pub fn join_chain(&self) -> Option<String> {
        match self.joins.is_empty() {
            true => None,
            false => Some(self.joins.join(" ")),
        }
    }
}

pub struct ClauseExtractor;

impl ClauseExtractor {
    pub fn extract(sql: &str) -> Clauses {
        let mut parser = QueryParser::new(sql);
        let mut clauses = Clauses::default();

        parser.next_non_whitespace();
        let mut current = Phase::Select;
        let mut has_select = false;
        if let Some(length) = parser.comparers.select.matches(&parser) {
            parser.jump(length);
            has_select = true;
        }
        let mut start = parser.position;

        while let Some((phase, length)) = parser.seek_next_phase() {
            let keyword_start = parser.position;
            if current != Phase::Select || has_select {
                Self::assign(&mut clauses, current, parser.text_from_range(start, keyword_start));
            }

            start = match phase {
                Phase::Joins => keyword_start,
                _ => keyword_start + length,
            };
            parser.jump(length);
            parser.phase = phase;
            current = phase;
        }

        if current != Phase::Select || has_select {
            Self::assign(&mut clauses, current, parser.text_from_range(start, parser.length));
        }

        if let Some(raw) = clauses.select_raw.clone() {
            Self::split_select_head(&mut clauses, &raw);
        }

        clauses.pager = clauses.limit.as_deref().and_then(LimitAndOffsetParser::parse);

        clauses
    }

    fn assign(clauses: &mut Clauses, phase: Phase, text: String) {
        let text = text.trim();
        trace!(?phase, text, "clause span");
        if text.is_empty() {
            return;
        }
        let text = text.to_string();

        match phase {
            Phase::Select => clauses.select_raw = Some(text),
            Phase::From => clauses.from = Some(text),
            Phase::Joins => clauses.joins.push(text),
            Phase::Where => clauses.where_body = Some(text),
            Phase::GroupBy => clauses.group_by = Some(text),
            Phase::Having => clauses.having = Some(text),
            Phase::OrderBy => clauses.order_by = Some(text),
            Phase::Limit => clauses.limit = Some(text),
            Phase::EOF => {},
        }
    }

    /// Peels `DISTINCT` and `TOP n` / `TOP (n)` off the SELECT list.
    fn split_select_head(clauses: &mut Clauses, raw: &str) {
        let mut parser = QueryParser::new(raw);

        loop {
            parser.next_non_whitespace();

            if parser.consume_keyword(|c| &c.distinct) {
                clauses.distinct = true;
                continue;
            }

            if parser.comparers.top.matches(&parser).is_some() {
                let pivot = parser.position;
                parser.consume_keyword(|c| &c.top);
                parser.next_non_whitespace();
                let parenthesised = parser.current() == '(';
                if parenthesised {
                    parser.next();
                }
                let digits = parser.position;
                while parser.current().is_ascii_digit() {
                    parser.next();
                }
                match parser.text_from_pivot(digits).parse::<u64>() {
                    Ok(top) => {
                        clauses.top = Some(top);
                        if parenthesised && parser.current() == ')' {
                            parser.next();
                        }
                        continue;
                    }
                    Err(_) => {
                        // not a TOP clause after all; a column named "top"
                        parser.position = pivot;
                    }
                }
            }

            break;
        }

        let rest = parser.text_from_range(parser.position, parser.length);
        let rest = rest.trim();
        if !rest.is_empty() {
            clauses.select = Some(rest.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{model::Pager, parser::ClauseExtractor};

    #[test]
    pub fn test_extract_all_clauses() {
        let clauses = ClauseExtractor::extract(
            "SELECT DISTINCT e.Id, e.Name FROM Employee e \
             INNER JOIN Department d ON e.DeptId = d.Id \
             LEFT JOIN Site s ON s.Id = d.SiteId \
             WHERE e.Salary > 100 GROUP BY e.Id, e.Name HAVING COUNT(*) > 1 \
             ORDER BY e.Name DESC LIMIT 20, 10",
        );

        assert!(clauses.distinct);
        assert_eq!(clauses.select.as_deref(), Some("e.Id, e.Name"));
        assert_eq!(clauses.select_raw.as_deref(), Some("DISTINCT e.Id, e.Name"));
        assert_eq!(clauses.from.as_deref(), Some("Employee e"));
        assert_eq!(clauses.joins, vec![
            "INNER JOIN Department d ON e.DeptId = d.Id",
            "LEFT JOIN Site s ON s.Id = d.SiteId",
        ]);
        assert_eq!(clauses.where_body.as_deref(), Some("e.Salary > 100"));
        assert_eq!(clauses.group_by.as_deref(), Some("e.Id, e.Name"));
        assert_eq!(clauses.having.as_deref(), Some("COUNT(*) > 1"));
        assert_eq!(clauses.order_by.as_deref(), Some("e.Name DESC"));
        assert_eq!(clauses.limit.as_deref(), Some("20, 10"));
        assert_eq!(clauses.pager, Some(Pager::new(10, 3)));
    }

    #[test]
    pub fn test_extract_top() {
        let clauses = ClauseExtractor::extract("SELECT TOP 5 Id FROM t");

        assert_eq!(clauses.top, Some(5));
        assert_eq!(clauses.select.as_deref(), Some("Id"));

        let clauses = ClauseExtractor::extract("SELECT TOP (7) DISTINCT Id FROM t");
        assert_eq!(clauses.top, Some(7));
        assert!(clauses.distinct);
        assert_eq!(clauses.select.as_deref(), Some("Id"));
    }

    #[test]
    pub fn test_where_bounded_by_order_by() {
        let clauses = ClauseExtractor::extract("SELECT a FROM t WHERE b = 'ORDER BY' ORDER BY a");

        assert_eq!(clauses.where_body.as_deref(), Some("b = 'ORDER BY'"));
        assert_eq!(clauses.order_by.as_deref(), Some("a"));
        assert!(clauses.group_by.is_none());
        assert!(clauses.having.is_none());
    }

    #[test]
    pub fn test_missing_clauses_are_absent() {
        let clauses = ClauseExtractor::extract("SELECT a");

        assert_eq!(clauses.select.as_deref(), Some("a"));
        assert!(clauses.from.is_none());
        assert!(clauses.where_body.is_none());
        assert!(clauses.joins.is_empty());
        assert!(clauses.pager.is_none());
    }

    #[test]
    pub fn test_subquery_keywords_stay_inside_where() {
        let clauses = ClauseExtractor::extract("SELECT a FROM t WHERE b IN (SELECT c FROM u GROUP BY c) LIMIT 5");

        assert_eq!(clauses.where_body.as_deref(), Some("b IN (SELECT c FROM u GROUP BY c)"));
        assert!(clauses.group_by.is_none());
        assert_eq!(clauses.pager, Some(Pager::new(5, 1)));
    }

    #[test]
    pub fn test_multiline_keywords() {
        let clauses = ClauseExtractor::extract("SELECT a\nFROM t\nGROUP\n  BY a\nORDER BY a");

        assert_eq!(clauses.from.as_deref(), Some("t"));
        assert_eq!(clauses.group_by.as_deref(), Some("a"));
    }
}
