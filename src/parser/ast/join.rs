use tracing::debug;

use crate::{model::{Join, TableRef}, parser::{ast::CollectionParser, QueryParser, Splitter}};

pub struct JoinParser;

impl JoinParser {
    /// Parses every JOIN segment, keeping track of the tables already in
    /// scope so each join's operands can be put in left/right order.
    pub fn parse_chain(segments: &[String], from: Option<&TableRef>) -> Vec<Join> {
        let mut scope: Vec<TableRef> = from.into_iter().cloned().collect();
        let mut joins = Vec::with_capacity(segments.len());

        for segment in segments {
            match Self::parse(segment, &scope) {
                Some(join) => {
                    scope.push(join.right_object.clone());
                    joins.push(join);
                }
                None => debug!(segment = segment.as_str(), "dropping unparseable join"),
            }
        }

        joins
    }

    pub fn parse(segment: &str, scope: &[TableRef]) -> Option<Join> {
        let mut parser = QueryParser::new(segment.trim());
        let (join_type, length) = parser.comparers.join_keyword(&parser)?;
        parser.jump(length);

        let pivot = parser.position;
        let mut on_start: Option<(usize, usize)> = None;
        while !parser.eof() {
            if parser.at_top_level() && parser.comparers.at_word_start(&parser) {
                if let Some(length) = parser.comparers.on.matches(&parser) {
                    on_start = Some((parser.position, length));
                    break;
                }
            }
            parser.advance();
        }

        let (on_position, on_length) = on_start?;
        let right_object = CollectionParser::parse(&parser.text_from_range(pivot, on_position))?;
        let condition = parser.text_from_range(on_position + on_length, parser.length);
        let first = Splitter::split_conditions(&condition).into_iter().next()?;
        let (left, right) = Self::split_equality(&first.text)?;

        let (left_field, right_field) = match Self::needs_swap(&left, &right, &right_object, scope) {
            true => (right, left),
            false => (left, right),
        };

        Some(Join { join_type, right_object, left_field, right_field })
    }

    fn split_equality(condition: &str) -> Option<(String, String)> {
        let condition = condition.trim().trim_start_matches('(').trim_end_matches(')');
        let chars: Vec<char> = condition.chars().collect();
        let index = chars
            .iter()
            .enumerate()
            .position(|(i, ch)| *ch == '=' && (i == 0 || !matches!(chars[i - 1], '<' | '>' | '!')))?;

        let left: String = chars[..index].iter().collect();
        let right: String = chars[index + 1..].iter().collect();
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() {
            return None;
        }

        Some((left.to_string(), right.to_string()))
    }

    fn qualifier(operand: &str) -> Option<&str> {
        operand.rsplit_once('.').map(|(qualifier, _)| qualifier)
    }

    fn needs_swap(left: &str, right: &str, joined: &TableRef, scope: &[TableRef]) -> bool {
        let belongs_to_joined = |operand: &str| Self::qualifier(operand).is_some_and(|q| joined.answers_to(q));
        let belongs_to_scope = |operand: &str| {
            Self::qualifier(operand).is_some_and(|q| scope.iter().any(|table| table.answers_to(q)))
        };

        let (left_joined, right_joined) = (belongs_to_joined(left), belongs_to_joined(right));
        if left_joined && !right_joined {
            return true;
        }

        !right_joined && !left_joined && belongs_to_scope(right) && !belongs_to_scope(left)
    }
}
