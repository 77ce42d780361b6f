use crate::{model::Conjunction, parser::{ParseError, QueryParser}};

/// Boolean expression of a WHERE or HAVING clause.
///
/// ```text
/// or_expr  := and_expr ( OR and_expr )*
/// and_expr := factor ( AND factor )*
/// factor   := '(' or_expr ')' | condition
/// ```
///
/// A parenthesis only opens a group when its matching `)` is followed by the
/// end of the text, another `)` or a conjunction; otherwise it belongs to the
/// condition, as in `(a + b) > 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Condition(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Group(Box<Predicate>),
}

/// A leaf condition in source order with the conjunction joining it to the
/// previous leaf and the parenthesised group it belongs to (`0` = none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatCondition {
    pub text: String,
    pub conjunction: Conjunction,
    pub group_id: u32,
}

impl Predicate {
    pub fn parse(text: &str) -> Result<Predicate, ParseError> {
        let mut parser = QueryParser::new(text);
        let predicate = Self::parse_or(&mut parser)?;

        parser.next_non_whitespace();
        if !parser.eof() {
            return ParseError::new("Unexpected text after predicate", parser.position, &parser).err();
        }

        Ok(predicate)
    }

    fn parse_or(parser: &mut QueryParser) -> Result<Predicate, ParseError> {
        let mut items = vec![Self::parse_and(parser)?];

        loop {
            parser.next_non_whitespace();
            if !parser.consume_keyword(|c| &c.or) {
                break;
            }
            items.push(Self::parse_and(parser)?);
        }

        Ok(match items.len() {
            1 => items.remove(0),
            _ => Predicate::Or(items),
        })
    }

    fn parse_and(parser: &mut QueryParser) -> Result<Predicate, ParseError> {
        let mut items = vec![Self::parse_factor(parser)?];

        loop {
            parser.next_non_whitespace();
            if !parser.consume_keyword(|c| &c.and) {
                break;
            }
            items.push(Self::parse_factor(parser)?);
        }

        Ok(match items.len() {
            1 => items.remove(0),
            _ => Predicate::And(items),
        })
    }

    fn parse_factor(parser: &mut QueryParser) -> Result<Predicate, ParseError> {
        parser.next_non_whitespace();
        if parser.eof() {
            return ParseError::new("Missing condition", parser.position, parser).err();
        }

        if parser.current() == '(' && Self::opens_group(parser) {
            let pivot = parser.position;
            parser.next();
            let inner = Self::parse_or(parser)?;
            parser.next_non_whitespace();
            if parser.current() != ')' {
                return ParseError::new("Unbalanced parentheses", pivot, parser).err();
            }
            parser.next();
            return Ok(Predicate::Group(Box::new(inner)));
        }

        Self::parse_condition(parser)
    }

    /// Consumes one condition up to the next top-level conjunction or the
    /// `)` closing the enclosing group.
    fn parse_condition(parser: &mut QueryParser) -> Result<Predicate, ParseError> {
        let pivot = parser.position;
        let mut between_open = false;

        while !parser.eof() {
            if parser.at_top_level() {
                if parser.current() == ')' {
                    break;
                }
                if parser.comparers.at_word_start(parser) {
                    if let Some(length) = parser.comparers.between.matches(parser) {
                        between_open = true;
                        parser.jump(length);
                        continue;
                    }
                    if let Some((conjunction, length)) = parser.comparers.conjunction(parser) {
                        if conjunction == Conjunction::And && between_open {
                            between_open = false;
                            parser.jump(length);
                            continue;
                        }
                        break;
                    }
                }
            }
            parser.advance();
        }

        if !parser.at_top_level() {
            return ParseError::new("Unbalanced parentheses", pivot, parser).err();
        }

        let text = parser.text_from_pivot(pivot);
        let text = text.trim();
        if text.is_empty() {
            return ParseError::new("Missing condition", pivot, parser).err();
        }

        Ok(Predicate::Condition(text.to_string()))
    }

    fn opens_group(parser: &QueryParser) -> bool {
        let mut lookahead = QueryParser::new(&parser.text_from_range(parser.position, parser.length));
        lookahead.advance();
        while !lookahead.eof() && !lookahead.at_top_level() {
            lookahead.advance();
        }
        if !lookahead.at_top_level() {
            return false;
        }

        lookahead.next_non_whitespace();
        lookahead.eof() || lookahead.current() == ')' || lookahead.comparers.conjunction(&lookahead).is_some()
    }

    /// Copy of the tree holding only the conditions `keep` accepts. Operators
    /// left with one operand collapse into it; a group survives as long as
    /// any of its members does.
    pub fn retain(&self, keep: &dyn Fn(&str) -> bool) -> Option<Predicate> {
        match self {
            Predicate::Condition(text) => keep(text).then(|| self.clone()),
            Predicate::And(items) | Predicate::Or(items) => {
                let mut kept = items.iter().filter_map(|item| item.retain(keep)).collect::<Vec<_>>();
                match kept.len() {
                    0 => None,
                    1 => kept.pop(),
                    _ => Some(match self {
                        Predicate::Or(_) => Predicate::Or(kept),
                        _ => Predicate::And(kept),
                    }),
                }
            }
            Predicate::Group(inner) => inner.retain(keep).map(|inner| Predicate::Group(Box::new(inner))),
        }
    }

    /// Renders the tree with every group's parentheses in place.
    pub fn sql(&self) -> String {
        match self {
            Predicate::Condition(text) => text.clone(),
            Predicate::And(items) => items.iter().map(Predicate::sql).collect::<Vec<_>>().join(" AND "),
            Predicate::Or(items) => items.iter().map(Predicate::sql).collect::<Vec<_>>().join(" OR "),
            Predicate::Group(inner) => format!("({})", inner.sql()),
        }
    }

    /// Leaves in source order. A parenthesised group at the top level gets a
    /// fresh group id; groups nested inside it share the outer id.
    pub fn flatten(&self) -> Vec<FlatCondition> {
        let mut out = vec![];
        let mut next_group = 0;
        self.flatten_into(&mut out, Conjunction::And, 0, &mut next_group);
        out
    }

    fn flatten_into(&self, out: &mut Vec<FlatCondition>, conjunction: Conjunction, group_id: u32, next_group: &mut u32) {
        match self {
            Predicate::Condition(text) => out.push(FlatCondition { text: text.clone(), conjunction, group_id }),
            Predicate::And(items) | Predicate::Or(items) => {
                let joiner = match self {
                    Predicate::Or(_) => Conjunction::Or,
                    _ => Conjunction::And,
                };
                for (i, item) in items.iter().enumerate() {
                    let conjunction = if i == 0 { conjunction } else { joiner };
                    item.flatten_into(out, conjunction, group_id, next_group);
                }
            }
            Predicate::Group(inner) => {
                let group_id = match group_id {
                    0 => {
                        *next_group += 1;
                        *next_group
                    }
                    outer => outer,
                };
                inner.flatten_into(out, conjunction, group_id, next_group);
            }
        }
    }
}
