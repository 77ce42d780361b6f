use crate::{model::Pager, parser::QueryParser};

pub struct LimitAndOffsetParser;

impl LimitAndOffsetParser {
    /// Accepts `n`, `offset, n` and `n OFFSET offset`. Anything else is
    /// ignored and yields `None`.
    pub fn parse(text: &str) -> Option<Pager> {
        if let Some((offset, size)) = text.split_once(',') {
            let offset = offset.trim().parse::<u64>().ok()?;
            let size = size.trim().parse::<u64>().ok()?;
            return Some(Pager::from_limit(size, offset));
        }

        let mut parser = QueryParser::new(text.trim());
        let size = Self::parse_number(&mut parser)?;
        parser.next_non_whitespace();

        if parser.eof() {
            return Some(Pager::from_limit(size, 0));
        }

        if !parser.consume_keyword(|c| &c.offset) {
            return None;
        }
        parser.next_non_whitespace();
        let offset = Self::parse_number(&mut parser)?;
        parser.next_non_whitespace();

        match parser.eof() {
            true => Some(Pager::from_limit(size, offset)),
            false => None,
        }
    }

    fn parse_number(parser: &mut QueryParser) -> Option<u64> {
        let pivot = parser.position;
        while parser.current().is_ascii_digit() {
            parser.next();
        }
        parser.text_from_pivot(pivot).parse::<u64>().ok()
    }
}
