use crate::{model::Conjunction, parser::QueryParser};

/// One piece of a boolean split, with the keyword that followed it
/// (`None` for the last piece).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub text: String,
    pub boundary: Option<Conjunction>,
}

/// Quote- and parenthesis-aware splitting used by every clause parser.
pub struct Splitter;

impl Splitter {
    /// Splits on commas at parenthesis depth 0 outside quotes. Parts are
    /// trimmed and empty parts dropped.
    pub fn split_commas(text: &str) -> Vec<String> {
        let mut parser = QueryParser::new(text);
        let mut parts = vec![];
        let mut pivot = 0;

        while !parser.eof() {
            if parser.at_top_level() && parser.current() == ',' {
                Self::push_trimmed(&mut parts, parser.text_from_pivot(pivot));
                parser.next();
                pivot = parser.position;
                continue;
            }
            parser.advance();
        }
        Self::push_trimmed(&mut parts, parser.text_from_pivot(pivot));

        parts
    }

    /// Splits on top-level `AND`/`OR`. The `AND` that belongs to a
    /// `BETWEEN x AND y` is not a boundary: once `BETWEEN` has been seen since
    /// the last split, the next `AND` is consumed as part of it.
    pub fn split_conditions(text: &str) -> Vec<SplitPart> {
        let mut parser = QueryParser::new(text);
        let mut parts: Vec<SplitPart> = vec![];
        let mut pivot = 0;
        let mut between_open = false;

        while !parser.eof() {
            if parser.at_top_level() && parser.comparers.at_word_start(&parser) {
                if let Some(length) = parser.comparers.between.matches(&parser) {
                    between_open = true;
                    parser.jump(length);
                    continue;
                }

                if let Some((conjunction, length)) = parser.comparers.conjunction(&parser) {
                    if conjunction == Conjunction::And && between_open {
                        between_open = false;
                        parser.jump(length);
                        continue;
                    }

                    let part = parser.text_from_pivot(pivot);
                    if !part.trim().is_empty() {
                        parts.push(SplitPart { text: part.trim().to_string(), boundary: Some(conjunction) });
                    }
                    parser.jump(length);
                    pivot = parser.position;
                    between_open = false;
                    continue;
                }
            }
            parser.advance();
        }

        let last = parser.text_from_pivot(pivot);
        if !last.trim().is_empty() {
            parts.push(SplitPart { text: last.trim().to_string(), boundary: None });
        }

        parts
    }

    fn push_trimmed(parts: &mut Vec<String>, part: String) {
        let part = part.trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
    }
}
