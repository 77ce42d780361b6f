use crate::{model::TableRef, parser::Splitter};

pub struct CollectionParser;

impl CollectionParser {
    /// `table`, `table alias` or `table AS alias`. Only the first entry of a
    /// comma-separated FROM list is taken.
    pub fn parse(text: &str) -> Option<TableRef> {
        let first = Splitter::split_commas(text).into_iter().next()?;
        let words = Self::words(&first);

        match words.as_slice() {
            [] => None,
            [name] => Some(TableRef::new(name.clone(), None)),
            [name, keyword, alias, ..] if keyword.eq_ignore_ascii_case("AS") => {
                Some(TableRef::new(name.clone(), Some(alias.clone())))
            }
            [name, alias, ..] => Some(TableRef::new(name.clone(), Some(alias.clone()))),
        }
    }

    /// Whitespace-separated words, keeping `[bracketed names]` and quoted
    /// identifiers whole.
    pub fn words(text: &str) -> Vec<String> {
        let mut words = vec![];
        let mut word = String::new();
        let mut closing: Option<char> = None;

        for ch in text.chars() {
            match closing {
                Some(close) => {
                    word.push(ch);
                    if ch == close {
                        closing = None;
                    }
                }
                None if ch.is_whitespace() => {
                    if !word.is_empty() {
                        words.push(std::mem::take(&mut word));
                    }
                }
                None => {
                    closing = match ch {
                        '[' => Some(']'),
                        '"' => Some('"'),
                        '`' => Some('`'),
                        _ => None,
                    };
                    word.push(ch);
                }
            }
        }
        if !word.is_empty() {
            words.push(word);
        }

        words
    }
}

#[cfg(test)]
mod tests {
    use crate::{model::TableRef, parser::ast::CollectionParser};

    #[test]
    pub fn test_collection() {
        assert_eq!(CollectionParser::parse("Employee"), Some(TableRef::new("Employee", None)));
    }

    #[test]
    pub fn test_collection_with_alias() {
        assert_eq!(CollectionParser::parse("Employee e"), Some(TableRef::new("Employee", Some("e".into()))));
        assert_eq!(CollectionParser::parse("Employee AS e"), Some(TableRef::new("Employee", Some("e".into()))));
    }

    #[test]
    pub fn test_collection_bracketed_name() {
        assert_eq!(
            CollectionParser::parse("[Sales Orders] so, Other"),
            Some(TableRef::new("[Sales Orders]", Some("so".into())))
        );
    }

    #[test]
    pub fn test_collection_empty() {
        assert_eq!(CollectionParser::parse("  "), None);
    }
}
