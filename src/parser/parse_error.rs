use crate::parser::QueryParser;

/// Positional failure inside the boolean-expression parser. It never leaves
/// the crate: filter building logs it and falls back to a flat split.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ParseError: {message}\n  at [{start}:{end}] -> '{text}'")]
pub struct ParseError {
    pub message: String,
    /// Source text from `start` up to and including the cursor.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl ParseError {
    pub fn new(message: &str, pivot: usize, parser: &QueryParser) -> Self {
        Self {
            message: message.to_string(),
            text: parser.text_from_range(pivot, parser.position + 1),
            start: pivot,
            end: parser.position,
        }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ParseError, QueryParser};

    #[test]
    pub fn test_parse_error_display() {
        let mut parser = QueryParser::new("a = (1");
        parser.jump(4);

        let err = ParseError::new("Unbalanced parentheses", 4, &parser);

        assert_eq!(err.text, "(");
        assert_eq!(err.to_string(), "ParseError: Unbalanced parentheses\n  at [4:4] -> '('");
    }

    #[test]
    pub fn test_parse_error_at_end_of_text() {
        let mut parser = QueryParser::new("a = 1 AND");
        parser.jump(9);

        let err = ParseError::new("Missing condition", 6, &parser);

        assert_eq!(err.text, "AND");
        assert_eq!((err.start, err.end), (6, 9));
    }
}
