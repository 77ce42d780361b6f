use crate::parser::QueryParser;

/// Case-insensitive keyword matcher. A space inside the keyword matches any
/// run of whitespace in the text, so `GROUP   BY` and `GROUP\nBY` both match
/// `GROUP BY`.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub word: Vec<char>,
    whitespace_postfix: bool,
    full_block_delimiter_postfix: bool,
    eof: bool,
    delimiter: Option<char>,
    optional_postfix: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        Self {
            word: word.to_uppercase().chars().collect(),
            ..Default::default()
        }
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        ch == ',' || ch == '(' || ch == ')' || ch == '.' || ch == '\0' || Self::is_block_delimiter(ch)
    }

    pub fn is_break_line(ch: char) -> bool {
        ch == '\r' || ch == '\n'
    }

    /// Length of the text matched at the cursor, or `None`.
    pub fn matches(&self, parser: &QueryParser) -> Option<usize> {
        self.matches_at(parser, parser.position)
    }

    pub fn matches_at(&self, parser: &QueryParser, start: usize) -> Option<usize> {
        let mut position = start;
        let mut index = 0;
        while index < self.word.len() {
            let expected = self.word[index];
            if expected == ' ' {
                if !Self::is_block_delimiter(parser.char_at(position)) {
                    return None;
                }
                while Self::is_block_delimiter(parser.char_at(position)) {
                    position += 1;
                }
            } else {
                if position >= parser.length || parser.text_v[position].to_ascii_uppercase() != expected {
                    return None;
                }
                position += 1;
            }
            index += 1;
        }

        let matched = position - start;
        if position >= parser.length {
            return if self.eof { Some(matched) } else { None };
        }

        if self.delimiter.is_none() && !self.full_block_delimiter_postfix && !self.whitespace_postfix &&
            self.optional_postfix.is_empty() {
            return Some(matched);
        }

        let next = parser.text_v[position];

        if self.delimiter.is_some_and(|delimiter| delimiter == next) {
            return Some(matched);
        }

        if self.full_block_delimiter_postfix && Self::is_any_delimiter(next) {
            return Some(matched);
        }

        if self.whitespace_postfix && Self::is_block_delimiter(next) {
            return Some(matched);
        }

        if self.optional_postfix.contains(&next) {
            return Some(matched);
        }

        None
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        self.matches(parser).is_some()
    }

    /// Jumps over the keyword when it matches at the cursor.
    pub fn consume(&self, parser: &mut QueryParser) -> bool {
        match self.matches(parser) {
            Some(length) => {
                parser.jump(length);
                true
            }
            None => false,
        }
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_whitespace_postfix(mut self) -> Self { self.whitespace_postfix = true; self }
    pub fn with_any_delimiter_postfix(mut self) -> Self { self.full_block_delimiter_postfix = true; self }
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiter = Some(delimiter); self }
    pub fn with_optional_postfix(mut self, value: char) -> Self { self.optional_postfix.push(value); self }
}
