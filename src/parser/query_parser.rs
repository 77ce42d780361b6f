use crate::parser::{Phase, QueryComparers, WordComparer};

/// Character cursor over a statement fragment.
///
/// Besides the position it tracks quote state (single or double quotes with
/// naive backslash escapes) and parenthesis depth, so callers can ask whether
/// the cursor sits at the top level of the text.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub phase: Phase,
    pub parentheses_depth: usize,
    pub quote: Option<char>,

    pub comparers: QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            comparers: QueryComparers::new(),
            ..Default::default()
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.char_at(self.position)
    }

    pub fn char_at(&self, position: usize) -> char {
        if position < self.length {
            return self.text_v[position];
        }

        '\0'
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.char_at(self.position + ahead)
    }

    pub fn previous(&self) -> char {
        match self.position {
            0 => '\0',
            position => self.char_at(position - 1),
        }
    }

    pub fn next(&mut self) {
        self.position += 1;
    }

    /// Moves one character forward, updating quote and parenthesis state for
    /// the character being left behind.
    pub fn advance(&mut self) {
        let current = self.current();
        match self.quote {
            Some(quote) => {
                if current == '\\' {
                    self.position += 1;
                } else if current == quote {
                    self.quote = None;
                }
            }
            None => match current {
                '\'' | '"' => self.quote = Some(current),
                '(' => self.parentheses_depth += 1,
                ')' => self.parentheses_depth = self.parentheses_depth.saturating_sub(1),
                _ => {}
            },
        }
        self.position += 1;
    }

    pub fn at_top_level(&self) -> bool {
        self.quote.is_none() && self.parentheses_depth == 0
    }

    pub fn in_quote(&self) -> bool {
        self.quote.is_some()
    }

    pub fn next_non_whitespace(&mut self) {
        while !self.eof() && self.current().is_whitespace() {
            self.next();
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    /// Jumps over one of this parser's own keywords when it matches at the
    /// cursor.
    pub fn consume_keyword(&mut self, pick: impl Fn(&QueryComparers) -> &WordComparer) -> bool {
        match pick(&self.comparers).matches(self) {
            Some(length) => {
                self.jump(length);
                true
            }
            None => false,
        }
    }

    /// Advances to the next top-level occurrence of a phase keyword with a
    /// phase greater than the current one (joins may repeat) and returns the
    /// phase found together with the keyword length. The cursor is left on
    /// the keyword's first character.
    pub fn seek_next_phase(&mut self) -> Option<(Phase, usize)> {
        while !self.eof() {
            if self.at_top_level() && self.comparers.at_word_start(self) {
                if let Some(found) = self.check_next_phase() {
                    return Some(found);
                }
            }
            self.advance();
        }

        self.phase = Phase::EOF;
        None
    }

    /// Phase keyword at the cursor, if it may follow the current phase.
    pub fn check_next_phase(&self) -> Option<(Phase, usize)> {
        let comparers = &self.comparers;

        if self.phase < Phase::Limit {
            if let Some(length) = comparers.limit.matches(self) {
                return Some((Phase::Limit, length));
            }
        }

        if self.phase < Phase::OrderBy {
            if let Some(length) = comparers.order_by.matches(self) {
                return Some((Phase::OrderBy, length));
            }
        }

        if self.phase < Phase::Having {
            if let Some(length) = comparers.having.matches(self) {
                return Some((Phase::Having, length));
            }
        }

        if self.phase < Phase::GroupBy {
            if let Some(length) = comparers.group_by.matches(self) {
                return Some((Phase::GroupBy, length));
            }
        }

        if self.phase < Phase::Where {
            if let Some(length) = comparers.r#where.matches(self) {
                return Some((Phase::Where, length));
            }
        }

        if self.phase >= Phase::From && self.phase <= Phase::Joins {
            if let Some((_, length)) = comparers.join_keyword(self) {
                return Some((Phase::Joins, length));
            }
        }

        if self.phase < Phase::From {
            if let Some(length) = comparers.from.matches(self) {
                return Some((Phase::From, length));
            }
        }

        None
    }
}
