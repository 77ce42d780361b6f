use crate::parser::QueryParser;

/// Statement text with comments removed, plus the name carried by a leading
/// comment when there is one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StrippedStatement {
    pub text: String,
    pub name: Option<String>,
}

pub struct CommentStripper;

impl CommentStripper {
    /// Removes `--` and `/* */` comments outside quoted literals. Each comment
    /// is replaced by a single space so neighbouring tokens stay apart.
    pub fn strip(sql: &str) -> StrippedStatement {
        let mut parser = QueryParser::new(sql);
        let mut text = String::with_capacity(sql.len());
        let mut name: Option<String> = None;
        let mut seen_code = false;

        while !parser.eof() {
            let current = parser.current();

            if !parser.in_quote() && current == '-' && parser.peek(1) == '-' {
                parser.jump(2);
                let pivot = parser.position;
                while !parser.eof() && parser.current() != '\n' {
                    parser.next();
                }
                Self::capture_name(&mut name, seen_code, &parser.text_from_pivot(pivot));
                text.push(' ');
                continue;
            }

            if !parser.in_quote() && current == '/' && parser.peek(1) == '*' {
                parser.jump(2);
                let pivot = parser.position;
                while !parser.eof() && !(parser.current() == '*' && parser.peek(1) == '/') {
                    parser.next();
                }
                Self::capture_name(&mut name, seen_code, &parser.text_from_pivot(pivot));
                parser.jump(2);
                text.push(' ');
                continue;
            }

            if !current.is_whitespace() {
                seen_code = true;
            }
            text.push(current);
            // advance() steps over the escaped character as well
            if current == '\\' && parser.in_quote() && parser.peek(1) != '\0' {
                text.push(parser.peek(1));
            }
            parser.advance();
        }

        StrippedStatement { text: text.trim().to_string(), name }
    }

    fn capture_name(name: &mut Option<String>, seen_code: bool, comment: &str) {
        if seen_code || name.is_some() {
            return;
        }
        let comment = comment.trim();
        if !comment.is_empty() {
            *name = Some(comment.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::CommentStripper;

    #[test]
    pub fn test_strip_line_comment_name() {
        let stripped = CommentStripper::strip("-- Active staff\nSELECT Id FROM Employee -- trailing");

        assert_eq!(stripped.name.as_deref(), Some("Active staff"));
        assert_eq!(stripped.text, "SELECT Id FROM Employee");
    }

    #[test]
    pub fn test_strip_block_comment_name() {
        let stripped = CommentStripper::strip("/* Orders by region */ SELECT a /* inline */ FROM t");

        assert_eq!(stripped.name.as_deref(), Some("Orders by region"));
        assert_eq!(stripped.text, "SELECT a   FROM t");
    }

    #[test]
    pub fn test_comment_markers_inside_quotes_are_kept() {
        let stripped = CommentStripper::strip("SELECT a FROM t WHERE b = '--x' AND c = '/*y*/'");

        assert!(stripped.name.is_none());
        assert_eq!(stripped.text, "SELECT a FROM t WHERE b = '--x' AND c = '/*y*/'");
    }

    #[test]
    pub fn test_comment_after_code_is_not_a_name() {
        let stripped = CommentStripper::strip("SELECT a FROM t /* not a name */");

        assert!(stripped.name.is_none());
        assert_eq!(stripped.text, "SELECT a FROM t");
    }
}
