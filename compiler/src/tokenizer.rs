use regex::{Match, Regex};
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::CclError;

lazy_static! {
    /// Whitespace and `//` comments, skipped between tokens.
    static ref TRIVIA: Regex = Regex::new(r"^(?://[^\n]*|\s+)").unwrap();

    /// One token. A number must end at a word boundary, so `3abc` is an error
    /// rather than `3` followed by `abc`.
    static ref TOKEN:  Regex = Regex::new(r"^(?:[0-9]+\b|[A-Za-z_][A-Za-z0-9_]*|\[\]|[=;{}])").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Walks the source text, keeping the 1-based line and column of the next
/// unread character.
struct Cursor<'a> {
    rest:   &'a str,
    line:   usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Cursor<'a> {
        Cursor { rest: text, line: 1, column: 1 }
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn take(&mut self, regex: &Regex) -> Option<Match<'a>> {
        let found = regex.find(self.rest)?;
        for c in found.as_str().chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.rest = &self.rest[found.end()..];
        Some(found)
    }

    /// A syntax error quoting the unreadable text up to the next whitespace.
    fn unexpected(&self) -> CclError {
        let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
        error(&format!("Syntax error: {}", quote(&self.rest[..end])), self.line, self.column)
    }
}

/// Splits schema text into tokens, dropping whitespace and `//` comments.
/// The last token is always an empty end-of-input marker.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, CclError> {
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();

    while !cursor.at_end() {
        if cursor.take(&TRIVIA).is_some() {
            continue;
        }
        let (line, column) = (cursor.line, cursor.column);
        match cursor.take(&TOKEN) {
            Some(found) => tokens.push(Token { text: found.as_str().to_string(), line, column }),
            None => return Err(cursor.unexpected()),
        }
    }

    tokens.push(Token { text: String::new(), line: cursor.line, column: cursor.column });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error(input: &str) -> (String, usize, usize) {
        match tokenize_schema(input).unwrap_err() {
            CclError::ParseError { msg, line, column } => (msg, line, column),
            other => panic!("expected a ParseError but got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_simple() {
        let input = "model Point = 3 {";
        let expected = vec![
            Token { text: "model".into(), line: 1, column: 1 },
            Token { text: "Point".into(), line: 1, column: 7 },
            Token { text: "=".into(),     line: 1, column: 13 },
            Token { text: "3".into(),     line: 1, column: 15 },
            Token { text: "{".into(),     line: 1, column: 17 },
            Token { text: "".into(),      line: 1, column: 18 },
        ];
        assert_eq!(tokenize_schema(input).unwrap(), expected);
    }

    #[test]
    fn test_tokenize_array_field() {
        let input = "Points []Point;";
        let expected = vec![
            Token { text: "Points".into(), line: 1, column: 1 },
            Token { text: "[]".into(),     line: 1, column: 8 },
            Token { text: "Point".into(),  line: 1, column: 10 },
            Token { text: ";".into(),      line: 1, column: 15 },
            Token { text: "".into(),       line: 1, column: 16 },
        ];
        assert_eq!(tokenize_schema(input).unwrap(), expected);
    }

    #[test]
    fn test_tokenize_comments_and_lines() {
        let input = "// shapes\npackage shapes; // trailing\n  model";
        let got = tokenize_schema(input).unwrap();
        let texts: Vec<&str> = got.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["package", "shapes", ";", "model", ""]);
        assert_eq!((got[0].line, got[0].column), (2, 1));
        assert_eq!((got[3].line, got[3].column), (3, 3));
        assert_eq!((got[4].line, got[4].column), (3, 8));
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        assert_eq!(syntax_error("model Point @"), ("Syntax error: \"@\"".to_string(), 1, 13));
    }

    #[test]
    fn test_tokenize_rejects_minus_sign() {
        assert_eq!(syntax_error("model A = -1 {}"), ("Syntax error: \"-1\"".to_string(), 1, 11));
    }

    #[test]
    fn test_tokenize_rejects_number_glued_to_name() {
        assert_eq!(syntax_error("model A = 3abc {}"), ("Syntax error: \"3abc\"".to_string(), 1, 11));
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert_eq!(tokenize_schema("").unwrap(), vec![Token { text: "".into(), line: 1, column: 1 }]);
    }
}
