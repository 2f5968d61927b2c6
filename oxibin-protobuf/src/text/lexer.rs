//! Line-oriented tokenizer for the Protocol Buffers text format.

use oxibin_core::error::{OxiBinError, Result};
use std::fmt;

/// 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Splits source text into tokens, one peeked token at a time.
///
/// Whitespace and `#` comments are dropped. Tokens never span lines. End of
/// input is reported as the empty token.
#[derive(Debug, Clone)]
pub(crate) struct Lexer<'a> {
    text: &'a str,
    position: usize,
    /// Offset of the newline ending the current line; `None` before the first line.
    line_end: Option<usize>,
    line: usize,
    column: usize,
    peeked: Option<&'a str>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            line_end: None,
            line: 0,
            column: 0,
            peeked: None,
        }
    }

    pub(crate) fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the peeked token, or of the next unread byte.
    pub(crate) fn offset(&self) -> usize {
        self.position
    }

    pub(crate) fn location(&self) -> Location {
        Location {
            line: self.line.max(1),
            column: self.column + 1,
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> OxiBinError {
        let location = self.location();
        OxiBinError::text_syntax(message, location.line, location.column)
    }

    pub(crate) fn peek(&mut self) -> Result<&'a str> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.tokenize()?;
        self.peeked = Some(token);
        Ok(token)
    }

    pub(crate) fn read(&mut self) -> Result<&'a str> {
        let token = self.peek()?;
        self.position += token.len();
        self.column += token.chars().count();
        self.peeked = None;
        Ok(token)
    }

    pub(crate) fn expect(&mut self, value: &str) -> Result<()> {
        let token = self.peek()?;
        if token != value {
            return Err(self.error(format!("Unexpected '{token}' instead of '{value}'")));
        }
        self.read()?;
        Ok(())
    }

    pub(crate) fn match_token(&mut self, value: &str) -> Result<bool> {
        if self.peek()? == value {
            self.read()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Skip whitespace and comments, moving to the next line as needed.
    /// Returns `false` at end of input.
    fn whitespace(&mut self) -> bool {
        let text = self.text;
        let bytes = text.as_bytes();
        loop {
            while self.line_end.is_none_or(|end| self.position >= end) {
                self.column = 0;
                self.position = self.line_end.map_or(0, |end| end + 1);
                if self.position >= bytes.len() {
                    self.position = bytes.len();
                    self.line_end = Some(bytes.len());
                    return false;
                }
                let end = bytes[self.position..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |i| self.position + i);
                self.line_end = Some(end);
                self.line += 1;
            }

            match bytes[self.position] {
                b'\t' | b'\r' | b' ' => {
                    self.position += 1;
                    self.column += 1;
                }
                b'#' => {
                    self.position = self.line_end.unwrap_or(bytes.len());
                    self.column = 0;
                }
                _ => return true,
            }
        }
    }

    fn tokenize(&mut self) -> Result<&'a str> {
        if !self.whitespace() {
            return Ok("");
        }

        let text = self.text;
        let bytes = text.as_bytes();
        let start = self.position;
        let line_end = self.line_end.unwrap_or(bytes.len());
        let c = bytes[start];

        if c == b'[' {
            if let Some(end) = self.type_url_end(start, line_end) {
                return self.slice(start, end);
            }
        }

        if matches!(c, b'{' | b'}' | b':' | b'[' | b',' | b']' | b';') {
            return self.slice(start, start + 1);
        }

        let run = |accept: fn(u8) -> bool| {
            bytes[start + 1..line_end]
                .iter()
                .position(|&b| !accept(b))
                .map_or(line_end, |i| start + 1 + i)
        };

        if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
            let end = run(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'+' | b'-'));
            return self.slice(start, end);
        }

        if c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.') {
            let end = run(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'+' | b'-' | b'.'));
            return self.slice(start, end);
        }

        if c == b'"' || c == b'\'' {
            let mut end = start + 1;
            while end < line_end {
                let b = bytes[end];
                if b == b'\\' {
                    end += 2;
                    continue;
                }
                end += 1;
                if b == c {
                    break;
                }
            }
            return self.slice(start, end.min(line_end));
        }

        let found = self.text[start..].chars().next().unwrap_or('\u{FFFD}');
        Err(self.error(format!("Unexpected token '{found}'")))
    }

    /// End of a `[type.url/Name]` token starting at `start`.
    ///
    /// The name must start with a letter and contain a `.` or `/`, so that
    /// single-element lists such as `[FOO]` stay lists.
    fn type_url_end(&self, start: usize, line_end: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        if start + 2 >= line_end || !bytes[start + 1].is_ascii_alphabetic() {
            return None;
        }
        let mut qualified = false;
        for (i, &b) in bytes[start + 2..line_end].iter().enumerate() {
            match b {
                b']' => return qualified.then_some(start + 2 + i + 1),
                b'.' | b'/' => qualified = true,
                b if b.is_ascii_alphanumeric() || b == b'_' => {}
                _ => return None,
            }
        }
        None
    }

    fn slice(&self, start: usize, end: usize) -> Result<&'a str> {
        self.text
            .get(start..end)
            .ok_or_else(|| self.error("Token splits a multi-byte character"))
    }

    /// Jump forward to `offset` on the current line without tokenizing.
    pub(crate) fn skip_to(&mut self, offset: usize) -> Result<()> {
        let line_end = self.line_end.unwrap_or(self.text.len());
        if offset < self.position || offset > line_end {
            return Err(self.error("Cannot skip past the end of the line"));
        }
        self.column += self.slice(self.position, offset)?.chars().count();
        self.position = offset;
        self.peeked = None;
        Ok(())
    }

    /// Raw text between two byte offsets.
    pub(crate) fn source(&self, start: usize, end: usize) -> Result<&'a str> {
        self.slice(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        let mut lexer = Lexer::new(text);
        let mut out = Vec::new();
        loop {
            let token = lexer.read().unwrap();
            if token.is_empty() {
                return out;
            }
            out.push(token);
        }
    }

    #[test]
    fn test_punctuation_and_names() {
        assert_eq!(
            tokens("a { b: 1; c: [1, 2] }"),
            vec!["a", "{", "b", ":", "1", ";", "c", ":", "[", "1", ",", "2", "]", "}"]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        assert_eq!(
            tokens("# header\nx: 1 # trailing\n\n\ty: -2.5e3f\r\n"),
            vec!["x", ":", "1", "y", ":", "-2.5e3f"]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokens(r#"s: "a \"quoted\" word" t: 'single'"#),
            vec!["s", ":", r#""a \"quoted\" word""#, "t", ":", "'single'"]
        );
        // An unterminated string stops at the end of its line.
        assert_eq!(tokens("s: \"open\nx"), vec!["s", ":", "\"open", "x"]);
    }

    #[test]
    fn test_type_url() {
        assert_eq!(
            tokens("[type.googleapis.com/pkg.Msg] { }"),
            vec!["[type.googleapis.com/pkg.Msg]", "{", "}"]
        );
        assert_eq!(tokens("[FOO]"), vec!["[", "FOO", "]"]);
        assert_eq!(tokens("[a, b]"), vec!["[", "a", ",", "b", "]"]);
    }

    #[test]
    fn test_location() {
        let mut lexer = Lexer::new("a: 1\n  bad: ?");
        for _ in 0..5 {
            lexer.read().unwrap();
        }
        let err = lexer.read().unwrap_err();
        assert!(matches!(
            err,
            OxiBinError::TextSyntax {
                line: 2,
                column: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_unicode_string_column() {
        let mut lexer = Lexer::new("s: \"héllo\" t");
        lexer.read().unwrap();
        lexer.read().unwrap();
        assert_eq!(lexer.read().unwrap(), "\"héllo\"");
        assert_eq!(lexer.peek().unwrap(), "t");
        assert_eq!(lexer.location(), Location { line: 1, column: 12 });
    }
}
