//! Protocol Buffers text format reader.
//!
//! Like the binary [`Reader`](crate::Reader), [`TextReader`] knows nothing
//! about schemas. The caller reads a field name with [`TextReader::tag`] and
//! then asks for the value type it expects:
//!
//! ```rust
//! use oxibin_protobuf::TextReader;
//!
//! let mut reader = TextReader::new("name: \"conv1\" dims: [1, 3] attr { f: 0.5 }");
//! let mut dims: Vec<i64> = Vec::new();
//! let mut f = 0.0;
//!
//! reader.start().unwrap();
//! while !reader.end().unwrap() {
//!     match reader.tag().unwrap() {
//!         "name" => assert_eq!(reader.string().unwrap(), "conv1"),
//!         "dims" => reader.array(&mut dims, |r| r.integer()).unwrap(),
//!         "attr" => {
//!             reader.start().unwrap();
//!             while !reader.end().unwrap() {
//!                 reader.tag().unwrap();
//!                 f = reader.float().unwrap();
//!             }
//!         }
//!         other => panic!("unknown field {other}"),
//!     }
//! }
//! assert_eq!(dims, [1, 3]);
//! assert_eq!(f, 0.5);
//! ```

mod escape;
mod lexer;

pub use lexer::Location;

use lexer::Lexer;
use oxibin_core::error::{OxiBinError, Result};

/// Contents of an expanded `google.protobuf.Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnyValue<'a> {
    /// Type URL between the brackets.
    pub type_url: &'a str,
    /// Raw source of the embedded message, without its braces.
    pub value: &'a str,
}

/// Cursor over a text-format message.
///
/// Tokens and captured values borrow from the source text.
#[derive(Debug, Clone)]
pub struct TextReader<'a> {
    lexer: Lexer<'a>,
    depth: usize,
    array_depth: usize,
}

impl<'a> TextReader<'a> {
    /// Create a reader over source text.
    pub fn new(text: &'a str) -> Self {
        Self {
            lexer: Lexer::new(text),
            depth: 0,
            array_depth: 0,
        }
    }

    /// Create a reader over raw bytes, which must be valid UTF-8.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        match std::str::from_utf8(data) {
            Ok(text) => Ok(Self::new(text)),
            Err(err) => {
                let valid = &data[..err.valid_up_to()];
                let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
                let line_start = valid
                    .iter()
                    .rposition(|&b| b == b'\n')
                    .map_or(0, |i| i + 1);
                let column = String::from_utf8_lossy(&valid[line_start..]).chars().count() + 1;
                Err(OxiBinError::text_syntax("Invalid UTF-8", line, column))
            }
        }
    }

    /// Current 1-based line and column.
    pub fn location(&self) -> Location {
        self.lexer.location()
    }

    /// Nesting depth of messages opened with [`start`](Self::start).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Look at the next token without consuming it. Empty at end of input.
    pub fn peek(&mut self) -> Result<&'a str> {
        self.lexer.peek()
    }

    /// Consume and return the next token. Empty at end of input.
    pub fn read(&mut self) -> Result<&'a str> {
        self.lexer.read()
    }

    /// Consume the next token if it equals `value`.
    pub fn match_token(&mut self, value: &str) -> Result<bool> {
        self.lexer.match_token(value)
    }

    /// Consume the next token, failing unless it equals `value`.
    pub fn expect(&mut self, value: &str) -> Result<()> {
        self.lexer.expect(value)
    }

    /// Enter a message.
    ///
    /// The outermost message has no braces; nested ones must open with `{`.
    pub fn start(&mut self) -> Result<()> {
        if self.depth > 0 {
            self.lexer.expect("{")?;
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave the current message if it is finished.
    ///
    /// Consumes a closing `}` (and an optional `;`) for nested messages.
    /// Returns `true` at that brace or at end of input.
    pub fn end(&mut self) -> Result<bool> {
        let token = self.lexer.peek()?;
        if self.depth > 0 && token == "}" {
            self.lexer.expect("}")?;
            self.lexer.match_token(";")?;
            self.depth -= 1;
            return Ok(true);
        }
        Ok(token.is_empty())
    }

    /// Read a field name and its `:` separator.
    ///
    /// The separator is optional before a message body or a list.
    pub fn tag(&mut self) -> Result<&'a str> {
        let name = self.lexer.read()?;
        if name.is_empty() {
            return Err(self.lexer.error("Unexpected end of input"));
        }
        let separator = self.lexer.peek()?;
        if separator != "{" && !separator.starts_with('[') {
            self.lexer.expect(":")?;
        }
        Ok(name)
    }

    /// Read an integer literal, decimal or `0x` hex, with optional sign.
    pub fn integer<T: TryFrom<i128>>(&mut self) -> Result<T> {
        let token = self.lexer.read()?;
        let value = parse_integer(token)
            .ok_or_else(|| self.lexer.error(format!("Couldn't parse integer '{token}'")))?;
        let value = T::try_from(value)
            .map_err(|_| self.lexer.error(format!("Integer '{token}' is out of range")))?;
        self.semicolon()?;
        Ok(value)
    }

    /// Read a floating point literal.
    ///
    /// Accepts `nan`, `inf`, `-inf` and a trailing `f` suffix.
    pub fn float(&mut self) -> Result<f64> {
        let token = self.lexer.read()?;
        let value = if token.starts_with("nan") {
            f64::NAN
        } else if token.starts_with("inf") {
            f64::INFINITY
        } else if token.starts_with("-inf") {
            f64::NEG_INFINITY
        } else {
            let digits = token
                .strip_suffix('f')
                .or_else(|| token.strip_suffix('F'))
                .unwrap_or(token);
            digits
                .parse::<f64>()
                .map_err(|_| self.lexer.error(format!("Couldn't parse float '{token}'")))?
        };
        self.semicolon()?;
        Ok(value)
    }

    /// Read a quoted string and return the text between the quotes.
    ///
    /// Escapes are left in place.
    pub fn string(&mut self) -> Result<&'a str> {
        let token = self.lexer.read()?;
        if token.len() < 2 {
            return Err(self.lexer.error("String is too short"));
        }
        let quote = token.as_bytes()[0];
        if quote != b'"' && quote != b'\'' {
            return Err(self.lexer.error("String is not in quotes"));
        }
        if token.as_bytes()[token.len() - 1] != quote {
            return Err(self.lexer.error("String quotes do not match"));
        }
        self.semicolon()?;
        Ok(&token[1..token.len() - 1])
    }

    /// Read a boolean: `true`, `True`, `1`, `false`, `False` or `0`.
    pub fn boolean(&mut self) -> Result<bool> {
        let token = self.lexer.read()?;
        let value = match token {
            "true" | "True" | "1" => true,
            "false" | "False" | "0" => false,
            _ => {
                return Err(self
                    .lexer
                    .error(format!("Couldn't parse boolean '{token}'")));
            }
        };
        self.semicolon()?;
        Ok(value)
    }

    /// Read a quoted bytes literal and decode its escapes.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let raw = self.string()?;
        escape::unescape_bytes(raw).map_err(|message| self.lexer.error(message))
    }

    /// Read an enum value by name, or as a bare integer.
    pub fn enum_value(&mut self, lookup: impl FnOnce(&str) -> Option<i32>) -> Result<i32> {
        let token = self.lexer.read()?;
        let value = match lookup(token) {
            Some(value) => value,
            None => parse_integer(token)
                .and_then(|value| i32::try_from(value).ok())
                .ok_or_else(|| self.lexer.error(format!("Couldn't parse enum '{token}'")))?,
        };
        self.semicolon()?;
        Ok(value)
    }

    /// Read a repeated field value: a bracketed list, or one bare element.
    pub fn array<T>(
        &mut self,
        out: &mut Vec<T>,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<()> {
        if self.first()? {
            while !self.last()? {
                out.push(item(self)?);
                self.next()?;
            }
        } else {
            out.push(item(self)?);
        }
        Ok(())
    }

    /// Open a list if the next token is `[`.
    pub fn first(&mut self) -> Result<bool> {
        if self.lexer.match_token("[")? {
            self.array_depth += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Close a list if the next token is `]`.
    pub fn last(&mut self) -> Result<bool> {
        if self.lexer.match_token("]")? {
            self.array_depth = self.array_depth.saturating_sub(1);
            self.semicolon()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Step over the `,` between list elements.
    pub fn next(&mut self) -> Result<()> {
        let token = self.lexer.peek()?;
        match token {
            "," => {
                self.lexer.read()?;
                Ok(())
            }
            "]" => Ok(()),
            _ => Err(self.unexpected(token)),
        }
    }

    /// Read a map entry block `{ key: ... value: ... }` and append it to `map`.
    ///
    /// Other fields in the block are skipped. A missing key or value takes
    /// its type's default.
    pub fn entry<K, V>(
        &mut self,
        map: &mut impl Extend<(K, V)>,
        mut key: impl FnMut(&mut Self) -> Result<K>,
        mut value: impl FnMut(&mut Self) -> Result<V>,
    ) -> Result<()>
    where
        K: Default,
        V: Default,
    {
        self.start()?;
        let mut entry_key = None;
        let mut entry_value = None;
        while !self.end()? {
            match self.tag()? {
                "key" => entry_key = Some(key(self)?),
                "value" => entry_value = Some(value(self)?),
                _ => {
                    self.skip()?;
                }
            }
        }
        map.extend(std::iter::once((
            entry_key.unwrap_or_default(),
            entry_value.unwrap_or_default(),
        )));
        Ok(())
    }

    /// Read an expanded `Any` body: `[type_url] { ... }` followed by the
    /// closing brace of the enclosing `Any` message.
    ///
    /// Returns `None`, consuming nothing, when the message is not in the
    /// expanded form.
    pub fn any(&mut self) -> Result<Option<AnyValue<'a>>> {
        let token = self.lexer.peek()?;
        let type_url = if token.len() > 2 && token.starts_with('[') && token.ends_with(']') {
            self.lexer.read()?;
            &token[1..token.len() - 1]
        } else if token == "[" {
            self.lexer.read()?;
            let start = self.lexer.offset();
            let text = self.lexer.text();
            let end = text[start..]
                .find(']')
                .map(|i| start + i)
                .filter(|&end| !text[start..end].contains('\n'))
                .ok_or_else(|| self.lexer.error("End of Any type_url not found"))?;
            let type_url = self.lexer.source(start, end)?.trim();
            self.lexer.skip_to(end + 1)?;
            type_url
        } else {
            return Ok(None);
        };

        let block = self.skip_message()?;
        let value = &block[1..block.len() - 1];
        if !self.end()? {
            let token = self.lexer.peek()?;
            return Err(self.unexpected(token));
        }
        Ok(Some(AnyValue { type_url, value }))
    }

    /// Consume the next value without interpreting it and return its raw
    /// source text: a scalar, a `{ ... }` message or a `[ ... ]` list.
    pub fn skip(&mut self) -> Result<&'a str> {
        match self.lexer.peek()? {
            "{" => self.skip_message(),
            "[" => self.skip_list(),
            "" => Err(self.lexer.error("Unexpected end of input")),
            _ => {
                let start = self.lexer.offset();
                self.lexer.read()?;
                let end = self.lexer.offset();
                self.semicolon()?;
                self.lexer.source(start, end)
            }
        }
    }

    fn skip_message(&mut self) -> Result<&'a str> {
        self.lexer.peek()?;
        let start = self.lexer.offset();
        self.lexer.expect("{")?;
        self.skip_balanced(start)
    }

    fn skip_list(&mut self) -> Result<&'a str> {
        self.lexer.peek()?;
        let start = self.lexer.offset();
        self.lexer.expect("[")?;
        self.skip_balanced(start)
    }

    /// Consume tokens until the bracket opened at `start` is closed.
    fn skip_balanced(&mut self, start: usize) -> Result<&'a str> {
        let mut nesting = 1usize;
        while nesting > 0 {
            match self.lexer.read()? {
                "{" | "[" => nesting += 1,
                "}" | "]" => nesting -= 1,
                "" => return Err(self.lexer.error("Unexpected end of input")),
                _ => {}
            }
        }
        let end = self.lexer.offset();
        self.semicolon()?;
        self.lexer.source(start, end)
    }

    /// Error for a token the caller did not expect.
    pub fn unexpected(&self, token: &str) -> OxiBinError {
        if token.is_empty() {
            return self.lexer.error("Unexpected end of input");
        }
        self.lexer.error(format!("Unexpected token '{token}'"))
    }

    /// Error for a field name the caller does not know.
    pub fn unknown_field(&self, name: &str) -> OxiBinError {
        self.lexer.error(format!("Unknown field '{name}'"))
    }

    fn semicolon(&mut self) -> Result<()> {
        if self.array_depth == 0 {
            self.lexer.match_token(";")?;
        }
        Ok(())
    }
}

fn parse_integer(token: &str) -> Option<i128> {
    let (negative, digits) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if !hex.starts_with(['+', '-']) => i128::from_str_radix(hex, 16).ok()?,
        Some(_) => return None,
        None => digits.parse::<i128>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}
