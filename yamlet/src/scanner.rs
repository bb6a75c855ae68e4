//! Tokenizing documents
//!
//! The scanner makes a single left-to-right pass over the input and
//! produces a flat list of [`Token`]s.  Every token knows its line and the
//! indentation of that line, which is all the loader needs to recover the
//! block structure.

use crate::types::Marker;

use once_cell::sync::Lazy;
use regex::Regex;

use std::error::Error;
use std::fmt::{self, Display};

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap());
static HEXADECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?0x[0-9a-fA-F]+$").unwrap());
static OCTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?0o[0-7]+$").unwrap());
static BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0b[01]+$").unwrap());
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$").unwrap());

/// The kinds of token the scanner produces
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A `%` directive line, recorded but not interpreted
    Directive,
    /// The `---` document start marker
    DocumentStart,
    /// A `-` block sequence entry marker
    ListItem,
    /// A scalar immediately followed by a colon
    Key,
    /// The `:` separating a key from its value
    Colon,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// The `&` anchor sigil
    Anchor,
    /// The `*` alias sigil
    Alias,
    /// The `!` tag sigil
    Tag,
    /// The `|` literal block scalar header
    Literal,
    /// The `>` folded block scalar header
    Folded,
    /// A `'` which does not belong to a word
    SingleQuote,
    /// A `"` which does not belong to a word
    DoubleQuote,
    /// A plain or quoted string scalar
    String,
    /// A decimal integer scalar
    Integer,
    /// A `0x` prefixed integer scalar
    Hexadecimal,
    /// A `0o` prefixed integer scalar
    Octal,
    /// A `0b` prefixed integer scalar
    Binary,
    /// A floating point scalar
    Float,
    /// A boolean scalar
    Bool,
    /// A null scalar
    Null,
}

impl TokenKind {
    /// Whether tokens of this kind are leaf values
    ///
    /// ```
    /// # use yamlet::TokenKind;
    /// assert!(TokenKind::Hexadecimal.is_scalar());
    /// assert!(!TokenKind::Key.is_scalar());
    /// ```
    pub fn is_scalar(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            String | Integer | Hexadecimal | Octal | Binary | Float | Bool | Null
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let name = match self {
            Directive => "directive",
            DocumentStart => "document start",
            ListItem => "list item",
            Key => "key",
            Colon => "colon",
            LeftParen => "left parenthesis",
            RightParen => "right parenthesis",
            LeftBracket => "left bracket",
            RightBracket => "right bracket",
            LeftBrace => "left brace",
            RightBrace => "right brace",
            Anchor => "anchor",
            Alias => "alias",
            Tag => "tag",
            Literal => "literal block",
            Folded => "folded block",
            SingleQuote => "single quote",
            DoubleQuote => "double quote",
            String => "string",
            Integer => "integer",
            Hexadecimal => "hexadecimal integer",
            Octal => "octal integer",
            Binary => "binary integer",
            Float => "float",
            Bool => "boolean",
            Null => "null",
        };
        f.write_str(name)
    }
}

/// A classified piece of the input
///
/// Tokens are immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    line: usize,
    indent: usize,
}

impl Token {
    /// Create a new token
    ///
    /// Tokens normally come from [`tokenize`], but you can build your own
    /// stream and hand it to [`assemble`][crate::assemble].
    ///
    /// ```
    /// # use yamlet::{Token, TokenKind};
    /// let token = Token::new(TokenKind::Integer, "42", 1, 0);
    /// assert_eq!(token.text(), "42");
    /// ```
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, indent: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            indent,
        }
    }

    /// The kind of this token
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The raw text captured for this token
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The line this token came from, 1-indexed
    pub fn line(&self) -> usize {
        self.line
    }

    /// The number of leading spaces on this token's line
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// The position of this token as a marker
    pub fn marker(&self) -> Marker {
        Marker::new(self.line, self.indent)
    }
}

/// An error raised while tokenizing
///
/// The only thing the scanner refuses is a sigil (`&`, `*` or `!`) which
/// does not bind to a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    character: char,
    marker: Marker,
}

impl ScanError {
    fn new(character: char, marker: Marker) -> Self {
        Self { character, marker }
    }

    /// The character which could not be scanned
    pub fn character(&self) -> char {
        self.character
    }

    /// Where the character was found
    pub fn marker(&self) -> Marker {
        self.marker
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: unexpected character {:?}",
            self.marker, self.character
        )
    }
}

impl Error for ScanError {}

/// Bytes which may form part of a word.  Anything outside ASCII counts so
/// that UTF-8 text stays in one piece.
fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || !byte.is_ascii()
}

fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r')
}

fn leading_spaces(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| b == b' ').count()
}

fn is_quoted(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2
        && matches!(bytes[0], b'\'' | b'"')
        && bytes[bytes.len() - 1] == bytes[0]
}

/// Decide which kind of scalar a lexeme is
pub(crate) fn classify(text: &str) -> TokenKind {
    if is_quoted(text) {
        TokenKind::String
    } else if DECIMAL.is_match(text) {
        TokenKind::Integer
    } else if HEXADECIMAL.is_match(text) {
        TokenKind::Hexadecimal
    } else if OCTAL.is_match(text) {
        TokenKind::Octal
    } else if BINARY.is_match(text) {
        TokenKind::Binary
    } else if FLOAT.is_match(text) {
        TokenKind::Float
    } else {
        match text {
            "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => TokenKind::Bool,
            "null" | "Null" | "NULL" => TokenKind::Null,
            _ => TokenKind::String,
        }
    }
}

/// Strip the quotes from a quoted lexeme
pub(crate) fn unquote(text: &str) -> &str {
    if is_quoted(text) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    indent: usize,
    pending: Option<usize>,
    flow_depth: usize,
    started: bool,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        Self {
            text,
            bytes,
            pos: 0,
            line: 1,
            indent: leading_spaces(bytes),
            pending: None,
            flow_depth: 0,
            started: false,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn previous(&self) -> Option<u8> {
        self.pos
            .checked_sub(1)
            .and_then(|p| self.bytes.get(p))
            .copied()
    }

    fn marker(&self) -> Marker {
        Marker::new(self.line, self.indent)
    }

    fn emit(&mut self, kind: TokenKind, text: &str) {
        if kind != TokenKind::Directive {
            self.started = true;
        }
        self.tokens
            .push(Token::new(kind, text, self.line, self.indent));
    }

    fn accumulate(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.pos);
        }
    }

    /// Emit whatever lexeme is pending, ending just before the current byte
    fn finalize(&mut self) {
        if let Some(start) = self.pending.take() {
            let source = self.text;
            let text = &source[start..self.pos];
            let kind = if self.peek(0) == Some(b':') {
                TokenKind::Key
            } else {
                classify(text)
            };
            self.emit(kind, text);
        }
    }

    /// Move to the last byte before the next newline
    fn skip_to_end_of_line(&mut self) {
        match self.bytes[self.pos..].iter().position(|&b| b == b'\n') {
            Some(offset) => self.pos += offset - 1,
            None => self.pos = self.bytes.len() - 1,
        }
    }

    /// Whether the blank at the current position sits between two words
    fn blank_is_interior(&self) -> bool {
        self.pending.is_some()
            && self.bytes[self.pos..]
                .iter()
                .find(|&&b| !is_blank(b))
                .is_some_and(|&b| is_word(b))
    }

    fn scan(mut self) -> Result<Vec<Token>, ScanError> {
        while let Some(byte) = self.peek(0) {
            match byte {
                b'\n' => {
                    self.finalize();
                    self.line += 1;
                    self.indent = leading_spaces(&self.bytes[self.pos + 1..]);
                }
                b' ' | b'\t' | b'\r' => {
                    if !self.blank_is_interior() {
                        self.finalize();
                    }
                }
                b':' => {
                    self.finalize();
                    self.emit(TokenKind::Colon, ":");
                }
                b'#' => {
                    self.finalize();
                    self.skip_to_end_of_line();
                }
                b'[' | b'{' => {
                    self.finalize();
                    self.flow_depth += 1;
                    let (kind, text) = if byte == b'[' {
                        (TokenKind::LeftBracket, "[")
                    } else {
                        (TokenKind::LeftBrace, "{")
                    };
                    self.emit(kind, text);
                }
                b']' | b'}' => {
                    self.finalize();
                    self.flow_depth = self.flow_depth.saturating_sub(1);
                    let (kind, text) = if byte == b']' {
                        (TokenKind::RightBracket, "]")
                    } else {
                        (TokenKind::RightBrace, "}")
                    };
                    self.emit(kind, text);
                }
                b'(' => {
                    self.finalize();
                    self.emit(TokenKind::LeftParen, "(");
                }
                b')' => {
                    self.finalize();
                    self.emit(TokenKind::RightParen, ")");
                }
                b',' if self.flow_depth > 0 => self.finalize(),
                b'\'' | b'"' => {
                    let in_word = self.peek(1).is_some_and(is_word)
                        || self.previous().is_some_and(is_word);
                    if in_word {
                        self.accumulate();
                    } else {
                        self.finalize();
                        let (kind, text) = if byte == b'\'' {
                            (TokenKind::SingleQuote, "'")
                        } else {
                            (TokenKind::DoubleQuote, "\"")
                        };
                        self.emit(kind, text);
                    }
                }
                // Punctuation inside a word is just part of the word
                b'-' | b'&' | b'*' | b'!' | b'|' | b'>' | b'%' if self.pending.is_some() => {
                    self.accumulate();
                }
                b'-' => self.scan_dash(),
                b'&' | b'*' | b'!' => self.scan_sigil(byte)?,
                b'|' | b'>' => self.scan_block_header(byte),
                b'%' => {
                    let source = self.text;
                    let start = self.pos;
                    self.skip_to_end_of_line();
                    let text = source[start..=self.pos].trim_end();
                    self.emit(TokenKind::Directive, text);
                }
                _ => self.accumulate(),
            }
            self.pos += 1;
        }
        self.finalize();
        Ok(self.tokens)
    }

    fn scan_dash(&mut self) {
        if !self.started && self.bytes[self.pos..].starts_with(b"---") {
            self.emit(TokenKind::DocumentStart, "---");
            self.pos += 2;
        } else if self.starts_negative_number() {
            self.accumulate();
        } else {
            self.emit(TokenKind::ListItem, "-");
        }
    }

    /// A dash followed by a digit, or by a dot and a digit, signs a number
    fn starts_negative_number(&self) -> bool {
        match self.peek(1) {
            Some(b'.') => self.peek(2).is_some_and(|b| b.is_ascii_digit()),
            next => next.is_some_and(|b| b.is_ascii_digit()),
        }
    }

    fn scan_sigil(&mut self, byte: u8) -> Result<(), ScanError> {
        if !self.peek(1).is_some_and(is_word) {
            return Err(ScanError::new(char::from(byte), self.marker()));
        }
        let (kind, text) = match byte {
            b'&' => (TokenKind::Anchor, "&"),
            b'*' => (TokenKind::Alias, "*"),
            _ => (TokenKind::Tag, "!"),
        };
        self.emit(kind, text);
        Ok(())
    }

    fn scan_block_header(&mut self, byte: u8) {
        let kind = if byte == b'|' {
            TokenKind::Literal
        } else {
            TokenKind::Folded
        };
        let start = self.pos;
        if matches!(self.peek(1), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let source = self.text;
        self.emit(kind, &source[start..=self.pos]);
    }
}

/// Split a document into tokens
///
/// ```
/// # use yamlet::{tokenize, TokenKind};
/// let tokens = tokenize("value: 42").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
/// assert_eq!(kinds, [TokenKind::Key, TokenKind::Colon, TokenKind::Integer]);
/// assert_eq!(tokens[0].text(), "value");
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(text).scan()
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenKind::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().iter().map(Token::kind).collect()
    }

    fn texts(text: &str) -> Vec<std::string::String> {
        tokenize(text)
            .unwrap()
            .iter()
            .map(|t| t.text().to_string())
            .collect()
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("\n\n   \n").unwrap().is_empty());
    }

    #[test]
    fn key_value_pairs() {
        assert_eq!(kinds("a: 1\nb: two\n"), [Key, Colon, Integer, Key, Colon, String]);
        assert_eq!(texts("a: 1\nb: two\n"), ["a", ":", "1", "b", ":", "two"]);
    }

    #[test]
    fn lines_and_indentation() {
        let tokens = tokenize("top:\n  inner: 1\n    - x\n").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.line(), t.indent())).collect();
        assert_eq!(
            positions,
            [(1, 0), (1, 0), (2, 2), (2, 2), (2, 2), (3, 4), (3, 4)]
        );
    }

    #[test]
    fn first_line_indent_is_counted() {
        let tokens = tokenize("   a: 1").unwrap();
        assert!(tokens.iter().all(|t| t.indent() == 3));
    }

    #[test]
    fn tabs_are_not_indentation() {
        let tokens = tokenize("\ta: 1").unwrap();
        assert_eq!(tokens[0].indent(), 0);
        assert_eq!(tokens[0].text(), "a");
    }

    #[test]
    fn scalar_classification() {
        assert_eq!(classify("42"), Integer);
        assert_eq!(classify("-42"), Integer);
        assert_eq!(classify("0"), Integer);
        assert_eq!(classify("0x2A"), Hexadecimal);
        assert_eq!(classify("-0x2a"), Hexadecimal);
        assert_eq!(classify("0o52"), Octal);
        assert_eq!(classify("0b101010"), Binary);
        assert_eq!(classify("3.14"), Float);
        assert_eq!(classify(".5"), Float);
        assert_eq!(classify("1e10"), Float);
        assert_eq!(classify("007"), Float);
        assert_eq!(classify("True"), Bool);
        assert_eq!(classify("FALSE"), Bool);
        assert_eq!(classify("NULL"), Null);
        assert_eq!(classify("yes"), String);
        assert_eq!(classify("0x"), String);
        assert_eq!(classify("'42'"), String);
        assert_eq!(classify("1.2.3"), String);
    }

    #[test]
    fn keys_are_never_retyped() {
        assert_eq!(kinds("42: answer"), [Key, Colon, String]);
        assert_eq!(kinds("true: 1"), [Key, Colon, Integer]);
    }

    #[test]
    fn space_before_colon_is_not_a_key() {
        assert_eq!(kinds("a : 1"), [String, Colon, Integer]);
    }

    #[test]
    fn multi_word_scalars() {
        assert_eq!(texts("msg: hello big  world  "), ["msg", ":", "hello big  world"]);
        assert_eq!(texts("long key: v"), ["long key", ":", "v"]);
    }

    #[test]
    fn comments_are_discarded() {
        assert_eq!(texts("a: 1 # one\n# whole line\nb: 2#two"), ["a", ":", "1", "b", ":", "2"]);
    }

    #[test]
    fn negative_numbers_and_list_items() {
        assert_eq!(kinds("- -5\n- x"), [ListItem, Integer, ListItem, String]);
        assert_eq!(texts("- -5"), ["-", "-5"]);
        assert_eq!(kinds("f: -.5"), [Key, Colon, Float]);
        assert_eq!(texts("- -.5"), ["-", "-.5"]);
        assert_eq!(kinds("- -.x"), [ListItem, ListItem, String]);
    }

    #[test]
    fn punctuation_inside_words() {
        let words: Vec<_> = tokenize("a: foo-bar\nb: 2024-01-05\nc: Hello!\nd: don't\ne: 50%")
            .unwrap()
            .into_iter()
            .filter(|t| t.kind() == String)
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(words, ["foo-bar", "2024-01-05", "Hello!", "don't", "50%"]);
    }

    #[test]
    fn document_start_only_before_content() {
        assert_eq!(kinds("---\na: 1"), [DocumentStart, Key, Colon, Integer]);
        assert_eq!(kinds("%YAML 1.2\n---\na: 1"), [Directive, DocumentStart, Key, Colon, Integer]);
        assert_eq!(kinds("a: 1\n---"), [Key, Colon, Integer, ListItem, ListItem, ListItem]);
    }

    #[test]
    fn directives_capture_the_line() {
        let tokens = tokenize("%TAG ! tag:example.com,2000:  \r\na: 1").unwrap();
        assert_eq!(tokens[0].kind(), Directive);
        assert_eq!(tokens[0].text(), "%TAG ! tag:example.com,2000:");
        assert_eq!(tokens[1].line(), 2);
    }

    #[test]
    fn flow_collections() {
        assert_eq!(
            kinds("x: [1, 2, 3]"),
            [Key, Colon, LeftBracket, Integer, Integer, Integer, RightBracket]
        );
        assert_eq!(
            kinds("x: {a: 1, b: c d}"),
            [Key, Colon, LeftBrace, Key, Colon, Integer, Key, Colon, String, RightBrace]
        );
        assert_eq!(texts("x: a, b"), ["x", ":", "a, b"]);
    }

    #[test]
    fn commas_outside_flow_are_content() {
        assert_eq!(texts("x: one,two"), ["x", ":", "one,two"]);
    }

    #[test]
    fn quotes() {
        assert_eq!(texts("a: 'quoted'"), ["a", ":", "'quoted'"]);
        assert_eq!(kinds("a: '42'"), [Key, Colon, String]);
        assert_eq!(kinds("a: ''"), [Key, Colon, SingleQuote, SingleQuote]);
        assert_eq!(kinds("a: \"\""), [Key, Colon, DoubleQuote, DoubleQuote]);
    }

    #[test]
    fn block_headers() {
        assert_eq!(texts("a: |\n  x"), ["a", ":", "|", "x"]);
        assert_eq!(texts("a: |-\n  x"), ["a", ":", "|-", "x"]);
        assert_eq!(kinds("a: >+\n  x"), [Key, Colon, Folded, String]);
    }

    #[test]
    fn sigils_need_a_name() {
        assert_eq!(kinds("a: &anchor 1"), [Key, Colon, Anchor, String]);
        assert_eq!(kinds("a: *ref"), [Key, Colon, Alias, String]);
        assert_eq!(kinds("a: !tag x"), [Key, Colon, Tag, String]);
        let err = tokenize("&").unwrap_err();
        assert_eq!(err.character(), '&');
        assert_eq!(err.marker(), Marker::new(1, 0));
        let err = tokenize("a: 1\n  b: * x").unwrap_err();
        assert_eq!(err.character(), '*');
        assert_eq!(err.marker(), Marker::new(2, 2));
        assert_eq!(format!("{err}"), "line 2: unexpected character '*'");
        assert!(tokenize("a: !!str b").is_err());
    }

    #[test]
    fn utf8_stays_whole() {
        assert_eq!(texts("naïve: café au lait"), ["naïve", ":", "café au lait"]);
    }

    #[test]
    fn windows_line_endings() {
        assert_eq!(texts("a: 1\r\nb: 2\r\n"), ["a", ":", "1", "b", ":", "2"]);
    }
}
