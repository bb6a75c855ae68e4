//! Loading documents
//!
//! The loader walks a token stream by index and assembles a [`Value`]
//! tree.  Block structure is decided purely from the indentation each
//! token carries; flow collections are closed by their brackets.

use crate::scanner::{self, ScanError, Token, TokenKind};
use crate::types::*;

use std::error::Error;
use std::fmt::{self, Display};

/// Errors which can occur during loading of a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The input could not be tokenized
    ScanError(ScanError),
    /// The input ended where something more was required
    NoInput(Marker, &'static str),
    /// A token turned up where nothing can use it
    UnexpectedToken {
        /// What kind of token it was
        kind: TokenKind,
        /// The token's text
        lexeme: String,
        /// Where the token was found
        marker: Marker,
        /// The indentation of the enclosing container
        expected_indent: usize,
    },
    /// A scalar matched its grammar but could not be converted
    InvalidScalar(TokenKind, String, Marker),
    /// Unexpected definition of anchor
    UnexpectedAnchor(Marker),
    /// Unexpected use of an alias
    UnexpectedAlias(Marker),
    /// An explicit tag was detected
    UnexpectedTag(Marker),
    /// A key appeared twice in one mapping
    ///
    /// This is only reported when [`LoaderOptions::error_on_duplicate_keys`]
    /// is enabled.
    DuplicateKey(String, Marker),
    /// Collections were nested more deeply than the loader allows
    RecursionLimit(Marker),
}

impl LoadError {
    /// Where in the input the error was found
    ///
    /// ```
    /// # use yamlet::*;
    /// let err = decode("a: [1, 2").unwrap_err();
    /// assert_eq!(err.marker().line(), 1);
    /// ```
    pub fn marker(&self) -> Marker {
        use LoadError::*;
        match self {
            ScanError(e) => e.marker(),
            NoInput(m, _) => *m,
            UnexpectedToken { marker, .. } => *marker,
            InvalidScalar(_, _, m) => *m,
            UnexpectedAnchor(m) => *m,
            UnexpectedAlias(m) => *m,
            UnexpectedTag(m) => *m,
            DuplicateKey(_, m) => *m,
            RecursionLimit(m) => *m,
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LoadError::*;
        match self {
            ScanError(e) => e.fmt(f),
            NoInput(m, wanted) => write!(f, "{}: expected {} but the input ended", m, wanted),
            UnexpectedToken {
                kind,
                lexeme,
                marker,
                expected_indent,
            } => write!(
                f,
                "{}: unexpected {} {:?} at indent {} (enclosing indent {})",
                marker,
                kind,
                lexeme,
                marker.indent(),
                expected_indent
            ),
            InvalidScalar(kind, lexeme, m) => write!(f, "{}: invalid {} value {:?}", m, kind, lexeme),
            UnexpectedAnchor(m) => write!(f, "{}: Unexpected definition of anchor", m),
            UnexpectedAlias(m) => write!(f, "{}: Unexpected use of alias", m),
            UnexpectedTag(m) => write!(f, "{}: Unexpected use of tag", m),
            DuplicateKey(key, m) => write!(f, "{}: Duplicate key {:?} in mapping", m, key),
            RecursionLimit(m) => write!(
                f,
                "{}: Collections nested more than {} deep",
                m, MAX_DEPTH
            ),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::ScanError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScanError> for LoadError {
    fn from(value: ScanError) -> Self {
        LoadError::ScanError(value)
    }
}

/// Options for loading documents
///
/// The defaults are strict about stray tokens and let later duplicate
/// keys replace earlier ones.
///
/// ```
/// # use yamlet::*;
/// let options = LoaderOptions::default().error_on_duplicate_keys(true);
/// let err = decode_with_options("a: 1\na: 2", options).unwrap_err();
/// assert!(matches!(err, LoadError::DuplicateKey(..)));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    error_on_duplicate_keys: bool,
    skip_stray_tokens: bool,
}

impl LoaderOptions {
    /// Reject mappings which contain the same key more than once
    ///
    /// When this is disabled (the default) the last value given for a key
    /// wins, and the key keeps the position where it first appeared.
    pub fn error_on_duplicate_keys(self, enable: bool) -> Self {
        Self {
            error_on_duplicate_keys: enable,
            ..self
        }
    }

    /// Skip tokens which cannot start a mapping entry instead of failing
    ///
    /// In this lenient mode, a value position which holds something the
    /// loader cannot dispatch on is retried as whichever container it is
    /// in, and stray tokens at mapping scope are dropped.
    ///
    /// ```
    /// # use yamlet::*;
    /// assert!(decode("a: 1\n) b: 2").is_err());
    /// let options = LoaderOptions::default().skip_stray_tokens(true);
    /// let value = decode_with_options("a: 1\n) b: 2", options).unwrap();
    /// assert_eq!(value.as_mapping().unwrap().get_i64("b"), Some(2));
    /// ```
    pub fn skip_stray_tokens(self, enable: bool) -> Self {
        Self {
            skip_stray_tokens: enable,
            ..self
        }
    }
}

/// How many values may be nested inside one another
const MAX_DEPTH: usize = 256;

/// What kind of container a value sits in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Context {
    Mapping,
    Sequence,
    Flow,
}

struct Assembler<'t> {
    tokens: &'t [Token],
    pos: usize,
    options: LoaderOptions,
    depth: usize,
}

impl<'t> Assembler<'t> {
    fn new(tokens: &'t [Token], options: LoaderOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            options,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(Token::kind)
    }

    fn starts_entry(&self) -> bool {
        self.peek_kind(0) == Some(TokenKind::Key) && self.peek_kind(1) == Some(TokenKind::Colon)
    }

    /// The marker used when the input runs out
    fn end_marker(&self) -> Marker {
        self.tokens
            .last()
            .map(Token::marker)
            .unwrap_or_else(|| Marker::new(1, 0))
    }

    fn unexpected(token: &Token, expected_indent: usize) -> LoadError {
        LoadError::UnexpectedToken {
            kind: token.kind(),
            lexeme: token.text().to_string(),
            marker: token.marker(),
            expected_indent,
        }
    }

    fn stray(&mut self, token: &Token, expected_indent: usize) -> Result<(), LoadError> {
        if self.options.skip_stray_tokens {
            tracing::debug!(
                line = token.line(),
                lexeme = token.text(),
                "skipping stray token"
            );
            self.pos += 1;
            Ok(())
        } else {
            Err(Self::unexpected(token, expected_indent))
        }
    }

    fn insert(&self, map: &mut Mapping, key: &Token, value: Value) -> Result<(), LoadError> {
        let name = scanner::unquote(key.text());
        match map.get_mut(name) {
            Some(_) if self.options.error_on_duplicate_keys => {
                Err(LoadError::DuplicateKey(name.to_string(), key.marker()))
            }
            Some(slot) => {
                tracing::debug!(key = name, line = key.line(), "duplicate key replaces earlier value");
                *slot = value;
                Ok(())
            }
            None => {
                map.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    fn document(&mut self) -> Result<Mapping, LoadError> {
        while matches!(
            self.peek_kind(0),
            Some(TokenKind::Directive | TokenKind::DocumentStart)
        ) {
            self.pos += 1;
        }
        let root = match self.peek() {
            None => return Ok(Mapping::new()),
            Some(token) => match token.kind() {
                TokenKind::ListItem => {
                    let seq = self.sequence(token.indent())?;
                    std::iter::once(("root", seq)).collect()
                }
                TokenKind::LeftBracket => {
                    self.pos += 1;
                    let seq = self.flow_sequence()?;
                    std::iter::once(("root", seq)).collect()
                }
                TokenKind::LeftBrace => {
                    self.pos += 1;
                    self.flow_mapping()?
                }
                _ => self.mapping(0)?,
            },
        };
        if let Some(token) = self.peek() {
            if !self.options.skip_stray_tokens {
                return Err(Self::unexpected(token, 0));
            }
            tracing::debug!(
                line = token.line(),
                remaining = self.tokens.len() - self.pos,
                "ignoring trailing tokens"
            );
        }
        Ok(root)
    }

    fn mapping(&mut self, min_indent: usize) -> Result<Mapping, LoadError> {
        let mut map = Mapping::new();
        while let Some(token) = self.peek() {
            if token.indent() < min_indent || token.kind() == TokenKind::ListItem {
                break;
            }
            if self.starts_entry() {
                self.pos += 2;
                let value = self.value(token.indent(), Context::Mapping)?;
                self.insert(&mut map, token, value)?;
            } else {
                self.stray(token, min_indent)?;
            }
        }
        Ok(map)
    }

    fn sequence(&mut self, min_indent: usize) -> Result<Sequence, LoadError> {
        let mut seq = Sequence::new();
        while let Some(token) = self.peek() {
            if token.indent() < min_indent || token.kind() != TokenKind::ListItem {
                break;
            }
            self.pos += 1;
            seq.push(self.value(token.indent(), Context::Sequence)?);
        }
        Ok(seq)
    }

    fn flow_sequence(&mut self) -> Result<Sequence, LoadError> {
        let mut seq = Sequence::new();
        loop {
            let token = self
                .peek()
                .ok_or_else(|| LoadError::NoInput(self.end_marker(), "a closing bracket"))?;
            match token.kind() {
                TokenKind::RightBracket => {
                    self.pos += 1;
                    return Ok(seq);
                }
                // `[a: 1]` is a sequence holding a single-entry mapping
                TokenKind::Key if self.starts_entry() => {
                    self.pos += 2;
                    let value = self.value(token.indent(), Context::Flow)?;
                    let mut map = Mapping::new();
                    self.insert(&mut map, token, value)?;
                    seq.push(Value::Mapping(map));
                }
                _ => seq.push(self.value(token.indent(), Context::Flow)?),
            }
        }
    }

    fn flow_mapping(&mut self) -> Result<Mapping, LoadError> {
        let mut map = Mapping::new();
        loop {
            let token = self
                .peek()
                .ok_or_else(|| LoadError::NoInput(self.end_marker(), "a closing brace"))?;
            if token.kind() == TokenKind::RightBrace {
                self.pos += 1;
                return Ok(map);
            }
            if self.starts_entry() {
                self.pos += 2;
                let value = self.value(token.indent(), Context::Flow)?;
                self.insert(&mut map, token, value)?;
            } else {
                self.stray(token, token.indent())?;
            }
        }
    }

    /// Whether a key found in value position belongs to an enclosing
    /// mapping, leaving the current value empty
    fn is_sibling_key(&self, token: &Token, indent: usize) -> bool {
        let previous_line = self
            .pos
            .checked_sub(1)
            .and_then(|p| self.tokens.get(p))
            .map(Token::line);
        previous_line.is_some_and(|line| line < token.line()) && token.indent() <= indent
    }

    fn value(&mut self, indent: usize, context: Context) -> Result<Value, LoadError> {
        if self.depth >= MAX_DEPTH {
            let marker = self.peek().map_or_else(|| self.end_marker(), Token::marker);
            return Err(LoadError::RecursionLimit(marker));
        }
        self.depth += 1;
        let value = self.dispatch(indent, context);
        self.depth -= 1;
        value
    }

    fn dispatch(&mut self, indent: usize, context: Context) -> Result<Value, LoadError> {
        let token = self
            .peek()
            .ok_or_else(|| LoadError::NoInput(self.end_marker(), "a value"))?;
        match token.kind() {
            TokenKind::LeftBracket => {
                self.pos += 1;
                self.flow_sequence().map(Value::Sequence)
            }
            TokenKind::LeftBrace => {
                self.pos += 1;
                self.flow_mapping().map(Value::Mapping)
            }
            TokenKind::ListItem if context != Context::Flow => {
                self.sequence(token.indent()).map(Value::Sequence)
            }
            kind if kind.is_scalar() => {
                self.pos += 1;
                scalar(token)
            }
            TokenKind::Key if context == Context::Mapping && self.is_sibling_key(token, indent) => {
                Ok(Value::Null)
            }
            TokenKind::Key if context != Context::Flow => {
                self.mapping(token.indent()).map(Value::Mapping)
            }
            TokenKind::Literal | TokenKind::Folded => Ok(self.block_scalar(token)),
            TokenKind::SingleQuote | TokenKind::DoubleQuote
                if self.peek_kind(1) == Some(token.kind()) =>
            {
                self.pos += 2;
                Ok(Value::String(String::new()))
            }
            TokenKind::Anchor => Err(LoadError::UnexpectedAnchor(token.marker())),
            TokenKind::Alias => Err(LoadError::UnexpectedAlias(token.marker())),
            TokenKind::Tag => Err(LoadError::UnexpectedTag(token.marker())),
            _ => match context {
                Context::Mapping if self.options.skip_stray_tokens => {
                    self.mapping(indent).map(Value::Mapping)
                }
                Context::Sequence if self.options.skip_stray_tokens => {
                    self.sequence(indent).map(Value::Sequence)
                }
                _ => Err(Self::unexpected(token, indent)),
            },
        }
    }

    /// Gather the lines of a `|` or `>` block
    ///
    /// The body is every scalar token on later lines indented at least as
    /// far as the header's line.  It ends at the first token which is not a
    /// scalar, so a body line such as `x: y` is not part of the block: it
    /// becomes an entry of the enclosing mapping instead.
    fn block_scalar(&mut self, header: &Token) -> Value {
        self.pos += 1;
        let mut lines: Vec<String> = Vec::new();
        let mut last_line = header.line();
        while let Some(token) = self.peek() {
            if token.line() == header.line()
                || token.indent() < header.indent()
                || !token.kind().is_scalar()
            {
                break;
            }
            match lines.last_mut() {
                Some(line) if token.line() == last_line => {
                    line.push(' ');
                    line.push_str(token.text());
                }
                _ => lines.push(token.text().to_string()),
            }
            last_line = token.line();
            self.pos += 1;
        }
        let text = if header.kind() == TokenKind::Folded {
            lines.join(" ").trim().to_string()
        } else {
            let mut text = lines.join("\n");
            if !lines.is_empty() && !header.text().ends_with('-') {
                text.push('\n');
            }
            text
        };
        Value::String(text)
    }
}

fn integer(token: &Token, radix: u32, prefix: &str) -> Result<i64, LoadError> {
    let text = token.text();
    let invalid = || LoadError::InvalidScalar(token.kind(), text.to_string(), token.marker());
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let digits = rest.strip_prefix(prefix).ok_or_else(invalid)?;
    i64::from_str_radix(&format!("{sign}{digits}"), radix).map_err(|_| invalid())
}

/// Turn a scalar token into its value
fn scalar(token: &Token) -> Result<Value, LoadError> {
    let invalid = || LoadError::InvalidScalar(token.kind(), token.text().to_string(), token.marker());
    match token.kind() {
        TokenKind::Integer => integer(token, 10, "").map(Value::Integer),
        TokenKind::Hexadecimal => integer(token, 16, "0x").map(Value::Integer),
        TokenKind::Octal => integer(token, 8, "0o").map(Value::Integer),
        TokenKind::Binary => integer(token, 2, "0b").map(Value::Integer),
        TokenKind::Float => match token.text().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(invalid()),
        },
        TokenKind::Bool => match token.text() {
            "true" | "True" | "TRUE" => Ok(Value::Bool(true)),
            "false" | "False" | "FALSE" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        TokenKind::Null => match token.text() {
            "null" | "Null" | "NULL" => Ok(Value::Null),
            _ => Err(invalid()),
        },
        _ => Ok(Value::String(scanner::unquote(token.text()).to_string())),
    }
}

/// Assemble a token stream into a value
///
/// This library requires that the top level be a mapping, but the returned
/// type here is the generic [`Value`] enumeration to make it potentially
/// easier for callers to use.  Regardless, it's always possible to treat
/// the returned value as a mapping without risk of panic.
///
/// A document which starts with a sequence is wrapped under the key `root`.
///
/// ```
/// # use yamlet::*;
/// let tokens = tokenize("- a\n- b").unwrap();
/// let value = assemble(&tokens).unwrap();
/// let root = value.as_mapping().unwrap().get_sequence("root").unwrap();
/// assert_eq!(root.get_str(1), Some("b"));
/// ```
pub fn assemble(tokens: &[Token]) -> Result<Value, LoadError> {
    assemble_with_options(tokens, LoaderOptions::default())
}

/// Assemble a token stream into a value with the given options
///
/// See [`assemble`] and [`LoaderOptions`] for details.
pub fn assemble_with_options(tokens: &[Token], options: LoaderOptions) -> Result<Value, LoadError> {
    Assembler::new(tokens, options)
        .document()
        .map(Value::Mapping)
}
