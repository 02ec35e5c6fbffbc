use std::{fmt::Display, iter::Peekable, str::Chars};

use tracing::{debug, trace, warn};

use crate::error::CompileError;

/// Reserved words of the language.
pub const KEYWORDS: [&str; 3] = ["struct", "field", "exports"];

/// Punctuation the language understands. `:` may separate a field name from its type.
pub const OPERATORS: [&str; 5] = ["{", "}", "[", "]", ":"];

/// Line and column of a token, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position of the synthetic token returned past the end of the stream.
    pub const EOF: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Position::EOF {
            write!(f, "EOF")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Classification of an accepted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Unknown,
    Keyword,
    Type,
    StructName,
    FieldName,
    ExportName,
    Int,
    Operator,
    /// Only ever carried by the end of input sentinel.
    Invalid,
    Comment,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Unknown => "Unknown",
            TokenKind::Keyword => "Keyword",
            TokenKind::Type => "Type",
            TokenKind::StructName => "Struct Name",
            TokenKind::FieldName => "Field Name",
            TokenKind::ExportName => "Export Name",
            TokenKind::Int => "Int",
            TokenKind::Operator => "Operator",
            TokenKind::Invalid => "Invalid",
            TokenKind::Comment => "Comment",
        };
        f.write_str(name)
    }
}

/// An accepted token. Immutable once the stream has been produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Index of this token in its stream.
    pub index: usize,
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    fn eof(index: usize) -> Self {
        Token {
            index,
            kind: TokenKind::Invalid,
            lexeme: "EOF".to_string(),
            position: Position::EOF,
        }
    }

    pub fn is(&self, lexeme: &str) -> bool {
        self.kind != TokenKind::Invalid && self.lexeme == lexeme
    }
}

// --- Raw scanning ---

/// Lexical category of a raw token, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKind {
    Identifier,
    Int,
    Comment,
    /// Any other single character.
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub kind: RawKind,
    pub text: String,
    pub position: Position,
}

/// Character level scanner producing identifiers, integer literals, comments, and
/// single punctuation characters. Whitespace is skipped.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    absolute_pos: usize,
    current_line: usize,
    current_col: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new Lexer from the input source string.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.chars().peekable(),
            absolute_pos: 0,
            current_line: 1,
            current_col: 1,
        }
    }

    /// Consumes the current character, keeping line and column in step.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.absolute_pos += c.len_utf8();
        if c == '\n' {
            self.current_line += 1;
            self.current_col = 1;
        } else {
            self.current_col += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Looks one character past the current one.
    fn peek_second(&self) -> Option<char> {
        self.source[self.absolute_pos..].chars().nth(1)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.absolute_pos;
        while let Some(&c) = self.peek() {
            if accept(c) {
                self.advance();
            } else {
                break;
            }
        }
        &self.source[start..self.absolute_pos]
    }

    /// Consumes a `// line` or `/* block */` comment. An unterminated block comment
    /// runs to the end of input.
    fn take_comment(&mut self) -> &'a str {
        let start = self.absolute_pos;
        self.advance();
        match self.advance() {
            Some('/') => {
                while let Some(&c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            }
            _ => {
                while let Some(c) = self.advance() {
                    if c == '*' && self.peek() == Some(&'/') {
                        self.advance();
                        break;
                    }
                }
            }
        }
        &self.source[start..self.absolute_pos]
    }
}

impl<'a> From<&'a str> for Lexer<'a> {
    fn from(source: &'a str) -> Self {
        Lexer::new(source)
    }
}

impl Iterator for Lexer<'_> {
    type Item = RawToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let position = Position::new(self.current_line, self.current_col);
        let first = *self.peek()?;
        let (kind, text) = match first {
            c if c.is_ascii_alphabetic() || c == '_' => (
                RawKind::Identifier,
                self.take_while(|c| c.is_ascii_alphanumeric() || c == '_'),
            ),
            c if c.is_ascii_digit() => (RawKind::Int, self.take_while(|c| c.is_ascii_digit())),
            '/' if matches!(self.peek_second(), Some('/' | '*')) => {
                (RawKind::Comment, self.take_comment())
            }
            _ => {
                let start = self.absolute_pos;
                self.advance();
                (RawKind::Punct, &self.source[start..self.absolute_pos])
            }
        };

        Some(RawToken {
            kind,
            text: text.to_string(),
            position,
        })
    }
}

// --- Classification ---

/// The accepted tokens of one source text, plus the positions of every keyword
/// occurrence so the parser can jump straight to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    struct_refs: Vec<usize>,
    field_refs: Vec<usize>,
    export_refs: Vec<usize>,
    eof: Token,
}

/// Tokenizes and classifies `source`.
///
/// Each identifier is classified by the token accepted just before it: the name
/// after `struct`, `field`, or `exports` becomes a struct, field, or export name,
/// and every other identifier is a type. Comments are dropped.
pub fn scan(source: &str) -> Result<TokenStream, CompileError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut struct_refs = Vec::new();
    let mut field_refs = Vec::new();
    let mut export_refs = Vec::new();

    for raw in Lexer::new(source) {
        let index = tokens.len();
        let kind = match raw.kind {
            RawKind::Comment => continue,
            RawKind::Identifier if KEYWORDS.contains(&raw.text.as_str()) => {
                match raw.text.as_str() {
                    "struct" => struct_refs.push(index),
                    "field" => field_refs.push(index),
                    _ => export_refs.push(index),
                }
                TokenKind::Keyword
            }
            RawKind::Identifier => match tokens.last().map(|last| last.lexeme.as_str()) {
                Some("struct") => TokenKind::StructName,
                Some("field") => TokenKind::FieldName,
                Some("exports") => TokenKind::ExportName,
                _ => TokenKind::Type,
            },
            RawKind::Int => TokenKind::Int,
            RawKind::Punct if OPERATORS.contains(&raw.text.as_str()) => TokenKind::Operator,
            RawKind::Punct => {
                return Err(CompileError::UnknownOperator {
                    lexeme: raw.text,
                    position: raw.position,
                });
            }
        };

        if tokens.is_empty() && kind != TokenKind::Keyword {
            return Err(CompileError::UnexpectedTokenAtStart { lexeme: raw.text });
        }

        let token = Token {
            index,
            kind,
            lexeme: raw.text,
            position: raw.position,
        };
        trace!(
            "token #{} at '{}' is '{}': '{}'",
            token.index, token.position, token.kind, token.lexeme
        );
        tokens.push(token);
    }

    debug!(
        "scanned {} tokens: {} struct, {} field, {} export references",
        tokens.len(),
        struct_refs.len(),
        field_refs.len(),
        export_refs.len()
    );
    if export_refs.len() != 1 {
        warn!(
            "found {} export references, a schema normally has exactly 1",
            export_refs.len()
        );
    }

    Ok(TokenStream {
        eof: Token::eof(tokens.len()),
        tokens,
        struct_refs,
        field_refs,
        export_refs,
    })
}

/// Read position into a [`TokenStream`]. Owned by whoever walks the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor(usize);

impl Cursor {
    pub fn at(index: usize) -> Self {
        Cursor(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl TokenStream {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Indices of every `struct` keyword, in source order.
    pub fn struct_refs(&self) -> &[usize] {
        &self.struct_refs
    }

    /// Indices of every `field` keyword, in source order.
    pub fn field_refs(&self) -> &[usize] {
        &self.field_refs
    }

    /// Indices of every `exports` keyword, in source order.
    pub fn export_refs(&self) -> &[usize] {
        &self.export_refs
    }

    /// Token at `index`, or the end of input sentinel.
    pub fn get(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    /// Copies `len` tokens starting at `start`, or `None` when out of range.
    pub fn slice(&self, start: usize, len: usize) -> Option<Vec<Token>> {
        let end = start.checked_add(len)?;
        self.tokens.get(start..end).map(<[Token]>::to_vec)
    }

    /// Token under the cursor; reading at or after the end yields an `Invalid`
    /// token with the lexeme `EOF`.
    pub fn current(&self, cursor: &Cursor) -> &Token {
        self.get(cursor.0)
    }

    /// Moves one token forward (never past the end) and returns the new current token.
    pub fn advance(&self, cursor: &mut Cursor) -> &Token {
        if cursor.0 < self.tokens.len() {
            cursor.0 += 1;
        }
        self.current(cursor)
    }

    /// Token `offset` positions away from the cursor, if it exists.
    pub fn peek(&self, cursor: &Cursor, offset: isize) -> Option<&Token> {
        cursor
            .0
            .checked_add_signed(offset)
            .and_then(|index| self.tokens.get(index))
    }

    /// The token right after the cursor, or the end of input sentinel.
    pub fn front(&self, cursor: &Cursor) -> &Token {
        self.peek(cursor, 1).unwrap_or(&self.eof)
    }

    /// Whether any token from the cursor onwards has the given lexeme.
    pub fn contains_ahead(&self, cursor: &Cursor, lexeme: &str) -> bool {
        self.tokens
            .get(cursor.0..)
            .is_some_and(|rest| rest.iter().any(|token| token.lexeme == lexeme))
    }

    /// Moves the cursor to `index`. Out of range targets leave it untouched.
    pub fn jump(&self, cursor: &mut Cursor, index: usize) {
        if index <= self.tokens.len() {
            cursor.0 = index;
        }
    }

    /// Moves `n` tokens forward unless that would pass the end.
    pub fn step_forward(&self, cursor: &mut Cursor, n: usize) {
        if n > 0 && cursor.0 + n <= self.tokens.len() {
            cursor.0 += n;
        }
    }

    /// Moves `n` tokens back unless that would pass the start.
    pub fn step_backward(&self, cursor: &mut Cursor, n: usize) {
        if n > 0 && n <= cursor.0 {
            cursor.0 -= n;
        }
    }
}
