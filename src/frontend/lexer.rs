use crate::frontend::diagnostic::{Diagnostic, Diagnostics, Location};
use crate::frontend::token::{Span, Token, TokenKind};

/// Longest numeric literal or identifier the scanner accepts.
pub const MAX_LITERAL_LEN: usize = 1024;

/// Lexical errors: every diagnostic from a collect-all scan.
#[derive(Debug, thiserror::Error)]
#[error("{diagnostics}")]
pub struct LexError {
    pub diagnostics: Diagnostics,
}

/// The token sequence handed from the scanner to the parser.
///
/// A buffer produced by [`Lexer::scan`] always ends with exactly one
/// `Eof` token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    /// Tokens are added in blocks of this many slots.
    const GROW_BY: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        if self.tokens.len() == self.tokens.capacity() {
            self.tokens.reserve_exact(Self::GROW_BY);
        }
        self.tokens.push(token);
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

impl<'a> IntoIterator for &'a TokenBuffer {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Hand-written scanner over a borrowed source buffer.
///
/// Single left-to-right pass with one byte of lookahead. `start` marks the
/// first byte of the lexeme being scanned, `current` the next unread byte.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    start: usize,
    current: usize,
    line: usize,
    diagnostics: Diagnostics,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Scans the whole buffer and fails if any lexeme could not be classified.
    pub fn tokenize(source: &'src str) -> Result<TokenBuffer, LexError> {
        let (tokens, diagnostics) = Lexer::new(source).scan();
        if diagnostics.is_empty() {
            Ok(tokens)
        } else {
            Err(LexError { diagnostics })
        }
    }

    /// Scans the whole buffer, keeping invalid tokens in the output and
    /// collecting one diagnostic per bad lexeme.
    pub fn scan(mut self) -> (TokenBuffer, Diagnostics) {
        let mut tokens = TokenBuffer::new();

        loop {
            self.skip_ignored();
            self.start = self.current;

            if self.is_at_end() {
                tokens.push(self.make(TokenKind::Eof));
                break;
            }

            let token = self.next_token();
            tokens.push(token);
        }

        log::debug!(
            "scanned {} tokens, {} diagnostics",
            tokens.len(),
            self.diagnostics.len()
        );
        (tokens, self.diagnostics)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.bytes.len()
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.current).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.current + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.current()?;
        self.current += 1;
        Some(byte)
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.current), self.line)
    }

    fn invalid(&mut self, line: usize, message: impl Into<String>) -> Token {
        let token = Token::new(
            TokenKind::Invalid,
            Span::new(self.start, self.current),
            line,
        );
        self.diagnostics
            .push(Diagnostic::new(line, Location::InvalidToken, message));
        token
    }

    /// Skips whitespace and `#` comments. Newlines are tokens, not whitespace.
    fn skip_ignored(&mut self) {
        while let Some(byte) = self.current() {
            match byte {
                b' ' | b'\t' | b'\x0c' | b'\x0b' | b'\r' => {
                    self.advance();
                }
                b'#' => {
                    while self.current().is_some_and(|b| b != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        let Some(byte) = self.advance() else {
            return self.make(TokenKind::Eof);
        };

        match byte {
            b'(' => self.make(TokenKind::LeftParen),
            b')' => self.make(TokenKind::RightParen),
            b'{' => self.make(TokenKind::LeftBrace),
            b'}' => self.make(TokenKind::RightBrace),
            b'[' => self.make(TokenKind::LeftSquare),
            b']' => self.make(TokenKind::RightSquare),
            b',' => self.make(TokenKind::Comma),
            b'.' => self.make(TokenKind::Dot),
            b'+' => self.make(TokenKind::Plus),
            b'*' => self.make(TokenKind::Star),
            b'%' => self.make(TokenKind::Percent),
            b'/' => self.make(TokenKind::Slash),
            b'\n' => {
                let token = self.make(TokenKind::Newline);
                self.line += 1;
                token
            }
            b'-' => {
                let kind = if self.matches(b'>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                };
                self.make(kind)
            }
            b':' => {
                let kind = if self.matches(b':') {
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                };
                self.make(kind)
            }
            b'!' => {
                let kind = if self.matches(b'=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.make(kind)
            }
            b'=' => {
                let kind = if self.matches(b'=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.make(kind)
            }
            b'>' => {
                let kind = if self.matches(b'=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.make(kind)
            }
            b'<' => {
                let kind = if self.matches(b'=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.make(kind)
            }
            b'"' => self.read_string(),
            b if b.is_ascii_digit() => self.read_number(),
            b if b.is_ascii_alphabetic() || b == b'_' => self.read_identifier(),
            _ => self.read_unexpected(),
        }
    }

    fn read_unexpected(&mut self) -> Token {
        // Step over the whole character so spans stay on char boundaries.
        let ch = self.source[self.start..].chars().next().unwrap_or('\0');
        self.current = self.start + ch.len_utf8();
        let line = self.line;
        if ch == char::REPLACEMENT_CHARACTER {
            return self.invalid(line, "Malformed UTF-8 byte sequence.");
        }
        self.invalid(line, format!("Unexpected character {:?}.", ch))
    }

    fn read_string(&mut self) -> Token {
        let start_line = self.line;

        loop {
            match self.advance() {
                Some(b'"') => {
                    return Token::new(
                        TokenKind::String,
                        Span::new(self.start, self.current),
                        start_line,
                    );
                }
                Some(b'\\') => {
                    if self.advance() == Some(b'\n') {
                        self.line += 1;
                    }
                }
                Some(b'\n') => self.line += 1,
                Some(_) => {}
                None => {
                    // Keep the span on a char boundary even if input was cut mid-char.
                    self.current = self.bytes.len();
                    return self.invalid(start_line, "Unterminated string.");
                }
            }
        }
    }

    fn read_number(&mut self) -> Token {
        while self.current().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }

        let mut kind = TokenKind::NumberInt;

        if self.current() == Some(b'.') {
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.advance(); // '.'
                while self.current().is_some_and(is_identifier_byte) {
                    self.advance();
                }
                let line = self.line;
                return self.invalid(line, "Expected a digit after '.'.");
            }

            self.advance(); // '.'
            while self.current().is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
            }
            kind = TokenKind::NumberFloat;
        }

        self.finish_literal(kind)
    }

    fn read_identifier(&mut self) -> Token {
        while self.current().is_some_and(is_identifier_byte) {
            self.advance();
        }

        let kind = TokenKind::keyword_or_identifier(&self.source[self.start..self.current]);
        self.finish_literal(kind)
    }

    fn finish_literal(&mut self, kind: TokenKind) -> Token {
        if self.current - self.start > MAX_LITERAL_LEN {
            let line = self.line;
            return self.invalid(
                line,
                format!("Literal exceeds {} characters.", MAX_LITERAL_LEN),
            );
        }
        self.make(kind)
    }
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
