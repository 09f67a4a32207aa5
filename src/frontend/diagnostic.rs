use crate::frontend::token::{Token, TokenKind};

/// Where a diagnostic points, rendered after `at` in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    End,
    StringLiteral,
    InvalidToken,
    Newline,
    Lexeme(String),
}

impl Location {
    pub fn of(token: &Token, source: &str) -> Self {
        match token.kind {
            TokenKind::Eof => Location::End,
            TokenKind::String => Location::StringLiteral,
            TokenKind::Invalid => Location::InvalidToken,
            TokenKind::Newline => Location::Newline,
            _ => Location::Lexeme(token.lexeme(source).to_string()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::End => write!(f, "end"),
            Location::StringLiteral => write!(f, "\""),
            Location::InvalidToken => write!(f, "invalid token"),
            Location::Newline => write!(f, "new line"),
            Location::Lexeme(text) => write!(f, "{}", text),
        }
    }
}

/// A single error report with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            location,
            message: message.into(),
        }
    }

    pub fn at_token(token: &Token, source: &str, message: impl Into<String>) -> Self {
        Diagnostic::new(token.line, Location::of(token, source), message)
    }
}

impl std::fmt::Display for Diagnostic {
    /// Formats as `[line N] at <location>: <message>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[line {}] at {}: {}",
            self.line, self.location, self.message
        )
    }
}

/// Caller-owned list of diagnostics accumulated across a scan or parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.items.first()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl std::fmt::Display for Diagnostics {
    /// One diagnostic per line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::Span;

    #[test]
    fn test_location_templates() {
        let cases = [
            (Location::End, "end"),
            (Location::StringLiteral, "\""),
            (Location::InvalidToken, "invalid token"),
            (Location::Newline, "new line"),
            (Location::Lexeme(")".to_string()), ")"),
        ];
        for (location, expected) in cases {
            assert_eq!(location.to_string(), expected);
        }
    }

    #[test]
    fn test_diagnostic_format() {
        let d = Diagnostic::new(3, Location::End, "No expression found.");
        assert_eq!(d.to_string(), "[line 3] at end: No expression found.");
    }

    #[test]
    fn test_location_from_token_kind() {
        let source = "x\n\"s\"";
        let newline = Token::new(TokenKind::Newline, Span::new(1, 2), 1);
        let string = Token::new(TokenKind::String, Span::new(2, 5), 2);
        let ident = Token::new(TokenKind::Identifier, Span::new(0, 1), 1);

        assert_eq!(Location::of(&newline, source), Location::Newline);
        assert_eq!(Location::of(&string, source), Location::StringLiteral);
        assert_eq!(
            Location::of(&ident, source),
            Location::Lexeme("x".to_string())
        );
    }

    #[test]
    fn test_diagnostics_display_one_per_line() {
        let mut all = Diagnostics::new();
        all.push(Diagnostic::new(1, Location::InvalidToken, "a"));
        all.push(Diagnostic::new(2, Location::End, "b"));
        assert_eq!(
            all.to_string(),
            "[line 1] at invalid token: a\n[line 2] at end: b"
        );
        assert_eq!(all.len(), 2);
    }
}
