use std::fmt::Write;

use crate::frontend::lexer::TokenBuffer;
use crate::frontend::token::{Token, TokenKind};

/// Lexer-debug listing, one token per line: `[line] KIND 'lexeme'`.
pub struct TokenDumper {
    pub color: bool,
    pub show_spans: bool, // if true, appends the byte span of each token
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_spans: false,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const BLU: &'static str = "\x1b[34m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn spans(mut self) -> Self {
        self.show_spans = true;
        self
    }

    pub fn dump(&self, source: &str, tokens: &TokenBuffer) {
        print!("{}", self.dump_to_string(source, tokens));
    }

    pub fn dump_to_string(&self, source: &str, tokens: &TokenBuffer) -> String {
        let mut out = String::new();
        for token in tokens {
            self.write_one(&mut out, source, token);
        }
        out
    }

    fn write_one(&self, out: &mut String, source: &str, token: &Token) {
        let colr = if self.color { Self::color(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        // Newlines would break the listing, so they print by name only.
        let lexeme = match token.kind {
            TokenKind::Newline | TokenKind::Eof => String::new(),
            _ => format!(" '{}'", token.lexeme(source)),
        };

        let _ = write!(
            out,
            "[{:04}] {}{:<14}{}{}",
            token.line,
            colr,
            token.kind.name(),
            lexeme,
            reset
        );
        if self.show_spans {
            let _ = write!(out, " @{}..{}", token.span.start, token.span.end);
        }
        out.push('\n');
    }

    fn color(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Newline | Eof => Self::DIM,
            Invalid => Self::RED,
            String => Self::GRN,
            NumberInt | NumberFloat => Self::CYN,
            Identifier => Self::YEL,
            k if k.is_keyword() => Self::BLU,
            Plus | Minus | Star | Slash | Percent | Bang => Self::MAG,
            EqualEqual | BangEqual | Less | LessEqual | Greater | GreaterEqual => Self::MAG,
            _ => Self::RESET,
        }
    }
}
