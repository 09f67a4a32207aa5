use crate::frontend::diagnostic::{Diagnostic, Diagnostics};
use crate::frontend::lexer::TokenBuffer;
use crate::frontend::token::{Token, TokenKind};
use crate::lang::operator::{BinaryOp, UnaryOp};

/// Syntax (and, in evaluation mode, type) errors from one parse.
#[derive(Debug, thiserror::Error)]
#[error("{diagnostics}")]
pub struct ParseError {
    pub diagnostics: Diagnostics,
}

/// What the parser does with each grammar production it recognises.
///
/// The same recursive descent either folds an expression to a value
/// ([`crate::lang::eval::Evaluator`]) or emits bytecode for it
/// ([`crate::bytecode::compile::Compiler`]).
pub trait Emitter {
    /// Result of one sub-expression.
    type Item;
    /// Final product handed back by [`Parser::parse`].
    type Output;
    type Error: std::fmt::Display;

    fn number(&mut self, value: f64) -> Result<Self::Item, Self::Error>;

    fn unary(&mut self, op: UnaryOp, operand: Self::Item) -> Result<Self::Item, Self::Error>;

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: Self::Item,
        rhs: Self::Item,
    ) -> Result<Self::Item, Self::Error>;

    /// Called for every newline the parser steps over.
    fn newline(&mut self);

    /// Stand-in for a sub-expression that failed to parse.
    fn placeholder(&self) -> Self::Item;

    fn finish(self, item: Self::Item) -> Result<Self::Output, Self::Error>;
}

/// Recursive-descent parser over a scanned token buffer.
///
/// Grammar, lowest precedence first:
///
/// ```text
/// expression -> equality
/// equality   -> comparison ( ( "==" | "!=" ) comparison )?
/// comparison -> term ( ( ">" | ">=" | "<" | "<=" ) term )*
/// term       -> factor ( ( "+" | "-" ) factor )*
/// factor     -> unary ( ( "*" | "/" | "%" ) unary )*
/// unary      -> ( "-" | "!" ) unary | primary
/// primary    -> NUMBER | "(" expression ")"
/// ```
///
/// Equality is non-associative: a second `==` is left over after the
/// expression and reported as `Expected end of expression.`
///
/// Newline tokens never reach the grammar. They are stepped over, and the
/// emitter is told about each one.
///
/// Errors use panic mode: the first error is recorded and further reports are
/// suppressed until a closing parenthesis is matched. A failed production
/// yields the emitter's placeholder so parsing can continue.
pub struct Parser<'a, E: Emitter> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    emitter: E,
    panic: bool,
    diagnostics: Diagnostics,
}

impl<'a, E: Emitter> Parser<'a, E> {
    pub fn new(source: &'a str, tokens: &'a TokenBuffer, emitter: E) -> Self {
        Parser {
            source,
            tokens: tokens.as_slice(),
            pos: 0,
            emitter,
            panic: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Parses one complete expression followed by end of input.
    pub fn parse(mut self) -> Result<E::Output, ParseError> {
        let item = self.expression();

        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            self.report(&trailing, "Expected end of expression.");
        }

        if !self.diagnostics.is_empty() {
            return Err(ParseError {
                diagnostics: self.diagnostics,
            });
        }

        let end = self.peek();
        match self.emitter.finish(item) {
            Ok(output) => Ok(output),
            Err(e) => {
                let mut diagnostics = self.diagnostics;
                diagnostics.push(Diagnostic::at_token(&end, self.source, e.to_string()));
                Err(ParseError { diagnostics })
            }
        }
    }

    // Token stream

    /// Steps over newlines, then returns the current token without consuming it.
    ///
    /// Past the end of the buffer this keeps returning the final token, which
    /// for a scanned buffer is `Eof`.
    fn peek(&mut self) -> Token {
        while let Some(token) = self.tokens.get(self.pos) {
            if token.kind != TokenKind::Newline {
                return *token;
            }
            self.emitter.newline();
            self.pos += 1;
        }
        self.tokens
            .last()
            .copied()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, Default::default(), 1))
    }

    /// Consumes and returns the current token. `Eof` is never consumed.
    fn advance(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn report(&mut self, token: &Token, message: impl Into<String>) {
        if self.panic {
            return;
        }
        self.panic = true;
        self.diagnostics
            .push(Diagnostic::at_token(token, self.source, message));
    }

    /// Applies an emitter result, reporting a failure at `token`.
    fn emitted(&mut self, token: &Token, result: Result<E::Item, E::Error>) -> E::Item {
        match result {
            Ok(item) => item,
            Err(e) => {
                self.report(token, e.to_string());
                self.emitter.placeholder()
            }
        }
    }

    // Grammar

    fn expression(&mut self) -> E::Item {
        self.equality()
    }

    fn equality(&mut self) -> E::Item {
        let lhs = self.comparison();

        let token = self.peek();
        if matches!(token.kind, TokenKind::EqualEqual | TokenKind::BangEqual) {
            self.advance();
            let rhs = self.comparison();
            return self.apply_binary(&token, lhs, rhs);
        }
        lhs
    }

    fn comparison(&mut self) -> E::Item {
        let mut lhs = self.term();

        loop {
            let token = self.peek();
            if !matches!(
                token.kind,
                TokenKind::Greater
                    | TokenKind::GreaterEqual
                    | TokenKind::Less
                    | TokenKind::LessEqual
            ) {
                return lhs;
            }
            self.advance();
            let rhs = self.term();
            lhs = self.apply_binary(&token, lhs, rhs);
        }
    }

    fn term(&mut self) -> E::Item {
        let mut lhs = self.factor();

        loop {
            let token = self.peek();
            if !matches!(token.kind, TokenKind::Plus | TokenKind::Minus) {
                return lhs;
            }
            self.advance();
            let rhs = self.factor();
            lhs = self.apply_binary(&token, lhs, rhs);
        }
    }

    fn factor(&mut self) -> E::Item {
        let mut lhs = self.unary();

        loop {
            let token = self.peek();
            if !matches!(
                token.kind,
                TokenKind::Star | TokenKind::Slash | TokenKind::Percent
            ) {
                return lhs;
            }
            self.advance();
            let rhs = self.unary();
            lhs = self.apply_binary(&token, lhs, rhs);
        }
    }

    fn unary(&mut self) -> E::Item {
        let token = self.peek();
        match UnaryOp::from_token(token.kind) {
            Some(op) => {
                self.advance();
                let operand = self.unary();
                let result = self.emitter.unary(op, operand);
                self.emitted(&token, result)
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> E::Item {
        let token = self.peek();

        match token.kind {
            TokenKind::NumberInt | TokenKind::NumberFloat => {
                self.advance();
                match token.lexeme(self.source).parse::<f64>() {
                    Ok(value) => {
                        let result = self.emitter.number(value);
                        self.emitted(&token, result)
                    }
                    Err(_) => {
                        self.report(&token, "Malformed number.");
                        self.emitter.placeholder()
                    }
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let item = self.expression();
                let close = self.peek();
                if close.kind == TokenKind::RightParen {
                    self.advance();
                    self.panic = false;
                } else {
                    self.report(&close, "Expected ')' after expression.");
                }
                item
            }
            // Leave closers and end of input for the caller to match.
            TokenKind::RightParen | TokenKind::Eof => {
                self.report(&token, "No expression found.");
                self.emitter.placeholder()
            }
            _ => {
                self.advance();
                self.report(&token, "No expression found.");
                self.emitter.placeholder()
            }
        }
    }

    fn apply_binary(&mut self, token: &Token, lhs: E::Item, rhs: E::Item) -> E::Item {
        let op = match BinaryOp::from_token(token.kind) {
            Some(op) => op,
            None => {
                self.report(token, "Unknown operator.");
                return self.emitter.placeholder();
            }
        };
        let result = self.emitter.binary(op, lhs, rhs);
        self.emitted(token, result)
    }
}
