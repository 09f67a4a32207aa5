use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftSquare,
    RightSquare,
    Comma,
    Dot,
    Plus,
    Star,
    Percent,
    Slash,

    // One or two characters
    Minus,
    Arrow,
    Colon,
    ColonColon,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    NumberInt,
    NumberFloat,

    // Keywords
    And,
    Array,
    As,
    Bool,
    Break,
    Byte,
    Const,
    Continue,
    Else,
    Enum,
    False,
    Float,
    Func,
    If,
    Int,
    Map,
    Or,
    Pass,
    Print,
    PrintErr,
    Recipe,
    Return,
    Ref,
    Sbyte,
    Str,
    True,
    Uint,
    While,

    // Layout
    Newline,

    // Sentinels
    Invalid,
    Eof,
}

/// Exact lexeme text to keyword kind. Built once on first use.
static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("and", And),
        ("array", Array),
        ("as", As),
        ("bool", Bool),
        ("break", Break),
        ("byte", Byte),
        ("const", Const),
        ("continue", Continue),
        ("else", Else),
        ("enum", Enum),
        ("false", False),
        ("float", Float),
        ("func", Func),
        ("if", If),
        ("int", Int),
        ("map", Map),
        ("or", Or),
        ("pass", Pass),
        ("print", Print),
        ("print_err", PrintErr),
        ("recipe", Recipe),
        ("return", Return),
        ("ref", Ref),
        ("sbyte", Sbyte),
        ("str", Str),
        ("true", True),
        ("uint", Uint),
        ("while", While),
    ])
});

impl TokenKind {
    /// Classifies an identifier lexeme, returning the keyword kind if it is one.
    pub fn keyword_or_identifier(text: &str) -> TokenKind {
        KEYWORDS.get(text).copied().unwrap_or(TokenKind::Identifier)
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.values().any(|k| *k == self)
    }

    pub fn is_number(self) -> bool {
        matches!(self, TokenKind::NumberInt | TokenKind::NumberFloat)
    }

    /// Upper-case name used by the token dumper.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            LeftParen => "LEFT_PAREN",
            RightParen => "RIGHT_PAREN",
            LeftBrace => "LEFT_BRACE",
            RightBrace => "RIGHT_BRACE",
            LeftSquare => "LEFT_SQUARE",
            RightSquare => "RIGHT_SQUARE",
            Comma => "COMMA",
            Dot => "DOT",
            Plus => "PLUS",
            Star => "STAR",
            Percent => "PERCENT",
            Slash => "SLASH",
            Minus => "MINUS",
            Arrow => "ARROW",
            Colon => "COLON",
            ColonColon => "COLON_COLON",
            Bang => "BANG",
            BangEqual => "BANG_EQUAL",
            Equal => "EQUAL",
            EqualEqual => "EQUAL_EQUAL",
            Greater => "GREATER",
            GreaterEqual => "GREATER_EQUAL",
            Less => "LESS",
            LessEqual => "LESS_EQUAL",
            Identifier => "IDENTIFIER",
            String => "STRING",
            NumberInt => "NUMBER_INT",
            NumberFloat => "NUMBER_FLOAT",
            And => "AND",
            Array => "ARRAY",
            As => "AS",
            Bool => "BOOL",
            Break => "BREAK",
            Byte => "BYTE",
            Const => "CONST",
            Continue => "CONTINUE",
            Else => "ELSE",
            Enum => "ENUM",
            False => "FALSE",
            Float => "FLOAT",
            Func => "FUNC",
            If => "IF",
            Int => "INT",
            Map => "MAP",
            Or => "OR",
            Pass => "PASS",
            Print => "PRINT",
            PrintErr => "PRINT_ERR",
            Recipe => "RECIPE",
            Return => "RETURN",
            Ref => "REF",
            Sbyte => "SBYTE",
            Str => "STR",
            True => "TRUE",
            Uint => "UINT",
            While => "WHILE",
            Newline => "NEWLINE",
            Invalid => "INVALID",
            Eof => "EOF",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte range `[start, end)` into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A scanned token. The lexeme is not copied; `span` refers back into the
/// source buffer, which must outlive the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, line: usize) -> Self {
        Token { kind, span, line }
    }

    /// Returns the lexeme text, or an empty string if the span does not fall
    /// on character boundaries of `source`.
    pub fn lexeme<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.start..self.span.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_is_recognised() {
        let words = [
            "and", "array", "as", "bool", "break", "byte", "const", "continue", "else", "enum",
            "false", "float", "func", "if", "int", "map", "or", "pass", "print", "print_err",
            "recipe", "return", "ref", "sbyte", "str", "true", "uint", "while",
        ];
        for word in words {
            let kind = TokenKind::keyword_or_identifier(word);
            assert!(kind.is_keyword(), "'{}' classified as {:?}", word, kind);
        }
        assert_eq!(KEYWORDS.len(), words.len());
    }

    #[test]
    fn test_near_keywords_are_identifiers() {
        for word in ["an", "ands", "printerr", "print_", "constant", "i", "whiles", "Int"] {
            assert_eq!(
                TokenKind::keyword_or_identifier(word),
                TokenKind::Identifier,
                "'{}' should be an identifier",
                word
            );
        }
    }

    #[test]
    fn test_print_and_print_err_are_distinct() {
        assert_eq!(TokenKind::keyword_or_identifier("print"), TokenKind::Print);
        assert_eq!(
            TokenKind::keyword_or_identifier("print_err"),
            TokenKind::PrintErr
        );
    }

    #[test]
    fn test_lexeme_slices_source() {
        let source = "12 + 3";
        let token = Token::new(TokenKind::Plus, Span::new(3, 4), 1);
        assert_eq!(token.lexeme(source), "+");
    }
}
