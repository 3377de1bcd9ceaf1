use std::fmt;

use crate::diag::SourceLoc;

/// Kinds of "words" produced by the `Tokenizer`.
///
/// The discriminants are the numbers the token-dump tool prints and are part
/// of the observable interface.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Undefined = 0,

    // Reserved words
    RwProgram = 1,
    RwBegin = 2,
    RwEnd = 3,
    RwInt = 4,
    RwIf = 5,
    RwThen = 6,
    RwElse = 7,
    RwWhile = 8,
    RwLoop = 9,
    RwRead = 10,
    RwWrite = 11,
    RwAnd = 12,
    RwOr = 13,

    // Punctuation
    Semicolon = 14,
    Comma = 15,
    Equal = 16,
    ExclamationMark = 17,

    // Brackets
    LSquareBracket = 18,
    RSquareBracket = 19,
    LRoundBracket = 20,
    RRoundBracket = 21,

    // Operations
    Plus = 22,
    Minus = 23,
    Star = 24,

    // Comparators
    CompNotEqual = 25,
    CompEqual = 26,
    CompGreaterThanEqual = 27,
    CompLessThanEqual = 28,
    CompGreaterThan = 29,
    CompLessThan = 30,

    Integer = 31,
    Identifier = 32,
    Eof = 33,
}

impl TokenKind {
    /// The number the token-dump tool prints for this kind.
    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn is_comparator(self) -> bool {
        matches!(
            self,
            TokenKind::CompNotEqual
                | TokenKind::CompEqual
                | TokenKind::CompGreaterThanEqual
                | TokenKind::CompLessThanEqual
                | TokenKind::CompGreaterThan
                | TokenKind::CompLessThan
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Undefined => write!(f, "undefined"),
            TokenKind::RwProgram => write!(f, "program"),
            TokenKind::RwBegin => write!(f, "begin"),
            TokenKind::RwEnd => write!(f, "end"),
            TokenKind::RwInt => write!(f, "int"),
            TokenKind::RwIf => write!(f, "if"),
            TokenKind::RwThen => write!(f, "then"),
            TokenKind::RwElse => write!(f, "else"),
            TokenKind::RwWhile => write!(f, "while"),
            TokenKind::RwLoop => write!(f, "loop"),
            TokenKind::RwRead => write!(f, "read"),
            TokenKind::RwWrite => write!(f, "write"),
            TokenKind::RwAnd => write!(f, "and"),
            TokenKind::RwOr => write!(f, "or"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Equal => write!(f, "="),
            TokenKind::ExclamationMark => write!(f, "!"),
            TokenKind::LSquareBracket => write!(f, "["),
            TokenKind::RSquareBracket => write!(f, "]"),
            TokenKind::LRoundBracket => write!(f, "("),
            TokenKind::RRoundBracket => write!(f, ")"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::CompNotEqual => write!(f, "!="),
            TokenKind::CompEqual => write!(f, "=="),
            TokenKind::CompGreaterThanEqual => write!(f, ">="),
            TokenKind::CompLessThanEqual => write!(f, "<="),
            TokenKind::CompGreaterThan => write!(f, ">"),
            TokenKind::CompLessThan => write!(f, "<"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Eof => write!(f, "eof"),
        }
    }
}

/// A lexical unit: kind, lexeme, and where it started.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: SourceLoc,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, loc: SourceLoc) -> Token {
        Token {
            kind,
            text: text.into(),
            loc,
        }
    }

    /// The sentinel held before the first `next_token` call.
    pub fn undefined() -> Token {
        Token::new(TokenKind::Undefined, "", SourceLoc::new(1, 1))
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

// Locations are left out of equality so that trees re-parsed from
// differently laid out source still compare structurally equal.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
