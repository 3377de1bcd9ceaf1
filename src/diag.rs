//! Diagnostic catalogue shared by the tokenizer, parser and executor.

use std::error::Error;
use std::fmt;

use crate::token::Token;

/// A line/column pair, both counted from one.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub fn new(line: u32, column: u32) -> SourceLoc {
        SourceLoc { line, column }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}:{}", self.line, self.column)
    }
}

/// Every kind of error the pipeline can raise, with its message template.
#[derive(Debug, PartialEq, Clone)]
pub enum DiagKind {
    // Lexical
    IllegalIdentifier {
        text: String,
        lowercase: bool,
        digit_tail: bool,
    },
    IdentifierTooLong(String),
    IllegalInteger(String),
    IntegerLeadingZeros(String),
    IntegerTooLong(String),
    IllegalToken(String),
    UnknownToken(String),

    // Syntactic
    MissingFound(&'static str, String),
    MissingReservedWord(&'static str),
    MissingReservedWordAfter(&'static str, &'static str),
    MissingReservedWordAfterIn(&'static str, &'static str, &'static str),
    MissingReservedWordAtStartOf(&'static str, &'static str),
    MissingTokenAtStartOf(&'static str, &'static str),
    MissingTokenAfterIn(&'static str, &'static str, &'static str),
    MissingTokenAtEndOf(&'static str, &'static str),
    MissingTokenAtEndOfIn(&'static str, &'static str, &'static str),
    UnexpectedFactorType(String),
    UnexpectedComparisonType(String),
    UnexpectedConditionalType(String),
    ExpectedEof(String),

    // Semantic, raised while parsing
    IdentifierRedeclaration(String),
    UndeclaredIdentifier(String),
    Uninitialized(String),
    UninitializedFlow(String),

    // Runtime
    ArithmeticOverflow(&'static str),
    ArithmeticUnderflow(&'static str),
    InvalidIntegerInput,
}

impl fmt::Display for DiagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagKind::IllegalIdentifier {
                text,
                lowercase,
                digit_tail,
            } => {
                write!(f, "Illegal identifier: \"{}\".", text)?;
                if *lowercase {
                    write!(f, " May not contain lowercase characters.")?;
                }
                if *digit_tail {
                    write!(
                        f,
                        " May not contain non-digit characters once a digit sequence has started."
                    )?;
                }
                Ok(())
            }
            DiagKind::IdentifierTooLong(text) => write!(
                f,
                "Illegal identifier: \"{}\". Has a length of {}. \
                 The length of an identifier may not exceed 8.",
                text,
                text.len()
            ),
            DiagKind::IllegalInteger(text) => write!(
                f,
                "Illegal integer: \"{}\". May not contain non-digit characters.",
                text
            ),
            DiagKind::IntegerLeadingZeros(text) => write!(
                f,
                "Illegal integer: \"{}\". May not contain leading zeros.",
                text
            ),
            DiagKind::IntegerTooLong(text) => write!(
                f,
                "Illegal integer: \"{}\". Has a length of {}. \
                 The length of an integer may not exceed 8.",
                text,
                text.len()
            ),
            DiagKind::IllegalToken(text) => write!(
                f,
                "Illegal token: \"{}\". Contains invalid combination of characters.",
                text
            ),
            DiagKind::UnknownToken(text) => write!(f, "Unknown token: \"{}\".", text),
            DiagKind::MissingFound(expected, found) => {
                write!(f, "Expected {}. Found '{}'.", expected, found)
            }
            DiagKind::MissingReservedWord(word) => {
                write!(f, "Expected reserved word: '{}'.", word)
            }
            DiagKind::MissingReservedWordAfter(word, after) => {
                write!(f, "Expected reserved word: '{}' after '{}'.", word, after)
            }
            DiagKind::MissingReservedWordAfterIn(word, after, ctx) => write!(
                f,
                "Expected reserved word: '{}' after '{}' in {}.",
                word, after, ctx
            ),
            DiagKind::MissingReservedWordAtStartOf(word, ctx) => {
                write!(f, "Expected reserved word: '{}' at start of {}.", word, ctx)
            }
            DiagKind::MissingTokenAtStartOf(token, ctx) => {
                write!(f, "Expected '{}' token at start of {}.", token, ctx)
            }
            DiagKind::MissingTokenAfterIn(token, after, ctx) => {
                write!(f, "Expected '{}' token after '{}' in {}.", token, after, ctx)
            }
            DiagKind::MissingTokenAtEndOf(token, of) => {
                write!(f, "Expected '{}' token at end of '{}'.", token, of)
            }
            DiagKind::MissingTokenAtEndOfIn(token, of, ctx) => {
                write!(f, "Expected '{}' token at end of '{}' in {}.", token, of, ctx)
            }
            DiagKind::UnexpectedFactorType(text) => write!(
                f,
                "Unexpected factor type: {}. Expected one of \
                 [integer, constant, identifier, expression].",
                text
            ),
            DiagKind::UnexpectedComparisonType(text) => write!(
                f,
                "Unexpected comparison type: {}. Expected one of \
                 ['!=', '==', '<', '>', '<=', '>='].",
                text
            ),
            DiagKind::UnexpectedConditionalType(text) => write!(
                f,
                "Unexpected conditional type: {}. Expected one of [\"and\", \"or\"].",
                text
            ),
            DiagKind::ExpectedEof(text) => write!(
                f,
                "Token found after end of program: '{}'. Expected to reach \
                 end-of-file after parsing a program.",
                text
            ),
            DiagKind::IdentifierRedeclaration(name) => {
                write!(f, "Redeclaration of identifier: '{}'.", name)
            }
            // The misspelling below is long-established observable output.
            DiagKind::UndeclaredIdentifier(name) => {
                write!(f, "Missing decleration for identifier: '{}'.", name)
            }
            DiagKind::Uninitialized(name) => {
                write!(f, "Identifier used before initialization: '{}'.", name)
            }
            DiagKind::UninitializedFlow(name) => write!(
                f,
                "Not all paths of the program initialize '{}' before it is used \
                 here. This may be a false-positive but can be indicative of a \
                 design flaw in your program.",
                name
            ),
            DiagKind::ArithmeticOverflow(op) => write!(
                f,
                "Performing {} here will cause overflow and unexpected behavior.",
                op
            ),
            DiagKind::ArithmeticUnderflow(op) => write!(
                f,
                "Performing {} here will cause underflow and unexpected behavior.",
                op
            ),
            DiagKind::InvalidIntegerInput => write!(f, "Invalid integer input."),
        }
    }
}

/// A diagnostic, optionally pinned to the token that provoked it.
#[derive(Debug, PartialEq, Clone)]
pub struct Diag {
    pub kind: DiagKind,
    pub token: Option<Token>,
}

impl Diag {
    pub fn new(kind: DiagKind) -> Diag {
        Diag { kind, token: None }
    }

    pub fn at(token: Token, kind: DiagKind) -> Diag {
        Diag {
            kind,
            token: Some(token),
        }
    }
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(t) => write!(f, "[{}] at token: \"{}\". {}", t.loc, t.text, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl Error for Diag {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
