//! Lexical analyzer

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::io::{self, Bytes};
use std::iter::Peekable;

use crate::diag::{DiagKind, SourceLoc};
use crate::token::{Token, TokenKind};

const IDENTIFIER_MAX_LENGTH: usize = 8;
const INTEGER_MAX_LENGTH: usize = 8;

const RESERVED_WORDS: [(&str, TokenKind); 13] = [
    ("program", TokenKind::RwProgram),
    ("begin", TokenKind::RwBegin),
    ("end", TokenKind::RwEnd),
    ("int", TokenKind::RwInt),
    ("if", TokenKind::RwIf),
    ("then", TokenKind::RwThen),
    ("else", TokenKind::RwElse),
    ("while", TokenKind::RwWhile),
    ("loop", TokenKind::RwLoop),
    ("read", TokenKind::RwRead),
    ("write", TokenKind::RwWrite),
    ("and", TokenKind::RwAnd),
    ("or", TokenKind::RwOr),
];

fn reserved_word_kind(text: &str) -> Option<TokenKind> {
    RESERVED_WORDS
        .iter()
        .find(|(word, _)| *word == text)
        .map(|(_, kind)| *kind)
}

/// Turn a sequence of bytes into a sequence of CORE tokens, on demand.
///
/// Scanning is greedy within a token class and non-greedy across classes:
/// `===` comes out as `==` followed by `=`. Line and column both count from
/// one; a newline starts the next column count over.
pub struct Tokenizer<R: BufRead> {
    input: Peekable<Bytes<R>>,
    line: u32,
    column: u32,
    current: Token,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<R: BufRead> Tokenizer<R> {
    /// Creates a new tokenizer operating on `input`.  The current token
    /// starts out as the `undefined` sentinel.
    pub fn new(input: R) -> Tokenizer<R> {
        Tokenizer {
            input: input.bytes().peekable(),
            line: 1,
            column: 1,
            current: Token::undefined(),
            buf: String::new(),
        }
    }

    /// The most recently scanned token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// True once the end of input has been delivered as the `eof` token.
    pub fn is_eof(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Scan the next token, remember it as `current`, and return it.
    /// Calling this again after `eof` is a precondition violation.
    pub fn next_token(&mut self) -> Result<&Token, TokenizerError> {
        debug_assert!(!self.is_eof(), "end of token stream");

        loop {
            let byte = match self.next_byte()? {
                None => {
                    self.current =
                        Token::new(TokenKind::Eof, "eof", SourceLoc::new(self.line, self.column));
                    return Ok(&self.current);
                }
                Some(b) => b,
            };

            match byte {
                b'\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                b' ' | b'\t' | b'\r' => self.column += 1,
                b';' => return self.emit(TokenKind::Semicolon, ";"),
                b',' => return self.emit(TokenKind::Comma, ","),
                b'[' => return self.emit(TokenKind::LSquareBracket, "["),
                b']' => return self.emit(TokenKind::RSquareBracket, "]"),
                b'(' => return self.emit(TokenKind::LRoundBracket, "("),
                b')' => return self.emit(TokenKind::RRoundBracket, ")"),
                b'+' => return self.emit(TokenKind::Plus, "+"),
                b'-' => return self.emit(TokenKind::Minus, "-"),
                b'*' => return self.emit(TokenKind::Star, "*"),
                b'=' => {
                    return self.one_or_two(TokenKind::Equal, "=", TokenKind::CompEqual, "==");
                }
                b'!' => {
                    return self.one_or_two(
                        TokenKind::ExclamationMark,
                        "!",
                        TokenKind::CompNotEqual,
                        "!=",
                    );
                }
                b'>' => {
                    return self.one_or_two(
                        TokenKind::CompGreaterThan,
                        ">",
                        TokenKind::CompGreaterThanEqual,
                        ">=",
                    );
                }
                b'<' => {
                    return self.one_or_two(
                        TokenKind::CompLessThan,
                        "<",
                        TokenKind::CompLessThanEqual,
                        "<=",
                    );
                }
                b'A'..=b'Z' => return self.scan_identifier(byte),
                b'a'..=b'z' => return self.scan_reserved_word(byte),
                b'0'..=b'9' => return self.scan_integer(byte),
                _ => {
                    return Err(self.lex_error(DiagKind::UnknownToken((byte as char).to_string())));
                }
            }
        }
    }

    /// Identifier = `[A-Z]+[0-9]*`, at most eight bytes.  The alphanumeric
    /// tail past the valid prefix is consumed too so the whole offending
    /// lexeme appears in the diagnostic.
    fn scan_identifier(&mut self, first: u8) -> Result<&Token, TokenizerError> {
        self.buf.clear();
        self.buf.push(first as char);

        let mut lowercase = false;
        while let Some(b) = self.peek_byte()? {
            if !b.is_ascii_alphabetic() {
                break;
            }
            if b.is_ascii_lowercase() {
                lowercase = true;
            }
            self.buf.push(b as char);
            self.input.next();
        }

        let mut digit_tail = false;
        while let Some(b) = self.peek_byte()? {
            if !b.is_ascii_alphanumeric() {
                break;
            }
            if !b.is_ascii_digit() {
                digit_tail = true;
            }
            self.buf.push(b as char);
            self.input.next();
        }

        if lowercase || digit_tail {
            return Err(self.lex_error(DiagKind::IllegalIdentifier {
                text: self.buf.clone(),
                lowercase,
                digit_tail,
            }));
        }
        if self.buf.len() > IDENTIFIER_MAX_LENGTH {
            return Err(self.lex_error(DiagKind::IdentifierTooLong(self.buf.clone())));
        }

        let text = self.buf.clone();
        self.emit(TokenKind::Identifier, &text)
    }

    /// Reserved word = `[a-z]+` and must be one of the thirteen known words.
    fn scan_reserved_word(&mut self, first: u8) -> Result<&Token, TokenizerError> {
        self.buf.clear();
        self.buf.push(first as char);

        let mut invalid = false;
        while let Some(b) = self.peek_byte()? {
            if !b.is_ascii_alphanumeric() {
                break;
            }
            if !b.is_ascii_lowercase() {
                invalid = true;
            }
            self.buf.push(b as char);
            self.input.next();
        }

        if !invalid {
            if let Some(kind) = reserved_word_kind(&self.buf) {
                let text = self.buf.clone();
                return self.emit(kind, &text);
            }
        }
        Err(self.lex_error(DiagKind::IllegalToken(self.buf.clone())))
    }

    /// Integer = `0|[1-9][0-9]*`, at most eight digits.
    fn scan_integer(&mut self, first: u8) -> Result<&Token, TokenizerError> {
        self.buf.clear();
        self.buf.push(first as char);

        let mut non_digit = false;
        while let Some(b) = self.peek_byte()? {
            if !b.is_ascii_alphanumeric() {
                break;
            }
            if !b.is_ascii_digit() {
                non_digit = true;
            }
            self.buf.push(b as char);
            self.input.next();
        }

        if non_digit {
            return Err(self.lex_error(DiagKind::IllegalInteger(self.buf.clone())));
        }
        if self.buf.len() > 1 && self.buf.starts_with('0') {
            return Err(self.lex_error(DiagKind::IntegerLeadingZeros(self.buf.clone())));
        }
        if self.buf.len() > INTEGER_MAX_LENGTH {
            return Err(self.lex_error(DiagKind::IntegerTooLong(self.buf.clone())));
        }

        let text = self.buf.clone();
        self.emit(TokenKind::Integer, &text)
    }

    /// On `=`, `!`, `>`, `<`: take a following `=` greedily.
    fn one_or_two(
        &mut self,
        single: TokenKind,
        single_text: &str,
        double: TokenKind,
        double_text: &str,
    ) -> Result<&Token, TokenizerError> {
        if self.peek_byte()? == Some(b'=') {
            self.input.next();
            self.emit(double, double_text)
        } else {
            self.emit(single, single_text)
        }
    }

    /// Record `text` as the current token at the current location, then
    /// advance the column past it.
    fn emit(&mut self, kind: TokenKind, text: &str) -> Result<&Token, TokenizerError> {
        self.current = Token::new(kind, text, SourceLoc::new(self.line, self.column));
        self.column += text.len() as u32;
        Ok(&self.current)
    }

    fn lex_error(&self, kind: DiagKind) -> TokenizerError {
        TokenizerError::Lex {
            loc: SourceLoc::new(self.line, self.column),
            kind,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, TokenizerError> {
        match self.input.next() {
            None => Ok(None),
            Some(Ok(b)) => Ok(Some(b)),
            Some(Err(e)) => Err(TokenizerError::Io(e)),
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, TokenizerError> {
        match self.input.peek() {
            None => Ok(None),
            Some(Ok(b)) => Ok(Some(*b)),
            Some(Err(_)) => {
                // We just peeked the error, so next() must yield it.
                let e = self.input.next().unwrap().unwrap_err();
                Err(TokenizerError::Io(e))
            }
        }
    }
}

impl<R: BufRead> fmt::Debug for Tokenizer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("current", &self.current)
            .finish()
    }
}

#[derive(Debug)]
pub enum TokenizerError {
    Io(io::Error),
    Lex { loc: SourceLoc, kind: DiagKind },
}

impl Error for TokenizerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TokenizerError::Io(e) => Some(e),
            TokenizerError::Lex { .. } => None,
        }
    }
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::Io(e) => write!(f, "read error: {}", e),
            TokenizerError::Lex { loc, kind } => write!(f, "Tokenizer Error [{}]. {}", loc, kind),
        }
    }
}

impl From<io::Error> for TokenizerError {
    fn from(e: io::Error) -> TokenizerError {
        TokenizerError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut tokens = vec![];
        while !tokenizer.is_eof() {
            tokens.push(tokenizer.next_token()?.clone());
        }
        Ok(tokens)
    }

    fn kinds(input: &str) -> Result<Vec<TokenKind>, TokenizerError> {
        Ok(scan(input)?.into_iter().map(|t| t.kind).collect())
    }

    fn lex_error(input: &str) -> (SourceLoc, DiagKind) {
        match scan(input) {
            Err(TokenizerError::Lex { loc, kind }) => (loc, kind),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    fn lex_message(input: &str) -> String {
        match scan(input) {
            Err(e) => e.to_string(),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn current_starts_undefined() {
        let tokenizer = Tokenizer::new("program".as_bytes());
        assert_eq!(tokenizer.current().kind, TokenKind::Undefined);
        assert_eq!(tokenizer.current().text, "");
        assert!(!tokenizer.is_eof());
    }

    #[test]
    fn punctuation_tokens() -> Result<(), TokenizerError> {
        assert_eq!(
            kinds("; , [ ] ( ) + - *")?,
            vec![
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::LSquareBracket,
                TokenKind::RSquareBracket,
                TokenKind::LRoundBracket,
                TokenKind::RRoundBracket,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn two_byte_operators_are_greedy() -> Result<(), TokenizerError> {
        assert_eq!(
            kinds("== != >= <= = ! > <")?,
            vec![
                TokenKind::CompEqual,
                TokenKind::CompNotEqual,
                TokenKind::CompGreaterThanEqual,
                TokenKind::CompLessThanEqual,
                TokenKind::Equal,
                TokenKind::ExclamationMark,
                TokenKind::CompGreaterThan,
                TokenKind::CompLessThan,
                TokenKind::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn comparator_kinds_know_themselves() -> Result<(), TokenizerError> {
        for kind in kinds("!= == >= <= > <")? {
            if kind != TokenKind::Eof {
                assert!(kind.is_comparator());
            }
        }
        assert!(!TokenKind::Equal.is_comparator());
        assert!(!TokenKind::ExclamationMark.is_comparator());
        Ok(())
    }

    #[test]
    fn triple_equal_splits_into_double_then_single() -> Result<(), TokenizerError> {
        assert_eq!(
            kinds("===")?,
            vec![TokenKind::CompEqual, TokenKind::Equal, TokenKind::Eof]
        );
        Ok(())
    }

    #[test]
    fn reserved_words() -> Result<(), TokenizerError> {
        assert_eq!(
            kinds("program begin end int if then else while loop read write and or")?,
            vec![
                TokenKind::RwProgram,
                TokenKind::RwBegin,
                TokenKind::RwEnd,
                TokenKind::RwInt,
                TokenKind::RwIf,
                TokenKind::RwThen,
                TokenKind::RwElse,
                TokenKind::RwWhile,
                TokenKind::RwLoop,
                TokenKind::RwRead,
                TokenKind::RwWrite,
                TokenKind::RwAnd,
                TokenKind::RwOr,
                TokenKind::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn unknown_reserved_word_is_rejected() {
        let (loc, kind) = lex_error("foo");
        assert_eq!(loc, SourceLoc::new(1, 1));
        assert_eq!(kind, DiagKind::IllegalToken("foo".to_string()));
    }

    #[test]
    fn identifiers() -> Result<(), TokenizerError> {
        let tokens = scan("X Y2 ABC123")?;
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "X");
        assert_eq!(tokens[1].text, "Y2");
        assert_eq!(tokens[2].text, "ABC123");
        Ok(())
    }

    #[test]
    fn identifier_of_length_eight_is_accepted() -> Result<(), TokenizerError> {
        for id in ["ABCDEFGH", "A1234567", "ABC12345"] {
            let tokens = scan(id)?;
            assert_eq!(tokens[0].kind, TokenKind::Identifier);
            assert_eq!(tokens[0].text, id);
        }
        Ok(())
    }

    #[test]
    fn identifier_of_length_nine_is_rejected() {
        let (_, kind) = lex_error("ABCDEFGHI");
        assert_eq!(kind, DiagKind::IdentifierTooLong("ABCDEFGHI".to_string()));
        let (_, kind) = lex_error("A12345678");
        assert_eq!(kind, DiagKind::IdentifierTooLong("A12345678".to_string()));
    }

    #[test]
    fn identifier_with_lowercase_is_rejected() {
        let (_, kind) = lex_error("ABc");
        assert_eq!(
            kind,
            DiagKind::IllegalIdentifier {
                text: "ABc".to_string(),
                lowercase: true,
                digit_tail: false,
            }
        );
        assert!(lex_message("ABc").contains("May not contain lowercase characters."));
    }

    #[test]
    fn identifier_with_letter_after_digits_is_rejected() {
        let (_, kind) = lex_error("A1A");
        assert_eq!(
            kind,
            DiagKind::IllegalIdentifier {
                text: "A1A".to_string(),
                lowercase: false,
                digit_tail: true,
            }
        );
    }

    #[test]
    fn identifier_breaking_both_rules_reports_both() {
        let message = lex_message("ABc12X");
        assert!(message.contains("May not contain lowercase characters."));
        assert!(message.contains("once a digit sequence has started."));
    }

    #[test]
    fn integers() -> Result<(), TokenizerError> {
        let tokens = scan("0 7 12345678")?;
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Integer));
        assert_eq!(tokens[0].text, "0");
        assert_eq!(tokens[2].text, "12345678");
        Ok(())
    }

    #[test]
    fn integer_of_length_nine_is_rejected() {
        let (_, kind) = lex_error("123456789");
        assert_eq!(kind, DiagKind::IntegerTooLong("123456789".to_string()));
    }

    #[test]
    fn integer_with_leading_zeros_is_rejected() {
        let (_, kind) = lex_error("007");
        assert_eq!(kind, DiagKind::IntegerLeadingZeros("007".to_string()));
    }

    #[test]
    fn integer_with_trailing_letters_is_rejected() {
        let (_, kind) = lex_error("45e8");
        assert_eq!(kind, DiagKind::IllegalInteger("45e8".to_string()));
    }

    #[test]
    fn stray_character_is_rejected() {
        let (loc, kind) = lex_error("  %");
        assert_eq!(loc, SourceLoc::new(1, 3));
        assert_eq!(kind, DiagKind::UnknownToken("%".to_string()));
    }

    #[test]
    fn lexical_errors_carry_the_stage_prefix() {
        assert!(lex_message("foo").starts_with("Tokenizer Error [Line 1:1]. Illegal token:"));
    }

    #[test]
    fn tracks_lines_and_columns() -> Result<(), TokenizerError> {
        let tokens = scan("XX YY\n  Z==4")?;
        assert_eq!(tokens[0].loc, SourceLoc::new(1, 1));
        assert_eq!(tokens[1].loc, SourceLoc::new(1, 4));
        assert_eq!(tokens[2].loc, SourceLoc::new(2, 3));
        assert_eq!(tokens[3].loc, SourceLoc::new(2, 4)); // ==
        assert_eq!(tokens[4].loc, SourceLoc::new(2, 6));
        Ok(())
    }

    #[test]
    fn carriage_returns_count_as_blanks() -> Result<(), TokenizerError> {
        let tokens = scan("X\r\nY")?;
        assert_eq!(tokens[0].loc, SourceLoc::new(1, 1));
        assert_eq!(tokens[1].loc, SourceLoc::new(2, 1));
        Ok(())
    }

    #[test]
    fn empty_input_yields_eof_only() -> Result<(), TokenizerError> {
        let mut tokenizer = Tokenizer::new("".as_bytes());
        let token = tokenizer.next_token()?;
        assert_eq!(token.kind, TokenKind::Eof);
        assert_eq!(token.text, "eof");
        assert!(tokenizer.is_eof());
        Ok(())
    }

    #[test]
    fn token_numbers_for_a_small_program() -> Result<(), TokenizerError> {
        let source = "program\n\n  int X, Y, Z;\nbegin\n read X, Y, Z;\n write X, Y, Z;\nend";
        let numbers: Vec<u32> = scan(source)?.iter().map(|t| t.kind.number()).collect();
        assert_eq!(
            numbers,
            vec![
                1, 4, 32, 15, 32, 15, 32, 14, 2, 10, 32, 15, 32, 15, 32, 14, 11, 32, 15, 32, 15,
                32, 14, 3, 33
            ]
        );
        Ok(())
    }

    #[test]
    fn number_stream_ends_with_33() -> Result<(), TokenizerError> {
        for source in ["", "X = 1 ;", "program end"] {
            let numbers: Vec<u32> = scan(source)?.iter().map(|t| t.kind.number()).collect();
            assert_eq!(numbers.last(), Some(&33));
        }
        Ok(())
    }
}
