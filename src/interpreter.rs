//! API to drive the whole pipeline.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;

use crate::ast::Prog;
use crate::ctx::Context;
use crate::eval::{Executor, RuntimeError};
use crate::parser::{Parser, ParserError};

/// Errors the pipeline can raise.  Each stage formats its own prefix and
/// location, so drivers only print the error.
#[derive(Debug)]
pub enum CoreError {
    /// Error occurring during lexical, syntactic or semantic analysis.
    Parse(ParserError),

    /// Error occurring during execution.
    Runtime(RuntimeError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Parse(e) => write!(f, "{}", e),
            CoreError::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CoreError::Parse(e) => Some(e),
            CoreError::Runtime(e) => Some(e),
        }
    }
}

impl From<ParserError> for CoreError {
    fn from(e: ParserError) -> CoreError {
        CoreError::Parse(e)
    }
}

impl From<RuntimeError> for CoreError {
    fn from(e: RuntimeError) -> CoreError {
        CoreError::Runtime(e)
    }
}

/// Parse a CORE program, returning the tree and the populated symbol table.
pub fn parse<R: BufRead>(source: R) -> Result<(Prog, Context), CoreError> {
    let mut ctx = Context::new();
    let mut parser = Parser::new(source, &mut ctx);
    let prog = parser.parse()?;
    Ok((prog, ctx))
}

/// Parse and execute a CORE program.
///
/// # Example
///
/// ```
/// use rcore::interpreter;
///
/// let source = "program int X; begin read X; write X; end";
/// let mut input = "42".as_bytes();
/// let mut output: Vec<u8> = Vec::new();
/// interpreter::interpret(source.as_bytes(), &mut input, &mut output)?;
/// assert_eq!(output, b"X =? X = 42\n");
/// # Ok::<(), rcore::interpreter::CoreError>(())
/// ```
pub fn interpret<R: BufRead, I: BufRead, W: Write>(
    source: R,
    input: &mut I,
    output: &mut W,
) -> Result<(), CoreError> {
    let (prog, mut ctx) = parse(source)?;
    Executor::new(&mut ctx, input, output).execute(&prog)?;
    Ok(())
}
