//! Tree-walking executor.
//!
//! Walks a parsed program against the symbol table the parser populated.
//! Declarations were fully processed at parse time and do not execute.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;

use crate::ast::{
    Comp, CompOp, Cond, CondKind, Exp, ExpOp, Fac, FacKind, Prog, Stmt, StmtKind, StmtSeq, Term,
};
use crate::ctx::Context;
use crate::diag::{Diag, DiagKind};
use crate::token::Token;

#[derive(Debug)]
pub enum RuntimeError {
    Io(io::Error),
    Diag(Diag),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "Runtime Error: I/O error: {}", e),
            RuntimeError::Diag(d) => match &d.token {
                Some(t) => write!(
                    f,
                    "Runtime Error [{}] at token: \"{}\". {}",
                    t.loc, t.text, d.kind
                ),
                None => write!(f, "Runtime Error: {}", d.kind),
            },
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            RuntimeError::Diag(_) => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

impl From<Diag> for RuntimeError {
    fn from(d: Diag) -> RuntimeError {
        RuntimeError::Diag(d)
    }
}

fn overflow(token: &Token, op: &'static str) -> RuntimeError {
    RuntimeError::Diag(Diag::at(token.clone(), DiagKind::ArithmeticOverflow(op)))
}

fn underflow(token: &Token, op: &'static str) -> RuntimeError {
    RuntimeError::Diag(Diag::at(token.clone(), DiagKind::ArithmeticUnderflow(op)))
}

/// Executes statement nodes in program order, reading from `input` and
/// writing to `output`.
pub struct Executor<'a, R: BufRead, W: Write> {
    ctx: &'a mut Context,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Executor<'a, R, W> {
    pub fn new(ctx: &'a mut Context, input: &'a mut R, output: &'a mut W) -> Executor<'a, R, W> {
        Executor {
            ctx,
            input,
            output,
        }
    }

    pub fn execute(&mut self, prog: &Prog) -> Result<(), RuntimeError> {
        self.exec_stmt_seq(&prog.stmts)
    }

    fn exec_stmt_seq(&mut self, seq: &StmtSeq) -> Result<(), RuntimeError> {
        let mut seq = Some(seq);
        while let Some(s) = seq {
            self.exec_stmt(&s.stmt)?;
            seq = s.rest.as_deref();
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match &stmt.kind {
            StmtKind::Assign(assign) => {
                // The expression is evaluated before the target cell changes.
                let value = self.eval_exp(&assign.exp)?;
                self.ctx.set(&assign.id, value)?;
            }
            StmtKind::If(if_stmt) => {
                if self.eval_cond(&if_stmt.cond)? {
                    self.exec_stmt_seq(&if_stmt.then_seq)?;
                } else if let Some(else_seq) = &if_stmt.else_seq {
                    self.exec_stmt_seq(else_seq)?;
                }
            }
            StmtKind::Loop(loop_stmt) => {
                while self.eval_cond(&loop_stmt.cond)? {
                    self.exec_stmt_seq(&loop_stmt.body)?;
                }
            }
            StmtKind::In(in_stmt) => {
                self.ctx
                    .read_into(&in_stmt.ids, &mut *self.input, &mut *self.output)?;
            }
            StmtKind::Out(out_stmt) => {
                self.ctx.write_from(&out_stmt.ids, &mut *self.output)?;
            }
        }
        Ok(())
    }

    fn eval_cond(&mut self, cond: &Cond) -> Result<bool, RuntimeError> {
        match &cond.kind {
            CondKind::Comparison(comp) => self.eval_comp(comp),
            CondKind::Not(inner) => Ok(!self.eval_cond(inner)?),
            // Both operands are evaluated before combining; no short-circuit.
            CondKind::And(lhs, rhs) => {
                let l = self.eval_cond(lhs)?;
                let r = self.eval_cond(rhs)?;
                Ok(l && r)
            }
            CondKind::Or(lhs, rhs) => {
                let l = self.eval_cond(lhs)?;
                let r = self.eval_cond(rhs)?;
                Ok(l || r)
            }
        }
    }

    fn eval_comp(&mut self, comp: &Comp) -> Result<bool, RuntimeError> {
        let l = self.eval_fac(&comp.lhs)?;
        let r = self.eval_fac(&comp.rhs)?;
        Ok(match comp.op {
            CompOp::NotEqual => l != r,
            CompOp::Equal => l == r,
            CompOp::GreaterThanEqual => l >= r,
            CompOp::LessThanEqual => l <= r,
            CompOp::GreaterThan => l > r,
            CompOp::LessThan => l < r,
        })
    }

    fn eval_exp(&mut self, exp: &Exp) -> Result<i32, RuntimeError> {
        let lhs = self.eval_term(&exp.term)?;
        match &exp.rest {
            None => Ok(lhs),
            Some((ExpOp::Plus, rhs)) => {
                let rhs = self.eval_exp(rhs)?;
                lhs.checked_add(rhs).ok_or_else(|| {
                    if rhs > 0 {
                        overflow(&exp.token, "addition")
                    } else {
                        underflow(&exp.token, "addition")
                    }
                })
            }
            Some((ExpOp::Minus, rhs)) => {
                let rhs = self.eval_exp(rhs)?;
                lhs.checked_sub(rhs).ok_or_else(|| {
                    if rhs > 0 {
                        underflow(&exp.token, "subtraction")
                    } else {
                        overflow(&exp.token, "subtraction")
                    }
                })
            }
        }
    }

    fn eval_term(&mut self, term: &Term) -> Result<i32, RuntimeError> {
        let lhs = self.eval_fac(&term.fac)?;
        match &term.rest {
            None => Ok(lhs),
            Some(rhs) => {
                let rhs = self.eval_term(rhs)?;
                // Multiplying by zero cannot overflow whatever the left side is.
                if rhs == 0 {
                    return Ok(0);
                }
                lhs.checked_mul(rhs).ok_or_else(|| {
                    if (lhs > 0) == (rhs > 0) {
                        overflow(&term.token, "multiplication")
                    } else {
                        underflow(&term.token, "multiplication")
                    }
                })
            }
        }
    }

    fn eval_fac(&mut self, fac: &Fac) -> Result<i32, RuntimeError> {
        match &fac.kind {
            FacKind::Integer(n) => Ok(*n),
            // The parser proved initialization already; the cell check stays
            // as a runtime backstop.
            FacKind::Identifier(id) => Ok(self.ctx.get(id)?),
            FacKind::Parenthesized(exp) => self.eval_exp(exp),
        }
    }
}

impl<R: BufRead, W: Write> fmt::Debug for Executor<'_, R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor").field("ctx", &self.ctx).finish()
    }
}
