//! Recursive-descent parser for CORE.
//!
//! Parsing is strictly predictive: every alternative is chosen by looking at
//! the current token only.  While building the tree the parser also performs
//! two analyses: declaration/use checking against the shared [`Context`], and
//! a flow-sensitive check that every identifier is definitely initialized on
//! all paths before it is used.

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::io::prelude::*;

use crate::ast::{
    Assign, Comp, CompOp, Cond, CondKind, Decl, DeclSeq, Exp, ExpOp, Fac, FacKind, Id, IdList, If,
    In, Loop, Out, Prog, Stmt, StmtKind, StmtSeq, Term,
};
use crate::ctx::Context;
use crate::diag::{Diag, DiagKind};
use crate::scanner::{Tokenizer, TokenizerError};
use crate::token::{Token, TokenKind};

#[derive(Debug)]
pub enum ParserError {
    Tokenize(TokenizerError),
    Syntax(Diag),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::Tokenize(e) => write!(f, "{}", e),
            ParserError::Syntax(d) => match &d.token {
                Some(t) => write!(
                    f,
                    "Parser Error [{}] at token: \"{}\". {}",
                    t.loc, t.text, d.kind
                ),
                None => write!(f, "Parser Error: {}", d.kind),
            },
        }
    }
}

impl Error for ParserError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParserError::Tokenize(e) => Some(e),
            ParserError::Syntax(_) => None,
        }
    }
}

impl From<TokenizerError> for ParserError {
    fn from(e: TokenizerError) -> ParserError {
        ParserError::Tokenize(e)
    }
}

impl From<Diag> for ParserError {
    fn from(d: Diag) -> ParserError {
        ParserError::Syntax(d)
    }
}

/// Identifiers definitely initialized on every path reaching the current
/// point of a statement sequence.
type FlowCtx = HashSet<String>;

fn flow_insert_all(flow: &mut FlowCtx, ids: &IdList) {
    let mut list = Some(ids);
    while let Some(l) = list {
        flow.insert(l.id.name.clone());
        list = l.rest.as_deref();
    }
}

fn flow_check(flow: &FlowCtx, id: &Id) -> Result<(), Diag> {
    if flow.contains(&id.name) {
        Ok(())
    } else {
        Err(Diag::at(
            id.token.clone(),
            DiagKind::UninitializedFlow(id.name.clone()),
        ))
    }
}

fn flow_check_all(flow: &FlowCtx, ids: &IdList) -> Result<(), Diag> {
    let mut list = Some(ids);
    while let Some(l) = list {
        flow_check(flow, &l.id)?;
        list = l.rest.as_deref();
    }
    Ok(())
}

pub struct Parser<'c, R: BufRead> {
    tokenizer: Tokenizer<R>,
    ctx: &'c mut Context,
}

impl<'c, R: BufRead> Parser<'c, R> {
    pub fn new(input: R, ctx: &'c mut Context) -> Parser<'c, R> {
        Parser {
            tokenizer: Tokenizer::new(input),
            ctx,
        }
    }

    /// Drain the tokenizer and produce the tree.  After a successful parse
    /// the whole input has been consumed.
    pub fn parse(&mut self) -> Result<Prog, ParserError> {
        self.advance()?; // load the first token
        let mut flow = FlowCtx::new();
        let prog = self.prog(&mut flow)?;
        if !self.at(TokenKind::Eof) {
            return Err(self.diag(DiagKind::ExpectedEof(self.current().text.clone())));
        }
        Ok(prog)
    }

    /// `<prog> ::= program <decl-seq> begin <stmt-seq> end`
    fn prog(&mut self, flow: &mut FlowCtx) -> Result<Prog, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::RwProgram,
            DiagKind::MissingReservedWord("program"),
        )?;
        let decls = self.decl_seq()?;
        self.expect(
            TokenKind::RwBegin,
            DiagKind::MissingReservedWordAfter("begin", "declaration sequence"),
        )?;
        let stmts = self.stmt_seq(flow)?;
        self.expect(
            TokenKind::RwEnd,
            DiagKind::MissingReservedWordAfter("end", "statement sequence"),
        )?;
        Ok(Prog {
            token,
            decls,
            stmts,
        })
    }

    /// `<decl-seq> ::= <decl> | <decl> <decl-seq>`
    fn decl_seq(&mut self) -> Result<DeclSeq, ParserError> {
        let token = self.current().clone();
        let decl = self.decl()?;
        let rest = if self.can_parse_decl() {
            Some(Box::new(self.decl_seq()?))
        } else {
            None
        };
        Ok(DeclSeq { token, decl, rest })
    }

    fn can_parse_decl(&self) -> bool {
        self.at(TokenKind::RwInt)
    }

    /// `<decl> ::= int <id-list> ;`
    fn decl(&mut self) -> Result<Decl, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::RwInt,
            DiagKind::MissingReservedWordAtStartOf("int", "declaration"),
        )?;
        let ids = self.id_list()?;
        self.ctx.declare(&ids)?;
        self.expect(
            TokenKind::Semicolon,
            DiagKind::MissingTokenAfterIn(";", "identifier list", "decleration"),
        )?;
        Ok(Decl { token, ids })
    }

    /// `<id-list> ::= <id> | <id> , <id-list>`
    fn id_list(&mut self) -> Result<IdList, ParserError> {
        let token = self.current().clone();
        let id = self.id()?;
        let rest = if self.eat(TokenKind::Comma)? {
            Some(Box::new(self.id_list()?))
        } else {
            None
        };
        Ok(IdList { token, id, rest })
    }

    fn id(&mut self) -> Result<Id, ParserError> {
        let token = self.current().clone();
        let name = token.text.clone();
        self.expect(
            TokenKind::Identifier,
            DiagKind::MissingFound("identifier", name.clone()),
        )?;
        Ok(Id { name, token })
    }

    /// `<stmt-seq> ::= <stmt> | <stmt> <stmt-seq>`
    fn stmt_seq(&mut self, flow: &mut FlowCtx) -> Result<StmtSeq, ParserError> {
        let token = self.current().clone();
        let stmt = self.stmt(flow)?;
        let rest = if self.can_parse_stmt() {
            Some(Box::new(self.stmt_seq(flow)?))
        } else {
            None
        };
        Ok(StmtSeq { token, stmt, rest })
    }

    fn can_parse_stmt(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Identifier
                | TokenKind::RwIf
                | TokenKind::RwWhile
                | TokenKind::RwRead
                | TokenKind::RwWrite
        )
    }

    /// `<stmt> ::= <assign> | <if> | <loop> | <in> | <out>`
    fn stmt(&mut self, flow: &mut FlowCtx) -> Result<Stmt, ParserError> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Identifier => StmtKind::Assign(self.assign(flow)?),
            TokenKind::RwIf => StmtKind::If(self.if_stmt(flow)?),
            TokenKind::RwWhile => StmtKind::Loop(self.loop_stmt(flow)?),
            TokenKind::RwRead => StmtKind::In(self.in_stmt(flow)?),
            TokenKind::RwWrite => StmtKind::Out(self.out_stmt(flow)?),
            _ => {
                return Err(self.diag(DiagKind::MissingFound("statement", token.text.clone())));
            }
        };
        Ok(Stmt { token, kind })
    }

    /// `<assign> ::= <id> = <exp> ;`
    fn assign(&mut self, flow: &mut FlowCtx) -> Result<Assign, ParserError> {
        let token = self.current().clone();
        let id = self.id()?;
        self.expect(
            TokenKind::Equal,
            DiagKind::MissingTokenAfterIn("=", "identifier", "assign-statement"),
        )?;
        let exp = self.exp(flow)?;
        self.expect(
            TokenKind::Semicolon,
            DiagKind::MissingTokenAfterIn(";", "expression", "assignment"),
        )?;

        // The right-hand side is analyzed before the target is marked
        // initialized, so `X = X + 1` on an uninitialized X is rejected.
        self.ctx.initialize(&id)?;
        flow.insert(id.name.clone());
        Ok(Assign { token, id, exp })
    }

    /// `<if> ::= if <cond> then <stmt-seq> end ;`
    /// `       | if <cond> then <stmt-seq> else <stmt-seq> end ;`
    fn if_stmt(&mut self, flow: &mut FlowCtx) -> Result<If, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::RwIf,
            DiagKind::MissingReservedWordAtStartOf("if", "if-statement"),
        )?;
        let cond = self.cond(flow)?;
        self.expect(
            TokenKind::RwThen,
            DiagKind::MissingReservedWordAfterIn("then", "conditional", "if-(else)-statement"),
        )?;

        // Branch bodies get their own flow context seeded from the parent.
        let mut then_flow = flow.clone();
        let then_seq = self.stmt_seq(&mut then_flow)?;

        let mut else_seq = None;
        if self.eat(TokenKind::RwElse)? {
            let mut else_flow = flow.clone();
            else_seq = Some(self.stmt_seq(&mut else_flow)?);

            // Only identifiers initialized in both branches are initialized
            // whichever way the condition goes.
            flow.extend(then_flow.intersection(&else_flow).cloned());
        }
        // An if without an else guarantees nothing to the parent sequence.

        let in_ctx = if else_seq.is_some() {
            "if-else-statement"
        } else {
            "if-statement"
        };
        self.expect(
            TokenKind::RwEnd,
            DiagKind::MissingTokenAfterIn("end", "statement sequence", in_ctx),
        )?;
        self.expect(
            TokenKind::Semicolon,
            DiagKind::MissingTokenAfterIn(";", "end", in_ctx),
        )?;
        Ok(If {
            token,
            cond,
            then_seq: Box::new(then_seq),
            else_seq: else_seq.map(Box::new),
        })
    }

    /// `<loop> ::= while <cond> loop <stmt-seq> end ;`
    fn loop_stmt(&mut self, flow: &mut FlowCtx) -> Result<Loop, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::RwWhile,
            DiagKind::MissingReservedWordAtStartOf("while", "while-statement"),
        )?;
        let cond = self.cond(flow)?;
        self.expect(
            TokenKind::RwLoop,
            DiagKind::MissingTokenAfterIn("loop", "conditional", "while-statement"),
        )?;

        // The body may never run, so whatever it initializes stays local.
        let mut body_flow = flow.clone();
        let body = self.stmt_seq(&mut body_flow)?;

        self.expect(
            TokenKind::RwEnd,
            DiagKind::MissingTokenAfterIn("end", "statement sequence", "while-statement"),
        )?;
        self.expect(
            TokenKind::Semicolon,
            DiagKind::MissingTokenAfterIn(";", "end", "while-statement"),
        )?;
        Ok(Loop {
            token,
            cond,
            body: Box::new(body),
        })
    }

    /// `<in> ::= read <id-list> ;`
    fn in_stmt(&mut self, flow: &mut FlowCtx) -> Result<In, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::RwRead,
            DiagKind::MissingReservedWordAtStartOf("read", "read-statement"),
        )?;
        let ids = self.id_list()?;
        // Reading a value initializes the identifier.
        self.ctx.initialize_list(&ids)?;
        flow_insert_all(flow, &ids);
        self.expect(
            TokenKind::Semicolon,
            DiagKind::MissingTokenAfterIn(";", "identifier", "read-statement"),
        )?;
        Ok(In { token, ids })
    }

    /// `<out> ::= write <id-list> ;`
    fn out_stmt(&mut self, flow: &mut FlowCtx) -> Result<Out, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::RwWrite,
            DiagKind::MissingReservedWordAtStartOf("write", "out-statement"),
        )?;
        let ids = self.id_list()?;
        self.ctx.reference_list(&ids)?;
        flow_check_all(flow, &ids)?;
        self.expect(
            TokenKind::Semicolon,
            DiagKind::MissingTokenAfterIn(";", "identifier", "write-statement"),
        )?;
        Ok(Out { token, ids })
    }

    /// `<cond> ::= <comp> | ! <cond> | [ <cond> and <cond> ] | [ <cond> or <cond> ]`
    fn cond(&mut self, flow: &mut FlowCtx) -> Result<Cond, ParserError> {
        let token = self.current().clone();
        let kind = if self.can_parse_comp() {
            CondKind::Comparison(self.comp(flow)?)
        } else if self.eat(TokenKind::ExclamationMark)? {
            CondKind::Not(Box::new(self.cond(flow)?))
        } else if self.eat(TokenKind::LSquareBracket)? {
            let lhs = Box::new(self.cond(flow)?);
            let is_and = if self.eat(TokenKind::RwAnd)? {
                true
            } else {
                self.expect(
                    TokenKind::RwOr,
                    DiagKind::UnexpectedConditionalType(self.current().text.clone()),
                )?;
                false
            };
            let rhs = Box::new(self.cond(flow)?);
            self.expect(
                TokenKind::RSquareBracket,
                DiagKind::MissingTokenAfterIn("]", "conditional", "if-statement"),
            )?;
            if is_and {
                CondKind::And(lhs, rhs)
            } else {
                CondKind::Or(lhs, rhs)
            }
        } else {
            return Err(self.diag(DiagKind::MissingFound("conditional", token.text.clone())));
        };
        Ok(Cond { token, kind })
    }

    fn can_parse_comp(&self) -> bool {
        self.at(TokenKind::LRoundBracket)
    }

    /// `<comp> ::= ( <fac> <comp-op> <fac> )`
    fn comp(&mut self, flow: &mut FlowCtx) -> Result<Comp, ParserError> {
        let token = self.current().clone();
        self.expect(
            TokenKind::LRoundBracket,
            DiagKind::MissingTokenAtStartOf("(", "comparison"),
        )?;
        let lhs = self.fac(flow)?;
        let op = self.comp_op()?;
        let rhs = self.fac(flow)?;
        self.expect(
            TokenKind::RRoundBracket,
            DiagKind::MissingTokenAtEndOf(")", "comparison"),
        )?;
        Ok(Comp {
            token,
            lhs,
            op,
            rhs,
        })
    }

    fn comp_op(&mut self) -> Result<CompOp, ParserError> {
        let op = match self.current().kind {
            TokenKind::CompNotEqual => CompOp::NotEqual,
            TokenKind::CompEqual => CompOp::Equal,
            TokenKind::CompGreaterThanEqual => CompOp::GreaterThanEqual,
            TokenKind::CompLessThanEqual => CompOp::LessThanEqual,
            TokenKind::CompGreaterThan => CompOp::GreaterThan,
            TokenKind::CompLessThan => CompOp::LessThan,
            _ => {
                return Err(self.diag(DiagKind::UnexpectedComparisonType(
                    self.current().text.clone(),
                )));
            }
        };
        self.advance()?;
        Ok(op)
    }

    /// `<exp> ::= <term> | <term> + <exp> | <term> - <exp>`
    fn exp(&mut self, flow: &mut FlowCtx) -> Result<Exp, ParserError> {
        let token = self.current().clone();
        let term = self.term(flow)?;
        let rest = if self.eat(TokenKind::Plus)? {
            Some((ExpOp::Plus, Box::new(self.exp(flow)?)))
        } else if self.eat(TokenKind::Minus)? {
            Some((ExpOp::Minus, Box::new(self.exp(flow)?)))
        } else {
            None
        };
        Ok(Exp { token, term, rest })
    }

    /// `<term> ::= <fac> | <fac> * <term>`
    fn term(&mut self, flow: &mut FlowCtx) -> Result<Term, ParserError> {
        let token = self.current().clone();
        let fac = self.fac(flow)?;
        let rest = if self.eat(TokenKind::Star)? {
            Some(Box::new(self.term(flow)?))
        } else {
            None
        };
        Ok(Term { token, fac, rest })
    }

    /// `<fac> ::= <integer> | <id> | ( <exp> )`
    fn fac(&mut self, flow: &mut FlowCtx) -> Result<Fac, ParserError> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Identifier => {
                let id = self.id()?;
                self.ctx.reference(&id)?;
                flow_check(flow, &id)?;
                FacKind::Identifier(id)
            }
            TokenKind::LRoundBracket => {
                self.advance()?;
                let exp = Box::new(self.exp(flow)?);
                self.expect(
                    TokenKind::RRoundBracket,
                    DiagKind::MissingTokenAtEndOfIn(")", "expression", "factor"),
                )?;
                FacKind::Parenthesized(exp)
            }
            TokenKind::Integer => {
                // The tokenizer caps lexemes at eight digits, which always
                // fit in an i32.
                let value = token.text.parse::<i32>().map_err(|_| {
                    ParserError::Syntax(Diag::at(
                        token.clone(),
                        DiagKind::IllegalInteger(token.text.clone()),
                    ))
                })?;
                self.advance()?;
                FacKind::Integer(value)
            }
            _ => {
                return Err(self.diag(DiagKind::UnexpectedFactorType(token.text.clone())));
            }
        };
        Ok(Fac { token, kind })
    }

    fn current(&self) -> &Token {
        self.tokenizer.current()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Result<(), ParserError> {
        self.tokenizer.next_token()?;
        Ok(())
    }

    /// Consume the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> Result<bool, ParserError> {
        if self.at(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token if it has the given kind, otherwise fail
    /// with `error`.
    fn expect(&mut self, kind: TokenKind, error: DiagKind) -> Result<(), ParserError> {
        if self.eat(kind)? {
            Ok(())
        } else {
            Err(self.diag(error))
        }
    }

    /// A syntax error pinned to the current token.
    fn diag(&self, kind: DiagKind) -> ParserError {
        ParserError::Syntax(Diag::at(self.current().clone(), kind))
    }
}

impl<R: BufRead> fmt::Debug for Parser<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("tokenizer", &self.tokenizer)
            .finish()
    }
}
