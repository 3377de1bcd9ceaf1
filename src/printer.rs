//! Pretty-printer for parsed programs.
//!
//! The output is canonical: two spaces of indentation per nesting level, one
//! sequence element per line, single spaces around binary operators and
//! inside brackets.  Re-parsing the printed text yields a structurally equal
//! tree, and printing canonical text reproduces it byte for byte.

use crate::ast::{
    Comp, CompOp, Cond, CondKind, Decl, DeclSeq, Exp, ExpOp, Fac, FacKind, IdList, Prog, Stmt,
    StmtKind, StmtSeq, Term,
};

/// Render the program as canonical CORE text.
pub fn print(prog: &Prog) -> String {
    let mut printer = Printer { out: String::new() };
    printer.prog(prog, 0);
    printer.out
}

struct Printer {
    out: String,
}

impl Printer {
    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
    }

    fn prog(&mut self, prog: &Prog, level: usize) {
        self.indent(level);
        self.out.push_str("program \n");
        self.decl_seq(&prog.decls, level + 1);
        self.indent(level + 1);
        self.out.push_str("begin\n");
        self.stmt_seq(&prog.stmts, level + 2);
        self.indent(level + 1);
        self.out.push_str("end\n");
    }

    fn decl_seq(&mut self, seq: &DeclSeq, level: usize) {
        let mut seq = Some(seq);
        while let Some(s) = seq {
            self.decl(&s.decl, level);
            seq = s.rest.as_deref();
        }
    }

    fn decl(&mut self, decl: &Decl, level: usize) {
        self.indent(level);
        self.out.push_str("int ");
        self.id_list(&decl.ids);
        self.out.push_str(";\n");
    }

    fn id_list(&mut self, ids: &IdList) {
        self.out.push_str(&ids.id.name);
        let mut rest = ids.rest.as_deref();
        while let Some(l) = rest {
            self.out.push_str(", ");
            self.out.push_str(&l.id.name);
            rest = l.rest.as_deref();
        }
    }

    fn stmt_seq(&mut self, seq: &StmtSeq, level: usize) {
        let mut seq = Some(seq);
        while let Some(s) = seq {
            self.stmt(&s.stmt, level);
            seq = s.rest.as_deref();
        }
    }

    fn stmt(&mut self, stmt: &Stmt, level: usize) {
        match &stmt.kind {
            StmtKind::Assign(assign) => {
                self.indent(level);
                self.out.push_str(&assign.id.name);
                self.out.push_str(" = ");
                self.exp(&assign.exp);
                self.out.push_str(";\n");
            }
            StmtKind::If(if_stmt) => {
                self.indent(level);
                self.out.push_str("if ");
                self.cond(&if_stmt.cond);
                self.out.push_str(" then\n");
                self.stmt_seq(&if_stmt.then_seq, level + 1);
                if let Some(else_seq) = &if_stmt.else_seq {
                    self.indent(level);
                    self.out.push_str("else\n");
                    self.stmt_seq(else_seq, level + 1);
                }
                self.indent(level);
                self.out.push_str("end;\n");
            }
            StmtKind::Loop(loop_stmt) => {
                self.indent(level);
                self.out.push_str("while ");
                self.cond(&loop_stmt.cond);
                self.out.push_str(" loop\n");
                self.stmt_seq(&loop_stmt.body, level + 1);
                self.indent(level);
                self.out.push_str("end;\n");
            }
            StmtKind::In(in_stmt) => {
                self.indent(level);
                self.out.push_str("read ");
                self.id_list(&in_stmt.ids);
                self.out.push_str(";\n");
            }
            StmtKind::Out(out_stmt) => {
                self.indent(level);
                self.out.push_str("write ");
                self.id_list(&out_stmt.ids);
                self.out.push_str(";\n");
            }
        }
    }

    fn cond(&mut self, cond: &Cond) {
        match &cond.kind {
            CondKind::Comparison(comp) => self.comp(comp),
            CondKind::Not(inner) => {
                self.out.push('!');
                self.cond(inner);
            }
            CondKind::And(lhs, rhs) => self.binary_cond(lhs, "and", rhs),
            CondKind::Or(lhs, rhs) => self.binary_cond(lhs, "or", rhs),
        }
    }

    fn binary_cond(&mut self, lhs: &Cond, word: &str, rhs: &Cond) {
        self.out.push_str("[ ");
        self.cond(lhs);
        self.out.push(' ');
        self.out.push_str(word);
        self.out.push(' ');
        self.cond(rhs);
        self.out.push_str(" ]");
    }

    fn comp(&mut self, comp: &Comp) {
        self.out.push_str("( ");
        self.fac(&comp.lhs);
        self.out.push(' ');
        self.out.push_str(match comp.op {
            CompOp::NotEqual => "!=",
            CompOp::Equal => "==",
            CompOp::GreaterThanEqual => ">=",
            CompOp::LessThanEqual => "<=",
            CompOp::GreaterThan => ">",
            CompOp::LessThan => "<",
        });
        self.out.push(' ');
        self.fac(&comp.rhs);
        self.out.push_str(" )");
    }

    fn exp(&mut self, exp: &Exp) {
        self.term(&exp.term);
        if let Some((op, rhs)) = &exp.rest {
            self.out.push_str(match op {
                ExpOp::Plus => " + ",
                ExpOp::Minus => " - ",
            });
            self.exp(rhs);
        }
    }

    fn term(&mut self, term: &Term) {
        self.fac(&term.fac);
        if let Some(rhs) = &term.rest {
            self.out.push_str(" * ");
            self.term(rhs);
        }
    }

    fn fac(&mut self, fac: &Fac) {
        match &fac.kind {
            FacKind::Integer(n) => self.out.push_str(&n.to_string()),
            FacKind::Identifier(id) => self.out.push_str(&id.name),
            FacKind::Parenthesized(exp) => {
                self.out.push_str("( ");
                self.exp(exp);
                self.out.push_str(" )");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Context;
    use crate::parser::Parser;

    fn parse(source: &str) -> Prog {
        let mut ctx = Context::new();
        let mut parser = Parser::new(source.as_bytes(), &mut ctx);
        parser.parse().expect("parse error")
    }

    #[test]
    fn canonical_text_round_trips_byte_for_byte() {
        let canonical = "program \n  int X, Y;\n  begin\n    X = 13;\n    \
                         while ( X > 10 ) loop\n      write X;\n      read X;\n    \
                         end;\n  end\n";
        assert_eq!(print(&parse(canonical)), canonical);
    }

    #[test]
    fn messy_layout_prints_canonically() {
        let printed = print(&parse("program int X,Y;begin read X,Y;X=X*2;write X,Y;end"));
        assert_eq!(
            printed,
            "program \n  int X, Y;\n  begin\n    read X, Y;\n    X = X * 2;\n    \
             write X, Y;\n  end\n"
        );
    }

    #[test]
    fn printing_is_reparse_stable() {
        let source = "program int X, Y; begin read X; \
                      if [ ( X > 1 ) and ! ( X < 100 ) ] then Y = ( X + 1 ) * 2; \
                      else Y = 0 - X; end; write Y; end";
        let first = parse(source);
        let text = print(&first);
        let second = parse(&text);
        assert_eq!(first, second);
        assert_eq!(print(&second), text);
    }

    #[test]
    fn if_else_layout() {
        let printed = print(&parse(
            "program int X; begin read X; \
             if ( X == 0 ) then write X; else X = X - 1; end; end",
        ));
        assert_eq!(
            printed,
            "program \n  int X;\n  begin\n    read X;\n    if ( X == 0 ) then\n      \
             write X;\n    else\n      X = X - 1;\n    end;\n  end\n"
        );
    }

    #[test]
    fn conditions_keep_their_bracket_padding() {
        let printed = print(&parse(
            "program int X; begin read X; \
             if [ ( X >= 1 ) or ! [ ( X != 2 ) and ( X <= 3 ) ] ] then write X; end; end",
        ));
        assert!(printed.contains("if [ ( X >= 1 ) or ![ ( X != 2 ) and ( X <= 3 ) ] ] then"));
    }

    #[test]
    fn nested_loops_indent_one_level_each() {
        let printed = print(&parse(
            "program int X; begin X = 2; while ( X > 0 ) loop \
             while ( X > 1 ) loop X = X - 1; end; X = X - 1; end; end",
        ));
        assert_eq!(
            printed,
            "program \n  int X;\n  begin\n    X = 2;\n    while ( X > 0 ) loop\n      \
             while ( X > 1 ) loop\n        X = X - 1;\n      end;\n      X = X - 1;\n    \
             end;\n  end\n"
        );
    }
}
