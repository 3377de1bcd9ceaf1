//! The global symbol table shared by the parser and the executor.

use std::collections::HashMap;
use std::io::prelude::*;

use crate::ast::{Id, IdList};
use crate::diag::{Diag, DiagKind};
use crate::eval::RuntimeError;

/// A symbol cell: the current value plus whether it was ever initialized.
/// The cell's existence means the identifier is declared.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct IdSym {
    pub value: i32,
    pub initialized: bool,
}

/// Maps declared identifiers to their cells.
///
/// The parser populates the table through `declare` and flips `initialized`
/// flags; the executor reads and writes values.  The set of declared names is
/// frozen once parsing finishes, and `initialized` never reverts to false.
#[derive(Debug, Default)]
pub struct Context {
    symbols: HashMap<String, IdSym>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Create a cell for every identifier in the list.
    pub fn declare(&mut self, ids: &IdList) -> Result<(), Diag> {
        let mut list = Some(ids);
        while let Some(l) = list {
            if self.has(&l.id.name) {
                return Err(Diag::at(
                    l.id.token.clone(),
                    DiagKind::IdentifierRedeclaration(l.id.name.clone()),
                ));
            }
            self.symbols.insert(l.id.name.clone(), IdSym::default());
            list = l.rest.as_deref();
        }
        Ok(())
    }

    /// Mark a declared identifier as initialized.  Called for every write to
    /// the identifier's value.
    pub fn initialize(&mut self, id: &Id) -> Result<(), Diag> {
        self.fetch_mut(id)?.initialized = true;
        Ok(())
    }

    pub fn initialize_list(&mut self, ids: &IdList) -> Result<(), Diag> {
        let mut list = Some(ids);
        while let Some(l) = list {
            self.initialize(&l.id)?;
            list = l.rest.as_deref();
        }
        Ok(())
    }

    /// Check a use site: the identifier must be declared and must have been
    /// initialized somewhere before this point.
    pub fn reference(&self, id: &Id) -> Result<(), Diag> {
        if !self.fetch(id)?.initialized {
            return Err(Diag::at(
                id.token.clone(),
                DiagKind::Uninitialized(id.name.clone()),
            ));
        }
        Ok(())
    }

    pub fn reference_list(&self, ids: &IdList) -> Result<(), Diag> {
        let mut list = Some(ids);
        while let Some(l) = list {
            self.reference(&l.id)?;
            list = l.rest.as_deref();
        }
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// The current value of an initialized identifier.
    pub fn get(&self, id: &Id) -> Result<i32, Diag> {
        let sym = self.fetch(id)?;
        if !sym.initialized {
            return Err(Diag::at(
                id.token.clone(),
                DiagKind::Uninitialized(id.name.clone()),
            ));
        }
        Ok(sym.value)
    }

    /// Store a value, marking the identifier initialized.
    pub fn set(&mut self, id: &Id, value: i32) -> Result<(), Diag> {
        let sym = self.fetch_mut(id)?;
        sym.value = value;
        sym.initialized = true;
        Ok(())
    }

    /// Prompt for and read one integer per identifier in the list.
    pub fn read_into<R: BufRead, W: Write>(
        &mut self,
        ids: &IdList,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), RuntimeError> {
        let mut list = Some(ids);
        while let Some(l) = list {
            write!(output, "{} =? ", l.id.name)?;
            output.flush()?;
            let value = read_integer(input)?;
            self.set(&l.id, value)?;
            list = l.rest.as_deref();
        }
        Ok(())
    }

    /// Write `name = value` for every identifier in the list.
    pub fn write_from<W: Write>(&self, ids: &IdList, output: &mut W) -> Result<(), RuntimeError> {
        let mut list = Some(ids);
        while let Some(l) = list {
            let value = self.get(&l.id)?;
            writeln!(output, "{} = {}", l.id.name, value)?;
            list = l.rest.as_deref();
        }
        Ok(())
    }

    fn fetch(&self, id: &Id) -> Result<&IdSym, Diag> {
        self.symbols.get(&id.name).ok_or_else(|| {
            Diag::at(
                id.token.clone(),
                DiagKind::UndeclaredIdentifier(id.name.clone()),
            )
        })
    }

    fn fetch_mut(&mut self, id: &Id) -> Result<&mut IdSym, Diag> {
        self.symbols.get_mut(&id.name).ok_or_else(|| {
            Diag::at(
                id.token.clone(),
                DiagKind::UndeclaredIdentifier(id.name.clone()),
            )
        })
    }
}

/// Read one whitespace-delimited token and parse it as an `i32`.
fn read_integer<R: BufRead>(input: &mut R) -> Result<i32, RuntimeError> {
    let mut text = String::new();
    loop {
        let available = input.fill_buf()?;
        if available.is_empty() {
            break;
        }
        let mut used = 0;
        let mut complete = false;
        for &b in available {
            used += 1;
            if b.is_ascii_whitespace() {
                if text.is_empty() {
                    continue;
                }
                complete = true;
                break;
            }
            text.push(b as char);
        }
        input.consume(used);
        if complete {
            break;
        }
    }
    text.parse::<i32>()
        .map_err(|_| RuntimeError::Diag(Diag::new(DiagKind::InvalidIntegerInput)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::SourceLoc;
    use crate::token::{Token, TokenKind};

    fn id(name: &str) -> Id {
        Id {
            name: name.to_string(),
            token: Token::new(TokenKind::Identifier, name, SourceLoc::new(1, 1)),
        }
    }

    fn id_list(names: &[&str]) -> IdList {
        let (first, rest) = names.split_first().expect("at least one name");
        IdList {
            token: Token::new(TokenKind::Identifier, *first, SourceLoc::new(1, 1)),
            id: id(first),
            rest: if rest.is_empty() {
                None
            } else {
                Some(Box::new(id_list(rest)))
            },
        }
    }

    #[test]
    fn declare_creates_uninitialized_cells() -> Result<(), Diag> {
        let mut ctx = Context::new();
        ctx.declare(&id_list(&["X", "Y"]))?;
        assert!(ctx.has("X"));
        assert!(ctx.has("Y"));
        assert!(!ctx.has("Z"));
        assert!(ctx.reference(&id("X")).is_err());
        Ok(())
    }

    #[test]
    fn redeclaration_is_rejected() {
        let mut ctx = Context::new();
        ctx.declare(&id_list(&["X"])).expect("first declaration");
        match ctx.declare(&id_list(&["X"])) {
            Err(d) => assert_eq!(d.kind, DiagKind::IdentifierRedeclaration("X".to_string())),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn redeclaration_within_one_list_is_rejected() {
        let mut ctx = Context::new();
        match ctx.declare(&id_list(&["X", "X"])) {
            Err(d) => assert_eq!(d.kind, DiagKind::IdentifierRedeclaration("X".to_string())),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn initialize_requires_declaration() {
        let mut ctx = Context::new();
        match ctx.initialize(&id("X")) {
            Err(d) => assert_eq!(d.kind, DiagKind::UndeclaredIdentifier("X".to_string())),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn set_then_get() -> Result<(), Diag> {
        let mut ctx = Context::new();
        ctx.declare(&id_list(&["X"]))?;
        ctx.set(&id("X"), 42)?;
        assert_eq!(ctx.get(&id("X"))?, 42);
        assert!(ctx.reference(&id("X")).is_ok());
        Ok(())
    }

    #[test]
    fn get_before_initialization_is_rejected() {
        let mut ctx = Context::new();
        ctx.declare(&id_list(&["X"])).expect("declaration");
        match ctx.get(&id("X")) {
            Err(d) => assert_eq!(d.kind, DiagKind::Uninitialized("X".to_string())),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn read_into_prompts_and_stores() -> Result<(), RuntimeError> {
        let mut ctx = Context::new();
        let ids = id_list(&["X", "Y"]);
        ctx.declare(&ids).expect("declaration");

        let mut input = "13 -7\n".as_bytes();
        let mut output: Vec<u8> = Vec::new();
        ctx.read_into(&ids, &mut input, &mut output)?;

        assert_eq!(String::from_utf8(output).unwrap(), "X =? Y =? ");
        assert_eq!(ctx.get(&id("X")).unwrap(), 13);
        assert_eq!(ctx.get(&id("Y")).unwrap(), -7);
        Ok(())
    }

    #[test]
    fn read_into_rejects_non_integer_input() {
        let mut ctx = Context::new();
        let ids = id_list(&["X"]);
        ctx.declare(&ids).expect("declaration");

        let mut input = "fourteen".as_bytes();
        let mut output: Vec<u8> = Vec::new();
        match ctx.read_into(&ids, &mut input, &mut output) {
            Err(RuntimeError::Diag(d)) => assert_eq!(d.kind, DiagKind::InvalidIntegerInput),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn read_into_rejects_empty_input() {
        let mut ctx = Context::new();
        let ids = id_list(&["X"]);
        ctx.declare(&ids).expect("declaration");

        let mut input = "".as_bytes();
        let mut output: Vec<u8> = Vec::new();
        assert!(ctx.read_into(&ids, &mut input, &mut output).is_err());
    }

    #[test]
    fn write_from_prints_one_line_per_identifier() -> Result<(), RuntimeError> {
        let mut ctx = Context::new();
        let ids = id_list(&["X", "Y"]);
        ctx.declare(&ids).expect("declaration");
        ctx.set(&id("X"), 1).expect("set");
        ctx.set(&id("Y"), -2).expect("set");

        let mut output: Vec<u8> = Vec::new();
        ctx.write_from(&ids, &mut output)?;
        assert_eq!(String::from_utf8(output).unwrap(), "X = 1\nY = -2\n");
        Ok(())
    }
}
