use std::collections::HashMap;

use crate::error::{CompileError, Result};
use crate::lexer::Position;

use super::Ty;

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
    pub initialized: bool,
    pub pos: Position,
}

/// Stack of scopes, innermost last. The global scope is never popped.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "attempted to pop the global scope");
        self.scopes.pop();
    }

    pub fn declare(&mut self, name: &str, ty: Ty, pos: Position) -> Result<()> {
        let scope = self
            .scopes
            .last_mut()
            .expect("symbol table always has a global scope");
        if scope.contains_key(name) {
            return Err(CompileError::semantic(
                format!("variable '{}' is already declared in this scope", name),
                Some(pos),
            ));
        }

        scope.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                initialized: false,
                pos,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    pub fn get_var_type(&self, name: &str) -> Option<Ty> {
        self.lookup(name).map(|s| s.ty)
    }

    pub fn mark_initialized(&mut self, name: &str) {
        if let Some(symbol) = self.lookup_mut(name) {
            symbol.initialized = true;
        }
    }

    /// Symbols of the outermost scope, ordered by declaration position.
    pub fn global_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<_> = self.scopes[0].values().collect();
        symbols.sort_by_key(|s| (s.pos.line, s.pos.column));
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.declare("x", Ty::Integer, pos()).unwrap();
        let err = table.declare("x", Ty::Real, Position::new(2, 9)).unwrap_err();
        assert_eq!(err.message(), "variable 'x' is already declared in this scope");
        assert_eq!(err.position(), (2, 9));
    }

    #[test]
    fn nested_scope_may_shadow() {
        let mut table = SymbolTable::new();
        table.declare("x", Ty::Integer, pos()).unwrap();
        table.push_scope();
        table.declare("x", Ty::Text, pos()).unwrap();
        assert_eq!(table.get_var_type("x"), Some(Ty::Text));
        table.pop_scope();
        assert_eq!(table.get_var_type("x"), Some(Ty::Integer));
    }

    #[test]
    fn outer_names_are_visible_and_mutable_from_inner_scopes() {
        let mut table = SymbolTable::new();
        table.declare("x", Ty::Integer, pos()).unwrap();
        table.push_scope();
        table.mark_initialized("x");
        assert_eq!(table.depth(), 2);
        table.pop_scope();
        assert!(table.lookup("x").unwrap().initialized);
        assert!(table.lookup("y").is_none());
    }

    #[test]
    #[should_panic(expected = "global scope")]
    fn global_scope_cannot_be_popped() {
        SymbolTable::new().pop_scope();
    }
}
