//! Symbol tables
//!
//! Maps identifiers to their variable records. The program and every
//! subprogram own one table each; tables are never shared between nodes.

use std::collections::HashMap;
use crate::errors::SourceSpan;
use crate::parser::ScalarType;

/// A variable record
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The scalar type, `None` while unresolved
    pub ty: Option<ScalarType>,
    /// `false` when the type comes from an explicit declaration
    pub inferred: bool,
    /// Where the variable was declared or first assigned
    pub span: SourceSpan,
}

impl Variable {
    /// A variable whose type was given by a declaration
    pub fn declared(ty: ScalarType, span: SourceSpan) -> Self {
        Self {
            ty: Some(ty),
            inferred: false,
            span,
        }
    }

    /// A variable whose type (if any) comes from inference
    pub fn inferred(ty: Option<ScalarType>, span: SourceSpan) -> Self {
        Self {
            ty,
            inferred: true,
            span,
        }
    }

    /// Whether the type is fixed by a declaration
    pub fn is_declared(&self) -> bool {
        !self.inferred && self.ty.is_some()
    }
}

/// An insertion-ordered symbol table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: Vec<(String, Variable)>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace a variable, keeping its original position
    pub fn define(&mut self, name: impl Into<String>, var: Variable) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = var,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, var));
            }
        }
    }

    /// Record an inferred type for `name`.
    ///
    /// Declared variables are left untouched, a known type is never replaced
    /// by an unresolved one, and unknown names are added.
    pub fn infer(&mut self, name: &str, ty: Option<ScalarType>, span: SourceSpan) {
        match self.get_mut(name) {
            Some(var) if var.is_declared() => {}
            Some(var) => {
                if ty.is_some() {
                    var.ty = ty;
                }
            }
            None => self.define(name, Variable::inferred(ty, span)),
        }
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The known type of `name`, if any
    pub fn type_of(&self, name: &str) -> Option<ScalarType> {
        self.get(name).and_then(|v| v.ty)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.entries.iter().map(|(name, var)| (name, var))
    }

    /// Rename an entry in place. Returns `false` when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        let Some(i) = self.index.remove(from) else {
            return false;
        };
        self.entries[i].0 = to.to_string();
        self.index.insert(to.to_string(), i);
        true
    }
}
