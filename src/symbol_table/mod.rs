#[cfg(test)]
mod test;

use crate::error::Error;
use crate::instruction::Segment;
use crate::token::Span;
use std::collections::HashMap;

/// Two-level symbol table.
///
/// Statics and fields live in the class scope for the whole class. Arguments
/// and locals live in the subroutine scope, which is cleared by
/// [`SymbolTable::start_subroutine`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    counts: Counts,
}

impl SymbolTable {
    /// Drop every argument and local, keeping statics and fields.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.counts.argument = 0;
        self.counts.local = 0;
    }

    /// Insert `name` into the scope selected by `kind`, with the next index of that kind.
    pub fn define(
        &mut self,
        name: &str,
        ty: VarType,
        kind: SymbolKind,
    ) -> Result<&Symbol, SymbolError> {
        let scope = match kind {
            SymbolKind::Static | SymbolKind::Field => &mut self.class_scope,
            SymbolKind::Argument | SymbolKind::Local => &mut self.subroutine_scope,
        };
        if scope.contains_key(name) {
            return Err(SymbolError::Duplicate(name.to_string()));
        }

        let counter = self.counts.get_mut(kind);
        let symbol = Symbol {
            name: name.to_string(),
            ty,
            kind,
            index: *counter,
        };
        *counter += 1;

        Ok(scope.entry(name.to_string()).or_insert(symbol))
    }

    /// Look up a symbol by name, checking the subroutine scope first.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Result<SymbolKind, SymbolError> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    pub fn type_of(&self, name: &str) -> Result<&VarType, SymbolError> {
        self.lookup(name).map(|symbol| &symbol.ty)
    }

    pub fn index_of(&self, name: &str) -> Result<u16, SymbolError> {
        self.lookup(name).map(|symbol| symbol.index)
    }

    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        self.counts.get(kind)
    }

    fn lookup(&self, name: &str) -> Result<&Symbol, SymbolError> {
        self.resolve(name)
            .ok_or_else(|| SymbolError::Unknown(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Counts {
    r#static: u16,
    field: u16,
    argument: u16,
    local: u16,
}

impl Counts {
    fn get(&self, kind: SymbolKind) -> u16 {
        match kind {
            SymbolKind::Static => self.r#static,
            SymbolKind::Field => self.field,
            SymbolKind::Argument => self.argument,
            SymbolKind::Local => self.local,
        }
    }

    fn get_mut(&mut self, kind: SymbolKind) -> &mut u16 {
        match kind {
            SymbolKind::Static => &mut self.r#static,
            SymbolKind::Field => &mut self.field,
            SymbolKind::Argument => &mut self.argument,
            SymbolKind::Local => &mut self.local,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: VarType,
    pub kind: SymbolKind,
    /// Position among the symbols of the same kind.
    pub index: u16,
}

impl Symbol {
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    /// VM segment holding variables of this kind.
    pub fn segment(&self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local => Segment::Local,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Field => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarType {
    Int,
    Char,
    Boolean,
    Class(String),
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Char => write!(f, "char"),
            Self::Boolean => write!(f, "boolean"),
            Self::Class(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    Duplicate(String),
    Unknown(String),
}

impl SymbolError {
    /// Attach the source location of the offending identifier.
    pub fn at(self, span: Span) -> Error {
        match self {
            Self::Duplicate(name) => Error::DuplicateDeclaration { span, name },
            Self::Unknown(name) => Error::UnknownSymbol { span, name },
        }
    }
}

impl std::fmt::Display for SymbolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "'{name}' is already declared in this scope"),
            Self::Unknown(name) => write!(f, "'{name}' is not defined"),
        }
    }
}

impl std::error::Error for SymbolError {}
