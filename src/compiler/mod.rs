//! Syntax-directed translation of one class into VM code.
//!
//! Every grammar rule has one `compile_*` method. Each method emits its code
//! as soon as its tokens are recognised, so no tree is built and expression
//! code comes out in post-order.
mod expression;
mod statement;

use crate::emitter::Emitter;
use crate::error::Error;
use crate::instruction::{Label, Segment};
use crate::lexer::Lexer;
use crate::symbol_table::{Symbol, SymbolKind, SymbolTable, VarType};
use crate::token::{Keyword, Span, Token, TokenKind};
use crate::token_stream::{unexpected, TokenStream};
use std::io::Write;

type Result<T> = std::result::Result<T, Error>;

/// Compile the source of one class and return its VM code.
pub fn compile(src: &str) -> Result<String> {
    let out = Compiler::new(src, Vec::new()).compile()?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Hands out branch labels, unique for the lifetime of one compiler run.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    counter: usize,
}

impl LabelGenerator {
    /// A group of labels sharing one fresh suffix, e.g. `WHILE_TOP_3` and `WHILE_END_3`.
    pub fn fresh<const N: usize>(&mut self, prefixes: [&str; N]) -> [Label; N] {
        let id = self.counter;
        self.counter += 1;
        prefixes.map(|prefix| Label::new(format!("{prefix}_{id}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

pub struct Compiler<'src, W: Write> {
    tokens: TokenStream<'src>,
    symbols: SymbolTable,
    emitter: Emitter<W>,
    labels: LabelGenerator,
    class_name: String,
    subroutine_kind: SubroutineKind,
    returns_void: bool,
}

impl<'src, W: Write> Compiler<'src, W> {
    pub fn new(src: &'src str, out: W) -> Self {
        Self {
            tokens: TokenStream::new(Lexer::new(src)),
            symbols: SymbolTable::default(),
            emitter: Emitter::new(out),
            labels: LabelGenerator::default(),
            class_name: String::new(),
            subroutine_kind: SubroutineKind::Function,
            returns_void: true,
        }
    }

    /// Compile the whole class and hand back the output sink.
    pub fn compile(mut self) -> Result<W> {
        self.compile_class()?;
        self.tokens.expect_end()?;
        self.emitter.into_inner()
    }

    fn compile_class(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::Class)?;
        let (name, _) = self.tokens.consume_identifier("class name")?;
        log::debug!("compiling class {name}");
        self.class_name = name;
        self.tokens.consume_symbol('{')?;

        while self.tokens.check_keyword(Keyword::Static)?
            || self.tokens.check_keyword(Keyword::Field)?
        {
            self.compile_class_var_dec()?;
        }

        while let Some(kind) = self.peek_subroutine_kind()? {
            self.compile_subroutine(kind)?;
        }

        self.tokens.consume_symbol('}')?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<()> {
        let kind = if self.tokens.match_keyword(Keyword::Static)? {
            SymbolKind::Static
        } else {
            self.tokens.consume_keyword(Keyword::Field)?;
            SymbolKind::Field
        };
        self.compile_var_names(kind)
    }

    fn compile_var_dec(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::Var)?;
        self.compile_var_names(SymbolKind::Local)
    }

    /// `type varName (',' varName)* ';'`, shared by field, static and local declarations.
    fn compile_var_names(&mut self, kind: SymbolKind) -> Result<()> {
        let ty = self.compile_type()?;
        loop {
            self.define_next(ty.clone(), kind)?;
            if !self.tokens.match_symbol(',')? {
                break;
            }
        }
        self.tokens.consume_symbol(';')?;
        Ok(())
    }

    fn compile_type(&mut self) -> Result<VarType> {
        let token = self.tokens.next_token("type")?;
        match token.kind {
            TokenKind::Keyword(Keyword::Int) => Ok(VarType::Int),
            TokenKind::Keyword(Keyword::Char) => Ok(VarType::Char),
            TokenKind::Keyword(Keyword::Boolean) => Ok(VarType::Boolean),
            TokenKind::Identifier(name) => Ok(VarType::Class(name)),
            _ => Err(unexpected(&token, "type")),
        }
    }

    fn define_next(&mut self, ty: VarType, kind: SymbolKind) -> Result<()> {
        let (name, span) = self.tokens.consume_identifier("variable name")?;
        self.symbols
            .define(&name, ty, kind)
            .map_err(|error| error.at(span))?;
        Ok(())
    }

    fn peek_subroutine_kind(&mut self) -> Result<Option<SubroutineKind>> {
        let kind = match self.tokens.peek()?.map(|token| &token.kind) {
            Some(TokenKind::Keyword(Keyword::Constructor)) => Some(SubroutineKind::Constructor),
            Some(TokenKind::Keyword(Keyword::Function)) => Some(SubroutineKind::Function),
            Some(TokenKind::Keyword(Keyword::Method)) => Some(SubroutineKind::Method),
            _ => None,
        };
        Ok(kind)
    }

    fn compile_subroutine(&mut self, kind: SubroutineKind) -> Result<()> {
        // Keyword already identified by `peek_subroutine_kind`.
        self.tokens.next_token("subroutine declaration")?;
        self.returns_void = self.tokens.match_keyword(Keyword::Void)?;
        if !self.returns_void {
            self.compile_type()?;
        }
        let (name, _) = self.tokens.consume_identifier("subroutine name")?;

        self.subroutine_kind = kind;
        self.symbols.start_subroutine();
        if kind == SubroutineKind::Method {
            let receiver = VarType::Class(self.class_name.clone());
            self.symbols
                .define("this", receiver, SymbolKind::Argument)
                .map_err(|error| error.at(0..0))?;
        }

        self.tokens.consume_symbol('(')?;
        self.compile_parameter_list()?;
        self.tokens.consume_symbol(')')?;
        self.compile_subroutine_body(&name)
    }

    fn compile_parameter_list(&mut self) -> Result<()> {
        if self.tokens.check_symbol(')')? {
            return Ok(());
        }
        loop {
            let ty = self.compile_type()?;
            self.define_next(ty, SymbolKind::Argument)?;
            if !self.tokens.match_symbol(',')? {
                return Ok(());
            }
        }
    }

    fn compile_subroutine_body(&mut self, name: &str) -> Result<()> {
        self.tokens.consume_symbol('{')?;
        while self.tokens.check_keyword(Keyword::Var)? {
            self.compile_var_dec()?;
        }

        let full_name = format!("{}.{name}", self.class_name);
        let n_locals = self.symbols.var_count(SymbolKind::Local);
        log::debug!("compiling {full_name} with {n_locals} locals");
        self.emitter.write_function(&full_name, n_locals)?;

        match self.subroutine_kind {
            SubroutineKind::Method => {
                self.emitter.write_push(Segment::Argument, 0)?;
                self.emitter.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.var_count(SymbolKind::Field);
                self.emitter.write_push(Segment::Constant, n_fields)?;
                self.emitter.write_call("Memory.alloc", 1)?;
                self.emitter.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        let ends_with_return = self.compile_statements()?;
        let close = self.tokens.consume_symbol('}')?;
        if !ends_with_return {
            self.write_implicit_return(&close)?;
        }
        Ok(())
    }

    /// Closes a body that falls off its end at `close`. A subroutine that
    /// returns a value must end with an explicit `return`.
    fn write_implicit_return(&mut self, close: &Token) -> Result<()> {
        if self.subroutine_kind == SubroutineKind::Constructor {
            self.emitter.write_push(Segment::Pointer, 0)?;
        } else if self.returns_void {
            self.emitter.write_push(Segment::Constant, 0)?;
        } else {
            return Err(unexpected(close, "`return`"));
        }
        self.emitter.write_return()
    }

    /// Resolve a variable use, failing on undeclared names.
    fn lookup_variable(&self, name: &str, span: Span) -> Result<Symbol> {
        let symbol = self
            .symbols
            .resolve(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSymbol {
                span: span.clone(),
                name: name.to_string(),
            })?;
        self.check_field_access(&symbol, span)?;
        Ok(symbol)
    }

    /// Fields live behind `this`, which a function does not have.
    fn check_field_access(&self, symbol: &Symbol, span: Span) -> Result<()> {
        if symbol.kind == SymbolKind::Field && self.subroutine_kind == SubroutineKind::Function {
            return Err(Error::expected(
                span,
                "a variable (fields are unavailable in a function)",
                format!("field `{}`", symbol.name),
            ));
        }
        Ok(())
    }
}
