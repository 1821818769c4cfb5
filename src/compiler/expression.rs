use super::{Compiler, Result, SubroutineKind};
use crate::error::Error;
use crate::instruction::{Command, Segment};
use crate::symbol_table::VarType;
use crate::token::{Keyword, Span, TokenKind, MAX_INT};
use crate::token_stream::unexpected;
use std::io::Write;

const BINARY_OPERATORS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];

impl<W: Write> Compiler<'_, W> {
    /// `term (op term)*`, evaluated strictly left to right.
    pub(super) fn compile_expression(&mut self) -> Result<()> {
        self.compile_term()?;
        while let Some(operator) = self.peek_binary_operator()? {
            self.tokens.next_token("operator")?;
            self.compile_term()?;
            self.write_binary_operator(operator)?;
        }
        Ok(())
    }

    fn peek_binary_operator(&mut self) -> Result<Option<char>> {
        let operator = match self.tokens.peek()?.map(|token| &token.kind) {
            Some(TokenKind::Symbol(c)) if BINARY_OPERATORS.contains(c) => Some(*c),
            _ => None,
        };
        Ok(operator)
    }

    fn write_binary_operator(&mut self, operator: char) -> Result<()> {
        let command = match operator {
            '+' => Command::Add,
            '-' => Command::Sub,
            '&' => Command::And,
            '|' => Command::Or,
            '<' => Command::Lt,
            '>' => Command::Gt,
            '=' => Command::Eq,
            '*' => return self.emitter.write_call("Math.multiply", 2),
            '/' => return self.emitter.write_call("Math.divide", 2),
            _ => {
                return Err(Error::EmitterUsage(format!(
                    "`{operator}` is not a binary operator"
                )))
            }
        };
        self.emitter.write_arithmetic(command)
    }

    fn compile_term(&mut self) -> Result<()> {
        let token = self.tokens.next_token("expression")?;
        match token.kind {
            TokenKind::IntConst(value) => self.emitter.write_push(Segment::Constant, value),
            TokenKind::StringConst(ref value) => self.compile_string(value, &token.span),
            TokenKind::Keyword(Keyword::True) => {
                self.emitter.write_push(Segment::Constant, 1)?;
                self.emitter.write_arithmetic(Command::Neg)
            }
            TokenKind::Keyword(Keyword::False | Keyword::Null) => {
                self.emitter.write_push(Segment::Constant, 0)
            }
            TokenKind::Keyword(Keyword::This) => {
                if self.subroutine_kind == SubroutineKind::Function {
                    return Err(unexpected(&token, "expression (`this` is unavailable in a function)"));
                }
                self.emitter.write_push(Segment::Pointer, 0)
            }
            TokenKind::Symbol('(') => {
                self.compile_expression()?;
                self.tokens.consume_symbol(')')?;
                Ok(())
            }
            TokenKind::Symbol('-') => {
                self.compile_term()?;
                self.emitter.write_arithmetic(Command::Neg)
            }
            TokenKind::Symbol('~') => {
                self.compile_term()?;
                self.emitter.write_arithmetic(Command::Not)
            }
            TokenKind::Identifier(name) => self.compile_identifier_term(name, token.span),
            _ => Err(unexpected(&token, "expression")),
        }
    }

    /// A term starting with an identifier: variable, array element or call.
    fn compile_identifier_term(&mut self, name: String, span: Span) -> Result<()> {
        if self.tokens.check_symbol('(')? || self.tokens.check_symbol('.')? {
            return self.compile_subroutine_call(name, span);
        }

        let variable = self.lookup_variable(&name, span)?;
        self.emitter.write_push(variable.segment(), variable.index)?;

        if self.tokens.match_symbol('[')? {
            self.compile_expression()?;
            self.tokens.consume_symbol(']')?;
            self.emitter.write_arithmetic(Command::Add)?;
            self.emitter.write_pop(Segment::Pointer, 1)?;
            self.emitter.write_push(Segment::That, 0)?;
        }
        Ok(())
    }

    /// Builds the string at runtime with `String.new` and `String.appendChar`.
    fn compile_string(&mut self, value: &str, span: &Span) -> Result<()> {
        let length = value.chars().count();
        let length = u16::try_from(length)
            .ok()
            .filter(|length| *length <= MAX_INT)
            .ok_or_else(|| Error::IntegerOutOfRange(span.clone(), length.to_string()))?;
        self.emitter.write_push(Segment::Constant, length)?;
        self.emitter.write_call("String.new", 1)?;

        for c in value.chars() {
            let code = u16::try_from(u32::from(c))
                .ok()
                .filter(|code| *code <= MAX_INT)
                .ok_or_else(|| Error::IllegalCharacter(span.clone(), c))?;
            self.emitter.write_push(Segment::Constant, code)?;
            self.emitter.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// `name(args)` or `target.name(args)`, where `first` has already been consumed.
    ///
    /// A variable target is called as a method with itself as receiver. Any
    /// other target names a class. An unqualified call is a method call on
    /// `this` unless the caller is itself a function.
    pub(super) fn compile_subroutine_call(&mut self, first: String, span: Span) -> Result<()> {
        let (callee, receivers) = if self.tokens.match_symbol('.')? {
            let (subroutine, _) = self.tokens.consume_identifier("subroutine name")?;
            match self.symbols.resolve(&first).cloned() {
                Some(variable) => {
                    self.check_field_access(&variable, span.clone())?;
                    let VarType::Class(class) = &variable.ty else {
                        return Err(Error::expected(
                            span,
                            "an object",
                            format!("`{first}` of type {}", variable.ty),
                        ));
                    };
                    self.emitter.write_push(variable.segment(), variable.index)?;
                    (format!("{class}.{subroutine}"), 1)
                }
                None => (format!("{first}.{subroutine}"), 0),
            }
        } else {
            let callee = format!("{}.{first}", self.class_name);
            if self.subroutine_kind == SubroutineKind::Function {
                (callee, 0)
            } else {
                self.emitter.write_push(Segment::Pointer, 0)?;
                (callee, 1)
            }
        };

        self.tokens.consume_symbol('(')?;
        let n_args = self.compile_expression_list()?;
        self.tokens.consume_symbol(')')?;
        self.emitter.write_call(&callee, receivers + n_args)
    }

    /// Comma-separated expressions up to `)`. Returns how many were compiled.
    fn compile_expression_list(&mut self) -> Result<u16> {
        if self.tokens.check_symbol(')')? {
            return Ok(0);
        }
        self.compile_expression()?;
        let mut count = 1;
        while self.tokens.match_symbol(',')? {
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }
}
