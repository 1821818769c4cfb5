use super::{Compiler, Result, SubroutineKind};
use crate::instruction::{Command, Segment};
use crate::token::{Keyword, TokenKind};
use crate::token_stream::unexpected;
use std::io::Write;

impl<W: Write> Compiler<'_, W> {
    /// Compile statements up to the closing `}`.
    ///
    /// Returns whether the last statement was a `return`.
    pub(super) fn compile_statements(&mut self) -> Result<bool> {
        let mut ends_with_return = false;
        loop {
            let keyword = match self.tokens.peek()?.map(|token| &token.kind) {
                Some(TokenKind::Keyword(keyword)) => *keyword,
                _ => return Ok(ends_with_return),
            };
            match keyword {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => return Ok(ends_with_return),
            }
            ends_with_return = keyword == Keyword::Return;
        }
    }

    fn compile_let(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::Let)?;
        let (name, span) = self.tokens.consume_identifier("variable name")?;
        let target = self.lookup_variable(&name, span)?;

        if self.tokens.match_symbol('[')? {
            self.emitter.write_push(target.segment(), target.index)?;
            self.compile_expression()?;
            self.tokens.consume_symbol(']')?;
            self.emitter.write_arithmetic(Command::Add)?;

            self.tokens.consume_symbol('=')?;
            self.compile_expression()?;
            self.tokens.consume_symbol(';')?;

            // `pointer 1` is set only once the value is computed, since the
            // value may index an array itself.
            self.emitter.write_pop(Segment::Temp, 0)?;
            self.emitter.write_pop(Segment::Pointer, 1)?;
            self.emitter.write_push(Segment::Temp, 0)?;
            self.emitter.write_pop(Segment::That, 0)?;
        } else {
            self.tokens.consume_symbol('=')?;
            self.compile_expression()?;
            self.tokens.consume_symbol(';')?;
            self.emitter.write_pop(target.segment(), target.index)?;
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::If)?;
        let [if_false, if_end] = self.labels.fresh(["IF_FALSE", "IF_END"]);

        self.compile_condition()?;
        self.emitter.write_if(&if_false)?;
        self.compile_block()?;

        if self.tokens.match_keyword(Keyword::Else)? {
            self.emitter.write_goto(&if_end)?;
            self.emitter.write_label(&if_false)?;
            self.compile_block()?;
            self.emitter.write_label(&if_end)?;
        } else {
            self.emitter.write_label(&if_false)?;
        }
        Ok(())
    }

    fn compile_while(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::While)?;
        let [top, end] = self.labels.fresh(["WHILE_TOP", "WHILE_END"]);

        self.emitter.write_label(&top)?;
        self.compile_condition()?;
        self.emitter.write_if(&end)?;
        self.compile_block()?;
        self.emitter.write_goto(&top)?;
        self.emitter.write_label(&end)?;
        Ok(())
    }

    /// `'(' expression ')'`, leaving the negated test on the stack.
    fn compile_condition(&mut self) -> Result<()> {
        self.tokens.consume_symbol('(')?;
        self.compile_expression()?;
        self.tokens.consume_symbol(')')?;
        self.emitter.write_arithmetic(Command::Not)
    }

    fn compile_block(&mut self) -> Result<()> {
        self.tokens.consume_symbol('{')?;
        self.compile_statements()?;
        self.tokens.consume_symbol('}')?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::Do)?;
        let (name, span) = self.tokens.consume_identifier("subroutine name")?;
        self.compile_subroutine_call(name, span)?;
        self.tokens.consume_symbol(';')?;
        // Discard the returned value.
        self.emitter.write_pop(Segment::Temp, 0)
    }

    fn compile_return(&mut self) -> Result<()> {
        self.tokens.consume_keyword(Keyword::Return)?;
        let bare = self.tokens.check_symbol(';')?;

        match self.subroutine_kind {
            SubroutineKind::Constructor => {
                if !bare {
                    let token = self.tokens.next_token("`this`")?;
                    if !token.is_keyword(Keyword::This) {
                        return Err(unexpected(&token, "`this`"));
                    }
                }
                self.emitter.write_push(Segment::Pointer, 0)?;
            }
            _ if self.returns_void => {
                if !bare {
                    let token = self.tokens.next_token("`;`")?;
                    return Err(unexpected(&token, "`;` after return in a void subroutine"));
                }
                self.emitter.write_push(Segment::Constant, 0)?;
            }
            _ => {
                if bare {
                    let token = self.tokens.next_token("return value")?;
                    return Err(unexpected(&token, "return value"));
                }
                self.compile_expression()?;
            }
        }

        self.tokens.consume_symbol(';')?;
        self.emitter.write_return()
    }
}
