use crate::error::Error;
use crate::instruction::{Command, Instruction, Label, Segment};
use std::io::Write;

type Result<T> = std::result::Result<T, Error>;

/// Writes VM instructions to a sink, one line per call, in call order.
#[derive(Debug)]
pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<()> {
        self.emit(Instruction::Push(segment, index))
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<()> {
        if segment == Segment::Constant {
            return Err(Error::EmitterUsage(format!(
                "cannot pop into constant {index}"
            )));
        }
        self.emit(Instruction::Pop(segment, index))
    }

    pub fn write_arithmetic(&mut self, command: Command) -> Result<()> {
        self.emit(Instruction::Arithmetic(command))
    }

    pub fn write_label(&mut self, label: &Label) -> Result<()> {
        self.emit(Instruction::Label(label.clone()))
    }

    pub fn write_goto(&mut self, label: &Label) -> Result<()> {
        self.emit(Instruction::Goto(label.clone()))
    }

    pub fn write_if(&mut self, label: &Label) -> Result<()> {
        self.emit(Instruction::IfGoto(label.clone()))
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<()> {
        self.emit(Instruction::Call(name.to_string(), n_args))
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<()> {
        self.emit(Instruction::Function(name.to_string(), n_locals))
    }

    pub fn write_return(&mut self) -> Result<()> {
        self.emit(Instruction::Return)
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, instruction: Instruction) -> Result<()> {
        log::trace!("emit {instruction}");
        writeln!(self.out, "{instruction}")?;
        Ok(())
    }
}
