use super::token::Span;
use anyhow::Result;
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Broad category of a compile failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Syntax,
    DuplicateDeclaration,
    UnknownSymbol,
    EmitterUsage,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex => write!(f, "lex"),
            Self::Syntax => write!(f, "syntax"),
            Self::DuplicateDeclaration => write!(f, "duplicate-declaration"),
            Self::UnknownSymbol => write!(f, "unknown-symbol"),
            Self::EmitterUsage => write!(f, "emitter-usage"),
            Self::Io => write!(f, "io"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    EndOfInput(Span),
    UnterminatedString(Span),
    UnterminatedComment(Span),
    IllegalCharacter(Span, char),
    IntegerOutOfRange(Span, String),
    LeadingZero(Span, String),
    ExpectedFound {
        span: Span,
        expected: String,
        found: String,
    },
    DuplicateDeclaration {
        span: Span,
        name: String,
    },
    UnknownSymbol {
        span: Span,
        name: String,
    },
    EmitterUsage(String),
    Io(String),
}

impl Error {
    pub fn expected(span: Span, expected: impl Into<String>, found: impl std::fmt::Display) -> Self {
        Self::ExpectedFound {
            span,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EndOfInput(..)
            | Self::UnterminatedString(..)
            | Self::UnterminatedComment(..)
            | Self::IllegalCharacter(..)
            | Self::IntegerOutOfRange(..)
            | Self::LeadingZero(..) => ErrorKind::Lex,
            Self::ExpectedFound { .. } => ErrorKind::Syntax,
            Self::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            Self::UnknownSymbol { .. } => ErrorKind::UnknownSymbol,
            Self::EmitterUsage(..) => ErrorKind::EmitterUsage,
            Self::Io(..) => ErrorKind::Io,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::EndOfInput(span) => span,
            Self::UnterminatedString(span) => span,
            Self::UnterminatedComment(span) => span,
            Self::IllegalCharacter(span, _) => span,
            Self::IntegerOutOfRange(span, _) => span,
            Self::LeadingZero(span, _) => span,
            Self::ExpectedFound { span, .. } => span,
            Self::DuplicateDeclaration { span, .. } => span,
            Self::UnknownSymbol { span, .. } => span,
            Self::EmitterUsage(..) | Self::Io(..) => &(0..0),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::EndOfInput(_) => "unexpected end of input".to_string(),
            Self::UnterminatedString(_) => "unterminated string constant".to_string(),
            Self::UnterminatedComment(_) => "unterminated block comment".to_string(),
            Self::IllegalCharacter(_, c) => format!("illegal character {c:?}"),
            Self::IntegerOutOfRange(_, digits) => {
                format!("integer constant {digits} is out of range 0..=32767")
            }
            Self::LeadingZero(_, digits) => {
                format!("integer constant {digits} has a leading zero")
            }
            Self::ExpectedFound {
                expected, found, ..
            } => format!("expected {expected} found {found}"),
            Self::DuplicateDeclaration { name, .. } => {
                format!("'{name}' is already declared in this scope")
            }
            Self::UnknownSymbol { name, .. } => format!("'{name}' is not defined"),
            Self::EmitterUsage(msg) => format!("internal emitter misuse: {msg}"),
            Self::Io(msg) => format!("i/o failure: {msg}"),
        }
    }

    fn note(&self) -> Option<String> {
        match self {
            Self::UnknownSymbol { .. } => Some(
                "variables must be declared with `var`, `field`, `static` or as a parameter"
                    .to_string(),
            ),
            Self::UnterminatedString(_) => {
                Some("string constants may not span multiple lines".to_string())
            }
            Self::EmitterUsage(_) => Some("this is a bug in the compiler".to_string()),
            _ => None,
        }
    }

    pub fn report(&self, filename: &str, src: &str) -> Result<()> {
        // ariadne needs at least one character to anchor a label.
        let src = if src.is_empty() {
            " ".to_string()
        } else {
            src.to_string()
        };
        let span = self.span().clone();
        let mut report = Report::build(ReportKind::Error, (filename, span.clone()))
            .with_code(self.kind())
            .with_message(self.message())
            .with_label(
                Label::new((filename, span))
                    .with_message(self.message())
                    .with_color(Color::Red),
            );
        if let Some(note) = self.note() {
            report = report.with_note(note);
        }
        report.finish().eprint((filename, Source::from(src)))?;
        Ok(())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error at {:?}: {}", self.kind(), self.span(), self.message())
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
