pub type Span = std::ops::Range<usize>;

pub const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

/// Largest value an integer constant may hold.
pub const MAX_INT: u16 = 32767;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        matches!(self.kind, TokenKind::Symbol(c) if c == symbol)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == keyword)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(char),
    IntConst(u16),
    StringConst(String),
    Identifier(String),
}

impl TokenKind {
    /// Name of the classification, as used by the token dump.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Keyword(_) => "keyword",
            Self::Symbol(_) => "symbol",
            Self::IntConst(_) => "integerConstant",
            Self::StringConst(_) => "stringConstant",
            Self::Identifier(_) => "identifier",
        }
    }

    /// The token text without string delimiters.
    pub fn text(&self) -> String {
        match self {
            Self::StringConst(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Source form of the token, quotes included for strings.
impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "{k}"),
            Self::Symbol(c) => write!(f, "{c}"),
            Self::IntConst(n) => write!(f, "{n}"),
            Self::StringConst(s) => write!(f, "\"{s}\""),
            Self::Identifier(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = match s {
            "class" => Self::Class,
            "constructor" => Self::Constructor,
            "function" => Self::Function,
            "method" => Self::Method,
            "field" => Self::Field,
            "static" => Self::Static,
            "var" => Self::Var,
            "int" => Self::Int,
            "char" => Self::Char,
            "boolean" => Self::Boolean,
            "void" => Self::Void,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "this" => Self::This,
            "let" => Self::Let,
            "do" => Self::Do,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "return" => Self::Return,
            _ => return Err(()),
        };
        Ok(keyword)
    }
}
