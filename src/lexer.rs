//! Lexical analysis.
//!
//! Tokens are produced lazily, one per call to [`Lexer::advance`]. Whitespace
//! and comments are skipped before each token.
use crate::error::Error;
use crate::token::{Keyword, Span, Token, TokenKind, MAX_INT, SYMBOLS};

pub struct Lexer<'src> {
    src: &'src str,
    /// Byte offset of the next unread character.
    pos: usize,
    token_start: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            token_start: 0,
        }
    }

    pub fn source(&self) -> &'src str {
        self.src
    }

    /// True while another token (or a lexical error) remains.
    pub fn has_next(&mut self) -> bool {
        self.skip_trivia().is_err() || !self.at_end()
    }

    /// Produce the next token.
    ///
    /// Any error is fatal: the cursor is moved to the end of the input so
    /// the lexer yields nothing afterwards.
    pub fn advance(&mut self) -> Result<Token, Error> {
        let result = self.next_token();
        if result.is_err() {
            self.pos = self.src.len();
        }
        result
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_trivia()?;
        self.token_start = self.pos;

        let Some(c) = self.next_char() else {
            return Err(Error::EndOfInput(self.pos..self.pos));
        };

        match c {
            '"' => self.consume_string(),
            '0'..='9' => self.consume_number(),
            '_' | 'a'..='z' | 'A'..='Z' => Ok(self.consume_ident()),
            c if SYMBOLS.contains(&c) => Ok(self.make_token(TokenKind::Symbol(c))),
            c => Err(Error::IllegalCharacter(self.span(), c)),
        }
    }

    /// Skip whitespace and comments.
    ///
    /// An unterminated block comment leaves the cursor on its opening `/*`.
    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.pos += len;
            } else if rest.starts_with("/*") {
                let Some(end) = rest[2..].find("*/") else {
                    return Err(Error::UnterminatedComment(self.pos..self.src.len()));
                };
                self.pos += end + 4;
            } else if let Some(c) = self.peek_char().filter(|c| c.is_whitespace()) {
                self.pos += c.len_utf8();
            } else {
                return Ok(());
            }
        }
    }

    fn consume_string(&mut self) -> Result<Token, Error> {
        let content_start = self.pos;
        loop {
            match self.next_char() {
                Some('"') => break,
                Some('\n') | Some('\r') | None => {
                    return Err(Error::UnterminatedString(self.token_start..self.pos));
                }
                Some(_) => {}
            }
        }
        let content = self.src[content_start..self.pos - 1].to_string();
        Ok(self.make_token(TokenKind::StringConst(content)))
    }

    fn consume_number(&mut self) -> Result<Token, Error> {
        while let Some('0'..='9') = self.peek_char() {
            self.pos += 1;
        }

        let digits = self.fragment();
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(Error::LeadingZero(self.span(), digits.to_string()));
        }
        match digits.parse::<u16>() {
            Ok(value) if value <= MAX_INT => Ok(self.make_token(TokenKind::IntConst(value))),
            _ => Err(Error::IntegerOutOfRange(self.span(), digits.to_string())),
        }
    }

    fn consume_ident(&mut self) -> Token {
        while let Some('_' | 'a'..='z' | 'A'..='Z' | '0'..='9') = self.peek_char() {
            self.pos += 1;
        }

        let fragment = self.fragment();
        let kind = fragment
            .parse::<Keyword>()
            .map(TokenKind::Keyword)
            .unwrap_or_else(|_| TokenKind::Identifier(fragment.to_string()));
        self.make_token(kind)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span())
    }

    fn span(&self) -> Span {
        self.token_start..self.pos
    }

    fn fragment(&self) -> &'src str {
        &self.src[self.token_start..self.pos]
    }

    fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }
}

/// Lexes lazily; stops after the first error.
impl Iterator for Lexer<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.advance())
        } else {
            None
        }
    }
}

/// Tokenize a whole source string, failing on the first lexical error.
pub fn tokenize(src: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(src).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(
            kinds("a(b)"),
            vec![
                ident("a"),
                TokenKind::Symbol('('),
                ident("b"),
                TokenKind::Symbol(')'),
            ]
        );
        assert_eq!(
            kinds("x[i]=-12;"),
            vec![
                ident("x"),
                TokenKind::Symbol('['),
                ident("i"),
                TokenKind::Symbol(']'),
                TokenKind::Symbol('='),
                TokenKind::Symbol('-'),
                TokenKind::IntConst(12),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("class classy _x1 while"),
            vec![
                TokenKind::Keyword(Keyword::Class),
                ident("classy"),
                ident("_x1"),
                TokenKind::Keyword(Keyword::While),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = r#"
/** doc comment
 * spanning lines */
let x = 1; // trailing
/* block */do/**/Output.print();
"#;
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::Keyword(Keyword::Let),
                ident("x"),
                TokenKind::Symbol('='),
                TokenKind::IntConst(1),
                TokenKind::Symbol(';'),
                TokenKind::Keyword(Keyword::Do),
                ident("Output"),
                TokenKind::Symbol('.'),
                ident("print"),
                TokenKind::Symbol('('),
                TokenKind::Symbol(')'),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn test_string_constant() {
        let tokens = tokenize(r#"let s = "hello // not a comment";"#).unwrap();
        assert_eq!(
            tokens[3],
            Token::new(
                TokenKind::StringConst("hello // not a comment".to_string()),
                8..32
            )
        );
    }

    #[test]
    fn test_number_followed_by_letters() {
        assert_eq!(kinds("12ab"), vec![TokenKind::IntConst(12), ident("ab")]);
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(kinds("0 32767"), vec![TokenKind::IntConst(0), TokenKind::IntConst(32767)]);
        let error = tokenize("32768").unwrap_err();
        assert_eq!(error, Error::IntegerOutOfRange(0..5, "32768".to_string()));
        let error = tokenize("65535").unwrap_err();
        assert_eq!(error, Error::IntegerOutOfRange(0..5, "65535".to_string()));
        let error = tokenize("x = 99999999999;").unwrap_err();
        assert_eq!(
            error,
            Error::IntegerOutOfRange(4..15, "99999999999".to_string())
        );
    }

    #[test]
    fn test_leading_zero() {
        let error = tokenize("let x = 007;").unwrap_err();
        assert_eq!(error, Error::LeadingZero(8..11, "007".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let error = tokenize("\"abc\ndef\"").unwrap_err();
        assert_eq!(error, Error::UnterminatedString(0..5));
        let error = tokenize("\"abc").unwrap_err();
        assert_eq!(error, Error::UnterminatedString(0..4));
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new("let /* never closed");
        assert_eq!(lexer.advance().unwrap().kind, TokenKind::Keyword(Keyword::Let));
        assert!(lexer.has_next());
        assert_eq!(lexer.advance(), Err(Error::UnterminatedComment(4..19)));
        assert!(!lexer.has_next());
    }

    #[test]
    fn test_illegal_character() {
        let error = tokenize("let x = 1 # 2;").unwrap_err();
        assert_eq!(error, Error::IllegalCharacter(10..11, '#'));
    }

    #[test]
    fn test_advance_past_end() {
        let mut lexer = Lexer::new("  // only a comment\n");
        assert!(!lexer.has_next());
        assert_eq!(lexer.advance(), Err(Error::EndOfInput(20..20)));
    }

    #[test]
    fn test_iteration_stops_after_error() {
        let results = Lexer::new("a $ b").collect::<Vec<_>>();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_retokenizing_joined_tokens() {
        let src = r#"class Main{function void main(){var Array a;let a[0]=Math.max(3,"x y");return;}}"#;
        let first = tokenize(src).unwrap();
        let joined = first
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let second = tokenize(&joined).unwrap();
        assert_eq!(
            first.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            second.into_iter().map(|t| t.kind).collect::<Vec<_>>()
        );
    }
}
