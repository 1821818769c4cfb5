//! One-token lookahead over the lexer.
use crate::error::Error;
use crate::lexer::Lexer;
use crate::token::{Keyword, Span, Token, TokenKind};

type Result<T> = std::result::Result<T, Error>;

/// Tokens are lexed lazily: peeking or consuming pulls from the lexer only
/// when the lookahead slot is empty.
pub struct TokenStream<'src> {
    lexer: Lexer<'src>,
    peeked: Option<Token>,
    /// Byte length of the source, used to point at end of input.
    end: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(lexer: Lexer<'src>) -> Self {
        Self {
            end: lexer.source().len(),
            lexer,
            peeked: None,
        }
    }

    /// The next token without consuming it, or `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<&Token>> {
        if self.peeked.is_none() && self.lexer.has_next() {
            self.peeked = Some(self.lexer.advance()?);
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume the next token regardless of its kind.
    ///
    /// `expected` describes what the caller was looking for, for the error
    /// raised at end of input.
    pub fn next_token(&mut self, expected: &str) -> Result<Token> {
        self.peek()?;
        self.peeked
            .take()
            .ok_or_else(|| Error::expected(self.end..self.end, expected, "end of input"))
    }

    pub fn check_symbol(&mut self, symbol: char) -> Result<bool> {
        Ok(self.peek()?.is_some_and(|token| token.is_symbol(symbol)))
    }

    pub fn check_keyword(&mut self, keyword: Keyword) -> Result<bool> {
        Ok(self.peek()?.is_some_and(|token| token.is_keyword(keyword)))
    }

    /// Consumes the next token if it is `symbol`.
    pub fn match_symbol(&mut self, symbol: char) -> Result<bool> {
        let is_match = self.check_symbol(symbol)?;
        if is_match {
            self.peeked = None;
        }
        Ok(is_match)
    }

    /// Consumes the next token if it is `keyword`.
    pub fn match_keyword(&mut self, keyword: Keyword) -> Result<bool> {
        let is_match = self.check_keyword(keyword)?;
        if is_match {
            self.peeked = None;
        }
        Ok(is_match)
    }

    pub fn consume_symbol(&mut self, symbol: char) -> Result<Token> {
        let expected = format!("`{symbol}`");
        let token = self.next_token(&expected)?;
        if token.is_symbol(symbol) {
            Ok(token)
        } else {
            Err(unexpected(&token, expected))
        }
    }

    pub fn consume_keyword(&mut self, keyword: Keyword) -> Result<Token> {
        let expected = format!("`{keyword}`");
        let token = self.next_token(&expected)?;
        if token.is_keyword(keyword) {
            Ok(token)
        } else {
            Err(unexpected(&token, expected))
        }
    }

    pub fn consume_identifier(&mut self, expected: &str) -> Result<(String, Span)> {
        let token = self.next_token(expected)?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            _ => Err(unexpected(&token, expected)),
        }
    }

    /// Fails if any token remains.
    pub fn expect_end(&mut self) -> Result<()> {
        match self.peek()? {
            Some(token) => Err(unexpected(token, "end of input")),
            None => Ok(()),
        }
    }
}

/// Syntax error pointing at `token`.
pub fn unexpected(token: &Token, expected: impl Into<String>) -> Error {
    Error::expected(token.span.clone(), expected, format!("`{token}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn stream(src: &str) -> TokenStream<'_> {
        TokenStream::new(Lexer::new(src))
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut tokens = stream("let x");
        assert!(tokens.check_keyword(Keyword::Let).unwrap());
        assert!(tokens.check_keyword(Keyword::Let).unwrap());
        assert!(tokens.match_keyword(Keyword::Let).unwrap());
        assert!(!tokens.match_keyword(Keyword::Let).unwrap());
        assert_eq!(
            tokens.consume_identifier("variable name").unwrap(),
            ("x".to_string(), 4..5)
        );
        assert_eq!(tokens.peek(), Ok(None));
        tokens.expect_end().unwrap();
    }

    #[test]
    fn test_mismatch_names_expected_and_found() {
        let mut tokens = stream("let x = 1 }");
        tokens.consume_keyword(Keyword::Let).unwrap();
        let error = tokens.consume_symbol('=').unwrap_err();
        assert_eq!(
            error,
            Error::ExpectedFound {
                span: 4..5,
                expected: "`=`".to_string(),
                found: "`x`".to_string(),
            }
        );
    }

    #[test]
    fn test_end_of_input() {
        let mut tokens = stream("class Main");
        tokens.consume_keyword(Keyword::Class).unwrap();
        tokens.consume_identifier("class name").unwrap();
        let error = tokens.consume_symbol('{').unwrap_err();
        assert_eq!(error, Error::expected(10..10, "`{`", "end of input"));
        assert_eq!(error.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_lex_errors_pass_through() {
        let mut tokens = stream("let @");
        tokens.consume_keyword(Keyword::Let).unwrap();
        let error = tokens.peek().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Lex);
    }
}
