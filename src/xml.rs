//! Token dump in the XML layout of the classic Jack analyzer.
use crate::error::Error;
use crate::lexer::Lexer;
use crate::token::Token;
use std::io::Write;

type Result<T> = std::result::Result<T, Error>;

/// Write every token of `src` as one element under a `<tokens>` root.
pub fn write_tokens<W: Write>(src: &str, mut out: W) -> Result<W> {
    writeln!(out, "<tokens>")?;
    for token in Lexer::new(src) {
        write_token(&mut out, &token?)?;
    }
    writeln!(out, "</tokens>")?;
    out.flush()?;
    Ok(out)
}

/// The dump as a string.
pub fn tokens_to_xml(src: &str) -> Result<String> {
    let out = write_tokens(src, Vec::new())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_token<W: Write>(out: &mut W, token: &Token) -> Result<()> {
    let class = token.kind.class();
    writeln!(out, "<{class}> {} </{class}>", escape(&token.kind.text()))?;
    Ok(())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_dump() {
        let src = r#"if (x < 10) { do Output.printString("a&b"); }"#;
        insta::assert_snapshot!(tokens_to_xml(src).unwrap(), @r"
<tokens>
<keyword> if </keyword>
<symbol> ( </symbol>
<identifier> x </identifier>
<symbol> &lt; </symbol>
<integerConstant> 10 </integerConstant>
<symbol> ) </symbol>
<symbol> { </symbol>
<keyword> do </keyword>
<identifier> Output </identifier>
<symbol> . </symbol>
<identifier> printString </identifier>
<symbol> ( </symbol>
<stringConstant> a&amp;b </stringConstant>
<symbol> ) </symbol>
<symbol> ; </symbol>
<symbol> } </symbol>
</tokens>
");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(
            tokens_to_xml("// nothing here\n").unwrap(),
            "<tokens>\n</tokens>\n"
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a> & "b""#), "&lt;a&gt; &amp; &quot;b&quot;");
    }

    #[test]
    fn test_lex_error_aborts_dump() {
        let error = tokens_to_xml("let x = \"open").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Lex);
    }
}
