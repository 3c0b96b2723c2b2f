//! DFA-based lexer for the listing file's JavaScript skeleton.
//!
//! The artifact is machine-generated, so the token set is tiny: the IIFE
//! punctuation, a handful of keywords, string literals, and JSON literals.
//! Record arrays are tokenized like everything else; the parser slices
//! their source span back out and hands it to `serde_json`.

use logos::Logos;

/// Token types produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\u{FEFF}]+")]
pub enum Token<'src> {
    /// The `function` keyword.
    #[token("function")]
    Function,
    /// The `var` keyword.
    #[token("var")]
    Var,
    /// The `if` keyword.
    #[token("if")]
    If,
    /// The `else` keyword.
    #[token("else")]
    Else,
    /// The `true` literal.
    #[token("true")]
    True,
    /// The `false` literal.
    #[token("false")]
    False,
    /// The `null` literal.
    #[token("null")]
    Null,

    /// An identifier (`implementors`, `window`, ...).
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident(&'src str),

    /// A double-quoted string literal. The slice includes the quotes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    Str(&'src str),

    /// A JSON number literal.
    #[regex(r"-?\d+(\.\d+)?([eE][+-]?\d+)?")]
    Number(&'src str),

    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `;`
    #[token(";")]
    Semi,
    /// `:`
    #[token(":")]
    Colon,
    /// `,`
    #[token(",")]
    Comma,
    /// `=`
    #[token("=")]
    Eq,
    /// `.`
    #[token(".")]
    Dot,
}

impl Token<'_> {
    /// Human-readable description for diagnostics.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Function => "'function'",
            Self::Var => "'var'",
            Self::If => "'if'",
            Self::Else => "'else'",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Null => "'null'",
            Self::Ident(_) => "identifier",
            Self::Str(_) => "string",
            Self::Number(_) => "number",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Semi => "';'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Eq => "'='",
            Self::Dot => "'.'",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        Token::lexer(source).map(|t| t.expect("lex error")).collect()
    }

    #[test]
    fn lex_header() {
        assert_eq!(
            lex("(function() {var implementors = {};"),
            vec![
                Token::LParen,
                Token::Function,
                Token::LParen,
                Token::RParen,
                Token::LBrace,
                Token::Var,
                Token::Ident("implementors"),
                Token::Eq,
                Token::LBrace,
                Token::RBrace,
                Token::Semi,
            ]
        );
    }

    #[test]
    fn lex_assignment() {
        let tokens = lex(r#"implementors["acme_db"] = [];"#);
        assert_eq!(
            tokens,
            vec![
                Token::Ident("implementors"),
                Token::LBracket,
                Token::Str("\"acme_db\""),
                Token::RBracket,
                Token::Eq,
                Token::LBracket,
                Token::RBracket,
                Token::Semi,
            ]
        );
    }

    #[test]
    fn lex_string_with_escapes() {
        let tokens = lex(r#""a \"quoted\" value""#);
        assert_eq!(tokens, vec![Token::Str(r#""a \"quoted\" value""#)]);
    }

    #[test]
    fn lex_json_literals() {
        let tokens = lex("true false null 42 -1.5e3");
        assert_eq!(
            tokens,
            vec![
                Token::True,
                Token::False,
                Token::Null,
                Token::Number("42"),
                Token::Number("-1.5e3"),
            ]
        );
    }

    #[test]
    fn brackets_inside_strings_are_invisible() {
        let tokens = lex(r#""[not a bracket]""#);
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Token::Str(_)));
    }

    #[test]
    fn lex_error_on_stray_char() {
        let mut lexer = Token::lexer("@");
        assert_eq!(lexer.next(), Some(Err(())));
    }
}
