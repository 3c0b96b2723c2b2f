//! Recursive-descent parser for listing files.
//!
//! The grammar is exactly the artifact shape: an IIFE header, a run of
//! `implementors["crate"] = [...];` assignments, and the register-or-queue
//! epilogue. Record arrays are decoded by slicing their source span and
//! handing it to `serde_json`; brackets inside string literals are already
//! opaque at the token level, so bracket matching is a plain depth count.

use crate::lexer::Token;
use crate::{ParseError, ParseErrorKind, Span};
use logos::Logos;
use traitdex_core::{Implementor, ImplementorMap};

/// Result of parsing a listing file.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed mapping. Present even when errors were recovered from.
    pub map: ImplementorMap,
    /// Parse errors encountered.
    pub errors: Vec<ParseError>,
}

/// Parse a listing file's source text.
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    Parser::new(source).run()
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
    map: ImplementorMap,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        for (result, range) in Token::lexer(source).spanned() {
            let span = Span::from_range(range);
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => errors.push(ParseError::new(ParseErrorKind::UnexpectedChar, span)),
            }
        }
        Self {
            source,
            tokens,
            pos: 0,
            map: ImplementorMap::new(),
            errors,
        }
    }

    fn run(mut self) -> ParseResult {
        if let Err(err) = self.parse_header() {
            self.errors
                .push(err.with_context("in listing header"));
            self.recover_to_assignment();
        }

        while self.at_assignment() {
            if let Err(err) = self.parse_assignment() {
                self.errors.push(err);
                self.recover_past_semi();
            }
        }

        if let Err(err) = self.parse_epilogue() {
            let span = err.span;
            self.errors.push(
                ParseError::new(ParseErrorKind::MissingEpilogue, span)
                    .with_context(err.message())
                    .with_hint("regenerate the listing; the tail must be the register-or-queue conditional"),
            );
        } else if self.pos < self.tokens.len() {
            let span = self.tokens[self.pos].1;
            self.errors
                .push(ParseError::new(ParseErrorKind::TrailingContent, span));
        }

        ParseResult {
            map: self.map,
            errors: self.errors,
        }
    }

    // === token helpers ===

    fn peek(&self) -> Option<&(Token<'src>, Span)> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&(Token<'src>, Span)> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<(Token<'src>, Span)> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source.len(), self.source.len())
    }

    fn expect(&mut self, want: Token<'src>) -> Result<Span, ParseError> {
        match self.advance() {
            Some((token, span)) if token == want => Ok(span),
            Some((token, span)) => Err(ParseError::new(
                ParseErrorKind::Expected(format!("{} but found {}", want.describe(), token.describe())),
                span,
            )),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.eof_span())),
        }
    }

    fn expect_ident(&mut self, name: &str) -> Result<Span, ParseError> {
        match self.advance() {
            Some((Token::Ident(found), span)) if found == name => Ok(span),
            Some((token, span)) => Err(ParseError::new(
                ParseErrorKind::Expected(format!("'{name}' but found {}", token.describe())),
                span,
            )),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.eof_span())),
        }
    }

    fn expect_str(&mut self) -> Result<(&'src str, Span), ParseError> {
        match self.advance() {
            Some((Token::Str(raw), span)) => Ok((raw, span)),
            Some((token, span)) => Err(ParseError::new(
                ParseErrorKind::Expected(format!("string but found {}", token.describe())),
                span,
            )),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.eof_span())),
        }
    }

    // === grammar ===

    fn parse_header(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LParen)
            .map_err(|e| e.into_missing_header())?;
        self.expect(Token::Function)
            .map_err(ParseError::into_missing_header)?;
        self.expect(Token::LParen)?;
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;
        self.expect(Token::Var)?;
        self.expect_ident("implementors")?;
        self.expect(Token::Eq)?;
        self.expect(Token::LBrace)?;
        self.expect(Token::RBrace)?;
        self.expect(Token::Semi)?;
        Ok(())
    }

    fn at_assignment(&self) -> bool {
        matches!(self.peek(), Some((Token::Ident("implementors"), _)))
            && matches!(self.peek_at(1), Some((Token::LBracket, _)))
    }

    fn parse_assignment(&mut self) -> Result<(), ParseError> {
        self.expect_ident("implementors")?;
        self.expect(Token::LBracket)?;
        let (raw_key, key_span) = self.expect_str()?;
        let crate_name = decode_string(raw_key, key_span)?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Eq)?;
        let records = self.parse_record_array(&crate_name)?;
        self.expect(Token::Semi)?;

        // The statement is fully consumed at this point, so a duplicate key
        // is reported inline rather than through the recovery path.
        if self.map.contains(&crate_name) {
            self.errors.push(
                ParseError::new(ParseErrorKind::DuplicateCrate(crate_name), key_span)
                    .with_hint("the first assignment is kept"),
            );
        } else {
            self.map.insert(crate_name, records);
        }
        Ok(())
    }

    /// Slice the balanced `[...]` expression and decode it with `serde_json`.
    fn parse_record_array(&mut self, crate_name: &str) -> Result<Vec<Implementor>, ParseError> {
        let start = self.expect(Token::LBracket)?;
        let mut depth = 1usize;
        let mut end = start;
        while depth > 0 {
            match self.advance() {
                Some((Token::LBracket, _)) => depth += 1,
                Some((Token::RBracket, span)) => {
                    depth -= 1;
                    end = span;
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.eof_span())
                        .with_context(format!("in records for crate '{crate_name}'")));
                }
            }
        }
        let span = start.merge(&end);
        let slice = span.text(self.source);
        serde_json::from_str(slice).map_err(|e| {
            ParseError::new(ParseErrorKind::InvalidRecords(e.to_string()), span)
                .with_context(format!("in records for crate '{crate_name}'"))
        })
    }

    fn parse_epilogue(&mut self) -> Result<(), ParseError> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        self.expect_ident("window")?;
        self.expect(Token::Dot)?;
        self.expect_ident("register_implementors")?;
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;
        self.expect_ident("window")?;
        self.expect(Token::Dot)?;
        self.expect_ident("register_implementors")?;
        self.expect(Token::LParen)?;
        self.expect_ident("implementors")?;
        self.expect(Token::RParen)?;
        self.expect(Token::Semi)?;
        self.expect(Token::RBrace)?;
        self.expect(Token::Else)?;
        self.expect(Token::LBrace)?;
        self.expect_ident("window")?;
        self.expect(Token::Dot)?;
        self.expect_ident("pending_implementors")?;
        self.expect(Token::Eq)?;
        self.expect_ident("implementors")?;
        self.expect(Token::Semi)?;
        self.expect(Token::RBrace)?;
        self.expect(Token::RBrace)?;
        self.expect(Token::RParen)?;
        self.expect(Token::LParen)?;
        self.expect(Token::RParen)?;
        // A trailing semicolon after the IIFE call is tolerated.
        if matches!(self.peek(), Some((Token::Semi, _))) {
            self.advance();
        }
        Ok(())
    }

    // === recovery ===

    fn recover_to_assignment(&mut self) {
        while self.pos < self.tokens.len() && !self.at_assignment() {
            self.pos += 1;
        }
    }

    fn recover_past_semi(&mut self) {
        while let Some((token, _)) = self.advance() {
            if token == Token::Semi {
                break;
            }
        }
    }
}

impl ParseError {
    fn into_missing_header(self) -> Self {
        Self::new(ParseErrorKind::MissingHeader, self.span)
    }
}

/// Decode a JavaScript string literal (including its quotes).
fn decode_string(raw: &str, span: Span) -> Result<String, ParseError> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next().ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidString("dangling escape".to_string()),
                span,
            )
        })?;
        let replacement = match escaped {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'u' => {
                let digits: String = chars.by_ref().take(4).collect();
                if digits.len() != 4 {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidString(format!("truncated \\u escape '{digits}'")),
                        span,
                    ));
                }
                let code = u32::from_str_radix(&digits, 16).map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidString(format!("invalid \\u escape '{digits}'")),
                        span,
                    )
                })?;
                char::from_u32(code).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidString(format!("invalid code point \\u{digits}")),
                        span,
                    )
                })?
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidString(format!("unknown escape '\\{other}'")),
                    span,
                ));
            }
        };
        out.push(replacement);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            "(function() {{var implementors = {{}};\n{body}\
             if (window.register_implementors) {{window.register_implementors(implementors);}} \
             else {{window.pending_implementors = implementors;}}}})()"
        )
    }

    #[test]
    fn parse_empty_listing() {
        let result = parse(&wrap(""));
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.map.is_empty());
    }

    #[test]
    fn parse_single_assignment() {
        let body = r#"implementors["acme_db"] = [{"text":"impl Group for Storage","synthetic":false,"types":["acme_db::Storage"]}];
"#;
        let result = parse(&wrap(body));
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let records = result.map.get("acme_db").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "impl Group for Storage");
        assert!(!records[0].synthetic);
        assert_eq!(records[0].types[0].as_str(), "acme_db::Storage");
    }

    #[test]
    fn parse_multiple_crates() {
        let body = r#"implementors["beta"] = [{"text":"b","synthetic":false,"types":["beta::B"]}];
implementors["alpha"] = [{"text":"a","synthetic":true,"types":["alpha::A"]}];
"#;
        let result = parse(&wrap(body));
        assert!(result.errors.is_empty());
        assert_eq!(result.map.len(), 2);
        // Map iteration is sorted regardless of file order.
        let keys: Vec<_> = result.map.crate_names().collect();
        assert_eq!(keys, vec!["alpha", "beta"]);
    }

    #[test]
    fn duplicate_crate_keeps_first() {
        let body = r#"implementors["a"] = [{"text":"one","synthetic":false,"types":["a::One"]}];
implementors["a"] = [{"text":"two","synthetic":false,"types":["a::Two"]}];
"#;
        let result = parse(&wrap(body));
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0].kind,
            ParseErrorKind::DuplicateCrate(ref name) if name == "a"
        ));
        assert_eq!(result.map.get("a").unwrap()[0].text, "one");
    }

    #[test]
    fn malformed_records_recovers() {
        let body = r#"implementors["bad"] = [{"text":42}];
implementors["good"] = [{"text":"ok","synthetic":false,"types":["good::G"]}];
"#;
        let result = parse(&wrap(body));
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0].kind,
            ParseErrorKind::InvalidRecords(_)
        ));
        assert!(result.map.get("bad").is_none());
        assert!(result.map.get("good").is_some());
    }

    #[test]
    fn missing_epilogue_reported_but_data_kept() {
        let source = r#"(function() {var implementors = {};
implementors["a"] = [{"text":"x","synthetic":false,"types":["a::X"]}];
"#;
        let result = parse(source);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::MissingEpilogue)));
        assert!(result.map.get("a").is_some());
    }

    #[test]
    fn missing_header_reported() {
        let result = parse("implementors[\"a\"] = [];");
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::MissingHeader)));
    }

    #[test]
    fn trailing_content_reported() {
        let source = format!("{} var extra = 1;", wrap(""));
        let result = parse(&source);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::TrailingContent)));
    }

    #[test]
    fn trailing_semicolon_tolerated() {
        let source = format!("{};", wrap(""));
        let result = parse(&source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn nested_brackets_in_records() {
        let body = r#"implementors["a"] = [{"text":"x","synthetic":false,"types":["a::X","a::Y"]}];
"#;
        let result = parse(&wrap(body));
        assert!(result.errors.is_empty());
        assert_eq!(result.map.get("a").unwrap()[0].types.len(), 2);
    }

    #[test]
    fn decode_string_escapes() {
        let span = Span::new(0, 0);
        assert_eq!(decode_string(r#""a\"b""#, span).unwrap(), "a\"b");
        assert_eq!(decode_string(r#""a\\b""#, span).unwrap(), "a\\b");
        assert_eq!(decode_string(r#""aA""#, span).unwrap(), "aA");
        assert!(decode_string(r#""a\q""#, span).is_err());
    }

    #[test]
    fn html_heavy_record_text_survives() {
        let body = r#"implementors["acme_db"] = [{"text":"impl&lt;DB&gt; Group&lt;DB&gt; for <a class=\"struct\" href=\"acme_db/struct.Storage.html\" title=\"struct acme_db::Storage\">Storage</a>","synthetic":false,"types":["acme_db::Storage"]}];
"#;
        let result = parse(&wrap(body));
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let text = &result.map.get("acme_db").unwrap()[0].text;
        assert!(text.contains("<a class=\"struct\""));
        assert!(text.contains("impl&lt;DB&gt;"));
    }
}
