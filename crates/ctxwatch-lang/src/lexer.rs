//! Lexer for the predicate language using logos.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types for the predicate language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Comparison operators
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // Logical operators, symbolic and spelled out
    #[token("&&")]
    #[token("and")]
    And,
    #[token("||")]
    #[token("or")]
    Or,
    #[token("!")]
    Bang,
    #[token("not")]
    Not,

    // Keyword operators
    #[token("in")]
    In,
    #[token("like")]
    Like,
    #[token("is")]
    Is,

    // Literals
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    String(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    // Punctuation
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

/// Unescape a string literal body.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            // LIKE escapes survive so the matcher sees them
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer producing spanned tokens with one token of lookahead.
///
/// Unrecognized input surfaces as a [`ParseError`] rather than being skipped.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<Result<SpannedToken, ParseError>>>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    ///
    /// Lexing errors are reported by [`Lexer::next_token`], never here.
    pub fn peek(&mut self) -> Option<&SpannedToken> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        match &self.peeked {
            Some(Some(Ok(tok))) => Some(tok),
            _ => None,
        }
    }

    /// Whether the next token is `token`.
    pub fn peek_is(&mut self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    /// Consume the next token.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken, ParseError>> {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.next_inner(),
        }
    }

    fn next_inner(&mut self) -> Option<Result<SpannedToken, ParseError>> {
        let token = self.inner.next()?;
        let span: Span = self.inner.span().into();
        Some(match token {
            Ok(token) => Ok(SpannedToken { token, span }),
            Err(()) => Err(ParseError::new(
                format!("unrecognized input `{}`", self.inner.slice()),
                span,
            )),
        })
    }
}

/// Tokenize a source string, stopping at the first lexing error.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token() {
        tokens.push(tok?);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            kinds(r#"status == "active""#),
            vec![
                Token::Ident("status".into()),
                Token::Eq,
                Token::String("active".into())
            ]
        );
    }

    #[test]
    fn test_operators_both_spellings() {
        let tokens = kinds("a && b and c || d or e");
        assert_eq!(tokens.iter().filter(|t| **t == Token::And).count(), 2);
        assert_eq!(tokens.iter().filter(|t| **t == Token::Or).count(), 2);
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(
            kinds("name not like 'A%'"),
            vec![
                Token::Ident("name".into()),
                Token::Not,
                Token::Like,
                Token::String("A%".into())
            ]
        );
        assert_eq!(kinds("index"), vec![Token::Ident("index".into())]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("123 -456 3.25 -2.5"),
            vec![
                Token::Int(123),
                Token::Int(-456),
                Token::Float(3.25),
                Token::Float(-2.5)
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""line\nbreak" 'it\'s' "50\%""#),
            vec![
                Token::String("line\nbreak".into()),
                Token::String("it's".into()),
                Token::String("50\\%".into()),
            ]
        );
    }

    #[test]
    fn test_unrecognized_input_is_error() {
        let err = tokenize("age > 18 # comment").unwrap_err();
        assert_eq!(err.span, Span::new(9, 10));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("a b");
        assert!(lexer.peek_is(&Token::Ident("a".into())));
        assert!(lexer.peek_is(&Token::Ident("a".into())));
        assert_eq!(
            lexer.next_token().unwrap().unwrap().token,
            Token::Ident("a".into())
        );
        assert_eq!(
            lexer.next_token().unwrap().unwrap().token,
            Token::Ident("b".into())
        );
        assert!(lexer.next_token().is_none());
    }
}
