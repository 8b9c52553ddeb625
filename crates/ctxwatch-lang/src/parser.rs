//! Recursive descent parser for the predicate language.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Parser for predicate text.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse a complete predicate, rejecting trailing input.
    pub fn parse_predicate(&mut self) -> Result<Condition, ParseError> {
        if self.source.trim().is_empty() {
            return Err(ParseError::new("empty predicate", Span::new(0, self.source.len()))
                .with_hint("use `true` to match every object"));
        }

        let condition = self.parse_or_condition()?;

        if let Some(tok) = self.lexer.next_token() {
            let tok = tok?;
            let mut err = ParseError::new(
                format!("unexpected {:?} after end of predicate", tok.token),
                tok.span,
            );
            if matches!(tok.token, Token::Ident(_)) {
                err = err.with_hint("join conditions with `&&` or `||`");
            }
            return Err(err);
        }

        Ok(condition)
    }

    /// Parse OR conditions.
    fn parse_or_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_and_condition()?;

        while self.lexer.peek_is(&Token::Or) {
            self.next_token()?;

            let right = self.parse_and_condition()?;
            left = match left {
                Condition::Or(mut conditions) => {
                    conditions.push(right);
                    Condition::Or(conditions)
                }
                _ => Condition::Or(vec![left, right]),
            };
        }

        Ok(left)
    }

    /// Parse AND conditions.
    fn parse_and_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_unary_condition()?;

        while self.lexer.peek_is(&Token::And) {
            self.next_token()?;

            let right = self.parse_unary_condition()?;
            left = match left {
                Condition::And(mut conditions) => {
                    conditions.push(right);
                    Condition::And(conditions)
                }
                _ => Condition::And(vec![left, right]),
            };
        }

        Ok(left)
    }

    /// Parse `!cond` / `not cond`, or fall through to a primary condition.
    fn parse_unary_condition(&mut self) -> Result<Condition, ParseError> {
        if self.lexer.peek_is(&Token::Bang) || self.lexer.peek_is(&Token::Not) {
            self.next_token()?;
            let inner = self.parse_unary_condition()?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        self.parse_primary_condition()
    }

    /// Parse a parenthesized group, a boolean constant, or a field test.
    fn parse_primary_condition(&mut self) -> Result<Condition, ParseError> {
        let tok = self.next_token()?;

        match tok.token {
            Token::LParen => {
                let inner = self.parse_or_condition()?;
                self.expect_token(Token::RParen)?;
                Ok(inner)
            }
            Token::True => Ok(Condition::Const(Spanned::new(true, tok.span))),
            Token::False => Ok(Condition::Const(Spanned::new(false, tok.span))),
            Token::Ident(name) => self.parse_field_condition(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected field name or '(', found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Parse the operator part of a field test.
    fn parse_field_condition(&mut self, field: Spanned<String>) -> Result<Condition, ParseError> {
        let op_tok = match self.lexer.next_token() {
            Some(tok) => tok?,
            None => {
                return Err(ParseError::new(
                    "unexpected end of input, expected operator",
                    field.span,
                ))
            }
        };

        match op_tok.token {
            Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge => {
                let op = match op_tok.token {
                    Token::Eq => ComparisonOp::Eq,
                    Token::Ne => ComparisonOp::Ne,
                    Token::Lt => ComparisonOp::Lt,
                    Token::Le => ComparisonOp::Le,
                    Token::Gt => ComparisonOp::Gt,
                    _ => ComparisonOp::Ge,
                };
                let value = self.parse_literal()?;
                Ok(Condition::Comparison { field, op, value })
            }

            Token::Is => {
                let negated = self.lexer.peek_is(&Token::Not);
                if negated {
                    self.next_token()?;
                }

                let null_tok = self.next_token()?;
                if null_tok.token != Token::Null {
                    return Err(ParseError::new(
                        format!("expected 'null' after 'is', found {:?}", null_tok.token),
                        null_tok.span,
                    ));
                }

                Ok(Condition::IsNull { field, negated })
            }

            Token::In => {
                let values = self.parse_array_literal()?;
                Ok(Condition::In {
                    field,
                    values,
                    negated: false,
                })
            }

            Token::Like => {
                let pattern = self.parse_string_literal()?;
                Ok(Condition::Like {
                    field,
                    pattern,
                    negated: false,
                })
            }

            Token::Not => {
                let next = self.next_token()?;
                match next.token {
                    Token::In => {
                        let values = self.parse_array_literal()?;
                        Ok(Condition::In {
                            field,
                            values,
                            negated: true,
                        })
                    }
                    Token::Like => {
                        let pattern = self.parse_string_literal()?;
                        Ok(Condition::Like {
                            field,
                            pattern,
                            negated: true,
                        })
                    }
                    other => Err(ParseError::new(
                        format!("expected 'in' or 'like' after 'not', found {:?}", other),
                        next.span,
                    )),
                }
            }

            other => Err(ParseError::new(
                format!("expected comparison operator, found {:?}", other),
                op_tok.span,
            )
            .with_hint("comparisons look like `field == value`")),
        }
    }

    /// Parse a non-empty array literal [value, ...], allowing a trailing comma.
    fn parse_array_literal(&mut self) -> Result<Vec<Spanned<Literal>>, ParseError> {
        self.expect_token(Token::LBracket)?;
        if self.lexer.peek_is(&Token::RBracket) {
            let close = self.next_token()?;
            return Err(ParseError::new("expected at least one value in list", close.span)
                .with_hint("lists look like `[1, 2, 3]`"));
        }
        let mut values = Vec::new();

        loop {
            if self.lexer.peek_is(&Token::RBracket) {
                self.next_token()?;
                return Ok(values);
            }

            values.push(self.parse_literal()?);

            if self.lexer.peek_is(&Token::Comma) {
                self.next_token()?;
            } else {
                self.expect_token(Token::RBracket)?;
                return Ok(values);
            }
        }
    }

    /// Parse a literal value.
    fn parse_literal(&mut self) -> Result<Spanned<Literal>, ParseError> {
        let tok = self.next_token()?;
        let literal = match tok.token {
            Token::Null => Literal::Null,
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Int(i) => Literal::Int(i),
            Token::Float(f) => Literal::Float(f),
            Token::String(s) => Literal::String(s),
            other => {
                return Err(ParseError::new(
                    format!("expected literal value, found {:?}", other),
                    tok.span,
                ))
            }
        };

        Ok(Spanned::new(literal, tok.span))
    }

    /// Parse a string literal specifically.
    fn parse_string_literal(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::String(s) => Ok(Spanned::new(s, tok.span)),
            other => Err(ParseError::new(
                format!("expected string literal, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Expect and consume a specific token.
    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {:?}", expected, tok.token),
                tok.span,
            ))
        }
    }

    /// Get the next token, or an error at end of input.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        match self.lexer.next_token() {
            Some(tok) => tok,
            None => Err(ParseError::new(
                "unexpected end of input",
                Span::new(self.source.len(), self.source.len()),
            )),
        }
    }
}

/// Parse predicate text into a condition.
pub fn parse(source: &str) -> Result<Condition, ParseError> {
    Parser::new(source).parse_predicate()
}
