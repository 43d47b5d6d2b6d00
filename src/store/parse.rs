//! Recursive-descent parser for the formula text syntax.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := number | ident | ident '(' args ')' | '(' expr ')'
//! ```

use super::formula::{Expr, Operation};
use super::types::ValidRange;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("expected {expected} at offset {offset}")]
    Expected { expected: &'static str, offset: usize },
    #[error("unknown function '{name}' at offset {offset}")]
    UnknownFunction { name: String, offset: usize },
    #[error("function '{name}' takes {expected} arguments, got {actual}")]
    Arity { name: String, expected: usize, actual: usize },
    #[error("arguments of bounded() must be numeric literals (offset {offset})")]
    NonLiteralBound { offset: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        let start = i;
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
                continue;
            }
            '+' => tokens.push((Token::Plus, start)),
            '-' => tokens.push((Token::Minus, start)),
            '*' => tokens.push((Token::Star, start)),
            '/' => tokens.push((Token::Slash, start)),
            '(' => tokens.push((Token::LParen, start)),
            ')' => tokens.push((Token::RParen, start)),
            ',' => tokens.push((Token::Comma, start)),
            c if c.is_ascii_digit() || (c == '.' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())) => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    i += 1;
                    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                        i += 1;
                    }
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let slice = &text[start..i];
                let value = slice.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    text: slice.to_string(),
                    offset: start,
                })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(text[start..i].to_string()), start));
                continue;
            }
            _ => {
                // Report the full (possibly multi-byte) character.
                let ch = text[start..].chars().next().unwrap_or(c);
                return Err(ParseError::UnexpectedChar { ch, offset: start });
            }
        }
        i += 1;
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

pub(crate) fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0, end: text.len() };
    let expr = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(ParseError::Expected { expected: "end of formula", offset: parser.offset() });
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, o)| *o)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(ParseError::Expected { expected, offset: self.offset() })
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Operation::Add,
                Some(Token::Minus) => Operation::Subtract,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Operation::Multiply,
                Some(Token::Slash) => Operation::Divide,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Minus) {
            // `-3` is a literal, `-x` a negation.
            if let Some(Token::Number(v)) = self.peek() {
                let v = *v;
                self.pos += 1;
                return Ok(Expr::Number(-v));
            }
            let inner = self.unary()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let offset = self.offset();
        match self.tokens.get(self.pos).map(|(t, _)| t.clone()) {
            Some(Token::Number(v)) => {
                self.pos += 1;
                Ok(Expr::Number(v))
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                if self.eat(&Token::LParen) {
                    self.call(name, offset)
                } else {
                    Ok(Expr::Reference(name))
                }
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(ParseError::Expected { expected: "number, identifier or '('", offset }),
        }
    }

    fn call(&mut self, name: String, offset: usize) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen, "',' or ')'")?;
                break;
            }
        }

        let arity = |expected: usize| -> Result<(), ParseError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(ParseError::Arity { name: name.clone(), expected, actual: args.len() })
            }
        };

        match name.as_str() {
            "min" | "max" => {
                arity(2)?;
                let op = if name == "min" { Operation::Min } else { Operation::Max };
                let mut it = args.into_iter();
                match (it.next(), it.next()) {
                    (Some(lhs), Some(rhs)) => Ok(Expr::binary(op, lhs, rhs)),
                    _ => Err(ParseError::Arity { name, expected: 2, actual: 0 }),
                }
            }
            "bounded" => {
                arity(3)?;
                let literals: Vec<f64> = args
                    .iter()
                    .map(|a| match a {
                        Expr::Number(v) => Ok(*v),
                        _ => Err(ParseError::NonLiteralBound { offset }),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Expr::bounded(literals[0], ValidRange::new(literals[1], literals[2])))
            }
            _ => Err(ParseError::UnknownFunction { name, offset }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_precedence_and_associativity() {
        let e = parse("a - b - c * d").unwrap();
        let expected = Expr::binary(
            Operation::Subtract,
            Expr::binary(Operation::Subtract, Expr::reference("a"), Expr::reference("b")),
            Expr::binary(Operation::Multiply, Expr::reference("c"), Expr::reference("d")),
        );
        assert_eq!(e, expected);
    }

    #[test]
    fn test_negative_literal_folds() {
        assert_eq!(parse("-2.5").unwrap(), Expr::Number(-2.5));
        assert_eq!(parse("-x").unwrap(), Expr::Negate(Box::new(Expr::reference("x"))));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("1e3").unwrap(), Expr::Number(1000.0));
        assert_eq!(parse(".5").unwrap(), Expr::Number(0.5));
        assert_eq!(parse("2.5E-1").unwrap(), Expr::Number(0.25));
    }

    #[test]
    fn test_bounded_coefficient() {
        let e = parse("bounded(0.3, 0, -1)").unwrap();
        assert_eq!(e, Expr::bounded(0.3, ValidRange::new(0.0, -1.0)));
    }

    #[rstest]
    #[case("", ParseError::Expected { expected: "number, identifier or '('", offset: 0 })]
    #[case("a +", ParseError::Expected { expected: "number, identifier or '('", offset: 3 })]
    #[case("(a + b", ParseError::Expected { expected: "')'", offset: 6 })]
    #[case("a b", ParseError::Expected { expected: "end of formula", offset: 2 })]
    #[case("a # b", ParseError::UnexpectedChar { ch: '#', offset: 2 })]
    #[case("1.2.3", ParseError::InvalidNumber { text: "1.2.3".into(), offset: 0 })]
    #[case("sqrt(a)", ParseError::UnknownFunction { name: "sqrt".into(), offset: 0 })]
    #[case("min(a)", ParseError::Arity { name: "min".into(), expected: 2, actual: 1 })]
    #[case("bounded(x, 0, 1)", ParseError::NonLiteralBound { offset: 0 })]
    fn test_parse_errors(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse(input).unwrap_err(), expected);
    }
}
