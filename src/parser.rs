//! The reader: turns a token stream into an S-expression tree.

use crate::{
    error::Error,
    lexer::{Lexer, Token},
    node::{Slot, Value, make},
};

/// Consume exactly one complete expression, advancing the lexer past it.
pub fn read(lexer: &mut Lexer) -> Result<Slot, Error> {
    match lexer.peek().clone() {
        Token::Integer(i) => {
            lexer.advance()?;
            Ok(Some(make(Value::Integer(i))))
        }
        Token::Symbol(name) => {
            lexer.advance()?;
            let value = match name.as_str() {
                "#t" => Value::Boolean(true),
                "#f" => Value::Boolean(false),
                _ => Value::Symbol(name),
            };
            Ok(Some(make(value)))
        }
        Token::Quote => {
            lexer.advance()?;
            let expr = read(lexer)?;
            let quoted_tail = Some(make(Value::Pair(expr, None)));
            let quote_symbol = Some(make(Value::Symbol("quote".to_string())));
            Ok(Some(make(Value::Pair(quote_symbol, quoted_tail))))
        }
        Token::OpenParen => {
            lexer.advance()?;
            read_list(lexer)
        }
        Token::CloseParen => Err(Error::syntax("unexpected ')'")),
        Token::Dot => Err(Error::syntax("unexpected '.'")),
        Token::EndOfInput => Err(Error::syntax("unexpected end of input")),
    }
}

fn read_list(lexer: &mut Lexer) -> Result<Slot, Error> {
    if matches!(lexer.peek(), Token::CloseParen) {
        lexer.advance()?;
        return Ok(None);
    }
    if matches!(lexer.peek(), Token::EndOfInput) {
        return Err(Error::syntax("unterminated list"));
    }
    let car = read(lexer)?;
    if matches!(lexer.peek(), Token::Dot) {
        lexer.advance()?;
        if matches!(lexer.peek(), Token::CloseParen) {
            return Err(Error::syntax("expected an expression after '.'"));
        }
        let cdr = read(lexer)?;
        if !matches!(lexer.peek(), Token::CloseParen) {
            return Err(Error::syntax("expected ')' to close a dotted pair"));
        }
        lexer.advance()?;
        Ok(Some(make(Value::Pair(car, cdr))))
    } else {
        let rest = read_list(lexer)?;
        Ok(Some(make(Value::Pair(car, rest))))
    }
}
