//! The lexer: a peekable cursor turning a character stream into tokens.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Integer(i64),
    Symbol(String),
    OpenParen,
    CloseParen,
    Quote,
    Dot,
    EndOfInput,
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || "<=>*/#".contains(c)
}

fn is_symbol_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || "<=>*/#?!-".contains(c)
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    current: Token,
}

impl Lexer {
    pub fn new(source: &str) -> Result<Self, Error> {
        let mut lexer = Lexer {
            chars: source.chars().collect(),
            pos: 0,
            current: Token::EndOfInput,
        };
        lexer.current = lexer.scan()?;
        Ok(lexer)
    }

    pub fn is_end(&self) -> bool {
        matches!(self.current, Token::EndOfInput)
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    pub fn advance(&mut self) -> Result<(), Error> {
        self.current = self.scan()?;
        Ok(())
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char(0) {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some(';') => {
                    while !matches!(self.peek_char(0), None | Some('\n')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan(&mut self) -> Result<Token, Error> {
        self.skip_trivia();
        let Some(ch) = self.peek_char(0) else {
            return Ok(Token::EndOfInput);
        };
        match ch {
            '(' => {
                self.pos += 1;
                Ok(Token::OpenParen)
            }
            ')' => {
                self.pos += 1;
                Ok(Token::CloseParen)
            }
            '\'' => {
                self.pos += 1;
                Ok(Token::Quote)
            }
            '.' => {
                self.pos += 1;
                Ok(Token::Dot)
            }
            '+' | '-' => self.scan_signed(),
            c if c.is_ascii_digit() => self.scan_integer(false),
            c if is_symbol_start(c) => Ok(self.scan_symbol()),
            c => Err(Error::syntax(format!(
                "unexpected character '{c}' at position {}",
                self.pos
            ))),
        }
    }

    fn scan_signed(&mut self) -> Result<Token, Error> {
        let sign = self.chars[self.pos];
        if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.scan_integer(sign == '-')
        } else {
            self.pos += 1;
            let mut symbol = String::new();
            symbol.push(sign);
            while let Some(c) = self.peek_char(0) {
                if is_symbol_continue(c) {
                    symbol.push(c);
                    self.pos += 1;
                } else {
                    break;
                }
            }
            Ok(Token::Symbol(symbol))
        }
    }

    fn scan_integer(&mut self, negative: bool) -> Result<Token, Error> {
        let start = self.pos;
        while self.peek_char(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::syntax("expected a digit"));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        let value: i64 = digits
            .parse()
            .map_err(|_| Error::syntax(format!("integer literal out of range: {digits}")))?;
        Ok(Token::Integer(if negative { -value } else { value }))
    }

    fn scan_symbol(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek_char(0) {
            if is_symbol_continue(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Symbol(self.chars[start..self.pos].iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source).unwrap();
        let mut out = Vec::new();
        loop {
            out.push(lexer.peek().clone());
            if lexer.is_end() {
                break;
            }
            lexer.advance().unwrap();
        }
        out
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokens(""), vec![Token::EndOfInput]);
    }

    #[test]
    fn parens() {
        assert_eq!(
            tokens("(())"),
            vec![
                Token::OpenParen,
                Token::OpenParen,
                Token::CloseParen,
                Token::CloseParen,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn plain_integer() {
        assert_eq!(
            tokens("123456"),
            vec![Token::Integer(123456), Token::EndOfInput]
        );
    }

    #[test]
    fn signed_integers() {
        assert_eq!(
            tokens("+1 -2"),
            vec![Token::Integer(1), Token::Integer(-2), Token::EndOfInput]
        );
    }

    #[test]
    fn bare_sign_is_a_symbol() {
        assert_eq!(
            tokens("+ -"),
            vec![
                Token::Symbol("+".to_string()),
                Token::Symbol("-".to_string()),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn sign_followed_by_letter_is_a_symbol() {
        assert_eq!(
            tokens("+foo"),
            vec![Token::Symbol("+foo".to_string()), Token::EndOfInput]
        );
    }

    #[test]
    fn adjacent_symbol_and_sign_tokenize_separately() {
        // Open question resolved in SPEC_FULL.md: 'a+b' is two symbols, no
        // whitespace required between a symbol and a following sign-led token.
        assert_eq!(
            tokens("a+b"),
            vec![
                Token::Symbol("a".to_string()),
                Token::Symbol("+b".to_string()),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn adjacent_integer_and_sign_tokenize_as_two_integers() {
        assert_eq!(
            tokens("1-2"),
            vec![Token::Integer(1), Token::Integer(-2), Token::EndOfInput]
        );
    }

    #[test]
    fn comment_is_skipped() {
        assert_eq!(
            tokens("1 ; comment\n2"),
            vec![Token::Integer(1), Token::Integer(2), Token::EndOfInput]
        );
    }

    #[test]
    fn whitespace_only() {
        assert_eq!(tokens("   \n\t  "), vec![Token::EndOfInput]);
    }

    #[test]
    fn quote_and_dot() {
        assert_eq!(
            tokens("'(a . b)"),
            vec![
                Token::Quote,
                Token::OpenParen,
                Token::Symbol("a".to_string()),
                Token::Dot,
                Token::Symbol("b".to_string()),
                Token::CloseParen,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn symbol_continuation_includes_punctuation() {
        assert_eq!(
            tokens("list-ref? <= *foo*"),
            vec![
                Token::Symbol("list-ref?".to_string()),
                Token::Symbol("<=".to_string()),
                Token::Symbol("*foo*".to_string()),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn booleans_lex_as_symbols() {
        assert_eq!(
            tokens("#t #f"),
            vec![
                Token::Symbol("#t".to_string()),
                Token::Symbol("#f".to_string()),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn unknown_character_is_syntax_error() {
        assert!(matches!(Lexer::new("@"), Err(Error::Syntax(_))));
    }
}
