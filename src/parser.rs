//! Lexer and parser.
//!
//! Syntax is a small subset of Scheme s-expressions:
//!   atom     ::= integer | #t | #f | symbol
//!   list     ::= '(' expr* ')'
//!   dotted   ::= '(' expr+ '.' expr ')'
//!   quoted   ::= '\'' expr
//!
//! Lists are built directly on the heap, so a parsed form is an ordinary
//! value and `quote` can hand it back unchanged.

use crate::error::{Error, Result};
use crate::heap::Heap;
use crate::symbol::SymbolTable;
use crate::value::Val;

// ── Token ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    Dot,
    Int(i64),
    Bool(bool),
    Symbol(String),
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.pos += 1;
                }
                Some(b';') => {
                    // line comment
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn is_symbol_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || matches!(b, b'<' | b'=' | b'>' | b'*' | b'/' | b'#')
    }

    fn is_symbol_inner(b: u8) -> bool {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'<' | b'=' | b'>' | b'*' | b'/' | b'?' | b'!' | b'.' | b'-' | b'#'
            )
    }

    fn slice(&self, start: usize) -> &'a str {
        // only ASCII bytes are ever consumed into a token
        std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default()
    }

    fn read_symbol(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while self.peek().is_some_and(Self::is_symbol_inner) {
            self.pos += 1;
        }
        Token::Symbol(self.slice(start).to_string())
    }

    fn read_integer(&mut self) -> Result<Token> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = self.slice(start);
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| Error::syntax(format!("integer literal out of range: {text}")))
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let Some(b) = self.peek() else {
                return Ok(tokens);
            };
            match b {
                b'(' => {
                    self.pos += 1;
                    tokens.push(Token::LParen);
                }
                b')' => {
                    self.pos += 1;
                    tokens.push(Token::RParen);
                }
                b'\'' => {
                    self.pos += 1;
                    tokens.push(Token::Quote);
                }
                b'.' => {
                    self.pos += 1;
                    tokens.push(Token::Dot);
                }
                b'0'..=b'9' => tokens.push(self.read_integer()?),
                b'+' | b'-' => {
                    if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                        tokens.push(self.read_integer()?);
                    } else {
                        self.pos += 1;
                        tokens.push(Token::Symbol(char::from(b).to_string()));
                    }
                }
                b'#' if matches!(self.peek_at(1), Some(b't' | b'f'))
                    && !self.peek_at(2).is_some_and(Self::is_symbol_inner) =>
                {
                    tokens.push(Token::Bool(self.peek_at(1) == Some(b't')));
                    self.pos += 2;
                }
                b if Self::is_symbol_start(b) => tokens.push(self.read_symbol()),
                _ => {
                    let rest = std::str::from_utf8(&self.input[self.pos..]).unwrap_or_default();
                    let c = rest.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(Error::syntax(format!("unexpected character '{c}'")));
                }
            }
        }
    }
}

// ── Parser ──

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(t)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Parse one expression, returning it as a Val (using the heap for lists).
    pub fn parse_expr(&mut self, heap: &mut Heap, syms: &mut SymbolTable) -> Result<Val> {
        match self.advance() {
            None => Err(Error::syntax("unexpected end of input")),
            Some(Token::Int(i)) => Ok(Val::int(*i)),
            Some(Token::Bool(b)) => Ok(Val::boolean(*b)),
            Some(Token::Symbol(name)) => Ok(Val::Symbol(syms.intern(name))),
            Some(Token::Quote) => {
                let quoted = self.parse_expr(heap, syms)?;
                let quote_sym = Val::Symbol(syms.intern("quote"));
                Ok(heap.list(&[quote_sym, quoted]))
            }
            Some(Token::LParen) => self.parse_list(heap, syms),
            Some(Token::RParen) => Err(Error::syntax("unexpected ')'")),
            Some(Token::Dot) => Err(Error::syntax("unexpected '.'")),
        }
    }

    fn parse_list(&mut self, heap: &mut Heap, syms: &mut SymbolTable) -> Result<Val> {
        let mut elems = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::syntax("unterminated list: missing ')'")),
                Some(Token::RParen) => {
                    self.pos += 1;
                    return Ok(heap.list(&elems));
                }
                Some(Token::Dot) => {
                    if elems.is_empty() {
                        return Err(Error::syntax("'.' must follow at least one element"));
                    }
                    self.pos += 1;
                    let tail = self.parse_expr(heap, syms)?;
                    match self.advance() {
                        Some(Token::RParen) => {}
                        Some(_) => {
                            return Err(Error::syntax("expected ')' after dotted tail"))
                        }
                        None => return Err(Error::syntax("unterminated list: missing ')'")),
                    }
                    let mut result = tail;
                    for v in elems.iter().rev() {
                        result = heap.cons(*v, result);
                    }
                    return Ok(result);
                }
                _ => {
                    let expr = self.parse_expr(heap, syms)?;
                    elems.push(expr);
                }
            }
        }
    }
}

/// Tokenize `input` and parse every top-level expression in it.
pub fn parse(input: &str, heap: &mut Heap, syms: &mut SymbolTable) -> Result<Vec<Val>> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(&tokens);
    let mut exprs = Vec::new();
    while !parser.is_at_end() {
        exprs.push(parser.parse_expr(heap, syms)?);
    }
    Ok(exprs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_val;

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize().unwrap()
    }

    fn sym(name: &str) -> Token {
        Token::Symbol(name.to_string())
    }

    fn reprint(src: &str) -> Result<String> {
        let mut heap = Heap::new();
        let mut syms = SymbolTable::new();
        let exprs = parse(src, &mut heap, &mut syms)?;
        let printed: Result<Vec<_>> = exprs
            .into_iter()
            .map(|e| print_val(e, &heap, &syms))
            .collect();
        Ok(printed?.join(" "))
    }

    #[test]
    fn integers_and_signs() {
        assert_eq!(
            tokens("42 -7 +3 - +"),
            vec![Token::Int(42), Token::Int(-7), Token::Int(3), sym("-"), sym("+")]
        );
    }

    #[test]
    fn integer_overflow_is_syntax_error() {
        let err = Lexer::new("99999999999999999999").tokenize().unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn booleans_and_hash_symbols() {
        assert_eq!(
            tokens("#t #f #tag"),
            vec![Token::Bool(true), Token::Bool(false), sym("#tag")]
        );
        assert_eq!(tokens("(#t)"), vec![Token::LParen, Token::Bool(true), Token::RParen]);
    }

    #[test]
    fn symbol_characters() {
        assert_eq!(
            tokens("set! list-ref null? <= a.b"),
            vec![sym("set!"), sym("list-ref"), sym("null?"), sym("<="), sym("a.b")]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(tokens("1 ; two\n3"), vec![Token::Int(1), Token::Int(3)]);
    }

    #[test]
    fn bad_character() {
        let err = Lexer::new("(a \"b\")").tokenize().unwrap_err();
        assert_eq!(err, Error::syntax("unexpected character '\"'"));
        assert!(Lexer::new("?x").tokenize().is_err());
    }

    #[test]
    fn reads_lists() {
        assert_eq!(reprint("()").unwrap(), "()");
        assert_eq!(reprint("(1 (2 3) #t)").unwrap(), "(1 (2 3) #t)");
        assert_eq!(reprint("(1 . 2)").unwrap(), "(1 . 2)");
        assert_eq!(reprint("(1 2 . (3 4))").unwrap(), "(1 2 3 4)");
        assert_eq!(reprint("'x").unwrap(), "(quote x)");
    }

    #[test]
    fn malformed_input() {
        for src in ["(", "(1 2", ")", "(. 1)", "(1 . 2 3)", "(1 .)", ".", "'"] {
            assert!(
                matches!(reprint(src), Err(Error::Syntax(_))),
                "{src} should not parse"
            );
        }
    }
}
