//! Very small hand-written lexer for SNBT (the text form of block-entity
//! data used by `modify_block_entity_nbt`).
//!
//! Only splits the source into `Token`s. Numbers, booleans and bare
//! strings all come out as `Word`; the parser decides what they are.
//
//  Lexical items:
//
//      Word     ::= [A-Za-z0-9_.+-]+
//      Str      ::= '"' ... '"' | '\'' ... '\''   (backslash escapes)
//      Symbols  ::= '{' '}' '[' ']' ':' ',' ';'
//      Whitespace is discarded.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Semicolon,
    Word(String),
    Str(String),
    Eof,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            finished: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);
        self.consume_while(is_word_char, &mut word);
        word
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, String> {
        let mut txt = String::new();
        while let Some(c) = self.next_char() {
            match c {
                '\\' => match self.next_char() {
                    Some(escaped) => txt.push(escaped),
                    None => break,
                },
                c if c == quote => return Ok(txt),
                c => txt.push(c),
            }
        }
        Err(format!("no closing {quote} found"))
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }

        let Some(ch) = self.next_char() else {
            self.finished = true;
            return Some(Ok(Token::Eof));
        };

        let tok_res = match ch {
            '{' => Ok(Token::LBrace),
            '}' => Ok(Token::RBrace),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            ':' => Ok(Token::Colon),
            ',' => Ok(Token::Comma),
            ';' => Ok(Token::Semicolon),
            '"' | '\'' => self.read_quoted(ch).map(Token::Str),
            c if is_word_char(c) => Ok(Token::Word(self.read_word(c))),
            e => Err(format!("unexpected character {e}")),
        };

        Some(tok_res)
    }
}
