//! Parser that consumes the SNBT lexer and builds an [`Nbt`] tree.

use std::fmt;
use std::iter::Peekable;

use thiserror::Error;

use super::lexer::{Lexer, Token, is_word_char};

#[derive(Debug, Clone, PartialEq)]
pub enum Nbt {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<Nbt>),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    /// Entries in source order.
    Compound(Vec<(String, Nbt)>),
}

/// Deepest nesting of compounds and lists a patch may use.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnbtError {
    #[error("{0}")]
    Lex(String),
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },
    #[error("`{0}` is not a valid {1} array element")]
    BadArrayElement(String, char),
    #[error("unknown array type `{0}`")]
    BadArrayType(String),
    #[error("data patch must be a compound")]
    NotCompound,
    #[error("data patch nests deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Parses a data patch. The root must be a compound.
pub fn parse_patch(src: &str) -> Result<Nbt, SnbtError> {
    let mut p = Parser::new(src);
    let value = p.parse_value()?;
    p.expect(Token::Eof, "end of input")?;
    match value {
        Nbt::Compound(_) => Ok(value),
        _ => Err(SnbtError::NotCompound),
    }
}

struct Parser<'a> {
    lex: Peekable<Lexer<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lex: Lexer::new(src).peekable(),
            depth: 0,
        }
    }

    fn next(&mut self) -> Result<Token, SnbtError> {
        match self.lex.next() {
            Some(tok) => tok.map_err(SnbtError::Lex),
            None => Ok(Token::Eof),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        match self.lex.peek() {
            Some(Ok(tok)) => Some(tok),
            _ => None,
        }
    }

    fn expect(&mut self, want: Token, expected: &'static str) -> Result<(), SnbtError> {
        let tok = self.next()?;
        if tok == want {
            Ok(())
        } else {
            Err(unexpected(expected, &tok))
        }
    }

    fn parse_value(&mut self) -> Result<Nbt, SnbtError> {
        match self.next()? {
            Token::LBrace => self.nested(Self::parse_compound),
            Token::LBracket => self.nested(Self::parse_list),
            Token::Str(s) => Ok(Nbt::String(s)),
            Token::Word(w) => Ok(scalar(&w)),
            tok => Err(unexpected("a value", &tok)),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<Nbt, SnbtError>) -> Result<Nbt, SnbtError> {
        if self.depth >= MAX_DEPTH {
            return Err(SnbtError::TooDeep);
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_compound(&mut self) -> Result<Nbt, SnbtError> {
        let mut entries = Vec::new();
        if self.peek() == Some(&Token::RBrace) {
            self.next()?;
            return Ok(Nbt::Compound(entries));
        }
        loop {
            let key = match self.next()? {
                Token::Word(w) | Token::Str(w) => w,
                tok => return Err(unexpected("a key", &tok)),
            };
            self.expect(Token::Colon, "`:`")?;
            let value = self.parse_value()?;
            entries.push((key, value));
            match self.next()? {
                Token::Comma => continue,
                Token::RBrace => return Ok(Nbt::Compound(entries)),
                tok => return Err(unexpected("`,` or `}`", &tok)),
            }
        }
    }

    fn parse_list(&mut self) -> Result<Nbt, SnbtError> {
        if let Some(Token::Word(w)) = self.peek().cloned() {
            let mut ahead = self.lex.clone();
            ahead.next();
            if let Some(Ok(Token::Semicolon)) = ahead.next() {
                self.next()?;
                self.next()?;
                return self.parse_typed_array(&w);
            }
        }

        let mut items = Vec::new();
        if self.peek() == Some(&Token::RBracket) {
            self.next()?;
            return Ok(Nbt::List(items));
        }
        loop {
            items.push(self.parse_value()?);
            match self.next()? {
                Token::Comma => continue,
                Token::RBracket => return Ok(Nbt::List(items)),
                tok => return Err(unexpected("`,` or `]`", &tok)),
            }
        }
    }

    fn parse_typed_array(&mut self, kind: &str) -> Result<Nbt, SnbtError> {
        let kind = match kind {
            "B" => 'B',
            "I" => 'I',
            "L" => 'L',
            other => return Err(SnbtError::BadArrayType(other.to_string())),
        };
        let mut words = Vec::new();
        if self.peek() == Some(&Token::RBracket) {
            self.next()?;
        } else {
            loop {
                match self.next()? {
                    Token::Word(w) => words.push(w),
                    tok => return Err(unexpected("a number", &tok)),
                }
                match self.next()? {
                    Token::Comma => continue,
                    Token::RBracket => break,
                    tok => return Err(unexpected("`,` or `]`", &tok)),
                }
            }
        }

        let bad = |w: &str| SnbtError::BadArrayElement(w.to_string(), kind);
        match kind {
            'B' => words
                .iter()
                .map(|w| match scalar(w) {
                    Nbt::Byte(b) => Ok(b),
                    _ => w.parse().map_err(|_| bad(w)),
                })
                .collect::<Result<_, _>>()
                .map(Nbt::ByteArray),
            'I' => words
                .iter()
                .map(|w| match scalar(w) {
                    Nbt::Int(i) => Ok(i),
                    _ => Err(bad(w)),
                })
                .collect::<Result<_, _>>()
                .map(Nbt::IntArray),
            _ => words
                .iter()
                .map(|w| match scalar(w) {
                    Nbt::Long(l) => Ok(l),
                    Nbt::Int(i) => Ok(i64::from(i)),
                    _ => Err(bad(w)),
                })
                .collect::<Result<_, _>>()
                .map(Nbt::LongArray),
        }
    }
}

fn unexpected(expected: &'static str, tok: &Token) -> SnbtError {
    SnbtError::Unexpected {
        expected,
        found: format!("{tok:?}"),
    }
}

/// Classifies an unquoted word: booleans, suffixed and plain numbers, or a
/// bare string.
fn scalar(word: &str) -> Nbt {
    match word {
        "true" => return Nbt::Byte(1),
        "false" => return Nbt::Byte(0),
        _ => {}
    }
    let (body, suffix) = match word.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&word[..i], Some(c.to_ascii_lowercase())),
        _ => (word, None),
    };
    let parsed = match suffix {
        Some('b') => body.parse().ok().map(Nbt::Byte),
        Some('s') => body.parse().ok().map(Nbt::Short),
        Some('l') => body.parse().ok().map(Nbt::Long),
        Some('f') => body.parse().ok().map(Nbt::Float),
        Some('d') => body.parse().ok().map(Nbt::Double),
        Some(_) => None,
        None if body.contains(['.', 'e', 'E']) => body.parse().ok().map(Nbt::Double),
        None => body.parse().ok().map(Nbt::Int),
    };
    parsed.unwrap_or_else(|| Nbt::String(word.to_string()))
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if !s.is_empty() && s.chars().all(is_word_char) && matches!(scalar(s), Nbt::String(_)) {
        return f.write_str(s);
    }
    f.write_str("\"")?;
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

fn write_seq<T, F>(f: &mut fmt::Formatter<'_>, items: &[T], mut each: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        each(f, item)?;
    }
    Ok(())
}

/// Canonical SNBT text.
impl fmt::Display for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nbt::Byte(v) => write!(f, "{v}b"),
            Nbt::Short(v) => write!(f, "{v}s"),
            Nbt::Int(v) => write!(f, "{v}"),
            Nbt::Long(v) => write!(f, "{v}L"),
            Nbt::Float(v) => write!(f, "{v}f"),
            Nbt::Double(v) => write!(f, "{v}d"),
            Nbt::String(s) => write_string(f, s),
            Nbt::List(items) => {
                f.write_str("[")?;
                write_seq(f, items, |f, v| write!(f, "{v}"))?;
                f.write_str("]")
            }
            Nbt::ByteArray(items) => {
                f.write_str("[B;")?;
                write_seq(f, items, |f, v| write!(f, "{v}b"))?;
                f.write_str("]")
            }
            Nbt::IntArray(items) => {
                f.write_str("[I;")?;
                write_seq(f, items, |f, v| write!(f, "{v}"))?;
                f.write_str("]")
            }
            Nbt::LongArray(items) => {
                f.write_str("[L;")?;
                write_seq(f, items, |f, v| write!(f, "{v}L"))?;
                f.write_str("]")
            }
            Nbt::Compound(entries) => {
                f.write_str("{")?;
                write_seq(f, entries, |f, (k, v)| {
                    write_string(f, k)?;
                    write!(f, ":{v}")
                })?;
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patch() {
        let test_cases = vec![
            ("{}", Ok(Nbt::Compound(vec![]))),
            (
                "{Count: 3b, Name: \"Gear Box\", Speed: 1.5f, On: true}",
                Ok(Nbt::Compound(vec![
                    ("Count".into(), Nbt::Byte(3)),
                    ("Name".into(), Nbt::String("Gear Box".into())),
                    ("Speed".into(), Nbt::Float(1.5)),
                    ("On".into(), Nbt::Byte(1)),
                ])),
            ),
            (
                "{Items: [{id: \"minecraft:stone\", Count: 1b}], Pos: [I; 1, 2, 3]}",
                Ok(Nbt::Compound(vec![
                    (
                        "Items".into(),
                        Nbt::List(vec![Nbt::Compound(vec![
                            ("id".into(), Nbt::String("minecraft:stone".into())),
                            ("Count".into(), Nbt::Byte(1)),
                        ])]),
                    ),
                    ("Pos".into(), Nbt::IntArray(vec![1, 2, 3])),
                ])),
            ),
            ("[1, 2]", Err(SnbtError::NotCompound)),
            ("{a: 1", Err(unexpected("`,` or `}`", &Token::Eof))),
            ("{a: 1} x", Err(unexpected("end of input", &Token::Word("x".into())))),
        ];

        for (input, expected) in test_cases {
            assert_eq!(parse_patch(input), expected, "{input}");
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(scalar("12s"), Nbt::Short(12));
        assert_eq!(scalar("9000000000L"), Nbt::Long(9_000_000_000));
        assert_eq!(scalar("2.5"), Nbt::Double(2.5));
        assert_eq!(scalar("-4"), Nbt::Int(-4));
        assert_eq!(scalar("north"), Nbt::String("north".into()));
        assert_eq!(scalar("300b"), Nbt::String("300b".into()));
    }

    #[test]
    fn test_display_is_reparseable() {
        let src = "{Text: 'say \"hi\"', Tags: [a, b], Data: [L; 1, 2]}";
        let nbt = parse_patch(src).unwrap();
        let printed = nbt.to_string();
        assert_eq!(printed, "{Text:\"say \\\"hi\\\"\",Tags:[a,b],Data:[L;1L,2L]}");
        assert_eq!(parse_patch(&printed), Ok(nbt));
    }

    #[test]
    fn test_bad_arrays() {
        assert_eq!(
            parse_patch("{a: [X; 1]}"),
            Err(SnbtError::BadArrayType("X".into()))
        );
        assert_eq!(
            parse_patch("{a: [I; 1.5]}"),
            Err(SnbtError::BadArrayElement("1.5".into(), 'I'))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let compounds = |n: usize| format!("{}1{}", "{a:".repeat(n), "}".repeat(n));
        let lists = |n: usize| format!("{{a:{}1{}}}", "[".repeat(n), "]".repeat(n));
        let test_cases = vec![
            (compounds(MAX_DEPTH), true),
            (compounds(MAX_DEPTH + 1), false),
            (lists(MAX_DEPTH - 1), true),
            (lists(MAX_DEPTH), false),
            (compounds(100_000), false),
        ];
        for (input, ok) in test_cases {
            let result = parse_patch(&input);
            if ok {
                assert!(result.is_ok(), "depth {}", input.len());
            } else {
                assert_eq!(result, Err(SnbtError::TooDeep));
            }
        }
    }
}
