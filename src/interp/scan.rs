//! Parser-grade tokenizer. Unlike the editor lexer in [`crate::lexer`], this
//! one rejects malformed input with positioned errors instead of smoothing
//! over it.

use std::fmt;

use super::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // keywords
    SpillTheTea,
    VibeCheck,
    NoCap,
    Cap,
    Lowkey,
    Highkey,
    RizzUp,
    Slay,
    LetsGo,
    Yeet,
    AndIOop,
    AsIf,
    RentFree,
    MainCharacter,
    // type names
    Lit,
    Tea,
    Mood,
    Stan,
    // literals
    ThisSlaps,
    ImDead,
    Ghost,
    Int(i64),
    Str(String),
    Ident(String),
    // operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    EqEq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    // delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Eof,
}

impl TokenKind {
    fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "spill_the_tea" => TokenKind::SpillTheTea,
            "vibe_check" => TokenKind::VibeCheck,
            "no_cap" => TokenKind::NoCap,
            "cap" => TokenKind::Cap,
            "lowkey" => TokenKind::Lowkey,
            "highkey" => TokenKind::Highkey,
            "rizz_up" => TokenKind::RizzUp,
            "slay" => TokenKind::Slay,
            "lets_go" => TokenKind::LetsGo,
            "yeet" => TokenKind::Yeet,
            "and_i_oop" => TokenKind::AndIOop,
            "as_if" => TokenKind::AsIf,
            "rent_free" => TokenKind::RentFree,
            "main_character" => TokenKind::MainCharacter,
            "lit" => TokenKind::Lit,
            "tea" => TokenKind::Tea,
            "mood" => TokenKind::Mood,
            "stan" => TokenKind::Stan,
            "this_slaps" => TokenKind::ThisSlaps,
            "im_dead" => TokenKind::ImDead,
            "ghost" => TokenKind::Ghost,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::SpillTheTea => f.write_str("'spill_the_tea'"),
            TokenKind::VibeCheck => f.write_str("'vibe_check'"),
            TokenKind::NoCap => f.write_str("'no_cap'"),
            TokenKind::Cap => f.write_str("'cap'"),
            TokenKind::Lowkey => f.write_str("'lowkey'"),
            TokenKind::Highkey => f.write_str("'highkey'"),
            TokenKind::RizzUp => f.write_str("'rizz_up'"),
            TokenKind::Slay => f.write_str("'slay'"),
            TokenKind::LetsGo => f.write_str("'lets_go'"),
            TokenKind::Yeet => f.write_str("'yeet'"),
            TokenKind::AndIOop => f.write_str("'and_i_oop'"),
            TokenKind::AsIf => f.write_str("'as_if'"),
            TokenKind::RentFree => f.write_str("'rent_free'"),
            TokenKind::MainCharacter => f.write_str("'main_character'"),
            TokenKind::Lit => f.write_str("'lit'"),
            TokenKind::Tea => f.write_str("'tea'"),
            TokenKind::Mood => f.write_str("'mood'"),
            TokenKind::Stan => f.write_str("'stan'"),
            TokenKind::ThisSlaps => f.write_str("'this_slaps'"),
            TokenKind::ImDead => f.write_str("'im_dead'"),
            TokenKind::Ghost => f.write_str("'ghost'"),
            TokenKind::Int(_) => f.write_str("integer literal"),
            TokenKind::Str(_) => f.write_str("string literal"),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Percent => f.write_str("'%'"),
            TokenKind::Assign => f.write_str("'='"),
            TokenKind::EqEq => f.write_str("'=='"),
            TokenKind::NotEq => f.write_str("'!='"),
            TokenKind::Less => f.write_str("'<'"),
            TokenKind::Greater => f.write_str("'>'"),
            TokenKind::LessEq => f.write_str("'<='"),
            TokenKind::GreaterEq => f.write_str("'>='"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, EngineError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.advance() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let kind = match c {
                '"' => self.string(line, column)?,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                // recognized for stan lists but no production consumes them yet
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                ':' => TokenKind::Colon,
                '=' => {
                    if self.eat('=') {
                        TokenKind::EqEq
                    } else {
                        TokenKind::Assign
                    }
                }
                '!' => {
                    if self.eat('=') {
                        TokenKind::NotEq
                    } else {
                        return Err(self.error("Expected '=' after '!'", line, column));
                    }
                }
                '<' => {
                    if self.eat('=') {
                        TokenKind::LessEq
                    } else {
                        TokenKind::Less
                    }
                }
                '>' => {
                    if self.eat('=') {
                        TokenKind::GreaterEq
                    } else {
                        TokenKind::Greater
                    }
                }
                c if c.is_ascii_digit() => self.number(c, line, column)?,
                c if c.is_alphabetic() || c == '_' => self.word(c),
                c => {
                    return Err(self.error(&format!("Unrecognized character: '{}'", c), line, column))
                }
            };
            tokens.push(Token { kind, line, column });
        }
    }

    /// Skip whitespace and `//` comments, which run to end of line.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self, line: u32, column: u32) -> Result<TokenKind, EngineError> {
        let mut text = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("Unterminated string literal", line, column)),
                Some('"') => return Ok(TokenKind::Str(text)),
                Some('\\') => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some(c) => {
                        return Err(self.error(
                            &format!("Invalid escape sequence: \\{}", c),
                            line,
                            column,
                        ))
                    }
                    None => return Err(self.error("Unterminated string literal", line, column)),
                },
                Some(c) => text.push(c),
            }
        }
    }

    fn number(&mut self, first: char, line: u32, column: u32) -> Result<TokenKind, EngineError> {
        let mut digits = String::from(first);
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.advance();
        }
        digits
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| self.error("Integer literal too large", line, column))
    }

    fn word(&mut self, first: char) -> TokenKind {
        let mut word = String::from(first);
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            word.push(c);
            self.advance();
        }
        TokenKind::keyword(&word).unwrap_or(TokenKind::Ident(word))
    }

    fn advance(&mut self) -> Option<char> {
        let c = *self.chars.get(self.pos)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn error(&self, message: &str, line: u32, column: u32) -> EngineError {
        EngineError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}
