//! Highlighting tokenizer: classifies VibeScript source into coarse
//! syntactic categories. Total over any input; it classifies, it never fails.

/// Categories understood by the highlighter.
///
/// `Punctuation` is part of the vocabulary but the scanner currently leaves
/// operators and delimiters unclassified (rule 7 consumes them without
/// emitting); the variant stays so renderers can map the full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    String,
    Keyword,
    Type,
    Atom,
    Number,
    Identifier,
    #[allow(dead_code)]
    Punctuation,
}

/// Half-open byte range `[start, end)` into the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A classified slice of the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: Span,
}

/// Scanner state carried across chunked passes. Reset it (default) at the
/// start of each full tokenization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerState {
    pub in_string: bool,
}

pub const KEYWORDS: &[&str] = &[
    "spill_the_tea",
    "vibe_check",
    "no_cap",
    "cap",
    "lowkey",
    "highkey",
    "rizz_up",
    "slay",
    "lets_go",
    "yeet",
    "and_i_oop",
    "as_if",
    "rent_free",
    "main_character",
];

pub const TYPES: &[&str] = &["lit", "tea", "mood", "stan"];

pub const ATOMS: &[&str] = &["this_slaps", "im_dead", "ghost"];

fn classify_word(word: &str) -> TokenKind {
    if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else if TYPES.contains(&word) {
        TokenKind::Type
    } else if ATOMS.contains(&word) {
        TokenKind::Atom
    } else {
        TokenKind::Identifier
    }
}

/// Lazy token stream over a source buffer.
///
/// Rules are tried in a fixed priority order at each position; the first
/// match wins, and longest-match applies only inside the identifier and
/// number rules. Whitespace and unrecognized characters are consumed without
/// producing a token, so the emitted spans plus the skipped gaps always tile
/// the buffer exactly.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    state: LexerState,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_state(src, LexerState::default())
    }

    /// Resume scanning mid-string, e.g. for a chunked line-oriented pass.
    pub fn with_state(src: &'a str, state: LexerState) -> Self {
        Self { src, pos: 0, state }
    }

    /// State after the tokens consumed so far.
    pub fn state(&self) -> LexerState {
        self.state
    }

    fn emit(&mut self, kind: TokenKind, end: usize) -> Token<'a> {
        let span = Span { start: self.pos, end };
        let lexeme = &self.src[span.start..span.end];
        self.pos = end;
        Token { kind, lexeme, span }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];

            // 1: line comment. Checked before the string rule, so a pass
            // resumed inside an open string still reads `//` as a comment.
            if rest.starts_with("//") {
                let end = rest
                    .find('\n')
                    .map(|i| self.pos + i)
                    .unwrap_or(self.src.len());
                return Some(self.emit(TokenKind::Comment, end));
            }

            // 2: inside an open string literal. The unterminated case spans
            // to end of buffer and leaves the flag set.
            if self.state.in_string {
                return Some(match rest.find('"') {
                    Some(i) => {
                        self.state.in_string = false;
                        self.emit(TokenKind::String, self.pos + i + 1)
                    }
                    None => self.emit(TokenKind::String, self.src.len()),
                });
            }

            // 3: opening quote is a string token on its own; the content
            // follows via rule 2. A closing quote in the same pass is not
            // required.
            if rest.starts_with('"') {
                self.state.in_string = true;
                return Some(self.emit(TokenKind::String, self.pos + 1));
            }

            let ch = rest.chars().next()?;

            // 4: whitespace, consumed without a token.
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
                continue;
            }

            // 5: identifier run, classified against the membership lists.
            if ch.is_ascii_alphabetic() || ch == '_' {
                let len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                let kind = classify_word(&rest[..len]);
                return Some(self.emit(kind, self.pos + len));
            }

            // 6: digit run.
            if ch.is_ascii_digit() {
                let len = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                return Some(self.emit(TokenKind::Number, self.pos + len));
            }

            // 7: anything else (operators, delimiters, stray bytes) is
            // consumed one character at a time without a token.
            self.pos += ch.len_utf8();
        }
        None
    }
}

/// Tokenize a whole buffer from the default state.
pub fn scan(src: &str) -> (Vec<Token<'_>>, LexerState) {
    let mut lexer = Lexer::new(src);
    let tokens: Vec<Token<'_>> = (&mut lexer).collect();
    (tokens, lexer.state())
}
