//! Printers: plain colored text and ANSI syntax highlighting.

use owo_colors::OwoColorize;

use crate::lexer::{self, TokenKind};

pub struct TextPrinter {
    pub color: Option<&'static str>,
}

impl TextPrinter {
    pub fn print(&self, text: &str) {
        if let Some(c) = self.color {
            match c {
                "green" => println!("{}", text.green()),
                "cyan" => println!("{}", text.cyan()),
                "magenta" => println!("{}", text.magenta()),
                "yellow" => println!("{}", text.yellow()),
                _ => println!("{}", text),
            }
        } else {
            println!("{}", text);
        }
    }
}

/// Renders source with one ANSI style per token class. Characters the lexer
/// consumes silently (whitespace, operators) pass through unstyled, so the
/// rendered text always reads back as the original buffer.
pub struct HighlightPrinter {
    pub enabled: bool,
}

impl HighlightPrinter {
    pub fn render(&self, source: &str) -> String {
        if !self.enabled {
            return source.to_string();
        }
        let (tokens, _) = lexer::scan(source);
        let mut out = String::new();
        let mut pos = 0;
        for token in &tokens {
            if token.span.start > pos {
                out.push_str(&source[pos..token.span.start]);
            }
            match token.kind {
                TokenKind::Comment => out.push_str(&format!("{}", token.lexeme.bright_black())),
                TokenKind::String => out.push_str(&format!("{}", token.lexeme.green())),
                TokenKind::Keyword => out.push_str(&format!("{}", token.lexeme.magenta())),
                TokenKind::Type => out.push_str(&format!("{}", token.lexeme.cyan())),
                TokenKind::Atom => out.push_str(&format!("{}", token.lexeme.yellow())),
                TokenKind::Number => out.push_str(&format!("{}", token.lexeme.blue())),
                TokenKind::Identifier | TokenKind::Punctuation => out.push_str(token.lexeme),
            }
            pos = token.span.end;
        }
        out.push_str(&source[pos..]);
        out
    }

    pub fn print(&self, source: &str) {
        print!("{}", self.render(source));
    }
}
