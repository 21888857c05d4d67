//! Source highlighting and token inspection.

use anyhow::Result;

use crate::lexer;
use crate::printer::HighlightPrinter;

pub fn highlight(source: &str, color: bool) -> Result<()> {
    HighlightPrinter { enabled: color }.print(source);
    if !source.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Dump the classified token stream, one token per line with its byte span.
pub fn tokens(source: &str) -> Result<()> {
    let (tokens, state) = lexer::scan(source);
    for token in &tokens {
        println!(
            "{:>5}..{:<5} {:<11} {:?}",
            token.span.start,
            token.span.end,
            format!("{:?}", token.kind),
            token.lexeme
        );
    }
    if state.in_string {
        println!("(ends inside an open string)");
    }
    Ok(())
}
