//! Line tokenizer
//!
//! Splits a command line on single spaces. Tokens borrow from the line, so
//! a token vector lives no longer than the buffer it was cut from.

use heapless::Vec;

/// Maximum number of tokens kept per line
///
/// The longest command (`config pin D1 output`) needs four; anything past
/// the limit is dropped.
pub const MAX_TOKENS: usize = 8;

/// Ordered, non-empty tokens of one command line
pub type Tokens<'a> = Vec<&'a str, MAX_TOKENS>;

/// Split a line into tokens
///
/// Each space-separated piece is trimmed of surrounding whitespace
/// (including a trailing `\r`) and empty pieces are skipped, so repeated
/// spaces never produce empty tokens. An empty or blank line yields an
/// empty vector.
pub fn tokenize(line: &str) -> Tokens<'_> {
    let mut tokens = Vec::new();
    for token in line.split(' ').map(str::trim).filter(|t| !t.is_empty()) {
        if tokens.push(token).is_err() {
            break;
        }
    }
    tokens
}
