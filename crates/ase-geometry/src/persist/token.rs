//! Token stream of persisted surface records and its text form.
//!
//! Text is whitespace-separated: identifiers, reals, `I` (infinite interval
//! end), `F` (finite interval end, followed by a real) and `#` (end of
//! record).

use ase_core::{AseError, Result};
use serde::{Deserialize, Serialize};

/// A single token of a persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Type names and named flag values, e.g. `sphere-surface`, `forward_v`
    Ident(String),
    Real(f64),
    /// Unbounded interval end
    Infinite,
    /// Bounded interval end; the value follows as a `Real`
    Finite,
    /// End of record
    End,
}

/// Render tokens as text, one record per line.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push(' ');
        }
        match tok {
            Token::Ident(name) => out.push_str(name),
            Token::Real(v) => out.push_str(&format!("{v:?}")),
            Token::Infinite => out.push('I'),
            Token::Finite => out.push('F'),
            Token::End => out.push_str("#\n"),
        }
    }
    out
}

/// Tokenize the text form of one or more records.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut pos: usize = 0;
    let mut tokens = Vec::new();

    while pos < len {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        match bytes[pos] {
            b'#' => {
                tokens.push(Token::End);
                pos += 1;
            }

            // Real: anything up to the next separator that parses as f64
            c if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => {
                let start = pos;
                while pos < len && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'#' {
                    pos += 1;
                }
                let text = &input[start..pos];
                let v: f64 = text
                    .parse()
                    .map_err(|e| AseError::Restore(format!("Invalid real '{text}' at position {start}: {e}")))?;
                tokens.push(Token::Real(v));
            }

            // Identifier or interval marker
            c if c.is_ascii_alphabetic() => {
                let start = pos;
                while pos < len && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'-') {
                    pos += 1;
                }
                let word = &input[start..pos];
                match word {
                    "I" => tokens.push(Token::Infinite),
                    "F" => tokens.push(Token::Finite),
                    "inf" | "NaN" => tokens.push(Token::Real(word.parse().unwrap_or(f64::NAN))),
                    _ => tokens.push(Token::Ident(word.to_string())),
                }
            }

            other => {
                return Err(AseError::Restore(format!(
                    "Unexpected character '{}' at position {pos}",
                    other as char
                )));
            }
        }
    }

    Ok(tokens)
}
