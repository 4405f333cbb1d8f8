//! Extracting an `(x, y)` pair from free-form model output.
//!
//! The model is asked for "x,y only" but in practice wraps the answer in
//! parentheses, spaces, or prose. The grammar is: after stripping ASCII
//! parentheses and all whitespace, the first `<digits>,<digits>` match
//! anywhere in the string wins.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::resolver::Prediction;

static COORD_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+),(\d+)").expect("coordinate regex is valid"));

#[derive(Debug, Error)]
#[error("no coordinate pair in response: {raw:?}")]
pub struct ParseError {
    pub raw: String,
}

/// Parse a single coordinate guess out of a raw VLM response. Digit runs that
/// overflow `u32` are rejected the same way as a missing pair.
pub fn parse_prediction(text: &str) -> Result<Prediction, ParseError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
        .collect();

    let captures = COORD_PAIR.captures(&cleaned).ok_or_else(|| ParseError {
        raw: text.to_string(),
    })?;

    let x = captures[1].parse::<u32>();
    let y = captures[2].parse::<u32>();
    match (x, y) {
        (Ok(x), Ok(y)) => Ok(Prediction { x, y }),
        _ => Err(ParseError {
            raw: text.to_string(),
        }),
    }
}
