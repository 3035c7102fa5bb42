//! Coordinate token normalizer.
//!
//! Turns raw coordinate text into a `NumericCoordinate`. Repairs, in order:
//!
//! 1. drop every whitespace char (spaces, tabs, NBSP); read U+2212 as `-`
//! 2. comma → period, but only when the token has no period already
//! 3. restore a missing decimal point on all-digit tokens longer than the
//!    axis' integer width (`-22175` → `-22.175` for a width of 2)
//!
//! Anything still not a plain signed decimal afterwards is a `TokenError`.

use thiserror::Error;

use crate::domain::NumericCoordinate;

/// Why a token could not be turned into a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("empty value")]
    Empty,
    #[error("no digits in '{0}'")]
    NoDigits(String),
    #[error("more than one decimal point in '{0}'")]
    MultipleDecimalPoints(String),
    #[error("unexpected character '{found}' in '{token}'")]
    InvalidCharacter { token: String, found: char },
    #[error("value '{0}' is not finite")]
    NonFinite(String),
}

/// A successfully parsed token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedToken {
    pub value: NumericCoordinate,
    /// A decimal point was inserted by the missing-decimal repair.
    pub repaired: bool,
}

/// Normalize and parse a single coordinate token.
///
/// `integer_digits` is the expected number of digits before the decimal point
/// for this axis; it drives the missing-decimal repair.
pub fn normalize_token(raw: &str, integer_digits: usize) -> Result<ParsedToken, TokenError> {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    if s.is_empty() {
        return Err(TokenError::Empty);
    }

    if !s.contains('.') {
        s = s.replace(',', ".");
    }

    let (sign, body) = split_sign(&s);
    let mut repaired = false;
    let body = match repair_missing_decimal(body, integer_digits) {
        Some(fixed) => {
            repaired = true;
            fixed
        }
        None => body.to_string(),
    };

    check_body(&s, &body)?;

    let text = format!("{sign}{body}");
    let value: f64 = text
        .parse()
        .map_err(|_| TokenError::NoDigits(s.clone()))?;
    let value = NumericCoordinate::new(value).ok_or(TokenError::NonFinite(s))?;

    Ok(ParsedToken { value, repaired })
}

fn split_sign(s: &str) -> (&str, &str) {
    match s.as_bytes().first() {
        Some(b'-') | Some(b'+') => s.split_at(1),
        _ => ("", s),
    }
}

/// Insert a decimal point after `integer_digits` digits when the body is all
/// digits and too long to be a plain integer-degree value.
fn repair_missing_decimal(body: &str, integer_digits: usize) -> Option<String> {
    if integer_digits == 0 || body.len() <= integer_digits {
        return None;
    }
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (int_part, frac_part) = body.split_at(integer_digits);
    Some(format!("{int_part}.{frac_part}"))
}

fn check_body(token: &str, body: &str) -> Result<(), TokenError> {
    let mut digits = 0usize;
    let mut points = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            other => {
                return Err(TokenError::InvalidCharacter {
                    token: token.to_string(),
                    found: other,
                });
            }
        }
    }
    if digits == 0 {
        return Err(TokenError::NoDigits(token.to_string()));
    }
    if points > 1 {
        return Err(TokenError::MultipleDecimalPoints(token.to_string()));
    }
    Ok(())
}
