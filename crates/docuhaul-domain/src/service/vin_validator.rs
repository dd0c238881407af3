//! VIN check-digit validation and model year decoding (ISO 3779)
//!
//! Both entry points are total: malformed input yields `false` or the
//! `"Unknown Year"` sentinel instead of an error.

use serde::{Deserialize, Serialize};

/// Number of characters in a VIN
pub const VIN_LENGTH: usize = 17;

/// Position of the check digit (0-indexed)
pub const CHECK_DIGIT_POSITION: usize = 8;

/// Position of the model year code (0-indexed)
pub const MODEL_YEAR_POSITION: usize = 9;

/// Returned by [`decode_model_year`] when the year cannot be determined
pub const UNKNOWN_YEAR: &str = "Unknown Year";

/// Positional weights; the check digit position carries weight 0
const WEIGHTS: [u32; VIN_LENGTH] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// Model year codes 2001-2030 (I, O, Q, U, Z and 0 are never year codes)
const YEAR_CODES: [(char, u16); 30] = [
    ('1', 2001),
    ('2', 2002),
    ('3', 2003),
    ('4', 2004),
    ('5', 2005),
    ('6', 2006),
    ('7', 2007),
    ('8', 2008),
    ('9', 2009),
    ('A', 2010),
    ('B', 2011),
    ('C', 2012),
    ('D', 2013),
    ('E', 2014),
    ('F', 2015),
    ('G', 2016),
    ('H', 2017),
    ('J', 2018),
    ('K', 2019),
    ('L', 2020),
    ('M', 2021),
    ('N', 2022),
    ('P', 2023),
    ('R', 2024),
    ('S', 2025),
    ('T', 2026),
    ('V', 2027),
    ('W', 2028),
    ('X', 2029),
    ('Y', 2030),
];

/// Map a VIN character to its numeric value.
///
/// Expects an upper-cased character. I, O and Q have no value.
fn transliterate(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        'A' | 'J' => Some(1),
        'B' | 'K' | 'S' => Some(2),
        'C' | 'L' | 'T' => Some(3),
        'D' | 'M' | 'U' => Some(4),
        'E' | 'N' | 'V' => Some(5),
        'F' | 'W' => Some(6),
        'G' | 'P' | 'X' => Some(7),
        'H' | 'Y' => Some(8),
        'R' | 'Z' => Some(9),
        _ => None,
    }
}

/// Why a VIN failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum VinFailure {
    WrongLength { length: usize },
    IllegalCharacter { position: usize, character: char },
    CheckDigitMismatch { expected: char, actual: char },
}

impl std::fmt::Display for VinFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VinFailure::WrongLength { length } => {
                write!(f, "expected {} characters, got {}", VIN_LENGTH, length)
            }
            VinFailure::IllegalCharacter { position, character } => {
                write!(f, "illegal character '{}' at position {}", character, position + 1)
            }
            VinFailure::CheckDigitMismatch { expected, actual } => {
                write!(f, "check digit is '{}' but should be '{}'", actual, expected)
            }
        }
    }
}

fn upper_chars(vin: &str) -> Vec<char> {
    vin.chars().map(|c| c.to_ascii_uppercase()).collect()
}

/// Compute the check digit a VIN should carry, ignoring its current one.
fn compute_check_digit(chars: &[char]) -> Result<char, VinFailure> {
    if chars.len() != VIN_LENGTH {
        return Err(VinFailure::WrongLength { length: chars.len() });
    }

    let mut sum = 0u32;
    for (position, (&c, weight)) in chars.iter().zip(WEIGHTS).enumerate() {
        let value = transliterate(c).ok_or(VinFailure::IllegalCharacter {
            position,
            character: c,
        })?;
        sum += value * weight;
    }

    let remainder = sum % 11;
    Ok(if remainder == 10 {
        'X'
    } else {
        char::from_digit(remainder, 10).unwrap_or('0')
    })
}

/// Check a VIN and report the reason on failure.
pub fn check_vin(vin: &str) -> Result<(), VinFailure> {
    let chars = upper_chars(vin);
    let expected = compute_check_digit(&chars)?;
    let actual = chars[CHECK_DIGIT_POSITION];
    if actual == expected {
        Ok(())
    } else {
        Err(VinFailure::CheckDigitMismatch { expected, actual })
    }
}

/// Validate a VIN's check digit. Case-insensitive; never panics.
pub fn validate_vin(vin: &str) -> bool {
    check_vin(vin).is_ok()
}

/// Look up the numeric model year for a VIN.
pub fn model_year(vin: &str) -> Option<u16> {
    let chars = upper_chars(vin);
    if chars.len() != VIN_LENGTH {
        return None;
    }
    let code = chars[MODEL_YEAR_POSITION];
    YEAR_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, year)| *year)
}

/// Decode the model year as a string, or `"Unknown Year"`.
///
/// The 10th character is not otherwise validated; the table covers a single
/// 30-year window (2001-2030).
pub fn decode_model_year(vin: &str) -> String {
    model_year(vin)
        .map(|year| year.to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}
