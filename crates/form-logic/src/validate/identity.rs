use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::response::Answer;

use super::expect_text;

static NRIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([STFG])(\d{7})([A-Z])$").expect("nric regex"));
static UEN_BUSINESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}[A-Z]$").expect("uen business regex"));
static UEN_LOCAL_COMPANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\d{5}[A-Z]$").expect("uen local company regex"));
static UEN_OTHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([RST])(\d{2})([A-Z]{2})\d{4}[A-Z]$").expect("uen other entity regex")
});

const NRIC_WEIGHTS: [u32; 7] = [2, 7, 6, 5, 4, 3, 2];
const NRIC_CHECK_ST: &[u8; 11] = b"JZIHGFEDCBA";
const NRIC_CHECK_FG: &[u8; 11] = b"XWUTRQPNMLK";

/// Entity type codes used by UENs issued from 2009 onwards.
const UEN_ENTITY_TYPES: &[&str] = &[
    "LP", "LL", "FC", "PF", "RF", "MQ", "MM", "NB", "CC", "CS", "MB", "FM", "GS", "GA", "GB",
    "DP", "CP", "NR", "CM", "CD", "MD", "HS", "VH", "CH", "MH", "CL", "XL", "CX", "RP", "TU",
    "TC", "FB", "FN", "PA", "PB", "SS", "MC", "SM",
];

pub(crate) fn validate_nric(answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?.trim().to_ascii_uppercase();
    if is_valid_nric(&text) {
        Ok(())
    } else {
        Err("answer is not a valid NRIC/FIN".into())
    }
}

/// Checks the S/T/F/G NRIC and FIN checksum.
pub fn is_valid_nric(text: &str) -> bool {
    let Some(captures) = NRIC.captures(text) else {
        return false;
    };
    let prefix = &captures[1];
    let digits = &captures[2];
    let check = captures[3].as_bytes()[0];

    let mut sum: u32 = digits
        .bytes()
        .zip(NRIC_WEIGHTS)
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();
    if matches!(prefix, "T" | "G") {
        sum += 4;
    }
    let table = if matches!(prefix, "S" | "T") {
        NRIC_CHECK_ST
    } else {
        NRIC_CHECK_FG
    };
    table[(sum % 11) as usize] == check
}

pub(crate) fn validate_uen(answer: &Answer, today: NaiveDate) -> Result<(), String> {
    let text = expect_text(answer)?.trim().to_ascii_uppercase();
    if is_valid_uen(&text, today.year()) {
        Ok(())
    } else {
        Err("answer is not a valid UEN".into())
    }
}

/// Structural UEN check for businesses, local companies and other entities.
pub fn is_valid_uen(text: &str, current_year: i32) -> bool {
    if UEN_BUSINESS.is_match(text) {
        return true;
    }
    if let Some(captures) = UEN_LOCAL_COMPANY.captures(text) {
        let year: i32 = captures[1].parse().unwrap_or(0);
        return (1800..=current_year).contains(&year);
    }
    if let Some(captures) = UEN_OTHER.captures(text) {
        let century = match &captures[1] {
            "R" => 1800,
            "S" => 1900,
            _ => 2000,
        };
        let year = century + captures[2].parse::<i32>().unwrap_or(0);
        return year <= current_year && UEN_ENTITY_TYPES.contains(&&captures[3]);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Answer {
        Answer::Text(value.into())
    }

    #[test]
    fn nric_checksum() {
        assert!(is_valid_nric("S1234567D"));
        assert!(!is_valid_nric("S1234567A"));
        assert!(!is_valid_nric("S123456D"));
        assert!(validate_nric(&text("s1234567d")).is_ok());
        assert!(validate_nric(&text("X1234567D")).is_err());
    }

    #[test]
    fn nric_prefix_offsets() {
        assert!(is_valid_nric("T1234567J"));
        assert!(is_valid_nric("F1234567N"));
        assert!(is_valid_nric("G1234567X"));
    }

    #[test]
    fn uen_formats() {
        assert!(is_valid_uen("53123456X", 2024));
        assert!(is_valid_uen("200912345K", 2024));
        assert!(!is_valid_uen("203012345K", 2024));
        assert!(is_valid_uen("T09LL0001B", 2024));
        assert!(!is_valid_uen("T09ZZ0001B", 2024));
        assert!(!is_valid_uen("T30LL0001B", 2024));
        assert!(!is_valid_uen("hello", 2024));
    }
}
