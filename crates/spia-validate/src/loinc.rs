//! LOINC code structure and check digit.

/// Characters permitted in the body of a LOINC code, after upper-casing.
const LOINC_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVYWXZ_";

/// Returns true when `code` has the shape `<alphanumeric>-<digit>` and the
/// trailing digit matches the check digit computed from the body.
pub fn is_valid_loinc(code: &str) -> bool {
    let Some((body, check)) = code.split_once('-') else {
        return false;
    };
    if body.is_empty() || !body.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return false;
    }
    let mut check_chars = check.chars();
    let (Some(check_char), None) = (check_chars.next(), check_chars.next()) else {
        return false;
    };
    let Some(expected) = check_char.to_digit(10) else {
        return false;
    };
    let body = body.trim().to_ascii_uppercase();
    match check_digit(&body) {
        Some(actual) => actual == expected,
        None => false,
    }
}

/// Computes the LOINC check digit for an upper-cased body.
///
/// Each character contributes its offset from `'0'` in the ASCII table.
/// Characters are weighted right to left, doubling at even positions with
/// the usual digit-sum reduction. Returns `None` for characters outside the
/// LOINC alphabet.
pub fn check_digit(body: &str) -> Option<u32> {
    let mut sum: i64 = 0;
    for (index, ch) in body.chars().rev().enumerate() {
        if !LOINC_ALPHABET.contains(ch) {
            return None;
        }
        let value = i64::from(u32::from(ch)) - 48;
        sum += if index % 2 == 0 {
            2 * value - (value / 5) * 9
        } else {
            value
        };
    }
    let sum = sum.abs() + 10;
    u32::try_from((10 - sum % 10) % 10).ok()
}
