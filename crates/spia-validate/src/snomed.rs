//! SNOMED CT identifier structure: range, partition identifier and Verhoeff
//! check digit.

const MIN_EXCLUSIVE: u64 = 100_000;
const MAX_INCLUSIVE: u64 = 1_000_000_000_000_000_000;
const VALID_PARTITIONS: [&str; 6] = ["00", "01", "02", "10", "11", "12"];

const VERHOEFF_D: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

const VERHOEFF_P: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

/// Returns true when `code` is a structurally valid SNOMED CT identifier.
pub fn is_valid_snomed(code: &str) -> bool {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Ok(number) = code.parse::<u64>() else {
        return false;
    };
    if number <= MIN_EXCLUSIVE || number > MAX_INCLUSIVE {
        return false;
    }
    let partition = &code[code.len() - 3..code.len() - 1];
    if !VALID_PARTITIONS.contains(&partition) {
        return false;
    }
    verhoeff_valid(code)
}

/// Verhoeff check over a string of ASCII digits, including its check digit.
pub fn verhoeff_valid(digits: &str) -> bool {
    let mut check = 0u8;
    for (index, byte) in digits.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let digit = usize::from(byte - b'0');
        let permuted = VERHOEFF_P[index % 8][digit];
        check = VERHOEFF_D[usize::from(check)][usize::from(permuted)];
    }
    check == 0
}
