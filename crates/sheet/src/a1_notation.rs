//! A1-style cell addressing helpers shared by the formula evaluator.

/// Parse a cell label such as `B7` into zero-based (row, col).
///
/// Only letters followed by digits are accepted; `$` markers, trailing text
/// and row zero give `None`.
#[must_use]
pub fn parse_a1(notation: &str) -> Option<(usize, usize)> {
    let notation = notation.trim().to_ascii_uppercase();
    let split_pos = notation.find(|c: char| c.is_ascii_digit())?;

    let (col_part, row_part) = notation.split_at(split_pos);
    let col = column_letters_to_index(col_part)?;
    if !row_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row = row_part.parse::<usize>().ok()?;

    // Rows are 1-based in A1 notation
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}

/// Zero-based index of a column label: `A` is 0, `Z` is 25, `AA` is 26.
///
/// Lowercase letters are accepted. Labels too long for `usize` give `None`.
#[must_use]
pub fn column_letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    letters
        .bytes()
        .try_fold(0usize, |acc, b| {
            let b = b.to_ascii_uppercase();
            b.is_ascii_uppercase()
                .then(|| acc.checked_mul(26)?.checked_add(usize::from(b - b'A') + 1))
                .flatten()
        })
        .map(|n| n - 1)
}

/// Column label for a zero-based index (bijective base 26)
#[must_use]
pub fn column_index_to_letters(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 label for a zero-based (row, col), e.g. (0, 1) is "B1"
#[must_use]
pub fn to_a1_notation(row: usize, col: usize) -> String {
    format!("{}{}", column_index_to_letters(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1"), Some((0, 0)));
        assert_eq!(parse_a1("B1"), Some((0, 1)));
        assert_eq!(parse_a1("A2"), Some((1, 0)));
        assert_eq!(parse_a1("Z1"), Some((0, 25)));
        assert_eq!(parse_a1("AA1"), Some((0, 26)));
        assert_eq!(parse_a1("ZZ1"), Some((0, 701)));
        assert_eq!(parse_a1("aa10"), Some((9, 26)));
    }

    #[test]
    fn test_parse_a1_errors() {
        assert_eq!(parse_a1(""), None);
        assert_eq!(parse_a1("A"), None);
        assert_eq!(parse_a1("1"), None);
        assert_eq!(parse_a1("A0"), None);
        assert_eq!(parse_a1("A1B"), None);
        assert_eq!(parse_a1("$A$1"), None);
    }

    #[test]
    fn test_column_index_to_letters() {
        assert_eq!(column_index_to_letters(0), "A");
        assert_eq!(column_index_to_letters(25), "Z");
        assert_eq!(column_index_to_letters(26), "AA");
        assert_eq!(column_index_to_letters(701), "ZZ");
        assert_eq!(column_index_to_letters(702), "AAA");
    }

    #[test]
    fn test_roundtrip() {
        for row in 0..10 {
            for col in 0..100 {
                let notation = to_a1_notation(row, col);
                assert_eq!(parse_a1(&notation), Some((row, col)));
            }
        }
    }
}
