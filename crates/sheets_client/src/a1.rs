//! A1 notation helpers.

/// Convert a 0-based column index to its letter (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Quote a sheet title for use in a range: `Hires` -> `'Hires'`,
/// `Bob's` -> `'Bob''s'`.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Whole-sheet range for reads.
pub fn sheet_range(title: &str) -> String {
    quote_title(title)
}

/// Single-column range from `first_row` to `last_row` (1-based, inclusive).
pub fn column_range(title: &str, col: usize, first_row: usize, last_row: usize) -> String {
    let letter = column_letter(col);
    format!("{}!{}{}:{}{}", quote_title(title), letter, first_row, letter, last_row)
}
