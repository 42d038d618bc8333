//! A1-style cell addresses

use crate::error::AddressParseError;
use std::fmt;
use std::str::FromStr;

/// Zero-based cell coordinate parsed from an A1-style address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an address such as `E2` or `ab12` (case-insensitive).
    ///
    /// Columns are base-26 letters (A=1 .. Z=26, AA=27, ...), rows are
    /// 1-based digits; both are returned zero-based.
    pub fn parse(address: &str) -> Result<Self, AddressParseError> {
        let err = || AddressParseError::new(address);

        let trimmed = address.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(err)?;
        let (letters, digits) = trimmed.split_at(split);

        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let mut col: u64 = 0;
        for b in letters.bytes() {
            col = col * 26 + u64::from(b.to_ascii_uppercase() - b'A' + 1);
            if col > u64::from(u32::MAX) {
                return Err(err());
            }
        }

        let row: u32 = digits.parse().map_err(|_| err())?;
        if row < 1 {
            return Err(err());
        }

        Ok(Self {
            row: row - 1,
            col: (col - 1) as u32,
        })
    }

    /// Render back to A1 notation.
    pub fn address(&self) -> String {
        format!("{}{}", column_letter(self.col), self.row + 1)
    }
}

impl FromStr for CellRef {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

/// Convert a zero-based column index to letters (0→A, 25→Z, 26→AA)
pub fn column_letter(index: u32) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_addresses() {
        assert_eq!(CellRef::parse("A1").unwrap(), CellRef::new(0, 0));
        assert_eq!(CellRef::parse("B2").unwrap(), CellRef::new(1, 1));
        assert_eq!(CellRef::parse("C10").unwrap(), CellRef::new(9, 2));
        assert_eq!(CellRef::parse("E2").unwrap(), CellRef::new(1, 4));
    }

    #[test]
    fn test_parse_double_letter_columns() {
        assert_eq!(CellRef::parse("AA1").unwrap().col, 26);
        assert_eq!(CellRef::parse("AB1").unwrap().col, 27);
        assert_eq!(CellRef::parse("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::parse("ZZ1").unwrap().col, 701);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(CellRef::parse("a1").unwrap(), CellRef::new(0, 0));
        assert_eq!(CellRef::parse("ab10").unwrap(), CellRef::new(9, 27));
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        for bad in ["", "123", "A", "1A", "A0", "A-1", "A1B", "Ä1", "A 1"] {
            let err = CellRef::parse(bad).unwrap_err();
            assert_eq!(err.address, bad);
        }
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_address_round_trip() {
        for row in 0..10_000u32 {
            for col in 0..=701u32 {
                let cell = CellRef::new(row, col);
                assert_eq!(CellRef::parse(&cell.address()).unwrap(), cell);
            }
        }
        assert_eq!(CellRef::new(9_999, 701).address(), "ZZ10000");
    }
}
