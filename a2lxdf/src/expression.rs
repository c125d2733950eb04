use std::fmt::Display;
use std::str::FromStr;

use crate::XdfError;

/// The name of a statement
///
/// Identifiers are the keys of all lookup tables in a [`Module`](crate::Module).
/// A reference from one statement to another is stored as an `Identifier` and
/// resolved by name when it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(String);

impl Identifier {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ECU memory address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub u32);

impl Address {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Addresses are written in hexadecimal, with or without a leading `0x`.
/// The text may still be wrapped in the quotes of the source document.
impl FromStr for Address {
    type Err = XdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('"');
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        u32::from_str_radix(digits, 16)
            .map(Address)
            .map_err(|_| XdfError::InvalidAddress {
                value: s.to_string(),
            })
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// a number as it was written in the source document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Double(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(value) => value as f64,
            Numeric::Double(value) => value,
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Double(value)
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Integer(0)
    }
}

/// A printf-style display format such as `"%6.3"`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format(String);

impl Format {
    pub fn new<S: Into<String>>(format: S) -> Self {
        Self(format.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// the number of decimal places, i.e. the precision following the `.`
    ///
    /// Returns None if the format has no precision part.
    /// Non-numeric characters after the digits (e.g. `"%8.2f"`) are ignored,
    /// and a precision without digits counts as zero.
    pub fn decimal_places(&self) -> Option<u32> {
        let pos = self.0.find('.')?;
        let precision = &self.0[pos + 1..];
        if precision.is_empty() {
            return None;
        }
        let digits: String = precision
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        Some(digits.parse().unwrap_or(0))
    }
}

impl From<&str> for Format {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// any leaf value that can appear on the right side of a constant definition
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(i64),
    Double(f64),
    Address(Address),
    StringLiteral(String),
    Identifier(Identifier),
    Format(Format),
}

impl From<Numeric> for Expression {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Integer(value) => Expression::Integer(value),
            Numeric::Double(value) => Expression::Double(value),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_address() {
        let addr: Address = "0x1234".parse().unwrap();
        assert_eq!(addr, Address(0x1234));
        let addr: Address = "\"0X80ABCD\"".parse().unwrap();
        assert_eq!(addr.value(), 0x80ABCD);
        let addr: Address = "ff00".parse().unwrap();
        assert_eq!(addr.value(), 0xff00);

        let result = "0xZZ".parse::<Address>();
        assert!(matches!(result, Err(XdfError::InvalidAddress { .. })));
        let result = "".parse::<Address>();
        assert!(result.is_err());
    }

    #[test]
    fn display_address() {
        assert_eq!(Address(0x1a2b).to_string(), "0x1A2B");
        assert_eq!(Address(0).to_string(), "0x0");
    }

    #[test]
    fn format_decimal_places() {
        assert_eq!(Format::from("%6.3").decimal_places(), Some(3));
        assert_eq!(Format::from("%8.0").decimal_places(), Some(0));
        assert_eq!(Format::from("%10.12").decimal_places(), Some(12));
        assert_eq!(Format::from("%8.2f").decimal_places(), Some(2));
        assert_eq!(Format::from("%.x").decimal_places(), Some(0));
        // no precision at all
        assert_eq!(Format::from("%6").decimal_places(), None);
        assert_eq!(Format::from("%6.").decimal_places(), None);
    }

    #[test]
    fn numeric_conversion() {
        assert_eq!(Numeric::Integer(-5).as_f64(), -5.0);
        assert_eq!(Numeric::Double(2.5).as_f64(), 2.5);
        assert_eq!(
            Expression::from(Numeric::Integer(3)),
            Expression::Integer(3)
        );
    }

    #[test]
    fn identifier_compare() {
        let ident = Identifier::from("MAP_1");
        assert_eq!(ident, "MAP_1");
        assert_eq!(ident.as_str(), "MAP_1");
        assert_eq!(ident.to_string(), "MAP_1");
        assert_eq!(Identifier::new(String::from("x")), Identifier::from("x"));
    }
}
