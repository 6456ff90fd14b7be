//! Phone number standardization for North American numbers

use crate::cleaning::CleaningError;
use std::fmt;
use std::str::FromStr;

/// Region whose numbering plan is used to parse phone numbers
///
/// Only North American Numbering Plan regions are supported; `US` and `CA`
/// share the same rules. Any other region code fails to parse with
/// [`CleaningError::UnknownRegion`], and `+`-prefixed numbers that do not fit
/// the plan are rejected as [`CleaningError::WrongRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Us,
    Ca,
}

impl Region {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Ca => "CA",
        }
    }
}

impl FromStr for Region {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::Us),
            "CA" => Ok(Self::Ca),
            _ => Err(CleaningError::UnknownRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses a raw phone string and formats it as `(NPA) NXX-XXXX`
///
/// Accepts any punctuation between digit groups, an optional leading `+1` or
/// `1` country code, and rejects numbers whose area code cannot exist in the
/// North American plan (leading 0/1 or an `N11` service code).
pub fn standardize_phone(raw: &str, region: Region) -> Result<String, CleaningError> {
    let invalid = |reason: &str| CleaningError::InvalidPhone {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw
        .chars()
        .any(|c| !(c.is_ascii_digit() || c.is_whitespace() || "()+-./".contains(c)))
    {
        return Err(invalid("unexpected characters"));
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let national = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        n if n < 10 => return Err(invalid("too few digits")),
        _ => {
            if raw.trim_start().starts_with('+') {
                return Err(CleaningError::WrongRegion {
                    value: raw.to_string(),
                    region,
                });
            }
            return Err(invalid("too many digits"));
        }
    };

    let (area, rest) = national.split_at(3);
    let (exchange, line) = rest.split_at(3);

    if area.starts_with('0') || area.starts_with('1') {
        return Err(invalid("area code cannot start with 0 or 1"));
    }
    if &area[1..] == "11" {
        return Err(invalid("area code is a service code"));
    }

    Ok(format!("({}) {}-{}", area, exchange, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_formats_agree() {
        for raw in [
            "5551234567",
            "555-123-4567",
            "(555) 123-4567",
            "555.123.4567",
            "+1 555 123 4567",
            "1-555-123-4567",
        ] {
            assert_eq!(
                standardize_phone(raw, Region::Us).unwrap(),
                "(555) 123-4567",
                "input {}",
                raw
            );
        }
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(standardize_phone("123-4567", Region::Us).is_err());
        assert!(standardize_phone("055-123-4567", Region::Us).is_err());
        assert!(standardize_phone("911-123-4567", Region::Us).is_err());
        assert!(standardize_phone("555-CALL-NOW", Region::Us).is_err());
        assert!(standardize_phone("", Region::Us).is_err());
    }

    #[test]
    fn test_foreign_number_is_wrong_region() {
        let result = standardize_phone("+44 20 7946 0958 12", Region::Us);
        assert!(matches!(result, Err(CleaningError::WrongRegion { .. })));
    }

    #[test]
    fn test_region_parse() {
        assert_eq!("us".parse::<Region>().unwrap(), Region::Us);
        assert_eq!(" CA ".parse::<Region>().unwrap(), Region::Ca);
        assert!(matches!(
            "ZZ".parse::<Region>(),
            Err(CleaningError::UnknownRegion(_))
        ));
        assert!(matches!(
            "GB".parse::<Region>(),
            Err(CleaningError::UnknownRegion(_))
        ));
        assert_eq!(Region::default().to_string(), "US");
    }
}
