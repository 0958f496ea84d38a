//! Year-scoped item identifier (`ITM-YY-NNNNN`).
//!
//! The rendered form is an external contract: physical stickers carry it, so
//! parsing and formatting must stay bit-exact.

use core::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// Largest allocatable suffix within a year. Exceeding it is a configuration
/// error, never a silent wrap.
pub const MAX_SUFFIX: u32 = 99_999;

/// Two-digit year tag for a timestamp.
pub fn year_tag(at: DateTime<Utc>) -> u8 {
    (at.year().rem_euclid(100)) as u8
}

/// Unique, immutable item identifier: two-digit year + 5-digit suffix.
///
/// Ordering sorts by year, then suffix, matching the rendered string order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemNo {
    year: u8,
    suffix: u32,
}

impl ItemNo {
    pub fn new(year: u8, suffix: u32) -> DomainResult<Self> {
        if year > 99 {
            return Err(DomainError::invalid_id(format!(
                "item number year tag out of range: {year}"
            )));
        }
        if suffix == 0 || suffix > MAX_SUFFIX {
            return Err(DomainError::invalid_id(format!(
                "item number suffix out of range: {suffix}"
            )));
        }
        Ok(Self { year, suffix })
    }

    /// Two-digit year tag.
    pub fn year(&self) -> u8 {
        self.year
    }

    /// Numeric suffix, 1..=99999.
    pub fn suffix(&self) -> u32 {
        self.suffix
    }
}

impl core::fmt::Display for ItemNo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ITM-{:02}-{:05}", self.year, self.suffix)
    }
}

impl FromStr for ItemNo {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_id(format!("malformed item number: {s:?}"));

        let rest = s.strip_prefix("ITM-").ok_or_else(invalid)?;
        let (year_part, suffix_part) = rest.split_once('-').ok_or_else(invalid)?;

        if year_part.len() != 2 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if suffix_part.len() != 5 || !suffix_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: u8 = year_part.parse().map_err(|_| invalid())?;
        let suffix: u32 = suffix_part.parse().map_err(|_| invalid())?;
        Self::new(year, suffix)
    }
}

impl Serialize for ItemNo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemNo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn renders_zero_padded() {
        let no = ItemNo::new(25, 7).unwrap();
        assert_eq!(no.to_string(), "ITM-25-00007");

        let no = ItemNo::new(5, 99_999).unwrap();
        assert_eq!(no.to_string(), "ITM-05-99999");
    }

    #[test]
    fn parses_canonical_form() {
        let no: ItemNo = "ITM-25-00042".parse().unwrap();
        assert_eq!(no.year(), 25);
        assert_eq!(no.suffix(), 42);
    }

    #[test]
    fn rejects_malformed_strings() {
        for s in [
            "",
            "ITM-25-42",
            "ITM-2025-00042",
            "itm-25-00042",
            "ITM-25-000420",
            "ITM--00042",
            "ITM-25-00000",
            "PO-25-00042",
            "ITM-25-0004x",
        ] {
            assert!(s.parse::<ItemNo>().is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn rejects_out_of_range_parts() {
        assert!(ItemNo::new(100, 1).is_err());
        assert!(ItemNo::new(25, 0).is_err());
        assert!(ItemNo::new(25, MAX_SUFFIX + 1).is_err());
    }

    #[test]
    fn year_tag_is_two_digit() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(year_tag(at), 25);

        let at = Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(year_tag(at), 0);
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(year in 0u8..=99, suffix in 1u32..=MAX_SUFFIX) {
            let no = ItemNo::new(year, suffix).unwrap();
            let parsed: ItemNo = no.to_string().parse().unwrap();
            prop_assert_eq!(no, parsed);
        }

        #[test]
        fn ordering_matches_rendered_order(
            a_year in 0u8..=99, a_suffix in 1u32..=MAX_SUFFIX,
            b_year in 0u8..=99, b_suffix in 1u32..=MAX_SUFFIX,
        ) {
            let a = ItemNo::new(a_year, a_suffix).unwrap();
            let b = ItemNo::new(b_year, b_suffix).unwrap();
            prop_assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
        }
    }

    #[test]
    fn serde_uses_string_form() {
        let no = ItemNo::new(25, 1).unwrap();
        let json = serde_json::to_string(&no).unwrap();
        assert_eq!(json, "\"ITM-25-00001\"");
        let back: ItemNo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, no);
    }
}
