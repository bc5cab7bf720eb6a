use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// A calendar month, the join and grouping key of every series.
///
/// Ordering is chronological. The textual form is always `YYYY-MM`, so the
/// lexicographic order of the strings and the order of the values agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub const MIN_YEAR: i32 = 0;
    pub const MAX_YEAR: i32 = 9999;

    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(ProcessingError::InvalidYearMonth(format!(
                "{}-{}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    /// January of the given year.
    pub fn january(year: i32) -> Result<Self> {
        Self::new(year, 1)
    }

    /// December of the given year.
    pub fn december(year: i32) -> Result<Self> {
        Self::new(year, 12)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: &YearMonth) -> i64 {
        (other.year as i64 - self.year as i64) * 12 + (other.month as i64 - self.month as i64)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Every month from `self` to `end` inclusive; empty when `end` precedes `self`.
    pub fn range_inclusive(self, end: YearMonth) -> impl Iterator<Item = YearMonth> {
        let count = self.months_until(&end).max(-1) + 1;
        std::iter::successors(Some(self), |ym| Some(ym.next())).take(count as usize)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ProcessingError::InvalidYearMonth(s.to_string());

        let (year_part, month_part) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4
            || month_part.len() != 2
            || !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year = year_part.parse::<i32>().map_err(|_| invalid())?;
        let month = month_part.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "1950-01".parse().unwrap();
        assert_eq!(ym.year(), 1950);
        assert_eq!(ym.month(), 1);
        assert_eq!(ym.to_string(), "1950-01");
        assert_eq!(YearMonth::new(812, 7).unwrap().to_string(), "0812-07");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        let malformed = [
            "1950-1", "1950/01", "1950-01-15", "1950-13", "1950-00", "50-01", "", "abcd-ef",
        ];
        for bad in malformed {
            assert!(bad.parse::<YearMonth>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let a: YearMonth = "1989-12".parse().unwrap();
        let b: YearMonth = "1990-01".parse().unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_month_arithmetic() {
        let dec: YearMonth = "1999-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2000-01");
        assert_eq!(dec.next().previous(), dec);
        assert_eq!(dec.months_until(&"2001-02".parse().unwrap()), 14);
        assert_eq!(dec.months_until(&"1999-01".parse().unwrap()), -11);
    }

    #[test]
    fn test_range_inclusive() {
        let start = YearMonth::january(1950).unwrap();
        let end = YearMonth::december(1950).unwrap();
        let months: Vec<_> = start.range_inclusive(end).collect();
        assert_eq!(months.len(), 12);
        assert_eq!(months[11], end);
        assert_eq!(end.range_inclusive(start).count(), 0);
    }

    #[test]
    fn test_date_conversion() {
        let date = NaiveDate::from_ymd_opt(1972, 6, 18).unwrap();
        let ym = YearMonth::from_date(date);
        assert_eq!(ym.to_string(), "1972-06");
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(1972, 6, 1));
    }

    #[test]
    fn test_serde_round_trip_as_string() {
        let ym: YearMonth = "2019-03".parse().unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2019-03\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
