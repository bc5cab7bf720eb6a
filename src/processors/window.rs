use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::error::{ProcessingError, Result};
use crate::models::YearMonth;

/// A validated range of months with caller-chosen bound types.
///
/// Both `< boundary` and `>= boundary` style splits are expressed by picking
/// `Excluded` or `Included` on the relevant side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: Bound<YearMonth>,
    end: Bound<YearMonth>,
}

impl DateWindow {
    pub fn new(start: Bound<YearMonth>, end: Bound<YearMonth>) -> Result<Self> {
        let window = Self { start, end };
        if window.is_empty() {
            return Err(ProcessingError::range(format!(
                "window {} is inverted or empty",
                window
            )));
        }
        Ok(window)
    }

    pub fn unbounded() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Every month at or after `start`.
    pub fn starting_at(start: YearMonth) -> Self {
        Self {
            start: Bound::Included(start),
            end: Bound::Unbounded,
        }
    }

    /// `[start, end)`
    pub fn half_open(start: YearMonth, end: YearMonth) -> Result<Self> {
        Self::new(Bound::Included(start), Bound::Excluded(end))
    }

    /// `[start, end]`
    pub fn closed(start: YearMonth, end: YearMonth) -> Result<Self> {
        Self::new(Bound::Included(start), Bound::Included(end))
    }

    pub fn start(&self) -> Bound<YearMonth> {
        self.start
    }

    pub fn end(&self) -> Bound<YearMonth> {
        self.end
    }

    pub fn contains_month(&self, year_month: &YearMonth) -> bool {
        self.contains(year_month)
    }

    fn is_empty(&self) -> bool {
        // Inclusive equivalents of both bounds make the emptiness test uniform.
        let first = match self.start {
            Bound::Included(ym) => Some(ym),
            Bound::Excluded(ym) => Some(ym.next()),
            Bound::Unbounded => None,
        };
        let last = match self.end {
            Bound::Included(ym) => Some(ym),
            Bound::Excluded(ym) => Some(ym.previous()),
            Bound::Unbounded => None,
        };

        match (first, last) {
            (Some(first), Some(last)) => first > last,
            _ => false,
        }
    }
}

impl RangeBounds<YearMonth> for DateWindow {
    fn start_bound(&self) -> Bound<&YearMonth> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&YearMonth> {
        self.end.as_ref()
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Bound::Included(ym) => write!(f, "[{}", ym)?,
            Bound::Excluded(ym) => write!(f, "({}", ym)?,
            Bound::Unbounded => write!(f, "(-inf")?,
        }
        write!(f, ", ")?;
        match self.end {
            Bound::Included(ym) => write!(f, "{}]", ym),
            Bound::Excluded(ym) => write!(f, "{})", ym),
            Bound::Unbounded => write!(f, "+inf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_inverted_window_is_range_error() {
        let err = DateWindow::closed(ym("1990-01"), ym("1989-12")).unwrap_err();
        assert!(matches!(err, ProcessingError::Range { .. }));
    }

    #[test]
    fn test_empty_half_open_window_is_range_error() {
        assert!(DateWindow::half_open(ym("1990-01"), ym("1990-01")).is_err());
        let open = DateWindow::new(Bound::Excluded(ym("1990-01")), Bound::Excluded(ym("1990-02")));
        assert!(open.is_err());
        assert!(DateWindow::closed(ym("1990-01"), ym("1990-01")).is_ok());
    }

    #[test]
    fn test_contains() {
        let train = DateWindow::half_open(ym("1950-01"), ym("1990-01")).unwrap();
        assert!(train.contains_month(&ym("1950-01")));
        assert!(train.contains_month(&ym("1989-12")));
        assert!(!train.contains_month(&ym("1990-01")));
        assert!(!train.contains_month(&ym("1949-12")));

        let test = DateWindow::starting_at(ym("1990-01"));
        assert!(test.contains_month(&ym("1990-01")));
        assert!(test.contains_month(&ym("2018-12")));
    }

    #[test]
    fn test_display() {
        let window = DateWindow::half_open(ym("1950-01"), ym("1990-01")).unwrap();
        assert_eq!(window.to_string(), "[1950-01, 1990-01)");
        assert_eq!(DateWindow::unbounded().to_string(), "(-inf, +inf)");
    }
}
