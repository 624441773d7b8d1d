use std::fmt;
use time::{Date, Month};

/// Years navigable by a cursor.  This is one year inside the range supported
/// by `time::Date`, so that the padding cells of a displayed month (which may
/// reach into the adjacent months) are always representable.
pub(crate) const MIN_YEAR: i32 = -9998;
pub(crate) const MAX_YEAR: i32 = 9998;

/// The (year, month) pair identifying which month's grid is displayed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthCursor {
    year: i32,
    month: Month,
}

impl MonthCursor {
    pub(crate) fn new(year: i32, month: Month) -> MonthCursor {
        MonthCursor {
            year: year.clamp(MIN_YEAR, MAX_YEAR),
            month,
        }
    }

    pub(crate) fn for_date(date: Date) -> MonthCursor {
        MonthCursor::new(date.year(), date.month())
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1)
            .expect("cursor year should be within the navigable range")
    }

    pub(crate) fn last_day(&self) -> Date {
        self.advance(1)
            .first_day()
            .previous_day()
            .expect("the day before a month's first day should exist")
    }

    /// Returns the cursor moved `delta` months forwards (backwards for
    /// negative `delta`), carrying month overflow & underflow into the year.
    /// The result is clamped to the navigable year range.
    pub(crate) fn advance(self, delta: i32) -> MonthCursor {
        let month0 = i64::from(u8::from(self.month)) - 1;
        let total = (i64::from(self.year) * 12 + month0 + i64::from(delta))
            .clamp(i64::from(MIN_YEAR) * 12, i64::from(MAX_YEAR) * 12 + 11);
        let year = i32::try_from(total.div_euclid(12)).expect("clamped year should fit in i32");
        let month = u8::try_from(total.rem_euclid(12) + 1)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .expect("month number should be in 1..=12");
        MonthCursor { year, month }
    }
}

impl fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
