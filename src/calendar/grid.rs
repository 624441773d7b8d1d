use super::cursor::MonthCursor;
use crate::sessions::Session;
use std::iter::successors;
use time::{Date, Duration, Weekday};

/// The grid is always six full weeks, however many days the month has.
pub(crate) const GRID_COLUMNS: usize = 7;
pub(crate) const GRID_ROWS: usize = 6;
pub(crate) const GRID_CELLS: usize = GRID_COLUMNS * GRID_ROWS;

/// One cell of the month grid: a concrete calendar day, whether it belongs to
/// the cursor's month, and the sessions scheduled on it (source order).
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DayCell<'a> {
    date: Date,
    in_month: bool,
    sessions: Vec<&'a Session>,
}

impl<'a> DayCell<'a> {
    pub(crate) fn date(&self) -> Date {
        self.date
    }

    pub(crate) fn day(&self) -> u8 {
        self.date.day()
    }

    pub(crate) fn in_month(&self) -> bool {
        self.in_month
    }

    pub(crate) fn sessions(&self) -> &[&'a Session] {
        &self.sessions
    }
}

/// A fully derived view of one month: exactly [`GRID_CELLS`] day cells in
/// row-major order, starting on the configured first weekday of the week.
/// Rebuilt from scratch whenever the cursor, configuration, or session list
/// changes; never mutated in place.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid<'a> {
    cursor: MonthCursor,
    cells: Vec<DayCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Lays out the cursor's month under `week_start` and buckets `sessions`
    /// into its day cells.
    ///
    /// Leading cells are the tail of the previous month, trailing cells the
    /// head of the next, as many of each as it takes to align day 1 under the
    /// right column and fill six weeks.  Padding cells carry a real date but
    /// never any sessions; sessions without a parseable date are in no cell
    /// at all.
    pub(crate) fn build(
        cursor: MonthCursor,
        week_start: Weekday,
        sessions: &'a [Session],
    ) -> MonthGrid<'a> {
        let first = cursor.first_day();
        let leading = (first.weekday().number_days_from_sunday() + 7
            - week_start.number_days_from_sunday())
            % 7;
        let start = first
            .checked_sub(Duration::days(i64::from(leading)))
            .expect("the navigable year range should leave room for leading cells");
        let cells = successors(Some(start), |&d| d.next_day())
            .take(GRID_CELLS)
            .map(|date| {
                let in_month = date.year() == cursor.year() && date.month() == cursor.month();
                let bucket = if in_month {
                    sessions.iter().filter(|s| s.date() == Some(date)).collect()
                } else {
                    Vec::new()
                };
                DayCell {
                    date,
                    in_month,
                    sessions: bucket,
                }
            })
            .collect::<Vec<_>>();
        debug_assert_eq!(cells.len(), GRID_CELLS, "grid should always be six weeks");
        MonthGrid { cursor, cells }
    }

    pub(crate) fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub(crate) fn cells(&self) -> &[DayCell<'a>] {
        &self.cells
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[DayCell<'a>]> {
        self.cells.chunks(GRID_COLUMNS)
    }
}
