mod cursor;
mod grid;
mod widget;
pub(crate) use self::cursor::{MonthCursor, MAX_YEAR, MIN_YEAR};
pub(crate) use self::grid::MonthGrid;
pub(crate) use self::widget::ScheduleView;
