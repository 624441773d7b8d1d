use super::grid::{DayCell, MonthGrid};
use crate::theme::{
    BASE_STYLE, OUT_OF_MONTH_STYLE, OVERFLOW_STYLE, SELECTED_STYLE, SESSION_STYLE, TITLE_STYLE,
    TODAY_STYLE, WEEKDAY_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Text,
    widgets::{Paragraph, Widget},
};
use std::iter::zip;
use time::Date;

/// Number of columns per day cell
const CELL_WIDTH: u16 = 11;

const GRID_WIDTH: u16 = CELL_WIDTH * 7;

/// Lines taken up by the month title, the weekday header, and its rule
const HEADER_LINES: u16 = 3;

/// A day cell always gets at least its day-number line plus one session line
const MIN_CELL_LINES: u16 = 2;

const ACS_HLINE: char = '─';
const BULLET: char = '•';

/// Renders a [`MonthGrid`] as a 7-column month view: title, weekday header,
/// and six rows of day cells showing day numbers and session titles.
#[derive(Debug)]
pub(crate) struct ScheduleView<'a> {
    grid: &'a MonthGrid<'a>,
    header_labels: [&'a str; 7],
    today: Date,
    selected: Date,
}

impl<'a> ScheduleView<'a> {
    pub(crate) fn new(
        grid: &'a MonthGrid<'a>,
        header_labels: [&'a str; 7],
        today: Date,
        selected: Date,
    ) -> ScheduleView<'a> {
        ScheduleView {
            grid,
            header_labels,
            today,
            selected,
        }
    }

    fn day_style(&self, cell: &DayCell<'_>) -> Style {
        if cell.date() == self.selected {
            SELECTED_STYLE
        } else if cell.date() == self.today {
            TODAY_STYLE
        } else if cell.in_month() {
            BASE_STYLE
        } else {
            OUT_OF_MONTH_STYLE
        }
    }

    fn draw_cell(
        &self,
        canvas: &mut BufferCanvas<'_>,
        row: u16,
        col: u16,
        cell: &DayCell<'_>,
        cell_lines: u16,
    ) {
        let y = HEADER_LINES + row * cell_lines;
        let x = col * CELL_WIDTH;
        canvas.mvprint(y, x, &day_label(cell, self.today), self.day_style(cell));
        if !cell.in_month() {
            return;
        }
        let width = usize::from(CELL_WIDTH) - 1;
        let session_lines = usize::from(cell_lines - 1);
        let (shown, more) = overflow_split(cell.sessions().len(), session_lines);
        for (i, session) in zip(1u16.., cell.sessions().iter().take(shown)) {
            let label = truncate(&format!("{BULLET} {}", session.title()), width);
            canvas.mvprint(y + i, x, &label, SESSION_STYLE);
        }
        if more > 0 {
            let label = truncate(&format!("+{more} more"), width);
            canvas.mvprint(y + cell_lines - 1, x, &label, OVERFLOW_STYLE);
        }
    }
}

impl Widget for ScheduleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let left = area.width.saturating_sub(GRID_WIDTH) / 2;
        let grid_area = Rect {
            x: area.x + left,
            y: area.y,
            width: GRID_WIDTH.min(area.width),
            height: area.height,
        };
        let cell_lines = (area.height.saturating_sub(HEADER_LINES) / 6).max(MIN_CELL_LINES);
        let mut canvas = BufferCanvas::new(grid_area, buf);
        let title = self.grid.cursor().to_string();
        let title_width = u16::try_from(title.len()).unwrap_or(u16::MAX);
        canvas.mvprint(
            0,
            GRID_WIDTH.saturating_sub(title_width) / 2,
            &title,
            TITLE_STYLE,
        );
        for (col, label) in zip(0u16.., self.header_labels) {
            canvas.mvprint(1, col * CELL_WIDTH + 1, label, WEEKDAY_STYLE);
        }
        canvas.hline(2, 0, ACS_HLINE, GRID_WIDTH);
        for (row, cells) in zip(0u16.., self.grid.rows()) {
            for (col, cell) in zip(0u16.., cells) {
                self.draw_cell(&mut canvas, row, col, cell, cell_lines);
            }
        }
    }
}

fn day_label(cell: &DayCell<'_>, today: Date) -> String {
    if cell.date() == today {
        format!("[{:2}]", cell.day())
    } else {
        format!(" {:2} ", cell.day())
    }
}

/// Splits `count` sessions over `lines` cell lines: how many titles to show,
/// and how many end up behind a "+N more" marker on the last line.
fn overflow_split(count: usize, lines: usize) -> (usize, usize) {
    if count <= lines {
        (count, 0)
    } else {
        (lines - 1, count - (lines - 1))
    }
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

#[derive(Debug)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> BufferCanvas<'a> {
        BufferCanvas { area, buf }
    }

    fn mvprint(&mut self, y: u16, x: u16, s: &str, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s, style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text that would extend beyond the grid's
            // area; the Rect handed to it must stay entirely within the
            // frame lest a panic result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, &String::from(ch).repeat(length.into()), BASE_STYLE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::cursor::MonthCursor;
    use time::macros::date;
    use time::Month::January;
    use time::Weekday::Sunday;

    #[test]
    fn test_overflow_split() {
        assert_eq!(overflow_split(0, 3), (0, 0));
        assert_eq!(overflow_split(2, 3), (2, 0));
        assert_eq!(overflow_split(3, 3), (3, 0));
        assert_eq!(overflow_split(5, 3), (2, 3));
        assert_eq!(overflow_split(4, 1), (0, 4));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Fire Safety Training", 10), "Fire Safet");
        assert_eq!(truncate("Drill", 10), "Drill");
    }

    #[test]
    fn test_render_positions() {
        let grid = MonthGrid::build(MonthCursor::new(2024, January), Sunday, &[]);
        let view = ScheduleView::new(
            &grid,
            ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            date!(2024 - 01 - 15),
            date!(2024 - 01 - 15),
        );
        let area = Rect::new(0, 0, GRID_WIDTH, 15);
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        // Title is centered: "January 2024" is 12 columns wide.
        let title_x = (GRID_WIDTH - 12) / 2;
        assert_eq!(buffer.cell((title_x, 0)).unwrap().symbol(), "J");
        // Weekday header sits one column into each cell.
        assert_eq!(buffer.cell((1, 1)).unwrap().symbol(), "S");
        assert_eq!(buffer.cell((CELL_WIDTH + 1, 1)).unwrap().symbol(), "M");
        // January 1st, 2024 was a Monday: column 0 of the first row holds
        // December 31st, column 1 holds the 1st.
        assert_eq!(buffer.cell((1, 3)).unwrap().symbol(), "3");
        assert_eq!(buffer.cell((2, 3)).unwrap().symbol(), "1");
        assert_eq!(buffer.cell((CELL_WIDTH + 2, 3)).unwrap().symbol(), "1");
    }
}
