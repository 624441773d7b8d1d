use crate::calendar::{MonthCursor, MonthGrid, ScheduleView, MAX_YEAR, MIN_YEAR};
use crate::config::Config;
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::sessions::Session;
use crate::theme::{BASE_STYLE, NO_SESSIONS_STYLE};
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Text},
    widgets::{Block, Paragraph, StatefulWidget, Widget},
    Terminal,
};
use std::fmt::Write as _;
use std::io::{self, Write};
use time::{Date, Duration};

/// Height of the day-detail pane at the bottom of the screen
const DETAIL_LINES: u16 = 9;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct App {
    config: Config,
    sessions: Vec<Session>,
    today: Date,
    cursor: MonthCursor,
    selected: Date,
    state: AppState,
}

impl App {
    pub(crate) fn new(config: Config, sessions: Vec<Session>, today: Date, start: Date) -> App {
        App {
            config,
            sessions,
            today,
            cursor: MonthCursor::for_date(start),
            selected: start,
            state: AppState::Calendar,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_selection(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_selection(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_selection(-7),
                KeyCode::Char('j') | KeyCode::Down => self.move_selection(7),
                KeyCode::Char('w') | KeyCode::PageUp => self.page(-1),
                KeyCode::Char('z') | KeyCode::PageDown => self.page(1),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.jump_to(self.today);
                    true
                }
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c) => match c.to_digit(10) {
                            Some(d) => state.handle_input(JumpToInput::Digit(
                                u8::try_from(d).expect("decimal digit should fit in u8"),
                            )),
                            None => JumpToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(date) => {
                            self.state = AppState::Calendar;
                            self.jump_to(date);
                            true
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    /// Moves the selection by whole days.  The cursor follows the selection
    /// when it crosses a month boundary.
    fn move_selection(&mut self, days: i64) -> bool {
        let Some(date) = self.selected.checked_add(Duration::days(days)) else {
            return false;
        };
        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return false;
        }
        self.selected = date;
        self.cursor = MonthCursor::for_date(date);
        true
    }

    /// Moves the cursor a whole month, keeping the selected day number where
    /// possible and clamping it to the new month's length otherwise.
    fn page(&mut self, delta: i32) -> bool {
        let cursor = self.cursor.advance(delta);
        if cursor == self.cursor {
            return false;
        }
        self.cursor = cursor;
        let day = self.selected.day().min(cursor.last_day().day());
        self.selected = Date::from_calendar_date(cursor.year(), cursor.month(), day)
            .expect("clamped day should exist in the cursor's month");
        true
    }

    fn jump_to(&mut self, date: Date) {
        self.selected = date;
        self.cursor = MonthCursor::for_date(date);
    }

    fn sessions_on(&self, date: Date) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(move |s| s.date() == Some(date))
    }

    fn render_detail(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = self
            .sessions_on(self.selected)
            .map(|s| Line::raw(describe_session(s)))
            .collect::<Vec<_>>();
        if lines.is_empty() {
            lines.push(Line::styled("No sessions scheduled.", NO_SESSIONS_STYLE));
        }
        let title = format!(" {} ({}) ", iso_day(self.selected), self.selected.weekday());
        Paragraph::new(Text::from(lines))
            .block(Block::bordered().title(title))
            .render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [grid_area, detail_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(DETAIL_LINES)]).areas(area);
        let grid = MonthGrid::build(self.cursor, self.config.week_start(), &self.sessions);
        ScheduleView::new(&grid, self.config.header_labels(), self.today, self.selected)
            .render(grid_area, buf);
        self.render_detail(detail_area, buf);
        if self.state == AppState::Helping {
            Help.render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

fn iso_day(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn describe_session(session: &Session) -> String {
    let mut line = String::new();
    if let Some(time) = session.time() {
        let _ = write!(line, "{time}  ");
    }
    line.push_str(session.title());
    for detail in [session.category(), session.location(), session.trainer()]
        .into_iter()
        .flatten()
    {
        let _ = write!(line, " | {detail}");
    }
    if let Some(n) = session.attendees() {
        let _ = write!(line, " | {n} attendees");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sample_app() -> App {
        let sessions = vec![
            Session::sample(1, "Fire Safety Training", "2024-01-15"),
            Session::sample(2, "Road Safety Seminar", "2024-01-17"),
        ];
        let today = date!(2024 - 01 - 15);
        App::new(Config::default(), sessions, today, today)
    }

    #[test]
    fn test_selection_moves_by_day_and_week() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::Right));
        assert_eq!(app.selected, date!(2024 - 01 - 16));
        assert!(app.handle_key(KeyCode::Down));
        assert_eq!(app.selected, date!(2024 - 01 - 23));
        assert!(app.handle_key(KeyCode::Char('h')));
        assert_eq!(app.selected, date!(2024 - 01 - 22));
        assert!(app.handle_key(KeyCode::Char('k')));
        assert_eq!(app.selected, date!(2024 - 01 - 15));
    }

    #[test]
    fn test_selection_crossing_month_edge_moves_cursor() {
        let mut app = sample_app();
        app.jump_to(date!(2024 - 01 - 31));
        assert!(app.handle_key(KeyCode::Right));
        assert_eq!(app.selected, date!(2024 - 02 - 01));
        assert_eq!(app.cursor, MonthCursor::for_date(date!(2024 - 02 - 01)));
    }

    #[test]
    fn test_paging_clamps_selected_day() {
        let mut app = sample_app();
        app.jump_to(date!(2024 - 01 - 31));
        assert!(app.handle_key(KeyCode::PageDown));
        assert_eq!(app.selected, date!(2024 - 02 - 29));
        assert!(app.handle_key(KeyCode::PageUp));
        assert_eq!(app.selected, date!(2024 - 01 - 29));
    }

    #[test]
    fn test_home_returns_to_today() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::PageDown));
        assert!(app.handle_key(KeyCode::Down));
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.selected, date!(2024 - 01 - 15));
        assert_eq!(app.cursor, MonthCursor::for_date(date!(2024 - 01 - 15)));
    }

    #[test]
    fn test_help_dismissed_by_any_key() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Helping);
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_quit() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::Esc));
        assert!(app.quitting());
        assert!(!app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_jump_dialog_moves_selection() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::Char('g')));
        for c in "20240207".chars() {
            assert!(app.handle_key(KeyCode::Char(c)));
        }
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.selected, date!(2024 - 02 - 07));
        assert_eq!(app.cursor, MonthCursor::for_date(date!(2024 - 02 - 07)));
    }

    #[test]
    fn test_jump_dialog_cancelled() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::Char('g')));
        assert!(app.handle_key(KeyCode::Char('2')));
        assert!(app.handle_key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.selected, date!(2024 - 01 - 15));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let mut app = sample_app();
        assert!(!app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.selected, date!(2024 - 01 - 15));
    }

    #[test]
    fn test_sessions_on_selected_day() {
        let app = sample_app();
        let titles = app
            .sessions_on(date!(2024 - 01 - 15))
            .map(Session::title)
            .collect::<Vec<_>>();
        assert_eq!(titles, ["Fire Safety Training"]);
        assert_eq!(app.sessions_on(date!(2024 - 01 - 16)).count(), 0);
    }

    #[test]
    fn test_describe_session() {
        let session = Session::sample(1, "Fire Safety Training", "2024-01-15");
        assert_eq!(describe_session(&session), "Fire Safety Training");
    }

    #[test]
    fn test_iso_day() {
        assert_eq!(iso_day(date!(2024 - 01 - 15)), "2024-01-15");
        assert_eq!(iso_day(date!(0987 - 12 - 03)), "0987-12-03");
    }
}
