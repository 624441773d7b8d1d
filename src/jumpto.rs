use crate::calendar::MAX_YEAR;
use crate::theme::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::{Date, Month};

/// YYYYMMDD
const DIGITS: usize = 8;

/// Placeholder character for each yet-unfilled digit cell
const FALLBACKS: [&str; DIGITS] = ["Y", "Y", "Y", "Y", "M", "M", "D", "D"];

const OUTER_WIDTH: u16 = 16;
const OUTER_HEIGHT: u16 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * ................
     * .┌─ Jump To… ─┐.
     * .│            │.
     * .│ YYYY-MM-DD │.
     * .│            │.
     * .│  [ENTER]   │.
     * .└────────────┘.
     * ................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Jump To… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    digits: [Option<u8>; DIGITS],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line rather than creating a
            // styled line directly so that only the "[ENTER]" text and not
            // any of its centering padding will be underlined:
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == DIGITS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (dg, fallback)) in std::iter::zip(self.digits, FALLBACKS).enumerate() {
            if i == 4 || i == 6 {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(format!("{d}"), BASE_STYLE),
                None => Span::styled(fallback, UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    fn field(&self, start: usize, len: usize) -> i32 {
        self.digits[start..start + len]
            .iter()
            .fold(0, |acc, dg| acc * 10 + i32::from(dg.expect("digit should be set")))
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Digit(d), pos) if pos < DIGITS => {
                self.digits[pos] = Some(d);
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, DIGITS) => {
                let year = self.field(0, 4);
                if year > MAX_YEAR {
                    return JumpToOutput::Invalid;
                }
                let Ok(month) = u8::try_from(self.field(4, 2)) else {
                    return JumpToOutput::Invalid;
                };
                let Ok(month) = Month::try_from(month) else {
                    return JumpToOutput::Invalid;
                };
                let Ok(day) = u8::try_from(self.field(6, 2)) else {
                    return JumpToOutput::Invalid;
                };
                match Date::from_calendar_date(year, month, day) {
                    Ok(date) => JumpToOutput::Jump(date),
                    Err(_) => JumpToOutput::Invalid,
                }
            }
            _ => JumpToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(Date),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_digits(state: &mut JumpToState, digits: &str) {
        for ch in digits.chars() {
            let d = u8::try_from(ch.to_digit(10).unwrap()).unwrap();
            assert_eq!(state.handle_input(JumpToInput::Digit(d)), JumpToOutput::Ok);
        }
    }

    #[test]
    fn test_full_entry_jumps() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20240115");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(date!(2024 - 01 - 15))
        );
    }

    #[test]
    fn test_enter_before_complete_is_invalid() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "2024");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Invalid
        );
    }

    #[test]
    fn test_digit_after_complete_is_invalid() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20240115");
        assert_eq!(
            state.handle_input(JumpToInput::Digit(9)),
            JumpToOutput::Invalid
        );
    }

    #[test]
    fn test_backspace_reopens_entry() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20240115");
        assert_eq!(
            state.handle_input(JumpToInput::Backspace),
            JumpToOutput::Ok
        );
        type_digits(&mut state, "7");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(date!(2024 - 01 - 17))
        );
    }

    #[test]
    fn test_backspace_on_empty_is_invalid() {
        let mut state = JumpToState::new();
        assert_eq!(
            state.handle_input(JumpToInput::Backspace),
            JumpToOutput::Invalid
        );
    }

    #[test]
    fn test_bad_month_is_invalid() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20241301");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Invalid
        );
    }

    #[test]
    fn test_bad_day_is_invalid() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20240230");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Invalid
        );
    }

    #[test]
    fn test_year_beyond_navigable_range_is_invalid() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "99991231");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Invalid
        );
    }
}
