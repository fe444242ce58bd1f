use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui_pickers_core::calendar::Calendar;
use ratatui_pickers_core::calendar::DayCell;
use ratatui_pickers_core::calendar::MonthPosition;
use ratatui_pickers_core::date;

use crate::render;
use crate::theme::Theme;

#[derive(Clone, Debug)]
pub struct CalendarViewOptions {
    /// Columns per day cell, including the gap.
    pub cell_width: u16,
    /// `format_date` pattern for the title row.
    pub title_format: String,
    /// Weekday header length in characters.
    pub weekday_len: usize,
}

impl Default for CalendarViewOptions {
    fn default() -> Self {
        Self {
            cell_width: 3,
            title_format: "MMMM YYYY".to_string(),
            weekday_len: 2,
        }
    }
}

/// Draws a [`Calendar`]: title, weekday header and one row per week.
#[derive(Clone, Debug, Default)]
pub struct CalendarView {
    options: CalendarViewOptions,
}

impl CalendarView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CalendarViewOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CalendarViewOptions {
        &self.options
    }

    /// Width and height the calendar needs for its current month.
    pub fn size(&self, calendar: &Calendar) -> (u16, u16) {
        (
            self.options.cell_width * 7,
            2 + calendar.grid().rows() as u16,
        )
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, calendar: &Calendar, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width.min(self.options.cell_width * 7);
        let locale = calendar.locale();

        let title = date::format_date(
            calendar.view().first_day(),
            &self.options.title_format,
            locale,
        );
        render::render_str_centered(area.x, area.y, width, buf, &title, theme.header);
        if area.height < 2 {
            return;
        }

        let header_y = area.y + 1;
        for (col, weekday) in calendar.engine().weekday_order().into_iter().enumerate() {
            let label = locale.short_weekday(weekday, self.options.weekday_len);
            self.render_cell(area, col, header_y, buf, &label, theme.muted);
        }

        let grid = calendar.grid();
        for (row, week) in grid.weeks().enumerate() {
            let y = header_y + 1 + row as u16;
            if y >= area.bottom() {
                break;
            }
            for (col, cell) in week.iter().enumerate() {
                let style = self.cell_style(cell, calendar, theme);
                self.render_cell(area, col, y, buf, &format!("{:>2}", cell.day()), style);
            }
        }
    }

    fn render_cell(&self, area: Rect, col: usize, y: u16, buf: &mut Buffer, s: &str, style: Style) {
        let x = col as u16 * self.options.cell_width;
        if x >= area.width {
            return;
        }
        let max = (self.options.cell_width.saturating_sub(1)).min(area.width - x);
        render::render_str_clipped(area.x + x, y, max, buf, s, style);
    }

    fn cell_style(&self, cell: &DayCell, calendar: &Calendar, theme: &Theme) -> Style {
        let mut style = if cell.month == MonthPosition::Current {
            theme.text
        } else {
            theme.muted
        };
        if cell.is_disabled {
            style = style.patch(theme.disabled);
        }
        if cell.is_marked {
            style = style.patch(theme.marked);
        }
        if cell.is_current {
            style = style.patch(theme.selected);
        }
        if calendar.focused() == Some(cell.date) {
            style = style.patch(theme.accent);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::style::Modifier;
    use ratatui_pickers_core::calendar::CalendarOptions;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn renders_title_header_and_weeks() {
        let mut cal = Calendar::new(CalendarOptions::default(), d(2024, 2, 1));
        cal.set_value(Some(d(2024, 2, 14)));
        let view = CalendarView::new();
        assert_eq!(view.size(&cal), (21, 7));

        let area = Rect::new(0, 0, 21, 7);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf, &cal, &Theme::default());

        assert_eq!(row(&buf, 0).trim(), "February 2024");
        assert_eq!(row(&buf, 1), "Su Mo Tu We Th Fr Sa ");
        assert_eq!(row(&buf, 2), "28 29 30 31  1  2  3 ");
        assert_eq!(row(&buf, 6), "25 26 27 28 29  1  2 ");

        // 2024-02-14 is the Wednesday of the third week.
        let selected = &buf[(9, 4)];
        assert_eq!(selected.symbol(), "1");
        assert!(selected.modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn week_start_rotates_header() {
        let options = CalendarOptions {
            week_start: 1,
            ..CalendarOptions::default()
        };
        let cal = Calendar::new(options, d(2024, 2, 1));
        let area = Rect::new(0, 0, 21, 3);
        let mut buf = Buffer::empty(area);
        CalendarView::new().render(area, &mut buf, &cal, &Theme::default());
        assert_eq!(row(&buf, 1), "Mo Tu We Th Fr Sa Su ");
        assert_eq!(row(&buf, 2), "29 30 31  1  2  3  4 ");
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let cal = Calendar::new(CalendarOptions::default(), d(2024, 2, 1));
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);
        CalendarView::new().render(area, &mut buf, &cal, &Theme::default());
    }
}
