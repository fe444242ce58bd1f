use std::collections::BTreeSet;

use chrono::Datelike;
use chrono::Days;
use chrono::Months;
use chrono::NaiveDate;

use crate::date;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// `month` is 1-based.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A calendar month, stored as its first day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.0
            .with_day(self.days_in_month())
            .unwrap_or(self.0)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Moves by `delta` months, rolling the year over. `None` past chrono's date range.
    pub fn add_months(&self, delta: i32) -> Option<Self> {
        let months = Months::new(delta.unsigned_abs());
        let moved = if delta >= 0 {
            self.0.checked_add_months(months)
        } else {
            self.0.checked_sub_months(months)
        };
        moved.map(Self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthPosition {
    Prev,
    Current,
    Next,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub month: MonthPosition,
    pub is_current: bool,
    pub is_disabled: bool,
    pub is_marked: bool,
}

impl DayCell {
    /// Day of month, 1..=31.
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn iso_date(&self) -> String {
        date::to_iso_date(self.date)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Consecutive days laid out in rows of seven.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarGrid {
    cells: Vec<DayCell>,
}

impl CalendarGrid {
    pub fn rows(&self) -> usize {
        self.cells.len() / 7
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks_exact(7)
    }

    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub fn cell(&self, pos: GridPos) -> Option<&DayCell> {
        if pos.col >= 7 {
            return None;
        }
        self.cells.get(pos.row * 7 + pos.col)
    }

    pub fn is_enabled(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(|c| !c.is_disabled)
    }

    pub fn position_of(&self, date: NaiveDate) -> Option<GridPos> {
        self.cells
            .iter()
            .position(|c| c.date == date)
            .map(|i| GridPos::new(i / 7, i % 7))
    }
}

/// Date bounds plus the explicit disabled and marked sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DateConstraints {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    pub disabled: BTreeSet<NaiveDate>,
    pub marked: BTreeSet<NaiveDate>,
}

impl DateConstraints {
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        self.disabled.contains(&date)
            || self.min.is_some_and(|min| date < min)
            || self.max.is_some_and(|max| date > max)
    }

    pub fn is_marked(&self, date: NaiveDate) -> bool {
        self.marked.contains(&date)
    }

    /// Whether any day of `month` lies within `[min, max]`.
    pub fn month_in_range(&self, month: YearMonth) -> bool {
        !(self.min.is_some_and(|min| month.last_day() < min)
            || self.max.is_some_and(|max| month.first_day() > max))
    }
}

/// Computes month grids and tracks the month being viewed.
#[derive(Clone, Debug)]
pub struct CalendarGridEngine {
    view: YearMonth,
    week_start: u32,
    constraints: DateConstraints,
    active: Option<NaiveDate>,
}

impl CalendarGridEngine {
    pub fn new(view: YearMonth) -> Self {
        Self {
            view,
            week_start: 0,
            constraints: DateConstraints::default(),
            active: None,
        }
    }

    /// `week_start` counts from Sunday = 0 and is taken modulo 7.
    pub fn with_week_start(mut self, week_start: u32) -> Self {
        self.week_start = week_start % 7;
        self
    }

    pub fn with_constraints(mut self, constraints: DateConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn view(&self) -> YearMonth {
        self.view
    }

    pub fn week_start(&self) -> u32 {
        self.week_start
    }

    pub fn constraints(&self) -> &DateConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: DateConstraints) {
        self.constraints = constraints;
    }

    pub fn active(&self) -> Option<NaiveDate> {
        self.active
    }

    pub fn set_active(&mut self, active: Option<NaiveDate>) {
        self.active = active;
    }

    /// Jumps to `month`. Rejected when the whole month is out of bounds.
    pub fn set_view(&mut self, month: YearMonth) -> bool {
        if !self.constraints.month_in_range(month) {
            tracing::debug!(year = month.year(), month = month.month(), "view outside bounds");
            return false;
        }
        self.view = month;
        true
    }

    /// Moves the view by `delta` months. Returns `false` (and keeps the view) when the target
    /// month is entirely outside `[min, max]`.
    pub fn navigate_month(&mut self, delta: i32) -> bool {
        match self.view.add_months(delta) {
            Some(target) => self.set_view(target),
            None => false,
        }
    }

    /// Weekday numbers (Sunday = 0) in column order.
    pub fn weekday_order(&self) -> [u32; 7] {
        std::array::from_fn(|i| (self.week_start + i as u32) % 7)
    }

    /// Column of the first day of the viewed month.
    pub fn starting_offset(&self) -> u32 {
        let weekday = self.view.first_day().weekday().num_days_from_sunday();
        (weekday + 7 - self.week_start) % 7
    }

    /// Builds the grid: previous-month overflow, the whole month, then next-month days until
    /// the last week is full. No row consists solely of next-month days.
    pub fn compute_grid(&self) -> CalendarGrid {
        let offset = self.starting_offset();
        let first = self.view.first_day();
        let start = first
            .checked_sub_days(Days::new(offset as u64))
            .unwrap_or(first);
        let total = (offset + self.view.days_in_month()).div_ceil(7) * 7;

        let cells = start
            .iter_days()
            .take(total as usize)
            .map(|date| {
                let month = match YearMonth::of(date).cmp(&self.view) {
                    std::cmp::Ordering::Less => MonthPosition::Prev,
                    std::cmp::Ordering::Equal => MonthPosition::Current,
                    std::cmp::Ordering::Greater => MonthPosition::Next,
                };
                DayCell {
                    date,
                    is_current: month == MonthPosition::Current && self.active == Some(date),
                    is_disabled: self.constraints.is_disabled(date),
                    is_marked: self.constraints.is_marked(date),
                    month,
                }
            })
            .collect();

        CalendarGrid { cells }
    }
}
