//! Month calendar with keyboard navigation and form binding.

pub mod grid;
pub mod input_date;
pub mod nav;

use chrono::NaiveDate;

use crate::attrs;
use crate::date;
use crate::date::Locale;
use crate::form::ChangeEvent;
use crate::form::FieldOptions;
use crate::form::FormValue;
use crate::input::InputEvent;
use crate::input::KeyEvent;
use crate::traits::FormValued;
use crate::traits::KeyboardNavigable;
use crate::traits::Labeled;

pub use grid::CalendarGrid;
pub use grid::CalendarGridEngine;
pub use grid::DateConstraints;
pub use grid::DayCell;
pub use grid::GridPos;
pub use grid::MonthPosition;
pub use grid::YearMonth;
pub use nav::CalendarBindings;
pub use nav::CalendarKey;
pub use nav::GridMove;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalendarAction {
    None,
    Redraw,
    FocusMoved(NaiveDate),
    Changed(ChangeEvent),
}

impl CalendarAction {
    /// Whether the host should stop the key event from propagating further.
    pub fn stops_propagation(&self) -> bool {
        matches!(self, CalendarAction::Changed(_))
    }
}

#[derive(Clone, Debug, Default)]
pub struct CalendarOptions {
    /// First column's weekday, Sunday = 0.
    pub week_start: u32,
    pub constraints: DateConstraints,
    pub field: FieldOptions,
    pub locale: Locale,
    pub bindings: CalendarBindings,
}

impl CalendarOptions {
    /// Reads `week-start`, `min`, `max`, `disabled-dates`, `marked-dates`, the locale lists and
    /// the common field attributes.
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        let week_start = attrs
            .get("week-start")
            .and_then(|raw| {
                let parsed = parse_week_start(raw);
                if parsed.is_none() {
                    tracing::warn!(value = %raw, "ignoring invalid week-start");
                }
                parsed
            })
            .unwrap_or(0);

        Self {
            week_start,
            constraints: DateConstraints {
                min: attrs::date_attr(attrs, "min"),
                max: attrs::date_attr(attrs, "max"),
                disabled: attrs
                    .get("disabled-dates")
                    .map(|s| attrs::parse_date_set(s))
                    .unwrap_or_default(),
                marked: attrs
                    .get("marked-dates")
                    .map(|s| attrs::parse_date_set(s))
                    .unwrap_or_default(),
            },
            field: FieldOptions::from_attrs(attrs),
            locale: Locale::from_attrs(attrs),
            bindings: CalendarBindings::default(),
        }
    }
}

/// Accepts `0`..`6` or an English weekday name (`sunday`, `mon`, ...).
pub fn parse_week_start(input: &str) -> Option<u32> {
    let s = input.trim().to_ascii_lowercase();
    if let Ok(n) = s.parse::<u32>() {
        return (n < 7).then_some(n);
    }
    let names = [
        "sunday",
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
    ];
    names
        .iter()
        .position(|name| s.len() >= 3 && name.starts_with(s.as_str()))
        .map(|i| i as u32)
}

/// Single-date calendar.
///
/// The selected value is the grid's active day. Focus is tracked separately so arrow keys can
/// roam without committing a selection.
#[derive(Clone, Debug)]
pub struct Calendar {
    engine: CalendarGridEngine,
    value: Option<NaiveDate>,
    focus: Option<NaiveDate>,
    options: CalendarOptions,
}

impl Calendar {
    /// Opens on `today`'s month.
    pub fn new(options: CalendarOptions, today: NaiveDate) -> Self {
        let engine = CalendarGridEngine::new(YearMonth::of(today))
            .with_week_start(options.week_start)
            .with_constraints(options.constraints.clone());
        Self {
            engine,
            value: None,
            focus: None,
            options,
        }
    }

    /// Builds a calendar from host attributes, including an optional ISO `value`.
    pub fn from_attrs(attrs: &attrs::Attrs, today: NaiveDate) -> Self {
        let mut cal = Self::new(CalendarOptions::from_attrs(attrs), today);
        cal.set_value(attrs::date_attr(attrs, "value"));
        cal
    }

    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub fn engine(&self) -> &CalendarGridEngine {
        &self.engine
    }

    pub fn view(&self) -> YearMonth {
        self.engine.view()
    }

    pub fn grid(&self) -> CalendarGrid {
        self.engine.compute_grid()
    }

    pub fn value(&self) -> Option<NaiveDate> {
        self.value
    }

    pub fn focused(&self) -> Option<NaiveDate> {
        self.focus
    }

    pub fn locale(&self) -> &Locale {
        &self.options.locale
    }

    /// Sets the value without emitting a change, moving the view to its month. Dates outside
    /// the constraints are ignored.
    pub fn set_value(&mut self, value: Option<NaiveDate>) {
        if let Some(date) = value
            && self.engine.constraints().is_disabled(date)
        {
            tracing::warn!(date = %date, "ignoring value outside the date constraints");
            return;
        }
        self.value = value;
        self.engine.set_active(value);
        if let Some(date) = value {
            self.engine.set_view(YearMonth::of(date));
            self.focus = Some(date);
        }
    }

    pub fn set_constraints(&mut self, constraints: DateConstraints) {
        self.options.constraints = constraints.clone();
        self.engine.set_constraints(constraints);
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        !self.options.field.disabled && !self.engine.constraints().is_disabled(date)
    }

    /// Commits `date` as the value. Disabled dates are rejected without a notification.
    pub fn select(&mut self, date: NaiveDate) -> CalendarAction {
        if !self.is_selectable(date) {
            tracing::debug!(date = %date, "ignoring selection of disabled date");
            return CalendarAction::None;
        }
        self.value = Some(date);
        self.focus = Some(date);
        self.engine.set_active(Some(date));
        if !self.engine.view().contains(date) {
            self.engine.set_view(YearMonth::of(date));
        }
        CalendarAction::Changed(ChangeEvent::single(date::to_iso_date(date)))
    }

    pub fn next_month(&mut self) -> CalendarAction {
        self.navigate_month(1)
    }

    pub fn prev_month(&mut self) -> CalendarAction {
        self.navigate_month(-1)
    }

    fn navigate_month(&mut self, delta: i32) -> CalendarAction {
        if !self.engine.navigate_month(delta) {
            return CalendarAction::None;
        }
        let grid = self.engine.compute_grid();
        if self.focus.is_some_and(|f| grid.position_of(f).is_none()) {
            self.focus = None;
        }
        CalendarAction::Redraw
    }

    /// Moves focus to `date` if it is an enabled cell of the current grid.
    pub fn focus_date(&mut self, date: NaiveDate) -> bool {
        let grid = self.engine.compute_grid();
        match grid.position_of(date) {
            Some(pos) if grid.is_enabled(pos) => {
                self.focus = Some(date);
                true
            }
            _ => false,
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> CalendarAction {
        match event {
            InputEvent::Paste(_) => CalendarAction::None,
            InputEvent::Key(key) => self.handle_key(&key),
        }
    }

    /// Where focus starts when nothing is focused yet: the focus or value if visible,
    /// otherwise the first enabled day of the viewed month.
    fn focus_origin(&self, grid: &CalendarGrid) -> Option<GridPos> {
        self.focus
            .or(self.value)
            .and_then(|d| grid.position_of(d))
            .or_else(|| {
                grid.cells()
                    .iter()
                    .find(|c| c.month == MonthPosition::Current && !c.is_disabled)
                    .and_then(|c| grid.position_of(c.date))
            })
    }

    fn on_key(&mut self, key: &KeyEvent) -> CalendarAction {
        let Some(action) = self.options.bindings.action_for(key) else {
            return CalendarAction::None;
        };
        let grid = self.engine.compute_grid();
        let Some(origin) = self.focus_origin(&grid) else {
            return CalendarAction::None;
        };

        match action {
            CalendarKey::Activate => match self.focus.and_then(|_| grid.cell(origin)) {
                Some(cell) if !cell.is_disabled => self.select(cell.date),
                _ => CalendarAction::None,
            },
            CalendarKey::Move(mv) => {
                let target = if self.focus.is_none() && grid.is_enabled(origin) {
                    // The first key press only reveals where focus is.
                    Some(origin)
                } else {
                    nav::step(&grid, origin, mv)
                };
                match target.and_then(|p| grid.cell(p)) {
                    Some(cell) => {
                        self.focus = Some(cell.date);
                        CalendarAction::FocusMoved(cell.date)
                    }
                    None => CalendarAction::None,
                }
            }
        }
    }
}

impl KeyboardNavigable for Calendar {
    type Action = CalendarAction;

    fn handle_key(&mut self, key: &KeyEvent) -> CalendarAction {
        tracing::trace!(?key, "calendar key");
        self.on_key(key)
    }
}

impl FormValued for Calendar {
    fn name(&self) -> Option<&str> {
        self.options.field.name.as_deref()
    }

    fn form_value(&self) -> FormValue {
        FormValue::Single(self.value.map(date::to_iso_date).unwrap_or_default())
    }

    fn is_required(&self) -> bool {
        self.options.field.required
    }
}

impl Labeled for Calendar {
    fn label(&self) -> Option<&str> {
        self.options.field.label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::HiddenField;
    use crate::input::KeyCode;
    use crate::keymap;
    use pretty_assertions::assert_eq;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn attrs(pairs: &[(&str, &str)]) -> attrs::Attrs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn press(cal: &mut Calendar, code: KeyCode) -> CalendarAction {
        cal.handle_key(&keymap::key(code))
    }

    #[test]
    fn from_attrs_reads_bounds_and_value() {
        let cal = Calendar::from_attrs(
            &attrs(&[
                ("name", "due"),
                ("value", "2024-02-12"),
                ("min", "2024-02-05"),
                ("max", "2024-02-20"),
                ("disabled-dates", "2024-02-10, junk"),
                ("week-start", "monday"),
            ]),
            d(6, 1),
        );
        assert_eq!(cal.value(), Some(d(2, 12)));
        assert_eq!(cal.view(), YearMonth::new(2024, 2).unwrap());
        assert_eq!(cal.engine().week_start(), 1);
        assert!(!cal.is_selectable(d(2, 10)));
        assert_eq!(
            cal.hidden_fields(),
            vec![HiddenField {
                name: "due".into(),
                value: "2024-02-12".into()
            }]
        );
    }

    #[test]
    fn select_rejects_disabled_dates() {
        let mut cal = Calendar::from_attrs(&attrs(&[("min", "2024-02-05")]), d(2, 1));
        assert_eq!(cal.select(d(2, 3)), CalendarAction::None);
        assert_eq!(cal.value(), None);
        assert_eq!(
            cal.select(d(2, 6)),
            CalendarAction::Changed(ChangeEvent::single("2024-02-06"))
        );
    }

    #[test]
    fn selecting_overflow_day_moves_view() {
        let mut cal = Calendar::new(CalendarOptions::default(), d(2, 1));
        cal.select(d(3, 2));
        assert_eq!(cal.view(), YearMonth::new(2024, 3).unwrap());
    }

    #[test]
    fn keyboard_focus_then_activate() {
        let mut cal = Calendar::from_attrs(&attrs(&[("disabled-dates", "2024-02-13")]), d(2, 1));
        cal.set_value(Some(d(2, 12)));

        assert_eq!(press(&mut cal, KeyCode::Right), CalendarAction::FocusMoved(d(2, 14)));
        assert_eq!(press(&mut cal, KeyCode::Up), CalendarAction::FocusMoved(d(2, 7)));
        assert_eq!(cal.value(), Some(d(2, 12)));

        let action = press(&mut cal, KeyCode::Enter);
        assert!(action.stops_propagation());
        assert_eq!(action, CalendarAction::Changed(ChangeEvent::single("2024-02-07")));
    }

    #[test]
    fn activate_without_focus_is_ignored() {
        let mut cal = Calendar::new(CalendarOptions::default(), d(2, 1));
        assert_eq!(cal.focused(), None);
        assert_eq!(press(&mut cal, KeyCode::Enter), CalendarAction::None);
        assert_eq!(press(&mut cal, KeyCode::Char(' ')), CalendarAction::None);
        assert_eq!(cal.value(), None);
    }

    #[test]
    fn set_value_ignores_constrained_dates() {
        let mut cal = Calendar::from_attrs(
            &attrs(&[
                ("value", "2024-02-01"),
                ("min", "2024-02-05"),
                ("disabled-dates", "2024-02-10"),
            ]),
            d(2, 1),
        );
        assert_eq!(cal.value(), None);

        cal.set_value(Some(d(2, 10)));
        assert_eq!(cal.value(), None);
        cal.set_value(Some(d(2, 12)));
        assert_eq!(cal.value(), Some(d(2, 12)));
        cal.set_value(None);
        assert_eq!(cal.value(), None);
    }

    #[test]
    fn first_key_reveals_initial_focus() {
        let mut cal = Calendar::from_attrs(&attrs(&[("min", "2024-02-03")]), d(2, 20));
        assert_eq!(press(&mut cal, KeyCode::Down), CalendarAction::FocusMoved(d(2, 3)));
        assert_eq!(press(&mut cal, KeyCode::Down), CalendarAction::FocusMoved(d(2, 10)));
    }

    #[test]
    fn month_navigation_drops_stale_focus() {
        let mut cal = Calendar::new(CalendarOptions::default(), d(2, 1));
        cal.set_value(Some(d(2, 14)));
        assert_eq!(cal.next_month(), CalendarAction::Redraw);
        assert_eq!(cal.focused(), None);
        assert_eq!(cal.prev_month(), CalendarAction::Redraw);
        assert!(cal.focus_date(d(2, 14)));
    }

    #[test]
    fn week_start_parsing() {
        assert_eq!(parse_week_start("1"), Some(1));
        assert_eq!(parse_week_start("7"), None);
        assert_eq!(parse_week_start("Sat"), Some(6));
        assert_eq!(parse_week_start("saturday"), Some(6));
        assert_eq!(parse_week_start("sa"), None);
        assert_eq!(parse_week_start("satx"), None);
    }

    #[test]
    fn required_calendar_is_invalid_until_selected() {
        let mut cal = Calendar::from_attrs(&attrs(&[("required", "")]), d(2, 1));
        assert!(!cal.is_valid());
        cal.select(d(2, 2));
        assert!(cal.is_valid());
    }
}
