//! Text field bound to a calendar popover.

use chrono::NaiveDate;
use chrono::NaiveTime;

use crate::attrs;
use crate::calendar::Calendar;
use crate::calendar::CalendarAction;
use crate::calendar::CalendarOptions;
use crate::date;
use crate::form::ChangeEvent;
use crate::form::FormValue;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::traits::FormValued;
use crate::traits::KeyboardNavigable;
use crate::traits::Labeled;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputDateMode {
    #[default]
    Date,
    /// Value carries a time of day: `YYYY-MM-DDTHH:MM`.
    DateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputDateAction {
    None,
    Redraw,
    Opened,
    Closed,
    Changed(ChangeEvent),
}

#[derive(Clone, Debug)]
pub struct InputDateOptions {
    pub mode: InputDateMode,
    /// [`date::format_date`] pattern for [`InputDate::display_text`].
    pub display_format: String,
    pub calendar: CalendarOptions,
}

impl Default for InputDateOptions {
    fn default() -> Self {
        Self {
            mode: InputDateMode::Date,
            display_format: "YYYY-MM-DD".to_string(),
            calendar: CalendarOptions::default(),
        }
    }
}

impl InputDateOptions {
    /// Reads `type` (`date` or `datetime-local`), `format` and the calendar attributes.
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        let mode = match attrs.get("type").map(|s| s.trim()) {
            Some("datetime-local" | "datetime") => InputDateMode::DateTime,
            _ => InputDateMode::Date,
        };
        Self {
            mode,
            display_format: attrs::string_attr(attrs, "format")
                .unwrap_or_else(|| "YYYY-MM-DD".to_string()),
            calendar: CalendarOptions::from_attrs(attrs),
        }
    }
}

/// Typed text is the source of truth while editing; the calendar mirrors every valid entry.
#[derive(Clone, Debug)]
pub struct InputDate {
    calendar: Calendar,
    time: NaiveTime,
    text: String,
    open: bool,
    mode: InputDateMode,
    display_format: String,
}

impl InputDate {
    pub fn new(options: InputDateOptions, today: NaiveDate) -> Self {
        Self {
            calendar: Calendar::new(options.calendar, today),
            time: NaiveTime::MIN,
            text: String::new(),
            open: false,
            mode: options.mode,
            display_format: options.display_format,
        }
    }

    pub fn from_attrs(attrs: &attrs::Attrs, today: NaiveDate) -> Self {
        let mut input = Self::new(InputDateOptions::from_attrs(attrs), today);
        if let Some(raw) = attrs.get("value") {
            input.set_text(raw);
        }
        input
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> InputDateMode {
        self.mode
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// The committed value in ISO form, empty when unset.
    pub fn value_string(&self) -> String {
        match (self.calendar.value(), self.mode) {
            (None, _) => String::new(),
            (Some(d), InputDateMode::Date) => date::to_iso_date(d),
            (Some(d), InputDateMode::DateTime) => date::to_iso_datetime(d.and_time(self.time)),
        }
    }

    /// The committed date rendered with the configured display pattern.
    pub fn display_text(&self) -> String {
        self.calendar
            .value()
            .map(|d| date::format_date(d, &self.display_format, self.calendar.locale()))
            .unwrap_or_default()
    }

    pub fn open(&mut self) -> InputDateAction {
        if self.open || self.calendar.options().field.disabled {
            return InputDateAction::None;
        }
        self.open = true;
        InputDateAction::Opened
    }

    pub fn close(&mut self) -> InputDateAction {
        if !self.open {
            return InputDateAction::None;
        }
        self.open = false;
        InputDateAction::Closed
    }

    pub fn toggle(&mut self) -> InputDateAction {
        if self.open { self.close() } else { self.open() }
    }

    /// Replaces the text and commits it when it parses to an enabled date.
    ///
    /// Unparseable or disabled input only updates the text; the previous value stays.
    pub fn set_text(&mut self, text: &str) -> InputDateAction {
        self.text = text.to_string();
        if text.trim().is_empty() {
            if self.calendar.value().is_none() {
                return InputDateAction::Redraw;
            }
            self.calendar.set_value(None);
            return InputDateAction::Changed(ChangeEvent::single(String::new()));
        }

        let parsed = match self.mode {
            InputDateMode::Date => date::parse_date(text).map(|d| (d, self.time)),
            InputDateMode::DateTime => date::parse_datetime(text).map(|dt| (dt.date(), dt.time())),
        };
        let (day, time) = match parsed {
            Ok(v) => v,
            Err(err) => {
                tracing::debug!(%err, "keeping previous date value");
                return InputDateAction::Redraw;
            }
        };
        if !self.calendar.is_selectable(day) {
            tracing::debug!(date = %day, "typed date is disabled");
            return InputDateAction::Redraw;
        }
        if self.calendar.value() == Some(day) && self.time == time {
            return InputDateAction::Redraw;
        }
        self.time = time;
        self.calendar.set_value(Some(day));
        InputDateAction::Changed(ChangeEvent::single(self.value_string()))
    }

    /// Updates the time part in date-time mode.
    pub fn set_time(&mut self, time: NaiveTime) -> InputDateAction {
        if self.mode != InputDateMode::DateTime || self.time == time {
            return InputDateAction::None;
        }
        self.time = time;
        if self.calendar.value().is_none() {
            return InputDateAction::Redraw;
        }
        self.text = self.value_string();
        InputDateAction::Changed(ChangeEvent::single(self.value_string()))
    }

    pub fn next_month(&mut self) -> InputDateAction {
        from_calendar(self.calendar.next_month())
    }

    pub fn prev_month(&mut self) -> InputDateAction {
        from_calendar(self.calendar.prev_month())
    }

    pub fn handle_event(&mut self, event: InputEvent) -> InputDateAction {
        match event {
            InputEvent::Paste(s) => {
                let text = format!("{}{}", self.text, s);
                self.set_text(&text)
            }
            InputEvent::Key(key) => self.handle_key(&key),
        }
    }

    fn on_key(&mut self, key: &KeyEvent) -> InputDateAction {
        if self.open {
            if key.code == KeyCode::Esc {
                return self.close();
            }
            if let Some(action) = self.calendar.options().bindings.action_for(key) {
                tracing::trace!(?action, "forwarding key to calendar");
                return match self.calendar.handle_key(key) {
                    CalendarAction::Changed(_) => {
                        self.text = self.value_string();
                        self.open = false;
                        InputDateAction::Changed(ChangeEvent::single(self.value_string()))
                    }
                    other => from_calendar(other),
                };
            }
        } else if matches!(key.code, KeyCode::Down) && key.modifiers.is_none() {
            return self.open();
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.ctrl && !key.modifiers.alt => {
                let mut text = self.text.clone();
                text.push(c);
                self.set_text(&text)
            }
            KeyCode::Backspace => {
                let mut text = self.text.clone();
                if text.pop().is_none() {
                    return InputDateAction::None;
                }
                self.set_text(&text)
            }
            _ => InputDateAction::None,
        }
    }
}

fn from_calendar(action: CalendarAction) -> InputDateAction {
    match action {
        CalendarAction::None => InputDateAction::None,
        CalendarAction::Redraw | CalendarAction::FocusMoved(_) => InputDateAction::Redraw,
        CalendarAction::Changed(ev) => InputDateAction::Changed(ev),
    }
}

impl KeyboardNavigable for InputDate {
    type Action = InputDateAction;

    fn handle_key(&mut self, key: &KeyEvent) -> InputDateAction {
        self.on_key(key)
    }
}

impl FormValued for InputDate {
    fn name(&self) -> Option<&str> {
        self.calendar.name()
    }

    fn form_value(&self) -> FormValue {
        FormValue::Single(self.value_string())
    }

    fn is_required(&self) -> bool {
        self.calendar.is_required()
    }
}

impl Labeled for InputDate {
    fn label(&self) -> Option<&str> {
        self.calendar.label()
    }
}
