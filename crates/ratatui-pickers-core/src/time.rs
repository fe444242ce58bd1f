//! Hour/minute input with optional 12-hour display.

use chrono::NaiveTime;
use chrono::Timelike;

use crate::attrs;
use crate::date;
use crate::form::ChangeEvent;
use crate::form::FieldOptions;
use crate::form::FormValue;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::traits::FormValued;
use crate::traits::KeyboardNavigable;
use crate::traits::Labeled;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeSegment {
    #[default]
    Hour,
    Minute,
    Meridiem,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeAction {
    None,
    Redraw,
    Changed(ChangeEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeInputOptions {
    pub twelve_hour: bool,
    /// Minutes added or removed per Up/Down press, clamped to `1..=30`.
    pub minute_step: u32,
    pub field: FieldOptions,
}

impl Default for TimeInputOptions {
    fn default() -> Self {
        Self {
            twelve_hour: false,
            minute_step: 1,
            field: FieldOptions::default(),
        }
    }
}

impl TimeInputOptions {
    /// Reads `hour-format` (`12` or `24`), `minute-step` and the common field attributes.
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        let twelve_hour = attrs.get("hour-format").map(|s| s.trim()) == Some("12");
        let minute_step = match attrs.get("minute-step") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring invalid minute-step");
                1
            }),
            None => 1,
        };
        Self {
            twelve_hour,
            minute_step: minute_step.clamp(1, 30),
            field: FieldOptions::from_attrs(attrs),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TimeInput {
    value: Option<NaiveTime>,
    segment: TimeSegment,
    options: TimeInputOptions,
}

impl TimeInput {
    pub fn new(options: TimeInputOptions) -> Self {
        Self {
            value: None,
            segment: TimeSegment::Hour,
            options,
        }
    }

    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        let mut input = Self::new(TimeInputOptions::from_attrs(attrs));
        if let Some(raw) = attrs.get("value") {
            input.set_from_str(raw);
        }
        input
    }

    pub fn value(&self) -> Option<NaiveTime> {
        self.value
    }

    pub fn set_value(&mut self, value: Option<NaiveTime>) {
        self.value = value;
    }

    pub fn segment(&self) -> TimeSegment {
        self.segment
    }

    pub fn is_twelve_hour(&self) -> bool {
        self.options.twelve_hour
    }

    /// Hour as displayed: `1..=12` in 12-hour mode, `0..=23` otherwise.
    pub fn display_hour(&self) -> Option<u32> {
        let hour = self.value?.hour();
        if !self.options.twelve_hour {
            return Some(hour);
        }
        Some(match hour % 12 {
            0 => 12,
            h => h,
        })
    }

    pub fn minute(&self) -> Option<u32> {
        self.value.map(|t| t.minute())
    }

    pub fn meridiem(&self) -> Option<Meridiem> {
        self.value
            .map(|t| if t.hour() < 12 { Meridiem::Am } else { Meridiem::Pm })
    }

    /// `HH:MM`, or `--:--` without a value.
    pub fn display(&self) -> String {
        let (Some(hour), Some(minute)) = (self.display_hour(), self.minute()) else {
            return "--:--".to_string();
        };
        match self.meridiem() {
            Some(m) if self.options.twelve_hour => {
                let suffix = if m == Meridiem::Am { "AM" } else { "PM" };
                format!("{hour:02}:{minute:02} {suffix}")
            }
            _ => format!("{hour:02}:{minute:02}"),
        }
    }

    /// Parses `HH:MM`. Invalid input keeps the previous value.
    pub fn set_from_str(&mut self, input: &str) -> TimeAction {
        match date::parse_time(input) {
            Ok(t) => self.commit(t),
            Err(err) => {
                tracing::warn!(%err, "ignoring invalid time");
                TimeAction::None
            }
        }
    }

    /// Sets the hour from 24-hour input (`0..=23`).
    pub fn set_hour(&mut self, hour: u32) -> TimeAction {
        let minute = self.minute().unwrap_or(0);
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(t) => self.commit(t),
            None => TimeAction::None,
        }
    }

    pub fn set_minute(&mut self, minute: u32) -> TimeAction {
        let hour = self.value.map(|t| t.hour()).unwrap_or(0);
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(t) => self.commit(t),
            None => TimeAction::None,
        }
    }

    pub fn toggle_meridiem(&mut self) -> TimeAction {
        let t = self.value.unwrap_or(NaiveTime::MIN);
        self.set_hour((t.hour() + 12) % 24)
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TimeAction {
        match event {
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Paste(text) => self.set_from_str(&text),
        }
    }

    fn commit(&mut self, t: NaiveTime) -> TimeAction {
        if self.value == Some(t) {
            return TimeAction::None;
        }
        self.value = Some(t);
        TimeAction::Changed(ChangeEvent::single(date::to_iso_time(t)))
    }

    fn move_segment(&mut self, forward: bool) -> TimeAction {
        let next = match (self.segment, forward, self.options.twelve_hour) {
            (TimeSegment::Hour, true, _) => TimeSegment::Minute,
            (TimeSegment::Minute, true, true) => TimeSegment::Meridiem,
            (TimeSegment::Minute, false, _) => TimeSegment::Hour,
            (TimeSegment::Meridiem, false, _) => TimeSegment::Minute,
            (s, _, _) => s,
        };
        if next == self.segment {
            return TimeAction::None;
        }
        self.segment = next;
        TimeAction::Redraw
    }

    fn bump(&mut self, up: bool) -> TimeAction {
        let t = self.value.unwrap_or(NaiveTime::MIN);
        match self.segment {
            TimeSegment::Hour => {
                let hour = if up {
                    (t.hour() + 1) % 24
                } else {
                    (t.hour() + 23) % 24
                };
                self.set_hour(hour)
            }
            TimeSegment::Minute => {
                let step = self.options.minute_step.clamp(1, 30);
                let minute = t.minute();
                let next = if up {
                    (minute / step + 1) * step % 60
                } else if minute % step != 0 {
                    minute / step * step
                } else {
                    (minute + 60 - step) % 60
                };
                self.set_minute(next)
            }
            TimeSegment::Meridiem => self.toggle_meridiem(),
        }
    }
}

impl KeyboardNavigable for TimeInput {
    type Action = TimeAction;

    fn handle_key(&mut self, key: &KeyEvent) -> TimeAction {
        match key.code {
            KeyCode::Left => self.move_segment(false),
            KeyCode::Right | KeyCode::Char(':') => self.move_segment(true),
            KeyCode::Up => self.bump(true),
            KeyCode::Down => self.bump(false),
            KeyCode::Char('a' | 'A') if self.options.twelve_hour => match self.meridiem() {
                Some(Meridiem::Pm) => self.toggle_meridiem(),
                _ => TimeAction::None,
            },
            KeyCode::Char('p' | 'P') if self.options.twelve_hour => match self.meridiem() {
                Some(Meridiem::Am) | None => self.toggle_meridiem(),
                _ => TimeAction::None,
            },
            _ => TimeAction::None,
        }
    }
}

impl FormValued for TimeInput {
    fn name(&self) -> Option<&str> {
        self.options.field.name.as_deref()
    }

    fn form_value(&self) -> FormValue {
        FormValue::Single(self.value.map(date::to_iso_time).unwrap_or_default())
    }

    fn is_required(&self) -> bool {
        self.options.field.required
    }
}

impl Labeled for TimeInput {
    fn label(&self) -> Option<&str> {
        self.options.field.label.as_deref()
    }
}
