//! Capability traits implemented by the widget engines.
//!
//! Widgets are assembled by composition: a select owns its option set and selection state, a
//! calendar owns a grid engine. These traits describe what hosts can do with any of them.

use crate::form;
use crate::form::FormValue;
use crate::form::HiddenField;
use crate::input::KeyEvent;

pub trait Labeled {
    fn label(&self) -> Option<&str>;
}

pub trait FormValued {
    fn name(&self) -> Option<&str>;

    fn form_value(&self) -> FormValue;

    fn is_required(&self) -> bool {
        false
    }

    /// Mirrors the current value into hidden form fields. Unnamed widgets submit nothing.
    fn hidden_fields(&self) -> Vec<HiddenField> {
        match self.name() {
            Some(name) => form::hidden_fields(name, &self.form_value()),
            None => Vec::new(),
        }
    }

    fn is_valid(&self) -> bool {
        !self.is_required() || !self.form_value().is_empty()
    }
}

pub trait Filterable {
    fn term(&self) -> &str;

    fn set_term(&mut self, term: &str);
}

pub trait KeyboardNavigable {
    type Action;

    fn handle_key(&mut self, key: &KeyEvent) -> Self::Action;
}
