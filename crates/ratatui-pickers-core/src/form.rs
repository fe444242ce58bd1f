//! Form values, change notifications and hidden-field mirroring.
//!
//! Every stateful widget mirrors its value into hidden fields named after its `name`, so a
//! surrounding form submission carries the value without custom logic.

use serde::Serialize;

use crate::attrs;

/// The externally visible value of a widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FormValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Single(v) => v.is_empty(),
            FormValue::Multiple(v) => v.is_empty(),
        }
    }
}

impl Default for FormValue {
    fn default() -> Self {
        FormValue::Single(String::new())
    }
}

/// Emitted once per value change. Serializes as `{"value": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub value: FormValue,
}

impl ChangeEvent {
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            value: FormValue::Single(value.into()),
        }
    }

    pub fn multiple(values: Vec<String>) -> Self {
        Self {
            value: FormValue::Multiple(values),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "value": self.value }).to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

/// Expands a value into the hidden fields a native form would submit.
///
/// Array values use the `name[]` convention, one field per entry.
pub fn hidden_fields(name: &str, value: &FormValue) -> Vec<HiddenField> {
    match value {
        FormValue::Single(v) => vec![HiddenField {
            name: name.to_string(),
            value: v.clone(),
        }],
        FormValue::Multiple(values) => values
            .iter()
            .map(|v| HiddenField {
                name: format!("{name}[]"),
                value: v.clone(),
            })
            .collect(),
    }
}

/// Options shared by every form-bound widget.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldOptions {
    pub name: Option<String>,
    pub label: Option<String>,
    pub required: bool,
    pub disabled: bool,
}

impl FieldOptions {
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        Self {
            name: attrs::string_attr(attrs, "name"),
            label: attrs::string_attr(attrs, "label"),
            required: attrs::flag_attr(attrs, "required"),
            disabled: attrs::flag_attr(attrs, "disabled"),
        }
    }
}
