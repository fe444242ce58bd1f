//! Grouped option model parsed from a native `<select>`-like source.
//!
//! The source is a snapshot the host hands over ([`OptionSource`]). Parsing is a pure function
//! of that snapshot: parsing the same snapshot twice yields equal [`OptionGrouped`] values.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::attrs;
use crate::error::ParseError;

/// Group key for items that are not inside a group.
pub const UNGROUPED: &str = "__";

/// Data keys that are interpreted rather than copied into [`OptionData::attrs`].
pub const RESERVED_DATA_KEYS: &[&str] = &["keywords"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionData {
    /// Search keywords. Always starts with the option's value.
    pub keywords: Vec<String>,
    /// Custom `data-*` attributes, minus [`RESERVED_DATA_KEYS`].
    pub attrs: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionItem {
    pub group: String,
    pub value: String,
    pub text: String,
    pub disabled: bool,
    pub selected: bool,
    pub data: OptionData,
}

impl OptionItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            group: UNGROUPED.to_string(),
            text: text.into(),
            disabled: false,
            selected: false,
            data: OptionData {
                keywords: vec![value.clone()],
                attrs: BTreeMap::new(),
            },
            value,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.keywords = keyword_set(&self.value, keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if !RESERVED_DATA_KEYS.contains(&key.as_str()) {
            self.data.attrs.insert(key, value.into());
        }
        self
    }

    /// Case-insensitive substring match of `term` against the keyword set.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.data
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&needle))
    }

    /// Validates a remote-insert response body.
    ///
    /// `group`, `value`, `text`, `disabled`, `selected` and `data.keywords` are required.
    /// Unknown fields are ignored, as are custom data values that are not strings.
    pub fn from_insert_payload(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Payload {
            group: String,
            value: String,
            text: String,
            disabled: bool,
            selected: bool,
            data: PayloadData,
        }

        #[derive(Deserialize)]
        struct PayloadData {
            keywords: Vec<String>,
            #[serde(flatten)]
            extra: BTreeMap<String, Value>,
        }

        let p: Payload = serde_json::from_str(body)?;
        let attrs = p
            .data
            .extra
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect();
        Ok(Self {
            data: OptionData {
                keywords: keyword_set(&p.value, p.data.keywords),
                attrs,
            },
            group: p.group,
            value: p.value,
            text: p.text,
            disabled: p.disabled,
            selected: p.selected,
        })
    }
}

fn keyword_set(value: &str, extra: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out = vec![value.to_string()];
    for k in extra {
        if !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionGroup {
    pub text: String,
    pub options: Vec<OptionItem>,
    pub data: BTreeMap<String, String>,
}

/// Options keyed by group, in source encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionGrouped {
    groups: IndexMap<String, OptionGroup>,
}

impl OptionGrouped {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|g| g.options.is_empty())
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.options.len()).sum()
    }

    pub fn group(&self, key: &str) -> Option<&OptionGroup> {
        self.groups.get(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &OptionGroup)> {
        self.groups.iter().map(|(k, g)| (k.as_str(), g))
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &OptionItem> {
        self.groups.values().flat_map(|g| g.options.iter())
    }

    pub fn find(&self, value: &str) -> Option<&OptionItem> {
        self.items().find(|i| i.value == value)
    }

    /// Values flagged `selected` in the source, in source order.
    pub fn selected_values(&self) -> Vec<String> {
        self.items()
            .filter(|i| i.selected)
            .map(|i| i.value.clone())
            .collect()
    }

    /// Appends `item` to its group, creating the group when needed.
    pub fn insert(&mut self, item: OptionItem) {
        let text = if item.group == UNGROUPED {
            String::new()
        } else {
            item.group.clone()
        };
        self.groups
            .entry(item.group.clone())
            .or_insert_with(|| OptionGroup {
                text,
                ..OptionGroup::default()
            })
            .options
            .push(item);
    }

    /// Groups whose items match `term`, keeping only the matching items.
    ///
    /// An empty term returns every group unchanged.
    pub fn filter(&self, term: &str) -> OptionGrouped {
        if term.is_empty() {
            return self.clone();
        }
        let groups = self
            .groups
            .iter()
            .filter_map(|(key, group)| {
                let options: Vec<OptionItem> = group
                    .options
                    .iter()
                    .filter(|i| i.matches(term))
                    .cloned()
                    .collect();
                if options.is_empty() {
                    return None;
                }
                Some((
                    key.clone(),
                    OptionGroup {
                        text: group.text.clone(),
                        options,
                        data: group.data.clone(),
                    },
                ))
            })
            .collect();
        OptionGrouped { groups }
    }
}

impl FromIterator<OptionItem> for OptionGrouped {
    fn from_iter<T: IntoIterator<Item = OptionItem>>(iter: T) -> Self {
        let mut out = OptionGrouped::new();
        for item in iter {
            out.insert(item);
        }
        out
    }
}

/// A plain option element in the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceItem {
    /// The explicit `value` attribute, if present.
    pub value: Option<String>,
    pub text: String,
    pub disabled: bool,
    pub selected: bool,
    /// `data-*` attributes without the `data-` prefix.
    pub data: BTreeMap<String, String>,
}

impl SourceItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// A group container (`<optgroup>`) in the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceGroup {
    pub label: String,
    pub disabled: bool,
    pub data: BTreeMap<String, String>,
    pub items: Vec<SourceItem>,
}

impl SourceGroup {
    pub fn new(label: impl Into<String>, items: Vec<SourceItem>) -> Self {
        Self {
            label: label.into(),
            items,
            ..Self::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceNode {
    Group(SourceGroup),
    Item(SourceItem),
}

/// Snapshot of a native grouped-option element, children in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSource {
    pub nodes: Vec<SourceNode>,
}

impl OptionSource {
    pub fn new(nodes: Vec<SourceNode>) -> Self {
        Self { nodes }
    }

    /// Parses the snapshot: groups first in document order, then ungrouped items under
    /// [`UNGROUPED`].
    pub fn parse(&self) -> OptionGrouped {
        let mut out = OptionGrouped::new();

        for node in &self.nodes {
            let SourceNode::Group(group) = node else {
                continue;
            };
            let entry = out
                .groups
                .entry(group.label.clone())
                .or_insert_with(|| OptionGroup {
                    text: group.label.clone(),
                    options: Vec::new(),
                    data: group.data.clone(),
                });
            for item in &group.items {
                entry
                    .options
                    .push(parse_item(item, &group.label, group.disabled));
            }
        }

        for node in &self.nodes {
            if let SourceNode::Item(item) = node {
                out.insert(parse_item(item, UNGROUPED, false));
            }
        }

        out
    }
}

fn parse_item(item: &SourceItem, group: &str, group_disabled: bool) -> OptionItem {
    let value = match &item.value {
        Some(v) => v.clone(),
        None => item.text.trim().to_string(),
    };
    let extra = item
        .data
        .get("keywords")
        .map(|k| attrs::parse_list(k))
        .unwrap_or_default();
    let attrs = item
        .data
        .iter()
        .filter(|(k, _)| !RESERVED_DATA_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    OptionItem {
        group: group.to_string(),
        text: item.text.trim().to_string(),
        disabled: item.disabled || group_disabled,
        selected: item.selected,
        data: OptionData {
            keywords: keyword_set(&value, extra),
            attrs,
        },
        value,
    }
}

/// Parses the JSON option-list attribute form.
///
/// Expects an array of `{value, text?, group?, disabled?, selected?, keywords?}`. Missing text
/// falls back to the value; `keywords` may be an array or a comma list.
pub fn parse_options_json(input: &str) -> Result<OptionGrouped, ParseError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        List(Vec<String>),
        Csv(String),
    }

    #[derive(Deserialize)]
    struct Entry {
        value: String,
        text: Option<String>,
        group: Option<String>,
        #[serde(default)]
        disabled: bool,
        #[serde(default)]
        selected: bool,
        keywords: Option<Keywords>,
    }

    let entries: Vec<Entry> =
        serde_json::from_str(input).map_err(|e| ParseError::InvalidOptions(e.to_string()))?;

    Ok(entries
        .into_iter()
        .map(|e| {
            let keywords = match e.keywords {
                Some(Keywords::List(v)) => v,
                Some(Keywords::Csv(s)) => attrs::parse_list(&s),
                None => Vec::new(),
            };
            let text = e.text.unwrap_or_else(|| e.value.clone());
            OptionItem::new(e.value, text)
                .in_group(e.group.unwrap_or_else(|| UNGROUPED.to_string()))
                .disabled(e.disabled)
                .selected(e.selected)
                .with_keywords(keywords)
        })
        .collect())
}

/// [`parse_options_json`] with the component-level fallback: log and return an empty set.
pub fn options_json_or_empty(input: &str) -> OptionGrouped {
    parse_options_json(input).unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring malformed option list");
        OptionGrouped::new()
    })
}
