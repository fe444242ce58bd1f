//! Searchable single/multiple select over a grouped option set.

pub mod insert;

use crate::attrs;
use crate::error::InsertError;
use crate::form::ChangeEvent;
use crate::form::FieldOptions;
use crate::form::FormValue;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::keymap;
use crate::listeners::Document;
use crate::listeners::DocumentEvent;
use crate::listeners::ListenerKind;
use crate::listeners::Mount;
use crate::options::OptionGrouped;
use crate::options::OptionItem;
use crate::options::OptionSource;
use crate::options::UNGROUPED;
use crate::traits::Filterable;
use crate::traits::FormValued;
use crate::traits::KeyboardNavigable;
use crate::traits::Labeled;

pub use insert::HttpMethod;
pub use insert::InsertEndpoint;
pub use insert::InsertRequest;
pub use insert::InsertResponse;
pub use insert::InsertTransport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectAction {
    None,
    Redraw,
    Opened,
    Closed,
    Changed(ChangeEvent),
    /// The host should perform the request and pass the outcome to
    /// [`SelectEngine::complete_insert`].
    InsertRequested(InsertRequest),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
}

/// A navigable row of the filtered list. Group headers are not entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry<'a> {
    Item(&'a OptionItem),
    /// Synthetic "add this term" row.
    Insert(&'a str),
}

impl Entry<'_> {
    pub fn is_disabled(&self) -> bool {
        match self {
            Entry::Item(item) => item.disabled,
            Entry::Insert(_) => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelectBindings {
    pub up: Vec<KeyEvent>,
    pub down: Vec<KeyEvent>,
    pub confirm: Vec<KeyEvent>,
    pub close: Vec<KeyEvent>,
}

impl Default for SelectBindings {
    fn default() -> Self {
        Self {
            up: vec![keymap::key(KeyCode::Up), keymap::key_ctrl('p')],
            down: vec![keymap::key(KeyCode::Down), keymap::key_ctrl('n')],
            confirm: vec![keymap::key(KeyCode::Enter)],
            close: vec![keymap::key(KeyCode::Esc), keymap::key(KeyCode::Tab)],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SelectOptions {
    pub multiple: bool,
    /// Offer an "add" row when the term matches no option exactly.
    pub insertable: bool,
    /// Remote creation endpoint. Without one, inserts are local.
    pub endpoint: Option<InsertEndpoint>,
    /// Group for locally synthesized options; ungrouped when unset.
    pub insert_group: Option<String>,
    pub field: FieldOptions,
    pub bindings: SelectBindings,
}

impl SelectOptions {
    /// Reads `multiple`, `insertable`, `insert-group`, the `insert-*` endpoint attributes and
    /// the common field attributes.
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        Self {
            multiple: attrs::flag_attr(attrs, "multiple"),
            insertable: attrs::flag_attr(attrs, "insertable"),
            endpoint: InsertEndpoint::from_attrs(attrs),
            insert_group: attrs::string_attr(attrs, "insert-group"),
            field: FieldOptions::from_attrs(attrs),
            bindings: SelectBindings::default(),
        }
    }
}

/// Dropdown state: open flag, search term, focus and the ordered selection.
///
/// `focused` indexes [`SelectEngine::entries`], the filtered and flattened list, not the raw
/// option set.
#[derive(Debug)]
pub struct SelectEngine {
    source: OptionGrouped,
    inserted: Vec<OptionItem>,
    view: OptionGrouped,
    term: String,
    focused: Option<usize>,
    open: bool,
    selected: Vec<String>,
    pending_insert: Option<String>,
    options: SelectOptions,
    mount: Option<Mount>,
}

impl SelectEngine {
    /// Seeds the selection from the options' `selected` flags. A single select keeps the last
    /// flagged option, like a native `<select>`.
    pub fn new(source: OptionGrouped, options: SelectOptions) -> Self {
        let mut selected = source.selected_values();
        if !options.multiple && selected.len() > 1 {
            selected = selected.split_off(selected.len() - 1);
        }
        let mut engine = Self {
            view: source.clone(),
            source,
            inserted: Vec::new(),
            term: String::new(),
            focused: None,
            open: false,
            selected,
            pending_insert: None,
            options,
            mount: None,
        };
        engine.focused = engine.selection_focus();
        engine
    }

    pub fn from_source(source: &OptionSource, options: SelectOptions) -> Self {
        Self::new(source.parse(), options)
    }

    /// Builds a select from host attributes. An explicit `value` (comma list when `multiple`)
    /// overrides the source's `selected` flags.
    pub fn from_attrs(attrs: &attrs::Attrs, source: &OptionSource) -> Self {
        let mut engine = Self::from_source(source, SelectOptions::from_attrs(attrs));
        if let Some(raw) = attrs.get("value") {
            let values = if engine.options.multiple {
                attrs::parse_list(raw)
            } else {
                vec![raw.trim().to_string()]
            };
            engine.set_value(values.into_iter().filter(|v| !v.is_empty()).collect());
        }
        engine
    }

    pub fn options(&self) -> &SelectOptions {
        &self.options
    }

    pub fn is_multiple(&self) -> bool {
        self.options.multiple
    }

    /// The full option set, including options inserted since mount.
    pub fn source(&self) -> &OptionGrouped {
        &self.source
    }

    /// Groups and items matching the current term.
    pub fn filtered(&self) -> &OptionGrouped {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused_entry(&self) -> Option<Entry<'_>> {
        self.focused.and_then(|i| self.entries().get(i).copied())
    }

    /// Selected values in selection order.
    pub fn selected_values(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|v| v == value)
    }

    pub fn is_insert_pending(&self) -> bool {
        self.pending_insert.is_some()
    }

    /// Replaces the selection without a change notification.
    pub fn set_value(&mut self, mut values: Vec<String>) {
        if !self.options.multiple {
            values.truncate(1);
        }
        let mut seen = std::collections::HashSet::new();
        values.retain(|v| seen.insert(v.clone()));
        self.selected = values;
        if !self.open {
            self.focused = self.selection_focus();
        }
    }

    /// The term to offer as a new option, if any. Offered only while the term matches no
    /// option's keywords and equals no option's value or text.
    pub fn insert_candidate(&self) -> Option<&str> {
        if !self.options.insertable {
            return None;
        }
        let term = self.term.trim();
        if term.is_empty() || self.view.items().next().is_some() {
            return None;
        }
        let lower = term.to_lowercase();
        let exists = self
            .source
            .items()
            .any(|i| i.value.to_lowercase() == lower || i.text.to_lowercase() == lower);
        (!exists).then_some(term)
    }

    /// Navigable rows: filtered items in group order, then the insert row.
    pub fn entries(&self) -> Vec<Entry<'_>> {
        let mut out: Vec<Entry<'_>> = self.view.items().map(Entry::Item).collect();
        if let Some(term) = self.insert_candidate() {
            out.push(Entry::Insert(term));
        }
        out
    }

    pub fn open(&mut self) -> SelectAction {
        if self.open || self.options.field.disabled {
            return SelectAction::None;
        }
        self.open = true;
        SelectAction::Opened
    }

    /// Closes the dropdown and clears the term. A single select re-focuses its selection so
    /// reopening highlights it.
    pub fn close(&mut self) -> SelectAction {
        if !self.open {
            return SelectAction::None;
        }
        self.open = false;
        self.term.clear();
        self.view = self.source.clone();
        self.focused = self.selection_focus();
        SelectAction::Closed
    }

    pub fn toggle(&mut self) -> SelectAction {
        if self.open { self.close() } else { self.open() }
    }

    fn selection_focus(&self) -> Option<usize> {
        if self.options.multiple {
            return None;
        }
        let value = self.selected.first()?;
        self.entries()
            .iter()
            .position(|e| matches!(e, Entry::Item(i) if &i.value == value))
    }

    fn first_enabled(&self) -> Option<usize> {
        self.entries().iter().position(|e| !e.is_disabled())
    }

    /// Moves focus with wrap-around, skipping disabled entries. Focus is unchanged when every
    /// entry is disabled.
    pub fn navigate(&mut self, direction: NavDirection) -> SelectAction {
        let entries = self.entries();
        let n = entries.len();
        if n == 0 {
            return SelectAction::None;
        }
        let current = self.focused.filter(|f| *f < n);
        let target = (1..=n)
            .map(|step| match (direction, current) {
                (NavDirection::Down, Some(f)) => (f + step) % n,
                (NavDirection::Down, None) => step - 1,
                (NavDirection::Up, Some(f)) => (f + n - step % n) % n,
                (NavDirection::Up, None) => n - step,
            })
            .find(|i| !entries[*i].is_disabled());

        match target {
            Some(i) if Some(i) != self.focused => {
                self.focused = Some(i);
                SelectAction::Redraw
            }
            _ => SelectAction::None,
        }
    }

    /// Selects `value`. Disabled or unknown values are ignored without a notification.
    ///
    /// Single mode replaces the selection and closes; multiple mode toggles membership,
    /// appending new values at the end, and stays open.
    pub fn select(&mut self, value: &str) -> SelectAction {
        let Some(item) = self.source.find(value) else {
            tracing::debug!(value, "select of unknown option ignored");
            return SelectAction::None;
        };
        if item.disabled || self.options.field.disabled {
            return SelectAction::None;
        }
        let value = item.value.clone();

        if self.options.multiple {
            match self.selected.iter().position(|v| *v == value) {
                Some(pos) => {
                    self.selected.remove(pos);
                }
                None => self.selected.push(value),
            }
            return SelectAction::Changed(ChangeEvent::multiple(self.selected.clone()));
        }

        self.selected = vec![value.clone()];
        self.close();
        self.focused = self.selection_focus();
        SelectAction::Changed(ChangeEvent::single(value))
    }

    /// Drops `value` from the selection (e.g. removing a chip in multiple mode).
    pub fn deselect(&mut self, value: &str) -> SelectAction {
        let Some(pos) = self.selected.iter().position(|v| v == value) else {
            return SelectAction::None;
        };
        self.selected.remove(pos);
        SelectAction::Changed(ChangeEvent {
            value: self.form_value(),
        })
    }

    pub fn clear(&mut self) -> SelectAction {
        if self.selected.is_empty() {
            return SelectAction::None;
        }
        self.selected.clear();
        SelectAction::Changed(ChangeEvent {
            value: self.form_value(),
        })
    }

    /// Activates the focused entry: selects an item or starts an insert.
    pub fn activate(&mut self) -> SelectAction {
        match self.focused_entry() {
            Some(Entry::Item(item)) => {
                let value = item.value.clone();
                self.select(&value)
            }
            Some(Entry::Insert(_)) => self.begin_insert(),
            None => SelectAction::None,
        }
    }

    /// Replaces the option set with a fresh parse of the host's source.
    ///
    /// Structurally equal snapshots are ignored, so a refresh triggered by the engine's own
    /// writes cannot loop. Selection, term and focus survive; inserted options are re-merged.
    pub fn refresh(&mut self, grouped: OptionGrouped) -> bool {
        let mut merged = grouped;
        for item in &self.inserted {
            if merged.find(&item.value).is_none() {
                merged.insert(item.clone());
            }
        }
        if merged == self.source {
            return false;
        }
        tracing::debug!(options = merged.len(), "option source refreshed");

        let focused_value = match self.focused_entry() {
            Some(Entry::Item(item)) => Some(item.value.clone()),
            _ => None,
        };
        self.source = merged;
        self.view = self.source.filter(&self.term);
        self.focused = focused_value
            .and_then(|v| {
                self.entries()
                    .iter()
                    .position(|e| matches!(e, Entry::Item(i) if i.value == v))
            })
            .or_else(|| {
                if self.open {
                    self.first_enabled()
                } else {
                    self.selection_focus()
                }
            });
        true
    }

    pub fn refresh_from(&mut self, source: &OptionSource) -> bool {
        self.refresh(source.parse())
    }

    /// Starts inserting the current term.
    ///
    /// Without an endpoint the option is created locally right away. With one, an
    /// [`SelectAction::InsertRequested`] is returned and the insert stays pending until
    /// [`SelectEngine::complete_insert`]. Only one insert may be pending at a time.
    pub fn begin_insert(&mut self) -> SelectAction {
        let Some(term) = self.insert_candidate().map(str::to_string) else {
            return SelectAction::None;
        };
        if self.pending_insert.is_some() {
            tracing::debug!(%term, "insert already pending");
            return SelectAction::None;
        }
        match self.options.endpoint.as_ref().map(|e| e.request(&term)) {
            None => {
                let item = self.local_item(&term);
                self.apply_insert(item)
            }
            Some(request) => {
                self.pending_insert = Some(term);
                SelectAction::InsertRequested(request)
            }
        }
    }

    /// Finishes a pending insert. Any failure yields a local option built from the term, so
    /// the insert always succeeds from the user's point of view.
    pub fn complete_insert(
        &mut self,
        result: Result<InsertResponse, InsertError>,
    ) -> SelectAction {
        let Some(term) = self.pending_insert.take() else {
            tracing::warn!("insert response without a pending insert");
            return SelectAction::None;
        };
        let item = match result
            .and_then(insert::resolve)
            .and_then(|item| self.check_insertable(item))
        {
            Ok(item) => item,
            Err(err) => {
                tracing::warn!(%err, %term, "remote insert failed, creating option locally");
                self.local_item(&term)
            }
        };
        self.apply_insert(item)
    }

    /// Runs both insert phases through `transport`.
    pub fn insert_with<T: InsertTransport>(&mut self, transport: &mut T) -> SelectAction {
        match self.begin_insert() {
            SelectAction::InsertRequested(request) => {
                let result = transport.send(&request);
                self.complete_insert(result)
            }
            other => other,
        }
    }

    fn check_insertable(&self, item: OptionItem) -> Result<OptionItem, InsertError> {
        let disabled = item.disabled
            || self
                .source
                .find(&item.value)
                .is_some_and(|existing| existing.disabled);
        if disabled {
            return Err(InsertError::Disabled(item.value));
        }
        Ok(item)
    }

    fn local_item(&self, term: &str) -> OptionItem {
        OptionItem::new(term, term)
            .in_group(
                self.options
                    .insert_group
                    .clone()
                    .unwrap_or_else(|| UNGROUPED.to_string()),
            )
            .selected(true)
    }

    fn apply_insert(&mut self, item: OptionItem) -> SelectAction {
        let value = item.value.clone();
        if let Some(existing) = self.source.find(&value) {
            if existing.disabled {
                tracing::debug!(%value, "refusing to select disabled option");
                return SelectAction::None;
            }
        } else {
            let item = item.selected(true);
            self.inserted.push(item.clone());
            self.source.insert(item);
        }

        let event = if self.options.multiple {
            if !self.is_selected(&value) {
                self.selected.push(value);
            }
            ChangeEvent::multiple(self.selected.clone())
        } else {
            self.selected = vec![value.clone()];
            ChangeEvent::single(value)
        };

        self.term.clear();
        self.view = self.source.clone();
        if self.options.multiple {
            self.focused = self.first_enabled();
        } else {
            self.close();
            self.focused = self.selection_focus();
        }
        SelectAction::Changed(event)
    }

    pub fn mount(&mut self, document: &Document) {
        self.mount = Some(Mount::new(document, &[ListenerKind::PointerDown]));
    }

    pub fn unmount(&mut self) {
        self.mount = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Closes on a pointer-down outside the component.
    pub fn handle_document_event(&mut self, event: &DocumentEvent) -> SelectAction {
        let listening = self
            .mount
            .as_ref()
            .is_some_and(|m| m.listens_to(event.kind()));
        match event {
            DocumentEvent::PointerDown { inside: false } if listening => self.close(),
            _ => SelectAction::None,
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> SelectAction {
        match event {
            InputEvent::Paste(s) => {
                let term = format!("{}{}", self.term, s);
                self.set_term(&term);
                self.open();
                SelectAction::Redraw
            }
            InputEvent::Key(key) => self.handle_key(&key),
        }
    }

    fn on_key(&mut self, key: &KeyEvent) -> SelectAction {
        let b = &self.options.bindings;
        let direction = if keymap::matches_any(&b.down, key) {
            Some(NavDirection::Down)
        } else if keymap::matches_any(&b.up, key) {
            Some(NavDirection::Up)
        } else {
            None
        };
        if let Some(direction) = direction {
            if !self.open {
                self.open();
                self.navigate(direction);
                return SelectAction::Opened;
            }
            return self.navigate(direction);
        }
        if keymap::matches_any(&b.confirm, key) {
            return if self.open { self.activate() } else { self.open() };
        }
        if keymap::matches_any(&b.close, key) {
            return self.close();
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.ctrl && !key.modifiers.alt && !key.modifiers.meta => {
                let mut term = self.term.clone();
                term.push(c);
                self.set_term(&term);
                self.open();
                SelectAction::Redraw
            }
            KeyCode::Backspace => {
                let mut term = self.term.clone();
                if term.pop().is_none() {
                    return SelectAction::None;
                }
                self.set_term(&term);
                SelectAction::Redraw
            }
            _ => SelectAction::None,
        }
    }
}

impl Filterable for SelectEngine {
    fn term(&self) -> &str {
        &self.term
    }

    /// Refilters and focuses the first enabled match.
    fn set_term(&mut self, term: &str) {
        if self.term == term {
            return;
        }
        self.term = term.to_string();
        self.view = self.source.filter(&self.term);
        self.focused = if self.term.is_empty() && !self.open {
            self.selection_focus()
        } else {
            self.first_enabled()
        };
    }
}

impl KeyboardNavigable for SelectEngine {
    type Action = SelectAction;

    fn handle_key(&mut self, key: &KeyEvent) -> SelectAction {
        tracing::trace!(?key, "select key");
        self.on_key(key)
    }
}

impl FormValued for SelectEngine {
    fn name(&self) -> Option<&str> {
        self.options.field.name.as_deref()
    }

    fn form_value(&self) -> FormValue {
        if self.options.multiple {
            FormValue::Multiple(self.selected.clone())
        } else {
            FormValue::Single(self.selected.first().cloned().unwrap_or_default())
        }
    }

    fn is_required(&self) -> bool {
        self.options.field.required
    }
}

impl Labeled for SelectEngine {
    fn label(&self) -> Option<&str> {
        self.options.field.label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::HiddenField;
    use crate::options::SourceGroup;
    use crate::options::SourceItem;
    use crate::options::SourceNode;
    use pretty_assertions::assert_eq;

    fn items(values: &[(&str, bool)]) -> OptionGrouped {
        values
            .iter()
            .map(|(v, disabled)| OptionItem::new(*v, v.to_uppercase()).disabled(*disabled))
            .collect()
    }

    fn multiple() -> SelectOptions {
        SelectOptions {
            multiple: true,
            ..SelectOptions::default()
        }
    }

    fn focused_value(engine: &SelectEngine) -> Option<String> {
        match engine.focused_entry() {
            Some(Entry::Item(i)) => Some(i.value.clone()),
            Some(Entry::Insert(t)) => Some(format!("+{t}")),
            None => None,
        }
    }

    #[test]
    fn disabled_select_is_silent() {
        let mut s = SelectEngine::new(items(&[("a", false), ("b", true)]), SelectOptions::default());
        assert_eq!(s.select("b"), SelectAction::None);
        assert!(s.selected_values().is_empty());
        assert_eq!(s.select("a"), SelectAction::Changed(ChangeEvent::single("a")));
    }

    #[test]
    fn multiple_toggle_appends_at_end() {
        let mut s = SelectEngine::new(items(&[("x", false), ("y", false)]), multiple());
        s.select("x");
        assert_eq!(
            s.select("y"),
            SelectAction::Changed(ChangeEvent::multiple(vec!["x".into(), "y".into()]))
        );
        assert_eq!(
            s.select("x"),
            SelectAction::Changed(ChangeEvent::multiple(vec!["y".into()]))
        );
        s.select("x");
        assert_eq!(s.selected_values(), ["y", "x"]);
    }

    #[test]
    fn single_select_closes_and_refocuses_selection() {
        let mut s = SelectEngine::new(
            items(&[("a", false), ("b", false), ("c", false)]),
            SelectOptions::default(),
        );
        s.open();
        s.set_term("c");
        assert_eq!(s.entries().len(), 1);
        s.activate();
        assert!(!s.is_open());
        assert_eq!(s.term(), "");
        assert_eq!(s.focused(), Some(2));

        s.open();
        assert_eq!(focused_value(&s).as_deref(), Some("c"));
    }

    #[test]
    fn multiple_select_stays_open() {
        let mut s = SelectEngine::new(items(&[("a", false), ("b", false)]), multiple());
        s.open();
        s.select("a");
        assert!(s.is_open());
        s.close();
        assert_eq!(s.focused(), None);
    }

    #[test]
    fn navigation_wraps_and_skips_disabled() {
        let mut s = SelectEngine::new(
            items(&[("a", true), ("b", false), ("c", true), ("d", false)]),
            SelectOptions::default(),
        );
        s.open();
        s.navigate(NavDirection::Down);
        assert_eq!(focused_value(&s).as_deref(), Some("b"));
        s.navigate(NavDirection::Down);
        assert_eq!(focused_value(&s).as_deref(), Some("d"));
        s.navigate(NavDirection::Down);
        assert_eq!(focused_value(&s).as_deref(), Some("b"));
        s.navigate(NavDirection::Up);
        assert_eq!(focused_value(&s).as_deref(), Some("d"));
    }

    #[test]
    fn navigation_with_everything_disabled_keeps_focus() {
        let mut s = SelectEngine::new(items(&[("a", true), ("b", true)]), SelectOptions::default());
        s.open();
        assert_eq!(s.navigate(NavDirection::Down), SelectAction::None);
        assert_eq!(s.focused(), None);
    }

    #[test]
    fn search_term_filters_and_focuses_first_match() {
        let source = OptionSource::new(vec![
            SourceNode::Group(SourceGroup::new(
                "Fruit",
                vec![
                    SourceItem::new("Apple").value("apple"),
                    SourceItem::new("Apricot").value("apricot").disabled(),
                ],
            )),
            SourceNode::Group(SourceGroup::new(
                "Veg",
                vec![SourceItem::new("Asparagus").value("asparagus")],
            )),
        ]);
        let mut s = SelectEngine::from_source(&source, SelectOptions::default());
        for c in "ap".chars() {
            s.handle_key(&keymap::key_char(c));
        }
        assert!(s.is_open());
        assert_eq!(s.filtered().len(), 2);
        assert!(s.filtered().group("Veg").is_none());
        assert_eq!(focused_value(&s).as_deref(), Some("apple"));

        s.set_term("");
        assert_eq!(s.filtered(), s.source());
    }

    #[test]
    fn keyboard_opens_and_selects() {
        let mut s = SelectEngine::new(items(&[("a", false), ("b", false)]), SelectOptions::default());
        assert_eq!(s.handle_key(&keymap::key(KeyCode::Down)), SelectAction::Opened);
        assert_eq!(focused_value(&s).as_deref(), Some("a"));
        s.handle_key(&keymap::key(KeyCode::Down));
        assert_eq!(
            s.handle_key(&keymap::key(KeyCode::Enter)),
            SelectAction::Changed(ChangeEvent::single("b"))
        );
        assert_eq!(s.handle_key(&keymap::key(KeyCode::Esc)), SelectAction::None);
    }

    #[test]
    fn local_insert_selects_new_option() {
        let mut s = SelectEngine::new(
            items(&[("a", false)]),
            SelectOptions {
                insertable: true,
                insert_group: Some("Custom".into()),
                ..multiple()
            },
        );
        s.open();
        s.set_term("a");
        assert_eq!(s.insert_candidate(), None);
        s.set_term("new");
        assert_eq!(s.entries(), vec![Entry::Insert("new")]);
        assert_eq!(s.focused(), Some(0));

        assert_eq!(
            s.activate(),
            SelectAction::Changed(ChangeEvent::multiple(vec!["new".into()]))
        );
        let item = s.source().find("new").unwrap();
        assert_eq!(item.group, "Custom");
        assert!(item.selected);
        assert_eq!(s.term(), "");
    }

    #[test]
    fn remote_insert_uses_response_item() {
        let mut s = SelectEngine::new(
            OptionGrouped::new(),
            SelectOptions {
                insertable: true,
                endpoint: Some(InsertEndpoint::new("https://example.test/opts").unwrap()),
                ..SelectOptions::default()
            },
        );
        s.set_term("rust");
        let SelectAction::InsertRequested(req) = s.begin_insert() else {
            panic!("expected a request");
        };
        assert_eq!(req.term, "rust");
        assert!(s.is_insert_pending());
        assert_eq!(s.begin_insert(), SelectAction::None);

        let body = r#"{"group": "Lang", "value": "rs", "text": "Rust", "disabled": false,
                       "selected": false, "data": {"keywords": ["rust"]}}"#;
        assert_eq!(
            s.complete_insert(Ok(InsertResponse::ok(body))),
            SelectAction::Changed(ChangeEvent::single("rs"))
        );
        assert_eq!(s.source().find("rs").unwrap().group, "Lang");
        assert!(!s.is_insert_pending());
    }

    #[test]
    fn remote_insert_never_selects_disabled_option() {
        let endpoint = InsertEndpoint::new("https://example.test/opts").unwrap();
        let mut s = SelectEngine::new(
            items(&[("a", false), ("b", true)]),
            SelectOptions {
                insertable: true,
                endpoint: Some(endpoint),
                ..SelectOptions::default()
            },
        );

        s.set_term("zzz");
        assert!(matches!(s.begin_insert(), SelectAction::InsertRequested(_)));
        let colliding = r#"{"group": "__", "value": "b", "text": "B", "disabled": false,
                            "selected": true, "data": {"keywords": ["b"]}}"#;
        assert_eq!(
            s.complete_insert(Ok(InsertResponse::ok(colliding))),
            SelectAction::Changed(ChangeEvent::single("zzz"))
        );
        assert!(!s.is_selected("b"));
        assert!(s.source().find("b").unwrap().disabled);

        s.set_term("yyy");
        assert!(matches!(s.begin_insert(), SelectAction::InsertRequested(_)));
        let disabled = r#"{"group": "__", "value": "new", "text": "New", "disabled": true,
                           "selected": true, "data": {"keywords": ["new"]}}"#;
        assert_eq!(
            s.complete_insert(Ok(InsertResponse::ok(disabled))),
            SelectAction::Changed(ChangeEvent::single("yyy"))
        );
        assert!(s.source().find("new").is_none());
        assert_eq!(s.selected_values(), ["yyy"]);
    }

    #[test]
    fn insert_row_hidden_while_term_matches_keywords() {
        let mut s = SelectEngine::new(
            [OptionItem::new("apple", "Apple")].into_iter().collect(),
            SelectOptions {
                insertable: true,
                ..SelectOptions::default()
            },
        );
        s.open();
        s.set_term("app");
        assert_eq!(s.insert_candidate(), None);
        assert_eq!(s.entries().len(), 1);
        assert!(matches!(s.entries()[0], Entry::Item(_)));
        assert_eq!(s.begin_insert(), SelectAction::None);

        s.set_term("apricot");
        assert_eq!(s.entries(), vec![Entry::Insert("apricot")]);
    }

    #[test]
    fn refresh_keeps_state_and_inserted_options() {
        let source = OptionSource::new(vec![
            SourceNode::Item(SourceItem::new("A").value("a")),
            SourceNode::Item(SourceItem::new("B").value("b")),
        ]);
        let mut s = SelectEngine::from_source(
            &source,
            SelectOptions {
                insertable: true,
                ..multiple()
            },
        );
        s.select("b");
        s.set_term("zed");
        s.begin_insert();
        assert!(!s.refresh_from(&source));

        let mut grown = source.clone();
        grown
            .nodes
            .push(SourceNode::Item(SourceItem::new("C").value("c")));
        assert!(s.refresh_from(&grown));
        assert_eq!(s.selected_values(), ["b", "zed"]);
        assert!(s.source().find("zed").is_some());
        assert!(s.source().find("c").is_some());
        assert!(!s.refresh_from(&grown));
    }

    #[test]
    fn click_away_closes_only_while_mounted() {
        let doc = Document::new();
        let mut s = SelectEngine::new(items(&[("a", false)]), SelectOptions::default());
        s.open();
        let outside = DocumentEvent::PointerDown { inside: false };
        assert_eq!(s.handle_document_event(&outside), SelectAction::None);

        s.mount(&doc);
        assert_eq!(doc.listener_count(ListenerKind::PointerDown), 1);
        assert_eq!(
            s.handle_document_event(&DocumentEvent::PointerDown { inside: true }),
            SelectAction::None
        );
        assert_eq!(s.handle_document_event(&outside), SelectAction::Closed);

        s.unmount();
        assert_eq!(doc.listener_count(ListenerKind::PointerDown), 0);
    }

    #[test]
    fn hidden_fields_and_explicit_value() {
        let source = OptionSource::new(vec![
            SourceNode::Item(SourceItem::new("A").value("a").selected()),
            SourceNode::Item(SourceItem::new("B").value("b")),
            SourceNode::Item(SourceItem::new("C").value("c")),
        ]);
        let attrs: attrs::Attrs = [("name", "letters"), ("multiple", ""), ("value", "c, b")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let s = SelectEngine::from_attrs(&attrs, &source);
        assert_eq!(
            s.hidden_fields(),
            vec![
                HiddenField {
                    name: "letters[]".into(),
                    value: "c".into()
                },
                HiddenField {
                    name: "letters[]".into(),
                    value: "b".into()
                },
            ]
        );

        let single = SelectEngine::from_source(&source, SelectOptions::default());
        assert_eq!(single.form_value(), FormValue::Single("a".into()));
        assert_eq!(single.focused(), Some(0));
    }
}
