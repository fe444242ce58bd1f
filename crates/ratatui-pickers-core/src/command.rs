//! Command palette: a select bound to a modal dialog that executes items instead of selecting
//! them.
//!
//! The palette toggles on a global shortcut (e.g. `ctrl+k`). While open, typing filters the
//! command list, Enter executes the focused command and any item-level shortcut executes its
//! command directly. Executing always closes the modal.

use serde::Serialize;

use crate::attrs;
use crate::input::InputEvent;
use crate::input::KeyEvent;
use crate::keymap;
use crate::keymap::Shortcut;
use crate::listeners::Document;
use crate::listeners::DocumentEvent;
use crate::listeners::ListenerKind;
use crate::listeners::Mount;
use crate::options::OptionGrouped;
use crate::options::OptionItem;
use crate::options::OptionSource;
use crate::select::Entry;
use crate::select::SelectAction;
use crate::select::SelectBindings;
use crate::select::SelectEngine;
use crate::select::SelectOptions;
use crate::traits::Filterable;
use crate::traits::KeyboardNavigable;

/// Data attribute holding an item's shortcut key.
pub const SHORTCUT_ATTR: &str = "shortcut";
/// Data attribute holding the modifier for [`SHORTCUT_ATTR`].
pub const SHORTCUT_MODIFIER_ATTR: &str = "shortcut-modifier";

/// Emitted when a command runs. Serializes as `{"value": ..., "text": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecuteEvent {
    pub value: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandAction {
    None,
    Redraw,
    /// The host should show its dialog.
    OpenModal,
    /// The host should hide its dialog.
    CloseModal,
    /// A command ran. The modal is already closed and the key must not propagate further.
    Execute(ExecuteEvent),
}

#[derive(Clone, Debug, Default)]
pub struct CommandPaletteOptions {
    /// Global toggle. Without one the host opens the palette itself.
    pub trigger: Option<Shortcut>,
    pub bindings: SelectBindings,
}

impl CommandPaletteOptions {
    /// Reads the trigger from `key` and `modifier` (default `ctrl`).
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        let trigger = attrs::string_attr(attrs, "key").and_then(|key| {
            let modifier = attrs.get("modifier").map(String::as_str);
            match Shortcut::from_parts(&key, modifier) {
                Ok(s) => Some(s),
                Err(err) => {
                    tracing::warn!(%err, "command palette has no global shortcut");
                    None
                }
            }
        });
        Self {
            trigger,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct CommandPalette {
    select: SelectEngine,
    shortcuts: Vec<(Shortcut, String)>,
    modal_open: bool,
    options: CommandPaletteOptions,
    mount: Option<Mount>,
}

impl CommandPalette {
    pub fn new(commands: OptionGrouped, options: CommandPaletteOptions) -> Self {
        let select = SelectEngine::new(
            commands,
            SelectOptions {
                bindings: options.bindings.clone(),
                ..SelectOptions::default()
            },
        );
        let shortcuts = item_shortcuts(select.source());
        Self {
            select,
            shortcuts,
            modal_open: false,
            options,
            mount: None,
        }
    }

    pub fn from_source(source: &OptionSource, options: CommandPaletteOptions) -> Self {
        Self::new(source.parse(), options)
    }

    pub fn from_attrs(attrs: &attrs::Attrs, source: &OptionSource) -> Self {
        Self::from_source(source, CommandPaletteOptions::from_attrs(attrs))
    }

    /// The underlying list state (term, filtered view, focus).
    pub fn select(&self) -> &SelectEngine {
        &self.select
    }

    pub fn options(&self) -> &CommandPaletteOptions {
        &self.options
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// The shortcut an item declared through its data attributes.
    pub fn shortcut_for(&self, value: &str) -> Option<Shortcut> {
        self.shortcuts
            .iter()
            .find(|(_, v)| v == value)
            .map(|(s, _)| *s)
    }

    /// Called when the dialog opened, whoever opened it.
    pub fn on_modal_open(&mut self) -> CommandAction {
        if self.modal_open {
            return CommandAction::None;
        }
        self.modal_open = true;
        self.select.open();
        if self.select.focused().is_none() {
            self.select.navigate(crate::select::NavDirection::Down);
        }
        CommandAction::Redraw
    }

    /// Called when the dialog closed, whoever closed it. Clears the search.
    pub fn on_modal_close(&mut self) -> CommandAction {
        if !self.modal_open {
            return CommandAction::None;
        }
        self.modal_open = false;
        self.select.close();
        CommandAction::Redraw
    }

    pub fn toggle_modal(&mut self) -> CommandAction {
        if self.modal_open {
            self.on_modal_close();
            CommandAction::CloseModal
        } else {
            self.on_modal_open();
            CommandAction::OpenModal
        }
    }

    /// Runs the command with `value`. Unknown and disabled commands are ignored.
    pub fn execute(&mut self, value: &str) -> CommandAction {
        let Some(item) = self.select.source().find(value) else {
            return CommandAction::None;
        };
        if item.disabled {
            tracing::debug!(value, "disabled command not executed");
            return CommandAction::None;
        }
        let event = ExecuteEvent {
            value: item.value.clone(),
            text: item.text.clone(),
        };
        self.on_modal_close();
        CommandAction::Execute(event)
    }

    /// Replaces the command list. See [`SelectEngine::refresh`].
    pub fn refresh(&mut self, commands: OptionGrouped) -> bool {
        if !self.select.refresh(commands) {
            return false;
        }
        self.shortcuts = item_shortcuts(self.select.source());
        true
    }

    pub fn mount(&mut self, document: &Document) {
        self.mount = Some(Mount::new(document, &[ListenerKind::KeyDown]));
    }

    pub fn unmount(&mut self) {
        self.mount = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Document-level keydown routing. Only active while mounted.
    pub fn handle_document_event(&mut self, event: &DocumentEvent) -> CommandAction {
        let listening = self
            .mount
            .as_ref()
            .is_some_and(|m| m.listens_to(event.kind()));
        match event {
            DocumentEvent::KeyDown(key) if listening => self.handle_key(key),
            _ => CommandAction::None,
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> CommandAction {
        match event {
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Paste(_) if !self.modal_open => CommandAction::None,
            paste => match self.select.handle_event(paste) {
                SelectAction::None => CommandAction::None,
                _ => CommandAction::Redraw,
            },
        }
    }

    fn on_key(&mut self, key: &KeyEvent) -> CommandAction {
        if self.options.trigger.is_some_and(|t| t.matches(key)) {
            return self.toggle_modal();
        }
        if !self.modal_open {
            return CommandAction::None;
        }

        if let Some(value) = self
            .shortcuts
            .iter()
            .find(|(s, _)| s.matches(key))
            .map(|(_, v)| v.clone())
        {
            return self.execute(&value);
        }

        let b = &self.options.bindings;
        if keymap::matches_any(&b.confirm, key) {
            return match self.select.focused_entry() {
                Some(Entry::Item(item)) => {
                    let value = item.value.clone();
                    self.execute(&value)
                }
                _ => CommandAction::None,
            };
        }
        if keymap::matches_any(&b.close, key) {
            self.on_modal_close();
            return CommandAction::CloseModal;
        }

        match self.select.handle_key(key) {
            SelectAction::None => CommandAction::None,
            _ => CommandAction::Redraw,
        }
    }
}

impl Filterable for CommandPalette {
    fn term(&self) -> &str {
        self.select.term()
    }

    fn set_term(&mut self, term: &str) {
        self.select.set_term(term);
    }
}

impl KeyboardNavigable for CommandPalette {
    type Action = CommandAction;

    fn handle_key(&mut self, key: &KeyEvent) -> CommandAction {
        tracing::trace!(?key, "command palette key");
        self.on_key(key)
    }
}

fn item_shortcuts(commands: &OptionGrouped) -> Vec<(Shortcut, String)> {
    commands
        .items()
        .filter_map(|item| item_shortcut(item).map(|s| (s, item.value.clone())))
        .collect()
}

fn item_shortcut(item: &OptionItem) -> Option<Shortcut> {
    let key = item.data.attrs.get(SHORTCUT_ATTR)?;
    let modifier = item
        .data
        .attrs
        .get(SHORTCUT_MODIFIER_ATTR)
        .map(String::as_str);
    match Shortcut::from_parts(key, modifier) {
        Ok(s) => Some(s),
        Err(err) => {
            tracing::warn!(%err, value = %item.value, "ignoring command shortcut");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::input::KeyModifiers;
    use crate::keymap::Modifier;
    use crate::options::SourceGroup;
    use crate::options::SourceItem;
    use crate::options::SourceNode;
    use pretty_assertions::assert_eq;

    fn palette() -> CommandPalette {
        let source = OptionSource::new(vec![
            SourceNode::Group(SourceGroup::new(
                "File",
                vec![
                    SourceItem::new("Open file")
                        .value("open")
                        .data("shortcut", "o")
                        .data("shortcut-modifier", "alt"),
                    SourceItem::new("Save").value("save").data("shortcut", "s"),
                ],
            )),
            SourceNode::Group(SourceGroup::new(
                "Danger",
                vec![SourceItem::new("Delete everything").value("nuke")],
            ).disabled()),
        ]);
        let attrs: attrs::Attrs = [("key".to_string(), "k".to_string())].into();
        CommandPalette::from_attrs(&attrs, &source)
    }

    fn alt(c: char) -> KeyEvent {
        keymap::key_char(c).with_modifiers(KeyModifiers {
            alt: true,
            ..KeyModifiers::none()
        })
    }

    #[test]
    fn trigger_defaults_to_ctrl() {
        let p = palette();
        assert_eq!(p.options().trigger, Some(Shortcut::new('k', Modifier::Ctrl)));
        assert_eq!(p.shortcut_for("open"), Some(Shortcut::new('o', Modifier::Alt)));
        assert_eq!(p.shortcut_for("save"), Some(Shortcut::new('s', Modifier::Ctrl)));
        assert_eq!(p.shortcut_for("nuke"), None);
    }

    #[test]
    fn global_shortcut_toggles_modal() {
        let mut p = palette();
        assert_eq!(p.handle_key(&keymap::key_ctrl('k')), CommandAction::OpenModal);
        assert!(p.is_modal_open());
        assert!(p.select().is_open());
        assert_eq!(p.select().focused(), Some(0));

        p.handle_key(&keymap::key_char('s'));
        assert_eq!(p.term(), "s");
        assert_eq!(p.handle_key(&keymap::key_ctrl('k')), CommandAction::CloseModal);
        assert!(!p.is_modal_open());
        assert_eq!(p.term(), "");
    }

    #[test]
    fn keys_are_ignored_while_closed() {
        let mut p = palette();
        assert_eq!(p.handle_key(&keymap::key(KeyCode::Enter)), CommandAction::None);
        assert_eq!(p.handle_key(&keymap::key_ctrl('s')), CommandAction::None);
        assert_eq!(p.term(), "");
    }

    #[test]
    fn enter_executes_focused_command_and_closes() {
        let mut p = palette();
        p.on_modal_open();
        for c in "sav".chars() {
            p.handle_key(&keymap::key_char(c));
        }
        assert_eq!(
            p.handle_key(&keymap::key(KeyCode::Enter)),
            CommandAction::Execute(ExecuteEvent {
                value: "save".into(),
                text: "Save".into(),
            })
        );
        assert!(!p.is_modal_open());
        assert!(p.select().selected_values().is_empty());
    }

    #[test]
    fn item_shortcut_executes_directly() {
        let mut p = palette();
        p.on_modal_open();
        assert_eq!(
            p.handle_key(&alt('o')),
            CommandAction::Execute(ExecuteEvent {
                value: "open".into(),
                text: "Open file".into(),
            })
        );
    }

    #[test]
    fn disabled_commands_never_run() {
        let mut p = palette();
        p.on_modal_open();
        assert_eq!(p.execute("nuke"), CommandAction::None);
        assert!(p.is_modal_open());
    }

    #[test]
    fn escape_closes_modal() {
        let mut p = palette();
        p.on_modal_open();
        assert_eq!(p.handle_key(&keymap::key(KeyCode::Esc)), CommandAction::CloseModal);
        assert_eq!(p.on_modal_close(), CommandAction::None);
    }

    #[test]
    fn document_keydown_only_while_mounted() {
        let doc = Document::new();
        let mut p = palette();
        let event = DocumentEvent::KeyDown(keymap::key_ctrl('k'));
        assert_eq!(p.handle_document_event(&event), CommandAction::None);

        p.mount(&doc);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 1);
        assert_eq!(p.handle_document_event(&event), CommandAction::OpenModal);
        drop(p);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 0);
    }
}
