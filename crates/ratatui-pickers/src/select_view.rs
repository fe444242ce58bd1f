use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui_pickers_core::options::OptionItem;
use ratatui_pickers_core::options::UNGROUPED;
use ratatui_pickers_core::select::SelectEngine;
use ratatui_pickers_core::traits::Filterable;

use crate::render;
use crate::theme::Theme;

#[derive(Clone, Debug)]
pub struct SelectViewOptions {
    /// Shown in the input row when nothing is selected and the term is empty.
    pub placeholder: String,
    pub prompt: String,
    pub show_group_headers: bool,
}

impl Default for SelectViewOptions {
    fn default() -> Self {
        Self {
            placeholder: "Select…".to_string(),
            prompt: "> ".to_string(),
            show_group_headers: true,
        }
    }
}

/// One row of a dropdown list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListRow<'a> {
    Header(&'a str),
    Item {
        item: &'a OptionItem,
        focused: bool,
    },
    Insert {
        term: &'a str,
        focused: bool,
    },
}

impl ListRow<'_> {
    fn is_focused(&self) -> bool {
        match self {
            ListRow::Header(_) => false,
            ListRow::Item { focused, .. } | ListRow::Insert { focused, .. } => *focused,
        }
    }
}

/// Flattens the filtered view into display rows: group headers (except the ungrouped bucket),
/// items, then the insert row.
pub(crate) fn list_rows(engine: &SelectEngine, headers: bool) -> Vec<ListRow<'_>> {
    let focused = engine.focused();
    let mut rows = Vec::new();
    let mut index = 0usize;
    for (key, group) in engine.filtered().groups() {
        if group.options.is_empty() {
            continue;
        }
        if headers && key != UNGROUPED {
            rows.push(ListRow::Header(&group.text));
        }
        for item in &group.options {
            rows.push(ListRow::Item {
                item,
                focused: focused == Some(index),
            });
            index += 1;
        }
    }
    if let Some(term) = engine.insert_candidate() {
        rows.push(ListRow::Insert {
            term,
            focused: focused == Some(index),
        });
    }
    rows
}

/// Draws `rows` into `area`, scrolled so the focused row is visible. `hint` supplies optional
/// right-aligned text per item.
pub(crate) fn render_rows(
    area: Rect,
    buf: &mut Buffer,
    rows: &[ListRow<'_>],
    theme: &Theme,
    mut marker: impl FnMut(&OptionItem) -> &'static str,
    mut hint: impl FnMut(&OptionItem) -> Option<String>,
) {
    let height = area.height as usize;
    let focus = rows.iter().position(ListRow::is_focused);
    let offset = render::scroll_offset(focus, rows.len(), height);

    for (i, row) in rows.iter().skip(offset).take(height).enumerate() {
        let y = area.y + i as u16;
        match row {
            ListRow::Header(text) => render::render_line(area, y, buf, text, theme.header),
            ListRow::Item { item, focused } => {
                let mut style = if item.disabled {
                    theme.disabled
                } else {
                    theme.text
                };
                if *focused {
                    style = style.patch(theme.selected);
                }
                let line = format!("{}{}", marker(item), item.text);
                render::render_line(area, y, buf, &line, style);
                if let Some(h) = hint(item) {
                    render::render_str_right(area, y, buf, &h, style.patch(theme.muted));
                }
            }
            ListRow::Insert { term, focused } => {
                let mut style = theme.accent;
                if *focused {
                    style = style.patch(theme.selected);
                }
                render::render_line(area, y, buf, &format!("+ Add \"{term}\""), style);
            }
        }
    }
}

/// Draws a [`SelectEngine`]: an input row, then the dropdown list while open.
#[derive(Clone, Debug, Default)]
pub struct SelectView {
    options: SelectViewOptions,
}

impl SelectView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SelectViewOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SelectViewOptions {
        &self.options
    }

    /// The input row text: the search term while open, otherwise the selection's labels.
    pub fn summary(&self, engine: &SelectEngine) -> String {
        if engine.is_open() {
            return format!("{}{}", self.options.prompt, engine.term());
        }
        let labels: Vec<&str> = engine
            .selected_values()
            .iter()
            .map(|v| {
                engine
                    .source()
                    .find(v)
                    .map(|i| i.text.as_str())
                    .unwrap_or(v.as_str())
            })
            .collect();
        if labels.is_empty() {
            self.options.placeholder.clone()
        } else {
            labels.join(", ")
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, engine: &SelectEngine, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let input_style = if engine.selected_values().is_empty() && !engine.is_open() {
            theme.muted
        } else {
            theme.text
        };
        render::render_line(area, area.y, buf, &self.summary(engine), input_style);
        if !engine.is_open() || area.height < 2 {
            return;
        }

        let list = Rect::new(area.x, area.y + 1, area.width, area.height - 1);
        let rows = list_rows(engine, self.options.show_group_headers);
        let multiple = engine.is_multiple();
        render_rows(
            list,
            buf,
            &rows,
            theme,
            |item| match (multiple, engine.is_selected(&item.value)) {
                (true, true) => "[x] ",
                (true, false) => "[ ] ",
                (false, true) => "● ",
                (false, false) => "  ",
            },
            |_| None::<String>,
        );
    }
}
