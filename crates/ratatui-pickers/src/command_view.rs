use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;
use ratatui_pickers_core::command::CommandPalette;
use ratatui_pickers_core::traits::Filterable;

use crate::render;
use crate::select_view;
use crate::theme::Theme;

#[derive(Clone, Debug)]
pub struct CommandPaletteViewOptions {
    pub title: String,
    pub prompt: String,
    pub show_group_headers: bool,
    /// Draw a border and clear the area behind the palette.
    pub modal: bool,
}

impl Default for CommandPaletteViewOptions {
    fn default() -> Self {
        Self {
            title: "Commands".to_string(),
            prompt: "> ".to_string(),
            show_group_headers: true,
            modal: true,
        }
    }
}

/// Draws an open [`CommandPalette`]: prompt row, then commands with their shortcut hints.
#[derive(Clone, Debug, Default)]
pub struct CommandPaletteView {
    options: CommandPaletteViewOptions,
}

impl CommandPaletteView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CommandPaletteViewOptions) -> Self {
        Self { options }
    }

    /// A centered rectangle for the modal, `width` by `height` at most.
    pub fn modal_area(outer: Rect, width: u16, height: u16) -> Rect {
        let w = width.min(outer.width);
        let h = height.min(outer.height);
        Rect::new(
            outer.x + (outer.width - w) / 2,
            outer.y + (outer.height - h) / 3,
            w,
            h,
        )
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, palette: &CommandPalette, theme: &Theme) {
        if !palette.is_modal_open() || area.width == 0 || area.height == 0 {
            return;
        }
        let inner = if self.options.modal {
            Clear.render(area, buf);
            let block = Block::default()
                .title(self.options.title.as_str())
                .borders(Borders::ALL)
                .border_style(theme.muted);
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let prompt = format!("{}{}", self.options.prompt, palette.term());
        render::render_line(inner, inner.y, buf, &prompt, theme.accent);
        if inner.height < 2 {
            return;
        }

        let list = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);
        let rows = select_view::list_rows(palette.select(), self.options.show_group_headers);
        select_view::render_rows(
            list,
            buf,
            &rows,
            theme,
            |_| "",
            |item| palette.shortcut_for(&item.value).map(|s| s.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui_pickers_core::keymap;
    use ratatui_pickers_core::options::OptionGrouped;
    use ratatui_pickers_core::options::OptionItem;
    use ratatui_pickers_core::command::CommandPaletteOptions;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn palette() -> CommandPalette {
        let commands: OptionGrouped = [
            OptionItem::new("open", "Open").with_attr("shortcut", "o"),
            OptionItem::new("quit", "Quit"),
        ]
        .into_iter()
        .collect();
        CommandPalette::new(
            commands,
            CommandPaletteOptions {
                trigger: Some("ctrl+k".parse().unwrap()),
                ..CommandPaletteOptions::default()
            },
        )
    }

    #[test]
    fn closed_palette_draws_nothing() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        CommandPaletteView::new().render(area, &mut buf, &palette(), &Theme::default());
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn open_palette_shows_prompt_and_hints() {
        let mut p = palette();
        p.handle_event(ratatui_pickers_core::input::InputEvent::Key(keymap::key_ctrl('k')));
        let view = CommandPaletteView::with_options(CommandPaletteViewOptions {
            modal: false,
            ..CommandPaletteViewOptions::default()
        });
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf, &p, &Theme::default());
        assert_eq!(row(&buf, 0), ">");
        assert_eq!(row(&buf, 1), "Open          ctrl+o");
        assert_eq!(row(&buf, 2), "Quit");
    }

    #[test]
    fn modal_area_is_centered() {
        let outer = Rect::new(0, 0, 80, 24);
        assert_eq!(
            CommandPaletteView::modal_area(outer, 40, 12),
            Rect::new(20, 4, 40, 12)
        );
        assert_eq!(CommandPaletteView::modal_area(outer, 100, 30), outer);
    }
}
