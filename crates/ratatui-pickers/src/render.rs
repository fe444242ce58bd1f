use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Draws `s` at `(x, y)`, stopping before `max_cols` would be exceeded. Wide characters that do
/// not fit are dropped rather than split. Returns the number of columns written.
pub fn render_str_clipped(
    x: u16,
    y: u16,
    max_cols: u16,
    buf: &mut Buffer,
    s: &str,
    style: Style,
) -> u16 {
    let mut dx = 0u16;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0) as u16;
        if w == 0 {
            continue;
        }
        if dx + w > max_cols {
            break;
        }
        if let Some(cell) = buf.cell_mut((x + dx, y)) {
            cell.set_style(style);
            cell.set_symbol(&ch.to_string());
        }
        if w == 2
            && let Some(cell) = buf.cell_mut((x + dx + 1, y))
        {
            cell.set_style(style);
            cell.set_symbol("");
        }
        dx += w;
    }
    dx
}

/// Fills a whole row of `area` with `style`, then draws `s` on it.
pub fn render_line(area: Rect, y: u16, buf: &mut Buffer, s: &str, style: Style) {
    if y < area.y || y >= area.bottom() {
        return;
    }
    buf.set_style(Rect::new(area.x, y, area.width, 1), style);
    render_str_clipped(area.x, y, area.width, buf, s, style);
}

/// Draws `s` flush against the right edge of `area` on row `y`.
pub fn render_str_right(area: Rect, y: u16, buf: &mut Buffer, s: &str, style: Style) {
    let w = UnicodeWidthStr::width(s).min(area.width as usize) as u16;
    render_str_clipped(area.right() - w, y, w, buf, s, style);
}

/// Centers `s` within `width` columns starting at `x`.
pub fn render_str_centered(x: u16, y: u16, width: u16, buf: &mut Buffer, s: &str, style: Style) {
    let w = UnicodeWidthStr::width(s).min(width as usize) as u16;
    render_str_clipped(x + (width - w) / 2, y, w, buf, s, style);
}

/// First row to draw so that `focus` stays visible in a window of `height` rows.
pub fn scroll_offset(focus: Option<usize>, len: usize, height: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    match focus {
        Some(f) if f >= height => (f + 1 - height).min(len - height),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn clipping_stops_before_wide_char_overflow() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        let written = render_str_clipped(0, 0, 4, &mut buf, "ab日本", Style::default());
        assert_eq!(written, 4);
        assert_eq!(row(&buf, 0), "ab日");

        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        assert_eq!(render_str_clipped(0, 0, 3, &mut buf, "a日本", Style::default()), 3);
    }

    #[test]
    fn right_alignment() {
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        render_str_right(area, 0, &mut buf, "^K", Style::default());
        assert_eq!(row(&buf, 0), "    ^K");
    }

    #[test]
    fn scroll_keeps_focus_in_window() {
        assert_eq!(scroll_offset(None, 10, 3), 0);
        assert_eq!(scroll_offset(Some(2), 10, 3), 0);
        assert_eq!(scroll_offset(Some(3), 10, 3), 1);
        assert_eq!(scroll_offset(Some(9), 10, 3), 7);
        assert_eq!(scroll_offset(Some(9), 2, 3), 0);
    }
}
