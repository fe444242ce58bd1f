use ratatui::style::Modifier;
use ratatui::style::Style;

#[derive(Clone, Debug)]
pub struct Theme {
    pub text: Style,
    pub muted: Style,
    pub accent: Style,
    pub disabled: Style,
    /// Patched onto marked calendar days.
    pub marked: Style,
    /// Patched onto the selected day or option.
    pub selected: Style,
    pub header: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text: Style::default(),
            muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            disabled: Style::default()
                .dark_gray()
                .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
            marked: Style::default().add_modifier(Modifier::UNDERLINED),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            header: Style::default().bold(),
        }
    }
}
