use crossterm::event::Event;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_pickers::attrs::Attrs;
use ratatui_pickers::calendar::Calendar;
use ratatui_pickers::calendar::CalendarAction;
use ratatui_pickers::calendar::input_date::InputDate;
use ratatui_pickers::calendar::input_date::InputDateAction;
use ratatui_pickers::calendar_view::CalendarView;
use ratatui_pickers::command::CommandAction;
use ratatui_pickers::command::CommandPalette;
use ratatui_pickers::command_view::CommandPaletteView;
use ratatui_pickers::crossterm_input::input_event_from_crossterm;
use ratatui_pickers::form::ChangeEvent;
use ratatui_pickers::input::InputEvent;
use ratatui_pickers::input::KeyCode;
use ratatui_pickers::listeners::Document;
use ratatui_pickers::listeners::DocumentEvent;
use ratatui_pickers::options::OptionSource;
use ratatui_pickers::options::SourceGroup;
use ratatui_pickers::options::SourceItem;
use ratatui_pickers::options::SourceNode;
use ratatui_pickers::select::SelectAction;
use ratatui_pickers::select::SelectEngine;
use ratatui_pickers::select_view::SelectView;
use ratatui_pickers::theme::Theme;
use ratatui_pickers::time::TimeAction;
use ratatui_pickers::time::TimeInput;
use ratatui_pickers::traits::FormValued;
use std::io;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Calendar,
    DateTime,
    Select,
}

struct App {
    tab: Tab,
    calendar: Calendar,
    input_date: InputDate,
    time: TimeInput,
    time_focus: bool,
    select: SelectEngine,
    palette: CommandPalette,
    document: Document,
    status: String,
    quit: bool,
}

fn attrs(pairs: &[(&str, &str)]) -> Attrs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl App {
    fn new() -> Self {
        let today = chrono::Local::now().date_naive();
        let marked = ratatui_pickers::date::to_iso_date(today);

        let calendar = Calendar::from_attrs(
            &attrs(&[
                ("name", "day"),
                ("week-start", "monday"),
                ("marked-dates", marked.as_str()),
            ]),
            today,
        );
        let input_date = InputDate::from_attrs(
            &attrs(&[("name", "when"), ("format", "dddd, D MMMM YYYY")]),
            today,
        );
        let time = TimeInput::from_attrs(&attrs(&[
            ("name", "at"),
            ("hour-format", "12"),
            ("minute-step", "15"),
        ]));

        let languages = OptionSource::new(vec![
            SourceNode::Group(SourceGroup::new(
                "Systems",
                vec![
                    SourceItem::new("Rust").value("rust").data("keywords", "cargo, crab"),
                    SourceItem::new("C").value("c"),
                    SourceItem::new("Zig").value("zig"),
                ],
            )),
            SourceNode::Group(SourceGroup::new(
                "Scripting",
                vec![
                    SourceItem::new("Python").value("python").selected(),
                    SourceItem::new("Perl").value("perl").disabled(),
                ],
            )),
            SourceNode::Item(SourceItem::new("Other").value("other")),
        ]);
        let select = SelectEngine::from_attrs(
            &attrs(&[("name", "langs"), ("multiple", ""), ("insertable", "")]),
            &languages,
        );

        let commands = OptionSource::new(vec![
            SourceNode::Group(SourceGroup::new(
                "Go to",
                vec![
                    SourceItem::new("Calendar").value("tab:calendar").data("shortcut", "1"),
                    SourceItem::new("Date and time").value("tab:datetime").data("shortcut", "2"),
                    SourceItem::new("Select").value("tab:select").data("shortcut", "3"),
                ],
            )),
            SourceNode::Item(
                SourceItem::new("Quit")
                    .value("quit")
                    .data("shortcut", "q")
                    .data("shortcut-modifier", "ctrl"),
            ),
        ]);
        let mut palette = CommandPalette::from_attrs(&attrs(&[("key", "k")]), &commands);

        let document = Document::new();
        palette.mount(&document);

        Self {
            tab: Tab::Calendar,
            calendar,
            input_date,
            time,
            time_focus: false,
            select,
            palette,
            document,
            status: "ctrl+k: commands  ctrl+c: quit".to_string(),
            quit: false,
        }
    }

    fn report(&mut self, name: Option<&str>, event: &ChangeEvent) {
        tracing::info!(field = name.unwrap_or("-"), value = %event.to_json(), "changed");
        self.status = format!("{}: {}", name.unwrap_or("-"), event.to_json());
    }

    fn handle(&mut self, event: InputEvent) {
        if let InputEvent::Key(key) = &event {
            if key.modifiers.ctrl && key.code == KeyCode::Char('c') {
                self.quit = true;
                return;
            }
            match self
                .palette
                .handle_document_event(&DocumentEvent::KeyDown(key.clone()))
            {
                CommandAction::None => {}
                CommandAction::Execute(exec) => {
                    self.run_command(&exec.value);
                    return;
                }
                CommandAction::Redraw | CommandAction::OpenModal | CommandAction::CloseModal => {
                    return;
                }
            }
            if self.palette.is_modal_open() {
                return;
            }
        } else if self.palette.is_modal_open() {
            self.palette.handle_event(event);
            return;
        }

        match self.tab {
            Tab::Calendar => {
                if let CalendarAction::Changed(ev) = self.calendar.handle_event(event) {
                    let name = self.calendar.name().map(str::to_string);
                    self.report(name.as_deref(), &ev);
                }
            }
            Tab::DateTime => {
                if matches!(&event, InputEvent::Key(k) if k.code == KeyCode::Tab) {
                    self.time_focus = !self.time_focus;
                    self.input_date.close();
                    return;
                }
                if self.time_focus {
                    if let TimeAction::Changed(ev) = self.time.handle_event(event) {
                        let name = self.time.name().map(str::to_string);
                        self.report(name.as_deref(), &ev);
                    }
                } else if let InputDateAction::Changed(ev) = self.input_date.handle_event(event) {
                    let name = self.input_date.name().map(str::to_string);
                    self.report(name.as_deref(), &ev);
                }
            }
            Tab::Select => match self.select.handle_event(event) {
                SelectAction::Changed(ev) => {
                    let name = self.select.name().map(str::to_string);
                    self.report(name.as_deref(), &ev);
                }
                SelectAction::InsertRequested(request) => {
                    // No endpoint is configured, so this only happens with a custom setup.
                    tracing::warn!(url = %request.url, "no transport for insert");
                }
                _ => {}
            },
        }
    }

    fn run_command(&mut self, value: &str) {
        match value {
            "tab:calendar" => self.tab = Tab::Calendar,
            "tab:datetime" => self.tab = Tab::DateTime,
            "tab:select" => self.tab = Tab::Select,
            "quit" => self.quit = true,
            other => tracing::warn!(command = other, "unknown command"),
        }
        self.status = format!("ran {value}");
    }

    fn draw(&self, area: Rect, buf: &mut ratatui::buffer::Buffer, theme: &Theme) {
        let [main, status] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .areas(area);

        let title = match self.tab {
            Tab::Calendar => "Calendar (arrows, PgUp/PgDn, Home/End, Enter, [ ])",
            Tab::DateTime => "Date + time (type YYYY-MM-DD, Down opens, Tab switches field)",
            Tab::Select => "Select (type to search, ↑/↓, Enter, Esc)",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(main);
        ratatui::widgets::Widget::render(block, main, buf);

        match self.tab {
            Tab::Calendar => CalendarView::new().render(inner, buf, &self.calendar, theme),
            Tab::DateTime => {
                let line = format!(
                    "Date: {}    Time: {}",
                    self.input_date.display_text(),
                    self.time.display()
                );
                ratatui_pickers::render::render_line(inner, inner.y, buf, &line, theme.text);
                if self.input_date.is_open() && inner.height > 2 {
                    let popover = Rect::new(inner.x, inner.y + 2, inner.width, inner.height - 2);
                    CalendarView::new().render(popover, buf, self.input_date.calendar(), theme);
                }
            }
            Tab::Select => {
                SelectView::new().render(inner, buf, &self.select, theme);
            }
        }

        let hidden: Vec<String> = self
            .select
            .hidden_fields()
            .into_iter()
            .map(|f| format!("{}={}", f.name, f.value))
            .collect();
        let line = format!(
            "{}  |  {} listener(s)  |  {}",
            self.status,
            self.document
                .listener_count(ratatui_pickers::listeners::ListenerKind::KeyDown),
            hidden.join("&")
        );
        buf.set_span(status.x, status.y, &Span::styled(line, Style::default()), status.width);

        let modal = CommandPaletteView::modal_area(area, 48, 10);
        CommandPaletteView::new().render(modal, buf, &self.palette, theme);
    }
}

fn main() -> io::Result<()> {
    if let Ok(path) = std::env::var("PICKERS_LOG") {
        let file = std::fs::File::create(path)?;
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .finish();
        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let mut app = App::new();
    let res = run(&mut terminal, &theme, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    theme: &Theme,
    app: &mut App,
) -> io::Result<()> {
    while !app.quit {
        terminal.draw(|f| {
            let area = f.area();
            app.draw(area, f.buffer_mut(), theme);
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            let ev: Event = crossterm::event::read()?;
            if let Some(ev) = input_event_from_crossterm(ev) {
                // `[`/`]` page months on the calendar tab.
                if app.tab == Tab::Calendar
                    && !app.palette.is_modal_open()
                    && let InputEvent::Key(k) = &ev
                    && let KeyCode::Char(c @ ('[' | ']')) = k.code
                {
                    if c == '[' {
                        app.calendar.prev_month();
                    } else {
                        app.calendar.next_month();
                    }
                    continue;
                }
                app.handle(ev);
            }
        }
    }
    Ok(())
}
