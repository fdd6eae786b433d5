use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use team_builder::{
    capitalize, fetch_details, BrowseState, Pokemon, TeamStore, KNOWN_TYPES, TEAM_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

/// Results coming back from background fetches.
#[derive(Debug)]
pub enum Message {
    NamesLoaded(Vec<String>),
    PageLoaded(Vec<Pokemon>),
}

pub struct App {
    pub store: TeamStore,
    pub browse: BrowseState,
    pub state: TableState,
    pub mode: InputMode,
    pub type_cursor: usize,
    pub notice: Option<String>,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
}

impl App {
    pub fn new(store: TeamStore, page_size: usize) -> Self {
        let (tx, rx) = unbounded_channel();

        Self {
            store,
            browse: BrowseState::new(page_size),
            state: TableState::default(),
            mode: InputMode::Browse,
            type_cursor: 0,
            notice: None,
            tx,
            rx,
        }
    }

    /// Kick off the initial name list load.
    pub fn start(&self) {
        let client = self.store.catalog().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let names = client.list_all_names().await;
            let _ = tx.send(Message::NamesLoaded(names));
        });
    }

    /// Load details for the current page. No cancellation: an older load
    /// that finishes later overwrites a newer one.
    pub fn load_page(&mut self) {
        self.browse.begin_load();
        self.state.select(None);

        let names = self.browse.current_page_names();
        let client = self.store.catalog().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let pokemon = fetch_details(&client, &names).await;
            let _ = tx.send(Message::PageLoaded(pokemon));
        });
    }

    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::NamesLoaded(names) => {
                self.browse.set_names(names);
                if !self.browse.all_names().is_empty() {
                    self.load_page();
                }
            }
            Message::PageLoaded(pokemon) => {
                self.browse.finish_load(pokemon);
                self.reset_selection();
            }
        }
    }

    /// Returns false when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Browse => return self.handle_browse_key(key),
        }
        true
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = InputMode::Browse;
                self.load_page();
            }
            KeyCode::Backspace => self.browse.pop_query_char(),
            KeyCode::Char(c) => self.browse.push_query_char(c),
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        self.notice = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char(c @ '1'..='6') => {
                let slot = c as usize - '1' as usize;
                self.browse.select_slot(slot);
            }
            KeyCode::Enter => self.pick_selected(),
            KeyCode::Char('x') => self.remove_selected_slot(),
            KeyCode::Char('C') => self.store.clear(),
            KeyCode::Left => {
                self.type_cursor = (self.type_cursor + KNOWN_TYPES.len() - 1) % KNOWN_TYPES.len();
            }
            KeyCode::Right => {
                self.type_cursor = (self.type_cursor + 1) % KNOWN_TYPES.len();
            }
            KeyCode::Char(' ') => {
                self.browse.toggle_type(KNOWN_TYPES[self.type_cursor]);
                self.reset_selection();
            }
            KeyCode::Char('c') => {
                let had_query = !self.browse.query().is_empty();
                self.browse.clear_filters();
                if had_query {
                    self.load_page();
                } else {
                    self.reset_selection();
                }
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                if self.browse.next_page() {
                    self.load_page();
                }
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                if self.browse.prev_page() {
                    self.load_page();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            _ => {}
        }

        true
    }

    pub fn selected_pokemon(&self) -> Option<&Pokemon> {
        self.state
            .selected()
            .and_then(|i| self.browse.displayed().get(i).copied())
    }

    fn pick_selected(&mut self) {
        let Some(name) = self.selected_pokemon().map(|p| p.name.clone()) else {
            return;
        };

        match self.browse.pick(&name) {
            Ok(pick) => {
                let store = self.store.clone();
                tokio::spawn(async move {
                    pick.apply(&store).await;
                });
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn remove_selected_slot(&mut self) {
        match self.browse.selected_slot() {
            Some(slot) => {
                let _ = self.store.remove(slot);
            }
            None => self.notice = Some("Select a slot (1-6) to remove".to_string()),
        }
    }

    fn reset_selection(&mut self) {
        if self.browse.displayed().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.browse.displayed().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.browse.displayed().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

pub async fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    app.start();

    loop {
        app.drain_messages();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key) {
                    return Ok(());
                }
            }
        } else {
            tokio::task::yield_now().await;
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with search box
            Constraint::Min(0),    // Team panel + list
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(36), // Team panel
            Constraint::Min(0),     // Browse list
        ])
        .split(chunks[1]);

    render_team_panel(f, body[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Type filter chips
            Constraint::Min(0),    // Pokemon table
        ])
        .split(body[1]);

    render_type_filters(f, right[0], app);
    render_table(f, right[1], app);

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let searching = app.mode == InputMode::Search;
    let loading = app.browse.is_loading() || app.store.status().is_loading();

    let mut spans = vec![
        Span::styled(
            "Pokemon Search: ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if app.browse.query().is_empty() && !searching {
                "Search Pokemon...".to_string()
            } else {
                app.browse.query().to_string()
            },
            if searching {
                Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ),
    ];
    if searching {
        spans.push(Span::styled("█", Style::default().fg(Color::White)));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Page {}/{}", app.browse.page() + 1, app.browse.page_count()),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("{} matches", app.browse.matching_names().len()),
        Style::default().fg(Color::White),
    ));

    if loading {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled("Loading...", Style::default().fg(Color::Cyan)));
    }

    if let Some(slot) = app.browse.selected_slot() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("Slot {} selected - Enter adds the highlighted Pokemon", slot + 1),
            Style::default().fg(Color::LightBlue),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_team_panel(f: &mut Frame, area: Rect, app: &App) {
    let team = app.store.team();
    let stats = app.store.stats();
    let mut lines = Vec::new();

    if let Some(error) = app.store.status().error() {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    lines.push(stat_line("Slots:", format!("{}/{}", stats.filled_slots, TEAM_SIZE)));
    lines.push(stat_line("Types:", format!("{}/{}", stats.total_types, app.store.type_universe())));
    lines.push(stat_line("Coverage:", format!("{}%", stats.type_coverage)));
    lines.push(Line::from(""));

    for (i, slot) in team.slots().iter().enumerate() {
        let armed = app.browse.selected_slot() == Some(i);
        let marker = if armed {
            Span::styled("→ ", Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("  ")
        };
        let number = Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Yellow));

        let mut spans = vec![marker, number];
        match slot {
            Some(pokemon) => {
                spans.push(Span::styled(
                    format!("{:<12}", truncate(&pokemon.display_name(), 12)),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                for t in &pokemon.types {
                    spans.push(type_chip(&t.name, false));
                    spans.push(Span::raw(" "));
                }
            }
            None => spans.push(Span::styled(
                format!("+ Slot {}", i + 1),
                Style::default().fg(Color::DarkGray),
            )),
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Type Coverage",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));

    if team.covered_types().is_empty() {
        lines.push(Line::from(Span::styled(" No types covered", Style::default().fg(Color::DarkGray))));
    } else {
        let mut chips = vec![Span::raw(" ")];
        for t in team.covered_types() {
            chips.push(type_chip(t, true));
            chips.push(Span::raw(" "));
        }
        lines.push(Line::from(chips));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" My Team "),
        );

    f.render_widget(panel, area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {:<10}", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

fn render_type_filters(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    for (i, type_name) in KNOWN_TYPES.iter().enumerate() {
        let selected = app.browse.is_type_selected(type_name);
        let mut chip = type_chip(type_name, true);
        if !selected {
            chip.style = chip.style.add_modifier(Modifier::DIM);
        }
        if i == app.type_cursor {
            chip.style = chip.style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        spans.push(chip);
        spans.push(Span::raw(" "));
    }

    let title = if app.browse.has_filters() {
        " Filter by Type (c: clear filters) "
    } else {
        " Filter by Type "
    };

    let filters = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        );

    f.render_widget(filters, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Name", "Types"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let displayed = app.browse.displayed();
    let rows: Vec<Row> = displayed
        .iter()
        .map(|pokemon| {
            let mut chips = Vec::new();
            for t in &pokemon.types {
                chips.push(type_chip(&t.name, false));
                chips.push(Span::raw(" "));
            }

            Row::new(vec![
                Cell::from(format!("{:>4}", pokemon.id)),
                Cell::from(pokemon.name.clone()),
                Cell::from(Line::from(chips)),
            ])
            .height(1)
        })
        .collect();

    let title = if app.browse.is_loading() {
        " Pokemon (loading...) ".to_string()
    } else {
        format!(" Pokemon ({}) ", displayed.len())
    };
    let border = if app.browse.selected_slot().is_some() {
        Color::LightBlue
    } else {
        Color::White
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(24),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(notice) = &app.notice {
        status_spans.push(Span::styled(
            format!(" {} ", notice),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        status_spans.push(Span::raw(" | "));
    }

    let keys = [
        ("/", " Search | "),
        ("1-6", " Slot | "),
        ("Enter", " Add | "),
        ("x", " Remove | "),
        ("C", " Clear team | "),
        ("←/→ Space", " Type | "),
        ("n/p", " Page | "),
    ];
    for (key, label) in keys {
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn type_chip(type_name: &str, capitalized: bool) -> Span<'static> {
    let label = if capitalized {
        capitalize(type_name)
    } else {
        type_name.to_string()
    };
    Span::styled(
        label,
        Style::default().fg(Color::Black).bg(type_color(type_name)),
    )
}

fn type_color(type_name: &str) -> Color {
    match type_name {
        "normal" => Color::Rgb(168, 167, 122),
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "electric" => Color::Rgb(247, 208, 44),
        "grass" => Color::Rgb(122, 199, 76),
        "ice" => Color::Rgb(150, 217, 214),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "flying" => Color::Rgb(169, 143, 243),
        "psychic" => Color::Rgb(249, 85, 135),
        "bug" => Color::Rgb(166, 185, 26),
        "rock" => Color::Rgb(182, 161, 54),
        "ghost" => Color::Rgb(115, 87, 151),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "steel" => Color::Rgb(183, 183, 206),
        "fairy" => Color::Rgb(214, 133, 173),
        _ => Color::Gray,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
