use crate::export::{self, ExportPaths};
use crate::prestation::{Prestation, Quadrant, Recurrence, ScoreBand, MAX_RATING};
use crate::session::{Analysis, EntryForm, RecommendationKind, Session, SubmitOutcome};
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
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
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Entry,
    Analysis,
    Export,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Entry => Page::Analysis,
            Page::Analysis => Page::Export,
            Page::Export => Page::Entry,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Entry => Page::Export,
            Page::Analysis => Page::Entry,
            Page::Export => Page::Analysis,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Entry => "Saisie des Prestations",
            Page::Analysis => "Analyse & Priorisation",
            Page::Export => "Export",
        }
    }
}

/// Focusable element of the entry page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Recurrence,
    TimeConsumption,
    Profitability,
    Satisfaction,
    List,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Name => Field::Recurrence,
            Field::Recurrence => Field::TimeConsumption,
            Field::TimeConsumption => Field::Profitability,
            Field::Profitability => Field::Satisfaction,
            Field::Satisfaction => Field::List,
            Field::List => Field::List,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Name => Field::Name,
            Field::Recurrence => Field::Name,
            Field::TimeConsumption => Field::Recurrence,
            Field::Profitability => Field::TimeConsumption,
            Field::Satisfaction => Field::Profitability,
            Field::List => Field::Satisfaction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

pub struct App {
    pub session: Session,
    pub name: String,
    pub recurrence: Recurrence,
    pub time_consumption: u8,
    pub profitability: u8,
    pub satisfaction: u8,
    pub focus: Field,
    pub state: TableState,
    pub current_page: Page,
    pub output_dir: PathBuf,
    pub message: Option<StatusMessage>,
    pub last_export: Option<ExportPaths>,
}

impl App {
    pub fn new(session: Session, output_dir: PathBuf) -> Self {
        let defaults = EntryForm::default();

        let mut state = TableState::default();
        if !session.items().is_empty() {
            state.select(Some(0));
        }

        Self {
            session,
            name: defaults.name,
            recurrence: Recurrence::Daily,
            time_consumption: defaults.time_consumption,
            profitability: defaults.profitability,
            satisfaction: defaults.satisfaction,
            focus: Field::Name,
            state,
            current_page: Page::Entry,
            output_dir,
            message: None,
            last_export: None,
        }
    }

    pub fn form(&self) -> EntryForm {
        EntryForm {
            name: self.name.clone(),
            recurrence: self.recurrence.label().to_string(),
            time_consumption: self.time_consumption,
            profitability: self.profitability,
            satisfaction: self.satisfaction,
        }
    }

    fn set_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn submit(&mut self) {
        match self.session.submit(&self.form()) {
            Ok(SubmitOutcome::Added { index, message }) => {
                self.name.clear();
                self.state.select(Some(index));
                self.set_message(MessageKind::Success, message);
            }
            Ok(SubmitOutcome::Rejected { message }) => self.set_message(MessageKind::Error, message),
            Err(err) => self.set_message(MessageKind::Error, err.to_string()),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(index) = self.state.selected() else {
            return;
        };

        match self.session.delete(index) {
            Ok(removed) => {
                let len = self.session.items().len();
                self.state.select(if len == 0 { None } else { Some(index.min(len - 1)) });
                if len == 0 {
                    self.focus = Field::Satisfaction;
                }
                self.set_message(MessageKind::Info, format!("Prestation '{}' supprimée", removed.name));
            }
            Err(err) => self.set_message(MessageKind::Error, err.to_string()),
        }
    }

    pub fn toggle_first_time(&mut self) {
        let first_time = !self.session.is_first_time();
        self.session.set_first_time(first_time);
        self.set_message(
            MessageKind::Info,
            if first_time {
                "Mode première cartographie activé"
            } else {
                "Mode prestation prioritaire activé"
            },
        );
    }

    pub fn export(&mut self) {
        if self.session.items().is_empty() {
            self.set_message(
                MessageKind::Error,
                "Aucune prestation à exporter. Ajoutez d'abord des prestations.",
            );
            return;
        }

        let now = Local::now().naive_local();
        match export::write_exports(&self.output_dir, self.session.items(), &now) {
            Ok(paths) => {
                self.set_message(
                    MessageKind::Success,
                    format!("Export terminé : {}", paths.json.display()),
                );
                self.last_export = Some(paths);
            }
            Err(err) => {
                tracing::error!(error = %err, "export failed");
                self.set_message(MessageKind::Error, format!("Export impossible : {}", err));
            }
        }
    }

    fn adjust(&mut self, delta: i8) {
        let bump = |v: u8| -> u8 { (v as i16 + delta as i16).clamp(0, MAX_RATING as i16) as u8 };
        match self.focus {
            Field::Recurrence => {
                self.recurrence = if delta > 0 {
                    self.recurrence.next()
                } else {
                    self.recurrence.previous()
                };
            }
            Field::TimeConsumption => self.time_consumption = bump(self.time_consumption),
            Field::Profitability => self.profitability = bump(self.profitability),
            Field::Satisfaction => self.satisfaction = bump(self.satisfaction),
            Field::Name | Field::List => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.session.items().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.session.items().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Apply one key press. Returns `false` when the user asked to quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return false;
        }

        match key.code {
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
                return true;
            }
            KeyCode::BackTab => {
                self.previous_page();
                return true;
            }
            _ => {}
        }

        match self.current_page {
            Page::Entry => self.on_entry_key(key),
            Page::Analysis => match key.code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('f') => self.toggle_first_time(),
                _ => {}
            },
            Page::Export => match key.code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('e') => self.export(),
                _ => {}
            },
        }

        true
    }

    fn on_entry_key(&mut self, key: KeyEvent) {
        if self.focus == Field::List {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.state.selected().unwrap_or(0) == 0 {
                        self.focus = self.focus.previous();
                    } else {
                        self.previous();
                    }
                }
                KeyCode::Delete | KeyCode::Char('d') => self.delete_selected(),
                KeyCode::Home => self.state.select(Some(0)),
                KeyCode::End => {
                    if !self.session.items().is_empty() {
                        self.state.select(Some(self.session.items().len() - 1));
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Down => {
                let next = self.focus.next();
                if next != Field::List || !self.session.items().is_empty() {
                    self.focus = next;
                    if next == Field::List && self.state.selected().is_none() {
                        self.state.select(Some(0));
                    }
                }
            }
            KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Backspace if self.focus == Field::Name => {
                self.name.pop();
            }
            KeyCode::Char(c) if self.focus == Field::Name => self.name.push(c),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal UI stopped");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.on_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Entry => render_entry(f, chunks[1], app),
        Page::Analysis => render_analysis(f, chunks[1], app),
        Page::Export => render_export(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        " FIAE ",
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
    )];
    tab_spans.push(Span::raw("  "));

    for (i, page) in [Page::Entry, Page::Analysis, Page::Export].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    for step in 1..=3u8 {
        if step > 1 {
            tab_spans.push(Span::styled("━━━", Style::default().fg(Color::DarkGray)));
        }
        let style = if step == app.session.current_step() {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(format!(" {} ", step), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Prestations: {}", app.session.items().len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Module 1 : Priorisation des Prestations "),
    );

    f.render_widget(header, area);
}

// ============================================================================
// ENTRY PAGE
// ============================================================================

fn render_entry(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_form(f, chunks[0], app);
    render_list(f, chunks[1], app);
}

fn field_label(app: &App, field: Field, label: &str) -> Span<'static> {
    let style = if app.focus == field {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let marker = if app.focus == field { "→ " } else { "  " };
    Span::styled(format!("{}{}", marker, label), style)
}

fn slider(value: u8) -> Span<'static> {
    let filled = value as usize;
    let empty = MAX_RATING as usize - filled;
    Span::styled(
        format!("{}{} {:>2}/10", "█".repeat(filled), "░".repeat(empty), value),
        Style::default().fg(Color::Green),
    )
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let name = if app.name.is_empty() && app.focus != Field::Name {
        Span::styled("Ex: Formation IA collective", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(format!("{}{}", app.name, if app.focus == Field::Name { "▏" } else { "" }))
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![field_label(app, Field::Name, "Nom de la prestation: "), name]),
        Line::from(""),
        Line::from(vec![
            field_label(app, Field::Recurrence, "Récurrence:           "),
            Span::styled(
                format!("◀ {} ▶", app.recurrence.label()),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Évaluations (0 = faible, 10 = élevé)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(vec![
            field_label(app, Field::TimeConsumption, "Aspect chronophage:   "),
            slider(app.time_consumption),
        ]),
        Line::from(vec![
            field_label(app, Field::Profitability, "Rentabilité:          "),
            slider(app.profitability),
        ]),
        Line::from(vec![
            field_label(app, Field::Satisfaction, "Satisfaction client:  "),
            slider(app.satisfaction),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                " Enter: Ajouter cette prestation ",
                Style::default().fg(Color::Black).bg(Color::Green),
            ),
        ]),
    ];

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Ajouter une nouvelle prestation "),
    );

    f.render_widget(form, area);
}

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::High => Color::Green,
        ScoreBand::Medium => Color::White,
        ScoreBand::Low => Color::DarkGray,
    }
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn prestation_row(p: &Prestation) -> Row<'static> {
    Row::new(vec![
        Cell::from(truncate(&p.name, 30)),
        Cell::from(p.recurrence.label()),
        Cell::from(format!("{}/10", p.time_consumption)),
        Cell::from(format!("{}/10", p.profitability)),
        Cell::from(format!("{}/10", p.satisfaction)),
        Cell::from(format!("{:.2}", p.score)).style(Style::default().fg(band_color(p.band()))),
    ])
    .height(1)
}

const PRESTATION_WIDTHS: [Constraint; 6] = [
    Constraint::Min(20),
    Constraint::Length(13),
    Constraint::Length(7),
    Constraint::Length(7),
    Constraint::Length(7),
    Constraint::Length(7),
];

fn render_list(f: &mut Frame, area: Rect, app: &mut App) {
    if app.session.items().is_empty() {
        let empty = Paragraph::new("\n  Aucune prestation enregistrée pour le moment.").block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Vos prestations enregistrées "),
        );
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app.session.items().iter().map(prestation_row).collect();
    let border = if app.focus == Field::List { Color::Yellow } else { Color::White };

    let table = Table::new(rows, PRESTATION_WIDTHS)
        .header(header_row(&["Nom", "Récurrence", "Chrono", "Rentab.", "Satisf.", "Score"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Vos prestations enregistrées (d: supprimer) "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

// ============================================================================
// ANALYSIS PAGE
// ============================================================================

fn render_empty_hint(f: &mut Frame, area: Rect, title: &str, text: &str) {
    let hint = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", text), Style::default().fg(Color::Cyan))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title.to_string()),
    );
    f.render_widget(hint, area);
}

fn render_analysis(f: &mut Frame, area: Rect, app: &App) {
    let Some(analysis) = app.session.analysis() else {
        render_empty_hint(
            f,
            area,
            " Analyse ",
            "Commencez par ajouter vos prestations dans l'onglet 'Saisie des Prestations'",
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),      // Metrics
            Constraint::Percentage(45), // Matrix
            Constraint::Min(0),         // Table + recommendation
        ])
        .split(area);

    render_metrics(f, rows[0], &analysis);
    render_matrix(f, rows[1], &analysis);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    render_ranked_table(f, bottom[0], &analysis);
    render_recommendation(f, bottom[1], &analysis, app.session.is_first_time());
}

fn render_metrics(f: &mut Frame, area: Rect, analysis: &Analysis) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let agg = &analysis.aggregate;
    let metrics = [
        ("Total Prestations", agg.count.to_string()),
        ("Charge Moyenne", format!("{:.1}/10", agg.mean_time_consumption)),
        ("Rentabilité Moy.", format!("{:.1}/10", agg.mean_profitability)),
        ("Quick Wins", agg.quick_win_count.to_string()),
    ];

    for (cell, (title, value)) in cells.iter().zip(metrics) {
        let card = Paragraph::new(Line::from(Span::styled(
            format!(" {}", value),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", title)),
        );
        f.render_widget(card, *cell);
    }
}

fn quadrant_color(quadrant: Quadrant) -> Color {
    match quadrant {
        Quadrant::QuickWin => Color::Green,
        Quadrant::MajorProject => Color::Cyan,
        Quadrant::Reconsider => Color::Yellow,
        Quadrant::Optimize => Color::Red,
    }
}

fn render_matrix(f: &mut Frame, area: Rect, analysis: &Analysis) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut cells = Vec::with_capacity(4);
    for half in halves.iter() {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*half);
        cells.extend(split.iter().copied());
    }

    for (quadrant, cell) in Quadrant::ALL.iter().zip(cells) {
        let color = quadrant_color(*quadrant);
        let items = analysis.matrix.cell(*quadrant);

        let lines: Vec<Line> = if items.is_empty() {
            vec![Line::from(Span::styled(
                " Aucune prestation dans cette catégorie",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))]
        } else {
            items
                .iter()
                .map(|p| {
                    Line::from(vec![
                        Span::styled(" • ", Style::default().fg(color)),
                        Span::raw(truncate(&p.name, 40)),
                        Span::styled(format!(" - Score: {}", p.score), Style::default().fg(color)),
                    ])
                })
                .collect()
        };

        let block = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", quadrant.title())),
        );
        f.render_widget(block, cell);
    }
}

fn render_ranked_table(f: &mut Frame, area: Rect, analysis: &Analysis) {
    let rows = analysis.table.iter().map(|row| {
        Row::new(vec![
            Cell::from(truncate(&row.name, 30)),
            Cell::from(row.recurrence.label()),
            Cell::from(row.time_consumption.to_string()),
            Cell::from(row.profitability.to_string()),
            Cell::from(row.satisfaction.to_string()),
            Cell::from(format!("{:.1}", row.impact)),
            Cell::from(format!("{:.2}", row.score)).style(
                Style::default()
                    .fg(band_color(row.band))
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(13),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header_row(&["Nom", "Récurrence", "Chrono", "Rentab.", "Satisf.", "Impact", "Score"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Tableau d'analyse détaillé "),
    );

    f.render_widget(table, area);
}

fn render_recommendation(f: &mut Frame, area: Rect, analysis: &Analysis, first_time: bool) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let tip = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

    let (title, content) = match &analysis.recommendation {
        Some(rec) if rec.kind == RecommendationKind::FirstSteps => (
            " Recommandation pour débuter ",
            vec![
                Line::from(Span::styled(format!("Commencez par : {}", rec.prestation.name), bold)),
                Line::from("Idéale pour votre première cartographie :"),
                Line::from(format!(
                    " • Effort modéré (chronophage : {}/10)",
                    rec.prestation.time_consumption
                )),
                Line::from(format!(
                    " • Impact significatif (rentabilité : {}/10)",
                    rec.prestation.profitability
                )),
                Line::from(" • Processus représentatif de vos activités"),
                Line::from(""),
                Line::from(Span::styled(
                    "Conseil : maîtrisez d'abord cette cartographie simple.",
                    tip,
                )),
            ],
        ),
        Some(rec) => (
            " Prestation prioritaire ",
            vec![
                Line::from(Span::styled(
                    format!("Focalisez-vous sur : {}", rec.prestation.name),
                    bold,
                )),
                Line::from(format!("Score global : {}/10", rec.prestation.score)),
                Line::from("Meilleur potentiel de ROI avec l'automatisation IA."),
            ],
        ),
        None => (
            " Recommandation ",
            vec![Line::from(Span::styled(
                "Aucune prestation peu chronophage (≤ 5) à recommander.",
                Style::default().fg(Color::DarkGray),
            ))],
        ),
    };

    let mut lines = content;
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "f: mode {}",
            if first_time { "prestation prioritaire" } else { "première cartographie" }
        ),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(title),
    );

    f.render_widget(panel, area);
}

// ============================================================================
// EXPORT PAGE
// ============================================================================

fn render_export(f: &mut Frame, area: Rect, app: &App) {
    if app.session.items().is_empty() {
        render_empty_hint(
            f,
            area,
            " Export des données ",
            "Aucune prestation à exporter. Ajoutez d'abord des prestations.",
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let mut info = vec![
        Line::from(vec![
            Span::styled("  e", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" : écrire le CSV et le JSON (pour le Module 2) dans "),
            Span::styled(
                app.output_dir.display().to_string(),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(""),
    ];
    if let Some(paths) = &app.last_export {
        info.push(Line::from(format!("  CSV  : {}", paths.csv.display())));
        info.push(Line::from(format!("  JSON : {}", paths.json.display())));
    }

    let header = Paragraph::new(info).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Export des données "),
    );
    f.render_widget(header, chunks[0]);

    let rows: Vec<Row> = app.session.items().iter().map(prestation_row).collect();
    let preview = Table::new(rows, PRESTATION_WIDTHS)
        .header(header_row(&["Nom", "Récurrence", "Chrono", "Rentab.", "Satisf.", "Score"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Aperçu des données "),
        );
    f.render_widget(preview, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(message) = &app.message {
        let color = match message.kind {
            MessageKind::Success => Color::Green,
            MessageKind::Error => Color::Red,
            MessageKind::Info => Color::Cyan,
        };
        status_spans.push(Span::styled(format!(" {} ", message.text), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Champ | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Valeur | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quitter"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App {
        App::new(Session::new(), PathBuf::from("."))
    }

    #[test]
    fn test_form_submit_adds_and_clears_name() {
        let mut app = app();
        type_text(&mut app, "Coaching");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right); // Hebdomadaire
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Left); // chronophage 4
        press(&mut app, KeyCode::Enter);

        let item = &app.session.items()[0];
        assert_eq!(item.name, "Coaching");
        assert_eq!(item.recurrence, Recurrence::Weekly);
        assert_eq!(item.time_consumption, 4);
        assert!(app.name.is_empty());
        assert_eq!(app.message.as_ref().unwrap().kind, MessageKind::Success);
    }

    #[test]
    fn test_empty_name_shows_error() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        assert!(app.session.items().is_empty());
        assert_eq!(app.message.as_ref().unwrap().kind, MessageKind::Error);
    }

    #[test]
    fn test_q_is_text_in_name_field() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.name, "q");

        app.current_page = Page::Analysis;
        assert!(!press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_sliders_clamp() {
        let mut app = app();
        app.focus = Field::Satisfaction;
        for _ in 0..20 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.satisfaction, 10);
    }

    #[test]
    fn test_delete_selected_from_list() {
        let mut app = app();
        type_text(&mut app, "A");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "B");
        press(&mut app, KeyCode::Enter);

        app.focus = Field::List;
        app.state.select(Some(0));
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.session.items().len(), 1);
        assert_eq!(app.session.items()[0].name, "B");
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_toggle_first_time_on_analysis_page() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Analysis);

        press(&mut app, KeyCode::Char('f'));
        assert!(!app.session.is_first_time());
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(Session::new(), dir.path().to_path_buf());
        type_text(&mut app, "Audit");
        press(&mut app, KeyCode::Enter);

        app.current_page = Page::Export;
        press(&mut app, KeyCode::Char('e'));

        let paths = app.last_export.clone().unwrap();
        assert!(paths.csv.exists());
        assert!(paths.json.exists());
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Prestation équipe", 100), "Prestation équipe");
        assert_eq!(truncate("éééééééé", 6), "ééé...");
    }
}
