//! Interactive report viewer
//!
//! Loads run in the background through [`ReportLoader`]; the event loop polls
//! the keyboard and drains load outcomes between frames, so a reload never
//! blocks input and only the most recent request is ever applied.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use auditview_core::{
    AuditConfig, LoadOutcome, ReportController, ReportLoader, ReportSnapshot, ReportSource,
    ReportState, SourceClient, SourceError, ViewState,
};
use auditview_viz::{
    CommandRasterizer, Exporter, OutputFormat, PdfRasterizer, Report, ReportEngine, TableFocus,
    TerminalRenderer, VizConfig,
};
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

const TICK: Duration = Duration::from_millis(100);
const PAGE: u16 = 20;

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Reload,
    Export(OutputFormat),
}

/// Viewer state, independent of the terminal
pub struct App {
    controller: ReportController,
    snapshot: Option<ReportSnapshot>,
    report: Option<Report>,
    viz: VizConfig,
    view: ViewState,
    focus: TableFocus,
    scroll: u16,
    alert: Option<String>,
    status: Option<String>,
}

impl App {
    /// Create a new viewer for the given effective config
    pub fn new(config: &AuditConfig) -> Self {
        let viz = VizConfig {
            print: config.print_view(),
            palette: config.palette(),
            ..VizConfig::default()
        };
        Self {
            controller: ReportController::new(),
            snapshot: None,
            report: None,
            viz,
            view: ViewState {
                backend: config.backend.clone(),
                print: viz.print,
            },
            focus: TableFocus { table: 0, column: 0 },
            scroll: 0,
            alert: None,
            status: None,
        }
    }

    pub const fn state(&self) -> &ReportState {
        self.controller.state()
    }

    pub const fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub const fn focus(&self) -> TableFocus {
        self.focus
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.controller.notice()
    }

    pub const fn print(&self) -> bool {
        self.viz.print
    }

    /// Share query for the current view
    pub fn share_query(&self) -> String {
        self.view.to_query()
    }

    /// Main pane text while there is no report to draw
    pub fn placeholder(&self, label: &str) -> String {
        if self.state().is_loading() {
            format!("Loading report from {label}…")
        } else {
            format!("No report loaded from {label}. Press r to reload, q to quit")
        }
    }

    pub fn begin_load(&mut self) {
        self.controller.begin_load();
    }

    pub fn fail_unconfigured(&mut self) {
        self.controller.fail_unconfigured();
    }

    /// Apply a load outcome. A new snapshot rebuilds the report; a rejected
    /// file keeps the report on screen together with its sort state.
    pub fn apply(&mut self, outcome: LoadOutcome) {
        self.controller.apply(outcome);
        match self.controller.state() {
            ReportState::Ready(snapshot) => {
                let fresh = self
                    .snapshot
                    .as_ref()
                    .map_or(true, |shown| !Arc::ptr_eq(&shown.raw, &snapshot.raw));
                if fresh {
                    let snapshot = snapshot.clone();
                    self.show(snapshot);
                }
            }
            ReportState::Failed(_) => {
                self.snapshot = None;
                self.report = None;
            }
            ReportState::Idle | ReportState::Loading => {}
        }
    }

    fn show(&mut self, snapshot: ReportSnapshot) {
        let report = ReportEngine::new()
            .with_config(self.viz)
            .build(&snapshot, Utc::now());
        debug!("Showing {} tables from {}", report.table_count(), snapshot.origin);
        self.report = Some(report);
        self.snapshot = Some(snapshot);
        self.focus = TableFocus { table: 0, column: 0 };
        self.scroll = 0;
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        // The alert blocks everything until acknowledged
        if self.alert.take().is_some() {
            return Action::None;
        }
        self.status = None;

        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('e') => return Action::Export(OutputFormat::Json),
            KeyCode::Char('h') => return Action::Export(OutputFormat::Html),
            KeyCode::Char('d') => return Action::Export(OutputFormat::Pdf),
            KeyCode::Esc => self.controller.dismiss_notice(),
            KeyCode::Tab => self.step_table(1),
            KeyCode::BackTab => self.step_table(-1),
            KeyCode::Right => self.step_column(1),
            KeyCode::Left => self.step_column(-1),
            KeyCode::Enter | KeyCode::Char('s') => self.sort_focused(),
            KeyCode::Char('p') => self.toggle_print(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(PAGE),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
        Action::None
    }

    fn step_table(&mut self, delta: isize) {
        let count = self.report.as_ref().map_or(0, Report::table_count);
        if count == 0 {
            return;
        }
        let next = (self.focus.table as isize + delta).rem_euclid(count as isize);
        self.focus = TableFocus {
            table: next as usize,
            column: 0,
        };
    }

    fn step_column(&mut self, delta: isize) {
        let columns = self
            .report
            .as_ref()
            .and_then(|report| report.tables().nth(self.focus.table))
            .map_or(0, |table| table.model.columns.len());
        if columns == 0 {
            return;
        }
        let next = (self.focus.column as isize + delta).rem_euclid(columns as isize);
        self.focus.column = next as usize;
    }

    fn sort_focused(&mut self) {
        let focus = self.focus;
        if let Some(table) = self.report.as_mut().and_then(|r| r.table_mut(focus.table)) {
            table.request_sort(focus.column);
        }
    }

    fn toggle_print(&mut self) {
        self.viz.print = !self.viz.print;
        self.view.print = self.viz.print;
    }

    /// Export the report on screen. Failures raise the blocking alert.
    pub async fn export<R: PdfRasterizer>(&mut self, exporter: &Exporter<R>, format: OutputFormat) {
        let (Some(snapshot), Some(report)) = (&self.snapshot, &self.report) else {
            self.status = Some("No report loaded".to_string());
            return;
        };
        match exporter.export(format, snapshot, report).await {
            Ok(path) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => self.alert = Some(e.to_string()),
        }
    }
}

/// Restores the terminal however the viewer exits
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the interactive viewer until the user quits
pub async fn run(
    config: AuditConfig,
    source: std::result::Result<ReportSource, SourceError>,
    output_dir: PathBuf,
) -> Result<()> {
    let client = SourceClient::new(config.timeout())?;
    let (mut loader, mut outcomes) = ReportLoader::new(client);
    let exporter = Exporter::new(
        output_dir,
        CommandRasterizer::new(config.pdf_command(), config.pdf_args.clone()),
    );

    let mut app = App::new(&config);
    let source = source.ok();
    match &source {
        Some(source) => {
            info!("Starting viewer for {source}");
            app.begin_load();
            loader.start(source.clone());
        }
        None => app.fail_unconfigured(),
    }

    let _guard = TerminalGuard::enter()?;
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let label = source.as_ref().map_or_else(|| "no source".to_string(), ToString::to_string);

    loop {
        while let Ok(outcome) = outcomes.try_recv() {
            if let Some(outcome) = loader.accept(outcome) {
                app.apply(outcome);
            }
        }

        terminal.draw(|frame| draw(frame, &app, &label))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::Quit => break,
            Action::Reload => {
                if let Some(source) = &source {
                    app.begin_load();
                    loader.start(source.clone());
                }
            }
            Action::Export(format) => app.export(&exporter, format).await,
            Action::None => {}
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &App, label: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());

    match (app.state(), app.report()) {
        (ReportState::Failed(message), _) => draw_error(frame, chunks[0], message),
        (_, Some(report)) => {
            let lines = TerminalRenderer::new(chunks[0].width, app.print())
                .lines(report, Some(app.focus()));
            frame.render_widget(Paragraph::new(lines).scroll((app.scroll, 0)), chunks[0]);
        }
        (_, None) => {
            let text = app.placeholder(label);
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
                chunks[0],
            );
        }
    }

    draw_status(frame, chunks[1], app);

    if let Some(alert) = app.alert() {
        draw_alert(frame, alert);
    }
}

fn draw_error(frame: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "Failed to load report",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "r retry  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default().borders(Borders::ALL).title(" auditview ");
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    if app.state().is_loading() {
        spans.push(Span::styled("Loading… ", Style::default().fg(Color::Cyan)));
    }
    if let Some(notice) = app.notice() {
        spans.push(Span::styled(
            format!("{notice} (Esc) "),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(status) = &app.status {
        spans.push(Span::styled(format!("{status} "), Style::default().fg(Color::Green)));
    } else {
        spans.push(Span::styled(
            "Tab table  ←/→ column  Enter sort  p print  e/h/d export  r reload  q quit ",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let query = app.share_query();
    if !query.is_empty() {
        spans.push(Span::raw(format!("?{query}")));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = centered(frame.size(), 60, 7);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Export failed ")
        .style(Style::default().fg(Color::Red));
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("Press any key", Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
