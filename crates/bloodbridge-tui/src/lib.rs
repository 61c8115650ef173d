// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use bloodbridge_app::{
    AppCommand, AppState, BloodRequest, DashboardCounts, Decision, Donation, Donor,
    EligibilityPolicy, Hospital, Inventory, InventoryEntry, ListRow, ListState, PageControl,
    RequestId, Role, ScreenKind, pie_slices,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::{Date, OffsetDateTime};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const DASHBOARD_ELIGIBILITY: EligibilityPolicy = EligibilityPolicy::DonationHistory;

/// Data source and action sink behind the list screens.
pub trait ListRuntime {
    fn load_donors(&mut self) -> Result<Vec<Donor>>;
    fn load_hospitals(&mut self) -> Result<Vec<Hospital>>;
    fn load_requests(&mut self) -> Result<Vec<BloodRequest>>;
    fn load_donations(&mut self) -> Result<Vec<Donation>>;
    fn load_inventory(&mut self) -> Result<Inventory>;
    fn decide_request(&mut self, id: RequestId, decision: Decision) -> Result<()>;

    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    Type(char),
    Backspace,
    ClearQuery,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    CyclePageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    App(AppCommand),
    List(ListCommand),
    Decide(Decision),
    Refresh,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone)]
pub struct ViewData {
    pub donors: ListState<Donor>,
    pub hospitals: ListState<Hospital>,
    pub requests: ListState<BloodRequest>,
    pub donations: ListState<Donation>,
    pub inventory: ListState<InventoryEntry>,
    pub stock: Inventory,
    pub counts: DashboardCounts,
    pub eligible_donors: usize,
    status_token: u64,
}

impl ViewData {
    pub fn new(page_size: i64) -> Result<Self> {
        Ok(Self {
            donors: ListState::new(page_size)?,
            hospitals: ListState::new(page_size)?,
            requests: ListState::new(page_size)?,
            donations: ListState::new(page_size)?,
            inventory: ListState::new(page_size)?,
            stock: Inventory::new(),
            counts: DashboardCounts::default(),
            eligible_donors: 0,
            status_token: 0,
        })
    }

    pub fn query(&self, screen: ScreenKind) -> &str {
        match screen {
            ScreenKind::Dashboard => "",
            ScreenKind::Donors => self.donors.query(),
            ScreenKind::Hospitals => self.hospitals.query(),
            ScreenKind::Requests => self.requests.query(),
            ScreenKind::Donations => self.donations.query(),
            ScreenKind::Inventory => self.inventory.query(),
        }
    }

    pub fn page_size(&self, screen: ScreenKind) -> Option<usize> {
        match screen {
            ScreenKind::Dashboard => None,
            ScreenKind::Donors => Some(self.donors.page_size()),
            ScreenKind::Hospitals => Some(self.hospitals.page_size()),
            ScreenKind::Requests => Some(self.requests.page_size()),
            ScreenKind::Donations => Some(self.donations.page_size()),
            ScreenKind::Inventory => Some(self.inventory.page_size()),
        }
    }

    /// Applies `command` to the list on `screen`. Returns a status message
    /// when the command changes something worth announcing.
    pub fn apply(&mut self, screen: ScreenKind, command: ListCommand) -> Option<String> {
        match screen {
            ScreenKind::Dashboard => None,
            ScreenKind::Donors => apply_list_command(&mut self.donors, command),
            ScreenKind::Hospitals => apply_list_command(&mut self.hospitals, command),
            ScreenKind::Requests => apply_list_command(&mut self.requests, command),
            ScreenKind::Donations => apply_list_command(&mut self.donations, command),
            ScreenKind::Inventory => apply_list_command(&mut self.inventory, command),
        }
    }

    fn first_visible_pending_request(&self) -> Option<RequestId> {
        self.requests
            .derive()
            .visible_rows
            .into_iter()
            .find(|request| request.status.is_pending())
            .map(|request| request.id)
    }
}

pub fn run_app<R: ListRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    page_size: i64,
) -> Result<()> {
    let mut view_data = ViewData::new(page_size).context("invalid [ui].page_size")?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        log::warn!("initial load failed: {error:#}");
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

pub fn refresh_view_data<R: ListRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    let screens = state.screens();
    if screens.contains(&ScreenKind::Donors) {
        view_data
            .donors
            .set_rows(runtime.load_donors().context("load donors")?);
    }
    if screens.contains(&ScreenKind::Hospitals) {
        view_data
            .hospitals
            .set_rows(runtime.load_hospitals().context("load hospitals")?);
    }
    if screens.contains(&ScreenKind::Requests) {
        view_data
            .requests
            .set_rows(runtime.load_requests().context("load requests")?);
    }
    if screens.contains(&ScreenKind::Donations) {
        view_data
            .donations
            .set_rows(runtime.load_donations().context("load donations")?);
    }
    if screens.contains(&ScreenKind::Inventory) {
        view_data.stock = runtime.load_inventory().context("load inventory")?;
        view_data.inventory.set_rows(view_data.stock.entries());
    }

    view_data.counts = DashboardCounts::from_lists(
        view_data.donors.rows(),
        view_data.hospitals.rows(),
        view_data.donations.rows(),
        view_data.requests.rows(),
        &view_data.stock,
    );
    view_data.eligible_donors = DASHBOARD_ELIGIBILITY
        .eligible_donors(view_data.donors.rows(), runtime.today())
        .count();
    log::debug!(
        "refreshed {} screens for {}",
        screens.len(),
        state.role.as_str()
    );
    Ok(())
}

/// Maps a key press to an action. `query_empty` decides whether Esc clears
/// the search or quits.
pub fn key_action(key: KeyEvent, query_empty: bool) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q') | KeyCode::Char('c'), modifiers)
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            KeyAction::Quit
        }
        (KeyCode::Char('p'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::List(ListCommand::CyclePageSize)
        }
        (KeyCode::Char('a'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Decide(Decision::Accept)
        }
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Decide(Decision::Decline)
        }
        (KeyCode::Char('r'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Refresh
        }
        (KeyCode::Char(_), modifiers)
            if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            KeyAction::Ignore
        }
        (KeyCode::Char(ch), _) => KeyAction::List(ListCommand::Type(ch)),
        (KeyCode::Backspace, _) => KeyAction::List(ListCommand::Backspace),
        (KeyCode::Left, _) => KeyAction::List(ListCommand::PrevPage),
        (KeyCode::Right, _) => KeyAction::List(ListCommand::NextPage),
        (KeyCode::Home, _) => KeyAction::List(ListCommand::FirstPage),
        (KeyCode::End, _) => KeyAction::List(ListCommand::LastPage),
        (KeyCode::Tab, _) => KeyAction::App(AppCommand::NextScreen),
        (KeyCode::BackTab, _) => KeyAction::App(AppCommand::PrevScreen),
        (KeyCode::Esc, _) if query_empty => KeyAction::Quit,
        (KeyCode::Esc, _) => KeyAction::List(ListCommand::ClearQuery),
        _ => KeyAction::Ignore,
    }
}

fn handle_key_event<R: ListRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let screen = state.active_screen;
    match key_action(key, view_data.query(screen).is_empty()) {
        KeyAction::Quit => return true,
        KeyAction::App(command) => {
            state.dispatch(command);
        }
        KeyAction::List(command) => {
            if let Some(message) = view_data.apply(screen, command) {
                emit_status(state, view_data, internal_tx, message);
            }
        }
        KeyAction::Decide(decision) => {
            decide_first_pending(state, runtime, view_data, internal_tx, decision);
        }
        KeyAction::Refresh => match refresh_view_data(state, runtime, view_data) {
            Ok(()) => emit_status(state, view_data, internal_tx, "refreshed"),
            Err(error) => {
                log::warn!("refresh failed: {error:#}");
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("refresh failed: {error}"),
                );
            }
        },
        KeyAction::Ignore => {}
    }
    false
}

fn decide_first_pending<R: ListRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    decision: Decision,
) {
    if state.active_screen != ScreenKind::Requests {
        return;
    }
    if state.role != Role::Admin {
        emit_status(
            state,
            view_data,
            internal_tx,
            "only admins can decide requests",
        );
        return;
    }
    let Some(id) = view_data.first_visible_pending_request() else {
        emit_status(
            state,
            view_data,
            internal_tx,
            "no pending request on this page",
        );
        return;
    };

    let message = match runtime.decide_request(id, decision) {
        Ok(()) => {
            log::info!("request {id} {}", decision.outcome().as_str());
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                log::warn!("reload after decision failed: {error:#}");
            }
            format!(
                "request {id} {}",
                decision.outcome().as_str().to_lowercase()
            )
        }
        Err(error) => {
            log::warn!("{} request {id} failed: {error:#}", decision.verb());
            format!("{} failed: {error:#}", decision.verb())
        }
    };
    emit_status(state, view_data, internal_tx, message);
}

fn apply_list_command<R: ListRow>(
    list: &mut ListState<R>,
    command: ListCommand,
) -> Option<String> {
    match command {
        ListCommand::Type(ch) => {
            let mut query = list.query().to_owned();
            query.push(ch);
            list.set_query(query);
        }
        ListCommand::Backspace => {
            let mut query = list.query().to_owned();
            if query.pop().is_none() {
                return None;
            }
            list.set_query(query);
        }
        ListCommand::ClearQuery => list.set_query(""),
        ListCommand::PrevPage => list.prev_page(),
        ListCommand::NextPage => list.next_page(),
        ListCommand::FirstPage => list.first_page(),
        ListCommand::LastPage => list.last_page(),
        ListCommand::CyclePageSize => {
            let size = list.cycle_page_size();
            return Some(format!("{size} entries per page"));
        }
    }
    None
}

pub fn page_controls_text(controls: &[PageControl]) -> String {
    let mut text = String::new();
    for (index, control) in controls.iter().enumerate() {
        if index > 0 {
            text.push_str(control_separator(&controls[index - 1], control));
        }
        text.push_str(&control_text(control));
    }
    text
}

fn page_controls_line(controls: &[PageControl]) -> Line<'static> {
    let mut spans = Vec::with_capacity(controls.len() * 2);
    for (index, control) in controls.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(control_separator(&controls[index - 1], control)));
        }
        let style = match control {
            PageControl::Previous { disabled: true, .. }
            | PageControl::Next { disabled: true, .. } => Style::default().fg(Color::DarkGray),
            PageControl::Page { current: true, .. } => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            _ => Style::default(),
        };
        spans.push(Span::styled(control_text(control), style));
    }
    Line::from(spans)
}

fn control_text(control: &PageControl) -> String {
    match control {
        PageControl::Previous { .. } => format!("‹ {}", control.label()),
        PageControl::Next { .. } => format!("{} ›", control.label()),
        PageControl::Page { current: true, .. } => format!("[{}]", control.label()),
        PageControl::Page { .. } => control.label(),
    }
}

fn control_separator(left: &PageControl, right: &PageControl) -> &'static str {
    match (left, right) {
        (PageControl::Page { .. }, PageControl::Page { .. }) => " ",
        _ => "  ",
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let screens = state.screens();
    let selected = screens
        .iter()
        .position(|screen| *screen == state.active_screen)
        .unwrap_or(0);
    let tabs = Tabs::new(
        screens
            .iter()
            .map(|screen| screen.label().to_owned())
            .collect::<Vec<String>>(),
    )
    .block(
        Block::default()
            .title(format!("bloodbridge ({})", state.role.as_str()))
            .borders(Borders::ALL),
    )
    .style(Style::default().fg(Color::White))
    .highlight_style(
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    )
    .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_screen {
        ScreenKind::Dashboard => {
            let body = Paragraph::new(render_dashboard_text(view_data))
                .block(Block::default().borders(Borders::ALL).title("dashboard"));
            frame.render_widget(body, layout[1]);
        }
        ScreenKind::Donors => render_list(
            frame,
            layout[1],
            "donors",
            &Donor::COLUMNS,
            &view_data.donors,
        ),
        ScreenKind::Hospitals => render_list(
            frame,
            layout[1],
            "hospitals",
            &Hospital::COLUMNS,
            &view_data.hospitals,
        ),
        ScreenKind::Requests => render_list(
            frame,
            layout[1],
            "requests",
            &BloodRequest::COLUMNS,
            &view_data.requests,
        ),
        ScreenKind::Donations => render_list(
            frame,
            layout[1],
            "donations",
            &Donation::COLUMNS,
            &view_data.donations,
        ),
        ScreenKind::Inventory => render_list(
            frame,
            layout[1],
            "inventory",
            &InventoryEntry::COLUMNS,
            &view_data.inventory,
        ),
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);
}

fn render_list<R: ListRow>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    columns: &[&str],
    list: &ListState<R>,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);

    let view = list.derive();
    let header = Row::new(columns.iter().map(|column| {
        Cell::from(*column).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let rows = view
        .visible_rows
        .iter()
        .map(|row| Row::new(row.cells().into_iter().map(Cell::from)));
    let widths = vec![Constraint::Min(6); columns.len().max(1)];

    let block_title = if list.query().is_empty() {
        title.to_owned()
    } else {
        format!("{title} / {}", list.query())
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(block_title).borders(Borders::ALL));
    frame.render_widget(table, sections[0]);

    let footer = Paragraph::new(vec![
        Line::from(view.summary()),
        page_controls_line(&view.page_controls()),
    ]);
    frame.render_widget(footer, sections[1]);
}

fn render_dashboard_text(view_data: &ViewData) -> String {
    let counts = &view_data.counts;
    let mut lines = vec![
        format!("donors        {}", counts.donors),
        format!(
            "eligible      {} ({} since last donation)",
            view_data.eligible_donors,
            DASHBOARD_ELIGIBILITY.label()
        ),
        format!("hospitals     {}", counts.hospitals),
        format!("donations     {}", counts.donations),
        format!(
            "requests      {} pending, {} accepted, {} declined",
            counts.pending_requests, counts.accepted_requests, counts.declined_requests
        ),
        format!("units         {}", counts.total_units),
        String::new(),
    ];

    let slices = pie_slices(&view_data.stock);
    if slices.is_empty() {
        lines.push("no stock on hand".to_owned());
    }
    for slice in slices {
        lines.push(format!(
            "{:<4} {:>4} units {:>5.1}%",
            slice.group.as_str(),
            slice.units,
            slice.percent()
        ));
    }
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mut hints = String::from("tab screens | ctrl+r reload | esc quit");
    if let Some(size) = view_data.page_size(state.active_screen) {
        hints = format!(
            "type to search | ←/→ page | home/end | ctrl+p size:{size} | {hints}"
        );
    }
    if state.active_screen == ScreenKind::Requests && state.role == Role::Admin {
        hints = format!("ctrl+a accept | ctrl+d decline | {hints}");
    }
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints,
    }
}
