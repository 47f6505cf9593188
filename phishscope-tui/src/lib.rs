use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use phishscope_client::{ApiClient, ApiError, SearchResponse, SearchSources, Statistics};
use phishscope_core::dashboard::{self, DashboardView, POLL_INTERVAL};
use phishscope_core::domains::{self, DomainTable, PhishingDomain, SIMULATION_INTERVAL};
use phishscope_core::search::{SearchBackend, SearchView};
use phishscope_core::{Page, PeriodicTask, Shell};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

mod dashboard_page;
mod home_page;
mod render;
mod search_page;

pub use render::ui;

const MAX_LOG_LINES: usize = 500;

/// Source id selecting every UT1 category at once
pub const ALL_UT1_SOURCE: &str = "ut1";

/// Results delivered to the event loop by background tasks
#[derive(Debug)]
pub enum AppMessage {
    SearchCompleted {
        generation: u64,
        outcome: Result<SearchResponse, ApiError>,
    },
    SourcesLoaded(Result<SearchSources, ApiError>),
    /// `mount` is the dashboard mount the fetch belonged to
    StatisticsLoaded {
        mount: u64,
        outcome: Result<Statistics, ApiError>,
    },
    DomainDetected(PhishingDomain),
    Log {
        level: LogLevel,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Where typed characters go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Navigation,
    Query,
    DomainFilter,
    /// Typing a page name to jump to
    Goto(String),
}

pub struct App {
    client: Arc<ApiClient>,
    shell: Shell,
    search: SearchView,
    dashboard: DashboardView,
    domains: DomainTable,
    focus: Focus,
    source_cursor: usize,
    logs: Vec<(LogLevel, String)>,
    dashboard_poll: Option<PeriodicTask>,
    dashboard_mount: u64,
    simulator: Option<PeriodicTask>,
    should_quit: bool,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            shell: Shell::new(),
            search: SearchView::new(),
            dashboard: DashboardView::new(),
            domains: DomainTable::new(),
            focus: Focus::Navigation,
            source_cursor: 0,
            logs: Vec::new(),
            dashboard_poll: None,
            dashboard_mount: 0,
            simulator: None,
            should_quit: false,
            tx,
            rx,
        }
    }

    /// Mounts the initial page. Needs a tokio runtime context.
    pub fn start(&mut self) {
        self.push_log(
            LogLevel::Info,
            format!("Connected to {}", self.client.config().base_url()),
        );
        self.mount(self.shell.current());
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn search(&self) -> &SearchView {
        &self.search
    }

    pub fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    pub fn domains(&self) -> &DomainTable {
        &self.domains
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn logs(&self) -> &[(LogLevel, String)] {
        &self.logs
    }

    pub fn source_cursor(&self) -> usize {
        self.source_cursor
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_dashboard_polling(&self) -> bool {
        self.dashboard_poll.as_ref().is_some_and(PeriodicTask::is_running)
    }

    pub fn is_simulating(&self) -> bool {
        self.simulator.as_ref().is_some_and(PeriodicTask::is_running)
    }

    /// Source identifiers offered as search filters: the main feeds, the
    /// aggregate `ut1` filter, then one entry per UT1 category.
    pub fn source_options(&self) -> Vec<String> {
        let Some(sources) = self.search.available_sources() else {
            return Vec::new();
        };
        let mut options: Vec<String> = sources
            .main_sources
            .iter()
            .filter(|source| source.as_str() != ALL_UT1_SOURCE)
            .cloned()
            .collect();
        if !sources.ut1_categories.is_empty() {
            options.push(ALL_UT1_SOURCE.to_string());
        }
        options.extend(sources.ut1_categories.iter().map(|category| {
            if category.starts_with("ut1_") {
                category.clone()
            } else {
                format!("ut1_{}", category)
            }
        }));
        options
    }

    pub fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push((level, message.into()));
        if self.logs.len() > MAX_LOG_LINES {
            self.logs.drain(0..self.logs.len() - MAX_LOG_LINES);
        }
    }

    /// Drains every pending background message without blocking
    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }
    }

    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::SearchCompleted { generation, outcome } => {
                let failure = outcome.as_ref().err().map(ToString::to_string);
                let found = outcome.as_ref().map(|r| r.total_found).unwrap_or(0);
                match self.search.complete(generation, outcome) {
                    phishscope_core::Completion::Applied => match failure {
                        Some(e) => self.push_log(LogLevel::Error, format!("Search failed: {}", e)),
                        None => self.push_log(
                            LogLevel::Info,
                            format!("Search #{} found {} results", generation, found),
                        ),
                    },
                    phishscope_core::Completion::Stale => {
                        debug!("Ignored stale search #{}", generation);
                    }
                }
            }
            AppMessage::SourcesLoaded(Ok(sources)) => {
                self.push_log(
                    LogLevel::Info,
                    format!(
                        "Loaded {} sources and {} UT1 categories",
                        sources.main_sources.len(),
                        sources.ut1_categories.len()
                    ),
                );
                self.search.set_available_sources(sources);
            }
            AppMessage::SourcesLoaded(Err(e)) => {
                self.push_log(LogLevel::Warn, format!("Could not load search sources: {}", e));
            }
            AppMessage::StatisticsLoaded { mount, outcome } => {
                if self.shell.current() != Page::Dashboard || mount != self.dashboard_mount {
                    debug!("Dropping statistics from dashboard mount #{}", mount);
                    return;
                }
                if let Err(e) = &outcome {
                    self.push_log(LogLevel::Error, format!("Statistics refresh failed: {}", e));
                }
                self.dashboard.apply(outcome);
            }
            AppMessage::DomainDetected(domain) => {
                if self.shell.current() != Page::Home {
                    return;
                }
                self.push_log(LogLevel::Info, format!("New detection: {}", domain.domain));
                self.domains.insert(domain);
            }
            AppMessage::Log { level, message } => self.push_log(level, message),
        }
    }

    /// Switches pages, tearing down whatever the old page was running.
    pub fn navigate(&mut self, page: Page) {
        let previous = self.shell.navigate(page);
        if previous == page {
            return;
        }
        self.unmount(previous);
        self.focus = Focus::Navigation;
        self.mount(page);
    }

    fn mount(&mut self, page: Page) {
        match page {
            Page::Dashboard => {
                self.dashboard_mount += 1;
                let mount = self.dashboard_mount;
                let tx = self.tx.clone();
                self.dashboard_poll = Some(dashboard::start_polling(
                    self.client.clone(),
                    POLL_INTERVAL,
                    Arc::new(move |outcome| {
                        let _ = tx.send(AppMessage::StatisticsLoaded { mount, outcome });
                    }),
                ));
            }
            Page::Home => {
                let tx = self.tx.clone();
                self.simulator = Some(domains::start_simulator(
                    SIMULATION_INTERVAL,
                    Arc::new(move |domain| {
                        let _ = tx.send(AppMessage::DomainDetected(domain));
                    }),
                ));
            }
            Page::Search => {
                if self.search.available_sources().is_none() {
                    self.load_sources();
                }
            }
            _ => {}
        }
    }

    fn unmount(&mut self, page: Page) {
        match page {
            Page::Dashboard => {
                if let Some(mut task) = self.dashboard_poll.take() {
                    task.teardown();
                }
            }
            Page::Home => {
                if let Some(mut task) = self.simulator.take() {
                    task.teardown();
                }
            }
            _ => {}
        }
    }

    fn load_sources(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.get_search_sources().await;
            let _ = tx.send(AppMessage::SourcesLoaded(outcome));
        });
    }

    /// Manual refresh goes through the poll task so fetches never overlap
    fn refresh_statistics(&self) {
        if let Some(task) = &self.dashboard_poll {
            task.run_now();
        }
    }

    fn submit_search(&mut self) {
        let Some(request) = self.search.submit() else {
            self.push_log(LogLevel::Warn, "Enter a search term first");
            return;
        };

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.search(&request).await;
            let _ = tx.send(AppMessage::SearchCompleted {
                generation: request.generation,
                outcome,
            });
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.focus.clone() {
            Focus::Query => match key.code {
                KeyCode::Enter => {
                    self.submit_search();
                    self.focus = Focus::Navigation;
                }
                KeyCode::Esc => self.focus = Focus::Navigation,
                KeyCode::Backspace => self.search.pop_char(),
                KeyCode::Char(c) => self.search.push_char(c),
                _ => {}
            },
            Focus::DomainFilter => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.focus = Focus::Navigation,
                KeyCode::Backspace => self.domains.pop_filter_char(),
                KeyCode::Char(c) => self.domains.push_filter_char(c),
                _ => {}
            },
            Focus::Goto(mut name) => match key.code {
                KeyCode::Enter => {
                    self.focus = Focus::Navigation;
                    self.navigate(Page::from_name(&name));
                }
                KeyCode::Esc => self.focus = Focus::Navigation,
                KeyCode::Backspace => {
                    name.pop();
                    self.focus = Focus::Goto(name);
                }
                KeyCode::Char(c) => {
                    name.push(c);
                    self.focus = Focus::Goto(name);
                }
                _ => {}
            },
            Focus::Navigation => self.handle_navigation_key(key.code),
        }
    }

    fn handle_navigation_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.navigate(Page::Home),
            KeyCode::Char('2') => self.navigate(Page::Dashboard),
            KeyCode::Char('3') => self.navigate(Page::Search),
            KeyCode::Char('g') => self.focus = Focus::Goto(String::new()),
            KeyCode::Char('/') => match self.shell.current() {
                Page::Search => self.focus = Focus::Query,
                Page::Home => self.focus = Focus::DomainFilter,
                _ => {}
            },
            _ => match self.shell.current() {
                Page::Search => self.handle_search_key(code),
                Page::Dashboard if code == KeyCode::Char('r') => {
                    info!("Manual statistics refresh");
                    self.refresh_statistics();
                }
                _ => {}
            },
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        let options_len = self.source_options().len();
        match code {
            KeyCode::Enter => self.submit_search(),
            KeyCode::Left => self.search.prev_page(),
            KeyCode::Right => self.search.next_page(),
            KeyCode::Char('s') => {
                let size = self.search.page_size().next();
                self.search.set_page_size(size);
            }
            KeyCode::Up => self.source_cursor = self.source_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.source_cursor + 1 < options_len {
                    self.source_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(source) = self.source_options().get(self.source_cursor) {
                    self.search.filter_mut().toggle(source);
                }
            }
            KeyCode::Char('c') => self.search.filter_mut().clear(),
            KeyCode::Char('e') => self.apply_usage_example(),
            _ => {}
        }
    }

    /// Loads the first usage example's `q` value into the query box
    fn apply_usage_example(&mut self) {
        let query = self
            .search
            .available_sources()
            .and_then(|s| s.usage_examples.iter().next().map(|(_, example)| example.clone()))
            .and_then(|example| {
                phishscope_core::search::example_query(&example)
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("q=").map(str::to_string))
            });
        if let Some(query) = query {
            self.search.set_query(query);
        }
    }
}

/// Runs the interactive terminal UI until the user quits.
///
/// Blocks the calling thread; call it from a thread inside a tokio runtime
/// (e.g. `spawn_blocking`) so background fetches can be spawned.
pub fn run(client: ApiClient) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    app.start();

    let result = run_app(&mut terminal, &mut app);

    // Stop background tasks before handing the terminal back
    drop(app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.process_messages();
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key(key);
        }
    }
    Ok(())
}
