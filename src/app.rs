//! Interactive hike browser and its event loop.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::{debug, info};

use crate::data::{Hike, HikeFilter, Observation, Store};
use crate::ui::{
    widgets::{ConfirmDialog, HikeDetail, HikeList, ObservationList, StatusBar},
    HelpOverlay, Theme,
};

/// Which panel is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPanel {
    Hikes,
    Observations,
}

impl FocusedPanel {
    fn toggle(self) -> Self {
        match self {
            FocusedPanel::Hikes => FocusedPanel::Observations,
            FocusedPanel::Observations => FocusedPanel::Hikes,
        }
    }
}

/// Deletion waiting for a y/n answer
#[derive(Debug, Clone, PartialEq)]
enum PendingDelete {
    Hike { id: i64, name: String },
    Observation { id: i64 },
    AllHikes,
}

impl PendingDelete {
    fn prompt(&self) -> String {
        match self {
            PendingDelete::Hike { name, .. } => {
                format!("Delete \"{name}\" and all of its observations?")
            }
            PendingDelete::Observation { .. } => "Delete this observation?".to_string(),
            PendingDelete::AllHikes => "Delete ALL hikes and observations?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    /// Typing into the name search
    Search,
    Confirm(PendingDelete),
}

/// Application state
pub struct App {
    store: Store,
    theme: Theme,

    // Data
    hikes: Vec<Hike>,
    observations: Vec<Observation>,

    // UI State
    focused: FocusedPanel,
    selected_hike: usize,
    selected_observation: usize,
    mode: Mode,
    search: String,
    show_help: bool,
    should_quit: bool,

    // Last action result and non-fatal error, shown in the status bar
    message: Option<String>,
    error_message: Option<String>,
}

impl App {
    /// Create a new App over an open store
    pub fn new(store: Store) -> Result<Self> {
        let mut app = App {
            store,
            theme: Theme::default(),
            hikes: Vec::new(),
            observations: Vec::new(),
            focused: FocusedPanel::Hikes,
            selected_hike: 0,
            selected_observation: 0,
            mode: Mode::Normal,
            search: String::new(),
            show_help: false,
            should_quit: false,
            message: None,
            error_message: None,
        };
        app.load_hikes()?;
        Ok(app)
    }

    /// Give the store back so its connection can be closed
    pub fn into_store(self) -> Store {
        self.store
    }

    /// Reload hikes, narrowed by the current name search
    fn load_hikes(&mut self) -> Result<()> {
        let hikes = self.store.hikes();
        self.hikes = if self.search.is_empty() {
            hikes.get_all()?
        } else {
            hikes.filter(&HikeFilter::name_search(self.search.as_str()))?
        };
        if self.selected_hike >= self.hikes.len() {
            self.selected_hike = self.hikes.len().saturating_sub(1);
        }
        self.load_observations()
    }

    /// Load observations for the selected hike
    fn load_observations(&mut self) -> Result<()> {
        self.observations = match self.hikes.get(self.selected_hike) {
            Some(hike) => self.store.observations().get_for_hike(hike.id)?,
            None => Vec::new(),
        };
        if self.selected_observation >= self.observations.len() {
            self.selected_observation = self.observations.len().saturating_sub(1);
        }
        if self.observations.is_empty() && self.focused == FocusedPanel::Observations {
            self.focused = FocusedPanel::Hikes;
        }
        Ok(())
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    fn selected_hike(&self) -> Option<&Hike> {
        self.hikes.get(self.selected_hike)
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        self.error_message = None;

        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match self.mode.clone() {
            Mode::Confirm(pending) => return self.handle_confirm(key, pending),
            Mode::Search => return self.handle_search(key),
            Mode::Normal => {}
        }

        // Global shortcuts
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return Ok(());
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return Ok(());
            }
            _ => {}
        }

        // If help is shown, don't process other keys
        if self.show_help {
            return Ok(());
        }

        match key {
            KeyCode::Char('r') => {
                self.load_hikes()?;
                self.message = Some("Reloaded".to_string());
                return Ok(());
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if !self.observations.is_empty() {
                    self.focused = self.focused.toggle();
                }
                return Ok(());
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.focused = FocusedPanel::Hikes;
                return Ok(());
            }
            KeyCode::Char('D') => {
                if !self.hikes.is_empty() {
                    self.mode = Mode::Confirm(PendingDelete::AllHikes);
                }
                return Ok(());
            }
            _ => {}
        }

        match self.focused {
            FocusedPanel::Hikes => self.handle_hike_navigation(key)?,
            FocusedPanel::Observations => self.handle_observation_navigation(key)?,
        }

        Ok(())
    }

    fn handle_hike_navigation(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.hikes.is_empty() {
                    self.selected_hike = (self.selected_hike + 1) % self.hikes.len();
                    self.selected_observation = 0;
                    self.load_observations()?;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.hikes.is_empty() {
                    self.selected_hike = self
                        .selected_hike
                        .checked_sub(1)
                        .unwrap_or(self.hikes.len() - 1);
                    self.selected_observation = 0;
                    self.load_observations()?;
                }
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                if !self.observations.is_empty() {
                    self.focused = FocusedPanel::Observations;
                }
            }
            KeyCode::Esc => {
                if !self.search.is_empty() {
                    self.search.clear();
                    self.load_hikes()?;
                }
            }
            KeyCode::Char('d') => {
                if let Some(hike) = self.selected_hike() {
                    self.mode = Mode::Confirm(PendingDelete::Hike {
                        id: hike.id,
                        name: hike.name.clone(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_observation_navigation(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.observations.is_empty() {
                    self.selected_observation =
                        (self.selected_observation + 1) % self.observations.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.observations.is_empty() {
                    self.selected_observation = self
                        .selected_observation
                        .checked_sub(1)
                        .unwrap_or(self.observations.len() - 1);
                }
            }
            KeyCode::Esc => {
                self.focused = FocusedPanel::Hikes;
            }
            KeyCode::Char('x') => {
                if let Some(observation) = self.observations.get(self.selected_observation) {
                    self.mode = Mode::Confirm(PendingDelete::Observation { id: observation.id });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Each keystroke re-runs the name filter
    fn handle_search(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char(c) => {
                self.search.push(c);
                self.selected_hike = 0;
                self.load_hikes()?;
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.selected_hike = 0;
                self.load_hikes()?;
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.search.clear();
                self.load_hikes()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_confirm(&mut self, key: KeyCode, pending: PendingDelete) -> Result<()> {
        self.mode = Mode::Normal;
        if !matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
            debug!(?pending, "Deletion cancelled");
            return Ok(());
        }

        match pending {
            PendingDelete::Hike { id, name } => {
                self.store.hikes().delete(id)?;
                info!(id, "Hike deleted from browser");
                self.message = Some(format!("Deleted \"{name}\""));
            }
            PendingDelete::Observation { id } => {
                self.store.observations().delete(id)?;
                self.message = Some("Observation deleted".to_string());
            }
            PendingDelete::AllHikes => {
                let removed = self.store.hikes().delete_all()?;
                self.message = Some(format!("Deleted {removed} hikes"));
            }
        }
        self.load_hikes()
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Body
                Constraint::Length(2), // Status bar
            ])
            .split(size);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40), // Hike list
                Constraint::Percentage(60), // Detail
            ])
            .split(main_chunks[0]);

        let detail_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(11), // Hike fields
                Constraint::Min(4),     // Observations
            ])
            .split(body_chunks[1]);

        let search = (!self.search.is_empty() || self.mode == Mode::Search)
            .then_some(self.search.as_str());

        let hike_list = HikeList::new(&self.hikes, self.selected_hike, search, &self.theme);
        hike_list.render(frame, body_chunks[0], self.focused == FocusedPanel::Hikes);

        HikeDetail::new(self.selected_hike(), &self.theme).render(frame, detail_chunks[0]);

        let observation_list =
            ObservationList::new(&self.observations, self.selected_observation, &self.theme);
        observation_list.render(
            frame,
            detail_chunks[1],
            self.focused == FocusedPanel::Observations,
        );

        let typing = (self.mode == Mode::Search).then_some(self.search.as_str());
        let status_bar = StatusBar::new(
            typing,
            self.message.as_deref(),
            self.error_message.as_deref(),
            &self.theme,
        );
        status_bar.render(frame, main_chunks[1]);

        if let Mode::Confirm(pending) = &self.mode {
            let prompt = pending.prompt();
            ConfirmDialog::new(&prompt, &self.theme).render(frame, size);
        }

        if self.show_help {
            HelpOverlay::new(&self.theme).render(frame, size);
        }
    }
}

/// Restore terminal to normal state
fn restore_terminal() {
    // Best effort cleanup - ignore errors since we may be in a panic
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the hike browser until the user quits
pub fn run(store: Store) -> Result<()> {
    // Load data before touching the terminal so errors print normally
    let mut app = App::new(store).context("Failed to load hikes")?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        restore_terminal();
        return Err(e).context("Failed to setup terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            restore_terminal();
            return Err(e).context("Failed to create terminal");
        }
    };

    let result = run_main_loop(&mut terminal, &mut app);

    // Always restore terminal, regardless of result
    restore_terminal();
    terminal.show_cursor().ok();

    app.into_store()
        .close()
        .context("Failed to close hike database")?;
    result
}

/// Main application loop
fn run_main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Err(e) = app.handle_input(key.code, key.modifiers) {
                        // Log error but don't crash
                        tracing::error!(error = %e, "Browser action failed");
                        app.set_error(format!("{e:#}"));
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
