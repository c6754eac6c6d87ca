use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use backlog_core::{CatalogClient, CatalogError, Game, MutationKind, Notifier};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{
    spawn,
    sync::{mpsc, oneshot},
};
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 64;

/// Blocking notices raised by catalog operations while the UI runs.
///
/// Each notice carries a channel half; the raising operation stays parked
/// until the user has dealt with the modal.
pub enum UiNotice {
    Alert {
        message: String,
        done: oneshot::Sender<()>,
    },
    Confirm {
        prompt: String,
        reply: oneshot::Sender<bool>,
    },
}

/// Notifier that surfaces alerts and confirmations as modal notices.
pub struct ChannelNotifier {
    tx: mpsc::Sender<UiNotice>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<UiNotice>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn alert(&self, kind: MutationKind, _error: &CatalogError) {
        let (done_tx, done_rx) = oneshot::channel();
        let notice = UiNotice::Alert {
            message: kind.failure_message().to_string(),
            done: done_tx,
        };
        if self.tx.send(notice).await.is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    async fn confirm(&self, prompt: &str) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        let notice = UiNotice::Confirm {
            prompt: prompt.to_string(),
            reply: reply_tx,
        };
        if self.tx.send(notice).await.is_err() {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    OpFinished(OpOutcome),
}

enum OpOutcome {
    Fetched,
    Created { id: u32, applied: bool },
    Updated { id: u32, applied: bool },
    Deleted { id: u32, applied: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug, Clone, Default)]
struct LineEditor {
    input: String,
    cursor: usize,
}

impl LineEditor {
    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    fn value(&self) -> &str {
        self.input.trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AddField {
    #[default]
    AppId,
    Title,
}

#[derive(Debug, Default)]
struct AddGameModal {
    app_id: LineEditor,
    title: LineEditor,
    focus: AddField,
}

impl AddGameModal {
    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AddField::AppId => AddField::Title,
            AddField::Title => AddField::AppId,
        };
    }

    fn editor_mut(&mut self) -> &mut LineEditor {
        match self.focus {
            AddField::AppId => &mut self.app_id,
            AddField::Title => &mut self.title,
        }
    }
}

struct AlertModal {
    message: String,
    done: Option<oneshot::Sender<()>>,
}

struct ConfirmModal {
    prompt: String,
    reply: Option<oneshot::Sender<bool>>,
}

/// High-level application state for the backlog TUI.
pub struct BacklogApp {
    client: CatalogClient,
    state: UiState,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    notice_rx: Option<mpsc::Receiver<UiNotice>>,
    alert: Option<AlertModal>,
    confirm: Option<ConfirmModal>,
    add_form: Option<AddGameModal>,
    id_prompt: Option<LineEditor>,
    pending_op: bool,
}

impl BacklogApp {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            state: UiState::default(),
            event_tx: None,
            notice_rx: None,
            alert: None,
            confirm: None,
            add_form: None,
            id_prompt: None,
            pending_op: false,
        }
    }

    pub fn attach_notices(&mut self, receiver: mpsc::Receiver<UiNotice>) {
        self.notice_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx.clone());

        self.spawn_fetch(None);

        let mut notice_rx = self.notice_rx.take();

        loop {
            self.refresh_snapshot();
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            if notice_rx.is_some() {
                let mut notices_closed = false;
                let rx = notice_rx.as_mut().unwrap();
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_notice = rx.recv() => {
                        match maybe_notice {
                            Some(notice) => self.handle_notice(notice),
                            None => notices_closed = true,
                        }
                    }
                }
                if notices_closed {
                    notice_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn refresh_snapshot(&mut self) {
        self.state.games = self.client.games();
        self.state.loading = self.client.is_loading();
        self.state.error = self.client.last_error();
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                match event {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {}
                    Event::Mouse(_) => {}
                    Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::OpFinished(outcome)) => {
                self.handle_outcome(outcome);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.state.mode == Mode::Filter {
            self.state
                .set_status(format!("Filter: {}", self.state.filter_input));
        }
    }

    fn handle_notice(&mut self, notice: UiNotice) {
        match notice {
            UiNotice::Alert { message, done } => {
                self.alert = Some(AlertModal {
                    message,
                    done: Some(done),
                });
            }
            UiNotice::Confirm { prompt, reply } => {
                self.confirm = Some(ConfirmModal {
                    prompt,
                    reply: Some(reply),
                });
            }
        }
    }

    fn handle_outcome(&mut self, outcome: OpOutcome) {
        match outcome {
            OpOutcome::Fetched => {
                self.refresh_snapshot();
                if self.state.error.is_none() {
                    let message = match self.state.active_filter.as_deref() {
                        Some(filter) => format!(
                            "Loaded {} game(s) matching \"{}\"",
                            self.state.games.len(),
                            filter
                        ),
                        None => format!("Loaded {} game(s)", self.state.games.len()),
                    };
                    self.state.set_status(message);
                }
            }
            OpOutcome::Created { id, applied } => {
                self.pending_op = false;
                if applied {
                    self.refresh_snapshot();
                    self.state.move_to(0);
                    self.state.set_status(format!("Added game {id}"));
                }
            }
            OpOutcome::Updated { id, applied } => {
                self.pending_op = false;
                if applied {
                    self.refresh_snapshot();
                    self.state.set_status(format!("Updated game {id}"));
                }
            }
            OpOutcome::Deleted { id, applied } => {
                self.pending_op = false;
                if applied {
                    self.refresh_snapshot();
                    self.state.set_status(format!("Deleted game {id}"));
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.alert.is_some() {
            self.handle_alert_key(key);
            return;
        }
        if self.confirm.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.add_form.is_some() {
            self.handle_add_form_key(key);
            return;
        }
        if self.id_prompt.is_some() {
            self.handle_id_prompt_key(key);
            return;
        }
        match self.state.mode {
            Mode::Filter => self.handle_filter_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.state.move_to(0),
            KeyCode::Char('G') => self.state.move_to_end(),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page_down(),
            KeyCode::PageUp => self.state.page_up(),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Filter;
                self.state.filter_input = self.state.active_filter.clone().unwrap_or_default();
                self.state.set_status("Enter title filter".to_string());
            }
            KeyCode::Char('r') if key.modifiers.is_empty() => {
                self.spawn_fetch(self.state.active_filter.clone());
            }
            KeyCode::Char('a') if key.modifiers.is_empty() => self.open_add_form(),
            KeyCode::Char('i') if key.modifiers.is_empty() => self.open_id_prompt(),
            KeyCode::Char('c') if key.modifiers.is_empty() => self.toggle_completed(),
            KeyCode::Char('x') if key.modifiers.is_empty() => self.toggle_dropped(),
            KeyCode::Char('d') if key.modifiers.is_empty() => self.request_delete(),
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.filter_input.clear();
                self.state.set_status("Filter cancelled".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                let trimmed = self.state.filter_input.trim().to_string();
                self.state.active_filter = if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                };
                self.spawn_fetch(self.state.active_filter.clone());
            }
            KeyCode::Backspace => {
                self.state.filter_input.pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.filter_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_alert_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.dismiss_alert();
        }
    }

    fn dismiss_alert(&mut self) {
        if let Some(mut alert) = self.alert.take() {
            if let Some(done) = alert.done.take() {
                let _ = done.send(());
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
            _ => None,
        };
        let Some(answer) = answer else {
            return;
        };
        if let Some(mut confirm) = self.confirm.take() {
            if let Some(reply) = confirm.reply.take() {
                let _ = reply.send(answer);
            }
        }
        if !answer {
            self.state.set_status("Cancelled".to_string());
        }
    }

    fn handle_add_form_key(&mut self, key: KeyEvent) {
        let mut submit = false;
        let mut cancel = false;
        if let Some(form) = self.add_form.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = true,
                KeyCode::Tab | KeyCode::Down | KeyCode::Up => form.toggle_focus(),
                KeyCode::Left => form.editor_mut().move_cursor(-1),
                KeyCode::Right => form.editor_mut().move_cursor(1),
                KeyCode::Home => form.editor_mut().move_home(),
                KeyCode::End => form.editor_mut().move_end(),
                KeyCode::Backspace => form.editor_mut().backspace(),
                KeyCode::Delete => form.editor_mut().delete(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        let numeric_field = form.focus == AddField::AppId;
                        if !numeric_field || ch.is_ascii_digit() {
                            form.editor_mut().insert(ch);
                        }
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.add_form = None;
            self.state.set_status("Add cancelled".to_string());
            return;
        }
        if submit {
            self.submit_add_form();
        }
    }

    fn handle_id_prompt_key(&mut self, key: KeyEvent) {
        let mut submit = false;
        let mut cancel = false;
        if let Some(editor) = self.id_prompt.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = true,
                KeyCode::Left => editor.move_cursor(-1),
                KeyCode::Right => editor.move_cursor(1),
                KeyCode::Home => editor.move_home(),
                KeyCode::End => editor.move_end(),
                KeyCode::Backspace => editor.backspace(),
                KeyCode::Delete => editor.delete(),
                KeyCode::Char(ch) => {
                    if (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
                        && ch.is_ascii_digit()
                    {
                        editor.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.id_prompt = None;
            self.state.set_status("Lookup cancelled".to_string());
            return;
        }
        if submit {
            let id = self
                .id_prompt
                .take()
                .map(|editor| editor.value().to_string())
                .unwrap_or_default();
            self.spawn_fetch_by_id(id);
        }
    }

    fn open_add_form(&mut self) {
        if !self.ready_for_mutation() {
            return;
        }
        self.add_form = Some(AddGameModal::default());
        self.state
            .set_status("Enter a new game (Tab switches fields)".to_string());
    }

    fn open_id_prompt(&mut self) {
        self.id_prompt = Some(LineEditor::default());
        self.state.set_status("Enter a Steam app id".to_string());
    }

    fn submit_add_form(&mut self) {
        let Some(form) = self.add_form.as_ref() else {
            return;
        };
        let id_text = form.app_id.value().to_string();
        let title = form.title.value().to_string();

        let Ok(id) = id_text.parse::<u32>() else {
            self.state
                .set_status("Steam app id must be a number".to_string());
            return;
        };
        if title.is_empty() {
            self.state.set_status("Title is required".to_string());
            return;
        }

        self.add_form = None;
        self.spawn_create(Game::new(id, title));
    }

    fn toggle_completed(&mut self) {
        if !self.ready_for_mutation() {
            return;
        }
        let Some(game) = self.state.current_game().cloned() else {
            self.state.set_status("No game selected".to_string());
            return;
        };
        let mut updated = game;
        updated.completed = !updated.completed;
        updated.completed_on = updated
            .completed
            .then(|| Local::now().format("%Y-%m-%d").to_string());
        self.spawn_update(updated);
    }

    fn toggle_dropped(&mut self) {
        if !self.ready_for_mutation() {
            return;
        }
        let Some(game) = self.state.current_game().cloned() else {
            self.state.set_status("No game selected".to_string());
            return;
        };
        let mut updated = game;
        updated.dropped = !updated.dropped;
        self.spawn_update(updated);
    }

    fn request_delete(&mut self) {
        if !self.ready_for_mutation() {
            return;
        }
        let Some(game) = self.state.current_game().cloned() else {
            self.state.set_status("No game selected".to_string());
            return;
        };
        let Some(sender) = self.event_sender() else {
            return;
        };
        let client = self.client.clone();
        let id = game.steam_app_id;
        self.pending_op = true;
        info!("requesting delete of {id}");
        self.state
            .set_status(format!("Deleting {}…", game.display_name()));
        spawn(async move {
            let applied = client.delete_game(id).await;
            let _ = sender
                .send(AppEvent::OpFinished(OpOutcome::Deleted { id, applied }))
                .await;
        });
    }

    fn spawn_fetch(&mut self, title: Option<String>) {
        let Some(sender) = self.event_sender() else {
            return;
        };
        let client = self.client.clone();
        let label = match title.as_deref() {
            Some(filter) => format!("Loading games matching \"{filter}\"…"),
            None => "Loading games…".to_string(),
        };
        self.state.set_status(label);
        spawn(async move {
            client.fetch_games(title.as_deref()).await;
            let _ = sender.send(AppEvent::OpFinished(OpOutcome::Fetched)).await;
        });
    }

    fn spawn_fetch_by_id(&mut self, id: String) {
        let Some(sender) = self.event_sender() else {
            return;
        };
        let client = self.client.clone();
        let label = if id.is_empty() {
            "Loading games…".to_string()
        } else {
            format!("Looking up {id}…")
        };
        self.state.set_status(label);
        spawn(async move {
            client.fetch_game_by_id(&id).await;
            let _ = sender.send(AppEvent::OpFinished(OpOutcome::Fetched)).await;
        });
    }

    fn spawn_create(&mut self, game: Game) {
        let Some(sender) = self.event_sender() else {
            return;
        };
        let client = self.client.clone();
        let id = game.steam_app_id;
        self.pending_op = true;
        self.state
            .set_status(format!("Adding {}…", game.display_name()));
        spawn(async move {
            let applied = client.create_game(&game).await;
            let _ = sender
                .send(AppEvent::OpFinished(OpOutcome::Created { id, applied }))
                .await;
        });
    }

    fn spawn_update(&mut self, game: Game) {
        let Some(sender) = self.event_sender() else {
            return;
        };
        let client = self.client.clone();
        let id = game.steam_app_id;
        self.pending_op = true;
        self.state
            .set_status(format!("Updating {}…", game.display_name()));
        spawn(async move {
            let applied = client.update_game(&game).await;
            let _ = sender
                .send(AppEvent::OpFinished(OpOutcome::Updated { id, applied }))
                .await;
        });
    }

    fn ready_for_mutation(&mut self) -> bool {
        if self.pending_op {
            self.state
                .set_status("Another change is still in flight".to_string());
            return false;
        }
        true
    }

    fn event_sender(&mut self) -> Option<mpsc::Sender<AppEvent>> {
        let Some(sender) = self.event_tx.clone() else {
            self.state
                .set_status("Internal error: event channel unavailable".to_string());
            error!("event_channel_missing");
            return None;
        };
        Some(sender)
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(size);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        self.render_game_list(frame, body_chunks[0]);
        self.render_game_info(frame, body_chunks[1]);
        self.render_status(frame, chunks[1]);

        if let Some(form) = &self.add_form {
            self.render_add_form(frame, form);
        }
        if let Some(editor) = &self.id_prompt {
            self.render_id_prompt(frame, editor);
        }
        if let Some(confirm) = &self.confirm {
            self.render_confirm(frame, confirm);
        }
        if let Some(alert) = &self.alert {
            self.render_alert(frame, alert);
        }
    }

    fn render_game_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let mut list_state = ListState::default();
        let height = area.height.saturating_sub(2) as usize;
        let games = self.state.visible_games(height);
        if !games.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(games.len().saturating_sub(1));
            list_state.select(Some(selected));
        }
        let items: Vec<ListItem> = games
            .iter()
            .enumerate()
            .map(|(idx, game)| {
                let global_index = self.state.offset + idx;
                let is_selected = self.state.cursor == global_index;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let title_style = if game.dropped {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                };
                let mut line = vec![marker, Span::styled(game.display_name(), title_style)];
                if game.completed {
                    line.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
                }
                ListItem::new(Line::from(line))
            })
            .collect();

        let title = match self.state.active_filter.as_deref() {
            Some(filter) => format!("Games · {filter}"),
            None => format!("Games ({})", self.state.games.len()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        if let Some(game) = self.state.current_game() {
            let mut lines = Vec::new();
            lines.push(Line::from(Span::styled(
                game.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!("Steam app id: {}", game.steam_app_id)));
            if let Some(genre) = &game.genre {
                lines.push(Line::from(format!("Genre: {genre}")));
            }
            if let Some(developer) = &game.developer {
                lines.push(Line::from(format!("Developer: {developer}")));
            }
            if let Some(year) = game.release_year {
                lines.push(Line::from(format!("Released: {year}")));
            }
            let completed = if game.completed {
                match &game.completed_on {
                    Some(date) => format!("Completed: yes ({date})"),
                    None => "Completed: yes".to_string(),
                }
            } else {
                "Completed: no".to_string()
            };
            lines.push(Line::from(completed));
            lines.push(Line::from(format!(
                "Dropped: {}",
                if game.dropped { "yes" } else { "no" }
            )));
            if let Some(hours) = game.playtime_hours {
                lines.push(Line::from(format!("Playtime: {hours} h")));
            }
            if let Some(rating) = game.rating {
                lines.push(Line::from(format!("Rating: {rating}")));
            }
            if let Some(validated) = &game.validated_on {
                lines.push(Line::from(Span::styled(
                    format!("Validated: {validated}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            if let Some(review) = &game.review {
                lines.push(Line::from(""));
                lines.push(Line::from(review.clone()));
            }
            let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        } else {
            let paragraph = Paragraph::new("No games in the backlog").block(block);
            frame.render_widget(paragraph, area);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Filter {
            Line::from(format!("Filter: {}", self.state.filter_input))
        } else if let Some(error) = &self.state.error {
            Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))
        } else if self.state.loading {
            Line::from(Span::styled(
                "Loading…",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(self.state.status.clone())
        };
        let secondary = Line::from(
            "j/k move  / filter  r refresh  a add  c complete  x drop  d delete  i lookup  q quit",
        );
        let paragraph = Paragraph::new(vec![primary, secondary])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_add_form(&self, frame: &mut Frame, form: &AddGameModal) {
        let frame_area = frame.size();
        let mut width = cmp::min(60_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = 8_u16.min(frame_area.height.saturating_sub(2)).max(6_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let field_line = |label: &str, editor: &LineEditor, focused: bool| {
            let marker = if focused {
                Span::styled("> ", Style::default().fg(Color::Cyan))
            } else {
                Span::raw("  ")
            };
            Line::from(vec![
                marker,
                Span::styled(
                    format!("{label}: "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(editor.input.clone()),
            ])
        };

        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" save  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" switch field  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);

        let paragraph = Paragraph::new(vec![
            field_line("Steam app id", &form.app_id, form.focus == AddField::AppId),
            field_line("Title", &form.title, form.focus == AddField::Title),
            Line::from(""),
            helper,
        ])
        .block(Block::default().borders(Borders::ALL).title("Add Game"))
        .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);

        let (row, editor, label_len) = match form.focus {
            AddField::AppId => (0_u16, &form.app_id, "Steam app id: ".len()),
            AddField::Title => (1_u16, &form.title, "Title: ".len()),
        };
        let cursor_x = (area.x + 3 + label_len as u16 + editor.cursor as u16)
            .min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 1 + row;
        frame.set_cursor(cursor_x, cursor_y);
    }

    fn render_id_prompt(&self, frame: &mut Frame, editor: &LineEditor) {
        let frame_area = frame.size();
        let mut width = cmp::min(44_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = 7_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(editor.input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" look up  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);
        let hint = Line::from("Blank loads the whole backlog");

        let paragraph = Paragraph::new(vec![input_line, Line::from(""), helper, hint])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Find by Steam App Id"),
            )
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + editor.cursor as u16).min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 1;
        frame.set_cursor(cursor_x, cursor_y);
    }

    fn render_confirm(&self, frame: &mut Frame, confirm: &ConfirmModal) {
        let frame_area = frame.size();
        let mut width = cmp::min(50_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = 6_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let helper = Line::from(vec![
            Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);
        let paragraph = Paragraph::new(vec![
            Line::from(confirm.prompt.clone()),
            Line::from(""),
            helper,
        ])
        .block(Block::default().borders(Borders::ALL).title("Confirm"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_alert(&self, frame: &mut Frame, alert: &AlertModal) {
        let frame_area = frame.size();
        let mut width = cmp::min(50_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = 6_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" dismiss"),
        ]);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                alert.message.clone(),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            helper,
        ])
        .block(Block::default().borders(Borders::ALL).title("Problem"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

struct UiState {
    games: Vec<Game>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    filter_input: String,
    active_filter: Option<String>,
    status: String,
    mode: Mode,
    should_quit: bool,
    loading: bool,
    error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            games: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            filter_input: String::new(),
            active_filter: None,
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
            loading: false,
            error: None,
        }
    }
}

impl UiState {
    fn move_cursor(&mut self, delta: isize) {
        if self.games.is_empty() {
            return;
        }
        let len = self.games.len() as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.games.is_empty() {
            return;
        }
        self.cursor = index.min(self.games.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.games.is_empty() {
            return;
        }
        self.cursor = self.games.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        if self.games.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.games.len());
        self.move_cursor(delta as isize);
    }

    fn page_up(&mut self) {
        if self.games.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.games.len());
        self.move_cursor(-(delta as isize));
    }

    fn visible_games(&self, height: usize) -> &[Game] {
        if self.games.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.games.len());
        &self.games[self.offset..end]
    }

    fn current_game(&self) -> Option<&Game> {
        self.games.get(self.cursor)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.games.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.games.len() {
            self.cursor = self.games.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.games.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.games.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}
