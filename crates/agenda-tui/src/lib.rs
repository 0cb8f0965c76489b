// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agenda_app::{
    AgendaSnapshot, AppCommand, AppEvent, AppState, CancelPlan, Contact, ContactForm, Field,
    FieldControl, LogId, MeetingId, NewMeeting, OwnerAction, ReferenceData, RowKey, RowView,
    SavePayload, SessionTypeId, TableMode,
};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const SELECT_MARK: &str = "▾";
const DISABLED_CELL: &str = "-";
const DEFAULT_START_TIME: &str = "19:00";
const NEW_MEETING_LABELS: [&str; 3] = ["date (YYYY-MM-DD)", "start time (HH:MM)", "meeting type"];

/// Everything the table needs from the agenda server.
pub trait AppRuntime {
    fn load_reference_data(&mut self) -> Result<ReferenceData>;
    fn load_agenda(&mut self, meeting_id: MeetingId) -> Result<AgendaSnapshot>;
    fn save_agenda(&mut self, payload: &SavePayload) -> Result<AgendaSnapshot>;
    fn delete_row(&mut self, id: LogId) -> Result<()>;
    fn advance_meeting_status(&mut self, meeting_id: MeetingId) -> Result<String>;
    fn create_meeting(&mut self, meeting: &NewMeeting) -> Result<MeetingId>;
    fn create_contact(&mut self, form: &ContactForm) -> Result<Contact>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChoiceValue {
    SessionType(SessionTypeId),
    Speaker(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChoiceEntry {
    group: &'static str,
    label: String,
    value: ChoiceValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChoiceState {
    row: RowKey,
    title: &'static str,
    entries: Vec<ChoiceEntry>,
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TextPrompt {
    row: RowKey,
    field: Field,
    buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct NewMeetingPrompt {
    values: [String; 3],
    focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Overlay {
    Choice(ChoiceState),
    Text(TextPrompt),
    Owners { row: RowKey, cursor: usize },
    Contacts { row: RowKey, cursor: usize },
    MeetingId { buffer: String },
    NewMeeting(NewMeetingPrompt),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    selected_row: usize,
    selected_col: usize,
    overlay: Option<Overlay>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    meeting: Option<MeetingId>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    load_initial(state, runtime, &mut view_data, &internal_tx, meeting);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

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

fn load_initial<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    meeting: Option<MeetingId>,
) {
    match runtime.load_reference_data() {
        Ok(reference) => state.load_reference(reference),
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("load failed: {error:#}"),
            );
            return;
        }
    }
    if let Some(meeting_id) = meeting {
        load_meeting(state, runtime, view_data, internal_tx, meeting_id);
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
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
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Restarts the clear timer for whatever the state last put in the status line.
fn bump_status(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status(view_data, internal_tx);
}

fn report_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[AppEvent],
) {
    for event in events {
        match event {
            AppEvent::OwnersSynced { targets, .. } => emit_status(
                state,
                view_data,
                internal_tx,
                format!("owners synced to {} row(s)", targets.len()),
            ),
            AppEvent::StatusUpdated(_) => bump_status(view_data, internal_tx),
            _ => {}
        }
    }
    clamp_selection(state, view_data);
}

fn dispatch_and_report(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    report_events(state, view_data, internal_tx, &events);
    events
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.overlay.is_some() {
        handle_overlay_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if handle_navigation_key(state, view_data, key) {
        return false;
    }

    match state.mode() {
        TableMode::View => handle_view_key(state, runtime, view_data, internal_tx, key),
        TableMode::Edit => {
            handle_edit_key(state, runtime, view_data, internal_tx, key);
            false
        }
    }
}

fn handle_navigation_key(state: &AppState, view_data: &mut ViewData, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    let rows = state.table.views().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if view_data.selected_row + 1 < rows {
                view_data.selected_row += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if view_data.selected_col + 1 < Field::ALL.len() {
                view_data.selected_col += 1;
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
        }
        KeyCode::Home => view_data.selected_row = 0,
        KeyCode::End => view_data.selected_row = rows.saturating_sub(1),
        _ => return false,
    }
    true
}

fn handle_view_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Char('e') => {
            if !state.dispatch(AppCommand::EnterEditMode).is_empty() {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "editing -- ctrl+s saves, esc cancels",
                );
            }
        }
        KeyCode::Char('g') => {
            view_data.overlay = Some(Overlay::MeetingId {
                buffer: state
                    .meeting_id()
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            });
        }
        KeyCode::Char('N') => {
            let meeting_type = state
                .reference
                .meeting_types
                .first()
                .cloned()
                .unwrap_or_default();
            view_data.overlay = Some(Overlay::NewMeeting(NewMeetingPrompt {
                values: [String::new(), DEFAULT_START_TIME.to_owned(), meeting_type],
                focus: 0,
            }));
        }
        KeyCode::Char('S') => advance_status(state, runtime, view_data, internal_tx),
        KeyCode::Char('r') => full_reload(state, runtime, view_data, internal_tx),
        _ => {}
    }
    false
}

fn handle_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (key.code, ctrl) {
        (KeyCode::Char('s'), true) => save_agenda(state, runtime, view_data, internal_tx),
        (_, true) => {}
        (KeyCode::Esc, false) => cancel_edit(state, runtime, view_data, internal_tx),
        (KeyCode::Enter, false) => open_editor(state, view_data, internal_tx),
        (KeyCode::Char('J'), false) => move_selected(state, view_data, internal_tx, 1),
        (KeyCode::Char('K'), false) => move_selected(state, view_data, internal_tx, -1),
        (KeyCode::Char('a'), false) => insert_row(state, view_data, internal_tx, false),
        (KeyCode::Char('A'), false) => insert_row(state, view_data, internal_tx, true),
        (KeyCode::Char('d'), false) => delete_selected(state, runtime, view_data, internal_tx),
        (KeyCode::Char('?'), false) => view_data.help_visible = true,
        (KeyCode::Char('g'), false) if !state.table.chrome().meeting_selector_enabled => {
            emit_status(
                state,
                view_data,
                internal_tx,
                "meeting selector is disabled while editing",
            );
        }
        (KeyCode::Char('q'), false) => emit_status(
            state,
            view_data,
            internal_tx,
            "save (ctrl+s) or cancel (esc) before quitting",
        ),
        _ => {}
    }
}

fn selected_view<'a>(state: &'a AppState, view_data: &ViewData) -> Option<&'a RowView> {
    state.table.views().get(view_data.selected_row)
}

fn selected_key(state: &AppState, view_data: &ViewData) -> Option<RowKey> {
    selected_view(state, view_data).map(|view| view.key)
}

/// Section rows only carry the ordinal and the spanning title.
fn focused_field(view: &RowView, col: usize) -> Field {
    if view.is_section {
        if col == 0 { Field::Sequence } else { Field::Title }
    } else {
        Field::ALL.get(col).copied().unwrap_or(Field::Sequence)
    }
}

fn clamp_selection(state: &AppState, view_data: &mut ViewData) {
    let rows = state.table.views().len();
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
    view_data.selected_col = view_data.selected_col.min(Field::ALL.len() - 1);
}

fn select_key(state: &AppState, view_data: &mut ViewData, key: RowKey) {
    if let Some(position) = state.table.store().position(key) {
        view_data.selected_row = position;
    }
}

enum Opened {
    Overlay(Overlay),
    Refused(&'static str),
}

fn open_editor(state: &mut AppState, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    match editor_for_selection(state, view_data) {
        Some(Opened::Overlay(overlay)) => view_data.overlay = Some(overlay),
        Some(Opened::Refused(message)) => emit_status(state, view_data, internal_tx, message),
        None => {}
    }
}

fn editor_for_selection(state: &AppState, view_data: &ViewData) -> Option<Opened> {
    let view = selected_view(state, view_data)?;
    let key = view.key;
    let field = focused_field(view, view_data.selected_col);
    let control = &view.cell(field)?.control;

    if !control.is_editable() {
        let message = match (field, control) {
            (Field::Title, FieldControl::Label(_)) => "title follows the pathway project",
            (Field::DurationMax, FieldControl::Input { disabled: true, .. }) => {
                "topics speakers have no max duration"
            }
            _ => "field is read-only",
        };
        return Some(Opened::Refused(message));
    }

    let overlay = match (field, control) {
        (Field::SessionType, _) => Overlay::Choice(session_type_choice(state, key)),
        (Field::Title, FieldControl::SpeakerSelect { selected, .. }) => {
            let choice = speaker_choice(state, key, selected);
            if choice.entries.is_empty() {
                return Some(Opened::Refused("no speeches on the agenda to evaluate"));
            }
            Overlay::Choice(choice)
        }
        (Field::Owners, _) => Overlay::Owners {
            row: key,
            cursor: 0,
        },
        (_, control) => Overlay::Text(TextPrompt {
            row: key,
            field,
            buffer: control.display(),
        }),
    };
    Some(Opened::Overlay(overlay))
}

fn session_type_choice(state: &AppState, row: RowKey) -> ChoiceState {
    let entries: Vec<ChoiceEntry> = state
        .reference
        .session_type_groups()
        .into_iter()
        .flat_map(|group| {
            let label = group.label;
            group
                .options
                .into_iter()
                .map(move |(id, title)| ChoiceEntry {
                    group: label,
                    label: title,
                    value: ChoiceValue::SessionType(id),
                })
        })
        .collect();
    let current = state.table.store().get(row).and_then(|row| row.type_id);
    let cursor = current
        .and_then(|id| {
            entries
                .iter()
                .position(|entry| entry.value == ChoiceValue::SessionType(id))
        })
        .unwrap_or(0);
    ChoiceState {
        row,
        title: "session type",
        entries,
        cursor,
    }
}

/// Options are recomputed from the current rows every time the list opens.
fn speaker_choice(state: &AppState, row: RowKey, selected: &str) -> ChoiceState {
    let entries: Vec<ChoiceEntry> = state
        .table
        .speaker_options(&state.reference)
        .into_iter()
        .map(|name| ChoiceEntry {
            group: "Speakers",
            label: name.clone(),
            value: ChoiceValue::Speaker(name),
        })
        .collect();
    let cursor = entries
        .iter()
        .position(|entry| entry.label == selected)
        .unwrap_or(0);
    ChoiceState {
        row,
        title: "evaluated speaker",
        entries,
        cursor,
    }
}

fn handle_overlay_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(overlay) = view_data.overlay.take() else {
        return;
    };
    let next = match overlay {
        Overlay::Choice(choice) => handle_choice_key(state, view_data, internal_tx, choice, key),
        Overlay::Text(prompt) => handle_text_key(state, view_data, internal_tx, prompt, key),
        Overlay::Owners { row, cursor } => {
            handle_owner_key(state, runtime, view_data, internal_tx, row, cursor, key)
        }
        Overlay::Contacts { row, cursor } => {
            handle_contact_key(state, view_data, internal_tx, row, cursor, key)
        }
        Overlay::MeetingId { buffer } => {
            handle_meeting_id_key(state, runtime, view_data, internal_tx, buffer, key)
        }
        Overlay::NewMeeting(prompt) => {
            handle_new_meeting_key(state, runtime, view_data, internal_tx, prompt, key)
        }
    };
    view_data.overlay = next;
}

fn handle_choice_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut choice: ChoiceState,
    key: KeyEvent,
) -> Option<Overlay> {
    match key.code {
        KeyCode::Esc => return None,
        KeyCode::Char('j') | KeyCode::Down => {
            if choice.cursor + 1 < choice.entries.len() {
                choice.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => choice.cursor = choice.cursor.saturating_sub(1),
        KeyCode::Enter => {
            let command = choice
                .entries
                .get(choice.cursor)
                .map(|entry| match &entry.value {
                    ChoiceValue::SessionType(id) => AppCommand::ChangeSessionType {
                        row: choice.row,
                        type_id: Some(*id),
                    },
                    ChoiceValue::Speaker(name) => AppCommand::SelectSpeaker {
                        row: choice.row,
                        name: name.clone(),
                    },
                });
            if let Some(command) = command {
                dispatch_and_report(state, view_data, internal_tx, command);
            }
            return None;
        }
        _ => {}
    }
    Some(Overlay::Choice(choice))
}

/// Every keystroke is committed to the row so nothing is lost on save.
fn handle_text_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut prompt: TextPrompt,
    key: KeyEvent,
) -> Option<Overlay> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => return None,
        KeyCode::Backspace => {
            prompt.buffer.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.buffer.push(ch);
        }
        _ => return Some(Overlay::Text(prompt)),
    }
    dispatch_and_report(
        state,
        view_data,
        internal_tx,
        AppCommand::EditText {
            row: prompt.row,
            field: prompt.field,
            value: prompt.buffer.clone(),
        },
    );
    Some(Overlay::Text(prompt))
}

fn handle_owner_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    row: RowKey,
    cursor: usize,
    key: KeyEvent,
) -> Option<Overlay> {
    let (query, suggestions, last_selected) = match state.table.editor(row) {
        Some(editor) => (
            editor.owners.query().to_owned(),
            editor.owners.suggestions().len(),
            editor.owners.selected().last().copied(),
        ),
        None => return None,
    };
    let owner = |action| AppCommand::Owner { row, action };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let mut cursor = cursor;

    match (key.code, ctrl) {
        (KeyCode::Esc, _) => {
            dispatch_and_report(state, view_data, internal_tx, owner(OwnerAction::Close));
            return None;
        }
        (KeyCode::Down, _) => {
            if cursor + 1 < suggestions {
                cursor += 1;
            }
        }
        (KeyCode::Up, _) => cursor = cursor.saturating_sub(1),
        (KeyCode::Enter, _) => {
            if suggestions == 0 {
                if query.is_empty() {
                    return None;
                }
            } else {
                dispatch_and_report(
                    state,
                    view_data,
                    internal_tx,
                    owner(OwnerAction::PickSuggestion(cursor)),
                );
                cursor = 0;
            }
        }
        (KeyCode::Tab, _) => return Some(Overlay::Contacts { row, cursor: 0 }),
        (KeyCode::Char('n'), true) => {
            create_contact(state, runtime, view_data, internal_tx, row, &query);
            cursor = 0;
        }
        (KeyCode::Char('u'), true) => {
            dispatch_and_report(state, view_data, internal_tx, owner(OwnerAction::Clear));
            cursor = 0;
        }
        (KeyCode::Backspace, _) => {
            let action = if query.is_empty() {
                match last_selected {
                    Some(id) => OwnerAction::Remove(id),
                    None => return Some(Overlay::Owners { row, cursor }),
                }
            } else {
                let mut shorter = query;
                shorter.pop();
                OwnerAction::Query(shorter)
            };
            dispatch_and_report(state, view_data, internal_tx, owner(action));
            cursor = 0;
        }
        (KeyCode::Char(ch), false) => {
            let mut longer = query;
            longer.push(ch);
            dispatch_and_report(
                state,
                view_data,
                internal_tx,
                owner(OwnerAction::Query(longer)),
            );
            cursor = 0;
        }
        _ => {}
    }
    Some(Overlay::Owners { row, cursor })
}

fn create_contact<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    row: RowKey,
    query: &str,
) {
    let form = ContactForm::from_query(query);
    if let Err(error) = form.validate() {
        emit_status(state, view_data, internal_tx, format!("{error:#}"));
        return;
    }
    match runtime.create_contact(&form) {
        Ok(contact) => {
            let events = state.contact_created(row, contact);
            report_events(state, view_data, internal_tx, &events);
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("contact create failed: {error:#}"),
        ),
    }
}

/// Contacts the picker can still add to `row`.
fn pickable_contacts(state: &AppState, row: RowKey) -> Vec<&Contact> {
    let selected = state
        .table
        .editor(row)
        .map(|editor| editor.owners.selected().to_vec())
        .unwrap_or_default();
    state
        .reference
        .contacts
        .iter()
        .filter(|contact| !selected.contains(&contact.id))
        .collect()
}

fn handle_contact_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    row: RowKey,
    cursor: usize,
    key: KeyEvent,
) -> Option<Overlay> {
    let contacts: Vec<_> = pickable_contacts(state, row)
        .into_iter()
        .map(|contact| contact.id)
        .collect();
    let mut cursor = cursor.min(contacts.len().saturating_sub(1));
    match key.code {
        KeyCode::Esc => return Some(Overlay::Owners { row, cursor: 0 }),
        KeyCode::Char('j') | KeyCode::Down => {
            if cursor + 1 < contacts.len() {
                cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => cursor = cursor.saturating_sub(1),
        KeyCode::Enter => {
            if let Some(id) = contacts.get(cursor) {
                dispatch_and_report(
                    state,
                    view_data,
                    internal_tx,
                    AppCommand::Owner {
                        row,
                        action: OwnerAction::AddFromPicker(*id),
                    },
                );
            }
            return Some(Overlay::Owners { row, cursor: 0 });
        }
        _ => {}
    }
    Some(Overlay::Contacts { row, cursor })
}

fn handle_meeting_id_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut buffer: String,
    key: KeyEvent,
) -> Option<Overlay> {
    match key.code {
        KeyCode::Esc => return None,
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(ch) if ch.is_ascii_digit() => buffer.push(ch),
        KeyCode::Enter => {
            match buffer.trim().parse::<i64>() {
                Ok(id) => load_meeting(state, runtime, view_data, internal_tx, MeetingId::new(id)),
                Err(_) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "meeting id must be a number",
                ),
            }
            return None;
        }
        _ => {}
    }
    Some(Overlay::MeetingId { buffer })
}

fn handle_new_meeting_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut prompt: NewMeetingPrompt,
    key: KeyEvent,
) -> Option<Overlay> {
    let fields = prompt.values.len();
    match key.code {
        KeyCode::Esc => return None,
        KeyCode::Tab => prompt.focus = (prompt.focus + 1) % fields,
        KeyCode::BackTab => prompt.focus = (prompt.focus + fields - 1) % fields,
        KeyCode::Backspace => {
            prompt.values[prompt.focus].pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.values[prompt.focus].push(ch);
        }
        KeyCode::Enter => {
            let [date, start, meeting_type] = &prompt.values;
            let created = NewMeeting::parse(date, start, meeting_type)
                .and_then(|meeting| runtime.create_meeting(&meeting));
            match created {
                Ok(meeting_id) => {
                    load_meeting(state, runtime, view_data, internal_tx, meeting_id);
                    return None;
                }
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("create meeting failed: {error:#}"),
                ),
            }
        }
        _ => {}
    }
    Some(Overlay::NewMeeting(prompt))
}

fn load_meeting<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    meeting_id: MeetingId,
) {
    match runtime.load_agenda(meeting_id) {
        Ok(snapshot) => {
            state.load_agenda(meeting_id, snapshot);
            view_data.selected_row = 0;
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("meeting {meeting_id} loaded"),
            );
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("load failed: {error:#}"),
        ),
    }
}

/// Fresh reference data and an empty table, then the same meeting if one was
/// selected. Always leaves edit mode.
fn full_reload<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let meeting = state.meeting_id();
    let reference = match runtime.load_reference_data() {
        Ok(reference) => reference,
        Err(error) => {
            let cached = state.reference.clone();
            state.reset(cached);
            view_data.selected_row = 0;
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("reload failed: {error:#}"),
            );
            return;
        }
    };
    state.reset(reference);
    view_data.selected_row = 0;
    if let Some(meeting_id) = meeting {
        load_meeting(state, runtime, view_data, internal_tx, meeting_id);
    }
}

fn cancel_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    for event in state.dispatch(AppCommand::CancelEdit) {
        let AppEvent::CancelRequested(plan) = event else {
            continue;
        };
        match plan {
            CancelPlan::Fetch(meeting_id) => match runtime.load_agenda(meeting_id) {
                Ok(snapshot) => {
                    state.load_agenda(meeting_id, snapshot);
                    clamp_selection(state, view_data);
                    emit_status(state, view_data, internal_tx, "edits discarded");
                }
                Err(_) => full_reload(state, runtime, view_data, internal_tx),
            },
            CancelPlan::Reload => full_reload(state, runtime, view_data, internal_tx),
        }
    }
}

fn save_agenda<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let payload = match state.prepare_save() {
        Ok(payload) => payload,
        Err(_) => {
            bump_status(view_data, internal_tx);
            return;
        }
    };
    match runtime.save_agenda(&payload) {
        Ok(snapshot) => {
            state.save_succeeded(snapshot);
            clamp_selection(state, view_data);
        }
        Err(error) => {
            state.save_failed(&error.to_string());
        }
    }
    bump_status(view_data, internal_tx);
}

fn advance_status<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(meeting_id) = state.meeting_id() else {
        emit_status(
            state,
            view_data,
            internal_tx,
            "no meeting selected -- press g to pick one",
        );
        return;
    };
    match runtime.advance_meeting_status(meeting_id) {
        Ok(status) => {
            state.meeting_status_changed(&status);
            bump_status(view_data, internal_tx);
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("status change failed: {error:#}"),
        ),
    }
}

fn move_selected(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let Some(row) = selected_key(state, view_data) else {
        return;
    };
    let events = dispatch_and_report(
        state,
        view_data,
        internal_tx,
        AppCommand::MoveRow { row, delta },
    );
    if !events.is_empty() {
        select_key(state, view_data, row);
    }
}

fn insert_row(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    section: bool,
) {
    let after = selected_key(state, view_data);
    let events = dispatch_and_report(
        state,
        view_data,
        internal_tx,
        AppCommand::InsertRow { after, section },
    );
    for event in events {
        if let AppEvent::RowInserted(key) = event {
            select_key(state, view_data, key);
            view_data.selected_col = if section { 1 } else { 2 };
        }
    }
}

fn delete_selected<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(view) = selected_view(state, view_data) else {
        return;
    };
    let key = view.key;
    if !view.actions.is_some_and(|actions| actions.can_delete) {
        emit_status(state, view_data, internal_tx, "row is read-only");
        return;
    }
    if let Some(id) = key.log_id()
        && let Err(error) = runtime.delete_row(id)
    {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("delete failed: {error:#}"),
        );
        return;
    }
    if !dispatch_and_report(state, view_data, internal_tx, AppCommand::RemoveRow(key)).is_empty()
    {
        emit_status(state, view_data, internal_tx, "row deleted");
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let title = Paragraph::new(title_text(state))
        .style(Style::default().fg(Color::White))
        .block(Block::default().title("agenda").borders(Borders::ALL));
    frame.render_widget(title, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(overlay) = &view_data.overlay {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let widget = Paragraph::new(render_overlay_text(state, overlay)).block(
            Block::default()
                .title(overlay_title(overlay))
                .borders(Borders::ALL),
        );
        frame.render_widget(widget, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn column_widths(columns: usize) -> Vec<Constraint> {
    let mut widths = vec![
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Min(18),
        Constraint::Min(22),
        Constraint::Min(22),
        Constraint::Length(4),
        Constraint::Length(4),
    ];
    if columns > widths.len() {
        widths.push(Constraint::Length(10));
    }
    widths
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let chrome = state.table.chrome();
    let header = Row::new(chrome.header.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let mode = state.mode();
    let rows = state
        .table
        .views()
        .iter()
        .enumerate()
        .map(|(row_index, view)| {
            let selected_row = row_index == view_data.selected_row;
            let focus = display_column(view, view_data.selected_col);
            let cells = row_cells(view, mode, chrome.header.len())
                .into_iter()
                .enumerate()
                .map(|(column_index, text)| {
                    let mut style = Style::default();
                    if view.is_section {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    if view.is_hidden {
                        style = style.fg(Color::DarkGray);
                    }
                    if view.invalid {
                        style = style.fg(Color::Red);
                    }
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row && mode == TableMode::Edit && column_index == focus {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(text).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        });

    let table = Table::new(rows, column_widths(chrome.header.len()))
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("agenda [{}]", mode.label()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

/// Column a section row draws its title in.
const SECTION_TITLE_COLUMN: usize = 2;

fn display_column(view: &RowView, selected_col: usize) -> usize {
    if view.is_section && selected_col > 0 {
        SECTION_TITLE_COLUMN
    } else {
        selected_col
    }
}

fn cell_text(control: &FieldControl) -> String {
    match control {
        FieldControl::Select { .. } | FieldControl::SpeakerSelect { .. } => {
            let value = control.display();
            if value.is_empty() {
                format!("(choose) {SELECT_MARK}")
            } else {
                format!("{value} {SELECT_MARK}")
            }
        }
        FieldControl::Input { disabled: true, .. } => DISABLED_CELL.to_owned(),
        FieldControl::Owners { query, .. } if !query.is_empty() => {
            format!("{} +{query}", control.display())
        }
        _ => control.display(),
    }
}

fn row_cells(view: &RowView, mode: TableMode, columns: usize) -> Vec<String> {
    let mut cells = vec![String::new(); columns];
    if view.is_section {
        cells[0] = view.ordinal.to_string();
        if let Some(cell) = view.cell(Field::Title) {
            cells[SECTION_TITLE_COLUMN] = format!("== {} ==", cell.control.display());
        }
    } else {
        for (index, field) in Field::ALL.iter().enumerate() {
            if let Some(cell) = view.cell(*field) {
                cells[index] = cell_text(&cell.control);
            }
        }
    }
    if mode == TableMode::Edit
        && let (Some(actions), Some(last)) = (view.actions, cells.last_mut())
    {
        *last = if actions.can_delete {
            "move del".to_owned()
        } else {
            "move".to_owned()
        };
    }
    cells
}

fn title_text(state: &AppState) -> String {
    match &state.meeting {
        Some(meeting) => {
            let mut text = format!("meeting {}", meeting.meeting_id);
            if !meeting.title.is_empty() {
                text.push_str(&format!(": {}", meeting.title));
            }
            if !meeting.status.is_empty() {
                text.push_str(&format!(" | status: {}", meeting.status));
            }
            if !meeting.wod.is_empty() {
                text.push_str(&format!(" | word of the day: {}", meeting.wod));
            }
            text
        }
        None => "no meeting selected -- press g to open one".to_owned(),
    }
}

/// Plain-text projection of the table as `render_table` draws it.
#[cfg(test)]
fn render_table_text(state: &AppState, view_data: &ViewData) -> String {
    let chrome = state.table.chrome();
    let mode = state.mode();
    let mut lines = vec![chrome.header.join(" | ")];
    for (index, view) in state.table.views().iter().enumerate() {
        let marker = match (index == view_data.selected_row, view.invalid) {
            (true, true) => ">!",
            (true, false) => "> ",
            (false, true) => " !",
            (false, false) => "  ",
        };
        let cells = row_cells(view, mode, chrome.header.len());
        lines.push(format!("{marker}{}", cells.join(" | ")));
    }
    lines.join("\n")
}

fn overlay_title(overlay: &Overlay) -> &'static str {
    match overlay {
        Overlay::Choice(choice) => choice.title,
        Overlay::Text(_) => "edit",
        Overlay::Owners { .. } => "owners",
        Overlay::Contacts { .. } => "contacts",
        Overlay::MeetingId { .. } => "open meeting",
        Overlay::NewMeeting(_) => "new meeting",
    }
}

fn render_overlay_text(state: &AppState, overlay: &Overlay) -> String {
    match overlay {
        Overlay::Choice(choice) => {
            let mut lines = Vec::new();
            let mut group = "";
            for (index, entry) in choice.entries.iter().enumerate() {
                if entry.group != group {
                    group = entry.group;
                    lines.push(format!("-- {group} --"));
                }
                let marker = if index == choice.cursor { "> " } else { "  " };
                lines.push(format!("{marker}{}", entry.label));
            }
            lines.push(String::new());
            lines.push("j/k move | enter choose | esc close".to_owned());
            lines.join("\n")
        }
        Overlay::Text(prompt) => format!(
            "{}: {}_\n\nchanges apply as you type | enter/esc close",
            field_label(prompt.field),
            prompt.buffer
        ),
        Overlay::Owners { row, cursor } => owner_overlay_text(state, *row, *cursor),
        Overlay::Contacts { row, cursor } => {
            let mut lines: Vec<String> = pickable_contacts(state, *row)
                .iter()
                .enumerate()
                .map(|(index, contact)| {
                    let marker = if index == *cursor { "> " } else { "  " };
                    if contact.credentials.is_empty() {
                        format!("{marker}{}", contact.name)
                    } else {
                        format!("{marker}{}, {}", contact.name, contact.credentials)
                    }
                })
                .collect();
            lines.push(String::new());
            lines.push("j/k move | enter add | esc back".to_owned());
            lines.join("\n")
        }
        Overlay::MeetingId { buffer } => {
            format!("meeting id: {buffer}_\n\nenter open | esc close")
        }
        Overlay::NewMeeting(prompt) => {
            let mut lines: Vec<String> = NEW_MEETING_LABELS
                .iter()
                .zip(prompt.values.iter())
                .enumerate()
                .map(|(index, (label, value))| {
                    let marker = if index == prompt.focus { "> " } else { "  " };
                    format!("{marker}{label}: {value}")
                })
                .collect();
            lines.push(String::new());
            lines.push("tab next field | enter create | esc close".to_owned());
            lines.join("\n")
        }
    }
}

fn owner_overlay_text(state: &AppState, row: RowKey, cursor: usize) -> String {
    let Some(editor) = state.table.editor(row) else {
        return String::new();
    };
    let tags = editor
        .owners
        .tags(&state.reference)
        .iter()
        .map(|tag| format!("[{}]", tag.name))
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = vec![
        format!("owners: {tags}"),
        format!("search: {}_", editor.owners.query()),
    ];
    for (index, id) in editor.owners.suggestions().iter().enumerate() {
        let marker = if index == cursor { "> " } else { "  " };
        let name = state.reference.contact_name(*id).unwrap_or_default();
        lines.push(format!("{marker}{name}"));
    }
    lines.push(String::new());
    lines.push(
        "enter pick | tab all contacts | ctrl+n new contact | backspace remove | ctrl+u clear | esc close"
            .to_owned(),
    );
    lines.join("\n")
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Sequence => "order",
        Field::StartTime => "start",
        Field::SessionType => "session type",
        Field::Title => "title",
        Field::Owners => "owners",
        Field::DurationMin => "min minutes",
        Field::DurationMax => "max minutes",
    }
}

fn help_overlay_text() -> &'static str {
    "view mode\n\
     j/k, arrows  move between rows\n\
     e            edit the agenda\n\
     g            open a meeting by id\n\
     N            create a meeting\n\
     S            advance the meeting status\n\
     r            reload everything\n\
     q, ctrl+q    quit\n\
     \n\
     edit mode\n\
     h/l, arrows  move between fields\n\
     enter        edit the focused field\n\
     J/K          move the row down/up\n\
     a / A        add a row / a section below\n\
     d            delete the row\n\
     ctrl+s       save\n\
     esc          discard edits\n\
     \n\
     ? or esc closes this help"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = state.mode().label();
    if let Some(status) = &state.status_line {
        return format!("{mode} | {status}");
    }
    if view_data.overlay.is_some() {
        return format!("{mode} | esc closes the dialog");
    }
    let hints = match state.mode() {
        TableMode::View => "e edit | g meeting | N new | S status | r reload | ? help | q quit",
        TableMode::Edit => {
            "enter edit | J/K move | a/A add | d delete | ctrl+s save | esc cancel | ? help"
        }
    };
    format!("{mode} | {hints}")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
