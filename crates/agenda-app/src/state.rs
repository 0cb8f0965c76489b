// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};

use crate::fields::Field;
use crate::payload::SavePayload;
use crate::table::AgendaTable;
use crate::{
    AgendaSnapshot, Contact, ContactId, MeetingId, MeetingMeta, OwnerAction, ReferenceData,
    RowKey, SessionTypeId, TableMode,
};

/// What cancel has to fetch before the table can leave edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPlan {
    /// Re-read the selected meeting's rows.
    Fetch(MeetingId),
    /// Nothing selected: reload reference data and start from an empty table.
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub reference: ReferenceData,
    pub table: AgendaTable,
    pub meeting: Option<MeetingMeta>,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    EnterEditMode,
    CancelEdit,
    ChangeSessionType {
        row: RowKey,
        type_id: Option<SessionTypeId>,
    },
    EditText {
        row: RowKey,
        field: Field,
        value: String,
    },
    SelectSpeaker {
        row: RowKey,
        name: String,
    },
    Owner {
        row: RowKey,
        action: OwnerAction,
    },
    MoveRow {
        row: RowKey,
        delta: isize,
    },
    InsertRow {
        after: Option<RowKey>,
        section: bool,
    },
    RemoveRow(RowKey),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(TableMode),
    RowsChanged,
    OwnersSynced { source: RowKey, targets: Vec<RowKey> },
    RowInserted(RowKey),
    RowRemoved(RowKey),
    CancelRequested(CancelPlan),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> TableMode {
        self.table.mode()
    }

    pub fn meeting_id(&self) -> Option<MeetingId> {
        self.meeting.as_ref().map(|meeting| meeting.meeting_id)
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::EnterEditMode => {
                if self.mode() == TableMode::Edit {
                    return Vec::new();
                }
                self.table.set_edit_mode(true, &self.reference);
                vec![AppEvent::ModeChanged(TableMode::Edit)]
            }
            AppCommand::CancelEdit => {
                if self.mode() != TableMode::Edit {
                    return Vec::new();
                }
                vec![AppEvent::CancelRequested(self.cancel_plan())]
            }
            AppCommand::ChangeSessionType { row, type_id } => {
                rows_changed(self.table.change_session_type(row, type_id, &self.reference))
            }
            AppCommand::EditText { row, field, value } => {
                rows_changed(self.table.edit_text(row, field, &value, &self.reference))
            }
            AppCommand::SelectSpeaker { row, name } => {
                rows_changed(self.table.select_speaker(row, &name, &self.reference))
            }
            AppCommand::Owner { row, action } => {
                let outcome = self.table.owner_action(row, action, &self.reference);
                if !outcome.changed {
                    return Vec::new();
                }
                let mut events = vec![AppEvent::RowsChanged];
                if !outcome.synced.is_empty() {
                    events.push(AppEvent::OwnersSynced {
                        source: row,
                        targets: outcome.synced,
                    });
                }
                events
            }
            AppCommand::MoveRow { row, delta } => {
                rows_changed(self.table.move_row(row, delta, &self.reference))
            }
            AppCommand::InsertRow { after, section } => self
                .table
                .insert_row(after, section, &self.reference)
                .map(|key| vec![AppEvent::RowInserted(key)])
                .unwrap_or_default(),
            AppCommand::RemoveRow(row) => match self.table.remove_row(row, &self.reference) {
                Some(_) => vec![AppEvent::RowRemoved(row)],
                None => Vec::new(),
            },
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn cancel_plan(&self) -> CancelPlan {
        match self.meeting_id() {
            Some(id) => CancelPlan::Fetch(id),
            None => CancelPlan::Reload,
        }
    }

    /// Replaces the reference data after an explicit reload.
    pub fn load_reference(&mut self, reference: ReferenceData) {
        self.reference = reference;
        self.table.refresh(&self.reference);
    }

    /// Shows a meeting's agenda in view mode.
    pub fn load_agenda(&mut self, meeting_id: MeetingId, snapshot: AgendaSnapshot) -> Vec<AppEvent> {
        let previous = self.meeting.take();
        self.meeting = Some(match snapshot.meeting.clone() {
            Some(meeting) => meeting,
            None => previous
                .filter(|meeting| meeting.meeting_id == meeting_id)
                .unwrap_or_else(|| MeetingMeta::bare(meeting_id)),
        });
        let was_editing = self.mode() == TableMode::Edit;
        self.table.apply_snapshot(snapshot, &self.reference);
        let mut events = vec![AppEvent::RowsChanged];
        if was_editing {
            events.insert(0, AppEvent::ModeChanged(TableMode::View));
        }
        events
    }

    /// Full-reload fallback: fresh reference data and an empty table.
    pub fn reset(&mut self, reference: ReferenceData) -> Vec<AppEvent> {
        let was_editing = self.mode() == TableMode::Edit;
        self.reference = reference;
        self.table = AgendaTable::default();
        self.meeting = None;
        let mut events = vec![AppEvent::RowsChanged];
        if was_editing {
            events.insert(0, AppEvent::ModeChanged(TableMode::View));
        }
        events
    }

    /// Builds the save payload, or blocks with a status message.
    pub fn prepare_save(&mut self) -> Result<SavePayload> {
        if self.mode() != TableMode::Edit {
            self.set_status("nothing to save -- press e to edit first");
            return Err(anyhow!("not editing"));
        }
        let Some(meeting) = self.meeting.clone() else {
            self.set_status("select a meeting before saving");
            return Err(anyhow!("no meeting selected"));
        };
        match self.table.prepare_save(&meeting, &self.reference) {
            Ok(payload) => Ok(payload),
            Err(blocked) => {
                self.set_status(&blocked.to_string());
                Err(blocked.into())
            }
        }
    }

    /// The server accepted the save and returned canonical rows.
    pub fn save_succeeded(&mut self, snapshot: AgendaSnapshot) -> Vec<AppEvent> {
        let Some(meeting_id) = self.meeting_id() else {
            return Vec::new();
        };
        log::info!("agenda for meeting {meeting_id} saved");
        let mut events = self.load_agenda(meeting_id, snapshot);
        events.push(self.set_status("saved"));
        events
    }

    /// The save failed; the table stays in edit mode with the message shown.
    pub fn save_failed(&mut self, message: &str) -> Vec<AppEvent> {
        log::warn!("agenda save failed: {message}");
        vec![self.set_status(message)]
    }

    /// Adds a newly created contact to the cache and to the row's owners.
    pub fn contact_created(&mut self, row: RowKey, contact: Contact) -> Vec<AppEvent> {
        let id: ContactId = contact.id;
        let name = contact.name.clone();
        self.reference.upsert_contact(contact);
        let mut events = self.dispatch(AppCommand::Owner {
            row,
            action: OwnerAction::AddFromPicker(id),
        });
        events.push(self.set_status(&format!("added {name}")));
        events
    }

    pub fn meeting_status_changed(&mut self, status: &str) -> Vec<AppEvent> {
        if let Some(meeting) = self.meeting.as_mut() {
            meeting.status = status.to_owned();
        }
        vec![self.set_status(&format!("meeting status: {status}"))]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

fn rows_changed(changed: bool) -> Vec<AppEvent> {
    if changed {
        vec![AppEvent::RowsChanged]
    } else {
        Vec::new()
    }
}
