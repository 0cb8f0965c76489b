// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::{BTreeMap, BTreeSet};

use crate::editor::parse_duration_input;
use crate::fields::Field;
use crate::payload::{RowPayload, SaveBlocked, SavePayload, extract_row_data};
use crate::rows::{RowView, build_row, header};
use crate::session_type::{apply_session_type_change, apply_topics_lockout};
use crate::speakers::speaker_options;
use crate::sync::{assign_next_project, assign_owners, propagate_owners};
use crate::{
    AgendaSnapshot, MeetingMeta, OwnerAction, ReferenceData, Row, RowEditor, RowKey, RowStore,
    SessionTypeId, TableMode,
};

/// Visibility of everything around the rows that depends on the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChrome {
    pub header: &'static [&'static str],
    pub edit_actions_visible: bool,
    pub meeting_selector_enabled: bool,
    pub reorder_enabled: bool,
}

impl TableChrome {
    fn for_mode(mode: TableMode) -> Self {
        let editing = mode == TableMode::Edit;
        Self {
            header: header(mode),
            edit_actions_visible: editing,
            meeting_selector_enabled: !editing,
            reorder_enabled: editing,
        }
    }
}

/// Result of an owner edit: the rows whose owners were overwritten to match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnerEditOutcome {
    pub changed: bool,
    pub synced: Vec<RowKey>,
}

/// The agenda table: typed row records plus the edit-mode controls, with the
/// rendered rows kept as a full projection of both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaTable {
    mode: TableMode,
    store: RowStore,
    editors: BTreeMap<RowKey, RowEditor>,
    views: Vec<RowView>,
    invalid: BTreeSet<RowKey>,
    server_speakers: Vec<String>,
    chrome: TableChrome,
}

impl Default for AgendaTable {
    fn default() -> Self {
        Self {
            mode: TableMode::View,
            store: RowStore::default(),
            editors: BTreeMap::new(),
            views: Vec::new(),
            invalid: BTreeSet::new(),
            server_speakers: Vec::new(),
            chrome: TableChrome::for_mode(TableMode::View),
        }
    }
}

impl AgendaTable {
    pub fn from_snapshot(snapshot: AgendaSnapshot, ctx: &ReferenceData) -> Self {
        let mut table = Self {
            store: RowStore::from_snapshots(snapshot.rows),
            server_speakers: snapshot.project_speakers,
            ..Self::default()
        };
        table.rebuild(ctx);
        table
    }

    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn chrome(&self) -> TableChrome {
        self.chrome
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn views(&self) -> &[RowView] {
        &self.views
    }

    pub fn editor(&self, key: RowKey) -> Option<&RowEditor> {
        self.editors.get(&key)
    }

    pub fn invalid_rows(&self) -> &BTreeSet<RowKey> {
        &self.invalid
    }

    pub fn server_speakers(&self) -> &[String] {
        &self.server_speakers
    }

    /// Switches between the static and the editable rendering. Every row is
    /// rebuilt either way.
    pub fn set_edit_mode(&mut self, enabled: bool, ctx: &ReferenceData) {
        self.mode = if enabled {
            TableMode::Edit
        } else {
            TableMode::View
        };
        self.editors.clear();
        if enabled {
            for row in self.store.iter() {
                self.editors.insert(row.key, RowEditor::from_row(row));
            }
        } else {
            self.invalid.clear();
        }
        self.chrome = TableChrome::for_mode(self.mode);
        self.rebuild(ctx);
        log::info!("agenda table switched to {} mode", self.mode.label());
    }

    /// Options for an evaluation title select, recomputed at every open.
    pub fn speaker_options(&self, ctx: &ReferenceData) -> Vec<String> {
        speaker_options(&self.store, ctx, &self.server_speakers)
    }

    pub fn change_session_type(
        &mut self,
        key: RowKey,
        type_id: Option<SessionTypeId>,
        ctx: &ReferenceData,
    ) -> bool {
        if !self.is_editable(key) {
            return false;
        }
        let Some(row) = self.store.get_mut(key) else {
            return false;
        };
        if let Some(editor) = self.editors.get(&key) {
            row.title = editor.title.clone();
        }
        apply_session_type_change(row, type_id, ctx);
        assign_next_project(row, ctx);
        if type_id.is_some() {
            self.invalid.remove(&key);
        }
        if let Some(editor) = self.editors.get_mut(&key) {
            editor.refresh_text(row);
        }
        self.rebuild(ctx);
        true
    }

    /// Commits typing in a text input to both the edit buffer and the record.
    pub fn edit_text(&mut self, key: RowKey, field: Field, value: &str, ctx: &ReferenceData) -> bool {
        if !field.is_text_input() || !self.is_editable(key) {
            return false;
        }
        let (Some(row), Some(editor)) = (self.store.get_mut(key), self.editors.get_mut(&key))
        else {
            return false;
        };

        match field {
            Field::Title => {
                editor.title = value.to_owned();
                row.title = value.to_owned();
            }
            Field::DurationMin => {
                editor.duration_min = value.to_owned();
                row.duration_min = parse_duration_input(value);
            }
            Field::DurationMax => {
                editor.duration_max = value.to_owned();
                row.duration_max = parse_duration_input(value);
                apply_topics_lockout(row);
                if row.duration_max.is_none() {
                    editor.duration_max.clear();
                }
            }
            _ => return false,
        }
        self.rebuild(ctx);
        true
    }

    /// Selects a speaker name as the title of an evaluation row.
    pub fn select_speaker(&mut self, key: RowKey, name: &str, ctx: &ReferenceData) -> bool {
        if !self.is_editable(key) {
            return false;
        }
        let (Some(row), Some(editor)) = (self.store.get_mut(key), self.editors.get_mut(&key))
        else {
            return false;
        };
        row.title = name.to_owned();
        editor.title = name.to_owned();
        self.rebuild(ctx);
        true
    }

    /// Runs an action on a row's owner widget. When the selection changes the
    /// row record is updated and the change mirrored to every sync target.
    pub fn owner_action(
        &mut self,
        key: RowKey,
        action: OwnerAction,
        ctx: &ReferenceData,
    ) -> OwnerEditOutcome {
        if !self.is_editable(key) {
            return OwnerEditOutcome::default();
        }
        let Some(editor) = self.editors.get_mut(&key) else {
            return OwnerEditOutcome::default();
        };
        let Some(change) = editor.owners.apply(action, ctx) else {
            self.rebuild(ctx);
            return OwnerEditOutcome::default();
        };

        if let Some(row) = self.store.get_mut(key) {
            assign_owners(row, &change.owner_ids, ctx);
            assign_next_project(row, ctx);
        }
        let synced = propagate_owners(&mut self.store, key, ctx);
        for target in &synced {
            if let (Some(row), Some(editor)) = (self.store.get(*target), self.editors.get_mut(target))
            {
                editor.owners.replace(&row.owner_ids);
            }
        }
        self.rebuild(ctx);
        OwnerEditOutcome {
            changed: true,
            synced,
        }
    }

    /// Drag-to-reorder; only available in edit mode.
    pub fn move_row(&mut self, key: RowKey, delta: isize, ctx: &ReferenceData) -> bool {
        if !self.chrome.reorder_enabled || !self.store.move_row(key, delta) {
            return false;
        }
        self.rebuild(ctx);
        true
    }

    pub fn insert_row(
        &mut self,
        after: Option<RowKey>,
        section: bool,
        ctx: &ReferenceData,
    ) -> Option<RowKey> {
        if self.mode != TableMode::Edit {
            return None;
        }
        let key = self.store.allocate_new_key();
        let row = if section {
            Row::section(key, 0, "")
        } else {
            Row::new(key, 0)
        };
        self.editors.insert(key, RowEditor::from_row(&row));
        self.store.insert_after(after, row);
        self.rebuild(ctx);
        Some(key)
    }

    pub fn remove_row(&mut self, key: RowKey, ctx: &ReferenceData) -> Option<Row> {
        if self.mode != TableMode::Edit {
            return None;
        }
        let removed = self.store.remove(key)?;
        self.editors.remove(&key);
        self.invalid.remove(&key);
        self.rebuild(ctx);
        Some(removed)
    }

    /// Validates and serializes every row. On failure the offending rows are
    /// marked and nothing should be sent.
    pub fn prepare_save(
        &mut self,
        meeting: &MeetingMeta,
        ctx: &ReferenceData,
    ) -> Result<SavePayload, SaveBlocked> {
        let missing: Vec<RowKey> = self
            .store
            .iter()
            .filter(|row| !row.is_section && !row.is_readonly && row.type_id.is_none())
            .map(|row| row.key)
            .collect();
        if !missing.is_empty() {
            self.invalid = missing.iter().copied().collect();
            self.rebuild(ctx);
            log::warn!("save blocked: {} row(s) without a session type", missing.len());
            return Err(SaveBlocked { rows: missing });
        }

        self.invalid.clear();
        let rows: Vec<RowPayload> = self
            .store
            .iter()
            .map(|row| extract_row_data(row, self.editors.get(&row.key)))
            .collect();
        Ok(SavePayload::new(meeting, rows))
    }

    /// Replaces every row with the server's canonical state and returns to
    /// view mode. Used after a successful save and by cancel.
    pub fn apply_snapshot(&mut self, snapshot: AgendaSnapshot, ctx: &ReferenceData) {
        self.store = RowStore::from_snapshots(snapshot.rows);
        self.server_speakers = snapshot.project_speakers;
        self.set_edit_mode(false, ctx);
    }

    /// Re-projects after the reference data changed.
    pub fn refresh(&mut self, ctx: &ReferenceData) {
        self.rebuild(ctx);
    }

    fn is_editable(&self, key: RowKey) -> bool {
        self.mode == TableMode::Edit
            && self
                .store
                .get(key)
                .is_some_and(|row| !row.is_readonly)
    }

    fn rebuild(&mut self, ctx: &ReferenceData) {
        let speakers = if self.mode == TableMode::Edit {
            self.speaker_options(ctx)
        } else {
            Vec::new()
        };
        self.views = self
            .store
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let mut view = build_row(
                    row,
                    index + 1,
                    self.mode,
                    self.editors.get(&row.key),
                    ctx,
                    &speakers,
                );
                view.invalid = self.invalid.contains(&row.key);
                view
            })
            .collect();
    }
}
