// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::*;

/// Session type reserved for the table-topics speaker slot; it never carries
/// an upper duration bound.
pub const TOPICS_SPEAKER_TYPE_ID: SessionTypeId = SessionTypeId::new(36);

pub const EVALUATION_TITLE: &str = "Evaluation";
pub const PATHWAY_SPEECH_TITLE: &str = "Pathway Speech";
pub const PREPARED_SPEECH_TITLE: &str = "Prepared Speech";
pub const PRESENTATION_TITLE: &str = "Presentation";
pub const PRESENTATION_DURATION: (u32, u32) = (10, 15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableMode {
    View,
    Edit,
}

impl TableMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Edit => "EDIT",
        }
    }
}

/// One line of the agenda table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RowWire")]
pub struct Row {
    pub key: RowKey,
    pub sequence: u32,
    pub is_section: bool,
    pub is_hidden: bool,
    pub is_readonly: bool,
    pub start_time: String,
    pub type_id: Option<SessionTypeId>,
    pub title: String,
    pub owner_ids: Vec<ContactId>,
    pub credentials: String,
    pub duration_min: Option<u32>,
    pub duration_max: Option<u32>,
    pub project_id: Option<ProjectId>,
    pub status: String,
    pub role: String,
}

impl Row {
    pub fn new(key: RowKey, sequence: u32) -> Self {
        Self {
            key,
            sequence,
            is_section: false,
            is_hidden: false,
            is_readonly: false,
            start_time: String::new(),
            type_id: None,
            title: String::new(),
            owner_ids: Vec::new(),
            credentials: String::new(),
            duration_min: None,
            duration_max: None,
            project_id: None,
            status: String::new(),
            role: String::new(),
        }
    }

    pub fn section(key: RowKey, sequence: u32, title: &str) -> Self {
        Self {
            is_section: true,
            title: title.to_owned(),
            ..Self::new(key, sequence)
        }
    }

    pub fn primary_owner(&self) -> Option<ContactId> {
        self.owner_ids.first().copied()
    }
}

/// Server rows carry the legacy single `owner_id` next to `owner_ids`; older
/// snapshots only have the former.
#[derive(Debug, Deserialize)]
struct RowWire {
    id: RowKey,
    #[serde(default)]
    sequence: u32,
    #[serde(default)]
    is_section: bool,
    #[serde(default)]
    is_hidden: bool,
    #[serde(default)]
    is_readonly: bool,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    type_id: Option<SessionTypeId>,
    #[serde(default)]
    session_title: Option<String>,
    #[serde(default)]
    owner_id: Option<ContactId>,
    #[serde(default)]
    owner_ids: Vec<ContactId>,
    #[serde(default)]
    credentials: Option<String>,
    #[serde(default)]
    duration_min: Option<u32>,
    #[serde(default)]
    duration_max: Option<u32>,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<RowWire> for Row {
    fn from(wire: RowWire) -> Self {
        let mut owner_ids = wire.owner_ids;
        if owner_ids.is_empty()
            && let Some(owner_id) = wire.owner_id
        {
            owner_ids.push(owner_id);
        }

        Self {
            key: wire.id,
            sequence: wire.sequence,
            is_section: wire.is_section,
            is_hidden: wire.is_hidden,
            is_readonly: wire.is_readonly,
            start_time: wire.start_time.unwrap_or_default(),
            type_id: wire.type_id,
            title: wire.session_title.unwrap_or_default(),
            owner_ids,
            credentials: wire.credentials.unwrap_or_default(),
            duration_min: wire.duration_min,
            duration_max: wire.duration_max,
            project_id: wire.project_id,
            status: wire.status.unwrap_or_default(),
            role: wire.role.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionType {
    pub id: SessionTypeId,
    pub title: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub duration_min: Option<u32>,
    #[serde(default)]
    pub duration_max: Option<u32>,
    #[serde(default)]
    pub is_section: bool,
    #[serde(default)]
    pub valid_for_project: bool,
    #[serde(default)]
    pub predefined: bool,
    #[serde(default)]
    pub club_id: Option<ClubId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    #[serde(default)]
    pub credentials: String,
    #[serde(default)]
    pub next_project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRole {
    pub name: String,
    #[serde(default)]
    pub is_distinct: bool,
}

impl MeetingRole {
    pub const fn is_shared(&self) -> bool {
        !self.is_distinct
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    /// Pathway abbreviation to project code within that pathway, e.g. `PM -> 1.2`.
    #[serde(default)]
    pub codes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingMeta {
    pub meeting_id: MeetingId,
    #[serde(default, rename = "meeting_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub meeting_type: String,
    #[serde(default)]
    pub wod: String,
    #[serde(default)]
    pub media_url: String,
    #[serde(default)]
    pub manager_id: Option<ContactId>,
    #[serde(default)]
    pub ge_mode: u8,
    #[serde(default)]
    pub status: String,
}

impl MeetingMeta {
    pub fn bare(meeting_id: MeetingId) -> Self {
        Self {
            meeting_id,
            title: String::new(),
            subtitle: String::new(),
            meeting_type: String::new(),
            wod: String::new(),
            media_url: String::new(),
            manager_id: None,
            ge_mode: 0,
            status: String::new(),
        }
    }
}

/// Canonical agenda state as returned by the server after a load or save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AgendaSnapshot {
    #[serde(default, rename = "logs_data")]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub project_speakers: Vec<String>,
    #[serde(default)]
    pub meeting: Option<MeetingMeta>,
}

#[cfg(test)]
mod tests {
    use super::{AgendaSnapshot, MeetingRole, Row};
    use crate::{ContactId, LogId, RowKey, SessionTypeId};
    use anyhow::Result;

    #[test]
    fn legacy_single_owner_becomes_owner_list() -> Result<()> {
        let row: Row = serde_json::from_str(
            r#"{"id": 4, "sequence": 2, "type_id": 10, "session_title": "Timer", "owner_id": 7}"#,
        )?;
        assert_eq!(row.key, RowKey::Saved(LogId::new(4)));
        assert_eq!(row.type_id, Some(SessionTypeId::new(10)));
        assert_eq!(row.owner_ids, vec![ContactId::new(7)]);
        assert_eq!(row.primary_owner(), Some(ContactId::new(7)));
        Ok(())
    }

    #[test]
    fn owner_list_wins_over_legacy_owner() -> Result<()> {
        let row: Row = serde_json::from_str(
            r#"{"id": 4, "owner_id": 7, "owner_ids": [8, 7], "credentials": null}"#,
        )?;
        assert_eq!(row.owner_ids, vec![ContactId::new(8), ContactId::new(7)]);
        assert!(row.credentials.is_empty());
        Ok(())
    }

    #[test]
    fn snapshot_reads_logs_data_and_speakers() -> Result<()> {
        let snapshot: AgendaSnapshot = serde_json::from_str(
            r#"{"logs_data": [{"id": 1, "is_section": true, "session_title": "Opening"}],
                "project_speakers": ["Avery Walker"]}"#,
        )?;
        assert_eq!(snapshot.rows.len(), 1);
        assert!(snapshot.rows[0].is_section);
        assert_eq!(snapshot.project_speakers, vec!["Avery Walker".to_owned()]);
        assert!(snapshot.meeting.is_none());
        Ok(())
    }

    #[test]
    fn roles_default_to_shared() -> Result<()> {
        let role: MeetingRole = serde_json::from_str(r#"{"name": "Timer"}"#)?;
        assert!(role.is_shared());
        Ok(())
    }
}
