// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use std::fmt;

use crate::editor::parse_duration_input;
use crate::{
    ContactId, MeetingId, MeetingMeta, ProjectId, Row, RowEditor, RowKey, SessionTypeId,
};

pub const SAVE_BLOCKED_MESSAGE: &str = "Please select a session type for every agenda item.";

/// One row as sent to `POST /agenda/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowPayload {
    pub id: RowKey,
    pub sequence: u32,
    pub is_section: bool,
    pub is_hidden: bool,
    pub start_time: String,
    pub type_id: Option<SessionTypeId>,
    pub session_title: String,
    pub owner_id: Option<ContactId>,
    pub owner_ids: Vec<ContactId>,
    pub credentials: String,
    pub duration_min: Option<u32>,
    pub duration_max: Option<u32>,
    pub project_id: Option<ProjectId>,
    pub status: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePayload {
    pub meeting_id: MeetingId,
    pub agenda_data: Vec<RowPayload>,
    pub ge_mode: u8,
    pub meeting_title: String,
    pub subtitle: String,
    pub meeting_type: String,
    pub wod: String,
    pub media_url: String,
    pub manager_id: Option<ContactId>,
}

impl SavePayload {
    pub fn new(meeting: &MeetingMeta, agenda_data: Vec<RowPayload>) -> Self {
        Self {
            meeting_id: meeting.meeting_id,
            agenda_data,
            ge_mode: meeting.ge_mode,
            meeting_title: meeting.title.clone(),
            subtitle: meeting.subtitle.clone(),
            meeting_type: meeting.meeting_type.clone(),
            wod: meeting.wod.clone(),
            media_url: meeting.media_url.clone(),
            manager_id: meeting.manager_id,
        }
    }
}

/// Client-side validation failure: the save was not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveBlocked {
    pub rows: Vec<RowKey>,
}

impl fmt::Display for SaveBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SAVE_BLOCKED_MESSAGE)
    }
}

impl std::error::Error for SaveBlocked {}

/// Serializes one row. With an editor present the values come from the edit
/// controls; without one the stored record is read directly.
pub fn extract_row_data(row: &Row, editor: Option<&RowEditor>) -> RowPayload {
    if row.is_section {
        return RowPayload {
            id: row.key,
            sequence: row.sequence,
            is_section: true,
            is_hidden: row.is_hidden,
            start_time: String::new(),
            type_id: row.type_id,
            session_title: editor.map_or_else(|| row.title.clone(), |editor| editor.title.clone()),
            owner_id: None,
            owner_ids: Vec::new(),
            credentials: String::new(),
            duration_min: None,
            duration_max: None,
            project_id: None,
            status: row.status.clone(),
            role: String::new(),
        };
    }

    let (title, duration_min, duration_max, owner_ids) = match editor {
        Some(editor) => (
            editor.title.clone(),
            parse_duration_input(&editor.duration_min),
            parse_duration_input(&editor.duration_max),
            editor.owners.selected().to_vec(),
        ),
        None => (
            row.title.clone(),
            row.duration_min,
            row.duration_max,
            row.owner_ids.clone(),
        ),
    };
    let duration_max = if crate::session_type::max_duration_locked(row.type_id) {
        None
    } else {
        duration_max
    };

    RowPayload {
        id: row.key,
        sequence: row.sequence,
        is_section: false,
        is_hidden: row.is_hidden,
        start_time: row.start_time.clone(),
        type_id: row.type_id,
        session_title: title,
        owner_id: owner_ids.first().copied(),
        owner_ids,
        credentials: row.credentials.clone(),
        duration_min,
        duration_max,
        project_id: row.project_id,
        status: row.status.clone(),
        role: row.role.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{SAVE_BLOCKED_MESSAGE, SaveBlocked, SavePayload, extract_row_data};
    use crate::fields::{Field, FieldControl};
    use crate::test_support::{key, reference, row};
    use crate::{
        AgendaSnapshot, AgendaTable, ContactId, MeetingId, MeetingMeta, OwnerAction, Row,
        RowEditor, RowKey, TOPICS_SPEAKER_TYPE_ID,
    };
    use anyhow::Result;

    #[test]
    fn owner_order_survives_build_then_extract() -> Result<()> {
        let data = reference();
        let mut table = AgendaTable::from_snapshot(
            AgendaSnapshot {
                rows: vec![row(1, 20, "Speech", &[3, 1])],
                project_speakers: Vec::new(),
                meeting: None,
            },
            &data,
        );
        table.set_edit_mode(true, &data);

        let control = table.views()[0]
            .cell(Field::Owners)
            .map(|cell| &cell.control);
        let built: Vec<ContactId> = match control {
            Some(FieldControl::Owners { tags, .. }) => tags.iter().map(|tag| tag.id).collect(),
            other => anyhow::bail!("expected owner tags, got {other:?}"),
        };
        assert_eq!(built, vec![ContactId::new(3), ContactId::new(1)]);

        let meeting = MeetingMeta::bare(MeetingId::new(42));
        let untouched = table.prepare_save(&meeting, &data)?;
        assert_eq!(
            untouched.agenda_data[0].owner_ids,
            vec![ContactId::new(3), ContactId::new(1)]
        );

        table.owner_action(key(1), OwnerAction::AddFromPicker(ContactId::new(2)), &data);
        let payload = table.prepare_save(&meeting, &data)?;
        assert_eq!(
            payload.agenda_data[0].owner_ids,
            vec![ContactId::new(3), ContactId::new(1), ContactId::new(2)]
        );
        assert_eq!(payload.agenda_data[0].owner_id, Some(ContactId::new(3)));
        Ok(())
    }

    #[test]
    fn extraction_without_editor_reads_record() {
        let mut snapshot = row(5, 20, "Speech", &[2]);
        snapshot.duration_min = Some(5);
        snapshot.duration_max = Some(7);
        let payload = extract_row_data(&snapshot, None);
        assert_eq!(payload.id, key(5));
        assert_eq!(payload.session_title, "Speech");
        assert_eq!((payload.duration_min, payload.duration_max), (Some(5), Some(7)));
        assert_eq!(payload.owner_ids, vec![ContactId::new(2)]);
    }

    #[test]
    fn editor_buffers_win_over_record() {
        let snapshot = row(5, 20, "Speech", &[2]);
        let mut editor = RowEditor::from_row(&snapshot);
        editor.title = "Renamed".to_owned();
        editor.duration_min = "4".to_owned();
        editor.duration_max = "oops".to_owned();
        let payload = extract_row_data(&snapshot, Some(&editor));
        assert_eq!(payload.session_title, "Renamed");
        assert_eq!(payload.duration_min, Some(4));
        assert_eq!(payload.duration_max, None);
    }

    #[test]
    fn topics_speaker_never_sends_max_duration() {
        let mut snapshot = row(5, 36, "", &[2]);
        snapshot.type_id = Some(TOPICS_SPEAKER_TYPE_ID);
        snapshot.duration_max = Some(3);
        assert_eq!(extract_row_data(&snapshot, None).duration_max, None);
    }

    #[test]
    fn sections_carry_only_header_fields() {
        let mut section = Row::section(RowKey::New(2), 3, "Educational");
        section.owner_ids = vec![ContactId::new(1)];
        let payload = extract_row_data(&section, None);
        assert!(payload.is_section);
        assert!(payload.owner_ids.is_empty());
        assert_eq!(payload.session_title, "Educational");
    }

    #[test]
    fn save_payload_serializes_meeting_fields() -> Result<()> {
        let mut meeting = MeetingMeta::bare(MeetingId::new(42));
        meeting.title = "Weekly".to_owned();
        meeting.wod = "Lucid".to_owned();
        let payload = SavePayload::new(
            &meeting,
            vec![extract_row_data(&Row::new(RowKey::New(1), 1), None)],
        );
        let json = serde_json::to_value(&payload)?;
        assert_eq!(json["meeting_id"], 42);
        assert_eq!(json["meeting_title"], "Weekly");
        assert_eq!(json["wod"], "Lucid");
        assert_eq!(json["agenda_data"][0]["id"], "new");
        assert!(json["manager_id"].is_null());
        Ok(())
    }

    #[test]
    fn save_blocked_message_is_generic() {
        let blocked = SaveBlocked {
            rows: vec![key(1), key(2)],
        };
        assert_eq!(blocked.to_string(), SAVE_BLOCKED_MESSAGE);
    }
}
