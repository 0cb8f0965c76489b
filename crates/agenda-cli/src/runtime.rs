// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agenda_app::speakers::compute_project_speakers;
use agenda_app::{
    AgendaSnapshot, Contact, ContactForm, ContactId, LogId, MeetingId, MeetingMeta, NewMeeting,
    ReferenceData, Row, RowKey, RowPayload, RowStore, SavePayload,
};
use agenda_client::Client;
use anyhow::{Context, Result, anyhow, bail};
use std::collections::BTreeMap;

const MEETING_STATUSES: [&str; 3] = ["draft", "running", "finished"];

/// Talks to the agenda server.
pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl agenda_tui::AppRuntime for HttpRuntime {
    fn load_reference_data(&mut self) -> Result<ReferenceData> {
        self.client
            .fetch_reference_data()
            .context("load reference data")
    }

    fn load_agenda(&mut self, meeting_id: MeetingId) -> Result<AgendaSnapshot> {
        self.client
            .fetch_agenda(meeting_id)
            .with_context(|| format!("load meeting {meeting_id}"))
    }

    fn save_agenda(&mut self, payload: &SavePayload) -> Result<AgendaSnapshot> {
        Ok(self.client.save_agenda(payload)?)
    }

    fn delete_row(&mut self, id: LogId) -> Result<()> {
        Ok(self.client.delete_row(id)?)
    }

    fn advance_meeting_status(&mut self, meeting_id: MeetingId) -> Result<String> {
        Ok(self.client.advance_status(meeting_id)?)
    }

    fn create_meeting(&mut self, meeting: &NewMeeting) -> Result<MeetingId> {
        Ok(self.client.create_meeting(meeting)?)
    }

    fn create_contact(&mut self, form: &ContactForm) -> Result<Contact> {
        Ok(self.client.save_contact(None, form)?)
    }
}

/// In-memory club for `--demo`: answers like the server would, nothing persists.
pub struct DemoRuntime {
    reference: ReferenceData,
    agendas: BTreeMap<MeetingId, AgendaSnapshot>,
    next_log_id: i64,
}

impl DemoRuntime {
    pub fn new(seed: u64) -> Self {
        let (reference, snapshot) = agenda_testkit::demo_club(seed);
        let meeting_id = snapshot
            .meeting
            .as_ref()
            .map_or(agenda_testkit::FIXTURE_MEETING_ID, |meeting| {
                meeting.meeting_id
            });
        let next_log_id = snapshot
            .rows
            .iter()
            .filter_map(|row| row.key.log_id())
            .map(LogId::get)
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            reference,
            agendas: BTreeMap::from([(meeting_id, snapshot)]),
            next_log_id,
        }
    }

    /// The seeded meeting opened at startup.
    pub fn first_meeting(&self) -> Option<MeetingId> {
        self.agendas.keys().next().copied()
    }

    fn snapshot_mut(&mut self, meeting_id: MeetingId) -> Result<&mut AgendaSnapshot> {
        self.agendas
            .get_mut(&meeting_id)
            .ok_or_else(|| anyhow!("meeting {meeting_id} does not exist in the demo club"))
    }

    fn row_from_payload(&mut self, index: usize, payload: &RowPayload) -> Row {
        let key = match payload.id {
            RowKey::Saved(id) => RowKey::Saved(id),
            RowKey::New(_) => {
                let id = LogId::new(self.next_log_id);
                self.next_log_id += 1;
                RowKey::Saved(id)
            }
        };
        let sequence = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Row {
            is_section: payload.is_section,
            is_hidden: payload.is_hidden,
            start_time: payload.start_time.clone(),
            type_id: payload.type_id,
            title: payload.session_title.clone(),
            owner_ids: payload.owner_ids.clone(),
            credentials: payload.credentials.clone(),
            duration_min: payload.duration_min,
            duration_max: payload.duration_max,
            project_id: payload.project_id,
            status: payload.status.clone(),
            role: payload.role.clone(),
            ..Row::new(key, sequence)
        }
    }
}

impl agenda_tui::AppRuntime for DemoRuntime {
    fn load_reference_data(&mut self) -> Result<ReferenceData> {
        Ok(self.reference.clone())
    }

    fn load_agenda(&mut self, meeting_id: MeetingId) -> Result<AgendaSnapshot> {
        Ok(self.snapshot_mut(meeting_id)?.clone())
    }

    fn save_agenda(&mut self, payload: &SavePayload) -> Result<AgendaSnapshot> {
        self.snapshot_mut(payload.meeting_id)?;
        let rows: Vec<Row> = payload
            .agenda_data
            .iter()
            .enumerate()
            .map(|(index, row)| self.row_from_payload(index, row))
            .collect();
        let project_speakers =
            compute_project_speakers(&RowStore::from_snapshots(rows.clone()), &self.reference);

        let snapshot = self.snapshot_mut(payload.meeting_id)?;
        snapshot.rows = rows;
        snapshot.project_speakers = project_speakers;
        if let Some(meeting) = snapshot.meeting.as_mut() {
            meeting.title = payload.meeting_title.clone();
            meeting.subtitle = payload.subtitle.clone();
            meeting.meeting_type = payload.meeting_type.clone();
            meeting.wod = payload.wod.clone();
            meeting.media_url = payload.media_url.clone();
            meeting.manager_id = payload.manager_id;
            meeting.ge_mode = payload.ge_mode;
        }
        Ok(snapshot.clone())
    }

    fn delete_row(&mut self, id: LogId) -> Result<()> {
        let key = RowKey::Saved(id);
        for snapshot in self.agendas.values_mut() {
            let before = snapshot.rows.len();
            snapshot.rows.retain(|row| row.key != key);
            if snapshot.rows.len() != before {
                return Ok(());
            }
        }
        bail!("agenda row {id} does not exist")
    }

    fn advance_meeting_status(&mut self, meeting_id: MeetingId) -> Result<String> {
        let snapshot = self.snapshot_mut(meeting_id)?;
        let meeting = snapshot
            .meeting
            .get_or_insert_with(|| MeetingMeta::bare(meeting_id));
        let current = MEETING_STATUSES
            .iter()
            .position(|status| *status == meeting.status)
            .unwrap_or(0);
        let Some(next) = MEETING_STATUSES.get(current + 1) else {
            bail!("meeting {meeting_id} is already finished");
        };
        meeting.status = (*next).to_owned();
        Ok(meeting.status.clone())
    }

    fn create_meeting(&mut self, meeting: &NewMeeting) -> Result<MeetingId> {
        meeting.validate()?;
        let meeting_id = self
            .agendas
            .keys()
            .next_back()
            .map_or(MeetingId::new(1), |last| MeetingId::new(last.get() + 1));
        let meta = MeetingMeta {
            title: format!("Meeting {meeting_id} ({})", meeting.meeting_date),
            meeting_type: meeting.meeting_type.clone(),
            status: MEETING_STATUSES[0].to_owned(),
            ..MeetingMeta::bare(meeting_id)
        };
        self.agendas.insert(
            meeting_id,
            AgendaSnapshot {
                meeting: Some(meta),
                ..AgendaSnapshot::default()
            },
        );
        Ok(meeting_id)
    }

    fn create_contact(&mut self, form: &ContactForm) -> Result<Contact> {
        form.validate()?;
        let id = self
            .reference
            .contacts
            .iter()
            .map(|contact| contact.id.get())
            .max()
            .unwrap_or(0)
            + 1;
        let contact = Contact {
            id: ContactId::new(id),
            name: form.name.trim().to_owned(),
            credentials: form.credentials.trim().to_owned(),
            next_project: Some(form.next_project.trim().to_owned())
                .filter(|hint| !hint.is_empty()),
        };
        self.reference.upsert_contact(contact.clone());
        Ok(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, HttpRuntime};
    use agenda_app::payload::extract_row_data;
    use agenda_app::{
        AppCommand, AppState, ContactForm, MeetingId, MeetingMeta, NewMeeting, RowKey, SavePayload,
    };
    use agenda_client::Client;
    use agenda_testkit::FIXTURE_SEED;
    use agenda_tui::AppRuntime;
    use anyhow::{Result, anyhow};
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Response, Server};

    fn demo() -> Result<(DemoRuntime, AppState)> {
        let mut runtime = DemoRuntime::new(FIXTURE_SEED);
        let meeting_id = runtime
            .first_meeting()
            .ok_or_else(|| anyhow!("demo should seed a meeting"))?;
        let mut state = AppState::new(runtime.load_reference_data()?);
        let snapshot = runtime.load_agenda(meeting_id)?;
        state.load_agenda(meeting_id, snapshot);
        Ok((runtime, state))
    }

    #[test]
    fn demo_save_assigns_ids_to_new_rows() -> Result<()> {
        let (mut runtime, mut state) = demo()?;
        let meeting = state
            .meeting
            .clone()
            .ok_or_else(|| anyhow!("meeting should be loaded"))?;
        let mut rows: Vec<_> = state
            .table
            .store()
            .iter()
            .map(|row| extract_row_data(row, None))
            .collect();
        let mut extra = rows[0].clone();
        extra.id = RowKey::New(1);
        extra.session_title = "Extra".to_owned();
        rows.push(extra);

        let saved = runtime.save_agenda(&SavePayload::new(&meeting, rows.clone()))?;
        assert_eq!(saved.rows.len(), rows.len());
        assert!(saved.rows.iter().all(|row| !row.key.is_new()));
        let last = saved.rows.last().ok_or_else(|| anyhow!("rows expected"))?;
        assert_eq!(last.title, "Extra");
        assert_eq!(last.sequence as usize, rows.len());

        state.dispatch(AppCommand::EnterEditMode);
        state.save_succeeded(saved);
        assert_eq!(state.table.store().len(), rows.len());
        Ok(())
    }

    #[test]
    fn demo_delete_and_status_cycle() -> Result<()> {
        let (mut runtime, state) = demo()?;
        let meeting_id = state.meeting_id().ok_or_else(|| anyhow!("meeting expected"))?;
        let first = state.table.store().rows()[0]
            .key
            .log_id()
            .ok_or_else(|| anyhow!("seeded rows are saved"))?;

        runtime.delete_row(first)?;
        assert!(runtime.delete_row(first).is_err());
        assert_eq!(
            runtime.load_agenda(meeting_id)?.rows.len(),
            state.table.store().len() - 1
        );

        assert_eq!(runtime.advance_meeting_status(meeting_id)?, "running");
        assert_eq!(runtime.advance_meeting_status(meeting_id)?, "finished");
        assert!(runtime.advance_meeting_status(meeting_id).is_err());
        Ok(())
    }

    #[test]
    fn demo_creates_meetings_and_contacts() -> Result<()> {
        let (mut runtime, _state) = demo()?;
        let meeting = NewMeeting::parse("2026-04-02", "19:00", "Regular")?;
        let meeting_id = runtime.create_meeting(&meeting)?;
        let snapshot = runtime.load_agenda(meeting_id)?;
        assert!(snapshot.rows.is_empty());
        assert_eq!(
            snapshot.meeting.map(|meeting| meeting.meeting_type),
            Some("Regular".to_owned())
        );

        let contact = runtime.create_contact(&ContactForm::from_query("  Rowan Price "))?;
        assert_eq!(contact.name, "Rowan Price");
        let reference = runtime.load_reference_data()?;
        assert_eq!(reference.contact_name(contact.id), Some("Rowan Price"));

        assert!(runtime.create_contact(&ContactForm::default()).is_err());
        Ok(())
    }

    #[test]
    fn http_save_rejection_keeps_server_message() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            let response =
                Response::from_string(r#"{"success": false, "message": "Meeting is finished"}"#);
            request.respond(response).expect("response should succeed");
        });

        let client = Client::new(&addr, Duration::from_secs(2), None)?;
        let mut runtime = HttpRuntime::new(client);
        let payload = SavePayload::new(&MeetingMeta::bare(MeetingId::new(5)), Vec::new());
        let error = runtime
            .save_agenda(&payload)
            .expect_err("rejected save should fail");
        assert_eq!(error.to_string(), "Meeting is finished");

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn http_load_failure_names_the_meeting() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50), None)?;
        let mut runtime = HttpRuntime::new(client);
        let error = runtime
            .load_agenda(MeetingId::new(42))
            .expect_err("unreachable server should fail");
        let message = format!("{error:#}");
        assert!(message.contains("load meeting 42"));
        assert!(message.contains("is the agenda server running"));
        Ok(())
    }
}
