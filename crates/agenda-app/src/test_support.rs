// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{
    ClubId, Contact, ContactId, LogId, MeetingRole, Project, ProjectId, ReferenceData, Row,
    RowKey, SessionType, SessionTypeId,
};

fn kind(id: i64, title: &str, role: &str, durations: (Option<u32>, Option<u32>)) -> SessionType {
    SessionType {
        id: SessionTypeId::new(id),
        title: title.to_owned(),
        role: role.to_owned(),
        duration_min: durations.0,
        duration_max: durations.1,
        is_section: false,
        valid_for_project: false,
        predefined: false,
        club_id: Some(ClubId::new(1)),
    }
}

fn contact(id: i64, name: &str, credentials: &str, next_project: Option<&str>) -> Contact {
    Contact {
        id: ContactId::new(id),
        name: name.to_owned(),
        credentials: credentials.to_owned(),
        next_project: next_project.map(str::to_owned),
    }
}

fn role(name: &str, is_distinct: bool) -> MeetingRole {
    MeetingRole {
        name: name.to_owned(),
        is_distinct,
    }
}

pub(crate) fn reference() -> ReferenceData {
    let mut opening = kind(1, "Opening", "", (None, None));
    opening.is_section = true;
    let mut speech = kind(20, "Prepared Speech", "Prepared Speaker", (Some(5), Some(7)));
    speech.valid_for_project = true;
    let mut pathway = kind(22, "Pathway Speech", "Pathway Speaker", (Some(5), Some(7)));
    pathway.valid_for_project = true;
    let mut wod = kind(24, "Word of the Day", "Grammarian", (Some(1), Some(2)));
    wod.predefined = true;

    ReferenceData {
        session_types: vec![
            opening,
            kind(10, "Timer Introduction", "Timer", (Some(1), Some(2))),
            kind(11, "Timer Report", "Timer", (Some(1), Some(2))),
            kind(12, "Ah-Counter Introduction", "", (Some(1), Some(2))),
            kind(13, "Ah-Counter Report", "", (Some(1), Some(2))),
            speech,
            kind(21, "Evaluation", "Evaluator", (Some(2), Some(3))),
            pathway,
            kind(23, "Presentation", "", (Some(20), Some(30))),
            wod,
            kind(25, "Grammarian Report", "Grammarian", (Some(2), Some(3))),
            kind(36, "Topics Speaker", "Topics Speaker", (Some(1), Some(2))),
        ],
        contacts: vec![
            contact(1, "Avery Walker", "DTM", Some("PM1.2")),
            contact(2, "Jordan Hill", "CC", None),
            contact(3, "Taylor Reed", "", Some("DL1.1")),
            contact(4, "Riley Evans", "ACB", None),
        ],
        projects: vec![
            Project {
                id: ProjectId::new(501),
                title: "Ice Breaker".to_owned(),
                codes: BTreeMap::from([("PM".to_owned(), "1.1".to_owned())]),
            },
            Project {
                id: ProjectId::new(502),
                title: "Evaluation and Feedback".to_owned(),
                codes: BTreeMap::from([("PM".to_owned(), "1.2".to_owned())]),
            },
            Project {
                id: ProjectId::new(503),
                title: "Ice Breaker".to_owned(),
                codes: BTreeMap::from([("DL".to_owned(), "1.1".to_owned())]),
            },
        ],
        meeting_types: vec!["Regular".to_owned(), "Speech Contest".to_owned()],
        meeting_roles: vec![
            role("Timer", false),
            role("Grammarian", false),
            role("Prepared Speaker", true),
            role("Pathway Speaker", true),
            role("Evaluator", true),
            role("Topics Speaker", true),
        ],
        pathways: BTreeMap::from([
            ("Presentation Mastery".to_owned(), "PM".to_owned()),
            ("Dynamic Leadership".to_owned(), "DL".to_owned()),
        ]),
        global_club_id: Some(ClubId::new(1)),
    }
}

pub(crate) fn row(id: i64, type_id: i64, title: &str, owners: &[i64]) -> Row {
    let owner_ids: Vec<ContactId> = owners.iter().copied().map(ContactId::new).collect();
    let data = reference();
    Row {
        type_id: Some(SessionTypeId::new(type_id)),
        title: title.to_owned(),
        credentials: data.credentials_for(&owner_ids),
        owner_ids,
        ..Row::new(RowKey::Saved(LogId::new(id)), id as u32)
    }
}

pub(crate) fn key(id: i64) -> RowKey {
    RowKey::Saved(LogId::new(id))
}
