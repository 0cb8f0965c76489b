// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agenda_app::{
    AgendaSnapshot, ClubId, Contact, ContactId, EVALUATION_TITLE, LogId, MeetingId, MeetingMeta,
    MeetingRole, PATHWAY_SPEECH_TITLE, Project, ProjectId, ReferenceData, Row, RowKey,
    SessionType, SessionTypeId, TOPICS_SPEAKER_TYPE_ID,
};
use std::collections::BTreeMap;
use time::macros::time;
use time::{Duration, Time};

pub const FIXTURE_SEED: u64 = 42;
pub const FIXTURE_CONTACTS: usize = 14;
pub const FIXTURE_MEETING_ID: MeetingId = MeetingId::new(42);

const STANDARD_CLUB: ClubId = ClubId::new(1);
const HOME_CLUB: ClubId = ClubId::new(7);
const FIRST_LOG_ID: i64 = 100;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 16] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Brooks",
];
const CREDENTIALS: [&str; 7] = ["", "", "CC", "ACB", "DTM", "PM3", "DL5"];

const PATHWAYS: [(&str, &str); 4] = [
    ("Presentation Mastery", "PM"),
    ("Dynamic Leadership", "DL"),
    ("Motivational Strategies", "MS"),
    ("Engaging Humor", "EH"),
];
const PROJECT_TITLES: [&str; 6] = [
    "Ice Breaker",
    "Evaluation and Feedback",
    "Researching and Presenting",
    "Introduction to Vocal Variety",
    "Connect with Storytelling",
    "Persuasive Speaking",
];

const MEETING_TYPES: [&str; 3] = ["Regular", "Speech Contest", "Special Event"];
const WORDS_OF_THE_DAY: [&str; 10] = [
    "Lucid",
    "Ebullient",
    "Candor",
    "Tenacious",
    "Serendipity",
    "Resilient",
    "Meander",
    "Gregarious",
    "Ardent",
    "Quintessential",
];
const SPEECH_TITLES: [&str; 10] = [
    "My Journey So Far",
    "Lessons from the Trail",
    "Why I Bake Bread",
    "The Art of Listening",
    "A Year Without Coffee",
    "Small Habits",
    "Finding North",
    "What Chess Taught Me",
    "Letters to My Younger Self",
    "The Long Way Home",
];

/// Shared roles carry one owner across every row; distinct roles get a new
/// person per row.
const ROLES: [(&str, bool); 10] = [
    ("Toastmaster", false),
    ("Sergeant at Arms", false),
    ("Timer", false),
    ("Ah-Counter", false),
    ("Grammarian", false),
    ("General Evaluator", false),
    ("Topicsmaster", false),
    ("Prepared Speaker", true),
    ("Evaluator", true),
    ("Topics Speaker", true),
];

#[derive(Debug, Clone, Copy)]
struct Kind {
    id: i64,
    title: &'static str,
    role: &'static str,
    minutes: (u32, u32),
}

const fn kind(id: i64, title: &'static str, role: &'static str, minutes: (u32, u32)) -> Kind {
    Kind {
        id,
        title,
        role,
        minutes,
    }
}

const SECTIONS: [(i64, &str); 4] = [
    (1, "Opening"),
    (2, "Prepared Speeches"),
    (3, "Table Topics"),
    (4, "Evaluations"),
];
const KINDS: [Kind; 20] = [
    kind(10, "Timer Introduction", "Timer", (1, 2)),
    kind(11, "Timer Report", "Timer", (1, 2)),
    kind(12, "Ah-Counter Introduction", "Ah-Counter", (1, 2)),
    kind(13, "Ah-Counter Report", "Ah-Counter", (1, 2)),
    kind(14, "Grammarian Introduction", "Grammarian", (1, 2)),
    kind(15, "Grammarian Report", "Grammarian", (2, 3)),
    kind(16, "General Evaluator Introduction", "General Evaluator", (1, 2)),
    kind(17, "General Evaluation Report", "General Evaluator", (3, 5)),
    kind(18, "Table Topics Master Introduction", "Topicsmaster", (1, 2)),
    kind(19, "Table Topics Session", "Topicsmaster", (10, 15)),
    kind(20, "Prepared Speech", "Prepared Speaker", (5, 7)),
    kind(21, "Evaluation", "Evaluator", (2, 3)),
    kind(22, "Pathway Speech", "Prepared Speaker", (5, 7)),
    kind(23, "Presentation", "", (10, 15)),
    kind(24, "Word of the Day", "Grammarian", (1, 1)),
    kind(25, "Call to Order", "Sergeant at Arms", (1, 2)),
    kind(26, "Toastmaster Welcome", "Toastmaster", (2, 3)),
    kind(27, "Vote Counter Introduction", "", (1, 1)),
    kind(28, "Vote Counter Report", "", (1, 1)),
    kind(36, "Topics Speaker", "Topics Speaker", (1, 2)),
];
const PREDEFINED: [i64; 3] = [24, 25, 26];
const PROJECT_KINDS: [i64; 2] = [20, 22];
const CLUB_KIND: Kind = kind(90, "Birthday Toast", "", (1, 2));

/// Layout of a generated meeting: section titles and session-type ids.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Section(usize),
    Session(i64),
}

const AGENDA: [Slot; 25] = [
    Slot::Section(0),
    Slot::Session(25),
    Slot::Session(26),
    Slot::Session(24),
    Slot::Session(10),
    Slot::Session(12),
    Slot::Session(14),
    Slot::Session(16),
    Slot::Section(1),
    Slot::Session(20),
    Slot::Session(20),
    Slot::Session(22),
    Slot::Section(2),
    Slot::Session(18),
    Slot::Session(36),
    Slot::Session(36),
    Slot::Session(19),
    Slot::Section(3),
    Slot::Session(21),
    Slot::Session(21),
    Slot::Session(21),
    Slot::Session(11),
    Slot::Session(13),
    Slot::Session(15),
    Slot::Session(17),
];

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for club rosters and meeting agendas.
pub struct ClubFaker {
    rng: DeterministicRng,
}

impl ClubFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn contact(&mut self, id: i64) -> Contact {
        let name = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
        let next_project = if self.rng.bool() {
            let (_, abbreviation) = PATHWAYS[self.rng.int_n(PATHWAYS.len())];
            Some(format!(
                "{abbreviation}1.{}",
                self.rng.int_n(PROJECT_TITLES.len()) + 1
            ))
        } else {
            None
        };
        Contact {
            id: ContactId::new(id),
            name,
            credentials: self.pick(&CREDENTIALS).to_owned(),
            next_project,
        }
    }

    /// Roster with ids `1..=count` and no repeated names.
    pub fn contacts(&mut self, count: usize) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = Vec::with_capacity(count);
        let mut next_id = 1;
        let mut attempts = 0;
        while contacts.len() < count && attempts < count * 20 {
            attempts += 1;
            let contact = self.contact(next_id);
            if contacts.iter().any(|existing| existing.name == contact.name) {
                continue;
            }
            contacts.push(contact);
            next_id += 1;
        }
        contacts
    }

    pub fn reference_data(&mut self, contact_count: usize) -> ReferenceData {
        ReferenceData {
            session_types: session_types(),
            contacts: self.contacts(contact_count),
            projects: projects(),
            meeting_types: MEETING_TYPES.iter().map(|name| (*name).to_owned()).collect(),
            meeting_roles: ROLES
                .iter()
                .map(|(name, is_distinct)| MeetingRole {
                    name: (*name).to_owned(),
                    is_distinct: *is_distinct,
                })
                .collect(),
            pathways: PATHWAYS
                .iter()
                .map(|(name, abbreviation)| ((*name).to_owned(), (*abbreviation).to_owned()))
                .collect(),
            global_club_id: Some(STANDARD_CLUB),
        }
    }

    pub fn meeting(&mut self, meeting_id: MeetingId, ctx: &ReferenceData) -> MeetingMeta {
        let manager_id = (!ctx.contacts.is_empty())
            .then(|| ctx.contacts[self.rng.int_n(ctx.contacts.len())].id);
        MeetingMeta {
            title: format!("Meeting {meeting_id}"),
            meeting_type: self.pick(&MEETING_TYPES).to_owned(),
            wod: self.pick(&WORDS_OF_THE_DAY).to_owned(),
            manager_id,
            status: "draft".to_owned(),
            ..MeetingMeta::bare(meeting_id)
        }
    }

    /// A full meeting: sections, shared-role pairs with matching owners,
    /// speeches with projects and one evaluation per speech.
    pub fn agenda(&mut self, ctx: &ReferenceData) -> Vec<Row> {
        let mut pool: Vec<ContactId> = ctx.contacts.iter().map(|contact| contact.id).collect();
        self.shuffle(&mut pool);
        let mut next_person = 0usize;
        let mut take_person = |pool: &[ContactId]| -> Option<ContactId> {
            if pool.is_empty() {
                return None;
            }
            let id = pool[next_person % pool.len()];
            next_person += 1;
            Some(id)
        };

        let mut shared: BTreeMap<String, Option<ContactId>> = BTreeMap::new();
        let mut speakers: Vec<ContactId> = Vec::new();
        let mut evaluated = 0usize;
        let mut clock: Time = time!(19:00);
        let mut rows = Vec::with_capacity(AGENDA.len());

        for (index, slot) in AGENDA.iter().enumerate() {
            let key = RowKey::Saved(LogId::new(FIRST_LOG_ID + index as i64));
            let sequence = index as u32 + 1;
            let (type_id, kind) = match slot {
                Slot::Section(section) => {
                    let (id, title) = SECTIONS[*section];
                    rows.push(Row {
                        type_id: Some(SessionTypeId::new(id)),
                        ..Row::section(key, sequence, title)
                    });
                    continue;
                }
                Slot::Session(id) => (SessionTypeId::new(*id), ctx.session_type(SessionTypeId::new(*id))),
            };
            let Some(kind) = kind else {
                continue;
            };

            let distinct = ctx.role(&kind.role).is_none_or(|role| !role.is_shared());
            let owner = if distinct {
                take_person(&pool)
            } else {
                *shared
                    .entry(kind.role.clone())
                    .or_insert_with(|| take_person(&pool))
            };

            let mut row = Row {
                type_id: Some(type_id),
                start_time: format!("{:02}:{:02}", clock.hour(), clock.minute()),
                title: kind.title.clone(),
                owner_ids: owner.into_iter().collect(),
                credentials: ctx.credentials_for(owner.as_slice()),
                duration_min: kind.duration_min,
                duration_max: kind.duration_max,
                role: kind.role.clone(),
                status: "planned".to_owned(),
                ..Row::new(key, sequence)
            };

            if kind.valid_for_project && !ctx.projects.is_empty() {
                let project = ctx.projects[self.rng.int_n(ctx.projects.len())].id;
                row.project_id = Some(project);
                if kind.title == PATHWAY_SPEECH_TITLE {
                    row.title = ctx
                        .project(project)
                        .map(|project| project.title.clone())
                        .unwrap_or_default();
                } else {
                    row.title = self.pick(&SPEECH_TITLES).to_owned();
                }
                speakers.extend(owner);
            } else if kind.title == EVALUATION_TITLE {
                row.title = speakers
                    .get(evaluated)
                    .and_then(|id| ctx.contact_name(*id))
                    .unwrap_or_default()
                    .to_owned();
                evaluated += 1;
            }
            if type_id == TOPICS_SPEAKER_TYPE_ID {
                row.title = String::new();
                row.duration_max = None;
            }

            let minutes = row.duration_max.or(row.duration_min).unwrap_or(1);
            clock += Duration::minutes(i64::from(minutes));
            rows.push(row);
        }
        rows
    }

    pub fn snapshot(&mut self, meeting_id: MeetingId, ctx: &ReferenceData) -> AgendaSnapshot {
        let meeting = self.meeting(meeting_id, ctx);
        let rows = self.agenda(ctx);
        AgendaSnapshot {
            project_speakers: Vec::new(),
            rows,
            meeting: Some(meeting),
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let other = self.rng.int_n(index + 1);
            items.swap(index, other);
        }
    }
}

/// The club every fixture and the demo mode use.
pub fn reference_data() -> ReferenceData {
    ClubFaker::new(FIXTURE_SEED).reference_data(FIXTURE_CONTACTS)
}

/// Reference data plus a seeded meeting for the demo mode and UI tests.
pub fn demo_club(seed: u64) -> (ReferenceData, AgendaSnapshot) {
    let reference = reference_data();
    let snapshot = ClubFaker::new(seed).snapshot(FIXTURE_MEETING_ID, &reference);
    (reference, snapshot)
}

pub fn session_types() -> Vec<SessionType> {
    let mut kinds: Vec<SessionType> = SECTIONS
        .iter()
        .map(|(id, title)| SessionType {
            id: SessionTypeId::new(*id),
            title: (*title).to_owned(),
            role: String::new(),
            duration_min: None,
            duration_max: None,
            is_section: true,
            valid_for_project: false,
            predefined: false,
            club_id: Some(STANDARD_CLUB),
        })
        .collect();
    kinds.extend(KINDS.iter().map(|kind| session_type(kind, STANDARD_CLUB)));
    kinds.push(session_type(&CLUB_KIND, HOME_CLUB));
    kinds
}

/// One project per title per pathway; `PM1.2` is the second title in
/// Presentation Mastery.
pub fn projects() -> Vec<Project> {
    let mut projects = Vec::new();
    for (pathway_index, (_, abbreviation)) in PATHWAYS.iter().enumerate() {
        for (title_index, title) in PROJECT_TITLES.iter().enumerate() {
            projects.push(Project {
                id: ProjectId::new(500 + (pathway_index * 100 + title_index) as i64 + 1),
                title: (*title).to_owned(),
                codes: BTreeMap::from([(
                    (*abbreviation).to_owned(),
                    format!("1.{}", title_index + 1),
                )]),
            });
        }
    }
    projects
}

fn session_type(kind: &Kind, club: ClubId) -> SessionType {
    SessionType {
        id: SessionTypeId::new(kind.id),
        title: kind.title.to_owned(),
        role: kind.role.to_owned(),
        duration_min: Some(kind.minutes.0),
        duration_max: Some(kind.minutes.1),
        is_section: false,
        valid_for_project: PROJECT_KINDS.contains(&kind.id),
        predefined: PREDEFINED.contains(&kind.id),
        club_id: Some(club),
    }
}
