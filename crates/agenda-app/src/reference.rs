// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{
    ClubId, Contact, ContactId, MeetingRole, Project, ProjectId, SessionType, SessionTypeId,
};

/// Lookup data fetched once per page load. Every renderer and handler takes
/// it by reference; it only changes through an explicit reload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub session_types: Vec<SessionType>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub meeting_types: Vec<String>,
    #[serde(default)]
    pub meeting_roles: Vec<MeetingRole>,
    /// Pathway name to abbreviation.
    #[serde(default)]
    pub pathways: BTreeMap<String, String>,
    #[serde(default)]
    pub global_club_id: Option<ClubId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTypeGroup {
    pub label: &'static str,
    pub options: Vec<(SessionTypeId, String)>,
}

impl ReferenceData {
    pub fn session_type(&self, id: SessionTypeId) -> Option<&SessionType> {
        self.session_types.iter().find(|kind| kind.id == id)
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == id)
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn role(&self, name: &str) -> Option<&MeetingRole> {
        self.meeting_roles.iter().find(|role| role.name == name)
    }

    pub fn contact_name(&self, id: ContactId) -> Option<&str> {
        self.contact(id).map(|contact| contact.name.as_str())
    }

    /// Credentials shown next to an owner set always come from the primary owner.
    pub fn credentials_for(&self, owners: &[ContactId]) -> String {
        owners
            .first()
            .and_then(|id| self.contact(*id))
            .map(|contact| contact.credentials.clone())
            .unwrap_or_default()
    }

    /// Options for the session-type select: club-specific types, then the
    /// standard catalogue, then section headers, each sorted by title.
    pub fn session_type_groups(&self) -> Vec<SessionTypeGroup> {
        let mut club = Vec::new();
        let mut standard = Vec::new();
        let mut sections = Vec::new();

        for kind in &self.session_types {
            let option = (kind.id, kind.title.clone());
            if kind.is_section {
                sections.push(option);
            } else if self.is_club_specific(kind) {
                club.push(option);
            } else {
                standard.push(option);
            }
        }

        for group in [&mut club, &mut standard, &mut sections] {
            group.sort_by(|left, right| {
                left.1
                    .to_ascii_lowercase()
                    .cmp(&right.1.to_ascii_lowercase())
            });
        }

        vec![
            SessionTypeGroup {
                label: "Club Specific",
                options: club,
            },
            SessionTypeGroup {
                label: "Standard",
                options: standard,
            },
            SessionTypeGroup {
                label: "Section Headers",
                options: sections,
            },
        ]
    }

    fn is_club_specific(&self, kind: &SessionType) -> bool {
        match (kind.club_id, self.global_club_id) {
            (Some(club), Some(global)) => club != global,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Whether `abbreviation` names a known pathway. An empty pathway map
    /// accepts every abbreviation.
    pub fn is_pathway_abbreviation(&self, abbreviation: &str) -> bool {
        self.pathways.is_empty() || self.pathways.values().any(|known| known == abbreviation)
    }

    /// Resolves a next-project hint such as `PM1.2` (pathway abbreviation
    /// followed by the code) against the project code tables.
    pub fn project_for_hint(&self, hint: &str) -> Option<ProjectId> {
        let hint = hint.trim();
        let split = hint.find(|ch: char| ch.is_ascii_digit())?;
        let (abbreviation, code) = hint.split_at(split);
        if abbreviation.is_empty() || code.is_empty() {
            return None;
        }
        if !self.is_pathway_abbreviation(abbreviation) {
            return None;
        }

        self.projects
            .iter()
            .find(|project| {
                project
                    .codes
                    .get(abbreviation)
                    .is_some_and(|candidate| candidate == code)
            })
            .map(|project| project.id)
    }

    /// Inline contact creation appends; an edit of a cached contact replaces it.
    pub fn upsert_contact(&mut self, contact: Contact) {
        match self.contacts.iter_mut().find(|cached| cached.id == contact.id) {
            Some(cached) => *cached = contact,
            None => self.contacts.push(contact),
        }
    }
}
