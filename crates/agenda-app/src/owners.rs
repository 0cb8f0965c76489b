// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ContactId, ReferenceData};

pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerAction {
    Query(String),
    PickSuggestion(usize),
    AddFromPicker(ContactId),
    Remove(ContactId),
    Clear,
    Close,
}

/// Values pushed onto the owning row after any change to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerChange {
    pub primary: Option<ContactId>,
    pub owner_ids: Vec<ContactId>,
    pub credentials: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTag {
    pub id: ContactId,
    pub name: String,
}

/// Tag-style multi-owner editor with a filtered contact autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnerPicker {
    selected: Vec<ContactId>,
    query: String,
    suggestions: Vec<ContactId>,
}

impl OwnerPicker {
    pub fn new(initial: &[ContactId]) -> Self {
        let mut picker = Self::default();
        for id in initial {
            if !picker.selected.contains(id) {
                picker.selected.push(*id);
            }
        }
        picker
    }

    pub fn selected(&self) -> &[ContactId] {
        &self.selected
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[ContactId] {
        &self.suggestions
    }

    pub fn is_open(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn tags(&self, ctx: &ReferenceData) -> Vec<OwnerTag> {
        self.selected
            .iter()
            .map(|id| OwnerTag {
                id: *id,
                name: ctx
                    .contact_name(*id)
                    .map_or_else(|| format!("#{}", id.get()), str::to_owned),
            })
            .collect()
    }

    /// Replaces the selection when another row's change is mirrored here.
    pub fn replace(&mut self, owners: &[ContactId]) {
        *self = Self::new(owners);
    }

    /// Applies an action; returns the row update when the selection changed.
    pub fn apply(&mut self, action: OwnerAction, ctx: &ReferenceData) -> Option<OwnerChange> {
        match action {
            OwnerAction::Query(query) => {
                self.suggestions = filter_contacts(ctx, &query, &self.selected);
                self.query = query;
                None
            }
            OwnerAction::PickSuggestion(index) => {
                let id = self.suggestions.get(index).copied()?;
                self.close();
                self.add(id, ctx)
            }
            OwnerAction::AddFromPicker(id) => {
                self.close();
                self.add(id, ctx)
            }
            OwnerAction::Remove(id) => {
                let before = self.selected.len();
                self.selected.retain(|selected| *selected != id);
                (self.selected.len() != before).then(|| self.change(ctx))
            }
            OwnerAction::Clear => {
                self.close();
                if self.selected.is_empty() {
                    return None;
                }
                self.selected.clear();
                Some(self.change(ctx))
            }
            OwnerAction::Close => {
                self.close();
                None
            }
        }
    }

    fn add(&mut self, id: ContactId, ctx: &ReferenceData) -> Option<OwnerChange> {
        if self.selected.contains(&id) {
            return None;
        }
        self.selected.push(id);
        Some(self.change(ctx))
    }

    fn close(&mut self) {
        self.query.clear();
        self.suggestions.clear();
    }

    fn change(&self, ctx: &ReferenceData) -> OwnerChange {
        OwnerChange {
            primary: self.selected.first().copied(),
            owner_ids: self.selected.clone(),
            credentials: ctx.credentials_for(&self.selected),
        }
    }
}

/// Case-insensitive substring match over contact names, skipping contacts
/// already selected, capped at [`MAX_SUGGESTIONS`].
pub fn filter_contacts(ctx: &ReferenceData, query: &str, exclude: &[ContactId]) -> Vec<ContactId> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    ctx.contacts
        .iter()
        .filter(|contact| !exclude.contains(&contact.id))
        .filter(|contact| contact.name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .map(|contact| contact.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{MAX_SUGGESTIONS, OwnerAction, OwnerPicker, filter_contacts};
    use crate::test_support::reference;
    use crate::{Contact, ContactId};

    #[test]
    fn filter_is_case_insensitive_substring() {
        let data = reference();
        assert_eq!(
            filter_contacts(&data, "WALK", &[]),
            vec![ContactId::new(1)]
        );
        assert_eq!(
            filter_contacts(&data, "e", &[ContactId::new(3)]),
            vec![ContactId::new(1), ContactId::new(4)]
        );
        assert!(filter_contacts(&data, "   ", &[]).is_empty());
    }

    #[test]
    fn filter_caps_suggestions() {
        let mut data = reference();
        for id in 100..130 {
            data.contacts.push(Contact {
                id: ContactId::new(id),
                name: format!("Guest {id}"),
                credentials: String::new(),
                next_project: None,
            });
        }
        assert_eq!(filter_contacts(&data, "guest", &[]).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn picking_suggestion_adds_owner_and_closes_list() {
        let data = reference();
        let mut picker = OwnerPicker::new(&[ContactId::new(2)]);

        assert!(picker.apply(OwnerAction::Query("riley".to_owned()), &data).is_none());
        assert!(picker.is_open());

        let change = picker
            .apply(OwnerAction::PickSuggestion(0), &data)
            .expect("selection changed");
        assert!(!picker.is_open());
        assert!(picker.query().is_empty());
        assert_eq!(change.owner_ids, vec![ContactId::new(2), ContactId::new(4)]);
        assert_eq!(change.primary, Some(ContactId::new(2)));
        assert_eq!(change.credentials, "CC");
    }

    #[test]
    fn duplicate_add_and_missing_remove_are_no_ops() {
        let data = reference();
        let mut picker = OwnerPicker::new(&[ContactId::new(1), ContactId::new(1)]);
        assert_eq!(picker.selected(), &[ContactId::new(1)]);
        assert!(
            picker
                .apply(OwnerAction::AddFromPicker(ContactId::new(1)), &data)
                .is_none()
        );
        assert!(
            picker
                .apply(OwnerAction::Remove(ContactId::new(9)), &data)
                .is_none()
        );
        assert!(picker.apply(OwnerAction::PickSuggestion(3), &data).is_none());
    }

    #[test]
    fn removing_primary_promotes_next_owner() {
        let data = reference();
        let mut picker = OwnerPicker::new(&[ContactId::new(1), ContactId::new(4)]);
        let change = picker
            .apply(OwnerAction::Remove(ContactId::new(1)), &data)
            .expect("selection changed");
        assert_eq!(change.primary, Some(ContactId::new(4)));
        assert_eq!(change.credentials, "ACB");
    }

    #[test]
    fn clear_reports_empty_selection_once() {
        let data = reference();
        let mut picker = OwnerPicker::new(&[ContactId::new(1)]);
        let change = picker.apply(OwnerAction::Clear, &data).expect("cleared");
        assert!(change.owner_ids.is_empty());
        assert!(change.credentials.is_empty());
        assert!(picker.apply(OwnerAction::Clear, &data).is_none());
    }

    #[test]
    fn tags_fall_back_to_id_for_unknown_contacts() {
        let data = reference();
        let picker = OwnerPicker::new(&[ContactId::new(2), ContactId::new(77)]);
        let names: Vec<String> = picker.tags(&data).into_iter().map(|tag| tag.name).collect();
        assert_eq!(names, vec!["Jordan Hill".to_owned(), "#77".to_owned()]);
    }
}
