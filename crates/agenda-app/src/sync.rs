// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Owner propagation between rows that must carry the same people.
//!
//! Two rules decide which rows mirror a source row, checked in this order:
//!
//! 1. Paired titles: a fixed list of introduction/report pairs. The title is
//!    the row's session-type title, or the row's own title when the type id
//!    is not in the reference data.
//! 2. Shared roles: both rows' session types carry the same role tag and that
//!    role is declared non-distinct.
//!
//! A row matching either rule is a target. Section rows never are. Rows that
//! stop matching after a type change keep whatever owners they already have.

use crate::{
    ContactId, PREPARED_SPEECH_TITLE, ProjectId, ReferenceData, Row, RowKey, RowStore,
};

pub const PAIRED_TITLES: [(&str, &str); 6] = [
    ("Ah-Counter Introduction", "Ah-Counter Report"),
    ("Grammarian Introduction", "Grammarian Report"),
    ("Timer Introduction", "Timer Report"),
    ("Vote Counter Introduction", "Vote Counter Report"),
    ("General Evaluator Introduction", "General Evaluation Report"),
    ("Table Topics Master Introduction", "Table Topics Session"),
];

pub fn paired_title(title: &str) -> Option<&'static str> {
    PAIRED_TITLES.iter().find_map(|(intro, report)| {
        if *intro == title {
            Some(*report)
        } else if *report == title {
            Some(*intro)
        } else {
            None
        }
    })
}

fn sync_title<'a>(row: &'a Row, ctx: &'a ReferenceData) -> &'a str {
    row.type_id
        .and_then(|id| ctx.session_type(id))
        .map_or(row.title.as_str(), |kind| kind.title.as_str())
}

fn shared_role<'a>(row: &Row, ctx: &'a ReferenceData) -> Option<&'a str> {
    let kind = ctx.session_type(row.type_id?)?;
    if kind.role.is_empty() {
        return None;
    }
    let role = ctx.role(&kind.role)?;
    role.is_shared().then_some(kind.role.as_str())
}

/// Rows that must mirror `source`'s owners, in table order.
pub fn resolve_sync_targets(store: &RowStore, source: RowKey, ctx: &ReferenceData) -> Vec<RowKey> {
    let Some(source_row) = store.get(source) else {
        return Vec::new();
    };
    if source_row.is_section {
        return Vec::new();
    }

    let partner_title = paired_title(sync_title(source_row, ctx));
    let role = shared_role(source_row, ctx);

    store
        .iter()
        .filter(|row| row.key != source && !row.is_section)
        .filter(|row| {
            let paired = partner_title.is_some_and(|title| sync_title(row, ctx) == title);
            let same_role = role.is_some_and(|role| shared_role(row, ctx) == Some(role));
            paired || same_role
        })
        .map(|row| row.key)
        .collect()
}

/// Writes an owner set onto a row along with the primary owner's credentials.
pub fn assign_owners(row: &mut Row, owners: &[ContactId], ctx: &ReferenceData) {
    row.owner_ids = owners.to_vec();
    row.credentials = ctx.credentials_for(owners);
}

/// Copies `source`'s owners to every sync target and returns the targets.
pub fn propagate_owners(store: &mut RowStore, source: RowKey, ctx: &ReferenceData) -> Vec<RowKey> {
    let Some(owners) = store.get(source).map(|row| row.owner_ids.clone()) else {
        return Vec::new();
    };

    let targets = resolve_sync_targets(store, source, ctx);
    for target in &targets {
        if let Some(row) = store.get_mut(*target) {
            assign_owners(row, &owners, ctx);
        }
    }
    if !targets.is_empty() {
        log::debug!(
            "owners of row {source} mirrored to {} row(s)",
            targets.len()
        );
    }
    targets
}

/// For prepared speeches, picks the project named by the primary owner's
/// next-project hint. Returns the assigned project, if any.
pub fn assign_next_project(row: &mut Row, ctx: &ReferenceData) -> Option<ProjectId> {
    let kind = ctx.session_type(row.type_id?)?;
    if kind.title != PREPARED_SPEECH_TITLE {
        return None;
    }
    let owner = ctx.contact(row.primary_owner()?)?;
    let project = ctx.project_for_hint(owner.next_project.as_deref()?)?;
    row.project_id = Some(project);
    Some(project)
}

#[cfg(test)]
mod tests {
    use super::{
        assign_next_project, assign_owners, paired_title, propagate_owners, resolve_sync_targets,
    };
    use crate::session_type::apply_session_type_change;
    use crate::test_support::{key, reference, row};
    use crate::{ContactId, ProjectId, Row, RowKey, RowStore, SessionTypeId};

    #[test]
    fn paired_titles_are_symmetric() {
        assert_eq!(paired_title("Timer Report"), Some("Timer Introduction"));
        assert_eq!(paired_title("Timer Introduction"), Some("Timer Report"));
        assert_eq!(paired_title("Prepared Speech"), None);
    }

    #[test]
    fn shared_role_rows_mirror_owner_changes() {
        let data = reference();
        let mut store = RowStore::from_snapshots(vec![
            row(1, 24, "Word of the Day", &[1]),
            row(2, 20, "Speech", &[3]),
            row(3, 25, "Grammarian Report", &[1]),
        ]);

        if let Some(source) = store.get_mut(key(1)) {
            assign_owners(source, &[ContactId::new(2), ContactId::new(4)], &data);
        }
        let targets = propagate_owners(&mut store, key(1), &data);
        assert_eq!(targets, vec![key(3)]);

        let source = store.get(key(1)).cloned().expect("source row");
        let mirrored = store.get(key(3)).cloned().expect("target row");
        assert_eq!(mirrored.owner_ids, source.owner_ids);
        assert_eq!(mirrored.primary_owner(), source.primary_owner());
        assert_eq!(mirrored.credentials, "CC");
        assert_eq!(store.get(key(2)).map(|row| row.owner_ids.clone()), Some(vec![ContactId::new(3)]));
    }

    #[test]
    fn distinct_roles_do_not_propagate() {
        let data = reference();
        let store = RowStore::from_snapshots(vec![
            row(1, 20, "Speech A", &[1]),
            row(2, 20, "Speech B", &[2]),
        ]);
        assert!(resolve_sync_targets(&store, key(1), &data).is_empty());
    }

    #[test]
    fn paired_titles_propagate_without_role() {
        let data = reference();
        let mut store = RowStore::from_snapshots(vec![
            row(1, 12, "", &[4]),
            row(2, 13, "", &[]),
        ]);
        let targets = propagate_owners(&mut store, key(1), &data);
        assert_eq!(targets, vec![key(2)]);
        assert_eq!(
            store.get(key(2)).map(|row| row.credentials.clone()),
            Some("ACB".to_owned())
        );
    }

    #[test]
    fn clearing_owners_propagates_empty_set() {
        let data = reference();
        let mut store = RowStore::from_snapshots(vec![
            row(1, 10, "", &[1]),
            row(2, 11, "", &[1]),
        ]);
        if let Some(source) = store.get_mut(key(1)) {
            assign_owners(source, &[], &data);
        }
        propagate_owners(&mut store, key(1), &data);
        let target = store.get(key(2)).expect("target row");
        assert!(target.owner_ids.is_empty());
        assert!(target.credentials.is_empty());
    }

    #[test]
    fn retyped_row_stops_mirroring_but_keeps_owners() {
        let data = reference();
        let mut store = RowStore::from_snapshots(vec![
            row(1, 12, "", &[1]),
            row(2, 13, "", &[1]),
        ]);
        if let Some(intro) = store.get_mut(key(1)) {
            apply_session_type_change(intro, Some(SessionTypeId::new(20)), &data);
        }
        assert!(resolve_sync_targets(&store, key(1), &data).is_empty());

        if let Some(intro) = store.get_mut(key(1)) {
            assign_owners(intro, &[ContactId::new(2)], &data);
        }
        propagate_owners(&mut store, key(1), &data);
        assert_eq!(
            store.get(key(2)).map(|row| row.owner_ids.clone()),
            Some(vec![ContactId::new(1)])
        );
    }

    #[test]
    fn stale_type_falls_back_to_row_title_for_pairing() {
        let data = reference();
        let mut stale = row(1, 999, "Timer Introduction", &[2]);
        stale.type_id = Some(SessionTypeId::new(999));
        let store = RowStore::from_snapshots(vec![stale, row(2, 11, "", &[])]);
        assert_eq!(resolve_sync_targets(&store, key(1), &data), vec![key(2)]);
    }

    #[test]
    fn sections_are_never_targets() {
        let data = reference();
        let store = RowStore::from_snapshots(vec![
            row(1, 10, "", &[1]),
            Row::section(RowKey::New(0), 2, "Timer Report"),
        ]);
        assert!(resolve_sync_targets(&store, key(1), &data).is_empty());
    }

    #[test]
    fn prepared_speech_takes_project_from_owner_hint() {
        let data = reference();
        let mut speech = row(1, 20, "Speech", &[1]);
        assert_eq!(assign_next_project(&mut speech, &data), Some(ProjectId::new(502)));
        assert_eq!(speech.project_id, Some(ProjectId::new(502)));

        let mut no_hint = row(2, 20, "Speech", &[2]);
        assert_eq!(assign_next_project(&mut no_hint, &data), None);
        assert_eq!(no_hint.project_id, None);

        let mut not_speech = row(3, 10, "", &[1]);
        assert_eq!(assign_next_project(&mut not_speech, &data), None);
    }
}
