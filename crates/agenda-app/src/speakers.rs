// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{EVALUATION_TITLE, PREPARED_SPEECH_TITLE, ReferenceData, RowStore};

/// Names of everyone giving a speech that can be evaluated, in table order.
///
/// Reads the stored row records rather than any rendered control, so it gives
/// the same answer before, during and after edit mode.
pub fn compute_project_speakers(store: &RowStore, ctx: &ReferenceData) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut speakers = Vec::new();

    for row in store.iter().filter(|row| !row.is_section) {
        let type_title = row
            .type_id
            .and_then(|id| ctx.session_type(id))
            .map_or("", |kind| kind.title.as_str());
        if type_title == EVALUATION_TITLE {
            continue;
        }
        if type_title != PREPARED_SPEECH_TITLE && row.project_id.is_none() {
            continue;
        }
        let Some(name) = row.primary_owner().and_then(|id| ctx.contact_name(id)) else {
            continue;
        };
        if seen.insert(name.to_owned()) {
            speakers.push(name.to_owned());
        }
    }

    speakers
}

/// Options for an evaluation title select. The server's list is only used
/// while there are no rows to compute from.
pub fn speaker_options(
    store: &RowStore,
    ctx: &ReferenceData,
    server_speakers: &[String],
) -> Vec<String> {
    if store.is_empty() {
        return server_speakers
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
    }
    compute_project_speakers(store, ctx)
}
