// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    EVALUATION_TITLE, PATHWAY_SPEECH_TITLE, PRESENTATION_DURATION, PRESENTATION_TITLE,
    ReferenceData, Row, SessionType, SessionTypeId, TOPICS_SPEAKER_TYPE_ID,
};

/// Which control edits a row's title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleControl {
    SpeakerSelect,
    Label,
    Input,
}

pub fn title_control(kind: Option<&SessionType>) -> TitleControl {
    match kind.map(|kind| kind.title.as_str()) {
        Some(EVALUATION_TITLE) => TitleControl::SpeakerSelect,
        Some(PATHWAY_SPEECH_TITLE) => TitleControl::Label,
        _ => TitleControl::Input,
    }
}

pub fn default_durations(kind: &SessionType) -> (Option<u32>, Option<u32>) {
    if kind.title == PRESENTATION_TITLE {
        let (min, max) = PRESENTATION_DURATION;
        return (Some(min), Some(max));
    }
    (kind.duration_min, kind.duration_max)
}

pub fn max_duration_locked(type_id: Option<SessionTypeId>) -> bool {
    type_id == Some(TOPICS_SPEAKER_TYPE_ID)
}

/// Clears the upper bound for the topics-speaker slot.
pub fn apply_topics_lockout(row: &mut Row) {
    if max_duration_locked(row.type_id) {
        row.duration_max = None;
    }
}

/// Applies a session-type selection to a row. Unknown ids keep the row's
/// current title and durations.
pub fn apply_session_type_change(
    row: &mut Row,
    type_id: Option<SessionTypeId>,
    ctx: &ReferenceData,
) {
    row.type_id = type_id;
    let kind = type_id.and_then(|id| ctx.session_type(id));

    if let Some(kind) = kind {
        if kind.predefined && kind.title != EVALUATION_TITLE {
            row.title = kind.title.clone();
        }
        let (min, max) = default_durations(kind);
        row.duration_min = min;
        row.duration_max = max;
        row.role = kind.role.clone();
        if !kind.valid_for_project {
            row.project_id = None;
        }
    } else {
        log::debug!("session type {type_id:?} not in reference data; keeping row defaults");
    }

    apply_topics_lockout(row);
}

#[cfg(test)]
mod tests {
    use super::{TitleControl, apply_session_type_change, title_control};
    use crate::test_support::{reference, row};
    use crate::{ProjectId, SessionTypeId, TOPICS_SPEAKER_TYPE_ID};

    #[test]
    fn title_control_depends_on_type_title() {
        let data = reference();
        assert_eq!(
            title_control(data.session_type(SessionTypeId::new(21))),
            TitleControl::SpeakerSelect
        );
        assert_eq!(
            title_control(data.session_type(SessionTypeId::new(22))),
            TitleControl::Label
        );
        assert_eq!(
            title_control(data.session_type(SessionTypeId::new(20))),
            TitleControl::Input
        );
        assert_eq!(title_control(None), TitleControl::Input);
    }

    #[test]
    fn topics_speaker_always_loses_max_duration() {
        let data = reference();
        for start in [10, 20, 23, 36] {
            let mut target = row(1, start, "Anything", &[1]);
            target.duration_max = Some(9);
            apply_session_type_change(&mut target, Some(TOPICS_SPEAKER_TYPE_ID), &data);
            assert_eq!(target.duration_max, None);
            assert_eq!(target.duration_min, Some(1));
        }
    }

    #[test]
    fn free_text_title_survives_unless_type_is_predefined() {
        let data = reference();
        let mut target = row(1, 20, "My Journey", &[1]);

        apply_session_type_change(&mut target, Some(SessionTypeId::new(23)), &data);
        assert_eq!(target.title, "My Journey");

        apply_session_type_change(&mut target, Some(SessionTypeId::new(24)), &data);
        assert_eq!(target.title, "Word of the Day");
    }

    #[test]
    fn evaluation_keeps_speaker_name_title() {
        let data = reference();
        let mut target = row(1, 20, "Jordan Hill", &[1]);
        apply_session_type_change(&mut target, Some(SessionTypeId::new(21)), &data);
        assert_eq!(target.title, "Jordan Hill");
        assert_eq!((target.duration_min, target.duration_max), (Some(2), Some(3)));
        assert_eq!(target.role, "Evaluator");
    }

    #[test]
    fn presentation_forces_fixed_bounds() {
        let data = reference();
        let mut target = row(1, 20, "Club Officers", &[1]);
        apply_session_type_change(&mut target, Some(SessionTypeId::new(23)), &data);
        assert_eq!((target.duration_min, target.duration_max), (Some(10), Some(15)));
    }

    #[test]
    fn unknown_type_degrades_without_touching_fields() {
        let data = reference();
        let mut target = row(1, 20, "Speech", &[1]);
        target.duration_min = Some(5);
        target.project_id = Some(ProjectId::new(501));
        apply_session_type_change(&mut target, Some(SessionTypeId::new(999)), &data);
        assert_eq!(target.type_id, Some(SessionTypeId::new(999)));
        assert_eq!(target.title, "Speech");
        assert_eq!(target.duration_min, Some(5));
        assert_eq!(target.project_id, Some(ProjectId::new(501)));
    }

    #[test]
    fn leaving_project_type_drops_project() {
        let data = reference();
        let mut target = row(1, 20, "Speech", &[1]);
        target.project_id = Some(ProjectId::new(501));
        apply_session_type_change(&mut target, Some(SessionTypeId::new(10)), &data);
        assert_eq!(target.project_id, None);
    }
}
