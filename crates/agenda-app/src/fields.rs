// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::owners::OwnerTag;
use crate::reference::SessionTypeGroup;
use crate::session_type::{TitleControl, max_duration_locked, title_control};
use crate::{ReferenceData, Row, RowEditor, SessionTypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Sequence,
    StartTime,
    SessionType,
    Title,
    Owners,
    DurationMin,
    DurationMax,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Sequence,
        Self::StartTime,
        Self::SessionType,
        Self::Title,
        Self::Owners,
        Self::DurationMin,
        Self::DurationMax,
    ];

    pub const fn is_text_input(self) -> bool {
        matches!(self, Self::Title | Self::DurationMin | Self::DurationMax)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldControl {
    Text(String),
    Select {
        groups: Vec<SessionTypeGroup>,
        selected: Option<SessionTypeId>,
    },
    SpeakerSelect {
        options: Vec<String>,
        selected: String,
    },
    Label(String),
    Input {
        value: String,
        disabled: bool,
    },
    Owners {
        tags: Vec<OwnerTag>,
        query: String,
        suggestions: Vec<OwnerTag>,
    },
    /// Section title spanning the remaining columns.
    Wide {
        value: String,
        span: usize,
        editable: bool,
    },
}

impl FieldControl {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) | Self::Label(value) => value.clone(),
            Self::Select { groups, selected } => selected
                .and_then(|id| {
                    groups
                        .iter()
                        .flat_map(|group| group.options.iter())
                        .find(|(option, _)| *option == id)
                        .map(|(_, title)| title.clone())
                })
                .unwrap_or_default(),
            Self::SpeakerSelect { selected, .. } => selected.clone(),
            Self::Input { value, .. } => value.clone(),
            Self::Owners { tags, .. } => tags
                .iter()
                .map(|tag| format!("[{}]", tag.name))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Wide { value, .. } => value.clone(),
        }
    }

    pub fn is_editable(&self) -> bool {
        match self {
            Self::Text(_) | Self::Label(_) => false,
            Self::Input { disabled, .. } => !disabled,
            Self::Wide { editable, .. } => *editable,
            Self::Select { .. } | Self::SpeakerSelect { .. } | Self::Owners { .. } => true,
        }
    }
}

/// Edit-mode control for one field of a normal row.
pub fn render_field(
    field: Field,
    row: &Row,
    ordinal: usize,
    editor: &RowEditor,
    ctx: &ReferenceData,
    speakers: &[String],
) -> FieldControl {
    let kind = row.type_id.and_then(|id| ctx.session_type(id));
    match field {
        Field::Sequence => FieldControl::Text(ordinal.to_string()),
        Field::StartTime => FieldControl::Text(row.start_time.clone()),
        Field::SessionType => FieldControl::Select {
            groups: ctx.session_type_groups(),
            selected: row.type_id,
        },
        Field::Title => match title_control(kind) {
            TitleControl::SpeakerSelect => FieldControl::SpeakerSelect {
                options: speakers.to_vec(),
                selected: editor.title.clone(),
            },
            TitleControl::Label => FieldControl::Label(editor.title.clone()),
            TitleControl::Input => FieldControl::Input {
                value: editor.title.clone(),
                disabled: false,
            },
        },
        Field::Owners => FieldControl::Owners {
            tags: editor.owners.tags(ctx),
            query: editor.owners.query().to_owned(),
            suggestions: editor
                .owners
                .suggestions()
                .iter()
                .filter_map(|id| {
                    ctx.contact(*id).map(|contact| OwnerTag {
                        id: contact.id,
                        name: contact.name.clone(),
                    })
                })
                .collect(),
        },
        Field::DurationMin => FieldControl::Input {
            value: editor.duration_min.clone(),
            disabled: false,
        },
        Field::DurationMax => {
            if max_duration_locked(row.type_id) {
                FieldControl::Input {
                    value: String::new(),
                    disabled: true,
                }
            } else {
                FieldControl::Input {
                    value: editor.duration_max.clone(),
                    disabled: false,
                }
            }
        }
    }
}

/// Static view-mode text for one field of a normal row.
pub fn display_field(field: Field, row: &Row, ordinal: usize, ctx: &ReferenceData) -> String {
    let kind = row.type_id.and_then(|id| ctx.session_type(id));
    match field {
        Field::Sequence => ordinal.to_string(),
        Field::StartTime => row.start_time.clone(),
        Field::SessionType => kind.map(|kind| kind.title.clone()).unwrap_or_default(),
        Field::Title => {
            let title = if row.title.is_empty() {
                kind.map(|kind| kind.title.clone()).unwrap_or_default()
            } else {
                row.title.clone()
            };
            match row.project_id.and_then(|id| ctx.project(id)) {
                Some(project) => format!("{title} ({})", project.title),
                None => title,
            }
        }
        Field::Owners => {
            let names = row
                .owner_ids
                .iter()
                .filter_map(|id| ctx.contact_name(*id))
                .collect::<Vec<_>>()
                .join(", ");
            if row.credentials.is_empty() || names.is_empty() {
                names
            } else {
                format!("{names}, {}", row.credentials)
            }
        }
        Field::DurationMin => crate::editor::format_duration(row.duration_min),
        Field::DurationMax => crate::editor::format_duration(row.duration_max),
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldControl, display_field, render_field};
    use crate::test_support::{reference, row};
    use crate::{ProjectId, RowEditor, SessionTypeId, TOPICS_SPEAKER_TYPE_ID};

    #[test]
    fn title_control_switches_by_session_type() {
        let data = reference();
        let speakers = vec!["Jordan Hill".to_owned()];

        let evaluation = row(1, 21, "Jordan Hill", &[1]);
        let control = render_field(
            Field::Title,
            &evaluation,
            1,
            &RowEditor::from_row(&evaluation),
            &data,
            &speakers,
        );
        assert_eq!(
            control,
            FieldControl::SpeakerSelect {
                options: speakers.clone(),
                selected: "Jordan Hill".to_owned(),
            }
        );

        let pathway = row(2, 22, "Ice Breaker", &[1]);
        let control = render_field(
            Field::Title,
            &pathway,
            2,
            &RowEditor::from_row(&pathway),
            &data,
            &speakers,
        );
        assert!(!control.is_editable());
        assert_eq!(control.display(), "Ice Breaker");

        let stale = row(3, 999, "Mystery", &[]);
        let control = render_field(
            Field::Title,
            &stale,
            3,
            &RowEditor::from_row(&stale),
            &data,
            &speakers,
        );
        assert!(matches!(control, FieldControl::Input { disabled: false, .. }));
    }

    #[test]
    fn max_duration_disabled_for_topics_speaker() {
        let data = reference();
        let mut topics = row(1, 36, "", &[]);
        topics.type_id = Some(TOPICS_SPEAKER_TYPE_ID);
        let mut editor = RowEditor::from_row(&topics);
        editor.duration_max = "4".to_owned();
        let control = render_field(Field::DurationMax, &topics, 1, &editor, &data, &[]);
        assert_eq!(
            control,
            FieldControl::Input {
                value: String::new(),
                disabled: true,
            }
        );
    }

    #[test]
    fn session_type_select_shows_selected_title() {
        let data = reference();
        let timer = row(1, 10, "", &[]);
        let control = render_field(
            Field::SessionType,
            &timer,
            1,
            &RowEditor::from_row(&timer),
            &data,
            &[],
        );
        assert_eq!(control.display(), "Timer Introduction");

        let mut stale = row(2, 10, "", &[]);
        stale.type_id = Some(SessionTypeId::new(999));
        let control = render_field(
            Field::SessionType,
            &stale,
            2,
            &RowEditor::from_row(&stale),
            &data,
            &[],
        );
        assert_eq!(control.display(), "");
    }

    #[test]
    fn view_cells_join_owners_and_project() {
        let data = reference();
        let mut speech = row(1, 20, "My Journey", &[1, 2]);
        speech.project_id = Some(ProjectId::new(501));
        assert_eq!(
            display_field(Field::Owners, &speech, 1, &data),
            "Avery Walker, Jordan Hill, DTM"
        );
        assert_eq!(
            display_field(Field::Title, &speech, 1, &data),
            "My Journey (Ice Breaker)"
        );

        let untitled = row(2, 10, "", &[]);
        assert_eq!(
            display_field(Field::Title, &untitled, 2, &data),
            "Timer Introduction"
        );
        assert_eq!(display_field(Field::Owners, &untitled, 2, &data), "");
    }
}
