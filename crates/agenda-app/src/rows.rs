// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::fields::{Field, FieldControl, display_field, render_field};
use crate::{ReferenceData, Row, RowEditor, RowKey, TableMode};

pub const VIEW_HEADER: [&str; 7] = ["#", "Start", "Type", "Title", "Owner", "Min", "Max"];
pub const EDIT_HEADER: [&str; 8] = [
    "≡",
    "Start",
    "Session Type",
    "Title",
    "Owner(s)",
    "Min",
    "Max",
    "Actions",
];

pub fn header(mode: TableMode) -> &'static [&'static str] {
    match mode {
        TableMode::View => &VIEW_HEADER,
        TableMode::Edit => &EDIT_HEADER,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowActions {
    pub can_delete: bool,
    pub can_move: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub field: Field,
    pub control: FieldControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub key: RowKey,
    pub ordinal: usize,
    pub is_section: bool,
    pub is_hidden: bool,
    pub invalid: bool,
    pub cells: Vec<CellView>,
    pub actions: Option<RowActions>,
}

impl RowView {
    pub fn cell(&self, field: Field) -> Option<&CellView> {
        self.cells.iter().find(|cell| cell.field == field)
    }
}

/// Projects one row record into its rendered cells for the given mode.
pub fn build_row(
    row: &Row,
    ordinal: usize,
    mode: TableMode,
    editor: Option<&RowEditor>,
    ctx: &ReferenceData,
    speakers: &[String],
) -> RowView {
    let editing = mode == TableMode::Edit && !row.is_readonly;
    let cells = if row.is_section {
        section_cells(row, ordinal, editing, editor)
    } else if editing {
        let fallback;
        let editor = match editor {
            Some(editor) => editor,
            None => {
                fallback = RowEditor::from_row(row);
                &fallback
            }
        };
        Field::ALL
            .iter()
            .map(|field| CellView {
                field: *field,
                control: render_field(*field, row, ordinal, editor, ctx, speakers),
            })
            .collect()
    } else {
        Field::ALL
            .iter()
            .map(|field| CellView {
                field: *field,
                control: FieldControl::Text(display_field(*field, row, ordinal, ctx)),
            })
            .collect()
    };

    RowView {
        key: row.key,
        ordinal,
        is_section: row.is_section,
        is_hidden: row.is_hidden,
        invalid: false,
        cells,
        actions: (mode == TableMode::Edit).then_some(RowActions {
            can_delete: !row.is_readonly,
            can_move: true,
        }),
    }
}

fn section_cells(
    row: &Row,
    ordinal: usize,
    editing: bool,
    editor: Option<&RowEditor>,
) -> Vec<CellView> {
    let title = match editor {
        Some(editor) if editing => editor.title.clone(),
        _ => row.title.clone(),
    };
    vec![
        CellView {
            field: Field::Sequence,
            control: FieldControl::Text(ordinal.to_string()),
        },
        CellView {
            field: Field::Title,
            control: FieldControl::Wide {
                value: title,
                span: Field::ALL.len() - 1,
                editable: editing,
            },
        },
    ]
}
