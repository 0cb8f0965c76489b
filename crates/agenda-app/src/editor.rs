// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{OwnerPicker, Row};

/// Edit-mode control state for one row: the text buffers as typed and the
/// owner tag widget. Exists only while the table is in edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEditor {
    pub title: String,
    pub duration_min: String,
    pub duration_max: String,
    pub owners: OwnerPicker,
}

impl RowEditor {
    pub fn from_row(row: &Row) -> Self {
        Self {
            title: row.title.clone(),
            duration_min: format_duration(row.duration_min),
            duration_max: format_duration(row.duration_max),
            owners: OwnerPicker::new(&row.owner_ids),
        }
    }

    /// Re-reads the text buffers after the row changed underneath them.
    pub fn refresh_text(&mut self, row: &Row) {
        self.title = row.title.clone();
        self.duration_min = format_duration(row.duration_min);
        self.duration_max = format_duration(row.duration_max);
    }
}

pub fn format_duration(minutes: Option<u32>) -> String {
    minutes.map(|value| value.to_string()).unwrap_or_default()
}

/// Blank or non-numeric input means "no bound".
pub fn parse_duration_input(input: &str) -> Option<u32> {
    input.trim().parse().ok()
}
