// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod editor;
pub mod fields;
pub mod forms;
pub mod ids;
pub mod model;
pub mod owners;
pub mod payload;
pub mod reference;
pub mod rows;
pub mod session_type;
pub mod speakers;
pub mod state;
pub mod store;
pub mod sync;
pub mod table;

#[cfg(test)]
mod test_support;

pub use editor::RowEditor;
pub use fields::{Field, FieldControl};
pub use forms::{ContactForm, NewMeeting};
pub use ids::*;
pub use model::*;
pub use owners::{OwnerAction, OwnerChange, OwnerPicker, OwnerTag};
pub use payload::{RowPayload, SAVE_BLOCKED_MESSAGE, SaveBlocked, SavePayload};
pub use reference::{ReferenceData, SessionTypeGroup};
pub use rows::{CellView, RowActions, RowView};
pub use state::*;
pub use store::RowStore;
pub use table::{AgendaTable, OwnerEditOutcome, TableChrome};
