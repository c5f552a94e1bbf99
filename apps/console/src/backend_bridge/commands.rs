//! Backend commands queued from the prompt to the backend worker.

use client_core::{FieldValue, ProductField};

/// Rows and image slots are zero-based here; the prompt converts from the
/// one-based numbers it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Login {
        username: String,
        password: String,
    },
    Refresh,
    OpenCreate,
    OpenEdit {
        row: usize,
    },
    EditField {
        field: ProductField,
        value: FieldValue,
    },
    EditImage {
        slot: usize,
        url: String,
    },
    AddImageSlot,
    RemoveImage {
        slot: usize,
    },
    ShowForm,
    Commit,
    CloseForm,
    RequestDelete {
        row: usize,
    },
    ConfirmDelete,
    CancelDelete,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Refresh => "refresh",
            Self::OpenCreate => "open_create",
            Self::OpenEdit { .. } => "open_edit",
            Self::EditField { .. } => "edit_field",
            Self::EditImage { .. } => "edit_image",
            Self::AddImageSlot => "add_image_slot",
            Self::RemoveImage { .. } => "remove_image",
            Self::ShowForm => "show_form",
            Self::Commit => "commit",
            Self::CloseForm => "close_form",
            Self::RequestDelete { .. } => "request_delete",
            Self::ConfirmDelete => "confirm_delete",
            Self::CancelDelete => "cancel_delete",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Login { .. })
    }
}
