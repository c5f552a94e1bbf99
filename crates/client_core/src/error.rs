//! Error taxonomy for the console core.

use shared::error::ServiceRejection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("catalog service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog service rejected the request: {0}")]
    Rejected(#[from] ServiceRejection),
    #[error("malformed catalog service response: {0}")]
    Malformed(String),
}

impl GatewayError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Rejected(rejection) if rejection.code.is_auth())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no product form is open")]
    NotOpen,
    #[error("field {field} expects a {expected} value")]
    FieldKindMismatch {
        field: &'static str,
        expected: &'static str,
    },
    #[error("unknown product field: {0}")]
    UnknownField(String),
    #[error("image slot {index} out of range (len {len})")]
    ImageIndexOutOfRange { index: usize, len: usize },
    #[error("product has no id")]
    MissingProductId,
    #[error("no delete is awaiting confirmation")]
    NoPendingDelete,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("authentication failed: {0}")]
    Auth(#[source] GatewayError),
    #[error("failed to fetch products: {0}")]
    Fetch(#[source] GatewayError),
    #[error("failed to {} product: {source}", .kind.as_str())]
    Mutation {
        kind: MutationKind,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("session persistence failed: {0}")]
    Persistence(String),
}

impl ConsoleError {
    pub fn mutation(kind: MutationKind, source: GatewayError) -> Self {
        Self::Mutation { kind, source }
    }

    /// Fixed notification shown to the operator for each failure class.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(_) => "Login failed",
            Self::Fetch(_) => "Failed to load products",
            Self::Mutation {
                kind: MutationKind::Create,
                ..
            } => "Failed to create product",
            Self::Mutation {
                kind: MutationKind::Update,
                ..
            } => "Failed to update product",
            Self::Mutation {
                kind: MutationKind::Delete,
                ..
            } => "Failed to delete product",
            Self::Form(_) => "Invalid form operation",
            Self::Persistence(_) => "Failed to save login session",
        }
    }

    pub fn requires_reauth(&self) -> bool {
        match self {
            Self::Auth(_) => true,
            Self::Fetch(source) | Self::Mutation { source, .. } => source.is_auth(),
            Self::Form(_) | Self::Persistence(_) => false,
        }
    }
}
