//! Core of the catalog admin console: session handling, the catalog gateway,
//! the product edit form and the coordinator that owns them.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod form;
pub mod gateway;
pub mod session;

pub use config::GatewayConfig;
pub use coordinator::CatalogConsole;
pub use error::{ConsoleError, FormError, GatewayError, MutationKind};
pub use form::{
    CommitOutcome, EditForm, FieldValue, FormMode, FormSnapshot, FormState, ProductDraft,
    ProductField, MAX_IMAGE_SLOTS,
};
pub use gateway::{CatalogGateway, Credentials, HttpCatalogGateway, SignInGrant};
pub use session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionStore, StoredCredential,
};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
