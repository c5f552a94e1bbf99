//! Owner of the application state: session, catalog, edit form and the
//! pending delete confirmation.

use std::sync::Arc;

use shared::domain::Product;
use tracing::{info, warn};

use crate::{
    error::{ConsoleError, FormError, MutationKind},
    form::{CommitOutcome, EditForm},
    gateway::{CatalogGateway, Credentials},
    session::SessionStore,
};

pub struct CatalogConsole {
    gateway: Arc<dyn CatalogGateway>,
    session: SessionStore,
    catalog: Vec<Product>,
    form: EditForm,
    pending_delete: Option<Product>,
    authenticated: bool,
}

impl CatalogConsole {
    pub fn new(gateway: Arc<dyn CatalogGateway>, session: SessionStore) -> Self {
        Self {
            gateway,
            session,
            catalog: Vec::new(),
            form: EditForm::new(),
            pending_delete: None,
            authenticated: false,
        }
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditForm {
        &mut self.form
    }

    pub fn pending_delete(&self) -> Option<&Product> {
        self.pending_delete.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Startup gate: the catalog is loaded only behind a session the service
    /// still accepts. Returns whether the console ended up authenticated.
    pub async fn restore_session(&mut self) -> Result<bool, ConsoleError> {
        if self.session.get().is_none() {
            info!("console: no stored session");
            return Ok(false);
        }
        if !self.session.validate(self.gateway.as_ref()).await {
            info!("console: stored session rejected");
            return Ok(false);
        }

        self.refresh().await?;
        self.authenticated = true;
        info!("console: session restored");
        Ok(true)
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), ConsoleError> {
        let grant = self
            .gateway
            .sign_in(credentials)
            .await
            .map_err(ConsoleError::Auth)?;
        self.session
            .set(grant.token.clone(), grant.expires_at)
            .map_err(|err| ConsoleError::Persistence(format!("{err:#}")))?;
        self.gateway.authorize(&grant.token).await;

        self.refresh().await?;
        self.authenticated = true;
        info!("console: logged in as {}", credentials.username);
        Ok(())
    }

    /// Replaces the catalog with the service's listing. On failure the
    /// previous catalog is kept as is.
    pub async fn refresh(&mut self) -> Result<(), ConsoleError> {
        let products = self.gateway.list().await.map_err(ConsoleError::Fetch)?;
        info!("console: catalog refreshed count={}", products.len());
        self.catalog = products;
        Ok(())
    }

    /// Opening a form abandons any delete awaiting confirmation.
    pub fn request_create(&mut self) {
        self.pending_delete = None;
        self.form.open_create();
    }

    pub fn request_edit(&mut self, product: &Product) {
        self.pending_delete = None;
        self.form.open_edit(product);
    }

    pub fn close_form(&mut self) {
        self.form.close();
    }

    /// Commits the open draft and, once the service accepted it, reloads the
    /// catalog exactly once.
    pub async fn commit(&mut self) -> Result<CommitOutcome, ConsoleError> {
        let outcome = self.form.commit(self.gateway.as_ref()).await?;
        self.refresh().await?;
        Ok(outcome)
    }

    pub fn request_delete(&mut self, product: Product) {
        self.pending_delete = Some(product);
    }

    pub fn cancel_delete(&mut self) -> Option<Product> {
        self.pending_delete.take()
    }

    /// Deletes the pending target and reloads the catalog. The target is
    /// cleared whether or not the service accepted the delete.
    pub async fn confirm_delete(&mut self) -> Result<Product, ConsoleError> {
        let target = self.pending_delete.take().ok_or(FormError::NoPendingDelete)?;
        let id = target.id.as_ref().ok_or(FormError::MissingProductId)?;
        if let Err(err) = self.gateway.delete(id).await {
            warn!("console: delete failed id={id}: {err}");
            return Err(ConsoleError::mutation(MutationKind::Delete, err));
        }

        self.refresh().await?;
        Ok(target)
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
