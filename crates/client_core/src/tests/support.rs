use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use shared::{
    domain::{Product, ProductId},
    error::ServiceRejection,
    protocol::ProductPayload,
};
use tokio::sync::Mutex;

use crate::{
    error::GatewayError,
    form::ProductDraft,
    gateway::{CatalogGateway, Credentials, SignInGrant},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GatewayCall {
    Authorize(String),
    SignIn(String),
    ValidateSession,
    List,
    Create(ProductPayload),
    Update(ProductId, ProductPayload),
    Delete(ProductId),
}

pub(crate) struct FakeGateway {
    listing: Mutex<Vec<Product>>,
    calls: Mutex<Vec<GatewayCall>>,
    failing: Mutex<HashSet<&'static str>>,
    session_valid: bool,
}

impl FakeGateway {
    pub(crate) fn with_listing(listing: Vec<Product>) -> Self {
        Self {
            listing: Mutex::new(listing),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            session_valid: true,
        }
    }

    pub(crate) fn rejecting_sessions(mut self) -> Self {
        self.session_valid = false;
        self
    }

    pub(crate) async fn fail(&self, operation: &'static str) {
        self.failing.lock().await.insert(operation);
    }

    pub(crate) async fn recover(&self, operation: &'static str) {
        self.failing.lock().await.remove(operation);
    }

    pub(crate) async fn set_listing(&self, listing: Vec<Product>) {
        *self.listing.lock().await = listing;
    }

    pub(crate) async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn list_calls(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, GatewayCall::List))
            .count()
    }

    async fn record(&self, operation: &'static str, call: GatewayCall) -> Result<(), GatewayError> {
        self.calls.lock().await.push(call);
        if self.failing.lock().await.contains(operation) {
            return Err(ServiceRejection::new(500, format!("{operation} rejected")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for FakeGateway {
    async fn authorize(&self, token: &str) {
        self.calls
            .lock()
            .await
            .push(GatewayCall::Authorize(token.to_string()));
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInGrant, GatewayError> {
        self.record("sign_in", GatewayCall::SignIn(credentials.username.clone()))
            .await?;
        Ok(SignInGrant {
            uid: None,
            token: format!("token-for-{}", credentials.username),
            expires_at: Utc::now() + Duration::days(10),
        })
    }

    async fn validate_session(&self) -> Result<bool, GatewayError> {
        self.record("validate_session", GatewayCall::ValidateSession)
            .await?;
        Ok(self.session_valid)
    }

    async fn list(&self) -> Result<Vec<Product>, GatewayError> {
        self.record("list", GatewayCall::List).await?;
        Ok(self.listing.lock().await.clone())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<(), GatewayError> {
        let mut payload = draft.to_payload();
        payload.id = None;
        self.record("create", GatewayCall::Create(payload)).await
    }

    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), GatewayError> {
        self.record(
            "update",
            GatewayCall::Update(id.clone(), draft.to_payload()),
        )
        .await
    }

    async fn delete(&self, id: &ProductId) -> Result<(), GatewayError> {
        self.record("delete", GatewayCall::Delete(id.clone())).await
    }
}

pub(crate) fn product(id: &str, title: &str) -> Product {
    Product {
        id: Some(ProductId::from(id)),
        title: title.to_string(),
        origin_price: 100.0,
        price: 80.0,
        is_enabled: true,
        ..Product::default()
    }
}
