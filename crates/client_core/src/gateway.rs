//! Request layer between the console and the remote catalog service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Product, ProductId, UserId},
    error::ServiceRejection,
    protocol::{
        DataEnvelope, ProductListResponse, ServiceMessage, SessionCheckResponse, SignInRequest,
        SignInResponse,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{config::GatewayConfig, error::GatewayError, form::ProductDraft};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInGrant {
    pub uid: Option<UserId>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// One round trip per call, no retries. Implementations attach the token
/// handed to [`CatalogGateway::authorize`] to every later request.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn authorize(&self, token: &str);
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInGrant, GatewayError>;
    async fn validate_session(&self) -> Result<bool, GatewayError>;
    async fn list(&self) -> Result<Vec<Product>, GatewayError>;
    async fn create(&self, draft: &ProductDraft) -> Result<(), GatewayError>;
    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), GatewayError>;
    async fn delete(&self, id: &ProductId) -> Result<(), GatewayError>;
}

pub struct HttpCatalogGateway {
    http: Client,
    config: GatewayConfig,
    token: RwLock<Option<String>>,
}

impl HttpCatalogGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self.with_token(request).await.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServiceMessage>(&body)
            .ok()
            .and_then(|msg| msg.message_text())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(ServiceRejection::new(status.as_u16(), message).into())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| GatewayError::Malformed(err.to_string()))
    }

    /// Some failures come back as HTTP 200 with `success: false`.
    async fn send_mutation(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        let body: ServiceMessage = self.send_json(request).await?;
        if body.success {
            return Ok(());
        }
        Err(ServiceRejection::new(
            422,
            body.message_text()
                .unwrap_or_else(|| "request was not accepted".to_string()),
        )
        .into())
    }
}

#[async_trait]
impl CatalogGateway for HttpCatalogGateway {
    async fn authorize(&self, token: &str) {
        *self.token.write().await = Some(token.to_string());
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInGrant, GatewayError> {
        let body: SignInResponse = self
            .send_json(self.http.post(self.config.signin_url()).json(&SignInRequest {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            }))
            .await?;

        if !body.success || body.token.is_empty() {
            return Err(ServiceRejection::new(401, "sign-in was not accepted").into());
        }
        let expires_at = DateTime::<Utc>::from_timestamp_millis(body.expired).ok_or_else(|| {
            GatewayError::Malformed(format!("invalid token expiry: {}", body.expired))
        })?;

        info!("gateway: signed in uid={:?}", body.uid);
        Ok(SignInGrant {
            uid: body.uid,
            token: body.token,
            expires_at,
        })
    }

    async fn validate_session(&self) -> Result<bool, GatewayError> {
        let body: SessionCheckResponse = self
            .send_json(self.http.post(self.config.user_check_url()))
            .await?;
        debug!("gateway: session check success={}", body.success);
        Ok(body.success)
    }

    async fn list(&self) -> Result<Vec<Product>, GatewayError> {
        let body: ProductListResponse = self
            .send_json(self.http.get(self.config.products_url()))
            .await?;
        if !body.success {
            let message = ServiceMessage {
                success: false,
                message: body.message,
            }
            .message_text()
            .unwrap_or_else(|| "listing was not accepted".to_string());
            warn!("gateway: product listing answered success=false: {message}");
            return Err(ServiceRejection::new(422, message).into());
        }
        debug!("gateway: listed products count={}", body.products.len());
        Ok(body.products)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<(), GatewayError> {
        let mut payload = draft.to_payload();
        payload.id = None;
        self.send_mutation(
            self.http
                .post(self.config.product_url(None))
                .json(&DataEnvelope { data: payload }),
        )
        .await?;
        info!("gateway: created product title={:?}", draft.title);
        Ok(())
    }

    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), GatewayError> {
        self.send_mutation(
            self.http
                .put(self.config.product_url(Some(&id.0)))
                .json(&DataEnvelope {
                    data: draft.to_payload(),
                }),
        )
        .await?;
        info!("gateway: updated product id={id}");
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), GatewayError> {
        self.send_mutation(self.http.delete(self.config.product_url(Some(&id.0))))
            .await?;
        info!("gateway: deleted product id={id}");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
