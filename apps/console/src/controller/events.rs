//! Backend-to-prompt events and error modeling for the console controller.

use client_core::{ConsoleError, FormSnapshot, GatewayError};
use shared::{domain::Product, error::ErrorCode};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    LoggedIn,
    SessionRestored,
    LoginRequired,
    CatalogReplaced(Vec<Product>),
    FormUpdated(Option<FormSnapshot>),
    DeleteRequested(Product),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Usage,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Login,
    LoadCatalog,
    SaveProduct,
    DeleteProduct,
    Form,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
    detail: Option<String>,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            message: message.into(),
            detail: None,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Usage,
            context: UiErrorContext::Form,
            message: message.into(),
            detail: None,
        }
    }

    pub fn from_console_error(context: UiErrorContext, err: &ConsoleError) -> Self {
        let category = if err.requires_reauth() {
            UiErrorCategory::Auth
        } else {
            match err {
                ConsoleError::Form(_) => UiErrorCategory::Usage,
                ConsoleError::Auth(source)
                | ConsoleError::Fetch(source)
                | ConsoleError::Mutation { source, .. } => gateway_category(source),
                ConsoleError::Persistence(_) => UiErrorCategory::Unknown,
            }
        };

        Self {
            category,
            context,
            message: err.user_message().to_string(),
            detail: Some(err.to_string()),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

fn gateway_category(err: &GatewayError) -> UiErrorCategory {
    match err {
        GatewayError::Transport(_) => UiErrorCategory::Transport,
        GatewayError::Rejected(rejection) => match rejection.code {
            ErrorCode::Unauthorized | ErrorCode::Forbidden => UiErrorCategory::Auth,
            ErrorCode::Validation | ErrorCode::NotFound => UiErrorCategory::Validation,
            ErrorCode::RateLimited | ErrorCode::Internal => UiErrorCategory::Unknown,
        },
        GatewayError::Malformed(_) => UiErrorCategory::Unknown,
    }
}
