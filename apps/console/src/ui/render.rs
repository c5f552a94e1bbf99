//! Plain-text rendering of the catalog, the edit form and backend events.

use std::fmt::Write as _;

use client_core::{FormSnapshot, ProductField, MAX_IMAGE_SLOTS};
use shared::domain::{format_price, Product};

use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};

pub fn render_event(event: &UiEvent) -> String {
    match event {
        UiEvent::Info(message) => message.clone(),
        UiEvent::LoggedIn => "Signed in".to_string(),
        UiEvent::SessionRestored => "Session restored".to_string(),
        UiEvent::LoginRequired => "Sign in with 'login <username> <password>'".to_string(),
        UiEvent::CatalogReplaced(products) => render_catalog(products),
        UiEvent::FormUpdated(Some(snapshot)) => render_form(snapshot),
        UiEvent::FormUpdated(None) => "Form closed".to_string(),
        UiEvent::DeleteRequested(product) => render_delete_prompt(product),
        UiEvent::Error(err) => render_error(err),
    }
}

pub fn render_catalog(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products".to_string();
    }

    let title_width = products
        .iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("title".len());
    let mut out = format!(
        "{:>3}  {:<title_width$}  {:>12}  {:>12}  {}\n",
        "#", "title", "origin price", "price", "status"
    );
    for (row, product) in products.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<title_width$}  {:>12}  {:>12}  {}",
            row + 1,
            product.title,
            format_price(product.origin_price),
            format_price(product.price),
            product.enabled_label()
        );
    }
    out.pop();
    out
}

pub fn render_form(snapshot: &FormSnapshot) -> String {
    let draft = &snapshot.draft;
    let mut out = format!("{} product\n", snapshot.mode.label());
    for field in ProductField::ALL {
        let value = match field {
            ProductField::Title => draft.title.as_str(),
            ProductField::Category => draft.category.as_str(),
            ProductField::Unit => draft.unit.as_str(),
            ProductField::Description => draft.description.as_str(),
            ProductField::Content => draft.content.as_str(),
            ProductField::OriginPrice => draft.origin_price.as_str(),
            ProductField::Price => draft.price.as_str(),
            ProductField::IsEnabled => {
                if draft.is_enabled {
                    "[x]"
                } else {
                    "[ ]"
                }
            }
            ProductField::ImageUrl => draft.image_url.as_str(),
        };
        let _ = writeln!(out, "  {:<13} {value}", field.as_str());
    }

    out.push_str("  images\n");
    if draft.images_url.is_empty() {
        out.push_str("    (none)\n");
    }
    for (slot, url) in draft.images_url.iter().enumerate() {
        let marker = if url.is_empty() { " " } else { "x" };
        let _ = writeln!(out, "    {}. [{marker}] {url}", slot + 1);
    }
    if snapshot.can_add_image_slot() {
        out.push_str("  'image add' appends a slot");
    } else if draft.images_url.len() >= MAX_IMAGE_SLOTS {
        out.push_str("  image slots full");
    } else {
        out.push_str("  fill the last image slot to add another");
    }
    out
}

pub fn render_delete_prompt(product: &Product) -> String {
    format!("Delete '{}'? (yes/no)", product.title)
}

pub fn render_error(err: &UiError) -> String {
    let area = match err.context() {
        UiErrorContext::BackendStartup => "startup",
        UiErrorContext::Login => "login",
        UiErrorContext::LoadCatalog => "catalog",
        UiErrorContext::SaveProduct => "save",
        UiErrorContext::DeleteProduct => "delete",
        UiErrorContext::Form => "form",
    };
    let mut out = format!("{area} error: {}", err.message());
    if let Some(detail) = err.detail() {
        let _ = write!(out, " ({detail})");
    }
    if err.requires_reauth() {
        out.push_str("\nSign in again with 'login <username> <password>'");
    } else if err.category() == UiErrorCategory::Transport {
        out.push_str("\nService unreachable; check the base URL and network");
    }
    out
}
