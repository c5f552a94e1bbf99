//! Product edit form: the draft being created or edited and its commit path.
//!
//! The form only ever holds one draft. Field edits are stored verbatim; prices
//! stay text until [`EditForm::commit`] coerces them into wire numbers, so a
//! half-typed value such as `"12."` or `""` never fails an edit.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde_json::{Number, Value};
use shared::{
    domain::{format_price, Product, ProductId},
    protocol::ProductPayload,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ConsoleError, FormError, MutationKind},
    gateway::CatalogGateway,
};

pub const MAX_IMAGE_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Edit => "Edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub id: Option<ProductId>,
    pub title: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    pub content: String,
    pub origin_price: String,
    pub price: String,
    pub is_enabled: bool,
    pub image_url: String,
    pub images_url: Vec<String>,
    pub extra: BTreeMap<String, Value>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            category: String::new(),
            unit: String::new(),
            description: String::new(),
            content: String::new(),
            origin_price: String::new(),
            price: String::new(),
            is_enabled: false,
            image_url: String::new(),
            images_url: vec![String::new()],
            extra: BTreeMap::new(),
        }
    }
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            category: product.category.clone(),
            unit: product.unit.clone(),
            description: product.description.clone(),
            content: product.content.clone(),
            origin_price: format_price(product.origin_price),
            price: format_price(product.price),
            is_enabled: product.is_enabled,
            image_url: product.image_url.clone(),
            images_url: seed_images(product),
            extra: product.extra.clone(),
        }
    }

    /// Wire body for create/update with prices and the enabled flag coerced.
    pub fn to_payload(&self) -> ProductPayload {
        ProductPayload {
            id: self.id.clone(),
            title: self.title.clone(),
            category: self.category.clone(),
            unit: self.unit.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            origin_price: coerce_price(&self.origin_price),
            price: coerce_price(&self.price),
            is_enabled: u8::from(self.is_enabled),
            image_url: self.image_url.clone(),
            images_url: self.images_url.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Image slots for an edit session: at least one, at most [`MAX_IMAGE_SLOTS`].
fn seed_images(product: &Product) -> Vec<String> {
    let mut images = match &product.images_url {
        Some(images) if !images.is_empty() => images.clone(),
        _ => return vec![String::new()],
    };
    if images.len() > MAX_IMAGE_SLOTS {
        warn!(
            "form: product {:?} has {} images, keeping the first {MAX_IMAGE_SLOTS}",
            product.id,
            images.len()
        );
        images.truncate(MAX_IMAGE_SLOTS);
    }
    images
}

/// Lenient price coercion: anything that is not a finite number becomes `0`.
pub fn coerce_price(raw: &str) -> Number {
    let value = raw.trim().parse::<f64>().unwrap_or(0.0);
    if !value.is_finite() {
        return Number::from(0);
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Number::from(value as i64);
    }
    Number::from_f64(value).unwrap_or_else(|| Number::from(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Title,
    Category,
    Unit,
    Description,
    Content,
    OriginPrice,
    Price,
    IsEnabled,
    ImageUrl,
}

impl ProductField {
    pub const ALL: [ProductField; 9] = [
        Self::Title,
        Self::Category,
        Self::Unit,
        Self::OriginPrice,
        Self::Price,
        Self::Description,
        Self::Content,
        Self::IsEnabled,
        Self::ImageUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::Unit => "unit",
            Self::Description => "description",
            Self::Content => "content",
            Self::OriginPrice => "origin_price",
            Self::Price => "price",
            Self::IsEnabled => "is_enabled",
            Self::ImageUrl => "imageUrl",
        }
    }

    pub fn is_checkbox(self) -> bool {
        self == Self::IsEnabled
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(name))
            .or(match name {
                "image_url" => Some(Self::ImageUrl),
                "originPrice" => Some(Self::OriginPrice),
                "isEnabled" | "enabled" => Some(Self::IsEnabled),
                _ => None,
            })
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Closed,
    Open { mode: FormMode, draft: ProductDraft },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    pub mode: FormMode,
    pub draft: ProductDraft,
}

impl FormSnapshot {
    pub fn can_add_image_slot(&self) -> bool {
        can_add_image_slot(&self.draft.images_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    pub mode: FormMode,
}

#[derive(Debug)]
pub struct EditForm {
    state: FormState,
}

impl Default for EditForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EditForm {
    pub fn new() -> Self {
        Self {
            state: FormState::Closed,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open { .. })
    }

    pub fn mode(&self) -> Option<FormMode> {
        match &self.state {
            FormState::Open { mode, .. } => Some(*mode),
            FormState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&ProductDraft> {
        match &self.state {
            FormState::Open { draft, .. } => Some(draft),
            FormState::Closed => None,
        }
    }

    pub fn snapshot(&self) -> Option<FormSnapshot> {
        match &self.state {
            FormState::Open { mode, draft } => Some(FormSnapshot {
                mode: *mode,
                draft: draft.clone(),
            }),
            FormState::Closed => None,
        }
    }

    pub fn open_create(&mut self) {
        debug!("form: open mode=create");
        self.state = FormState::Open {
            mode: FormMode::Create,
            draft: ProductDraft::default(),
        };
    }

    pub fn open_edit(&mut self, product: &Product) {
        debug!("form: open mode=edit id={:?}", product.id);
        self.state = FormState::Open {
            mode: FormMode::Edit,
            draft: ProductDraft::from_product(product),
        };
    }

    /// Dismissal is an explicit event; the draft does not outlive it.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!("form: closed, draft discarded");
        }
        self.state = FormState::Closed;
    }

    pub fn edit_field(&mut self, field: ProductField, value: FieldValue) -> Result<(), FormError> {
        let draft = self.draft_mut()?;
        match (field, value) {
            (ProductField::IsEnabled, FieldValue::Checked(checked)) => draft.is_enabled = checked,
            (ProductField::IsEnabled, FieldValue::Text(_)) => {
                return Err(FormError::FieldKindMismatch {
                    field: field.as_str(),
                    expected: "checkbox",
                })
            }
            (_, FieldValue::Checked(_)) => {
                return Err(FormError::FieldKindMismatch {
                    field: field.as_str(),
                    expected: "text",
                })
            }
            (ProductField::Title, FieldValue::Text(v)) => draft.title = v,
            (ProductField::Category, FieldValue::Text(v)) => draft.category = v,
            (ProductField::Unit, FieldValue::Text(v)) => draft.unit = v,
            (ProductField::Description, FieldValue::Text(v)) => draft.description = v,
            (ProductField::Content, FieldValue::Text(v)) => draft.content = v,
            (ProductField::OriginPrice, FieldValue::Text(v)) => draft.origin_price = v,
            (ProductField::Price, FieldValue::Text(v)) => draft.price = v,
            (ProductField::ImageUrl, FieldValue::Text(v)) => draft.image_url = v,
        }
        Ok(())
    }

    pub fn edit_image_at(&mut self, index: usize, value: impl Into<String>) -> Result<(), FormError> {
        let images = &mut self.draft_mut()?.images_url;
        let len = images.len();
        let slot = images
            .get_mut(index)
            .ok_or(FormError::ImageIndexOutOfRange { index, len })?;
        *slot = value.into();
        Ok(())
    }

    pub fn can_add_image_slot(&self) -> bool {
        self.draft()
            .is_some_and(|draft| can_add_image_slot(&draft.images_url))
    }

    /// Appends a blank slot when the gate allows it. Returns whether a slot
    /// was added.
    pub fn add_image_slot(&mut self) -> Result<bool, FormError> {
        let images = &mut self.draft_mut()?.images_url;
        if !can_add_image_slot(images) {
            return Ok(false);
        }
        images.push(String::new());
        Ok(true)
    }

    pub fn can_remove_image_at(&self, index: usize) -> bool {
        self.draft()
            .and_then(|draft| draft.images_url.get(index))
            .is_some_and(|image| !image.is_empty())
    }

    /// Removes one slot and returns its value. The list may end up empty.
    pub fn remove_image_at(&mut self, index: usize) -> Result<String, FormError> {
        let images = &mut self.draft_mut()?.images_url;
        if index >= images.len() {
            return Err(FormError::ImageIndexOutOfRange {
                index,
                len: images.len(),
            });
        }
        Ok(images.remove(index))
    }

    /// Sends the draft as a create or update. The form closes only on success;
    /// on failure the draft is left exactly as it was.
    pub async fn commit(
        &mut self,
        gateway: &dyn CatalogGateway,
    ) -> Result<CommitOutcome, ConsoleError> {
        let (mode, draft) = match &self.state {
            FormState::Open { mode, draft } => (*mode, draft),
            FormState::Closed => return Err(FormError::NotOpen.into()),
        };

        match mode {
            FormMode::Create => gateway
                .create(draft)
                .await
                .map_err(|err| ConsoleError::mutation(MutationKind::Create, err))?,
            FormMode::Edit => {
                let id = draft.id.as_ref().ok_or(FormError::MissingProductId)?;
                gateway
                    .update(id, draft)
                    .await
                    .map_err(|err| ConsoleError::mutation(MutationKind::Update, err))?
            }
        }

        info!("form: committed mode={}", mode.label());
        self.state = FormState::Closed;
        Ok(CommitOutcome { mode })
    }

    fn draft_mut(&mut self) -> Result<&mut ProductDraft, FormError> {
        match &mut self.state {
            FormState::Open { draft, .. } => Ok(draft),
            FormState::Closed => Err(FormError::NotOpen),
        }
    }
}

fn can_add_image_slot(images: &[String]) -> bool {
    images.len() < MAX_IMAGE_SLOTS && images.last().map_or(true, |last| !last.is_empty())
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
