//! Shopping cart state.
//!
//! The cart is owned by the session: the serialized line list lives under a
//! durable session key and is rewritten after every mutation, while the
//! selection set is session-scoped only. `CartStore` is a plain value type
//! with a narrow mutation API so route handlers hydrate it, mutate it, and
//! persist it back; all invariants are enforced inside the mutations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use booknest_core::{Price, ProductId};

/// One distinct product in the cart, keyed by product identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    /// Pre-sale price for strike-through display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_unit_price: Option<Price>,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Errors rejecting a malformed external product representation.
#[derive(Debug, thiserror::Error)]
pub enum ProductShapeError {
    /// Neither `id` nor `productId` was present.
    #[error("product has no identity field")]
    MissingIdentity,
}

/// External "product-like" input accepted by add-to-cart.
///
/// Remote catalog payloads are not uniform: the identity arrives as `id` or
/// `productId`, and the image under one of three field names. This struct is
/// the single normalization seam; everything past [`ProductInput::into_line`]
/// works with the canonical [`CartLine`] type only.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "productId")]
    pub product_id: Option<String>,
    pub title: String,
    pub price: i64,
    #[serde(default, rename = "oldPrice")]
    pub old_price: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

impl ProductInput {
    /// Resolve the product identity (`id` wins over `productId`).
    fn identity(&self) -> Option<ProductId> {
        self.id
            .as_deref()
            .or(self.product_id.as_deref())
            .map(ProductId::from)
    }

    /// Resolve the display image: `images[0]`, then `image`, then `img`,
    /// then the empty string.
    fn image_ref(&self) -> String {
        self.images
            .first()
            .cloned()
            .or_else(|| self.image.clone())
            .or_else(|| self.img.clone())
            .unwrap_or_default()
    }

    /// Convert into a canonical cart line with the given quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ProductShapeError::MissingIdentity`] when the payload
    /// carries no usable identity field.
    pub fn into_line(self, quantity: u32) -> Result<CartLine, ProductShapeError> {
        let product_id = self.identity().ok_or(ProductShapeError::MissingIdentity)?;
        let image = self.image_ref();
        Ok(CartLine {
            product_id,
            title: self.title,
            unit_price: Price::new(self.price),
            previous_unit_price: self.old_price.map(Price::new),
            image,
            quantity: quantity.max(1),
        })
    }
}

/// Durable wire format for the cart line list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedLines {
    lines: Vec<CartLine>,
}

/// The cart store: line items plus the checkout selection set.
///
/// Invariants held after every public mutation:
/// - at most one line per `product_id`
/// - every quantity is >= 1
/// - `selected` only contains ids of current lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    lines: Vec<CartLine>,
    selected: HashSet<ProductId>,
}

impl CartStore {
    /// Rebuild a store from the persisted line list and the session-scoped
    /// selection. Absent or malformed content yields an empty cart; a
    /// selection referencing lines that no longer exist is pruned.
    #[must_use]
    pub fn hydrate(lines_json: Option<&str>, selection_json: Option<&str>) -> Self {
        let lines = lines_json
            .and_then(|raw| serde_json::from_str::<PersistedLines>(raw).ok())
            .unwrap_or_default()
            .lines;
        let selected = selection_json
            .and_then(|raw| serde_json::from_str::<Vec<ProductId>>(raw).ok())
            .unwrap_or_default()
            .into_iter()
            .collect();

        let mut store = Self { lines, selected };
        store.prune_selection();
        store
    }

    /// Serialize the line list for durable storage.
    #[must_use]
    pub fn serialize_lines(&self) -> String {
        serde_json::to_string(&PersistedLines {
            lines: self.lines.clone(),
        })
        .unwrap_or_default()
    }

    /// Serialize the selection set for session-scoped storage,
    /// preserving cart order.
    #[must_use]
    pub fn serialize_selection(&self) -> String {
        let ordered: Vec<&ProductId> = self
            .lines
            .iter()
            .map(|line| &line.product_id)
            .filter(|id| self.selected.contains(*id))
            .collect();
        serde_json::to_string(&ordered).unwrap_or_default()
    }

    /// All cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether a line is ticked for checkout.
    #[must_use]
    pub fn is_selected(&self, id: &ProductId) -> bool {
        self.selected.contains(id)
    }

    /// Whether every line is ticked.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        !self.lines.is_empty() && self.lines.len() == self.selected.len()
    }

    /// Add a line: merge quantities when the product is already present,
    /// append otherwise. This operation cannot fail.
    pub fn add(&mut self, line: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity.max(1));
        } else {
            let mut line = line;
            line.quantity = line.quantity.max(1);
            self.lines.push(line);
        }
    }

    /// Set a line's quantity, clamped to a minimum of 1.
    /// No-op when the product is absent.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == id) {
            line.quantity = quantity.max(1);
        }
    }

    /// Remove a line. Idempotent; the id silently leaves the selection.
    pub fn remove(&mut self, id: &ProductId) {
        self.lines.retain(|l| &l.product_id != id);
        self.prune_selection();
    }

    /// Empty the lines and the selection set atomically.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.selected.clear();
    }

    /// Toggle a line's checkout tick. Ignored for unknown ids so the
    /// selection never references a missing line.
    pub fn toggle_select(&mut self, id: &ProductId) {
        if !self.lines.iter().any(|l| &l.product_id == id) {
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
    }

    /// Select-all toggle: clears the selection when every line is already
    /// ticked, selects everything otherwise.
    pub fn select_all(&mut self) {
        if self.all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.lines.iter().map(|l| l.product_id.clone()).collect();
        }
    }

    /// Untick everything.
    pub fn clear_selected(&mut self) {
        self.selected.clear();
    }

    /// Remove every ticked line.
    pub fn remove_selected(&mut self) {
        let selected = std::mem::take(&mut self.selected);
        self.lines.retain(|l| !selected.contains(&l.product_id));
    }

    /// Ticked lines in cart order.
    #[must_use]
    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .filter(|l| self.selected.contains(&l.product_id))
            .cloned()
            .collect()
    }

    /// Lines to check out: the ticked selection, or the whole cart when
    /// nothing is ticked.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CartLine> {
        if self.selected.is_empty() {
            self.lines.clone()
        } else {
            self.selected_lines()
        }
    }

    /// Whole-cart subtotal (mini-cart figure, not the checkout subtotal).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total quantity across all lines (badge figure).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, l| acc.saturating_add(l.quantity))
    }

    fn prune_selection(&mut self) {
        let ids: HashSet<&ProductId> = self.lines.iter().map(|l| &l.product_id).collect();
        self.selected.retain(|id| ids.contains(id));
    }
}
