//! Products, size variants and the derived selection state of a product page.
//!
//! Everything here is a pure function of the [`Product`] value: which variant
//! is selected by default, whether it is in stock, whether it can be bought.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::{CurrencyCode, Price};

/// Size label of the made-to-measure variant.
pub const CUSTOM_SIZE: &str = "Custom";

/// A product as returned by the upstream catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    /// Rich-text description (HTML).
    #[serde(default)]
    pub description: String,
    pub code: String,
    pub is_available: bool,
    /// Variants in display order.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// One purchasable size of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub size: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: u32,
    pub is_available: bool,
}

impl ProductVariant {
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }
}

impl Product {
    /// The first variant, in order, that is both in stock and available.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.is_in_stock() && v.is_available)
    }

    /// The variant with the given size label, if any.
    #[must_use]
    pub fn variant_by_size(&self, size: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.size == size)
    }

    /// Selection state for a page showing this product.
    ///
    /// An explicitly requested size wins when the product has it; otherwise
    /// the default variant is selected.
    #[must_use]
    pub fn select(&self, size: Option<&str>) -> VariantSelection<'_> {
        let selected = size
            .and_then(|s| self.variant_by_size(s))
            .or_else(|| self.default_variant());
        VariantSelection {
            product: self,
            selected,
        }
    }
}

/// Label of the add-to-cart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartLabel {
    Unavailable,
    OutOfStock,
    AddToCart,
}

impl CartLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "Unavailable",
            Self::OutOfStock => "Out of Stock",
            Self::AddToCart => "Add to Cart",
        }
    }
}

/// A product together with its currently selected variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantSelection<'a> {
    product: &'a Product,
    selected: Option<&'a ProductVariant>,
}

impl<'a> VariantSelection<'a> {
    #[must_use]
    pub const fn product(&self) -> &'a Product {
        self.product
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&'a ProductVariant> {
        self.selected
    }

    /// A variant is selected and has nothing left.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.selected.is_some_and(|v| v.quantity == 0)
    }

    /// A variant is selected and both it and the product are available.
    ///
    /// Stock is deliberately not part of this; see [`Self::can_add_to_cart`].
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.selected
            .is_some_and(|v| self.product.is_available && v.is_available)
    }

    #[must_use]
    pub fn is_custom_size(&self) -> bool {
        self.selected.is_some_and(|v| v.size == CUSTOM_SIZE)
    }

    /// Whether the quantity input and cart button are enabled.
    #[must_use]
    pub fn can_add_to_cart(&self) -> bool {
        self.is_purchasable() && !self.is_out_of_stock()
    }

    /// Whether to offer the callback / manual measurement choice.
    #[must_use]
    pub fn shows_custom_size_options(&self) -> bool {
        self.is_custom_size() && self.can_add_to_cart()
    }

    #[must_use]
    pub fn cart_label(&self) -> CartLabel {
        if !self.is_purchasable() {
            CartLabel::Unavailable
        } else if self.is_out_of_stock() {
            CartLabel::OutOfStock
        } else {
            CartLabel::AddToCart
        }
    }

    /// Units in stock, shown only when the selected variant is available.
    #[must_use]
    pub fn stock_notice(&self) -> Option<u32> {
        self.selected
            .filter(|v| v.is_available)
            .map(|v| v.quantity)
    }

    /// Upper bound of the quantity input (at least 1).
    #[must_use]
    pub fn max_quantity(&self) -> u32 {
        self.selected.map_or(1, |v| v.quantity.max(1))
    }

    /// Quantity to show: the request clamped to `1..=max`, or 1 when nothing
    /// was requested. Without a selected variant the quantity is 0.
    #[must_use]
    pub fn quantity(&self, requested: Option<u32>) -> u32 {
        if self.selected.is_none() {
            return 0;
        }
        requested.map_or(1, |q| q.clamp(1, self.max_quantity()))
    }

    /// Price of the selected variant in the shop currency.
    #[must_use]
    pub fn price(&self, currency: CurrencyCode) -> Option<Price> {
        self.selected
            .and_then(|v| v.price)
            .map(|amount| Price::new(amount, currency))
    }
}
