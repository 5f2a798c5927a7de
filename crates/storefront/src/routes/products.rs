//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use boutique_core::{CurrencyCode, Product, VariantSelection};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::routes::nav::Nav;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    /// Rich-text description (trusted HTML from the catalogue).
    pub description: String,
    pub code: String,
    pub sizes: Vec<SizeOption>,
    pub price: Option<String>,
    pub stock_notice: Option<u32>,
    pub is_out_of_stock: bool,
    pub can_add_to_cart: bool,
    pub cart_label: &'static str,
    pub quantity: u32,
    pub max_quantity: u32,
    pub shows_custom_size_options: bool,
}

/// One size button.
#[derive(Clone)]
pub struct SizeOption {
    pub label: String,
    pub href: String,
    pub selected: bool,
    pub sold_out: bool,
}

impl ProductView {
    fn new(
        handle: &str,
        selection: &VariantSelection<'_>,
        currency: CurrencyCode,
        requested_quantity: Option<u32>,
    ) -> Self {
        let product: &Product = selection.product();
        let selected_size = selection.selected().map(|v| v.size.as_str());

        let sizes = product
            .variants
            .iter()
            .map(|variant| SizeOption {
                label: variant.size.clone(),
                href: format!(
                    "/products/{}?size={}",
                    urlencoding::encode(handle),
                    urlencoding::encode(&variant.size)
                ),
                selected: selected_size == Some(variant.size.as_str()),
                sold_out: !variant.is_in_stock() || !variant.is_available,
            })
            .collect();

        Self {
            handle: handle.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            code: product.code.clone(),
            sizes,
            price: selection.price(currency).map(|p| p.to_string()),
            stock_notice: selection.stock_notice(),
            is_out_of_stock: selection.is_out_of_stock(),
            can_add_to_cart: selection.can_add_to_cart(),
            cart_label: selection.cart_label().as_str(),
            quantity: selection.quantity(requested_quantity),
            max_quantity: selection.max_quantity(),
            shows_custom_size_options: selection.shows_custom_size_options(),
        }
    }
}

/// Variant selection query parameters.
#[derive(Debug, Deserialize)]
pub struct SelectionQuery {
    pub size: Option<String>,
    pub quantity: Option<u32>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub product: ProductView,
}

/// Display product detail page.
///
/// # Errors
///
/// Returns `AppError::Api` with `NotFound` for unknown handles, or when the
/// upstream cannot be reached.
#[instrument(skip(state, nav, query))]
pub async fn show(
    State(state): State<AppState>,
    nav: Nav,
    Path(handle): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> Result<impl IntoResponse> {
    let product = state.api().get_product(&handle).await?;
    let selection = product.select(query.size.as_deref());

    add_breadcrumb("navigation", "Viewed product page", Some(&[("handle", handle.as_str())][..]));

    Ok(ProductShowTemplate {
        nav,
        product: ProductView::new(&handle, &selection, state.config().currency, query.quantity),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boutique_core::{CUSTOM_SIZE, ProductVariant};
    use rust_decimal::Decimal;

    use super::*;

    fn product() -> Product {
        Product {
            title: "Linen Kurta".to_string(),
            description: "<p>Soft.</p>".to_string(),
            code: "LK-01".to_string(),
            is_available: true,
            variants: vec![
                ProductVariant {
                    size: "S".to_string(),
                    price: Some(Decimal::new(4999, 2)),
                    quantity: 0,
                    is_available: true,
                },
                ProductVariant {
                    size: CUSTOM_SIZE.to_string(),
                    price: Some(Decimal::new(7900, 2)),
                    quantity: 3,
                    is_available: true,
                },
            ],
        }
    }

    #[test]
    fn test_view_for_default_selection() {
        let product = product();
        let view = ProductView::new("linen kurta", &product.select(None), CurrencyCode::USD, Some(9));

        assert_eq!(view.price.as_deref(), Some("$79.00"));
        assert_eq!(view.cart_label, "Add to Cart");
        assert_eq!(view.quantity, 3);
        assert_eq!(view.stock_notice, Some(3));
        assert!(view.shows_custom_size_options);

        assert!(view.sizes[0].sold_out);
        assert!(!view.sizes[0].selected);
        assert!(view.sizes[1].selected);
        assert_eq!(view.sizes[1].href, "/products/linen%20kurta?size=Custom");
    }

    #[test]
    fn test_view_for_sold_out_size() {
        let product = product();
        let view = ProductView::new("lk", &product.select(Some("S")), CurrencyCode::USD, None);

        assert!(view.is_out_of_stock);
        assert!(!view.can_add_to_cart);
        assert_eq!(view.cart_label, "Out of Stock");
        assert_eq!(view.max_quantity, 1);
        assert!(!view.shows_custom_size_options);
    }
}
