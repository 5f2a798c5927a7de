//! Product detail pages rendered from the mocked catalogue.

#![allow(clippy::unwrap_used)]

use boutique_integration_tests::TestContext;
use reqwest::StatusCode;

async fn page(ctx: &TestContext, path: &str) -> (StatusCode, String) {
    let response = ctx.get(path).await;
    let status = response.status();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn test_default_variant_is_first_in_stock() {
    let ctx = TestContext::start().await;

    let (status, html) = page(&ctx, "/products/linen-kurta").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Linen Kurta"));
    assert!(html.contains("<em>linen</em>"), "description is rendered as HTML");
    assert!(html.contains("$49.50"));
    assert!(html.contains("5 in stock"));
    assert!(html.contains("Add to Cart"));
    assert!(html.contains(r#"class="size-option is-selected""#));
    assert!(!html.contains("Request Callback"));
}

#[tokio::test]
async fn test_colour_disclaimer() {
    let ctx = TestContext::start().await;

    let (_, html) = page(&ctx, "/products/linen-kurta").await;
    assert!(html.contains("<summary>Disclaimer</summary>"));
    assert!(html.contains("Actual colours of the outfit may vary."));
    assert!(html.contains("colour settings of different monitors"));
}

#[tokio::test]
async fn test_out_of_stock_size() {
    let ctx = TestContext::start().await;

    let (status, html) = page(&ctx, "/products/linen-kurta?size=S").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Out of Stock"));
    assert!(html.contains("0 in stock"));
    assert!(html.contains("disabled"));
}

#[tokio::test]
async fn test_custom_size_offers_measurement_options() {
    let ctx = TestContext::start().await;

    let (_, html) = page(&ctx, "/products/linen-kurta?size=Custom&quantity=9").await;
    assert!(html.contains("Request Callback"));
    assert!(html.contains("Enter Size Manually"));
    assert!(html.contains("$79.00"));
    // Quantity is clamped to what is in stock.
    assert!(html.contains(r#"max="2" value="2""#));
}

#[tokio::test]
async fn test_unavailable_product() {
    let ctx = TestContext::start().await;

    let (status, html) = page(&ctx, "/products/archive-shawl").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Unavailable"));
    assert!(!html.contains("Add to Cart"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::start().await;

    let (status, _) = page(&ctx, "/products/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_is_cached() {
    let ctx = TestContext::start().await;

    page(&ctx, "/products/linen-kurta").await;
    page(&ctx, "/products/linen-kurta?size=S").await;
    assert_eq!(ctx.upstream.calls(), ["product"]);
}
