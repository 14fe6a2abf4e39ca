//! Argument validation: nothing reaches Shopify until the arguments pass.

use serde_json::{Value, json};
use shopify_admin_mcp::shopify::HttpResponse;
use shopify_admin_mcp_core::{ErrorKind, FieldViolation, ToolInvocationResult, UnknownArgumentPolicy};
use shopify_admin_mcp_integration_tests::{
    StubTransport, call, graphql_data, registry, registry_with,
};

fn violations(result: &ToolInvocationResult) -> Vec<FieldViolation> {
    result
        .error()
        .and_then(|e| e.violations.clone())
        .unwrap_or_default()
}

fn fields(result: &ToolInvocationResult) -> Vec<String> {
    violations(result).into_iter().map(|v| v.field).collect()
}

// ============================================================================
// Schema validation
// ============================================================================

#[tokio::test]
async fn test_missing_required_argument_makes_no_request() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry.invoke(call("getProduct", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(fields(&result), ["productId"]);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_negative_inventory_quantity_is_rejected() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "updateInventory",
            json!({"quantity": -5, "locationId": "L1", "itemId": "I1"}),
        ))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
    let error = result.error().expect("failure carries an error");
    assert!(error.message.contains("quantity"));
    assert_eq!(
        violations(&result),
        vec![FieldViolation::new(
            "quantity",
            "must be greater than or equal to 0"
        )]
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_every_violation_is_reported_at_once() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createDiscountCode",
            json!({
                "title": "",
                "valueType": "bogus",
                "value": "ten",
                "usageLimit": 0,
            }),
        ))
        .await;

    assert_eq!(
        fields(&result),
        ["title", "code", "valueType", "value", "usageLimit"]
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_wrong_types_and_array_items() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createProduct",
            json!({"title": "Mug", "tags": ["kitchen", 7], "variants": "none"}),
        ))
        .await;

    assert_eq!(fields(&result), ["tags[1]", "variants"]);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_page_size_bounds() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    for first in [0, 251] {
        let result = registry
            .invoke(call("getProducts", json!({ "first": first })))
            .await;
        assert_eq!(fields(&result), ["first"], "first = {first}");
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_null_counts_as_missing() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("getOrder", json!({ "orderId": null })))
        .await;

    assert_eq!(
        violations(&result),
        vec![FieldViolation::new("orderId", "is required")]
    );
}

// ============================================================================
// Unknown arguments
// ============================================================================

#[tokio::test]
async fn test_unknown_arguments_rejected_by_default() {
    let transport = StubTransport::always(HttpResponse::json(&json!({"order": {}})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("getOrder", json!({"orderId": "1", "verbose": true})))
        .await;

    assert_eq!(
        violations(&result),
        vec![FieldViolation::new("verbose", "is not a parameter of this tool")]
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_arguments_dropped_under_ignore_policy() {
    let transport = StubTransport::always(graphql_data(&json!({"customersCount": {"count": 3}})));
    let registry = registry_with(transport.clone(), UnknownArgumentPolicy::Ignore);

    let result = registry
        .invoke(call("countCustomers", json!({"query": "state:ENABLED", "verbose": true})))
        .await;

    assert!(result.is_success());
    let request = transport.last_request().expect("one request");
    let variables = request
        .body
        .as_ref()
        .and_then(|b| b.get("variables"))
        .cloned()
        .unwrap_or(Value::Null);
    assert_eq!(variables.get("query"), Some(&json!("state:ENABLED")));
    assert!(variables.get("verbose").is_none());
}

// ============================================================================
// Operation-specific checks
// ============================================================================

#[tokio::test]
async fn test_update_product_needs_a_field() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("updateProduct", json!({"productId": "123"})))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(fields(&result), ["productId"]);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_update_page_and_article_need_title_or_body() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let page = registry.invoke(call("updatePage", json!({"pageId": 9}))).await;
    let article = registry
        .invoke(call("updateArticle", json!({"articleId": "gid://shopify/Article/9"})))
        .await;

    assert_eq!(page.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(article.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_menu_items_are_validated_recursively() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "updateMenu",
            json!({
                "menuId": "1",
                "title": "Main",
                "handle": "main-menu",
                "items": [
                    {"title": "Home", "type": "FRONTPAGE"},
                    {"title": "More", "type": "COLLECTIONS", "items": [
                        {"title": "Docs", "type": "HTTP"}
                    ]}
                ],
            }),
        ))
        .await;

    assert_eq!(fields(&result), ["items[1].items[0].url"]);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_percentage_discount_over_100_is_rejected() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createDiscountCode",
            json!({"title": "Half", "code": "HALF", "valueType": "percentage", "value": 150}),
        ))
        .await;

    assert_eq!(fields(&result), ["value"]);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_negative_variant_price_is_rejected() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createProductVariants",
            json!({"productId": "1", "variants": [{"price": "-3.00"}]}),
        ))
        .await;

    assert_eq!(fields(&result), ["variants[0].price"]);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_operation_checks_run_alongside_schema_validation() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let variants = registry
        .invoke(call(
            "createProductVariants",
            json!({"variants": [{"price": "-1"}]}),
        ))
        .await;
    let discount = registry
        .invoke(call(
            "createDiscountCode",
            json!({"title": "Half", "valueType": "percentage", "value": 150}),
        ))
        .await;
    let menu = registry
        .invoke(call(
            "updateMenu",
            json!({"menuId": "1", "handle": "main-menu", "items": [{"type": "FRONTPAGE"}]}),
        ))
        .await;

    assert_eq!(fields(&variants), ["productId", "variants[0].price"]);
    assert_eq!(fields(&discount), ["code", "value"]);
    assert_eq!(fields(&menu), ["title", "items[0].title"]);
    assert_eq!(transport.call_count(), 0);
}

// ============================================================================
// IDs and integer ranges
// ============================================================================

#[tokio::test]
async fn test_gid_without_id_is_rejected_before_any_request() {
    let transport = StubTransport::always(HttpResponse::json(&json!({"products": []})));
    let registry = registry(transport.clone());

    let cases = [
        ("getProduct", "productId", json!({"productId": "gid://shopify/Product/"})),
        (
            "updateProduct",
            "productId",
            json!({"productId": "gid://shopify/Product/", "title": "Mug"}),
        ),
        ("deleteProduct", "productId", json!({"productId": "gid://shopify/Product/"})),
        ("getOrder", "orderId", json!({"orderId": "gid://shopify/Order/"})),
        (
            "updateInventory",
            "locationId",
            json!({"itemId": "808", "locationId": "gid://shopify/Location/", "quantity": 1}),
        ),
    ];
    for (tool, field, arguments) in cases {
        let result = registry.invoke(call(tool, arguments)).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::Validation), "{tool}");
        assert_eq!(
            violations(&result),
            vec![FieldViolation::new(field, "is not a valid ID")],
            "{tool}"
        );
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_integer_beyond_i64_is_rejected() {
    let transport = StubTransport::always(HttpResponse::json(&json!({})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createDiscountCode",
            json!({
                "title": "Big",
                "code": "BIG",
                "valueType": "fixed_amount",
                "value": 5,
                "usageLimit": 10_000_000_000_000_000_000_u64,
            }),
        ))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(
        violations(&result),
        vec![FieldViolation::new(
            "usageLimit",
            format!("must be less than or equal to {}", i64::MAX)
        )]
    );
    assert_eq!(transport.call_count(), 0);
}
