//! End-to-end tool invocations against a recording stub of the Admin API.

use reqwest::Method;
use serde_json::{Value, json};
use shopify_admin_mcp::shopify::{HttpRequest, HttpResponse, TransportError};
use shopify_admin_mcp_core::ErrorKind;
use shopify_admin_mcp_integration_tests::{
    ACCESS_TOKEN, API_VERSION, STORE, StubTransport, call, graphql_data, registry,
};

fn path(request: &HttpRequest) -> String {
    request.url.path().to_string()
}

fn variables(request: &HttpRequest) -> Value {
    request
        .body
        .as_ref()
        .and_then(|b| b.get("variables"))
        .cloned()
        .unwrap_or(Value::Null)
}

// ============================================================================
// Products (REST)
// ============================================================================

#[tokio::test]
async fn test_create_product_returns_body_unchanged() {
    let transport = StubTransport::always(HttpResponse::json(
        &json!({"id": 123, "title": "Ocean Breeze"}),
    ));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("createProduct", json!({"title": "Ocean Breeze"})))
        .await;

    assert!(result.is_success());
    assert_eq!(
        result.payload(),
        Some(&json!({"id": 123, "title": "Ocean Breeze"}))
    );

    let request = transport.last_request().expect("one request");
    assert_eq!(request.method, Method::POST);
    assert_eq!(path(&request), format!("/admin/api/{API_VERSION}/products.json"));
    assert_eq!(
        request.body,
        Some(json!({"product": {"title": "Ocean Breeze"}}))
    );
}

#[tokio::test]
async fn test_created_product_reads_back_with_same_title() {
    let transport = StubTransport::product_store();
    let registry = registry(transport.clone());

    let created = registry
        .invoke(call(
            "createProduct",
            json!({"title": "Ocean Breeze", "vendor": "Tidewater Candle Co", "tags": ["candle", "summer"]}),
        ))
        .await
        .into_result()
        .expect("create succeeds");
    let id = created
        .pointer("/product/id")
        .cloned()
        .expect("created product has an id");

    let fetched = registry
        .invoke(call("getProduct", json!({ "productId": id })))
        .await
        .into_result()
        .expect("get succeeds");

    assert_eq!(fetched.pointer("/product/title"), Some(&json!("Ocean Breeze")));
    assert_eq!(fetched.pointer("/product/tags"), Some(&json!("candle, summer")));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_product_gid_becomes_rest_path() {
    let transport = StubTransport::always(HttpResponse::new(200, ""));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "deleteProduct",
            json!({"productId": "gid://shopify/Product/632910392"}),
        ))
        .await;

    assert_eq!(result.payload(), Some(&json!({})));
    let request = transport.last_request().expect("one request");
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        path(&request),
        format!("/admin/api/{API_VERSION}/products/632910392.json")
    );
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_update_product_sends_only_given_fields() {
    let transport = StubTransport::always(HttpResponse::json(&json!({"product": {"id": 5}})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "updateProduct",
            json!({"productId": 5, "status": "draft", "productType": "Candle"}),
        ))
        .await;

    assert!(result.is_success());
    let request = transport.last_request().expect("one request");
    assert_eq!(request.method, Method::PUT);
    assert_eq!(
        request.body,
        Some(json!({"product": {"id": "5", "product_type": "Candle", "status": "draft"}}))
    );
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_requests_carry_token_and_versioned_url() {
    let transport = StubTransport::always(HttpResponse::json(&json!({"shop": {"name": "Demo"}})));
    let registry = registry(transport.clone());

    let result = registry.invoke(call("getStoreInfo", json!({}))).await;
    assert_eq!(result.payload(), Some(&json!({"shop": {"name": "Demo"}})));

    let request = transport.last_request().expect("one request");
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url.scheme(), "https");
    assert_eq!(request.url.host_str(), Some(STORE));
    assert_eq!(path(&request), format!("/admin/api/{API_VERSION}/shop.json"));

    let token = request
        .headers
        .get("x-shopify-access-token")
        .expect("token header present");
    assert_eq!(token.to_str().ok(), Some(ACCESS_TOKEN));
    assert!(token.is_sensitive());
}

#[tokio::test]
async fn test_graphql_request_shape() {
    let transport = StubTransport::always(graphql_data(&json!({"products": {"nodes": []}})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("getProducts", json!({"first": 3, "query": "status:active"})))
        .await;

    assert_eq!(result.payload(), Some(&json!({"products": {"nodes": []}})));
    let request = transport.last_request().expect("one request");
    assert_eq!(request.method, Method::POST);
    assert_eq!(path(&request), format!("/admin/api/{API_VERSION}/graphql.json"));

    let body = request.body.clone().unwrap_or(Value::Null);
    assert_eq!(body.get("operationName"), Some(&json!("GetProducts")));
    assert!(
        body.get("query")
            .and_then(Value::as_str)
            .is_some_and(|q| q.contains("products(first: $first"))
    );
    assert_eq!(
        variables(&request),
        json!({"first": 3, "after": null, "query": "status:active"})
    );
}

#[tokio::test]
async fn test_numeric_ids_become_gids() {
    let transport = StubTransport::always(graphql_data(&json!({
        "customer": {"id": "gid://shopify/Customer/42"}
    })));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("getCustomer", json!({"customerId": 42})))
        .await;

    assert!(result.is_success());
    let request = transport.last_request().expect("one request");
    assert_eq!(
        variables(&request),
        json!({"id": "gid://shopify/Customer/42"})
    );
}

#[tokio::test]
async fn test_update_inventory_sets_absolute_quantity() {
    let transport = StubTransport::always(HttpResponse::json(&json!({
        "inventory_level": {"inventory_item_id": 808, "location_id": 42, "available": 7}
    })));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "updateInventory",
            json!({
                "itemId": "gid://shopify/InventoryItem/808",
                "locationId": "42",
                "quantity": 7,
            }),
        ))
        .await;

    assert!(result.is_success());
    let request = transport.last_request().expect("one request");
    assert_eq!(
        path(&request),
        format!("/admin/api/{API_VERSION}/inventory_levels/set.json")
    );
    assert_eq!(
        request.body,
        Some(json!({"location_id": 42, "inventory_item_id": 808, "available": 7}))
    );
}

// ============================================================================
// Upstream failures
// ============================================================================

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let transport = StubTransport::always(HttpResponse::new(404, r#"{"errors":"Not Found"}"#));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("getOrder", json!({"orderId": "450789469"})))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
    assert_eq!(result.error().and_then(|e| e.status_code), Some(404));
    assert_eq!(
        transport.last_request().map(|r| path(&r)),
        Some(format!("/admin/api/{API_VERSION}/orders/450789469.json"))
    );
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let transport = StubTransport::always(HttpResponse::new(500, "Internal Server Error"));
    let registry = registry(transport);

    let result = registry
        .invoke(call("getOrder", json!({"orderId": "450789469"})))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Http));
    assert_eq!(result.error().and_then(|e| e.status_code), Some(500));
}

#[tokio::test]
async fn test_rate_limit_and_auth_statuses_are_http_errors() {
    for status in [401, 403, 429] {
        let registry = registry(StubTransport::always(HttpResponse::new(status, "")));
        let result = registry.invoke(call("getStoreInfo", json!({}))).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Http), "status {status}");
        assert_eq!(result.error().and_then(|e| e.status_code), Some(status));
    }
}

#[tokio::test]
async fn test_transport_failure_is_http_error_without_status() {
    let transport = StubTransport::new(|_| Err(TransportError::Timeout));
    let registry = registry(transport);

    let result = registry.invoke(call("getStoreInfo", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Http));
    assert_eq!(result.error().and_then(|e| e.status_code), None);
}

#[tokio::test]
async fn test_graphql_errors_are_http_errors() {
    let transport = StubTransport::always(HttpResponse::json(&json!({
        "errors": [{"message": "Throttled"}]
    })));
    let registry = registry(transport);

    let result = registry.invoke(call("getBlogs", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Http));
    assert!(
        result
            .error()
            .is_some_and(|e| e.message.contains("Throttled"))
    );
}

#[tokio::test]
async fn test_user_errors_are_http_errors() {
    let transport = StubTransport::always(graphql_data(&json!({
        "blogCreate": {
            "blog": null,
            "userErrors": [{"field": ["blog", "title"], "message": "can't be blank"}]
        }
    })));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call("createBlog", json!({"title": "News"})))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Http));
    assert!(
        result
            .error()
            .is_some_and(|e| e.message.contains("blog.title: can't be blank"))
    );
    assert_eq!(
        variables(&transport.last_request().expect("one request")),
        json!({"blog": {"title": "News", "commentPolicy": "MODERATED"}})
    );
}

#[tokio::test]
async fn test_null_graphql_node_is_not_found() {
    let transport = StubTransport::always(graphql_data(&json!({"page": null})));
    let registry = registry(transport);

    let result = registry.invoke(call("getPage", json!({"pageId": "77"}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
}

// ============================================================================
// Multi-step flows
// ============================================================================

#[tokio::test]
async fn test_get_menus_resolves_first_menu() {
    let transport = StubTransport::sequence(vec![
        graphql_data(&json!({"menus": {"nodes": [{"id": "gid://shopify/Menu/1"}]}})),
        graphql_data(&json!({"menu": {"id": "gid://shopify/Menu/1", "title": "Main menu", "items": []}})),
    ]);
    let registry = registry(transport.clone());

    let result = registry.invoke(call("getMenus", json!({}))).await;

    assert_eq!(
        result.payload().and_then(|p| p.pointer("/menu/title")),
        Some(&json!("Main menu"))
    );
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests.last().map(variables),
        Some(json!({"id": "gid://shopify/Menu/1"}))
    );
}

#[tokio::test]
async fn test_get_menus_with_no_menus() {
    let transport = StubTransport::always(graphql_data(&json!({"menus": {"nodes": []}})));
    let registry = registry(transport.clone());

    let result = registry.invoke(call("getMenus", json!({}))).await;

    assert_eq!(result.payload(), Some(&json!({"menu": null})));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_create_discount_code_two_steps() {
    let transport = StubTransport::sequence(vec![
        HttpResponse::new(201, json!({"price_rule": {"id": 507328175, "title": "Summer"}}).to_string()),
        HttpResponse::new(201, json!({"discount_code": {"id": 1, "code": "SUMMER10"}}).to_string()),
    ]);
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createDiscountCode",
            json!({
                "title": "Summer",
                "code": "SUMMER10",
                "valueType": "percentage",
                "value": 10,
                "startsAt": "2026-06-01T00:00:00Z",
            }),
        ))
        .await;

    assert_eq!(
        result.payload(),
        Some(&json!({
            "price_rule": {"id": 507328175, "title": "Summer"},
            "discount_code": {"id": 1, "code": "SUMMER10"},
        }))
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    let rule = requests
        .first()
        .and_then(|r| r.body.clone())
        .unwrap_or(Value::Null);
    assert_eq!(rule.pointer("/price_rule/value"), Some(&json!("-10")));
    assert_eq!(rule.pointer("/price_rule/target_selection"), Some(&json!("all")));
    assert_eq!(
        rule.pointer("/price_rule/starts_at"),
        Some(&json!("2026-06-01T00:00:00Z"))
    );
    assert_eq!(
        requests.last().map(path),
        Some(format!(
            "/admin/api/{API_VERSION}/price_rules/507328175/discount_codes.json"
        ))
    );
}

#[tokio::test]
async fn test_discount_code_failure_names_orphaned_price_rule() {
    let transport = StubTransport::sequence(vec![
        HttpResponse::new(201, json!({"price_rule": {"id": 507328175}}).to_string()),
        HttpResponse::new(422, r#"{"errors":{"code":["must be unique"]}}"#),
    ]);
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createDiscountCode",
            json!({"title": "Dup", "code": "DUP", "valueType": "fixed_amount", "value": 5}),
        ))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Http));
    let error = result.error().expect("failure carries an error");
    assert_eq!(error.status_code, Some(422));
    assert!(error.message.contains("507328175"));
    assert!(error.message.contains("must be unique"));
    // No rollback request
    assert_eq!(transport.call_count(), 2);
}

// ============================================================================
// Product options and media
// ============================================================================

#[tokio::test]
async fn test_create_product_with_options_and_media() {
    let media = json!([{
        "originalSource": "https://cdn.example.com/tee-front.jpg",
        "alt": "Front",
        "mediaContentType": "IMAGE"
    }]);
    let nodes = json!([{"id": "gid://shopify/MediaImage/1", "alt": "Front", "status": "UPLOADED"}]);
    let transport = StubTransport::sequence(vec![
        HttpResponse::new(201, json!({"product": {"id": 1001, "title": "Tee"}}).to_string()),
        graphql_data(&json!({"productUpdate": {
            "product": {"id": "gid://shopify/Product/1001", "media": {"nodes": nodes}},
            "userErrors": []
        }})),
    ]);
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createProduct",
            json!({
                "title": "Tee",
                "productOptions": [{"name": "Size", "values": ["S", "M"]}],
                "media": media,
            }),
        ))
        .await;

    assert_eq!(
        result.payload(),
        Some(&json!({"product": {"id": 1001, "title": "Tee"}, "media": nodes}))
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests.first().and_then(|r| r.body.clone()),
        Some(json!({"product": {
            "title": "Tee",
            "options": [{"name": "Size", "values": ["S", "M"]}]
        }}))
    );
    let attach = requests.last().expect("media request");
    assert_eq!(path(attach), format!("/admin/api/{API_VERSION}/graphql.json"));
    assert_eq!(
        attach.body.as_ref().and_then(|b| b.get("operationName")),
        Some(&json!("ProductAttachMedia"))
    );
    assert_eq!(
        variables(attach),
        json!({"product": {"id": "gid://shopify/Product/1001"}, "media": media})
    );
}

#[tokio::test]
async fn test_media_only_update_skips_rest_write() {
    let nodes = json!([{"id": "gid://shopify/MediaImage/2", "status": "PROCESSING"}]);
    let transport = StubTransport::always(graphql_data(&json!({"productUpdate": {
        "product": {"id": "gid://shopify/Product/5", "media": {"nodes": nodes}},
        "userErrors": []
    }})));
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "updateProduct",
            json!({"productId": "gid://shopify/Product/5", "media": [{"originalSource": "https://cdn.example.com/b.jpg"}]}),
        ))
        .await;

    assert_eq!(
        result.payload(),
        Some(&json!({"product": {"id": "5"}, "media": nodes}))
    );
    assert_eq!(transport.call_count(), 1);
    let request = transport.last_request().expect("one request");
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        variables(&request).pointer("/product/id"),
        Some(&json!("gid://shopify/Product/5"))
    );
}

#[tokio::test]
async fn test_media_failure_names_the_saved_product() {
    let transport = StubTransport::sequence(vec![
        HttpResponse::new(201, json!({"product": {"id": 1002}}).to_string()),
        graphql_data(&json!({"productUpdate": {
            "product": null,
            "userErrors": [{"field": ["media", "0", "originalSource"], "message": "is invalid"}]
        }})),
    ]);
    let registry = registry(transport.clone());

    let result = registry
        .invoke(call(
            "createProduct",
            json!({"title": "Tee", "media": [{"originalSource": "not a url"}]}),
        ))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Http));
    let error = result.error().expect("failure carries an error");
    assert!(error.message.contains("gid://shopify/Product/1002 was saved"));
    assert!(error.message.contains("media.0.originalSource: is invalid"));
    // No rollback request
    assert_eq!(transport.call_count(), 2);
}
