//! Order tools.
//!
//! Single-order reads go through REST, where a missing order is a plain 404.

use reqwest::Method;
use serde_json::{Value, json};
use shopify_admin_mcp_core::{ParamSpec, ToolDefinition};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::AdminClient;

use super::{Arguments, ToolRegistry, after_param, first_param, query_param, rest_id};

const ORDER_SORT_KEYS: &[&str] = &[
    "CREATED_AT",
    "CUSTOMER_NAME",
    "FINANCIAL_STATUS",
    "FULFILLMENT_STATUS",
    "ID",
    "ORDER_NUMBER",
    "PROCESSED_AT",
    "RELEVANCE",
    "TOTAL_PRICE",
    "UPDATED_AT",
];

const LIST_ORDERS: &str = r"
query ListOrders($first: Int!, $after: String, $query: String, $sortKey: OrderSortKeys) {
  orders(first: $first, after: $after, query: $query, sortKey: $sortKey) {
    nodes {
      id
      legacyResourceId
      name
      createdAt
      displayFinancialStatus
      displayFulfillmentStatus
      totalPriceSet {
        shopMoney {
          amount
          currencyCode
        }
      }
      customer {
        id
        firstName
        lastName
        email
      }
      lineItems(first: 10) {
        nodes {
          title
          quantity
          sku
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}";

const COUNT_ORDERS: &str = r"
query CountOrders($query: String, $limit: Int) {
  ordersCount(query: $query, limit: $limit) {
    count
    precision
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(list_orders_tool(), handler!(list_orders))?;
    registry.register(get_order_tool(), handler!(get_order))?;
    registry.register(count_orders_tool(), handler!(count_orders))?;
    Ok(())
}

fn list_orders_tool() -> ToolDefinition {
    ToolDefinition::new(
        "listOrders",
        "List orders with totals, statuses, customer and first line items.",
    )
    .param(first_param(10))
    .param(after_param())
    .param(query_param("'financial_status:paid', 'created_at:>2025-01-01'"))
    .param(ParamSpec::string("sortKey").one_of(ORDER_SORT_KEYS))
}

fn get_order_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getOrder",
        "Get a single order with line items, addresses, transactions and fulfillments.",
    )
    .param(
        ParamSpec::id("orderId")
            .required()
            .non_empty()
            .describe("Order ID (numeric or gid://shopify/Order/...)"),
    )
}

fn count_orders_tool() -> ToolDefinition {
    ToolDefinition::new("countOrders", "Count orders, optionally filtered.")
        .param(query_param("'status:open'"))
        .param(
            ParamSpec::integer("limit")
                .positive()
                .describe("Stop counting at this value"),
        )
}

#[instrument(skip_all)]
async fn list_orders(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "first": args.i64_or("first", 10),
        "after": args.get("after"),
        "query": args.get("query"),
        "sortKey": args.get("sortKey"),
    });
    Ok(client.graphql(LIST_ORDERS, "ListOrders", variables).await?)
}

#[instrument(skip_all)]
async fn get_order(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let path = format!("orders/{}", rest_id(&args.id("orderId")?));
    Ok(client.rest(Method::GET, &path, &[], None).await?)
}

#[instrument(skip_all)]
async fn count_orders(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({ "query": args.get("query"), "limit": args.get("limit") });
    Ok(client.graphql(COUNT_ORDERS, "CountOrders", variables).await?)
}
