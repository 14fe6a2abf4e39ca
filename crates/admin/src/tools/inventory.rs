//! Inventory tools.

use reqwest::Method;
use serde_json::{Value, json};
use shopify_admin_mcp_core::{ParamSpec, ToolDefinition, legacy_id};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::AdminClient;

use super::{Arguments, ToolRegistry, after_param, first_param, query_param};

const GET_INVENTORY_ITEMS: &str = r#"
query GetInventoryItems($first: Int!, $after: String, $query: String) {
  inventoryItems(first: $first, after: $after, query: $query) {
    nodes {
      id
      legacyResourceId
      sku
      tracked
      createdAt
      updatedAt
      variant {
        id
        title
        product {
          id
          title
        }
      }
      inventoryLevels(first: 10) {
        nodes {
          location {
            id
            name
          }
          quantities(names: ["available", "on_hand"]) {
            name
            quantity
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}"#;

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_inventory_items_tool(), handler!(get_inventory_items))?;
    registry.register(update_inventory_tool(), handler!(update_inventory))?;
    Ok(())
}

fn get_inventory_items_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getInventoryItems",
        "List inventory items with SKU, tracking flag, owning variant and available \
         quantities per location.",
    )
    .param(first_param(5))
    .param(after_param())
    .param(query_param("'sku:ABC-123'"))
}

fn update_inventory_tool() -> ToolDefinition {
    ToolDefinition::new(
        "updateInventory",
        "Set the available quantity of an inventory item at a location (absolute, not a delta).",
    )
    .param(
        ParamSpec::id("itemId")
            .required()
            .non_empty()
            .describe("Inventory item ID (numeric or gid://shopify/InventoryItem/...)"),
    )
    .param(
        ParamSpec::id("locationId")
            .required()
            .non_empty()
            .describe("Location ID (numeric or gid://shopify/Location/...)"),
    )
    .param(
        ParamSpec::integer("quantity")
            .required()
            .min(0.0)
            .describe("New available quantity (>= 0)"),
    )
}

/// REST bodies take numeric IDs as JSON numbers.
fn rest_number(raw: &str) -> Value {
    let id = legacy_id(raw);
    id.parse::<u64>().map_or_else(|_| json!(id), |n| json!(n))
}

#[instrument(skip_all)]
async fn get_inventory_items(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "first": args.i64_or("first", 5),
        "after": args.get("after"),
        "query": args.get("query"),
    });
    Ok(client
        .graphql(GET_INVENTORY_ITEMS, "GetInventoryItems", variables)
        .await?)
}

#[instrument(skip_all)]
async fn update_inventory(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let quantity = args.i64("quantity")?;
    let body = json!({
        "location_id": rest_number(&args.id("locationId")?),
        "inventory_item_id": rest_number(&args.id("itemId")?),
        "available": quantity,
    });
    Ok(client
        .rest(Method::POST, "inventory_levels/set", &[], Some(body))
        .await?)
}
