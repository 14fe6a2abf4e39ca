//! Navigation menu tools.

use serde_json::{Value, json};
use shopify_admin_mcp_core::{
    FieldViolation, ParamSpec, ParamType, ResourceKind, ToolDefinition, to_gid,
};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload, required_node};

use super::{Arguments, ToolRegistry};

/// Values of Shopify's `MenuItemType` enum.
const MENU_ITEM_TYPES: &[&str] = &[
    "ARTICLE",
    "BLOG",
    "CATALOG",
    "COLLECTION",
    "COLLECTIONS",
    "CUSTOMER_ACCOUNT_PAGE",
    "FRONTPAGE",
    "HTTP",
    "METAOBJECT",
    "PAGE",
    "PRODUCT",
    "SEARCH",
    "SHOP_POLICY",
];

const GET_FIRST_MENU_ID: &str = r"
query GetFirstMenuId {
  menus(first: 1) {
    nodes {
      id
    }
  }
}";

const GET_MENU: &str = r"
query GetMenu($id: ID!) {
  menu(id: $id) {
    id
    title
    handle
    items {
      id
      title
      type
      url
      resourceId
      items {
        id
        title
        type
        url
        resourceId
        items {
          id
          title
          type
          url
          resourceId
        }
      }
    }
  }
}";

const UPDATE_MENU: &str = r"
mutation UpdateMenu($id: ID!, $title: String!, $handle: String!, $items: [MenuItemUpdateInput!]!) {
  menuUpdate(id: $id, title: $title, handle: $handle, items: $items) {
    menu {
      id
      title
      handle
      items {
        id
        title
        type
        url
        items {
          id
          title
          type
          url
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_menus_tool(), handler!(get_menus))?;
    registry.register_checked(update_menu_tool(), check_menu_items, handler!(update_menu))?;
    Ok(())
}

fn get_menus_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getMenus",
        "Get a navigation menu with its nested items. Without menuId, returns the store's \
         first menu.",
    )
    .param(ParamSpec::id("menuId").describe("Menu ID (numeric or gid://shopify/Menu/...)"))
}

fn update_menu_tool() -> ToolDefinition {
    ToolDefinition::new(
        "updateMenu",
        "Replace a menu's title, handle and full item tree. Each item needs a title and a \
         type; HTTP items also need a url; resource items take a resourceId. Items may nest \
         under `items`.",
    )
    .param(ParamSpec::id("menuId").required().non_empty())
    .param(ParamSpec::string("title").required().non_empty())
    .param(ParamSpec::string("handle").required().non_empty())
    .param(
        ParamSpec::array("items", ParamType::Object)
            .required()
            .describe("Complete list of MenuItemUpdateInput objects; omitted items are removed"),
    )
}

#[instrument(skip_all)]
async fn get_menus(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let menu_id = if let Some(id) = args.opt_id("menuId") {
        to_gid(ResourceKind::Menu, &id)
    } else {
        let data = client
            .graphql(GET_FIRST_MENU_ID, "GetFirstMenuId", json!({}))
            .await?;
        match data.pointer("/menus/nodes/0/id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => return Ok(json!({ "menu": null })),
        }
    };

    let data = client
        .graphql(GET_MENU, "GetMenu", json!({ "id": menu_id }))
        .await?;
    Ok(required_node(data, "menu", &menu_id)?)
}

#[instrument(skip_all)]
async fn update_menu(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "id": to_gid(ResourceKind::Menu, &args.id("menuId")?),
        "title": args.str("title")?,
        "handle": args.str("handle")?,
        "items": args.array("items")?,
    });
    let data = client.graphql(UPDATE_MENU, "UpdateMenu", variables).await?;
    Ok(mutation_payload(data, "menuUpdate")?)
}

fn check_menu_items(args: &Arguments) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if let Some(items) = args.opt_array("items") {
        validate_menu_items(items, "items", &mut violations);
    }
    violations
}

/// Check a menu item tree, recording violations as `items[0].items[1].title`.
fn validate_menu_items(items: &[Value], path: &str, violations: &mut Vec<FieldViolation>) {
    for (index, item) in items.iter().enumerate() {
        let here = format!("{path}[{index}]");
        let Some(item) = item.as_object() else {
            violations.push(FieldViolation::new(here, "must be an object"));
            continue;
        };

        match item.get("title").and_then(Value::as_str) {
            Some(title) if !title.trim().is_empty() => {}
            _ => violations.push(FieldViolation::new(
                format!("{here}.title"),
                "is required and must be a non-empty string",
            )),
        }

        match item.get("type").and_then(Value::as_str) {
            Some(kind) if MENU_ITEM_TYPES.contains(&kind) => {
                let has_url = item
                    .get("url")
                    .and_then(Value::as_str)
                    .is_some_and(|u| !u.trim().is_empty());
                if kind == "HTTP" && !has_url {
                    violations.push(FieldViolation::new(
                        format!("{here}.url"),
                        "is required for HTTP items",
                    ));
                }
            }
            Some(_) => violations.push(FieldViolation::new(
                format!("{here}.type"),
                format!("must be one of: {}", MENU_ITEM_TYPES.join(", ")),
            )),
            None => violations.push(FieldViolation::new(format!("{here}.type"), "is required")),
        }

        match item.get("items") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                validate_menu_items(children, &format!("{here}.items"), violations);
            }
            Some(_) => violations.push(FieldViolation::new(
                format!("{here}.items"),
                "must be an array",
            )),
        }
    }
}
