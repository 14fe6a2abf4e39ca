//! Store-level tools: shop info, locations and sales channel publications.

use reqwest::Method;
use serde_json::{Value, json};
use shopify_admin_mcp_core::ToolDefinition;
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::AdminClient;

use super::{Arguments, ToolRegistry, first_param};

const GET_LOCATIONS: &str = r"
query GetLocations($first: Int!) {
  locations(first: $first) {
    nodes {
      id
      name
      isActive
      address {
        address1
        address2
        city
        province
        country
        zip
      }
    }
  }
}";

const GET_PUBLICATIONS: &str = r"
query GetPublications($first: Int!) {
  publications(first: $first) {
    nodes {
      id
      name
      channel {
        handle
      }
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_store_info_tool(), handler!(get_store_info))?;
    registry.register(get_locations_tool(), handler!(get_locations))?;
    registry.register(get_publications_tool(), handler!(get_publications))?;
    Ok(())
}

fn get_store_info_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getStoreInfo",
        "Get store details: name, domain, contact email, currency, timezone, plan and address.",
    )
}

fn get_locations_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getLocations",
        "List store locations (warehouses, retail stores) with their IDs and addresses. \
         Location IDs are needed for inventory updates.",
    )
    .param(first_param(50))
}

fn get_publications_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getPublications",
        "List sales channel publications (e.g. Online Store). Publication IDs are needed \
         to publish products.",
    )
    .param(first_param(20))
}

#[instrument(skip_all)]
async fn get_store_info(client: &AdminClient, _args: &Arguments) -> Result<Value, ToolError> {
    Ok(client.rest(Method::GET, "shop", &[], None).await?)
}

#[instrument(skip_all)]
async fn get_locations(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({ "first": args.i64_or("first", 50) });
    Ok(client
        .graphql(GET_LOCATIONS, "GetLocations", variables)
        .await?)
}

#[instrument(skip_all)]
async fn get_publications(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({ "first": args.i64_or("first", 20) });
    Ok(client
        .graphql(GET_PUBLICATIONS, "GetPublications", variables)
        .await?)
}
