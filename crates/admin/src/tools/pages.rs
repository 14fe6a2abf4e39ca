//! Online store page tools.

use serde_json::{Map, Value, json};
use shopify_admin_mcp_core::{FieldViolation, ParamSpec, ResourceKind, ToolDefinition, to_gid};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload, required_node};

use super::args::pick;
use super::{Arguments, ToolRegistry, first_param, require_any};

const GET_PAGES: &str = r"
query GetPages($first: Int!) {
  pages(first: $first) {
    nodes {
      id
      title
      handle
      isPublished
      publishedAt
      templateSuffix
      updatedAt
    }
  }
}";

const GET_PAGE: &str = r"
query GetPage($id: ID!) {
  page(id: $id) {
    id
    title
    handle
    body
    bodySummary
    isPublished
    publishedAt
    templateSuffix
    createdAt
    updatedAt
  }
}";

const CREATE_PAGE: &str = r"
mutation PageCreate($page: PageCreateInput!) {
  pageCreate(page: $page) {
    page {
      id
      title
      handle
      isPublished
    }
    userErrors {
      field
      message
    }
  }
}";

const UPDATE_PAGE: &str = r"
mutation PageUpdate($id: ID!, $page: PageUpdateInput!) {
  pageUpdate(id: $id, page: $page) {
    page {
      id
      title
      handle
      body
    }
    userErrors {
      field
      message
    }
  }
}";

const DELETE_PAGE: &str = r"
mutation PageDelete($id: ID!) {
  pageDelete(id: $id) {
    deletedPageId
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_pages_tool(), handler!(get_pages))?;
    registry.register(get_page_tool(), handler!(get_page))?;
    registry.register(create_page_tool(), handler!(create_page))?;
    registry.register_checked(update_page_tool(), check_update_page, handler!(update_page))?;
    registry.register(delete_page_tool(), handler!(delete_page))?;
    Ok(())
}

fn page_id_param() -> ParamSpec {
    ParamSpec::id("pageId")
        .required()
        .non_empty()
        .describe("Page ID (numeric or gid://shopify/Page/...)")
}

fn get_pages_tool() -> ToolDefinition {
    ToolDefinition::new("getPages", "List online store pages.").param(first_param(5))
}

fn get_page_tool() -> ToolDefinition {
    ToolDefinition::new("getPage", "Get a single page including its body.").param(page_id_param())
}

fn create_page_tool() -> ToolDefinition {
    ToolDefinition::new("createPage", "Create an online store page.")
        .param(ParamSpec::string("title").required().non_empty())
        .param(ParamSpec::string("body").required().describe("Page content (HTML)"))
        .param(ParamSpec::string("handle").describe("URL handle; derived from the title if omitted"))
        .param(ParamSpec::boolean("isPublished").describe("Publish immediately (default: true)"))
        .param(ParamSpec::string("templateSuffix").describe("Alternate theme template suffix"))
}

fn update_page_tool() -> ToolDefinition {
    ToolDefinition::new(
        "updatePage",
        "Update a page's title and/or body. At least one must be given.",
    )
    .param(page_id_param())
    .param(ParamSpec::string("title").non_empty())
    .param(ParamSpec::string("body").describe("New content (HTML)"))
}

fn check_update_page(args: &Arguments) -> Vec<FieldViolation> {
    require_any(args, "pageId", &["title", "body"])
}

fn delete_page_tool() -> ToolDefinition {
    ToolDefinition::new("deletePage", "Delete a page.").param(page_id_param())
}

#[instrument(skip_all)]
async fn get_pages(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({ "first": args.i64_or("first", 5) });
    Ok(client.graphql(GET_PAGES, "GetPages", variables).await?)
}

#[instrument(skip_all)]
async fn get_page(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Page, &args.id("pageId")?);
    let data = client.graphql(GET_PAGE, "GetPage", json!({ "id": id })).await?;
    Ok(required_node(data, "page", &id)?)
}

#[instrument(skip_all)]
async fn create_page(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let mut page: Map<String, Value> = pick(
        args,
        &[
            ("title", "title"),
            ("body", "body"),
            ("handle", "handle"),
            ("templateSuffix", "templateSuffix"),
        ],
    );
    page.insert(
        "isPublished".to_string(),
        json!(args.bool_or("isPublished", true)),
    );
    let data = client
        .graphql(CREATE_PAGE, "PageCreate", json!({ "page": page }))
        .await?;
    Ok(mutation_payload(data, "pageCreate")?)
}

#[instrument(skip_all)]
async fn update_page(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let page = pick(args, &[("title", "title"), ("body", "body")]);
    let variables = json!({
        "id": to_gid(ResourceKind::Page, &args.id("pageId")?),
        "page": page,
    });
    let data = client.graphql(UPDATE_PAGE, "PageUpdate", variables).await?;
    Ok(mutation_payload(data, "pageUpdate")?)
}

#[instrument(skip_all)]
async fn delete_page(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Page, &args.id("pageId")?);
    let data = client
        .graphql(DELETE_PAGE, "PageDelete", json!({ "id": id }))
        .await?;
    Ok(mutation_payload(data, "pageDelete")?)
}
