//! Blog tools.

use serde_json::{Map, Value, json};
use shopify_admin_mcp_core::{ParamSpec, ResourceKind, ToolDefinition, to_gid};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload, required_node};

use super::{Arguments, ToolRegistry, first_param};

const COMMENT_POLICIES: &[&str] = &["MODERATED", "AUTO_PUBLISHED", "CLOSED"];

const GET_BLOGS: &str = r"
query GetBlogs($first: Int!) {
  blogs(first: $first) {
    nodes {
      id
      title
      handle
      commentPolicy
      templateSuffix
      tags
      createdAt
      updatedAt
    }
  }
}";

const GET_BLOG: &str = r"
query GetBlog($id: ID!) {
  blog(id: $id) {
    id
    title
    handle
    commentPolicy
    templateSuffix
    tags
    createdAt
    updatedAt
  }
}";

const CREATE_BLOG: &str = r"
mutation BlogCreate($blog: BlogCreateInput!) {
  blogCreate(blog: $blog) {
    blog {
      id
      title
      handle
      commentPolicy
    }
    userErrors {
      field
      message
    }
  }
}";

const UPDATE_BLOG: &str = r"
mutation BlogUpdate($id: ID!, $blog: BlogUpdateInput!) {
  blogUpdate(id: $id, blog: $blog) {
    blog {
      id
      title
      handle
    }
    userErrors {
      field
      message
    }
  }
}";

const DELETE_BLOG: &str = r"
mutation BlogDelete($id: ID!) {
  blogDelete(id: $id) {
    deletedBlogId
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_blogs_tool(), handler!(get_blogs))?;
    registry.register(get_blog_tool(), handler!(get_blog))?;
    registry.register(create_blog_tool(), handler!(create_blog))?;
    registry.register(update_blog_tool(), handler!(update_blog))?;
    registry.register(delete_blog_tool(), handler!(delete_blog))?;
    Ok(())
}

fn blog_id_param() -> ParamSpec {
    ParamSpec::id("blogId")
        .required()
        .non_empty()
        .describe("Blog ID (numeric or gid://shopify/Blog/...)")
}

fn get_blogs_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getBlogs",
        "List blogs with their IDs, handles and comment policies.",
    )
    .param(first_param(5))
}

fn get_blog_tool() -> ToolDefinition {
    ToolDefinition::new("getBlog", "Get a single blog by ID.").param(blog_id_param())
}

fn create_blog_tool() -> ToolDefinition {
    ToolDefinition::new("createBlog", "Create a blog.")
        .param(ParamSpec::string("title").required().non_empty())
        .param(ParamSpec::string("handle").describe("URL handle; derived from the title if omitted"))
        .param(
            ParamSpec::string("commentPolicy")
                .one_of(COMMENT_POLICIES)
                .describe("Comment policy (default: MODERATED)"),
        )
}

fn update_blog_tool() -> ToolDefinition {
    ToolDefinition::new("updateBlog", "Rename a blog.")
        .param(blog_id_param())
        .param(ParamSpec::string("title").required().non_empty())
}

fn delete_blog_tool() -> ToolDefinition {
    ToolDefinition::new(
        "deleteBlog",
        "Delete a blog and every article in it.",
    )
    .param(blog_id_param())
}

#[instrument(skip_all)]
async fn get_blogs(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({ "first": args.i64_or("first", 5) });
    Ok(client.graphql(GET_BLOGS, "GetBlogs", variables).await?)
}

#[instrument(skip_all)]
async fn get_blog(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Blog, &args.id("blogId")?);
    let data = client.graphql(GET_BLOG, "GetBlog", json!({ "id": id })).await?;
    Ok(required_node(data, "blog", &id)?)
}

#[instrument(skip_all)]
async fn create_blog(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let mut blog = Map::new();
    blog.insert("title".to_string(), json!(args.str("title")?));
    if let Some(handle) = args.opt_str("handle") {
        blog.insert("handle".to_string(), json!(handle));
    }
    blog.insert(
        "commentPolicy".to_string(),
        json!(args.opt_str("commentPolicy").unwrap_or("MODERATED")),
    );
    let data = client
        .graphql(CREATE_BLOG, "BlogCreate", json!({ "blog": blog }))
        .await?;
    Ok(mutation_payload(data, "blogCreate")?)
}

#[instrument(skip_all)]
async fn update_blog(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "id": to_gid(ResourceKind::Blog, &args.id("blogId")?),
        "blog": { "title": args.str("title")? },
    });
    let data = client.graphql(UPDATE_BLOG, "BlogUpdate", variables).await?;
    Ok(mutation_payload(data, "blogUpdate")?)
}

#[instrument(skip_all)]
async fn delete_blog(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Blog, &args.id("blogId")?);
    let data = client
        .graphql(DELETE_BLOG, "BlogDelete", json!({ "id": id }))
        .await?;
    Ok(mutation_payload(data, "blogDelete")?)
}
