//! Blog article tools.

use serde_json::{Map, Value, json};
use shopify_admin_mcp_core::{
    FieldViolation, ParamSpec, ParamType, ResourceKind, ToolDefinition, to_gid,
};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload, required_node};

use super::args::pick;
use super::{Arguments, ToolRegistry, first_param, require_any};

const GET_ARTICLES: &str = r"
query GetArticles($id: ID!, $first: Int!) {
  blog(id: $id) {
    id
    title
    articles(first: $first) {
      nodes {
        id
        title
        handle
        isPublished
        publishedAt
        tags
        author {
          name
        }
      }
    }
  }
}";

const GET_ARTICLE: &str = r"
query GetArticle($id: ID!) {
  article(id: $id) {
    id
    title
    handle
    body
    summary
    tags
    isPublished
    publishedAt
    author {
      name
    }
    blog {
      id
      title
    }
  }
}";

const CREATE_ARTICLE: &str = r"
mutation ArticleCreate($article: ArticleCreateInput!) {
  articleCreate(article: $article) {
    article {
      id
      title
      handle
      isPublished
      blog {
        id
      }
    }
    userErrors {
      field
      message
    }
  }
}";

const UPDATE_ARTICLE: &str = r"
mutation ArticleUpdate($id: ID!, $article: ArticleUpdateInput!) {
  articleUpdate(id: $id, article: $article) {
    article {
      id
      title
      body
    }
    userErrors {
      field
      message
    }
  }
}";

const DELETE_ARTICLE: &str = r"
mutation ArticleDelete($id: ID!) {
  articleDelete(id: $id) {
    deletedArticleId
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_articles_tool(), handler!(get_articles))?;
    registry.register(get_article_tool(), handler!(get_article))?;
    registry.register(create_article_tool(), handler!(create_article))?;
    registry.register_checked(
        update_article_tool(),
        check_update_article,
        handler!(update_article),
    )?;
    registry.register(delete_article_tool(), handler!(delete_article))?;
    Ok(())
}

fn article_id_param() -> ParamSpec {
    ParamSpec::id("articleId")
        .required()
        .non_empty()
        .describe("Article ID (numeric or gid://shopify/Article/...)")
}

fn blog_id_param() -> ParamSpec {
    ParamSpec::id("blogId")
        .required()
        .non_empty()
        .describe("Blog ID (numeric or gid://shopify/Blog/...)")
}

fn get_articles_tool() -> ToolDefinition {
    ToolDefinition::new("getArticles", "List the articles of one blog.")
        .param(blog_id_param())
        .param(first_param(5))
}

fn get_article_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getArticle",
        "Get a single article with its body, author and blog.",
    )
    .param(article_id_param())
}

fn create_article_tool() -> ToolDefinition {
    ToolDefinition::new("createArticle", "Create an article in a blog.")
        .param(blog_id_param())
        .param(ParamSpec::string("title").required().non_empty())
        .param(
            ParamSpec::string("body")
                .required()
                .describe("Article content (HTML)"),
        )
        .param(ParamSpec::string("authorName").required().non_empty())
        .param(ParamSpec::boolean("isPublished").describe("Publish immediately (default: true)"))
        .param(ParamSpec::array("tags", ParamType::String))
}

fn update_article_tool() -> ToolDefinition {
    ToolDefinition::new(
        "updateArticle",
        "Update an article's title and/or body. At least one must be given.",
    )
    .param(article_id_param())
    .param(ParamSpec::string("title").non_empty())
    .param(ParamSpec::string("body").describe("New content (HTML)"))
}

fn check_update_article(args: &Arguments) -> Vec<FieldViolation> {
    require_any(args, "articleId", &["title", "body"])
}

fn delete_article_tool() -> ToolDefinition {
    ToolDefinition::new("deleteArticle", "Delete an article.").param(article_id_param())
}

#[instrument(skip_all)]
async fn get_articles(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Blog, &args.id("blogId")?);
    let variables = json!({ "id": id, "first": args.i64_or("first", 5) });
    let data = client
        .graphql(GET_ARTICLES, "GetArticles", variables)
        .await?;
    Ok(required_node(data, "blog", &id)?)
}

#[instrument(skip_all)]
async fn get_article(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Article, &args.id("articleId")?);
    let data = client
        .graphql(GET_ARTICLE, "GetArticle", json!({ "id": id }))
        .await?;
    Ok(required_node(data, "article", &id)?)
}

#[instrument(skip_all)]
async fn create_article(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let mut article = Map::new();
    article.insert(
        "blogId".to_string(),
        json!(to_gid(ResourceKind::Blog, &args.id("blogId")?)),
    );
    article.insert("title".to_string(), json!(args.str("title")?));
    article.insert("body".to_string(), json!(args.str("body")?));
    article.insert(
        "author".to_string(),
        json!({ "name": args.str("authorName")? }),
    );
    article.insert(
        "isPublished".to_string(),
        json!(args.bool_or("isPublished", true)),
    );
    if let Some(tags) = args.opt_array("tags") {
        article.insert("tags".to_string(), Value::Array(tags.clone()));
    }

    let data = client
        .graphql(CREATE_ARTICLE, "ArticleCreate", json!({ "article": article }))
        .await?;
    Ok(mutation_payload(data, "articleCreate")?)
}

#[instrument(skip_all)]
async fn update_article(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let article = pick(args, &[("title", "title"), ("body", "body")]);
    let variables = json!({
        "id": to_gid(ResourceKind::Article, &args.id("articleId")?),
        "article": article,
    });
    let data = client
        .graphql(UPDATE_ARTICLE, "ArticleUpdate", variables)
        .await?;
    Ok(mutation_payload(data, "articleUpdate")?)
}

#[instrument(skip_all)]
async fn delete_article(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Article, &args.id("articleId")?);
    let data = client
        .graphql(DELETE_ARTICLE, "ArticleDelete", json!({ "id": id }))
        .await?;
    Ok(mutation_payload(data, "articleDelete")?)
}
