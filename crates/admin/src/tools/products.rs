//! Product tools.
//!
//! Single-product reads and writes use the REST Admin API so that the
//! product JSON an agent creates is the same shape it reads back; listing and
//! publishing go through GraphQL.

use reqwest::Method;
use serde_json::{Map, Value, json};
use shopify_admin_mcp_core::{
    FieldViolation, ParamSpec, ParamType, ResourceKind, ToolDefinition, to_gid,
};
use tracing::{instrument, warn};

use crate::error::ToolError;
use crate::shopify::{AdminClient, AdminShopifyError, mutation_payload, required_node};

use super::args::pick;
use super::{
    Arguments, ToolRegistry, after_param, first_param, query_param, require_any, rest_id,
};

const PRODUCT_STATUSES: &[&str] = &["active", "draft", "archived"];

/// Writable product fields: (argument name, REST field name).
const PRODUCT_FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("bodyHtml", "body_html"),
    ("vendor", "vendor"),
    ("productType", "product_type"),
    ("status", "status"),
];

/// Arguments `updateProduct` can change.
const UPDATABLE: &[&str] = &[
    "title",
    "bodyHtml",
    "vendor",
    "productType",
    "tags",
    "status",
    "media",
];

const GET_PRODUCTS: &str = r"
query GetProducts($first: Int!, $after: String, $query: String) {
  products(first: $first, after: $after, query: $query) {
    nodes {
      id
      legacyResourceId
      title
      handle
      status
      vendor
      productType
      totalInventory
      variants(first: 10) {
        nodes {
          id
          title
          price
          sku
          inventoryItem {
            id
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}";

const PUBLISH_PRODUCT: &str = r"
mutation PublishProduct($id: ID!, $input: [PublicationInput!]!) {
  publishablePublish(id: $id, input: $input) {
    publishable {
      ... on Product {
        id
        title
      }
    }
    userErrors {
      field
      message
    }
  }
}";

const ATTACH_MEDIA: &str = r"
mutation ProductAttachMedia($product: ProductUpdateInput!, $media: [CreateMediaInput!]) {
  productUpdate(product: $product, media: $media) {
    product {
      id
      media(first: 10) {
        nodes {
          id
          alt
          mediaContentType
          status
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}";

const PUBLICATION_STATUS: &str = r"
query ProductPublicationStatus($id: ID!, $publicationId: ID!) {
  product(id: $id) {
    id
    title
    publishedOnPublication(publicationId: $publicationId)
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(get_products_tool(), handler!(get_products))?;
    registry.register(get_product_tool(), handler!(get_product))?;
    registry.register_checked(
        create_product_tool(),
        check_product_options,
        handler!(create_product),
    )?;
    registry.register_checked(
        update_product_tool(),
        check_update_product,
        handler!(update_product),
    )?;
    registry.register(delete_product_tool(), handler!(delete_product))?;
    registry.register(publish_product_tool(), handler!(publish_product))?;
    registry.register(
        product_publication_status_tool(),
        handler!(product_publication_status),
    )?;
    Ok(())
}

fn product_id_param() -> ParamSpec {
    ParamSpec::id("productId")
        .required()
        .non_empty()
        .describe("Product ID (numeric or gid://shopify/Product/...)")
}

/// `CreateMediaInput` objects attached through GraphQL.
pub(super) fn media_param() -> ParamSpec {
    ParamSpec::array("media", ParamType::Object).describe(
        "CreateMediaInput objects, e.g. [{\"originalSource\": \"https://cdn.example.com/front.jpg\", \
         \"alt\": \"Front\", \"mediaContentType\": \"IMAGE\"}]",
    )
}

fn publication_id_param() -> ParamSpec {
    ParamSpec::id("publicationId")
        .required()
        .non_empty()
        .describe("Publication ID (numeric or gid://shopify/Publication/...)")
}

fn get_products_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getProducts",
        "List products with status, inventory totals and their first variants. \
         Supports cursor pagination and Shopify search syntax.",
    )
    .param(first_param(10))
    .param(after_param())
    .param(query_param("'title:shirt', 'status:active', 'vendor:Acme'"))
}

fn get_product_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getProduct",
        "Get a single product with its variants, options and images.",
    )
    .param(product_id_param())
}

fn create_product_tool() -> ToolDefinition {
    ToolDefinition::new(
        "createProduct",
        "Create a product. Returns the created product including its ID and default variant.",
    )
    .param(
        ParamSpec::string("title")
            .required()
            .non_empty()
            .describe("Product title"),
    )
    .param(ParamSpec::string("bodyHtml").describe("Description (HTML)"))
    .param(ParamSpec::string("vendor").describe("Vendor name"))
    .param(ParamSpec::string("productType").describe("Product type/category"))
    .param(ParamSpec::array("tags", ParamType::String).describe("Product tags"))
    .param(
        ParamSpec::string("status")
            .one_of(PRODUCT_STATUSES)
            .describe("Product status (default: active)"),
    )
    .param(
        ParamSpec::array("variants", ParamType::Object)
            .describe("Variant objects, e.g. [{\"price\": \"19.99\", \"sku\": \"SKU-1\"}]"),
    )
    .param(
        ParamSpec::array("productOptions", ParamType::Object).describe(
            "Options with their values, e.g. [{\"name\": \"Size\", \"values\": [\"S\", \"M\"]}]",
        ),
    )
    .param(media_param())
}

fn update_product_tool() -> ToolDefinition {
    ToolDefinition::new(
        "updateProduct",
        "Update product fields. Only the fields provided are changed; tags replace the \
         existing tags.",
    )
    .param(product_id_param())
    .param(ParamSpec::string("title").non_empty().describe("New title"))
    .param(ParamSpec::string("bodyHtml").describe("New description (HTML)"))
    .param(ParamSpec::string("vendor").describe("New vendor name"))
    .param(ParamSpec::string("productType").describe("New product type"))
    .param(ParamSpec::array("tags", ParamType::String).describe("New tags"))
    .param(ParamSpec::string("status").one_of(PRODUCT_STATUSES))
    .param(media_param())
}

fn delete_product_tool() -> ToolDefinition {
    ToolDefinition::new(
        "deleteProduct",
        "Permanently delete a product and all of its variants.",
    )
    .param(product_id_param())
}

fn publish_product_tool() -> ToolDefinition {
    ToolDefinition::new(
        "publishProduct",
        "Publish a product to a sales channel. Use getPublications to find the Online \
         Store publication ID.",
    )
    .param(product_id_param())
    .param(publication_id_param())
}

fn product_publication_status_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getProductPublicationStatus",
        "Check whether a product is published on a sales channel \
         (publishedOnPublication).",
    )
    .param(product_id_param())
    .param(publication_id_param())
}

fn check_update_product(args: &Arguments) -> Vec<FieldViolation> {
    require_any(args, "productId", UPDATABLE)
}

/// Each option needs a name and a list of string values.
fn check_product_options(args: &Arguments) -> Vec<FieldViolation> {
    let Some(options) = args.opt_array("productOptions") else {
        return Vec::new();
    };
    let mut violations = Vec::new();
    for (index, option) in options.iter().enumerate() {
        let here = format!("productOptions[{index}]");
        let Some(option) = option.as_object() else {
            continue;
        };
        if !option
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.trim().is_empty())
        {
            violations.push(FieldViolation::new(
                format!("{here}.name"),
                "is required and must be a non-empty string",
            ));
        }
        match option.get("values").and_then(Value::as_array) {
            Some(values) if !values.is_empty() && values.iter().all(Value::is_string) => {}
            _ => violations.push(FieldViolation::new(
                format!("{here}.values"),
                "must be a non-empty array of strings",
            )),
        }
    }
    violations
}

/// Build the REST `product` object from the writable fields present in `args`.
fn product_body(args: &Arguments) -> Map<String, Value> {
    let mut product = pick(args, PRODUCT_FIELDS);
    if let Some(tags) = args.opt_array("tags") {
        let tags: Vec<&str> = tags.iter().filter_map(Value::as_str).collect();
        product.insert("tags".to_string(), json!(tags.join(", ")));
    }
    product
}

#[instrument(skip_all)]
async fn get_products(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "first": args.i64_or("first", 10),
        "after": args.get("after"),
        "query": args.get("query"),
    });
    Ok(client.graphql(GET_PRODUCTS, "GetProducts", variables).await?)
}

#[instrument(skip_all)]
async fn get_product(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let path = format!("products/{}", rest_id(&args.id("productId")?));
    Ok(client.rest(Method::GET, &path, &[], None).await?)
}

/// Attach media to a product through GraphQL, returning the media nodes.
async fn create_media(
    client: &AdminClient,
    product_gid: &str,
    media: &Value,
) -> Result<Value, AdminShopifyError> {
    let variables = json!({ "product": { "id": product_gid }, "media": media });
    let data = client
        .graphql(ATTACH_MEDIA, "ProductAttachMedia", variables)
        .await?;
    let payload = mutation_payload(data, "productUpdate")?;
    Ok(payload
        .pointer("/product/media/nodes")
        .cloned()
        .unwrap_or(Value::Null))
}

/// Add the `media` argument, if any, to a product already saved through REST.
/// The REST response gains a top-level `media` member.
async fn attach_media(
    client: &AdminClient,
    args: &Arguments,
    product_id: &str,
    saved: &mut Value,
) -> Result<(), ToolError> {
    let Some(media) = args.get("media") else {
        return Ok(());
    };
    let gid = to_gid(ResourceKind::Product, product_id);
    match create_media(client, &gid, media).await {
        Ok(nodes) => {
            if let Some(saved) = saved.as_object_mut() {
                saved.insert("media".to_string(), nodes);
            }
            Ok(())
        }
        Err(err) => {
            let err = ToolError::from(err);
            warn!(product_id = %gid, error = %err, "media upload failed after product was saved");
            Err(ToolError::Http {
                status: err.status(),
                message: format!("product {gid} was saved but attaching media failed: {err}"),
            })
        }
    }
}

#[instrument(skip_all)]
async fn create_product(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let mut product = product_body(args);
    if let Some(variants) = args.opt_array("variants") {
        product.insert("variants".to_string(), Value::Array(variants.clone()));
    }
    if let Some(options) = args.opt_array("productOptions") {
        product.insert("options".to_string(), Value::Array(options.clone()));
    }
    let body = json!({ "product": product });
    let mut created = client.rest(Method::POST, "products", &[], Some(body)).await?;

    if args.get("media").is_some() {
        let id = match created.pointer("/product/id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(ToolError::Http {
                    status: None,
                    message: "product response did not include an id".to_string(),
                });
            }
        };
        attach_media(client, args, &id, &mut created).await?;
    }
    Ok(created)
}

#[instrument(skip_all)]
async fn update_product(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let raw_id = args.id("productId")?;
    let id = rest_id(&raw_id);
    let mut product = product_body(args);

    // Media-only updates skip the REST write.
    let mut saved = if product.is_empty() {
        json!({ "product": { "id": id } })
    } else {
        product.insert("id".to_string(), json!(id));
        let path = format!("products/{id}");
        let body = json!({ "product": product });
        client.rest(Method::PUT, &path, &[], Some(body)).await?
    };
    attach_media(client, args, &raw_id, &mut saved).await?;
    Ok(saved)
}

#[instrument(skip_all)]
async fn delete_product(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let path = format!("products/{}", rest_id(&args.id("productId")?));
    Ok(client.rest(Method::DELETE, &path, &[], None).await?)
}

#[instrument(skip_all)]
async fn publish_product(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "id": to_gid(ResourceKind::Product, &args.id("productId")?),
        "input": [{
            "publicationId": to_gid(ResourceKind::Publication, &args.id("publicationId")?),
        }],
    });
    let data = client
        .graphql(PUBLISH_PRODUCT, "PublishProduct", variables)
        .await?;
    Ok(mutation_payload(data, "publishablePublish")?)
}

#[instrument(skip_all)]
async fn product_publication_status(
    client: &AdminClient,
    args: &Arguments,
) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Product, &args.id("productId")?);
    let variables = json!({
        "id": id,
        "publicationId": to_gid(ResourceKind::Publication, &args.id("publicationId")?),
    });
    let data = client
        .graphql(PUBLICATION_STATUS, "ProductPublicationStatus", variables)
        .await?;
    Ok(required_node(data, "product", &id)?)
}
