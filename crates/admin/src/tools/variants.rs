//! Product variant tools.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Value, json};
use shopify_admin_mcp_core::{
    FieldViolation, ParamSpec, ParamType, ResourceKind, ToolDefinition, to_gid,
};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload};

use super::{Arguments, ToolRegistry};

const STRATEGIES: &[&str] = &[
    "DEFAULT",
    "REMOVE_STANDALONE_VARIANT",
    "PRESERVE_STANDALONE_VARIANT",
];

const CREATE_PRODUCT_VARIANTS: &str = r"
mutation ProductVariantsBulkCreate(
  $productId: ID!,
  $variants: [ProductVariantsBulkInput!]!,
  $media: [CreateMediaInput!],
  $strategy: ProductVariantsBulkCreateStrategy
) {
  productVariantsBulkCreate(
    productId: $productId,
    variants: $variants,
    media: $media,
    strategy: $strategy
  ) {
    product {
      id
      title
    }
    productVariants {
      id
      title
      price
      sku
      selectedOptions {
        name
        value
      }
      inventoryItem {
        id
      }
    }
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register_checked(
        create_product_variants_tool(),
        check_variant_prices,
        handler!(create_product_variants),
    )?;
    Ok(())
}

fn create_product_variants_tool() -> ToolDefinition {
    ToolDefinition::new(
        "createProductVariants",
        "Create variants on an existing product in one call. Each variant is a \
         ProductVariantsBulkInput object, e.g. {\"price\": \"24.99\", \"optionValues\": \
         [{\"optionName\": \"Size\", \"name\": \"Large\"}], \"inventoryQuantities\": \
         [{\"locationId\": \"gid://shopify/Location/1\", \"availableQuantity\": 10}]}.",
    )
    .param(
        ParamSpec::id("productId")
            .required()
            .non_empty()
            .describe("Product ID (numeric or gid://shopify/Product/...)"),
    )
    .param(
        ParamSpec::array("variants", ParamType::Object)
            .required()
            .non_empty()
            .describe("Variants to create"),
    )
    .param(super::products::media_param())
    .param(
        ParamSpec::string("strategy")
            .one_of(STRATEGIES)
            .describe("What to do with the product's standalone default variant (default: DEFAULT)"),
    )
}

fn check_variant_prices(args: &Arguments) -> Vec<FieldViolation> {
    args.opt_array("variants")
        .map(Vec::as_slice)
        .map(validate_prices)
        .unwrap_or_default()
}

/// Check that every variant `price` present is a non-negative decimal.
fn validate_prices(variants: &[Value]) -> Vec<FieldViolation> {
    variants
        .iter()
        .enumerate()
        .filter_map(|(index, variant)| {
            let price = variant.get("price").filter(|p| !p.is_null())?;
            let field = format!("variants[{index}].price");
            match parse_decimal(price) {
                Some(value) if value.is_sign_negative() && !value.is_zero() => Some(
                    FieldViolation::new(field, "must be greater than or equal to 0"),
                ),
                Some(_) => None,
                None => Some(FieldViolation::new(field, "must be a decimal amount")),
            }
        })
        .collect()
}

/// Parse a JSON number or numeric string as a decimal.
pub(super) fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        _ => None,
    }
}

#[instrument(skip_all)]
async fn create_product_variants(
    client: &AdminClient,
    args: &Arguments,
) -> Result<Value, ToolError> {
    let variables = json!({
        "productId": to_gid(ResourceKind::Product, &args.id("productId")?),
        "variants": args.array("variants")?,
        "media": args.get("media"),
        "strategy": args.opt_str("strategy").unwrap_or("DEFAULT"),
    });
    let data = client
        .graphql(
            CREATE_PRODUCT_VARIANTS,
            "ProductVariantsBulkCreate",
            variables,
        )
        .await?;
    Ok(mutation_payload(data, "productVariantsBulkCreate")?)
}
