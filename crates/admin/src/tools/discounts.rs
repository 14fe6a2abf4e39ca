//! Discount code tools.
//!
//! Codes are created through the REST price rule API: a price rule carries the
//! discount terms and a discount code attaches a redeemable code to it. The two
//! requests are not atomic; if attaching the code fails, the price rule stays
//! in place and the error names it.

use chrono::Utc;
use reqwest::Method;
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use shopify_admin_mcp_core::{FieldViolation, ParamSpec, ResourceKind, ToolDefinition, to_gid};
use tracing::{instrument, warn};

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload, required_node};

use super::variants::parse_decimal;
use super::{Arguments, ToolRegistry, after_param, first_param, query_param, rest_id};

const VALUE_TYPES: &[&str] = &["percentage", "fixed_amount"];

const LIST_DISCOUNT_CODES: &str = r"
query ListDiscountCodes($first: Int!, $after: String, $query: String) {
  codeDiscountNodes(first: $first, after: $after, query: $query) {
    nodes {
      id
      codeDiscount {
        ... on DiscountCodeBasic {
          title
          summary
          status
          startsAt
          endsAt
          asyncUsageCount
        }
        ... on DiscountCodeBxgy {
          title
          summary
          status
        }
        ... on DiscountCodeFreeShipping {
          title
          summary
          status
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}";

const GET_DISCOUNT_CODE: &str = r"
query GetDiscountCode($id: ID!) {
  codeDiscountNode(id: $id) {
    id
    codeDiscount {
      ... on DiscountCodeBasic {
        title
        summary
        status
        startsAt
        endsAt
        usageLimit
        appliesOncePerCustomer
        asyncUsageCount
        codes(first: 10) {
          nodes {
            id
            code
            asyncUsageCount
          }
        }
      }
      ... on DiscountCodeBxgy {
        title
        summary
        status
      }
      ... on DiscountCodeFreeShipping {
        title
        summary
        status
      }
    }
  }
}";

const DELETE_DISCOUNT_CODE: &str = r"
mutation DiscountCodeDelete($id: ID!) {
  discountCodeDelete(id: $id) {
    deletedCodeDiscountId
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(list_discount_codes_tool(), handler!(list_discount_codes))?;
    registry.register(get_discount_code_tool(), handler!(get_discount_code))?;
    registry.register_checked(
        create_discount_code_tool(),
        check_percentage,
        handler!(create_discount_code),
    )?;
    registry.register(delete_discount_code_tool(), handler!(delete_discount_code))?;
    Ok(())
}

fn discount_id_param() -> ParamSpec {
    ParamSpec::id("discountId")
        .required()
        .non_empty()
        .describe("Discount ID (numeric or gid://shopify/DiscountCodeNode/...)")
}

fn list_discount_codes_tool() -> ToolDefinition {
    ToolDefinition::new(
        "listDiscountCodes",
        "List code discounts with their titles, summaries and status.",
    )
    .param(first_param(10))
    .param(after_param())
    .param(query_param("'status:active', 'title:SUMMER*'"))
}

fn get_discount_code_tool() -> ToolDefinition {
    ToolDefinition::new(
        "getDiscountCode",
        "Get a code discount with its terms and redeemable codes.",
    )
    .param(discount_id_param())
}

fn create_discount_code_tool() -> ToolDefinition {
    ToolDefinition::new(
        "createDiscountCode",
        "Create a discount code that applies to all products and customers. \
         Creates a price rule, then attaches the code to it.",
    )
    .param(
        ParamSpec::string("title")
            .required()
            .non_empty()
            .describe("Internal title of the discount"),
    )
    .param(
        ParamSpec::string("code")
            .required()
            .non_empty()
            .describe("Code customers enter at checkout"),
    )
    .param(ParamSpec::string("valueType").required().one_of(VALUE_TYPES))
    .param(
        ParamSpec::number("value")
            .required()
            .positive()
            .describe("Discount amount as a positive number; at most 100 for percentage"),
    )
    .param(ParamSpec::string("startsAt").describe("ISO 8601 start time (default: now)"))
    .param(ParamSpec::string("endsAt").describe("ISO 8601 end time"))
    .param(
        ParamSpec::integer("usageLimit")
            .min(1.0)
            .describe("Total number of times the code can be used"),
    )
    .param(ParamSpec::boolean("oncePerCustomer").describe("Limit to one use per customer"))
}

fn delete_discount_code_tool() -> ToolDefinition {
    ToolDefinition::new("deleteDiscountCode", "Delete a code discount.")
        .param(discount_id_param())
}

/// Percentages cannot exceed 100. Positivity is left to the schema.
fn check_percentage(args: &Arguments) -> Vec<FieldViolation> {
    let over_100 = args.opt_str("valueType") == Some("percentage")
        && args
            .get("value")
            .and_then(parse_decimal)
            .is_some_and(|value| value > Decimal::ONE_HUNDRED);
    if over_100 {
        vec![FieldViolation::new(
            "value",
            "must be less than or equal to 100 for percentage discounts",
        )]
    } else {
        Vec::new()
    }
}

/// Build the REST `price_rule` object; `starts_at` is supplied by the caller
/// when the arguments do not set one.
fn price_rule_body(args: &Arguments, default_start: &str) -> Result<Map<String, Value>, ToolError> {
    let value_type = args.str("valueType")?;
    let value = args
        .get("value")
        .and_then(parse_decimal)
        .ok_or_else(|| ToolError::invalid("value", "must be a number"))?;

    let mut rule = Map::new();
    rule.insert("title".to_string(), json!(args.str("title")?));
    rule.insert("target_type".to_string(), json!("line_item"));
    rule.insert("target_selection".to_string(), json!("all"));
    rule.insert("allocation_method".to_string(), json!("across"));
    rule.insert("value_type".to_string(), json!(value_type));
    rule.insert("value".to_string(), json!((-value).normalize().to_string()));
    rule.insert("customer_selection".to_string(), json!("all"));
    rule.insert(
        "starts_at".to_string(),
        json!(args.opt_str("startsAt").unwrap_or(default_start)),
    );
    if let Some(ends_at) = args.opt_str("endsAt") {
        rule.insert("ends_at".to_string(), json!(ends_at));
    }
    if let Some(limit) = args.opt_i64("usageLimit") {
        rule.insert("usage_limit".to_string(), json!(limit));
    }
    if let Some(once) = args.opt_bool("oncePerCustomer") {
        rule.insert("once_per_customer".to_string(), json!(once));
    }
    Ok(rule)
}

/// The id of a created price rule, as a path segment.
fn price_rule_id(response: &Value) -> Option<String> {
    match response.get("price_rule")?.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(rest_id(s)),
        _ => None,
    }
}

#[instrument(skip_all)]
async fn list_discount_codes(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "first": args.i64_or("first", 10),
        "after": args.get("after"),
        "query": args.get("query"),
    });
    Ok(client
        .graphql(LIST_DISCOUNT_CODES, "ListDiscountCodes", variables)
        .await?)
}

#[instrument(skip_all)]
async fn get_discount_code(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::DiscountCodeNode, &args.id("discountId")?);
    let data = client
        .graphql(GET_DISCOUNT_CODE, "GetDiscountCode", json!({ "id": id }))
        .await?;
    Ok(required_node(data, "codeDiscountNode", &id)?)
}

#[instrument(skip_all, fields(code))]
async fn create_discount_code(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let code = args.str("code")?;
    tracing::Span::current().record("code", code);

    let rule = price_rule_body(args, &Utc::now().to_rfc3339())?;
    let price_rule = client
        .rest(
            Method::POST,
            "price_rules",
            &[],
            Some(json!({ "price_rule": rule })),
        )
        .await?;
    let rule_id = price_rule_id(&price_rule).ok_or_else(|| ToolError::Http {
        status: None,
        message: "price rule response did not include an id".to_string(),
    })?;

    let path = format!("price_rules/{rule_id}/discount_codes");
    let body = json!({ "discount_code": { "code": code } });
    let discount_code = match client.rest(Method::POST, &path, &[], Some(body)).await {
        Ok(created) => created,
        Err(err) => {
            warn!(
                price_rule_id = %rule_id,
                error = %err,
                "discount code creation failed after price rule was created"
            );
            return Err(ToolError::Http {
                status: err.status(),
                message: format!(
                    "price rule {rule_id} was created but attaching code '{code}' failed \
                     (the price rule was not removed): {err}"
                ),
            });
        }
    };

    let mut result = Map::new();
    result.insert(
        "price_rule".to_string(),
        price_rule.get("price_rule").cloned().unwrap_or(Value::Null),
    );
    result.insert(
        "discount_code".to_string(),
        discount_code
            .get("discount_code")
            .cloned()
            .unwrap_or(discount_code),
    );
    Ok(Value::Object(result))
}

#[instrument(skip_all)]
async fn delete_discount_code(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::DiscountCodeNode, &args.id("discountId")?);
    let data = client
        .graphql(DELETE_DISCOUNT_CODE, "DiscountCodeDelete", json!({ "id": id }))
        .await?;
    Ok(mutation_payload(data, "discountCodeDelete")?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        Arguments::new(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_price_rule_body_negates_value() {
        let rule = price_rule_body(
            &args(json!({
                "title": "Summer",
                "code": "SUMMER10",
                "valueType": "percentage",
                "value": 10,
                "usageLimit": 100,
            })),
            "2026-06-01T00:00:00+00:00",
        )
        .unwrap();

        assert_eq!(rule.get("value"), Some(&json!("-10")));
        assert_eq!(rule.get("value_type"), Some(&json!("percentage")));
        assert_eq!(rule.get("starts_at"), Some(&json!("2026-06-01T00:00:00+00:00")));
        assert_eq!(rule.get("usage_limit"), Some(&json!(100)));
        assert_eq!(rule.get("ends_at"), None);
    }

    #[test]
    fn test_fixed_amount_keeps_cents() {
        let rule = price_rule_body(
            &args(json!({
                "title": "Five off",
                "code": "FIVE",
                "valueType": "fixed_amount",
                "value": 5.5,
                "startsAt": "2026-01-01T00:00:00Z",
            })),
            "unused",
        )
        .unwrap();
        assert_eq!(rule.get("value"), Some(&json!("-5.5")));
        assert_eq!(rule.get("starts_at"), Some(&json!("2026-01-01T00:00:00Z")));
    }

    #[test]
    fn test_percentage_over_100_rejected() {
        let violations = check_percentage(&args(json!({"valueType": "percentage", "value": 150})));
        assert_eq!(violations.len(), 1);
        assert!(violations.first().is_some_and(|v| v.field == "value"));

        assert!(check_percentage(&args(json!({"valueType": "percentage", "value": 100}))).is_empty());
        assert!(check_percentage(&args(json!({"valueType": "fixed_amount", "value": 150}))).is_empty());
        // Missing or mistyped fields are reported by the schema, not here.
        assert!(check_percentage(&args(json!({"value": "lots"}))).is_empty());
    }

    #[test]
    fn test_price_rule_id() {
        assert_eq!(
            price_rule_id(&json!({"price_rule": {"id": 507328175}})),
            Some("507328175".to_string())
        );
        assert_eq!(price_rule_id(&json!({"price_rule": {}})), None);
        assert_eq!(price_rule_id(&json!({})), None);
    }
}
